//! 인메모리 데이터 소스.

use async_trait::async_trait;
use ranker_core::{InstrumentId, InstrumentMetadata, Period, PriceSeries};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::error::{DataError, Result};
use crate::source::DataSource;

/// 맵 기반 데이터 소스.
///
/// 저장된 시계열을 기간과 무관하게 그대로 반환합니다. 종목별 지연과 실패를
/// 설정할 수 있어 배치 동작을 재현할 때 사용합니다.
#[derive(Debug, Default)]
pub struct InMemoryDataSource {
    series: HashMap<InstrumentId, PriceSeries>,
    metadata: HashMap<InstrumentId, InstrumentMetadata>,
    failures: HashMap<InstrumentId, String>,
    delays: HashMap<InstrumentId, Duration>,
    series_fetches: AtomicUsize,
}

impl InMemoryDataSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// 종목 시계열을 등록합니다.
    pub fn with_series(mut self, id: InstrumentId, series: PriceSeries) -> Self {
        self.series.insert(id, series);
        self
    }

    /// 종목 메타데이터를 등록합니다.
    pub fn with_metadata(mut self, id: InstrumentId, metadata: InstrumentMetadata) -> Self {
        self.metadata.insert(id, metadata);
        self
    }

    /// 조회 시 `FetchError`를 반환하도록 설정합니다.
    pub fn with_failure(mut self, id: InstrumentId, message: impl Into<String>) -> Self {
        self.failures.insert(id, message.into());
        self
    }

    /// 조회 전에 지연을 둡니다.
    pub fn with_delay(mut self, id: InstrumentId, delay: Duration) -> Self {
        self.delays.insert(id, delay);
        self
    }

    /// 지금까지 `fetch_series`가 호출된 횟수.
    pub fn series_fetch_count(&self) -> usize {
        self.series_fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DataSource for InMemoryDataSource {
    fn name(&self) -> &str {
        "memory"
    }

    async fn fetch_series(&self, id: &InstrumentId, _period: Period) -> Result<PriceSeries> {
        self.series_fetches.fetch_add(1, Ordering::SeqCst);

        if let Some(delay) = self.delays.get(id) {
            tokio::time::sleep(*delay).await;
        }
        if let Some(message) = self.failures.get(id) {
            return Err(DataError::FetchError(message.clone()));
        }

        self.series
            .get(id)
            .cloned()
            .ok_or_else(|| DataError::NotFound(id.to_string()))
    }

    async fn fetch_metadata(&self, id: &InstrumentId) -> Result<Option<InstrumentMetadata>> {
        Ok(self.metadata.get(id).cloned())
    }
}
