//! 데이터 소스 trait.

use async_trait::async_trait;
use ranker_core::{InstrumentId, InstrumentMetadata, Period, PriceSeries};
use std::sync::Arc;

use crate::error::Result;

/// 가격 데이터 소스.
///
/// 랭킹 엔진이 종목별 가격 시계열과 메타데이터를 가져올 때 사용합니다.
/// 구현체는 여러 작업에서 동시에 호출될 수 있습니다.
#[async_trait]
pub trait DataSource: Send + Sync {
    /// 소스 이름 (로그용).
    fn name(&self) -> &str;

    /// 종목의 가격 시계열을 조회합니다.
    ///
    /// # 인자
    /// - `id`: 정규화된 종목 식별자
    /// - `period`: 조회 기간
    ///
    /// # 반환
    /// 검증된 시계열. 데이터가 없으면 `DataError::NotFound`.
    async fn fetch_series(&self, id: &InstrumentId, period: Period) -> Result<PriceSeries>;

    /// 종목 메타데이터를 조회합니다. 없으면 `Ok(None)`.
    async fn fetch_metadata(&self, id: &InstrumentId) -> Result<Option<InstrumentMetadata>>;
}

#[async_trait]
impl<T: DataSource + ?Sized> DataSource for Arc<T> {
    fn name(&self) -> &str {
        (**self).name()
    }

    async fn fetch_series(&self, id: &InstrumentId, period: Period) -> Result<PriceSeries> {
        (**self).fetch_series(id, period).await
    }

    async fn fetch_metadata(&self, id: &InstrumentId) -> Result<Option<InstrumentMetadata>> {
        (**self).fetch_metadata(id).await
    }
}
