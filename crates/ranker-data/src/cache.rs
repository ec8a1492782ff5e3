//! TTL 기반 데이터 소스 메모이제이션.
//!
//! 임의의 [`DataSource`]를 감싸서 같은 요청의 반복 조회를 막습니다.
//!
//! # 동작 흐름
//!
//! ```text
//! 요청 (identifier, period)
//!         │
//!     ┌───┴────────┐
//!     │ 캐시 신선?  │
//!     └───┬────────┘
//!     YES │ NO
//!         │  │
//!         │  ▼
//!         │ ┌────────────────┐
//!         │ │ 내부 소스 조회  │ ← 실패는 캐시하지 않음
//!         │ └───────┬────────┘
//!         ▼         ▼
//!     ┌──────────────────┐
//!     │ 시계열 반환       │
//!     └──────────────────┘
//! ```
//!
//! 시계열은 `(identifier, period)`로, 메타데이터는 `identifier`로 키를 잡습니다.

use async_trait::async_trait;
use ranker_core::{InstrumentId, InstrumentMetadata, Period, PriceSeries};
use serde::Serialize;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::error::Result;
use crate::source::DataSource;

/// 기본 캐시 유효 기간 (1시간).
pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(3600);

/// 캐시 통계.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CacheStats {
    pub hits: u64,
    pub misses: u64,
    pub hit_rate: f64,
}

#[derive(Debug, Clone)]
struct CacheEntry<T> {
    value: T,
    stored_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(value: T) -> Self {
        Self {
            value,
            stored_at: Instant::now(),
        }
    }

    fn is_fresh(&self, ttl: Duration) -> bool {
        self.stored_at.elapsed() < ttl
    }
}

/// 메모이제이션 데이터 소스.
pub struct CachedDataSource<S> {
    inner: S,
    ttl: Duration,
    series: RwLock<HashMap<(InstrumentId, Period), CacheEntry<PriceSeries>>>,
    metadata: RwLock<HashMap<InstrumentId, CacheEntry<Option<InstrumentMetadata>>>>,
    hits: AtomicU64,
    misses: AtomicU64,
}

impl<S: DataSource> CachedDataSource<S> {
    /// 기본 TTL(3600초)로 감쌉니다.
    pub fn new(inner: S) -> Self {
        Self::with_ttl(inner, DEFAULT_CACHE_TTL)
    }

    /// 지정한 TTL로 감쌉니다.
    pub fn with_ttl(inner: S, ttl: Duration) -> Self {
        Self {
            inner,
            ttl,
            series: RwLock::new(HashMap::new()),
            metadata: RwLock::new(HashMap::new()),
            hits: AtomicU64::new(0),
            misses: AtomicU64::new(0),
        }
    }

    /// 내부 소스.
    pub fn inner(&self) -> &S {
        &self.inner
    }

    /// 캐시 유효 기간.
    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// 캐시 통계를 반환합니다.
    pub fn stats(&self) -> CacheStats {
        let hits = self.hits.load(Ordering::Relaxed);
        let misses = self.misses.load(Ordering::Relaxed);
        let total = hits + misses;
        let hit_rate = if total > 0 {
            hits as f64 / total as f64
        } else {
            0.0
        };

        CacheStats {
            hits,
            misses,
            hit_rate,
        }
    }

    /// 모든 캐시 항목과 통계를 비웁니다.
    pub async fn clear(&self) {
        self.series.write().await.clear();
        self.metadata.write().await.clear();
        self.hits.store(0, Ordering::Relaxed);
        self.misses.store(0, Ordering::Relaxed);
        debug!(source = self.inner.name(), "Cache cleared");
    }

    fn record_hit(&self) {
        self.hits.fetch_add(1, Ordering::Relaxed);
    }

    fn record_miss(&self) {
        self.misses.fetch_add(1, Ordering::Relaxed);
    }
}

#[async_trait]
impl<S: DataSource> DataSource for CachedDataSource<S> {
    fn name(&self) -> &str {
        self.inner.name()
    }

    #[instrument(skip(self), fields(source = self.inner.name()))]
    async fn fetch_series(&self, id: &InstrumentId, period: Period) -> Result<PriceSeries> {
        let key = (id.clone(), period);

        {
            let cache = self.series.read().await;
            if let Some(entry) = cache.get(&key).filter(|e| e.is_fresh(self.ttl)) {
                self.record_hit();
                debug!(identifier = %id, period = %period, "Series cache hit");
                return Ok(entry.value.clone());
            }
        }

        self.record_miss();
        let series = self.inner.fetch_series(id, period).await?;

        self.series
            .write()
            .await
            .insert(key, CacheEntry::new(series.clone()));
        debug!(
            identifier = %id,
            period = %period,
            bars = series.len(),
            "Series cached"
        );

        Ok(series)
    }

    #[instrument(skip(self), fields(source = self.inner.name()))]
    async fn fetch_metadata(&self, id: &InstrumentId) -> Result<Option<InstrumentMetadata>> {
        {
            let cache = self.metadata.read().await;
            if let Some(entry) = cache.get(id).filter(|e| e.is_fresh(self.ttl)) {
                self.record_hit();
                debug!(identifier = %id, "Metadata cache hit");
                return Ok(entry.value.clone());
            }
        }

        self.record_miss();
        let metadata = self.inner.fetch_metadata(id).await?;

        self.metadata
            .write()
            .await
            .insert(id.clone(), CacheEntry::new(metadata.clone()));

        Ok(metadata)
    }
}
