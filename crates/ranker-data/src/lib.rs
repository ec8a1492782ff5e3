//! 가격 데이터 소스.
//!
//! 이 crate는 다음을 제공합니다:
//! - 랭킹 엔진이 소비하는 `DataSource` trait
//! - TTL 기반 메모이제이션 레이어 (`CachedDataSource`)
//! - 로컬 Provider: CSV 디렉토리, 인메모리 맵

pub mod cache;
pub mod error;
pub mod provider;
pub mod source;

pub use cache::{CacheStats, CachedDataSource};
pub use error::{DataError, Result};
pub use provider::{CsvDirectorySource, InMemoryDataSource};
pub use source::DataSource;
