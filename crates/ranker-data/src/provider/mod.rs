//! 데이터 Provider 모듈.
//!
//! ## CSV 디렉토리
//! - `CsvDirectorySource`: `<dir>/<IDENTIFIER>.csv` 일봉 파일과 `metadata.json`
//!
//! ## 인메모리
//! - `InMemoryDataSource`: 호스트가 미리 채운 시계열 맵

pub mod csv;
pub mod memory;

pub use csv::CsvDirectorySource;
pub use memory::InMemoryDataSource;
