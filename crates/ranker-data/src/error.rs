//! 데이터 모듈 오류 타입.

use ranker_core::RankerError;
use thiserror::Error;

/// 데이터 관련 오류.
///
/// 랭킹 엔진은 모든 변형을 "데이터 없음"으로 취급하고 해당 종목을 건너뜁니다.
#[derive(Debug, Error)]
pub enum DataError {
    /// 종목 데이터를 찾을 수 없음
    #[error("Not found: {0}")]
    NotFound(String),

    /// 데이터 가져오기 오류 (외부 소스)
    #[error("Fetch error: {0}")]
    FetchError(String),

    /// 파싱 오류
    #[error("Parse error: {0}")]
    ParseError(String),

    /// 잘못된 데이터 (시계열 불변식 위반 등)
    #[error("Invalid data: {0}")]
    InvalidData(String),

    /// 파일 입출력 오류
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        DataError::ParseError(err.to_string())
    }
}

impl From<RankerError> for DataError {
    fn from(err: RankerError) -> Self {
        match err {
            RankerError::NotFound(msg) => DataError::NotFound(msg),
            other => DataError::InvalidData(other.to_string()),
        }
    }
}

pub type Result<T> = std::result::Result<T, DataError>;
