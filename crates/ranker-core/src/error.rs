//! 랭킹 시스템의 에러 타입.
//!
//! 이 모듈은 도메인 모델 생성과 설정 검증 단계에서 사용되는 에러 타입을 정의합니다.
//! 데이터 품질 문제(데이터 부족, 지표 미정의 등)는 에러가 아니라 타입으로 표현되며,
//! 여기의 에러는 잘못된 입력이나 설정을 즉시 거부할 때만 사용됩니다.

use thiserror::Error;

/// 핵심 랭킹 에러.
#[derive(Debug, Error)]
pub enum RankerError {
    /// 설정 에러
    #[error("설정 에러: {0}")]
    Config(String),

    /// 가격 시계열 불변식 위반 (타임스탬프 순서, 가격 범위)
    #[error("잘못된 가격 시계열: {0}")]
    InvalidSeries(String),

    /// 잘못된 입력
    #[error("잘못된 입력: {0}")]
    InvalidInput(String),

    /// 찾을 수 없음
    #[error("찾을 수 없음: {0}")]
    NotFound(String),

    /// 직렬화 에러
    #[error("직렬화 에러: {0}")]
    Serialization(String),
}

/// 랭킹 작업을 위한 Result 타입.
pub type RankerResult<T> = Result<T, RankerError>;

impl RankerError {
    /// 설정 단계에서 발생한 에러인지 확인합니다.
    ///
    /// 설정 에러는 배치 실행 전에 즉시 실패해야 합니다.
    pub fn is_setup_error(&self) -> bool {
        matches!(self, RankerError::Config(_))
    }
}

impl From<serde_json::Error> for RankerError {
    fn from(err: serde_json::Error) -> Self {
        RankerError::Serialization(err.to_string())
    }
}

impl From<config::ConfigError> for RankerError {
    fn from(err: config::ConfigError) -> Self {
        RankerError::Config(err.to_string())
    }
}
