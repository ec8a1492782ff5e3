//! # Ranker Core
//!
//! 종목 점수/랭킹 엔진의 핵심 도메인 모델 및 타입을 제공합니다.
//!
//! 이 크레이트는 워크스페이스 전반에서 사용되는 기본 타입을 제공합니다:
//! - 가격 캔들과 검증된 가격 시계열
//! - 종목 식별자, 메타데이터, 조회 기간
//! - 설정 관리 (점수 가중치, 동시성, 데이터 소스)
//! - 로깅 인프라
//! - 에러 타입

pub mod config;
pub mod domain;
pub mod error;
pub mod logging;
pub mod types;

pub use config::*;
pub use domain::*;
pub use error::*;
pub use logging::*;
pub use types::*;
