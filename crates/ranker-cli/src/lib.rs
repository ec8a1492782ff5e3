//! 랭킹 CLI 도구 모음.
//!
//! 이 crate는 다음 기능을 제공합니다:
//! - CSV 디렉토리 기반 배치 랭킹 (진행 표시, Ctrl-C 취소)
//! - 단일 파일 점수/신호 분석
//! - 표 및 JSON 출력

pub mod commands;

pub use commands::*;
