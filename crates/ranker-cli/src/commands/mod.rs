//! CLI 명령어 구현 모듈.

pub mod output;
pub mod rank;
pub mod score;

pub use output::OutputFormat;
