//! 랭킹 시스템 전반에서 사용되는 공통 타입.

mod decimal;
mod instrument;
mod period;

pub use decimal::*;
pub use instrument::*;
pub use period::*;
