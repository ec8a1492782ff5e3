//! 가격 표현을 위한 Decimal 유틸리티.
//!
//! 가격과 거래량은 `Decimal`로 저장하고, 지표 계산은 경계에서 `f64`로 변환해 수행합니다.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;

/// 가격 타입.
pub type Price = Decimal;

/// 거래량 타입.
pub type Volume = Decimal;

/// Decimal을 f64로 변환합니다. 표현할 수 없으면 NaN.
pub fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(f64::NAN)
}

/// f64를 지정한 소수점 자릿수로 반올림합니다 (0.5는 0에서 멀어지는 방향).
pub fn round_f64(value: f64, dp: u32) -> f64 {
    let factor = 10f64.powi(dp as i32);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_decimal_conversions() {
        assert!((decimal_to_f64(dec!(123.45)) - 123.45).abs() < 1e-12);
        assert!((decimal_to_f64(dec!(0.0001)) - 0.0001).abs() < 1e-15);
    }

    #[test]
    fn test_round_f64() {
        assert!((round_f64(80.8649, 2) - 80.86).abs() < 1e-12);
        assert!((round_f64(66.666_666, 2) - 66.67).abs() < 1e-12);
    }
}
