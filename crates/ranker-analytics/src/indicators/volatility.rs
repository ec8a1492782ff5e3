//! 변동성 지표 (Volatility Indicators).
//!
//! - Bollinger Bands (표본 표준편차 기반)

use serde::{Deserialize, Serialize};

use super::trend::sma;
use super::{IndicatorError, IndicatorResult};

/// 볼린저 밴드 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsParams {
    /// 이동평균 기간 (기본: 20).
    pub period: usize,
    /// 표준편차 배수 (기본: 2.0).
    pub std_dev_multiplier: f64,
}

impl Default for BollingerBandsParams {
    fn default() -> Self {
        Self {
            period: 20,
            std_dev_multiplier: 2.0,
        }
    }
}

impl BollingerBandsParams {
    /// 기간 ≥ 2, 배수 > 0 검증.
    pub fn validate(&self) -> IndicatorResult<()> {
        if self.period < 2 {
            return Err(IndicatorError::InvalidParameter(format!(
                "볼린저 밴드 기간은 2 이상이어야 합니다: {}",
                self.period
            )));
        }
        if !self.std_dev_multiplier.is_finite() || self.std_dev_multiplier <= 0.0 {
            return Err(IndicatorError::InvalidParameter(format!(
                "표준편차 배수는 양수여야 합니다: {}",
                self.std_dev_multiplier
            )));
        }
        Ok(())
    }
}

/// 볼린저 밴드 시계열.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BollingerBands {
    /// 상단 밴드 (중간 + k × 표준편차).
    pub upper: Vec<Option<f64>>,
    /// 중간 밴드 (SMA).
    pub middle: Vec<Option<f64>>,
    /// 하단 밴드 (중간 - k × 표준편차).
    pub lower: Vec<Option<f64>>,
    /// %B = (가격 - 하단) / (상단 - 하단). 밴드가 겹치면 0.5.
    pub percent_b: Vec<Option<f64>>,
}

/// 이동 표본 표준편차 (ddof = 1).
///
/// # 반환
/// 입력과 같은 길이. 처음 period-1개는 None, period < 2이면 전부 None.
pub fn rolling_std(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period < 2 || values.len() < period {
        return result;
    }

    for i in (period - 1)..values.len() {
        result[i] = Some(sample_std(&values[i + 1 - period..=i]));
    }
    result
}

/// 표본 표준편차. 값이 2개 미만이면 0.
pub fn sample_std(values: &[f64]) -> f64 {
    if values.len() < 2 {
        return 0.0;
    }
    let n = values.len() as f64;
    let mean = values.iter().sum::<f64>() / n;
    let variance = values.iter().map(|v| (v - mean).powi(2)).sum::<f64>() / (n - 1.0);
    variance.max(0.0).sqrt()
}

/// 볼린저 밴드 계산.
pub fn bollinger_bands(prices: &[f64], params: &BollingerBandsParams) -> BollingerBands {
    let middle = sma(prices, params.period);
    let std = rolling_std(prices, params.period);
    let k = params.std_dev_multiplier;

    let mut upper = Vec::with_capacity(prices.len());
    let mut lower = Vec::with_capacity(prices.len());
    let mut percent_b = Vec::with_capacity(prices.len());

    for (i, &price) in prices.iter().enumerate() {
        match (middle[i], std[i]) {
            (Some(m), Some(s)) => {
                let up = m + k * s;
                let low = m - k * s;
                let width = up - low;
                upper.push(Some(up));
                lower.push(Some(low));
                percent_b.push(Some(if width > 0.0 {
                    (price - low) / width
                } else {
                    0.5
                }));
            }
            _ => {
                upper.push(None);
                lower.push(None);
                percent_b.push(None);
            }
        }
    }

    BollingerBands {
        upper,
        middle,
        lower,
        percent_b,
    }
}
