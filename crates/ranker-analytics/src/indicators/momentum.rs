//! 모멘텀 지표 (Momentum Indicators).
//!
//! 과매수/과매도 상태를 측정하는 RSI를 제공합니다.

use serde::{Deserialize, Serialize};

use super::trend::ensure_period;
use super::IndicatorResult;

/// RSI 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RsiParams {
    /// RSI 기간 (기본: 14).
    pub period: usize,
}

impl Default for RsiParams {
    fn default() -> Self {
        Self { period: 14 }
    }
}

impl RsiParams {
    pub fn validate(&self) -> IndicatorResult<()> {
        ensure_period("RSI", self.period)
    }
}

/// RSI (Relative Strength Index) 계산.
///
/// RSI = 100 - (100 / (1 + RS)), RS = 평균 상승폭 / 평균 하락폭
///
/// 평균은 직전 `period`개 종가 변화량의 단순 평균입니다.
///
/// # 반환
/// 입력과 같은 길이. 처음 `period`개 시점은 None.
/// 하락 없이 상승만 있으면 100, 변화가 전혀 없으면 None.
pub fn rsi(prices: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; prices.len()];
    if period == 0 || prices.len() <= period {
        return result;
    }

    let deltas: Vec<f64> = prices.windows(2).map(|w| w[1] - w[0]).collect();
    let gain = |d: f64| if d > 0.0 { d } else { 0.0 };
    let loss = |d: f64| if d < 0.0 { -d } else { 0.0 };

    // deltas[i - 1]은 prices[i - 1] -> prices[i] 변화량
    let mut gain_sum: f64 = deltas[..period].iter().map(|&d| gain(d)).sum();
    let mut loss_sum: f64 = deltas[..period].iter().map(|&d| loss(d)).sum();
    result[period] = rsi_value(gain_sum, loss_sum);

    for i in (period + 1)..prices.len() {
        let incoming = deltas[i - 1];
        let outgoing = deltas[i - 1 - period];
        gain_sum += gain(incoming) - gain(outgoing);
        loss_sum += loss(incoming) - loss(outgoing);
        result[i] = rsi_value(gain_sum.max(0.0), loss_sum.max(0.0));
    }

    result
}

fn rsi_value(gain_sum: f64, loss_sum: f64) -> Option<f64> {
    // 평균의 비율이므로 합계 비율과 같습니다.
    if loss_sum <= f64::EPSILON * gain_sum.abs().max(1.0) {
        if gain_sum > 0.0 {
            return Some(100.0);
        }
        return None;
    }
    let rs = gain_sum / loss_sum;
    Some((100.0 - 100.0 / (1.0 + rs)).clamp(0.0, 100.0))
}
