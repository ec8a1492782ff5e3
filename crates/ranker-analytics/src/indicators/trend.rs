//! 추세 지표 (Trend Indicators).
//!
//! 이동평균 기반의 추세 지표들을 제공합니다.
//! - SMA (Simple Moving Average)
//! - EMA (Exponential Moving Average)
//! - MACD (Moving Average Convergence Divergence)

use serde::{Deserialize, Serialize};

use super::{IndicatorError, IndicatorResult};

/// SMA 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for SmaParams {
    fn default() -> Self {
        Self { period: 20 }
    }
}

impl SmaParams {
    pub fn validate(&self) -> IndicatorResult<()> {
        ensure_period("SMA", self.period)
    }
}

/// EMA 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EmaParams {
    /// 이동평균 기간.
    pub period: usize,
}

impl Default for EmaParams {
    fn default() -> Self {
        Self { period: 12 }
    }
}

impl EmaParams {
    pub fn validate(&self) -> IndicatorResult<()> {
        ensure_period("EMA", self.period)
    }
}

/// MACD 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdParams {
    /// 단기 EMA 기간 (기본: 12).
    pub fast_period: usize,
    /// 장기 EMA 기간 (기본: 26).
    pub slow_period: usize,
    /// 시그널 라인 기간 (기본: 9).
    pub signal_period: usize,
}

impl Default for MacdParams {
    fn default() -> Self {
        Self {
            fast_period: 12,
            slow_period: 26,
            signal_period: 9,
        }
    }
}

impl MacdParams {
    /// 기간이 모두 양수이고 단기 < 장기인지 검증합니다.
    pub fn validate(&self) -> IndicatorResult<()> {
        ensure_period("MACD fast", self.fast_period)?;
        ensure_period("MACD slow", self.slow_period)?;
        ensure_period("MACD signal", self.signal_period)?;

        if self.fast_period >= self.slow_period {
            return Err(IndicatorError::InvalidParameter(format!(
                "MACD 단기 기간({})은 장기 기간({})보다 작아야 합니다",
                self.fast_period, self.slow_period
            )));
        }
        Ok(())
    }
}

/// MACD 시계열.
///
/// EMA가 첫 값부터 정의되므로 비어 있지 않은 입력에서는 모든 시점이 정의됩니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MacdSeries {
    /// MACD 라인 (단기 EMA - 장기 EMA).
    pub macd: Vec<Option<f64>>,
    /// 시그널 라인 (MACD의 EMA).
    pub signal: Vec<Option<f64>>,
    /// 히스토그램 (MACD - 시그널).
    pub histogram: Vec<Option<f64>>,
}

pub(crate) fn ensure_period(name: &str, period: usize) -> IndicatorResult<()> {
    if period == 0 {
        return Err(IndicatorError::InvalidParameter(format!(
            "{} 기간은 0보다 커야 합니다",
            name
        )));
    }
    Ok(())
}

/// 단순 이동평균 (SMA) 계산.
///
/// SMA = (P1 + P2 + ... + Pn) / n
///
/// # 반환
/// 입력과 같은 길이. 처음 period-1개는 None (period가 0이면 전부 None).
pub fn sma(values: &[f64], period: usize) -> Vec<Option<f64>> {
    let mut result = vec![None; values.len()];
    if period == 0 || values.len() < period {
        return result;
    }

    let mut window_sum: f64 = values[..period].iter().sum();
    result[period - 1] = Some(window_sum / period as f64);

    for i in period..values.len() {
        window_sum += values[i] - values[i - period];
        result[i] = Some(window_sum / period as f64);
    }

    result
}

/// 지수 이동평균 (EMA) 계산.
///
/// EMA = (현재가 × k) + (이전 EMA × (1 - k)), k = 2 / (period + 1)
///
/// 첫 관측값으로 시작하므로 워밍업 구간이 없습니다.
pub fn ema(values: &[f64], period: usize) -> Vec<Option<f64>> {
    if period == 0 {
        return vec![None; values.len()];
    }

    let k = 2.0 / (period as f64 + 1.0);
    let mut result = Vec::with_capacity(values.len());
    let mut prev: Option<f64> = None;

    for &value in values {
        let next = match prev {
            None => value,
            Some(p) => value * k + p * (1.0 - k),
        };
        result.push(Some(next));
        prev = Some(next);
    }

    result
}

/// MACD 계산.
///
/// MACD 라인 = 단기 EMA - 장기 EMA
/// 시그널 라인 = MACD 라인의 EMA
/// 히스토그램 = MACD 라인 - 시그널 라인
pub fn macd(values: &[f64], params: &MacdParams) -> MacdSeries {
    let fast = ema(values, params.fast_period);
    let slow = ema(values, params.slow_period);

    let macd_line: Vec<Option<f64>> = fast
        .iter()
        .zip(slow.iter())
        .map(|(f, s)| match (f, s) {
            (Some(f), Some(s)) => Some(f - s),
            _ => None,
        })
        .collect();

    // MACD 라인이 정의된 구간에서만 시그널 EMA를 이어갑니다.
    let first_defined = macd_line.iter().position(Option::is_some);
    let mut signal = vec![None; macd_line.len()];
    if let Some(start) = first_defined {
        let defined: Vec<f64> = macd_line[start..].iter().map(|v| v.unwrap_or(0.0)).collect();
        for (offset, value) in ema(&defined, params.signal_period).into_iter().enumerate() {
            signal[start + offset] = value;
        }
    }

    let histogram = macd_line
        .iter()
        .zip(signal.iter())
        .map(|(m, s)| match (m, s) {
            (Some(m), Some(s)) => Some(m - s),
            _ => None,
        })
        .collect();

    MacdSeries {
        macd: macd_line,
        signal,
        histogram,
    }
}

/// 빠른 선이 느린 선 위에 있는지. 둘 중 하나라도 정의되지 않으면 None.
pub fn is_fast_above_slow(fast: Option<f64>, slow: Option<f64>) -> Option<bool> {
    match (fast, slow) {
        (Some(f), Some(s)) => Some(f > s),
        _ => None,
    }
}
