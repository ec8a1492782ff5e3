//! 리스크/성과 지표.
//!
//! 종가 시계열 전체에 대한 스칼라 지표를 계산합니다:
//! - 기간 수익률 (%)
//! - 연환산 변동성 (%)
//! - 샤프 비율
//! - 최대 낙폭 (%)
//!
//! 모든 함수는 데이터가 부족하거나 분모가 0인 경우 0을 반환하며, 에러를 내지 않습니다.

use serde::{Deserialize, Serialize};

use super::volatility::sample_std;

/// 연간 거래일 수.
pub const TRADING_DAYS_PER_YEAR: f64 = 252.0;

/// 기본 무위험 이자율 (연간, 0.10 = 10%).
pub const DEFAULT_RISK_FREE_RATE: f64 = 0.10;

/// 스칼라 리스크 지표 묶음.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct RiskMetrics {
    /// 첫 종가 대비 마지막 종가 수익률 (%)
    pub total_return_pct: f64,
    /// 연환산 변동성 (%)
    pub volatility_pct: f64,
    /// 샤프 비율
    pub sharpe_ratio: f64,
    /// 최대 낙폭 (%, 항상 0 이하)
    pub max_drawdown_pct: f64,
}

impl RiskMetrics {
    /// 종가 시계열에서 모든 지표를 계산합니다.
    pub fn from_closes(closes: &[f64], risk_free_rate: f64) -> Self {
        let returns = pct_returns(closes);
        Self {
            total_return_pct: total_return_pct(closes),
            volatility_pct: annualized_volatility(&returns) * 100.0,
            sharpe_ratio: sharpe_ratio(&returns, risk_free_rate),
            max_drawdown_pct: max_drawdown_pct(closes),
        }
    }
}

/// 일간 수익률 (단순 변화율).
pub fn pct_returns(closes: &[f64]) -> Vec<f64> {
    closes
        .windows(2)
        .filter(|w| w[0] != 0.0)
        .map(|w| (w[1] - w[0]) / w[0])
        .collect()
}

/// 기간 수익률 (%).
pub fn total_return_pct(closes: &[f64]) -> f64 {
    match (closes.first(), closes.last()) {
        (Some(&first), Some(&last)) if closes.len() >= 2 && first != 0.0 => {
            (last - first) / first * 100.0
        }
        _ => 0.0,
    }
}

/// 연환산 변동성 (비율). 수익률이 2개 미만이면 0.
pub fn annualized_volatility(returns: &[f64]) -> f64 {
    sample_std(returns) * TRADING_DAYS_PER_YEAR.sqrt()
}

/// 샤프 비율.
///
/// (연환산 평균 수익률 - 무위험 이자율) / 연환산 변동성.
/// 변동성이 0이면 0.
pub fn sharpe_ratio(returns: &[f64], risk_free_rate: f64) -> f64 {
    let volatility = annualized_volatility(returns);
    if returns.is_empty() || volatility == 0.0 || !volatility.is_finite() {
        return 0.0;
    }

    let mean = returns.iter().sum::<f64>() / returns.len() as f64;
    (mean * TRADING_DAYS_PER_YEAR - risk_free_rate) / volatility
}

/// 최대 낙폭 (%).
///
/// 첫 종가를 기준(1.0)으로 한 누적 수익 곡선에서 고점 대비 최대 하락률입니다.
pub fn max_drawdown_pct(closes: &[f64]) -> f64 {
    let Some(&first) = closes.first() else {
        return 0.0;
    };
    if first <= 0.0 {
        return 0.0;
    }

    let mut peak = 1.0;
    let mut max_drawdown = 0.0;

    for &close in closes {
        let cumulative = close / first;
        if cumulative > peak {
            peak = cumulative;
        }
        let drawdown = (cumulative - peak) / peak;
        if drawdown < max_drawdown {
            max_drawdown = drawdown;
        }
    }

    max_drawdown * 100.0
}
