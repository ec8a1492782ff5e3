//! 종목 점수 계산기.
//!
//! 가격 시계열 하나를 5개 하위 점수와 단일 종합 점수(0~100)로 변환합니다.
//!
//! # 5개 팩터 (가중치 합계 = 1.0)
//!
//! 1. **Return**: 0.30 - 기간 수익률 %, [-50, 100] 구간 정규화
//! 2. **Volatility**: 0.20 - 연환산 변동성 %, [0, 100] 구간 정규화 후 반전
//! 3. **Sharpe**: 0.20 - 샤프 비율, [-2, 4] 구간 정규화
//! 4. **Trend**: 0.15 - 종가 > SMA20 (+50), 종가 > SMA50 (+50)
//! 5. **Momentum**: 0.15 - RSI 밴드 (40~60: 100, 30~40/60~70: 70, 그 외: 40)
//!
//! # 등급
//!
//! | 종합 점수 | 등급 | 색상 |
//! |-----------|------|------|
//! | ≥ 80 | Excellent | `#10b981` |
//! | ≥ 70 | Very Good | `#22c55e` |
//! | ≥ 60 | Good | `#84cc16` |
//! | ≥ 50 | Regular | `#eab308` |
//! | < 50 | Weak | `#ef4444` |

use ranker_core::{
    round_f64, InstrumentMetadata, PriceSeries, ScoringConfig, ScoringWeights,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::indicators::{IndicatorEngine, IndicatorError, IndicatorParams, IndicatorSet};

/// 점수 계산에 필요한 최소 캔들 수.
pub const MIN_HISTORY: usize = 20;

/// 점수 계산 오류.
#[derive(Debug, Error)]
pub enum ScoringError {
    /// 데이터 부족
    #[error("데이터 부족: 필요 {required}개, 제공 {provided}개")]
    InsufficientHistory { required: usize, provided: usize },

    /// 잘못된 가중치
    #[error("잘못된 가중치: {0}")]
    InvalidWeights(String),

    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

impl From<IndicatorError> for ScoringError {
    fn from(err: IndicatorError) -> Self {
        ScoringError::InvalidParameter(err.to_string())
    }
}

/// 점수 계산 결과 타입.
pub type ScoringResult<T> = Result<T, ScoringError>;

/// 값을 [min, max] 구간에서 0~100으로 정규화합니다.
///
/// NaN은 0, 무한대는 해당 방향의 경계값으로 포화됩니다.
pub fn normalize(value: f64, min: f64, max: f64) -> f64 {
    if value.is_nan() {
        return 0.0;
    }
    if value >= max {
        100.0
    } else if value <= min {
        0.0
    } else {
        ((value - min) / (max - min) * 100.0).clamp(0.0, 100.0)
    }
}

/// 등급.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Tier {
    Weak,
    Regular,
    Good,
    VeryGood,
    Excellent,
}

impl Tier {
    /// 종합 점수로 등급을 결정합니다 (하한 포함).
    pub fn from_score(total: f64) -> Self {
        if total >= 80.0 {
            Tier::Excellent
        } else if total >= 70.0 {
            Tier::VeryGood
        } else if total >= 60.0 {
            Tier::Good
        } else if total >= 50.0 {
            Tier::Regular
        } else {
            Tier::Weak
        }
    }

    /// 표시 색상 (hex).
    pub fn color(&self) -> &'static str {
        match self {
            Tier::Excellent => "#10b981",
            Tier::VeryGood => "#22c55e",
            Tier::Good => "#84cc16",
            Tier::Regular => "#eab308",
            Tier::Weak => "#ef4444",
        }
    }

    /// 별 개수 (1~5).
    pub fn stars(&self) -> u8 {
        match self {
            Tier::Excellent => 5,
            Tier::VeryGood => 4,
            Tier::Good => 3,
            Tier::Regular => 2,
            Tier::Weak => 1,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Tier::Excellent => "Excellent",
            Tier::VeryGood => "Very Good",
            Tier::Good => "Good",
            Tier::Regular => "Regular",
            Tier::Weak => "Weak",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", "★".repeat(self.stars() as usize), self.label())
    }
}

/// 추세 방향 (Trend 하위 점수 기준).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrendDirection {
    Up,
    Down,
    Neutral,
}

impl TrendDirection {
    /// ≥ 75 상승, ≤ 25 하락, 그 외 중립.
    pub fn from_trend_score(score: f64) -> Self {
        if score >= 75.0 {
            TrendDirection::Up
        } else if score <= 25.0 {
            TrendDirection::Down
        } else {
            TrendDirection::Neutral
        }
    }
}

impl fmt::Display for TrendDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrendDirection::Up => write!(f, "Up"),
            TrendDirection::Down => write!(f, "Down"),
            TrendDirection::Neutral => write!(f, "Neutral"),
        }
    }
}

/// 5개 하위 점수 (각 0~100).
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SubScores {
    pub total_return: f64,
    pub volatility: f64,
    pub sharpe: f64,
    pub trend: f64,
    pub momentum: f64,
}

impl SubScores {
    /// 가중 합계 (반올림 전).
    pub fn weighted_sum(&self, weights: &ScoringWeights) -> f64 {
        self.total_return * weights.total_return
            + self.volatility * weights.volatility
            + self.sharpe * weights.sharpe
            + self.trend * weights.trend
            + self.momentum * weights.momentum
    }
}

/// 하위 점수의 원천 지표 값.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RawMetrics {
    /// 기간 수익률 (%)
    pub total_return_pct: f64,
    /// 연환산 변동성 (%)
    pub volatility_pct: f64,
    pub sharpe_ratio: f64,
    /// 최신 RSI (정의되지 않으면 None)
    pub rsi: Option<f64>,
    /// 최신 단기 SMA
    pub sma_short: f64,
    /// 추세 판단에 사용한 중기 SMA (이력이 짧으면 단기 SMA)
    pub sma_medium: f64,
    pub last_close: f64,
    /// 최대 낙폭 (%)
    pub max_drawdown_pct: f64,
}

/// 종목 점수 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub sub_scores: SubScores,
    pub raw: RawMetrics,
    /// 가중 종합 점수 (0~100, 소수 둘째 자리 반올림)
    pub total: f64,
    pub tier: Tier,
    pub trend_direction: TrendDirection,
    /// 호출자가 넘긴 메타데이터 (점수에는 영향 없음)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<InstrumentMetadata>,
}

impl ScoreBreakdown {
    pub fn color(&self) -> &'static str {
        self.tier.color()
    }
}

/// 종목 점수 계산기.
#[derive(Debug, Clone)]
pub struct InstrumentScorer {
    engine: IndicatorEngine,
    weights: ScoringWeights,
    min_history: usize,
}

impl Default for InstrumentScorer {
    fn default() -> Self {
        Self {
            engine: IndicatorEngine::default(),
            weights: ScoringWeights::default(),
            min_history: MIN_HISTORY,
        }
    }
}

impl InstrumentScorer {
    /// 설정으로 점수 계산기를 생성합니다.
    ///
    /// # 에러
    /// 가중치 합계가 1.0이 아니거나 음수이면 `InvalidWeights`,
    /// 무위험 이자율/최소 캔들 수가 잘못되면 `InvalidParameter`.
    pub fn new(config: &ScoringConfig) -> ScoringResult<Self> {
        config
            .weights
            .validate()
            .map_err(|e| ScoringError::InvalidWeights(e.to_string()))?;

        if config.min_history < 2 {
            return Err(ScoringError::InvalidParameter(format!(
                "최소 캔들 수는 2 이상이어야 합니다: {}",
                config.min_history
            )));
        }

        let params = IndicatorParams {
            risk_free_rate: config.risk_free_rate,
            ..Default::default()
        };

        Ok(Self {
            engine: IndicatorEngine::new(params)?,
            weights: config.weights,
            min_history: config.min_history,
        })
    }

    pub fn weights(&self) -> &ScoringWeights {
        &self.weights
    }

    pub fn min_history(&self) -> usize {
        self.min_history
    }

    pub fn engine(&self) -> &IndicatorEngine {
        &self.engine
    }

    /// 시계열의 점수를 계산합니다.
    ///
    /// # 인자
    /// * `series` - 검증된 가격 시계열
    /// * `metadata` - 결과에 그대로 실리는 선택 메타데이터
    ///
    /// # 반환
    /// 캔들이 `min_history`개 미만이면 `InsufficientHistory`.
    pub fn score(
        &self,
        series: &PriceSeries,
        metadata: Option<&InstrumentMetadata>,
    ) -> ScoringResult<ScoreBreakdown> {
        if series.len() < self.min_history {
            return Err(ScoringError::InsufficientHistory {
                required: self.min_history,
                provided: series.len(),
            });
        }

        let indicators = self.engine.compute(series);
        Ok(self.score_indicators(&indicators, metadata.cloned()))
    }

    /// 이미 계산된 지표 묶음으로 점수를 계산합니다.
    pub fn score_indicators(
        &self,
        indicators: &IndicatorSet,
        metadata: Option<InstrumentMetadata>,
    ) -> ScoreBreakdown {
        let risk = indicators.risk;
        let last_close = indicators.last_close.unwrap_or(0.0);
        let sma_short = indicators.latest_sma_short().unwrap_or(last_close);
        let sma_medium = indicators.latest_sma_medium().unwrap_or(sma_short);
        let rsi = indicators.latest_rsi();

        let trend = trend_score(last_close, sma_short, sma_medium);
        let sub_scores = SubScores {
            total_return: normalize(risk.total_return_pct, -50.0, 100.0),
            volatility: 100.0 - normalize(risk.volatility_pct, 0.0, 100.0),
            sharpe: normalize(risk.sharpe_ratio, -2.0, 4.0),
            trend,
            momentum: momentum_score(rsi),
        };

        // 등급은 반올림 전 점수로 판정합니다.
        let raw_total = sub_scores.weighted_sum(&self.weights).clamp(0.0, 100.0);
        let total = round_f64(raw_total, 2);

        ScoreBreakdown {
            sub_scores,
            raw: RawMetrics {
                total_return_pct: risk.total_return_pct,
                volatility_pct: risk.volatility_pct,
                sharpe_ratio: risk.sharpe_ratio,
                rsi,
                sma_short,
                sma_medium,
                last_close,
                max_drawdown_pct: risk.max_drawdown_pct,
            },
            total,
            tier: Tier::from_score(raw_total),
            trend_direction: TrendDirection::from_trend_score(trend),
            metadata,
        }
    }
}

/// Trend 하위 점수: 종가가 각 이동평균 위면 +50.
pub fn trend_score(close: f64, sma_short: f64, sma_medium: f64) -> f64 {
    let mut score = 0.0;
    if close > sma_short {
        score += 50.0;
    }
    if close > sma_medium {
        score += 50.0;
    }
    score
}

/// Momentum 하위 점수: RSI 밴드.
pub fn momentum_score(rsi: Option<f64>) -> f64 {
    match rsi {
        Some(r) if (40.0..=60.0).contains(&r) => 100.0,
        Some(r) if (30.0..40.0).contains(&r) || (r > 60.0 && r <= 70.0) => 70.0,
        Some(r) if r < 30.0 || r > 70.0 => 40.0,
        _ => 50.0,
    }
}

/// 기본 설정으로 종목 점수를 계산합니다.
pub fn score_instrument(
    series: &PriceSeries,
    metadata: Option<&InstrumentMetadata>,
) -> ScoringResult<ScoreBreakdown> {
    InstrumentScorer::default().score(series, metadata)
}
