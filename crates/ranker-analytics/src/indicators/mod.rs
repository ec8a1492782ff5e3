//! 기술적 지표 모듈.
//!
//! 가격 시계열 하나에서 점수 계산과 신호 해석에 필요한 모든 지표를 계산합니다.
//! 계산은 순수하고 동기적이며, 종가/거래량을 경계에서 `f64`로 변환해 수행합니다.
//!
//! # 지원 지표
//!
//! ## 추세 지표 (Trend Indicators)
//! - **SMA**: 단순 이동평균 (20/50/200)
//! - **EMA**: 지수 이동평균 (12/26)
//! - **MACD**: 이동평균 수렴/확산 (12, 26, 9)
//!
//! ## 모멘텀 지표 (Momentum Indicators)
//! - **RSI**: 상대강도지수 (14)
//!
//! ## 변동성 지표 (Volatility Indicators)
//! - **Bollinger Bands**: 볼린저 밴드 (20, 2σ)
//!
//! ## 리스크 지표 (Risk Metrics)
//! - 기간 수익률, 연환산 변동성, 샤프 비율, 최대 낙폭
//!
//! 워밍업 구간처럼 값이 정의되지 않는 시점은 `None`으로 표현합니다.
//!
//! # 사용 예시
//!
//! ```ignore
//! use ranker_analytics::indicators::{compute_indicators, IndicatorEngine, IndicatorParams};
//!
//! let set = compute_indicators(&series);
//! let rsi = set.latest_rsi();
//!
//! let engine = IndicatorEngine::new(IndicatorParams::default())?;
//! let set = engine.compute(&series);
//! ```

pub mod momentum;
pub mod risk;
pub mod trend;
pub mod volatility;

use ranker_core::PriceSeries;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use momentum::RsiParams;
pub use risk::{RiskMetrics, DEFAULT_RISK_FREE_RATE, TRADING_DAYS_PER_YEAR};
pub use trend::{EmaParams, MacdParams, MacdSeries, SmaParams};
pub use volatility::{BollingerBands, BollingerBandsParams};

/// 지표 설정 오류.
///
/// 데이터 부족은 에러가 아니라 `None` 값으로 표현되므로, 여기에는 설정 단계의
/// 파라미터 오류만 존재합니다.
#[derive(Debug, Error)]
pub enum IndicatorError {
    /// 잘못된 파라미터
    #[error("잘못된 파라미터: {0}")]
    InvalidParameter(String),
}

/// 지표 계산 결과 타입.
pub type IndicatorResult<T> = Result<T, IndicatorError>;

/// 이동평균 기간 묶음.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MovingAverageParams {
    /// 단기 SMA (기본: 20)
    pub sma_short: SmaParams,
    /// 중기 SMA (기본: 50)
    pub sma_medium: SmaParams,
    /// 장기 SMA (기본: 200)
    pub sma_long: SmaParams,
    /// 단기 EMA (기본: 12)
    pub ema_fast: EmaParams,
    /// 장기 EMA (기본: 26)
    pub ema_slow: EmaParams,
}

impl Default for MovingAverageParams {
    fn default() -> Self {
        Self {
            sma_short: SmaParams { period: 20 },
            sma_medium: SmaParams { period: 50 },
            sma_long: SmaParams { period: 200 },
            ema_fast: EmaParams { period: 12 },
            ema_slow: EmaParams { period: 26 },
        }
    }
}

/// 전체 지표 파라미터.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorParams {
    pub rsi: RsiParams,
    pub macd: MacdParams,
    pub bollinger: BollingerBandsParams,
    pub moving_averages: MovingAverageParams,
    /// 거래량 SMA (기본: 20)
    pub volume_sma: SmaParams,
    /// 샤프 비율용 연간 무위험 이자율
    pub risk_free_rate: f64,
}

impl Default for IndicatorParams {
    fn default() -> Self {
        Self {
            rsi: RsiParams::default(),
            macd: MacdParams::default(),
            bollinger: BollingerBandsParams::default(),
            moving_averages: MovingAverageParams::default(),
            volume_sma: SmaParams { period: 20 },
            risk_free_rate: DEFAULT_RISK_FREE_RATE,
        }
    }
}

impl IndicatorParams {
    /// 모든 파라미터를 검증합니다.
    pub fn validate(&self) -> IndicatorResult<()> {
        self.rsi.validate()?;
        self.macd.validate()?;
        self.bollinger.validate()?;

        let ma = &self.moving_averages;
        ma.sma_short.validate()?;
        ma.sma_medium.validate()?;
        ma.sma_long.validate()?;
        ma.ema_fast.validate()?;
        ma.ema_slow.validate()?;
        self.volume_sma.validate()?;

        if !self.risk_free_rate.is_finite() {
            return Err(IndicatorError::InvalidParameter(
                "무위험 이자율은 유한한 값이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 이동평균 시계열 묶음.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MovingAverages {
    pub sma_short: Vec<Option<f64>>,
    pub sma_medium: Vec<Option<f64>>,
    pub sma_long: Vec<Option<f64>>,
    pub ema_fast: Vec<Option<f64>>,
    pub ema_slow: Vec<Option<f64>>,
}

/// 가격 시계열에서 계산된 지표 묶음.
///
/// 모든 시점별 시계열은 입력 시계열과 같은 길이(`len`)를 가집니다.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSet {
    /// 입력 캔들 수
    pub len: usize,
    /// 마지막 종가
    pub last_close: Option<f64>,
    pub rsi: Vec<Option<f64>>,
    pub macd: MacdSeries,
    pub bollinger: BollingerBands,
    pub moving_averages: MovingAverages,
    /// 거래량 이동평균
    pub volume_sma: Vec<Option<f64>>,
    /// 스칼라 리스크 지표
    pub risk: RiskMetrics,
}

/// 시계열의 마지막 값. 비었거나 정의되지 않았으면 None.
pub fn latest(series: &[Option<f64>]) -> Option<f64> {
    series.last().copied().flatten()
}

impl IndicatorSet {
    /// 빈 지표 묶음.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn latest_rsi(&self) -> Option<f64> {
        latest(&self.rsi)
    }

    pub fn latest_macd(&self) -> Option<f64> {
        latest(&self.macd.macd)
    }

    pub fn latest_macd_signal(&self) -> Option<f64> {
        latest(&self.macd.signal)
    }

    pub fn latest_sma_short(&self) -> Option<f64> {
        latest(&self.moving_averages.sma_short)
    }

    pub fn latest_sma_medium(&self) -> Option<f64> {
        latest(&self.moving_averages.sma_medium)
    }

    pub fn latest_bollinger_upper(&self) -> Option<f64> {
        latest(&self.bollinger.upper)
    }

    pub fn latest_bollinger_lower(&self) -> Option<f64> {
        latest(&self.bollinger.lower)
    }
}

/// 통합 지표 엔진.
///
/// 검증된 파라미터로 생성되므로 계산 자체는 실패하지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    params: IndicatorParams,
}

impl IndicatorEngine {
    /// 새로운 지표 엔진 생성.
    ///
    /// # 에러
    /// 파라미터가 잘못되면 `IndicatorError::InvalidParameter`.
    pub fn new(params: IndicatorParams) -> IndicatorResult<Self> {
        params.validate()?;
        Ok(Self { params })
    }

    /// 사용 중인 파라미터.
    pub fn params(&self) -> &IndicatorParams {
        &self.params
    }

    // ==================== 개별 지표 ====================

    /// 단순 이동평균 (SMA) 계산.
    ///
    /// # 인자
    /// * `prices` - 가격 데이터
    /// * `params` - SMA 파라미터 (기간)
    pub fn sma(&self, prices: &[f64], params: SmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        params.validate()?;
        Ok(trend::sma(prices, params.period))
    }

    /// 지수 이동평균 (EMA) 계산.
    pub fn ema(&self, prices: &[f64], params: EmaParams) -> IndicatorResult<Vec<Option<f64>>> {
        params.validate()?;
        Ok(trend::ema(prices, params.period))
    }

    /// MACD 계산.
    pub fn macd(&self, prices: &[f64], params: MacdParams) -> IndicatorResult<MacdSeries> {
        params.validate()?;
        Ok(trend::macd(prices, &params))
    }

    /// RSI 계산.
    ///
    /// # 반환
    /// 0-100 사이의 RSI 값들 (처음 `period`개는 None)
    pub fn rsi(&self, prices: &[f64], params: RsiParams) -> IndicatorResult<Vec<Option<f64>>> {
        params.validate()?;
        Ok(momentum::rsi(prices, params.period))
    }

    /// 볼린저 밴드 계산.
    pub fn bollinger_bands(
        &self,
        prices: &[f64],
        params: BollingerBandsParams,
    ) -> IndicatorResult<BollingerBands> {
        params.validate()?;
        Ok(volatility::bollinger_bands(prices, &params))
    }

    // ==================== 전체 계산 ====================

    /// 시계열 하나에 대한 전체 지표를 계산합니다.
    ///
    /// 빈 시계열은 빈 지표 묶음을 반환합니다.
    pub fn compute(&self, series: &PriceSeries) -> IndicatorSet {
        if series.is_empty() {
            return IndicatorSet::empty();
        }

        let closes = series.closes();
        let volumes = series.volumes();
        let p = &self.params;
        let ma = &p.moving_averages;

        IndicatorSet {
            len: closes.len(),
            last_close: closes.last().copied(),
            rsi: momentum::rsi(&closes, p.rsi.period),
            macd: trend::macd(&closes, &p.macd),
            bollinger: volatility::bollinger_bands(&closes, &p.bollinger),
            moving_averages: MovingAverages {
                sma_short: trend::sma(&closes, ma.sma_short.period),
                sma_medium: trend::sma(&closes, ma.sma_medium.period),
                sma_long: trend::sma(&closes, ma.sma_long.period),
                ema_fast: trend::ema(&closes, ma.ema_fast.period),
                ema_slow: trend::ema(&closes, ma.ema_slow.period),
            },
            volume_sma: trend::sma(&volumes, p.volume_sma.period),
            risk: RiskMetrics::from_closes(&closes, p.risk_free_rate),
        }
    }
}

/// 기본 파라미터로 전체 지표를 계산합니다.
pub fn compute_indicators(series: &PriceSeries) -> IndicatorSet {
    IndicatorEngine::default().compute(series)
}
