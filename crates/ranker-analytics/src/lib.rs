//! 지표 계산, 신호 해석, 점수 계산 및 배치 랭킹 엔진.
//!
//! 이 크레이트는 다음을 제공합니다:
//! - 기술적 지표 (RSI, MACD, 볼린저 밴드, SMA/EMA, 리스크 지표)
//! - 지표 신호 해석 (과매수/과매도, 상승/하락)
//! - 5개 팩터 가중 점수와 등급
//! - 데이터 소스 기반 병렬 배치 랭킹
//!
//! # Re-exports
//!
//! - [`indicators`]: 지표 엔진 (IndicatorEngine, IndicatorSet 등)
//! - [`signals`]: 신호 해석 (interpret_signals, SignalLabel 등)
//! - [`scoring`]: 점수 계산 (InstrumentScorer, ScoreBreakdown 등)
//! - [`ranking`]: 배치 랭킹 (RankingOrchestrator, RankingTable 등)

pub mod indicators;
pub mod ranking;
pub mod scoring;
pub mod signals;

// Indicators 모듈 re-exports
pub use indicators::{
    compute_indicators,
    // 변동성 지표
    BollingerBands,
    BollingerBandsParams,
    EmaParams,
    IndicatorEngine,
    IndicatorError,
    IndicatorParams,
    IndicatorResult,
    IndicatorSet,
    MacdParams,
    MacdSeries,
    MovingAverageParams,
    MovingAverages,
    // 리스크 지표
    RiskMetrics,
    // 모멘텀 지표
    RsiParams,
    // 추세 지표
    SmaParams,
    DEFAULT_RISK_FREE_RATE,
    TRADING_DAYS_PER_YEAR,
};

// Signals 모듈 re-exports
pub use signals::{interpret_signals, IndicatorKind, SignalLabel, SignalMap};

// Scoring 모듈 re-exports
pub use scoring::{
    normalize, score_instrument, InstrumentScorer, RawMetrics, ScoreBreakdown, ScoringError,
    ScoringResult, SubScores, Tier, TrendDirection, MIN_HISTORY,
};

// Ranking 모듈 re-exports
pub use ranking::{
    rank_instruments, ProgressObserver, RankingEntry, RankingOrchestrator, RankingSummary,
    RankingTable, SkipReason, SkippedInstrument, DEFAULT_MAX_CONCURRENCY,
};
