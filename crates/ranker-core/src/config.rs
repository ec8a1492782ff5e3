//! 설정 관리.
//!
//! 애플리케이션 설정을 정의하고 로드합니다. 모든 섹션은 기본값을 가지며,
//! 파일(TOML 등)과 `RANKER__` 접두사 환경 변수로 덮어쓸 수 있습니다.
//!
//! 점수 가중치처럼 잘못되면 결과 전체가 왜곡되는 값은 [`AppConfig::validate`]에서
//! 즉시 거부합니다.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::{RankerError, RankerResult};
use crate::types::Period;

/// 가중치 합계 허용 오차.
pub const WEIGHT_SUM_TOLERANCE: f64 = 1e-9;

/// 애플리케이션 설정.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct AppConfig {
    /// 로깅 설정
    #[serde(default)]
    pub logging: LoggingConfig,
    /// 점수 계산 설정
    #[serde(default)]
    pub scoring: ScoringConfig,
    /// 배치 랭킹 설정
    #[serde(default)]
    pub ranking: RankingConfig,
    /// 데이터 소스 설정
    #[serde(default)]
    pub data: DataConfig,
}

/// 로깅 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    /// 로그 레벨
    pub level: String,
    /// 로그 형식 (pretty, json, compact)
    pub format: String,
    /// span 진입/종료 이벤트 출력
    #[serde(default)]
    pub span_events: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: "compact".to_string(),
            span_events: false,
        }
    }
}

/// 5개 팩터 가중치 (합계 = 1.0).
#[derive(Debug, Clone, Copy, PartialEq, Deserialize, Serialize)]
pub struct ScoringWeights {
    /// 기간 수익률
    pub total_return: f64,
    /// 변동성 (낮을수록 좋음)
    pub volatility: f64,
    /// 샤프 비율
    pub sharpe: f64,
    /// 추세 (이동평균 대비 위치)
    pub trend: f64,
    /// 모멘텀 (RSI 밴드)
    pub momentum: f64,
}

impl Default for ScoringWeights {
    fn default() -> Self {
        Self {
            total_return: 0.30,
            volatility: 0.20,
            sharpe: 0.20,
            trend: 0.15,
            momentum: 0.15,
        }
    }
}

impl ScoringWeights {
    fn as_array(&self) -> [f64; 5] {
        [
            self.total_return,
            self.volatility,
            self.sharpe,
            self.trend,
            self.momentum,
        ]
    }

    /// 가중치 합계.
    pub fn sum(&self) -> f64 {
        self.as_array().iter().sum()
    }

    /// 가중치 검증.
    ///
    /// 모든 가중치는 유한한 0 이상의 값이어야 하고 합계는 1.0(±1e-9)이어야 합니다.
    pub fn validate(&self) -> RankerResult<()> {
        if self.as_array().iter().any(|w| !w.is_finite() || *w < 0.0) {
            return Err(RankerError::Config(format!(
                "가중치는 0 이상의 유한한 값이어야 합니다: {:?}",
                self
            )));
        }

        let sum = self.sum();
        if (sum - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
            return Err(RankerError::Config(format!(
                "가중치 합계가 1.0이 아닙니다: {}",
                sum
            )));
        }

        Ok(())
    }
}

/// 점수 계산 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScoringConfig {
    /// 팩터 가중치
    #[serde(default)]
    pub weights: ScoringWeights,
    /// 연간 무위험 이자율 (0.10 = 10%)
    #[serde(default = "default_risk_free_rate")]
    pub risk_free_rate: f64,
    /// 점수 계산에 필요한 최소 캔들 수
    #[serde(default = "default_min_history")]
    pub min_history: usize,
}

fn default_risk_free_rate() -> f64 {
    0.10
}
fn default_min_history() -> usize {
    20
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: ScoringWeights::default(),
            risk_free_rate: default_risk_free_rate(),
            min_history: default_min_history(),
        }
    }
}

impl ScoringConfig {
    /// 점수 설정 검증.
    pub fn validate(&self) -> RankerResult<()> {
        self.weights.validate()?;

        if !self.risk_free_rate.is_finite() {
            return Err(RankerError::Config(
                "무위험 이자율은 유한한 값이어야 합니다".to_string(),
            ));
        }
        if self.min_history < 2 {
            return Err(RankerError::Config(format!(
                "최소 캔들 수는 2 이상이어야 합니다: {}",
                self.min_history
            )));
        }

        Ok(())
    }
}

/// 배치 랭킹 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RankingConfig {
    /// 동시에 조회할 최대 종목 수
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,
    /// 기본 분석 기간
    #[serde(default)]
    pub default_period: Period,
}

fn default_max_concurrency() -> usize {
    5
}

impl Default for RankingConfig {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            default_period: Period::default(),
        }
    }
}

impl RankingConfig {
    /// 랭킹 설정 검증.
    pub fn validate(&self) -> RankerResult<()> {
        if self.max_concurrency == 0 {
            return Err(RankerError::Config(
                "max_concurrency는 1 이상이어야 합니다".to_string(),
            ));
        }
        Ok(())
    }
}

/// 데이터 소스 설정.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DataConfig {
    /// CSV 파일 디렉토리
    pub csv_dir: String,
    /// 조회 결과 캐시 TTL (초)
    pub cache_ttl_secs: u64,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            csv_dir: "data".to_string(),
            cache_ttl_secs: 3600,
        }
    }
}

impl AppConfig {
    /// 파일과 환경 변수에서 설정을 로드합니다.
    ///
    /// 우선순위: 환경 변수(`RANKER__SCORING__RISK_FREE_RATE` 등) > 파일 > 기본값.
    pub fn load<P: AsRef<Path>>(path: P) -> RankerResult<Self> {
        let config = config::Config::builder()
            .add_source(config::Config::try_from(&AppConfig::default())?)
            .add_source(config::File::from(path.as_ref()))
            .add_source(
                config::Environment::with_prefix("RANKER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let app: AppConfig = config.try_deserialize()?;
        app.validate()?;
        Ok(app)
    }

    /// 기본 경로(`config/default.toml`)에서 설정을 로드합니다.
    pub fn load_default() -> RankerResult<Self> {
        Self::load("config/default.toml")
    }

    /// 전체 설정 검증.
    pub fn validate(&self) -> RankerResult<()> {
        self.scoring.validate()?;
        self.ranking.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_weights_sum_to_one() {
        let weights = ScoringWeights::default();
        assert!((weights.sum() - 1.0).abs() <= WEIGHT_SUM_TOLERANCE);
        assert!(weights.validate().is_ok());
    }

    #[test]
    fn test_weights_not_summing_to_one_rejected() {
        let weights = ScoringWeights {
            total_return: 0.40,
            ..Default::default()
        };
        assert!(matches!(weights.validate(), Err(RankerError::Config(_))));
    }

    #[test]
    fn test_negative_weight_rejected() {
        let weights = ScoringWeights {
            total_return: 0.60,
            volatility: -0.10,
            ..Default::default()
        };
        assert!(weights.validate().is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let ranking = RankingConfig {
            max_concurrency: 0,
            ..Default::default()
        };
        assert!(ranking.validate().is_err());
    }

    #[test]
    fn test_default_config_is_valid() {
        let config = AppConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.ranking.max_concurrency, 5);
        assert_eq!(config.ranking.default_period, Period::OneYear);
        assert!((config.scoring.risk_free_rate - 0.10).abs() < f64::EPSILON);
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let toml = r#"
            [scoring]
            risk_free_rate = 0.05

            [ranking]
            max_concurrency = 3
        "#;
        let config: AppConfig = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()
            .unwrap()
            .try_deserialize()
            .unwrap();

        assert_eq!(config.ranking.max_concurrency, 3);
        assert!((config.scoring.risk_free_rate - 0.05).abs() < f64::EPSILON);
        assert_eq!(config.scoring.weights, ScoringWeights::default());
        assert_eq!(config.data.cache_ttl_secs, 3600);
    }
}
