//! 지표 신호 해석.
//!
//! 각 지표의 최신 값을 범주형 신호로 변환합니다. 최신 값이 정의되지 않은 지표는
//! 결과에서 빠집니다.
//!
//! | 지표 | 규칙 |
//! |------|------|
//! | RSI | < 30 과매도, > 70 과매수, 그 외 중립 |
//! | MACD | MACD > 시그널이면 상승, 아니면 하락 |
//! | 이동평균 | 단기 SMA > 중기 SMA면 상승, 아니면 하락 |
//! | 볼린저 밴드 | 종가 > 상단 과매수, 종가 < 하단 과매도, 그 외 중립 |

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

use crate::indicators::trend::is_fast_above_slow;
use crate::indicators::IndicatorSet;

/// RSI 과매도 기준.
pub const RSI_OVERSOLD: f64 = 30.0;
/// RSI 과매수 기준.
pub const RSI_OVERBOUGHT: f64 = 70.0;

/// 신호를 내는 지표 종류.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IndicatorKind {
    Rsi,
    Macd,
    MovingAverages,
    BollingerBands,
}

impl IndicatorKind {
    /// 표시용 이름.
    pub fn display_name(&self) -> &'static str {
        match self {
            IndicatorKind::Rsi => "RSI",
            IndicatorKind::Macd => "MACD",
            IndicatorKind::MovingAverages => "Moving Averages",
            IndicatorKind::BollingerBands => "Bollinger Bands",
        }
    }

    /// 지표와 신호 조합에 대한 설명.
    pub fn describe(&self, label: SignalLabel) -> &'static str {
        match (self, label) {
            (IndicatorKind::Rsi, SignalLabel::Oversold) => "Oversold - possible buy signal",
            (IndicatorKind::Rsi, SignalLabel::Overbought) => "Overbought - possible sell signal",
            (IndicatorKind::Macd, SignalLabel::Bullish) => "MACD above signal line - uptrend",
            (IndicatorKind::Macd, SignalLabel::Bearish) => "MACD below signal line - downtrend",
            (IndicatorKind::MovingAverages, SignalLabel::Bullish) => {
                "Short SMA above medium SMA - uptrend"
            }
            (IndicatorKind::MovingAverages, SignalLabel::Bearish) => {
                "Short SMA below medium SMA - downtrend"
            }
            (IndicatorKind::BollingerBands, SignalLabel::Overbought) => {
                "Close above upper band - overextended"
            }
            (IndicatorKind::BollingerBands, SignalLabel::Oversold) => {
                "Close below lower band - oversold"
            }
            (IndicatorKind::BollingerBands, SignalLabel::Neutral) => "Close inside the bands",
            _ => label.description(),
        }
    }
}

impl fmt::Display for IndicatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// 범주형 신호.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SignalLabel {
    Oversold,
    Overbought,
    Neutral,
    Bullish,
    Bearish,
}

impl SignalLabel {
    /// 일반 설명.
    pub fn description(&self) -> &'static str {
        match self {
            SignalLabel::Oversold => "Oversold",
            SignalLabel::Overbought => "Overbought",
            SignalLabel::Neutral => "Neutral",
            SignalLabel::Bullish => "Bullish",
            SignalLabel::Bearish => "Bearish",
        }
    }
}

impl fmt::Display for SignalLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.description())
    }
}

/// 지표별 신호 맵.
pub type SignalMap = BTreeMap<IndicatorKind, SignalLabel>;

/// 지표 묶음의 최신 값으로 신호를 해석합니다.
pub fn interpret_signals(set: &IndicatorSet) -> SignalMap {
    let mut signals = SignalMap::new();

    if let Some(rsi) = set.latest_rsi() {
        signals.insert(IndicatorKind::Rsi, rsi_signal(rsi));
    }

    if let Some(above) = is_fast_above_slow(set.latest_macd(), set.latest_macd_signal()) {
        signals.insert(IndicatorKind::Macd, crossover_signal(above));
    }

    if let Some(above) = is_fast_above_slow(set.latest_sma_short(), set.latest_sma_medium()) {
        signals.insert(IndicatorKind::MovingAverages, crossover_signal(above));
    }

    if let (Some(close), Some(upper), Some(lower)) = (
        set.last_close,
        set.latest_bollinger_upper(),
        set.latest_bollinger_lower(),
    ) {
        let label = if close > upper {
            SignalLabel::Overbought
        } else if close < lower {
            SignalLabel::Oversold
        } else {
            SignalLabel::Neutral
        };
        signals.insert(IndicatorKind::BollingerBands, label);
    }

    signals
}

fn crossover_signal(fast_above: bool) -> SignalLabel {
    if fast_above {
        SignalLabel::Bullish
    } else {
        SignalLabel::Bearish
    }
}

/// RSI 값을 신호로 변환합니다.
pub fn rsi_signal(rsi: f64) -> SignalLabel {
    if rsi < RSI_OVERSOLD {
        SignalLabel::Oversold
    } else if rsi > RSI_OVERBOUGHT {
        SignalLabel::Overbought
    } else {
        SignalLabel::Neutral
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::{compute_indicators, MacdSeries, MovingAverages};

    #[test]
    fn test_rsi_thresholds() {
        assert_eq!(rsi_signal(29.9), SignalLabel::Oversold);
        assert_eq!(rsi_signal(30.0), SignalLabel::Neutral);
        assert_eq!(rsi_signal(70.0), SignalLabel::Neutral);
        assert_eq!(rsi_signal(70.1), SignalLabel::Overbought);
    }

    #[test]
    fn test_undefined_indicators_are_omitted() {
        let set = IndicatorSet {
            len: 3,
            last_close: Some(10.0),
            rsi: vec![None, None, None],
            macd: MacdSeries {
                macd: vec![Some(0.0), Some(0.1), Some(0.2)],
                signal: vec![Some(0.0), Some(0.05), Some(0.1)],
                histogram: vec![Some(0.0), Some(0.05), Some(0.1)],
            },
            moving_averages: MovingAverages {
                sma_short: vec![None, None, Some(10.0)],
                sma_medium: vec![None, None, None],
                ..Default::default()
            },
            ..Default::default()
        };

        let signals = interpret_signals(&set);
        assert_eq!(signals.len(), 1);
        assert_eq!(signals.get(&IndicatorKind::Macd), Some(&SignalLabel::Bullish));
    }

    #[test]
    fn test_empty_set_has_no_signals() {
        assert!(interpret_signals(&IndicatorSet::empty()).is_empty());
    }

    #[test]
    fn test_bollinger_position() {
        let set = IndicatorSet {
            len: 1,
            last_close: Some(120.0),
            bollinger: crate::indicators::BollingerBands {
                upper: vec![Some(110.0)],
                middle: vec![Some(100.0)],
                lower: vec![Some(90.0)],
                percent_b: vec![Some(1.5)],
            },
            ..Default::default()
        };
        let signals = interpret_signals(&set);
        assert_eq!(
            signals.get(&IndicatorKind::BollingerBands),
            Some(&SignalLabel::Overbought)
        );
    }

    #[test]
    fn test_falling_series_signals() {
        use chrono::{Duration, TimeZone, Utc};
        use ranker_core::{PriceBar, PriceSeries};
        use rust_decimal::Decimal;

        let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let bars = (0..80)
            .map(|i| {
                PriceBar::flat(
                    start + Duration::days(i),
                    Decimal::from(500 - 3 * i),
                    Decimal::ONE,
                )
            })
            .collect();
        let set = compute_indicators(&PriceSeries::new(bars).unwrap());
        let signals = interpret_signals(&set);

        assert_eq!(signals.get(&IndicatorKind::Rsi), Some(&SignalLabel::Oversold));
        assert_eq!(signals.get(&IndicatorKind::Macd), Some(&SignalLabel::Bearish));
        assert_eq!(
            signals.get(&IndicatorKind::MovingAverages),
            Some(&SignalLabel::Bearish)
        );
        assert_eq!(
            IndicatorKind::Rsi.describe(SignalLabel::Oversold),
            "Oversold - possible buy signal"
        );
    }
}
