//! 가격 시계열 타입.
//!
//! - `PriceBar` - 일별 OHLCV 캔들
//! - `PriceSeries` - 한 종목의 시간순 캔들 시퀀스
//!
//! `PriceSeries`는 생성 시점에 불변식을 검증합니다. 타임스탬프는 엄격히 증가해야 하고
//! (중복 불가), 종가는 양수여야 합니다. 불변식을 어기는 시계열은 만들 수 없습니다.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{RankerError, RankerResult};
use crate::types::{decimal_to_f64, Price, Volume};

/// OHLCV 캔들 데이터.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBar {
    /// 캔들 시간
    pub timestamp: DateTime<Utc>,
    /// 시가
    pub open: Price,
    /// 고가
    pub high: Price,
    /// 저가
    pub low: Price,
    /// 종가
    pub close: Price,
    /// 거래량
    pub volume: Volume,
}

impl PriceBar {
    /// 새 캔들을 생성합니다.
    pub fn new(
        timestamp: DateTime<Utc>,
        open: Price,
        high: Price,
        low: Price,
        close: Price,
        volume: Volume,
    ) -> Self {
        Self {
            timestamp,
            open,
            high,
            low,
            close,
            volume,
        }
    }

    /// 시가/고가/저가/종가가 모두 같은 캔들을 생성합니다.
    pub fn flat(timestamp: DateTime<Utc>, close: Price, volume: Volume) -> Self {
        Self::new(timestamp, close, close, close, close, volume)
    }
}

/// 한 종목의 시간순 가격 시계열.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<PriceBar>", into = "Vec<PriceBar>")]
pub struct PriceSeries {
    bars: Vec<PriceBar>,
}

impl PriceSeries {
    /// 검증된 시계열을 생성합니다.
    ///
    /// # 에러
    ///
    /// 타임스탬프가 엄격히 증가하지 않거나 종가가 0 이하이면
    /// `RankerError::InvalidSeries`를 반환합니다.
    pub fn new(bars: Vec<PriceBar>) -> RankerResult<Self> {
        for (i, bar) in bars.iter().enumerate() {
            if bar.close <= Decimal::ZERO {
                return Err(RankerError::InvalidSeries(format!(
                    "{}번째 캔들의 종가가 양수가 아닙니다: {} ({})",
                    i, bar.close, bar.timestamp
                )));
            }
        }

        if let Some(pos) = bars
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(RankerError::InvalidSeries(format!(
                "타임스탬프가 엄격히 증가하지 않습니다: {} -> {}",
                bars[pos].timestamp,
                bars[pos + 1].timestamp
            )));
        }

        Ok(Self { bars })
    }

    /// 빈 시계열.
    pub fn empty() -> Self {
        Self::default()
    }

    /// 캔들 슬라이스.
    pub fn bars(&self) -> &[PriceBar] {
        &self.bars
    }

    /// 캔들 수.
    pub fn len(&self) -> usize {
        self.bars.len()
    }

    /// 비어 있는지 확인합니다.
    pub fn is_empty(&self) -> bool {
        self.bars.is_empty()
    }

    /// 첫 번째 캔들.
    pub fn first(&self) -> Option<&PriceBar> {
        self.bars.first()
    }

    /// 마지막 캔들.
    pub fn last(&self) -> Option<&PriceBar> {
        self.bars.last()
    }

    /// 마지막 종가.
    pub fn last_close(&self) -> Option<Price> {
        self.bars.last().map(|b| b.close)
    }

    /// 종가 시계열을 f64로 반환합니다.
    pub fn closes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| decimal_to_f64(b.close)).collect()
    }

    /// 거래량 시계열을 f64로 반환합니다.
    pub fn volumes(&self) -> Vec<f64> {
        self.bars.iter().map(|b| decimal_to_f64(b.volume)).collect()
    }

    /// 마지막 `n`개 캔들만 남긴 시계열을 반환합니다.
    ///
    /// 검증된 시계열의 접미사이므로 불변식이 유지됩니다.
    pub fn tail(&self, n: usize) -> Self {
        let start = self.bars.len().saturating_sub(n);
        Self {
            bars: self.bars[start..].to_vec(),
        }
    }
}

impl TryFrom<Vec<PriceBar>> for PriceSeries {
    type Error = RankerError;

    fn try_from(bars: Vec<PriceBar>) -> Result<Self, Self::Error> {
        Self::new(bars)
    }
}

impl From<PriceSeries> for Vec<PriceBar> {
    fn from(series: PriceSeries) -> Self {
        series.bars
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};
    use rust_decimal_macros::dec;

    fn day(n: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(n)
    }

    #[test]
    fn test_valid_series() {
        let bars = vec![
            PriceBar::flat(day(0), dec!(10), dec!(100)),
            PriceBar::flat(day(1), dec!(11), dec!(200)),
            PriceBar::flat(day(2), dec!(12), dec!(300)),
        ];
        let series = PriceSeries::new(bars).unwrap();

        assert_eq!(series.len(), 3);
        assert_eq!(series.last_close(), Some(dec!(12)));
        assert_eq!(series.closes(), vec![10.0, 11.0, 12.0]);
        assert_eq!(series.volumes(), vec![100.0, 200.0, 300.0]);
    }

    #[test]
    fn test_empty_series_is_valid() {
        let series = PriceSeries::new(Vec::new()).unwrap();
        assert!(series.is_empty());
        assert_eq!(series.last_close(), None);
    }

    #[test]
    fn test_duplicate_timestamp_rejected() {
        let bars = vec![
            PriceBar::flat(day(0), dec!(10), dec!(1)),
            PriceBar::flat(day(0), dec!(11), dec!(1)),
        ];
        assert!(matches!(
            PriceSeries::new(bars),
            Err(RankerError::InvalidSeries(_))
        ));
    }

    #[test]
    fn test_unordered_timestamp_rejected() {
        let bars = vec![
            PriceBar::flat(day(1), dec!(10), dec!(1)),
            PriceBar::flat(day(0), dec!(11), dec!(1)),
        ];
        assert!(PriceSeries::new(bars).is_err());
    }

    #[test]
    fn test_non_positive_close_rejected() {
        let bars = vec![
            PriceBar::flat(day(0), dec!(10), dec!(1)),
            PriceBar::flat(day(1), dec!(0), dec!(1)),
        ];
        assert!(PriceSeries::new(bars).is_err());
    }

    #[test]
    fn test_tail() {
        let bars: Vec<_> = (0..10)
            .map(|i| PriceBar::flat(day(i), Decimal::from(10 + i), dec!(1)))
            .collect();
        let series = PriceSeries::new(bars).unwrap();

        let tail = series.tail(3);
        assert_eq!(tail.len(), 3);
        assert_eq!(tail.first().unwrap().close, dec!(17));
        assert_eq!(series.tail(100).len(), 10);
    }

    #[test]
    fn test_deserialize_validates() {
        let json = r#"[
            {"timestamp":"2024-01-02T00:00:00Z","open":"1","high":"1","low":"1","close":"1","volume":"1"},
            {"timestamp":"2024-01-01T00:00:00Z","open":"1","high":"1","low":"1","close":"1","volume":"1"}
        ]"#;
        assert!(serde_json::from_str::<PriceSeries>(json).is_err());
    }
}
