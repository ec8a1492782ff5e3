//! 분석 기간 정의.
//!
//! 데이터 소스에 전달되는 조회 기간입니다. 문자열 표기(`1mo`, `1y` 등)로
//! 파싱/출력되며, 대략적인 거래일 수를 제공합니다.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// 조회 기간.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Period {
    /// 1개월
    #[serde(rename = "1mo")]
    OneMonth,
    /// 3개월
    #[serde(rename = "3mo")]
    ThreeMonths,
    /// 6개월
    #[serde(rename = "6mo")]
    SixMonths,
    /// 1년
    #[default]
    #[serde(rename = "1y")]
    OneYear,
    /// 2년
    #[serde(rename = "2y")]
    TwoYears,
    /// 5년
    #[serde(rename = "5y")]
    FiveYears,
}

impl Period {
    /// 지원하는 모든 기간.
    pub const ALL: [Period; 6] = [
        Period::OneMonth,
        Period::ThreeMonths,
        Period::SixMonths,
        Period::OneYear,
        Period::TwoYears,
        Period::FiveYears,
    ];

    /// 대략적인 거래일 수를 반환합니다.
    pub fn trading_days(&self) -> usize {
        match self {
            Period::OneMonth => 21,
            Period::ThreeMonths => 63,
            Period::SixMonths => 126,
            Period::OneYear => 252,
            Period::TwoYears => 504,
            Period::FiveYears => 1260,
        }
    }

    /// 문자열 표기를 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Period::OneMonth => "1mo",
            Period::ThreeMonths => "3mo",
            Period::SixMonths => "6mo",
            Period::OneYear => "1y",
            Period::TwoYears => "2y",
            Period::FiveYears => "5y",
        }
    }

    /// 사람이 읽기 쉬운 설명.
    pub fn label(&self) -> &'static str {
        match self {
            Period::OneMonth => "1개월",
            Period::ThreeMonths => "3개월",
            Period::SixMonths => "6개월",
            Period::OneYear => "1년",
            Period::TwoYears => "2년",
            Period::FiveYears => "5년",
        }
    }
}

impl fmt::Display for Period {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Period {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "1mo" => Ok(Period::OneMonth),
            "3mo" => Ok(Period::ThreeMonths),
            "6mo" => Ok(Period::SixMonths),
            "1y" => Ok(Period::OneYear),
            "2y" => Ok(Period::TwoYears),
            "5y" => Ok(Period::FiveYears),
            _ => Err(format!("Unknown period: {}", s)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_period_round_trip_strings() {
        for period in Period::ALL {
            assert_eq!(period.as_str().parse::<Period>().unwrap(), period);
        }
        assert!("10y".parse::<Period>().is_err());
    }

    #[test]
    fn test_trading_days() {
        assert_eq!(Period::OneMonth.trading_days(), 21);
        assert_eq!(Period::OneYear.trading_days(), 252);
        assert_eq!(Period::FiveYears.trading_days(), 1260);
    }

    #[test]
    fn test_period_serde_uses_short_form() {
        assert_eq!(serde_json::to_string(&Period::SixMonths).unwrap(), "\"6mo\"");
        let parsed: Period = serde_json::from_str("\"2y\"").unwrap();
        assert_eq!(parsed, Period::TwoYears);
    }
}
