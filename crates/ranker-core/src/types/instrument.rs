//! 종목 식별자 및 메타데이터.
//!
//! - `InstrumentId` - 정규화된 종목 식별자 (예: `PETR4.SA`, `AAPL`)
//! - `InstrumentMetadata` - 호스트가 제공하는 설명 정보 (이름, 섹터, 통화)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::RankerError;

/// 정규화된 종목 식별자.
///
/// 앞뒤 공백을 제거하고 대문자로 변환합니다. 빈 식별자는 만들 수 없습니다.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct InstrumentId(String);

impl InstrumentId {
    /// 새 식별자를 생성합니다.
    ///
    /// # 에러
    ///
    /// 공백만 있는 문자열이면 `RankerError::InvalidInput`을 반환합니다.
    pub fn new(raw: impl AsRef<str>) -> Result<Self, RankerError> {
        let normalized = raw.as_ref().trim().to_uppercase();
        if normalized.is_empty() {
            return Err(RankerError::InvalidInput(
                "종목 식별자가 비어 있습니다".to_string(),
            ));
        }
        Ok(Self(normalized))
    }

    /// 식별자 문자열을 반환합니다.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// 쉼표로 구분된 목록을 파싱합니다 (빈 항목은 무시).
    pub fn parse_list(raw: &str) -> Vec<Self> {
        raw.split(',').filter_map(|s| Self::new(s).ok()).collect()
    }
}

impl fmt::Display for InstrumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for InstrumentId {
    type Err = RankerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for InstrumentId {
    type Error = RankerError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<InstrumentId> for String {
    fn from(id: InstrumentId) -> Self {
        id.0
    }
}

impl AsRef<str> for InstrumentId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// 종목 메타데이터.
///
/// 표시용 정보일 뿐 점수 계산에는 영향을 주지 않습니다.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct InstrumentMetadata {
    /// 종목명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// 섹터
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sector: Option<String>,
    /// 통화 (예: BRL, USD)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

impl InstrumentMetadata {
    /// 이름만 가진 메타데이터를 생성합니다.
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Default::default()
        }
    }

    /// 섹터를 설정합니다.
    pub fn with_sector(mut self, sector: impl Into<String>) -> Self {
        self.sector = Some(sector.into());
        self
    }

    /// 통화를 설정합니다.
    pub fn with_currency(mut self, currency: impl Into<String>) -> Self {
        self.currency = Some(currency.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_instrument_id_normalized() {
        let id = InstrumentId::new("  petr4.sa ").unwrap();
        assert_eq!(id.as_str(), "PETR4.SA");
        assert_eq!(id.to_string(), "PETR4.SA");
    }

    #[test]
    fn test_empty_instrument_id_rejected() {
        assert!(InstrumentId::new("   ").is_err());
        assert!("".parse::<InstrumentId>().is_err());
    }

    #[test]
    fn test_parse_list_skips_blanks() {
        let ids = InstrumentId::parse_list("vale3.sa, ,itub4.sa,");
        assert_eq!(ids.len(), 2);
        assert_eq!(ids[0].as_str(), "VALE3.SA");
        assert_eq!(ids[1].as_str(), "ITUB4.SA");
    }

    #[test]
    fn test_instrument_id_serde() {
        let id = InstrumentId::new("aapl").unwrap();
        let json = serde_json::to_string(&id).unwrap();
        assert_eq!(json, "\"AAPL\"");

        let parsed: InstrumentId = serde_json::from_str("\" msft \"").unwrap();
        assert_eq!(parsed.as_str(), "MSFT");
        assert!(serde_json::from_str::<InstrumentId>("\"\"").is_err());
    }

    #[test]
    fn test_metadata_builder() {
        let meta = InstrumentMetadata::named("Petrobras")
            .with_sector("Energy")
            .with_currency("BRL");
        assert_eq!(meta.name.as_deref(), Some("Petrobras"));
        assert_eq!(meta.sector.as_deref(), Some("Energy"));
        assert_eq!(meta.currency.as_deref(), Some("BRL"));
    }
}
