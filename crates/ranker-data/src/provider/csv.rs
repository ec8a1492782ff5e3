//! CSV 디렉토리 데이터 소스.
//!
//! 디렉토리 구조:
//!
//! ```text
//! data/
//! ├── PETR4.SA.csv      # date,open,high,low,close,volume
//! ├── VALE3.SA.csv
//! └── metadata.json     # { "PETR4.SA": { "name": "...", "sector": "..." } }
//! ```
//!
//! 날짜는 `YYYY-MM-DD` 또는 RFC 3339 형식을 허용합니다. `open/high/low`가 없으면
//! 종가로, `volume`이 없거나 비어 있으면 0으로 채웁니다.

use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use ranker_core::{InstrumentId, InstrumentMetadata, Period, PriceBar, PriceSeries};
use rust_decimal::Decimal;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, instrument, warn};

use crate::error::{DataError, Result};
use crate::source::DataSource;

/// 메타데이터 파일 이름.
pub const METADATA_FILE: &str = "metadata.json";

/// CSV 파일 디렉토리 기반 데이터 소스.
#[derive(Debug, Clone)]
pub struct CsvDirectorySource {
    dir: PathBuf,
}

impl CsvDirectorySource {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// 데이터 디렉토리.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// 디렉토리의 모든 `.csv` 파일을 종목 식별자로 나열합니다 (정렬됨).
    pub async fn list_instruments(&self) -> Result<Vec<InstrumentId>> {
        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        let mut ids = Vec::new();

        while let Some(entry) = entries.next_entry().await? {
            if let Some(id) = csv_stem(&entry.path()).and_then(|s| InstrumentId::new(s).ok()) {
                ids.push(id);
            }
        }

        ids.sort();
        ids.dedup();
        Ok(ids)
    }

    /// 종목 파일 경로를 찾습니다. `<ID>.csv`가 없으면 파일 이름을
    /// 대소문자 구분 없이 비교해 `list_instruments`가 나열한 파일과 일치시킵니다.
    async fn resolve_file(&self, id: &InstrumentId) -> Result<PathBuf> {
        let exact = self.dir.join(format!("{}.csv", id));
        if tokio::fs::try_exists(&exact).await? {
            return Ok(exact);
        }

        let mut entries = tokio::fs::read_dir(&self.dir).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if csv_stem(&path).is_some_and(|stem| stem.trim().to_uppercase() == id.as_str()) {
                return Ok(path);
            }
        }

        Err(DataError::NotFound(format!(
            "{} ({})",
            id,
            self.dir.display()
        )))
    }

    async fn load_metadata_file(&self) -> Result<HashMap<InstrumentId, InstrumentMetadata>> {
        let path = self.dir.join(METADATA_FILE);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(HashMap::new());
        }

        let raw = tokio::fs::read_to_string(&path).await?;
        let parsed: HashMap<String, InstrumentMetadata> = serde_json::from_str(&raw)?;

        Ok(parsed
            .into_iter()
            .filter_map(|(key, meta)| InstrumentId::new(&key).ok().map(|id| (id, meta)))
            .collect())
    }
}

#[async_trait]
impl DataSource for CsvDirectorySource {
    fn name(&self) -> &str {
        "csv"
    }

    #[instrument(skip(self), fields(dir = %self.dir.display()))]
    async fn fetch_series(&self, id: &InstrumentId, period: Period) -> Result<PriceSeries> {
        let path = self.resolve_file(id).await?;
        let raw = tokio::fs::read_to_string(&path).await?;
        let series = parse_csv(&raw)?;

        if series.is_empty() {
            return Err(DataError::NotFound(format!("{}: 데이터 없음", id)));
        }

        let trimmed = series.tail(period.trading_days());
        debug!(
            identifier = %id,
            total = series.len(),
            kept = trimmed.len(),
            "CSV series loaded"
        );
        Ok(trimmed)
    }

    async fn fetch_metadata(&self, id: &InstrumentId) -> Result<Option<InstrumentMetadata>> {
        let mut all = self.load_metadata_file().await?;
        Ok(all.remove(id))
    }
}

/// `.csv` 확장자(대소문자 무시) 파일의 이름 부분.
fn csv_stem(path: &Path) -> Option<&str> {
    let is_csv = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("csv"));
    if !is_csv {
        return None;
    }
    path.file_stem().and_then(|s| s.to_str())
}

/// 헤더가 있는 OHLCV CSV 텍스트를 파싱합니다.
///
/// # 에러
///
/// 헤더에 `date`/`close` 열이 없거나 값이 숫자가 아니면 `ParseError`,
/// 타임스탬프 순서가 잘못되었으면 `InvalidData`를 반환합니다.
pub fn parse_csv(raw: &str) -> Result<PriceSeries> {
    let mut lines = raw.lines().filter(|l| !l.trim().is_empty());

    let header = match lines.next() {
        Some(h) => h,
        None => return Ok(PriceSeries::empty()),
    };
    let columns = CsvColumns::from_header(header)?;

    let mut bars = Vec::new();
    for (line_no, line) in lines.enumerate() {
        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let bar = columns.parse_row(&fields).map_err(|e| {
            DataError::ParseError(format!("line {}: {}", line_no + 2, e))
        })?;
        bars.push(bar);
    }

    Ok(PriceSeries::new(bars)?)
}

#[derive(Debug)]
struct CsvColumns {
    date: usize,
    open: Option<usize>,
    high: Option<usize>,
    low: Option<usize>,
    close: usize,
    volume: Option<usize>,
}

impl CsvColumns {
    fn from_header(header: &str) -> Result<Self> {
        let names: Vec<String> = header
            .split(',')
            .map(|h| h.trim().trim_start_matches('\u{feff}').to_lowercase())
            .collect();
        let find = |candidates: &[&str]| names.iter().position(|n| candidates.contains(&n.as_str()));

        let date = find(&["date", "timestamp", "datetime"])
            .ok_or_else(|| DataError::ParseError("missing date column".to_string()))?;
        let close = find(&["close", "adj close", "adj_close"])
            .ok_or_else(|| DataError::ParseError("missing close column".to_string()))?;

        Ok(Self {
            date,
            open: find(&["open"]),
            high: find(&["high"]),
            low: find(&["low"]),
            close,
            volume: find(&["volume"]),
        })
    }

    fn parse_row(&self, fields: &[&str]) -> std::result::Result<PriceBar, String> {
        let get = |idx: usize| -> std::result::Result<&str, String> {
            fields
                .get(idx)
                .copied()
                .ok_or_else(|| format!("missing column {}", idx))
        };

        let timestamp = parse_timestamp(get(self.date)?)?;
        let close = parse_decimal(get(self.close)?)?;
        let optional_price = |idx: Option<usize>| -> std::result::Result<Decimal, String> {
            match idx.and_then(|i| fields.get(i).copied()) {
                Some(v) if !v.is_empty() => parse_decimal(v),
                _ => Ok(close),
            }
        };

        let volume = match self.volume.and_then(|i| fields.get(i).copied()) {
            Some(v) if !v.is_empty() => parse_decimal(v)?,
            _ => Decimal::ZERO,
        };

        Ok(PriceBar::new(
            timestamp,
            optional_price(self.open)?,
            optional_price(self.high)?,
            optional_price(self.low)?,
            close,
            volume,
        ))
    }
}

fn parse_decimal(s: &str) -> std::result::Result<Decimal, String> {
    Decimal::from_str(s)
        .or_else(|_| Decimal::from_scientific(s))
        .map_err(|_| format!("invalid number: {}", s))
}

fn parse_timestamp(s: &str) -> std::result::Result<DateTime<Utc>, String> {
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(dt) = date.and_hms_opt(0, 0, 0) {
            return Ok(dt.and_utc());
        }
    }

    match DateTime::parse_from_rfc3339(s) {
        Ok(dt) => Ok(dt.with_timezone(&Utc)),
        Err(_) => {
            warn!(value = s, "Unrecognized date format");
            Err(format!("invalid date: {}. Expected YYYY-MM-DD", s))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ranker-data-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn csv_with_rows(n: usize) -> String {
        let mut out = String::from("date,open,high,low,close,volume\n");
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        for i in 0..n {
            let date = start + chrono::Duration::days(i as i64);
            let close = 100 + i;
            out.push_str(&format!(
                "{},{},{},{},{},1000\n",
                date.format("%Y-%m-%d"),
                close,
                close + 1,
                close - 1,
                close
            ));
        }
        out
    }

    #[test]
    fn test_parse_csv() {
        let series = parse_csv(&csv_with_rows(5)).unwrap();
        assert_eq!(series.len(), 5);
        assert_eq!(series.last_close(), Some(dec!(104)));
        assert_eq!(series.bars()[0].high, dec!(101));
    }

    #[test]
    fn test_parse_csv_minimal_columns() {
        let raw = "Date,Close\n2024-01-01,10.5\n2024-01-02T00:00:00Z,11\n";
        let series = parse_csv(raw).unwrap();
        assert_eq!(series.len(), 2);
        assert_eq!(series.bars()[0].open, dec!(10.5));
        assert_eq!(series.bars()[0].volume, Decimal::ZERO);
    }

    #[test]
    fn test_parse_csv_rejects_unordered_timestamps() {
        let raw = "date,close\n2024-01-02,10\n2024-01-01,11\n";
        assert!(matches!(parse_csv(raw), Err(DataError::InvalidData(_))));
    }

    #[test]
    fn test_parse_csv_rejects_bad_numbers() {
        let raw = "date,close\n2024-01-01,abc\n";
        assert!(matches!(parse_csv(raw), Err(DataError::ParseError(_))));

        let raw = "when,close\n2024-01-01,1\n";
        assert!(matches!(parse_csv(raw), Err(DataError::ParseError(_))));
    }

    #[tokio::test]
    async fn test_fetch_trims_to_period() {
        let dir = temp_dir("trim");
        std::fs::write(dir.join("ABC.csv"), csv_with_rows(40)).unwrap();

        let source = CsvDirectorySource::new(&dir);
        let id = InstrumentId::new("abc").unwrap();
        let series = source.fetch_series(&id, Period::OneMonth).await.unwrap();

        assert_eq!(series.len(), 21);
        assert_eq!(series.last_close(), Some(dec!(139)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_missing_file_is_not_found() {
        let dir = temp_dir("missing");
        let source = CsvDirectorySource::new(&dir);
        let id = InstrumentId::new("NOPE").unwrap();

        let err = source.fetch_series(&id, Period::OneYear).await.unwrap_err();
        assert!(matches!(err, DataError::NotFound(_)));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_list_instruments_and_metadata() {
        let dir = temp_dir("list");
        std::fs::write(dir.join("BBB.csv"), csv_with_rows(3)).unwrap();
        std::fs::write(dir.join("AAA.csv"), csv_with_rows(3)).unwrap();
        std::fs::write(dir.join("notes.txt"), "ignore me").unwrap();
        std::fs::write(
            dir.join(METADATA_FILE),
            r#"{ "aaa": { "name": "Alpha Corp", "sector": "Energy" } }"#,
        )
        .unwrap();

        let source = CsvDirectorySource::new(&dir);
        let ids = source.list_instruments().await.unwrap();
        let names: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(names, vec!["AAA", "BBB"]);

        let meta = source.fetch_metadata(&ids[0]).await.unwrap().unwrap();
        assert_eq!(meta.sector.as_deref(), Some("Energy"));
        assert!(source.fetch_metadata(&ids[1]).await.unwrap().is_none());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[tokio::test]
    async fn test_mixed_case_file_is_listed_and_loaded() {
        let dir = temp_dir("mixed-case");
        std::fs::write(dir.join("Petr4.csv"), csv_with_rows(30)).unwrap();
        std::fs::write(dir.join("vale3.CSV"), csv_with_rows(25)).unwrap();

        let source = CsvDirectorySource::new(&dir);
        let ids = source.list_instruments().await.unwrap();
        let names: Vec<&str> = ids.iter().map(|i| i.as_str()).collect();
        assert_eq!(names, vec!["PETR4", "VALE3"]);

        for id in &ids {
            let series = source.fetch_series(id, Period::OneYear).await.unwrap();
            assert!(!series.is_empty());
        }

        std::fs::remove_dir_all(&dir).ok();
    }
}
