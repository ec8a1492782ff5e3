//! 단일 CSV 파일 점수/신호 분석 명령.

use anyhow::{Context, Result};
use serde_json::json;
use std::path::Path;
use tracing::info;

use ranker_analytics::{interpret_signals, InstrumentScorer, ScoreBreakdown, SignalMap};
use ranker_core::AppConfig;
use ranker_data::provider::csv::parse_csv;

use super::output::{fmt_opt, OutputFormat};

/// 파일 하나의 점수와 신호를 계산해 출력합니다.
pub fn run_score(file: &Path, format: OutputFormat, app: &AppConfig) -> Result<ScoreBreakdown> {
    let raw = std::fs::read_to_string(file)
        .with_context(|| format!("Failed to read {}", file.display()))?;
    let series = parse_csv(&raw).with_context(|| format!("Failed to parse {}", file.display()))?;

    let identifier = file
        .file_stem()
        .map(|s| s.to_string_lossy().to_uppercase())
        .unwrap_or_default();

    let scorer = InstrumentScorer::new(&app.scoring)?;
    let breakdown = scorer
        .score(&series, None)
        .with_context(|| format!("Cannot score {}", identifier))?;
    let signals = interpret_signals(&scorer.engine().compute(&series));

    info!(
        identifier = %identifier,
        bars = series.len(),
        total = breakdown.total,
        "Instrument scored"
    );

    match format {
        OutputFormat::Json => {
            let value = json!({
                "identifier": identifier,
                "bars": series.len(),
                "breakdown": breakdown,
                "signals": signals,
            });
            println!("{}", serde_json::to_string_pretty(&value)?);
        }
        OutputFormat::Table => {
            println!("{}", format_breakdown(&identifier, &breakdown, &signals));
        }
    }

    Ok(breakdown)
}

/// 점수 상세 표 형식.
pub fn format_breakdown(identifier: &str, b: &ScoreBreakdown, signals: &SignalMap) -> String {
    let mut output = String::new();

    output.push_str(&format!(
        "{}  {:.2} / 100  {}  (trend: {}, color: {})\n\n",
        identifier,
        b.total,
        b.tier,
        b.trend_direction,
        b.color()
    ));

    output.push_str(&format!("{:<12} {:>8} {:>14}\n", "FACTOR", "SCORE", "RAW"));
    output.push_str(&"-".repeat(36));
    output.push('\n');

    let rows = [
        ("Return", b.sub_scores.total_return, format!("{:.2}%", b.raw.total_return_pct)),
        ("Volatility", b.sub_scores.volatility, format!("{:.2}%", b.raw.volatility_pct)),
        ("Sharpe", b.sub_scores.sharpe, format!("{:.2}", b.raw.sharpe_ratio)),
        (
            "Trend",
            b.sub_scores.trend,
            format!("{:.2}/{:.2}", b.raw.sma_short, b.raw.sma_medium),
        ),
        ("Momentum", b.sub_scores.momentum, fmt_opt(b.raw.rsi, 1)),
    ];
    for (name, score, raw) in rows {
        output.push_str(&format!("{:<12} {:>8.2} {:>14}\n", name, score, raw));
    }

    output.push_str(&format!("\nMax drawdown: {:.2}%\n", b.raw.max_drawdown_pct));

    output.push_str("\nSignals:\n");
    if signals.is_empty() {
        output.push_str("  (not enough history)\n");
    }
    for (kind, label) in signals {
        output.push_str(&format!(
            "  {:<16} {:<11} {}\n",
            kind.display_name(),
            label.to_string(),
            kind.describe(*label)
        ));
    }

    output
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use std::path::PathBuf;

    fn temp_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!(
            "ranker-cli-score-{}-{}",
            name,
            std::process::id()
        ));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_csv(dir: &Path, name: &str, closes: impl Iterator<Item = f64>) -> PathBuf {
        let start = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();
        let mut raw = String::from("date,open,high,low,close,volume\n");
        for (i, close) in closes.enumerate() {
            let date = start + chrono::Duration::days(i as i64);
            raw.push_str(&format!(
                "{},{c},{c},{c},{c},1000\n",
                date.format("%Y-%m-%d"),
                c = format!("{:.4}", close)
            ));
        }

        let path = dir.join(name);
        std::fs::write(&path, raw).unwrap();
        path
    }

    #[test]
    fn test_score_file() {
        let dir = temp_dir("up");
        let path = write_csv(&dir, "up.csv", (0..60).map(|i| 100.0 + i as f64 * 0.5));
        let breakdown = run_score(&path, OutputFormat::Json, &AppConfig::default()).unwrap();

        assert_eq!(breakdown.sub_scores.trend, 100.0);
        assert!((0.0..=100.0).contains(&breakdown.total));

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_short_file_fails() {
        let dir = temp_dir("short");
        let path = write_csv(&dir, "short.csv", (0..10).map(|i| 50.0 + i as f64));
        assert!(run_score(&path, OutputFormat::Table, &AppConfig::default()).is_err());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_format_breakdown_lists_signals() {
        let dir = temp_dir("down");
        let path = write_csv(&dir, "down.csv", (0..80).map(|i| 300.0 - i as f64 * 2.0));
        let raw = std::fs::read_to_string(&path).unwrap();
        let series = parse_csv(&raw).unwrap();
        let scorer = InstrumentScorer::default();
        let breakdown = scorer.score(&series, None).unwrap();
        let signals = interpret_signals(&scorer.engine().compute(&series));

        let text = format_breakdown("DOWN", &breakdown, &signals);
        assert!(text.starts_with("DOWN"));
        assert!(text.contains("RSI"));
        assert!(text.contains("Oversold"));

        std::fs::remove_dir_all(&dir).ok();
    }
}
