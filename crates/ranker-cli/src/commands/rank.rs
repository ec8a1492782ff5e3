//! CSV 디렉토리 배치 랭킹 명령.

use anyhow::{Context, Result};
use indicatif::{ProgressBar, ProgressStyle};
use std::path::PathBuf;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use ranker_analytics::{RankingOrchestrator, RankingTable};
use ranker_core::{AppConfig, InstrumentId, Period};
use ranker_data::{CachedDataSource, CsvDirectorySource};

use super::output::{fmt_opt, truncate, OutputFormat};

/// 랭킹 명령 설정.
#[derive(Debug, Clone)]
pub struct RankCliConfig {
    /// CSV 디렉토리
    pub dir: PathBuf,
    /// 쉼표로 구분된 종목 목록 (없으면 디렉토리 전체)
    pub symbols: Option<String>,
    pub period: Period,
    /// 최소 종합 점수
    pub min_score: Option<f64>,
    /// 섹터 필터
    pub sectors: Vec<String>,
    /// 상위 N개만 출력
    pub top: Option<usize>,
    /// 최대 동시 조회 수
    pub concurrency: usize,
    pub format: OutputFormat,
}

/// 배치 랭킹을 실행하고 결과를 출력합니다.
///
/// Ctrl-C가 들어오면 처리된 종목까지만 출력하고 미완료로 표시합니다.
pub async fn run_rank(config: RankCliConfig, app: &AppConfig) -> Result<RankingTable> {
    let csv = CsvDirectorySource::new(config.dir.clone());
    let ids = match &config.symbols {
        Some(raw) => InstrumentId::parse_list(raw),
        None => csv
            .list_instruments()
            .await
            .with_context(|| format!("Failed to list CSV files in {}", config.dir.display()))?,
    };

    if ids.is_empty() {
        anyhow::bail!("No instruments to rank in {}", config.dir.display());
    }

    let source = CachedDataSource::with_ttl(csv, Duration::from_secs(app.data.cache_ttl_secs));
    let orchestrator =
        RankingOrchestrator::from_config(source, app)?.with_max_concurrency(config.concurrency)?;

    info!(
        instruments = ids.len(),
        period = %config.period,
        dir = %config.dir.display(),
        "Ranking instruments"
    );

    let pb = ProgressBar::new(ids.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template(
                "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} {msg}",
            )?
            .progress_chars("#>-"),
    );

    let progress_bar = pb.clone();
    let progress = move |current: usize, _total: usize, identifier: &str| {
        progress_bar.set_position(current as u64);
        progress_bar.set_message(identifier.to_string());
    };

    let token = CancellationToken::new();
    let interrupt = token.clone();
    let ctrl_c = tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupt received, cancelling ranking run");
            interrupt.cancel();
        }
    });

    let table = orchestrator
        .rank_instruments_with_cancel(&ids, config.period, Some(&progress), token)
        .await;

    ctrl_c.abort();
    pb.finish_and_clear();

    let table = if config.min_score.is_some() || !config.sectors.is_empty() {
        table.filtered(config.min_score.unwrap_or(0.0), &config.sectors)
    } else {
        table
    };

    print_table(&table, config.top, config.format)?;
    Ok(table)
}

fn print_table(table: &RankingTable, top: Option<usize>, format: OutputFormat) -> Result<()> {
    match format {
        OutputFormat::Json => {
            let mut shown = table.clone();
            if let Some(n) = top {
                shown.entries.truncate(n);
            }
            println!("{}", serde_json::to_string_pretty(&shown)?);
        }
        OutputFormat::Table => println!("{}", format_table(table, top)),
    }
    Ok(())
}

/// 표 형식 출력.
pub fn format_table(table: &RankingTable, top: Option<usize>) -> String {
    let mut output = String::new();

    if !table.complete {
        output.push_str("⚠️  Run cancelled: partial results\n\n");
    }

    output.push_str(&format!(
        "{:<5} {:<10} {:<20} {:<14} {:>10} {:>7}  {:<16} {:>9} {:>7} {:>7} {:>6} {:<8}\n",
        "RANK", "SYMBOL", "NAME", "SECTOR", "CLOSE", "SCORE", "TIER", "RETURN%", "VOL%",
        "SHARPE", "RSI", "TREND"
    ));
    output.push_str(&"-".repeat(132));
    output.push('\n');

    let entries = match top {
        Some(n) => table.top(n),
        None => &table.entries,
    };

    for entry in entries {
        let b = &entry.breakdown;
        let metadata = entry.metadata();
        output.push_str(&format!(
            "{:<5} {:<10} {:<20} {:<14} {:>10} {:>7.2}  {:<16} {:>9.2} {:>7.2} {:>7.2} {:>6} {:<8}\n",
            entry.rank,
            truncate(entry.identifier.as_str(), 10),
            truncate(metadata.and_then(|m| m.name.as_deref()).unwrap_or("-"), 20),
            truncate(metadata.and_then(|m| m.sector.as_deref()).unwrap_or("-"), 14),
            entry.last_close.round_dp(2).to_string(),
            b.total,
            b.tier.to_string(),
            b.raw.total_return_pct,
            b.raw.volatility_pct,
            b.raw.sharpe_ratio,
            fmt_opt(b.raw.rsi, 1),
            b.trend_direction.to_string(),
        ));
    }

    if !table.skipped.is_empty() {
        output.push_str(&format!("\nSkipped ({}):\n", table.skipped.len()));
        for skipped in &table.skipped {
            output.push_str(&format!("  {}: {}\n", skipped.identifier, skipped.reason));
        }
    }

    let summary = table.summary();
    output.push('\n');
    output.push_str(&format!(
        "Ranked: {} / {}  |  Score ≥ 70: {:.1}%  |  Mean return: {:.2}%",
        summary.ranked, table.requested, summary.high_score_share_pct, summary.mean_return_pct
    ));
    if let (Some(best), Some(score)) = (&summary.best, summary.best_score) {
        output.push_str(&format!("  |  Best: {} ({:.2})", best, score));
    }
    output.push_str(&format!(
        "\nPeriod: {} ({})  |  Run: {}",
        table.period,
        table.period.label(),
        table.run_id
    ));

    output
}
