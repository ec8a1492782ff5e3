//! 종목 랭킹 CLI.
//!
//! # 사용 예시
//!
//! ```bash
//! # data/ 디렉토리의 모든 CSV 랭킹 (1년)
//! ranker rank --dir data
//!
//! # 일부 종목, 6개월, 70점 이상 에너지 섹터만 JSON으로
//! ranker rank --dir data --symbols PETR4,VALE3,ITUB4 --period 6mo \
//!     --min-score 70 --sector Energy --format json
//!
//! # 단일 파일 점수와 신호
//! ranker score --file data/PETR4.csv
//!
//! # 지원 기간 목록
//! ranker periods
//! ```

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::{Path, PathBuf};
use tracing::{error, info};

use ranker_cli::commands::rank::{run_rank, RankCliConfig};
use ranker_cli::commands::score::run_score;
use ranker_cli::OutputFormat;
use ranker_core::{init_logging, AppConfig, LogConfig, Period};

/// 설정 파일 기본 경로.
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Parser)]
#[command(name = "ranker")]
#[command(about = "Instrument scoring & ranking - 기술적 지표 기반 종목 랭킹", long_about = None)]
#[command(version)]
struct Cli {
    /// 설정 파일 (기본: config/default.toml, 없으면 내장 기본값)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// CSV 디렉토리의 종목 랭킹
    Rank {
        /// CSV 디렉토리 (기본: 설정의 data.csv_dir)
        #[arg(short, long)]
        dir: Option<PathBuf>,

        /// 종목 목록 (쉼표로 구분, 예: PETR4,VALE3)
        #[arg(short, long)]
        symbols: Option<String>,

        /// 분석 기간 (1mo, 3mo, 6mo, 1y, 2y, 5y)
        #[arg(short, long)]
        period: Option<String>,

        /// 최소 종합 점수
        #[arg(long)]
        min_score: Option<f64>,

        /// 섹터 필터 (여러 번 지정 가능)
        #[arg(long = "sector")]
        sectors: Vec<String>,

        /// 상위 N개만 출력
        #[arg(short, long)]
        top: Option<usize>,

        /// 최대 동시 조회 수 (기본: 설정의 ranking.max_concurrency)
        #[arg(short, long)]
        concurrency: Option<usize>,

        /// 출력 형식 (table, json)
        #[arg(short, long, default_value = "table")]
        format: String,
    },

    /// 단일 CSV 파일의 점수와 신호
    Score {
        /// OHLCV CSV 파일
        #[arg(short, long)]
        file: PathBuf,

        /// 출력 형식 (table, json)
        #[arg(long, default_value = "table")]
        format: String,
    },

    /// 지원 기간 목록
    Periods,
}

/// 설정을 로드합니다. 경로가 없고 기본 파일도 없으면 내장 기본값을 사용합니다.
fn load_config(path: Option<&Path>) -> Result<AppConfig> {
    match path {
        Some(path) => AppConfig::load(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
            AppConfig::load_default().context("Failed to load default config")
        }
        None => {
            let config = AppConfig::default();
            config.validate()?;
            Ok(config)
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    init_logging(LogConfig::from(&config.logging))
        .map_err(|e| anyhow::anyhow!("Failed to initialize logging: {}", e))?;

    match cli.command {
        Commands::Rank {
            dir,
            symbols,
            period,
            min_score,
            sectors,
            top,
            concurrency,
            format,
        } => {
            let period = match period {
                Some(p) => p.parse::<Period>().map_err(anyhow::Error::msg)?,
                None => config.ranking.default_period,
            };

            let rank_config = RankCliConfig {
                dir: dir.unwrap_or_else(|| PathBuf::from(&config.data.csv_dir)),
                symbols,
                period,
                min_score,
                sectors,
                top,
                concurrency: concurrency.unwrap_or(config.ranking.max_concurrency),
                format: OutputFormat::parse(&format)?,
            };

            match run_rank(rank_config, &config).await {
                Ok(table) => {
                    info!(
                        ranked = table.len(),
                        skipped = table.skipped.len(),
                        complete = table.complete,
                        "✅ Ranking finished"
                    );
                }
                Err(e) => {
                    error!("Ranking failed: {:#}", e);
                    return Err(e);
                }
            }
        }

        Commands::Score { file, format } => {
            let format = OutputFormat::parse(&format)?;
            if let Err(e) = run_score(&file, format, &config) {
                error!("Scoring failed: {:#}", e);
                return Err(e);
            }
        }

        Commands::Periods => {
            println!("{:<6} {:<8} {:>12}", "PERIOD", "LABEL", "TRADING DAYS");
            println!("{}", "-".repeat(28));
            for period in Period::ALL {
                println!(
                    "{:<6} {:<8} {:>12}",
                    period.as_str(),
                    period.label(),
                    period.trading_days()
                );
            }
        }
    }

    Ok(())
}
