//! 배치 랭킹 오케스트레이터.
//!
//! 종목 목록을 받아 데이터 소스에서 시계열을 가져오고, 점수를 계산한 뒤
//! 종합 점수 내림차순으로 순위를 매깁니다.
//!
//! # 처리 흐름
//!
//! 1. 종목별 조회 + 점수 계산을 `buffer_unordered`로 병렬 실행 (기본 최대 5개)
//! 2. 조회 실패 또는 데이터 부족 종목은 건너뜀 (경고 로그, 재시도 없음)
//! 3. 모든 작업이 끝나거나 취소되면 한 번에 모아서 정렬
//! 4. (종합 점수 내림차순, 입력 순서 오름차순)으로 정렬 후 1부터 순위 부여
//!
//! 완료 순서와 관계없이 결과는 점수와 입력 순서만으로 결정됩니다.

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use ranker_core::{
    AppConfig, InstrumentId, InstrumentMetadata, Period, RankerError, RankerResult,
};
use ranker_data::{DataError, DataSource};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn, Instrument};
use uuid::Uuid;

use crate::scoring::{InstrumentScorer, ScoreBreakdown, ScoringError};

/// 기본 최대 동시 조회 수.
pub const DEFAULT_MAX_CONCURRENCY: usize = 5;

/// 고득점 기준 (요약 통계용).
pub const HIGH_SCORE_THRESHOLD: f64 = 70.0;

/// 진행 상황 수신자.
///
/// 종목 하나가 처리될 때마다 `(current, total, identifier)`로 호출됩니다.
/// `current`는 1부터 단조 증가합니다. 구현체는 블로킹하면 안 됩니다.
pub trait ProgressObserver: Send + Sync {
    fn on_progress(&self, current: usize, total: usize, identifier: &str);
}

impl<F> ProgressObserver for F
where
    F: Fn(usize, usize, &str) + Send + Sync,
{
    fn on_progress(&self, current: usize, total: usize, identifier: &str) {
        self(current, total, identifier)
    }
}

/// 종목을 건너뛴 이유.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum SkipReason {
    /// 조회 실패 또는 빈 시계열
    DataUnavailable { message: String },
    /// 점수 계산에 필요한 캔들 수 부족
    InsufficientHistory { required: usize, provided: usize },
}

impl std::fmt::Display for SkipReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SkipReason::DataUnavailable { message } => write!(f, "data unavailable: {}", message),
            SkipReason::InsufficientHistory { required, provided } => write!(
                f,
                "insufficient history: {} bars required, {} provided",
                required, provided
            ),
        }
    }
}

impl From<DataError> for SkipReason {
    fn from(err: DataError) -> Self {
        SkipReason::DataUnavailable {
            message: err.to_string(),
        }
    }
}

impl From<ScoringError> for SkipReason {
    fn from(err: ScoringError) -> Self {
        match err {
            ScoringError::InsufficientHistory { required, provided } => {
                SkipReason::InsufficientHistory { required, provided }
            }
            other => SkipReason::DataUnavailable {
                message: other.to_string(),
            },
        }
    }
}

/// 건너뛴 종목.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SkippedInstrument {
    pub identifier: InstrumentId,
    pub reason: SkipReason,
}

/// 랭킹 항목.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingEntry {
    /// 1부터 시작하는 순위
    pub rank: usize,
    pub identifier: InstrumentId,
    /// 마지막 종가
    pub last_close: Decimal,
    pub breakdown: ScoreBreakdown,
}

impl RankingEntry {
    pub fn total(&self) -> f64 {
        self.breakdown.total
    }

    pub fn metadata(&self) -> Option<&InstrumentMetadata> {
        self.breakdown.metadata.as_ref()
    }

    fn sector(&self) -> Option<&str> {
        self.metadata().and_then(|m| m.sector.as_deref())
    }
}

/// 랭킹 결과 요약.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingSummary {
    /// 순위가 매겨진 종목 수
    pub ranked: usize,
    /// 종합 점수 70 이상 비율 (%)
    pub high_score_share_pct: f64,
    /// 평균 기간 수익률 (%)
    pub mean_return_pct: f64,
    /// 1위 종목
    pub best: Option<InstrumentId>,
    pub best_score: Option<f64>,
}

/// 배치 랭킹 결과.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankingTable {
    pub run_id: Uuid,
    pub generated_at: DateTime<Utc>,
    pub period: Period,
    /// 요청된 종목 수
    pub requested: usize,
    /// 순위순 항목
    pub entries: Vec<RankingEntry>,
    /// 건너뛴 종목 (입력 순서)
    pub skipped: Vec<SkippedInstrument>,
    /// 취소되면 false
    pub complete: bool,
}

impl RankingTable {
    fn new(period: Period, requested: usize) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            generated_at: Utc::now(),
            period,
            requested,
            entries: Vec::new(),
            skipped: Vec::new(),
            complete: true,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// 상위 `n`개 항목.
    pub fn top(&self, n: usize) -> &[RankingEntry] {
        &self.entries[..n.min(self.entries.len())]
    }

    /// 조건에 맞는 항목만 남기고 순위를 다시 매긴 랭킹을 반환합니다.
    ///
    /// # 인자
    /// * `min_score` - 최소 종합 점수 (포함)
    /// * `sectors` - 허용 섹터 목록. 비어 있으면 섹터 필터 없음 (대소문자 무시)
    pub fn filtered(&self, min_score: f64, sectors: &[String]) -> RankingTable {
        let entries = self
            .entries
            .iter()
            .filter(|e| e.total() >= min_score)
            .filter(|e| {
                sectors.is_empty()
                    || e.sector()
                        .is_some_and(|s| sectors.iter().any(|f| f.eq_ignore_ascii_case(s)))
            })
            .cloned()
            .enumerate()
            .map(|(i, mut e)| {
                e.rank = i + 1;
                e
            })
            .collect();

        RankingTable {
            entries,
            ..self.clone()
        }
    }

    /// 요약 통계.
    pub fn summary(&self) -> RankingSummary {
        let ranked = self.entries.len();
        if ranked == 0 {
            return RankingSummary {
                ranked,
                high_score_share_pct: 0.0,
                mean_return_pct: 0.0,
                best: None,
                best_score: None,
            };
        }

        let high = self
            .entries
            .iter()
            .filter(|e| e.total() >= HIGH_SCORE_THRESHOLD)
            .count();
        let mean_return = self
            .entries
            .iter()
            .map(|e| e.breakdown.raw.total_return_pct)
            .sum::<f64>()
            / ranked as f64;

        RankingSummary {
            ranked,
            high_score_share_pct: high as f64 / ranked as f64 * 100.0,
            mean_return_pct: mean_return,
            best: self.entries.first().map(|e| e.identifier.clone()),
            best_score: self.entries.first().map(RankingEntry::total),
        }
    }
}

/// 종목 하나의 처리 결과.
enum Outcome {
    Scored {
        last_close: Decimal,
        breakdown: ScoreBreakdown,
    },
    Skipped(SkipReason),
}

/// 배치 랭킹 오케스트레이터.
pub struct RankingOrchestrator<S: DataSource> {
    source: S,
    scorer: InstrumentScorer,
    max_concurrency: usize,
}

impl<S: DataSource> RankingOrchestrator<S> {
    /// 기본 점수 계산기와 동시성으로 생성합니다.
    pub fn new(source: S) -> Self {
        Self {
            source,
            scorer: InstrumentScorer::default(),
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }

    /// 설정에서 생성합니다.
    ///
    /// # 에러
    /// 가중치나 동시성 설정이 잘못되면 `RankerError::Config`.
    pub fn from_config(source: S, config: &AppConfig) -> RankerResult<Self> {
        let scorer = InstrumentScorer::new(&config.scoring)
            .map_err(|e| RankerError::Config(e.to_string()))?;
        Self::new(source)
            .with_scorer(scorer)
            .with_max_concurrency(config.ranking.max_concurrency)
    }

    pub fn with_scorer(mut self, scorer: InstrumentScorer) -> Self {
        self.scorer = scorer;
        self
    }

    /// 최대 동시 조회 수를 설정합니다 (1 이상).
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> RankerResult<Self> {
        if max_concurrency == 0 {
            return Err(RankerError::Config(
                "max_concurrency는 1 이상이어야 합니다".to_string(),
            ));
        }
        self.max_concurrency = max_concurrency;
        Ok(self)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn scorer(&self) -> &InstrumentScorer {
        &self.scorer
    }

    pub fn max_concurrency(&self) -> usize {
        self.max_concurrency
    }

    /// 종목 목록의 랭킹을 계산합니다.
    ///
    /// 실패한 종목은 `skipped`에 기록되며, 성공한 종목이 없어도 에러가 아닙니다.
    pub async fn rank_instruments(
        &self,
        identifiers: &[InstrumentId],
        period: Period,
        progress: Option<&dyn ProgressObserver>,
    ) -> RankingTable {
        self.rank_instruments_with_cancel(identifiers, period, progress, CancellationToken::new())
            .await
    }

    /// 취소 가능한 랭킹 계산.
    ///
    /// 토큰이 취소되면 이미 처리된 종목만으로 랭킹을 만들고 `complete = false`로 표시합니다.
    pub async fn rank_instruments_with_cancel(
        &self,
        identifiers: &[InstrumentId],
        period: Period,
        progress: Option<&dyn ProgressObserver>,
        cancel: CancellationToken,
    ) -> RankingTable {
        let started = Instant::now();
        let total = identifiers.len();
        let mut table = RankingTable::new(period, total);

        info!(
            run_id = %table.run_id,
            requested = total,
            period = %period,
            source = self.source.name(),
            max_concurrency = self.max_concurrency,
            "Ranking run started"
        );

        let mut tasks = stream::iter(identifiers.iter().enumerate().map(|(index, id)| {
            let span = ranker_core::ranking_span!("rank_instrument", id, period);
            async move { (index, id, self.process(id, period).await) }.instrument(span)
        }))
        .buffer_unordered(self.max_concurrency);

        let mut scored: Vec<(usize, RankingEntry)> = Vec::new();
        let mut skipped: Vec<(usize, SkippedInstrument)> = Vec::new();
        let mut processed = 0;

        loop {
            let next = tokio::select! {
                biased;
                _ = cancel.cancelled() => {
                    table.complete = false;
                    break;
                }
                next = tasks.next() => next,
            };

            let Some((index, id, outcome)) = next else {
                break;
            };

            match outcome {
                Outcome::Scored {
                    last_close,
                    breakdown,
                } => {
                    debug!(identifier = %id, total = breakdown.total, "Instrument scored");
                    scored.push((
                        index,
                        RankingEntry {
                            rank: 0,
                            identifier: id.clone(),
                            last_close,
                            breakdown,
                        },
                    ));
                }
                Outcome::Skipped(reason) => {
                    warn!(identifier = %id, reason = %reason, "Instrument skipped");
                    skipped.push((
                        index,
                        SkippedInstrument {
                            identifier: id.clone(),
                            reason,
                        },
                    ));
                }
            }

            processed += 1;
            if let Some(observer) = progress {
                observer.on_progress(processed, total, id.as_str());
            }
        }

        table.entries = sort_and_rank(scored);
        skipped.sort_by_key(|(index, _)| *index);
        table.skipped = skipped.into_iter().map(|(_, s)| s).collect();

        if !table.complete {
            warn!(
                run_id = %table.run_id,
                processed = processed,
                requested = total,
                "Ranking run cancelled"
            );
        }

        info!(
            run_id = %table.run_id,
            ranked = table.entries.len(),
            skipped = table.skipped.len(),
            complete = table.complete,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "Ranking run finished"
        );

        table
    }

    /// 종목 하나를 조회하고 점수를 계산합니다.
    async fn process(&self, id: &InstrumentId, period: Period) -> Outcome {
        let series = match self.source.fetch_series(id, period).await {
            Ok(series) => series,
            Err(e) => return Outcome::Skipped(e.into()),
        };

        if series.is_empty() {
            return Outcome::Skipped(SkipReason::DataUnavailable {
                message: "empty series".to_string(),
            });
        }

        let last_close = series.last_close().unwrap_or_default();
        let mut breakdown = match self.scorer.score(&series, None) {
            Ok(breakdown) => breakdown,
            Err(e) => return Outcome::Skipped(e.into()),
        };

        breakdown.metadata = match self.source.fetch_metadata(id).await {
            Ok(metadata) => metadata,
            Err(e) => {
                warn!(identifier = %id, error = %e, "Metadata fetch failed");
                None
            }
        };

        Outcome::Scored {
            last_close,
            breakdown,
        }
    }
}

/// (종합 점수 내림차순, 입력 순서 오름차순) 정렬 후 순위를 부여합니다.
fn sort_and_rank(mut scored: Vec<(usize, RankingEntry)>) -> Vec<RankingEntry> {
    scored.sort_by(|(ia, a), (ib, b)| match b.total().total_cmp(&a.total()) {
        Ordering::Equal => ia.cmp(ib),
        other => other,
    });

    scored
        .into_iter()
        .enumerate()
        .map(|(i, (_, mut entry))| {
            entry.rank = i + 1;
            entry
        })
        .collect()
}

/// 기본 설정으로 종목 목록의 랭킹을 계산합니다.
pub async fn rank_instruments<S: DataSource>(
    source: S,
    identifiers: &[InstrumentId],
    period: Period,
    progress: Option<&dyn ProgressObserver>,
) -> RankingTable {
    RankingOrchestrator::new(source)
        .rank_instruments(identifiers, period, progress)
        .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scoring::{RawMetrics, SubScores, Tier, TrendDirection};
    use rust_decimal_macros::dec;

    fn entry(id: &str, total: f64, sector: Option<&str>, return_pct: f64) -> RankingEntry {
        RankingEntry {
            rank: 0,
            identifier: InstrumentId::new(id).unwrap(),
            last_close: dec!(10),
            breakdown: ScoreBreakdown {
                sub_scores: SubScores {
                    total_return: 0.0,
                    volatility: 0.0,
                    sharpe: 0.0,
                    trend: 0.0,
                    momentum: 0.0,
                },
                raw: RawMetrics {
                    total_return_pct: return_pct,
                    volatility_pct: 0.0,
                    sharpe_ratio: 0.0,
                    rsi: None,
                    sma_short: 10.0,
                    sma_medium: 10.0,
                    last_close: 10.0,
                    max_drawdown_pct: 0.0,
                },
                total,
                tier: Tier::from_score(total),
                trend_direction: TrendDirection::Neutral,
                metadata: sector.map(|s| InstrumentMetadata::named(id).with_sector(s)),
            },
        }
    }

    fn table(entries: Vec<RankingEntry>) -> RankingTable {
        let mut table = RankingTable::new(Period::OneYear, entries.len());
        table.entries = sort_and_rank(entries.into_iter().enumerate().collect());
        table
    }

    #[test]
    fn test_sort_is_stable_on_ties() {
        let ranked = sort_and_rank(vec![
            (0, entry("A", 50.0, None, 0.0)),
            (1, entry("B", 70.0, None, 0.0)),
            (2, entry("C", 50.0, None, 0.0)),
        ]);
        let ids: Vec<_> = ranked.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["B", "A", "C"]);
        assert_eq!(
            ranked.iter().map(|e| e.rank).collect::<Vec<_>>(),
            vec![1, 2, 3]
        );
    }

    #[test]
    fn test_filtered_reranks() {
        let t = table(vec![
            entry("A", 85.0, Some("Energy"), 10.0),
            entry("B", 75.0, Some("Tech"), 20.0),
            entry("C", 65.0, Some("energy"), -5.0),
            entry("D", 40.0, None, 0.0),
        ]);

        let energy = t.filtered(60.0, &["ENERGY".to_string()]);
        let ids: Vec<_> = energy.entries.iter().map(|e| e.identifier.as_str()).collect();
        assert_eq!(ids, vec!["A", "C"]);
        assert_eq!(energy.entries[1].rank, 2);
        assert_eq!(energy.run_id, t.run_id);

        let high = t.filtered(70.0, &[]);
        assert_eq!(high.len(), 2);
    }

    #[test]
    fn test_summary() {
        let t = table(vec![
            entry("A", 85.0, None, 10.0),
            entry("B", 60.0, None, 20.0),
        ]);
        let summary = t.summary();
        assert_eq!(summary.ranked, 2);
        assert!((summary.high_score_share_pct - 50.0).abs() < 1e-12);
        assert!((summary.mean_return_pct - 15.0).abs() < 1e-12);
        assert_eq!(summary.best.as_ref().map(InstrumentId::as_str), Some("A"));
        assert_eq!(summary.best_score, Some(85.0));
    }

    #[test]
    fn test_empty_summary_and_top() {
        let t = table(vec![]);
        assert!(t.is_empty());
        assert!(t.top(3).is_empty());
        assert_eq!(t.summary().best, None);
        assert_eq!(t.summary().high_score_share_pct, 0.0);
    }

    #[test]
    fn test_skip_reason_from_errors() {
        let reason: SkipReason = ScoringError::InsufficientHistory {
            required: 20,
            provided: 5,
        }
        .into();
        assert_eq!(
            reason,
            SkipReason::InsufficientHistory {
                required: 20,
                provided: 5
            }
        );

        let reason: SkipReason = DataError::NotFound("X".to_string()).into();
        assert!(matches!(reason, SkipReason::DataUnavailable { .. }));
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let source = ranker_data::InMemoryDataSource::new();
        assert!(RankingOrchestrator::new(source).with_max_concurrency(0).is_err());
    }
}
