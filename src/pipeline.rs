//! One season, end to end: raw box scores in, feature table out.
//!
//! Every stage takes an immutable table and returns a new one. Row-level
//! problems are counted in [`PipelineReport`]; only ordering ambiguities and
//! an empty batch abort the run.

use std::collections::BTreeSet;

use tracing::info;

use crate::aggregate::running_averages;
use crate::error::{JoinMissError, MalformedStatError, PipelineError, Result};
use crate::join::{JoinConfig, RoundOnePolicy, join_prior_round};
use crate::metrics::{FeatureRecord, MetricsTable, merge_team_metrics};
use crate::normalize::{NormalizedBatch, normalize_batch};
use crate::raw::GameBoxScoreRaw;
use crate::stats::TypedStatRow;

pub const DEFAULT_MAX_ROUND: u32 = 34;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PipelineConfig {
    /// Number of rounds in the season schedule.
    pub max_round: u32,
    pub round_one: RoundOnePolicy,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            max_round: DEFAULT_MAX_ROUND,
            round_one: RoundOnePolicy::default(),
        }
    }
}

/// Season label as `yy_yy`, e.g. 2023 -> `23_24`.
pub fn season_label(start_year: i32) -> String {
    let start = start_year.rem_euclid(100);
    let end = (start_year + 1).rem_euclid(100);
    format!("{start:02}_{end:02}")
}

/// What was dropped along the way, by class.
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
    pub games_in: usize,
    pub player_rows: usize,
    pub team_rows: usize,
    pub malformed: Vec<MalformedStatError>,
    pub prior_misses: Vec<JoinMissError>,
    pub round_one_skipped: usize,
    pub metrics_misses: Vec<JoinMissError>,
    pub unmatched_teams: BTreeSet<String>,
    pub rows_out: usize,
}

impl PipelineReport {
    pub fn dropped(&self) -> usize {
        self.malformed.len()
            + self.prior_misses.len()
            + self.round_one_skipped
            + self.metrics_misses.len()
    }

    pub fn is_clean(&self) -> bool {
        self.dropped() == 0
    }
}

#[derive(Debug, Clone)]
pub struct FeatureTable {
    pub season: String,
    pub records: Vec<FeatureRecord>,
    pub report: PipelineReport,
}

/// Normalizes raw games, then runs [`build_feature_table`].
pub fn run_season(
    games: &[GameBoxScoreRaw],
    metrics: &MetricsTable,
    season: &str,
    cfg: PipelineConfig,
) -> Result<FeatureTable> {
    let batch = normalize_batch(games);
    let mut table = build_feature_table(batch, metrics, season, cfg)?;
    table.report.games_in = games.len();
    Ok(table)
}

pub fn build_feature_table(
    batch: NormalizedBatch,
    metrics: &MetricsTable,
    season: &str,
    cfg: PipelineConfig,
) -> Result<FeatureTable> {
    if cfg.max_round == 0 {
        return Err(PipelineError::Config("max round must be at least 1".to_string()));
    }
    let NormalizedBatch {
        mut players,
        teams,
        malformed,
    } = batch;
    if players.is_empty() {
        return Err(PipelineError::EmptyBatch {
            malformed: malformed.len(),
        });
    }

    sort_player_rows(&mut players);
    info!(
        players = players.len(),
        teams = teams.len(),
        malformed = malformed.len(),
        "season batch normalized"
    );

    let player_aggregates = running_averages(&players, cfg.max_round)?;
    let team_aggregates = running_averages(&teams, cfg.max_round)?;

    let joined = join_prior_round(
        &players,
        &player_aggregates,
        &team_aggregates,
        JoinConfig {
            max_round: cfg.max_round,
            round_one: cfg.round_one,
        },
    );
    let merged = merge_team_metrics(joined.records, metrics, season);

    let report = PipelineReport {
        games_in: 0,
        player_rows: players.len(),
        team_rows: teams.len(),
        malformed,
        prior_misses: joined.misses,
        round_one_skipped: joined.round_one_skipped,
        metrics_misses: merged.misses,
        unmatched_teams: merged.unmatched_teams,
        rows_out: merged.records.len(),
    };
    info!(
        rows = report.rows_out,
        dropped = report.dropped(),
        "feature table built"
    );

    Ok(FeatureTable {
        season: season.to_string(),
        records: merged.records,
        report,
    })
}

/// Output order: round, date, team, player.
fn sort_player_rows(rows: &mut [TypedStatRow]) {
    rows.sort_by(|a, b| {
        a.game
            .round
            .cmp(&b.game.round)
            .then(a.game.date.cmp(&b.game.date))
            .then(a.game.team.cmp(&b.game.team))
            .then(a.player_id.cmp(&b.player_id))
    });
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn season_labels() {
        assert_eq!(season_label(2023), "23_24");
        assert_eq!(season_label(2009), "09_10");
        assert_eq!(season_label(1999), "99_00");
    }

    #[test]
    fn empty_batch_is_fatal() {
        let err = build_feature_table(
            NormalizedBatch::default(),
            &MetricsTable::default(),
            "23_24",
            PipelineConfig::default(),
        )
        .expect_err("nothing to build");
        assert!(matches!(err, PipelineError::EmptyBatch { malformed: 0 }));
    }
}
