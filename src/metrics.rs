use std::collections::{BTreeSet, HashMap};
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use tracing::{info, warn};

use crate::error::{JoinMissError, MissingSide, PipelineError, Result};
use crate::join::PriorFormRecord;

pub const TEAM_METRIC_NAMES: [&str; 16] = [
    "pace",
    "possessions",
    "off_rating",
    "def_rating",
    "net_rating",
    "off_rebound_pct",
    "def_rebound_pct",
    "total_rebound_pct",
    "assist_pct",
    "assist_ratio",
    "assist_to_turnover",
    "turnover_ratio",
    "steal_pct",
    "block_pct",
    "fouls_per_100",
    "fouls_drawn_per_100",
];

/// Season-level efficiency metrics for one team. Rate columns are fractions.
#[derive(Debug, Clone, PartialEq)]
pub struct ExternalTeamMetrics {
    pub team: String,
    pub pace: f64,
    pub possessions: f64,
    pub off_rating: f64,
    pub def_rating: f64,
    pub net_rating: f64,
    pub off_rebound_pct: f64,
    pub def_rebound_pct: f64,
    pub total_rebound_pct: f64,
    pub assist_pct: f64,
    pub assist_ratio: f64,
    pub assist_to_turnover: f64,
    pub turnover_ratio: f64,
    pub steal_pct: f64,
    pub block_pct: f64,
    pub fouls_per_100: f64,
    pub fouls_drawn_per_100: f64,
}

impl ExternalTeamMetrics {
    /// Values in [`TEAM_METRIC_NAMES`] order.
    pub fn values(&self) -> [f64; 16] {
        [
            self.pace,
            self.possessions,
            self.off_rating,
            self.def_rating,
            self.net_rating,
            self.off_rebound_pct,
            self.def_rebound_pct,
            self.total_rebound_pct,
            self.assist_pct,
            self.assist_ratio,
            self.assist_to_turnover,
            self.turnover_ratio,
            self.steal_pct,
            self.block_pct,
            self.fouls_per_100,
            self.fouls_drawn_per_100,
        ]
    }
}

// Column headers as they appear in the team stats sheet.
#[derive(Debug, Deserialize)]
struct MetricsCsvRow {
    #[serde(rename = "TEAM")]
    team: Option<String>,
    #[serde(rename = "PACE")]
    pace: Option<f64>,
    #[serde(rename = "POSS")]
    possessions: Option<f64>,
    #[serde(rename = "OFF RTG")]
    off_rating: Option<f64>,
    #[serde(rename = "DEF RTG")]
    def_rating: Option<f64>,
    #[serde(rename = "NET RTG")]
    net_rating: Option<f64>,
    #[serde(rename = "OR%")]
    off_rebound_pct: Option<f64>,
    #[serde(rename = "DR%")]
    def_rebound_pct: Option<f64>,
    #[serde(rename = "TR%")]
    total_rebound_pct: Option<f64>,
    #[serde(rename = "AST%")]
    assist_pct: Option<f64>,
    #[serde(rename = "AST Ratio")]
    assist_ratio: Option<f64>,
    #[serde(rename = "AST/TO")]
    assist_to_turnover: Option<f64>,
    #[serde(rename = "TO Ratio")]
    turnover_ratio: Option<f64>,
    #[serde(rename = "ST%")]
    steal_pct: Option<f64>,
    #[serde(rename = "PF 100 Poss")]
    fouls_per_100: Option<f64>,
    #[serde(rename = "DF 100 Poss")]
    fouls_drawn_per_100: Option<f64>,
    #[serde(rename = "BLK%")]
    block_pct: Option<f64>,
}

impl MetricsCsvRow {
    fn into_metrics(self, team: String) -> std::result::Result<ExternalTeamMetrics, String> {
        let need = |value: Option<f64>, column: &str| {
            value.ok_or_else(|| format!("team {team:?} missing {column}"))
        };
        let pct = |value: Option<f64>, column: &str| need(value, column).map(|v| v / 100.0);

        Ok(ExternalTeamMetrics {
            pace: need(self.pace, "PACE")?,
            possessions: need(self.possessions, "POSS")?,
            off_rating: need(self.off_rating, "OFF RTG")?,
            def_rating: need(self.def_rating, "DEF RTG")?,
            net_rating: need(self.net_rating, "NET RTG")?,
            off_rebound_pct: pct(self.off_rebound_pct, "OR%")?,
            def_rebound_pct: pct(self.def_rebound_pct, "DR%")?,
            total_rebound_pct: pct(self.total_rebound_pct, "TR%")?,
            assist_pct: pct(self.assist_pct, "AST%")?,
            assist_ratio: need(self.assist_ratio, "AST Ratio")?,
            assist_to_turnover: need(self.assist_to_turnover, "AST/TO")?,
            // Turnovers per 100 possessions: a rate, unlike AST Ratio.
            turnover_ratio: pct(self.turnover_ratio, "TO Ratio")?,
            steal_pct: pct(self.steal_pct, "ST%")?,
            block_pct: pct(self.block_pct, "BLK%")?,
            fouls_per_100: need(self.fouls_per_100, "PF 100 Poss")?,
            fouls_drawn_per_100: need(self.fouls_drawn_per_100, "DF 100 Poss")?,
            team,
        })
    }
}

/// Team metrics keyed by exact team name.
#[derive(Debug, Clone, Default)]
pub struct MetricsTable {
    by_team: HashMap<String, ExternalTeamMetrics>,
}

impl MetricsTable {
    pub fn from_rows(rows: Vec<ExternalTeamMetrics>) -> std::result::Result<Self, String> {
        let mut by_team = HashMap::with_capacity(rows.len());
        for row in rows {
            if by_team.contains_key(&row.team) {
                return Err(format!("team {:?} listed twice", row.team));
            }
            by_team.insert(row.team.clone(), row);
        }
        Ok(Self { by_team })
    }

    pub fn load_csv(path: &Path) -> Result<Self> {
        let file = std::fs::File::open(path).map_err(|err| PipelineError::io(path, err))?;
        Self::read_csv(file, path)
    }

    /// `origin` only labels errors.
    pub fn read_csv(reader: impl Read, origin: &Path) -> Result<Self> {
        let mut csv = csv::ReaderBuilder::new()
            .trim(csv::Trim::All)
            .from_reader(reader);
        let mut rows = Vec::new();
        for record in csv.deserialize::<MetricsCsvRow>() {
            let record = record?;
            let Some(team) = record.team.clone().filter(|t| !t.trim().is_empty()) else {
                continue;
            };
            let metrics = record
                .into_metrics(team)
                .map_err(|reason| metrics_error(origin, reason))?;
            rows.push(metrics);
        }
        let table = Self::from_rows(rows).map_err(|reason| metrics_error(origin, reason))?;
        info!(teams = table.len(), path = %origin.display(), "team metrics loaded");
        Ok(table)
    }

    pub fn get(&self, team: &str) -> Option<&ExternalTeamMetrics> {
        self.by_team.get(team)
    }

    pub fn len(&self) -> usize {
        self.by_team.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_team.is_empty()
    }
}

fn metrics_error(origin: &Path, reason: String) -> PipelineError {
    PipelineError::Metrics {
        path: PathBuf::from(origin),
        reason,
    }
}

/// A fully joined, model-ready player-game.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureRecord {
    pub season: String,
    pub prior: PriorFormRecord,
    pub own_metrics: ExternalTeamMetrics,
    pub opponent_metrics: ExternalTeamMetrics,
}

#[derive(Debug, Default)]
pub struct MetricsMergeOutput {
    pub records: Vec<FeatureRecord>,
    pub misses: Vec<JoinMissError>,
    /// Team names from the box scores that the metrics table does not know.
    pub unmatched_teams: BTreeSet<String>,
}

pub fn merge_team_metrics(
    records: Vec<PriorFormRecord>,
    table: &MetricsTable,
    season: &str,
) -> MetricsMergeOutput {
    let mut out = MetricsMergeOutput::default();

    for prior in records {
        let game = &prior.row.game;
        let own = table.get(&game.team);
        let opp = table.get(&game.opponent);
        let missing = match (own, opp) {
            (Some(own), Some(opp)) => {
                let (own_metrics, opponent_metrics) = (own.clone(), opp.clone());
                out.records.push(FeatureRecord {
                    season: season.to_string(),
                    prior,
                    own_metrics,
                    opponent_metrics,
                });
                continue;
            }
            (None, Some(_)) => MissingSide::OwnMetrics,
            (Some(_), None) => MissingSide::OpponentMetrics,
            (None, None) => MissingSide::BothMetrics,
        };
        if own.is_none() {
            out.unmatched_teams.insert(game.team.clone());
        }
        if opp.is_none() {
            out.unmatched_teams.insert(game.opponent.clone());
        }
        out.misses.push(JoinMissError {
            player_id: prior.row.player_id.clone(),
            team: game.team.clone(),
            opponent: game.opponent.clone(),
            round: game.round,
            lookup_round: prior.lookup_round,
            missing,
        });
    }

    if !out.unmatched_teams.is_empty() {
        warn!(
            teams = ?out.unmatched_teams,
            rows = out.misses.len(),
            "team names missing from metrics table"
        );
    }
    out
}
