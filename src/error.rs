use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, PipelineError>;

/// Fatal failures. Row-level problems are collected in the pipeline report instead.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("no usable game rows in season batch ({malformed} rows malformed)")]
    EmptyBatch { malformed: usize },

    #[error("duplicate {entity_kind} rows for {entity} in round {round}")]
    DuplicateEntityRound {
        entity_kind: &'static str,
        entity: String,
        round: u32,
    },

    #[error("round {round} for {entity} outside schedule 1..={max_round}")]
    RoundOutOfRange {
        entity: String,
        round: u32,
        max_round: u32,
    },

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("team metrics {path}: {reason}")]
    Metrics { path: PathBuf, reason: String },

    #[error("io error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("csv error: {0}")]
    Csv(#[from] csv::Error),

    #[error("parquet error: {0}")]
    Parquet(#[from] parquet::errors::ParquetError),

    #[error("xlsx error: {0}")]
    Xlsx(#[from] rust_xlsxwriter::XlsxError),
}

impl PipelineError {
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

/// Identifies the raw line a malformed cell came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowRef {
    pub game_id: String,
    pub team: String,
    pub player_id: String,
}

impl fmt::Display for RowRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "game {} / {} / {}", self.game_id, self.team, self.player_id)
    }
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("malformed {field} in {row}: {value:?} ({reason})")]
pub struct MalformedStatError {
    pub row: RowRef,
    pub field: &'static str,
    pub value: String,
    pub reason: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingSide {
    OwnTeam,
    Opponent,
    Both,
    OwnMetrics,
    OpponentMetrics,
    BothMetrics,
}

impl fmt::Display for MissingSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::OwnTeam => "own team prior",
            Self::Opponent => "opponent prior",
            Self::Both => "both priors",
            Self::OwnMetrics => "own team metrics",
            Self::OpponentMetrics => "opponent metrics",
            Self::BothMetrics => "both team metrics",
        };
        f.write_str(label)
    }
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("join miss for {player_id} ({team} vs {opponent}, round {round}, lookup round {lookup_round}): {missing}")]
pub struct JoinMissError {
    pub player_id: String,
    pub team: String,
    pub opponent: String,
    pub round: u32,
    pub lookup_round: u32,
    pub missing: MissingSide,
}
