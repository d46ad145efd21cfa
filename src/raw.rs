use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{PipelineError, Result};

/// Who a box-score line belongs to. Assigned by the collector, never inferred from names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Role {
    Player,
    /// Unattributed team stats (team rebounds etc.), not used downstream.
    Team,
    TeamTotal,
}

/// Raw cell strings for one box-score line, in the order the site shows them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RawCells {
    pub minutes: String,
    pub points: String,
    pub two_pt: String,
    pub two_pt_pct: String,
    pub three_pt: String,
    pub three_pt_pct: String,
    pub free_throw: String,
    pub free_throw_pct: String,
    pub off_rebounds: String,
    pub def_rebounds: String,
    pub total_rebounds: String,
    pub assists: String,
    pub steals: String,
    pub turnovers: String,
    pub blocks: String,
    pub received_blocks: String,
    pub fouls_committed: String,
    pub fouls_received: String,
    pub efficiency: String,
    pub plus_minus: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawStatLine {
    pub player_id: String,
    pub role: Role,
    #[serde(flatten)]
    pub cells: RawCells,
}

/// One game page after markup parsing: teams, schedule info and both box scores.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameBoxScoreRaw {
    pub game_id: String,
    pub home_team: String,
    pub away_team: String,
    pub round: String,
    pub date: String,
    #[serde(default)]
    pub game_time: String,
    #[serde(default)]
    pub home: Vec<RawStatLine>,
    #[serde(default)]
    pub away: Vec<RawStatLine>,
}

pub fn parse_raw_batch_json(raw: &str) -> Result<Vec<GameBoxScoreRaw>> {
    let trimmed = raw.trim();
    if trimmed.is_empty() || trimmed == "null" {
        return Ok(Vec::new());
    }
    Ok(serde_json::from_str(trimmed)?)
}

pub fn load_raw_batch(path: &Path) -> Result<Vec<GameBoxScoreRaw>> {
    let raw = std::fs::read_to_string(path).map_err(|err| PipelineError::io(path, err))?;
    parse_raw_batch_json(&raw)
}
