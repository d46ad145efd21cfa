use std::path::{Path, PathBuf};

use crate::error::{PipelineError, Result};
use crate::join::RoundOnePolicy;
use crate::pipeline::{PipelineConfig, season_label};

const DEFAULT_DATA_DIR: &str = "./data";

/// `.env.local` wins over `.env`; neither has to exist.
pub fn load_dotenv() {
    let _ = dotenvy::from_filename(".env.local");
    let _ = dotenvy::from_filename(".env");
}

pub fn data_dir_from_env() -> PathBuf {
    std::env::var("DATA_DIR")
        .ok()
        .filter(|v| !v.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR))
}

pub fn parse_max_round(raw: &str) -> Result<u32> {
    match raw.trim().parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(PipelineError::Config(format!(
            "max round must be a positive integer, got {raw:?}"
        ))),
    }
}

/// Schedule length and round-one policy from `SEASON_MAX_ROUND` / `ROUND_ONE_POLICY`.
pub fn pipeline_config_from_env() -> Result<PipelineConfig> {
    let mut cfg = PipelineConfig::default();
    if let Some(raw) = non_empty_env("SEASON_MAX_ROUND") {
        cfg.max_round = parse_max_round(&raw)?;
    }
    if let Some(raw) = non_empty_env("ROUND_ONE_POLICY") {
        cfg.round_one = raw.parse::<RoundOnePolicy>()?;
    }
    Ok(cfg)
}

fn non_empty_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

/// Where a season's inputs and outputs live under the data directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeasonPaths {
    pub raw_games: PathBuf,
    pub team_metrics: PathBuf,
    pub features: PathBuf,
}

impl SeasonPaths {
    pub fn new(data_dir: &Path, start_year: i32) -> Self {
        let label = season_label(start_year);
        Self {
            raw_games: data_dir
                .join("raw")
                .join(format!("season_{start_year}.json")),
            team_metrics: data_dir
                .join("external")
                .join(format!("team_stats_{label}.csv")),
            features: data_dir
                .join("processed")
                .join(format!("season_{start_year}.parquet")),
        }
    }
}
