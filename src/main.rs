use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use euroleague_features::config::{self, SeasonPaths};
use euroleague_features::export;
use euroleague_features::join::RoundOnePolicy;
use euroleague_features::metrics::MetricsTable;
use euroleague_features::pipeline::{self, FeatureTable};
use euroleague_features::raw;

const USAGE: &str = "Only run with Season starting year specified, e.g. `euroleague_features 2023`";

fn main() -> Result<()> {
    config::load_dotenv();
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let positional = positional_args();
    if positional.len() != 1 {
        println!("{USAGE}");
        return Ok(());
    }
    let start_year = positional[0]
        .trim()
        .parse::<i32>()
        .with_context(|| format!("season start year must be an integer, got {:?}", positional[0]))?;

    let mut cfg = config::pipeline_config_from_env()?;
    if let Some(raw) = flag_value("--max-round") {
        cfg.max_round = config::parse_max_round(&raw)?;
    }
    if let Some(raw) = flag_value("--round-one") {
        cfg.round_one = raw.parse::<RoundOnePolicy>()?;
    }

    let defaults = SeasonPaths::new(&config::data_dir_from_env(), start_year);
    let input = flag_value("--input").map(PathBuf::from).unwrap_or(defaults.raw_games);
    let metrics_path = flag_value("--metrics")
        .map(PathBuf::from)
        .unwrap_or(defaults.team_metrics);
    let out = flag_value("--out").map(PathBuf::from).unwrap_or(defaults.features);

    let games = raw::load_raw_batch(&input)
        .with_context(|| format!("load raw box scores from {}", input.display()))?;
    println!("Games loaded: {}", games.len());
    let metrics = MetricsTable::load_csv(&metrics_path)
        .with_context(|| format!("load team metrics from {}", metrics_path.display()))?;

    let season = pipeline::season_label(start_year);
    let table = pipeline::run_season(&games, &metrics, &season, cfg)
        .with_context(|| format!("build feature table for season {season}"))?;

    export::write_parquet_file(&out, &table)
        .with_context(|| format!("write {}", out.display()))?;
    if let Some(xlsx) = xlsx_arg(&out) {
        export::write_xlsx_file(&xlsx, &table)
            .with_context(|| format!("write {}", xlsx.display()))?;
        println!("Workbook: {}", xlsx.display());
    }

    print_summary(&table, &out);
    Ok(())
}

fn print_summary(table: &FeatureTable, out: &std::path::Path) {
    let report = &table.report;
    println!("Season {} feature table complete", table.season);
    println!("Output: {}", out.display());
    println!(
        "Rows: {} player-games in, {} team totals, {} written",
        report.player_rows, report.team_rows, report.rows_out
    );
    if report.is_clean() {
        return;
    }
    println!("Dropped: {}", report.dropped());
    println!("  malformed lines: {}", report.malformed.len());
    for err in report.malformed.iter().take(6) {
        println!("   - {err}");
    }
    println!("  prior-round join misses: {}", report.prior_misses.len());
    for miss in report.prior_misses.iter().take(6) {
        println!("   - {miss}");
    }
    if report.round_one_skipped > 0 {
        println!("  round one skipped: {}", report.round_one_skipped);
    }
    println!("  team metrics join misses: {}", report.metrics_misses.len());
    if !report.unmatched_teams.is_empty() {
        println!("  unmatched team names:");
        for team in &report.unmatched_teams {
            println!("   - {team}");
        }
    }
}

fn positional_args() -> Vec<String> {
    std::env::args()
        .skip(1)
        .filter(|arg| !arg.starts_with("--"))
        .collect()
}

fn flag_value(flag: &str) -> Option<String> {
    let prefix = format!("{flag}=");
    std::env::args().skip(1).find_map(|arg| {
        let value = arg.strip_prefix(&prefix)?.trim();
        (!value.is_empty()).then(|| value.to_string())
    })
}

/// `--xlsx` writes next to the parquet output; `--xlsx=PATH` picks the path.
fn xlsx_arg(out: &std::path::Path) -> Option<PathBuf> {
    if let Some(path) = flag_value("--xlsx") {
        return Some(PathBuf::from(path));
    }
    std::env::args()
        .skip(1)
        .any(|arg| arg == "--xlsx")
        .then(|| out.with_extension("xlsx"))
}
