use std::path::PathBuf;

use anyhow::{Context, Result, anyhow};
use tracing_subscriber::EnvFilter;

use euroleague_features::export;

const DEFAULT_PREVIEW_ROWS: usize = 5;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let path = std::env::args()
        .skip(1)
        .find(|arg| !arg.starts_with("--"))
        .map(PathBuf::from)
        .ok_or_else(|| anyhow!("usage: inspect_features <season.parquet> [--rows=N]"))?;
    let limit = parse_rows_arg().unwrap_or(DEFAULT_PREVIEW_ROWS);

    let preview = export::read_parquet_preview(&path, limit)
        .with_context(|| format!("read {}", path.display()))?;

    println!("File: {}", path.display());
    println!("Rows: {}", preview.num_rows);
    println!("Columns: {}", preview.columns.len());
    for name in &preview.columns {
        println!("  {name}");
    }
    for row in &preview.rows {
        println!("{row}");
    }
    Ok(())
}

fn parse_rows_arg() -> Option<usize> {
    std::env::args()
        .skip(1)
        .find_map(|arg| arg.strip_prefix("--rows=")?.trim().parse::<usize>().ok())
}
