use std::fs;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use chrono::{Datelike, NaiveDate};
use parquet::data_type::{BoolType, ByteArray, ByteArrayType, DoubleType, Int32Type, Int64Type};
use parquet::file::properties::WriterProperties;
use parquet::file::reader::{FileReader, SerializedFileReader};
use parquet::file::writer::SerializedFileWriter;
use parquet::schema::parser::parse_message_type;
use rust_xlsxwriter::{Workbook, Worksheet};
use tracing::info;

use crate::aggregate::EntityAggregate;
use crate::error::{PipelineError, Result};
use crate::metrics::{ExternalTeamMetrics, FeatureRecord, TEAM_METRIC_NAMES};
use crate::pipeline::{FeatureTable, PipelineReport};
use crate::stats::Stat;

// Days from 0001-01-01 (CE day 1) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

#[derive(Debug, Clone, PartialEq)]
pub enum ColumnData {
    Utf8(Vec<String>),
    Bool(Vec<bool>),
    Int64(Vec<i64>),
    Date(Vec<NaiveDate>),
    Double(Vec<Option<f64>>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    fn schema_line(&self) -> String {
        let name = &self.name;
        match self.data {
            ColumnData::Utf8(_) => format!("REQUIRED BYTE_ARRAY {name} (UTF8);"),
            ColumnData::Bool(_) => format!("REQUIRED BOOLEAN {name};"),
            ColumnData::Int64(_) => format!("REQUIRED INT64 {name};"),
            ColumnData::Date(_) => format!("REQUIRED INT32 {name} (DATE);"),
            ColumnData::Double(_) => format!("OPTIONAL DOUBLE {name};"),
        }
    }
}

/// Flattens feature records into columns in their fixed output order.
pub fn feature_columns(records: &[FeatureRecord]) -> Vec<Column> {
    let mut cols = Vec::new();

    cols.push(Column::new("player_id", text(records, |r| r.prior.row.player_id.as_str())));
    cols.push(Column::new("team", text(records, |r| r.prior.row.game.team.as_str())));
    cols.push(Column::new("opponent", text(records, |r| r.prior.row.game.opponent.as_str())));
    cols.push(Column::new(
        "is_home",
        ColumnData::Bool(records.iter().map(|r| r.prior.row.game.is_home).collect()),
    ));
    cols.push(Column::new(
        "round",
        ColumnData::Int64(records.iter().map(|r| r.prior.row.game.round as i64).collect()),
    ));
    cols.push(Column::new(
        "date",
        ColumnData::Date(records.iter().map(|r| r.prior.row.game.date).collect()),
    ));
    cols.push(Column::new("game_time", text(records, |r| r.prior.row.game.game_time.as_str())));

    for stat in Stat::ALL {
        let values = records.iter().map(|r| r.prior.row.line.value(stat));
        let data = if stat.is_percentage() {
            ColumnData::Double(values.collect())
        } else {
            ColumnData::Int64(values.map(|v| v.unwrap_or_default() as i64).collect())
        };
        cols.push(Column::new(stat.name(), data));
    }

    push_aggregate(&mut cols, records, "", |r| &r.prior.player);
    cols.push(Column::new(
        "prior_round",
        ColumnData::Int64(records.iter().map(|r| r.prior.lookup_round as i64).collect()),
    ));
    push_aggregate(&mut cols, records, "_own_team", |r| &r.prior.own_team);
    push_aggregate(&mut cols, records, "_opponent", |r| &r.prior.opponent);
    push_metrics(&mut cols, records, "_own_team", |r| &r.own_metrics);
    push_metrics(&mut cols, records, "_opponent", |r| &r.opponent_metrics);

    cols.push(Column::new("season", text(records, |r| r.season.as_str())));
    cols
}

fn text(records: &[FeatureRecord], pick: fn(&FeatureRecord) -> &str) -> ColumnData {
    ColumnData::Utf8(records.iter().map(|r| pick(r).to_string()).collect())
}

fn push_aggregate(
    cols: &mut Vec<Column>,
    records: &[FeatureRecord],
    suffix: &str,
    pick: fn(&FeatureRecord) -> &EntityAggregate,
) {
    cols.push(Column::new(
        format!("game_number{suffix}"),
        ColumnData::Int64(records.iter().map(|r| pick(r).game_number as i64).collect()),
    ));
    for stat in Stat::ALL {
        cols.push(Column::new(
            format!("avg_{}{suffix}", stat.name()),
            ColumnData::Double(records.iter().map(|r| pick(r).avg(stat)).collect()),
        ));
    }
}

fn push_metrics(
    cols: &mut Vec<Column>,
    records: &[FeatureRecord],
    suffix: &str,
    pick: fn(&FeatureRecord) -> &ExternalTeamMetrics,
) {
    for (idx, name) in TEAM_METRIC_NAMES.iter().enumerate() {
        cols.push(Column::new(
            format!("{name}{suffix}"),
            ColumnData::Double(records.iter().map(|r| Some(pick(r).values()[idx])).collect()),
        ));
    }
}

fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

/// Writes columns as a single-row-group Parquet file.
pub fn write_parquet<W: Write + Send>(sink: W, columns: &[Column]) -> Result<()> {
    let fields = columns
        .iter()
        .map(Column::schema_line)
        .collect::<Vec<_>>()
        .join("\n  ");
    let message = format!("message feature_record {{\n  {fields}\n}}");
    let schema = Arc::new(parse_message_type(&message)?);
    let props = Arc::new(WriterProperties::builder().build());

    let mut writer = SerializedFileWriter::new(sink, schema, props)?;
    let mut row_group = writer.next_row_group()?;
    let mut pending = columns.iter();
    while let Some(mut col_writer) = row_group.next_column()? {
        let Some(column) = pending.next() else {
            return Err(PipelineError::Config(
                "parquet schema has more columns than data".to_string(),
            ));
        };
        match &column.data {
            ColumnData::Utf8(values) => {
                let values = values
                    .iter()
                    .map(|v| ByteArray::from(v.as_str()))
                    .collect::<Vec<_>>();
                col_writer
                    .typed::<ByteArrayType>()
                    .write_batch(&values, None, None)?;
            }
            ColumnData::Bool(values) => {
                col_writer.typed::<BoolType>().write_batch(values, None, None)?;
            }
            ColumnData::Int64(values) => {
                col_writer.typed::<Int64Type>().write_batch(values, None, None)?;
            }
            ColumnData::Date(values) => {
                let days = values.iter().copied().map(days_since_epoch).collect::<Vec<_>>();
                col_writer.typed::<Int32Type>().write_batch(&days, None, None)?;
            }
            ColumnData::Double(values) => {
                let defs = values
                    .iter()
                    .map(|v| i16::from(v.is_some()))
                    .collect::<Vec<_>>();
                let present = values.iter().flatten().copied().collect::<Vec<_>>();
                col_writer
                    .typed::<DoubleType>()
                    .write_batch(&present, Some(&defs), None)?;
            }
        }
        col_writer.close()?;
    }
    row_group.close()?;
    writer.close()?;
    Ok(())
}

pub fn write_parquet_file(path: &Path, table: &FeatureTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| PipelineError::io(parent, err))?;
    }
    let file = fs::File::create(path).map_err(|err| PipelineError::io(path, err))?;
    let columns = feature_columns(&table.records);
    write_parquet(file, &columns)?;
    info!(
        path = %path.display(),
        rows = table.records.len(),
        columns = columns.len(),
        "feature table written"
    );
    Ok(())
}

/// Feature table on one sheet, dropped-row diagnostics on another.
pub fn write_xlsx_file(path: &Path, table: &FeatureTable) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|err| PipelineError::io(parent, err))?;
    }
    let columns = feature_columns(&table.records);

    let mut workbook = Workbook::new();
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Features")?;
        write_columns(sheet, &columns)?;
    }
    {
        let sheet = workbook.add_worksheet();
        sheet.set_name("Diagnostics")?;
        write_rows(sheet, &diagnostic_rows(&table.report))?;
    }
    workbook.save(path)?;
    info!(path = %path.display(), "feature workbook written");
    Ok(())
}

fn write_columns(sheet: &mut Worksheet, columns: &[Column]) -> Result<()> {
    for (col_idx, column) in columns.iter().enumerate() {
        let col = col_idx as u16;
        sheet.write_string(0, col, &column.name)?;
        match &column.data {
            ColumnData::Utf8(values) => {
                for (row_idx, value) in values.iter().enumerate() {
                    sheet.write_string(row_idx as u32 + 1, col, value)?;
                }
            }
            ColumnData::Bool(values) => {
                for (row_idx, value) in values.iter().enumerate() {
                    sheet.write_boolean(row_idx as u32 + 1, col, *value)?;
                }
            }
            ColumnData::Int64(values) => {
                for (row_idx, value) in values.iter().enumerate() {
                    sheet.write_number(row_idx as u32 + 1, col, *value as f64)?;
                }
            }
            ColumnData::Date(values) => {
                for (row_idx, value) in values.iter().enumerate() {
                    sheet.write_string(row_idx as u32 + 1, col, value.to_string())?;
                }
            }
            ColumnData::Double(values) => {
                for (row_idx, value) in values.iter().enumerate() {
                    if let Some(value) = value {
                        sheet.write_number(row_idx as u32 + 1, col, *value)?;
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn diagnostic_rows(report: &PipelineReport) -> Vec<Vec<String>> {
    let mut rows = vec![vec!["Kind".to_string(), "Detail".to_string()]];
    for err in &report.malformed {
        rows.push(vec!["malformed".to_string(), err.to_string()]);
    }
    for miss in &report.prior_misses {
        rows.push(vec!["prior_join_miss".to_string(), miss.to_string()]);
    }
    for miss in &report.metrics_misses {
        rows.push(vec!["metrics_join_miss".to_string(), miss.to_string()]);
    }
    for team in &report.unmatched_teams {
        rows.push(vec!["unmatched_team".to_string(), team.clone()]);
    }
    if report.round_one_skipped > 0 {
        rows.push(vec![
            "round_one_skipped".to_string(),
            report.round_one_skipped.to_string(),
        ]);
    }
    rows
}

fn write_rows(worksheet: &mut Worksheet, rows: &[Vec<String>]) -> Result<()> {
    for (row_idx, row) in rows.iter().enumerate() {
        for (col_idx, value) in row.iter().enumerate() {
            worksheet.write_string(row_idx as u32, col_idx as u16, value)?;
        }
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ParquetPreview {
    pub num_rows: i64,
    pub columns: Vec<String>,
    pub rows: Vec<String>,
}

/// Row count, column names and the first `limit` rows rendered as text.
pub fn read_parquet_preview(path: &Path, limit: usize) -> Result<ParquetPreview> {
    let file = fs::File::open(path).map_err(|err| PipelineError::io(path, err))?;
    let reader = SerializedFileReader::new(file)?;
    let meta = reader.metadata().file_metadata();
    let num_rows = meta.num_rows();
    let columns = meta
        .schema_descr()
        .columns()
        .iter()
        .map(|c| c.name().to_string())
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    for row in reader.get_row_iter(None)?.take(limit) {
        rows.push(row?.to_string());
    }
    Ok(ParquetPreview {
        num_rows,
        columns,
        rows,
    })
}
