//! Raw box-score cells into typed rows.
//!
//! Each cell kind has a strict format. A cell that does not match rejects the
//! whole line it belongs to; the rest of the batch carries on.

use chrono::NaiveDate;
use tracing::{debug, warn};

use crate::error::{MalformedStatError, RowRef};
use crate::raw::{GameBoxScoreRaw, RawCells, RawStatLine, Role};
use crate::stats::{GameContext, ShotSplit, StatLine, TeamGameRow, TypedStatRow};

type CellResult<T> = std::result::Result<T, String>;

/// `"MM:SS"` to whole seconds.
pub fn parse_time_cell(raw: &str) -> CellResult<u32> {
    let raw = raw.trim();
    let (minutes, seconds) = raw
        .split_once(':')
        .ok_or_else(|| "expected MM:SS".to_string())?;
    let minutes = parse_digits(minutes).ok_or_else(|| "minutes not a number".to_string())?;
    let seconds = parse_digits(seconds).ok_or_else(|| "seconds not a number".to_string())?;
    if seconds >= 60 {
        return Err("seconds out of range".to_string());
    }
    minutes
        .checked_mul(60)
        .and_then(|m| m.checked_add(seconds))
        .ok_or_else(|| "time overflows".to_string())
}

/// `"A/B"` to makes and attempts.
pub fn parse_ratio_cell(raw: &str) -> CellResult<ShotSplit> {
    let (makes, attempts) = raw
        .trim()
        .split_once('/')
        .ok_or_else(|| "expected makes/attempts".to_string())?;
    let makes = parse_digits(makes).ok_or_else(|| "makes not a number".to_string())?;
    let attempts = parse_digits(attempts).ok_or_else(|| "attempts not a number".to_string())?;
    if makes > attempts {
        return Err("more makes than attempts".to_string());
    }
    Ok(ShotSplit { makes, attempts })
}

/// `"NN"` or `"NN%"` to a fraction in `[0, 1]`; empty means no value.
pub fn parse_percentage_cell(raw: &str) -> CellResult<Option<f64>> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Ok(None);
    }
    let number = raw.strip_suffix('%').unwrap_or(raw).trim();
    let pct = number
        .parse::<f64>()
        .map_err(|_| "percentage not a number".to_string())?;
    if !pct.is_finite() || !(0.0..=100.0).contains(&pct) {
        return Err("percentage outside 0..=100".to_string());
    }
    Ok(Some(pct / 100.0))
}

/// Non-negative counting stat.
pub fn parse_count_cell(raw: &str) -> CellResult<i32> {
    let value = parse_digits(raw.trim()).ok_or_else(|| "expected a count".to_string())?;
    i32::try_from(value).map_err(|_| "count overflows".to_string())
}

/// Signed integer stat (efficiency can go negative).
pub fn parse_signed_cell(raw: &str) -> CellResult<i32> {
    raw.trim()
        .parse::<i32>()
        .map_err(|_| "expected an integer".to_string())
}

/// Plus/minus is blank for players listed without a swing; blank reads as even.
pub fn parse_plus_minus_cell(raw: &str) -> CellResult<i32> {
    if raw.trim().is_empty() {
        return Ok(0);
    }
    parse_signed_cell(raw)
}

/// First one- or two-digit number in labels like `"Round 7"`.
pub fn parse_round_label(raw: &str) -> CellResult<u32> {
    let digits = raw
        .split(|ch: char| !ch.is_ascii_digit())
        .find(|part| !part.is_empty() && part.len() <= 2)
        .ok_or_else(|| "no round number".to_string())?;
    let round = parse_digits(digits).ok_or_else(|| "no round number".to_string())?;
    if round == 0 {
        return Err("rounds start at 1".to_string());
    }
    Ok(round)
}

/// `"5 Oct 2023"` as shown on game pages, or ISO `"2023-10-05"`.
pub fn parse_game_date(raw: &str) -> CellResult<NaiveDate> {
    let raw = raw.trim();
    NaiveDate::parse_from_str(raw, "%d %b %Y")
        .or_else(|_| NaiveDate::parse_from_str(raw, "%Y-%m-%d"))
        .map_err(|_| "expected D MMM YYYY".to_string())
}

fn parse_digits(raw: &str) -> Option<u32> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    raw.parse::<u32>().ok()
}

fn cell<T>(
    row: &RowRef,
    field: &'static str,
    value: &str,
    parse: impl FnOnce(&str) -> CellResult<T>,
) -> Result<T, MalformedStatError> {
    parse(value).map_err(|reason| MalformedStatError {
        row: row.clone(),
        field,
        value: value.to_string(),
        reason,
    })
}

fn shot_pct(
    row: &RowRef,
    field: &'static str,
    value: &str,
    split: ShotSplit,
) -> Result<Option<f64>, MalformedStatError> {
    let pct = cell(row, field, value, parse_percentage_cell)?;
    // No attempts means no percentage, whatever the page printed.
    if split.attempts == 0 {
        return Ok(None);
    }
    Ok(pct)
}

pub fn normalize_cells(cells: &RawCells, row: &RowRef) -> Result<StatLine, MalformedStatError> {
    let seconds_played = cell(row, "minutes", &cells.minutes, parse_time_cell)?;
    let points = cell(row, "points", &cells.points, parse_count_cell)?;
    let two_pt = cell(row, "two_pt", &cells.two_pt, parse_ratio_cell)?;
    let three_pt = cell(row, "three_pt", &cells.three_pt, parse_ratio_cell)?;
    let free_throw = cell(row, "free_throw", &cells.free_throw, parse_ratio_cell)?;

    Ok(StatLine {
        seconds_played,
        points,
        two_pt,
        two_pt_pct: shot_pct(row, "two_pt_pct", &cells.two_pt_pct, two_pt)?,
        three_pt,
        three_pt_pct: shot_pct(row, "three_pt_pct", &cells.three_pt_pct, three_pt)?,
        free_throw,
        free_throw_pct: shot_pct(row, "free_throw_pct", &cells.free_throw_pct, free_throw)?,
        off_rebounds: cell(row, "off_rebounds", &cells.off_rebounds, parse_count_cell)?,
        def_rebounds: cell(row, "def_rebounds", &cells.def_rebounds, parse_count_cell)?,
        total_rebounds: cell(row, "total_rebounds", &cells.total_rebounds, parse_count_cell)?,
        assists: cell(row, "assists", &cells.assists, parse_count_cell)?,
        steals: cell(row, "steals", &cells.steals, parse_count_cell)?,
        turnovers: cell(row, "turnovers", &cells.turnovers, parse_count_cell)?,
        blocks: cell(row, "blocks", &cells.blocks, parse_count_cell)?,
        received_blocks: cell(row, "received_blocks", &cells.received_blocks, parse_count_cell)?,
        fouls_committed: cell(row, "fouls_committed", &cells.fouls_committed, parse_count_cell)?,
        fouls_received: cell(row, "fouls_received", &cells.fouls_received, parse_count_cell)?,
        efficiency: cell(row, "efficiency", &cells.efficiency, parse_signed_cell)?,
        plus_minus: cell(row, "plus_minus", &cells.plus_minus, parse_plus_minus_cell)?,
    })
}

/// Typed rows for a season batch, plus every line that was rejected.
#[derive(Debug, Clone, Default)]
pub struct NormalizedBatch {
    pub players: Vec<TypedStatRow>,
    pub teams: Vec<TeamGameRow>,
    pub malformed: Vec<MalformedStatError>,
}

impl NormalizedBatch {
    pub fn is_empty(&self) -> bool {
        self.players.is_empty() && self.teams.is_empty()
    }
}

pub fn normalize_batch(games: &[GameBoxScoreRaw]) -> NormalizedBatch {
    let mut out = NormalizedBatch::default();
    for game in games {
        normalize_game(game, &mut out);
    }
    if !out.malformed.is_empty() {
        warn!(
            rows = out.malformed.len(),
            "discarded malformed box-score lines"
        );
    }
    out
}

fn normalize_game(game: &GameBoxScoreRaw, out: &mut NormalizedBatch) {
    let sides = [
        (&game.home_team, &game.away_team, true, &game.home),
        (&game.away_team, &game.home_team, false, &game.away),
    ];

    let round = parse_round_label(&game.round);
    let date = parse_game_date(&game.date);

    for (team, opponent, is_home, lines) in sides {
        let (round, date) = match (&round, &date) {
            (Ok(round), Ok(date)) => (*round, *date),
            (Err(reason), _) => {
                reject_side(game, team, lines, "round", &game.round, reason, out);
                continue;
            }
            (_, Err(reason)) => {
                reject_side(game, team, lines, "date", &game.date, reason, out);
                continue;
            }
        };
        let context = GameContext {
            team: team.clone(),
            opponent: opponent.clone(),
            is_home,
            round,
            date,
            game_time: game.game_time.trim().to_string(),
        };
        for line in lines {
            normalize_line(game, &context, line, out);
        }
    }
}

fn normalize_line(
    game: &GameBoxScoreRaw,
    context: &GameContext,
    line: &RawStatLine,
    out: &mut NormalizedBatch,
) {
    if line.role == Role::Team {
        return;
    }
    let row = RowRef {
        game_id: game.game_id.clone(),
        team: context.team.clone(),
        player_id: line.player_id.clone(),
    };
    let stats = match normalize_cells(&line.cells, &row) {
        Ok(stats) => stats,
        Err(err) => {
            debug!(%err, "rejecting line");
            out.malformed.push(err);
            return;
        }
    };
    match line.role {
        Role::Player => out.players.push(TypedStatRow {
            player_id: line.player_id.clone(),
            game: context.clone(),
            line: stats,
        }),
        Role::TeamTotal => out.teams.push(TeamGameRow {
            game: context.clone(),
            line: stats,
        }),
        Role::Team => {}
    }
}

fn reject_side(
    game: &GameBoxScoreRaw,
    team: &str,
    lines: &[RawStatLine],
    field: &'static str,
    value: &str,
    reason: &str,
    out: &mut NormalizedBatch,
) {
    for line in lines.iter().filter(|l| l.role != Role::Team) {
        out.malformed.push(MalformedStatError {
            row: RowRef {
                game_id: game.game_id.clone(),
                team: team.to_string(),
                player_id: line.player_id.clone(),
            },
            field,
            value: value.to_string(),
            reason: reason.to_string(),
        });
    }
}
