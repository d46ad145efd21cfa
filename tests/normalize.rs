use chrono::NaiveDate;

use euroleague_features::normalize::normalize_batch;
use euroleague_features::raw::parse_raw_batch_json;
use euroleague_features::stats::{Stat, StatLine};

const GAME_SAMPLE: &str = include_str!("fixtures/game_sample.json");

fn player_line<'a>(
    batch: &'a euroleague_features::normalize::NormalizedBatch,
    id: &str,
) -> &'a StatLine {
    &batch
        .players
        .iter()
        .find(|row| row.player_id == id)
        .unwrap_or_else(|| panic!("missing player {id}"))
        .line
}

#[test]
fn parses_fixture_batch() {
    let games = parse_raw_batch_json(GAME_SAMPLE).expect("fixture parses");
    assert_eq!(games.len(), 2);
    assert_eq!(games[0].home.len(), 4);
    assert_eq!(games[0].away.len(), 3);
}

#[test]
fn splits_players_from_team_totals() {
    let games = parse_raw_batch_json(GAME_SAMPLE).expect("fixture parses");
    let batch = normalize_batch(&games);

    let mut players = batch
        .players
        .iter()
        .map(|row| row.player_id.as_str())
        .collect::<Vec<_>>();
    players.sort_unstable();
    assert_eq!(players, vec!["campazzo-facundo", "fall-moustapha", "tavares-walter"]);

    // TEAM lines are dropped silently, TEAM_TOTAL lines become team rows.
    assert_eq!(batch.teams.len(), 2);
    let home_total = batch
        .teams
        .iter()
        .find(|row| row.game.team == "Real Madrid")
        .expect("home total");
    assert_eq!(home_total.line.points, 86);
    assert_eq!(home_total.line.seconds_played, 12_000);
    assert_eq!(home_total.game.opponent, "Olympiacos Piraeus");
    assert!(home_total.game.is_home);
}

#[test]
fn game_context_is_shared_by_side() {
    let games = parse_raw_batch_json(GAME_SAMPLE).expect("fixture parses");
    let batch = normalize_batch(&games);

    let fall = batch
        .players
        .iter()
        .find(|row| row.player_id == "fall-moustapha")
        .expect("away player");
    assert_eq!(fall.game.team, "Olympiacos Piraeus");
    assert_eq!(fall.game.opponent, "Real Madrid");
    assert!(!fall.game.is_home);
    assert_eq!(fall.game.round, 1);
    assert_eq!(
        fall.game.date,
        NaiveDate::from_ymd_opt(2023, 10, 5).expect("valid date")
    );
    assert_eq!(fall.game.game_time, "20:45");
}

#[test]
fn typed_values_follow_cell_rules() {
    let games = parse_raw_batch_json(GAME_SAMPLE).expect("fixture parses");
    let batch = normalize_batch(&games);

    let campazzo = player_line(&batch, "campazzo-facundo");
    assert_eq!(campazzo.seconds_played, 24 * 60 + 31);
    assert_eq!(campazzo.value(Stat::ThreePtMakes), Some(2.0));
    assert_eq!(campazzo.value(Stat::TwoPtPct), Some(0.6));
    assert_eq!(campazzo.value(Stat::FreeThrowPct), None);
    assert_eq!(campazzo.plus_minus, 9);

    let tavares = player_line(&batch, "tavares-walter");
    assert_eq!(tavares.three_pt_pct, None);
    assert_eq!(tavares.free_throw_pct, Some(0.5));
    assert_eq!(tavares.plus_minus, 0);

    let fall = player_line(&batch, "fall-moustapha");
    assert_eq!(fall.free_throw_pct, Some(0.0));
}

#[test]
fn malformed_lines_are_reported_not_fatal() {
    let games = parse_raw_batch_json(GAME_SAMPLE).expect("fixture parses");
    let batch = normalize_batch(&games);

    // One bad points cell, plus both sides of the game with no round number.
    assert_eq!(batch.malformed.len(), 3);

    let vezenkov = batch
        .malformed
        .iter()
        .find(|err| err.row.player_id == "vezenkov-sasha")
        .expect("bad points cell reported");
    assert_eq!(vezenkov.field, "points");
    assert_eq!(vezenkov.value, "twenty");
    assert_eq!(vezenkov.row.game_id, "E2023-1");

    let broken = batch
        .malformed
        .iter()
        .filter(|err| err.row.game_id == "E2023-broken")
        .collect::<Vec<_>>();
    assert_eq!(broken.len(), 2);
    assert!(broken.iter().all(|err| err.field == "round"));
    assert!(!batch.players.iter().any(|row| row.player_id == "james-mike"));
}
