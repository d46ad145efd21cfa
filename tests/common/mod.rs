#![allow(dead_code)]

use euroleague_features::metrics::ExternalTeamMetrics;
use euroleague_features::raw::{GameBoxScoreRaw, RawCells, RawStatLine, Role};

pub const REAL_MADRID: &str = "Real Madrid";
pub const OLYMPIACOS: &str = "Olympiacos Piraeus";
pub const MONACO: &str = "Monaco";
pub const FENERBAHCE: &str = "Fenerbahce";

/// Three rounds, four teams, everyone plays once per round.
pub const SCHEDULE: [(u32, &str, &str); 6] = [
    (1, REAL_MADRID, OLYMPIACOS),
    (1, MONACO, FENERBAHCE),
    (2, OLYMPIACOS, MONACO),
    (2, FENERBAHCE, REAL_MADRID),
    (3, REAL_MADRID, MONACO),
    (3, OLYMPIACOS, FENERBAHCE),
];

pub fn game_date(round: u32) -> String {
    format!("{} Oct 2023", 5 + (round - 1) * 7)
}

pub fn cells(points: u32, free_throw: &str, free_throw_pct: &str) -> RawCells {
    RawCells {
        minutes: "20:00".into(),
        points: points.to_string(),
        two_pt: "2/4".into(),
        two_pt_pct: "50%".into(),
        three_pt: "1/3".into(),
        three_pt_pct: "33.3%".into(),
        free_throw: free_throw.into(),
        free_throw_pct: free_throw_pct.into(),
        off_rebounds: "1".into(),
        def_rebounds: "3".into(),
        total_rebounds: "4".into(),
        assists: "2".into(),
        steals: "1".into(),
        turnovers: "1".into(),
        blocks: "0".into(),
        received_blocks: "0".into(),
        fouls_committed: "2".into(),
        fouls_received: "2".into(),
        efficiency: "8".into(),
        plus_minus: "".into(),
    }
}

pub fn player_id(team: &str, slot: u32) -> String {
    format!("{}-{slot}", team.to_ascii_lowercase().replace(' ', "-"))
}

pub fn player_line(team: &str, slot: u32, points: u32) -> RawStatLine {
    RawStatLine {
        player_id: player_id(team, slot),
        role: Role::Player,
        cells: cells(points, "0/0", ""),
    }
}

pub fn team_total_line(points: u32) -> RawStatLine {
    let mut cells = cells(points, "10/14", "71.4%");
    cells.minutes = "200:00".into();
    RawStatLine {
        player_id: "total".into(),
        role: Role::TeamTotal,
        cells,
    }
}

/// Team rebounds line; carries blanks on purpose, it never gets parsed.
pub fn team_extras_line() -> RawStatLine {
    RawStatLine {
        player_id: "team".into(),
        role: Role::Team,
        cells: RawCells::default(),
    }
}

/// Slot 1 scores `10 * round`, slot 2 scores 5, the total is their sum.
pub fn side(team: &str, round: u32) -> Vec<RawStatLine> {
    let first = 10 * round;
    vec![
        player_line(team, 1, first),
        player_line(team, 2, 5),
        team_extras_line(),
        team_total_line(first + 5),
    ]
}

pub fn game(round: u32, home: &str, away: &str) -> GameBoxScoreRaw {
    GameBoxScoreRaw {
        game_id: format!("E2023-{round}-{}", player_id(home, 0)),
        home_team: home.into(),
        away_team: away.into(),
        round: format!("Round {round}"),
        date: game_date(round),
        game_time: "20:00".into(),
        home: side(home, round),
        away: side(away, round),
    }
}

pub fn sample_season() -> Vec<GameBoxScoreRaw> {
    SCHEDULE
        .iter()
        .map(|&(round, home, away)| game(round, home, away))
        .collect()
}

pub fn team_metrics(team: &str) -> ExternalTeamMetrics {
    ExternalTeamMetrics {
        team: team.into(),
        pace: 72.0,
        possessions: 2400.0,
        off_rating: 115.0,
        def_rating: 110.0,
        net_rating: 5.0,
        off_rebound_pct: 0.3,
        def_rebound_pct: 0.7,
        total_rebound_pct: 0.5,
        assist_pct: 0.6,
        assist_ratio: 18.0,
        assist_to_turnover: 1.5,
        turnover_ratio: 0.13,
        steal_pct: 0.08,
        block_pct: 0.09,
        fouls_per_100: 24.0,
        fouls_drawn_per_100: 25.0,
    }
}

pub fn all_team_metrics() -> Vec<ExternalTeamMetrics> {
    [REAL_MADRID, OLYMPIACOS, MONACO, FENERBAHCE]
        .into_iter()
        .map(team_metrics)
        .collect()
}

pub fn assert_close(actual: Option<f64>, expected: f64) {
    let actual = actual.expect("value present");
    assert!(
        (actual - expected).abs() < 1e-9,
        "expected {expected}, got {actual}"
    );
}
