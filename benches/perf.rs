use criterion::{Criterion, criterion_group, criterion_main};
use std::hint::black_box;

use euroleague_features::aggregate::running_averages;
use euroleague_features::export::{feature_columns, write_parquet};
use euroleague_features::metrics::{ExternalTeamMetrics, MetricsTable};
use euroleague_features::normalize::normalize_batch;
use euroleague_features::pipeline::{PipelineConfig, run_season};
use euroleague_features::raw::{GameBoxScoreRaw, RawCells, RawStatLine, Role};

const TEAMS: usize = 18;
const ROUNDS: u32 = 34;
const ROSTER: usize = 12;

fn team_name(idx: usize) -> String {
    format!("Team {idx:02}")
}

fn cells(seed: usize) -> RawCells {
    let makes = (seed % 5) as u32;
    RawCells {
        minutes: format!("{}:{:02}", 10 + seed % 25, seed % 60),
        points: (makes * 2 + seed as u32 % 4).to_string(),
        two_pt: format!("{makes}/{}", makes + 3),
        two_pt_pct: format!("{:.1}%", makes as f64 * 100.0 / (makes + 3) as f64),
        three_pt: "1/4".into(),
        three_pt_pct: "25%".into(),
        free_throw: if seed % 3 == 0 { "0/0".into() } else { "2/3".into() },
        free_throw_pct: if seed % 3 == 0 { String::new() } else { "66.7%".into() },
        off_rebounds: (seed % 3).to_string(),
        def_rebounds: (seed % 6).to_string(),
        total_rebounds: (seed % 3 + seed % 6).to_string(),
        assists: (seed % 7).to_string(),
        steals: (seed % 2).to_string(),
        turnovers: (seed % 4).to_string(),
        blocks: (seed % 2).to_string(),
        received_blocks: "0".into(),
        fouls_committed: (seed % 5).to_string(),
        fouls_received: (seed % 4).to_string(),
        efficiency: (seed as i32 % 20 - 3).to_string(),
        plus_minus: (seed as i32 % 15 - 7).to_string(),
    }
}

fn side(team: usize, round: u32) -> Vec<RawStatLine> {
    let mut lines = (0..ROSTER)
        .map(|slot| RawStatLine {
            player_id: format!("t{team:02}-p{slot:02}"),
            role: Role::Player,
            cells: cells(team * 31 + slot * 7 + round as usize),
        })
        .collect::<Vec<_>>();
    let mut total = cells(team + round as usize);
    total.minutes = "200:00".into();
    lines.push(RawStatLine {
        player_id: "total".into(),
        role: Role::TeamTotal,
        cells: total,
    });
    lines
}

/// Circle-method double round robin: every team plays once per round.
fn synthetic_season() -> Vec<GameBoxScoreRaw> {
    let mut games = Vec::new();
    for round in 1..=ROUNDS {
        let shift = (round as usize - 1) % (TEAMS - 1);
        let mut order = vec![0];
        order.extend((0..TEAMS - 1).map(|i| 1 + (i + shift) % (TEAMS - 1)));
        for pair in 0..TEAMS / 2 {
            let (mut home, mut away) = (order[pair], order[TEAMS - 1 - pair]);
            if round > ROUNDS / 2 {
                std::mem::swap(&mut home, &mut away);
            }
            let day = chrono::NaiveDate::from_ymd_opt(2023, 10, 5)
                .expect("valid date")
                + chrono::Days::new(7 * (round as u64 - 1));
            games.push(GameBoxScoreRaw {
                game_id: format!("E2023-{round}-{pair}"),
                home_team: team_name(home),
                away_team: team_name(away),
                round: format!("Round {round}"),
                date: day.format("%Y-%m-%d").to_string(),
                game_time: "20:00".into(),
                home: side(home, round),
                away: side(away, round),
            });
        }
    }
    games
}

fn synthetic_metrics() -> MetricsTable {
    let rows = (0..TEAMS)
        .map(|idx| {
            let x = idx as f64;
            ExternalTeamMetrics {
                team: team_name(idx),
                pace: 70.0 + x * 0.2,
                possessions: 2400.0 + x,
                off_rating: 110.0 + x * 0.5,
                def_rating: 112.0 - x * 0.3,
                net_rating: x * 0.8 - 2.0,
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
        })
        .collect();
    MetricsTable::from_rows(rows).expect("unique synthetic teams")
}

fn bench_normalize(c: &mut Criterion) {
    let games = synthetic_season();
    c.bench_function("normalize_season", |b| {
        b.iter(|| {
            let batch = normalize_batch(black_box(&games));
            black_box(batch.players.len());
        })
    });
}

fn bench_running_averages(c: &mut Criterion) {
    let batch = normalize_batch(&synthetic_season());
    c.bench_function("running_averages_players", |b| {
        b.iter(|| {
            let aggs = running_averages(black_box(&batch.players), ROUNDS).unwrap();
            black_box(aggs.len());
        })
    });
}

fn bench_run_season(c: &mut Criterion) {
    let games = synthetic_season();
    let metrics = synthetic_metrics();
    let cfg = PipelineConfig {
        max_round: ROUNDS,
        ..PipelineConfig::default()
    };
    c.bench_function("run_season", |b| {
        b.iter(|| {
            let table = run_season(black_box(&games), &metrics, "23_24", cfg).unwrap();
            black_box(table.records.len());
        })
    });
}

fn bench_parquet_encode(c: &mut Criterion) {
    let cfg = PipelineConfig {
        max_round: ROUNDS,
        ..PipelineConfig::default()
    };
    let table = run_season(&synthetic_season(), &synthetic_metrics(), "23_24", cfg)
        .expect("synthetic season builds");
    let columns = feature_columns(&table.records);
    c.bench_function("parquet_encode", |b| {
        b.iter(|| {
            let mut buf = Vec::new();
            write_parquet(&mut buf, black_box(&columns)).unwrap();
            black_box(buf.len());
        })
    });
}

criterion_group!(
    perf,
    bench_normalize,
    bench_running_averages,
    bench_run_season,
    bench_parquet_encode
);
criterion_main!(perf);
