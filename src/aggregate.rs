//! Season-to-date running averages per entity (player or team).
//!
//! Rows are grouped by entity, ordered by game date (round breaks ties) and
//! scanned once per entity. Entities are independent, so the scans run in
//! parallel; results are scattered back into input order.

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{debug, info};

use crate::error::{PipelineError, Result};
use crate::stats::{EntityRow, Stat, StatAverages};

/// One entity's running form after a given round.
#[derive(Debug, Clone, PartialEq)]
pub struct EntityAggregate {
    pub entity: String,
    pub round: u32,
    /// 1-based count of games this entity has played up to and including `round`.
    pub game_number: u32,
    pub averages: StatAverages,
}

impl EntityAggregate {
    pub fn avg(&self, stat: Stat) -> Option<f64> {
        self.averages.get(stat)
    }
}

/// Returns one aggregate per input row, aligned with `rows` by index.
///
/// Fails when an entity has two rows for the same round or a round outside
/// `1..=max_round`; either would make its running order ambiguous.
pub fn running_averages<R>(rows: &[R], max_round: u32) -> Result<Vec<EntityAggregate>>
where
    R: EntityRow + Sync,
{
    let groups = ordered_groups(rows, max_round)?;

    let scanned = groups
        .par_iter()
        .map(|(entity, indices)| scan_entity(rows, entity, indices))
        .collect::<Vec<_>>();

    let mut slots: Vec<Option<EntityAggregate>> = vec![None; rows.len()];
    for entity_rows in scanned {
        for (idx, agg) in entity_rows {
            slots[idx] = Some(agg);
        }
    }

    let out = slots.into_iter().flatten().collect::<Vec<_>>();
    debug_assert_eq!(out.len(), rows.len());
    info!(
        kind = R::KIND,
        entities = groups.len(),
        rows = out.len(),
        "running averages computed"
    );
    Ok(out)
}

/// Row indices per entity in chronological order, validated.
fn ordered_groups<'a, R: EntityRow>(
    rows: &'a [R],
    max_round: u32,
) -> Result<Vec<(&'a str, Vec<usize>)>> {
    let mut by_entity: BTreeMap<&str, Vec<usize>> = BTreeMap::new();
    for (idx, row) in rows.iter().enumerate() {
        let round = row.game().round;
        if round == 0 || round > max_round {
            return Err(PipelineError::RoundOutOfRange {
                entity: row.entity_key().to_string(),
                round,
                max_round,
            });
        }
        by_entity.entry(row.entity_key()).or_default().push(idx);
    }

    let mut groups = Vec::with_capacity(by_entity.len());
    for (entity, mut indices) in by_entity {
        indices.sort_by(|&a, &b| {
            let (ga, gb) = (rows[a].game(), rows[b].game());
            ga.date.cmp(&gb.date).then(ga.round.cmp(&gb.round))
        });
        let mut rounds = indices
            .iter()
            .map(|&idx| rows[idx].game().round)
            .collect::<Vec<_>>();
        rounds.sort_unstable();
        if let Some(pair) = rounds.windows(2).find(|pair| pair[0] == pair[1]) {
            return Err(PipelineError::DuplicateEntityRound {
                entity_kind: R::KIND,
                entity: entity.to_string(),
                round: pair[0],
            });
        }
        groups.push((entity, indices));
    }
    Ok(groups)
}

fn scan_entity<R: EntityRow>(
    rows: &[R],
    entity: &str,
    indices: &[usize],
) -> Vec<(usize, EntityAggregate)> {
    let mut sums = [0.0_f64; Stat::COUNT];
    let mut out = Vec::with_capacity(indices.len());

    for (pos, &idx) in indices.iter().enumerate() {
        let game_number = (pos + 1) as u32;
        let line = rows[idx].line();
        let mut averages = StatAverages::default();
        for (slot, stat) in Stat::ALL.into_iter().enumerate() {
            // A null game keeps a null average but still counts in later denominators.
            let avg = line.value(stat).map(|value| {
                sums[slot] += value;
                sums[slot] / game_number as f64
            });
            averages.set(stat, avg);
        }
        out.push((
            idx,
            EntityAggregate {
                entity: entity.to_string(),
                round: rows[idx].game().round,
                game_number,
                averages,
            },
        ));
    }

    debug!(entity, games = indices.len(), "entity scanned");
    out
}
