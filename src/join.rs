//! Attach each team's pre-game form to player-games.
//!
//! A player-game in round `R` looks up its own team and its opponent as of
//! round `R - 1`. Team aggregates from the final scheduled round are never
//! used as a prior, since no later round can consume them.

use std::collections::HashMap;
use std::str::FromStr;

use tracing::{info, warn};

use crate::aggregate::EntityAggregate;
use crate::error::{JoinMissError, MissingSide, PipelineError};
use crate::stats::TypedStatRow;

/// What round 1 player-games join against, since no earlier round exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RoundOnePolicy {
    /// Join against round 1 itself. The team prior then includes the game
    /// being described.
    #[default]
    ClampToFirstRound,
    /// Leave round 1 player-games out of the output.
    Skip,
}

impl FromStr for RoundOnePolicy {
    type Err = PipelineError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "clamp" | "clamp_to_first_round" => Ok(Self::ClampToFirstRound),
            "skip" => Ok(Self::Skip),
            other => Err(PipelineError::Config(format!(
                "unknown round one policy {other:?} (expected clamp or skip)"
            ))),
        }
    }
}

impl RoundOnePolicy {
    /// Round whose team aggregates serve as the prior for a game in `round`.
    pub fn lookup_round(self, round: u32) -> Option<u32> {
        match round.saturating_sub(1) {
            0 => match self {
                Self::ClampToFirstRound => Some(1),
                Self::Skip => None,
            },
            prior => Some(prior),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TeamRoundKey {
    pub team: String,
    pub round: u32,
}

impl TeamRoundKey {
    pub fn new(team: impl Into<String>, round: u32) -> Self {
        Self {
            team: team.into(),
            round,
        }
    }
}

/// Team aggregates eligible to be a prior, keyed by `(team, round)`.
#[derive(Debug, Default)]
pub struct PriorTeamTable<'a> {
    by_key: HashMap<TeamRoundKey, &'a EntityAggregate>,
}

impl<'a> PriorTeamTable<'a> {
    pub fn build(team_aggregates: &'a [EntityAggregate], max_round: u32) -> Self {
        let by_key = team_aggregates
            .iter()
            .filter(|agg| agg.round != max_round)
            .map(|agg| (TeamRoundKey::new(agg.entity.clone(), agg.round), agg))
            .collect();
        Self { by_key }
    }

    pub fn get(&self, team: &str, round: u32) -> Option<&'a EntityAggregate> {
        self.by_key.get(&TeamRoundKey::new(team, round)).copied()
    }

    pub fn len(&self) -> usize {
        self.by_key.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_key.is_empty()
    }
}

#[derive(Debug, Clone, Copy)]
pub struct JoinConfig {
    pub max_round: u32,
    pub round_one: RoundOnePolicy,
}

/// A player-game with its own running form and both teams' priors.
#[derive(Debug, Clone, PartialEq)]
pub struct PriorFormRecord {
    pub row: TypedStatRow,
    pub player: EntityAggregate,
    pub lookup_round: u32,
    pub own_team: EntityAggregate,
    pub opponent: EntityAggregate,
}

#[derive(Debug, Default)]
pub struct PriorJoinOutput {
    pub records: Vec<PriorFormRecord>,
    pub misses: Vec<JoinMissError>,
    pub round_one_skipped: usize,
}

/// `players[i]` must pair with `player_aggregates[i]`.
pub fn join_prior_round(
    players: &[TypedStatRow],
    player_aggregates: &[EntityAggregate],
    team_aggregates: &[EntityAggregate],
    cfg: JoinConfig,
) -> PriorJoinOutput {
    debug_assert_eq!(players.len(), player_aggregates.len());
    let priors = PriorTeamTable::build(team_aggregates, cfg.max_round);
    let mut out = PriorJoinOutput::default();

    for (row, player) in players.iter().zip(player_aggregates) {
        let Some(lookup_round) = cfg.round_one.lookup_round(row.game.round) else {
            out.round_one_skipped += 1;
            continue;
        };
        let own = priors.get(&row.game.team, lookup_round);
        let opp = priors.get(&row.game.opponent, lookup_round);
        let missing = match (own, opp) {
            (Some(own), Some(opp)) => {
                out.records.push(PriorFormRecord {
                    row: row.clone(),
                    player: player.clone(),
                    lookup_round,
                    own_team: own.clone(),
                    opponent: opp.clone(),
                });
                continue;
            }
            (None, Some(_)) => MissingSide::OwnTeam,
            (Some(_), None) => MissingSide::Opponent,
            (None, None) => MissingSide::Both,
        };
        out.misses.push(JoinMissError {
            player_id: row.player_id.clone(),
            team: row.game.team.clone(),
            opponent: row.game.opponent.clone(),
            round: row.game.round,
            lookup_round,
            missing,
        });
    }

    info!(
        joined = out.records.len(),
        priors = priors.len(),
        "prior-round team form attached"
    );
    if !out.misses.is_empty() {
        warn!(rows = out.misses.len(), "player-games without a prior-round team record");
    }
    out
}
