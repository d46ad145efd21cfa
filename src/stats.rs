use chrono::NaiveDate;

/// Every numeric box-score stat carried through aggregation, in output column order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Stat {
    SecondsPlayed,
    Points,
    TwoPtMakes,
    TwoPtAttempts,
    TwoPtPct,
    ThreePtMakes,
    ThreePtAttempts,
    ThreePtPct,
    FreeThrowMakes,
    FreeThrowAttempts,
    FreeThrowPct,
    OffRebounds,
    DefRebounds,
    TotalRebounds,
    Assists,
    Steals,
    Turnovers,
    Blocks,
    ReceivedBlocks,
    FoulsCommitted,
    FoulsReceived,
    Efficiency,
    PlusMinus,
}

impl Stat {
    pub const COUNT: usize = 23;

    pub const ALL: [Stat; Stat::COUNT] = [
        Stat::SecondsPlayed,
        Stat::Points,
        Stat::TwoPtMakes,
        Stat::TwoPtAttempts,
        Stat::TwoPtPct,
        Stat::ThreePtMakes,
        Stat::ThreePtAttempts,
        Stat::ThreePtPct,
        Stat::FreeThrowMakes,
        Stat::FreeThrowAttempts,
        Stat::FreeThrowPct,
        Stat::OffRebounds,
        Stat::DefRebounds,
        Stat::TotalRebounds,
        Stat::Assists,
        Stat::Steals,
        Stat::Turnovers,
        Stat::Blocks,
        Stat::ReceivedBlocks,
        Stat::FoulsCommitted,
        Stat::FoulsReceived,
        Stat::Efficiency,
        Stat::PlusMinus,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Stat::SecondsPlayed => "seconds_played",
            Stat::Points => "points",
            Stat::TwoPtMakes => "two_pt_makes",
            Stat::TwoPtAttempts => "two_pt_attempts",
            Stat::TwoPtPct => "two_pt_pct",
            Stat::ThreePtMakes => "three_pt_makes",
            Stat::ThreePtAttempts => "three_pt_attempts",
            Stat::ThreePtPct => "three_pt_pct",
            Stat::FreeThrowMakes => "free_throw_makes",
            Stat::FreeThrowAttempts => "free_throw_attempts",
            Stat::FreeThrowPct => "free_throw_pct",
            Stat::OffRebounds => "off_rebounds",
            Stat::DefRebounds => "def_rebounds",
            Stat::TotalRebounds => "total_rebounds",
            Stat::Assists => "assists",
            Stat::Steals => "steals",
            Stat::Turnovers => "turnovers",
            Stat::Blocks => "blocks",
            Stat::ReceivedBlocks => "received_blocks",
            Stat::FoulsCommitted => "fouls_committed",
            Stat::FoulsReceived => "fouls_received",
            Stat::Efficiency => "efficiency",
            Stat::PlusMinus => "plus_minus",
        }
    }

    /// Percentage stats may be null; every other stat is always present.
    pub fn is_percentage(self) -> bool {
        matches!(self, Stat::TwoPtPct | Stat::ThreePtPct | Stat::FreeThrowPct)
    }

    fn index(self) -> usize {
        self as usize
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ShotSplit {
    pub makes: u32,
    pub attempts: u32,
}

/// Typed stats for one line of a box score (a player or a team total).
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatLine {
    pub seconds_played: u32,
    pub points: i32,
    pub two_pt: ShotSplit,
    pub two_pt_pct: Option<f64>,
    pub three_pt: ShotSplit,
    pub three_pt_pct: Option<f64>,
    pub free_throw: ShotSplit,
    pub free_throw_pct: Option<f64>,
    pub off_rebounds: i32,
    pub def_rebounds: i32,
    pub total_rebounds: i32,
    pub assists: i32,
    pub steals: i32,
    pub turnovers: i32,
    pub blocks: i32,
    pub received_blocks: i32,
    pub fouls_committed: i32,
    pub fouls_received: i32,
    pub efficiency: i32,
    pub plus_minus: i32,
}

impl StatLine {
    pub fn value(&self, stat: Stat) -> Option<f64> {
        let v = match stat {
            Stat::SecondsPlayed => self.seconds_played as f64,
            Stat::Points => self.points as f64,
            Stat::TwoPtMakes => self.two_pt.makes as f64,
            Stat::TwoPtAttempts => self.two_pt.attempts as f64,
            Stat::TwoPtPct => return self.two_pt_pct,
            Stat::ThreePtMakes => self.three_pt.makes as f64,
            Stat::ThreePtAttempts => self.three_pt.attempts as f64,
            Stat::ThreePtPct => return self.three_pt_pct,
            Stat::FreeThrowMakes => self.free_throw.makes as f64,
            Stat::FreeThrowAttempts => self.free_throw.attempts as f64,
            Stat::FreeThrowPct => return self.free_throw_pct,
            Stat::OffRebounds => self.off_rebounds as f64,
            Stat::DefRebounds => self.def_rebounds as f64,
            Stat::TotalRebounds => self.total_rebounds as f64,
            Stat::Assists => self.assists as f64,
            Stat::Steals => self.steals as f64,
            Stat::Turnovers => self.turnovers as f64,
            Stat::Blocks => self.blocks as f64,
            Stat::ReceivedBlocks => self.received_blocks as f64,
            Stat::FoulsCommitted => self.fouls_committed as f64,
            Stat::FoulsReceived => self.fouls_received as f64,
            Stat::Efficiency => self.efficiency as f64,
            Stat::PlusMinus => self.plus_minus as f64,
        };
        Some(v)
    }
}

/// Running averages for every [`Stat`], indexed by the stat.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct StatAverages([Option<f64>; Stat::COUNT]);

impl StatAverages {
    pub fn get(&self, stat: Stat) -> Option<f64> {
        self.0[stat.index()]
    }

    pub(crate) fn set(&mut self, stat: Stat, value: Option<f64>) {
        self.0[stat.index()] = value;
    }
}

/// Fields shared by every row of one team's side of one game.
#[derive(Debug, Clone, PartialEq)]
pub struct GameContext {
    pub team: String,
    pub opponent: String,
    pub is_home: bool,
    pub round: u32,
    pub date: NaiveDate,
    pub game_time: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TypedStatRow {
    pub player_id: String,
    pub game: GameContext,
    pub line: StatLine,
}

#[derive(Debug, Clone, PartialEq)]
pub struct TeamGameRow {
    pub game: GameContext,
    pub line: StatLine,
}

/// A row that can be grouped into an entity's chronological series.
pub trait EntityRow {
    const KIND: &'static str;

    fn entity_key(&self) -> &str;
    fn game(&self) -> &GameContext;
    fn line(&self) -> &StatLine;
}

impl EntityRow for TypedStatRow {
    const KIND: &'static str = "player";

    fn entity_key(&self) -> &str {
        &self.player_id
    }

    fn game(&self) -> &GameContext {
        &self.game
    }

    fn line(&self) -> &StatLine {
        &self.line
    }
}

impl EntityRow for TeamGameRow {
    const KIND: &'static str = "team";

    fn entity_key(&self) -> &str {
        &self.game.team
    }

    fn game(&self) -> &GameContext {
        &self.game
    }

    fn line(&self) -> &StatLine {
        &self.line
    }
}
