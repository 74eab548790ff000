#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Pure system translating agent decisions into purchase and placement commands.

use tower_duel_core::{
    Catalog, Command, Event, GridCoord, GridSize, LevelState, Team, TowerKindId, UnitKindId,
};
use tracing::warn;

/// Raw decision delivered by an agent for one decision step.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum AgentAction {
    /// Attacker decision: which unit to buy.
    Attacker {
        /// Discrete unit selector.
        selector: u32,
    },
    /// Defender decision: which tower to place and where.
    Defender {
        /// Discrete tower selector.
        selector: u32,
        /// Continuous column value in `[-1, 1]`.
        x: f32,
        /// Continuous row value in `[-1, 1]`.
        y: f32,
    },
}

impl AgentAction {
    /// Team the decision belongs to.
    #[must_use]
    pub const fn team(&self) -> Team {
        match self {
            Self::Attacker { .. } => Team::Attacker,
            Self::Defender { .. } => Team::Defender,
        }
    }
}

/// Maps a continuous value onto a grid axis as `floor(|value| * dimension)`.
///
/// Values at or beyond the unit magnitude land on the last row or column.
#[must_use]
pub fn axis_cell(value: f32, dimension: u32) -> Option<u32> {
    if !value.is_finite() || dimension == 0 {
        return None;
    }
    let scaled = (value.abs() * dimension as f32).floor();
    Some((scaled as u32).min(dimension - 1))
}

/// Maps two continuous values onto a placement cell.
#[must_use]
pub fn grid_cell(x: f32, y: f32, grid: GridSize) -> Option<GridCoord> {
    Some(GridCoord::new(
        axis_cell(x, grid.width())?,
        axis_cell(y, grid.height())?,
    ))
}

/// Decodes an attacker selector into a purchase command.
#[must_use]
pub fn decode_attacker(selector: u32, catalog: &Catalog) -> Option<Command> {
    let kind = UnitKindId::new(selector);
    if catalog.unit(kind).is_none() {
        warn!(selector, units = catalog.unit_count(), "unknown unit selector");
        return None;
    }
    Some(Command::BuyUnit { kind })
}

/// Decodes a defender selector and coordinates into a placement command.
#[must_use]
pub fn decode_defender(
    selector: u32,
    x: f32,
    y: f32,
    grid: GridSize,
    catalog: &Catalog,
) -> Option<Command> {
    let kind = TowerKindId::new(selector);
    if catalog.tower(kind).is_none() {
        warn!(selector, towers = catalog.tower_count(), "unknown tower selector");
        return None;
    }
    let Some(cell) = grid_cell(x, y, grid) else {
        warn!(x, y, "placement coordinates are not usable");
        return None;
    };
    Some(Command::PlaceTower { kind, cell })
}

/// Decision decoder that only lets actions through while the level accepts them.
#[derive(Debug, Clone)]
pub struct Builder {
    level_state: LevelState,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    /// Creates a new builder system instance.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            level_state: LevelState::Intro,
        }
    }

    /// Reports whether decisions are currently turned into commands.
    #[must_use]
    pub const fn accepts_actions(&self) -> bool {
        !matches!(
            self.level_state,
            LevelState::Intro | LevelState::Win | LevelState::Lose
        )
    }

    /// Tracks level transitions without decoding a decision.
    pub fn observe(&mut self, events: &[Event]) {
        for event in events {
            if let Event::LevelStateChanged { to, .. } = event {
                self.level_state = *to;
            }
        }
    }

    /// Consumes level events and one agent decision to emit commands.
    pub fn handle(
        &mut self,
        events: &[Event],
        action: AgentAction,
        catalog: &Catalog,
        grid: GridSize,
        out: &mut Vec<Command>,
    ) {
        self.observe(events);

        if !self.accepts_actions() {
            return;
        }

        let command = match action {
            AgentAction::Attacker { selector } => decode_attacker(selector, catalog),
            AgentAction::Defender { selector, x, y } => {
                decode_defender(selector, x, y, grid, catalog)
            }
        };
        out.extend(command);
    }
}
