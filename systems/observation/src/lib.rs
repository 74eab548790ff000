#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Fixed-layout feature vectors describing the battlefield to either agent.
//!
//! Every observation holds a short scalar vector plus two variable-length
//! buffers: one entry per placed tower and one per live unit.

use serde::{Deserialize, Serialize};
use tower_duel_core::{Catalog, GridSize, Team, TowerView, UnitView};
use tracing::warn;

/// Divisors that bring raw quantities into a unit range.
///
/// Cost divisors are not configured here; the encoder takes them from the
/// most expensive unit and tower of the catalog it is built for.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Normalization {
    /// Divisor for currency balances.
    pub currency: f32,
    /// Divisor for the attacker's flat income.
    pub income: f32,
    /// Divisor for unit and tower kind indices.
    pub kind: f32,
    /// Divisor for per-unit income bonuses.
    pub extra_income: f32,
}

impl Default for Normalization {
    fn default() -> Self {
        Self {
            currency: 500.0,
            income: 250.0,
            kind: 3.0,
            extra_income: 5.0,
        }
    }
}

/// Raw per-team quantities sampled between ticks.
#[derive(Clone, Copy, Debug)]
pub struct ObservationInput<'a> {
    /// Team the observation is built for.
    pub team: Team,
    /// Current balance of that team.
    pub balance: u32,
    /// Attacker flat income per tick; ignored for the defender.
    pub income: u32,
    /// Combined home-base health as a fraction of its maximum.
    pub base_health_ratio: f32,
    /// Towers standing on the grid.
    pub towers: &'a TowerView,
    /// Units alive on the battlefield.
    pub units: &'a UnitView,
    /// Catalog resolving kinds to costs.
    pub catalog: &'a Catalog,
}

/// Encoded observation for one decision step.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Observation {
    /// Scalar features.
    pub vector: Vec<f32>,
    /// One entry of `tile_count + 3` floats per placed tower.
    pub towers: Vec<Vec<f32>>,
    /// One entry of `roster_size + 3` floats per live unit.
    pub units: Vec<Vec<f32>>,
}

/// Encodes battlefield snapshots into observations.
#[derive(Clone, Copy, Debug)]
pub struct ObservationEncoder {
    normalization: Normalization,
    unit_cost_scale: f32,
    tower_cost_scale: f32,
    grid: GridSize,
    roster_size: usize,
}

impl ObservationEncoder {
    /// Creates an encoder for a placement grid and roster size.
    ///
    /// Costs are scaled by the highest unit and tower price in `catalog`, so
    /// the most expensive item of each side always encodes as `1.0`.
    #[must_use]
    pub fn new(
        normalization: Normalization,
        catalog: &Catalog,
        grid: GridSize,
        roster_size: usize,
    ) -> Self {
        Self {
            normalization,
            unit_cost_scale: catalog.max_unit_cost() as f32,
            tower_cost_scale: catalog.max_tower_cost() as f32,
            grid,
            roster_size,
        }
    }

    /// Divisors applied to unit and tower costs, in that order.
    #[must_use]
    pub const fn cost_scales(&self) -> (f32, f32) {
        (self.unit_cost_scale, self.tower_cost_scale)
    }

    /// Length of the scalar vector for `team`.
    #[must_use]
    pub const fn vector_len(team: Team) -> usize {
        match team {
            Team::Attacker => 3,
            Team::Defender => 2,
        }
    }

    /// Length of every tower entry.
    #[must_use]
    pub const fn tower_entry_len(&self) -> usize {
        self.grid.tile_count() + 3
    }

    /// Length of every unit entry.
    #[must_use]
    pub const fn unit_entry_len(&self) -> usize {
        self.roster_size + 3
    }

    /// Builds the observation for `input.team`.
    #[must_use]
    pub fn encode(&self, input: &ObservationInput<'_>) -> Observation {
        let norm = &self.normalization;
        let mut vector = Vec::with_capacity(Self::vector_len(input.team));
        vector.push(ratio(input.balance as f32, norm.currency));
        vector.push(input.base_health_ratio);
        if input.team == Team::Attacker {
            vector.push(ratio(input.income as f32, norm.income));
        }

        Observation {
            vector,
            towers: self.encode_towers(input),
            units: self.encode_units(input),
        }
    }

    fn encode_towers(&self, input: &ObservationInput<'_>) -> Vec<Vec<f32>> {
        let kind_scale = self.normalization.kind;
        let tiles = self.grid.tile_count();
        let mut entries = Vec::with_capacity(input.towers.len());
        for tower in input.towers.iter() {
            let mut entry = vec![0.0; self.tower_entry_len()];
            match self.grid.tile_index(tower.cell) {
                Some(slot) => {
                    entry[slot] = ratio(tower.kind.get() as f32, kind_scale);
                }
                None => warn!(
                    tower = tower.id.get(),
                    x = tower.cell.x(),
                    y = tower.cell.y(),
                    tiles,
                    "tower tile outside observation range"
                ),
            }
            entry[tiles] = axis_ratio(tower.cell.x(), self.grid.width());
            entry[tiles + 1] = axis_ratio(tower.cell.y(), self.grid.height());
            let cost = input
                .catalog
                .tower(tower.kind)
                .map_or(0, |definition| definition.cost());
            entry[tiles + 2] = ratio(cost as f32, self.tower_cost_scale);
            entries.push(entry);
        }
        entries
    }

    fn encode_units(&self, input: &ObservationInput<'_>) -> Vec<Vec<f32>> {
        let norm = &self.normalization;
        let roster = self.roster_size;
        let mut entries = Vec::with_capacity(input.units.len());
        for (position, unit) in input.units.iter().enumerate() {
            let mut entry = vec![0.0; self.unit_entry_len()];
            if roster > 0 {
                let slot = if position < roster {
                    position
                } else {
                    warn!(position, roster, "unit slot clamped to the last roster slot");
                    roster - 1
                };
                entry[slot] = ratio(unit.kind.get() as f32, norm.kind);
            }
            let (cost, extra) = input
                .catalog
                .unit(unit.kind)
                .map_or((0, 0), |definition| {
                    (definition.cost(), definition.extra_income())
                });
            entry[roster] = ratio(cost as f32, self.unit_cost_scale);
            entry[roster + 1] = ratio(extra as f32, norm.extra_income);
            entries.push(entry);
        }
        entries
    }
}

fn ratio(value: f32, scale: f32) -> f32 {
    if scale > 0.0 {
        value / scale
    } else {
        0.0
    }
}

fn axis_ratio(coordinate: u32, dimension: u32) -> f32 {
    if dimension > 1 {
        coordinate as f32 / (dimension - 1) as f32
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_scales_encode_as_zero() {
        assert_eq!(ratio(10.0, 0.0), 0.0);
        assert_eq!(axis_ratio(0, 1), 0.0);
        assert_eq!(axis_ratio(5, 6), 1.0);
    }
}
