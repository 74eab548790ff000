#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic randomized wave generation.
//!
//! Each episode draws its own wave count and unit mix from streams derived
//! from the global seed, so a replay with the same seed produces the same
//! waves while consecutive episodes differ.

use std::ops::RangeInclusive;

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use tower_duel_core::{seed::derive_seed, Catalog, SpawnInstruction, UnitKindId, WaveGenerator};
use tracing::{debug, warn};

const RNG_STREAM_WAVE_COUNT: &str = "wave-count";
const RNG_STREAM_WAVE_UNITS: &str = "wave-units";

/// Default inclusive bounds on generated waves per episode.
pub const DEFAULT_WAVE_COUNT: RangeInclusive<u32> = 2..=5;

/// Configuration parameters required to construct the generator.
#[derive(Clone, Debug)]
pub struct Config {
    global_seed: u64,
    wave_count: RangeInclusive<u32>,
}

impl Config {
    /// Creates a new configuration using the provided seed and wave bounds.
    #[must_use]
    pub const fn new(global_seed: u64, wave_count: RangeInclusive<u32>) -> Self {
        Self {
            global_seed,
            wave_count,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(0, DEFAULT_WAVE_COUNT)
    }
}

/// Generator drawing every instruction uniformly from the unit catalog.
#[derive(Debug)]
pub struct RandomWaveGenerator {
    config: Config,
}

impl RandomWaveGenerator {
    /// Creates a generator using the supplied configuration.
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    fn wave_count(&self, episode: u64) -> u32 {
        let (min, max) = (*self.config.wave_count.start(), *self.config.wave_count.end());
        if min >= max {
            return min;
        }
        let seed = derive_seed(self.config.global_seed, RNG_STREAM_WAVE_COUNT, episode);
        ChaCha8Rng::seed_from_u64(seed).gen_range(min..=max)
    }
}

impl WaveGenerator for RandomWaveGenerator {
    fn generate(
        &mut self,
        catalog: &Catalog,
        roster_size: usize,
        episode: u64,
    ) -> Vec<Vec<SpawnInstruction>> {
        let kinds = catalog.unit_count();
        if kinds == 0 {
            warn!("unit catalog is empty; no waves generated");
            return Vec::new();
        }

        let waves = self.wave_count(episode);
        let seed = derive_seed(self.config.global_seed, RNG_STREAM_WAVE_UNITS, episode);
        let mut rng = ChaCha8Rng::seed_from_u64(seed);
        let mut generated = Vec::with_capacity(waves as usize);
        for _ in 0..waves {
            let wave: Vec<SpawnInstruction> = (0..roster_size)
                .filter_map(|_| {
                    let kind = UnitKindId::new(rng.gen_range(0..kinds) as u32);
                    catalog.instruction_for(kind)
                })
                .collect();
            generated.push(wave);
        }
        debug!(episode, waves, roster_size, "generated randomized waves");
        generated
    }
}
