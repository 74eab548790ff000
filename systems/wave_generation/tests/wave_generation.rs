use proptest::prelude::*;
use tower_duel_core::{Catalog, WaveGenerator};
use tower_duel_system_wave_generation::{Config, RandomWaveGenerator};

fn generate(seed: u64, episode: u64) -> Vec<Vec<u32>> {
    let mut generator = RandomWaveGenerator::new(Config::new(seed, 2..=5));
    generator
        .generate(&Catalog::default(), 15, episode)
        .into_iter()
        .map(|wave| wave.iter().map(|instruction| instruction.unit().get()).collect())
        .collect()
}

#[test]
fn replays_are_identical_for_the_same_seed() {
    assert_eq!(generate(42, 3), generate(42, 3), "replay diverged");
}

#[test]
fn episodes_draw_different_waves() {
    let episodes: Vec<_> = (0..8).map(|episode| generate(42, episode)).collect();
    assert!(
        episodes.windows(2).any(|pair| pair[0] != pair[1]),
        "every episode produced identical waves"
    );
}

#[test]
fn empty_catalog_generates_nothing() {
    let mut generator = RandomWaveGenerator::new(Config::default());
    let catalog = Catalog::new(Vec::new(), Vec::new());
    assert!(generator.generate(&catalog, 15, 0).is_empty());
}

proptest! {
    #[test]
    fn waves_respect_count_bounds_and_roster(seed in any::<u64>(), episode in 0_u64..1_000) {
        let waves = generate(seed, episode);
        prop_assert!((2..=5).contains(&waves.len()), "wave count {} out of bounds", waves.len());
        for wave in waves {
            prop_assert_eq!(wave.len(), 15);
            prop_assert!(wave.iter().all(|kind| *kind < 3), "kind outside the catalog");
        }
    }
}
