use std::time::Duration;

use proptest::prelude::*;
use tower_duel_core::{
    Catalog, Command, Event, SpawnInstruction, SpawnNodeId, UnitKindId, WaveGenerator,
};
use tower_duel_system_spawning::{
    Config, QueueError, SchedulerPhase, SequenceState, SpawnSequence, WaveMode, WaveScheduler,
};
use tower_duel_world::{self as world, query, World};

fn instruction(kind: u32, delay_ms: u64) -> SpawnInstruction {
    SpawnInstruction::new(
        UnitKindId::new(kind),
        SpawnNodeId::new(0),
        Duration::from_millis(delay_ms),
    )
}

fn composed(roster: usize, sequences: u32) -> WaveScheduler {
    WaveScheduler::new(Config::new(
        roster,
        WaveMode::Composed,
        sequences..sequences + 1,
        0xfeed,
    ))
}

fn spawned_kinds(commands: &[Command]) -> Vec<u32> {
    commands
        .iter()
        .filter_map(|command| match command {
            Command::SpawnUnit { kind, .. } => Some(kind.get()),
            _ => None,
        })
        .collect()
}

struct FixedWaves(Vec<Vec<SpawnInstruction>>);

impl WaveGenerator for FixedWaves {
    fn generate(
        &mut self,
        _catalog: &Catalog,
        _roster_size: usize,
        _episode: u64,
    ) -> Vec<Vec<SpawnInstruction>> {
        self.0.clone()
    }
}

#[test]
fn zero_delay_burst_spawns_in_one_tick() {
    let mut sequence = SpawnSequence::from_instructions(vec![
        instruction(0, 0),
        instruction(1, 0),
        instruction(2, 2_000),
    ]);
    assert!(sequence.init());

    let mut commands = Vec::new();
    let completed = sequence.tick(Duration::from_millis(100), &mut commands);

    assert!(!completed, "third instruction is still pending");
    assert_eq!(spawned_kinds(&commands), vec![0, 1]);
    assert_eq!(
        sequence.remaining(),
        Duration::from_millis(1_900),
        "overshoot carries into the next delay"
    );
}

#[test]
fn sequence_signals_completion_once_and_rewinds() {
    let mut sequence =
        SpawnSequence::from_instructions(vec![instruction(0, 500), instruction(0, 500)]);
    assert!(sequence.init());

    let mut commands = Vec::new();
    let mut completions = 0;
    for _ in 0..10 {
        if sequence.tick(Duration::from_millis(500), &mut commands) {
            completions += 1;
        }
    }

    assert_eq!(completions, 1, "completion is reported exactly once");
    assert_eq!(commands.len(), 2);
    assert_eq!(sequence.state(), SequenceState::Completed);
    assert_eq!(sequence.progress(), 0.0, "cursor rewinds on completion");
}

proptest! {
    #[test]
    fn progress_never_decreases_within_an_activation(
        delays in proptest::collection::vec(0_u64..1_000, 1..20),
        steps in proptest::collection::vec(1_u64..400, 1..80),
    ) {
        let instructions = delays.iter().map(|delay| instruction(0, *delay)).collect();
        let mut sequence = SpawnSequence::from_instructions(instructions);
        prop_assert!(sequence.init());

        let mut last = sequence.progress();
        let mut commands = Vec::new();
        for step in steps {
            if sequence.tick(Duration::from_millis(step), &mut commands) {
                break;
            }
            let progress = sequence.progress();
            prop_assert!(progress >= last, "progress went from {} to {}", last, progress);
            last = progress;
        }
    }
}

#[test]
fn empty_scheduler_completes_without_spawning() {
    let mut scheduler = composed(15, 2);
    let mut commands = Vec::new();
    let mut events = Vec::new();

    let completed = scheduler.start_all(None, &Catalog::default(), 0, 0, &mut events);
    scheduler.tick(Duration::from_secs(5), &mut commands, &mut events);

    assert!(completed, "spawning completes immediately on an empty battlefield");
    assert_eq!(events, vec![Event::SpawningCompleted]);
    assert!(commands.is_empty(), "no spawn may occur");
    assert_eq!(scheduler.phase(), SchedulerPhase::Completed);
}

#[test]
fn terminal_wait_holds_until_battlefield_is_clear() {
    let mut scheduler = composed(1, 1);
    let _ = scheduler
        .queue_instruction(instruction(0, 0))
        .expect("roster accepts the unit");

    let mut world = World::default();
    let mut commands = Vec::new();
    let mut events = Vec::new();
    assert!(!scheduler.start_all(None, &Catalog::default(), 0, 0, &mut events));
    scheduler.tick(Duration::from_millis(10), &mut commands, &mut events);
    for command in commands.drain(..) {
        world::apply(&mut world, command, &mut events);
    }

    let live = query::live_unit_count(&world);
    assert_eq!(live, 1);
    assert!(!scheduler.poll(live, &mut events), "a live unit blocks completion");
    assert_eq!(scheduler.phase(), SchedulerPhase::Draining);
    assert!(scheduler.poll(0, &mut events));
    assert!(!scheduler.poll(0, &mut events), "completion fires once");
}

#[test]
fn purchases_after_the_last_wave_are_refused() {
    let mut scheduler = composed(1, 3);
    assert_eq!(scheduler.can_queue(), Ok(()));
    let _ = scheduler
        .queue_instruction(instruction(0, 0))
        .expect("roster accepts the unit");

    let mut commands = Vec::new();
    let mut events = Vec::new();
    let _ = scheduler.start_all(None, &Catalog::default(), 0, 1, &mut events);
    scheduler.tick(Duration::from_millis(10), &mut commands, &mut events);
    assert_eq!(scheduler.phase(), SchedulerPhase::Draining);

    assert_eq!(scheduler.can_queue(), Err(QueueError::WavesFinished));
    assert_eq!(
        scheduler.queue_instruction(instruction(1, 0)),
        Err(QueueError::WavesFinished)
    );
    assert_eq!(scheduler.total_waves(), 1, "no wave opened after draining began");
}

#[test]
fn next_wave_waits_for_a_full_roster() {
    let mut scheduler = composed(2, 2);
    for _ in 0..2 {
        let _ = scheduler
            .queue_instruction(instruction(0, 0))
            .expect("first roster");
    }
    let queued = scheduler
        .queue_instruction(instruction(1, 0))
        .expect("second wave opens");
    assert_eq!(queued.wave, 2);
    assert!(!queued.filled);

    let mut commands = Vec::new();
    let mut events = Vec::new();
    let _ = scheduler.start_all(None, &Catalog::default(), 0, 0, &mut events);
    scheduler.tick(Duration::from_millis(1), &mut commands, &mut events);
    assert_eq!(spawned_kinds(&commands), vec![0, 0]);
    assert_eq!(scheduler.phase(), SchedulerPhase::AwaitingNext { next: 1 });

    assert!(!scheduler.poll(0, &mut events));
    scheduler.tick(Duration::from_secs(10), &mut commands, &mut events);
    assert_eq!(commands.len(), 2, "second wave must not start while composing");

    let queued = scheduler
        .queue_instruction(instruction(1, 0))
        .expect("second roster fills");
    assert!(queued.filled);
    assert!(!scheduler.poll(0, &mut events));
    assert_eq!(scheduler.phase(), SchedulerPhase::Running { index: 1 });
    assert_eq!(scheduler.wave_number(), 2);

    scheduler.tick(Duration::from_millis(1), &mut commands, &mut events);
    assert_eq!(spawned_kinds(&commands), vec![0, 0, 1, 1]);

    let order: Vec<_> = events
        .iter()
        .filter_map(|event| match event {
            Event::WaveQueued { wave, .. } => Some(("queued", *wave)),
            Event::WaveCompleted { wave } => Some(("completed", *wave)),
            _ => None,
        })
        .collect();
    assert_eq!(
        order,
        vec![
            ("queued", 1),
            ("completed", 1),
            ("queued", 2),
            ("completed", 2)
        ],
        "waves activate strictly in order"
    );
}

#[test]
fn queueing_respects_the_sequence_budget() {
    let mut scheduler = composed(1, 2);
    assert!(scheduler.queue_instruction(instruction(0, 0)).is_ok());
    assert!(scheduler.queue_instruction(instruction(0, 0)).is_ok());
    assert_eq!(
        scheduler.queue_instruction(instruction(0, 0)),
        Err(QueueError::RosterExhausted { max_sequences: 2 })
    );
    assert_eq!(scheduler.total_waves(), 2);
}

#[test]
fn randomized_mode_uses_generated_waves() {
    let mut scheduler = WaveScheduler::new(Config::new(2, WaveMode::Randomized, 2..5, 1));
    assert_eq!(
        scheduler.queue_instruction(instruction(0, 0)),
        Err(QueueError::GeneratedWaves)
    );

    let mut generator = FixedWaves(vec![
        vec![instruction(2, 0), instruction(1, 0)],
        vec![instruction(0, 0), instruction(0, 0)],
    ]);
    let mut commands = Vec::new();
    let mut events = Vec::new();
    let generator: &mut dyn WaveGenerator = &mut generator;
    let _ = scheduler.start_all(Some(generator), &Catalog::default(), 0, 0, &mut events);
    scheduler.tick(Duration::from_millis(1), &mut commands, &mut events);
    let _ = scheduler.poll(2, &mut events);
    scheduler.tick(Duration::from_millis(1), &mut commands, &mut events);

    assert_eq!(spawned_kinds(&commands), vec![2, 1, 0, 0]);
    assert_eq!(scheduler.total_waves(), 2);
}

#[test]
fn reset_is_idempotent() {
    let mut scheduler = composed(1, 3);
    let _ = scheduler.queue_instruction(instruction(0, 500));
    let mut events = Vec::new();
    let _ = scheduler.start_all(None, &Catalog::default(), 0, 0, &mut events);

    scheduler.reset(4);
    let once = (
        scheduler.phase(),
        scheduler.total_waves(),
        scheduler.max_sequences(),
        scheduler.wave_number(),
    );
    scheduler.reset(4);
    let twice = (
        scheduler.phase(),
        scheduler.total_waves(),
        scheduler.max_sequences(),
        scheduler.wave_number(),
    );

    assert_eq!(once, twice);
    assert_eq!(once, (SchedulerPhase::Dormant, 0, 3, 1));

    let mut commands = Vec::new();
    scheduler.tick(Duration::from_secs(5), &mut commands, &mut events);
    assert!(commands.is_empty(), "no stale timer survives a reset");
}

#[test]
fn sequence_budget_stays_inside_configured_bounds() {
    let mut scheduler = WaveScheduler::new(Config::new(15, WaveMode::Composed, 2..5, 99));
    for episode in 0..64 {
        scheduler.reset(episode);
        assert!(
            (2..5).contains(&scheduler.max_sequences()),
            "budget {} escaped its bounds",
            scheduler.max_sequences()
        );
    }
}
