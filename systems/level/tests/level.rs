use std::{cell::RefCell, rc::Rc};

use tower_duel_core::LevelState;
use tower_duel_system_level::{LevelStateMachine, LevelTransition};

fn states(transitions: &[LevelTransition]) -> Vec<LevelState> {
    transitions.iter().map(|transition| transition.to).collect()
}

fn spawning_level() -> LevelStateMachine {
    let mut level = LevelStateMachine::new(false);
    let _ = level.start();
    let _ = level.building_completed();
    assert_eq!(level.state(), LevelState::SpawningEnemies);
    level
}

#[test]
fn start_skips_a_missing_intro() {
    let mut level = LevelStateMachine::new(false);
    assert_eq!(states(&level.start()), vec![LevelState::Building]);

    let mut with_intro = LevelStateMachine::new(true);
    assert!(with_intro.start().is_empty(), "intro must finish first");
    assert_eq!(states(&with_intro.intro_completed()), vec![LevelState::Building]);
}

#[test]
fn base_loss_during_building_loses_immediately() {
    let mut level = LevelStateMachine::new(false);
    let _ = level.start();

    let transitions = level.home_bases_destroyed();

    assert_eq!(
        transitions,
        vec![LevelTransition {
            from: LevelState::Building,
            to: LevelState::Lose
        }]
    );
    assert!(level.is_game_over());
}

#[test]
fn empty_battlefield_wins_on_spawning_completion() {
    let mut level = spawning_level();
    assert_eq!(
        states(&level.spawning_completed(0)),
        vec![LevelState::AllEnemiesSpawned, LevelState::Win]
    );
}

#[test]
fn win_waits_for_the_last_unit() {
    let mut level = spawning_level();
    assert_eq!(
        states(&level.spawning_completed(2)),
        vec![LevelState::AllEnemiesSpawned]
    );
    assert!(level.population_changed(1).is_empty());
    assert_eq!(states(&level.population_changed(0)), vec![LevelState::Win]);
}

#[test]
fn terminal_states_are_exclusive() {
    let mut level = spawning_level();
    let _ = level.spawning_completed(0);
    assert_eq!(level.state(), LevelState::Win);

    assert!(level.home_bases_destroyed().is_empty(), "win cannot become lose");
    assert!(level.population_changed(0).is_empty());
    assert!(level.building_completed().is_empty());
    assert_eq!(level.state(), LevelState::Win);
}

#[test]
fn out_of_order_signals_are_ignored() {
    let mut level = LevelStateMachine::new(false);
    let _ = level.start();
    assert!(level.spawning_completed(0).is_empty(), "spawning never started");
    assert!(level.intro_completed().is_empty(), "no backward edges");
    assert_eq!(level.state(), LevelState::Building);
}

#[test]
fn observers_see_transitions_in_subscription_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut level = LevelStateMachine::new(false);
    for name in ["coordinator", "logger"] {
        let log = Rc::clone(&log);
        let _ = level.subscribe(move |transition: &LevelTransition| {
            log.borrow_mut().push((name, transition.to));
        });
    }

    let _ = level.start();
    let _ = level.home_bases_destroyed();

    assert_eq!(
        *log.borrow(),
        vec![
            ("coordinator", LevelState::Building),
            ("logger", LevelState::Building),
            ("coordinator", LevelState::Lose),
            ("logger", LevelState::Lose),
        ]
    );
}

#[test]
fn reset_returns_to_building_without_broadcasting_intro() {
    let seen = Rc::new(RefCell::new(Vec::new()));
    let mut level = spawning_level();
    let _ = level.home_bases_destroyed();
    let sink = Rc::clone(&seen);
    let _ = level.subscribe(move |transition: &LevelTransition| {
        sink.borrow_mut().push(*transition);
    });

    let transitions = level.reset();

    assert_eq!(
        transitions,
        vec![LevelTransition {
            from: LevelState::Intro,
            to: LevelState::Building
        }]
    );
    assert_eq!(*seen.borrow(), transitions);
    assert_eq!(level.state(), LevelState::Building);
}
