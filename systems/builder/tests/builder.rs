use tower_duel_core::{
    Catalog, Command, Event, GridCoord, GridSize, LevelState, Team, TowerKindId, UnitKindId,
};
use tower_duel_system_builder::{decode_defender, grid_cell, AgentAction, Builder};

fn entered(state: LevelState) -> Event {
    Event::LevelStateChanged {
        from: LevelState::Intro,
        to: state,
    }
}

#[test]
fn attacker_selector_becomes_purchase_in_building() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[entered(LevelState::Building)],
        AgentAction::Attacker { selector: 1 },
        &Catalog::default(),
        GridSize::new(6, 7),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::BuyUnit {
            kind: UnitKindId::new(1)
        }],
        "builder should emit a purchase for a known selector",
    );
}

#[test]
fn defender_coordinates_map_onto_grid_cells() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();

    builder.handle(
        &[entered(LevelState::SpawningEnemies)],
        AgentAction::Defender {
            selector: 2,
            x: -0.5,
            y: 0.99,
        },
        &Catalog::default(),
        GridSize::new(6, 7),
        &mut commands,
    );

    assert_eq!(
        commands,
        vec![Command::PlaceTower {
            kind: TowerKindId::new(2),
            cell: GridCoord::new(3, 6),
        }],
    );
}

#[test]
fn actions_are_ignored_outside_playable_states() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();
    let catalog = Catalog::default();
    let grid = GridSize::new(6, 7);

    builder.handle(
        &[],
        AgentAction::Attacker { selector: 0 },
        &catalog,
        grid,
        &mut commands,
    );
    assert!(commands.is_empty(), "intro does not accept decisions");

    builder.handle(
        &[entered(LevelState::Building), entered(LevelState::Lose)],
        AgentAction::Attacker { selector: 0 },
        &catalog,
        grid,
        &mut commands,
    );
    assert!(commands.is_empty(), "terminal states do not accept decisions");
    assert!(!builder.accepts_actions());
}

#[test]
fn unknown_selectors_are_dropped() {
    let mut builder = Builder::default();
    let mut commands = Vec::new();
    builder.handle(
        &[entered(LevelState::Building)],
        AgentAction::Attacker { selector: 3 },
        &Catalog::default(),
        GridSize::new(6, 7),
        &mut commands,
    );
    assert!(commands.is_empty());
    assert!(decode_defender(9, 0.0, 0.0, GridSize::new(6, 7), &Catalog::default()).is_none());
}

#[test]
fn every_continuous_pair_lands_inside_the_grid() {
    let grid = GridSize::new(6, 7);
    for step in -20..=20 {
        let value = step as f32 / 20.0;
        let cell = grid_cell(value, -value, grid).expect("finite values map to a cell");
        assert!(grid.contains(cell), "{value} mapped outside the grid: {cell:?}");
    }
    assert_eq!(AgentAction::Attacker { selector: 0 }.team(), Team::Attacker);
}
