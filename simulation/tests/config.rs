use tower_duel_system_spawning::WaveMode;
use tower_duel_simulation::{ConfigError, SimulationConfig};

#[test]
fn empty_document_yields_training_defaults() {
    let config = SimulationConfig::from_toml_str("").expect("defaults are valid");

    assert_eq!(config, SimulationConfig::default());
    assert_eq!(config.waves.roster_size, 15);
    assert_eq!((config.waves.min_sequences, config.waves.max_sequences), (2, 5));
    assert_eq!(config.level.economy_report_interval, 5.0);
    assert_eq!(config.catalog.unit_count(), 3);
    assert_eq!(config.observation.currency, 500.0);
}

#[test]
fn partial_documents_override_only_named_fields() {
    let config = SimulationConfig::from_toml_str(
        r#"
            seed = 42

            [waves]
            mode = "randomized"
            roster_size = 4

            [economy]
            flat_income = 25

            [episodes]
            max_episodes = 10
        "#,
    )
    .expect("valid document");

    assert_eq!(config.seed, 42);
    assert_eq!(config.waves.mode, WaveMode::Randomized);
    assert_eq!(config.waves.roster_size, 4);
    assert_eq!(config.waves.generated_max, 5, "untouched field keeps its default");
    assert_eq!(config.economy.flat_income, 25);
    assert_eq!(config.economy.attacker_starting_balance, 100);
    assert_eq!(config.episodes.max_episodes, Some(10));
}

#[test]
fn unknown_fields_are_rejected() {
    let error = SimulationConfig::from_toml_str("[waves]\nrooster_size = 3\n")
        .expect_err("typo must not be ignored");
    assert!(matches!(error, ConfigError::Parse(_)), "unexpected error: {error}");
}

#[test]
fn invalid_values_are_reported_by_field() {
    let error = SimulationConfig::from_toml_str("[economy]\nincome_interval = -1.0\n")
        .expect_err("negative interval");
    assert!(matches!(
        error,
        ConfigError::InvalidDuration {
            field: "economy.income_interval",
            ..
        }
    ));

    let error = SimulationConfig::from_toml_str("[level]\neconomy_report_interval = 0.0\n")
        .expect_err("zero interval");
    assert!(matches!(error, ConfigError::InvalidDuration { .. }));

    let error = SimulationConfig::from_toml_str("[waves]\nroster_size = 0\n")
        .expect_err("empty roster");
    assert!(matches!(error, ConfigError::EmptyRoster));

    let error = SimulationConfig::from_toml_str("[waves]\nmin_sequences = 3\nmax_sequences = 3\n")
        .expect_err("empty range");
    assert!(matches!(
        error,
        ConfigError::EmptySequenceRange { min: 3, max: 3 }
    ));

    let error = SimulationConfig::from_toml_str("[arena]\ngrid_width = 0\n")
        .expect_err("empty grid");
    assert!(matches!(error, ConfigError::EmptyGrid { width: 0, .. }));
}

#[test]
fn base_health_must_be_a_positive_finite_number() {
    for health in ["nan", "inf", "-inf", "0.0", "-5.0"] {
        let document = format!("[arena]\nbase_health = {health}\n");
        let error = SimulationConfig::from_toml_str(&document)
            .expect_err("unusable base health must be rejected");
        assert!(
            matches!(error, ConfigError::NoHomeBase),
            "{health} gave {error}"
        );
    }
    let config = SimulationConfig::from_toml_str("[arena]\nbase_health = 0.5\n")
        .expect("small positive health is fine");
    assert_eq!(config.arena.base_health, 0.5);
}

#[test]
fn custom_catalogs_are_accepted() {
    let config = SimulationConfig::from_toml_str(
        r#"
            [[catalog.units]]
            name = "Scout"
            cost = 4
            extra_income = 1
            health = 10.0
            spawn_delay = { secs = 0, nanos = 500000000 }
            spawn_node = 0

            [[catalog.towers]]
            name = "Wall"
            cost = 2
            health = 30.0
        "#,
    )
    .expect("catalog with one unit and one tower");

    assert_eq!(config.catalog.unit_count(), 1);
    assert_eq!(config.catalog.tower_count(), 1);
}
