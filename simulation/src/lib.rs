#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Explicit simulation context that owns every component of a match.
//!
//! Collaborators report battlefield outcomes through [`Simulation::submit`],
//! agents queue decisions through [`Simulation::submit_action`], and
//! [`Simulation::tick`] applies everything in a fixed order: collaborator
//! reports, timers, agent decisions, then guards and terminal checks. Read-only
//! snapshots and observations are taken between ticks.

mod config;
mod records;

use std::time::Duration;

use tower_duel_core::{
    Command, Event, EventRecord, GridCoord, GridSize, LevelState, PlacementError, PurchaseError,
    SubscriptionId, Team, Timer, TowerKindId, UnitKindId, WaveGenerator,
};
use tower_duel_system_builder::{AgentAction, Builder};
use tower_duel_system_economy::{Economy, EconomyConfig, IncomeConfig};
use tower_duel_system_episode::{
    self as episode, AgentGroup, EpisodeContext, EpisodeCoordinator, EpisodeOutcome,
    SimpleAgentGroup,
};
use tower_duel_system_level::{LevelStateMachine, LevelTransition};
use tower_duel_system_observation::{Observation, ObservationEncoder, ObservationInput};
use tower_duel_system_spawning::{self as spawning, QueuedInstruction, WaveMode, WaveScheduler};
use tower_duel_system_wave_generation::{self as wave_generation, RandomWaveGenerator};
use tower_duel_world::{self as world, query, Layout, World};
use tracing::{debug, error, info};

pub use config::{
    ArenaSettings, ConfigError, EconomySettings, EpisodeSettings, LevelSettings,
    SimulationConfig, WaveSettings,
};
pub use records::{EventRecorder, EventStore};

/// Everything that happened during one [`Simulation::tick`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TickReport {
    /// Events in the order they occurred.
    pub events: Vec<Event>,
    /// Log records derived from the events.
    pub records: Vec<EventRecord>,
    /// Settlement of the episode that ended during the tick, if any.
    pub outcome: Option<EpisodeOutcome>,
}

/// Read-only summary of the match from one team's point of view.
#[derive(Clone, Debug, PartialEq)]
pub struct TeamSnapshot {
    /// Team the snapshot describes.
    pub team: Team,
    /// One-based number of the running game.
    pub game: u64,
    /// Current level phase.
    pub level_state: LevelState,
    /// Balance of the team.
    pub balance: u32,
    /// Flat income per grant; zero for the defender.
    pub income: u32,
    /// Combined home-base health as a fraction of its maximum.
    pub base_health_ratio: f32,
    /// Units alive on the battlefield.
    pub live_units: u32,
    /// Towers standing on the grid.
    pub towers: usize,
    /// One-based number of the current wave.
    pub wave_number: usize,
    /// Waves known this episode.
    pub total_waves: usize,
    /// Dispatch progress of the current wave.
    pub wave_progress: f32,
}

/// Owns the world, both economies, the wave scheduler, the level machine and
/// the episode coordinator, and drives them in a fixed per-tick order.
#[derive(Debug)]
pub struct Simulation<G = SimpleAgentGroup> {
    config: SimulationConfig,
    report_interval: Duration,
    world: World,
    attacker: Economy,
    defender: Economy,
    scheduler: WaveScheduler,
    generator: RandomWaveGenerator,
    level: LevelStateMachine,
    builder: Builder,
    coordinator: EpisodeCoordinator<G>,
    encoder: ObservationEncoder,
    recorder: EventRecorder,
    report_timer: Timer,
    queued_commands: Vec<Command>,
    queued_actions: Vec<AgentAction>,
    carried_events: Vec<Event>,
    elapsed: Duration,
}

impl Simulation<SimpleAgentGroup> {
    /// Builds a simulation with bookkeeping agent groups.
    pub fn new(config: SimulationConfig) -> Result<Self, ConfigError> {
        Self::with_groups(config, SimpleAgentGroup::new(), SimpleAgentGroup::new())
    }
}

impl<G: AgentGroup> Simulation<G> {
    /// Builds a simulation bound to the given agent groups.
    ///
    /// The first episode starts right away; its opening events are delivered
    /// with the first tick.
    pub fn with_groups(
        config: SimulationConfig,
        attacker_group: G,
        defender_group: G,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        let income_interval = config.income_interval()?;
        let report_interval = config.report_interval()?;

        let grid = GridSize::new(config.arena.grid_width, config.arena.grid_height);
        let world = World::new(
            Layout::new(grid, config.arena.home_bases, config.arena.base_health),
            config.catalog.clone(),
        );
        let attacker = Economy::new(
            Team::Attacker,
            EconomyConfig {
                starting_balance: config.economy.attacker_starting_balance,
                income: Some(IncomeConfig {
                    interval: income_interval,
                    flat_income: config.economy.flat_income,
                }),
            },
        );
        let defender = Economy::new(
            Team::Defender,
            EconomyConfig {
                starting_balance: config.economy.defender_starting_balance,
                income: None,
            },
        );
        let scheduler = WaveScheduler::new(spawning::Config::new(
            config.waves.roster_size,
            config.waves.mode,
            config.waves.min_sequences..config.waves.max_sequences,
            config.seed,
        ));
        let generator = RandomWaveGenerator::new(wave_generation::Config::new(
            config.seed,
            config.waves.generated_min..=config.waves.generated_max,
        ));
        let coordinator = EpisodeCoordinator::new(
            episode::Config::new(
                config.episodes.win_reward,
                config.episodes.loss_reward,
                config.episodes.max_episodes,
            ),
            attacker_group,
            defender_group,
        );
        let encoder = ObservationEncoder::new(
            config.observation,
            &config.catalog,
            grid,
            config.waves.roster_size,
        );
        let mut report_timer = Timer::new();
        report_timer.arm(report_interval);

        let mut simulation = Self {
            level: LevelStateMachine::new(config.level.has_intro),
            config,
            report_interval,
            world,
            attacker,
            defender,
            scheduler,
            generator,
            builder: Builder::new(),
            coordinator,
            encoder,
            recorder: EventRecorder::new(),
            report_timer,
            queued_commands: Vec::new(),
            queued_actions: Vec::new(),
            carried_events: Vec::new(),
            elapsed: Duration::ZERO,
        };

        let mut events = Vec::new();
        let transitions = simulation.level.start();
        push_transitions(&transitions, &mut events);
        simulation.round_started(&mut events);
        simulation.builder.observe(&events);
        simulation.carried_events = events;
        info!(seed = simulation.config.seed, "simulation ready");
        Ok(simulation)
    }

    /// Configuration the simulation was built from.
    #[must_use]
    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    /// Read-only access to the battlefield.
    #[must_use]
    pub fn world(&self) -> &World {
        &self.world
    }

    /// Current level phase.
    #[must_use]
    pub fn level_state(&self) -> LevelState {
        self.level.state()
    }

    /// Economy of a team.
    #[must_use]
    pub fn economy(&self, team: Team) -> &Economy {
        match team {
            Team::Attacker => &self.attacker,
            Team::Defender => &self.defender,
        }
    }

    /// Wave scheduler of the running episode.
    #[must_use]
    pub fn scheduler(&self) -> &WaveScheduler {
        &self.scheduler
    }

    /// Episode coordinator holding both agent groups.
    #[must_use]
    pub fn coordinator(&self) -> &EpisodeCoordinator<G> {
        &self.coordinator
    }

    /// Number of games finished with an outcome.
    #[must_use]
    pub fn games_completed(&self) -> u64 {
        self.coordinator.games_completed()
    }

    /// Reports whether the configured number of games was played.
    #[must_use]
    pub fn should_halt(&self) -> bool {
        self.coordinator.should_halt()
    }

    /// Simulated time since construction.
    #[must_use]
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// Subscribes to level transitions, delivered in subscription order.
    pub fn subscribe_level<F>(&mut self, callback: F) -> SubscriptionId
    where
        F: FnMut(&LevelTransition) + 'static,
    {
        self.level.subscribe(callback)
    }

    /// Queues a collaborator report for the next tick.
    pub fn submit(&mut self, command: Command) {
        self.queued_commands.push(command);
    }

    /// Queues an agent decision for the next tick.
    pub fn submit_action(&mut self, action: AgentAction) {
        self.queued_actions.push(action);
    }

    /// Advances the match by `dt`.
    pub fn tick(&mut self, dt: Duration) -> TickReport {
        let mut events = std::mem::take(&mut self.carried_events);
        self.elapsed += dt;

        for command in std::mem::take(&mut self.queued_commands) {
            self.execute(command, &mut events);
        }

        world::apply(&mut self.world, Command::Tick { dt }, &mut events);
        self.tick_economies(dt, &mut events);
        let mut spawns = Vec::new();
        self.scheduler.tick(dt, &mut spawns, &mut events);
        for command in spawns {
            world::apply(&mut self.world, command, &mut events);
        }

        self.builder.observe(&events);
        let observed = events.len();
        for action in std::mem::take(&mut self.queued_actions) {
            let mut decoded = Vec::new();
            self.builder.handle(
                &[],
                action,
                query::catalog(&self.world),
                query::grid(&self.world),
                &mut decoded,
            );
            for command in decoded {
                self.execute(command, &mut events);
            }
        }
        self.start_waves(&mut events);

        self.check_terminal(&mut events);
        self.builder.observe(&events[observed..]);

        let outcome = if self.level.is_game_over() {
            self.settle(&mut events)
        } else {
            None
        };
        self.report(events, outcome)
    }

    /// Ends the running episode without an outcome and starts the next one.
    pub fn truncate_episode(&mut self) -> TickReport {
        let mut events = std::mem::take(&mut self.carried_events);
        self.queued_commands.clear();
        self.queued_actions.clear();
        let mut ctx = EpisodeContext {
            attacker: &mut self.attacker,
            defender: &mut self.defender,
            scheduler: &mut self.scheduler,
            world: &mut self.world,
            level: &mut self.level,
        };
        self.coordinator.interrupt(&mut ctx, &mut events);
        self.report_timer.arm(self.report_interval);
        self.round_started(&mut events);
        self.builder.observe(&events);
        self.report(events, None)
    }

    /// Summarizes the match for `team`.
    #[must_use]
    pub fn snapshot(&self, team: Team) -> TeamSnapshot {
        let economy = self.economy(team);
        TeamSnapshot {
            team,
            game: self.coordinator.current_game(),
            level_state: self.level.state(),
            balance: economy.balance(),
            income: economy.income_per_tick(),
            base_health_ratio: query::home_base_health_ratio(&self.world),
            live_units: query::live_unit_count(&self.world),
            towers: query::tower_count(&self.world),
            wave_number: self.scheduler.wave_number(),
            total_waves: self.scheduler.total_waves(),
            wave_progress: self.scheduler.wave_progress(),
        }
    }

    /// Encodes the battlefield for `team`'s next decision.
    #[must_use]
    pub fn observe(&self, team: Team) -> Observation {
        let economy = self.economy(team);
        let towers = query::tower_view(&self.world);
        let units = query::unit_view(&self.world);
        self.encoder.encode(&ObservationInput {
            team,
            balance: economy.balance(),
            income: economy.income_per_tick(),
            base_health_ratio: query::home_base_health_ratio(&self.world),
            towers: &towers,
            units: &units,
            catalog: query::catalog(&self.world),
        })
    }

    fn execute(&mut self, command: Command, events: &mut Vec<Event>) {
        match command {
            Command::BuyUnit { kind } => self.buy_unit(kind, events),
            Command::PlaceTower { kind, cell } => self.place_tower(kind, cell, events),
            Command::CompleteIntro => {
                let transitions = self.level.intro_completed();
                push_transitions(&transitions, events);
                self.auto_complete_building(events);
            }
            Command::CompleteBuilding => {
                let transitions = self.level.building_completed();
                push_transitions(&transitions, events);
            }
            other => world::apply(&mut self.world, other, events),
        }
    }

    fn buy_unit(&mut self, kind: UnitKindId, events: &mut Vec<Event>) {
        match self.try_buy_unit(kind) {
            Ok(queued) => {
                debug!(
                    kind = kind.get(),
                    wave = queued.wave,
                    len = queued.len,
                    "unit queued"
                );
                events.push(Event::UnitPurchased {
                    kind,
                    balance: self.attacker.balance(),
                    income: self.attacker.income_per_tick(),
                });
            }
            Err(reason) => {
                debug!(kind = kind.get(), %reason, "unit purchase rejected");
                events.push(Event::UnitPurchaseRejected { kind, reason });
            }
        }
    }

    fn try_buy_unit(&mut self, kind: UnitKindId) -> Result<QueuedInstruction, PurchaseError> {
        if !matches!(
            self.level.state(),
            LevelState::Building | LevelState::SpawningEnemies
        ) {
            return Err(PurchaseError::InvalidPhase);
        }
        let catalog = query::catalog(&self.world);
        let instruction = catalog
            .instruction_for(kind)
            .ok_or(PurchaseError::UnknownItem)?;
        self.scheduler.can_queue().map_err(|reason| {
            debug!(%reason, "no wave accepts the unit");
            PurchaseError::RosterUnavailable
        })?;
        let _ = self.attacker.purchase_unit(catalog, kind)?;
        match self.scheduler.queue_instruction(instruction) {
            Ok(queued) => Ok(queued),
            Err(reason) => {
                let balance = self.attacker.refund_unit(catalog, kind);
                error!(%reason, ?balance, "paid unit could not be queued; purchase refunded");
                Err(PurchaseError::RosterUnavailable)
            }
        }
    }

    fn place_tower(&mut self, kind: TowerKindId, cell: GridCoord, events: &mut Vec<Event>) {
        if let Err(reason) = self.try_place_tower(kind, cell, events) {
            debug!(kind = kind.get(), x = cell.x(), y = cell.y(), %reason, "placement rejected");
            events.push(Event::TowerPlacementRejected { kind, cell, reason });
        }
    }

    fn try_place_tower(
        &mut self,
        kind: TowerKindId,
        cell: GridCoord,
        events: &mut Vec<Event>,
    ) -> Result<(), PlacementError> {
        if !matches!(
            self.level.state(),
            LevelState::Building | LevelState::SpawningEnemies | LevelState::AllEnemiesSpawned
        ) {
            return Err(PlacementError::InvalidPhase);
        }
        query::placement_check(&self.world, kind, cell)?;
        let catalog = query::catalog(&self.world);
        let _ = self
            .defender
            .purchase_tower(catalog, kind)
            .map_err(|reason| match reason {
                PurchaseError::UnknownItem => PlacementError::UnknownTower,
                _ => PlacementError::InsufficientFunds,
            })?;
        world::apply(&mut self.world, Command::PlaceTower { kind, cell }, events);
        Ok(())
    }

    fn tick_economies(&mut self, dt: Duration, events: &mut Vec<Event>) {
        let accrues = self.config.level.always_gain_currency
            || !matches!(self.level.state(), LevelState::Intro | LevelState::Building);
        if accrues {
            for economy in [&mut self.attacker, &mut self.defender] {
                if let Some(grant) = economy.tick(dt) {
                    events.push(Event::IncomeGranted {
                        team: economy.team(),
                        amount: grant.amount,
                        balance: grant.balance,
                    });
                }
            }
        }

        if self.report_timer.tick(dt) {
            self.report_timer.rearm(self.report_interval);
            for economy in [&self.attacker, &self.defender] {
                events.push(Event::EconomyReported {
                    team: economy.team(),
                    balance: economy.balance(),
                    income: economy.income_per_tick(),
                });
            }
        }
    }

    fn start_waves(&mut self, events: &mut Vec<Event>) {
        if self.level.state() != LevelState::SpawningEnemies || self.scheduler.is_started() {
            return;
        }
        let randomized = self.scheduler.config().mode() == WaveMode::Randomized;
        if !randomized && !self.scheduler.first_roster_full() {
            return;
        }
        let live = query::live_unit_count(&self.world);
        let generator: &mut dyn WaveGenerator = &mut self.generator;
        let completed = self.scheduler.start_all(
            Some(generator),
            query::catalog(&self.world),
            self.coordinator.episode(),
            live,
            events,
        );
        if completed {
            let transitions = self.level.spawning_completed(live);
            push_transitions(&transitions, events);
        }
    }

    fn check_terminal(&mut self, events: &mut Vec<Event>) {
        if query::all_home_bases_destroyed(&self.world) {
            let transitions = self.level.home_bases_destroyed();
            push_transitions(&transitions, events);
        }
        let live = query::live_unit_count(&self.world);
        if self.scheduler.poll(live, events) {
            let transitions = self.level.spawning_completed(live);
            push_transitions(&transitions, events);
        }
        let transitions = self.level.population_changed(live);
        push_transitions(&transitions, events);
    }

    fn settle(&mut self, events: &mut Vec<Event>) -> Option<EpisodeOutcome> {
        let terminal = self.level.state();
        let mark = events.len();
        let mut ctx = EpisodeContext {
            attacker: &mut self.attacker,
            defender: &mut self.defender,
            scheduler: &mut self.scheduler,
            world: &mut self.world,
            level: &mut self.level,
        };
        let outcome = self.coordinator.settle(terminal, &mut ctx, events)?;
        self.queued_commands.clear();
        self.queued_actions.clear();
        self.report_timer.arm(self.report_interval);
        self.round_started(events);
        self.builder.observe(&events[mark..]);
        Some(outcome)
    }

    fn round_started(&mut self, events: &mut Vec<Event>) {
        events.push(Event::RoundStarted {
            game: self.coordinator.current_game(),
        });
        self.auto_complete_building(events);
    }

    fn auto_complete_building(&mut self, events: &mut Vec<Event>) {
        if self.config.level.auto_complete_building && self.level.state() == LevelState::Building
        {
            let transitions = self.level.building_completed();
            push_transitions(&transitions, events);
        }
    }

    fn report(&mut self, events: Vec<Event>, outcome: Option<EpisodeOutcome>) -> TickReport {
        let timestamp = self.elapsed.as_secs_f64();
        let catalog = query::catalog(&self.world);
        let records = events
            .iter()
            .filter_map(|event| self.recorder.record(event, timestamp, catalog))
            .collect();
        TickReport {
            events,
            records,
            outcome,
        }
    }
}

fn push_transitions(transitions: &[LevelTransition], events: &mut Vec<Event>) {
    events.extend(transitions.iter().map(LevelTransition::event));
}
