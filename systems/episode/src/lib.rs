#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Episode termination, group reward settlement and the reset cascade.
//!
//! Both agent groups always see the same episode boundaries: rewards are
//! applied to both groups first, then both episodes end, before any state of
//! the next episode is built.

use tower_duel_core::{Event, LevelState, Team};
use tower_duel_system_economy::Economy;
use tower_duel_system_level::LevelStateMachine;
use tower_duel_system_spawning::WaveScheduler;
use tower_duel_world::{self as world, World};
use tracing::{debug, info, warn};

/// Training-side handle of all agents sharing a team role.
pub trait AgentGroup {
    /// Adds a reward shared by every agent of the group.
    fn add_group_reward(&mut self, reward: f32);

    /// Ends the current episode of every agent in the group.
    fn end_group_episode(&mut self);

    /// Ends the current episode without a terminal outcome.
    fn group_episode_interrupted(&mut self);
}

/// Bookkeeping implementation of [`AgentGroup`].
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimpleAgentGroup {
    pending_reward: f32,
    last_episode_reward: f32,
    cumulative_reward: f32,
    episodes_ended: u64,
    episodes_interrupted: u64,
}

impl SimpleAgentGroup {
    /// Creates a group with no history.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reward accumulated in the running episode.
    #[must_use]
    pub const fn pending_reward(&self) -> f32 {
        self.pending_reward
    }

    /// Reward of the last ended episode.
    #[must_use]
    pub const fn last_episode_reward(&self) -> f32 {
        self.last_episode_reward
    }

    /// Sum of all ended episodes' rewards.
    #[must_use]
    pub const fn cumulative_reward(&self) -> f32 {
        self.cumulative_reward
    }

    /// Number of episodes ended with an outcome.
    #[must_use]
    pub const fn episodes_ended(&self) -> u64 {
        self.episodes_ended
    }

    /// Number of truncated episodes.
    #[must_use]
    pub const fn episodes_interrupted(&self) -> u64 {
        self.episodes_interrupted
    }
}

impl AgentGroup for SimpleAgentGroup {
    fn add_group_reward(&mut self, reward: f32) {
        self.pending_reward += reward;
    }

    fn end_group_episode(&mut self) {
        self.last_episode_reward = self.pending_reward;
        self.cumulative_reward += self.pending_reward;
        self.pending_reward = 0.0;
        self.episodes_ended += 1;
    }

    fn group_episode_interrupted(&mut self) {
        self.pending_reward = 0.0;
        self.episodes_interrupted += 1;
    }
}

/// Reward magnitudes and the optional training horizon.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Config {
    win_reward: f32,
    loss_reward: f32,
    max_episodes: Option<u64>,
}

impl Config {
    /// Creates a new configuration.
    #[must_use]
    pub const fn new(win_reward: f32, loss_reward: f32, max_episodes: Option<u64>) -> Self {
        Self {
            win_reward,
            loss_reward,
            max_episodes,
        }
    }

    /// Completed games after which training should stop.
    #[must_use]
    pub const fn max_episodes(&self) -> Option<u64> {
        self.max_episodes
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(1.0, -1.0, None)
    }
}

/// Settled result of a finished episode.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EpisodeOutcome {
    /// One-based number of the finished game.
    pub game: u64,
    /// Winning team.
    pub winner: Team,
    /// Group reward applied to the attacker.
    pub attacker_reward: f32,
    /// Group reward applied to the defender.
    pub defender_reward: f32,
}

impl EpisodeOutcome {
    /// Event form of the outcome.
    #[must_use]
    pub const fn event(&self) -> Event {
        Event::EpisodeEnded {
            game: self.game,
            winner: self.winner,
            attacker_reward: self.attacker_reward,
            defender_reward: self.defender_reward,
        }
    }
}

/// Mutable borrows of everything the reset cascade rebuilds.
#[derive(Debug)]
pub struct EpisodeContext<'a> {
    /// Attacker economy.
    pub attacker: &'a mut Economy,
    /// Defender economy.
    pub defender: &'a mut Economy,
    /// Wave scheduler.
    pub scheduler: &'a mut WaveScheduler,
    /// Battlefield.
    pub world: &'a mut World,
    /// Level phase machine.
    pub level: &'a mut LevelStateMachine,
}

/// Couples level outcomes to both agent groups.
#[derive(Debug)]
pub struct EpisodeCoordinator<G> {
    config: Config,
    attacker: G,
    defender: G,
    games_completed: u64,
    episode: u64,
}

impl<G: AgentGroup> EpisodeCoordinator<G> {
    /// Creates a coordinator owning both agent groups.
    #[must_use]
    pub fn new(config: Config, attacker: G, defender: G) -> Self {
        Self {
            config,
            attacker,
            defender,
            games_completed: 0,
            episode: 0,
        }
    }

    /// Number of games finished with an outcome.
    #[must_use]
    pub fn games_completed(&self) -> u64 {
        self.games_completed
    }

    /// One-based number of the game in progress.
    #[must_use]
    pub fn current_game(&self) -> u64 {
        self.games_completed + 1
    }

    /// Zero-based index of the running episode, counting truncated ones.
    #[must_use]
    pub fn episode(&self) -> u64 {
        self.episode
    }

    /// Reports whether the configured training horizon was reached.
    #[must_use]
    pub fn should_halt(&self) -> bool {
        self.config
            .max_episodes
            .is_some_and(|max| self.games_completed >= max)
    }

    /// Group handle of a team.
    #[must_use]
    pub fn group(&self, team: Team) -> &G {
        match team {
            Team::Attacker => &self.attacker,
            Team::Defender => &self.defender,
        }
    }

    /// Maps a terminal state to rewards, ends both episodes together and
    /// rebuilds the episode state.
    ///
    /// Returns `None` without side effects for non-terminal states.
    pub fn settle(
        &mut self,
        terminal: LevelState,
        ctx: &mut EpisodeContext<'_>,
        events: &mut Vec<Event>,
    ) -> Option<EpisodeOutcome> {
        let Some(winner) = terminal.winner() else {
            warn!(state = ?terminal, "settlement requested for a running level");
            return None;
        };
        let (attacker_reward, defender_reward) = match winner {
            Team::Attacker => (self.config.win_reward, self.config.loss_reward),
            Team::Defender => (self.config.loss_reward, self.config.win_reward),
        };

        self.attacker.add_group_reward(attacker_reward);
        self.defender.add_group_reward(defender_reward);
        self.attacker.end_group_episode();
        self.defender.end_group_episode();

        let outcome = EpisodeOutcome {
            game: self.current_game(),
            winner,
            attacker_reward,
            defender_reward,
        };
        self.games_completed += 1;
        self.episode += 1;
        info!(
            game = outcome.game,
            winner = winner.label(),
            attacker_reward,
            defender_reward,
            "episode settled"
        );
        events.push(outcome.event());

        self.reset_cascade(ctx, events);
        Some(outcome)
    }

    /// Truncates the running episode without rewards or a game count.
    pub fn interrupt(&mut self, ctx: &mut EpisodeContext<'_>, events: &mut Vec<Event>) {
        self.attacker.group_episode_interrupted();
        self.defender.group_episode_interrupted();
        info!(game = self.current_game(), "episode interrupted");
        events.push(Event::EpisodeInterrupted {
            game: self.current_game(),
        });
        self.episode += 1;
        self.reset_cascade(ctx, events);
    }

    /// Rebuilds economies, waves, battlefield and level for the next episode.
    ///
    /// Running it twice in a row leaves the same state as running it once.
    pub fn reset_cascade(&self, ctx: &mut EpisodeContext<'_>, events: &mut Vec<Event>) {
        ctx.scheduler.reset(self.episode);
        ctx.attacker.reset();
        ctx.defender.reset();
        world::reset(ctx.world);
        events.extend(ctx.level.reset().iter().map(|transition| transition.event()));
        debug!(episode = self.episode, "episode state rebuilt");
    }
}
