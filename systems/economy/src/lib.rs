#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Per-team currency balances, passive income and purchase validation.

use std::time::Duration;

use tower_duel_core::{Catalog, PurchaseError, Team, Timer, TowerKindId, UnitKindId};
use tracing::{debug, warn};

/// Non-negative balance with all-or-nothing purchases.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Currency {
    balance: u32,
}

impl Currency {
    /// Creates a currency holding the starting balance.
    #[must_use]
    pub const fn new(balance: u32) -> Self {
        Self { balance }
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.balance
    }

    /// Reports whether `cost` is covered by the balance.
    #[must_use]
    pub const fn can_afford(&self, cost: u32) -> bool {
        self.balance >= cost
    }

    /// Deducts `cost` if the balance covers it and returns the new balance.
    ///
    /// A rejected purchase leaves the balance untouched.
    pub fn purchase(&mut self, cost: u32) -> Result<u32, PurchaseError> {
        if cost == 0 {
            return Err(PurchaseError::InvalidCost);
        }
        if !self.can_afford(cost) {
            return Err(PurchaseError::InsufficientFunds {
                balance: self.balance,
                cost,
            });
        }
        self.balance -= cost;
        Ok(self.balance)
    }

    /// Boolean form of [`Currency::purchase`].
    pub fn try_purchase(&mut self, cost: u32) -> bool {
        self.purchase(cost).is_ok()
    }

    /// Adds `amount` to the balance, saturating at the numeric limit.
    pub fn add(&mut self, amount: u32) -> u32 {
        self.balance = self.balance.saturating_add(amount);
        self.balance
    }
}

/// Amount credited by a passive income tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct IncomeGrant {
    /// Amount credited.
    pub amount: u32,
    /// Balance after the grant.
    pub balance: u32,
}

/// Periodic flat income driven by a repeating timer.
#[derive(Clone, Debug)]
pub struct IncomeGainer {
    timer: Timer,
    interval: Duration,
    flat_income_per_tick: u32,
}

impl IncomeGainer {
    /// Creates an armed income gainer.
    #[must_use]
    pub fn new(interval: Duration, flat_income_per_tick: u32) -> Self {
        let mut timer = Timer::new();
        timer.arm(interval);
        Self {
            timer,
            interval,
            flat_income_per_tick,
        }
    }

    /// Flat amount granted per income tick.
    #[must_use]
    pub const fn flat_income_per_tick(&self) -> u32 {
        self.flat_income_per_tick
    }

    /// Time between income ticks.
    #[must_use]
    pub const fn interval(&self) -> Duration {
        self.interval
    }

    /// Time left until the next income tick.
    #[must_use]
    pub fn remaining(&self) -> Duration {
        self.timer.remaining()
    }

    /// Raises the flat income granted per tick.
    pub fn add_income(&mut self, extra: u32) {
        self.flat_income_per_tick = self.flat_income_per_tick.saturating_add(extra);
    }

    /// Lowers the flat income granted per tick, never below zero.
    pub fn remove_income(&mut self, extra: u32) {
        self.flat_income_per_tick = self.flat_income_per_tick.saturating_sub(extra);
    }

    /// Advances the income timer, crediting `currency` when it expires.
    pub fn tick(&mut self, dt: Duration, currency: &mut Currency) -> Option<IncomeGrant> {
        if !self.timer.tick(dt) {
            return None;
        }
        self.timer.rearm(self.interval);
        let balance = currency.add(self.flat_income_per_tick);
        Some(IncomeGrant {
            amount: self.flat_income_per_tick,
            balance,
        })
    }
}

/// Passive income parameters.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct IncomeConfig {
    /// Seconds between income ticks.
    pub interval: Duration,
    /// Flat amount granted per tick before any unit bonus.
    pub flat_income: u32,
}

/// Starting conditions of a team economy.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct EconomyConfig {
    /// Balance at the start of every episode.
    pub starting_balance: u32,
    /// Passive income, if the team earns any.
    pub income: Option<IncomeConfig>,
}

/// Currency plus optional passive income for one team.
#[derive(Clone, Debug)]
pub struct Economy {
    team: Team,
    config: EconomyConfig,
    currency: Currency,
    income: Option<IncomeGainer>,
}

impl Economy {
    /// Creates an economy in its episode-start state.
    #[must_use]
    pub fn new(team: Team, config: EconomyConfig) -> Self {
        let (currency, income) = fresh_state(&config);
        Self {
            team,
            config,
            currency,
            income,
        }
    }

    /// Team owning the economy.
    #[must_use]
    pub const fn team(&self) -> Team {
        self.team
    }

    /// Current balance.
    #[must_use]
    pub const fn balance(&self) -> u32 {
        self.currency.balance()
    }

    /// Flat income per tick; zero for teams without passive income.
    #[must_use]
    pub fn income_per_tick(&self) -> u32 {
        self.income
            .as_ref()
            .map_or(0, IncomeGainer::flat_income_per_tick)
    }

    /// Read-only access to the currency.
    #[must_use]
    pub const fn currency(&self) -> &Currency {
        &self.currency
    }

    /// Read-only access to the income gainer.
    #[must_use]
    pub const fn income(&self) -> Option<&IncomeGainer> {
        self.income.as_ref()
    }

    /// Deducts `cost` atomically.
    pub fn purchase(&mut self, cost: u32) -> Result<u32, PurchaseError> {
        let result = self.currency.purchase(cost);
        match result {
            Ok(balance) => debug!(team = self.team.label(), cost, balance, "purchase accepted"),
            Err(PurchaseError::InsufficientFunds { balance, cost }) => {
                debug!(team = self.team.label(), cost, balance, "purchase unaffordable");
            }
            Err(reason) => warn!(team = self.team.label(), %reason, "purchase rejected"),
        }
        result
    }

    /// Boolean form of [`Economy::purchase`].
    pub fn try_purchase(&mut self, cost: u32) -> bool {
        self.purchase(cost).is_ok()
    }

    /// Buys a unit, raising passive income by the unit's bonus on success.
    pub fn purchase_unit(
        &mut self,
        catalog: &Catalog,
        kind: UnitKindId,
    ) -> Result<u32, PurchaseError> {
        let Some(definition) = catalog.unit(kind) else {
            warn!(team = self.team.label(), kind = kind.get(), "unknown unit kind");
            return Err(PurchaseError::UnknownItem);
        };
        let balance = self.purchase(definition.cost())?;
        if let Some(income) = self.income.as_mut() {
            income.add_income(definition.extra_income());
        }
        Ok(balance)
    }

    /// Undoes a unit purchase whose unit never reached a wave.
    ///
    /// Returns the cost and the income bonus of the unit and yields the new
    /// balance, or `None` for kinds the catalog does not know.
    pub fn refund_unit(&mut self, catalog: &Catalog, kind: UnitKindId) -> Option<u32> {
        let definition = catalog.unit(kind)?;
        if let Some(income) = self.income.as_mut() {
            income.remove_income(definition.extra_income());
        }
        Some(self.currency.add(definition.cost()))
    }

    /// Buys a tower.
    pub fn purchase_tower(
        &mut self,
        catalog: &Catalog,
        kind: TowerKindId,
    ) -> Result<u32, PurchaseError> {
        let Some(definition) = catalog.tower(kind) else {
            warn!(team = self.team.label(), kind = kind.get(), "unknown tower kind");
            return Err(PurchaseError::UnknownItem);
        };
        self.purchase(definition.cost())
    }

    /// Credits `amount` and returns the new balance.
    pub fn grant_income(&mut self, amount: u32) -> u32 {
        self.currency.add(amount)
    }

    /// Advances passive income.
    pub fn tick(&mut self, dt: Duration) -> Option<IncomeGrant> {
        let income = self.income.as_mut()?;
        income.tick(dt, &mut self.currency)
    }

    /// Replaces the currency and income gainer with episode-start instances.
    pub fn reset(&mut self) {
        let (currency, income) = fresh_state(&self.config);
        self.currency = currency;
        self.income = income;
    }
}

fn fresh_state(config: &EconomyConfig) -> (Currency, Option<IncomeGainer>) {
    let currency = Currency::new(config.starting_balance);
    let income = config
        .income
        .map(|income| IncomeGainer::new(income.interval, income.flat_income));
    (currency, income)
}
