use std::time::Duration;

use proptest::prelude::*;
use tower_duel_core::{Catalog, PurchaseError, Team, TowerKindId, UnitKindId};
use tower_duel_system_economy::{Currency, Economy, EconomyConfig, IncomeConfig};

fn attacker_config() -> EconomyConfig {
    EconomyConfig {
        starting_balance: 100,
        income: Some(IncomeConfig {
            interval: Duration::from_secs(1),
            flat_income: 1,
        }),
    }
}

proptest! {
    #[test]
    fn purchases_are_atomic(balance in 0_u32..10_000, cost in 1_u32..10_000) {
        let mut currency = Currency::new(balance);
        let result = currency.purchase(cost);
        if cost <= balance {
            prop_assert_eq!(result, Ok(balance - cost));
            prop_assert_eq!(currency.balance(), balance - cost);
        } else {
            prop_assert_eq!(result, Err(PurchaseError::InsufficientFunds { balance, cost }));
            prop_assert_eq!(currency.balance(), balance, "failed purchase must not spend");
        }
    }
}

#[test]
fn second_purchase_fails_once_balance_is_spent() {
    let mut currency = Currency::new(500);
    assert_eq!(currency.purchase(300), Ok(200));
    assert!(!currency.try_purchase(300));
    assert_eq!(currency.balance(), 200, "balance must stay at 200");
}

#[test]
fn unit_purchases_raise_passive_income() {
    let catalog = Catalog::default();
    let mut economy = Economy::new(Team::Attacker, attacker_config());

    assert_eq!(economy.purchase_unit(&catalog, UnitKindId::new(2)), Ok(70));
    assert_eq!(economy.income_per_tick(), 4, "hovertank adds three income");

    let grant = economy
        .tick(Duration::from_secs(1))
        .expect("income after a full interval");
    assert_eq!(grant.amount, 4);
    assert_eq!(economy.balance(), 74);
}

#[test]
fn rejected_unit_purchase_keeps_income_unchanged() {
    let catalog = Catalog::default();
    let mut economy = Economy::new(
        Team::Attacker,
        EconomyConfig {
            starting_balance: 5,
            ..attacker_config()
        },
    );

    assert!(matches!(
        economy.purchase_unit(&catalog, UnitKindId::new(0)),
        Err(PurchaseError::InsufficientFunds { .. })
    ));
    assert_eq!(
        economy.purchase_unit(&catalog, UnitKindId::new(9)),
        Err(PurchaseError::UnknownItem)
    );
    assert_eq!(economy.income_per_tick(), 1);
    assert_eq!(economy.balance(), 5);
}

#[test]
fn refunded_unit_restores_balance_and_income() {
    let catalog = Catalog::default();
    let mut economy = Economy::new(Team::Attacker, attacker_config());
    assert_eq!(economy.purchase_unit(&catalog, UnitKindId::new(1)), Ok(80));
    assert_eq!(economy.income_per_tick(), 3);

    assert_eq!(economy.refund_unit(&catalog, UnitKindId::new(1)), Some(100));
    assert_eq!(economy.income_per_tick(), 1, "income bonus is withdrawn");
    assert_eq!(economy.refund_unit(&catalog, UnitKindId::new(7)), None);
    assert_eq!(economy.balance(), 100);
}

#[test]
fn defender_has_no_passive_income() {
    let catalog = Catalog::default();
    let mut economy = Economy::new(
        Team::Defender,
        EconomyConfig {
            starting_balance: 20,
            income: None,
        },
    );
    assert!(economy.tick(Duration::from_secs(60)).is_none());
    assert_eq!(economy.purchase_tower(&catalog, TowerKindId::new(2)), Ok(5));
    assert_eq!(economy.income_per_tick(), 0);
}

#[test]
fn reset_replaces_currency_and_income() {
    let catalog = Catalog::default();
    let mut economy = Economy::new(Team::Attacker, attacker_config());
    let _ = economy.purchase_unit(&catalog, UnitKindId::new(1));
    let _ = economy.tick(Duration::from_millis(700));

    economy.reset();

    assert_eq!(economy.balance(), 100);
    assert_eq!(economy.income_per_tick(), 1);
    let remaining = economy.income().map(|income| income.remaining());
    assert_eq!(remaining, Some(Duration::from_secs(1)), "timer restarts fresh");
}
