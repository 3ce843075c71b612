//! End-to-end scenarios driving a corporation through the public API.

use std::cell::RefCell;
use std::rc::Rc;

use catalog::Catalog;
use corp_runtime::{
    CorpContext, CorpState, Corporation, Division, EngineConfig, FlatDivision, TransactionError,
};

fn flat_corp(seed: u64) -> Corporation<FlatDivision> {
    Corporation::new("Scenario Co", false, EngineConfig::default(), seed).unwrap()
}

/// Run `phases` phases, storing exactly enough cycles for each.
fn run<D: Division>(corp: &mut Corporation<D>, phases: usize) {
    corp.store_cycles(corp.config().cycles_per_market_cycle * phases as u64);
    for _ in 0..phases {
        assert!(corp.process().is_some());
    }
}

// ─────────────────────────────────────────────────────────────
// Exporter/importer pair sharing an inbound ledger
// ─────────────────────────────────────────────────────────────

#[derive(Default)]
struct Books {
    this_revenue: f64,
    this_expenses: f64,
    last_revenue: f64,
    last_expenses: f64,
}

impl Books {
    fn roll(&mut self, seconds: f64) {
        self.last_revenue = self.this_revenue / seconds;
        self.last_expenses = self.this_expenses / seconds;
        self.this_revenue = 0.0;
        self.this_expenses = 0.0;
    }
}

enum Role {
    /// Ships `units` into the ledger during the export phase.
    Exporter { units: f64, unit_cost: f64 },
    /// Clears its inbound ledger ahead of the export phase and sells its contents.
    Importer { unit_price: f64 },
}

struct LinkedDivision {
    role: Role,
    inbound: Rc<RefCell<f64>>,
    books: Books,
}

impl Division for LinkedDivision {
    fn reset_imports(&mut self, state: CorpState) {
        if matches!(self.role, Role::Importer { .. }) && state == CorpState::Export {
            *self.inbound.borrow_mut() = 0.0;
        }
    }

    fn process(&mut self, market_cycles: u32, state: CorpState, corp: &CorpContext<'_>) {
        let seconds = market_cycles as f64 * corp.seconds_per_market_cycle;
        match (&self.role, state) {
            (_, CorpState::Start) => self.books.roll(seconds),
            (Role::Exporter { units, unit_cost }, CorpState::Export) => {
                *self.inbound.borrow_mut() += units;
                self.books.this_expenses += units * unit_cost;
            }
            (Role::Importer { unit_price }, CorpState::Sale) => {
                let units = std::mem::take(&mut *self.inbound.borrow_mut());
                self.books.this_revenue += units * unit_price;
            }
            _ => {}
        }
    }

    fn last_cycle_revenue(&self) -> f64 {
        self.books.last_revenue
    }

    fn last_cycle_expenses(&self) -> f64 {
        self.books.last_expenses
    }
}

fn linked_corp(exporter_name: &str, importer_name: &str) -> Corporation<LinkedDivision> {
    let inbound = Rc::new(RefCell::new(0.0));
    let mut corp = Corporation::new("Linked", false, EngineConfig::default(), 1).unwrap();
    corp.add_division(
        exporter_name,
        LinkedDivision {
            role: Role::Exporter {
                units: 40.0,
                unit_cost: 5.0,
            },
            inbound: Rc::clone(&inbound),
            books: Books::default(),
        },
    )
    .unwrap();
    corp.add_division(
        importer_name,
        LinkedDivision {
            role: Role::Importer { unit_price: 20.0 },
            inbound,
            books: Books::default(),
        },
    )
    .unwrap();
    corp
}

#[test]
fn division_order_does_not_change_totals() {
    // Divisions iterate by name, so these two run in opposite orders.
    let mut exporter_first = linked_corp("A Mining", "B Refinery");
    let mut importer_first = linked_corp("B Mining", "A Refinery");
    run(&mut exporter_first, 11);
    run(&mut importer_first, 11);

    // 40 units * 20 sold and 40 * 5 spent over a 10 second cycle.
    for corp in [&exporter_first, &importer_first] {
        assert_eq!(corp.revenue(), 80.0);
        assert_eq!(corp.expenses(), 20.0);
    }
    assert_eq!(exporter_first.funds(), importer_first.funds());
    assert_eq!(exporter_first.funds(), 150e9 + 2.0 * 600.0);
}

// ─────────────────────────────────────────────────────────────
// Valuation, purchases and share sales
// ─────────────────────────────────────────────────────────────

#[test]
fn empty_private_corporation_is_valued_at_sixty_billion() {
    let mut corp = flat_corp(0);
    run(&mut corp, 1);
    assert_eq!(corp.cycle_valuation(), 60_000_000_000.0);
    assert_eq!(corp.funds(), 150e9);
}

#[test]
fn first_upgrade_level_costs_base_price() {
    let catalog = Catalog::builtin().unwrap();
    let corp = flat_corp(0);
    let factories = catalog.upgrade("Smart Factories").unwrap();
    assert_eq!(corp.upgrade_cost(factories, 1), 2e9);
}

#[test]
fn buying_an_owned_unlock_fails_without_charging() {
    let catalog = Catalog::builtin().unwrap();
    let export = catalog.unlock("Export").unwrap();
    let mut corp = flat_corp(0);
    corp.purchase_unlock(export).unwrap();
    let funds = corp.funds();

    let err = corp.purchase_unlock(export).unwrap_err();
    assert!(!err.to_string().is_empty());
    assert_eq!(corp.funds(), funds);
}

#[test]
fn runaway_share_sale_prices_to_zero() {
    let cfg = EngineConfig {
        initial_shares: 50_000_000_000_000,
        ..EngineConfig::default()
    };
    let mut corp: Corporation<FlatDivision> = Corporation::new("Giant", false, cfg, 0).unwrap();
    run(&mut corp, 1);
    corp.go_public(0).unwrap();
    let sale = corp.calculate_share_sale(20_000_000_000_000);
    assert_eq!(
        (sale.proceeds, sale.share_price, sale.shares_until_update),
        (0.0, 0.0, 0)
    );
}

#[test]
fn backlog_drains_one_phase_per_call() {
    let mut corp = flat_corp(0);
    corp.store_cycles(1_000);
    let mut phases = Vec::new();
    while let Some(state) = corp.process() {
        phases.push(state);
    }
    assert_eq!(phases.len(), 100);
    assert_eq!(corp.stored_cycles(), 0);
    assert_eq!(&phases[..6], &[
        CorpState::Start,
        CorpState::Purchase,
        CorpState::Production,
        CorpState::Export,
        CorpState::Sale,
        CorpState::Start,
    ]);
    assert_eq!(corp.valuation_history().count(), 10);
}

#[test]
fn same_seed_replays_the_same_price_path() {
    let path = |seed: u64| {
        let mut corp = flat_corp(seed);
        corp.add_division("Software", FlatDivision::new(5e7, 1e7).with_growth(0.02))
            .unwrap();
        let mut prices = Vec::new();
        for _ in 0..20 {
            run(&mut corp, 5);
            prices.push(corp.share_price().to_bits());
        }
        prices
    };
    assert_eq!(path(77), path(77));
    assert_ne!(path(77), path(78));
}

#[test]
fn corporation_lifecycle() {
    let catalog = Catalog::builtin().unwrap();
    let mut corp = flat_corp(5);
    corp.add_division("Agri", FlatDivision::new(3e8, 1e8)).unwrap();
    corp.purchase_unlock(catalog.unlock("Smart Supply").unwrap())
        .unwrap();
    let storage = catalog.upgrade("Smart Storage").unwrap();
    corp.purchase_upgrade(storage, 5).unwrap();
    assert!((corp.division("Agri").unwrap().storage() - 150.0).abs() < 1e-9);
    run(&mut corp, 10);

    let offer = corp.accept_investment_offer().unwrap();
    assert!(offer.funds > 0.0);
    assert_eq!(corp.funding_round(), 1);

    corp.go_public(100_000_000).unwrap();
    assert_eq!(corp.investment_offer(), None);
    corp.set_dividend_rate(0.25).unwrap();
    run(&mut corp, 5);
    assert!(corp.take_owner_income() > 0.0);

    corp.sell_shares(1_000_000).unwrap();
    assert_eq!(
        corp.sell_shares(1_000_000).map(|_| ()),
        Err(TransactionError::OnCooldown("1 hour 0 seconds".into()))
    );
    // The sale cooldown ticks down by one market cycle's worth per phase.
    run(&mut corp, 1_800);
    assert!(corp.sell_shares(1_000_000).is_ok());
    assert!(corp.shares_balanced());

    let snapshot = serde_json::to_value(&corp).unwrap();
    assert!(snapshot["divisions"]["Agri"].is_object());
    assert_eq!(snapshot["public"], serde_json::json!(true));
}
