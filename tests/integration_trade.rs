//! Manual trade flow against the baseline roster.

mod common;

use p2p_energy_sim::config::ScenarioConfig;
use p2p_energy_sim::error::TradeError;
use p2p_energy_sim::market::{
    AgentId, AgentStatus, TRANSACTION_LOG_CAPACITY, TransactionOrigin, TransactionStatus,
};
use p2p_energy_sim::random::ScriptedSource;
use p2p_energy_sim::sim::clock::SimClock;
use p2p_energy_sim::sim::engine::{Engine, interval_of};
use p2p_energy_sim::sim::store::Store;
use p2p_energy_sim::sim::trade::{TradeFlow, counterparties};

fn open_flow(store: &Store, target: &str) -> TradeFlow {
    let mut flow = TradeFlow::default();
    let agent = common::agent(store.state(), target);
    flow.open(agent, store.state().market.current_price);
    flow
}

#[test]
fn producer_sells_fifty_kwh() {
    let mut store = Store::new(common::initial_state(1));
    let mut flow = open_flow(&store, "1");
    {
        let form = flow.form_mut().unwrap();
        form.select_counterparty(AgentId::new("3"));
        form.set_amount(50.0);
        form.set_price(0.14);
    }

    let tx = flow.submit(&mut store, common::t0()).unwrap();
    let s = store.state();

    assert_eq!(common::agent(s, "1").current_energy_kwh, 800.0);
    assert_eq!(common::agent(s, "3").current_energy_kwh, 450.0);
    assert_eq!(s.market.total_volume_kwh, 2500.0);
    assert!((s.market.current_price - 0.1375).abs() < 1e-12);

    assert_eq!(tx.status, TransactionStatus::Completed);
    assert_eq!(tx.origin, TransactionOrigin::Manual);
    assert_eq!(tx.seller_id.as_str(), "1");
    assert_eq!(tx.buyer_id.as_str(), "3");
    assert!((tx.carbon_saved_kg - 3.0).abs() < 1e-9);
    assert_eq!(s.transactions.latest(), Some(&tx));

    for id in ["1", "3"] {
        let a = common::agent(s, id);
        assert_eq!(a.status, AgentStatus::Active);
        assert_eq!(a.last_transaction, Some(tx.id));
    }
    assert!(!flow.is_open());
}

#[test]
fn consumer_card_buys_from_producer() {
    let mut store = Store::new(common::initial_state(1));
    let mut flow = open_flow(&store, "4");
    flow.form_mut()
        .unwrap()
        .select_counterparty(AgentId::new("2"));

    let tx = flow.submit(&mut store, common::t0()).unwrap();
    assert_eq!(tx.seller_id.as_str(), "2");
    assert_eq!(tx.buyer_id.as_str(), "4");
    assert_eq!(tx.amount_kwh, 100.0);
    // |0.01 - 0.05| * 100
    assert!((tx.carbon_saved_kg - 4.0).abs() < 1e-9);
    assert_eq!(common::agent(store.state(), "4").current_energy_kwh, 380.0);
}

#[test]
fn submit_without_partner_leaves_everything_untouched() {
    let mut store = Store::new(common::initial_state(1));
    let before = store.state().clone();
    let mut flow = open_flow(&store, "1");

    let err = flow.submit(&mut store, common::t0()).unwrap_err();
    assert!(matches!(err, TradeError::NoCounterparty));
    assert!(flow.is_open());
    assert_eq!(store.state(), &before);
}

#[test]
fn closed_flow_cannot_submit() {
    let mut store = Store::new(common::initial_state(1));
    let mut flow = TradeFlow::default();
    assert!(matches!(
        flow.submit(&mut store, common::t0()),
        Err(TradeError::NotOpen)
    ));
}

#[test]
fn counterparty_list_is_opposite_kind() {
    let state = common::initial_state(1);
    let producer = common::agent(&state, "1");
    let names: Vec<&str> = counterparties(&state.agents, producer)
        .into_iter()
        .map(|a| a.name.as_str())
        .collect();
    assert_eq!(names, ["Industrial Consumer", "Residential Grid"]);
}

#[test]
fn full_consumer_cannot_buy() {
    let mut state = common::initial_state(1);
    state.agents[3].current_energy_kwh = 500.0;
    let mut store = Store::new(state);
    let mut flow = open_flow(&store, "4");
    flow.form_mut()
        .unwrap()
        .select_counterparty(AgentId::new("1"));
    let err = flow.submit(&mut store, common::t0()).unwrap_err();
    assert!(matches!(err, TradeError::AmountOutOfRange { .. }));
}

#[test]
fn manual_trades_respect_log_cap() {
    let mut store = Store::new(common::initial_state(1));
    for _ in 0..15 {
        let mut flow = open_flow(&store, "1");
        {
            let form = flow.form_mut().unwrap();
            form.select_counterparty(AgentId::new("3"));
            form.set_amount(10.0);
        }
        flow.submit(&mut store, common::t0()).unwrap();
    }
    let s = store.state();
    assert_eq!(s.transactions.len(), TRANSACTION_LOG_CAPACITY);
    assert_eq!(s.transactions.latest().map(|t| t.id.0), Some(15));
    assert_eq!(common::agent(s, "1").current_energy_kwh, 700.0);
}

#[test]
fn amount_entered_before_a_tick_still_settles() {
    let cfg = ScenarioConfig::baseline();
    let clock = SimClock::bounded(common::t0(), interval_of(&cfg), 5);
    let mut engine = Engine::with_source(&cfg, clock, ScriptedSource::constant(0.9));

    let mut flow = TradeFlow::default();
    flow.open(
        common::agent(engine.state(), "4"),
        engine.state().market.current_price,
    );
    {
        let form = flow.form_mut().unwrap();
        form.select_counterparty(AgentId::new("2"));
        form.set_amount(220.0);
        assert_eq!(form.amount_kwh, 220.0);
    }

    engine.step();
    let before = common::agent(engine.state(), "4").current_energy_kwh;
    assert!(before > 280.0);

    let tx = engine.submit_trade(&mut flow).unwrap();
    assert_eq!(tx.amount_kwh, 220.0);
    assert_eq!(
        common::agent(engine.state(), "4").current_energy_kwh,
        before + 220.0
    );
    assert!(!flow.is_open());
}
