//! End-to-end reactor scenarios through the stepping driver.
//!
//! Each test wires one reactor to stand-in suppliers and consumers on a
//! greedy exchange and checks cycle timing, inventory movement and the
//! stall conditions.

mod common;

use common::*;
use fuelcycle_core::event::EventKind;
use fuelcycle_core::exchange::{Exchange, PostedBidPortfolio, PostedPortfolio, Trade};
use fuelcycle_core::facility::FacilityError;
use fuelcycle_core::sim::{SimError, Simulation};
use fuelcycle_core::test_utils::*;
use fuelcycle_reactor::{CyclePhase, Reactor, ReactorConfig, StallReason};

// ===========================================================================
// Steady operation
// ===========================================================================

#[test]
fn steady_cycles_with_ample_supply() {
    init_tracing();
    let mut sim = Simulation::new(GreedyExchange);
    sim.add_facility(FuelSource::unlimited("mine", "uox", "fresh_uox"))
        .unwrap();
    let sink = sim
        .add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 5))
        .unwrap();
    let rid = sim
        .add_facility(Reactor::new(uox_reactor(3, 1, 1, 10, 3, 1)).unwrap())
        .unwrap();

    for _ in 0..16 {
        sim.step().unwrap();
        assert_buffers_sound(reactor(&sim, rid));
    }

    assert_eq!(times_of(sim.log(), rid, EventKind::CycleStart), vec![0, 4, 8, 12]);
    assert_eq!(times_of(sim.log(), rid, EventKind::CycleEnd), vec![2, 6, 10, 14]);
    assert_eq!(times_of(sim.log(), rid, EventKind::Discharge), vec![3, 7, 11, 15]);

    let received = sim.facility::<FuelSink>(sink).unwrap().received();
    assert_eq!(received.len(), 4);
    assert!(received.iter().all(|a| a.recipe == "spent_uox" && a.mass == kg(ASSEM_KG)));

    let r = reactor(&sim, rid);
    assert_eq!(r.core().count(), 3);
    assert_eq!(r.fresh().count(), 1);
    assert!(r.spent().is_empty());
}

#[test]
fn just_in_time_fuel_without_fresh_buffer() {
    let mut sim = Simulation::new(GreedyExchange);
    sim.add_facility(FuelSource::unlimited("mine", "uox", "fresh_uox"))
        .unwrap();
    let rid = sim
        .add_facility(Reactor::new(uox_reactor(3, 1, 0, 10, 3, 1)).unwrap())
        .unwrap();

    for _ in 0..12 {
        sim.step().unwrap();
        assert!(reactor(&sim, rid).fresh().is_empty());
    }

    assert_eq!(
        times_of(sim.log(), rid, EventKind::TradeIn),
        vec![0, 0, 0, 3, 7, 11]
    );
    assert_eq!(times_of(sim.log(), rid, EventKind::CycleStart), vec![0, 4, 8]);
    assert_eq!(reactor(&sim, rid).spent().count(), 3);
}

// ===========================================================================
// Stalls
// ===========================================================================

#[test]
fn initial_fill_waits_for_last_assembly() {
    let mut sim = Simulation::new(GreedyExchange);
    let src = sim
        .add_facility(FuelSource::limited("mine", "uox", "fresh_uox", kg(2.0 * ASSEM_KG)))
        .unwrap();
    let rid = sim
        .add_facility(Reactor::new(uox_reactor(3, 3, 0, 1, 2, 1)).unwrap())
        .unwrap();

    sim.run(5).unwrap();
    let r = reactor(&sim, rid);
    assert_eq!(r.core().count(), 2);
    assert_eq!(r.phase(), CyclePhase::Refueling);
    assert_eq!(r.cycle().cycle_step, 0);
    assert!(times_of(sim.log(), rid, EventKind::CycleStart).is_empty());

    sim.facility_mut::<FuelSource>(src)
        .unwrap()
        .restock(kg(ASSEM_KG));
    sim.step().unwrap();
    assert_eq!(times_of(sim.log(), rid, EventKind::CycleStart), vec![5]);
    assert_eq!(reactor(&sim, rid).phase(), CyclePhase::Operating);

    // A one-assembly spent store can never take a three-assembly batch.
    sim.run(2).unwrap();
    assert_eq!(
        reactor(&sim, rid).phase(),
        CyclePhase::Stalled {
            reason: StallReason::SpentFull
        }
    );
    assert_eq!(times_of(sim.log(), rid, EventKind::DischargeBlocked), vec![7]);
}

#[test]
fn full_spent_buffer_holds_until_traded() {
    let mut sim = Simulation::new(GreedyExchange);
    sim.add_facility(FuelSource::unlimited("mine", "uox", "fresh_uox"))
        .unwrap();
    let rid = sim
        .add_facility(Reactor::new(uox_reactor(1, 1, 0, 2, 1, 0)).unwrap())
        .unwrap();

    sim.run(3).unwrap();
    let (core_before, spent_before) = {
        let r = reactor(&sim, rid);
        assert_eq!(r.spent().count(), 2);
        (ids(r.core()), ids(r.spent()))
    };

    sim.run(2).unwrap();
    {
        let r = reactor(&sim, rid);
        assert_eq!(ids(r.core()), core_before);
        assert_eq!(ids(r.spent()), spent_before);
        assert_eq!(times_of(sim.log(), rid, EventKind::DischargeBlocked), vec![3, 4]);
    }

    let sink = sim
        .add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 1))
        .unwrap();
    sim.run(2).unwrap();
    assert_eq!(times_of(sim.log(), rid, EventKind::Discharge), vec![1, 2, 6]);
    assert_eq!(sim.facility::<FuelSink>(sink).unwrap().received().len(), 2);
    assert_buffers_sound(reactor(&sim, rid));
}

#[test]
fn resumed_mid_cycle_refuels_before_operating() {
    let mut c = uox_reactor(3, 1, 0, 10, 4, 1);
    c.cycle_step = 2;
    let mut sim = Simulation::new(GreedyExchange);
    sim.add_facility(FuelSource::unlimited("mine", "uox", "fresh_uox"))
        .unwrap();
    sim.add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 1))
        .unwrap();
    let rid = sim.add_facility(Reactor::new(c).unwrap()).unwrap();
    assert_eq!(reactor(&sim, rid).phase(), CyclePhase::Refueling);

    sim.run(4).unwrap();

    assert_eq!(times_of(sim.log(), rid, EventKind::TradeIn), vec![0, 0, 0, 2]);
    assert_eq!(times_of(sim.log(), rid, EventKind::CycleEnd), vec![1]);
    assert_eq!(times_of(sim.log(), rid, EventKind::Discharge), vec![2]);
    assert_eq!(times_of(sim.log(), rid, EventKind::CycleStart), vec![3]);
    assert!(
        sim.log()
            .for_facility(rid)
            .all(|e| e.payload != "0 assemblies")
    );
    assert_buffers_sound(reactor(&sim, rid));
}

// ===========================================================================
// Schedules
// ===========================================================================

fn two_fuel_reactor() -> ReactorConfig {
    let mut c = uox_reactor(1, 1, 0, 10, 1, 0);
    c.fuel_incommods.push("mox".into());
    c.fuel_inrecipes.push("fresh_mox".into());
    c.fuel_outrecipes.push("spent_mox".into());
    c.fuel_outcommods.push("waste".into());
    c.fuel_prefs = vec![2.0, 1.0];
    c.pref_change_times = vec![4];
    c.pref_change_commods = vec!["mox".into()];
    c.pref_change_values = vec![5.0];
    c
}

#[test]
fn preference_change_switches_fuel() {
    let mut sim = Simulation::new(GreedyExchange);
    sim.add_facility(FuelSource::unlimited("uox_mine", "uox", "fresh_uox"))
        .unwrap();
    sim.add_facility(FuelSource::unlimited("mox_plant", "mox", "fresh_mox"))
        .unwrap();
    let sink = sim
        .add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 1))
        .unwrap();
    let rid = sim
        .add_facility(Reactor::new(two_fuel_reactor()).unwrap())
        .unwrap();

    sim.run(8).unwrap();

    for e in sim.log().for_facility(rid).filter(|e| e.kind == EventKind::TradeIn) {
        let want = if e.time < 4 { "on uox" } else { "on mox" };
        assert!(e.payload.ends_with(want), "{} at {}", e.payload, e.time);
    }
    assert_eq!(times_of(sim.log(), rid, EventKind::PrefChange), vec![4]);

    let recipes: Vec<&str> = sim
        .facility::<FuelSink>(sink)
        .unwrap()
        .received()
        .iter()
        .map(|a| a.recipe.as_str())
        .collect();
    assert_eq!(
        recipes,
        vec![
            "spent_uox",
            "spent_uox",
            "spent_uox",
            "spent_uox",
            "spent_mox",
            "spent_mox",
            "spent_mox"
        ]
    );
}

#[test]
fn recipe_change_reaches_requests_and_discharges() {
    let mut c = uox_reactor(1, 1, 0, 10, 1, 0);
    c.recipe_change_times = vec![2];
    c.recipe_change_commods = vec!["uox".into()];
    c.recipe_change_in = vec!["fresh_uox_hi".into()];
    c.recipe_change_out = vec!["spent_uox_hi".into()];

    let mut sim = Simulation::new(GreedyExchange);
    sim.add_facility(FuelSource::to_order("mine", "uox")).unwrap();
    let sink = sim
        .add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 1))
        .unwrap();
    let rid = sim.add_facility(Reactor::new(c).unwrap()).unwrap();

    sim.run(5).unwrap();

    let recipes: Vec<&str> = sim
        .facility::<FuelSink>(sink)
        .unwrap()
        .received()
        .iter()
        .map(|a| a.recipe.as_str())
        .collect();
    assert_eq!(
        recipes,
        vec!["spent_uox", "spent_uox", "spent_uox_hi", "spent_uox_hi"]
    );
    let core = reactor(&sim, rid).core();
    assert!(core.peek_all().all(|a| a.recipe == "fresh_uox_hi"));
    assert_eq!(times_of(sim.log(), rid, EventKind::RecipeChange), vec![2]);
}

#[test]
fn distinct_outcommods_stay_apart() {
    let mut c = uox_reactor(2, 2, 0, 10, 1, 0);
    c.fuel_incommods.push("mox".into());
    c.fuel_inrecipes.push("fresh_mox".into());
    c.fuel_outrecipes.push("spent_mox".into());
    c.fuel_outcommods.push("waste_m".into());
    c.fuel_prefs = vec![2.0, 1.0];

    let mut sim = Simulation::new(GreedyExchange);
    sim.add_facility(FuelSource::limited("uox_mine", "uox", "fresh_uox", kg(ASSEM_KG)))
        .unwrap();
    sim.add_facility(FuelSource::unlimited("mox_plant", "mox", "fresh_mox"))
        .unwrap();
    let uox_sink = sim
        .add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 1))
        .unwrap();
    let mox_sink = sim
        .add_facility(FuelSink::new("mox_store", "waste_m", kg(ASSEM_KG), 1))
        .unwrap();
    let rid = sim.add_facility(Reactor::new(c).unwrap()).unwrap();

    sim.run(4).unwrap();

    let recipes_at = |id| -> Vec<String> {
        sim.facility::<FuelSink>(id)
            .unwrap()
            .received()
            .iter()
            .map(|a| a.recipe.clone())
            .collect()
    };
    assert_eq!(recipes_at(uox_sink), vec!["spent_uox"]);
    assert_eq!(recipes_at(mox_sink), vec!["spent_mox"; 3]);
    let spent = reactor(&sim, rid).spent();
    assert!(!spent.is_empty());
    assert!(spent.peek_all().all(|a| a.recipe == "spent_mox"));
}

// ===========================================================================
// Errors
// ===========================================================================

/// Delivers twice the mass of every trade the greedy exchange makes.
#[derive(Debug)]
struct DoublingExchange;

impl Exchange for DoublingExchange {
    fn clear(&mut self, requests: &[PostedPortfolio], bids: &[PostedBidPortfolio]) -> Vec<Trade> {
        let mut trades = GreedyExchange.clear(requests, bids);
        for t in &mut trades {
            t.offer.quantity += t.offer.quantity;
        }
        trades
    }
}

#[test]
fn oversized_delivery_is_fatal() {
    let mut sim = Simulation::new(DoublingExchange);
    sim.add_facility(FuelSource::unlimited("mine", "uox", "fresh_uox"))
        .unwrap();
    let rid = sim
        .add_facility(Reactor::new(uox_reactor(1, 1, 0, 10, 1, 0)).unwrap())
        .unwrap();

    match sim.step() {
        Err(SimError::Facility {
            facility,
            name,
            time,
            source: FacilityError::AssemblyMass { received, expected, .. },
        }) => {
            assert_eq!(facility, rid);
            assert_eq!(name, "lwr");
            assert_eq!(time, 0);
            assert_eq!(received, kg(2.0 * ASSEM_KG));
            assert_eq!(expected, kg(ASSEM_KG));
        }
        other => panic!("expected an assembly mass error, got {other:?}"),
    }
    assert!(reactor(&sim, rid).core().is_empty());
}
