//! Helpers shared by the integration test files.

#![allow(dead_code)]

use fuelcycle_core::event::{EventKind, EventLog};
use fuelcycle_core::exchange::Exchange;
use fuelcycle_core::fixed::Mass;
use fuelcycle_core::id::{FacilityId, ResourceId};
use fuelcycle_core::sim::Simulation;
use fuelcycle_core::test_utils::kg;
use fuelcycle_reactor::{Reactor, ReactorConfig};
use tracing_subscriber::EnvFilter;

pub const ASSEM_KG: f64 = 10.0;

/// Install a test-friendly subscriber once. Honors `RUST_LOG`.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Single-fuel reactor: requests `uox`, offers `waste`.
pub fn uox_reactor(
    core: u32,
    batch: u32,
    fresh: u32,
    spent: u32,
    cycle: u64,
    refuel: u64,
) -> ReactorConfig {
    let mut c =
        ReactorConfig::single_fuel("uox", "fresh_uox", "spent_uox", "waste", batch, ASSEM_KG);
    c.name = "lwr".to_string();
    c.n_assem_core = core;
    c.n_assem_fresh = fresh;
    c.n_assem_spent = spent;
    c.cycle_time = cycle;
    c.refuel_time = refuel;
    c
}

pub fn reactor<X: Exchange>(sim: &Simulation<X>, id: FacilityId) -> &Reactor {
    sim.facility::<Reactor>(id).unwrap()
}

/// Buffers never exceed capacity and always hold whole assemblies.
pub fn assert_buffers_sound(r: &Reactor) {
    let unit = r.assem_size();
    for buf in [r.fresh(), r.core(), r.spent()] {
        assert!(buf.quantity() <= buf.capacity());
        assert_eq!(buf.quantity(), Mass::from_num(buf.count()) * unit);
        assert!(buf.peek_all().all(|a| a.mass == kg(ASSEM_KG)));
    }
    assert!(r.fresh().count() <= r.config().n_assem_fresh as usize);
    assert!(r.core().count() <= r.config().n_assem_core as usize);
    assert!(r.spent().count() <= r.config().n_assem_spent as usize);
}

/// Times at which `facility` recorded `kind`.
pub fn times_of(log: &EventLog, facility: FacilityId, kind: EventKind) -> Vec<u64> {
    log.for_facility(facility)
        .filter(|e| e.kind == kind)
        .map(|e| e.time)
        .collect()
}

pub fn ids(buf: &fuelcycle_core::buffer::ResBuf) -> Vec<ResourceId> {
    buf.peek_all().map(|a| a.id).collect()
}
