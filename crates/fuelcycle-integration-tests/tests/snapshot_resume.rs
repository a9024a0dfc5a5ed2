//! Resuming a reactor from a snapshot reproduces the original run.

mod common;

use common::*;
use fuelcycle_core::event::Event;
use fuelcycle_core::sim::Simulation;
use fuelcycle_core::test_utils::*;
use fuelcycle_reactor::Reactor;

fn world(start: u64) -> Simulation<GreedyExchange> {
    let mut sim = Simulation::starting_at(GreedyExchange, start);
    sim.add_facility(FuelSource::unlimited("mine", "uox", "fresh_uox"))
        .unwrap();
    sim.add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 1))
        .unwrap();
    sim
}

#[test]
fn restored_reactor_continues_identically() {
    init_tracing();
    let mut config = uox_reactor(3, 1, 1, 2, 3, 2);
    config.pref_change_times = vec![12];
    config.pref_change_commods = vec!["uox".into()];
    config.pref_change_values = vec![4.0];

    let mut original = world(0);
    let rid = original
        .add_facility(Reactor::new(config).unwrap())
        .unwrap();
    original.run(9).unwrap();

    let bytes = reactor(&original, rid).snapshot(original.time()).unwrap();
    let ids = original.resource_ids().clone();
    original.run(11).unwrap();

    let (header, restored) = Reactor::restore(&bytes).unwrap();
    assert_eq!(header.time, 9);
    let mut resumed = world(header.time);
    resumed.set_resource_ids(ids);
    let rid2 = resumed.add_facility(restored).unwrap();
    resumed.run(11).unwrap();

    assert_eq!(reactor(&original, rid), reactor(&resumed, rid2));
    assert_eq!(resumed.time(), original.time());

    let tail: Vec<&Event> = original
        .log()
        .for_facility(rid)
        .filter(|e| e.time >= 9)
        .collect();
    let replay: Vec<&Event> = resumed.log().for_facility(rid2).collect();
    assert!(!tail.is_empty());
    assert_eq!(tail, replay);
}
