//! Property tests: under arbitrary supply and demand, reactor buffers stay
//! within capacity, hold only whole assemblies, and every assembly leaving
//! the reactor carries its fuel's discharge recipe.

mod common;

use common::*;
use fuelcycle_core::event::EventKind;
use fuelcycle_core::sim::Simulation;
use fuelcycle_core::test_utils::*;
use fuelcycle_reactor::Reactor;
use proptest::prelude::*;

/// (core, batch, fresh, spent, cycle, refuel)
fn arb_shape() -> impl Strategy<Value = (u32, u32, u32, u32, u64, u64)> {
    (1u32..5).prop_flat_map(|core| {
        (
            Just(core),
            1..=core,
            0u32..3,
            1u32..6,
            1u64..5,
            0u64..3,
        )
    })
}

/// Per step: (assemblies restocked at the source, assemblies the sink wants).
fn arb_plan() -> impl Strategy<Value = Vec<(u32, u32)>> {
    proptest::collection::vec((0u32..3, 0u32..3), 1..40)
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn buffers_stay_whole_and_bounded(
        (core, batch, fresh, spent, cycle, refuel) in arb_shape(),
        plan in arb_plan(),
    ) {
        let mut sim = Simulation::new(GreedyExchange);
        let src = sim
            .add_facility(FuelSource::limited("mine", "uox", "fresh_uox", kg(0.0)))
            .unwrap();
        let sink = sim
            .add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 0))
            .unwrap();
        let config = uox_reactor(core, batch, fresh, spent, cycle, refuel);
        let rid = sim.add_facility(Reactor::new(config).unwrap()).unwrap();

        for (restock, wanted) in plan {
            sim.facility_mut::<FuelSource>(src)
                .unwrap()
                .restock(kg(f64::from(restock) * ASSEM_KG));
            sim.facility_mut::<FuelSink>(sink).unwrap().set_per_step(wanted);
            prop_assert!(sim.step().is_ok());
            assert_buffers_sound(reactor(&sim, rid));
        }

        let shipped = sim.facility::<FuelSink>(sink).unwrap().received();
        prop_assert!(shipped.iter().all(|a| a.recipe == "spent_uox"));
        prop_assert!(reactor(&sim, rid).spent().peek_all().all(|a| a.recipe == "spent_uox"));

        // Every discharge moved exactly one batch.
        let discharges = times_of(sim.log(), rid, EventKind::Discharge).len();
        let out = shipped.len() + reactor(&sim, rid).spent().count();
        prop_assert_eq!(out, discharges * batch as usize);
    }

    #[test]
    fn at_most_one_discharge_per_step(
        (core, batch, fresh, spent, cycle, refuel) in arb_shape(),
        steps in 1usize..30,
    ) {
        let mut sim = Simulation::new(GreedyExchange);
        sim.add_facility(FuelSource::unlimited("mine", "uox", "fresh_uox")).unwrap();
        sim.add_facility(FuelSink::new("repository", "waste", kg(ASSEM_KG), 1)).unwrap();
        let config = uox_reactor(core, batch, fresh, spent, cycle, refuel);
        let rid = sim.add_facility(Reactor::new(config).unwrap()).unwrap();
        sim.run(steps as u64).unwrap();

        let times = times_of(sim.log(), rid, EventKind::Discharge);
        let mut deduped = times.clone();
        deduped.dedup();
        prop_assert_eq!(times, deduped);
    }
}
