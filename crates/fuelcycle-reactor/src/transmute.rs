//! Recipe substitution applied to a batch at discharge.
//!
//! Burnup is not computed: each assembly simply takes on the outrecipe of
//! the fuel type it was acquired under. Mass and identity are unchanged.
//! Resolution happens for the whole batch before any assembly changes, so
//! a batch is either fully transmuted or untouched.

use crate::index::ResourceIndex;
use crate::ledger::FuelLedger;
use fuelcycle_core::facility::FacilityError;
use fuelcycle_core::material::Assembly;

/// Resolve the post-discharge recipe of every assembly in `batch`.
pub fn plan<'a>(
    batch: impl IntoIterator<Item = &'a Assembly>,
    ledger: &FuelLedger,
    index: &ResourceIndex,
) -> Result<Vec<String>, FacilityError> {
    batch
        .into_iter()
        .map(|a| {
            ledger
                .resolve(index, a.id)
                .map(|(_, fuel)| fuel.outrecipe.clone())
        })
        .collect()
}

/// Apply recipes produced by [`plan`], pairwise.
pub fn apply(batch: &mut [Assembly], recipes: &[String]) {
    for (a, recipe) in batch.iter_mut().zip(recipes) {
        a.transmute(recipe);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReactorConfig;
    use crate::ledger::FuelIndex;
    use fuelcycle_core::id::ResourceId;
    use fuelcycle_core::test_utils::assembly;

    fn setup() -> (FuelLedger, ResourceIndex) {
        let mut c = ReactorConfig::single_fuel("uox", "fresh_uox", "spent_uox", "waste", 1, 10.0);
        c.fuel_incommods.push("mox".into());
        c.fuel_inrecipes.push("fresh_mox".into());
        c.fuel_outrecipes.push("spent_mox".into());
        c.fuel_outcommods.push("waste".into());
        let mut index = ResourceIndex::new();
        index.insert(ResourceId(1), FuelIndex(0));
        index.insert(ResourceId(2), FuelIndex(1));
        (FuelLedger::from_config(&c), index)
    }

    #[test]
    fn each_assembly_takes_its_fuels_outrecipe() {
        let (ledger, index) = setup();
        let mut batch = vec![assembly(1, 10.0, "fresh_uox"), assembly(2, 10.0, "fresh_mox")];
        let recipes = plan(&batch, &ledger, &index).unwrap();
        apply(&mut batch, &recipes);
        assert_eq!(batch[0].recipe, "spent_uox");
        assert_eq!(batch[1].recipe, "spent_mox");
        assert!(batch.iter().all(|a| a.mass == fuelcycle_core::test_utils::kg(10.0)));
    }

    #[test]
    fn unknown_resource_leaves_batch_untouched() {
        let (ledger, index) = setup();
        let mut batch = vec![assembly(1, 10.0, "fresh_uox"), assembly(7, 10.0, "fresh_uox")];
        assert!(matches!(
            plan(&batch, &ledger, &index),
            Err(FacilityError::UnknownResource(ResourceId(7)))
        ));
        assert_eq!(batch[0].recipe, "fresh_uox");
    }
}
