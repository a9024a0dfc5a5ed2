//! Serde data file structs for facility definitions.
//!
//! The on-disk format is record-style: each reactor lists its fuels as
//! records and its schedules as change records. The loader flattens these
//! into the index-aligned arrays of [`ReactorConfig`].

use fuelcycle_core::fixed::Ticks;
use fuelcycle_reactor::config::{
    DEFAULT_CYCLE_TIME, DEFAULT_N_ASSEM_CORE, DEFAULT_N_ASSEM_SPENT, DEFAULT_REFUEL_TIME,
    ReactorConfig,
};
use serde::Deserialize;
use std::collections::BTreeMap;

// ===========================================================================
// Reactors
// ===========================================================================

/// One fuel type a reactor accepts.
#[derive(Debug, Clone, Deserialize)]
pub struct FuelData {
    pub incommod: String,
    pub inrecipe: String,
    pub outrecipe: String,
    pub outcommod: String,
    #[serde(default)]
    pub pref: Option<f64>,
}

/// A scheduled preference change.
#[derive(Debug, Clone, Deserialize)]
pub struct PrefChangeData {
    pub time: Ticks,
    pub commod: String,
    pub value: f64,
}

/// A scheduled recipe-pair change.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeChangeData {
    pub time: Ticks,
    pub commod: String,
    pub inrecipe: String,
    pub outrecipe: String,
}

/// A reactor definition from a data file.
#[derive(Debug, Clone, Deserialize)]
pub struct ReactorData {
    pub name: String,
    pub fuels: Vec<FuelData>,
    pub n_assem_batch: u32,
    pub assem_size: f64,
    #[serde(default)]
    pub n_assem_core: Option<u32>,
    #[serde(default)]
    pub n_assem_spent: Option<u32>,
    #[serde(default)]
    pub n_assem_fresh: Option<u32>,
    #[serde(default)]
    pub cycle_time: Option<Ticks>,
    #[serde(default)]
    pub refuel_time: Option<Ticks>,
    #[serde(default)]
    pub cycle_step: Option<Ticks>,
    #[serde(default)]
    pub discharged: Option<bool>,
    #[serde(default)]
    pub pref_changes: Vec<PrefChangeData>,
    #[serde(default)]
    pub recipe_changes: Vec<RecipeChangeData>,
}

impl ReactorData {
    /// Flatten into a [`ReactorConfig`]. Preferences are only emitted when
    /// at least one fuel states one; unstated ones are then zero.
    pub fn to_config(&self) -> ReactorConfig {
        let fuel_prefs = if self.fuels.iter().any(|f| f.pref.is_some()) {
            self.fuels.iter().map(|f| f.pref.unwrap_or(0.0)).collect()
        } else {
            Vec::new()
        };
        ReactorConfig {
            name: self.name.clone(),
            fuel_incommods: self.fuels.iter().map(|f| f.incommod.clone()).collect(),
            fuel_inrecipes: self.fuels.iter().map(|f| f.inrecipe.clone()).collect(),
            fuel_outrecipes: self.fuels.iter().map(|f| f.outrecipe.clone()).collect(),
            fuel_outcommods: self.fuels.iter().map(|f| f.outcommod.clone()).collect(),
            fuel_prefs,
            n_assem_batch: self.n_assem_batch,
            assem_size: self.assem_size,
            n_assem_core: self.n_assem_core.unwrap_or(DEFAULT_N_ASSEM_CORE),
            n_assem_spent: self.n_assem_spent.unwrap_or(DEFAULT_N_ASSEM_SPENT),
            n_assem_fresh: self.n_assem_fresh.unwrap_or(0),
            cycle_time: self.cycle_time.unwrap_or(DEFAULT_CYCLE_TIME),
            refuel_time: self.refuel_time.unwrap_or(DEFAULT_REFUEL_TIME),
            cycle_step: self.cycle_step.unwrap_or(0),
            discharged: self.discharged.unwrap_or(false),
            pref_change_times: self.pref_changes.iter().map(|c| c.time).collect(),
            pref_change_commods: self.pref_changes.iter().map(|c| c.commod.clone()).collect(),
            pref_change_values: self.pref_changes.iter().map(|c| c.value).collect(),
            recipe_change_times: self.recipe_changes.iter().map(|c| c.time).collect(),
            recipe_change_commods: self.recipe_changes.iter().map(|c| c.commod.clone()).collect(),
            recipe_change_in: self.recipe_changes.iter().map(|c| c.inrecipe.clone()).collect(),
            recipe_change_out: self.recipe_changes.iter().map(|c| c.outrecipe.clone()).collect(),
        }
    }

    /// Every recipe name this reactor refers to, fuels first.
    pub fn recipe_names(&self) -> impl Iterator<Item = &str> {
        self.fuels
            .iter()
            .flat_map(|f| [f.inrecipe.as_str(), f.outrecipe.as_str()])
            .chain(
                self.recipe_changes
                    .iter()
                    .flat_map(|c| [c.inrecipe.as_str(), c.outrecipe.as_str()]),
            )
    }
}

// ===========================================================================
// Recipes
// ===========================================================================

/// A named composition. Only the name matters to facilities; the nuclide
/// fractions are carried for whoever consumes the recipe table.
#[derive(Debug, Clone, Deserialize)]
pub struct RecipeData {
    pub name: String,
    #[serde(default)]
    pub composition: BTreeMap<String, f64>,
}
