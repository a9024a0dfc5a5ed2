//! The fuel ledger: per-fuel-type metadata and its time-indexed overrides.
//!
//! Fuel types are identified by their position in the ledger
//! ([`FuelIndex`]). Preference and recipe-pair overrides are scheduled by
//! time and applied in place by [`FuelLedger::apply_due_changes`], which is
//! idempotent per time step.

use crate::config::ReactorConfig;
use crate::index::ResourceIndex;
use fuelcycle_core::facility::FacilityError;
use fuelcycle_core::fixed::Ticks;
use fuelcycle_core::id::ResourceId;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Fuel types
// ---------------------------------------------------------------------------

/// Position of a fuel type in the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct FuelIndex(pub usize);

/// One fuel the reactor can burn.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelType {
    pub incommod: String,
    pub inrecipe: String,
    pub outrecipe: String,
    pub outcommod: String,
    pub preference: f64,
}

// ---------------------------------------------------------------------------
// Schedules
// ---------------------------------------------------------------------------

/// What a scheduled change replaces.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum ChangePayload {
    Preference(f64),
    Recipes { inrecipe: String, outrecipe: String },
}

/// An override applied to the fuel type with incommod `target_commod` at
/// exactly `time`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScheduledChange {
    pub time: Ticks,
    pub target_commod: String,
    pub payload: ChangePayload,
}

// ---------------------------------------------------------------------------
// FuelLedger
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FuelLedger {
    fuels: Vec<FuelType>,
    /// Preference changes first, then recipe changes, each in declared
    /// order. Same-time changes to one commodity apply in this order.
    schedule: Vec<ScheduledChange>,
    /// Time of the last [`FuelLedger::apply_due_changes`] call.
    last_applied: Option<Ticks>,
}

impl FuelLedger {
    /// Build from an already validated config. Missing preferences are zero.
    pub fn from_config(config: &ReactorConfig) -> Self {
        let fuels = (0..config.fuel_incommods.len())
            .map(|i| FuelType {
                incommod: config.fuel_incommods[i].clone(),
                inrecipe: config.fuel_inrecipes[i].clone(),
                outrecipe: config.fuel_outrecipes[i].clone(),
                outcommod: config.fuel_outcommods[i].clone(),
                preference: config.fuel_prefs.get(i).copied().unwrap_or(0.0),
            })
            .collect();

        let prefs = config
            .pref_change_times
            .iter()
            .zip(&config.pref_change_commods)
            .zip(&config.pref_change_values)
            .map(|((&time, commod), &value)| ScheduledChange {
                time,
                target_commod: commod.clone(),
                payload: ChangePayload::Preference(value),
            });
        let recipes = config
            .recipe_change_times
            .iter()
            .zip(&config.recipe_change_commods)
            .zip(config.recipe_change_in.iter().zip(&config.recipe_change_out))
            .map(|((&time, commod), (inrecipe, outrecipe))| ScheduledChange {
                time,
                target_commod: commod.clone(),
                payload: ChangePayload::Recipes {
                    inrecipe: inrecipe.clone(),
                    outrecipe: outrecipe.clone(),
                },
            });

        Self {
            fuels,
            schedule: prefs.chain(recipes).collect(),
            last_applied: None,
        }
    }

    pub fn len(&self) -> usize {
        self.fuels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fuels.is_empty()
    }

    pub fn fuels(&self) -> &[FuelType] {
        &self.fuels
    }

    pub fn schedule(&self) -> &[ScheduledChange] {
        &self.schedule
    }

    pub fn lookup(&self, fuel: FuelIndex) -> Option<&FuelType> {
        self.fuels.get(fuel.0)
    }

    /// The fuel type requested on `incommod`.
    pub fn position(&self, incommod: &str) -> Option<FuelIndex> {
        self.fuels
            .iter()
            .position(|f| f.incommod == incommod)
            .map(FuelIndex)
    }

    /// Distinct outcommods in ledger order.
    pub fn outcommods(&self) -> Vec<&str> {
        let mut out: Vec<&str> = Vec::new();
        for f in &self.fuels {
            if !out.contains(&f.outcommod.as_str()) {
                out.push(&f.outcommod);
            }
        }
        out
    }

    /// The fuel type a received resource was acquired under.
    pub fn resolve(
        &self,
        index: &ResourceIndex,
        id: ResourceId,
    ) -> Result<(FuelIndex, &FuelType), FacilityError> {
        let fuel = index.get(id).ok_or(FacilityError::UnknownResource(id))?;
        let ty = self.lookup(fuel).ok_or(FacilityError::UnknownResource(id))?;
        Ok((fuel, ty))
    }

    /// Apply every change scheduled for exactly `now`. A second call for the
    /// same `now` applies nothing. Returns the changes applied.
    pub fn apply_due_changes(&mut self, now: Ticks) -> Vec<ScheduledChange> {
        if self.last_applied == Some(now) {
            return Vec::new();
        }
        self.last_applied = Some(now);

        let mut applied = Vec::new();
        for change in self.schedule.iter().filter(|c| c.time == now) {
            let Some(fuel) = self
                .fuels
                .iter_mut()
                .find(|f| f.incommod == change.target_commod)
            else {
                continue;
            };
            match &change.payload {
                ChangePayload::Preference(p) => fuel.preference = *p,
                ChangePayload::Recipes {
                    inrecipe,
                    outrecipe,
                } => {
                    fuel.inrecipe = inrecipe.clone();
                    fuel.outrecipe = outrecipe.clone();
                }
            }
            applied.push(change.clone());
        }
        applied
    }
}
