//! Reactor configuration and its validation.
//!
//! [`ReactorConfig`] mirrors the facility's declared parameters as flat,
//! index-aligned arrays: position `i` of each `fuel_*` array describes fuel
//! type `i`. Schedules are likewise three or four aligned arrays each.
//! Nothing here is checked until [`ReactorConfig::validate`] runs, which
//! [`crate::Reactor::new`] always does.

use fuelcycle_core::fixed::{Mass, Ticks};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

pub const DEFAULT_NAME: &str = "reactor";
pub const DEFAULT_N_ASSEM_CORE: u32 = 3;
pub const DEFAULT_N_ASSEM_SPENT: u32 = 1_000_000_000;
pub const DEFAULT_CYCLE_TIME: Ticks = 18;
pub const DEFAULT_REFUEL_TIME: Ticks = 1;

fn default_name() -> String {
    DEFAULT_NAME.to_string()
}

fn default_n_assem_core() -> u32 {
    DEFAULT_N_ASSEM_CORE
}

fn default_n_assem_spent() -> u32 {
    DEFAULT_N_ASSEM_SPENT
}

fn default_cycle_time() -> Ticks {
    DEFAULT_CYCLE_TIME
}

fn default_refuel_time() -> Ticks {
    DEFAULT_REFUEL_TIME
}

// ---------------------------------------------------------------------------
// ReactorConfig
// ---------------------------------------------------------------------------

/// Declared parameters of one reactor.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReactorConfig {
    #[serde(default = "default_name")]
    pub name: String,

    /// Commodities fresh fuel is requested on, one per fuel type.
    pub fuel_incommods: Vec<String>,
    /// Recipe of fresh fuel for each fuel type.
    pub fuel_inrecipes: Vec<String>,
    /// Recipe each fuel type is transmuted to on discharge.
    pub fuel_outrecipes: Vec<String>,
    /// Commodity spent fuel of each type is offered on.
    pub fuel_outcommods: Vec<String>,
    /// Request preference per fuel type. Empty means zero for every fuel.
    #[serde(default)]
    pub fuel_prefs: Vec<f64>,

    /// Assemblies discharged at the end of each cycle.
    pub n_assem_batch: u32,
    /// Mass of one assembly in kg.
    pub assem_size: f64,
    #[serde(default = "default_n_assem_core")]
    pub n_assem_core: u32,
    #[serde(default = "default_n_assem_spent")]
    pub n_assem_spent: u32,
    /// Zero means fuel is only acquired just in time, after discharge.
    #[serde(default)]
    pub n_assem_fresh: u32,

    #[serde(default = "default_cycle_time")]
    pub cycle_time: Ticks,
    #[serde(default = "default_refuel_time")]
    pub refuel_time: Ticks,

    /// Resumable state: operating steps already completed in this cycle.
    #[serde(default)]
    pub cycle_step: Ticks,
    /// Resumable state: the current cycle's batch has been discharged.
    #[serde(default)]
    pub discharged: bool,

    #[serde(default)]
    pub pref_change_times: Vec<Ticks>,
    #[serde(default)]
    pub pref_change_commods: Vec<String>,
    #[serde(default)]
    pub pref_change_values: Vec<f64>,

    #[serde(default)]
    pub recipe_change_times: Vec<Ticks>,
    #[serde(default)]
    pub recipe_change_commods: Vec<String>,
    #[serde(default)]
    pub recipe_change_in: Vec<String>,
    #[serde(default)]
    pub recipe_change_out: Vec<String>,
}

impl ReactorConfig {
    /// A config with one fuel type and no schedules. Everything else takes
    /// its serde default.
    pub fn single_fuel(
        incommod: &str,
        inrecipe: &str,
        outrecipe: &str,
        outcommod: &str,
        n_assem_batch: u32,
        assem_size: f64,
    ) -> Self {
        Self {
            name: default_name(),
            fuel_incommods: vec![incommod.to_string()],
            fuel_inrecipes: vec![inrecipe.to_string()],
            fuel_outrecipes: vec![outrecipe.to_string()],
            fuel_outcommods: vec![outcommod.to_string()],
            fuel_prefs: Vec::new(),
            n_assem_batch,
            assem_size,
            n_assem_core: default_n_assem_core(),
            n_assem_spent: default_n_assem_spent(),
            n_assem_fresh: 0,
            cycle_time: default_cycle_time(),
            refuel_time: default_refuel_time(),
            cycle_step: 0,
            discharged: false,
            pref_change_times: Vec::new(),
            pref_change_commods: Vec::new(),
            pref_change_values: Vec::new(),
            recipe_change_times: Vec::new(),
            recipe_change_commods: Vec::new(),
            recipe_change_in: Vec::new(),
            recipe_change_out: Vec::new(),
        }
    }

    /// Assembly mass as fixed point. Only meaningful after validation.
    pub fn assem_mass(&self) -> Mass {
        Mass::saturating_from_num(self.assem_size)
    }

    /// Check every structural and range constraint.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let n = self.fuel_incommods.len();
        if n == 0 {
            return Err(ConfigError::NoFuel);
        }
        for (field, len) in [
            ("fuel_inrecipes", self.fuel_inrecipes.len()),
            ("fuel_outrecipes", self.fuel_outrecipes.len()),
            ("fuel_outcommods", self.fuel_outcommods.len()),
        ] {
            if len != n {
                return Err(ConfigError::FuelArrayLength {
                    field,
                    len,
                    expected: n,
                });
            }
        }
        if !self.fuel_prefs.is_empty() && self.fuel_prefs.len() != n {
            return Err(ConfigError::PreferenceLength {
                len: self.fuel_prefs.len(),
                expected: n,
            });
        }
        for &p in &self.fuel_prefs {
            if !p.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: "fuel_prefs",
                    value: p,
                });
            }
        }

        let mut seen = HashSet::new();
        for c in &self.fuel_incommods {
            if !seen.insert(c.as_str()) {
                return Err(ConfigError::DuplicateIncommod(c.clone()));
            }
        }

        for (field, v) in [
            ("n_assem_batch", self.n_assem_batch),
            ("n_assem_core", self.n_assem_core),
            ("n_assem_spent", self.n_assem_spent),
        ] {
            if v == 0 {
                return Err(ConfigError::NonPositive { field });
            }
        }
        if self.cycle_time == 0 {
            return Err(ConfigError::NonPositive {
                field: "cycle_time",
            });
        }
        if !self.assem_size.is_finite() {
            return Err(ConfigError::NonFinite {
                field: "assem_size",
                value: self.assem_size,
            });
        }
        if self.assem_size <= 0.0 {
            return Err(ConfigError::NonPositive {
                field: "assem_size",
            });
        }
        if Mass::checked_from_num(self.assem_size).is_none() {
            return Err(ConfigError::AssemblySizeRange(self.assem_size));
        }
        // Spent capacity is allowed to saturate.
        let unit = self.assem_mass();
        for (field, count) in [
            ("n_assem_core", self.n_assem_core),
            ("n_assem_fresh", self.n_assem_fresh),
        ] {
            if Mass::checked_from_num(count)
                .and_then(|n| n.checked_mul(unit))
                .is_none()
            {
                return Err(ConfigError::CapacityRange {
                    field,
                    count,
                    assem_size: self.assem_size,
                });
            }
        }
        if self.n_assem_batch > self.n_assem_core {
            return Err(ConfigError::BatchExceedsCore {
                batch: self.n_assem_batch,
                core: self.n_assem_core,
            });
        }

        self.validate_schedules(&seen)
    }

    fn validate_schedules(&self, incommods: &HashSet<&str>) -> Result<(), ConfigError> {
        let pref_lens = vec![
            self.pref_change_times.len(),
            self.pref_change_commods.len(),
            self.pref_change_values.len(),
        ];
        if pref_lens.iter().any(|&l| l != pref_lens[0]) {
            return Err(ConfigError::ScheduleLength {
                schedule: "preference",
                lens: pref_lens,
            });
        }
        for (i, c) in self.pref_change_commods.iter().enumerate() {
            if !incommods.contains(c.as_str()) {
                return Err(ConfigError::UnknownScheduleCommod {
                    schedule: "preference",
                    time: self.pref_change_times[i],
                    commod: c.clone(),
                });
            }
        }
        for &v in &self.pref_change_values {
            if !v.is_finite() {
                return Err(ConfigError::NonFinite {
                    field: "pref_change_values",
                    value: v,
                });
            }
        }

        let recipe_lens = vec![
            self.recipe_change_times.len(),
            self.recipe_change_commods.len(),
            self.recipe_change_in.len(),
            self.recipe_change_out.len(),
        ];
        if recipe_lens.iter().any(|&l| l != recipe_lens[0]) {
            return Err(ConfigError::ScheduleLength {
                schedule: "recipe",
                lens: recipe_lens,
            });
        }
        for (i, c) in self.recipe_change_commods.iter().enumerate() {
            if !incommods.contains(c.as_str()) {
                return Err(ConfigError::UnknownScheduleCommod {
                    schedule: "recipe",
                    time: self.recipe_change_times[i],
                    commod: c.clone(),
                });
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// ConfigError
// ---------------------------------------------------------------------------

/// A reactor configuration that cannot be built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("reactor needs at least one fuel type")]
    NoFuel,
    #[error("'{field}' has {len} entries, expected {expected} (one per fuel incommod)")]
    FuelArrayLength {
        field: &'static str,
        len: usize,
        expected: usize,
    },
    #[error("'fuel_prefs' has {len} entries, expected 0 or {expected}")]
    PreferenceLength { len: usize, expected: usize },
    #[error("{schedule} change arrays differ in length: {lens:?}")]
    ScheduleLength {
        schedule: &'static str,
        lens: Vec<usize>,
    },
    #[error("incommod '{0}' is listed for more than one fuel type")]
    DuplicateIncommod(String),
    #[error("{schedule} change at time {time} names unknown incommod '{commod}'")]
    UnknownScheduleCommod {
        schedule: &'static str,
        time: Ticks,
        commod: String,
    },
    #[error("'{field}' must be positive")]
    NonPositive { field: &'static str },
    #[error("'{field}' must be finite, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("assem_size {0} kg is outside the representable mass range")]
    AssemblySizeRange(f64),
    #[error("'{field}': {count} assemblies of {assem_size} kg overflow the mass range")]
    CapacityRange {
        field: &'static str,
        count: u32,
        assem_size: f64,
    },
    #[error("n_assem_batch ({batch}) exceeds n_assem_core ({core})")]
    BatchExceedsCore { batch: u32, core: u32 },
}
