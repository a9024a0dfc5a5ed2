//! Back-references from received resources to the fuel type they were
//! acquired under.
//!
//! Buffers hold bare assemblies; only this index remembers which fuel
//! ledger entry an assembly belongs to. Entries are never removed: resource
//! ids are not reused within a run.

use crate::ledger::FuelIndex;
use fuelcycle_core::id::ResourceId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceIndex {
    entries: BTreeMap<ResourceId, FuelIndex>,
}

impl ResourceIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record `id` as acquired under `fuel`. Re-indexing an id overwrites
    /// the previous entry.
    pub fn insert(&mut self, id: ResourceId, fuel: FuelIndex) {
        self.entries.insert(id, fuel);
    }

    pub fn get(&self, id: ResourceId) -> Option<FuelIndex> {
        self.entries.get(&id).copied()
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (ResourceId, FuelIndex)> + '_ {
        self.entries.iter().map(|(&id, &fuel)| (id, fuel))
    }
}
