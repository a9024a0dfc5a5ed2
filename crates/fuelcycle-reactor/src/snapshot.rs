//! Reactor snapshots.
//!
//! A snapshot holds everything a reactor needs to carry on exactly where it
//! left off: config, fuel ledger (including the schedule position),
//! resource index, cycle clocks and all three buffers. Restoring re-checks
//! the decoded state against its own config before handing it back.

use crate::config::ConfigError;
use crate::reactor::Reactor;
use fuelcycle_core::buffer::ResBuf;
use fuelcycle_core::fixed::{Mass, Ticks, units_mass};
use fuelcycle_core::id::ResourceId;
use fuelcycle_core::serialize::{self, DeserializeError, SerializeError, SnapshotHeader};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RestoreError {
    #[error(transparent)]
    Decode(#[from] DeserializeError),
    #[error("snapshot config is invalid: {0}")]
    Config(#[from] ConfigError),
    #[error("snapshot {field} disagrees with its config")]
    Mismatch { field: &'static str },
    #[error("snapshot {buffer} buffer does not match its capacity or contents")]
    Buffer { buffer: &'static str },
    #[error("snapshot holds {0} without a fuel index entry")]
    Unindexed(ResourceId),
}

impl Reactor {
    /// Serialize the reactor as of `time`.
    pub fn snapshot(&self, time: Ticks) -> Result<Vec<u8>, SerializeError> {
        serialize::encode(time, self)
    }

    /// Restore a reactor from [`Reactor::snapshot`] output.
    pub fn restore(data: &[u8]) -> Result<(SnapshotHeader, Reactor), RestoreError> {
        let (header, reactor) = serialize::decode::<Reactor>(data)?;
        reactor.check_restored()?;
        tracing::debug!(
            reactor = %reactor.config().name,
            time = header.time,
            "restored reactor snapshot"
        );
        Ok((header, reactor))
    }

    fn check_restored(&self) -> Result<(), RestoreError> {
        let config = self.config();
        config.validate()?;
        let unit = config.assem_mass();
        if self.assem_size() != unit {
            return Err(RestoreError::Mismatch {
                field: "assem_size",
            });
        }
        let timing = self.timing();
        if timing.cycle_time != config.cycle_time {
            return Err(RestoreError::Mismatch {
                field: "cycle_time",
            });
        }
        if timing.refuel_time != config.refuel_time {
            return Err(RestoreError::Mismatch {
                field: "refuel_time",
            });
        }
        if self.ledger().len() != config.fuel_incommods.len() {
            return Err(RestoreError::Mismatch { field: "ledger" });
        }
        if self.index().iter().any(|(_, fuel)| self.ledger().lookup(fuel).is_none()) {
            return Err(RestoreError::Mismatch { field: "index" });
        }

        for (buffer, buf, slots) in [
            ("fresh", self.fresh(), config.n_assem_fresh),
            ("core", self.core(), config.n_assem_core),
            ("spent", self.spent(), config.n_assem_spent),
        ] {
            if !buffer_sound(buf, slots, unit) {
                return Err(RestoreError::Buffer { buffer });
            }
            if let Some(a) = buf.peek_all().find(|a| !self.index().contains(a.id)) {
                return Err(RestoreError::Unindexed(a.id));
            }
        }
        Ok(())
    }
}

fn buffer_sound(buf: &ResBuf, slots: u32, unit: Mass) -> bool {
    buf.capacity() == units_mass(slots, unit)
        && buf.is_consistent()
        && buf.count() <= slots as usize
        && buf.peek_all().all(|a| a.mass == unit)
}
