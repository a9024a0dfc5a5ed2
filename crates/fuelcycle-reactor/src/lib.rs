//! Fuelcycle Reactor -- a batch-refuelled reactor facility.
//!
//! The reactor acquires fresh fuel assemblies on the exchange, burns them in
//! fixed-length cycles, discharges and transmutes a batch at the end of each
//! cycle, and offers the spent assemblies back to the exchange.
//!
//! # Components
//!
//! - [`ledger::FuelLedger`] -- fuel types and their scheduled overrides.
//! - [`index::ResourceIndex`] -- which fuel type each received resource is.
//! - [`cycle::CycleState`] -- operating and refuelling clocks, phase.
//! - [`transmute`] -- recipe substitution at discharge.
//! - [`reactor::Reactor`] -- the facility tying these to three buffers.
//!
//! A reactor is built from a validated [`config::ReactorConfig`] and driven
//! through [`fuelcycle_core::facility::Facility`].

pub mod config;
pub mod cycle;
pub mod index;
pub mod ledger;
pub mod reactor;
pub mod snapshot;
pub mod transmute;

pub use config::{ConfigError, ReactorConfig};
pub use cycle::{CyclePhase, StallReason};
pub use reactor::Reactor;
pub use snapshot::RestoreError;
