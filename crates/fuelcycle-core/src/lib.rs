//! Fuelcycle Core -- the discrete-time engine that fuel-cycle facilities run on.
//!
//! This crate provides identity, mass arithmetic, capacity-bounded material
//! buffers, the request/bid/trade exchange vocabulary, event recording,
//! versioned snapshots and the stepping driver that ties them together.
//! Concrete facilities (reactors, sources, sinks) live in their own crates
//! and plug in through [`facility::Facility`].
//!
//! # Eight-Phase Step Pipeline
//!
//! Each call to [`sim::Simulation::step`] advances the simulation by one
//! time step:
//!
//! 1. **Tick** -- Facilities act on state left by the previous step.
//! 2. **Request** -- Facilities post request portfolios.
//! 3. **Bid** -- Facilities answer posted requests with bid portfolios.
//! 4. **Clear** -- The exchange matches requests to bids.
//! 5. **Execute** -- Bidders hand over material for confirmed trades.
//! 6. **Accept** -- Requesters receive that material.
//! 7. **Tock** -- Facilities advance internal clocks.
//! 8. **Bookkeeping** -- Increment the time step.
//!
//! # Key Types
//!
//! - [`buffer::ResBuf`] -- FIFO of assemblies bounded by total mass.
//! - [`material::Assembly`] -- One discrete, uniquely identified unit of fuel.
//! - [`exchange::Exchange`] -- The market-clearing seam.
//! - [`event::EventLog`] -- Recording sink with per-kind suppression.
//! - [`fixed::Fixed64`] -- Q32.32 fixed-point type for deterministic mass.
//! - [`serialize`] -- Versioned snapshots via bitcode.

pub mod buffer;
pub mod event;
pub mod exchange;
pub mod facility;
pub mod fixed;
pub mod id;
pub mod material;
pub mod serialize;
pub mod sim;

#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;
