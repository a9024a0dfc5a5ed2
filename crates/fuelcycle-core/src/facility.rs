//! The capability set every simulated facility implements.
//!
//! The driver calls a facility's hooks in a fixed order each step (see
//! [`crate::sim`]), handing it a [`StepContext`] with the current time, the
//! facility's own id, the recording sink and the resource id allocator.

use crate::buffer::BufferError;
use crate::event::{Event, EventKind, Recorder};
use crate::exchange::{BidPortfolio, CommodityRequests, RequestPortfolio, Trade};
use crate::fixed::{Mass, Ticks};
use crate::id::{FacilityId, ResourceId, ResourceIds};
use crate::material::Assembly;

// ---------------------------------------------------------------------------
// StepContext
// ---------------------------------------------------------------------------

/// Mutable context passed to every facility hook.
pub struct StepContext<'a> {
    /// The current simulation time step.
    pub time: Ticks,
    /// The id the driver registered this facility under.
    pub facility: FacilityId,
    /// Sink for recorded events.
    pub recorder: &'a mut dyn Recorder,
    /// Allocator for newly created resources.
    pub resources: &'a mut ResourceIds,
}

impl StepContext<'_> {
    /// Record an event stamped with the current time and facility.
    pub fn record(&mut self, kind: EventKind, payload: impl Into<String>) {
        self.recorder.record(Event {
            time: self.time,
            facility: self.facility,
            kind,
            payload: payload.into(),
        });
    }

    /// Mint a new resource id.
    pub fn new_resource(&mut self) -> ResourceId {
        self.resources.allocate()
    }
}

// ---------------------------------------------------------------------------
// Facility trait
// ---------------------------------------------------------------------------

/// A facility participating in the time-stepped simulation.
///
/// Hooks a facility does not need default to no-ops. Any error returned
/// from a hook is fatal to the run.
pub trait Facility: std::fmt::Debug {
    /// Human-readable name, used in errors and logs.
    fn name(&self) -> &str;

    /// Called once when the facility is added to a simulation.
    fn enter_simulation(&mut self, ctx: &mut StepContext<'_>) -> Result<(), FacilityError> {
        let _ = ctx;
        Ok(())
    }

    /// Start of a time step, before any negotiation.
    fn tick(&mut self, ctx: &mut StepContext<'_>) -> Result<(), FacilityError> {
        let _ = ctx;
        Ok(())
    }

    /// End of a time step, after all trades have been delivered.
    fn tock(&mut self, ctx: &mut StepContext<'_>) -> Result<(), FacilityError> {
        let _ = ctx;
        Ok(())
    }

    /// Material this facility wants this step.
    fn produce_requests(
        &mut self,
        ctx: &mut StepContext<'_>,
    ) -> Result<Vec<RequestPortfolio>, FacilityError> {
        let _ = ctx;
        Ok(Vec::new())
    }

    /// Offers against other facilities' requests. Must not give anything
    /// away; see [`Facility::execute_bids`].
    fn produce_bids(
        &mut self,
        requests: &CommodityRequests,
        ctx: &mut StepContext<'_>,
    ) -> Result<Vec<BidPortfolio>, FacilityError> {
        let _ = (requests, ctx);
        Ok(Vec::new())
    }

    /// Hand over material for the confirmed trades this facility bid on.
    /// Returns one assembly per trade, in trade order.
    fn execute_bids(
        &mut self,
        trades: &[Trade],
        ctx: &mut StepContext<'_>,
    ) -> Result<Vec<(Trade, Assembly)>, FacilityError> {
        let _ = ctx;
        if trades.is_empty() {
            Ok(Vec::new())
        } else {
            Err(FacilityError::NotABidder)
        }
    }

    /// Receive material for trades this facility requested.
    fn accept_trades(
        &mut self,
        responses: Vec<(Trade, Assembly)>,
        ctx: &mut StepContext<'_>,
    ) -> Result<(), FacilityError> {
        let _ = ctx;
        match responses.first() {
            None => Ok(()),
            Some((trade, _)) => Err(FacilityError::UnrequestedCommodity(
                trade.commodity().to_string(),
            )),
        }
    }

    /// Downcast to `&dyn Any` for typed access to concrete facilities.
    fn as_any(&self) -> &dyn std::any::Any;

    /// Downcast to `&mut dyn Any` for typed mutable access.
    fn as_any_mut(&mut self) -> &mut dyn std::any::Any;
}

// ---------------------------------------------------------------------------
// FacilityError
// ---------------------------------------------------------------------------

/// Fatal errors raised by facility hooks.
#[derive(Debug, thiserror::Error)]
pub enum FacilityError {
    /// A buffer push would have exceeded capacity, or a take missed.
    #[error(transparent)]
    Buffer(#[from] BufferError),
    /// A resource was never received through this facility's exchange.
    #[error("resource {0} was never indexed by this facility")]
    UnknownResource(ResourceId),
    /// Material arrived on a commodity this facility never requested.
    #[error("received material on unrequested commodity '{0}'")]
    UnrequestedCommodity(String),
    /// A confirmed trade cannot be filled from held material.
    #[error("no held assembly can fill a trade on '{commodity}'")]
    Unfillable { commodity: String },
    /// Received material was not exactly one assembly.
    #[error("received {received} kg on '{commodity}', expected one {expected} kg assembly")]
    AssemblyMass {
        commodity: String,
        received: Mass,
        expected: Mass,
    },
    /// Trades were routed to a facility that never bids.
    #[error("facility does not bid on the exchange")]
    NotABidder,
}
