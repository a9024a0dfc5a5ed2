//! The stepping driver.
//!
//! [`Simulation`] owns every facility and the exchange, and runs each time
//! step through a fixed pipeline:
//!
//! 1. **Tick** -- every facility's `tick` hook.
//! 2. **Request** -- collect request portfolios and stamp them with ids.
//! 3. **Bid** -- show every posted request to every facility, collect bids.
//! 4. **Clear** -- the [`Exchange`] matches requests and bids into trades.
//! 5. **Execute** -- each bidder hands over material for its trades.
//! 6. **Accept** -- each requester receives the material it traded for.
//! 7. **Tock** -- every facility's `tock` hook.
//! 8. **Bookkeeping** -- advance the clock.
//!
//! All requests and bids for a step exist before any material moves, and
//! unmatched requests and bids simply lapse at the end of the step.

use crate::event::EventLog;
use crate::exchange::{
    CommodityRequests, Exchange, PostedBidPortfolio, PostedPortfolio, PostedRequest, Trade,
};
use crate::facility::{Facility, FacilityError, StepContext};
use crate::fixed::Ticks;
use crate::id::{FacilityId, PortfolioId, RequestId, ResourceIds};
use crate::material::Assembly;
use serde::{Deserialize, Serialize};
use slotmap::SlotMap;

// ---------------------------------------------------------------------------
// Simulation state
// ---------------------------------------------------------------------------

/// Mutable clock state tracked by the driver.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SimState {
    /// The current time step. Incremented once per completed step.
    pub time: Ticks,
}

/// Summary of one completed step.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StepReport {
    pub time: Ticks,
    pub requests: usize,
    pub bids: usize,
    pub trades: usize,
}

/// Errors that stop the driver.
#[derive(Debug, thiserror::Error)]
pub enum SimError {
    #[error("facility '{name}' failed at time {time}: {source}")]
    Facility {
        facility: FacilityId,
        name: String,
        time: Ticks,
        source: FacilityError,
    },
    #[error("trade references unknown facility {0:?}")]
    UnknownFacility(FacilityId),
    #[error("facility '{name}' returned {returned} responses for {expected} trades")]
    MissingResponse {
        name: String,
        expected: usize,
        returned: usize,
    },
}

fn facility_error(
    id: FacilityId,
    f: &dyn Facility,
    time: Ticks,
    source: FacilityError,
) -> SimError {
    SimError::Facility {
        facility: id,
        name: f.name().to_string(),
        time,
        source,
    }
}

// ---------------------------------------------------------------------------
// Simulation
// ---------------------------------------------------------------------------

/// Owns facilities, the exchange and the clock.
#[derive(Debug)]
pub struct Simulation<X: Exchange> {
    facilities: SlotMap<FacilityId, Box<dyn Facility>>,
    exchange: X,
    state: SimState,
    log: EventLog,
    resources: ResourceIds,
    next_request: u64,
    next_portfolio: u64,
}

impl<X: Exchange> Simulation<X> {
    /// A simulation starting at time zero.
    pub fn new(exchange: X) -> Self {
        Self::starting_at(exchange, 0)
    }

    /// A simulation whose first step is `time` (used when resuming).
    pub fn starting_at(exchange: X, time: Ticks) -> Self {
        Self {
            facilities: SlotMap::with_key(),
            exchange,
            state: SimState { time },
            log: EventLog::new(),
            resources: ResourceIds::new(),
            next_request: 0,
            next_portfolio: 0,
        }
    }

    /// Replace the resource id allocator (used when resuming so ids are
    /// never reused).
    pub fn set_resource_ids(&mut self, ids: ResourceIds) {
        self.resources = ids;
    }

    /// The resource id allocator, for snapshotting alongside facilities.
    pub fn resource_ids(&self) -> &ResourceIds {
        &self.resources
    }

    /// The time step the next call to [`Simulation::step`] will run.
    pub fn time(&self) -> Ticks {
        self.state.time
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    pub fn log_mut(&mut self) -> &mut EventLog {
        &mut self.log
    }

    pub fn exchange(&self) -> &X {
        &self.exchange
    }

    pub fn exchange_mut(&mut self) -> &mut X {
        &mut self.exchange
    }

    pub fn len(&self) -> usize {
        self.facilities.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facilities.is_empty()
    }

    /// Facility ids in registration order.
    pub fn facility_ids(&self) -> impl Iterator<Item = FacilityId> + '_ {
        self.facilities.keys()
    }

    /// Add a facility. It enters the simulation at the current time.
    pub fn add_facility<F: Facility + 'static>(
        &mut self,
        facility: F,
    ) -> Result<FacilityId, SimError> {
        let time = self.state.time;
        let id = self.facilities.insert(Box::new(facility));
        if let Some(f) = self.facilities.get_mut(id) {
            let mut ctx = StepContext {
                time,
                facility: id,
                recorder: &mut self.log,
                resources: &mut self.resources,
            };
            f.enter_simulation(&mut ctx)
                .map_err(|e| facility_error(id, f.as_ref(), time, e))?;
            tracing::debug!(time, facility = f.name(), "facility entered simulation");
        }
        Ok(id)
    }

    /// Typed access to a facility.
    pub fn facility<F: Facility + 'static>(&self, id: FacilityId) -> Option<&F> {
        self.facilities.get(id)?.as_any().downcast_ref::<F>()
    }

    /// Typed mutable access to a facility.
    pub fn facility_mut<F: Facility + 'static>(&mut self, id: FacilityId) -> Option<&mut F> {
        self.facilities.get_mut(id)?.as_any_mut().downcast_mut::<F>()
    }

    /// Run `steps` consecutive steps, stopping at the first error.
    pub fn run(&mut self, steps: u64) -> Result<Vec<StepReport>, SimError> {
        (0..steps).map(|_| self.step()).collect()
    }

    /// Run one full step through the pipeline.
    pub fn step(&mut self) -> Result<StepReport, SimError> {
        let time = self.state.time;
        let mut report = StepReport {
            time,
            ..StepReport::default()
        };

        // Phase 1: Tick.
        for (id, f) in self.facilities.iter_mut() {
            let mut ctx = StepContext {
                time,
                facility: id,
                recorder: &mut self.log,
                resources: &mut self.resources,
            };
            f.tick(&mut ctx)
                .map_err(|e| facility_error(id, f.as_ref(), time, e))?;
        }

        // Phase 2: Request.
        let mut portfolios: Vec<PostedPortfolio> = Vec::new();
        let mut by_commodity = CommodityRequests::new();
        for (id, f) in self.facilities.iter_mut() {
            let mut ctx = StepContext {
                time,
                facility: id,
                recorder: &mut self.log,
                resources: &mut self.resources,
            };
            let produced = f
                .produce_requests(&mut ctx)
                .map_err(|e| facility_error(id, f.as_ref(), time, e))?;
            for port in produced {
                let pid = PortfolioId(self.next_portfolio);
                self.next_portfolio += 1;
                let mut posted = Vec::with_capacity(port.requests.len());
                for request in port.requests {
                    let rid = RequestId(self.next_request);
                    self.next_request += 1;
                    let pr = PostedRequest {
                        id: rid,
                        portfolio: pid,
                        requester: id,
                        request,
                    };
                    by_commodity
                        .entry(pr.request.commodity.clone())
                        .or_default()
                        .push(pr.clone());
                    posted.push(pr);
                }
                report.requests += posted.len();
                portfolios.push(PostedPortfolio {
                    id: pid,
                    requester: id,
                    mutual: port.mutual,
                    requests: posted,
                });
            }
        }

        // Phase 3: Bid.
        let mut bids: Vec<PostedBidPortfolio> = Vec::new();
        for (id, f) in self.facilities.iter_mut() {
            let mut ctx = StepContext {
                time,
                facility: id,
                recorder: &mut self.log,
                resources: &mut self.resources,
            };
            let produced = f
                .produce_bids(&by_commodity, &mut ctx)
                .map_err(|e| facility_error(id, f.as_ref(), time, e))?;
            for portfolio in produced {
                report.bids += portfolio.bids.len();
                bids.push(PostedBidPortfolio {
                    bidder: id,
                    portfolio,
                });
            }
        }

        // Phase 4: Clear.
        let trades = self.exchange.clear(&portfolios, &bids);
        report.trades = trades.len();
        for t in &trades {
            if !self.facilities.contains_key(t.bidder) {
                return Err(SimError::UnknownFacility(t.bidder));
            }
            if !self.facilities.contains_key(t.requester()) {
                return Err(SimError::UnknownFacility(t.requester()));
            }
        }
        tracing::debug!(
            time,
            requests = report.requests,
            bids = report.bids,
            trades = report.trades,
            "exchange cleared"
        );

        // Phase 5: Execute.
        let mut responses: Vec<(Trade, Assembly)> = Vec::with_capacity(trades.len());
        for (id, f) in self.facilities.iter_mut() {
            let mine: Vec<Trade> = trades.iter().filter(|t| t.bidder == id).cloned().collect();
            if mine.is_empty() {
                continue;
            }
            let mut ctx = StepContext {
                time,
                facility: id,
                recorder: &mut self.log,
                resources: &mut self.resources,
            };
            let out = f
                .execute_bids(&mine, &mut ctx)
                .map_err(|e| facility_error(id, f.as_ref(), time, e))?;
            if out.len() != mine.len() {
                return Err(SimError::MissingResponse {
                    name: f.name().to_string(),
                    expected: mine.len(),
                    returned: out.len(),
                });
            }
            responses.extend(out);
        }

        // Phase 6: Accept.
        for (id, f) in self.facilities.iter_mut() {
            let (mine, rest): (Vec<_>, Vec<_>) = responses
                .into_iter()
                .partition(|(t, _)| t.requester() == id);
            responses = rest;
            if mine.is_empty() {
                continue;
            }
            let mut ctx = StepContext {
                time,
                facility: id,
                recorder: &mut self.log,
                resources: &mut self.resources,
            };
            f.accept_trades(mine, &mut ctx)
                .map_err(|e| facility_error(id, f.as_ref(), time, e))?;
        }

        // Phase 7: Tock.
        for (id, f) in self.facilities.iter_mut() {
            let mut ctx = StepContext {
                time,
                facility: id,
                recorder: &mut self.log,
                resources: &mut self.resources,
            };
            f.tock(&mut ctx)
                .map_err(|e| facility_error(id, f.as_ref(), time, e))?;
        }

        // Phase 8: Bookkeeping.
        self.state.time += 1;
        Ok(report)
    }
}
