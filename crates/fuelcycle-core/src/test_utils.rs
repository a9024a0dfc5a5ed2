//! Shared test helpers for unit tests, integration tests and benchmarks.
//!
//! Gated behind `#[cfg(any(test, feature = "test-utils"))]`. Provides a
//! greedy stand-in for the market ([`GreedyExchange`]), a supplier that
//! mints fresh assemblies ([`FuelSource`]), a consumer that takes whatever
//! it asked for ([`FuelSink`]), and a [`TestContext`] for driving facility
//! hooks by hand.

use crate::event::{EventKind, EventLog};
use crate::exchange::{
    Bid, BidPortfolio, CommodityRequests, Exchange, Offer, PostedBidPortfolio, PostedPortfolio,
    PostedRequest, Request, RequestPortfolio, Trade,
};
use crate::facility::{Facility, FacilityError, StepContext};
use crate::fixed::{Mass, Ticks};
use crate::id::{FacilityId, RequestId, ResourceId, ResourceIds};
use crate::material::Assembly;
use std::collections::BTreeMap;

// ===========================================================================
// Constructors
// ===========================================================================

pub fn kg(v: f64) -> Mass {
    Mass::from_num(v)
}

pub fn assembly(id: u64, mass: f64, recipe: &str) -> Assembly {
    Assembly::new(ResourceId(id), kg(mass), recipe)
}

// ===========================================================================
// TestContext
// ===========================================================================

/// Owns what a [`StepContext`] borrows, for calling hooks directly.
#[derive(Debug, Default)]
pub struct TestContext {
    pub time: Ticks,
    pub facility: FacilityId,
    pub log: EventLog,
    pub resources: ResourceIds,
}

impl TestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn ctx(&mut self) -> StepContext<'_> {
        StepContext {
            time: self.time,
            facility: self.facility,
            recorder: &mut self.log,
            resources: &mut self.resources,
        }
    }

    pub fn advance(&mut self) {
        self.time += 1;
    }
}

// ===========================================================================
// GreedyExchange
// ===========================================================================

/// Fills each request portfolio in posting order, trying requests from
/// highest to lowest preference and taking the first bid that fits.
#[derive(Debug, Default)]
pub struct GreedyExchange;

impl Exchange for GreedyExchange {
    fn clear(&mut self, requests: &[PostedPortfolio], bids: &[PostedBidPortfolio]) -> Vec<Trade> {
        let mut remaining: Vec<Option<Mass>> =
            bids.iter().map(|b| b.portfolio.capacity).collect();
        let mut by_request: BTreeMap<RequestId, Vec<(usize, &Bid)>> = BTreeMap::new();
        for (i, bp) in bids.iter().enumerate() {
            for bid in &bp.portfolio.bids {
                by_request.entry(bid.request).or_default().push((i, bid));
            }
        }

        let mut trades = Vec::new();
        for port in requests {
            let mut order: Vec<&PostedRequest> = port.requests.iter().collect();
            order.sort_by(|a, b| b.request.preference.total_cmp(&a.request.preference));

            for req in order {
                let Some(candidates) = by_request.get(&req.id) else {
                    continue;
                };
                let wanted = req.request.quantity;
                let pick = candidates
                    .iter()
                    .find(|(i, bid)| {
                        let exact = req.request.exclusive || bid.exclusive;
                        let fits = if exact {
                            bid.offer.quantity == wanted
                        } else {
                            bid.offer.quantity >= wanted
                        };
                        fits && remaining[*i].is_none_or(|cap| cap >= wanted)
                    })
                    .map(|(i, bid)| (*i, *bid));

                if let Some((i, bid)) = pick {
                    if let Some(cap) = remaining[i].as_mut() {
                        *cap -= wanted;
                    }
                    trades.push(Trade {
                        request: req.clone(),
                        bidder: bids[i].bidder,
                        offer: Offer {
                            quantity: wanted,
                            ..bid.offer.clone()
                        },
                    });
                    if port.mutual {
                        break;
                    }
                }
            }
        }
        trades
    }
}

// ===========================================================================
// FuelSource
// ===========================================================================

/// Mints fresh assemblies on one commodity, optionally from a finite stock.
#[derive(Debug, Clone)]
pub struct FuelSource {
    name: String,
    commodity: String,
    /// Recipe shipped; `None` ships whatever recipe was requested.
    recipe: Option<String>,
    /// Remaining stock in kg; `None` is unlimited.
    stock: Option<Mass>,
    shipped: usize,
}

impl FuelSource {
    pub fn unlimited(name: &str, commodity: &str, recipe: &str) -> Self {
        Self {
            name: name.to_string(),
            commodity: commodity.to_string(),
            recipe: Some(recipe.to_string()),
            stock: None,
            shipped: 0,
        }
    }

    pub fn limited(name: &str, commodity: &str, recipe: &str, stock: Mass) -> Self {
        Self {
            stock: Some(stock),
            ..Self::unlimited(name, commodity, recipe)
        }
    }

    /// An unlimited source that ships whatever recipe is requested.
    pub fn to_order(name: &str, commodity: &str) -> Self {
        Self {
            recipe: None,
            ..Self::unlimited(name, commodity, "")
        }
    }

    /// Add stock to a limited source.
    pub fn restock(&mut self, mass: Mass) {
        if let Some(stock) = self.stock.as_mut() {
            *stock += mass;
        }
    }

    pub fn stock(&self) -> Option<Mass> {
        self.stock
    }

    /// Number of assemblies shipped so far.
    pub fn shipped(&self) -> usize {
        self.shipped
    }
}

impl Facility for FuelSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_bids(
        &mut self,
        requests: &CommodityRequests,
        _ctx: &mut StepContext<'_>,
    ) -> Result<Vec<BidPortfolio>, FacilityError> {
        let Some(reqs) = requests.get(&self.commodity) else {
            return Ok(Vec::new());
        };
        if self.stock.is_some_and(|s| s <= Mass::ZERO) {
            return Ok(Vec::new());
        }
        let mut port = BidPortfolio::new(self.commodity.clone());
        for r in reqs {
            let recipe = self.recipe.clone().unwrap_or_else(|| r.request.recipe.clone());
            port.bids.push(Bid {
                request: r.id,
                offer: Offer {
                    resource: None,
                    quantity: r.request.quantity,
                    recipe,
                },
                exclusive: true,
            });
        }
        port.capacity = self.stock;
        Ok(vec![port])
    }

    fn execute_bids(
        &mut self,
        trades: &[Trade],
        ctx: &mut StepContext<'_>,
    ) -> Result<Vec<(Trade, Assembly)>, FacilityError> {
        let mut out = Vec::with_capacity(trades.len());
        for t in trades {
            let a = Assembly::new(ctx.new_resource(), t.offer.quantity, t.offer.recipe.clone());
            if let Some(stock) = self.stock.as_mut() {
                *stock = stock.saturating_sub(a.mass);
            }
            ctx.record(EventKind::TradeOut, format!("{} on {}", a.id, t.commodity()));
            self.shipped += 1;
            out.push((t.clone(), a));
        }
        Ok(out)
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}

// ===========================================================================
// FuelSink
// ===========================================================================

/// Requests up to `per_step` assemblies on one commodity every step and
/// keeps everything it receives.
#[derive(Debug, Clone)]
pub struct FuelSink {
    name: String,
    commodity: String,
    assem_size: Mass,
    per_step: u32,
    received: Vec<Assembly>,
}

impl FuelSink {
    pub fn new(name: &str, commodity: &str, assem_size: Mass, per_step: u32) -> Self {
        Self {
            name: name.to_string(),
            commodity: commodity.to_string(),
            assem_size,
            per_step,
            received: Vec::new(),
        }
    }

    pub fn set_per_step(&mut self, per_step: u32) {
        self.per_step = per_step;
    }

    pub fn received(&self) -> &[Assembly] {
        &self.received
    }
}

impl Facility for FuelSink {
    fn name(&self) -> &str {
        &self.name
    }

    fn produce_requests(
        &mut self,
        _ctx: &mut StepContext<'_>,
    ) -> Result<Vec<RequestPortfolio>, FacilityError> {
        if self.per_step == 0 {
            return Ok(Vec::new());
        }
        let requests = (0..self.per_step)
            .map(|_| Request {
                commodity: self.commodity.clone(),
                quantity: self.assem_size,
                recipe: String::new(),
                preference: 1.0,
                exclusive: true,
            })
            .collect();
        Ok(vec![RequestPortfolio::independent(requests)])
    }

    fn accept_trades(
        &mut self,
        responses: Vec<(Trade, Assembly)>,
        ctx: &mut StepContext<'_>,
    ) -> Result<(), FacilityError> {
        for (t, a) in responses {
            if t.commodity() != self.commodity {
                return Err(FacilityError::UnrequestedCommodity(t.commodity().to_string()));
            }
            ctx.record(EventKind::TradeIn, format!("{} on {}", a.id, t.commodity()));
            self.received.push(a);
        }
        Ok(())
    }

    fn as_any(&self) -> &dyn std::any::Any {
        self
    }

    fn as_any_mut(&mut self) -> &mut dyn std::any::Any {
        self
    }
}
