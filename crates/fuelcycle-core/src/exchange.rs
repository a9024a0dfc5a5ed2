//! Request/bid/trade types exchanged between facilities and the market.
//!
//! Each step, requesting facilities post [`RequestPortfolio`]s, supplying
//! facilities answer with [`BidPortfolio`]s, and an [`Exchange`] clears the
//! two into [`Trade`]s. How the market matches is not this crate's concern:
//! [`Exchange`] is the seam where a clearing algorithm plugs in.
//!
//! Bids carry an [`Offer`], which is a preview of an assembly, never the
//! assembly itself. Material only changes hands when the driver later asks
//! the bidder to execute confirmed trades.

use crate::fixed::Mass;
use crate::id::{FacilityId, PortfolioId, RequestId, ResourceId};
use crate::material::Assembly;
use std::collections::BTreeMap;

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

/// A request for `quantity` kg of material on a commodity.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    pub commodity: String,
    pub quantity: Mass,
    /// Recipe the requester would like to receive.
    pub recipe: String,
    /// Relative desirability; only the exchange compares these.
    pub preference: f64,
    /// Exclusive requests must be filled in full by a single offer.
    pub exclusive: bool,
}

/// A group of requests posted together.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestPortfolio {
    pub requests: Vec<Request>,
    /// When set, at most one request in the portfolio may be filled.
    pub mutual: bool,
}

impl RequestPortfolio {
    /// A portfolio whose requests are alternatives for one another.
    pub fn mutual(requests: Vec<Request>) -> Self {
        Self {
            requests,
            mutual: true,
        }
    }

    /// A portfolio whose requests may all be filled.
    pub fn independent(requests: Vec<Request>) -> Self {
        Self {
            requests,
            mutual: false,
        }
    }
}

/// A request as seen by bidders: stamped with its id and requester.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedRequest {
    pub id: RequestId,
    pub portfolio: PortfolioId,
    pub requester: FacilityId,
    pub request: Request,
}

/// A request portfolio as seen by the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedPortfolio {
    pub id: PortfolioId,
    pub requester: FacilityId,
    pub mutual: bool,
    pub requests: Vec<PostedRequest>,
}

/// Posted requests grouped by commodity.
pub type CommodityRequests = BTreeMap<String, Vec<PostedRequest>>;

// ---------------------------------------------------------------------------
// Bids
// ---------------------------------------------------------------------------

/// What a bidder proposes to hand over if the bid is accepted.
#[derive(Debug, Clone, PartialEq)]
pub struct Offer {
    /// The held assembly being previewed, if the bidder offers existing
    /// material. Suppliers that create material on demand leave this empty.
    pub resource: Option<ResourceId>,
    pub quantity: Mass,
    pub recipe: String,
}

impl Offer {
    /// Preview an assembly without taking it.
    pub fn of(assembly: &Assembly) -> Self {
        Self {
            resource: Some(assembly.id),
            quantity: assembly.mass,
            recipe: assembly.recipe.clone(),
        }
    }
}

/// A bid answering one posted request.
#[derive(Debug, Clone, PartialEq)]
pub struct Bid {
    pub request: RequestId,
    pub offer: Offer,
    /// Exclusive bids are all-or-nothing.
    pub exclusive: bool,
}

/// A group of bids on one commodity, optionally bounded by total mass.
#[derive(Debug, Clone, PartialEq)]
pub struct BidPortfolio {
    pub commodity: String,
    pub bids: Vec<Bid>,
    /// Upper bound on the total mass the exchange may award across all
    /// bids in this portfolio. `None` means unbounded.
    pub capacity: Option<Mass>,
}

impl BidPortfolio {
    pub fn new(commodity: impl Into<String>) -> Self {
        Self {
            commodity: commodity.into(),
            bids: Vec::new(),
            capacity: None,
        }
    }
}

/// A bid portfolio stamped with its bidder.
#[derive(Debug, Clone, PartialEq)]
pub struct PostedBidPortfolio {
    pub bidder: FacilityId,
    pub portfolio: BidPortfolio,
}

// ---------------------------------------------------------------------------
// Trades
// ---------------------------------------------------------------------------

/// A matched request and offer confirmed by the exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct Trade {
    pub request: PostedRequest,
    pub bidder: FacilityId,
    pub offer: Offer,
}

impl Trade {
    pub fn commodity(&self) -> &str {
        &self.request.request.commodity
    }

    pub fn requester(&self) -> FacilityId {
        self.request.requester
    }
}

/// The market-clearing collaborator.
///
/// Given every request and bid posted in a step, decide which pairs trade.
/// Implementations must respect mutual portfolios and bid capacities.
pub trait Exchange: std::fmt::Debug {
    fn clear(&mut self, requests: &[PostedPortfolio], bids: &[PostedBidPortfolio]) -> Vec<Trade>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixed::f64_to_fixed64;

    #[test]
    fn offer_previews_assembly() {
        let a = Assembly::new(ResourceId(9), f64_to_fixed64(10.0), "spent_uox");
        let offer = Offer::of(&a);
        assert_eq!(offer.resource, Some(ResourceId(9)));
        assert_eq!(offer.quantity, a.mass);
        assert_eq!(offer.recipe, "spent_uox");
    }

    #[test]
    fn portfolio_constructors() {
        assert!(RequestPortfolio::mutual(Vec::new()).mutual);
        assert!(!RequestPortfolio::independent(Vec::new()).mutual);
        let bp = BidPortfolio::new("spent");
        assert_eq!(bp.commodity, "spent");
        assert!(bp.capacity.is_none());
    }
}
