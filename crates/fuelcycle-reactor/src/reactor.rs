//! The reactor facility.
//!
//! A [`Reactor`] owns three assembly buffers (fresh, core, spent), the
//! fuel ledger, the resource index and the cycle state. Each step it:
//!
//! - **tick**: discharges a due batch into spent (transmuting it), loads
//!   fresh assemblies into the core, then applies scheduled changes;
//! - **requests**: asks for enough assemblies to top up core and fresh;
//! - **bids**: previews held spent assemblies against outcommod requests;
//! - **execute**: hands over spent assemblies for confirmed trades only;
//! - **accept**: indexes received fuel and stores it in core or fresh;
//! - **tock**: advances the cycle clocks.

use crate::config::{ConfigError, ReactorConfig};
use crate::cycle::{CyclePhase, CycleState, CycleTiming, StallReason};
use crate::index::ResourceIndex;
use crate::ledger::{ChangePayload, FuelLedger};
use crate::transmute;
use fuelcycle_core::buffer::ResBuf;
use fuelcycle_core::event::EventKind;
use fuelcycle_core::exchange::{
    Bid, BidPortfolio, CommodityRequests, Offer, Request, RequestPortfolio, Trade,
};
use fuelcycle_core::facility::{Facility, FacilityError, StepContext};
use fuelcycle_core::fixed::{Mass, fixed64_to_f64};
use fuelcycle_core::id::ResourceId;
use fuelcycle_core::material::Assembly;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Reactor
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reactor {
    config: ReactorConfig,
    assem_size: Mass,
    timing: CycleTiming,
    ledger: FuelLedger,
    index: ResourceIndex,
    cycle: CycleState,
    fresh: ResBuf,
    core: ResBuf,
    spent: ResBuf,
}

impl Reactor {
    /// Validate `config` and build an empty reactor in its resumable state.
    pub fn new(config: ReactorConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        let assem_size = config.assem_mass();
        Ok(Self {
            timing: CycleTiming {
                cycle_time: config.cycle_time,
                refuel_time: config.refuel_time,
            },
            ledger: FuelLedger::from_config(&config),
            index: ResourceIndex::new(),
            cycle: CycleState::resume(config.cycle_step, config.discharged),
            fresh: ResBuf::for_assemblies(config.n_assem_fresh, assem_size),
            core: ResBuf::for_assemblies(config.n_assem_core, assem_size),
            spent: ResBuf::for_assemblies(config.n_assem_spent, assem_size),
            assem_size,
            config,
        })
    }

    pub fn config(&self) -> &ReactorConfig {
        &self.config
    }

    pub fn assem_size(&self) -> Mass {
        self.assem_size
    }

    pub fn ledger(&self) -> &FuelLedger {
        &self.ledger
    }

    pub fn index(&self) -> &ResourceIndex {
        &self.index
    }

    pub fn cycle(&self) -> &CycleState {
        &self.cycle
    }

    pub fn timing(&self) -> &CycleTiming {
        &self.timing
    }

    pub fn fresh(&self) -> &ResBuf {
        &self.fresh
    }

    pub fn core(&self) -> &ResBuf {
        &self.core
    }

    pub fn spent(&self) -> &ResBuf {
        &self.spent
    }

    pub fn core_full(&self) -> bool {
        self.core.count() >= self.config.n_assem_core as usize
    }

    /// Assemblies the next discharge would move.
    fn batch_len(&self) -> usize {
        (self.config.n_assem_batch as usize).min(self.core.count())
    }

    fn spent_room(&self) -> bool {
        self.spent.space_for(self.assem_size) as usize >= self.batch_len()
    }

    pub fn phase(&self) -> CyclePhase {
        self.cycle.phase(&self.timing, self.core_full(), self.spent_room())
    }

    // -- Discharge / load / schedule ------------------------------------

    /// Discharge the due batch into spent, transmuting it. Returns whether a
    /// batch moved. Does nothing unless a discharge is due, so repeated
    /// calls within a step move at most one batch.
    pub fn discharge(&mut self, ctx: &mut StepContext<'_>) -> Result<bool, FacilityError> {
        if !self.cycle.discharge_due(&self.timing) {
            return Ok(false);
        }
        let npop = self.batch_len();
        if npop == 0 {
            // Nothing in the core to discharge: go straight to refuelling.
            self.cycle.mark_discharged();
            tracing::debug!(
                reactor = %self.config.name,
                time = ctx.time,
                "cycle ended with empty core"
            );
            return Ok(false);
        }
        if !self.spent_room() {
            tracing::warn!(
                reactor = %self.config.name,
                time = ctx.time,
                batch = npop,
                spent = self.spent.count(),
                "discharge blocked: spent buffer full"
            );
            ctx.record(
                EventKind::DischargeBlocked,
                format!("{npop} assemblies, spent holds {}", self.spent.count()),
            );
            return Ok(false);
        }

        let preview = self.core.peek_all().take(npop);
        let recipes = transmute::plan(preview, &self.ledger, &self.index)?;
        let mut batch = self.core.pop_n(npop);
        transmute::apply(&mut batch, &recipes);
        ctx.record(EventKind::Transmute, format!("{npop} assemblies"));
        tracing::debug!(
            reactor = %self.config.name,
            time = ctx.time,
            count = npop,
            "transmuted batch"
        );

        self.spent.push_all(batch)?;
        self.cycle.mark_discharged();
        ctx.record(EventKind::Discharge, format!("{npop} assemblies"));
        tracing::debug!(
            reactor = %self.config.name,
            time = ctx.time,
            count = npop,
            "discharged batch"
        );
        Ok(true)
    }

    /// Move fresh assemblies into the core, oldest first, while it has room
    /// for a whole one. Returns the count moved.
    pub fn load(&mut self, ctx: &mut StepContext<'_>) -> Result<usize, FacilityError> {
        let short = (self.config.n_assem_core as usize).saturating_sub(self.core.count());
        let n = short
            .min(self.fresh.count())
            .min(self.core.space_for(self.assem_size) as usize);
        if n == 0 {
            return Ok(0);
        }
        self.core.push_all(self.fresh.pop_n(n))?;
        ctx.record(EventKind::Load, format!("{n} assemblies"));
        tracing::debug!(reactor = %self.config.name, time = ctx.time, count = n, "loaded core");
        Ok(n)
    }

    /// Apply preference and recipe changes scheduled for this step.
    pub fn apply_schedule(&mut self, ctx: &mut StepContext<'_>) {
        for change in self.ledger.apply_due_changes(ctx.time) {
            match change.payload {
                ChangePayload::Preference(p) => {
                    tracing::info!(
                        reactor = %self.config.name,
                        time = ctx.time,
                        commod = %change.target_commod,
                        preference = p,
                        "preference changed"
                    );
                    ctx.record(EventKind::PrefChange, format!("{} {p}", change.target_commod));
                }
                ChangePayload::Recipes {
                    inrecipe,
                    outrecipe,
                } => {
                    tracing::info!(
                        reactor = %self.config.name,
                        time = ctx.time,
                        commod = %change.target_commod,
                        %inrecipe,
                        %outrecipe,
                        "recipes changed"
                    );
                    ctx.record(
                        EventKind::RecipeChange,
                        format!("{} {inrecipe} {outrecipe}", change.target_commod),
                    );
                }
            }
        }
    }

    // -- Exchange helpers ------------------------------------------------

    /// Assemblies wanted this step.
    fn n_order(&self) -> usize {
        let core = (self.config.n_assem_core as usize)
            .saturating_sub(self.core.count())
            .min(self.core.space_for(self.assem_size) as usize);
        let fresh = (self.config.n_assem_fresh as usize)
            .saturating_sub(self.fresh.count())
            .min(self.fresh.space_for(self.assem_size) as usize);
        core + fresh
    }

    /// Whether requests may go out this step. Without a fresh buffer fuel
    /// is only acquired once the core is waiting for it.
    fn requesting(&self) -> bool {
        if self.config.n_assem_fresh > 0 {
            return true;
        }
        matches!(
            self.phase(),
            CyclePhase::Refueling
                | CyclePhase::Stalled {
                    reason: StallReason::MissingFuel
                }
        )
    }

    fn outcommod_of(&self, id: ResourceId) -> Result<&str, FacilityError> {
        let (_, fuel) = self.ledger.resolve(&self.index, id)?;
        Ok(&fuel.outcommod)
    }

    /// Pick the spent assembly to hand over for a trade: the previewed one
    /// if still held, else the most recently discharged on that commodity.
    fn pick_spent(&self, trade: &Trade) -> Result<ResourceId, FacilityError> {
        if let Some(id) = trade.offer.resource {
            if self.spent.contains(id) && self.outcommod_of(id)? == trade.commodity() {
                return Ok(id);
            }
        }
        for a in self.spent.peek_all().rev() {
            if self.outcommod_of(a.id)? == trade.commodity() {
                return Ok(a.id);
            }
        }
        Err(FacilityError::Unfillable {
            commodity: trade.commodity().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Facility
// ---------------------------------------------------------------------------

impl Facility for Reactor {
    fn name(&self) -> &str {
        &self.config.name
    }

    fn enter_simulation(&mut self, ctx: &mut StepContext<'_>) -> Result<(), FacilityError> {
        tracing::info!(
            reactor = %self.config.name,
            time = ctx.time,
            fuels = self.ledger.len(),
            n_assem_core = self.config.n_assem_core,
            cycle_time = self.config.cycle_time,
            "reactor entered simulation"
        );
        Ok(())
    }

    fn tick(&mut self, ctx: &mut StepContext<'_>) -> Result<(), FacilityError> {
        self.discharge(ctx)?;
        if !self.core_full() {
            self.load(ctx)?;
        }
        self.apply_schedule(ctx);
        Ok(())
    }

    fn tock(&mut self, ctx: &mut StepContext<'_>) -> Result<(), FacilityError> {
        let edges = self.cycle.end_step(&self.timing, self.core_full());
        if edges.started {
            ctx.record(EventKind::CycleStart, format!("{} assemblies", self.core.count()));
            tracing::info!(reactor = %self.config.name, time = ctx.time, "cycle started");
        }
        if edges.completed {
            ctx.record(EventKind::CycleEnd, format!("{} steps", self.timing.cycle_time));
            tracing::info!(reactor = %self.config.name, time = ctx.time, "cycle ended");
        }
        Ok(())
    }

    fn produce_requests(
        &mut self,
        ctx: &mut StepContext<'_>,
    ) -> Result<Vec<RequestPortfolio>, FacilityError> {
        if !self.requesting() {
            return Ok(Vec::new());
        }
        let n = self.n_order();
        if n > 0 {
            tracing::debug!(
                reactor = %self.config.name,
                time = ctx.time,
                assemblies = n,
                "requesting fuel"
            );
        }
        let ports = (0..n)
            .map(|_| {
                RequestPortfolio::mutual(
                    self.ledger
                        .fuels()
                        .iter()
                        .map(|f| Request {
                            commodity: f.incommod.clone(),
                            quantity: self.assem_size,
                            recipe: f.inrecipe.clone(),
                            preference: f.preference,
                            exclusive: true,
                        })
                        .collect(),
                )
            })
            .collect();
        Ok(ports)
    }

    fn produce_bids(
        &mut self,
        requests: &CommodityRequests,
        ctx: &mut StepContext<'_>,
    ) -> Result<Vec<BidPortfolio>, FacilityError> {
        let mut out = Vec::new();
        if self.spent.is_empty() {
            return Ok(out);
        }
        for commod in self.ledger.outcommods() {
            let Some(reqs) = requests.get(commod) else {
                continue;
            };
            let mut held: Vec<&Assembly> = Vec::new();
            for a in self.spent.peek_all() {
                if self.outcommod_of(a.id)? == commod {
                    held.push(a);
                }
            }
            if held.is_empty() {
                continue;
            }

            let mut port = BidPortfolio::new(commod);
            for r in reqs {
                let mut covered = Mass::ZERO;
                for a in &held {
                    if covered >= r.request.quantity {
                        break;
                    }
                    port.bids.push(Bid {
                        request: r.id,
                        offer: Offer::of(a),
                        exclusive: true,
                    });
                    covered += a.mass;
                }
            }
            if port.bids.is_empty() {
                continue;
            }
            let total = held.iter().fold(Mass::ZERO, |acc, a| acc.saturating_add(a.mass));
            port.capacity = Some(total);
            tracing::debug!(
                reactor = %self.config.name,
                time = ctx.time,
                commod,
                bids = port.bids.len(),
                held_kg = fixed64_to_f64(total),
                "offering spent fuel"
            );
            out.push(port);
        }
        Ok(out)
    }

    fn execute_bids(
        &mut self,
        trades: &[Trade],
        ctx: &mut StepContext<'_>,
    ) -> Result<Vec<(Trade, Assembly)>, FacilityError> {
        let mut out = Vec::with_capacity(trades.len());
        for t in trades {
            let id = self.pick_spent(t)?;
            let a = self.spent.take(id)?;
            ctx.record(EventKind::TradeOut, format!("{} on {}", a.id, t.commodity()));
            tracing::debug!(
                reactor = %self.config.name,
                time = ctx.time,
                resource = %a.id,
                commod = t.commodity(),
                "traded spent fuel"
            );
            out.push((t.clone(), a));
        }
        Ok(out)
    }

    fn accept_trades(
        &mut self,
        responses: Vec<(Trade, Assembly)>,
        ctx: &mut StepContext<'_>,
    ) -> Result<(), FacilityError> {
        for (t, a) in responses {
            let commod = t.commodity();
            let fuel = self
                .ledger
                .position(commod)
                .ok_or_else(|| FacilityError::UnrequestedCommodity(commod.to_string()))?;
            if a.mass != self.assem_size {
                return Err(FacilityError::AssemblyMass {
                    commodity: commod.to_string(),
                    received: a.mass,
                    expected: self.assem_size,
                });
            }
            self.index.insert(a.id, fuel);
            ctx.record(EventKind::TradeIn, format!("{} on {commod}", a.id));
            tracing::debug!(
                reactor = %self.config.name,
                time = ctx.time,
                resource = %a.id,
                commod,
                "received fuel"
            );
            if !self.core_full() && self.core.space_for(self.assem_size) > 0 {
                self.core.push(a)?;
            } else {
                self.fresh.push(a)?;
            }
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
