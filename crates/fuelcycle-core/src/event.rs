//! Facility event recording.
//!
//! Facilities report what happened to them (cycle boundaries, discharges,
//! loads, trades) as `(name, payload)` pairs through a [`Recorder`]. The
//! recorder is fire-and-forget: nothing it returns is ever consulted by the
//! facility.
//!
//! [`EventLog`] is the stock append-only recorder. Event kinds can be
//! suppressed, in which case they are neither stored nor traced.

use crate::fixed::Ticks;
use crate::id::FacilityId;

// ---------------------------------------------------------------------------
// Event types
// ---------------------------------------------------------------------------

/// Discriminant tag for recorded events, used for naming, suppression and
/// filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    CycleStart,
    CycleEnd,
    Discharge,
    DischargeBlocked,
    Load,
    Transmute,
    PrefChange,
    RecipeChange,
    TradeIn,
    TradeOut,
}

/// Total number of event kinds.
const EVENT_KIND_COUNT: usize = 10;

impl EventKind {
    /// Every kind, in declaration order.
    pub const ALL: [EventKind; EVENT_KIND_COUNT] = [
        EventKind::CycleStart,
        EventKind::CycleEnd,
        EventKind::Discharge,
        EventKind::DischargeBlocked,
        EventKind::Load,
        EventKind::Transmute,
        EventKind::PrefChange,
        EventKind::RecipeChange,
        EventKind::TradeIn,
        EventKind::TradeOut,
    ];

    /// The event name written to the output log.
    pub fn name(self) -> &'static str {
        match self {
            EventKind::CycleStart => "CYCLE_START",
            EventKind::CycleEnd => "CYCLE_END",
            EventKind::Discharge => "DISCHARGE",
            EventKind::DischargeBlocked => "DISCHARGE_BLOCKED",
            EventKind::Load => "LOAD",
            EventKind::Transmute => "TRANSMUTE",
            EventKind::PrefChange => "PREF_CHANGE",
            EventKind::RecipeChange => "RECIPE_CHANGE",
            EventKind::TradeIn => "TRADE_IN",
            EventKind::TradeOut => "TRADE_OUT",
        }
    }

    fn index(self) -> usize {
        self as usize
    }
}

/// A recorded facility event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Event {
    pub time: Ticks,
    pub facility: FacilityId,
    pub kind: EventKind,
    /// Free-form detail, e.g. `"3 assemblies"`.
    pub payload: String,
}

impl Event {
    pub fn name(&self) -> &'static str {
        self.kind.name()
    }
}

// ---------------------------------------------------------------------------
// Recorder sink
// ---------------------------------------------------------------------------

/// Append-only sink for facility events.
pub trait Recorder {
    fn record(&mut self, event: Event);
}

/// A recorder that drops everything.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullRecorder;

impl Recorder for NullRecorder {
    fn record(&mut self, _event: Event) {}
}

/// Append-only in-memory event log with per-kind suppression.
#[derive(Debug, Default, Clone)]
pub struct EventLog {
    events: Vec<Event>,
    suppressed: [bool; EVENT_KIND_COUNT],
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Suppress an event kind. Suppressed events are never stored.
    pub fn suppress(&mut self, kind: EventKind) {
        self.suppressed[kind.index()] = true;
    }

    pub fn is_suppressed(&self, kind: EventKind) -> bool {
        self.suppressed[kind.index()]
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// All stored events, oldest first.
    pub fn iter(&self) -> impl Iterator<Item = &Event> {
        self.events.iter()
    }

    /// Stored events of one kind, oldest first.
    pub fn of_kind(&self, kind: EventKind) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.kind == kind)
    }

    /// Stored events recorded by one facility, oldest first.
    pub fn for_facility(&self, facility: FacilityId) -> impl Iterator<Item = &Event> {
        self.events.iter().filter(move |e| e.facility == facility)
    }

    /// Number of stored events of one kind.
    pub fn count(&self, kind: EventKind) -> usize {
        self.of_kind(kind).count()
    }
}

impl Recorder for EventLog {
    fn record(&mut self, event: Event) {
        if self.suppressed[event.kind.index()] {
            return;
        }
        tracing::trace!(
            time = event.time,
            facility = ?event.facility,
            event = event.kind.name(),
            payload = %event.payload,
            "recorded"
        );
        self.events.push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn event(kind: EventKind, time: Ticks) -> Event {
        Event {
            time,
            facility: FacilityId::default(),
            kind,
            payload: String::new(),
        }
    }

    #[test]
    fn names_are_stable() {
        assert_eq!(EventKind::CycleStart.name(), "CYCLE_START");
        assert_eq!(EventKind::DischargeBlocked.name(), "DISCHARGE_BLOCKED");
        assert_eq!(EventKind::TradeOut.name(), "TRADE_OUT");
    }

    #[test]
    fn all_kinds_index_in_order() {
        for (i, kind) in EventKind::ALL.iter().enumerate() {
            assert_eq!(kind.index(), i);
        }
    }

    #[test]
    fn log_appends_in_order() {
        let mut log = EventLog::new();
        log.record(event(EventKind::Load, 1));
        log.record(event(EventKind::Discharge, 2));
        let times: Vec<Ticks> = log.iter().map(|e| e.time).collect();
        assert_eq!(times, vec![1, 2]);
        assert_eq!(log.count(EventKind::Load), 1);
    }

    #[test]
    fn suppressed_kinds_are_dropped() {
        let mut log = EventLog::new();
        log.suppress(EventKind::TradeIn);
        assert!(log.is_suppressed(EventKind::TradeIn));
        log.record(event(EventKind::TradeIn, 0));
        log.record(event(EventKind::Load, 0));
        assert_eq!(log.len(), 1);
        assert_eq!(log.count(EventKind::TradeIn), 0);
    }

    #[test]
    fn null_recorder_accepts_anything() {
        let mut r = NullRecorder;
        r.record(event(EventKind::CycleEnd, 5));
    }
}
