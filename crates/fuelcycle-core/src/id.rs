use serde::{Deserialize, Serialize};
use slotmap::new_key_type;

new_key_type! {
    /// Identifies a facility registered with the simulation driver.
    pub struct FacilityId;
}

/// Identifies a discrete resource (one assembly). Assigned by the host and
/// never reused within a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResourceId(pub u64);

impl std::fmt::Display for ResourceId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Identifies a single request posted to the exchange during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RequestId(pub u64);

/// Identifies a request portfolio posted to the exchange during one step.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PortfolioId(pub u64);

/// Hands out resource ids. Monotonic, so ids are never reused.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ResourceIds {
    next: u64,
}

impl ResourceIds {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allocate(&mut self) -> ResourceId {
        let id = ResourceId(self.next);
        self.next += 1;
        id
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_ids_are_monotonic() {
        let mut ids = ResourceIds::new();
        let a = ids.allocate();
        let b = ids.allocate();
        assert_eq!(a, ResourceId(0));
        assert_eq!(b, ResourceId(1));
    }

    #[test]
    fn resource_id_display() {
        assert_eq!(ResourceId(7).to_string(), "#7");
    }
}
