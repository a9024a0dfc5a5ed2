//! Capacity-bounded buffers of discrete assemblies.
//!
//! A [`ResBuf`] holds whole [`Assembly`] values in insertion order and never
//! lets the held mass exceed its capacity. Pushing past capacity is an error
//! rather than a partial fill: callers are expected to size their requests
//! from [`ResBuf::space_for`] before anything arrives.

use crate::fixed::{Mass, units_mass, whole_units};
use crate::id::ResourceId;
use crate::material::Assembly;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// Errors produced by buffer operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum BufferError {
    #[error("pushing {pushed} kg would exceed capacity ({quantity} of {capacity} kg held)")]
    CapacityExceeded {
        capacity: Mass,
        quantity: Mass,
        pushed: Mass,
    },
    #[error("resource {0} is not held in this buffer")]
    NotHeld(ResourceId),
}

/// An ordered, capacity-bounded collection of assemblies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResBuf {
    capacity: Mass,
    quantity: Mass,
    assemblies: VecDeque<Assembly>,
}

impl ResBuf {
    /// An empty buffer holding at most `capacity` kg.
    pub fn new(capacity: Mass) -> Self {
        Self {
            capacity,
            quantity: Mass::ZERO,
            assemblies: VecDeque::new(),
        }
    }

    /// An empty buffer sized for `count` assemblies of `assem_size` kg.
    pub fn for_assemblies(count: u32, assem_size: Mass) -> Self {
        Self::new(units_mass(count, assem_size))
    }

    pub fn capacity(&self) -> Mass {
        self.capacity
    }

    /// Total mass currently held.
    pub fn quantity(&self) -> Mass {
        self.quantity
    }

    /// Number of assemblies currently held.
    pub fn count(&self) -> usize {
        self.assemblies.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assemblies.is_empty()
    }

    /// Remaining mass that can be pushed.
    pub fn space(&self) -> Mass {
        self.capacity.saturating_sub(self.quantity)
    }

    /// Number of additional whole `unit`-sized assemblies that fit.
    pub fn space_for(&self, unit: Mass) -> u32 {
        whole_units(self.space(), unit)
    }

    pub fn contains(&self, id: ResourceId) -> bool {
        self.assemblies.iter().any(|a| a.id == id)
    }

    /// Append an assembly at the back.
    pub fn push(&mut self, assembly: Assembly) -> Result<(), BufferError> {
        self.check_room(assembly.mass)?;
        self.quantity += assembly.mass;
        self.assemblies.push_back(assembly);
        Ok(())
    }

    /// Append every assembly, or none of them if the total would not fit.
    pub fn push_all(&mut self, assemblies: Vec<Assembly>) -> Result<(), BufferError> {
        let total = assemblies
            .iter()
            .fold(Mass::ZERO, |acc, a| acc.saturating_add(a.mass));
        self.check_room(total)?;
        for a in assemblies {
            self.quantity += a.mass;
            self.assemblies.push_back(a);
        }
        Ok(())
    }

    /// Remove and return the oldest assembly.
    pub fn pop_front(&mut self) -> Option<Assembly> {
        let a = self.assemblies.pop_front()?;
        self.quantity -= a.mass;
        Some(a)
    }

    /// Remove and return up to `n` assemblies, oldest first.
    pub fn pop_n(&mut self, n: usize) -> Vec<Assembly> {
        let n = n.min(self.assemblies.len());
        let popped: Vec<Assembly> = self.assemblies.drain(..n).collect();
        for a in &popped {
            self.quantity -= a.mass;
        }
        popped
    }

    /// Drain the buffer, returning everything in insertion order.
    pub fn pop_all(&mut self) -> Vec<Assembly> {
        self.quantity = Mass::ZERO;
        self.assemblies.drain(..).collect()
    }

    /// View the held assemblies in insertion order without removing them.
    pub fn peek_all(&self) -> impl DoubleEndedIterator<Item = &Assembly> + ExactSizeIterator {
        self.assemblies.iter()
    }

    /// Remove a specific assembly by identity.
    pub fn take(&mut self, id: ResourceId) -> Result<Assembly, BufferError> {
        let pos = self
            .assemblies
            .iter()
            .position(|a| a.id == id)
            .ok_or(BufferError::NotHeld(id))?;
        // position() just found it, so remove() yields Some.
        let a = self
            .assemblies
            .remove(pos)
            .ok_or(BufferError::NotHeld(id))?;
        self.quantity -= a.mass;
        Ok(a)
    }

    /// Whether the recorded quantity equals the held mass and fits within
    /// capacity. Always true for buffers built through this API; used to
    /// vet decoded snapshots.
    pub fn is_consistent(&self) -> bool {
        let held = self
            .assemblies
            .iter()
            .try_fold(Mass::ZERO, |acc, a| acc.checked_add(a.mass));
        held == Some(self.quantity) && self.quantity <= self.capacity
    }

    fn check_room(&self, pushed: Mass) -> Result<(), BufferError> {
        match self.quantity.checked_add(pushed) {
            Some(total) if total <= self.capacity => Ok(()),
            _ => Err(BufferError::CapacityExceeded {
                capacity: self.capacity,
                quantity: self.quantity,
                pushed,
            }),
        }
    }
}
