//! Versioned binary snapshots.
//!
//! Any serde-serializable payload can be wrapped in an [`Envelope`] carrying
//! a [`SnapshotHeader`] and encoded with `bitcode`. Decoding validates the
//! header before handing the payload back.

use crate::fixed::Ticks;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Magic number identifying a fuel-cycle snapshot.
pub const SNAPSHOT_MAGIC: u32 = 0xF0E1_0001;

/// Current format version. Increment when breaking the wire format.
pub const FORMAT_VERSION: u32 = 1;

// ---------------------------------------------------------------------------
// Error types
// ---------------------------------------------------------------------------

/// Errors that can occur during serialization.
#[derive(Debug, thiserror::Error)]
pub enum SerializeError {
    #[error("bitcode encoding failed: {0}")]
    Encode(String),
}

/// Errors that can occur during deserialization.
#[derive(Debug, thiserror::Error)]
pub enum DeserializeError {
    #[error("invalid magic number: expected 0x{:08X}, got 0x{:08X}", SNAPSHOT_MAGIC, .0)]
    InvalidMagic(u32),
    #[error("unsupported format version: expected {}, got {}", FORMAT_VERSION, .0)]
    UnsupportedVersion(u32),
    #[error("snapshot from future version {0} (this build supports up to {FORMAT_VERSION})")]
    FutureVersion(u32),
    #[error("bitcode decoding failed: {0}")]
    Decode(String),
}

// ---------------------------------------------------------------------------
// Snapshot header
// ---------------------------------------------------------------------------

/// Header prepended to every serialized snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SnapshotHeader {
    pub magic: u32,
    pub version: u32,
    /// Simulation time at which the snapshot was taken.
    pub time: Ticks,
}

impl SnapshotHeader {
    /// Create a header for the current format version.
    pub fn new(time: Ticks) -> Self {
        Self {
            magic: SNAPSHOT_MAGIC,
            version: FORMAT_VERSION,
            time,
        }
    }

    /// Validate the header. Returns `Ok(())` if valid.
    pub fn validate(&self) -> Result<(), DeserializeError> {
        if self.magic != SNAPSHOT_MAGIC {
            return Err(DeserializeError::InvalidMagic(self.magic));
        }
        if self.version > FORMAT_VERSION {
            return Err(DeserializeError::FutureVersion(self.version));
        }
        if self.version < FORMAT_VERSION {
            return Err(DeserializeError::UnsupportedVersion(self.version));
        }
        Ok(())
    }
}

/// A header and its payload, as laid out on the wire.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub header: SnapshotHeader,
    pub payload: T,
}

/// Encode `payload` behind a header stamped with `time`.
pub fn encode<T: Serialize>(time: Ticks, payload: &T) -> Result<Vec<u8>, SerializeError> {
    let envelope = Envelope {
        header: SnapshotHeader::new(time),
        payload,
    };
    bitcode::serialize(&envelope).map_err(|e| SerializeError::Encode(e.to_string()))
}

/// Decode and validate a snapshot produced by [`encode`].
pub fn decode<T: DeserializeOwned>(data: &[u8]) -> Result<(SnapshotHeader, T), DeserializeError> {
    let envelope: Envelope<T> =
        bitcode::deserialize(data).map_err(|e| DeserializeError::Decode(e.to_string()))?;
    envelope.header.validate()?;
    Ok((envelope.header, envelope.payload))
}
