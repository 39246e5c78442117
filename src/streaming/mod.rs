//! Streaming capability negotiation for camera accessories.
//!
//! - `options`: codec, resolution and crypto suite catalog
//! - `negotiator`: validates options into an immutable descriptor
//! - `controller`: descriptor bound to a session delegate
//! - `delegate`: interface to the external media pipeline

mod controller;
mod delegate;
mod negotiator;
pub mod options;

pub use controller::{BoundStreamController, StreamingStatus, StreamingStatusAttribute};
pub use delegate::{
    LoggingDelegate, PrepareStreamRequest, SnapshotRequest, StartStreamRequest, StreamingDelegate,
};
pub use negotiator::{MIN_STREAM_COUNT, StreamingCapabilityDescriptor, StreamingNegotiator};
pub use options::StreamingOptions;
