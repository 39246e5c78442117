//! Virtual Accessory Bridge library.
//!
//! Tracks a mutable set of virtual accessories for a home-automation
//! bridge: restores them from the host cache, adds and removes them at
//! runtime through a local trigger listener, and negotiates the streaming
//! capability of camera accessories.

pub mod accessory;
pub mod catalog;
pub mod config;
pub mod error;
pub mod host;
pub mod platform;
pub mod registry;
pub mod streaming;
pub mod trigger;

pub use error::{BridgeError, Result};
