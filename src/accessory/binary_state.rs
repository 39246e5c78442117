//! Binary on/off state backing switch, light and camera-active attributes.
//!
//! Provides thread-safe shared state that the host reads and writes through
//! the attribute contract and that can also be updated from other parts of
//! the process.
//!
//! Supports change listeners - when the value changes, every registered
//! listener is invoked with the new value.

use super::capability::{AttributeHandler, AttributeValue};
use crate::error::{BridgeError, Result};
use parking_lot::RwLock;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};

type ChangeListener = Arc<dyn Fn(bool) + Send + Sync>;

/// Thread-safe binary state.
///
/// The version is incremented each time the value changes via `set()` or
/// `toggle()`, so readers can detect changes cheaply.
pub struct BinaryState {
    label: String,
    state: AtomicBool,
    version: AtomicU32,
    listener: RwLock<Option<ChangeListener>>,
}

impl BinaryState {
    /// Create a new binary state with the given initial value.
    pub fn new(label: impl Into<String>, initial: bool) -> Self {
        Self {
            label: label.into(),
            state: AtomicBool::new(initial),
            version: AtomicU32::new(0),
            listener: RwLock::new(None),
        }
    }

    /// Get the current state.
    pub fn get(&self) -> bool {
        self.state.load(Ordering::SeqCst)
    }

    /// Set the state. Increments version if value changed.
    pub fn set(&self, value: bool) {
        let old = self.state.swap(value, Ordering::SeqCst);
        if old != value {
            self.version.fetch_add(1, Ordering::SeqCst);
            self.notify(value);
        }
    }

    /// Toggle the state and return the new value. Always increments version.
    pub fn toggle(&self) -> bool {
        let old = self.state.fetch_xor(true, Ordering::SeqCst);
        self.version.fetch_add(1, Ordering::SeqCst);
        self.notify(!old);
        !old
    }

    /// Number of changes applied since creation.
    pub fn version(&self) -> u32 {
        self.version.load(Ordering::SeqCst)
    }

    /// Register a callback invoked whenever the value changes.
    pub fn set_listener(&self, listener: ChangeListener) {
        *self.listener.write() = Some(listener);
    }

    fn notify(&self, value: bool) {
        if let Some(listener) = self.listener.read().as_ref() {
            listener(value);
        }
    }
}

impl AttributeHandler for BinaryState {
    fn get(&self) -> AttributeValue {
        let on = BinaryState::get(self);
        log::debug!(
            "[Accessory] Current state of {} was returned: {}",
            self.label,
            if on { "ON" } else { "OFF" }
        );
        AttributeValue::Bool(on)
    }

    fn set(&self, value: AttributeValue) -> Result<()> {
        let on = value
            .as_bool()
            .ok_or_else(|| BridgeError::AttributeTypeMismatch {
                attribute: self.label.clone(),
                expected: "boolean",
            })?;
        BinaryState::set(self, on);
        log::info!(
            "[Accessory] {} was set to: {}",
            self.label,
            if on { "ON" } else { "OFF" }
        );
        Ok(())
    }
}
