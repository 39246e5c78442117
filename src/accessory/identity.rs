//! Deterministic accessory identity.
//!
//! Identifiers are name-based (UUID v5) so the same namespaced name always
//! maps to the same accessory across restarts.

use chrono::{SecondsFormat, Utc};
use uuid::Uuid;

/// Root namespace for all accessory identifiers minted by this bridge.
pub const ACCESSORY_NAMESPACE: Uuid = Uuid::from_u128(0x6d1f_2c0a_8b4e_5f71_9a3c_04e2_b7d5_1e88);

/// Derive the accessory id for `name` inside `namespace`.
pub fn derive_id(namespace: &str, name: &str) -> Uuid {
    Uuid::new_v5(&ACCESSORY_NAMESPACE, format!("{namespace}:{name}").as_bytes())
}

/// Name used when a device is added without one: the current UTC time,
/// RFC 3339 with millisecond precision (e.g. `2024-01-01T00:00:00.000Z`).
pub fn timestamp_name() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}
