//! Script-session tokens for the bridge.
//!
//! The bridge's client script derives a per-call token from the server-issued
//! session id, the current time and a random draw, each packed with the
//! same 64-symbol alphabet. The server validates against the same derivation,
//! so the packing must match symbol for symbol.

use chrono::Utc;
use rand::Rng;

/// Symbol table, indexed by 6-bit chunk.
const CHARMAP: &[u8; 64] = b"1234567890abcdefghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ*$";

/// Exclusive upper bound of the random component.
pub const RANDOM_BOUND: u64 = 10_000_000_000_000_000;

/// Pack a number into the token alphabet, least-significant chunk first.
///
/// Zero packs to the empty string.
#[must_use]
pub fn tokenify(mut number: u64) -> String {
    let mut token = String::new();
    while number > 0 {
        token.push(char::from(CHARMAP[(number & 0x3F) as usize]));
        number >>= 6;
    }
    token
}

/// `{bridge_id}/{tokenify(timestamp_ms)}-{tokenify(random)}`.
#[must_use]
pub fn session_token(bridge_id: &str, timestamp_ms: u64, random: u64) -> String {
    format!("{bridge_id}/{}-{}", tokenify(timestamp_ms), tokenify(random))
}

/// A token from the current clock and a fresh random draw.
///
/// Never cache the result: every call needs its own.
#[must_use]
pub fn fresh_session_token(bridge_id: &str) -> String {
    let timestamp_ms = u64::try_from(Utc::now().timestamp_millis()).unwrap_or_default();
    let random = rand::rng().random_range(0..RANDOM_BOUND);
    session_token(bridge_id, timestamp_ms, random)
}
