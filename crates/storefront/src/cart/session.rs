//! Cart session identifiers.

use chrono::Utc;
use rand::Rng;

/// Storage key holding the current session id.
pub const SESSION_STORAGE_KEY: &str = "cart_session_id";

const SUFFIX_LEN: usize = 9;

/// Generate a fresh session id: `session_<unix-millis>_<9 base-36 chars>`.
#[must_use]
pub fn generate_session_id() -> String {
    let mut rng = rand::rng();
    let suffix: String = (0..SUFFIX_LEN)
        .map(|_| char::from_digit(rng.random_range(0..36), 36).unwrap_or('0'))
        .collect();

    format!("session_{}_{suffix}", Utc::now().timestamp_millis())
}
