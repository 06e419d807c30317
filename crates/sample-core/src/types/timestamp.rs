//! Unix timestamp helper.

use chrono::Utc;

/// Current time in Unix seconds.
pub fn now_unix() -> i64 {
    Utc::now().timestamp()
}
