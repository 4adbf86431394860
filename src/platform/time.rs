//! Wall-clock time
//!
//! Session timing is driven by the caller's monotonic clock; this is only
//! used to stamp score records with a calendar date.

/// Milliseconds since the Unix epoch
#[cfg(target_arch = "wasm32")]
pub fn wall_clock_ms() -> f64 {
    js_sys::Date::now()
}

/// Milliseconds since the Unix epoch
#[cfg(not(target_arch = "wasm32"))]
pub fn wall_clock_ms() -> f64 {
    use std::time::{SystemTime, UNIX_EPOCH};

    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis() as f64)
        .unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wall_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(wall_clock_ms() > 1_577_836_800_000.0);
    }
}
