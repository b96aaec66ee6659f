use std::time::{SystemTime, UNIX_EPOCH};

use evidence_deck_application::Clock;

/// Unix time in milliseconds.
#[derive(Debug, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_timestamp_string(&self) -> String {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|duration| duration.as_millis())
            .unwrap_or_default()
            .to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn timestamp_is_numeric_and_recent() {
        let stamp: u128 = SystemClock
            .now_timestamp_string()
            .parse()
            .expect("numeric timestamp");
        assert!(stamp > 1_600_000_000_000);
    }
}
