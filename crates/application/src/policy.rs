use std::time::Duration;

pub const DEFAULT_PERSISTENCE_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_PERSISTENCE_ATTEMPTS: u32 = 2;

/// Bounds every call into the photo store. A call that exceeds `timeout` counts
/// as a failed attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistencePolicy {
    pub timeout: Duration,
    pub attempts: u32,
}

impl Default for PersistencePolicy {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_PERSISTENCE_TIMEOUT,
            attempts: DEFAULT_PERSISTENCE_ATTEMPTS,
        }
    }
}

impl PersistencePolicy {
    pub fn attempts(&self) -> u32 {
        self.attempts.max(1)
    }
}
