use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Health flags shared between the scheduler (writer) and the liveness
/// server (reader).
///
/// Each flag is its own atomic cell; readers never need a consistent view of
/// both at once.
#[derive(Debug)]
pub struct HealthState {
    server_up: AtomicBool,
    last_cycle_ok: AtomicBool,
    consecutive_failures: AtomicU64,
}

impl Default for HealthState {
    fn default() -> Self {
        Self::new()
    }
}

impl HealthState {
    /// Both flags start `true` so that probes arriving before the first
    /// cycle finishes report healthy.
    pub fn new() -> Self {
        Self {
            server_up: AtomicBool::new(true),
            last_cycle_ok: AtomicBool::new(true),
            consecutive_failures: AtomicU64::new(0),
        }
    }

    pub fn server_up(&self) -> bool {
        self.server_up.load(Ordering::Acquire)
    }

    pub fn set_server_up(&self, up: bool) {
        self.server_up.store(up, Ordering::Release);
    }

    pub fn last_cycle_ok(&self) -> bool {
        self.last_cycle_ok.load(Ordering::Acquire)
    }

    /// Record a cycle result. Returns the consecutive failure count after
    /// this cycle (0 on success).
    pub fn record_cycle(&self, ok: bool) -> u64 {
        self.last_cycle_ok.store(ok, Ordering::Release);
        if ok {
            self.consecutive_failures.store(0, Ordering::Release);
            0
        } else {
            self.consecutive_failures
                .fetch_add(1, Ordering::AcqRel)
                .saturating_add(1)
        }
    }

    pub fn consecutive_failures(&self) -> u64 {
        self.consecutive_failures.load(Ordering::Acquire)
    }

    /// Liveness: the responder is up and the most recent cycle succeeded.
    pub fn is_live(&self) -> bool {
        self.server_up() && self.last_cycle_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    #[test]
    fn new_state_is_live() {
        let state = HealthState::new();
        assert!(state.server_up());
        assert!(state.last_cycle_ok());
        assert!(state.is_live());
        assert_eq!(state.consecutive_failures(), 0);
    }

    #[test]
    fn failed_cycle_makes_state_not_live() {
        let state = HealthState::new();
        assert_eq!(state.record_cycle(false), 1);
        assert!(!state.is_live());
        assert!(state.server_up());
    }

    #[test]
    fn success_resets_failure_count() {
        let state = HealthState::new();
        state.record_cycle(false);
        state.record_cycle(false);
        assert_eq!(state.consecutive_failures(), 2);
        assert_eq!(state.record_cycle(true), 0);
        assert_eq!(state.consecutive_failures(), 0);
        assert!(state.is_live());
    }

    #[test]
    fn server_down_is_not_live() {
        let state = HealthState::new();
        state.set_server_up(false);
        assert!(!state.is_live());
    }

    #[test]
    fn updates_are_visible_across_threads() {
        let state = Arc::new(HealthState::new());
        let writer = Arc::clone(&state);
        std::thread::spawn(move || {
            writer.record_cycle(false);
        })
        .join()
        .unwrap();
        assert!(!state.last_cycle_ok());
    }
}
