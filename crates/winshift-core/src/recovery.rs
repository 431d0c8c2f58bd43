//! Re-registers hotkeys when raw key activity suggests the OS hook has
//! gone out of sync.
//!
//! After a remote-desktop session switch, `RegisterHotKey` registrations
//! can silently stop firing while raw keyboard input still arrives. The
//! exact signature is not known, so any burst of two keys inside the
//! timeout window counts.

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::hotkey::HotkeyLifecycleManager;
use crate::platform::HotkeyRegistrar;

/// Number of keys inside the window that triggers recovery.
const BURST_LEN: usize = 2;

/// Whether a raw key triggered recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    Triggered,
    NotTriggered,
}

/// Sliding-window detector over raw key events.
#[derive(Debug)]
pub struct RecoveryHeuristic {
    timeout: Duration,
    history: VecDeque<(u8, Instant)>,
}

impl RecoveryHeuristic {
    pub fn new(timeout: Duration) -> Self {
        Self {
            timeout,
            history: VecDeque::new(),
        }
    }

    pub fn set_timeout(&mut self, timeout: Duration) {
        self.timeout = timeout;
    }

    #[cfg(test)]
    pub(crate) fn history_len(&self) -> usize {
        self.history.len()
    }

    /// Feeds one raw key.
    ///
    /// When the pruned history holds a burst, hotkeys are re-registered
    /// and `self_test` runs once; the history is then cleared. If
    /// re-registration fails the history is kept so the next key retries.
    pub fn on_raw_key<R: HotkeyRegistrar>(
        &mut self,
        key: u8,
        now: Instant,
        hotkeys: &mut HotkeyLifecycleManager<R>,
        self_test: impl FnOnce(),
    ) -> Trigger {
        self.history.push_back((key, now));
        self.prune(now);

        if self.history.len() < BURST_LEN {
            return Trigger::NotTriggered;
        }

        crate::log_info!(
            "{} keys within {:?}, re-registering hotkeys",
            self.history.len(),
            self.timeout
        );
        if let Err(e) = hotkeys.register_all() {
            crate::log_warn!("Hotkey recovery failed, will retry on next key: {e}");
            return Trigger::NotTriggered;
        }

        crate::log_info!("Hotkeys recovered, running arrange self-test");
        self_test();
        self.history.clear();
        Trigger::Triggered
    }

    fn prune(&mut self, now: Instant) {
        while let Some(&(_, at)) = self.history.front() {
            if now.saturating_duration_since(at) > self.timeout {
                self.history.pop_front();
            } else {
                break;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::time::Duration;

    use super::*;
    use crate::hotkey::{HotkeyAction, RestartPolicy};
    use crate::testing::{FakeRegistrar, noop_callbacks};

    const TIMEOUT: Duration = Duration::from_secs(5);

    fn hotkeys(registrar: FakeRegistrar) -> HotkeyLifecycleManager<FakeRegistrar> {
        HotkeyLifecycleManager::new(
            registrar,
            crate::config::Config::default().hotkeys().unwrap(),
            noop_callbacks(),
            Duration::from_secs(1800),
            RestartPolicy {
                enabled: true,
                max_attempts: 3,
            },
        )
    }

    #[test]
    fn second_key_inside_timeout_triggers() {
        // Arrange
        let mut heuristic = RecoveryHeuristic::new(TIMEOUT);
        let mut hotkeys = hotkeys(FakeRegistrar::default());
        let self_tests = Cell::new(0);
        let t0 = Instant::now();

        // Act
        let first = heuristic.on_raw_key(0x41, t0, &mut hotkeys, || {
            self_tests.set(self_tests.get() + 1)
        });
        let second = heuristic.on_raw_key(
            0x42,
            t0 + Duration::from_secs(1),
            &mut hotkeys,
            || self_tests.set(self_tests.get() + 1),
        );

        // Assert
        assert_eq!(first, Trigger::NotTriggered);
        assert_eq!(second, Trigger::Triggered);
        assert_eq!(self_tests.get(), 1);
        assert_eq!(heuristic.history_len(), 0);
        assert!(hotkeys.is_registered());
    }

    #[test]
    fn keys_further_apart_than_timeout_never_trigger() {
        // Arrange
        let mut heuristic = RecoveryHeuristic::new(TIMEOUT);
        let mut hotkeys = hotkeys(FakeRegistrar::default());
        let t0 = Instant::now();

        // Act / Assert
        for i in 0..4u32 {
            let at = t0 + Duration::from_secs(6) * i;
            assert_eq!(
                heuristic.on_raw_key(0x41, at, &mut hotkeys, || {}),
                Trigger::NotTriggered
            );
            assert_eq!(heuristic.history_len(), 1);
        }
        assert_eq!(hotkeys.registrar().register_calls, 0);
    }

    #[test]
    fn key_exactly_at_timeout_still_counts() {
        // Arrange
        let mut heuristic = RecoveryHeuristic::new(TIMEOUT);
        let mut hotkeys = hotkeys(FakeRegistrar::default());
        let t0 = Instant::now();
        heuristic.on_raw_key(0x41, t0, &mut hotkeys, || {});

        // Act
        let trigger = heuristic.on_raw_key(0x41, t0 + TIMEOUT, &mut hotkeys, || {});

        // Assert
        assert_eq!(trigger, Trigger::Triggered);
    }

    #[test]
    fn failed_registration_keeps_history_for_retry() {
        // Arrange
        let mut heuristic = RecoveryHeuristic::new(TIMEOUT);
        let mut hotkeys = hotkeys(FakeRegistrar::failing_on(HotkeyAction::Exit));
        let self_tests = Cell::new(0);
        let t0 = Instant::now();
        heuristic.on_raw_key(0x41, t0, &mut hotkeys, || {});

        // Act
        let failed = heuristic.on_raw_key(0x42, t0 + Duration::from_secs(1), &mut hotkeys, || {
            self_tests.set(self_tests.get() + 1)
        });
        hotkeys.registrar_mut().fail_on(None);
        let retried = heuristic.on_raw_key(0x43, t0 + Duration::from_secs(2), &mut hotkeys, || {
            self_tests.set(self_tests.get() + 1)
        });

        // Assert
        assert_eq!(failed, Trigger::NotTriggered);
        assert_eq!(retried, Trigger::Triggered);
        assert_eq!(self_tests.get(), 1);
        assert_eq!(heuristic.history_len(), 0);
    }

    #[test]
    fn three_keys_one_second_apart_trigger_on_the_second() {
        // Arrange
        let mut heuristic = RecoveryHeuristic::new(TIMEOUT);
        let mut hotkeys = hotkeys(FakeRegistrar::default());
        let t0 = Instant::now();

        // Act
        let triggers: Vec<_> = (0..3u64)
            .map(|i| {
                heuristic.on_raw_key(0x41, t0 + Duration::from_secs(i), &mut hotkeys, || {})
            })
            .collect();

        // Assert: history was cleared, so the third key starts over
        assert_eq!(
            triggers,
            vec![Trigger::NotTriggered, Trigger::Triggered, Trigger::NotTriggered]
        );
        assert_eq!(heuristic.history_len(), 1);
    }
}
