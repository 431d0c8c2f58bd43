//! Hotkey parsing and the registration lifecycle.
//!
//! The three logical hotkeys (arrange, exit, reload) are registered and
//! unregistered as one group: after any call into the manager either
//! all three are registered or none is.

use std::fmt;
use std::str::FromStr;
use std::sync::Arc;
use std::time::{Duration, Instant};

use crate::platform::{HotkeyCallback, HotkeyRegistrar};
use crate::{Error, Result};

/// The logical hotkeys, in registration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HotkeyAction {
    Arrange,
    Exit,
    Reload,
}

impl HotkeyAction {
    pub const ALL: [Self; 3] = [Self::Arrange, Self::Exit, Self::Reload];

    /// Position in [`Self::ALL`].
    pub fn index(self) -> usize {
        match self {
            Self::Arrange => 0,
            Self::Exit => 1,
            Self::Reload => 2,
        }
    }
}

impl fmt::Display for HotkeyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Arrange => f.write_str("arrange"),
            Self::Exit => f.write_str("exit"),
            Self::Reload => f.write_str("reload"),
        }
    }
}

/// Keyboard modifier keys.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Modifier {
    Alt,
    Shift,
    Ctrl,
    Win,
}

impl Modifier {
    fn parse(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "ctrl" | "control" => Some(Self::Ctrl),
            "alt" => Some(Self::Alt),
            "shift" => Some(Self::Shift),
            "win" | "windows" | "super" | "cmd" => Some(Self::Win),
            _ => None,
        }
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Ctrl => "ctrl",
            Self::Alt => "alt",
            Self::Shift => "shift",
            Self::Win => "win",
        }
    }
}

/// A parsed hotkey string such as `ctrl+alt+i`.
///
/// The key name is kept lowercase and is resolved to a virtual key code
/// by the platform crate.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub modifiers: Vec<Modifier>,
    pub key: String,
}

impl FromStr for KeyCombo {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let invalid = |reason: String| Error::InvalidHotkey {
            spec: s.to_string(),
            reason,
        };

        let parts: Vec<&str> = s.split('+').map(str::trim).collect();
        let Some((key, modifier_names)) = parts.split_last() else {
            return Err(invalid("empty hotkey".into()));
        };
        if key.is_empty() {
            return Err(invalid("missing key".into()));
        }

        let mut modifiers = Vec::new();
        for name in modifier_names {
            let modifier =
                Modifier::parse(name).ok_or_else(|| invalid(format!("unknown modifier {name:?}")))?;
            if !modifiers.contains(&modifier) {
                modifiers.push(modifier);
            }
        }

        Ok(Self {
            modifiers,
            key: key.to_ascii_lowercase(),
        })
    }
}

impl fmt::Display for KeyCombo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for m in &self.modifiers {
            write!(f, "{}+", m.as_str())?;
        }
        f.write_str(&self.key)
    }
}

/// Registration state of one logical hotkey.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HotkeyState {
    Unregistered,
    Registered,
}

/// Result of a periodic health check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Health {
    /// The probe passed and all hotkeys are registered.
    Healthy,
    /// The probe failed but re-registration succeeded.
    Recovered,
    /// The probe failed and hotkeys could not be re-registered.
    Unhealthy,
}

/// Callbacks bound to the three logical hotkeys.
#[derive(Clone)]
pub struct HotkeyCallbacks {
    pub arrange: HotkeyCallback,
    pub exit: HotkeyCallback,
    pub reload: HotkeyCallback,
}

impl HotkeyCallbacks {
    fn get(&self, action: HotkeyAction) -> HotkeyCallback {
        match action {
            HotkeyAction::Arrange => Arc::clone(&self.arrange),
            HotkeyAction::Exit => Arc::clone(&self.exit),
            HotkeyAction::Reload => Arc::clone(&self.reload),
        }
    }
}

/// Limits automatic re-registration from health checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RestartPolicy {
    pub enabled: bool,
    /// Consecutive failed attempts before health checks stop retrying.
    pub max_attempts: u32,
}

struct Binding {
    action: HotkeyAction,
    combo: KeyCombo,
    callback: HotkeyCallback,
}

/// Owns hotkey registration state and the periodic health check.
pub struct HotkeyLifecycleManager<R> {
    registrar: R,
    bindings: Vec<Binding>,
    states: [HotkeyState; 3],
    interval: Duration,
    last_check: Option<Instant>,
    policy: RestartPolicy,
    failed_restarts: u32,
    exhaustion_reported: bool,
}

impl<R: HotkeyRegistrar> HotkeyLifecycleManager<R> {
    pub fn new(
        registrar: R,
        combos: [(HotkeyAction, KeyCombo); 3],
        callbacks: HotkeyCallbacks,
        interval: Duration,
        policy: RestartPolicy,
    ) -> Self {
        let bindings = combos
            .into_iter()
            .map(|(action, combo)| Binding {
                action,
                combo,
                callback: callbacks.get(action),
            })
            .collect();

        Self {
            registrar,
            bindings,
            states: [HotkeyState::Unregistered; 3],
            interval,
            last_check: None,
            policy,
            failed_restarts: 0,
            exhaustion_reported: false,
        }
    }

    /// Re-registers the whole group.
    ///
    /// Hotkeys currently registered are released first (errors ignored),
    /// then all three are registered in order. If any registration
    /// fails, the ones already registered are released again so the
    /// group ends up fully unregistered, and the error is returned.
    pub fn register_all(&mut self) -> Result<()> {
        self.release_registered();

        let mut failure = None;
        for binding in &self.bindings {
            match self.registrar.register(
                binding.action,
                &binding.combo,
                Arc::clone(&binding.callback),
            ) {
                Ok(()) => {
                    self.states[binding.action.index()] = HotkeyState::Registered;
                    crate::log_info!("Registered {} hotkey {}", binding.action, binding.combo);
                }
                Err(e) => {
                    failure = Some(e);
                    break;
                }
            }
        }

        if let Some(e) = failure {
            crate::log_error!("Hotkey registration failed: {e}");
            self.release_registered();
            return Err(e);
        }

        self.failed_restarts = 0;
        self.exhaustion_reported = false;
        Ok(())
    }

    /// Releases every registered hotkey. Failures are only warnings.
    pub fn unregister_all(&mut self) {
        self.release_registered();
    }

    fn release_registered(&mut self) {
        for action in HotkeyAction::ALL {
            if self.states[action.index()] == HotkeyState::Unregistered {
                continue;
            }
            if let Err(e) = self.registrar.unregister(action) {
                crate::log_warn!("Failed to unregister {action} hotkey: {e}");
            }
            self.states[action.index()] = HotkeyState::Unregistered;
        }
    }

    /// Replaces the key combos, e.g. after a config reload.
    ///
    /// Takes effect on the next [`register_all`](Self::register_all).
    pub fn set_combos(&mut self, combos: [(HotkeyAction, KeyCombo); 3]) {
        for (action, combo) in combos {
            if let Some(binding) = self.bindings.iter_mut().find(|b| b.action == action) {
                binding.combo = combo;
            }
        }
    }

    pub fn set_interval(&mut self, interval: Duration) {
        self.interval = interval;
    }

    pub fn set_policy(&mut self, policy: RestartPolicy) {
        self.policy = policy;
    }

    /// Records `now` as the last health check without probing.
    pub fn mark_checked(&mut self, now: Instant) {
        self.last_check = Some(now);
    }

    pub fn is_check_due(&self, now: Instant) -> bool {
        self.last_check
            .is_none_or(|last| now.saturating_duration_since(last) >= self.interval)
    }

    /// Probes the hotkey subsystem and re-registers on failure.
    ///
    /// The check time is recorded before anything else so a failing
    /// subsystem is retried at most once per interval.
    pub fn health_check(&mut self, now: Instant) -> Health {
        self.last_check = Some(now);

        let problem = if !self.is_registered() {
            Some("hotkeys are not registered".to_string())
        } else {
            self.registrar.probe().err().map(|e| e.to_string())
        };

        let Some(problem) = problem else {
            crate::log_debug!("Hotkey health check passed");
            return Health::Healthy;
        };
        crate::log_warn!("Hotkey health check failed: {problem}");

        if !self.policy.enabled {
            crate::log_warn!("Automatic hotkey restart is disabled, leaving hotkeys as they are");
            return Health::Unhealthy;
        }

        if self.failed_restarts >= self.policy.max_attempts {
            if !self.exhaustion_reported {
                crate::log_error!(
                    "Giving up on automatic hotkey restart after {} attempts; \
                     press the reload hotkey or restart winshift",
                    self.failed_restarts
                );
                self.exhaustion_reported = true;
            }
            return Health::Unhealthy;
        }

        match self.register_all() {
            Ok(()) => {
                crate::log_info!("Hotkeys re-registered after failed health check");
                Health::Recovered
            }
            Err(_) => {
                self.failed_restarts += 1;
                crate::log_error!(
                    "Hotkey restart attempt {}/{} failed",
                    self.failed_restarts,
                    self.policy.max_attempts
                );
                Health::Unhealthy
            }
        }
    }

    /// Returns `true` when all three hotkeys are registered.
    pub fn is_registered(&self) -> bool {
        self.states.iter().all(|s| *s == HotkeyState::Registered)
    }

    pub fn states(&self) -> [HotkeyState; 3] {
        self.states
    }

    pub fn registrar(&self) -> &R {
        &self.registrar
    }

    pub fn registrar_mut(&mut self) -> &mut R {
        &mut self.registrar
    }
}
