//! Deterministic fakes for the platform traits.

use std::collections::{HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};

use crate::config::Config;
use crate::hotkey::{HotkeyAction, HotkeyCallbacks, KeyCombo};
use crate::platform::{
    HotkeyCallback, HotkeyRegistrar, MonitorQuery, RawKeySource, WindowEnumerator, WindowMover,
    WindowState,
};
use crate::topology::MonitorMetrics;
use crate::window::{WindowHandle, WindowInfo};
use crate::{Error, Rect, Result};

pub(crate) fn window(handle: usize, title: &str, rect: Rect) -> WindowInfo {
    WindowInfo {
        title: title.into(),
        class_name: format!("{title}Class"),
        handle: WindowHandle(handle),
        rect,
        is_maximized: false,
    }
}

/// Default config with `monitor_1_apps` replaced and all delays zeroed.
pub(crate) fn fast_config(monitor_1_apps: &[&str]) -> Config {
    Config {
        monitor_1_apps: monitor_1_apps.iter().map(|s| s.to_string()).collect(),
        restore_settle_ms: 0,
        maximize_settle_ms: 0,
        window_delay_ms: 0,
        ..Config::default()
    }
}

pub(crate) fn noop_callbacks() -> HotkeyCallbacks {
    HotkeyCallbacks {
        arrange: Arc::new(|| {}),
        exit: Arc::new(|| {}),
        reload: Arc::new(|| {}),
    }
}

/// A mutation recorded by [`FakeDesktop`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Call {
    Restore(WindowHandle),
    Maximize(WindowHandle),
    Move {
        handle: WindowHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    },
}

/// Pauses `enumerate_windows` until the test releases it.
pub(crate) struct Gate {
    entered: Receiver<()>,
    release: Sender<()>,
}

impl Gate {
    pub(crate) fn wait_entered(&self) {
        let _ = self.entered.recv();
    }

    pub(crate) fn release(&self) {
        let _ = self.release.send(());
    }
}

struct GateHooks {
    entered: Sender<()>,
    release: Receiver<()>,
}

/// In-memory desktop with a 1920-wide primary monitor and a secondary
/// monitor to its left.
pub(crate) struct FakeDesktop {
    metrics: MonitorMetrics,
    windows: Mutex<Vec<WindowInfo>>,
    calls: Mutex<Vec<Call>>,
    failing_moves: Mutex<HashSet<WindowHandle>>,
    fail_state_query: Mutex<bool>,
    fail_enumeration: Mutex<bool>,
    metrics_queries: AtomicUsize,
    gate: Mutex<Option<GateHooks>>,
}

impl FakeDesktop {
    pub(crate) fn with_windows(windows: Vec<WindowInfo>) -> Self {
        Self {
            metrics: MonitorMetrics {
                primary_width: 1920,
                primary_height: 1080,
                virtual_left: -1920,
                virtual_top: 0,
                virtual_width: 3840,
                virtual_height: 1080,
                monitor_count: 2,
            },
            windows: Mutex::new(windows),
            calls: Mutex::new(Vec::new()),
            failing_moves: Mutex::new(HashSet::new()),
            fail_state_query: Mutex::new(false),
            fail_enumeration: Mutex::new(false),
            metrics_queries: AtomicUsize::new(0),
            gate: Mutex::new(None),
        }
    }

    pub(crate) fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    /// Current state of a window, as a fresh enumeration would see it.
    pub(crate) fn live(&self, handle: WindowHandle) -> Option<WindowInfo> {
        self.windows
            .lock()
            .unwrap()
            .iter()
            .find(|w| w.handle == handle)
            .cloned()
    }

    pub(crate) fn metrics_queries(&self) -> usize {
        self.metrics_queries.load(Ordering::SeqCst)
    }

    pub(crate) fn fail_moves_for(&self, handle: WindowHandle) {
        self.failing_moves.lock().unwrap().insert(handle);
    }

    pub(crate) fn fail_state_query(&self, fail: bool) {
        *self.fail_state_query.lock().unwrap() = fail;
    }

    pub(crate) fn fail_enumeration(&self, fail: bool) {
        *self.fail_enumeration.lock().unwrap() = fail;
    }

    pub(crate) fn gate_enumeration(&self) -> Gate {
        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *self.gate.lock().unwrap() = Some(GateHooks {
            entered: entered_tx,
            release: release_rx,
        });
        Gate {
            entered: entered_rx,
            release: release_tx,
        }
    }

    fn update(&self, handle: WindowHandle, f: impl FnOnce(&mut WindowInfo)) {
        if let Some(w) = self
            .windows
            .lock()
            .unwrap()
            .iter_mut()
            .find(|w| w.handle == handle)
        {
            f(w);
        }
    }
}

impl WindowEnumerator for FakeDesktop {
    fn enumerate_windows(&self) -> Result<Vec<WindowInfo>> {
        if let Some(hooks) = self.gate.lock().unwrap().take() {
            let _ = hooks.entered.send(());
            let _ = hooks.release.recv();
        }
        if *self.fail_enumeration.lock().unwrap() {
            return Err(Error::os("EnumWindows", "access denied"));
        }
        Ok(self.windows.lock().unwrap().clone())
    }
}

impl MonitorQuery for FakeDesktop {
    fn monitor_metrics(&self) -> Result<MonitorMetrics> {
        self.metrics_queries.fetch_add(1, Ordering::SeqCst);
        Ok(self.metrics)
    }
}

impl WindowMover for FakeDesktop {
    fn is_maximized(&self, handle: WindowHandle) -> Result<bool> {
        if *self.fail_state_query.lock().unwrap() {
            return Err(Error::os("GetWindowPlacement", "invalid window handle"));
        }
        self.live(handle)
            .map(|w| w.is_maximized)
            .ok_or_else(|| Error::os("GetWindowPlacement", "no such window"))
    }

    fn set_state(&self, handle: WindowHandle, state: WindowState) -> Result<()> {
        self.update(handle, |w| w.is_maximized = state == WindowState::Maximize);
        self.calls.lock().unwrap().push(match state {
            WindowState::Restore => Call::Restore(handle),
            WindowState::Maximize => Call::Maximize(handle),
        });
        Ok(())
    }

    fn set_position(
        &self,
        handle: WindowHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()> {
        if self.failing_moves.lock().unwrap().contains(&handle) {
            return Err(Error::os("SetWindowPos", "access denied"));
        }
        self.update(handle, |w| w.rect = Rect::new(x, y, x + width, y + height));
        self.calls.lock().unwrap().push(Call::Move {
            handle,
            x,
            y,
            width,
            height,
        });
        Ok(())
    }
}

/// Registrar that keeps registrations in memory and fails on request.
pub(crate) struct FakeRegistrar {
    pub(crate) entries: Vec<(HotkeyAction, KeyCombo, HotkeyCallback)>,
    pub(crate) failing: Option<HotkeyAction>,
    pub(crate) fail_unregister: bool,
    pub(crate) probe_ok: bool,
    /// Key names `validate` rejects.
    pub(crate) unknown_keys: Vec<String>,
    /// Every `register` call, successful or not.
    pub(crate) register_calls: usize,
}

impl Default for FakeRegistrar {
    fn default() -> Self {
        Self {
            entries: Vec::new(),
            failing: None,
            fail_unregister: false,
            probe_ok: true,
            unknown_keys: Vec::new(),
            register_calls: 0,
        }
    }
}

impl FakeRegistrar {
    pub(crate) fn failing_on(action: HotkeyAction) -> Self {
        Self {
            failing: Some(action),
            ..Self::default()
        }
    }

    pub(crate) fn fail_on(&mut self, action: Option<HotkeyAction>) {
        self.failing = action;
    }

    pub(crate) fn registered(&self) -> Vec<HotkeyAction> {
        self.entries.iter().map(|(a, _, _)| *a).collect()
    }

    pub(crate) fn combo_for(&self, action: HotkeyAction) -> Option<KeyCombo> {
        self.entries
            .iter()
            .find(|(a, _, _)| *a == action)
            .map(|(_, c, _)| c.clone())
    }

    /// Simulates the OS delivering a hotkey press.
    pub(crate) fn fire(&self, action: HotkeyAction) -> bool {
        match self.entries.iter().find(|(a, _, _)| *a == action) {
            Some((_, _, callback)) => {
                callback();
                true
            }
            None => false,
        }
    }
}

impl HotkeyRegistrar for FakeRegistrar {
    fn register(
        &mut self,
        action: HotkeyAction,
        combo: &KeyCombo,
        callback: HotkeyCallback,
    ) -> Result<()> {
        self.register_calls += 1;
        self.validate(combo)?;
        if self.failing == Some(action) {
            return Err(Error::Registration {
                action,
                message: "hotkey already registered by another application".into(),
            });
        }
        self.entries.retain(|(a, _, _)| *a != action);
        self.entries.push((action, combo.clone(), callback));
        Ok(())
    }

    fn unregister(&mut self, action: HotkeyAction) -> Result<()> {
        if self.fail_unregister {
            return Err(Error::os("UnregisterHotKey", "hotkey not registered"));
        }
        self.entries.retain(|(a, _, _)| *a != action);
        Ok(())
    }

    fn validate(&self, combo: &KeyCombo) -> Result<()> {
        if self.unknown_keys.contains(&combo.key) {
            return Err(Error::InvalidHotkey {
                spec: combo.to_string(),
                reason: format!("unknown key name {:?}", combo.key),
            });
        }
        Ok(())
    }

    fn probe(&mut self) -> Result<()> {
        if self.probe_ok {
            Ok(())
        } else {
            Err(Error::Disconnected("hotkey thread"))
        }
    }
}

/// Queue of raw keys handed out one per poll.
#[derive(Default)]
pub(crate) struct FakeRawKeys {
    pub(crate) queue: Arc<Mutex<VecDeque<u8>>>,
    pub(crate) disconnected: Arc<Mutex<bool>>,
}

impl RawKeySource for FakeRawKeys {
    fn poll_raw_key(&mut self) -> Result<Option<u8>> {
        if *self.disconnected.lock().unwrap() {
            return Err(Error::Disconnected("raw key source"));
        }
        Ok(self.queue.lock().unwrap().pop_front())
    }
}
