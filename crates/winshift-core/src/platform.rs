//! Capability traits the engine consumes.
//!
//! Each platform crate (e.g. `winshift-windows`) provides its own
//! implementations. Tests substitute the fakes in `crate::testing`.

use std::sync::Arc;

use crate::Result;
use crate::hotkey::{HotkeyAction, KeyCombo};
use crate::topology::MonitorMetrics;
use crate::window::{WindowHandle, WindowInfo};

/// Callback invoked when a registered hotkey fires.
///
/// Runs on the platform's hotkey context, concurrently with the
/// polling loop.
pub type HotkeyCallback = Arc<dyn Fn() + Send + Sync>;

/// Show-state commands understood by [`WindowMover::set_state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowState {
    Restore,
    Maximize,
}

/// Lists the windows an arrangement pass should consider.
pub trait WindowEnumerator {
    /// Returns a snapshot of visible top-level application windows.
    fn enumerate_windows(&self) -> Result<Vec<WindowInfo>>;
}

/// Reads the desktop geometry.
pub trait MonitorQuery {
    fn monitor_metrics(&self) -> Result<MonitorMetrics>;
}

/// Mutates window placement.
pub trait WindowMover {
    /// Queries the window placement and reports whether it is maximized.
    fn is_maximized(&self, handle: WindowHandle) -> Result<bool>;

    /// Restores or maximizes the window.
    fn set_state(&self, handle: WindowHandle, state: WindowState) -> Result<()>;

    /// Moves the window to `(x, y)` with the given size, raising it to
    /// the top of the z-order and making it visible.
    fn set_position(
        &self,
        handle: WindowHandle,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
    ) -> Result<()>;
}

/// Registers global hotkeys with the OS.
pub trait HotkeyRegistrar {
    fn register(
        &mut self,
        action: HotkeyAction,
        combo: &KeyCombo,
        callback: HotkeyCallback,
    ) -> Result<()>;

    fn unregister(&mut self, action: HotkeyAction) -> Result<()>;

    /// Checks that `combo` maps to a key this registrar can bind,
    /// without registering anything.
    fn validate(&self, combo: &KeyCombo) -> Result<()>;

    /// Lightweight liveness check of the hotkey subsystem. Must not
    /// change any registration.
    fn probe(&mut self) -> Result<()>;
}

/// Source of raw key-down events, independent of hotkey registration.
pub trait RawKeySource {
    /// Returns the next pending virtual key code, if any. Never blocks.
    fn poll_raw_key(&mut self) -> Result<Option<u8>>;
}
