//! Moves a single window to its target monitor.

use std::thread;
use std::time::Duration;

use crate::Result;
use crate::platform::{WindowMover, WindowState};
use crate::topology::{MonitorGroup, MonitorTopology};
use crate::window::WindowInfo;

/// Tunables for a placement.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlacementPolicy {
    /// Distance in pixels from the monitor's top-left corner.
    pub offset: i32,
    /// Wait after restoring a maximized window before moving it.
    pub restore_settle: Duration,
    /// Wait after moving before maximizing again.
    pub maximize_settle: Duration,
}

impl Default for PlacementPolicy {
    fn default() -> Self {
        Self {
            offset: 100,
            restore_settle: Duration::from_millis(100),
            maximize_settle: Duration::from_millis(200),
        }
    }
}

/// What [`WindowPlacer::place`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Placement {
    /// The window was already on the target monitor; nothing changed.
    AlreadyPlaced,
    /// The window was moved to `(x, y)`, and maximized again if it was
    /// maximized before.
    Moved { x: i32, y: i32, remaximized: bool },
}

/// Runs the restore → move → maximize sequence for one window.
pub struct WindowPlacer<'a, M> {
    mover: &'a M,
    topology: MonitorTopology,
    policy: PlacementPolicy,
}

impl<'a, M: WindowMover> WindowPlacer<'a, M> {
    pub fn new(mover: &'a M, topology: MonitorTopology, policy: PlacementPolicy) -> Self {
        Self {
            mover,
            topology,
            policy,
        }
    }

    /// Sends `window` to `target`.
    ///
    /// A window already on `target` is left untouched. Otherwise a
    /// maximized window is restored, moved with its size preserved, and
    /// maximized again. The first failing OS call aborts the remaining
    /// steps; earlier steps are not rolled back.
    pub fn place(&self, window: &WindowInfo, target: MonitorGroup) -> Result<Placement> {
        let current = self.topology.locate(&window.rect);
        if current == target {
            crate::log_info!(
                "'{}' is already on the {target} monitor, skipping",
                window.title
            );
            return Ok(Placement::AlreadyPlaced);
        }

        let was_maximized = self.restore_if_maximized(window)?;

        let (x, y) = self.topology.origin(target, self.policy.offset);
        let (width, height) = (window.rect.width(), window.rect.height());
        self.mover.set_position(window.handle, x, y, width, height)?;

        if was_maximized {
            thread::sleep(self.policy.maximize_settle);
            crate::log_info!("Re-maximizing '{}'", window.title);
            self.mover.set_state(window.handle, WindowState::Maximize)?;
        }

        crate::log_info!(
            "Moved '{}' from the {current} to the {target} monitor at ({x}, {y})",
            window.title
        );
        Ok(Placement::Moved {
            x,
            y,
            remaximized: was_maximized,
        })
    }

    /// Restores the window if the placement query says it is maximized.
    ///
    /// A failed query is treated as "not maximized".
    fn restore_if_maximized(&self, window: &WindowInfo) -> Result<bool> {
        let maximized = match self.mover.is_maximized(window.handle) {
            Ok(m) => m,
            Err(e) => {
                crate::log_warn!("Failed to read window state of '{}': {e}", window.title);
                return Ok(false);
            }
        };

        if maximized {
            crate::log_info!("'{}' is maximized, restoring first", window.title);
            self.mover.set_state(window.handle, WindowState::Restore)?;
            thread::sleep(self.policy.restore_settle);
        }
        Ok(maximized)
    }
}
