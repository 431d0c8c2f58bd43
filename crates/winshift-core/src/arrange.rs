//! One arrangement pass over all visible windows.

use std::sync::Mutex;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use crate::Result;
use crate::classify::classify;
use crate::config::Config;
use crate::placer::{Placement, WindowPlacer};
use crate::platform::{MonitorQuery, WindowEnumerator, WindowMover};
use crate::topology::{MonitorGroup, MonitorTopology};
use crate::window::WindowInfo;

/// Counts from a completed pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ArrangeReport {
    pub already_placed: usize,
    pub moved: usize,
    pub failed: usize,
}

/// Result of [`Arranger::arrange`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassOutcome {
    Completed(ArrangeReport),
    /// Another pass was in flight; this one did nothing.
    AlreadyRunning,
}

/// Runs arrangement passes against a desktop.
///
/// Passes may be requested from several threads at once (hotkey
/// callbacks and the recovery self-test). Only one runs at a time;
/// concurrent requests return [`PassOutcome::AlreadyRunning`].
pub struct Arranger<D> {
    desktop: D,
    topology: Mutex<Option<MonitorTopology>>,
    in_flight: AtomicBool,
}

/// Clears the in-flight flag when the pass ends, even on early return.
struct FlightGuard<'a>(&'a AtomicBool);

impl Drop for FlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl<D> Arranger<D>
where
    D: WindowEnumerator + MonitorQuery + WindowMover,
{
    pub fn new(desktop: D) -> Self {
        Self {
            desktop,
            topology: Mutex::new(None),
            in_flight: AtomicBool::new(false),
        }
    }

    pub fn desktop(&self) -> &D {
        &self.desktop
    }

    /// Returns the cached topology, querying the OS on first use.
    pub fn topology(&self) -> Result<MonitorTopology> {
        let mut cached = self
            .topology
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(topology) = *cached {
            return Ok(topology);
        }

        let metrics = self.desktop.monitor_metrics()?;
        crate::log_info!(
            "Primary monitor {}x{}, virtual screen starts at x={}, {} monitors",
            metrics.primary_width,
            metrics.primary_height,
            metrics.virtual_left,
            metrics.monitor_count
        );
        let topology = MonitorTopology::from_metrics(&metrics);
        *cached = Some(topology);
        Ok(topology)
    }

    /// Moves every visible window to the monitor its config patterns
    /// select.
    ///
    /// Windows bound for the secondary monitor go first. A window that
    /// fails to move is counted and skipped.
    pub fn arrange(&self, config: &Config) -> Result<PassOutcome> {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .is_err()
        {
            crate::log_info!("Arrangement already in progress, ignoring request");
            return Ok(PassOutcome::AlreadyRunning);
        }
        let _guard = FlightGuard(&self.in_flight);

        crate::log_info!("Starting window arrangement");
        let topology = self.topology()?;
        let windows = self.desktop.enumerate_windows()?;
        if windows.is_empty() {
            crate::log_warn!("No visible windows found");
            return Ok(PassOutcome::Completed(ArrangeReport::default()));
        }
        crate::log_info!("Found {} visible windows", windows.len());

        let (secondary, primary) = partition(windows, config);
        crate::log_info!(
            "{} windows target the secondary monitor, {} the primary",
            secondary.len(),
            primary.len()
        );

        let placer = WindowPlacer::new(&self.desktop, topology, config.placement_policy());
        let mut report = ArrangeReport::default();
        let queue = secondary
            .iter()
            .map(|w| (w, MonitorGroup::Secondary))
            .chain(primary.iter().map(|w| (w, MonitorGroup::Primary)));

        for (window, target) in queue {
            match placer.place(window, target) {
                Ok(Placement::AlreadyPlaced) => report.already_placed += 1,
                Ok(Placement::Moved { .. }) => report.moved += 1,
                Err(e) => {
                    crate::log_error!("Failed to move '{}': {e}", window.title);
                    report.failed += 1;
                }
            }
            thread::sleep(config.window_delay());
        }

        crate::log_info!(
            "Window arrangement completed: {} moved, {} already placed, {} failed",
            report.moved,
            report.already_placed,
            report.failed
        );
        Ok(PassOutcome::Completed(report))
    }
}

/// Splits windows into (secondary, primary) targets, keeping the
/// enumeration order inside each group.
fn partition(windows: Vec<WindowInfo>, config: &Config) -> (Vec<WindowInfo>, Vec<WindowInfo>) {
    windows.into_iter().partition(|w| {
        let class = classify(w, config);
        crate::log_debug!(
            "'{}' ({}) -> {} via {:?}",
            w.title,
            w.class_name,
            class.group,
            class.pattern
        );
        class.group == MonitorGroup::Secondary
    })
}
