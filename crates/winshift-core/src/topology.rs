//! Two-monitor geometry.
//!
//! The layout is assumed to be horizontal with the primary monitor at
//! `[0, W)` and the secondary monitor on either side of it. Vertical or
//! N-monitor layouts are not handled.

use std::fmt;

use crate::Rect;

/// Desktop metrics as reported by the OS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MonitorMetrics {
    pub primary_width: i32,
    pub primary_height: i32,
    pub virtual_left: i32,
    pub virtual_top: i32,
    pub virtual_width: i32,
    pub virtual_height: i32,
    pub monitor_count: i32,
}

/// Logical placement bucket for a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MonitorGroup {
    /// The primary monitor, at `[0, W)`.
    Primary,
    /// The extended monitor, left or right of the primary one.
    Secondary,
}

impl fmt::Display for MonitorGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Primary => f.write_str("primary"),
            Self::Secondary => f.write_str("secondary"),
        }
    }
}

/// Cached view of the desktop used to locate and place windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonitorTopology {
    primary_width: i32,
    virtual_left: i32,
}

impl MonitorTopology {
    pub fn new(primary_width: i32, virtual_left: i32) -> Self {
        Self {
            primary_width,
            virtual_left,
        }
    }

    pub fn from_metrics(metrics: &MonitorMetrics) -> Self {
        Self::new(metrics.primary_width, metrics.virtual_left)
    }

    /// Returns the group a window currently sits on, judged by the
    /// horizontal center of its rectangle.
    pub fn locate(&self, rect: &Rect) -> MonitorGroup {
        let center_x = rect.center_x();
        if center_x < 0 || center_x >= self.primary_width {
            MonitorGroup::Secondary
        } else {
            MonitorGroup::Primary
        }
    }

    /// Top-left corner a window is moved to when sent to `group`.
    ///
    /// `offset` keeps the window off the very corner of the monitor.
    pub fn origin(&self, group: MonitorGroup, offset: i32) -> (i32, i32) {
        match group {
            MonitorGroup::Secondary => (self.virtual_left + offset, offset),
            MonitorGroup::Primary => (offset, offset),
        }
    }
}
