pub mod arrange;
pub mod classify;
pub mod config;
pub mod context;
pub mod driver;
pub mod error;
pub mod hotkey;
pub mod log;
pub mod placer;
pub mod platform;
pub mod recovery;
pub mod rect;
pub mod topology;
pub mod window;

#[cfg(test)]
pub(crate) mod testing;

pub use arrange::{ArrangeReport, Arranger, PassOutcome};
pub use config::Config;
pub use context::AppContext;
pub use driver::ArrangementLoop;
pub use error::{Error, Result};
pub use hotkey::{HotkeyAction, HotkeyLifecycleManager, KeyCombo, Modifier};
pub use rect::Rect;
pub use topology::{MonitorGroup, MonitorMetrics, MonitorTopology};
pub use window::{WindowHandle, WindowInfo};
