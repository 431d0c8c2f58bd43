/// Key name to virtual key code mapping.
pub mod keys;

/// Ctrl+C handling via `SetConsoleCtrlHandler`.
#[cfg(windows)]
pub mod ctrl_c;

/// Per-monitor DPI awareness.
#[cfg(windows)]
pub mod dpi;

/// Win32 window enumeration.
#[cfg(windows)]
pub mod enumerate;

/// Global hotkeys and the low-level keyboard hook.
#[cfg(windows)]
pub mod hotkey;

/// Desktop metrics and monitor listing.
#[cfg(windows)]
pub mod monitor;

/// The desktop as seen by the placement engine.
#[cfg(windows)]
pub mod window;

#[cfg(windows)]
pub use hotkey::{Win32Hotkeys, Win32RawKeys};
#[cfg(windows)]
pub use window::Desktop;
