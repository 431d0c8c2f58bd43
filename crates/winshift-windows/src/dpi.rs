use windows::Win32::UI::HiDpi::{
    DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2, SetProcessDpiAwarenessContext,
};

/// Declares this process as per-monitor DPI aware (V2).
///
/// Without this, Windows scales the coordinates we read and write by
/// the primary monitor's DPI, and the center-x test misjudges windows
/// on a monitor with a different scale.
///
/// Must be called once at startup, before any metrics are read.
pub fn enable_dpi_awareness() {
    // SAFETY: If it fails (e.g. already set via manifest), we ignore the error.
    unsafe {
        let _ = SetProcessDpiAwarenessContext(DPI_AWARENESS_CONTEXT_PER_MONITOR_AWARE_V2);
    }
}
