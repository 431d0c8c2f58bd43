//! Ctrl+C handler using `SetConsoleCtrlHandler`.

use std::sync::{Arc, OnceLock};

use windows::Win32::System::Console::{CTRL_BREAK_EVENT, CTRL_C_EVENT, SetConsoleCtrlHandler};
use winshift_core::{AppContext, Error, Result};

/// Context written once by `set_handler`, read by the callback.
static CONTEXT: OnceLock<Arc<AppContext>> = OnceLock::new();

/// Requests a clean exit on Ctrl+C or Ctrl+Break.
///
/// The loop notices the flag on its next tick and releases the hotkeys
/// before the process ends.
pub fn set_handler(ctx: Arc<AppContext>) -> Result<()> {
    CONTEXT
        .set(ctx)
        .map_err(|_| Error::os("SetConsoleCtrlHandler", "handler already registered"))?;

    // SAFETY: `handler` is a plain extern fn that only touches a static.
    unsafe { SetConsoleCtrlHandler(Some(handler), true) }
        .map_err(|e| Error::os("SetConsoleCtrlHandler", e.message()))
}

unsafe extern "system" fn handler(ctrl_type: u32) -> windows::core::BOOL {
    if (ctrl_type == CTRL_C_EVENT || ctrl_type == CTRL_BREAK_EVENT)
        && let Some(ctx) = CONTEXT.get()
    {
        ctx.request_exit();
        return windows::core::BOOL(1);
    }
    windows::core::BOOL(0)
}
