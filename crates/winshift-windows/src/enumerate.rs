use windows::Win32::Foundation::{HWND, LPARAM};
use windows::Win32::UI::WindowsAndMessaging::{EnumWindows, IsIconic, IsWindowVisible};
use windows::core::BOOL;
use winshift_core::{Error, Result, WindowInfo};

use crate::window;

/// Enumerates visible, titled, non-minimized application windows.
///
/// A window that disappears between `EnumWindows` and the snapshot is
/// skipped rather than failing the whole listing.
pub fn enumerate_windows() -> Result<Vec<WindowInfo>> {
    let mut handles: Vec<HWND> = Vec::new();

    // SAFETY: EnumWindows runs synchronously, so the Vec passed through
    // LPARAM outlives every callback.
    unsafe {
        EnumWindows(
            Some(enum_window_callback),
            LPARAM(&mut handles as *mut _ as isize),
        )
    }
    .map_err(|e| Error::os("EnumWindows", e.message()))?;

    let windows = handles
        .into_iter()
        .filter_map(|hwnd| match window::snapshot(hwnd) {
            Ok(info) => Some(info),
            Err(e) => {
                winshift_core::log_debug!("Skipping window 0x{:X}: {e}", hwnd.0 as usize);
                None
            }
        })
        .collect();

    Ok(windows)
}

/// Callback invoked by `EnumWindows` for each top-level window.
///
/// Returns `TRUE` to continue enumeration.
unsafe extern "system" fn enum_window_callback(hwnd: HWND, lparam: LPARAM) -> BOOL {
    // SAFETY: lparam is the Vec pointer from enumerate_windows().
    let handles = unsafe { &mut *(lparam.0 as *mut Vec<HWND>) };

    if should_include_window(hwnd) {
        handles.push(hwnd);
    }

    BOOL(1)
}

fn should_include_window(hwnd: HWND) -> bool {
    // SAFETY: These are simple query functions that read window state.
    unsafe {
        if !IsWindowVisible(hwnd).as_bool() {
            return false;
        }
        if IsIconic(hwnd).as_bool() {
            return false;
        }
    }

    !window::title(hwnd).is_empty() && window::is_app_window(hwnd)
}
