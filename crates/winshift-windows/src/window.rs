use std::mem;

use windows::Win32::Foundation::{HWND, RECT};
use windows::Win32::UI::WindowsAndMessaging::{
    GWL_EXSTYLE, GWL_STYLE, GetWindowLongPtrW, GetWindowPlacement, GetWindowRect,
    GetWindowTextLengthW, GetWindowTextW, HWND_TOP, IsZoomed, RealGetWindowClassW,
    SW_MAXIMIZE, SW_RESTORE, SW_SHOWMAXIMIZED, SWP_SHOWWINDOW, SetWindowPos, ShowWindow,
    WINDOWPLACEMENT, WS_CAPTION, WS_EX_TOOLWINDOW,
};
use winshift_core::platform::{MonitorQuery, WindowEnumerator, WindowMover, WindowState};
use winshift_core::{Error, MonitorMetrics, Result, WindowHandle, WindowInfo};

use crate::{enumerate, monitor};

/// The live Win32 desktop.
///
/// Holds no state: every call goes straight to the OS, so the same
/// value can be shared between the hotkey workers and the CLI.
#[derive(Debug, Default, Clone, Copy)]
pub struct Desktop;

impl WindowEnumerator for Desktop {
    fn enumerate_windows(&self) -> Result<Vec<WindowInfo>> {
        enumerate::enumerate_windows()
    }
}

impl MonitorQuery for Desktop {
    fn monitor_metrics(&self) -> Result<MonitorMetrics> {
        monitor::metrics()
    }
}

impl WindowMover for Desktop {
    fn is_maximized(&self, handle: WindowHandle) -> Result<bool> {
        let mut placement = WINDOWPLACEMENT {
            length: mem::size_of::<WINDOWPLACEMENT>() as u32,
            ..Default::default()
        };

        // SAFETY: `length` is set as the API requires.
        unsafe { GetWindowPlacement(hwnd(handle), &mut placement) }
            .map_err(|e| Error::os("GetWindowPlacement", e.message()))?;

        Ok(placement.showCmd == SW_SHOWMAXIMIZED.0 as u32)
    }

    fn set_state(&self, handle: WindowHandle, state: WindowState) -> Result<()> {
        let cmd = match state {
            WindowState::Restore => SW_RESTORE,
            WindowState::Maximize => SW_MAXIMIZE,
        };

        // SAFETY: The return value is the previous visibility, not an
        // error indicator, so it is ignored.
        unsafe {
            let _ = ShowWindow(hwnd(handle), cmd);
        }
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
        // SAFETY: A stale handle makes SetWindowPos fail, it does not
        // touch another window.
        unsafe {
            SetWindowPos(
                hwnd(handle),
                Some(HWND_TOP),
                x,
                y,
                width,
                height,
                SWP_SHOWWINDOW,
            )
        }
        .map_err(|e| Error::os("SetWindowPos", e.message()))
    }
}

pub(crate) fn hwnd(handle: WindowHandle) -> HWND {
    HWND(handle.0 as *mut _)
}

/// Captures title, class, bounds and maximized state in one go.
pub(crate) fn snapshot(hwnd: HWND) -> Result<WindowInfo> {
    let mut rect = RECT::default();

    // SAFETY: GetWindowRect writes into a RECT we own.
    unsafe { GetWindowRect(hwnd, &mut rect) }
        .map_err(|e| Error::os("GetWindowRect", e.message()))?;

    Ok(WindowInfo {
        title: title(hwnd),
        class_name: class_name(hwnd),
        handle: WindowHandle(hwnd.0 as usize),
        rect: monitor::to_rect(&rect),
        // SAFETY: Read-only query.
        is_maximized: unsafe { IsZoomed(hwnd) }.as_bool(),
    })
}

pub(crate) fn title(hwnd: HWND) -> String {
    // SAFETY: GetWindowTextLengthW and GetWindowTextW read window text
    // without modifying state.
    unsafe {
        let length = GetWindowTextLengthW(hwnd);
        if length == 0 {
            return String::new();
        }

        // +1 for the null terminator that Windows requires
        let mut buffer = vec![0u16; (length + 1) as usize];
        let copied = GetWindowTextW(hwnd, &mut buffer);
        String::from_utf16_lossy(&buffer[..copied as usize])
    }
}

fn class_name(hwnd: HWND) -> String {
    // SAFETY: 256 is the maximum class name length in Win32.
    unsafe {
        let mut buffer = [0u16; 256];
        let length = RealGetWindowClassW(hwnd, &mut buffer);
        String::from_utf16_lossy(&buffer[..length as usize])
    }
}

/// Returns whether this looks like a real application window.
///
/// Requires a caption bar (`WS_CAPTION`) and rejects tool windows
/// (`WS_EX_TOOLWINDOW`), which drops tooltips, floating toolbars and
/// other helper surfaces.
pub(crate) fn is_app_window(hwnd: HWND) -> bool {
    // SAFETY: Style reads have no side effects.
    unsafe {
        let style = GetWindowLongPtrW(hwnd, GWL_STYLE) as u32;
        let ex_style = GetWindowLongPtrW(hwnd, GWL_EXSTYLE) as u32;

        let has_caption = (style & WS_CAPTION.0) == WS_CAPTION.0;
        let is_tool = (ex_style & WS_EX_TOOLWINDOW.0) == WS_EX_TOOLWINDOW.0;

        has_caption && !is_tool
    }
}
