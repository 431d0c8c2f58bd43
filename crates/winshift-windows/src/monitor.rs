use std::mem;

use windows::Win32::Foundation::{LPARAM, RECT};
use windows::Win32::Graphics::Gdi::{
    EnumDisplayMonitors, GetMonitorInfoW, HDC, HMONITOR, MONITORINFO, MONITORINFOEXW,
};
use windows::Win32::UI::WindowsAndMessaging::{
    GetSystemMetrics, SM_CMONITORS, SM_CXSCREEN, SM_CXVIRTUALSCREEN, SM_CYSCREEN,
    SM_CYVIRTUALSCREEN, SM_XVIRTUALSCREEN, SM_YVIRTUALSCREEN,
};
use windows::core::BOOL;
use winshift_core::{Error, MonitorMetrics, Rect, Result};

/// `dwFlags` bit set on the primary display.
const MONITORINFOF_PRIMARY: u32 = 0x1;

/// One physical display, as listed by `winshift monitors`.
#[derive(Debug, Clone)]
pub struct MonitorInfo {
    pub device: String,
    pub bounds: Rect,
    /// Bounds minus the taskbar and docked toolbars.
    pub work_area: Rect,
    pub is_primary: bool,
}

/// Reads the primary and virtual screen metrics.
pub fn metrics() -> Result<MonitorMetrics> {
    // SAFETY: GetSystemMetrics only reads system configuration.
    let metrics = unsafe {
        MonitorMetrics {
            primary_width: GetSystemMetrics(SM_CXSCREEN),
            primary_height: GetSystemMetrics(SM_CYSCREEN),
            virtual_left: GetSystemMetrics(SM_XVIRTUALSCREEN),
            virtual_top: GetSystemMetrics(SM_YVIRTUALSCREEN),
            virtual_width: GetSystemMetrics(SM_CXVIRTUALSCREEN),
            virtual_height: GetSystemMetrics(SM_CYVIRTUALSCREEN),
            monitor_count: GetSystemMetrics(SM_CMONITORS),
        }
    };

    // GetSystemMetrics reports failure as 0.
    if metrics.primary_width <= 0 {
        return Err(Error::os("GetSystemMetrics", "primary screen width is 0"));
    }
    Ok(metrics)
}

/// Lists every attached display in enumeration order.
pub fn enumerate_monitors() -> Result<Vec<MonitorInfo>> {
    let mut monitors: Vec<MonitorInfo> = Vec::new();

    // SAFETY: EnumDisplayMonitors runs synchronously, so the Vec passed
    // through LPARAM outlives every callback.
    let ok = unsafe {
        EnumDisplayMonitors(
            None,
            None,
            Some(enum_monitor_callback),
            LPARAM(&mut monitors as *mut _ as isize),
        )
    };

    if !ok.as_bool() {
        return Err(Error::os("EnumDisplayMonitors", "enumeration aborted"));
    }
    Ok(monitors)
}

unsafe extern "system" fn enum_monitor_callback(
    monitor: HMONITOR,
    _hdc: HDC,
    _clip: *mut RECT,
    lparam: LPARAM,
) -> BOOL {
    // SAFETY: lparam is the Vec pointer from enumerate_monitors().
    let monitors = unsafe { &mut *(lparam.0 as *mut Vec<MonitorInfo>) };

    let mut info = MONITORINFOEXW::default();
    info.monitorInfo.cbSize = mem::size_of::<MONITORINFOEXW>() as u32;

    // SAFETY: cbSize tells the API the struct is the extended variant.
    let ok = unsafe {
        GetMonitorInfoW(
            monitor,
            &mut info as *mut MONITORINFOEXW as *mut MONITORINFO,
        )
    };
    if ok.as_bool() {
        let len = info
            .szDevice
            .iter()
            .position(|&c| c == 0)
            .unwrap_or(info.szDevice.len());
        monitors.push(MonitorInfo {
            device: String::from_utf16_lossy(&info.szDevice[..len]),
            bounds: to_rect(&info.monitorInfo.rcMonitor),
            work_area: to_rect(&info.monitorInfo.rcWork),
            is_primary: info.monitorInfo.dwFlags & MONITORINFOF_PRIMARY != 0,
        });
    }

    BOOL(1)
}

pub(crate) fn to_rect(rc: &RECT) -> Rect {
    Rect::new(rc.left, rc.top, rc.right, rc.bottom)
}
