use crate::Rect;

/// Opaque OS window reference.
///
/// On Windows this is the `HWND` value. The core never dereferences it,
/// it only hands it back to the platform's [`WindowMover`](crate::platform::WindowMover).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WindowHandle(pub usize);

/// A snapshot of one top-level window.
///
/// Fetched fresh for every arrangement pass and dropped afterwards.
/// Nothing here is kept in sync with the live window.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowInfo {
    pub title: String,
    pub class_name: String,
    pub handle: WindowHandle,
    pub rect: Rect,
    /// Whether the window was maximized when the snapshot was taken.
    pub is_maximized: bool,
}

impl WindowInfo {
    /// Returns `true` if `needle` occurs in the title or the class name,
    /// ignoring ASCII case.
    pub fn mentions(&self, needle: &str) -> bool {
        let needle = needle.to_ascii_lowercase();
        self.title.to_ascii_lowercase().contains(&needle)
            || self.class_name.to_ascii_lowercase().contains(&needle)
    }
}
