/// A window's bounding rectangle in screen coordinates.
///
/// Stored as edges (`left`, `top`, `right`, `bottom`) because that is
/// what `GetWindowRect` reports. `right` and `bottom` are exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Horizontal center, rounded toward negative infinity.
    ///
    /// Floor division keeps a window straddling x = 0 by one pixel on
    /// the negative side, which matters for the monitor threshold.
    pub fn center_x(&self) -> i32 {
        (self.left + self.right).div_euclid(2)
    }
}
