// SPDX-License-Identifier: Parity-7.0.0 OR PolyForm-Noncommercial-1.0.0
//! Small geometric primitives.

/// A width and height in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Extent2D {
    pub width: u32,
    pub height: u32,
}

impl Extent2D {
    pub const fn new(width: u32, height: u32) -> Self {
        Extent2D { width, height }
    }

    /// True when both dimensions are within `[min, max]`.
    pub const fn within(self, min: Extent2D, max: Extent2D) -> bool {
        self.width >= min.width
            && self.height >= min.height
            && self.width <= max.width
            && self.height <= max.height
    }
}

/// A signed 2D offset in texels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Offset2D {
    pub x: i32,
    pub y: i32,
}

impl Offset2D {
    pub const fn new(x: i32, y: i32) -> Self {
        Offset2D { x, y }
    }
}
