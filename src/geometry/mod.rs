mod resolve;

pub use resolve::*;

use bitflags::bitflags;

/// Absolute 2D vector in screen units.
pub type AbsVec = glam::Vec2;

/// Integer vector, used for DPI.
pub type IntVec = glam::IVec2;

/// One axis value: a fraction of the parent span plus an absolute offset.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coord {
    pub rel: f32,
    pub abs: f32,
}

impl Coord {
    pub const ZERO: Self = Self::new(0.0, 0.0);

    pub const fn new(rel: f32, abs: f32) -> Self {
        Self { rel, abs }
    }

    pub const fn abs(abs: f32) -> Self {
        Self { rel: 0.0, abs }
    }

    pub const fn rel(rel: f32) -> Self {
        Self { rel, abs: 0.0 }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CVec {
    pub x: Coord,
    pub y: Coord,
}

impl CVec {
    pub const ZERO: Self = Self {
        x: Coord::ZERO,
        y: Coord::ZERO,
    };

    pub const fn new(x: Coord, y: Coord) -> Self {
        Self { x, y }
    }
}

/// Four independent relative+absolute edges.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CRect {
    pub left: Coord,
    pub top: Coord,
    pub right: Coord,
    pub bottom: Coord,
}

impl CRect {
    pub const fn new(left: Coord, top: Coord, right: Coord, bottom: Coord) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Purely absolute rectangle.
    pub const fn from_abs(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self::new(
            Coord::abs(left),
            Coord::abs(top),
            Coord::abs(right),
            Coord::abs(bottom),
        )
    }

    /// Spans the whole parent.
    pub const fn fill() -> Self {
        Self::new(Coord::ZERO, Coord::ZERO, Coord::rel(1.0), Coord::rel(1.0))
    }

    /// Which axes moved or resized between `self` and `other`. Empty iff equal.
    pub fn diff(&self, other: &CRect) -> MoveFlags {
        let mut diff = MoveFlags::empty();
        if self.left != other.left {
            diff |= MoveFlags::MOVE_X;
        }
        if self.top != other.top {
            diff |= MoveFlags::MOVE_Y;
        }
        if span(self.left, self.right) != span(other.left, other.right)
            || (self.right != other.right && self.left == other.left)
        {
            diff |= MoveFlags::RESIZE_X;
        }
        if span(self.top, self.bottom) != span(other.top, other.bottom)
            || (self.bottom != other.bottom && self.top == other.top)
        {
            diff |= MoveFlags::RESIZE_Y;
        }
        diff
    }

    /// Axes on which a resize of the parent would move or resize an element
    /// with this area.
    pub fn potential_resize(&self) -> MoveFlags {
        let mut flags = MoveFlags::empty();
        if self.left.rel != 0.0 || self.right.rel != 0.0 {
            flags |= MoveFlags::MOVE_X;
        }
        if self.top.rel != 0.0 || self.bottom.rel != 0.0 {
            flags |= MoveFlags::MOVE_Y;
        }
        if self.left.rel != self.right.rel {
            flags |= MoveFlags::RESIZE_X;
        }
        if self.top.rel != self.bottom.rel {
            flags |= MoveFlags::RESIZE_Y;
        }
        flags
    }

    /// Shifts the absolute part so the top-left lands on `(x, y)`, keeping its span.
    pub fn move_to(&mut self, x: f32, y: f32) {
        let dx = self.right.abs - self.left.abs;
        let dy = self.bottom.abs - self.top.abs;
        self.left.abs = x;
        self.top.abs = y;
        self.right.abs = x + dx;
        self.bottom.abs = y + dy;
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct AbsRect {
    pub left: f32,
    pub top: f32,
    pub right: f32,
    pub bottom: f32,
}

impl AbsRect {
    pub const ZERO: Self = Self::new(0.0, 0.0, 0.0, 0.0);
    pub const INFINITE: Self = Self::new(
        f32::NEG_INFINITY,
        f32::NEG_INFINITY,
        f32::INFINITY,
        f32::INFINITY,
    );

    pub const fn new(left: f32, top: f32, right: f32, bottom: f32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }

    pub fn top_left(&self) -> AbsVec {
        AbsVec::new(self.left, self.top)
    }

    /// Half-open hit test: left/top edges inclusive, right/bottom exclusive.
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }

    pub fn intersects(&self, other: &AbsRect) -> bool {
        self.left <= other.right
            && self.top <= other.bottom
            && self.right >= other.left
            && self.bottom >= other.top
    }

    pub fn intersection(&self, other: &AbsRect) -> AbsRect {
        AbsRect::new(
            self.left.max(other.left),
            self.top.max(other.top),
            self.right.min(other.right),
            self.bottom.min(other.bottom),
        )
    }

    pub fn union(&self, other: &AbsRect) -> AbsRect {
        AbsRect::new(
            self.left.min(other.left),
            self.top.min(other.top),
            self.right.max(other.right),
            self.bottom.max(other.bottom),
        )
    }

    /// Shrinks every edge inward by the matching edge of `inset`.
    pub fn inset(&self, inset: &AbsRect) -> AbsRect {
        AbsRect::new(
            self.left + inset.left,
            self.top + inset.top,
            self.right - inset.right,
            self.bottom - inset.bottom,
        )
    }

    pub fn translate(&self, dx: f32, dy: f32) -> AbsRect {
        AbsRect::new(
            self.left + dx,
            self.top + dy,
            self.right + dx,
            self.bottom + dy,
        )
    }

    pub fn is_nan(&self) -> bool {
        self.left.is_nan() || self.top.is_nan() || self.right.is_nan() || self.bottom.is_nan()
    }

    /// Edge diff used by margin and padding setters. Empty iff equal.
    pub fn diff(&self, other: &AbsRect) -> MoveFlags {
        let mut diff = MoveFlags::empty();
        if self.left != other.left {
            diff |= MoveFlags::MOVE_X;
        }
        if self.top != other.top {
            diff |= MoveFlags::MOVE_Y;
        }
        if self.left != other.left || self.right != other.right {
            diff |= MoveFlags::RESIZE_X;
        }
        if self.top != other.top || self.bottom != other.bottom {
            diff |= MoveFlags::RESIZE_Y;
        }
        diff
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Transform {
    pub area: CRect,
    pub center: CVec,
    pub rotation: f32,
}

impl Transform {
    pub const fn new(area: CRect) -> Self {
        Self {
            area,
            center: CVec::ZERO,
            rotation: 0.0,
        }
    }

    /// Center and rotation diff, ignoring the area.
    pub fn pivot_diff(&self, other: &Transform) -> MoveFlags {
        let mut diff = MoveFlags::empty();
        if self.center.x != other.center.x {
            diff |= MoveFlags::CENTER_X;
        }
        if self.center.y != other.center.y {
            diff |= MoveFlags::CENTER_Y;
        }
        if self.rotation != other.rotation {
            diff |= MoveFlags::ROTATION;
        }
        diff
    }
}

impl From<CRect> for Transform {
    fn from(area: CRect) -> Self {
        Self::new(area)
    }
}

bitflags! {
    /// Which parts of an element's layout changed; carried by `Move`.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct MoveFlags: u16 {
        const RESIZE_X = 1 << 1;
        const RESIZE_Y = 1 << 2;
        const MOVE_X = 1 << 3;
        const MOVE_Y = 1 << 4;
        const CENTER_X = 1 << 5;
        const CENTER_Y = 1 << 6;
        const ROTATION = 1 << 7;
        const PADDING = 1 << 8;
        const MARGIN = 1 << 9;
        /// Set while a child's move is bubbling up to its parent.
        const PROPAGATE = 1 << 10;

        const RESIZE = Self::RESIZE_X.bits() | Self::RESIZE_Y.bits();
        const MOVE = Self::MOVE_X.bits() | Self::MOVE_Y.bits();
    }
}

#[inline]
pub fn lerp(a: f32, b: f32, t: f32) -> f32 {
    a + (b - a) * t
}

fn span(start: Coord, end: Coord) -> (f32, f32) {
    (end.rel - start.rel, end.abs - start.abs)
}
