//! Pixel-space geometry primitives shared across the engine

/// Axis-aligned rectangle in pixel coordinates.
///
/// Used both for absolute (viewport) measurements coming from the layout
/// probe and for page-relative boxes stored in caches. Which frame a value
/// is in is a property of where it came from, not of the type.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct RectPx {
    /// Left edge X coordinate
    pub left: f32,
    /// Top edge Y coordinate
    pub top: f32,
    /// Width in pixels
    pub width: f32,
    /// Height in pixels
    pub height: f32,
}

impl RectPx {
    #[must_use]
    pub const fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    /// Right edge X coordinate
    #[must_use]
    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    /// Bottom edge Y coordinate
    #[must_use]
    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }

    /// Whether the rectangle has no area. Zero-size rectangles are legal
    /// inputs everywhere (degenerate geometry degrades to degenerate boxes).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    /// Whether a Y coordinate falls within [top, bottom].
    #[must_use]
    pub fn contains_y(&self, y: f32) -> bool {
        y >= self.top && y <= self.bottom()
    }

    /// Whether a point falls within the rectangle.
    #[must_use]
    pub fn contains(&self, x: f32, y: f32) -> bool {
        x >= self.left && x <= self.right() && self.contains_y(y)
    }

    /// Re-express this rectangle relative to `origin`'s top-left corner.
    #[must_use]
    pub fn relative_to(&self, origin: &RectPx) -> RectPx {
        RectPx {
            left: self.left - origin.left,
            top: self.top - origin.top,
            width: self.width,
            height: self.height,
        }
    }
}

/// Edge-form bounding rectangle, the union of a set of [`RectPx`] values.
///
/// Derived on demand for tooltip placement and never stored.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BoundingBox {
    pub top: f32,
    pub left: f32,
    pub right: f32,
    pub bottom: f32,
}

impl BoundingBox {
    /// Fold a sequence of rectangles into their common bound.
    /// Returns `None` for an empty sequence.
    pub fn enclosing<I>(rects: I) -> Option<Self>
    where
        I: IntoIterator<Item = RectPx>,
    {
        let mut iter = rects.into_iter();
        let first = iter.next()?;
        let mut bound = Self {
            top: first.top,
            left: first.left,
            right: first.right(),
            bottom: first.bottom(),
        };

        for rect in iter {
            bound.top = bound.top.min(rect.top);
            bound.left = bound.left.min(rect.left);
            bound.right = bound.right.max(rect.right());
            bound.bottom = bound.bottom.max(rect.bottom());
        }

        Some(bound)
    }

    #[must_use]
    pub fn width(&self) -> f32 {
        self.right - self.left
    }

    #[must_use]
    pub fn height(&self) -> f32 {
        self.bottom - self.top
    }
}
