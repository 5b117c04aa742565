use serde::{Deserialize, Serialize};

/// Point in page-local pixel space. Serialized as an `[x, y]` pair.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn offset(self, dx: f32, dy: f32) -> Self {
        Self { x: self.x + dx, y: self.y + dy }
    }

    /// Component-wise difference `self - origin`.
    pub fn delta_from(self, origin: Point) -> (f32, f32) {
        (self.x - origin.x, self.y - origin.y)
    }

    pub fn distance_to(self, other: Point) -> f32 {
        (self.x - other.x).hypot(self.y - other.y)
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

impl From<[f32; 2]> for Point {
    fn from([x, y]: [f32; 2]) -> Self {
        Self { x, y }
    }
}

impl From<Point> for [f32; 2] {
    fn from(point: Point) -> Self {
        [point.x, point.y]
    }
}

/// Axis-aligned box, `x,y` is the top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self { x, y, w, h }
    }

    /// Normalized box spanned by two arbitrary corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        Self { x: a.x.min(b.x), y: a.y.min(b.y), w: (b.x - a.x).abs(), h: (b.y - a.y).abs() }
    }

    /// Smallest box containing every point, `None` for an empty slice.
    pub fn bounding(points: &[Point]) -> Option<Self> {
        let first = points.first()?;
        let (mut min_x, mut min_y, mut max_x, mut max_y) = (first.x, first.y, first.x, first.y);
        for point in &points[1..] {
            min_x = min_x.min(point.x);
            min_y = min_y.min(point.y);
            max_x = max_x.max(point.x);
            max_y = max_y.max(point.y);
        }
        Some(Self::from_corners(Point::new(min_x, min_y), Point::new(max_x, max_y)))
    }

    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn right(&self) -> f32 {
        self.x + self.w
    }

    pub fn bottom(&self) -> f32 {
        self.y + self.h
    }

    pub fn corner(&self, handle: Handle) -> Point {
        match handle {
            Handle::Nw => Point::new(self.x, self.y),
            Handle::Ne => Point::new(self.right(), self.y),
            Handle::Sw => Point::new(self.x, self.bottom()),
            Handle::Se => Point::new(self.right(), self.bottom()),
        }
    }

    pub fn contains(&self, point: Point) -> bool {
        point.x >= self.x
            && point.x <= self.right()
            && point.y >= self.y
            && point.y <= self.bottom()
    }

    pub fn expanded(&self, margin: f32) -> Self {
        Self::new(self.x - margin, self.y - margin, self.w + margin * 2.0, self.h + margin * 2.0)
    }

    pub fn moved_to(&self, origin: Point) -> Self {
        Self { x: origin.x, y: origin.y, ..*self }
    }

    pub fn is_finite(&self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.w.is_finite() && self.h.is_finite()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Size {
    pub w: f32,
    pub h: f32,
}

impl Size {
    pub const fn new(w: f32, h: f32) -> Self {
        Self { w, h }
    }

    pub fn at(self, origin: Point) -> Rect {
        Rect::new(origin.x, origin.y, self.w, self.h)
    }
}

/// Corner resize handle on a boxed item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Handle {
    Nw,
    Ne,
    Sw,
    Se,
}

impl Handle {
    pub const ALL: [Handle; 4] = [Handle::Nw, Handle::Ne, Handle::Sw, Handle::Se];

    /// Whether dragging this handle moves the left edge.
    pub fn moves_west(self) -> bool {
        matches!(self, Handle::Nw | Handle::Sw)
    }

    /// Whether dragging this handle moves the top edge.
    pub fn moves_north(self) -> bool {
        matches!(self, Handle::Nw | Handle::Ne)
    }

    pub fn opposite(self) -> Handle {
        match self {
            Handle::Nw => Handle::Se,
            Handle::Ne => Handle::Sw,
            Handle::Sw => Handle::Ne,
            Handle::Se => Handle::Nw,
        }
    }
}

/// Allowed extent for resized boxes.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SizeLimits {
    pub min_w: f32,
    pub max_w: f32,
    pub min_h: f32,
    pub max_h: f32,
}

impl Default for SizeLimits {
    fn default() -> Self {
        Self { min_w: 90.0, max_w: 2400.0, min_h: 34.0, max_h: 2400.0 }
    }
}

impl SizeLimits {
    /// Finite, non-negative bounds with each minimum at or below its maximum.
    pub fn is_valid(&self) -> bool {
        let bounds = [self.min_w, self.max_w, self.min_h, self.max_h];
        bounds.iter().all(|b| b.is_finite() && *b >= 0.0)
            && self.min_w <= self.max_w
            && self.min_h <= self.max_h
    }

    /// Never panics: with inverted bounds the maximum wins.
    pub fn clamp_width(&self, w: f32) -> f32 {
        w.max(self.min_w).min(self.max_w)
    }

    pub fn clamp_height(&self, h: f32) -> f32 {
        h.max(self.min_h).min(self.max_h)
    }

    pub fn contains(&self, rect: &Rect) -> bool {
        (self.min_w..=self.max_w).contains(&rect.w) && (self.min_h..=self.max_h).contains(&rect.h)
    }
}

/// Resize `original` by dragging `handle` by `(dx, dy)`.
///
/// The extent is clamped to `limits` and the corner opposite the handle stays
/// where it was, including when the clamp kicks in.
pub fn resize_frame(original: Rect, handle: Handle, dx: f32, dy: f32, limits: &SizeLimits) -> Rect {
    let mut frame = original;

    if handle.moves_west() {
        frame.w = limits.clamp_width(original.w - dx);
        frame.x = original.right() - frame.w;
    } else {
        frame.w = limits.clamp_width(original.w + dx);
    }

    if handle.moves_north() {
        frame.h = limits.clamp_height(original.h - dy);
        frame.y = original.bottom() - frame.h;
    } else {
        frame.h = limits.clamp_height(original.h + dy);
    }

    frame
}

/// Distance-based hit test against a line segment.
pub fn point_near_segment(point: Point, start: Point, end: Point, tolerance: f32) -> bool {
    let (dx, dy) = end.delta_from(start);
    let length_squared = dx * dx + dy * dy;

    if length_squared == 0.0 {
        return point.distance_to(start) <= tolerance;
    }

    let t =
        (((point.x - start.x) * dx + (point.y - start.y) * dy) / length_squared).clamp(0.0, 1.0);
    let projection = Point::new(start.x + t * dx, start.y + t * dy);
    point.distance_to(projection) <= tolerance
}
