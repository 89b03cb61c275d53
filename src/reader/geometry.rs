use std::fmt::{Display, Formatter, Result as FmtResult};

use serde::{Deserialize, Serialize};

// Point
//------------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    #[inline]
    fn swapped(self) -> Self {
        Self { x: self.y, y: self.x }
    }
}

// Serialized the way polygon point lists expect it: "x,y"
impl Display for Point {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        write!(f, "{},{}", self.x, self.y)
    }
}

// Origin transform
//------------------------------------------------------------------------------

/// Maps source-image points into overlay view-box coordinates.
///
/// When `flip_axes` is set the point's axes are swapped before the scale `s`
/// (negative components reflect) and translation `t` are applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OriginTransform {
    pub t: Point,
    pub s: Point,
    pub flip_axes: bool,
}

impl Default for OriginTransform {
    fn default() -> Self {
        Self { t: Point::new(0.0, 0.0), s: Point::new(1.0, 1.0), flip_axes: false }
    }
}

impl OriginTransform {
    /// Transform for an image of the given natural size. Landscape images map
    /// through the identity, returned as `None`.
    pub fn for_image(width: u32, height: u32) -> Option<Self> {
        if width > height {
            return None;
        }
        Some(Self { t: Point::new(width as f64, 0.0), s: Point::new(-1.0, 1.0), flip_axes: true })
    }

    #[inline]
    pub fn apply(&self, pt: Point) -> Point {
        let pt = if self.flip_axes { pt.swapped() } else { pt };
        Point::new(self.t.x + pt.x * self.s.x, self.t.y + pt.y * self.s.y)
    }
}

// Projection
//------------------------------------------------------------------------------

#[inline]
pub fn project(pt: Point, transform: Option<&OriginTransform>) -> Point {
    match transform {
        Some(t) => t.apply(pt),
        None => pt,
    }
}

pub fn project_polygon(pts: &[Point; 4], transform: Option<&OriginTransform>) -> [Point; 4] {
    pts.map(|p| project(p, transform))
}

/// Space separated "x,y" list of the projected corners, in corner order.
pub fn polygon_points(pts: &[Point; 4], transform: Option<&OriginTransform>) -> String {
    project_polygon(pts, transform).iter().map(Point::to_string).collect::<Vec<_>>().join(" ")
}

/// Componentwise minimum of the projected corners. Not necessarily one of them.
pub fn min_point(pts: &[Point; 4], transform: Option<&OriginTransform>) -> Point {
    project_polygon(pts, transform).iter().fold(
        Point::new(f64::INFINITY, f64::INFINITY),
        |acc, p| Point::new(acc.x.min(p.x), acc.y.min(p.y)),
    )
}
