#![allow(dead_code)]

//! Projective transform algebra.
//!
//! Builds and composes the 3x3 projective mappings used to walk a camera
//! image's pixel grid back onto a JABCode symbol's canonical module grid
//! (and the inverse, for rendering a canonical grid into a quadrilateral).

use log::debug;
use std::error;
use std::fmt;

#[derive(Debug)]
pub enum Error {
    DegenerateQuad,
}

impl error::Error for Error {}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::DegenerateQuad => write!(
                f,
                "the four quadrilateral points are collinear or coincident"
            ),
        }
    }
}

/// A point with floating-point coordinates.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Point { x, y }
    }
}

/// A point with integer coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Vector2D {
    pub x: i32,
    pub y: i32,
}

impl Vector2D {
    pub fn new(x: i32, y: i32) -> Self {
        Vector2D { x, y }
    }
}

/// A 3x3 projective transform.
///
/// The first index of each field name is the column (x-related), the second
/// is the row (y-related): `a_ij` reads "column i, row j". Applying the
/// transform to `(x, y)` yields
/// `x' = (a11*x + a21*y + a31) / (a13*x + a23*y + a33)`,
/// `y' = (a12*x + a22*y + a32) / (a13*x + a23*y + a33)`.
/// This convention must be preserved: `quad_to_square`'s adjugate formula
/// depends on it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PerspectiveTransform {
    pub a11: f32,
    pub a12: f32,
    pub a13: f32,
    pub a21: f32,
    pub a22: f32,
    pub a23: f32,
    pub a31: f32,
    pub a32: f32,
    pub a33: f32,
}

impl PerspectiveTransform {
    /// The identity transform.
    pub fn identity() -> Self {
        PerspectiveTransform {
            a11: 1.0,
            a12: 0.0,
            a13: 0.0,
            a21: 0.0,
            a22: 1.0,
            a23: 0.0,
            a31: 0.0,
            a32: 0.0,
            a33: 1.0,
        }
    }

    /// Applies the transform to a single point.
    pub fn warp_point(&self, p: Point) -> Point {
        let denominator = self.a13 * p.x + self.a23 * p.y + self.a33;
        Point {
            x: (self.a11 * p.x + self.a21 * p.y + self.a31) / denominator,
            y: (self.a12 * p.x + self.a22 * p.y + self.a32) / denominator,
        }
    }
}

/// Applies a transform to every point in `points`, in place.
pub fn warp_points(pt: &PerspectiveTransform, points: &mut [Point]) {
    for p in points.iter_mut() {
        *p = pt.warp_point(*p);
    }
}

/// Builds the transform sending the unit square `(0,0),(1,0),(1,1),(0,1)` to
/// the given quadrilateral `p0,p1,p2,p3` (clockwise from top-left).
pub fn square_to_quad(p0: Point, p1: Point, p2: Point, p3: Point) -> Result<PerspectiveTransform, Error> {
    let dx3 = p0.x - p1.x + p2.x - p3.x;
    let dy3 = p0.y - p1.y + p2.y - p3.y;

    if dx3 == 0.0 && dy3 == 0.0 {
        // The quad is a parallelogram; the mapping is affine.
        return Ok(PerspectiveTransform {
            a11: p1.x - p0.x,
            a21: p2.x - p1.x,
            a31: p0.x,
            a12: p1.y - p0.y,
            a22: p2.y - p1.y,
            a32: p0.y,
            a13: 0.0,
            a23: 0.0,
            a33: 1.0,
        });
    }

    let dx1 = p1.x - p2.x;
    let dx2 = p3.x - p2.x;
    let dy1 = p1.y - p2.y;
    let dy2 = p3.y - p2.y;
    let denominator = dx1 * dy2 - dx2 * dy1;
    if denominator == 0.0 {
        debug!("square_to_quad: degenerate quad, denominator is zero");
        return Err(Error::DegenerateQuad);
    }

    let a13 = (dx3 * dy2 - dx2 * dy3) / denominator;
    let a23 = (dx1 * dy3 - dx3 * dy1) / denominator;

    Ok(PerspectiveTransform {
        a11: p1.x - p0.x + a13 * p1.x,
        a21: p3.x - p0.x + a23 * p3.x,
        a31: p0.x,
        a12: p1.y - p0.y + a13 * p1.y,
        a22: p3.y - p0.y + a23 * p3.y,
        a32: p0.y,
        a13,
        a23,
        a33: 1.0,
    })
}

/// Builds the transform sending the quadrilateral `p0,p1,p2,p3` to the unit
/// square. Computed as the adjugate of `square_to_quad` with the same points.
pub fn quad_to_square(p0: Point, p1: Point, p2: Point, p3: Point) -> Result<PerspectiveTransform, Error> {
    let s = square_to_quad(p0, p1, p2, p3)?;
    Ok(PerspectiveTransform {
        a11: s.a22 * s.a33 - s.a23 * s.a32,
        a21: s.a23 * s.a31 - s.a21 * s.a33,
        a31: s.a21 * s.a32 - s.a22 * s.a31,
        a12: s.a13 * s.a32 - s.a12 * s.a33,
        a22: s.a11 * s.a33 - s.a13 * s.a31,
        a32: s.a12 * s.a31 - s.a11 * s.a32,
        a13: s.a12 * s.a23 - s.a13 * s.a22,
        a23: s.a13 * s.a21 - s.a11 * s.a23,
        a33: s.a11 * s.a22 - s.a12 * s.a21,
    })
}

/// Matrix multiplication `m1 * m2`.
pub fn multiply(m1: &PerspectiveTransform, m2: &PerspectiveTransform) -> PerspectiveTransform {
    PerspectiveTransform {
        a11: m1.a11 * m2.a11 + m1.a12 * m2.a21 + m1.a13 * m2.a31,
        a21: m1.a21 * m2.a11 + m1.a22 * m2.a21 + m1.a23 * m2.a31,
        a31: m1.a31 * m2.a11 + m1.a32 * m2.a21 + m1.a33 * m2.a31,
        a12: m1.a11 * m2.a12 + m1.a12 * m2.a22 + m1.a13 * m2.a32,
        a22: m1.a21 * m2.a12 + m1.a22 * m2.a22 + m1.a23 * m2.a32,
        a32: m1.a31 * m2.a12 + m1.a32 * m2.a22 + m1.a33 * m2.a32,
        a13: m1.a11 * m2.a13 + m1.a12 * m2.a23 + m1.a13 * m2.a33,
        a23: m1.a21 * m2.a13 + m1.a22 * m2.a23 + m1.a23 * m2.a33,
        a33: m1.a31 * m2.a13 + m1.a32 * m2.a23 + m1.a33 * m2.a33,
    }
}

/// Builds the transform mapping quadrilateral `src` onto quadrilateral `dst`,
/// both given as `(p0, p1, p2, p3)` clockwise from top-left.
pub fn perspective_transform(
    src: (Point, Point, Point, Point),
    dst: (Point, Point, Point, Point),
) -> Result<PerspectiveTransform, Error> {
    let q2s = quad_to_square(src.0, src.1, src.2, src.3)?;
    let s2q = square_to_quad(dst.0, dst.1, dst.2, dst.3)?;
    Ok(multiply(&q2s, &s2q))
}
