#![allow(dead_code)]

//! Pipeline facade: owns the four external entry points described for this
//! workspace and unifies the leaf crates' error types into one.

use jab_raster::Bitmap;
use jab_transform::{Point, PerspectiveTransform, Vector2D};
use log::debug;
use std::error;
use std::fmt;

pub use jab_raster::ModuleMatrix;
pub use jab_mask::IndexMatrix;

#[derive(Debug)]
pub enum Error {
    Transform(jab_transform::Error),
    Raster(jab_raster::Error),
    Mask(jab_mask::Error),
}

impl error::Error for Error {}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::Transform(e) => write!(f, "transform error: {}", e),
            Self::Raster(e) => write!(f, "raster error: {}", e),
            Self::Mask(e) => write!(f, "mask error: {}", e),
        }
    }
}

impl From<jab_transform::Error> for Error {
    fn from(e: jab_transform::Error) -> Self {
        Error::Transform(e)
    }
}

impl From<jab_raster::Error> for Error {
    fn from(e: jab_raster::Error) -> Self {
        Error::Raster(e)
    }
}

impl From<jab_mask::Error> for Error {
    fn from(e: jab_mask::Error) -> Self {
        Error::Mask(e)
    }
}

/// Bookkeeping companion for a single decoded symbol: the side size it was
/// sampled at, the mask id recovered from its metadata, and its palette size.
/// A plain data struct filled in by a caller assembling a full decode; this
/// facade does not populate it itself since doing so requires the
/// metadata/LDPC decoder this crate does not implement.
#[derive(Debug, Clone, Copy)]
pub struct DecodedSymbolInfo {
    pub side_size: Vector2D,
    pub mask_id: u8,
    pub color_number: i32,
}

/// Builds the transform from four detected finder-pattern centres
/// (clockwise from top-left) to the canonical grid of `side_size` modules.
///
/// The canonical corners are hard-coded at 3.5 modules inset from each edge,
/// since a finder pattern's centre sits in the middle of a 7x7 module block.
pub fn build_transform(
    p0: Point,
    p1: Point,
    p2: Point,
    p3: Point,
    side_size: Vector2D,
) -> Result<PerspectiveTransform, Error> {
    let inset = 3.5f32;
    let sx = side_size.x as f32;
    let sy = side_size.y as f32;
    let dst = (
        Point::new(inset, inset),
        Point::new(sx - inset, inset),
        Point::new(sx - inset, sy - inset),
        Point::new(inset, sy - inset),
    );
    debug!(
        "build_transform: mapping detected quad to canonical {}x{} grid inset by {}",
        side_size.x, side_size.y, inset
    );
    jab_transform::perspective_transform((p0, p1, p2, p3), dst).map_err(Error::from)
}

/// Samples the canonical module grid of `side_size` from `bitmap` through `pt`.
pub fn sample_symbol(bitmap: &Bitmap, pt: &PerspectiveTransform, side_size: Vector2D) -> Result<ModuleMatrix, Error> {
    jab_raster::sample_symbol(bitmap, pt, side_size).map_err(Error::from)
}

/// Samples the cross-area strip between a host and docked slave symbol.
pub fn sample_cross_area(bitmap: &Bitmap, pt: &PerspectiveTransform) -> Result<ModuleMatrix, Error> {
    jab_raster::sample_cross_area(bitmap, pt).map_err(Error::from)
}

/// Trials all eight masks against `matrix`, applies the winner in place, and
/// returns its id.
pub fn select_and_apply_mask(matrix: &mut IndexMatrix, color_number: i32) -> u8 {
    jab_mask::select_and_apply_mask(matrix, color_number)
}

/// Demasks `data` in place per the recovered `mask_id`.
pub fn demask(data: &mut [u8], data_map: &[bool], side_size: Vector2D, mask_id: u8, color_number: i32) -> Result<(), Error> {
    jab_mask::demask(data, data_map, (side_size.x, side_size.y), mask_id, color_number).map_err(Error::from)
}

/// Deinterleaves `data` in place.
pub fn deinterleave(data: &mut [u8]) {
    jab_interleave::deinterleave(data)
}

/// Interleaves `data` in place.
pub fn interleave(data: &mut [u8]) {
    jab_interleave::interleave(data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_transform_on_canonical_corners_is_identity() {
        let side = Vector2D::new(21, 21);
        let p0 = Point::new(3.5, 3.5);
        let p1 = Point::new(17.5, 3.5);
        let p2 = Point::new(17.5, 17.5);
        let p3 = Point::new(3.5, 17.5);

        let t = build_transform(p0, p1, p2, p3, side).unwrap();

        for &pt in &[p0, p1, p2, p3, Point::new(10.0, 10.0)] {
            let warped = t.warp_point(pt);
            assert!((warped.x - pt.x).abs() < 1e-3);
            assert!((warped.y - pt.y).abs() < 1e-3);
        }
    }

    #[test]
    fn decoded_symbol_info_is_a_plain_copy_struct() {
        let info = DecodedSymbolInfo {
            side_size: Vector2D::new(21, 21),
            mask_id: 3,
            color_number: 4,
        };
        let copied = info;
        assert_eq!(copied.mask_id, 3);
        assert_eq!(info.color_number, 4);
    }
}
