#![allow(dead_code)]

//! Bitmap data model and the sub-pixel grid samplers (C2/C3) that turn a
//! camera bitmap plus a perspective transform into a module-color matrix.

use jab_transform::{PerspectiveTransform, Point, Vector2D};
use log::{debug, warn};
use std::error;
use std::fmt;

/// The width of the strip across a host/slave symbol boundary, in modules.
pub const CROSS_AREA_WIDTH: i32 = 14;
/// Width of the columns sampled from the cross area (metadata + palette).
pub const SAMPLE_AREA_WIDTH: i32 = CROSS_AREA_WIDTH / 2 - 2;
/// Height of the cross area rows sampled, including the non-metadata first row.
pub const SAMPLE_AREA_HEIGHT: i32 = 20;

#[derive(Debug)]
pub enum Error {
    OffImage,
    AllocationFailure,
}

impl error::Error for Error {}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::OffImage => write!(
                f,
                "a sampled module centre maps outside the raster by more than one pixel"
            ),
            Self::AllocationFailure => write!(f, "memory allocation for an intermediate buffer failed"),
        }
    }
}

/// An owned, immutable-to-the-core raster image.
///
/// Row-major, tightly packed, origin top-left. `channel_count` is 3 (RGB) or
/// 4 (RGBA); any alpha channel present is carried through unused.
#[derive(Debug, Clone)]
pub struct Bitmap {
    pub width: i32,
    pub height: i32,
    pub channel_count: i32,
    pixels: Vec<u8>,
}

impl Bitmap {
    pub fn new(width: i32, height: i32, channel_count: i32, pixels: Vec<u8>) -> Self {
        assert_eq!(
            pixels.len(),
            (width * height * channel_count) as usize,
            "pixel buffer length does not match width * height * channel_count"
        );
        Bitmap {
            width,
            height,
            channel_count,
            pixels,
        }
    }

    #[inline]
    fn pixel(&self, x: i32, y: i32, c: i32) -> u8 {
        let row = self.width * self.channel_count;
        self.pixels[(y * row + x * self.channel_count + c) as usize]
    }

    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }
}

/// A rectangular grid of sampled module colors, as raw per-channel byte
/// averages (pre color-classification). Reuses `Bitmap`'s layout since a
/// module matrix of channel averages *is* a small bitmap.
pub type ModuleMatrix = Bitmap;

/// Clamps a truncated source coordinate that landed exactly one pixel past
/// the raster edge; any coordinate further out is off-image.
fn clamp_coordinate(value: i32, extent: i32) -> Result<i32, Error> {
    if value >= 0 && value <= extent - 1 {
        Ok(value)
    } else if value == -1 {
        Ok(0)
    } else if value == extent {
        Ok(extent - 1)
    } else {
        Err(Error::OffImage)
    }
}

/// Averages the 3x3 neighbourhood centred at `(mx, my)` in `bitmap`, per
/// channel, with edge-replicate boundary handling.
fn sample_neighbourhood(bitmap: &Bitmap, mx: i32, my: i32, out: &mut [u8]) {
    for c in 0..bitmap.channel_count {
        let mut sum = 0.0f32;
        for dx in -1..=1 {
            for dy in -1..=1 {
                let mut px = mx + dx;
                let mut py = my + dy;
                if px < 0 || px > bitmap.width - 1 {
                    px = mx;
                }
                if py < 0 || py > bitmap.height - 1 {
                    py = my;
                }
                sum += bitmap.pixel(px, py, c) as f32;
            }
        }
        out[c as usize] = (sum / 9.0 + 0.5) as u8;
    }
}

/// Walks a canonical grid of `width x height` cells, offset by `x_offset`
/// canonical modules, through `pt`, sampling each cell's 3x3 neighbourhood in
/// `bitmap`. Shared by `sample_symbol` and `sample_cross_area`.
fn sample_grid(bitmap: &Bitmap, pt: &PerspectiveTransform, x_offset: f32, width: i32, height: i32) -> Result<ModuleMatrix, Error> {
    let channel_count = bitmap.channel_count;
    let mut out = vec![0u8; (width * height * channel_count) as usize];
    let out_row = width * channel_count;

    let mut row_points = vec![Point::new(0.0, 0.0); width as usize];

    for i in 0..height {
        for (j, p) in row_points.iter_mut().enumerate() {
            *p = Point::new(j as f32 + x_offset + 0.5, i as f32 + 0.5);
        }
        jab_transform::warp_points(pt, &mut row_points);

        for (j, p) in row_points.iter().enumerate() {
            let mx = clamp_coordinate(p.x as i32, bitmap.width)?;
            let my = clamp_coordinate(p.y as i32, bitmap.height)?;

            let cell_start = (i * out_row + j as i32 * channel_count) as usize;
            let cell = &mut out[cell_start..cell_start + channel_count as usize];
            sample_neighbourhood(bitmap, mx, my, cell);
        }
    }

    Ok(Bitmap::new(width, height, channel_count, out))
}

/// Samples the full canonical module grid of size `side_size` through `pt`.
pub fn sample_symbol(bitmap: &Bitmap, pt: &PerspectiveTransform, side_size: Vector2D) -> Result<ModuleMatrix, Error> {
    debug!(
        "sample_symbol: sampling {}x{} modules from a {}x{} bitmap",
        side_size.x, side_size.y, bitmap.width, bitmap.height
    );
    let result = sample_grid(bitmap, pt, 0.0, side_size.x, side_size.y);
    if result.is_err() {
        warn!("sample_symbol: a module centre mapped off-image, symbol is mislocated");
    }
    result
}

/// Samples the narrow strip between a host and a docked slave symbol, where
/// the slave's metadata and palette live.
pub fn sample_cross_area(bitmap: &Bitmap, pt: &PerspectiveTransform) -> Result<ModuleMatrix, Error> {
    debug!("sample_cross_area: sampling {}x{} modules", SAMPLE_AREA_WIDTH, SAMPLE_AREA_HEIGHT);
    let result = sample_grid(
        bitmap,
        pt,
        (CROSS_AREA_WIDTH / 2) as f32,
        SAMPLE_AREA_WIDTH,
        SAMPLE_AREA_HEIGHT,
    );
    if result.is_err() {
        warn!("sample_cross_area: a module centre mapped off-image");
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use jab_transform::perspective_transform;

    fn solid_color_bitmap(width: i32, height: i32, channel_count: i32, value: u8) -> Bitmap {
        Bitmap::new(width, height, channel_count, vec![value; (width * height * channel_count) as usize])
    }

    fn gradient_bitmap_21x21() -> Bitmap {
        let mut pixels = Vec::with_capacity(21 * 21 * 4);
        for y in 0..21 {
            for x in 0..21 {
                pixels.push(((x * 11) as u8).min(255));
                pixels.push(0);
                pixels.push(0);
                pixels.push(255);
            }
        }
        Bitmap::new(21, 21, 4, pixels)
    }

    #[test]
    fn identity_sample_21x21() {
        let bmp = gradient_bitmap_21x21();
        let p0 = jab_transform::Point::new(0.5, 0.5);
        let p1 = jab_transform::Point::new(20.5, 0.5);
        let p2 = jab_transform::Point::new(20.5, 20.5);
        let p3 = jab_transform::Point::new(0.5, 20.5);
        let t = perspective_transform((p0, p1, p2, p3), (p0, p1, p2, p3)).unwrap();

        let matrix = sample_symbol(&bmp, &t, Vector2D::new(21, 21)).unwrap();

        for x in 0..21 {
            let expected = (x * 11) as i32;
            let got = matrix.pixel(x, 10, 0) as i32;
            assert!((got - expected).abs() <= 1, "x={} expected~{} got={}", x, expected, got);
        }
    }

    #[test]
    fn affine_quad_lands_on_exact_module_centres() {
        let bmp = solid_color_bitmap(121, 121, 3, 0);
        let p0 = jab_transform::Point::new(10.0, 10.0);
        let p1 = jab_transform::Point::new(110.0, 10.0);
        let p2 = jab_transform::Point::new(110.0, 110.0);
        let p3 = jab_transform::Point::new(10.0, 110.0);
        let t = jab_transform::square_to_quad(p0, p1, p2, p3).unwrap();

        for i in 0..11 {
            for j in 0..11 {
                let pt = jab_transform::Point::new(j as f32 + 0.5, i as f32 + 0.5);
                let warped = t.warp_point(pt);
                assert!((warped.x - (10.0 + 10.0 * j as f32)).abs() < 1e-3);
                assert!((warped.y - (10.0 + 10.0 * i as f32)).abs() < 1e-3);
            }
        }
        let _ = sample_symbol(&bmp, &t, Vector2D::new(11, 11)).unwrap();
    }

    #[test]
    fn clamp_snaps_edge_overshoot_by_one_pixel() {
        assert_eq!(clamp_coordinate(-1, 10).unwrap(), 0);
        assert_eq!(clamp_coordinate(10, 10).unwrap(), 9);
        assert_eq!(clamp_coordinate(5, 10).unwrap(), 5);
    }

    #[test]
    fn clamp_fails_off_image_beyond_one_pixel() {
        assert!(matches!(clamp_coordinate(-2, 10), Err(Error::OffImage)));
        assert!(matches!(clamp_coordinate(11, 10), Err(Error::OffImage)));
    }

    #[test]
    fn rgba_alpha_channel_is_carried_through_unused() {
        let bmp = solid_color_bitmap(4, 4, 4, 7);
        let p0 = jab_transform::Point::new(0.5, 0.5);
        let p1 = jab_transform::Point::new(3.5, 0.5);
        let p2 = jab_transform::Point::new(3.5, 3.5);
        let p3 = jab_transform::Point::new(0.5, 3.5);
        let t = perspective_transform((p0, p1, p2, p3), (p0, p1, p2, p3)).unwrap();
        let matrix = sample_symbol(&bmp, &t, Vector2D::new(4, 4)).unwrap();
        assert_eq!(matrix.channel_count, 4);
        assert_eq!(matrix.pixel(0, 0, 3), 7);
    }
}
