use jab_core::{build_transform, deinterleave, demask, interleave, sample_symbol, select_and_apply_mask};
use jab_mask::{pattern, IndexMatrix};
use jab_raster::Bitmap;
use jab_transform::{Point, Vector2D};

/// Scenario 1: a 21x21 bitmap where pixel (x,y) channel 0 = x*11; the
/// identity transform sampled over the whole grid recovers x*11 within
/// rounding tolerance.
#[test]
fn identity_sample_recovers_gradient() {
    let mut pixels = Vec::with_capacity(21 * 21 * 4);
    for _y in 0..21 {
        for x in 0..21 {
            pixels.push(((x * 11) as u8).min(255));
            pixels.push(0);
            pixels.push(0);
            pixels.push(255);
        }
    }
    let bitmap = Bitmap::new(21, 21, 4, pixels);

    let p0 = Point::new(0.5, 0.5);
    let p1 = Point::new(20.5, 0.5);
    let p2 = Point::new(20.5, 20.5);
    let p3 = Point::new(0.5, 20.5);
    let side = Vector2D::new(21, 21);

    // Canonical corners for this scenario sit at the bitmap edges rather than
    // a 3.5-module inset, so drive the transform through jab_transform
    // directly; build_transform's inset policy is covered by its own test.
    let t = jab_transform::perspective_transform((p0, p1, p2, p3), (p0, p1, p2, p3)).unwrap();
    let matrix = sample_symbol(&bitmap, &t, side).unwrap();

    for x in 0..21 {
        let expected = (x * 11) as i32;
        let got = matrix.pixels()[(10 * 21 + x) as usize * 4] as i32;
        assert!((got - expected).abs() <= 1, "x={} expected~{} got={}", x, expected, got);
    }
}

/// Scenario 3 + round-trip: masking then demasking an all-zero matrix with
/// mask id 0 at C=4 restores the zero matrix.
#[test]
fn mask_then_demask_round_trips_across_crates() {
    let width = 8;
    let height = 8;
    let mut matrix = IndexMatrix::new(width, height, vec![0i32; (width * height) as usize]);

    for y in 0..height {
        for x in 0..width {
            matrix.set(x, y, matrix.get(x, y) ^ pattern(0, x, y, 4));
        }
    }
    for y in 0..height {
        for x in 0..width {
            assert_eq!(matrix.get(x, y), (x + y) % 4);
        }
    }

    let mut data: Vec<u8> = (0..(width * height)).map(|i| matrix.cells()[i as usize] as u8).collect();
    let data_map = vec![false; (width * height) as usize];
    let side = Vector2D::new(width, height);
    demask(&mut data, &data_map, side, 0, 4).unwrap();
    assert!(data.iter().all(|&v| v == 0));
}

/// Scenario 6: interleaving and deinterleaving a length-5 buffer through the
/// facade's re-exports round-trips.
#[test]
fn interleave_round_trip_l5_through_facade() {
    let original = vec![0u8, 1, 2, 3, 4];
    let mut buf = original.clone();
    interleave(&mut buf);
    deinterleave(&mut buf);
    assert_eq!(buf, original);
}

/// Selecting a mask on a solid matrix and applying the facade's demask with
/// the chosen id restores the pre-mask content on an otherwise-empty data map.
#[test]
fn select_and_demask_round_trip_on_solid_matrix() {
    let width = 10;
    let height = 10;
    let mut matrix = IndexMatrix::new(width, height, vec![0i32; (width * height) as usize]);
    let original = matrix.cells().to_vec();

    let chosen = select_and_apply_mask(&mut matrix, 4);

    let mut data: Vec<u8> = matrix.cells().iter().map(|&v| v as u8).collect();
    let data_map = vec![false; (width * height) as usize];
    let side = Vector2D::new(width, height);
    demask(&mut data, &data_map, side, chosen, 4).unwrap();

    let restored: Vec<i32> = data.iter().map(|&v| v as i32).collect();
    assert_eq!(restored, original);
}

/// `build_transform` with detected corners exactly at the 3.5-inset canonical
/// positions is the identity, end to end through the facade.
#[test]
fn build_transform_then_sample_is_exact_on_canonical_corners() {
    let bitmap = Bitmap::new(21, 21, 3, vec![42u8; 21 * 21 * 3]);
    let side = Vector2D::new(21, 21);
    let p0 = Point::new(3.5, 3.5);
    let p1 = Point::new(17.5, 3.5);
    let p2 = Point::new(17.5, 17.5);
    let p3 = Point::new(3.5, 17.5);

    let t = build_transform(p0, p1, p2, p3, side).unwrap();
    let matrix = sample_symbol(&bitmap, &t, side).unwrap();
    assert!(matrix.pixels().iter().all(|&v| v == 42));
}
