#![allow(dead_code)]

//! Mask pattern selection and application (C5) and demasking (C6).
//!
//! A `ModuleMatrix` of palette indices is represented here as a flat `Vec<i32>`
//! in row-major `(width, height)` order, with `-1` as the non-data sentinel.

use log::{debug, warn};
use std::error;
use std::fmt;

/// Weight applied to rule 1 (finder-pattern lookalike) hits.
pub const W1: i64 = 100;
/// Weight applied to rule 2 (2x2 same-colour block) hits.
pub const W2: i64 = 3;
/// Weight applied to rule 3 (long run) hits.
pub const W3: i64 = 3;

/// Core colors of the four canonical finder patterns for an 8-colour palette.
/// Not present in the retrieved reference source; fixed here as part of this
/// crate's wire contract (see the project's design notes).
const FP0_CORE_COLOR: i32 = 0;
const FP1_CORE_COLOR: i32 = 1;
const FP2_CORE_COLOR: i32 = 3;
const FP3_CORE_COLOR: i32 = 5;

#[derive(Debug)]
pub enum Error {
    LengthOverflow,
}

impl error::Error for Error {}
impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Self::LengthOverflow => write!(f, "data stream exhausted before the data map was"),
        }
    }
}

/// A palette-index matrix: row-major `width * height` cells, `-1` = non-data.
#[derive(Debug, Clone)]
pub struct IndexMatrix {
    pub width: i32,
    pub height: i32,
    cells: Vec<i32>,
}

impl IndexMatrix {
    pub fn new(width: i32, height: i32, cells: Vec<i32>) -> Self {
        assert_eq!(cells.len(), (width * height) as usize, "cell count mismatch");
        IndexMatrix { width, height, cells }
    }

    #[inline]
    pub fn get(&self, x: i32, y: i32) -> i32 {
        self.cells[(y * self.width + x) as usize]
    }

    #[inline]
    pub fn set(&mut self, x: i32, y: i32, value: i32) {
        self.cells[(y * self.width + x) as usize] = value;
    }

    pub fn cells(&self) -> &[i32] {
        &self.cells
    }
}

/// Evaluates the closed-form XOR pattern for mask `mask_id` at `(x, y)` over
/// a palette of size `color_number`.
pub fn pattern(mask_id: u8, x: i32, y: i32, color_number: i32) -> i32 {
    let c = color_number;
    match mask_id {
        0 => (x + y).rem_euclid(c),
        1 => x.rem_euclid(c),
        2 => y.rem_euclid(c),
        3 => (x / 2 + y / 3).rem_euclid(c),
        4 => (x / 3 + y / 2).rem_euclid(c),
        5 => ((x + y) / 2 + (x + y) / 3).rem_euclid(c),
        6 => (((x * x * y).rem_euclid(7)) + ((2 * x * x + 2 * y).rem_euclid(19))).rem_euclid(c),
        7 => (((x * y * y).rem_euclid(5)) + ((2 * x + y * y).rem_euclid(13))).rem_euclid(c),
        _ => panic!("mask_id out of range: {}", mask_id),
    }
}

/// The four `(c1, c2)` finder-pattern core-colour pairs for a palette of
/// `color_number` colours.
fn finder_pattern_pairs(color_number: i32) -> [(i32, i32); 4] {
    match color_number {
        2 => [(0, 1), (1, 0), (1, 0), (1, 0)],
        4 => [(0, 3), (1, 2), (2, 1), (3, 0)],
        8 => [
            (FP0_CORE_COLOR, 7 - FP0_CORE_COLOR),
            (FP1_CORE_COLOR, 7 - FP1_CORE_COLOR),
            (FP2_CORE_COLOR, 7 - FP2_CORE_COLOR),
            (FP3_CORE_COLOR, 7 - FP3_CORE_COLOR),
        ],
        _ => panic!("unsupported color_number for rule 1: {}", color_number),
    }
}

fn matches_alternating(cells: [i32; 5], c1: i32, c2: i32) -> bool {
    cells == [c1, c2, c1, c2, c1]
}

/// Rule 1: counts interior cells whose 5-cell horizontal AND vertical runs
/// both match one of the four finder-pattern lookalike patterns.
pub fn apply_rule1(matrix: &IndexMatrix, color_number: i32) -> i64 {
    let pairs = finder_pattern_pairs(color_number);
    let w = matrix.width;
    let h = matrix.height;
    let mut hits = 0i64;

    for i in 2..=(h - 3) {
        for j in 2..=(w - 3) {
            let horiz = [
                matrix.get(j - 2, i),
                matrix.get(j - 1, i),
                matrix.get(j, i),
                matrix.get(j + 1, i),
                matrix.get(j + 2, i),
            ];
            let vert = [
                matrix.get(j, i - 2),
                matrix.get(j, i - 1),
                matrix.get(j, i),
                matrix.get(j, i + 1),
                matrix.get(j, i + 2),
            ];
            for &(c1, c2) in &pairs {
                if matches_alternating(horiz, c1, c2) && matches_alternating(vert, c1, c2) {
                    hits += 1;
                    break;
                }
            }
        }
    }
    hits
}

/// Rule 2: counts 2x2 blocks of four non-sentinel cells sharing one colour.
pub fn apply_rule2(matrix: &IndexMatrix) -> i64 {
    let mut hits = 0i64;
    for i in 0..(matrix.height - 1) {
        for j in 0..(matrix.width - 1) {
            let a = matrix.get(j, i);
            let b = matrix.get(j + 1, i);
            let c = matrix.get(j, i + 1);
            let d = matrix.get(j + 1, i + 1);
            if a != -1 && a == b && a == c && a == d {
                hits += 1;
            }
        }
    }
    hits
}

fn score_runs(len: i32, get: impl Fn(i32) -> i32) -> i64 {
    let mut total = 0i64;
    let mut run_color = -1;
    let mut run_len = 0i32;
    for k in 0..=len {
        let v = if k < len { get(k) } else { -2 };
        if v != -1 && v == run_color {
            run_len += 1;
        } else {
            if run_color != -1 && run_len >= 5 {
                total += W3 + (run_len - 5) as i64;
            }
            run_color = v;
            run_len = if v == -1 { 0 } else { 1 };
        }
    }
    total
}

/// Rule 3: scores horizontal and vertical runs of >= 5 identical non-sentinel
/// cells, each run contributing `W3 + (run_length - 5)`.
pub fn apply_rule3(matrix: &IndexMatrix) -> i64 {
    let mut total = 0i64;
    for i in 0..matrix.height {
        total += score_runs(matrix.width, |j| matrix.get(j, i));
    }
    for j in 0..matrix.width {
        total += score_runs(matrix.height, |i| matrix.get(j, i));
    }
    total
}

/// Scores a candidate mask id over `matrix` at the given `color_number`.
pub fn evaluate_mask(matrix: &IndexMatrix, color_number: i32) -> i64 {
    W1 * apply_rule1(matrix, color_number) + W2 * apply_rule2(matrix) + apply_rule3(matrix)
}

fn apply_pattern_in_place(matrix: &mut IndexMatrix, mask_id: u8, color_number: i32) {
    let w = matrix.width;
    let h = matrix.height;
    for i in 0..h {
        for j in 0..w {
            let v = matrix.get(j, i);
            if v != -1 {
                matrix.set(j, i, v ^ pattern(mask_id, j, i, color_number));
            }
        }
    }
}

/// Trials all eight mask ids against `matrix`, scoring each with
/// `evaluate_mask`, and applies the lowest-scoring (ties: lowest id) mask to
/// `matrix` in place. Returns the chosen mask id.
pub fn select_and_apply_mask(matrix: &mut IndexMatrix, color_number: i32) -> u8 {
    let mut best_id: u8 = 0;
    let mut best_score: i64 = 10_000;

    for mask_id in 0u8..8 {
        let mut candidate = matrix.clone();
        apply_pattern_in_place(&mut candidate, mask_id, color_number);
        let score = evaluate_mask(&candidate, color_number);
        debug!("select_and_apply_mask: mask {} scored {}", mask_id, score);
        if score < best_score {
            best_score = score;
            best_id = mask_id;
        }
    }

    debug!("select_and_apply_mask: chose mask {} (score {})", best_id, best_score);
    apply_pattern_in_place(matrix, best_id, color_number);
    best_id
}

/// Applies the inverse (self-inverse) XOR pattern to a stream of palette
/// indices in column-major order, skipping modules marked non-data in
/// `data_map` (`true` = non-data). If `data` is exhausted before `data_map`
/// is, demasking stops silently and still returns `Ok(())` — matching the
/// encoder's partial-fill contract, a short final block must not abort
/// decoding. Callers that want to observe the early stop can compare how
/// many data modules were actually written against `data_map`'s data-module
/// count themselves.
pub fn demask(data: &mut [u8], data_map: &[bool], side_size: (i32, i32), mask_id: u8, color_number: i32) -> Result<(), Error> {
    let (w, h) = side_size;
    assert_eq!(data_map.len(), (w * h) as usize, "data_map size mismatch");

    let mut count = 0usize;
    for x in 0..w {
        for y in 0..h {
            if data_map[(y * w + x) as usize] {
                continue;
            }
            if count >= data.len() {
                warn!("demask: data stream exhausted at ({}, {}), stopping silently", x, y);
                return Ok(());
            }
            data[count] ^= pattern(mask_id, x, y, color_number) as u8;
            count += 1;
        }
    }
    Ok(())
}
