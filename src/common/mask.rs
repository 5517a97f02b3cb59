use std::ops::Deref;

use tracing::debug;

use super::error::{QRError, QRResult};
use super::metadata::Color;
use super::tables::SpecTables;
use crate::builder::QR;

#[derive(Debug, PartialEq, Eq, Copy, Clone, PartialOrd, Ord, Hash)]
pub struct MaskPattern(u8);

impl MaskPattern {
    pub fn new(pattern: u8) -> QRResult<Self> {
        if pattern < 8 {
            Ok(Self(pattern))
        } else {
            Err(QRError::InvalidMaskingPattern)
        }
    }

    pub fn all() -> impl Iterator<Item = MaskPattern> {
        (0..8).map(MaskPattern)
    }
}

impl Deref for MaskPattern {
    type Target = u8;
    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

mod mask_functions {
    pub fn checkerboard(r: i16, c: i16) -> bool {
        (r + c) & 1 == 0
    }

    pub fn horizontal_lines(r: i16, _: i16) -> bool {
        r & 1 == 0
    }

    pub fn vertical_lines(_: i16, c: i16) -> bool {
        c % 3 == 0
    }

    pub fn diagonal_lines(r: i16, c: i16) -> bool {
        (r + c) % 3 == 0
    }

    pub fn large_checkerboard(r: i16, c: i16) -> bool {
        ((r >> 1) + (c / 3)) & 1 == 0
    }

    pub fn fields(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        (p & 1) + (p % 3) == 0
    }

    pub fn diamonds(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        ((p & 1) + (p % 3)) & 1 == 0
    }

    pub fn meadow(r: i16, c: i16) -> bool {
        let p = r as i32 * c as i32;
        (((r + c) as i32 & 1) + (p % 3)) & 1 == 0
    }
}

impl MaskPattern {
    pub fn mask_function(self) -> fn(i16, i16) -> bool {
        match *self {
            0b000 => mask_functions::checkerboard,
            0b001 => mask_functions::horizontal_lines,
            0b010 => mask_functions::vertical_lines,
            0b011 => mask_functions::diagonal_lines,
            0b100 => mask_functions::large_checkerboard,
            0b101 => mask_functions::fields,
            0b110 => mask_functions::diamonds,
            0b111 => mask_functions::meadow,
            _ => unreachable!("Mask pattern is validated on construction"),
        }
    }
}

// Mask selection
//------------------------------------------------------------------------------

/// Masked copy of `qr` with its format information drawn.
pub fn mask_candidate(qr: &QR, mask: MaskPattern, tables: &SpecTables) -> QRResult<QR> {
    let mut candidate = qr.clone();
    candidate.apply_mask(mask)?;
    candidate.draw_format_info(tables)?;
    Ok(candidate)
}

/// Builds all eight candidates and keeps the one with the lowest penalty, the lowest pattern
/// winning ties.
pub fn apply_best_mask(qr: &QR, tables: &SpecTables) -> QRResult<QR> {
    let candidates = MaskPattern::all()
        .map(|m| {
            let candidate = mask_candidate(qr, m, tables)?;
            let penalty = compute_total_penalty(&candidate);
            debug!(mask = *m, penalty, "Scored mask candidate");
            Ok((candidate, penalty))
        })
        .collect::<QRResult<Vec<_>>>()?;

    candidates
        .into_iter()
        .min_by_key(|(_, penalty)| *penalty)
        .map(|(qr, _)| qr)
        .ok_or(QRError::InvariantViolation("no mask candidate"))
}

// Penalty
//------------------------------------------------------------------------------

pub fn compute_total_penalty(qr: &QR) -> u32 {
    let adj_pen = compute_adjacent_penalty(qr);
    let blk_pen = compute_block_penalty(qr);
    let fp_pen_h = compute_finder_pattern_penalty(qr, true);
    let fp_pen_v = compute_finder_pattern_penalty(qr, false);
    let bal_pen = compute_balance_penalty(qr);
    adj_pen + blk_pen + fp_pen_h + fp_pen_v + bal_pen
}

// Runs of 5 or more same colored modules in a row or column score 3, plus 1 per extra module
fn compute_adjacent_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width();
    let mut cols = vec![(Color::Dark, 0); w];
    for r in 0..w {
        let mut last = Color::Dark;
        let mut consec_row_len = 0;
        for (c, col) in cols.iter_mut().enumerate() {
            let clr = *qr.get(r as i16, c as i16);
            if c == 0 || last != clr {
                last = clr;
                consec_row_len = 0;
            }
            consec_row_len += 1;
            pen += run_penalty(consec_row_len);

            if r == 0 || col.0 != clr {
                col.0 = clr;
                col.1 = 0;
            }
            col.1 += 1;
            pen += run_penalty(col.1);
        }
    }
    pen
}

fn run_penalty(len: u32) -> u32 {
    match len {
        5 => 3,
        6.. => 1,
        _ => 0,
    }
}

fn compute_block_penalty(qr: &QR) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    for r in 0..w - 1 {
        for c in 0..w - 1 {
            let clr = *qr.get(r, c);
            if clr == *qr.get(r + 1, c) && clr == *qr.get(r, c + 1) && clr == *qr.get(r + 1, c + 1)
            {
                pen += 3;
            }
        }
    }
    pen
}

// Every window matching 1:1:3:1:1 with 4 light modules on either side
fn compute_finder_pattern_penalty(qr: &QR, is_hor: bool) -> u32 {
    let mut pen = 0;
    let w = qr.width() as i16;
    let len = FINDER_LIKE_PATTERN.len() as i16;
    for i in 0..w {
        let get = |j: i16| if is_hor { *qr.get(i, j) } else { *qr.get(j, i) };
        for j in 0..=w - len {
            let window = (j..j + len).map(get);
            if window.clone().eq(FINDER_LIKE_PATTERN.iter().copied())
                || window.eq(FINDER_LIKE_PATTERN.iter().rev().copied())
            {
                pen += 40;
            }
        }
    }
    pen
}

// Distance of the dark ratio from 50%, in 5% steps, using the closer of the two bracketing
// multiples of 5
fn compute_balance_penalty(qr: &QR) -> u32 {
    let w = qr.width();
    let ratio = (qr.count_dark_modules() * 100 / (w * w)) as i32;
    balance_penalty(ratio)
}

fn balance_penalty(ratio: i32) -> u32 {
    let lo = ratio - ratio % 5;
    let hi = lo + 5;
    let steps = ((lo - 50).abs() / 5).min((hi - 50).abs() / 5);
    steps as u32 * 10
}


// Global constants
//------------------------------------------------------------------------------

static FINDER_LIKE_PATTERN: [Color; 11] = [
    Color::Dark,
    Color::Light,
    Color::Dark,
    Color::Dark,
    Color::Dark,
    Color::Light,
    Color::Dark,
    Color::Light,
    Color::Light,
    Color::Light,
    Color::Light,
];
