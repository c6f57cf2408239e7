//! Piece-square tables.
//!
//! Source tables cover files a-d only and are listed rank 8 first, from White's
//! point of view. They are expanded at compile time into full 64-square tables
//! indexed a1=0 .. h8=63 for White; Black looks up the rank-flipped square.

use crate::types::Score;

pub const PAWN: usize = 0;
pub const KNIGHT: usize = 1;
pub const BISHOP: usize = 2;
pub const ROOK: usize = 3;
pub const QUEEN: usize = 4;
pub const KING: usize = 5;

/// Offset into `TABLES` for the middlegame and endgame sets.
pub const MG: usize = 0;
pub const EG: usize = 6;

/// Game phase contribution per piece; the sum is capped at `TOTAL_PHASE`.
pub const PHASE_WEIGHT: [i32; 6] = [0, 1, 1, 2, 4, 0];
pub const TOTAL_PHASE: i32 = 24;

/// Victim/attacker values for capture ordering. The king ranks above the
/// queen so king captures sort last among equal victims.
pub const MVV_VALUE: [Score; 6] = [100, 325, 325, 550, 1000, 1200];

#[rustfmt::skip]
const MG_PAWN: [i8; 32] = [
      0,   0,   0,   0,
     25,  30,  32,  37,
      0,  10,  12,  17,
     -5,   5,   7,  12,
    -10,   0,   5,   5,
    -10,   3,   2,   2,
    -15,  -5,  -5, -15,
      0,   0,   0,   0,
];

#[rustfmt::skip]
const EG_PAWN: [i8; 32] = [
      0,   0,   0,   0,
     60,  60,  60,  60,
     30,  30,  30,  30,
     10,  10,  10,  10,
      0,   0,   0,   0,
      0,   0,   0,   0,
      2,   2,   2,   2,
      0,   0,   0,   0,
];

#[rustfmt::skip]
const MG_KNIGHT: [i8; 32] = [
    -20, -13, -10, -10,
     -8,  -3,   2,   2,
      0,   7,  15,  15,
     -5,   2,  10,  10,
     -8,  -1,   7,   7,
    -10,  -3,   4,   5,
    -13,  -8,  -3,   1,
    -20, -13, -10, -10,
];

#[rustfmt::skip]
const EG_KNIGHT: [i8; 32] = [
    -10,  -7,  -5,  -5,
     -7,  -2,  -2,  -2,
     -5,  -2,   5,   5,
     -5,  -2,   5,   5,
     -5,  -2,   5,   5,
     -5,  -2,   5,   5,
     -7,  -2,  -2,  -2,
    -10,  -7,  -5,  -5,
];

#[rustfmt::skip]
const MG_BISHOP: [i8; 32] = [
    -29,   4, -82, -37,
    -26,  16, -18, -13,
    -16,  37,  43,  40,
     -4,   5,  19,  50,
     -6,  13,  13,  26,
      0,  15,  15,  15,
      4,  15,  16,   0,
    -33,  -3, -14, -21,
];

#[rustfmt::skip]
const EG_BISHOP: [i8; 32] = [
     -8,   3,  -1,  -5,
      5,   9,   5,   4,
      2,   5,   9,   9,
     -2,   4,   9,  14,
     -2,   4,   9,  14,
      2,   5,   9,   9,
      3,   9,   5,   4,
     -8,   3,   2,  -2,
];

#[rustfmt::skip]
const MG_ROOK: [i8; 32] = [
      5,   5,  10,  12,
     15,  15,  20,  22,
      0,   0,   5,   7,
      0,   0,   5,   7,
      0,   0,   5,   7,
      0,   0,   5,   7,
      0,   0,   5,   7,
      0,   0,   5,   7,
];

#[rustfmt::skip]
const EG_ROOK: [i8; 32] = [
      0,   5,   5,   5,
      5,   5,   5,   5,
      0,   0,   0,   0,
      0,   0,   0,   0,
      0,   0,   0,   0,
      0,   0,   0,   0,
      0,   0,   0,   0,
     -5,   0,   0,   0,
];

#[rustfmt::skip]
const MG_QUEEN: [i8; 32] = [
     -2,   0,   0,   0,
      0,   2,   2,   2,
      0,   2,   2,   2,
     -9,  -7,  -7,  -7,
     -9,  -7,  -7,  -7,
     -9,  -7,  -7,  -7,
      0,   2,   2,   2,
     -4,  -2,  -2,  -2,
];

#[rustfmt::skip]
const EG_QUEEN: [i8; 32] = [
      1,   3,   3,   3,
      3,   5,   5,   5,
      3,   5,   5,   5,
      3,   5,   5,   5,
     -2,   0,   0,   0,
     -2,   0,   0,   0,
     -2,   0,   0,   0,
     -4,  -2,  -2,  -2,
];

#[rustfmt::skip]
const MG_KING: [i8; 32] = [
      0,   0,  -5, -10,
      0,   0,  -5, -10,
     -5,  -5, -10, -15,
    -10, -10, -10, -20,
    -10, -10, -10, -20,
     -5,  -5, -10, -15,
      0,   0,  -5, -10,
      0,   0,   5, -10,
];

#[rustfmt::skip]
const EG_KING: [i8; 32] = [
    -20, -10,   0,   5,
    -10,   0,  10,  15,
      0,  10,  20,  25,
      5,  15,  25,  30,
      5,  15,  25,  30,
      0,  10,  20,  25,
    -10,   0,  10,  15,
    -20, -10,   0,   5,
];

const fn expand(half: &[i8; 32]) -> [i8; 64] {
    let mut out = [0i8; 64];
    let mut sq = 0;
    while sq < 64 {
        let row = 7 - sq / 8;
        let file = sq % 8;
        let col = if file > 3 { 7 - file } else { file };
        out[sq] = half[row * 4 + col];
        sq += 1;
    }
    out
}

/// Middlegame tables at `MG + piece`, endgame tables at `EG + piece`.
pub static TABLES: [[i8; 64]; 12] = [
    expand(&MG_PAWN),
    expand(&MG_KNIGHT),
    expand(&MG_BISHOP),
    expand(&MG_ROOK),
    expand(&MG_QUEEN),
    expand(&MG_KING),
    expand(&EG_PAWN),
    expand(&EG_KNIGHT),
    expand(&EG_BISHOP),
    expand(&EG_ROOK),
    expand(&EG_QUEEN),
    expand(&EG_KING),
];
