use arrayvec::ArrayVec;
use shakmaty::{Color, Move, MoveList, Role, Square};

use crate::evaluation::piece_index;
use crate::pst::MVV_VALUE;
use crate::types::Score;

pub struct ScoredMove {
    pub mv: Move,
    pub score: Score,
}

const HASH_MOVE_SCORE: Score = 1_000_000;
const QUEEN_PROMOTION_SCORE: Score = 900_000;
const CAPTURE_BASE: Score = 500_000;
const CASTLE_SCORE: Score = 400_000;
// Quiet moves never outrank castling, however large their history grows.
const HISTORY_CAP: u32 = 300_000;

/// Quiet-move cutoff counters indexed by side, piece and destination square.
pub struct HistoryTable {
    table: [[[u32; 64]; 6]; 2],
}

impl Default for HistoryTable {
    fn default() -> Self {
        Self::new()
    }
}

impl HistoryTable {
    pub fn new() -> Self {
        Self { table: [[[0; 64]; 6]; 2] }
    }

    #[inline]
    pub fn score(&self, side: Color, role: Role, to: Square) -> u32 {
        self.table[side_index(side)][piece_index(role)][usize::from(to)]
    }

    /// Credits a quiet move that caused a beta cutoff `depth` plies from the horizon.
    pub fn reward(&mut self, side: Color, role: Role, to: Square, depth: u8) {
        let slot = &mut self.table[side_index(side)][piece_index(role)][usize::from(to)];
        let bonus = u32::from(depth) * u32::from(depth);
        *slot = slot.saturating_add(bonus);
    }
}

fn side_index(side: Color) -> usize {
    match side {
        Color::White => 0,
        Color::Black => 1,
    }
}

/// MVV-LVA key: captured value minus moving piece value.
#[inline]
fn mvv_lva(victim: Role, attacker: Role) -> Score {
    MVV_VALUE[piece_index(victim)] - MVV_VALUE[piece_index(attacker)]
}

/// Ranks the legal moves of a node.
/// Priority: (1) Hash move, (2) Queen promotions, (3) Captures by MVV-LVA,
/// (4) Castling, (5) Quiet moves by history score.
/// Ties keep generation order.
pub fn order_moves(
    side: Color,
    moves: MoveList,
    hash_move: Option<&Move>,
    history: &HistoryTable,
) -> ArrayVec<ScoredMove, 256> {
    let mut scored: ArrayVec<ScoredMove, 256> = ArrayVec::new();

    for mv in moves {
        let score = if hash_move == Some(&mv) {
            HASH_MOVE_SCORE
        } else if mv.promotion() == Some(Role::Queen) {
            QUEEN_PROMOTION_SCORE
        } else if let Some(victim) = mv.capture() {
            CAPTURE_BASE + mvv_lva(victim, mv.role())
        } else if mv.is_castle() {
            CASTLE_SCORE
        } else {
            history.score(side, mv.role(), mv.to()).min(HISTORY_CAP) as Score
        };
        scored.push(ScoredMove { mv, score });
    }

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}

/// Orders quiescence moves (captures and queen promotions) by MVV-LVA.
pub fn order_captures(moves: MoveList) -> ArrayVec<ScoredMove, 256> {
    let mut scored: ArrayVec<ScoredMove, 256> = ArrayVec::new();

    for mv in moves {
        let mut score = match mv.capture() {
            Some(victim) => mvv_lva(victim, mv.role()),
            None => 0,
        };
        if mv.promotion() == Some(Role::Queen) {
            score += MVV_VALUE[piece_index(Role::Queen)];
        }
        scored.push(ScoredMove { mv, score });
    }

    scored.sort_by(|a, b| b.score.cmp(&a.score));
    scored
}
