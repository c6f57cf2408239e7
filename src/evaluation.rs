use shakmaty::{Color, Role};

use crate::config::EvalParams;
use crate::position::Position;
use crate::pst::{self, EG, MG, PHASE_WEIGHT, TABLES, TOTAL_PHASE};
use crate::types::Score;

const ROLES: [Role; 6] = [Role::Pawn, Role::Knight, Role::Bishop, Role::Rook, Role::Queen, Role::King];

/// Maps a Role to our PST index (0-5)
pub fn piece_index(role: Role) -> usize {
    match role {
        Role::Pawn => pst::PAWN,
        Role::Knight => pst::KNIGHT,
        Role::Bishop => pst::BISHOP,
        Role::Rook => pst::ROOK,
        Role::Queen => pst::QUEEN,
        Role::King => pst::KING,
    }
}

/// Evaluates with default weights. See [`evaluate_with`].
pub fn evaluate(pos: &Position) -> Score {
    evaluate_with(pos, &EvalParams::default())
}

/// Tapered material + piece-square evaluation.
/// Returns score from perspective of side to move; 0 for a drawn position.
pub fn evaluate_with(pos: &Position, params: &EvalParams) -> Score {
    if pos.is_draw() {
        return 0;
    }

    let pawns = pos.piece_bitboard(Role::Pawn, Color::White).count()
        + pos.piece_bitboard(Role::Pawn, Color::Black).count();
    let missing_pawns = 16 - pawns.min(16) as Score;

    let mut mg: Score = 0; // white minus black
    let mut eg: Score = 0;
    let mut phase: i32 = 0;

    for color in [Color::White, Color::Black] {
        let sign = if color == Color::White { 1 } else { -1 };
        // Black reads the tables upside down
        let flip = if color == Color::White { 0 } else { 56 };

        for role in ROLES {
            let idx = piece_index(role);
            let material = params.piece_values[idx] + params.pawn_modifier[idx] * missing_pawns;

            for sq in pos.piece_bitboard(role, color) {
                let pst_idx = usize::from(sq) ^ flip;
                mg += sign * (material + Score::from(TABLES[MG + idx][pst_idx]));
                eg += sign * (material + Score::from(TABLES[EG + idx][pst_idx]));
                phase += PHASE_WEIGHT[idx];
            }
        }
    }

    let phase = phase.min(TOTAL_PHASE);
    let score = (mg * phase + eg * (TOTAL_PHASE - phase)) / TOTAL_PHASE;

    let relative = if pos.side_to_move() == Color::White { score } else { -score };
    relative + params.tempo
}
