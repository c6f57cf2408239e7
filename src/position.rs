use shakmaty::fen::Fen;
use shakmaty::zobrist::{Zobrist64, ZobristHash};
use shakmaty::{Bitboard, CastlingMode, Chess, Color, EnPassantMode, Move, MoveList, Position as _, Role};

use crate::error::EngineError;

type Hashed = Chess;

/// Game state the search walks over: a `shakmaty` position with an incrementally
/// updated zobrist hash, plus the undo stack and key history needed for
/// make/unmake and repetition checks.
#[derive(Clone, Debug)]
pub struct Position {
    current: Hashed,
    undo: Vec<Hashed>,
    // keys.len() == undo.len() + 1; the last entry is the current key
    keys: Vec<u64>,
}

impl Default for Position {
    fn default() -> Self {
        Self::new(Chess::default())
    }
}

impl Position {
    pub fn new(chess: Chess) -> Self {
        let current = chess;
        let key = zobrist_key(&current);
        Self {
            current,
            undo: Vec::with_capacity(256),
            keys: vec![key],
        }
    }

    pub fn from_fen(fen: &str) -> Result<Self, EngineError> {
        let fen: Fen = fen.trim().parse()?;
        let chess: Chess = fen
            .into_position(CastlingMode::Standard)
            .map_err(|e| EngineError::IllegalPosition(e.to_string()))?;
        Ok(Self::new(chess))
    }

    pub fn to_fen(&self) -> String {
        Fen(self.chess().clone().into_setup(EnPassantMode::Legal)).to_string()
    }

    #[inline]
    pub fn chess(&self) -> &Chess {
        &self.current
    }

    #[inline]
    pub fn key(&self) -> u64 {
        self.keys[self.keys.len() - 1]
    }

    #[inline]
    pub fn side_to_move(&self) -> Color {
        self.current.turn()
    }

    /// Plies played since the start of the game, derived from the move counters.
    pub fn game_ply(&self) -> u32 {
        let full = self.current.fullmoves().get();
        (full - 1) * 2 + u32::from(self.side_to_move() == Color::Black)
    }

    /// Legal moves; with `captures_only` just captures (en passant included).
    pub fn legal_moves(&self, captures_only: bool) -> MoveList {
        if captures_only {
            self.current.capture_moves()
        } else {
            self.current.legal_moves()
        }
    }

    /// Moves quiescence looks at: captures plus queen promotions, capturing or not.
    pub fn tactical_moves(&self) -> MoveList {
        let mut moves = self.current.legal_moves();
        moves.retain(|m| m.is_capture() || m.promotion() == Some(Role::Queen));
        moves
    }

    pub fn is_legal(&self, mv: &Move) -> bool {
        self.current.is_legal(mv)
    }

    #[inline]
    pub fn is_check(&self) -> bool {
        self.current.is_check()
    }

    pub fn make_move(&mut self, mv: &Move) {
        let prev = self.current.clone();
        self.current.play_unchecked(mv);
        self.undo.push(prev);
        self.keys.push(zobrist_key(&self.current));
    }

    pub fn undo_move(&mut self) {
        debug_assert!(!self.undo.is_empty(), "undo without a matching make");
        if let Some(prev) = self.undo.pop() {
            self.current = prev;
            self.keys.pop();
        }
    }

    /// Passes the turn. Refused (returns false) while in check.
    pub fn skip_turn(&mut self) -> bool {
        if self.is_check() {
            return false;
        }
        // Passing is rare enough to rehash from scratch.
        match self.chess().clone().swap_turn() {
            Ok(next) => {
                let prev = std::mem::replace(&mut self.current, next);
                self.undo.push(prev);
                self.keys.push(zobrist_key(&self.current));
                true
            }
            Err(_) => false,
        }
    }

    pub fn undo_skip_turn(&mut self) {
        self.undo_move();
    }

    /// True if the current key occurred earlier since the last irreversible move.
    pub fn is_repetition(&self) -> bool {
        let n = self.keys.len();
        let key = self.keys[n - 1];
        let reversible = (self.current.halfmoves() as usize).min(n - 1);
        (2..=reversible)
            .step_by(2)
            .any(|back| self.keys[n - 1 - back] == key)
    }

    pub fn is_fifty_move_draw(&self) -> bool {
        self.current.halfmoves() >= 100
    }

    pub fn is_draw(&self) -> bool {
        self.is_repetition() || self.is_fifty_move_draw() || self.current.is_insufficient_material()
    }

    pub fn piece_bitboard(&self, role: Role, color: Color) -> Bitboard {
        let board = self.current.board();
        board.by_role(role) & board.by_color(color)
    }

    /// Any knight, bishop, rook or queen for `color`.
    pub fn has_non_pawn_material(&self, color: Color) -> bool {
        let board = self.current.board();
        let minors_majors = board.by_role(Role::Knight)
            | board.by_role(Role::Bishop)
            | board.by_role(Role::Rook)
            | board.by_role(Role::Queen);
        (minors_majors & board.by_color(color)).any()
    }

    /// Finds the legal move spelled `uci` (e.g. `e7e8q`) and plays it.
    pub fn play_uci(&mut self, uci: &str) -> Result<Move, EngineError> {
        let mv = self
            .legal_moves(false)
            .into_iter()
            .find(|m| uci_string(m) == uci)
            .ok_or_else(|| EngineError::IllegalMove(uci.to_string()))?;
        self.make_move(&mv);
        Ok(mv)
    }
}

fn zobrist_key(pos: &Hashed) -> u64 {
    pos.zobrist_hash::<Zobrist64>(EnPassantMode::Legal).0
}

/// Standard-castling UCI spelling of a move.
pub fn uci_string(mv: &Move) -> String {
    mv.to_uci(CastlingMode::Standard).to_string()
}
