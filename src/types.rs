use shakmaty::Move;

pub type Score = i32;

pub const SCORE_INFINITY: Score = 60_000;
pub const SCORE_MATE: Score = 50_000;
pub const MAX_PLY: usize = 128;
pub const DEFAULT_DEPTH: u8 = 6;
pub const DEFAULT_HASH_MB: usize = 64;

/// Scores beyond this magnitude encode a forced mate.
pub const MATE_BOUND: Score = SCORE_MATE - MAX_PLY as Score;

/// Score for the side to move being mated at `ply`.
#[inline]
pub fn mated_in(ply: usize) -> Score {
    -(SCORE_MATE - ply as Score)
}

#[inline]
pub fn is_mate_score(score: Score) -> bool {
    score.abs() > MATE_BOUND
}

/// Raised when the time budget runs out mid-iteration. Every frame hands it
/// back to its caller untouched; the driver discards the unfinished depth.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Aborted;

/// Caller-side bounds on a single search.
#[derive(Clone, Copy, Debug, Default)]
pub struct SearchLimits {
    pub max_depth: Option<u8>,
    pub budget_ms: Option<u64>,
}

impl SearchLimits {
    pub fn depth(depth: u8) -> Self {
        Self { max_depth: Some(depth), budget_ms: None }
    }

    pub fn movetime(ms: u64) -> Self {
        Self { max_depth: None, budget_ms: Some(ms) }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    pub nodes: u64,
    pub qnodes: u64,
    pub tt_hits: u64,
    pub null_moves: u64,
    pub null_cutoffs: u64,
    pub rfp_cutoffs: u64,
    pub futility_skips: u64,
    /// Same-depth re-searches after the score left the aspiration window.
    pub aspiration_researches: u64,
}

#[derive(Clone, Debug)]
pub struct SearchResult {
    pub best_move: Move,
    pub score: Score,
    pub depth: u8,
    pub pv: Vec<Move>,
    pub elapsed_ms: u64,
    pub stats: SearchStats,
}
