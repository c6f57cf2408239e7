use shakmaty::Move;
use tracing::{debug, info, trace};

use crate::config::{EngineConfig, EvalParams, SearchParams, TtLifetime};
use crate::error::EngineError;
use crate::evaluation::evaluate_with;
use crate::movegen::{HistoryTable, order_captures, order_moves};
use crate::position::{Position, uci_string};
use crate::time::TimeManager;
use crate::tt::{Bound, TranspositionTable};
use crate::types::{
    Aborted, MAX_PLY, SCORE_INFINITY, SCORE_MATE, Score, SearchLimits, SearchResult, SearchStats,
    is_mate_score, mated_in,
};

/// Mutable state for one search call, threaded through the recursion.
pub struct SearchContext<'a> {
    pub tt: &'a mut TranspositionTable,
    pub params: &'a SearchParams,
    pub eval: &'a EvalParams,
    pub history: HistoryTable,
    pub time: TimeManager,
    pub stats: SearchStats,
    pub root_best_move: Option<Move>,
    can_abort: bool,
    last_poll: u64,
}

impl<'a> SearchContext<'a> {
    pub fn new(
        tt: &'a mut TranspositionTable,
        params: &'a SearchParams,
        eval: &'a EvalParams,
        time: TimeManager,
    ) -> Self {
        Self {
            tt,
            params,
            eval,
            history: HistoryTable::new(),
            time,
            stats: SearchStats::default(),
            root_best_move: None,
            can_abort: true,
            last_poll: 0,
        }
    }

    /// Checks the clock every `poll_interval_nodes` nodes.
    fn poll_time(&mut self) -> Result<(), Aborted> {
        let visited = self.stats.nodes + self.stats.qnodes;
        if visited - self.last_poll < self.params.poll_interval_nodes {
            return Ok(());
        }
        self.last_poll = visited;
        if self.can_abort && self.time.is_expired() {
            return Err(Aborted);
        }
        Ok(())
    }
}

/// Owns the transposition table and configuration across the moves of a game.
pub struct Engine {
    config: EngineConfig,
    tt: TranspositionTable,
}

impl Default for Engine {
    fn default() -> Self {
        Self::new(EngineConfig::default())
    }
}

impl Engine {
    pub fn new(config: EngineConfig) -> Self {
        let tt = TranspositionTable::new(config.hash_mb);
        Self { config, tt }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn tt(&self) -> &TranspositionTable {
        &self.tt
    }

    pub fn new_game(&mut self) {
        self.tt.clear();
    }

    pub fn resize_tt(&mut self, mb: usize) {
        self.config.hash_mb = mb;
        self.tt = TranspositionTable::new(mb);
    }

    /// Picks a move for the side to move given its remaining clock and increment.
    pub fn choose_move(
        &mut self,
        pos: &mut Position,
        time_remaining_ms: u64,
        increment_ms: u64,
    ) -> Result<Move, EngineError> {
        self.think_on_clock(pos, time_remaining_ms, increment_ms)
            .map(|result| result.best_move)
    }

    /// Clock-driven search returning the full result.
    pub fn think_on_clock(
        &mut self,
        pos: &mut Position,
        time_remaining_ms: u64,
        increment_ms: u64,
    ) -> Result<SearchResult, EngineError> {
        let time = TimeManager::for_move(
            time_remaining_ms,
            increment_ms,
            pos.game_ply(),
            &self.config.time,
        );
        info!(
            remaining_ms = time_remaining_ms,
            increment_ms,
            budget_ms = ?time.budget_ms(),
            "choosing move"
        );
        let max_depth = self.config.search.max_depth;
        self.run(pos, time, max_depth)
    }

    /// Depth- and/or time-limited search returning the full result.
    pub fn think(&mut self, pos: &mut Position, limits: SearchLimits) -> Result<SearchResult, EngineError> {
        let time = match limits.budget_ms {
            Some(ms) => TimeManager::fixed(ms),
            None => TimeManager::unlimited(),
        };
        let max_depth = limits.max_depth.unwrap_or(self.config.search.max_depth);
        self.run(pos, time, max_depth)
    }

    fn run(&mut self, pos: &mut Position, time: TimeManager, max_depth: u8) -> Result<SearchResult, EngineError> {
        if self.config.tt_lifetime == TtLifetime::PerMove {
            self.tt.clear();
        }

        let mut ctx = SearchContext::new(&mut self.tt, &self.config.search, &self.config.eval, time);
        let result = iterative_deepening(pos, &mut ctx, max_depth.max(1)).ok_or(EngineError::NoLegalMoves)?;

        info!(
            best = %uci_string(&result.best_move),
            score = result.score,
            depth = result.depth,
            nodes = result.stats.nodes + result.stats.qnodes,
            elapsed_ms = result.elapsed_ms,
            "search finished"
        );
        Ok(result)
    }
}

/// Iterative deepening with aspiration windows. Returns the last fully completed
/// iteration, or None when the side to move has no legal moves.
pub fn iterative_deepening(pos: &mut Position, ctx: &mut SearchContext, max_depth: u8) -> Option<SearchResult> {
    let root_moves = pos.legal_moves(false);
    if root_moves.is_empty() {
        return None;
    }

    let mut completed: Option<SearchResult> = None;

    for depth in 1..=max_depth {
        if completed.is_some() && !ctx.time.can_start_iteration() {
            break;
        }
        // The first iteration always runs to completion so a move is available.
        ctx.can_abort = completed.is_some();

        let prev_score = completed.as_ref().map(|r| r.score);
        let (score, best_move) = match aspiration_search(pos, ctx, depth, prev_score) {
            Ok(found) => found,
            Err(Aborted) => {
                debug!(depth, elapsed_ms = ctx.time.elapsed_ms(), "iteration aborted");
                break;
            }
        };

        debug_assert!(
            root_moves.contains(&best_move),
            "root move {} is not legal",
            uci_string(&best_move)
        );

        let pv = extract_pv(pos, ctx.tt, &best_move, depth as usize);
        let elapsed_ms = ctx.time.elapsed_ms();
        debug!(
            depth,
            score,
            nodes = ctx.stats.nodes,
            qnodes = ctx.stats.qnodes,
            elapsed_ms,
            pv = %format_pv(&pv),
            "iteration complete"
        );

        completed = Some(SearchResult {
            best_move,
            score,
            depth,
            pv,
            elapsed_ms,
            stats: ctx.stats,
        });

        if ctx.params.stop_on_mate && is_mate_score(score) {
            break;
        }
        if ctx.time.is_expired() {
            break;
        }
    }

    completed
}

/// Aspiration bounds for one depth, centred on the previous iteration's score.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Window {
    alpha: Score,
    beta: Score,
    center: Score,
    delta: Score,
}

impl Window {
    /// Full window for the first depth and after a mate score.
    fn around(prev_score: Option<Score>, params: &SearchParams) -> Self {
        let delta = params.aspiration_window.max(1);
        match prev_score {
            Some(prev) if !is_mate_score(prev) => Self {
                alpha: prev - delta,
                beta: prev + delta,
                center: prev,
                delta,
            },
            _ => Self {
                alpha: -SCORE_INFINITY,
                beta: SCORE_INFINITY,
                center: prev_score.unwrap_or(0),
                delta,
            },
        }
    }

    /// Doubles the window on the side `score` fell out of, opening it fully once
    /// past `max_window`. False when the score landed inside.
    fn widen(&mut self, score: Score, max_window: Score) -> bool {
        let failed_low = score <= self.alpha && self.alpha > -SCORE_INFINITY;
        let failed_high = score >= self.beta && self.beta < SCORE_INFINITY;
        if !failed_low && !failed_high {
            return false;
        }

        self.delta = self.delta.saturating_mul(2);
        let open = self.delta > max_window;
        if failed_low {
            self.alpha = if open { -SCORE_INFINITY } else { (self.center - self.delta).max(-SCORE_INFINITY) };
        } else {
            self.beta = if open { SCORE_INFINITY } else { (self.center + self.delta).min(SCORE_INFINITY) };
        }
        true
    }
}

/// Searches one depth, re-searching the same depth until the score lands inside the window.
fn aspiration_search(
    pos: &mut Position,
    ctx: &mut SearchContext,
    depth: u8,
    prev_score: Option<Score>,
) -> Result<(Score, Move), Aborted> {
    let mut window = Window::around(prev_score, ctx.params);

    loop {
        ctx.root_best_move = None;
        let score = negamax(pos, ctx, depth, 0, window.alpha, window.beta, true)?;

        if window.widen(score, ctx.params.aspiration_max_window) {
            ctx.stats.aspiration_researches += 1;
            trace!(depth, score, alpha = window.alpha, beta = window.beta, "outside window, widening");
            continue;
        }

        // The first searched root move always sets this.
        return ctx.root_best_move.take().map(|mv| (score, mv)).ok_or(Aborted);
    }
}

/// Whether a null move may be tried at this node.
pub fn null_move_allowed(pos: &Position, depth: u8, allow_null: bool, params: &SearchParams) -> bool {
    allow_null
        && depth >= params.null_move_min_depth
        && !pos.is_check()
        && pos.has_non_pawn_material(pos.side_to_move())
}

/// Negamax with alpha-beta pruning, TT, null-move and futility pruning.
pub fn negamax(
    pos: &mut Position,
    ctx: &mut SearchContext,
    depth: u8,
    ply: usize,
    mut alpha: Score,
    beta: Score,
    allow_null: bool,
) -> Result<Score, Aborted> {
    ctx.stats.nodes += 1;
    let params = ctx.params;

    if ply > 0 && pos.is_draw() {
        return Ok(0);
    }

    // TT probe
    let key = pos.key();
    let mut hash_move: Option<Move> = None;

    if let Some(entry) = ctx.tt.probe(key) {
        hash_move = entry.best_move.clone();
        if ply > 0
            && entry.depth >= depth
            && let Some(score) = entry.cutoff(ply, alpha, beta)
        {
            ctx.stats.tt_hits += 1;
            return Ok(score);
        }
    }

    // Leaf node: switch to quiescence search
    if depth == 0 || ply >= MAX_PLY {
        return Ok(quiescence(pos, ctx, ply, alpha, beta));
    }

    let in_check = pos.is_check();
    let side = pos.side_to_move();
    let null_window = beta - alpha <= 1;
    let mut prune_quiets = false;

    if !in_check && ply > 0 && !null_window {
        let static_eval = evaluate_with(pos, ctx.eval);

        // Reverse futility: far enough above beta that a shallow search won't come back down.
        if depth <= params.rfp_max_depth && !is_mate_score(beta) {
            let margin = params.rfp_margin * Score::from(depth);
            if static_eval - margin >= beta {
                ctx.stats.rfp_cutoffs += 1;
                return Ok(static_eval - margin);
            }
        }

        // Null move: if passing still beats beta, a real move will too.
        if null_move_allowed(pos, depth, allow_null, params) && pos.skip_turn() {
            ctx.stats.null_moves += 1;
            let reduced = depth.saturating_sub(1 + params.null_move_reduction);
            let result = negamax(pos, ctx, reduced, ply + 1, -beta, -beta + 1, false);
            pos.undo_skip_turn();
            let score = -result?;
            if score >= beta {
                ctx.stats.null_cutoffs += 1;
                return Ok(beta);
            }
        }

        // Extended futility: too far below alpha for a quiet move to matter.
        if depth <= params.futility_max_depth
            && !is_mate_score(alpha)
            && static_eval + params.futility_margin * Score::from(depth) <= alpha
        {
            prune_quiets = true;
        }
    }

    let moves = pos.legal_moves(false);
    if moves.is_empty() {
        return Ok(if in_check { mated_in(ply) } else { 0 });
    }

    let ordered = order_moves(side, moves, hash_move.as_ref(), &ctx.history);

    let original_alpha = alpha;
    let mut best_score = -SCORE_INFINITY;
    let mut best_move: Option<Move> = None;
    let mut searched = 0usize;

    for scored in &ordered {
        let mv = &scored.mv;
        let quiet = mv.capture().is_none() && mv.promotion().is_none();

        pos.make_move(mv);

        if prune_quiets && searched > 0 && quiet && !pos.is_check() {
            pos.undo_move();
            ctx.stats.futility_skips += 1;
            continue;
        }

        let result = negamax(pos, ctx, depth - 1, ply + 1, -beta, -alpha, true);
        pos.undo_move();
        let score = -result?;
        searched += 1;

        ctx.poll_time()?;

        if score > best_score {
            best_score = score;
            best_move = Some(mv.clone());
            if ply == 0 {
                ctx.root_best_move = Some(mv.clone());
            }
        }

        if score > alpha {
            alpha = score;
        }

        // Beta cutoff
        if alpha >= beta {
            if quiet {
                ctx.history.reward(side, mv.role(), mv.to(), depth);
            }
            break;
        }
    }

    let bound = if best_score >= beta {
        Bound::Lower
    } else if best_score <= original_alpha {
        Bound::Upper
    } else {
        Bound::Exact
    };

    ctx.tt.store(key, depth, best_score, bound, best_move, ply);

    Ok(best_score)
}

/// Quiescence search: captures and queen promotions (all evasions when in check).
pub fn quiescence(pos: &mut Position, ctx: &mut SearchContext, ply: usize, mut alpha: Score, beta: Score) -> Score {
    ctx.stats.qnodes += 1;

    if ply >= MAX_PLY {
        return evaluate_with(pos, ctx.eval);
    }

    if pos.is_check() {
        // Standing pat is illegal in check
        let moves = pos.legal_moves(false);
        if moves.is_empty() {
            return mated_in(ply);
        }
        let ordered = order_moves(pos.side_to_move(), moves, None, &ctx.history);
        for scored in &ordered {
            pos.make_move(&scored.mv);
            let score = -quiescence(pos, ctx, ply + 1, -beta, -alpha);
            pos.undo_move();

            if score >= beta {
                return beta;
            }
            if score > alpha {
                alpha = score;
            }
        }
        return alpha;
    }

    let stand_pat = evaluate_with(pos, ctx.eval);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    let captures = order_captures(pos.tactical_moves());
    for scored in &captures {
        pos.make_move(&scored.mv);
        let score = -quiescence(pos, ctx, ply + 1, -beta, -alpha);
        pos.undo_move();

        if score >= beta {
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    alpha
}

/// Principal variation: the root move followed by the TT hash-move chain.
pub fn extract_pv(pos: &mut Position, tt: &TranspositionTable, root_move: &Move, max_moves: usize) -> Vec<Move> {
    let mut pv = vec![root_move.clone()];
    pos.make_move(root_move);
    let mut seen: Vec<u64> = vec![pos.key()];

    while pv.len() < max_moves {
        let Some(mv) = tt.probe(pos.key()).and_then(|e| e.best_move.clone()) else {
            break;
        };
        if !pos.is_legal(&mv) {
            break;
        }
        pos.make_move(&mv);
        pv.push(mv);
        if seen.contains(&pos.key()) {
            break;
        }
        seen.push(pos.key());
    }

    for _ in 0..pv.len() {
        pos.undo_move();
    }
    pv
}

pub fn format_pv(pv: &[Move]) -> String {
    pv.iter().map(uci_string).collect::<Vec<_>>().join(" ")
}

/// Format a score for UCI output (centipawns or mate-in-N).
pub fn format_score(score: Score) -> String {
    if is_mate_score(score) {
        let mate_ply = SCORE_MATE - score.abs();
        let mate_moves = (mate_ply + 1) / 2;
        if score > 0 {
            format!("score mate {}", mate_moves)
        } else {
            format!("score mate -{}", mate_moves)
        }
    } else {
        format!("score cp {}", score)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_context<R>(f: impl FnOnce(&mut SearchContext) -> R) -> R {
        let config = EngineConfig::default();
        let mut tt = TranspositionTable::new(1);
        let mut ctx = SearchContext::new(&mut tt, &config.search, &config.eval, TimeManager::unlimited());
        f(&mut ctx)
    }

    #[test]
    fn test_search_finds_move() {
        let mut pos = Position::default();
        let result = Engine::default().think(&mut pos, SearchLimits::depth(3)).unwrap();
        assert!(pos.is_legal(&result.best_move));
        assert_eq!(result.depth, 3);
        assert!(result.stats.nodes > 0);
    }

    #[test]
    fn test_search_finds_mate_in_one() {
        let mut pos =
            Position::from_fen("r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4").unwrap();
        let result = Engine::default().think(&mut pos, SearchLimits::depth(2)).unwrap();
        assert_eq!(uci_string(&result.best_move), "h5f7", "Expected Qxf7#");
        assert_eq!(result.score, SCORE_MATE - 1);
    }

    #[test]
    fn test_checkmate_score() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        let score = with_context(|ctx| negamax(&mut pos, ctx, 1, 0, -SCORE_INFINITY, SCORE_INFINITY, true));
        assert_eq!(score, Ok(-SCORE_MATE));

        let score = with_context(|ctx| negamax(&mut pos, ctx, 1, 4, -SCORE_INFINITY, SCORE_INFINITY, true));
        assert_eq!(score, Ok(mated_in(4)));
    }

    #[test]
    fn test_stalemate_scores_zero() {
        let mut pos = Position::from_fen("7k/5Q2/6K1/8/8/8/8/8 b - - 0 1").unwrap();
        let score = with_context(|ctx| negamax(&mut pos, ctx, 3, 0, -SCORE_INFINITY, SCORE_INFINITY, true));
        assert_eq!(score, Ok(0));
    }

    #[test]
    fn test_draw_detection_repetition() {
        let mut pos = Position::default();
        for uci in ["g1f3", "g8f6", "f3g1", "f6g8"] {
            pos.play_uci(uci).unwrap();
        }
        let score = with_context(|ctx| negamax(&mut pos, ctx, 3, 1, -SCORE_INFINITY, SCORE_INFINITY, true));
        assert_eq!(score, Ok(0), "Repeated position should return 0 (draw)");
    }

    #[test]
    fn test_quiescence_in_check() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        let score = with_context(|ctx| quiescence(&mut pos, ctx, 0, -SCORE_INFINITY, SCORE_INFINITY));
        assert_eq!(score, -SCORE_MATE);
    }

    #[test]
    fn test_quiescence_sees_hanging_queen() {
        // Black queen en prise to a pawn: quiescence should find the win
        let mut pos = Position::from_fen("4k3/8/8/3q4/4P3/8/8/4K3 w - - 0 1").unwrap();
        let key = pos.key();
        let stand_pat = evaluate_with(&pos, &EvalParams::default());
        let score = with_context(|ctx| quiescence(&mut pos, ctx, 0, -SCORE_INFINITY, SCORE_INFINITY));
        assert!(score > stand_pat + 800, "qsearch {} vs static {}", score, stand_pat);
        assert_eq!(pos.key(), key, "position restored");
    }

    #[test]
    fn test_quiescence_sees_quiet_queen_promotion() {
        let mut pos = Position::from_fen("8/4P3/8/8/8/8/k7/4K3 w - - 0 1").unwrap();
        let stand_pat = evaluate_with(&pos, &EvalParams::default());
        let score = with_context(|ctx| quiescence(&mut pos, ctx, 0, -SCORE_INFINITY, SCORE_INFINITY));
        assert!(score > stand_pat + 600, "qsearch {} vs static {}", score, stand_pat);
    }

    #[test]
    fn test_reverse_futility_fails_soft() {
        // A rook up, window far below the static eval
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let config = EngineConfig::default();
        let static_eval = evaluate_with(&pos, &config.eval);
        let expected = static_eval - 2 * config.search.rfp_margin;

        with_context(|ctx| {
            let score = negamax(&mut pos, ctx, 2, 1, -1000, -900, true);
            assert_eq!(score, Ok(expected));
            assert_eq!(ctx.stats.rfp_cutoffs, 1);
            assert_eq!(ctx.stats.nodes, 1, "no child searched");
        });
    }

    #[test]
    fn test_extended_futility_searches_first_move() {
        // Window far above the static eval: quiet moves after the first are skipped
        let mut pos = Position::from_fen("4k3/8/8/8/8/8/8/R3K3 w - - 0 1").unwrap();
        let key = pos.key();

        with_context(|ctx| {
            let score = negamax(&mut pos, ctx, 1, 1, 2000, 2100, true).unwrap();
            assert!(score <= 2000);
            assert_eq!(ctx.stats.rfp_cutoffs, 0);
            assert!(ctx.stats.nodes > 1, "at least one child searched");
            assert!(ctx.stats.futility_skips > 0);
        });
        assert_eq!(pos.key(), key);
    }

    #[test]
    fn test_window_widens_failing_side_only() {
        let params = SearchParams::default();
        let mut window = Window::around(Some(100), &params);
        assert_eq!((window.alpha, window.beta), (60, 140));

        assert!(window.widen(50, params.aspiration_max_window));
        assert_eq!((window.alpha, window.beta, window.delta), (20, 140, 80));

        assert!(window.widen(200, params.aspiration_max_window));
        assert_eq!((window.alpha, window.beta, window.delta), (20, 260, 160));

        assert!(!window.widen(100, params.aspiration_max_window));
    }

    #[test]
    fn test_window_opens_past_max() {
        let params = SearchParams::default();
        let mut window = Window::around(Some(0), &params);
        let mut researches = 0;
        while window.widen(-SCORE_MATE, params.aspiration_max_window) {
            researches += 1;
        }
        // 80, 160, 320, 640, then 1280 > 1000 opens the low side
        assert_eq!(researches, 5);
        assert_eq!(window.alpha, -SCORE_INFINITY);
        assert_eq!(window.beta, 40);
    }

    #[test]
    fn test_window_full_without_usable_previous_score() {
        let params = SearchParams::default();
        for prev in [None, Some(SCORE_MATE - 3), Some(-(SCORE_MATE - 8))] {
            let window = Window::around(prev, &params);
            assert_eq!((window.alpha, window.beta), (-SCORE_INFINITY, SCORE_INFINITY));
        }
    }

    #[test]
    fn test_narrow_window_researches() {
        let mut config = EngineConfig::default();
        config.search.aspiration_window = 1;
        let mut engine = Engine::new(config);
        let mut pos = Position::default();
        let result = engine.think(&mut pos, SearchLimits::depth(5)).unwrap();
        assert!(result.stats.aspiration_researches > 0);
        assert!(pos.is_legal(&result.best_move));
    }

    #[test]
    fn test_tt_reduces_nodes() {
        let mut pos = Position::default();
        let mut engine = Engine::default();

        let first = engine.think(&mut pos, SearchLimits::depth(4)).unwrap();
        let second = engine.think(&mut pos, SearchLimits::depth(4)).unwrap();

        assert!(
            second.stats.nodes <= first.stats.nodes,
            "Second search ({} nodes) should use <= first ({} nodes) due to TT",
            second.stats.nodes,
            first.stats.nodes
        );
    }

    #[test]
    fn test_tt_stored_after_search() {
        let mut pos = Position::default();
        let mut engine = Engine::default();
        let result = engine.think(&mut pos, SearchLimits::depth(3)).unwrap();
        let entry = engine.tt().probe(pos.key()).unwrap();
        assert_eq!(entry.depth, 3);
        assert_eq!(entry.best_move.as_ref(), Some(&result.best_move));
    }

    #[test]
    fn test_deeper_entry_kept_across_moves() {
        let mut pos = Position::default();
        let mut engine = Engine::default();
        engine.think(&mut pos, SearchLimits::depth(5)).unwrap();
        engine.think(&mut pos, SearchLimits::depth(2)).unwrap();
        assert_eq!(engine.tt().probe(pos.key()).unwrap().depth, 5);

        engine.new_game();
        assert!(engine.tt().probe(pos.key()).is_none());
    }

    #[test]
    fn test_null_move_disallowed_in_check_and_pawn_endings() {
        let params = SearchParams::default();
        let in_check = Position::from_fen("k7/8/8/8/8/8/8/1R2K2q w - - 0 1").unwrap();
        assert!(in_check.is_check());
        assert!(!null_move_allowed(&in_check, 6, true, &params));

        let pawns = Position::from_fen("8/8/8/8/5K2/8/5P2/7k w - - 0 1").unwrap();
        assert!(!null_move_allowed(&pawns, 6, true, &params));

        let normal = Position::default();
        assert!(null_move_allowed(&normal, 6, true, &params));
        assert!(!null_move_allowed(&normal, 6, false, &params));
        assert!(!null_move_allowed(&normal, 1, true, &params));
    }

    #[test]
    fn test_pruning_fires_in_middlegame() {
        let mut pos =
            Position::from_fen("r1bqkbnr/pppp1ppp/2n5/4p3/2B1P3/5N2/PPPP1PPP/RNBQK2R w KQkq - 2 3").unwrap();
        let result = Engine::default().think(&mut pos, SearchLimits::depth(5)).unwrap();
        assert!(result.stats.null_moves > 0);
        assert!(result.stats.rfp_cutoffs + result.stats.futility_skips > 0);
    }

    #[test]
    fn test_abort_keeps_completed_iteration() {
        let mut pos = Position::default();
        let mut engine = Engine::default();
        let result = engine.think(&mut pos, SearchLimits { max_depth: Some(30), budget_ms: Some(1) }).unwrap();
        assert!(result.depth >= 1);
        assert!(result.depth < 30);
        assert!(pos.is_legal(&result.best_move));
    }

    #[test]
    fn test_no_legal_moves_is_an_error() {
        let mut pos =
            Position::from_fen("rnbqkbnr/pppp1ppp/4p3/8/6Pq/5P2/PPPPP2P/RNBQKBNR w KQkq - 1 3").unwrap();
        let err = Engine::default().choose_move(&mut pos, 1_000, 0).unwrap_err();
        assert!(matches!(err, EngineError::NoLegalMoves));
    }

    #[test]
    fn test_pv_extraction() {
        let mut pos = Position::default();
        let key = pos.key();
        let result = Engine::default().think(&mut pos, SearchLimits::depth(4)).unwrap();
        assert_eq!(result.pv.first(), Some(&result.best_move));
        assert!(result.pv.len() <= 4);
        assert_eq!(pos.key(), key);
    }

    #[test]
    fn test_mate_score_format() {
        assert_eq!(format_score(SCORE_MATE - 1), "score mate 1");
        assert_eq!(format_score(SCORE_MATE - 3), "score mate 2");
        assert_eq!(format_score(-(SCORE_MATE - 1)), "score mate -1");
        assert_eq!(format_score(-(SCORE_MATE - 2)), "score mate -1");
        assert_eq!(format_score(100), "score cp 100");
        assert_eq!(format_score(-50), "score cp -50");
    }
}

// Iterative deepening: search depth 1->2->3... with an aspiration window around the previous
// score. A fail low/high re-searches the same depth with that side of the window widened.
// Each iteration benefits from TT entries and history of the previous ones, and the result of
// the last complete iteration is always valid.

// Pruning happens only outside check, below the root and outside null-window (null-move
// verification) searches: reverse futility, null move, then extended futility which skips
// quiet moves after the first one.

// Timeout unwinds as Err(Aborted) through every frame via `?`; make/unmake stays balanced
// because each frame undoes its move before propagating.
