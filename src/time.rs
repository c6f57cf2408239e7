use std::time::Instant;

use crate::config::TimeParams;

/// Per-move clock: the budget for the current move and the time already spent on it.
#[derive(Clone, Debug)]
pub struct TimeManager {
    start: Instant,
    budget_ms: Option<u64>,
    soft_fraction: f64,
}

impl TimeManager {
    /// Budget from the remaining clock, the increment and how far into the game we are.
    pub fn for_move(remaining_ms: u64, increment_ms: u64, game_ply: u32, params: &TimeParams) -> Self {
        Self {
            start: Instant::now(),
            budget_ms: Some(allocate_ms(remaining_ms, increment_ms, game_ply, params)),
            soft_fraction: params.soft_fraction,
        }
    }

    /// Fixed budget, as for `go movetime`.
    pub fn fixed(budget_ms: u64) -> Self {
        Self {
            start: Instant::now(),
            budget_ms: Some(budget_ms),
            soft_fraction: 1.0,
        }
    }

    /// No clock; the search is bounded by depth only.
    pub fn unlimited() -> Self {
        Self {
            start: Instant::now(),
            budget_ms: None,
            soft_fraction: 1.0,
        }
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.start.elapsed().as_millis() as u64
    }

    pub fn budget_ms(&self) -> Option<u64> {
        self.budget_ms
    }

    /// Hard limit: the running iteration must stop.
    pub fn is_expired(&self) -> bool {
        self.budget_ms.is_some_and(|budget| self.elapsed_ms() >= budget)
    }

    /// Soft limit: whether a new iteration is worth starting.
    pub fn can_start_iteration(&self) -> bool {
        match self.budget_ms {
            Some(budget) => (self.elapsed_ms() as f64) < budget as f64 * self.soft_fraction,
            None => true,
        }
    }
}

/// Divisor of the remaining clock for this ply: `base_divisor` in the opening and
/// endgame, dipping smoothly to `middlegame_divisor` around `peak_ply`.
pub fn divisor(game_ply: u32, params: &TimeParams) -> f64 {
    let x = (game_ply as f64 - params.peak_ply) / params.peak_width.max(1.0);
    let bump = (-x * x).exp();
    params.base_divisor - (params.base_divisor - params.middlegame_divisor) * bump
}

pub fn allocate_ms(remaining_ms: u64, increment_ms: u64, game_ply: u32, params: &TimeParams) -> u64 {
    let remaining = remaining_ms as f64;
    let raw = remaining / divisor(game_ply, params).max(1.0)
        + increment_ms as f64 * params.increment_fraction;
    let capped = raw.min(remaining * params.max_fraction);
    let budget = (capped as u64).saturating_sub(params.move_overhead_ms);

    // Always leave room for at least one iteration, but never bet half the clock on it.
    budget.max(params.min_budget_ms).min(remaining_ms / 2).max(1)
}


// Hard limit: search aborts when elapsed >= budget (polled every `poll_interval_nodes`
// nodes, after a child search returns).
// Soft limit: iterative deepening stops starting new depths past `soft_fraction` of the budget.
