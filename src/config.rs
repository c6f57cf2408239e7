use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::types::{DEFAULT_HASH_MB, MAX_PLY, Score};

/// How long transposition table contents survive.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TtLifetime {
    /// Cleared at the start of every search.
    PerMove,
    /// Kept for the engine instance until `new_game`.
    #[default]
    PerGame,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    pub hash_mb: usize,
    pub tt_lifetime: TtLifetime,
    pub search: SearchParams,
    pub eval: EvalParams,
    pub time: TimeParams,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            hash_mb: DEFAULT_HASH_MB,
            tt_lifetime: TtLifetime::default(),
            search: SearchParams::default(),
            eval: EvalParams::default(),
            time: TimeParams::default(),
        }
    }
}

impl EngineConfig {
    pub fn from_toml_str(src: &str) -> Result<Self, EngineError> {
        let mut config: EngineConfig = toml::from_str(src)?;
        config.normalize();
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, EngineError> {
        let path = path.as_ref();
        let src = fs::read_to_string(path).map_err(|source| EngineError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&src)
    }

    fn normalize(&mut self) {
        if self.hash_mb == 0 {
            self.hash_mb = DEFAULT_HASH_MB;
        }
        self.search.max_depth = self.search.max_depth.clamp(1, (MAX_PLY / 2) as u8);
        self.search.poll_interval_nodes = self.search.poll_interval_nodes.max(1);
    }
}

/// Pruning margins and search switches. All values are empirically tuned.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchParams {
    pub max_depth: u8,
    pub aspiration_window: Score,
    pub aspiration_max_window: Score,
    pub rfp_max_depth: u8,
    pub rfp_margin: Score,
    pub null_move_min_depth: u8,
    pub null_move_reduction: u8,
    pub futility_max_depth: u8,
    pub futility_margin: Score,
    pub poll_interval_nodes: u64,
    pub stop_on_mate: bool,
}

impl Default for SearchParams {
    fn default() -> Self {
        Self {
            max_depth: 64,
            aspiration_window: 40,
            aspiration_max_window: 1000,
            rfp_max_depth: 3,
            rfp_margin: 120,
            null_move_min_depth: 2,
            null_move_reduction: 2,
            futility_max_depth: 2,
            futility_margin: 150,
            poll_interval_nodes: 2048,
            stop_on_mate: true,
        }
    }
}

/// Material and tempo terms. Arrays are indexed pawn, knight, bishop, rook, queen, king.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EvalParams {
    pub piece_values: [Score; 6],
    /// Per-piece adjustment multiplied by the number of pawns missing from the board.
    pub pawn_modifier: [Score; 6],
    pub tempo: Score,
}

impl Default for EvalParams {
    fn default() -> Self {
        Self {
            piece_values: [100, 325, 325, 550, 1000, 0],
            pawn_modifier: [0, -1, 0, 1, 0, 0],
            tempo: 10,
        }
    }
}

/// Shape of the per-move time allocation curve.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeParams {
    /// Share of the clock (1/divisor) spent per move in the opening and endgame.
    pub base_divisor: f64,
    /// Divisor at the middlegame peak; smaller means more time per move.
    pub middlegame_divisor: f64,
    pub peak_ply: f64,
    pub peak_width: f64,
    pub increment_fraction: f64,
    pub max_fraction: f64,
    /// A new iteration starts only while elapsed < soft_fraction * budget.
    pub soft_fraction: f64,
    pub min_budget_ms: u64,
    pub move_overhead_ms: u64,
}

impl Default for TimeParams {
    fn default() -> Self {
        Self {
            base_divisor: 40.0,
            middlegame_divisor: 25.0,
            peak_ply: 40.0,
            peak_width: 30.0,
            increment_fraction: 0.75,
            max_fraction: 0.5,
            soft_fraction: 0.5,
            min_budget_ms: 5,
            move_overhead_ms: 10,
        }
    }
}
