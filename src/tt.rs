//! Transposition table.
//!
//! One slot per index, addressed by the low bits of the zobrist key. A slot is
//! only ever overwritten by a result searched at least as deep as the one it
//! holds; `clear` is the only way to forget a deep result.

use std::mem;

use shakmaty::Move;

use crate::types::{MATE_BOUND, Score};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Bound {
    /// Score is exact: the window held.
    Exact,
    /// Failed high; the true score is at least this.
    Lower,
    /// Failed low; the true score is at most this.
    Upper,
}

#[derive(Clone, Debug)]
pub struct TtEntry {
    pub key: u64,
    pub best_move: Option<Move>,
    /// Mate scores are stored relative to this node, not the root.
    score: Score,
    pub depth: u8,
    pub bound: Bound,
}

impl TtEntry {
    /// Score re-based to a node `ply` plies from the root.
    pub fn score_at(&self, ply: usize) -> Score {
        let ply = ply as Score;
        match self.score {
            s if s > MATE_BOUND => s - ply,
            s if s < -MATE_BOUND => s + ply,
            s => s,
        }
    }

    /// The stored score if its bound settles the `(alpha, beta)` window.
    pub fn cutoff(&self, ply: usize, alpha: Score, beta: Score) -> Option<Score> {
        let score = self.score_at(ply);
        let settles = match self.bound {
            Bound::Exact => true,
            Bound::Lower => score >= beta,
            Bound::Upper => score <= alpha,
        };
        settles.then_some(score)
    }
}

pub struct TranspositionTable {
    slots: Box<[Option<TtEntry>]>,
}

impl TranspositionTable {
    /// Table of roughly `mb` megabytes, rounded down to a power of two slots.
    pub fn new(mb: usize) -> Self {
        let budget = mb.max(1) * 1024 * 1024 / mem::size_of::<Option<TtEntry>>();
        let slots = (budget.next_power_of_two() / 2).max(1024);
        Self {
            slots: vec![None; slots].into_boxed_slice(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Occupied slots.
    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    fn index(&self, key: u64) -> usize {
        key as usize & (self.slots.len() - 1)
    }

    /// Entry for exactly this key; a slot shared with another key is a miss.
    pub fn probe(&self, key: u64) -> Option<&TtEntry> {
        self.slots[self.index(key)].as_ref().filter(|e| e.key == key)
    }

    pub fn store(&mut self, key: u64, depth: u8, score: Score, bound: Bound, best_move: Option<Move>, ply: usize) {
        let idx = self.index(key);
        if let Some(held) = &self.slots[idx]
            && depth < held.depth
        {
            return;
        }

        let ply = ply as Score;
        let score = if score > MATE_BOUND {
            score + ply
        } else if score < -MATE_BOUND {
            score - ply
        } else {
            score
        };

        self.slots[idx] = Some(TtEntry { key, best_move, score, depth, bound });
    }

    pub fn clear(&mut self) {
        self.slots.fill(None);
    }
}
