//! Move-selection engine: negamax search over a generic position oracle.

pub mod error;
pub mod eval;
pub mod position;
pub mod search;
pub mod time;

use std::sync::atomic::AtomicBool;
use std::sync::Arc;
use std::time::Duration;

use zugzwang_core::Move;

pub use error::EngineError;
pub use eval::{Evaluator, MaterialEvaluator};
pub use position::{GamePosition, Position};
pub use search::{control::SearchControl, tt::TranspositionTable, ProgressRecord};

const DEFAULT_TT_SIZE_MB: usize = 16;

/// Move-selection engine: owns a transposition table across calls and
/// drives iterative-deepening search with a caller-supplied evaluator.
pub struct Engine<E: Evaluator> {
    evaluator: E,
    tt: TranspositionTable,
}

impl<E: Evaluator> Engine<E> {
    /// Create an engine with a transposition table sized to `tt_size_mb`
    /// megabytes.
    pub fn new(evaluator: E, tt_size_mb: usize) -> Self {
        Engine {
            evaluator,
            tt: TranspositionTable::new(tt_size_mb),
        }
    }

    /// Drop every cached transposition-table entry, keeping the allocation.
    pub fn clear_tt(&mut self) {
        self.tt.clear();
    }

    /// Search to exactly `depth`, returning the best move found or `None`
    /// if the position has no legal moves.
    ///
    /// The position is restored to its pre-call state before returning;
    /// every internal push is paired with a pop.
    pub fn search_fixed_depth(&mut self, pos: &mut GamePosition, depth: u32) -> Option<Move> {
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        search::search_fixed_depth(pos, depth, &mut self.tt, &self.evaluator, &control, |r| {
            tracing::info!(
                depth = r.depth,
                best_move = ?r.best_move.map(|m| m.to_uci()),
                score = r.score,
                nodes = r.nodes,
                qnodes = r.qnodes,
                tt_hits = r.tt_hits,
                seconds = r.seconds,
                "completed iterative-deepening depth"
            );
        })
    }

    /// Search bounded by both `max_depth` and a wall-clock `time_limit`,
    /// stopping early on a mate find, a forecasted timeout, or a
    /// single-legal-move root.
    pub fn search_time_limited(
        &mut self,
        pos: &mut GamePosition,
        time_limit: Duration,
        min_depth: u32,
        max_depth: u32,
    ) -> Option<Move> {
        let control = SearchControl::new_timed(
            Arc::new(AtomicBool::new(false)),
            time_limit,
            time_limit,
        );
        let result = search::search_time_limited(
            pos,
            min_depth,
            max_depth,
            time_limit,
            &mut self.tt,
            &self.evaluator,
            &control,
            |r| {
                tracing::info!(
                    depth = r.depth,
                    best_move = ?r.best_move.map(|m| m.to_uci()),
                    score = r.score,
                    nodes = r.nodes,
                    qnodes = r.qnodes,
                    tt_hits = r.tt_hits,
                    seconds = r.seconds,
                    "completed iterative-deepening depth"
                );
            },
        );
        if result.is_none() && control.should_stop(u64::MAX) {
            tracing::warn!("search aborted by time budget before any depth completed");
        }
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use position::GamePosition;
    use zugzwang_core::Variant;

    #[test]
    fn fixed_depth_facade_returns_legal_move() {
        let mut engine = Engine::new(MaterialEvaluator, 1);
        let mut pos = GamePosition::new(
            zugzwang_core::STARTING_FEN.parse().unwrap(),
            Variant::Standard,
        );
        let mv = engine.search_fixed_depth(&mut pos, 3);
        assert!(mv.is_some());
    }

    #[test]
    fn fixed_depth_facade_is_deterministic_with_fresh_engine() {
        let mut e1 = Engine::new(MaterialEvaluator, 1);
        let mut e2 = Engine::new(MaterialEvaluator, 1);
        let mut p1 = GamePosition::new(
            zugzwang_core::STARTING_FEN.parse().unwrap(),
            Variant::Standard,
        );
        let mut p2 = GamePosition::new(
            zugzwang_core::STARTING_FEN.parse().unwrap(),
            Variant::Standard,
        );
        let mv1 = e1.search_fixed_depth(&mut p1, 3);
        let mv2 = e2.search_fixed_depth(&mut p2, 3);
        assert_eq!(mv1.map(|m| m.to_uci()), mv2.map(|m| m.to_uci()));
    }

    #[test]
    fn time_limited_facade_returns_legal_move() {
        let mut engine = Engine::new(MaterialEvaluator, 1);
        let mut pos = GamePosition::new(
            zugzwang_core::STARTING_FEN.parse().unwrap(),
            Variant::Standard,
        );
        let mv = engine.search_time_limited(&mut pos, Duration::from_millis(200), 1, 10);
        assert!(mv.is_some());
    }

    #[test]
    fn tt_persists_across_searches_on_same_engine() {
        let mut engine = Engine::new(MaterialEvaluator, 1);
        let mut pos = GamePosition::new(
            zugzwang_core::STARTING_FEN.parse().unwrap(),
            Variant::Standard,
        );
        engine.search_fixed_depth(&mut pos, 3);
        assert!(!engine.tt.is_empty());
    }
}
