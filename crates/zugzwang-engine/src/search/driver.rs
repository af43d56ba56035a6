//! Iterative-deepening driver: repeatedly calls negamax at increasing
//! depths, in either a fixed-depth or time-limited mode.

use std::time::{Duration, Instant};

use rand::seq::SliceRandom;
use zugzwang_core::Move;

use crate::eval::Evaluator;
use crate::position::{GamePosition, Position};
use crate::search::control::SearchControl;
use crate::search::heuristics::KillerTable;
use crate::search::negamax::{negamax, PvTable, SearchContext, INF, MATE_THRESHOLD};
use crate::search::tt::TranspositionTable;

/// One completed iterative-deepening depth, emitted after every iteration
/// regardless of which mode the driver is running in.
#[derive(Debug, Clone)]
pub struct ProgressRecord {
    /// Depth just completed.
    pub depth: u32,
    /// Best move found at this depth.
    pub best_move: Option<Move>,
    /// Score of `best_move`, from the side to move's perspective.
    pub score: i32,
    /// Main-search nodes visited at this depth (cumulative for the call).
    pub nodes: u64,
    /// Quiescence nodes visited at this depth (cumulative for the call).
    pub qnodes: u64,
    /// Transposition-table hits at this depth (cumulative for the call).
    pub tt_hits: u64,
    /// Wall-clock time elapsed since the call started.
    pub seconds: f64,
}

/// Run iterative deepening to exactly `target_depth`, seeding each
/// iteration's move ordering with the previous iteration's best move.
///
/// The TT is not cleared between iterations; deeper entries dominate older
/// ones naturally through depth-preferred replacement. The killer table is
/// cleared once, at the start of the call.
pub fn search_fixed_depth<E: Evaluator>(
    pos: &mut GamePosition,
    target_depth: u32,
    tt: &mut TranspositionTable,
    evaluator: &E,
    control: &SearchControl,
    mut on_depth: impl FnMut(&ProgressRecord),
) -> Option<Move> {
    let start = Instant::now();
    let mut best_move = None;
    let mut pv_seed = None;
    let mut killers = KillerTable::new();

    for depth in 1..=target_depth {
        let mut ctx = SearchContext {
            nodes: 0,
            qnodes: 0,
            tt_hits: 0,
            tt,
            killers,
            control,
            pv: PvTable::new(),
            evaluator,
        };

        let (score, mv) = negamax(pos, -INF, INF, depth as i32, 0, pv_seed, true, &mut ctx);
        killers = ctx.killers;

        if mv.is_none() {
            break;
        }
        best_move = mv;
        pv_seed = mv;

        on_depth(&ProgressRecord {
            depth,
            best_move: mv,
            score,
            nodes: ctx.nodes,
            qnodes: ctx.qnodes,
            tt_hits: ctx.tt_hits,
            seconds: start.elapsed().as_secs_f64(),
        });
    }

    best_move.or_else(|| pos.legal_moves().choose(&mut rand::thread_rng()).copied())
}

/// Run iterative deepening bounded by both `max_depth` and a wall-clock
/// `time_limit`, stopping early on a mate find or a forecasted timeout.
pub fn search_time_limited<E: Evaluator>(
    pos: &mut GamePosition,
    min_depth: u32,
    max_depth: u32,
    time_limit: Duration,
    tt: &mut TranspositionTable,
    evaluator: &E,
    control: &SearchControl,
    mut on_depth: impl FnMut(&ProgressRecord),
) -> Option<Move> {
    let start = Instant::now();

    let legal = pos.legal_moves();
    if legal.len() == 1 {
        return Some(legal[0]);
    }
    if legal.is_empty() {
        return None;
    }

    let mut best_move = None;
    let mut pv_seed = None;
    let mut last_depth_time = Duration::ZERO;
    let mut killers = KillerTable::new();

    for depth in 1..=max_depth {
        if depth > min_depth {
            let remaining = time_limit.saturating_sub(start.elapsed());
            let forecast = last_depth_time.saturating_mul(8);
            if forecast > remaining {
                break;
            }
        }

        let depth_start = Instant::now();

        let mut ctx = SearchContext {
            nodes: 0,
            qnodes: 0,
            tt_hits: 0,
            tt,
            killers,
            control,
            pv: PvTable::new(),
            evaluator,
        };

        let (score, mv) = negamax(pos, -INF, INF, depth as i32, 0, pv_seed, true, &mut ctx);
        last_depth_time = depth_start.elapsed();
        killers = ctx.killers;

        if control.should_stop(ctx.nodes) || mv.is_none() {
            break;
        }

        best_move = mv;
        pv_seed = mv;

        on_depth(&ProgressRecord {
            depth,
            best_move: mv,
            score,
            nodes: ctx.nodes,
            qnodes: ctx.qnodes,
            tt_hits: ctx.tt_hits,
            seconds: start.elapsed().as_secs_f64(),
        });

        if score.abs() > MATE_THRESHOLD {
            break;
        }
        if start.elapsed() >= time_limit {
            break;
        }
    }

    best_move
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MaterialEvaluator;
    use crate::position::GamePosition;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use zugzwang_core::Variant;

    fn control() -> SearchControl {
        SearchControl::new_infinite(Arc::new(AtomicBool::new(false)))
    }

    #[test]
    fn fixed_depth_returns_move_and_emits_every_depth() {
        let mut pos = GamePosition::new(
            zugzwang_core::STARTING_FEN.parse().unwrap(),
            Variant::Standard,
        );
        let mut tt = TranspositionTable::new(1);
        let control = control();
        let mut seen = Vec::new();
        let mv = search_fixed_depth(&mut pos, 3, &mut tt, &MaterialEvaluator, &control, |r| {
            seen.push(r.depth);
        });
        assert!(mv.is_some());
        assert_eq!(seen, vec![1, 2, 3]);
    }

    #[test]
    fn fixed_depth_seeds_pv_move_into_next_iteration() {
        let mut pos = GamePosition::new(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
                .parse()
                .unwrap(),
            Variant::Standard,
        );
        let mut tt = TranspositionTable::new(1);
        let control = control();
        let mv = search_fixed_depth(&mut pos, 3, &mut tt, &MaterialEvaluator, &control, |_| {});
        assert_eq!(mv.unwrap().to_uci(), "h5f7");
    }

    #[test]
    fn time_limited_single_legal_move_returns_without_searching() {
        let mut pos = GamePosition::new(
            "k7/8/1Q6/8/8/8/8/7K b - - 0 1".parse().unwrap(),
            Variant::Standard,
        );
        let legal_count = pos.legal_moves().len();
        let mut tt = TranspositionTable::new(1);
        let control = control();
        let mut calls = 0;
        let mv = search_time_limited(
            &mut pos,
            1,
            20,
            Duration::from_secs(10),
            &mut tt,
            &MaterialEvaluator,
            &control,
            |_| calls += 1,
        );
        if legal_count == 1 {
            assert!(mv.is_some());
            assert_eq!(calls, 0);
        }
    }

    #[test]
    fn time_limited_stops_early_on_mate_find() {
        let mut pos = GamePosition::new(
            "r1bqkb1r/pppp1ppp/2n2n2/4p2Q/2B1P3/8/PPPP1PPP/RNB1K1NR w KQkq - 4 4"
                .parse()
                .unwrap(),
            Variant::Standard,
        );
        let mut tt = TranspositionTable::new(1);
        let control = control();
        let mut seen_depths = Vec::new();
        let mv = search_time_limited(
            &mut pos,
            1,
            20,
            Duration::from_secs(30),
            &mut tt,
            &MaterialEvaluator,
            &control,
            |r| seen_depths.push(r.depth),
        );
        assert_eq!(mv.unwrap().to_uci(), "h5f7");
        assert!(seen_depths.len() < 20, "should stop well before max_depth on a found mate");
    }

    #[test]
    fn position_restored_after_time_limited_search() {
        let mut pos = GamePosition::new(
            zugzwang_core::STARTING_FEN.parse().unwrap(),
            Variant::Standard,
        );
        let before = pos.zobrist_hash();
        let mut tt = TranspositionTable::new(1);
        let control = control();
        search_time_limited(
            &mut pos,
            1,
            3,
            Duration::from_millis(200),
            &mut tt,
            &MaterialEvaluator,
            &control,
            |_| {},
        );
        assert_eq!(pos.zobrist_hash(), before);
    }
}
