//! Quiescence search: a capture-only extension below the main search's
//! horizon, resolving tactical sequences before trusting a static score.

use crate::eval::Evaluator;
use crate::position::{GamePosition, Position};
use crate::search::negamax::{SearchContext, INF};
use crate::search::ordering::MovePicker;
use crate::search::tt::{score_from_tt, score_to_tt, Bound, TtEntry};

/// Quiescence search never looks more than this many plies past the horizon.
pub const MAX_QUIESCE_DEPTH: u32 = 10;

/// Search only noisy moves (captures, promotions) to resolve the horizon
/// effect, returning a fail-hard score from the side to move's perspective.
pub fn quiesce<E: Evaluator>(
    pos: &mut GamePosition,
    mut alpha: i32,
    mut beta: i32,
    qdepth: u32,
    ctx: &mut SearchContext<'_, E>,
) -> i32 {
    ctx.qnodes += 1;
    let alpha0 = alpha;
    let tt_depth = -(qdepth as i32 + 1);

    let hash = pos.zobrist_hash();
    if let Some(entry) = ctx.tt.probe(hash) {
        let usable = entry.depth >= tt_depth || entry.depth >= 0;
        if usable {
            ctx.tt_hits += 1;
            let score = score_from_tt(entry.score, 0);
            match entry.bound {
                Bound::Exact => return score,
                Bound::LowerBound => alpha = alpha.max(score),
                Bound::UpperBound => beta = beta.min(score),
            }
            if alpha >= beta {
                return score;
            }
        }
    }

    if pos.is_checkmate() {
        return -INF;
    }
    if pos.is_stalemate() || pos.can_claim_draw() {
        return 0;
    }
    if pos.is_variant_end() {
        return ctx.evaluator.evaluate(pos);
    }

    let stand_pat = ctx.evaluator.evaluate(pos);
    if stand_pat >= beta {
        return beta;
    }
    if stand_pat > alpha {
        alpha = stand_pat;
    }

    if qdepth >= MAX_QUIESCE_DEPTH {
        return stand_pat;
    }

    let moves = pos.legal_moves();
    if moves.is_empty() {
        return stand_pat;
    }

    let mut picker = MovePicker::new_noisy(pos, moves);
    let mut best_score = stand_pat;
    let mut any_move = false;

    while let Some(mv) = picker.pick_next() {
        any_move = true;
        pos.push(mv);
        let score = -quiesce(pos, -beta, -alpha, qdepth + 1, ctx);
        pos.pop();

        if score > best_score {
            best_score = score;
        }
        if score >= beta {
            ctx.tt.store(
                hash,
                TtEntry {
                    depth: tt_depth,
                    score: score_to_tt(best_score, 0),
                    bound: Bound::LowerBound,
                    best_move: None,
                },
            );
            return beta;
        }
        if score > alpha {
            alpha = score;
        }
    }

    if !any_move {
        return stand_pat;
    }

    let flag = if best_score <= alpha0 {
        Bound::UpperBound
    } else {
        Bound::Exact
    };
    ctx.tt.store(
        hash,
        TtEntry {
            depth: tt_depth,
            score: score_to_tt(best_score, 0),
            bound: flag,
            best_move: None,
        },
    );

    alpha
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::eval::MaterialEvaluator;
    use crate::position::GamePosition;
    use crate::search::control::SearchControl;
    use crate::search::heuristics::KillerTable;
    use crate::search::negamax::PvTable;
    use crate::search::tt::TranspositionTable;
    use std::sync::atomic::AtomicBool;
    use std::sync::Arc;
    use zugzwang_core::Variant;

    fn fresh_ctx(tt: &mut TranspositionTable, control: &SearchControl) -> SearchContext<'_, MaterialEvaluator> {
        SearchContext {
            nodes: 0,
            qnodes: 0,
            tt_hits: 0,
            tt,
            killers: KillerTable::new(),
            control,
            pv: PvTable::new(),
            evaluator: &MaterialEvaluator,
        }
    }

    #[test]
    fn quiet_position_returns_stand_pat() {
        let mut pos = GamePosition::new(
            zugzwang_core::STARTING_FEN.parse().unwrap(),
            Variant::Standard,
        );
        let mut tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = fresh_ctx(&mut tt, &control);
        let score = quiesce(&mut pos, -INF, INF, 0, &mut ctx);
        assert_eq!(score, MaterialEvaluator.evaluate(&pos));
    }

    #[test]
    fn hanging_queen_capture_improves_score() {
        // White to move, can win a free queen with Rxd4.
        let mut pos = GamePosition::new(
            "4k3/8/8/8/3q4/8/8/3RK3 w - - 0 1".parse().unwrap(),
            Variant::Standard,
        );
        let mut tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = fresh_ctx(&mut tt, &control);
        let score = quiesce(&mut pos, -INF, INF, 0, &mut ctx);
        let stand_pat = MaterialEvaluator.evaluate(&pos);
        assert!(score > stand_pat, "quiescence should find the winning capture");
    }

    #[test]
    fn checkmate_returns_negative_inf() {
        let mut pos = GamePosition::new(
            "R5k1/5ppp/8/8/8/8/8/4K3 b - - 0 1".parse().unwrap(),
            Variant::Standard,
        );
        let mut tt = TranspositionTable::new(1);
        let control = SearchControl::new_infinite(Arc::new(AtomicBool::new(false)));
        let mut ctx = fresh_ctx(&mut tt, &control);
        let score = quiesce(&mut pos, -INF, INF, 0, &mut ctx);
        assert_eq!(score, -INF);
    }
}
