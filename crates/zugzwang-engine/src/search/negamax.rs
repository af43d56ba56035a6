//! Negamax alpha-beta search with principal variation search, late-move
//! reductions, and null-move pruning.

use zugzwang_core::Move;

use crate::eval::Evaluator;
use crate::position::{GamePosition, Position};
use crate::search::control::SearchControl;
use crate::search::heuristics::KillerTable;
use crate::search::ordering::MovePicker;
use crate::search::quiescence::quiesce;
use crate::search::tt::{score_from_tt, score_to_tt, Bound, TranspositionTable, TtEntry};

/// Score representing an unreachable upper/lower bound.
pub const INF: i32 = 30_000;

/// Base score for a forced checkmate, adjusted by ply for mate distance.
pub const MATE_SCORE: i32 = 29_000;

/// Scores with a magnitude above this threshold indicate a forced mate.
pub const MATE_THRESHOLD: i32 = 28_000;

/// Maximum recursion depth, used to size the PV table and bound recursion.
pub const MAX_PLY: usize = 128;

/// Contempt bonus/penalty applied to a claimable draw: a winning side
/// dislikes the draw, a losing side welcomes it.
const CONTEMPT_SCORE: i32 = 200;
/// Evaluation magnitude above which a side is considered "winning" for contempt.
const CONTEMPT_EVAL_THRESHOLD: i32 = 100;

/// Minimum remaining piece count (both sides) for null-move pruning to fire;
/// guards against zugzwang-prone endgames where passing is never safe.
const NMP_MIN_PIECES: u32 = 6;

/// Minimum moves searched at a node before LMR can reduce the next one.
const LMR_MIN_MOVE_INDEX: usize = 4;
/// Minimum remaining depth for LMR to apply.
const LMR_MIN_DEPTH: i32 = 3;

/// Principal-variation table: one line per ply, each line built by
/// prepending the current move to the already-settled child-ply line.
pub struct PvTable {
    lines: Vec<Vec<Move>>,
}

impl PvTable {
    /// Create an empty table sized for [`MAX_PLY`].
    pub fn new() -> Self {
        PvTable {
            lines: vec![Vec::new(); MAX_PLY],
        }
    }

    /// Drop whatever line was recorded for `ply` (called at node entry).
    pub fn clear_ply(&mut self, ply: usize) {
        if ply < MAX_PLY {
            self.lines[ply].clear();
        }
    }

    /// Record `mv` as the best move at `ply`, prepended to the next ply's
    /// already-settled line.
    pub fn update(&mut self, ply: usize, mv: Move) {
        if ply >= MAX_PLY {
            return;
        }
        let mut line = vec![mv];
        if ply + 1 < MAX_PLY {
            line.extend(self.lines[ply + 1].iter().copied());
        }
        self.lines[ply] = line;
    }

    /// The full line recorded at the root.
    pub fn root_pv(&self) -> &[Move] {
        &self.lines[0]
    }
}

impl Default for PvTable {
    fn default() -> Self {
        Self::new()
    }
}

/// Mutable scratch state threaded through one top-level search call.
pub struct SearchContext<'a, E: Evaluator> {
    /// Main-search nodes visited.
    pub nodes: u64,
    /// Quiescence-search nodes visited.
    pub qnodes: u64,
    /// Transposition-table hits.
    pub tt_hits: u64,
    /// Transposition table, shared across the engine's lifetime.
    pub tt: &'a mut TranspositionTable,
    /// Per-ply killer-move memory, reset at the start of each top-level call.
    pub killers: KillerTable,
    /// Abort/time-limit control.
    pub control: &'a SearchControl,
    /// Principal-variation line under construction.
    pub pv: PvTable,
    /// Static evaluator.
    pub evaluator: &'a E,
}

/// Score a claimable draw against the contempt rule: a side doing well
/// dislikes the draw, a side doing poorly welcomes it.
fn contempt_score<E: Evaluator>(pos: &GamePosition, evaluator: &E) -> i32 {
    let s = evaluator.evaluate(pos);
    if s > CONTEMPT_EVAL_THRESHOLD {
        -CONTEMPT_SCORE
    } else if s < -CONTEMPT_EVAL_THRESHOLD {
        CONTEMPT_SCORE
    } else {
        0
    }
}

/// Recursive negamax alpha-beta search. Returns `(score, best_move)` for the
/// side to move; every push is paired with a pop on every exit path.
#[allow(clippy::too_many_arguments)]
pub fn negamax<E: Evaluator>(
    pos: &mut GamePosition,
    mut alpha: i32,
    mut beta: i32,
    depth: i32,
    ply: u32,
    pv_move: Option<Move>,
    null_allowed: bool,
    ctx: &mut SearchContext<'_, E>,
) -> (i32, Option<Move>) {
    ctx.nodes += 1;
    ctx.pv.clear_ply(ply as usize);

    if ctx.control.should_stop(ctx.nodes) {
        return (0, None);
    }

    let alpha0 = alpha;
    let hash = pos.zobrist_hash();
    let mut tt_move = None;

    if let Some(entry) = ctx.tt.probe(hash) {
        tt_move = entry.best_move;
        if entry.depth >= depth {
            ctx.tt_hits += 1;
            let score = score_from_tt(entry.score, ply);
            match entry.bound {
                Bound::Exact => return (score, entry.best_move),
                Bound::LowerBound => alpha = alpha.max(score),
                Bound::UpperBound => beta = beta.min(score),
            }
            if alpha >= beta {
                return (score, entry.best_move);
            }
        }
    }

    if pos.is_checkmate() {
        return (-MATE_SCORE + ply as i32, None);
    }
    if pos.is_stalemate() {
        return (0, None);
    }
    if pos.can_claim_draw() {
        return (contempt_score(pos, ctx.evaluator), None);
    }
    if pos.is_variant_end() {
        return (ctx.evaluator.evaluate(pos), None);
    }

    let in_check = pos.is_check();
    let mut depth = depth;
    if depth <= 1 && in_check {
        depth += 1;
    }

    if depth <= 0 {
        return (quiesce(pos, alpha, beta, 0, ctx), None);
    }

    if null_allowed
        && !in_check
        && depth >= 3
        && ply > 0
        && pos.variant() != zugzwang_core::Variant::Antichess
        && pos.piece_count() > NMP_MIN_PIECES
        && beta < INF
    {
        let r = 2 + depth / 4;
        pos.push_null();
        let (null_score, _) =
            negamax(pos, -beta, -beta + 1, depth - 1 - r, ply + 1, None, false, ctx);
        pos.pop_null();
        if -null_score >= beta {
            return (beta, None);
        }
    }

    let moves = pos.legal_moves();
    let killers = ctx.killers.pair(ply as usize);
    let mut picker = MovePicker::new(pos, moves, pv_move, tt_move, killers);

    let mut best_score = -INF;
    let mut best_move = None;
    let mut index = 0usize;

    while let Some(mv) = picker.pick_next() {
        let is_capture = pos.is_capture(mv);
        let is_promotion = mv.is_promotion();

        pos.push(mv);
        let gives_check = pos.is_check();

        let score = if index >= LMR_MIN_MOVE_INDEX
            && depth >= LMR_MIN_DEPTH
            && !is_capture
            && !is_promotion
            && !gives_check
            && !in_check
        {
            let r = (1 + index as i32 / 8 + depth / 4).clamp(0, depth - 1);
            let (reduced, _) =
                negamax(pos, -alpha - 1, -alpha, depth - 1 - r, ply + 1, None, true, ctx);
            let reduced = -reduced;
            if reduced <= alpha {
                reduced
            } else {
                pvs_research(pos, alpha, beta, depth, ply, index, ctx)
            }
        } else {
            pvs_research(pos, alpha, beta, depth, ply, index, ctx)
        };

        pos.pop();

        if score > best_score {
            best_score = score;
            best_move = Some(mv);
        }
        if score > alpha {
            alpha = score;
            ctx.pv.update(ply as usize, mv);
        }
        if alpha >= beta {
            if !is_capture {
                ctx.killers.store(ply as usize, mv);
            }
            break;
        }

        index += 1;
    }

    let bound = TranspositionTable::classify(alpha0, beta, best_score);
    ctx.tt.store(
        hash,
        TtEntry {
            depth,
            score: score_to_tt(best_score, ply),
            bound,
            best_move,
        },
    );

    (best_score, best_move)
}

/// Principal variation search: null-window probe for all but the first
/// move, re-searched with the full window only if it looks like it beats
/// alpha.
fn pvs_research<E: Evaluator>(
    pos: &mut GamePosition,
    alpha: i32,
    beta: i32,
    depth: i32,
    ply: u32,
    index: usize,
    ctx: &mut SearchContext<'_, E>,
) -> i32 {
    if index == 0 {
        let (score, _) = negamax(pos, -beta, -alpha, depth - 1, ply + 1, None, true, ctx);
        return -score;
    }

    let (null_window, _) = negamax(pos, -alpha - 1, -alpha, depth - 1, ply + 1, None, true, ctx);
    let null_window = -null_window;
    if null_window > alpha && null_window < beta {
        let (full, _) = negamax(pos, -beta, -alpha, depth - 1, ply + 1, None, true, ctx);
        -full
    } else {
        null_window
    }
}
