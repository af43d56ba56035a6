//! The Position Oracle: the capability the search consumes for rules,
//! legality, and hashing, and the one concrete implementation the crate
//! ships so it is runnable end to end without an external collaborator.

use zugzwang_core::{generate_legal_moves, king_attacks, Board, Color, Move, PieceKind, Square, Variant};

/// A chess position plus enough rule-awareness to drive search: legal move
/// generation, LIFO push/pop (including null moves), and the terminal
/// predicates the Negamax Searcher needs at every node.
///
/// Implementations must balance every `push`/`push_null` with a matching
/// `pop`/`pop_null`; the search relies on this for correctness on every
/// exit path, including beta cutoffs.
pub trait Position {
    /// Legal moves in the current position. Order need not be stable.
    fn legal_moves(&self) -> Vec<Move>;

    /// Play `mv`, mutating the position in place.
    fn push(&mut self, mv: Move);

    /// Undo the most recent `push`.
    fn pop(&mut self);

    /// Play a null move: side to move flips, en passant clears, no piece moves.
    fn push_null(&mut self);

    /// Undo the most recent `push_null`.
    fn pop_null(&mut self);

    /// `true` if the side to move is in check.
    fn is_check(&self) -> bool;

    /// `true` if the side to move has no legal moves and is in check.
    fn is_checkmate(&self) -> bool;

    /// `true` if the side to move has no legal moves and is not in check.
    fn is_stalemate(&self) -> bool;

    /// `true` if the current position is a threefold repetition or satisfies
    /// the fifty-move rule.
    fn can_claim_draw(&self) -> bool;

    /// `true` if the active variant's own termination condition has fired
    /// (three checks delivered, a king exploded, no moves in antichess).
    fn is_variant_end(&self) -> bool;

    /// `true` if `mv`, played now, captures a piece.
    fn is_capture(&self, mv: Move) -> bool;

    /// The piece kind standing on `sq`, if any.
    fn piece_at(&self, sq: Square) -> Option<PieceKind>;

    /// 64-bit Zobrist hash of the current position, including side to move,
    /// castling rights, and en passant file.
    fn zobrist_hash(&self) -> u64;

    /// Count of all pieces currently on the board (both sides).
    fn piece_count(&self) -> u32;

    /// The variant governing this position's rules.
    fn variant(&self) -> Variant;
}

/// The Oracle this crate ships: a bitboard [`Board`] behind an undo-stack
/// adapter, with the variant-specific bookkeeping (three-check counters,
/// atomic explosions, antichess forced captures) layered on top.
///
/// `Board::make_move` is copy-make — it returns a new board rather than
/// mutating in place. `GamePosition` turns that into the Oracle's LIFO
/// push/pop contract by keeping a stack of board snapshots taken just
/// before each mutation.
#[derive(Debug, Clone)]
pub struct GamePosition {
    variant: Variant,
    board: Board,
    check_counts: [u8; 2],
    undo_stack: Vec<(Board, [u8; 2])>,
    position_hashes: Vec<u64>,
}

impl GamePosition {
    /// Build a position from a starting board and the variant that governs it.
    pub fn new(board: Board, variant: Variant) -> GamePosition {
        GamePosition {
            variant,
            check_counts: [0, 0],
            undo_stack: Vec::new(),
            position_hashes: vec![board.hash()],
            board,
        }
    }

    /// Borrow the underlying board (e.g. for the Evaluator).
    pub fn board(&self) -> &Board {
        &self.board
    }

    fn snapshot(&mut self) {
        self.undo_stack.push((self.board, self.check_counts));
    }

    fn restore(&mut self) {
        let (board, checks) = self
            .undo_stack
            .pop()
            .expect("pop called without a matching push");
        self.board = board;
        self.check_counts = checks;
        self.position_hashes.pop();
    }

    /// Remove the captured piece's surroundings per atomic chess rules: the
    /// capturing piece and every non-pawn piece within one king-step of the
    /// capture square are removed from the board.
    fn apply_atomic_explosion(board: &mut Board, center: Square) {
        board.remove_piece(center);
        let mut ring = king_attacks(center);
        while let Some((sq, rest)) = ring.pop_lsb() {
            ring = rest;
            if let Some(kind) = board.piece_on(sq)
                && kind != PieceKind::Pawn
            {
                board.remove_piece(sq);
            }
        }
    }
}

impl Position for GamePosition {
    fn legal_moves(&self) -> Vec<Move> {
        if self.variant == Variant::Atomic
            && self.board.king_square_opt(self.board.side_to_move()).is_none()
        {
            return Vec::new();
        }

        let moves = generate_legal_moves(&self.board);
        let all: Vec<Move> = moves.as_slice().to_vec();

        if self.variant == Variant::Antichess {
            let captures: Vec<Move> = all
                .iter()
                .copied()
                .filter(|m| self.board.is_capture(*m))
                .collect();
            if !captures.is_empty() {
                return captures;
            }
        }

        all
    }

    fn push(&mut self, mv: Move) {
        self.snapshot();

        let mover = self.board.side_to_move();
        let is_capture = self.board.is_capture(mv);
        let mut next = self.board.make_move(mv);

        if self.variant == Variant::Atomic && is_capture {
            Self::apply_atomic_explosion(&mut next, mv.dest());
        }
        self.board = next;

        if self.variant == Variant::ThreeCheck
            && let Some(opp_king) = self.board.king_square_opt(mover.flip())
            && self.board.is_square_attacked(opp_king, mover)
        {
            self.check_counts[mover.index()] += 1;
        }

        self.position_hashes.push(self.board.hash());
    }

    fn pop(&mut self) {
        self.restore();
    }

    fn push_null(&mut self) {
        self.snapshot();
        self.board = self.board.make_null_move();
        self.position_hashes.push(self.board.hash());
    }

    fn pop_null(&mut self) {
        self.restore();
    }

    fn is_check(&self) -> bool {
        if self.variant == Variant::Antichess {
            return false;
        }
        let us = self.board.side_to_move();
        match self.board.king_square_opt(us) {
            Some(ksq) => self.board.is_square_attacked(ksq, us.flip()),
            None => false,
        }
    }

    fn is_checkmate(&self) -> bool {
        if self.variant == Variant::Antichess {
            return false;
        }
        self.is_check() && self.legal_moves().is_empty()
    }

    fn is_stalemate(&self) -> bool {
        if self.variant == Variant::Antichess {
            return false;
        }
        !self.is_check() && self.legal_moves().is_empty()
    }

    fn can_claim_draw(&self) -> bool {
        if self.board.halfmove_clock() >= 100 {
            return true;
        }
        let current = self.board.hash();
        self.position_hashes.iter().filter(|&&h| h == current).count() >= 3
    }

    fn is_variant_end(&self) -> bool {
        match self.variant {
            Variant::Standard => false,
            Variant::ThreeCheck => self.check_counts[0] >= 3 || self.check_counts[1] >= 3,
            Variant::Atomic => Color::ALL
                .into_iter()
                .any(|c| self.board.king_square_opt(c).is_none()),
            Variant::Antichess => self.legal_moves().is_empty(),
        }
    }

    fn is_capture(&self, mv: Move) -> bool {
        self.board.is_capture(mv)
    }

    fn piece_at(&self, sq: Square) -> Option<PieceKind> {
        self.board.piece_on(sq)
    }

    fn zobrist_hash(&self) -> u64 {
        self.board.hash()
    }

    fn piece_count(&self) -> u32 {
        self.board.occupied().count()
    }

    fn variant(&self) -> Variant {
        self.variant
    }
}
