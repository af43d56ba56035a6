//! Error type surfaced by the search driver and engine facade.

/// Everything that can go wrong while asking the engine to pick a move.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EngineError {
    /// The root position has no legal moves to choose between.
    #[error("no legal moves available in the given position")]
    NoLegalMoves,

    /// The Position Oracle violated its contract (e.g. an unbalanced
    /// push/pop, or a move returned by `legal_moves` that is not actually
    /// playable).
    #[error("position oracle contract violation: {detail}")]
    OracleContractViolation {
        /// Human-readable description of what went wrong.
        detail: String,
    },

    /// The Evaluator failed to produce a usable score.
    #[error("evaluator failure: {detail}")]
    EvaluatorFailure {
        /// Human-readable description of what went wrong.
        detail: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_legal_moves_display() {
        assert_eq!(
            format!("{}", EngineError::NoLegalMoves),
            "no legal moves available in the given position"
        );
    }

    #[test]
    fn oracle_violation_includes_detail() {
        let err = EngineError::OracleContractViolation {
            detail: "pop without matching push".to_string(),
        };
        assert!(format!("{err}").contains("pop without matching push"));
    }
}
