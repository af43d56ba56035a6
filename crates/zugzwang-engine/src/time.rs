//! Time management — convert clock parameters to a move time budget.

use std::time::Duration;

/// Network/overhead buffer subtracted from remaining time before budgeting.
const NETWORK_BUFFER_S: f64 = 0.5;
/// Below this much remaining time, fall back to the low-time branch.
const LOW_TIME_THRESHOLD_S: f64 = 5.0;
/// Fraction of remaining time the low-time branch allocates.
const LOW_TIME_FRACTION: f64 = 0.1;
/// Weight applied to the increment when building the base budget.
const INCREMENT_WEIGHT: f64 = 0.8;
/// Upper bound on the returned budget, as a fraction of usable time.
const MAX_USABLE_FRACTION: f64 = 0.3;
/// Lower bound on the returned budget.
const MIN_BUDGET_S: f64 = 0.1;
/// Floor applied to the low-time branch's result.
const LOW_TIME_FLOOR_S: f64 = 0.05;

/// Compute the time budget, in seconds, for the next move.
///
/// ```text
/// usable = max(0.1, remaining_s - 0.5)
/// expected_moves_left = 35 if moves_played < 10
///                      else 25 if moves_played < 30
///                      else 15
/// base = usable / expected_moves_left
/// budget = base + 0.8 * increment_s
/// if remaining_s < 5: return max(0.05, (remaining_s - 0.5) * 0.1)
/// return clamp(budget, 0.1, 0.3 * usable)
/// ```
pub fn move_time_seconds(remaining: Duration, increment: Duration, moves_played: u32) -> f64 {
    let remaining_s = remaining.as_secs_f64();
    let increment_s = increment.as_secs_f64();

    if remaining_s < LOW_TIME_THRESHOLD_S {
        return ((remaining_s - NETWORK_BUFFER_S) * LOW_TIME_FRACTION).max(LOW_TIME_FLOOR_S);
    }

    let usable = (remaining_s - NETWORK_BUFFER_S).max(MIN_BUDGET_S);
    let expected_moves_left = if moves_played < 10 {
        35.0
    } else if moves_played < 30 {
        25.0
    } else {
        15.0
    };

    let base = usable / expected_moves_left;
    let budget = base + INCREMENT_WEIGHT * increment_s;

    budget.clamp(MIN_BUDGET_S, MAX_USABLE_FRACTION * usable)
}
