//! Search limits: a depth cap plus an optional wall-clock deadline. The
//! core only ever consumes the deadline; turning clock and increment into
//! one is the time manager's job.

use std::time::{Duration, Instant};

use crate::search::MAX_SEARCH_DEPTH;

#[derive(Debug, Clone, Copy)]
pub struct SearchLimits {
    pub depth_limit: u8,
    pub start_time: Instant,
    pub deadline: Option<Instant>,
}

impl SearchLimits {
    pub fn infinite() -> SearchLimits {
        SearchLimits {
            depth_limit: MAX_SEARCH_DEPTH as u8,
            start_time: Instant::now(),
            deadline: None,
        }
    }

    pub fn depth(depth: u8) -> SearchLimits {
        SearchLimits {
            depth_limit: depth.min(MAX_SEARCH_DEPTH as u8),
            ..SearchLimits::infinite()
        }
    }

    pub fn move_time(budget: Duration) -> SearchLimits {
        let start = Instant::now();
        SearchLimits {
            depth_limit: MAX_SEARCH_DEPTH as u8,
            start_time: start,
            deadline: Some(start + budget),
        }
    }
}

/// Clock state as parsed from `go`, for the side to move.
#[derive(Debug, Clone, Copy, Default)]
pub struct TimeControl {
    pub remaining: Option<Duration>,
    pub increment: Option<Duration>,
    pub moves_to_go: Option<u32>,
    pub move_time: Option<Duration>,
}

/// Maps a clock to a per-move budget: an explicit movetime is taken as-is,
/// otherwise one slice of the remaining time (default horizon twenty
/// moves) plus half the increment, capped well below the clock itself.
pub fn allocate_time(control: &TimeControl) -> Option<Duration> {
    if let Some(move_time) = control.move_time {
        return Some(move_time);
    }
    let remaining = control.remaining?;
    let horizon = control.moves_to_go.unwrap_or(20).max(1);
    let increment = control.increment.unwrap_or(Duration::ZERO);

    let budget = remaining / horizon + increment / 2;
    Some(budget.min(remaining.mul_f64(0.8)))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn movetime_wins_over_clock_fields() {
        let control = TimeControl {
            remaining: Some(Duration::from_secs(60)),
            move_time: Some(Duration::from_millis(750)),
            ..TimeControl::default()
        };
        assert_eq!(allocate_time(&control), Some(Duration::from_millis(750)));
    }

    #[test]
    fn clock_is_sliced_by_moves_to_go() {
        let control = TimeControl {
            remaining: Some(Duration::from_secs(40)),
            moves_to_go: Some(10),
            ..TimeControl::default()
        };
        assert_eq!(allocate_time(&control), Some(Duration::from_secs(4)));
    }

    #[test]
    fn budget_never_exceeds_the_clock() {
        let control = TimeControl {
            remaining: Some(Duration::from_millis(100)),
            increment: Some(Duration::from_secs(10)),
            moves_to_go: Some(1),
            ..TimeControl::default()
        };
        let budget = allocate_time(&control).unwrap();
        assert!(budget < Duration::from_millis(100));
    }

    #[test]
    fn no_clock_means_no_deadline() {
        assert_eq!(allocate_time(&TimeControl::default()), None);
        assert!(SearchLimits::infinite().deadline.is_none());
    }
}
