//! Attempt tracking for threshold-based retries.
//!
//! A detail visit is retried until enough core fields are filled. Each
//! attempt is scored, the best-scoring result is kept, and the loop stops
//! early once the threshold is reached. The tracker is synchronous so the
//! caller can await whatever it likes between attempts:
//!
//! ```ignore
//! let mut tracker = AttemptTracker::new(3, 2);
//! while let Some(attempt) = tracker.next_attempt() {
//!     let result = visit(attempt).await;
//!     let score = score(&result);
//!     if tracker.record(result, score) {
//!         break;
//!     }
//! }
//! let outcome = tracker.finish();
//! ```

/// Final result of a tracked retry loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AttemptOutcome<T> {
    /// An attempt reached the threshold.
    Filled { value: T, score: usize, attempts: usize },
    /// Every attempt ran; this is the best one, below the threshold.
    Underfilled { value: T, score: usize, attempts: usize },
    /// No attempt produced a result.
    Exhausted { attempts: usize },
}

/// Keeps the best-scored result across at most `max_attempts` attempts.
#[derive(Debug)]
pub struct AttemptTracker<T> {
    max_attempts: usize,
    threshold: usize,
    attempts: usize,
    best: Option<(T, usize)>,
    filled: bool,
}

impl<T> AttemptTracker<T> {
    /// `max_attempts` is clamped to at least one.
    pub fn new(max_attempts: usize, threshold: usize) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            threshold,
            attempts: 0,
            best: None,
            filled: false,
        }
    }

    /// Starts the next attempt and returns its 1-based number, or `None` once
    /// the budget is spent or the threshold was met.
    pub fn next_attempt(&mut self) -> Option<usize> {
        if self.filled || self.attempts >= self.max_attempts {
            return None;
        }
        self.attempts += 1;
        Some(self.attempts)
    }

    /// Records an attempt's result. Returns `true` when the threshold is met
    /// and no further attempt is needed.
    ///
    /// Ties keep the earlier result.
    pub fn record(&mut self, value: T, score: usize) -> bool {
        let better = self.best.as_ref().map_or(true, |(_, best)| score > *best);
        if better {
            self.best = Some((value, score));
        }
        if score >= self.threshold {
            self.filled = true;
        }
        self.filled
    }

    /// Consumes the tracker.
    pub fn finish(self) -> AttemptOutcome<T> {
        let attempts = self.attempts;
        match self.best {
            Some((value, score)) if score >= self.threshold => AttemptOutcome::Filled {
                value,
                score,
                attempts,
            },
            Some((value, score)) => AttemptOutcome::Underfilled {
                value,
                score,
                attempts,
            },
            None => AttemptOutcome::Exhausted { attempts },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(scores: &[usize], max: usize, threshold: usize) -> (AttemptOutcome<usize>, Vec<usize>) {
        let mut tracker = AttemptTracker::new(max, threshold);
        let mut seen = Vec::new();
        while let Some(n) = tracker.next_attempt() {
            seen.push(n);
            let score = scores[n - 1];
            if tracker.record(n, score) {
                break;
            }
        }
        (tracker.finish(), seen)
    }

    #[test]
    fn test_stops_at_threshold() {
        let (outcome, seen) = run(&[1, 3, 5], 3, 2);
        assert_eq!(seen, vec![1, 2]);
        assert_eq!(
            outcome,
            AttemptOutcome::Filled {
                value: 2,
                score: 3,
                attempts: 2
            }
        );
    }

    #[test]
    fn test_keeps_best_when_underfilled() {
        let (outcome, seen) = run(&[0, 1, 0], 3, 2);
        assert_eq!(seen, vec![1, 2, 3]);
        assert_eq!(
            outcome,
            AttemptOutcome::Underfilled {
                value: 2,
                score: 1,
                attempts: 3
            }
        );
    }

    #[test]
    fn test_ties_keep_earlier() {
        let (outcome, _) = run(&[1, 1], 2, 5);
        assert!(matches!(outcome, AttemptOutcome::Underfilled { value: 1, .. }));
    }

    #[test]
    fn test_exhausted_without_results() {
        let mut tracker: AttemptTracker<()> = AttemptTracker::new(2, 1);
        // every attempt fails before producing a result
        while tracker.next_attempt().is_some() {}
        assert_eq!(tracker.finish(), AttemptOutcome::Exhausted { attempts: 2 });
    }

    #[test]
    fn test_zero_attempts_clamped() {
        let (outcome, seen) = run(&[4], 0, 1);
        assert_eq!(seen, vec![1]);
        assert!(matches!(outcome, AttemptOutcome::Filled { attempts: 1, .. }));
    }
}
