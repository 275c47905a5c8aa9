//! The probability oracle driving burst-termination decisions.
//!
//! The scheduler's burst-termination decision is driven by an abstract
//! source of uniform `[0, 1)` values. This module treats that source as an
//! ordered, finite sequence of non-negative integers consumed one at a
//! time; each draw is reported both as its raw integer and as the derived
//! probability so the trace layer can render
//! "`[Random number (n): raw]` / `Probability == p`" console lines.

use crate::common::SimError;

/// Divisor applied to each raw draw to produce a `[0, 1)` probability:
/// `raw_int / 2^31`.
const DIVISOR: f64 = 2_147_483_648.0; // 2^31

/// One consumed draw: its 1-indexed ordinal, raw integer, and derived
/// probability.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Draw {
    /// Ordinal of this draw within the sequence (1-indexed).
    pub ordinal: usize,
    /// The raw integer consumed from the sequence.
    pub raw: i64,
    /// `raw / 2^31`.
    pub probability: f64,
}

/// A finite, once-consumed sequence of probability draws.
///
/// Constructed from the full sequence of raw integers read from the
/// probability source file. Each call to [`next_probability`] consumes
/// exactly one value; consuming past the end is a fatal error, never a
/// recovered/retried condition.
///
/// [`next_probability`]: ProbabilityOracle::next_probability
#[derive(Debug, Clone)]
pub struct ProbabilityOracle {
    sequence: Vec<i64>,
    cursor: usize,
}

impl ProbabilityOracle {
    /// Creates an oracle over an already-loaded sequence of raw integers.
    #[must_use]
    pub const fn new(sequence: Vec<i64>) -> Self {
        Self {
            sequence,
            cursor: 0,
        }
    }

    /// Consumes and returns the next probability draw.
    ///
    /// # Errors
    ///
    /// Returns [`SimError::OracleExhausted`] if the sequence has already
    /// been fully consumed.
    pub fn next_probability(&mut self) -> Result<Draw, SimError> {
        let Some(&raw) = self.sequence.get(self.cursor) else {
            return Err(SimError::OracleExhausted {
                consumed: self.cursor,
            });
        };
        self.cursor += 1;
        Ok(Draw {
            ordinal: self.cursor,
            raw,
            probability: raw as f64 / DIVISOR,
        })
    }

    /// Number of draws consumed so far.
    #[must_use]
    pub const fn consumed(&self) -> usize {
        self.cursor
    }

    /// Number of draws remaining before exhaustion.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.sequence.len() - self.cursor
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn divides_by_two_to_the_31() {
        let mut oracle = ProbabilityOracle::new(vec![1_073_741_824]); // 2^30
        let draw = oracle.next_probability().expect("draw");
        assert!((draw.probability - 0.5).abs() < 1e-12);
        assert_eq!(draw.ordinal, 1);
        assert_eq!(draw.raw, 1_073_741_824);
    }

    #[test]
    fn ordinals_increment_from_one() {
        let mut oracle = ProbabilityOracle::new(vec![0, 0, 0]);
        assert_eq!(oracle.next_probability().expect("draw 1").ordinal, 1);
        assert_eq!(oracle.next_probability().expect("draw 2").ordinal, 2);
        assert_eq!(oracle.next_probability().expect("draw 3").ordinal, 3);
    }

    #[test]
    fn exhaustion_is_fatal() {
        let mut oracle = ProbabilityOracle::new(vec![42]);
        oracle.next_probability().expect("first draw succeeds");
        let err = oracle.next_probability().expect_err("must exhaust");
        assert!(matches!(err, SimError::OracleExhausted { consumed: 1 }));
    }

    #[test]
    fn remaining_tracks_cursor() {
        let mut oracle = ProbabilityOracle::new(vec![1, 2, 3]);
        assert_eq!(oracle.remaining(), 3);
        oracle.next_probability().expect("draw");
        assert_eq!(oracle.remaining(), 2);
        assert_eq!(oracle.consumed(), 1);
    }
}
