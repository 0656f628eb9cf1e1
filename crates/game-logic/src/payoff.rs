//! Payoff functions and the symmetric dilemma matrix

use thiserror::Error;

/// Maps a pair of choices to a pair of scores, in argument order
pub type PayoffFn<C> = fn(&C, &C) -> Result<(f64, f64), InvalidChoiceCombination>;

/// Two choices that cannot meet in one round, e.g. two proposals
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid choice combination: {first} with {second}")]
pub struct InvalidChoiceCombination {
    pub first: String,
    pub second: String,
}

/// Payoff constants violating the dilemma ordering
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum PayoffError {
    #[error("payoffs must satisfy T > R > P > S (got T={t}, R={r}, P={p}, S={s})")]
    Ordering { t: u32, r: u32, p: u32, s: u32 },
    #[error("mutual cooperation must beat alternating exploitation: 2R={two_r} <= T+S={t_plus_s}")]
    Alternation { two_r: u64, t_plus_s: u64 },
}

/// Symmetric 2x2 payoff matrix of a prisoner's dilemma
///
/// Index 0 is cooperation, index 1 defection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayoffMatrix {
    /// Temptation to defect
    pub t: u32,
    /// Reward for mutual cooperation
    pub r: u32,
    /// Punishment for mutual defection
    pub p: u32,
    /// Sucker's payoff
    pub s: u32,
}

impl PayoffMatrix {
    pub fn new(t: u32, r: u32, p: u32, s: u32) -> Result<Self, PayoffError> {
        let matrix = Self { t, r, p, s };
        matrix.validate()?;
        Ok(matrix)
    }

    /// Sums are widened so extreme constants cannot overflow
    pub const fn is_dilemma(&self) -> bool {
        self.t > self.r
            && self.r > self.p
            && self.p > self.s
            && 2 * (self.r as u64) > self.t as u64 + self.s as u64
    }

    pub fn validate(&self) -> Result<(), PayoffError> {
        let Self { t, r, p, s } = *self;
        if !(t > r && r > p && p > s) {
            return Err(PayoffError::Ordering { t, r, p, s });
        }
        let (two_r, t_plus_s) = (2 * r as u64, t as u64 + s as u64);
        if two_r <= t_plus_s {
            return Err(PayoffError::Alternation { two_r, t_plus_s });
        }
        Ok(())
    }

    /// Scores of (row player, column player)
    pub fn lookup(&self, row: usize, column: usize) -> (f64, f64) {
        let Self { t, r, p, s } = *self;
        let (a, b) = match (row, column) {
            (0, 0) => (r, r),
            (0, _) => (s, t),
            (_, 0) => (t, s),
            _ => (p, p),
        };
        (a as f64, b as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_matrix() {
        let m = PayoffMatrix::new(7, 5, 3, 0).unwrap();
        assert_eq!(m.lookup(0, 0), (5.0, 5.0));
        assert_eq!(m.lookup(0, 1), (0.0, 7.0));
        assert_eq!(m.lookup(1, 0), (7.0, 0.0));
        assert_eq!(m.lookup(1, 1), (3.0, 3.0));
    }

    #[test]
    fn test_ordering_violation() {
        assert_eq!(
            PayoffMatrix::new(5, 7, 3, 0),
            Err(PayoffError::Ordering { t: 5, r: 7, p: 3, s: 0 })
        );
    }

    #[test]
    fn test_alternation_violation() {
        // T + S = 10 >= 2R = 10
        let err = PayoffMatrix::new(10, 5, 3, 0).unwrap_err();
        assert_eq!(err, PayoffError::Alternation { two_r: 10, t_plus_s: 10 });
        assert!(!PayoffMatrix { t: 10, r: 5, p: 3, s: 0 }.is_dilemma());
    }

    #[test]
    fn test_extreme_constants_do_not_overflow() {
        let m = PayoffMatrix::new(u32::MAX, u32::MAX - 1, 1, 0).unwrap();
        assert!(m.is_dilemma());

        // T + S exceeds u32::MAX
        let err = PayoffMatrix::new(u32::MAX, 3, 2, 1).unwrap_err();
        assert_eq!(err, PayoffError::Alternation { two_r: 6, t_plus_s: u32::MAX as u64 + 1 });
        assert!(!PayoffMatrix { t: u32::MAX, r: 3, p: 2, s: 1 }.is_dilemma());
    }
}
