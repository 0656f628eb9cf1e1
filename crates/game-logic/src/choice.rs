//! Choice model shared by every game family

use core::fmt;
use core::hash::Hash;
use core::iter::Sum;
use core::ops::{Add, AddAssign};
use serde::{Deserialize, Serialize};

/// A decision taken by one party in one turn.
///
/// Each game family implements this on a closed enum. Equality and hashing
/// come from the enum itself, which *is* the value, so two choices compare
/// equal exactly when their values do regardless of how they were built.
pub trait Choice: Clone + fmt::Debug + Eq + Hash + Serialize + Send + Sync + 'static {
    /// Hashable discriminant of the decision
    type Value: Clone + fmt::Debug + Eq + Hash;

    fn value(&self) -> Self::Value;

    /// Human-readable rendering, used in prompts and understood by the
    /// matching extractor.
    fn description(&self) -> String;
}

/// Which logical role a turn is being read as.
///
/// Only alternating games distinguish proposer from responder text; the
/// other games ignore it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Role {
    Proposer,
    Responder,
    Either,
}

/// Monetary amount in whole cents.
///
/// Stored as an integer so that parsed and constructed amounts compare equal.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Amount(u32);

impl Amount {
    pub const ZERO: Amount = Amount(0);

    pub const fn from_cents(cents: u32) -> Self {
        Self(cents)
    }

    /// Negative and non-finite inputs clamp to zero.
    pub fn dollars(dollars: f64) -> Self {
        if !dollars.is_finite() || dollars <= 0.0 {
            return Self::ZERO;
        }
        Self((dollars * 100.0).round().min(u32::MAX as f64) as u32)
    }

    pub const fn cents(self) -> u32 {
        self.0
    }

    pub fn as_dollars(self) -> f64 {
        self.0 as f64 / 100.0
    }
}

impl fmt::Display for Amount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "${}.{:02}", self.0 / 100, self.0 % 100)
    }
}

/// Payoffs for one round or for a whole game
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Scores {
    pub user: f64,
    pub ai: f64,
}

impl Scores {
    pub fn new(user: f64, ai: f64) -> Self {
        Self { user, ai }
    }
}

impl Add for Scores {
    type Output = Scores;

    fn add(self, rhs: Scores) -> Scores {
        Scores {
            user: self.user + rhs.user,
            ai: self.ai + rhs.ai,
        }
    }
}

impl AddAssign for Scores {
    fn add_assign(&mut self, rhs: Scores) {
        self.user += rhs.user;
        self.ai += rhs.ai;
    }
}

impl Sum for Scores {
    fn sum<I: Iterator<Item = Scores>>(iter: I) -> Scores {
        iter.fold(Scores::default(), Add::add)
    }
}

/// The pair of choices made in one round. `ai` is always the model.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct Choices<C> {
    pub user: C,
    pub ai: C,
}

impl<C> Choices<C> {
    pub fn new(user: C, ai: C) -> Self {
        Self { user, ai }
    }
}

/// Scores and choices of one analysed round
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Round<C> {
    pub scores: Scores,
    pub choices: Choices<C>,
}
