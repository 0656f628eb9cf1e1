//! Repeated prisoner's dilemma, played simultaneously

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::choice::{Choice, Choices, Role};
use crate::extract::{first_token, ChoiceParseError};
use crate::game::{Layout, Rules};
use crate::payoff::{InvalidChoiceCombination, PayoffMatrix};

pub const COLOR_COOPERATE: &str = "green";
pub const COLOR_DEFECT: &str = "blue";

/// Payoffs (T, R, P, S) = (7, 5, 3, 0)
pub const DILEMMA_PAYOFFS: PayoffMatrix = PayoffMatrix { t: 7, r: 5, p: 3, s: 0 };

const _: () = assert!(
    DILEMMA_PAYOFFS.is_dilemma(),
    "dilemma payoffs must satisfy T > R > P > S and 2R > T + S"
);

/// A move in the prisoner's dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DilemmaChoice {
    Cooperate,
    Defect,
}

impl DilemmaChoice {
    /// Row/column of the payoff matrix
    pub fn index(self) -> usize {
        match self {
            DilemmaChoice::Cooperate => 0,
            DilemmaChoice::Defect => 1,
        }
    }

    pub fn opposite(self) -> Self {
        match self {
            DilemmaChoice::Cooperate => DilemmaChoice::Defect,
            DilemmaChoice::Defect => DilemmaChoice::Cooperate,
        }
    }

    pub fn color(self) -> &'static str {
        match self {
            DilemmaChoice::Cooperate => COLOR_COOPERATE,
            DilemmaChoice::Defect => COLOR_DEFECT,
        }
    }
}

impl Choice for DilemmaChoice {
    type Value = DilemmaChoice;

    fn value(&self) -> DilemmaChoice {
        *self
    }

    fn description(&self) -> String {
        format!("project {}", self.color())
    }
}

static PROJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)project\W{0,3}(green|blue)\b").expect("project pattern must compile")
});

/// Find the first "project green" / "project blue" mention
pub fn extract_choice(text: &str, _role: Role) -> Result<DilemmaChoice, ChoiceParseError> {
    match first_token(&PROJECT, text).as_deref() {
        Some(COLOR_COOPERATE) => Ok(DilemmaChoice::Cooperate),
        Some(COLOR_DEFECT) => Ok(DilemmaChoice::Defect),
        _ => Err(ChoiceParseError::new("project green or project blue", text)),
    }
}

/// Symmetric matrix payoffs; every pair of moves is legal
pub fn payoffs(
    a: &DilemmaChoice,
    b: &DilemmaChoice,
) -> Result<(f64, f64), InvalidChoiceCombination> {
    Ok(DILEMMA_PAYOFFS.lookup(a.index(), b.index()))
}

/// Fraction of rounds in which the model cooperated
pub fn compute_freq(choices: &[Choices<DilemmaChoice>]) -> f64 {
    let cooperated = choices.iter().filter(|c| c.ai == DilemmaChoice::Cooperate).count();
    cooperated as f64 / choices.len() as f64
}

pub fn rules() -> Rules<DilemmaChoice> {
    Rules {
        layout: Layout::Simultaneous,
        payoffs,
        extract_choice,
    }
}
