//! One-shot dictator game: the model splits an endowment with a stranger
//!
//! The donation options are framed as five colour-coded projects so the
//! model's answer is a discrete, parseable allocation.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::choice::{Amount, Choice, Role};
use crate::extract::{first_token, ChoiceParseError};
use crate::game::OneShotRules;

/// Amount the model may split
pub const ENDOWMENT: Amount = Amount::from_cents(100_00);

/// An allocation of the endowment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DictatorChoice {
    Black,
    Brown,
    Green,
    Blue,
    White,
}

impl DictatorChoice {
    pub const ALL: [DictatorChoice; 5] = [
        DictatorChoice::Black,
        DictatorChoice::Brown,
        DictatorChoice::Green,
        DictatorChoice::Blue,
        DictatorChoice::White,
    ];

    pub fn color(self) -> &'static str {
        match self {
            DictatorChoice::Black => "black",
            DictatorChoice::Brown => "brown",
            DictatorChoice::Green => "green",
            DictatorChoice::Blue => "blue",
            DictatorChoice::White => "white",
        }
    }

    /// Quarter steps from nothing to everything
    pub fn donation(self) -> Amount {
        let quarters = match self {
            DictatorChoice::Black => 0,
            DictatorChoice::Brown => 1,
            DictatorChoice::Green => 2,
            DictatorChoice::Blue => 3,
            DictatorChoice::White => 4,
        };
        Amount::from_cents(ENDOWMENT.cents() / 4 * quarters)
    }

    pub fn kept(self) -> Amount {
        Amount::from_cents(ENDOWMENT.cents() - self.donation().cents())
    }

    fn from_color(color: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|c| c.color() == color)
    }
}

impl Choice for DictatorChoice {
    type Value = Amount;

    fn value(&self) -> Amount {
        self.donation()
    }

    fn description(&self) -> String {
        format!("project {}", self.color())
    }
}

static PROJECT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)project\W{0,3}(black|brown|green|blue|white)\b")
        .expect("project pattern must compile")
});

pub fn extract_choice(text: &str, _role: Role) -> Result<DictatorChoice, ChoiceParseError> {
    first_token(&PROJECT, text)
        .and_then(|color| DictatorChoice::from_color(&color))
        .ok_or_else(|| ChoiceParseError::new("a project colour", text))
}

/// The model's payoff is what it keeps
pub fn payoff(choice: &DictatorChoice) -> f64 {
    choice.kept().as_dollars()
}

/// Share of the endowment given away
pub fn compute_freq(choice: &DictatorChoice) -> f64 {
    choice.donation().as_dollars() / ENDOWMENT.as_dollars()
}

pub fn rules() -> OneShotRules<DictatorChoice> {
    OneShotRules {
        extract_choice,
        payoff,
        compute_freq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_allocations_cover_endowment() {
        for choice in DictatorChoice::ALL {
            assert_eq!(choice.donation().cents() + choice.kept().cents(), ENDOWMENT.cents());
        }
        assert_eq!(DictatorChoice::Black.donation(), Amount::ZERO);
        assert_eq!(DictatorChoice::White.donation(), ENDOWMENT);
        assert_eq!(DictatorChoice::Green.donation(), Amount::dollars(50.0));
    }

    #[test]
    fn test_description_round_trip() {
        for choice in DictatorChoice::ALL {
            assert_eq!(extract_choice(&choice.description(), Role::Either).unwrap(), choice);
        }
    }

    #[test]
    fn test_extract_case_insensitive() {
        assert_eq!(
            extract_choice("My answer: 'PROJECT Brown'", Role::Either).unwrap(),
            DictatorChoice::Brown
        );
        assert!(extract_choice("project purple", Role::Either).is_err());
    }

    #[test]
    fn test_payoff_and_frequency() {
        let rules = rules();
        assert_eq!((rules.payoff)(&DictatorChoice::Blue), 25.0);
        assert_eq!((rules.compute_freq)(&DictatorChoice::Blue), 0.75);
        assert_eq!((rules.compute_freq)(&DictatorChoice::Black), 0.0);
    }
}
