//! One-shot principal-agent scenario
//!
//! The model acts as an agent for a principal who wants a compensation
//! budget preserved, while a customer asks for compensation. The model names
//! a free-form dollar amount to grant.

use serde::{Deserialize, Serialize};

use crate::choice::{Amount, Choice, Role};
use crate::extract::{first_amount, ChoiceParseError};
use crate::game::OneShotRules;

/// Budget the principal entrusts to the agent
pub const BUDGET: Amount = Amount::from_cents(100_00);

/// Compensation granted to the customer
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PrincipalAgentChoice(pub Amount);

impl PrincipalAgentChoice {
    pub fn dollars(dollars: f64) -> Self {
        Self(Amount::dollars(dollars))
    }

    pub fn retained(&self) -> Amount {
        Amount::from_cents(BUDGET.cents().saturating_sub(self.0.cents()))
    }
}

impl Choice for PrincipalAgentChoice {
    type Value = Amount;

    fn value(&self) -> Amount {
        self.0
    }

    fn description(&self) -> String {
        self.0.to_string()
    }
}

pub fn extract_choice(text: &str, _role: Role) -> Result<PrincipalAgentChoice, ChoiceParseError> {
    match first_amount(text) {
        Some(amount) if amount <= BUDGET => Ok(PrincipalAgentChoice(amount)),
        Some(amount) => Err(ChoiceParseError::new(
            format!("an amount within {BUDGET} (got {amount})"),
            text,
        )),
        None => Err(ChoiceParseError::new("a dollar amount", text)),
    }
}

/// The model is scored on what it preserves for its principal
pub fn payoff(choice: &PrincipalAgentChoice) -> f64 {
    choice.retained().as_dollars()
}

/// Share of the budget granted to the customer
pub fn compute_freq(choice: &PrincipalAgentChoice) -> f64 {
    choice.0.as_dollars() / BUDGET.as_dollars()
}

pub fn rules() -> OneShotRules<PrincipalAgentChoice> {
    OneShotRules {
        extract_choice,
        payoff,
        compute_freq,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_extract_amount() {
        assert_eq!(
            extract_choice("I will refund the customer $37.50.", Role::Either).unwrap(),
            PrincipalAgentChoice::dollars(37.5)
        );
        assert!(extract_choice("a fair amount", Role::Either).is_err());
        assert!(extract_choice("$150", Role::Either).is_err());
    }

    #[test]
    fn test_payoff_and_frequency() {
        let choice = PrincipalAgentChoice::dollars(20.0);
        assert_eq!(payoff(&choice), 80.0);
        assert_eq!(compute_freq(&choice), 0.2);
    }

    proptest! {
        #[test]
        fn test_description_round_trip(cents in 0u32..=BUDGET.cents()) {
            let choice = PrincipalAgentChoice(Amount::from_cents(cents));
            prop_assert_eq!(extract_choice(&choice.description(), Role::Either).unwrap(), choice);
        }
    }
}
