//! Repeated ultimatum game with alternating proposer
//!
//! The model proposes in even rounds and responds in odd rounds. A proposal
//! is the amount offered to the responder out of [`STAKE`].

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::choice::{Amount, Choice, Choices, Role};
use crate::extract::{first_amount, first_token, ChoiceParseError};
use crate::game::{GameError, Layout, Rules};
use crate::payoff::InvalidChoiceCombination;
use crate::strategy::{GameState, PartnerStrategy};

/// Amount split in every round
pub const STAKE: Amount = Amount::from_cents(10_00);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UltimatumChoice {
    /// Amount offered to the responder
    Proposal(Amount),
    Accept,
    Reject,
}

impl UltimatumChoice {
    pub fn proposal(dollars: f64) -> Self {
        UltimatumChoice::Proposal(Amount::dollars(dollars))
    }
}

impl Choice for UltimatumChoice {
    type Value = UltimatumChoice;

    fn value(&self) -> UltimatumChoice {
        *self
    }

    fn description(&self) -> String {
        match self {
            UltimatumChoice::Proposal(amount) => amount.to_string(),
            UltimatumChoice::Accept => "accept".to_string(),
            UltimatumChoice::Reject => "reject".to_string(),
        }
    }
}

static RESPONSE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(accept|reject)(?:s|ed|ing)?\b").expect("response pattern must compile")
});

static EITHER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(accept|reject)(?:s|ed|ing)?\b|\$").expect("either pattern must compile")
});

fn extract_proposal(text: &str) -> Result<UltimatumChoice, ChoiceParseError> {
    match first_amount(text) {
        Some(amount) if amount <= STAKE => Ok(UltimatumChoice::Proposal(amount)),
        Some(amount) => Err(ChoiceParseError::new(
            format!("an offer of at most {STAKE} (got {amount})"),
            text,
        )),
        None => Err(ChoiceParseError::new("a dollar amount", text)),
    }
}

fn extract_response(text: &str) -> Result<UltimatumChoice, ChoiceParseError> {
    match first_token(&RESPONSE, text).as_deref() {
        Some("accept") => Ok(UltimatumChoice::Accept),
        Some("reject") => Ok(UltimatumChoice::Reject),
        _ => Err(ChoiceParseError::new("accept or reject", text)),
    }
}

/// Read a turn as a proposal, a response, or whichever token comes first
pub fn extract_choice(text: &str, role: Role) -> Result<UltimatumChoice, ChoiceParseError> {
    match role {
        Role::Proposer => extract_proposal(text),
        Role::Responder => extract_response(text),
        Role::Either => match EITHER.find(text) {
            Some(m) if m.as_str() == "$" => extract_proposal(&text[m.start()..]),
            Some(m) => extract_response(&text[m.start()..]),
            None => Err(ChoiceParseError::new("an offer, accept or reject", text)),
        },
    }
}

/// Accepted offers split the stake, rejections pay nothing. Scores follow
/// argument order, so the proposal may come first or second.
pub fn payoffs(
    a: &UltimatumChoice,
    b: &UltimatumChoice,
) -> Result<(f64, f64), InvalidChoiceCombination> {
    use UltimatumChoice::*;
    let split = |offer: &Amount| (STAKE.as_dollars() - offer.as_dollars(), offer.as_dollars());
    match (a, b) {
        (Proposal(offer), Accept) => Ok(split(offer)),
        (Accept, Proposal(offer)) => {
            let (proposer, responder) = split(offer);
            Ok((responder, proposer))
        }
        (Proposal(_), Reject) | (Reject, Proposal(_)) => Ok((0.0, 0.0)),
        _ => Err(InvalidChoiceCombination {
            first: a.description(),
            second: b.description(),
        }),
    }
}

/// Mean share of the stake the model offered when it proposed
pub fn compute_freq(choices: &[Choices<UltimatumChoice>]) -> f64 {
    let offers: Vec<f64> = choices
        .iter()
        .filter_map(|c| match c.ai {
            UltimatumChoice::Proposal(offer) => Some(offer.as_dollars() / STAKE.as_dollars()),
            _ => None,
        })
        .collect();
    offers.iter().sum::<f64>() / offers.len() as f64
}

pub fn rules() -> Rules<UltimatumChoice> {
    Rules {
        layout: Layout::Alternating,
        payoffs,
        extract_choice,
    }
}

/// A fixed simulated partner: what it offers, and the smallest offer it takes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct UltimatumPartner {
    pub offer: Amount,
    /// `None` rejects everything
    pub threshold: Option<Amount>,
}

impl UltimatumPartner {
    /// Accepts anything, offers half
    pub const ALWAYS_ACCEPT: UltimatumPartner = UltimatumPartner {
        offer: Amount::from_cents(5_00),
        threshold: Some(Amount::ZERO),
    };
    /// Rejects everything, offers half
    pub const ALWAYS_REJECT: UltimatumPartner = UltimatumPartner {
        offer: Amount::from_cents(5_00),
        threshold: None,
    };
    /// Accepts at least 30% of the stake, offers half
    pub const FAIR: UltimatumPartner = UltimatumPartner {
        offer: Amount::from_cents(5_00),
        threshold: Some(Amount::from_cents(3_00)),
    };
    /// Accepts any positive offer, offers a dollar
    pub const GREEDY: UltimatumPartner = UltimatumPartner {
        offer: Amount::from_cents(1_00),
        threshold: Some(Amount::from_cents(1)),
    };

    pub fn respond(&self, offer: Amount) -> UltimatumChoice {
        match self.threshold {
            Some(min) if offer >= min => UltimatumChoice::Accept,
            _ => UltimatumChoice::Reject,
        }
    }
}

impl PartnerStrategy<UltimatumChoice> for UltimatumPartner {
    fn choose(
        &self,
        state: &GameState<'_, UltimatumChoice>,
        role: Role,
    ) -> Result<UltimatumChoice, GameError> {
        match role {
            Role::Responder => match state.current_ai_choice(Role::Proposer)? {
                UltimatumChoice::Proposal(offer) => Ok(self.respond(offer)),
                other => Err(InvalidChoiceCombination {
                    first: other.description(),
                    second: "a response".to_string(),
                }
                .into()),
            },
            Role::Proposer | Role::Either => Ok(UltimatumChoice::Proposal(self.offer)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::conversation::Message;
    use proptest::prelude::*;
    use UltimatumChoice::{Accept, Reject};

    #[test]
    fn test_extract_proposal() {
        assert_eq!(
            extract_choice("$5.00", Role::Proposer).unwrap(),
            UltimatumChoice::proposal(5.0)
        );
        assert_eq!(
            extract_choice("I offer you $3", Role::Either).unwrap(),
            UltimatumChoice::proposal(3.0)
        );
    }

    #[test]
    fn test_parsed_equals_constructed() {
        let parsed = extract_choice("\"$5.00\"", Role::Proposer).unwrap();
        assert_eq!(parsed, UltimatumChoice::Proposal(Amount::dollars(5.0)));
        assert_eq!(parsed.value(), UltimatumChoice::proposal(5.0).value());
    }

    #[test]
    fn test_extract_response_any_case() {
        for text in ["reject", "REJECT", "  'Reject'  ", "\"reject\"", "I reject."] {
            assert_eq!(extract_choice(text, Role::Responder).unwrap(), Reject, "{text:?}");
            assert_eq!(extract_choice(text, Role::Either).unwrap(), Reject, "{text:?}");
        }
        assert_eq!(extract_choice("Accepted!", Role::Responder).unwrap(), Accept);
    }

    #[test]
    fn test_extract_malformed() {
        for text in ["maybe later", "five dollars", "I will think about it"] {
            assert!(extract_choice(text, Role::Either).is_err(), "{text:?}");
        }
        assert!(extract_choice("accept", Role::Proposer).is_err());
        assert!(extract_choice("$4", Role::Responder).is_err());
    }

    #[test]
    fn test_extract_offer_above_stake_fails() {
        assert!(extract_choice("$12.00", Role::Proposer).is_err());
    }

    #[test]
    fn test_extract_either_first_match_wins() {
        assert_eq!(extract_choice("I accept, then offer $2", Role::Either).unwrap(), Accept);
        assert_eq!(
            extract_choice("$2 or I reject", Role::Either).unwrap(),
            UltimatumChoice::proposal(2.0)
        );
    }

    #[test]
    fn test_payoffs() {
        let offer = UltimatumChoice::proposal(3.0);
        assert_eq!(payoffs(&offer, &Accept).unwrap(), (7.0, 3.0));
        assert_eq!(payoffs(&Accept, &offer).unwrap(), (3.0, 7.0));
        assert_eq!(payoffs(&offer, &Reject).unwrap(), (0.0, 0.0));
        assert_eq!(payoffs(&Reject, &offer).unwrap(), (0.0, 0.0));
    }

    #[test]
    fn test_invalid_combinations() {
        let offer = UltimatumChoice::proposal(3.0);
        assert!(payoffs(&offer, &offer).is_err());
        assert!(payoffs(&Accept, &Reject).is_err());
        assert!(payoffs(&Reject, &Reject).is_err());
    }

    #[test]
    fn test_compute_freq() {
        let choices = vec![
            Choices::new(Accept, UltimatumChoice::proposal(5.0)),
            Choices::new(UltimatumChoice::proposal(1.0), Reject),
            Choices::new(Reject, UltimatumChoice::proposal(3.0)),
        ];
        assert!((compute_freq(&choices) - 0.4).abs() < 1e-12);
        assert!(compute_freq(&choices[1..2]).is_nan());
    }

    #[test]
    fn test_alternating_rounds() {
        let conversation = vec![
            Message::assistant("I propose $4.00"),
            Message::user("I accept your offer. Now I offer you $1.00 out of $10.00."),
            Message::assistant("I reject."),
            Message::user("Your turn to propose."),
        ];
        let rounds = rules().analyse_rounds(&conversation).unwrap();
        assert_eq!(rounds.len(), 2);
        assert_eq!(rounds[0].choices, Choices::new(Accept, UltimatumChoice::proposal(4.0)));
        assert_eq!((rounds[0].scores.ai, rounds[0].scores.user), (6.0, 4.0));
        assert_eq!(rounds[1].choices, Choices::new(UltimatumChoice::proposal(1.0), Reject));
        assert_eq!((rounds[1].scores.ai, rounds[1].scores.user), (0.0, 0.0));
    }

    #[test]
    fn test_partner_responds_to_current_offer() {
        let rules = rules();
        let messages = vec![Message::user("instructions"), Message::assistant("I offer $2.00")];
        let state = GameState::new(&messages, 0, 4, &rules);
        assert_eq!(UltimatumPartner::FAIR.choose(&state, Role::Responder).unwrap(), Reject);
        assert_eq!(UltimatumPartner::GREEDY.choose(&state, Role::Responder).unwrap(), Accept);
        assert_eq!(
            UltimatumPartner::ALWAYS_REJECT.choose(&state, Role::Responder).unwrap(),
            Reject
        );
        assert_eq!(
            UltimatumPartner::GREEDY.choose(&state, Role::Proposer).unwrap(),
            UltimatumChoice::proposal(1.0)
        );
    }

    proptest! {
        #[test]
        fn test_proposal_description_round_trip(cents in 0u32..=STAKE.cents()) {
            let choice = UltimatumChoice::Proposal(Amount::from_cents(cents));
            prop_assert_eq!(extract_choice(&choice.description(), Role::Proposer).unwrap(), choice);
            prop_assert_eq!(extract_choice(&choice.description(), Role::Either).unwrap(), choice);
        }
    }

    #[test]
    fn test_response_description_round_trip() {
        for choice in [Accept, Reject] {
            assert_eq!(extract_choice(&choice.description(), Role::Responder).unwrap(), choice);
        }
    }
}
