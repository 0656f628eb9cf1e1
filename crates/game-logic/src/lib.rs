//! Game Logic for LLM cooperation experiments
//!
//! Pure game logic shared by every experiment:
//! - Choice model and payoffs for each game family
//! - Extraction of choices from free-text model turns
//! - Round analysis of simultaneous, alternating and one-shot conversations
//! - Simulated partner strategies

mod choice;
mod conversation;
mod extract;
mod game;
mod payoff;
mod strategy;

pub mod games;

pub use choice::{Amount, Choice, Choices, Role, Round, Scores};
pub use conversation::{transcript, Message, Speaker};
pub use extract::{first_amount, ChoiceParseError, ExtractFn};
pub use game::{
    analyse, analyse_one_shot, compute_scores, Analysis, FrequencyFn, GameError,
    InvalidConversation, Layout, OneShotAnalysis, OneShotRules, Rules,
};
pub use payoff::{InvalidChoiceCombination, PayoffError, PayoffFn, PayoffMatrix};
pub use strategy::{DilemmaPartner, GameState, PartnerStrategy};

pub use games::dictator::DictatorChoice;
pub use games::dilemma::{DilemmaChoice, DILEMMA_PAYOFFS};
pub use games::principal_agent::PrincipalAgentChoice;
pub use games::ultimatum::{UltimatumChoice, UltimatumPartner};
