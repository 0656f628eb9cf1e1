//! Experiment setup records
//!
//! Built once per run and passed down by reference; never mutated.

use std::sync::Arc;

use game_logic::{
    Choice, FrequencyFn, GameError, GameState, Message, OneShotRules, PartnerStrategy, Rules,
};
use serde::{Deserialize, Serialize};

/// Default number of rounds in repeated games
pub const DEFAULT_ROUNDS: usize = 6;

/// Default number of independent samples per grid cell
pub const DEFAULT_SAMPLES: usize = 3;

/// Builds the instruction prompt from the participant condition and persona
pub type InstructionPrompt = fn(&ParticipantCondition, &str) -> String;

/// Builds the instruction prompt of a one-shot game from the persona
pub type OneShotPrompt = fn(&str) -> String;

/// Turns the partner's move into the next conversational message(s)
pub type RoundGenerator<C> =
    fn(&dyn PartnerStrategy<C>, &GameState<'_, C>) -> Result<Vec<Message>, GameError>;

/// Settings of the model under study
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ModelSetup {
    pub model: String,
    pub temperature: f32,
    pub max_tokens: u32,
    /// Canned reply used instead of calling the completion service
    #[serde(default)]
    pub dry_run: Option<String>,
}

impl Default for ModelSetup {
    fn default() -> Self {
        Self {
            model: "gpt-4o-mini".to_string(),
            temperature: 0.2,
            max_tokens: 300,
            dry_run: None,
        }
    }
}

/// How one repeated game is played
pub struct GameSetup<C: Choice> {
    pub num_rounds: usize,
    pub instruction_prompt: InstructionPrompt,
    pub next_round: RoundGenerator<C>,
    pub rules: Rules<C>,
}

/// How a repeated game is sampled and summarised
pub struct MeasurementSetup<C: Choice> {
    pub num_samples: usize,
    pub compute_freq: FrequencyFn<C>,
    /// Samples in flight at once; rows keep their order regardless
    pub concurrency: usize,
}

/// How a one-shot game is played and sampled
pub struct OneShotSetup<C: Choice> {
    pub instruction_prompt: OneShotPrompt,
    pub rules: OneShotRules<C>,
    pub num_samples: usize,
    pub concurrency: usize,
}

/// A treatment applied to the model's side of the game
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParticipantCondition {
    pub label: String,
    /// Ask the model to explain its reasoning before choosing
    #[serde(default)]
    pub chain_of_thought: bool,
}

impl ParticipantCondition {
    pub fn new(label: impl Into<String>, chain_of_thought: bool) -> Self {
        Self { label: label.into(), chain_of_thought }
    }

    pub fn defaults() -> Vec<ParticipantCondition> {
        vec![
            ParticipantCondition::new("direct", false),
            ParticipantCondition::new("chain-of-thought", true),
        ]
    }
}

/// A labelled partner strategy
pub struct PartnerCondition<C: Choice> {
    pub label: String,
    pub strategy: Arc<dyn PartnerStrategy<C>>,
}

impl<C: Choice> PartnerCondition<C> {
    pub fn new(label: impl Into<String>, strategy: impl PartnerStrategy<C> + 'static) -> Self {
        Self {
            label: label.into(),
            strategy: Arc::new(strategy),
        }
    }
}

impl<C: Choice> Clone for PartnerCondition<C> {
    fn clone(&self) -> Self {
        Self {
            label: self.label.clone(),
            strategy: Arc::clone(&self.strategy),
        }
    }
}

/// Keep the conditions whose label is listed, in the listed order
pub fn select_conditions<C: Choice>(
    available: Vec<PartnerCondition<C>>,
    labels: &[String],
) -> Result<Vec<PartnerCondition<C>>, String> {
    labels
        .iter()
        .map(|label| {
            available
                .iter()
                .find(|c| &c.label == label)
                .cloned()
                .ok_or_else(|| format!("unknown partner condition {label:?}"))
        })
        .collect()
}

/// Persona prompts sharing a disposition
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub name: String,
    pub prompts: Vec<String>,
}

/// The roster of simulated participants
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Participants {
    pub groups: Vec<Group>,
}

impl Participants {
    pub fn new(groups: Vec<Group>) -> Self {
        Self { groups }
    }

    /// Total number of persona prompts across groups
    pub fn prompt_count(&self) -> usize {
        self.groups.iter().map(|g| g.prompts.len()).sum()
    }

    /// `(group, prompt)` pairs in roster order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.groups
            .iter()
            .flat_map(|g| g.prompts.iter().map(move |p| (g.name.as_str(), p.as_str())))
    }
}
