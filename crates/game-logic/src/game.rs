//! Round analysis: slicing a flat conversation into scored rounds
//!
//! After the instruction prompt, a repeated game's history alternates strictly
//! between the model and its partner: `[AI, USER, AI, USER, ...]`. A
//! [`Layout`] decides which messages make up round *i* and which role each
//! of them is read as.

use serde::Serialize;
use thiserror::Error;

use crate::choice::{Choice, Choices, Role, Round, Scores};
use crate::conversation::{Message, Speaker};
use crate::extract::{ChoiceParseError, ExtractFn};
use crate::payoff::{InvalidChoiceCombination, PayoffFn};

/// Summary statistic over a sample's choice sequence
pub type FrequencyFn<C> = fn(&[Choices<C>]) -> f64;

/// A history that does not have the shape the layout expects
#[derive(Clone, Debug, PartialEq, Eq, Error)]
#[error("invalid conversation of {len} messages: {reason}")]
pub struct InvalidConversation {
    pub len: usize,
    pub reason: String,
}

impl InvalidConversation {
    pub fn new(len: usize, reason: impl Into<String>) -> Self {
        Self { len, reason: reason.into() }
    }
}

/// Anything that can go wrong while playing or analysing one game
#[derive(Clone, Debug, PartialEq, Eq, Error)]
pub enum GameError {
    #[error(transparent)]
    ChoiceParse(#[from] ChoiceParseError),
    #[error(transparent)]
    InvalidConversation(#[from] InvalidConversation),
    #[error(transparent)]
    InvalidChoiceCombination(#[from] InvalidChoiceCombination),
}

impl GameError {
    /// Errors caused by model output degrade one sample. Bad role
    /// combinations are driver bugs and must abort the run.
    pub fn is_recoverable(&self) -> bool {
        match self {
            GameError::ChoiceParse(_) | GameError::InvalidConversation(_) => true,
            GameError::InvalidChoiceCombination(_) => false,
        }
    }
}

/// How a repeated game's conversation is laid out
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub enum Layout {
    /// Both parties choose blind each round
    Simultaneous,
    /// Parties swap proposer and responder every round; the model proposes
    /// in even rounds
    Alternating,
}

/// Per-game analysis configuration
#[derive(Clone, Copy)]
pub struct Rules<C: Choice> {
    pub layout: Layout,
    pub payoffs: PayoffFn<C>,
    pub extract_choice: ExtractFn<C>,
}

impl<C: Choice> Rules<C> {
    pub fn analyse_round(
        &self,
        round: usize,
        conversation: &[Message],
    ) -> Result<Round<C>, GameError> {
        self.layout.analyse_round(round, conversation, self)
    }

    pub fn analyse_rounds(&self, conversation: &[Message]) -> Result<Vec<Round<C>>, GameError> {
        self.layout.analyse_rounds(conversation, self)
    }
}

impl Layout {
    /// Analyse round `round` of a conversation with the instruction removed.
    ///
    /// Only the messages the round needs have to be present, so this also
    /// works on a game still in progress.
    pub fn analyse_round<C: Choice>(
        &self,
        round: usize,
        conversation: &[Message],
        rules: &Rules<C>,
    ) -> Result<Round<C>, GameError> {
        let extract = rules.extract_choice;
        let choices = match self {
            Layout::Simultaneous => {
                let ai = speaker_at(conversation, 2 * round, Speaker::Assistant)?;
                let user = speaker_at(conversation, 2 * round + 1, Speaker::User)?;
                Choices::new(
                    extract(&user.content, Role::Either)?,
                    extract(&ai.content, Role::Either)?,
                )
            }
            Layout::Alternating if round % 2 == 0 => {
                let ai = speaker_at(conversation, 2 * round, Speaker::Assistant)?;
                let user = speaker_at(conversation, 2 * round + 1, Speaker::User)?;
                Choices::new(
                    extract(&user.content, Role::Responder)?,
                    extract(&ai.content, Role::Proposer)?,
                )
            }
            Layout::Alternating => {
                // the partner's proposal closes the previous round's partner turn
                let user = speaker_at(conversation, 2 * round - 1, Speaker::User)?;
                let ai = speaker_at(conversation, 2 * round, Speaker::Assistant)?;
                Choices::new(
                    extract(&user.content, Role::Proposer)?,
                    extract(&ai.content, Role::Responder)?,
                )
            }
        };
        let (ai, user) = (rules.payoffs)(&choices.ai, &choices.user)?;
        Ok(Round { scores: Scores::new(user, ai), choices })
    }

    /// Analyse every round of a completed game
    pub fn analyse_rounds<C: Choice>(
        &self,
        conversation: &[Message],
        rules: &Rules<C>,
    ) -> Result<Vec<Round<C>>, GameError> {
        if conversation.len() % 2 != 0 {
            let error = InvalidConversation::new(
                conversation.len(),
                "expected an even number of messages",
            );
            return Err(error.into());
        }
        (0..conversation.len() / 2)
            .map(|i| self.analyse_round(i, conversation, rules))
            .collect()
    }
}

fn speaker_at(
    conversation: &[Message],
    index: usize,
    expected: Speaker,
) -> Result<&Message, InvalidConversation> {
    let message = conversation.get(index).ok_or_else(|| {
        InvalidConversation::new(conversation.len(), format!("no message at index {index}"))
    })?;
    if message.role != expected {
        return Err(InvalidConversation::new(
            conversation.len(),
            format!("expected {expected:?} at index {index}, found {:?}", message.role),
        ));
    }
    Ok(message)
}

/// Outcome of analysing one repeated game
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Analysis<C> {
    /// Accumulated scores of both parties
    pub scores: Scores,
    pub frequency: f64,
    pub choices: Vec<Choices<C>>,
}

impl<C> Analysis<C> {
    /// Total score of the model
    pub fn score(&self) -> f64 {
        self.scores.ai
    }
}

/// Sum per-round scores and collect the choice sequence
pub fn compute_scores<C: Choice>(
    conversation: &[Message],
    rules: &Rules<C>,
) -> Result<(Scores, Vec<Choices<C>>), GameError> {
    let rounds = rules.analyse_rounds(conversation)?;
    let scores = rounds.iter().map(|r| r.scores).sum();
    let choices = rounds.into_iter().map(|r| r.choices).collect();
    Ok((scores, choices))
}

/// Analyse a full history whose first message is the instruction prompt
pub fn analyse<C: Choice>(
    messages: &[Message],
    rules: &Rules<C>,
    compute_freq: FrequencyFn<C>,
) -> Result<Analysis<C>, GameError> {
    let conversation = strip_instruction(messages)?;
    let (scores, choices) = compute_scores(conversation, rules)?;
    let frequency = compute_freq(&choices);
    Ok(Analysis { scores, frequency, choices })
}

fn strip_instruction(messages: &[Message]) -> Result<&[Message], InvalidConversation> {
    match messages.split_first() {
        Some((_, rest)) => Ok(rest),
        None => Err(InvalidConversation::new(0, "missing instruction prompt")),
    }
}

/// Analysis configuration of a single-decision game
#[derive(Clone, Copy)]
pub struct OneShotRules<C: Choice> {
    pub extract_choice: ExtractFn<C>,
    /// Score of the model for its decision
    pub payoff: fn(&C) -> f64,
    pub compute_freq: fn(&C) -> f64,
}

/// Outcome of analysing one single-decision game
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OneShotAnalysis<C> {
    pub score: f64,
    pub frequency: f64,
    pub choice: C,
}

/// Analyse `[instruction, AI]`: exactly one model turn after the prompt
pub fn analyse_one_shot<C: Choice>(
    messages: &[Message],
    rules: &OneShotRules<C>,
) -> Result<OneShotAnalysis<C>, GameError> {
    let conversation = strip_instruction(messages)?;
    if conversation.len() != 1 {
        let error =
            InvalidConversation::new(conversation.len(), "expected exactly one model turn");
        return Err(error.into());
    }
    let turn = speaker_at(conversation, 0, Speaker::Assistant)?;
    let choice = (rules.extract_choice)(&turn.content, Role::Either)?;
    Ok(OneShotAnalysis {
        score: (rules.payoff)(&choice),
        frequency: (rules.compute_freq)(&choice),
        choice,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::dictator::{self, DictatorChoice};
    use crate::games::dilemma::{self, DilemmaChoice, DILEMMA_PAYOFFS};
    use crate::games::dilemma::DilemmaChoice::{Cooperate as C, Defect as D};

    fn conversation(texts: &[&str]) -> Vec<Message> {
        texts
            .iter()
            .enumerate()
            .map(|(i, t)| if i % 2 == 0 { Message::assistant(*t) } else { Message::user(*t) })
            .collect()
    }

    fn with_prompt(texts: &[&str]) -> Vec<Message> {
        let mut messages = vec![Message::user("instructions")];
        messages.extend(conversation(texts));
        messages
    }

    #[test]
    fn test_simultaneous_scores_and_choices() {
        let conv = conversation(&[
            "project green", "project blue",
            "project blue", "project green",
            "project blue", "project blue",
            "project blue", "project blue",
        ]);
        let (scores, choices) = compute_scores(&conv, &dilemma::rules()).unwrap();

        let m = DILEMMA_PAYOFFS;
        let (t, p, s) = (m.t as f64, m.p as f64, m.s as f64);
        assert_eq!(scores, Scores { ai: s + t + p + p, user: t + s + p + p });
        assert_eq!(
            choices,
            vec![Choices::new(D, C), Choices::new(C, D), Choices::new(D, D), Choices::new(D, D)]
        );
        assert_eq!(dilemma::compute_freq(&choices), 0.25);
    }

    #[test]
    fn test_simultaneous_round_count() {
        let rules = dilemma::rules();
        for k in 0..5 {
            let texts: Vec<&str> = (0..2 * k).map(|_| "project green").collect();
            let rounds = rules.analyse_rounds(&conversation(&texts)).unwrap();
            assert_eq!(rounds.len(), k);
        }
    }

    #[test]
    fn test_simultaneous_rejects_odd_length() {
        let conv = conversation(&["project green", "project blue", "project green"]);
        let err = dilemma::rules().analyse_rounds(&conv).unwrap_err();
        assert!(matches!(err, GameError::InvalidConversation(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_speaker_mismatch_is_invalid() {
        let conv = vec![Message::user("project green"), Message::assistant("project blue")];
        let err = dilemma::rules().analyse_round(0, &conv).unwrap_err();
        assert!(matches!(err, GameError::InvalidConversation(_)));
    }

    #[test]
    fn test_unparsable_turn_is_recoverable() {
        let conv = conversation(&["I would rather not say", "project blue"]);
        let err = dilemma::rules().analyse_rounds(&conv).unwrap_err();
        assert!(matches!(err, GameError::ChoiceParse(_)));
        assert!(err.is_recoverable());
    }

    #[test]
    fn test_analyse_strips_instruction() {
        let messages = with_prompt(&["project green", "project green"]);
        let analysis = analyse(&messages, &dilemma::rules(), dilemma::compute_freq).unwrap();
        assert_eq!(analysis.choices, vec![Choices::new(C, C)]);
        assert_eq!(analysis.score(), DILEMMA_PAYOFFS.r as f64);
        assert_eq!(analysis.frequency, 1.0);
    }

    #[test]
    fn test_analyse_empty_history() {
        let err =
            analyse::<DilemmaChoice>(&[], &dilemma::rules(), dilemma::compute_freq).unwrap_err();
        assert!(matches!(err, GameError::InvalidConversation(_)));
    }

    #[test]
    fn test_one_shot_analysis() {
        let messages = vec![
            Message::user("instructions"),
            Message::assistant("I choose project brown."),
        ];
        let analysis = analyse_one_shot(&messages, &dictator::rules()).unwrap();
        assert_eq!(analysis.choice, DictatorChoice::Brown);
        assert_eq!(analysis.score, 75.0);
        assert_eq!(analysis.frequency, 0.25);
    }

    #[test]
    fn test_one_shot_requires_single_turn() {
        let messages = vec![
            Message::user("instructions"),
            Message::assistant("project brown"),
            Message::user("are you sure?"),
        ];
        let err = analyse_one_shot(&messages, &dictator::rules()).unwrap_err();
        assert!(matches!(err, GameError::InvalidConversation(_)));

        let err = analyse_one_shot(&messages[..1], &dictator::rules()).unwrap_err();
        assert!(matches!(err, GameError::InvalidConversation(_)));
    }

    #[test]
    fn test_combination_error_is_fatal() {
        let err: GameError = InvalidChoiceCombination {
            first: "a".into(),
            second: "b".into(),
        }
        .into();
        assert!(!err.is_recoverable());
    }
}
