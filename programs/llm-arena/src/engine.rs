//! Game-runner engine
//!
//! Plays one sample: a fresh conversation driven round by round against the
//! completion service, then analysed into scores and choices.

use game_logic::{
    analyse, analyse_one_shot, transcript, Analysis, Choice, GameState, Message, OneShotAnalysis,
    PartnerStrategy,
};
use log::{debug, warn};

use crate::completer::Completer;
use crate::error::{ArenaError, CompletionError};
use crate::state::{GameSetup, MeasurementSetup, ModelSetup, OneShotSetup, ParticipantCondition};

/// Result of one sample
///
/// Malformed model output spoils exactly one sample: it becomes `Degraded`
/// instead of aborting the batch.
#[derive(Clone, Debug, PartialEq)]
pub enum Sample<T> {
    Scored { analysis: T, transcript: Vec<String> },
    Degraded { error: String },
}

impl<T> Sample<T> {
    pub fn is_degraded(&self) -> bool {
        matches!(self, Sample::Degraded { .. })
    }
}

/// Request the model's next turn, or answer from the dry-run reply
async fn next_turn(
    completer: &dyn Completer,
    messages: &[Message],
    model: &ModelSetup,
) -> Result<Message, ArenaError> {
    if let Some(reply) = &model.dry_run {
        return Ok(Message::assistant(reply.clone()));
    }
    let mut turns = completer.complete(messages, model, 1).await?;
    if turns.is_empty() {
        return Err(CompletionError::Empty.into());
    }
    Ok(turns.swap_remove(0))
}

/// Play a repeated game for exactly `num_rounds` rounds
///
/// Each round requests one model turn, then lets the partner answer through
/// the round generator. There is no early exit: a rejected ultimatum offer
/// still moves on to the next round.
pub async fn play_game<C: Choice>(
    completer: &dyn Completer,
    role_prompt: &str,
    participant_condition: &ParticipantCondition,
    partner: &dyn PartnerStrategy<C>,
    game: &GameSetup<C>,
    model: &ModelSetup,
) -> Result<Vec<Message>, ArenaError> {
    let instruction = (game.instruction_prompt)(participant_condition, role_prompt);
    let mut messages = vec![Message::user(instruction)];

    for round in 0..game.num_rounds {
        let turn = next_turn(completer, &messages, model).await?;
        debug!("round {round}: model said {:?}", turn.content);
        messages.push(turn);

        let state = GameState::new(&messages, round, game.num_rounds, &game.rules);
        let replies = (game.next_round)(partner, &state)?;
        messages.extend(replies);
    }

    Ok(messages)
}

/// Play a single-decision game: one model turn after the instruction
pub async fn play_one_shot<C: Choice>(
    completer: &dyn Completer,
    role_prompt: &str,
    setup: &OneShotSetup<C>,
    model: &ModelSetup,
) -> Result<Vec<Message>, ArenaError> {
    let mut messages = vec![Message::user((setup.instruction_prompt)(role_prompt))];
    let turn = next_turn(completer, &messages, model).await?;
    messages.push(turn);
    Ok(messages)
}

/// Play and analyse one repeated-game sample
pub async fn run_sample<C: Choice>(
    completer: &dyn Completer,
    role_prompt: &str,
    participant_condition: &ParticipantCondition,
    partner: &dyn PartnerStrategy<C>,
    game: &GameSetup<C>,
    measurement: &MeasurementSetup<C>,
    model: &ModelSetup,
) -> Result<Sample<Analysis<C>>, ArenaError> {
    let played =
        play_game(completer, role_prompt, participant_condition, partner, game, model).await;
    contain(played.and_then(|messages| {
        let analysis = analyse(&messages, &game.rules, measurement.compute_freq)?;
        Ok((analysis, transcript(&messages)))
    }))
}

/// Play and analyse one single-decision sample
pub async fn run_one_shot_sample<C: Choice>(
    completer: &dyn Completer,
    role_prompt: &str,
    setup: &OneShotSetup<C>,
    model: &ModelSetup,
) -> Result<Sample<OneShotAnalysis<C>>, ArenaError> {
    let played = play_one_shot(completer, role_prompt, setup, model).await;
    contain(played.and_then(|messages| {
        let analysis = analyse_one_shot(&messages, &setup.rules)?;
        Ok((analysis, transcript(&messages)))
    }))
}

/// Turn recoverable failures into a degraded sample, pass fatal ones up
fn contain<T>(outcome: Result<(T, Vec<String>), ArenaError>) -> Result<Sample<T>, ArenaError> {
    match outcome {
        Ok((analysis, transcript)) => Ok(Sample::Scored { analysis, transcript }),
        Err(e) if e.is_recoverable() => {
            warn!("sample degraded: {e}");
            Ok(Sample::Degraded { error: e.to_string() })
        }
        Err(e) => Err(e),
    }
}
