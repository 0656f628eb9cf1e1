//! Sampling driver: runs a game over the whole experimental grid
//!
//! The grid is walked in a fixed order (groups, prompts, participant
//! conditions, partner conditions, samples) and rows come back in that order
//! however many samples are in flight.

use futures::stream::{self, Stream, StreamExt, TryStreamExt};
use game_logic::Choice;
use log::{debug, info};

use crate::completer::Completer;
use crate::engine::{run_one_shot_sample, run_sample};
use crate::error::ArenaError;
use crate::state::{
    GameSetup, MeasurementSetup, ModelSetup, OneShotSetup, ParticipantCondition, PartnerCondition,
    Participants,
};
use crate::table::{OneShotRow, RepeatedRow, ResultsTable};

/// Lazily play every cell of a repeated-game grid
pub fn samples<'a, C: Choice>(
    completer: &'a dyn Completer,
    participants: &'a Participants,
    participant_conditions: &'a [ParticipantCondition],
    partner_conditions: &'a [PartnerCondition<C>],
    game: &'a GameSetup<C>,
    measurement: &'a MeasurementSetup<C>,
    model: &'a ModelSetup,
) -> impl Stream<Item = Result<RepeatedRow<C>, ArenaError>> + 'a {
    let cells = participants.iter().flat_map(move |(group, prompt)| {
        participant_conditions.iter().flat_map(move |condition| {
            partner_conditions.iter().flat_map(move |partner| {
                (0..measurement.num_samples)
                    .map(move |sample| (group, prompt, condition, partner, sample))
            })
        })
    });

    stream::iter(cells)
        .map(move |(group, prompt, condition, partner, sample)| async move {
            debug!("{group} / {} / {} sample {sample}", condition.label, partner.label);
            let outcome = run_sample(
                completer,
                prompt,
                condition,
                partner.strategy.as_ref(),
                game,
                measurement,
                model,
            )
            .await?;
            Ok::<_, ArenaError>(RepeatedRow::new(
                group,
                prompt,
                &condition.label,
                &partner.label,
                outcome,
                model,
            ))
        })
        .buffered(measurement.concurrency.max(1))
}

/// Play the whole grid and collect the rows, aborting on the first fatal error
pub async fn run<C: Choice>(
    completer: &dyn Completer,
    participants: &Participants,
    participant_conditions: &[ParticipantCondition],
    partner_conditions: &[PartnerCondition<C>],
    game: &GameSetup<C>,
    measurement: &MeasurementSetup<C>,
    model: &ModelSetup,
) -> Result<ResultsTable<RepeatedRow<C>>, ArenaError> {
    let total = participants.prompt_count()
        * participant_conditions.len()
        * partner_conditions.len()
        * measurement.num_samples;
    info!("playing {total} samples of {} rounds with {}", game.num_rounds, model.model);

    let rows: Vec<_> = samples(
        completer,
        participants,
        participant_conditions,
        partner_conditions,
        game,
        measurement,
        model,
    )
    .try_collect()
    .await?;

    let table = ResultsTable::new(rows);
    info!("finished {} samples, {} degraded", table.len(), table.degraded_count());
    Ok(table)
}

/// Lazily play every cell of a single-decision grid
pub fn one_shot_samples<'a, C: Choice>(
    completer: &'a dyn Completer,
    participants: &'a Participants,
    setup: &'a OneShotSetup<C>,
    model: &'a ModelSetup,
) -> impl Stream<Item = Result<OneShotRow<C>, ArenaError>> + 'a {
    let cells = participants.iter().flat_map(move |(group, prompt)| {
        (0..setup.num_samples).map(move |sample| (group, prompt, sample))
    });

    stream::iter(cells)
        .map(move |(group, prompt, sample)| async move {
            debug!("{group} sample {sample}");
            let outcome = run_one_shot_sample(completer, prompt, setup, model).await?;
            Ok::<_, ArenaError>(OneShotRow::new(group, prompt, outcome))
        })
        .buffered(setup.concurrency.max(1))
}

pub async fn run_one_shot<C: Choice>(
    completer: &dyn Completer,
    participants: &Participants,
    setup: &OneShotSetup<C>,
    model: &ModelSetup,
) -> Result<ResultsTable<OneShotRow<C>>, ArenaError> {
    let total = participants.prompt_count() * setup.num_samples;
    info!("playing {total} one-shot samples with {}", model.model);
    let rows: Vec<_> = one_shot_samples(completer, participants, setup, model)
        .try_collect()
        .await?;

    let table = ResultsTable::new(rows);
    info!("finished {} samples, {} degraded", table.len(), table.degraded_count());
    Ok(table)
}
