//! Experiment definitions per game
//!
//! Each module pairs a game family with its prompts, round generator and
//! partner conditions. [`run`] dispatches on the game and writes the table.

pub mod dictator;
pub mod dilemma;
pub mod principal_agent;
pub mod ultimatum;

use std::path::Path;

use clap::ValueEnum;
use log::info;

use crate::completer::Completer;
use crate::config::ExperimentConfig;
use crate::error::ArenaError;
use crate::state::{select_conditions, PartnerCondition};
use crate::table::{ResultsTable, Row};
use game_logic::Choice;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum Game {
    Dilemma,
    Dictator,
    Ultimatum,
    PrincipalAgent,
}

/// What a finished run produced
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RunSummary {
    pub rows: usize,
    pub degraded: usize,
}

impl<R: Row> From<&ResultsTable<R>> for RunSummary {
    fn from(table: &ResultsTable<R>) -> Self {
        Self {
            rows: table.len(),
            degraded: table.degraded_count(),
        }
    }
}

fn select_partners<C: Choice>(
    available: Vec<PartnerCondition<C>>,
    config: &ExperimentConfig,
) -> Result<Vec<PartnerCondition<C>>, ArenaError> {
    match &config.partner_conditions {
        Some(labels) => select_conditions(available, labels).map_err(ArenaError::Config),
        None => Ok(available),
    }
}

fn finish<R: Row>(table: ResultsTable<R>, output: &Path) -> Result<RunSummary, ArenaError> {
    table.write_json(output)?;
    info!("wrote {} rows to {}", table.len(), output.display());
    Ok(RunSummary::from(&table))
}

/// Run `game` with the given configuration and write its table to `output`
pub async fn run(
    game: Game,
    completer: &dyn Completer,
    config: &ExperimentConfig,
    output: &Path,
) -> Result<RunSummary, ArenaError> {
    config.validate()?;
    let participants = config.participants();
    let conditions = config.participant_conditions();
    let (samples, concurrency) = (config.num_samples, config.concurrency);
    info!("running {game:?} experiment");

    match game {
        Game::Dilemma => {
            let partners = select_partners(dilemma::partner_conditions(), config)?;
            let measurement = dilemma::measurement_setup(samples, concurrency);
            let table = dilemma::run_experiment(
                completer,
                &participants,
                &conditions,
                &partners,
                config.num_rounds,
                &measurement,
                &config.model,
            )
            .await?;
            finish(table, output)
        }
        Game::Ultimatum => {
            let partners = select_partners(ultimatum::partner_conditions(), config)?;
            let measurement = ultimatum::measurement_setup(samples, concurrency);
            let table = ultimatum::run_experiment(
                completer,
                &participants,
                &conditions,
                &partners,
                config.num_rounds,
                &measurement,
                &config.model,
            )
            .await?;
            finish(table, output)
        }
        Game::Dictator => {
            let setup = dictator::one_shot_setup(samples, concurrency);
            let table =
                dictator::run_experiment(completer, &participants, &setup, &config.model).await?;
            finish(table, output)
        }
        Game::PrincipalAgent => {
            let setup = principal_agent::one_shot_setup(samples, concurrency);
            let table =
                principal_agent::run_experiment(completer, &participants, &setup, &config.model)
                    .await?;
            finish(table, output)
        }
    }
}
