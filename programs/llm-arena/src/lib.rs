//! LLM Arena - repeated-game experiments against a language model
//!
//! Drives multi-round conversations with a chat completion service, lets
//! scripted partners answer, and scores the model's choices with the game
//! logic from `game-logic`.

mod completer;
mod config;
mod engine;
mod error;
mod participants;
mod sampling;
mod state;
mod table;

pub mod experiments;

use std::fs::{self, File};
use std::time::{SystemTime, UNIX_EPOCH};

use anyhow::Context;

pub use completer::{ApiConfig, Completer, OpenAiCompleter};
pub use config::{ExperimentConfig, Overrides};
pub use engine::{play_game, play_one_shot, run_one_shot_sample, run_sample, Sample};
pub use error::{ArenaError, CompletionError};
pub use experiments::{Game, RunSummary};
pub use participants::default_roster;
pub use sampling::{one_shot_samples, run, run_one_shot, samples};
pub use state::{
    GameSetup, Group, MeasurementSetup, ModelSetup, OneShotSetup, ParticipantCondition,
    PartnerCondition, Participants, DEFAULT_ROUNDS, DEFAULT_SAMPLES,
};
pub use table::{OneShotRow, RepeatedRow, ResultsTable, Row};

/// Initialize terminal logging at `level` plus a debug log file under `logs/`
pub fn log(level: log::LevelFilter) -> anyhow::Result<()> {
    fs::create_dir_all("logs").context("create logs directory")?;
    let config = simplelog::ConfigBuilder::new()
        .set_location_level(log::LevelFilter::Off)
        .set_target_level(log::LevelFilter::Off)
        .set_thread_level(log::LevelFilter::Off)
        .build();
    let time = SystemTime::now().duration_since(UNIX_EPOCH)?.as_secs();
    let path = format!("logs/{time}.log");
    let file = simplelog::WriteLogger::new(
        log::LevelFilter::Debug,
        config.clone(),
        File::create(&path).with_context(|| format!("create log file {path}"))?,
    );
    let term = simplelog::TermLogger::new(
        level,
        config,
        simplelog::TerminalMode::Mixed,
        simplelog::ColorChoice::Auto,
    );
    simplelog::CombinedLogger::init(vec![term, file]).context("initialize logger")?;
    Ok(())
}
