//! Results tables
//!
//! One row per sample. Serialized column names are the contract with the
//! downstream analysis notebooks and must not change.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use game_logic::{Analysis, Choice, Choices, OneShotAnalysis};
use serde::Serialize;

use crate::engine::Sample;
use crate::error::ArenaError;
use crate::state::ModelSetup;

/// A serializable row with a fixed column order
pub trait Row: Serialize {
    const COLUMNS: &'static [&'static str];

    /// Whether the sample behind this row failed to parse
    fn is_degraded(&self) -> bool;
}

/// One sample of a repeated game
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RepeatedRow<C> {
    #[serde(rename = "Group")]
    pub group: String,
    #[serde(rename = "Participant")]
    pub participant: String,
    #[serde(rename = "Participant Condition")]
    pub participant_condition: String,
    #[serde(rename = "Partner Condition")]
    pub partner_condition: String,
    #[serde(rename = "Score")]
    pub score: f64,
    /// NaN (serialized as null) for degraded samples
    #[serde(rename = "Cooperation frequency")]
    pub cooperation_frequency: f64,
    #[serde(rename = "Choices")]
    pub choices: Option<Vec<Choices<C>>>,
    #[serde(rename = "Transcript")]
    pub transcript: Vec<String>,
    #[serde(rename = "Model")]
    pub model: String,
    #[serde(rename = "Temperature")]
    pub temperature: f32,
}

impl<C: Choice> RepeatedRow<C> {
    pub fn new(
        group: &str,
        participant: &str,
        participant_condition: &str,
        partner_condition: &str,
        sample: Sample<Analysis<C>>,
        model: &ModelSetup,
    ) -> Self {
        let (score, cooperation_frequency, choices, transcript) = match sample {
            Sample::Scored { analysis, transcript } => {
                (analysis.score(), analysis.frequency, Some(analysis.choices), transcript)
            }
            Sample::Degraded { error } => (0.0, f64::NAN, None, vec![error]),
        };
        Self {
            group: group.to_string(),
            participant: participant.to_string(),
            participant_condition: participant_condition.to_string(),
            partner_condition: partner_condition.to_string(),
            score,
            cooperation_frequency,
            choices,
            transcript,
            model: model.model.clone(),
            temperature: model.temperature,
        }
    }
}

impl<C: Choice> Row for RepeatedRow<C> {
    const COLUMNS: &'static [&'static str] = &[
        "Group",
        "Participant",
        "Participant Condition",
        "Partner Condition",
        "Score",
        "Cooperation frequency",
        "Choices",
        "Transcript",
        "Model",
        "Temperature",
    ];

    fn is_degraded(&self) -> bool {
        self.choices.is_none()
    }
}

/// One sample of a single-decision game
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct OneShotRow<C> {
    #[serde(rename = "Group")]
    pub group: String,
    #[serde(rename = "Participant")]
    pub participant: String,
    #[serde(rename = "Score")]
    pub score: f64,
    #[serde(rename = "Cooperation frequency")]
    pub cooperation_frequency: f64,
    #[serde(rename = "Choice")]
    pub choice: Option<C>,
    #[serde(rename = "Transcript")]
    pub transcript: Vec<String>,
}

impl<C: Choice> OneShotRow<C> {
    pub fn new(group: &str, participant: &str, sample: Sample<OneShotAnalysis<C>>) -> Self {
        let (score, cooperation_frequency, choice, transcript) = match sample {
            Sample::Scored { analysis, transcript } => {
                (analysis.score, analysis.frequency, Some(analysis.choice), transcript)
            }
            Sample::Degraded { error } => (0.0, f64::NAN, None, vec![error]),
        };
        Self {
            group: group.to_string(),
            participant: participant.to_string(),
            score,
            cooperation_frequency,
            choice,
            transcript,
        }
    }
}

impl<C: Choice> Row for OneShotRow<C> {
    const COLUMNS: &'static [&'static str] =
        &["Group", "Participant", "Score", "Cooperation frequency", "Choice", "Transcript"];

    fn is_degraded(&self) -> bool {
        self.choice.is_none()
    }
}

/// Rows of one experiment, in grid order
#[derive(Clone, Debug, PartialEq)]
pub struct ResultsTable<R> {
    rows: Vec<R>,
}

impl<R: Row> ResultsTable<R> {
    pub fn new(rows: Vec<R>) -> Self {
        Self { rows }
    }

    pub fn columns(&self) -> &'static [&'static str] {
        R::COLUMNS
    }

    pub fn rows(&self) -> &[R] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &R> {
        self.rows.iter()
    }

    /// Rows whose sample was analysed successfully
    pub fn scored(&self) -> impl Iterator<Item = &R> {
        self.rows.iter().filter(|r| !r.is_degraded())
    }

    pub fn degraded_count(&self) -> usize {
        self.rows.iter().filter(|r| r.is_degraded()).count()
    }

    /// Write one JSON object per row
    pub fn to_writer(&self, mut writer: impl Write) -> Result<(), ArenaError> {
        for row in &self.rows {
            serde_json::to_writer(&mut writer, row)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Write the table as JSON Lines to `path`
    pub fn write_json(&self, path: &Path) -> Result<(), ArenaError> {
        let file = File::create(path)?;
        self.to_writer(BufWriter::new(file))
    }
}
