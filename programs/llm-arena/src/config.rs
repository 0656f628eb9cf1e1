//! Experiment configuration
//!
//! Read from a JSON file, then overridden field by field from the command
//! line. Every field has a default, so an empty object is a valid file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::completer::ApiConfig;
use crate::error::ArenaError;
use crate::participants::default_roster;
use crate::state::{ModelSetup, ParticipantCondition, Participants, DEFAULT_ROUNDS, DEFAULT_SAMPLES};

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExperimentConfig {
    pub model: ModelSetup,
    pub num_samples: usize,
    pub num_rounds: usize,
    pub concurrency: usize,
    /// Replaces the built-in roster when present
    pub participants: Option<Participants>,
    pub participant_conditions: Option<Vec<ParticipantCondition>>,
    /// Partner condition labels to keep, in order
    pub partner_conditions: Option<Vec<String>>,
    pub api: ApiConfig,
}

impl Default for ExperimentConfig {
    fn default() -> Self {
        Self {
            model: ModelSetup::default(),
            num_samples: DEFAULT_SAMPLES,
            num_rounds: DEFAULT_ROUNDS,
            concurrency: 1,
            participants: None,
            participant_conditions: None,
            partner_conditions: None,
            api: ApiConfig::default(),
        }
    }
}

/// Command-line values that take precedence over the file
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Overrides {
    pub num_samples: Option<usize>,
    pub num_rounds: Option<usize>,
    pub concurrency: Option<usize>,
    pub model: Option<String>,
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
    pub dry_run: Option<String>,
}

impl ExperimentConfig {
    pub fn load(path: &Path) -> Result<Self, ArenaError> {
        let text = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn apply(mut self, overrides: Overrides) -> Self {
        if let Some(n) = overrides.num_samples {
            self.num_samples = n;
        }
        if let Some(n) = overrides.num_rounds {
            self.num_rounds = n;
        }
        if let Some(n) = overrides.concurrency {
            self.concurrency = n;
        }
        if let Some(model) = overrides.model {
            self.model.model = model;
        }
        if let Some(t) = overrides.temperature {
            self.model.temperature = t;
        }
        if let Some(n) = overrides.max_tokens {
            self.model.max_tokens = n;
        }
        if overrides.dry_run.is_some() {
            self.model.dry_run = overrides.dry_run;
        }
        self
    }

    pub fn validate(&self) -> Result<(), ArenaError> {
        if self.num_samples == 0 {
            return Err(ArenaError::Config("num_samples must be positive".into()));
        }
        if self.num_rounds == 0 {
            return Err(ArenaError::Config("num_rounds must be positive".into()));
        }
        if self.concurrency == 0 {
            return Err(ArenaError::Config("concurrency must be positive".into()));
        }
        if !(0.0..=2.0).contains(&self.model.temperature) {
            return Err(ArenaError::Config(format!(
                "temperature {} outside [0, 2]",
                self.model.temperature
            )));
        }
        if self.participants().prompt_count() == 0 {
            return Err(ArenaError::Config("participant roster is empty".into()));
        }
        Ok(())
    }

    pub fn participants(&self) -> Participants {
        self.participants.clone().unwrap_or_else(default_roster)
    }

    pub fn participant_conditions(&self) -> Vec<ParticipantCondition> {
        self.participant_conditions.clone().unwrap_or_else(ParticipantCondition::defaults)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_is_default() {
        let config: ExperimentConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, ExperimentConfig::default());
        assert!(config.validate().is_ok());
        assert_eq!(config.participants().groups.len(), 5);
        assert_eq!(config.participant_conditions().len(), 2);
    }

    #[test]
    fn test_partial_file() {
        let json = r#"{
            "num_samples": 10,
            "model": {"model": "gpt-4o", "temperature": 0.0, "max_tokens": 100},
            "partner_conditions": ["tit-for-tat"],
            "participants": {"groups": [{"name": "Control", "prompts": [""]}]}
        }"#;
        let config: ExperimentConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.num_samples, 10);
        assert_eq!(config.num_rounds, DEFAULT_ROUNDS);
        assert_eq!(config.model.model, "gpt-4o");
        assert_eq!(config.partner_conditions, Some(vec!["tit-for-tat".to_string()]));
        assert_eq!(config.participants().prompt_count(), 1);
        assert_eq!(config.api, ApiConfig::default());
    }

    #[test]
    fn test_overrides_win() {
        let config = ExperimentConfig::default().apply(Overrides {
            num_rounds: Some(10),
            temperature: Some(1.0),
            dry_run: Some("project green".into()),
            ..Overrides::default()
        });
        assert_eq!(config.num_rounds, 10);
        assert_eq!(config.num_samples, DEFAULT_SAMPLES);
        assert_eq!(config.model.temperature, 1.0);
        assert_eq!(config.model.dry_run.as_deref(), Some("project green"));
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let zero = ExperimentConfig { num_rounds: 0, ..ExperimentConfig::default() };
        assert!(matches!(zero.validate(), Err(ArenaError::Config(_))));

        let mut hot = ExperimentConfig::default();
        hot.model.temperature = 3.5;
        assert!(matches!(hot.validate(), Err(ArenaError::Config(_))));

        let empty = ExperimentConfig {
            participants: Some(Participants::new(vec![])),
            ..ExperimentConfig::default()
        };
        assert!(empty.validate().is_err());
    }
}
