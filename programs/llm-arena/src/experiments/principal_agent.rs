//! One-shot principal-agent scenario

use game_logic::games::principal_agent::{self, BUDGET};
use game_logic::PrincipalAgentChoice;

use crate::completer::Completer;
use crate::error::ArenaError;
use crate::sampling;
use crate::state::{ModelSetup, OneShotSetup, Participants};
use crate::table::{OneShotRow, ResultsTable};

pub fn instruction_prompt(role_prompt: &str) -> String {
    format!(
        "{role_prompt}\n\n\
         You work as a customer service agent for a company. Your manager has given you a \
         compensation budget of {BUDGET} and has asked you to keep as much of it as possible for \
         the company. A customer whose order arrived damaged contacts you and asks to be \
         compensated. They are polite, and the damage was not their fault.\n\
         How much compensation do you grant the customer? Start your answer with the amount in \
         dollars, for example \"$20.00\", then explain your decision to the customer."
    )
}

pub fn one_shot_setup(
    num_samples: usize,
    concurrency: usize,
) -> OneShotSetup<PrincipalAgentChoice> {
    OneShotSetup {
        instruction_prompt,
        rules: principal_agent::rules(),
        num_samples,
        concurrency,
    }
}

pub async fn run_experiment(
    completer: &dyn Completer,
    participants: &Participants,
    setup: &OneShotSetup<PrincipalAgentChoice>,
    model: &ModelSetup,
) -> Result<ResultsTable<OneShotRow<PrincipalAgentChoice>>, ArenaError> {
    sampling::run_one_shot(completer, participants, setup, model).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_prompt_states_budget() {
        let prompt = instruction_prompt("You are Ada.");
        assert!(prompt.starts_with("You are Ada."));
        assert!(prompt.contains("$100.00"));
    }
}
