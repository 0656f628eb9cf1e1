//! One-shot dictator game framed as a choice between coloured projects

use game_logic::games::dictator::{self, ENDOWMENT};
use game_logic::{Choice, DictatorChoice};

use crate::completer::Completer;
use crate::error::ArenaError;
use crate::sampling;
use crate::state::{ModelSetup, OneShotSetup, Participants};
use crate::table::{OneShotRow, ResultsTable};

pub fn instruction_prompt(role_prompt: &str) -> String {
    let options: Vec<String> = DictatorChoice::ALL
        .iter()
        .map(|c| {
            format!(
                "- {}: you keep {} and the other person receives {}",
                c.description(),
                c.kept(),
                c.donation()
            )
        })
        .collect();
    format!(
        "{role_prompt}\n\n\
         You have been given {ENDOWMENT} and must decide how much of it to share with another \
         person you will never meet. The other person has no say in your decision. Choose \
         exactly one of these projects:\n\
         {}\n\
         Answer with the name of the project you choose, for example \"project black\".",
        options.join("\n")
    )
}

pub fn one_shot_setup(num_samples: usize, concurrency: usize) -> OneShotSetup<DictatorChoice> {
    OneShotSetup {
        instruction_prompt,
        rules: dictator::rules(),
        num_samples,
        concurrency,
    }
}

pub async fn run_experiment(
    completer: &dyn Completer,
    participants: &Participants,
    setup: &OneShotSetup<DictatorChoice>,
    model: &ModelSetup,
) -> Result<ResultsTable<OneShotRow<DictatorChoice>>, ArenaError> {
    sampling::run_one_shot(completer, participants, setup, model).await
}
