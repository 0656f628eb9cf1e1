//! Repeated ultimatum game with alternating proposer

use game_logic::games::ultimatum::{self, STAKE};
use game_logic::{
    Choice, GameError, GameState, Message, PartnerStrategy, Role, UltimatumChoice, UltimatumPartner,
};

use crate::completer::Completer;
use crate::error::ArenaError;
use crate::sampling;
use crate::state::{
    GameSetup, MeasurementSetup, ModelSetup, ParticipantCondition, PartnerCondition, Participants,
};
use crate::table::{RepeatedRow, ResultsTable};

pub fn instruction_prompt(condition: &ParticipantCondition, role_prompt: &str) -> String {
    let reasoning = if condition.chain_of_thought {
        "Think through each decision step by step without naming any amounts or your decision, \
         then finish with it."
    } else {
        "Keep your answers short."
    };
    format!(
        "{role_prompt}\n\n\
         You are playing a game with another person over several rounds. In every round \
         {STAKE} is split between the two of you. One player proposes how much of the {STAKE} \
         to offer the other, and the other player either accepts or rejects the offer. If the \
         offer is accepted, the money is split as proposed. If it is rejected, neither player \
         earns anything in that round. You and the other player take turns proposing, and you \
         propose first.\n\
         When you propose, state your offer as a dollar amount, for example \
         \"I offer you $4.00\". When you respond, say either \"accept\" or \"reject\". \
         {reasoning}\n\
         How much of the {STAKE} do you offer the other player?"
    )
}

/// Answer the model's turn, then hand the proposer role over
///
/// In even rounds the model has just proposed: the partner responds first
/// and, if the game goes on, proposes in the same message. In odd rounds the
/// model has just responded to that proposal.
pub fn next_round(
    partner: &dyn PartnerStrategy<UltimatumChoice>,
    state: &GameState<'_, UltimatumChoice>,
) -> Result<Vec<Message>, GameError> {
    let text = if state.round % 2 == 0 {
        let offer = state.current_ai_choice(Role::Proposer)?;
        let response = partner.choose(state, Role::Responder)?;
        let (ai, user) = ultimatum::payoffs(&offer, &response)?;

        // the response leads the message so it is the first token found
        let mut text = format!("I {} your offer.", response.description());
        if !state.is_last_round() {
            let proposal = partner.choose(state, Role::Proposer)?;
            text.push_str(&format!(
                " Now it is my turn to propose. I offer you {} out of {STAKE}. \
                 Do you accept or reject?",
                proposal.description()
            ));
        }
        text.push_str(&format!(" In this round you earned ${ai:.2} and I earned ${user:.2}."));
        text
    } else {
        let round = state.round_result(state.round)?;
        let verdict = match round.choices.ai {
            UltimatumChoice::Accept => "accepted",
            _ => "rejected",
        };
        let mut text = format!(
            "You {verdict} my offer. In this round you earned ${:.2} and I earned ${:.2}.",
            round.scores.ai, round.scores.user
        );
        if !state.is_last_round() {
            text.push_str(&format!(
                " Now it is your turn to propose. How much of the {STAKE} do you offer me?"
            ));
        }
        text
    };
    Ok(vec![Message::user(text)])
}

pub fn game_setup(num_rounds: usize) -> GameSetup<UltimatumChoice> {
    GameSetup {
        num_rounds,
        instruction_prompt,
        next_round,
        rules: ultimatum::rules(),
    }
}

pub fn measurement_setup(
    num_samples: usize,
    concurrency: usize,
) -> MeasurementSetup<UltimatumChoice> {
    MeasurementSetup {
        num_samples,
        compute_freq: ultimatum::compute_freq,
        concurrency,
    }
}

pub fn partner_conditions() -> Vec<PartnerCondition<UltimatumChoice>> {
    vec![
        PartnerCondition::new("always accept", UltimatumPartner::ALWAYS_ACCEPT),
        PartnerCondition::new("always reject", UltimatumPartner::ALWAYS_REJECT),
        PartnerCondition::new("fair", UltimatumPartner::FAIR),
        PartnerCondition::new("greedy", UltimatumPartner::GREEDY),
    ]
}

pub async fn run_experiment(
    completer: &dyn Completer,
    participants: &Participants,
    participant_conditions: &[ParticipantCondition],
    partner_conditions: &[PartnerCondition<UltimatumChoice>],
    num_rounds: usize,
    measurement: &MeasurementSetup<UltimatumChoice>,
    model: &ModelSetup,
) -> Result<ResultsTable<RepeatedRow<UltimatumChoice>>, ArenaError> {
    let game = game_setup(num_rounds);
    sampling::run(
        completer,
        participants,
        participant_conditions,
        partner_conditions,
        &game,
        measurement,
        model,
    )
    .await
}
