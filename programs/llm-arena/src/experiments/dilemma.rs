//! Repeated prisoner's dilemma against scripted partners

use game_logic::games::dilemma::{self, COLOR_COOPERATE, COLOR_DEFECT};
use game_logic::{
    Choice, DilemmaChoice, DilemmaPartner, GameError, GameState, Message, PartnerStrategy, Role,
    DILEMMA_PAYOFFS,
};

use crate::completer::Completer;
use crate::error::ArenaError;
use crate::sampling;
use crate::state::{
    GameSetup, MeasurementSetup, ModelSetup, ParticipantCondition, PartnerCondition, Participants,
};
use crate::table::{RepeatedRow, ResultsTable};

pub fn instruction_prompt(condition: &ParticipantCondition, role_prompt: &str) -> String {
    let m = DILEMMA_PAYOFFS;
    let answer = if condition.chain_of_thought {
        format!(
            "Think through your decision step by step without naming either project, then \
             finish your answer with your choice, either \"project {COLOR_COOPERATE}\" or \
             \"project {COLOR_DEFECT}\"."
        )
    } else {
        format!(
            "Answer only with your choice, either \"project {COLOR_COOPERATE}\" or \
             \"project {COLOR_DEFECT}\"."
        )
    };
    format!(
        "{role_prompt}\n\n\
         This is a study of investment choices in different situations. You will be making \
         your choices with an investment partner who is another person. You and your partner \
         will each choose a project, without knowing what the other will choose, and the game \
         repeats over several rounds.\n\
         If you both choose project {COLOR_COOPERATE}, you each earn ${r}.00. \
         If you choose project {COLOR_DEFECT} and your partner chooses project \
         {COLOR_COOPERATE}, you earn ${t}.00 and your partner earns ${s}.00. \
         If you choose project {COLOR_COOPERATE} and your partner chooses project \
         {COLOR_DEFECT}, you earn ${s}.00 and your partner earns ${t}.00. \
         If you both choose project {COLOR_DEFECT}, you each earn ${p}.00.\n\
         {answer}",
        r = m.r,
        t = m.t,
        s = m.s,
        p = m.p,
    )
}

/// Reveal the partner's move and the round's earnings
pub fn next_round(
    partner: &dyn PartnerStrategy<DilemmaChoice>,
    state: &GameState<'_, DilemmaChoice>,
) -> Result<Vec<Message>, GameError> {
    let partner_choice = partner.choose(state, Role::Either)?;
    let ai_choice = state.current_ai_choice(Role::Either)?;
    let (ai, user) = dilemma::payoffs(&ai_choice, &partner_choice)?;

    let mut text = format!(
        "Your partner chose {}. In this round you earned ${ai:.2} and your partner earned \
         ${user:.2}.",
        partner_choice.description()
    );
    if state.is_last_round() {
        text.push_str(" That was the final round. Thank you for taking part.");
    } else {
        text.push_str(
            " Now we will move on to the next round. What is your choice for the next round?",
        );
    }
    Ok(vec![Message::user(text)])
}

pub fn game_setup(num_rounds: usize) -> GameSetup<DilemmaChoice> {
    GameSetup {
        num_rounds,
        instruction_prompt,
        next_round,
        rules: dilemma::rules(),
    }
}

pub fn measurement_setup(
    num_samples: usize,
    concurrency: usize,
) -> MeasurementSetup<DilemmaChoice> {
    MeasurementSetup {
        num_samples,
        compute_freq: dilemma::compute_freq,
        concurrency,
    }
}

/// One condition per scripted partner
pub fn partner_conditions() -> Vec<PartnerCondition<DilemmaChoice>> {
    DilemmaPartner::ALL
        .into_iter()
        .map(|p| PartnerCondition::new(p.label(), p))
        .collect()
}

pub async fn run_experiment(
    completer: &dyn Completer,
    participants: &Participants,
    participant_conditions: &[ParticipantCondition],
    partner_conditions: &[PartnerCondition<DilemmaChoice>],
    num_rounds: usize,
    measurement: &MeasurementSetup<DilemmaChoice>,
    model: &ModelSetup,
) -> Result<ResultsTable<RepeatedRow<DilemmaChoice>>, ArenaError> {
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
