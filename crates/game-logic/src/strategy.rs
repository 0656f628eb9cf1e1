//! Game state and simulated partner strategies

use serde::{Deserialize, Serialize};

use crate::choice::{Choice, Role, Round};
use crate::conversation::Message;
use crate::game::{GameError, InvalidConversation, Rules};
use crate::games::dilemma::{DilemmaChoice, DILEMMA_PAYOFFS};

/// Context handed to a partner strategy at a round boundary
///
/// Built over the history *including* the model turn just received for
/// `round`. Derived accessors re-analyse the history on every call; nothing
/// is cached.
pub struct GameState<'a, C: Choice> {
    /// Full history, instruction prompt first
    pub messages: &'a [Message],
    /// Current round (0-indexed)
    pub round: usize,
    pub num_rounds: usize,
    pub rules: &'a Rules<C>,
}

impl<'a, C: Choice> GameState<'a, C> {
    pub fn new(
        messages: &'a [Message],
        round: usize,
        num_rounds: usize,
        rules: &'a Rules<C>,
    ) -> Self {
        Self {
            messages,
            round,
            num_rounds,
            rules,
        }
    }

    /// History without the instruction prompt
    pub fn conversation(&self) -> &'a [Message] {
        self.messages.get(1..).unwrap_or(&[])
    }

    pub fn round_result(&self, round: usize) -> Result<Round<C>, GameError> {
        self.rules.analyse_round(round, self.conversation())
    }

    /// The most recently completed round, `None` before the first one
    pub fn last_round(&self) -> Result<Option<Round<C>>, GameError> {
        match self.round.checked_sub(1) {
            Some(previous) => self.round_result(previous).map(Some),
            None => Ok(None),
        }
    }

    /// Every completed round, oldest first
    pub fn rounds(&self) -> Result<Vec<Round<C>>, GameError> {
        (0..self.round).map(|i| self.round_result(i)).collect()
    }

    pub fn last_ai_message(&self) -> Option<&'a Message> {
        self.messages.iter().rev().find(|m| m.is_ai())
    }

    /// The model's decision in its latest turn, read as `role`
    pub fn current_ai_choice(&self, role: Role) -> Result<C, GameError> {
        let message = self
            .last_ai_message()
            .ok_or_else(|| InvalidConversation::new(self.messages.len(), "no model turn yet"))?;
        Ok((self.rules.extract_choice)(&message.content, role)?)
    }

    pub fn is_last_round(&self) -> bool {
        self.round + 1 >= self.num_rounds
    }
}

/// Decides what the simulated partner does this round
///
/// `role` says which decision is asked for in alternating games; simultaneous
/// games always pass [`Role::Either`].
pub trait PartnerStrategy<C: Choice>: Send + Sync {
    fn choose(&self, state: &GameState<'_, C>, role: Role) -> Result<C, GameError>;
}

impl<C, F> PartnerStrategy<C> for F
where
    C: Choice,
    F: Fn(&GameState<'_, C>, Role) -> Result<C, GameError> + Send + Sync,
{
    fn choose(&self, state: &GameState<'_, C>, role: Role) -> Result<C, GameError> {
        self(state, role)
    }
}

/// Partner behaviours for the repeated prisoner's dilemma
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum DilemmaPartner {
    /// Copy the model's last move. Start with cooperate.
    TitForTat,
    /// Always defect, never cooperate.
    AlwaysDefect,
    /// Always cooperate, never defect.
    AlwaysCooperate,
    /// Cooperate until the model defects once, then always defect.
    GrimTrigger,
    /// Win-stay, lose-switch. Repeat move if good outcome.
    Pavlov,
    /// Tit-for-Tat but start with defect.
    SuspiciousTitForTat,
    /// Defect only if the model defected twice in a row.
    TitForTwoTats,
    /// Retaliate with increasing defection streaks, then forgive.
    Gradual,
}

impl DilemmaPartner {
    pub const ALL: [DilemmaPartner; 8] = [
        DilemmaPartner::AlwaysCooperate,
        DilemmaPartner::AlwaysDefect,
        DilemmaPartner::TitForTat,
        DilemmaPartner::SuspiciousTitForTat,
        DilemmaPartner::GrimTrigger,
        DilemmaPartner::Pavlov,
        DilemmaPartner::TitForTwoTats,
        DilemmaPartner::Gradual,
    ];

    /// Condition label used in result tables
    pub fn label(&self) -> &'static str {
        match self {
            DilemmaPartner::TitForTat => "tit-for-tat",
            DilemmaPartner::AlwaysDefect => "unconditional defect",
            DilemmaPartner::AlwaysCooperate => "unconditional cooperate",
            DilemmaPartner::GrimTrigger => "grim trigger",
            DilemmaPartner::Pavlov => "pavlov",
            DilemmaPartner::SuspiciousTitForTat => "suspicious tit-for-tat",
            DilemmaPartner::TitForTwoTats => "tit-for-two-tats",
            DilemmaPartner::Gradual => "gradual",
        }
    }

    /// Decide the partner's move from the completed rounds so far
    ///
    /// `ai_history` and `my_history` hold the model's and the partner's past
    /// moves, oldest first.
    pub fn decide(
        &self,
        ai_history: &[DilemmaChoice],
        my_history: &[DilemmaChoice],
    ) -> DilemmaChoice {
        match self {
            DilemmaPartner::TitForTat => {
                ai_history.last().copied().unwrap_or(DilemmaChoice::Cooperate)
            }
            DilemmaPartner::SuspiciousTitForTat => {
                ai_history.last().copied().unwrap_or(DilemmaChoice::Defect)
            }
            DilemmaPartner::AlwaysDefect => DilemmaChoice::Defect,
            DilemmaPartner::AlwaysCooperate => DilemmaChoice::Cooperate,
            DilemmaPartner::GrimTrigger => decide_grim_trigger(ai_history),
            DilemmaPartner::Pavlov => decide_pavlov(ai_history, my_history),
            DilemmaPartner::TitForTwoTats => decide_tit_for_two_tats(ai_history),
            DilemmaPartner::Gradual => decide_gradual(ai_history, my_history),
        }
    }
}

impl PartnerStrategy<DilemmaChoice> for DilemmaPartner {
    fn choose(
        &self,
        state: &GameState<'_, DilemmaChoice>,
        _role: Role,
    ) -> Result<DilemmaChoice, GameError> {
        let (ai_history, my_history): (Vec<_>, Vec<_>) = state
            .rounds()?
            .into_iter()
            .map(|r| (r.choices.ai, r.choices.user))
            .unzip();
        Ok(self.decide(&ai_history, &my_history))
    }
}

fn decide_grim_trigger(ai_history: &[DilemmaChoice]) -> DilemmaChoice {
    if ai_history.contains(&DilemmaChoice::Defect) {
        DilemmaChoice::Defect
    } else {
        DilemmaChoice::Cooperate
    }
}

/// Stay after earning at least the cooperation reward, switch otherwise
fn decide_pavlov(ai_history: &[DilemmaChoice], my_history: &[DilemmaChoice]) -> DilemmaChoice {
    let (Some(my_last), Some(ai_last)) = (my_history.last(), ai_history.last()) else {
        return DilemmaChoice::Cooperate;
    };
    let (my_score, _) = DILEMMA_PAYOFFS.lookup(my_last.index(), ai_last.index());
    if my_score >= DILEMMA_PAYOFFS.r as f64 {
        *my_last
    } else {
        my_last.opposite()
    }
}

fn decide_tit_for_two_tats(ai_history: &[DilemmaChoice]) -> DilemmaChoice {
    match ai_history {
        [.., DilemmaChoice::Defect, DilemmaChoice::Defect] => DilemmaChoice::Defect,
        _ => DilemmaChoice::Cooperate,
    }
}

/// After N model defections the partner should have defected N(N+1)/2 times
fn decide_gradual(ai_history: &[DilemmaChoice], my_history: &[DilemmaChoice]) -> DilemmaChoice {
    let count = |h: &[DilemmaChoice]| h.iter().filter(|m| **m == DilemmaChoice::Defect).count();
    let theirs = count(ai_history);
    if count(my_history) < theirs * (theirs + 1) / 2 {
        DilemmaChoice::Defect
    } else {
        DilemmaChoice::Cooperate
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::games::dilemma::{self, DilemmaChoice::{Cooperate as C, Defect as D}};

    fn history(ai_moves: &[DilemmaChoice], user_moves: &[DilemmaChoice]) -> Vec<Message> {
        let mut messages = vec![Message::user("instructions")];
        for (ai, user) in ai_moves.iter().zip(user_moves) {
            messages.push(Message::assistant(ai.description()));
            messages.push(Message::user(format!("Your partner chose {}.", user.description())));
        }
        messages
    }

    #[test]
    fn test_tit_for_tat_first_move() {
        assert_eq!(DilemmaPartner::TitForTat.decide(&[], &[]), C);
        assert_eq!(DilemmaPartner::SuspiciousTitForTat.decide(&[], &[]), D);
    }

    #[test]
    fn test_tit_for_tat_copies() {
        assert_eq!(DilemmaPartner::TitForTat.decide(&[C], &[C]), C);
        assert_eq!(DilemmaPartner::TitForTat.decide(&[C, D], &[C, C]), D);
    }

    #[test]
    fn test_unconditional() {
        for ai in [&[][..], &[C][..], &[D, D][..]] {
            assert_eq!(DilemmaPartner::AlwaysDefect.decide(ai, &[]), D);
            assert_eq!(DilemmaPartner::AlwaysCooperate.decide(ai, &[]), C);
        }
    }

    #[test]
    fn test_grim_trigger() {
        assert_eq!(DilemmaPartner::GrimTrigger.decide(&[C, C], &[C, C]), C);
        assert_eq!(DilemmaPartner::GrimTrigger.decide(&[D, C, C], &[C, D, D]), D);
    }

    #[test]
    fn test_pavlov_win_stay() {
        // Both cooperated (R) - stay with cooperate
        assert_eq!(DilemmaPartner::Pavlov.decide(&[C], &[C]), C);
        // Partner defected, model cooperated (T) - stay with defect
        assert_eq!(DilemmaPartner::Pavlov.decide(&[C], &[D]), D);
    }

    #[test]
    fn test_pavlov_lose_switch() {
        // Partner cooperated, model defected (S) - switch to defect
        assert_eq!(DilemmaPartner::Pavlov.decide(&[D], &[C]), D);
        // Both defected (P) - switch to cooperate
        assert_eq!(DilemmaPartner::Pavlov.decide(&[D], &[D]), C);
    }

    #[test]
    fn test_tit_for_two_tats() {
        assert_eq!(DilemmaPartner::TitForTwoTats.decide(&[C, D], &[]), C);
        assert_eq!(DilemmaPartner::TitForTwoTats.decide(&[D, D], &[]), D);
        assert_eq!(DilemmaPartner::TitForTwoTats.decide(&[D], &[]), C);
    }

    #[test]
    fn test_gradual_escalates() {
        // one model defection -> one retaliation
        assert_eq!(DilemmaPartner::Gradual.decide(&[D], &[C]), D);
        assert_eq!(DilemmaPartner::Gradual.decide(&[D, C], &[C, D]), C);
        // two model defections -> three retaliations in total
        assert_eq!(DilemmaPartner::Gradual.decide(&[D, C, D], &[C, D, C]), D);
    }

    #[test]
    fn test_state_last_round_recomputed() {
        let rules = dilemma::rules();
        let mut messages = history(&[C, D], &[C, C]);
        messages.push(Message::assistant("project green"));

        let state = GameState::new(&messages, 2, 6, &rules);
        let last = state.last_round().unwrap().unwrap();
        assert_eq!(last.choices.ai, D);
        assert_eq!(last.choices.user, C);
        assert_eq!(state.rounds().unwrap().len(), 2);
        assert_eq!(state.current_ai_choice(Role::Either).unwrap(), C);
        assert!(!state.is_last_round());
    }

    #[test]
    fn test_state_first_round_has_no_last_round() {
        let rules = dilemma::rules();
        let messages = vec![Message::user("instructions"), Message::assistant("project blue")];
        let state = GameState::new(&messages, 0, 1, &rules);
        assert_eq!(state.last_round().unwrap(), None);
        assert!(state.is_last_round());
    }

    #[test]
    fn test_partner_reads_history() {
        let rules = dilemma::rules();
        let mut messages = history(&[C, D], &[C, C]);
        messages.push(Message::assistant("project green"));
        let state = GameState::new(&messages, 2, 6, &rules);

        assert_eq!(DilemmaPartner::TitForTat.choose(&state, Role::Either).unwrap(), D);
        assert_eq!(DilemmaPartner::GrimTrigger.choose(&state, Role::Either).unwrap(), D);
        assert_eq!(DilemmaPartner::TitForTwoTats.choose(&state, Role::Either).unwrap(), C);
    }

    #[test]
    fn test_partner_surfaces_parse_errors() {
        let rules = dilemma::rules();
        let messages = vec![
            Message::user("instructions"),
            Message::assistant("no idea"),
            Message::user("Your partner chose project green."),
            Message::assistant("project green"),
        ];
        let state = GameState::new(&messages, 1, 6, &rules);
        let err = DilemmaPartner::TitForTat.choose(&state, Role::Either).unwrap_err();
        assert!(err.is_recoverable());
    }

    fn mirror(
        state: &GameState<'_, DilemmaChoice>,
        role: Role,
    ) -> Result<DilemmaChoice, GameError> {
        state.current_ai_choice(role)
    }

    #[test]
    fn test_function_is_a_strategy() {
        let rules = dilemma::rules();
        let messages = vec![Message::user("instructions"), Message::assistant("project blue")];
        let state = GameState::new(&messages, 0, 1, &rules);
        assert_eq!(mirror.choose(&state, Role::Either).unwrap(), D);
    }
}
