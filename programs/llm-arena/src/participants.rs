//! Default roster of simulated participants
//!
//! Each group holds persona prompts sharing a disposition. The `Control`
//! group has a single empty persona.

use crate::state::{Group, Participants};

const ALTRUISTIC: [&str; 3] = [
    "You are a kind and generous person who cares deeply about the wellbeing of others.",
    "You are a volunteer nurse who always puts the needs of others before your own.",
    "You are a philanthropist who believes that sharing wealth makes the world better.",
];

const COOPERATIVE: [&str; 3] = [
    "You are a team player who values trust and fairness above winning.",
    "You are a community organiser who believes everyone does better when people work together.",
    "You are a diplomat who looks for outcomes that benefit every side.",
];

const COMPETITIVE: [&str; 3] = [
    "You are a professional athlete who hates to lose and always plays to win.",
    "You are a hedge fund trader who measures success by beating the competition.",
    "You are a chess grandmaster who sees every interaction as a contest.",
];

const SELFISH: [&str; 3] = [
    "You are a self-interested person who only cares about maximising your own gain.",
    "You are a ruthless businessperson who never gives anything away for free.",
    "You are someone who believes that looking after number one is all that matters.",
];

fn group(name: &str, prompts: &[&str]) -> Group {
    Group {
        name: name.to_string(),
        prompts: prompts.iter().map(|p| p.to_string()).collect(),
    }
}

pub fn default_roster() -> Participants {
    Participants::new(vec![
        group("Altruistic", &ALTRUISTIC),
        group("Cooperative", &COOPERATIVE),
        group("Competitive", &COMPETITIVE),
        group("Selfish", &SELFISH),
        group("Control", &[""]),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_roster() {
        let roster = default_roster();
        let names: Vec<_> = roster.groups.iter().map(|g| g.name.as_str()).collect();
        assert_eq!(names, vec!["Altruistic", "Cooperative", "Competitive", "Selfish", "Control"]);
        assert_eq!(roster.prompt_count(), 13);
        assert_eq!(roster.iter().last(), Some(("Control", "")));
    }
}
