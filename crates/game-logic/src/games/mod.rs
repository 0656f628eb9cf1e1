//! Concrete game families

pub mod dictator;
pub mod dilemma;
pub mod principal_agent;
pub mod ultimatum;
