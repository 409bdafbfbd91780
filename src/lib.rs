pub mod codec;
pub mod config;
pub mod demo_feed;
pub mod multiplier;
pub mod paper;
pub mod parlay;
pub mod prediction;
pub mod score_grammar;
pub mod session_store;
pub mod slip;
pub mod state;
pub mod state_machine;
pub mod submission;
