pub mod candidates;
pub mod config;
pub mod students;
pub mod votes;
