//! CLI command implementations

pub mod example;
pub mod export;
pub mod info;
pub mod leaderboard;
pub mod submit;
pub mod validate;
