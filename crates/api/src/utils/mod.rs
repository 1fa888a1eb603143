//! Logging and health helpers shared by the binary and commands

pub mod health;
pub mod logging;
