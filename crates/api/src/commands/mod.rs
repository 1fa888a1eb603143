//! Operational commands run by the service loop

mod health;

pub use health::*;
