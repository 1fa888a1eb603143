//! External service integrations

pub mod social;

pub use social::SocialHttpClient;
