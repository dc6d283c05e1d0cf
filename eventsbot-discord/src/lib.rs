//! Discord REST client implementing the eventsbot [`Platform`] trait.
//!
//! [`Platform`]: eventsbot_core::platform::Platform

mod client;
mod error;
pub mod types;

pub use client::DiscordGuild;
pub use error::DiscordError;
