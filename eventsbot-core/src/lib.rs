//! Core types for eventsbot.
//!
//! This crate holds everything the bot needs apart from process plumbing and
//! the concrete Discord client:
//! - `event` and `date_range` for the calendar/remote event model
//! - `ics` and `recurrence` for turning a feed into this week's events
//! - `history` for the announcement bookkeeping persisted between runs
//! - `platform` and `source`, the seams to Discord and to the calendar feed
//! - `sync` for the reconciliation engine and its cached view of the platform

pub mod announcement;
pub mod cache;
pub mod constants;
pub mod date_range;
pub mod duration;
pub mod error;
pub mod event;
pub mod history;
pub mod ics;
pub mod platform;
pub mod recurrence;
pub mod source;
pub mod sync;

pub use event::*;
