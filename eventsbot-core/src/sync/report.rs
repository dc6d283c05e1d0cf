//! Outcome of a reconciliation run.

use std::fmt;

/// Something that went wrong for one item during a run. The run carries on
/// past these.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncIssue {
    /// The platform's event list could not be read; nothing was created or
    /// retracted.
    ListEvents(String),
    CreateEvent { name: String, reason: String },
    Announce { event_id: String, reason: String },
    Retract { message_id: String, reason: String },
    SaveHistory(String),
}

impl fmt::Display for SyncIssue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SyncIssue::ListEvents(reason) => write!(f, "Unable to list events: {}", reason),
            SyncIssue::CreateEvent { name, reason } => {
                write!(f, "Unable to create event '{}': {}", name, reason)
            }
            SyncIssue::Announce { event_id, reason } => {
                write!(f, "Unable to announce event {}: {}", event_id, reason)
            }
            SyncIssue::Retract { message_id, reason } => {
                write!(f, "Unable to delete message {}: {}", message_id, reason)
            }
            SyncIssue::SaveHistory(reason) => write!(f, "Unable to save history: {}", reason),
        }
    }
}

/// Counts of what a run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncReport {
    /// Events created on the platform
    pub created: usize,
    /// Candidates skipped because an equal event already existed
    pub existing: usize,
    /// Announcement messages posted
    pub announced: usize,
    /// Announcement messages removed for events gone from the platform
    pub retracted: usize,
    pub issues: Vec<SyncIssue>,
}

/// "1 new event added." / "2 new events added."
pub fn events_added(count: usize) -> String {
    let plural = if count > 1 { "s" } else { "" };
    format!("{count} new event{plural} added.")
}

impl SyncReport {
    pub fn summary(&self) -> String {
        if self.created > 0 {
            events_added(self.created)
        } else {
            "All upcoming events already exist.".to_string()
        }
    }

    pub fn has_issues(&self) -> bool {
        !self.issues.is_empty()
    }
}
