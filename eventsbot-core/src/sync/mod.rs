//! Reconciliation between the calendar and the platform.

mod engine;
mod remote_view;
mod report;
#[cfg(test)]
mod testing;

pub use engine::Reconciler;
pub use remote_view::RemoteView;
pub use report::{SyncIssue, SyncReport, events_added};
