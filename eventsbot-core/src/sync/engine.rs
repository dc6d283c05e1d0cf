//! The reconciliation run.
//!
//! A run reads this week's calendar events, creates the ones the platform
//! does not have yet, announces them, then deletes the announcements of
//! events that were removed from the platform since. The history of posted
//! announcements is loaded at the start and rewritten whole at the end.

use tracing::{debug, error, info, warn};

use crate::announcement::Announcement;
use crate::constants::DEFAULT_EVENT_LOCATION;
use crate::date_range::DateRange;
use crate::error::EventsBotResult;
use crate::event::{CalendarEvent, RemoteEvent};
use crate::history::{HistoryRecord, HistoryStore};
use crate::platform::{DeleteOutcome, Platform};
use crate::source::CalendarSource;

use super::remote_view::RemoteView;
use super::report::{SyncIssue, SyncReport};

pub struct Reconciler<P, S, H> {
    view: RemoteView<P>,
    source: S,
    history: H,
    announcement: Option<Announcement>,
    default_location: String,
}

impl<P, S, H> Reconciler<P, S, H>
where
    P: Platform,
    S: CalendarSource,
    H: HistoryStore,
{
    pub fn new(platform: P, source: S, history: H) -> Self {
        Reconciler {
            view: RemoteView::new(platform),
            source,
            history,
            announcement: None,
            default_location: DEFAULT_EVENT_LOCATION.to_string(),
        }
    }

    /// Announce created events. `None` creates events silently.
    pub fn with_announcement(mut self, announcement: Option<Announcement>) -> Self {
        self.announcement = announcement;
        self
    }

    pub fn with_default_location(mut self, location: impl Into<String>) -> Self {
        self.default_location = location.into();
        self
    }

    pub fn history(&self) -> &H {
        &self.history
    }

    /// Reconcile the current week.
    pub async fn run(&mut self) -> EventsBotResult<SyncReport> {
        self.run_for(&DateRange::current_week()).await
    }

    /// Reconcile the events of `range`.
    ///
    /// Fails only when the calendar or the history cannot be read, before
    /// anything was changed. Everything else is recorded in the report.
    pub async fn run_for(&mut self, range: &DateRange) -> EventsBotResult<SyncReport> {
        let candidates = self.source.events_in(range).await?;
        self.history.load()?;

        info!(
            count = candidates.len(),
            from = %range.from,
            to = %range.to,
            "Loaded calendar events"
        );

        let mut report = SyncReport::default();

        // Without a trustworthy event list every announced event would look
        // deleted, so neither phase runs.
        if let Err(e) = self.view.events().await {
            error!(error = %e, "Unable to list scheduled events, skipping this run");
            report.issues.push(SyncIssue::ListEvents(e.to_string()));
            return Ok(report);
        }

        let added = if candidates.is_empty() {
            debug!("No calendar events this week");
            Vec::new()
        } else {
            self.create_and_announce(&candidates, &mut report).await
        };

        self.retract_stale(&mut report).await;

        for record in added {
            self.history.append(record);
        }

        if let Err(e) = self.history.save() {
            error!(error = %e, "Unable to save history");
            report.issues.push(SyncIssue::SaveHistory(e.to_string()));
        }

        info!(
            created = report.created,
            existing = report.existing,
            announced = report.announced,
            retracted = report.retracted,
            issues = report.issues.len(),
            "Run complete"
        );

        Ok(report)
    }

    /// Create the candidates missing from the platform, in calendar order.
    /// Returns the history records of the announcements posted.
    async fn create_and_announce(
        &mut self,
        candidates: &[CalendarEvent],
        report: &mut SyncReport,
    ) -> Vec<HistoryRecord> {
        let announcement = self.announcement.clone();
        let mut added = Vec::new();

        for candidate in candidates {
            let event = RemoteEvent::from_calendar_event(candidate, &self.default_location);

            let exists = match self.view.events().await {
                Ok(events) => events.contains(&event),
                Err(e) => {
                    error!(event = %event.name, error = %e, "Unable to list scheduled events");
                    report.issues.push(SyncIssue::CreateEvent {
                        name: event.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            if exists {
                debug!(event = %event, "Event already exists");
                report.existing += 1;
                continue;
            }

            let id = match self.view.platform().create_event(&event).await {
                Ok(id) => id,
                Err(e) => {
                    error!(event = %event, error = %e, "Unable to create event");
                    report.issues.push(SyncIssue::CreateEvent {
                        name: event.name.clone(),
                        reason: e.to_string(),
                    });
                    continue;
                }
            };

            info!(event = %event, id = %id, "Created event");
            self.view.record_created(event.with_id(id.clone()));
            report.created += 1;

            let Some(announcement) = &announcement else {
                continue;
            };

            match self.announce(announcement, &id).await {
                Ok(record) => {
                    debug!(event_id = %id, message_id = %record.message_id, "Announced event");
                    report.announced += 1;
                    added.push(record);
                }
                Err(e) => {
                    error!(event_id = %id, error = %e, "Unable to announce event");
                    report.issues.push(SyncIssue::Announce {
                        event_id: id,
                        reason: e.to_string(),
                    });
                }
            }
        }

        added
    }

    async fn announce(
        &mut self,
        announcement: &Announcement,
        event_id: &str,
    ) -> EventsBotResult<HistoryRecord> {
        let channel_id = self.view.resolve_channel_id(&announcement.channel).await?;

        let invite = if announcement.link {
            Some(self.view.platform().create_invite(&channel_id).await?)
        } else {
            None
        };

        let content = announcement.compose(invite.as_deref(), event_id);
        let posted = self
            .view
            .platform()
            .create_message(&channel_id, &content, announcement.mention_everyone)
            .await?;

        Ok(HistoryRecord {
            event_id: event_id.to_string(),
            message_id: posted.message_id,
            channel_id: posted.channel_id,
        })
    }

    /// Delete the announcements of events no longer on the platform.
    ///
    /// A record is dropped once its message is deleted or already gone; any
    /// other failure keeps it for the next run.
    async fn retract_stale(&mut self, report: &mut SyncReport) {
        let records = self.history.records().to_vec();
        let mut retracted = Vec::new();

        for record in records {
            match self.view.event_id_exists(&record.event_id).await {
                Ok(true) => continue,
                Ok(false) => {}
                Err(e) => {
                    warn!(error = %e, "Unable to list scheduled events, skipping retraction");
                    report.issues.push(SyncIssue::ListEvents(e.to_string()));
                    break;
                }
            }

            match self
                .view
                .platform()
                .delete_message(&record.channel_id, &record.message_id)
                .await
            {
                Ok(outcome) => {
                    if outcome == DeleteOutcome::NotFound {
                        debug!(message_id = %record.message_id, "Announcement already deleted");
                    } else {
                        info!(
                            event_id = %record.event_id,
                            message_id = %record.message_id,
                            "Deleted announcement of removed event"
                        );
                    }
                    retracted.push(record);
                }
                Err(e) => {
                    warn!(message_id = %record.message_id, error = %e, "Unable to delete announcement");
                    report.issues.push(SyncIssue::Retract {
                        message_id: record.message_id.clone(),
                        reason: e.to_string(),
                    });
                }
            }
        }

        report.retracted += retracted.len();
        self.history
            .remove_where(&mut |record| retracted.contains(record));
    }
}
