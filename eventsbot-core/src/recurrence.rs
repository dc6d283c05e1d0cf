//! RRULE expansion for recurring events.
//!
//! Expands a master recurring event into individual instances within a date
//! range, respecting EXDATEs and instances overridden elsewhere in the feed.

use std::collections::HashSet;

use chrono::{DateTime, Duration, Utc};
use rrule::RRuleSet;

use crate::constants::MAX_RECURRENCE_INSTANCES;
use crate::date_range::DateRange;
use crate::error::{EventsBotError, EventsBotResult};
use crate::ics::{EventTime, IcsEvent, Recurrence};

/// Format an EventTime as an RRULE-parser line (`DTSTART`, `EXDATE`).
///
/// The rrule crate needs a datetime, so all-day dates become midnight UTC and
/// floating times are read as UTC.
fn rrule_line(name: &str, time: &EventTime) -> String {
    match time {
        EventTime::Date(d) => format!("{}:{}T000000Z", name, d.format("%Y%m%d")),
        EventTime::DateTimeUtc(dt) => format!("{}:{}", name, dt.format("%Y%m%dT%H%M%SZ")),
        EventTime::DateTimeFloating(dt) => format!("{}:{}Z", name, dt.format("%Y%m%dT%H%M%S")),
        EventTime::DateTimeZoned { datetime, tzid } => {
            format!("{};TZID={}:{}", name, tzid, datetime.format("%Y%m%dT%H%M%S"))
        }
    }
}

/// Build an iCalendar-format RRULE string for the rrule crate parser.
fn build_rrule_string(start: &EventTime, recurrence: &Recurrence) -> String {
    let mut lines = vec![rrule_line("DTSTART", start)];
    lines.push(format!("RRULE:{}", recurrence.rrule));
    lines.extend(
        recurrence
            .exdates
            .iter()
            .map(|exdate| rrule_line("EXDATE", exdate)),
    );
    lines.join("\n")
}

/// Expand a recurring master event into the instances overlapping `range`.
///
/// `overridden` holds the UTC timestamps of instances replaced by a
/// RECURRENCE-ID component; those are left out here since the override is
/// read as an event of its own. Returned instances carry `recurrence_id`
/// and UTC start/end times.
pub fn expand_recurring_event(
    master: &IcsEvent,
    range: &DateRange,
    overridden: &HashSet<i64>,
) -> EventsBotResult<Vec<IcsEvent>> {
    let Some(recurrence) = &master.recurrence else {
        return Ok(Vec::new());
    };

    let rrule_str = build_rrule_string(&master.start, recurrence);

    let rrule_set: RRuleSet = rrule_str.parse().map_err(|e| {
        EventsBotError::IcsParse(format!(
            "Failed to parse RRULE for event '{}': {}",
            master.uid, e
        ))
    })?;

    let duration = (master.end.to_utc() - master.start.to_utc()).max(Duration::zero());

    // An instance starting before the range can still overlap it.
    // Pad by one second on both sides: after/before are exclusive.
    let tz: rrule::Tz = Utc.into();
    let after = (range.from - duration - Duration::seconds(1)).with_timezone(&tz);
    let before = (range.to + Duration::seconds(1)).with_timezone(&tz);

    let result = rrule_set
        .after(after)
        .before(before)
        .all(MAX_RECURRENCE_INSTANCES);

    let instances = result
        .dates
        .iter()
        .map(|occurrence| occurrence.with_timezone(&Utc))
        .filter(|start| !overridden.contains(&start.timestamp()))
        .map(|start| instance_of(master, start, start + duration))
        .filter(|instance| range.overlaps(instance.start.to_utc(), instance.end.to_utc()))
        .collect();

    Ok(instances)
}

fn instance_of(master: &IcsEvent, start: DateTime<Utc>, end: DateTime<Utc>) -> IcsEvent {
    IcsEvent {
        uid: master.uid.clone(),
        summary: master.summary.clone(),
        description: master.description.clone(),
        location: master.location.clone(),
        start: EventTime::DateTimeUtc(start),
        end: EventTime::DateTimeUtc(end),
        status: master.status.clone(),
        recurrence: None,
        recurrence_id: Some(EventTime::DateTimeUtc(start)),
    }
}
