//! ICS feed parsing using the icalendar crate's parser.

use chrono::{Duration, NaiveDate, NaiveDateTime};
use icalendar::DatePerhapsTime;
use icalendar::parser::{Component, Property, read_calendar, unfold};
use tracing::debug;

use crate::error::{EventsBotError, EventsBotResult};
use crate::ics::event::{EventStatus, EventTime, IcsEvent, Recurrence};

/// Parse every VEVENT of a feed, in feed order.
///
/// Components without a usable DTSTART are skipped.
pub fn parse_calendar(content: &str) -> EventsBotResult<Vec<IcsEvent>> {
    if !content.contains("BEGIN:VCALENDAR") {
        return Err(EventsBotError::IcsParse(
            "content is not an iCalendar feed".to_string(),
        ));
    }

    let unfolded = unfold(content);
    let calendar =
        read_calendar(&unfolded).map_err(|e| EventsBotError::IcsParse(e.to_string()))?;

    let mut vevents = Vec::new();
    collect_vevents(&calendar.components, &mut vevents);

    Ok(vevents.into_iter().filter_map(parse_vevent).collect())
}

fn collect_vevents<'a>(components: &'a [Component<'a>], out: &mut Vec<&'a Component<'a>>) {
    for component in components {
        if component.name == "VEVENT" {
            out.push(component);
        } else {
            collect_vevents(&component.components, out);
        }
    }
}

fn parse_vevent(component: &Component<'_>) -> Option<IcsEvent> {
    let vevent = VEvent(component);

    let uid = vevent.raw("UID").unwrap_or_default();
    let summary = vevent
        .text("SUMMARY")
        .unwrap_or_else(|| "(No title)".to_string());

    let Some(start) = vevent.time("DTSTART") else {
        debug!(uid = %uid, summary = %summary, "Skipping VEVENT without a valid DTSTART");
        return None;
    };

    let end = match vevent.time("DTEND") {
        Some(end) => end,
        None => start.shifted_by(
            vevent
                .raw("DURATION")
                .and_then(|value| parse_duration_value(&value))
                .unwrap_or_else(|| implicit_length(&start)),
        ),
    };

    let recurrence = vevent.raw("RRULE").map(|rrule| Recurrence {
        rrule,
        exdates: vevent.exdates(),
    });

    Some(IcsEvent {
        description: vevent.text("DESCRIPTION"),
        location: vevent.text("LOCATION"),
        status: vevent
            .raw("STATUS")
            .map(|s| EventStatus::from_ics(&s))
            .unwrap_or(EventStatus::Confirmed),
        recurrence_id: vevent.time("RECURRENCE-ID"),
        uid,
        summary,
        start,
        end,
        recurrence,
    })
}

/// Typed property access on a VEVENT component.
struct VEvent<'c, 'a>(&'c Component<'a>);

impl VEvent<'_, '_> {
    fn raw(&self, name: &str) -> Option<String> {
        self.0.find_prop(name).map(|p| p.val.to_string())
    }

    /// A TEXT property, unescaped.
    fn text(&self, name: &str) -> Option<String> {
        self.0.find_prop(name).map(|p| unescape_text(p.val.as_ref()))
    }

    fn time(&self, name: &str) -> Option<EventTime> {
        self.0
            .find_prop(name)
            .and_then(|p| DatePerhapsTime::try_from(p).ok())
            .map(EventTime::from)
    }

    /// Every EXDATE value; the property may repeat and hold comma-separated
    /// lists.
    fn exdates(&self) -> Vec<EventTime> {
        self.0
            .properties
            .iter()
            .filter(|p| p.name == "EXDATE")
            .flat_map(exdate_values)
            .collect()
    }
}

/// Length given to events with neither DTEND nor DURATION.
fn implicit_length(start: &EventTime) -> Duration {
    if start.is_date() {
        Duration::days(1)
    } else {
        Duration::zero()
    }
}

/// Parse a DURATION value (`PT1H30M`, `P1D`). Negative durations are ignored.
fn parse_duration_value(value: &str) -> Option<Duration> {
    if value.starts_with('-') {
        return None;
    }
    let parsed: std::time::Duration = iso8601::duration(value.trim_start_matches('+'))
        .ok()?
        .into();
    Duration::from_std(parsed).ok()
}

fn param<'p>(prop: &'p Property<'_>, key: &str) -> Option<&'p str> {
    prop.params
        .iter()
        .find(|p| p.key == key)
        .and_then(|p| p.val.as_ref())
        .map(|v| v.as_ref())
}

/// Values of one EXDATE property (`VALUE=DATE`, `TZID=`, UTC or floating).
/// Unparseable entries are dropped.
fn exdate_values(prop: &Property<'_>) -> Vec<EventTime> {
    let all_day = param(prop, "VALUE") == Some("DATE");
    let tzid = param(prop, "TZID");

    let parse = |value: &str| -> Option<EventTime> {
        if all_day {
            return NaiveDate::parse_from_str(value, "%Y%m%d").ok().map(EventTime::Date);
        }

        let (local, utc) = match value.strip_suffix('Z') {
            Some(local) => (local, true),
            None => (value, false),
        };
        let datetime = NaiveDateTime::parse_from_str(local, "%Y%m%dT%H%M%S").ok()?;

        Some(match tzid {
            _ if utc => EventTime::DateTimeUtc(datetime.and_utc()),
            Some(tzid) => EventTime::DateTimeZoned {
                datetime,
                tzid: tzid.to_string(),
            },
            None => EventTime::DateTimeFloating(datetime),
        })
    };

    prop.val
        .as_ref()
        .split(',')
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .filter_map(parse)
        .collect()
}

/// Undo RFC 5545 TEXT escaping (`\,` `\;` `\n` `\\`).
fn unescape_text(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    let mut chars = value.chars();

    while let Some(c) = chars.next() {
        if c != '\\' {
            out.push(c);
            continue;
        }
        match chars.next() {
            Some('n') | Some('N') => out.push('\n'),
            Some(other) => out.push(other),
            None => out.push('\\'),
        }
    }

    out
}
