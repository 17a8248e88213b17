use once_cell::sync::Lazy;
use time::format_description::{self, well_known::Rfc3339, FormatItem};
use time::{Date, Duration, OffsetDateTime, PrimitiveDateTime, Time};

static ABSOLUTE: Lazy<Vec<FormatItem<'static>>> = Lazy::new(|| {
    format_description::parse("[year]-[month]-[day] [hour]:[minute]")
        .expect("valid datetime format description")
});

static DATE_ONLY: Lazy<Vec<FormatItem<'static>>> = Lazy::new(|| {
    format_description::parse("[year]-[month]-[day]").expect("valid date format description")
});

/// Renders a feed timestamp relative to `now`. Anything younger than a day
/// gets a relative label; older entries fall back to an absolute UTC form
/// that [`parse_timestamp`] can read back.
pub fn format_timestamp(ts: OffsetDateTime, now: OffsetDateTime) -> String {
    let elapsed = now - ts;
    if elapsed < Duration::minutes(1) {
        return "Just now".to_string();
    }
    if elapsed < Duration::hours(1) {
        let minutes = elapsed.whole_minutes();
        return format!("{minutes}m ago");
    }
    if elapsed < Duration::days(1) {
        let hours = elapsed.whole_hours();
        return format!("{hours}h ago");
    }
    ts.format(&ABSOLUTE)
        .unwrap_or_else(|_| ts.unix_timestamp().to_string())
}

/// Best-effort inverse of [`format_timestamp`]. Relative labels recover the
/// instant only to the precision of the label ("5m ago" has no seconds), so
/// a round trip through format and parse is lossy on purpose.
pub fn parse_timestamp(label: &str, now: OffsetDateTime) -> Option<OffsetDateTime> {
    let trimmed = label.trim();
    if trimmed == "Just now" {
        return Some(now);
    }
    if let Some(minutes) = trimmed
        .strip_suffix("m ago")
        .and_then(|n| n.parse::<i64>().ok())
    {
        return now.checked_sub(Duration::minutes(minutes));
    }
    if let Some(hours) = trimmed
        .strip_suffix("h ago")
        .and_then(|n| n.parse::<i64>().ok())
    {
        return now.checked_sub(Duration::hours(hours));
    }
    if let Ok(ts) = OffsetDateTime::parse(trimmed, &Rfc3339) {
        return Some(ts);
    }
    parse_absolute(trimmed)
}

/// Parses a timestamp as the backend sends it (RFC 3339).
pub fn parse_wire_timestamp(raw: &str) -> Option<OffsetDateTime> {
    OffsetDateTime::parse(raw.trim(), &Rfc3339).ok()
}

/// Calendar-date rendering for member-since style fields.
pub fn format_date(ts: OffsetDateTime) -> String {
    ts.format(&DATE_ONLY)
        .unwrap_or_else(|_| ts.date().to_string())
}

fn parse_absolute(input: &str) -> Option<OffsetDateTime> {
    let (date_part, time_part) = input.split_once(' ')?;
    let date = Date::parse(date_part, &DATE_ONLY).ok()?;
    let (hour, minute) = time_part.split_once(':')?;
    let time = Time::from_hms(hour.parse().ok()?, minute.parse().ok()?, 0).ok()?;
    Some(PrimitiveDateTime::new(date, time).assume_utc())
}
