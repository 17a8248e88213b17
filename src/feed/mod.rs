use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};
use time::{Date, Duration, OffsetDateTime};

use crate::api::types::{EmergencyContactRecord, RawNotification};

pub mod timefmt;

pub use timefmt::{format_timestamp, parse_timestamp, parse_wire_timestamp};

const HIGH_URGENCY_KEYWORDS: &[&str] = &["fire", "medical", "accident", "crime", "animal"];
const MEDIUM_URGENCY_KEYWORDS: &[&str] = &["missing", "hazardous", "fall", "power"];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Urgency {
    High,
    Medium,
    Low,
}

impl Urgency {
    /// Sort rank for the default ordering; lower sorts first.
    pub fn rank(self) -> u8 {
        match self {
            Urgency::High => 1,
            Urgency::Medium => 2,
            Urgency::Low => 3,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Urgency::High => "high",
            Urgency::Medium => "medium",
            Urgency::Low => "low",
        }
    }
}

/// Keyword triage over the emergency-type name. High-severity keywords win
/// over medium ones when both appear; anything unrecognized is low.
pub fn classify_urgency(text: &str) -> Urgency {
    let lowered = text.to_lowercase();
    if HIGH_URGENCY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Urgency::High;
    }
    if MEDIUM_URGENCY_KEYWORDS.iter().any(|kw| lowered.contains(kw)) {
        return Urgency::Medium;
    }
    Urgency::Low
}

/// The four workflow statuses the backend models, with their wire ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum KnownStatus {
    Pending,
    Read,
    Resolved,
    Dismissed,
}

impl KnownStatus {
    pub fn id(self) -> u8 {
        match self {
            KnownStatus::Pending => 1,
            KnownStatus::Read => 2,
            KnownStatus::Resolved => 3,
            KnownStatus::Dismissed => 4,
        }
    }

    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_lowercase().as_str() {
            "pending" => Some(KnownStatus::Pending),
            "read" => Some(KnownStatus::Read),
            "resolved" => Some(KnownStatus::Resolved),
            "dismissed" => Some(KnownStatus::Dismissed),
            _ => None,
        }
    }
}

/// Rank used by the default sort; statuses outside the known set go last.
pub fn status_rank(status: &str) -> u8 {
    KnownStatus::from_name(status)
        .map(KnownStatus::id)
        .unwrap_or(99)
}

#[derive(Debug, Clone, Serialize)]
pub struct FeedLocation {
    pub city: String,
    pub country: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl FeedLocation {
    pub fn display(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

/// Medical details carried along for the detail view.
#[derive(Debug, Clone, Serialize)]
pub struct CallerDetail {
    pub full_name: String,
    pub allergies: Option<String>,
    pub blood_type: String,
    pub medical_aid: String,
    pub contacts: Vec<EmergencyContactRecord>,
}

/// A notification after normalization: status lower-cased, urgency
/// classified, timestamp rendered as a label, location defaulted.
#[derive(Debug, Clone, Serialize)]
pub struct DisplayNotification {
    pub id: u64,
    pub user: String,
    pub kind: String,
    pub message: String,
    pub location: FeedLocation,
    pub urgency: Urgency,
    pub status: String,
    pub timestamp: String,
    pub resolution_message: Option<String>,
    #[serde(skip)]
    pub detail: Option<CallerDetail>,
}

impl DisplayNotification {
    pub fn from_raw(raw: &RawNotification, now: OffsetDateTime) -> Self {
        let kind = raw.emergency_type.name.clone();
        let message = if raw.emergency_type.description.is_empty() {
            kind.clone()
        } else {
            raw.emergency_type.description.clone()
        };
        let urgency = classify_urgency(&kind);
        let timestamp = parse_wire_timestamp(&raw.created_at)
            .map(|ts| format_timestamp(ts, now))
            .unwrap_or_else(|| raw.created_at.clone());

        let location = raw
            .location
            .as_ref()
            .map(|loc| FeedLocation {
                city: loc.city.clone().unwrap_or_else(|| "Unknown City".into()),
                country: loc
                    .country
                    .clone()
                    .unwrap_or_else(|| "Unknown Country".into()),
                latitude: loc.latitude.unwrap_or(0.0),
                longitude: loc.longitude.unwrap_or(0.0),
            })
            .unwrap_or_else(|| FeedLocation {
                city: "Unknown City".into(),
                country: "Unknown Country".into(),
                latitude: 0.0,
                longitude: 0.0,
            });

        let detail = Some(CallerDetail {
            full_name: raw.user.full_name.clone(),
            allergies: raw.user.allergies.clone(),
            blood_type: raw
                .user
                .blood_type
                .as_ref()
                .map(|b| b.name.clone())
                .unwrap_or_else(|| "Unknown".to_string()),
            medical_aid: raw
                .user
                .medical_aid
                .as_ref()
                .map(|m| m.name.clone())
                .unwrap_or_else(|| "None".to_string()),
            contacts: raw.user.emergency_contacts.clone(),
        });

        Self {
            id: raw.notification_id,
            user: raw.user.full_name.clone(),
            kind,
            message,
            location,
            urgency,
            status: raw.status.name.to_lowercase(),
            timestamp,
            resolution_message: raw.resolution_message.clone(),
            detail,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum DateRange {
    All,
    Today,
    Yesterday,
    Last7Days,
    Last30Days,
    ThisWeek,
    ThisMonth,
}

impl DateRange {
    pub fn label(self) -> &'static str {
        match self {
            DateRange::All => "all",
            DateRange::Today => "today",
            DateRange::Yesterday => "yesterday",
            DateRange::Last7Days => "last 7 days",
            DateRange::Last30Days => "last 30 days",
            DateRange::ThisWeek => "this week",
            DateRange::ThisMonth => "this month",
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            DateRange::All => DateRange::Today,
            DateRange::Today => DateRange::Yesterday,
            DateRange::Yesterday => DateRange::Last7Days,
            DateRange::Last7Days => DateRange::Last30Days,
            DateRange::Last30Days => DateRange::ThisWeek,
            DateRange::ThisWeek => DateRange::ThisMonth,
            DateRange::ThisMonth => DateRange::All,
        }
    }

    /// Inclusive calendar-day window relative to `now`, `None` for `All`.
    fn window(self, now: OffsetDateTime) -> Option<(Date, Date)> {
        let today = now.date();
        match self {
            DateRange::All => None,
            DateRange::Today => Some((today, today)),
            DateRange::Yesterday => {
                let yesterday = today - Duration::days(1);
                Some((yesterday, yesterday))
            }
            DateRange::Last7Days => Some((today - Duration::days(6), today)),
            DateRange::Last30Days => Some((today - Duration::days(29), today)),
            DateRange::ThisWeek => {
                let offset = i64::from(today.weekday().number_days_from_sunday());
                Some((today - Duration::days(offset), today))
            }
            DateRange::ThisMonth => Some((today.replace_day(1).unwrap_or(today), today)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, EnumIter)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum SortOrder {
    Default,
    Newest,
    Oldest,
}

impl SortOrder {
    pub fn label(self) -> &'static str {
        match self {
            SortOrder::Default => "priority",
            SortOrder::Newest => "newest",
            SortOrder::Oldest => "oldest",
        }
    }

    pub fn cycled(self) -> Self {
        match self {
            SortOrder::Default => SortOrder::Newest,
            SortOrder::Newest => SortOrder::Oldest,
            SortOrder::Oldest => SortOrder::Default,
        }
    }
}

/// The active view over the normalized feed. A plain value object; the
/// projection itself lives in [`apply_filters`].
#[derive(Debug, Clone)]
pub struct FeedFilter {
    /// Exact lower-cased status name, `None` for all statuses.
    pub status: Option<String>,
    pub range: DateRange,
    pub sort: SortOrder,
    pub search: String,
}

impl Default for FeedFilter {
    fn default() -> Self {
        Self {
            status: None,
            range: DateRange::All,
            sort: SortOrder::Default,
            search: String::new(),
        }
    }
}

/// Pure projection: filter by status, date window and search terms, then
/// sort. Timestamp labels are re-parsed here; records whose label cannot be
/// parsed are dropped whenever a date window is active and kept under `All`.
pub fn apply_filters(
    notifications: &[DisplayNotification],
    filter: &FeedFilter,
    now: OffsetDateTime,
) -> Vec<DisplayNotification> {
    let window = filter.range.window(now);
    let needle = filter.search.trim().to_lowercase();

    let mut keyed: Vec<(DisplayNotification, Option<OffsetDateTime>)> = notifications
        .iter()
        .filter(|n| match &filter.status {
            Some(status) => n.status == *status,
            None => true,
        })
        .filter(|n| {
            if needle.is_empty() {
                return true;
            }
            n.user.to_lowercase().contains(&needle)
                || n.message.to_lowercase().contains(&needle)
                || n.location.display().to_lowercase().contains(&needle)
        })
        .map(|n| (n.clone(), parse_timestamp(&n.timestamp, now)))
        .filter(|(_, parsed)| match (window, parsed) {
            (None, _) => true,
            (Some((from, to)), Some(ts)) => {
                let day = ts.date();
                day >= from && day <= to
            }
            (Some(_), None) => false,
        })
        .collect();

    match filter.sort {
        SortOrder::Newest => {
            keyed.sort_by(|a, b| sort_instant(b.1).cmp(&sort_instant(a.1)));
        }
        SortOrder::Oldest => {
            keyed.sort_by(|a, b| sort_instant(a.1).cmp(&sort_instant(b.1)));
        }
        SortOrder::Default => {
            keyed.sort_by(|a, b| {
                (a.0.urgency.rank(), status_rank(&a.0.status))
                    .cmp(&(b.0.urgency.rank(), status_rank(&b.0.status)))
                    .then_with(|| sort_instant(b.1).cmp(&sort_instant(a.1)))
            });
        }
    }

    keyed.into_iter().map(|(n, _)| n).collect()
}

// Unparseable timestamps sort as oldest.
fn sort_instant(parsed: Option<OffsetDateTime>) -> i128 {
    parsed
        .map(|ts| ts.unix_timestamp_nanos())
        .unwrap_or(i128::MIN)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::RawNotification;
    use serde_json::json;
    use time::macros::datetime;

    const NOW: OffsetDateTime = datetime!(2024-03-15 14:30:00 UTC);

    fn raw(id: u64, status: &str, kind: &str, description: &str, created_at: &str) -> RawNotification {
        serde_json::from_value(json!({
            "notification_id": id,
            "fromUserId": 1,
            "emergencyTypeId": 1,
            "statusId": 1,
            "createdAt": created_at,
            "updatedAt": created_at,
            "user": {"id": 1, "fullName": "Thandi Nkosi"},
            "status": {"id": 1, "name": status},
            "emergencyType": {"id": 1, "name": kind, "description": description}
        }))
        .expect("valid fixture")
    }

    fn display(
        id: u64,
        status: &str,
        urgency: Urgency,
        timestamp: &str,
    ) -> DisplayNotification {
        DisplayNotification {
            id,
            user: "Thandi Nkosi".into(),
            kind: "General".into(),
            message: "General inquiry".into(),
            location: FeedLocation {
                city: "Unknown City".into(),
                country: "Unknown Country".into(),
                latitude: 0.0,
                longitude: 0.0,
            },
            urgency,
            status: status.into(),
            timestamp: timestamp.into(),
            resolution_message: None,
            detail: None,
        }
    }

    #[test]
    fn high_keywords_beat_medium_keywords() {
        assert_eq!(classify_urgency("Fire near a power station"), Urgency::High);
        assert_eq!(classify_urgency("MEDICAL emergency"), Urgency::High);
        assert_eq!(classify_urgency("animal attack"), Urgency::High);
    }

    #[test]
    fn power_outage_classifies_as_medium() {
        assert_eq!(classify_urgency("Power outage reported"), Urgency::Medium);
        assert_eq!(classify_urgency("Hazardous spill on N1"), Urgency::Medium);
    }

    #[test]
    fn unmatched_text_classifies_as_low() {
        assert_eq!(classify_urgency("General inquiry"), Urgency::Low);
        assert_eq!(classify_urgency(""), Urgency::Low);
    }

    #[test]
    fn normalizer_lowercases_status_and_defaults_location() {
        let raw = raw(5, "Pending", "Fire", "Fire reported", "2024-03-15T14:00:00Z");
        let shown = DisplayNotification::from_raw(&raw, NOW);
        assert_eq!(shown.status, "pending");
        assert_eq!(shown.urgency, Urgency::High);
        assert_eq!(shown.timestamp, "30m ago");
        assert_eq!(shown.location.city, "Unknown City");
        assert_eq!(shown.location.country, "Unknown Country");
        assert_eq!(shown.location.latitude, 0.0);
    }

    #[test]
    fn urgency_is_classified_from_the_type_name_only() {
        let raw = raw(
            7,
            "Pending",
            "Noise",
            "Loud animal sounds nearby",
            "2024-03-15T14:00:00Z",
        );
        let shown = DisplayNotification::from_raw(&raw, NOW);
        assert_eq!(shown.urgency, Urgency::Low);
    }

    #[test]
    fn normalizer_keeps_medical_detail_with_placeholders() {
        let raw = raw(5, "Pending", "Medical", "Medical assistance", "2024-03-15T14:00:00Z");
        let shown = DisplayNotification::from_raw(&raw, NOW);
        let detail = shown.detail.expect("detail present");
        assert_eq!(detail.blood_type, "Unknown");
        assert_eq!(detail.medical_aid, "None");
        assert!(detail.contacts.is_empty());
    }

    #[test]
    fn status_filter_is_exact_and_preserves_input_order() {
        // equal sort keys throughout, so any reordering would come from the filter
        let feed = vec![
            display(1, "pending", Urgency::Low, "5m ago"),
            display(2, "resolved", Urgency::Low, "5m ago"),
            display(3, "pending", Urgency::Low, "5m ago"),
            display(4, "in-progress", Urgency::Low, "5m ago"),
            display(5, "pending", Urgency::Low, "5m ago"),
        ];
        let filter = FeedFilter {
            status: Some("pending".into()),
            ..FeedFilter::default()
        };
        let shown = apply_filters(&feed, &filter, NOW);
        let ids: Vec<u64> = shown.iter().map(|n| n.id).collect();
        assert_eq!(ids, [1, 3, 5]);

        // the unrecognized status is kept when no status filter is set
        let all = apply_filters(&feed, &FeedFilter::default(), NOW);
        assert_eq!(all.len(), 5);
        assert_eq!(all.last().map(|n| n.id), Some(4));
    }

    #[test]
    fn default_sort_puts_high_pending_before_low_resolved() {
        let feed = vec![
            display(1, "resolved", Urgency::Low, "2h ago"),
            display(2, "pending", Urgency::High, "5h ago"),
            display(3, "pending", Urgency::Low, "1m ago"),
            display(4, "resolved", Urgency::High, "1h ago"),
        ];
        let shown = apply_filters(&feed, &FeedFilter::default(), NOW);
        let ids: Vec<u64> = shown.iter().map(|n| n.id).collect();
        // urgency first, status second, recency last
        assert_eq!(ids, [2, 4, 3, 1]);
    }

    #[test]
    fn default_sort_breaks_ties_by_recency() {
        let feed = vec![
            display(1, "pending", Urgency::High, "3h ago"),
            display(2, "pending", Urgency::High, "5m ago"),
        ];
        let shown = apply_filters(&feed, &FeedFilter::default(), NOW);
        assert_eq!(shown[0].id, 2);
    }

    #[test]
    fn newest_and_oldest_sort_purely_by_time() {
        let feed = vec![
            display(1, "resolved", Urgency::Low, "1m ago"),
            display(2, "pending", Urgency::High, "2h ago"),
        ];
        let newest = apply_filters(
            &feed,
            &FeedFilter {
                sort: SortOrder::Newest,
                ..FeedFilter::default()
            },
            NOW,
        );
        assert_eq!(newest[0].id, 1);
        let oldest = apply_filters(
            &feed,
            &FeedFilter {
                sort: SortOrder::Oldest,
                ..FeedFilter::default()
            },
            NOW,
        );
        assert_eq!(oldest[0].id, 2);
    }

    #[test]
    fn unparseable_timestamps_drop_under_a_window_but_stay_under_all() {
        let feed = vec![
            display(1, "pending", Urgency::Low, "whenever"),
            display(2, "pending", Urgency::Low, "5m ago"),
        ];
        let windowed = apply_filters(
            &feed,
            &FeedFilter {
                range: DateRange::Today,
                ..FeedFilter::default()
            },
            NOW,
        );
        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].id, 2);

        let all = apply_filters(&feed, &FeedFilter::default(), NOW);
        assert_eq!(all.len(), 2);
    }

    #[test]
    fn yesterday_window_excludes_today() {
        let feed = vec![
            display(1, "pending", Urgency::Low, "2024-03-14 20:00"),
            display(2, "pending", Urgency::Low, "5m ago"),
        ];
        let shown = apply_filters(
            &feed,
            &FeedFilter {
                range: DateRange::Yesterday,
                ..FeedFilter::default()
            },
            NOW,
        );
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, 1);
    }

    #[test]
    fn this_week_starts_from_the_most_recent_sunday() {
        // 2024-03-15 is a Friday; the week began Sunday 2024-03-10.
        let feed = vec![
            display(1, "pending", Urgency::Low, "2024-03-10 08:00"),
            display(2, "pending", Urgency::Low, "2024-03-09 23:00"),
        ];
        let shown = apply_filters(
            &feed,
            &FeedFilter {
                range: DateRange::ThisWeek,
                ..FeedFilter::default()
            },
            NOW,
        );
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, 1);
    }

    #[test]
    fn last7days_is_an_inclusive_trailing_window() {
        let feed = vec![
            display(1, "pending", Urgency::Low, "2024-03-09 10:00"),
            display(2, "pending", Urgency::Low, "2024-03-08 10:00"),
        ];
        let shown = apply_filters(
            &feed,
            &FeedFilter {
                range: DateRange::Last7Days,
                ..FeedFilter::default()
            },
            NOW,
        );
        assert_eq!(shown.len(), 1);
        assert_eq!(shown[0].id, 1);
    }

    #[test]
    fn search_matches_user_message_and_location() {
        let mut with_city = display(1, "pending", Urgency::Low, "5m ago");
        with_city.location.city = "Johannesburg".into();
        let feed = vec![with_city, display(2, "pending", Urgency::Low, "5m ago")];

        let by_city = apply_filters(
            &feed,
            &FeedFilter {
                search: "johannes".into(),
                ..FeedFilter::default()
            },
            NOW,
        );
        assert_eq!(by_city.len(), 1);

        let by_user = apply_filters(
            &feed,
            &FeedFilter {
                search: "THANDI".into(),
                ..FeedFilter::default()
            },
            NOW,
        );
        assert_eq!(by_user.len(), 2);

        let by_nothing = apply_filters(
            &feed,
            &FeedFilter {
                search: "zzz".into(),
                ..FeedFilter::default()
            },
            NOW,
        );
        assert!(by_nothing.is_empty());
    }

    #[test]
    fn status_rank_orders_workflow_and_rejects_unknown() {
        assert!(status_rank("pending") < status_rank("read"));
        assert!(status_rank("read") < status_rank("resolved"));
        assert!(status_rank("resolved") < status_rank("dismissed"));
        assert_eq!(status_rank("escalated"), 99);
    }
}
