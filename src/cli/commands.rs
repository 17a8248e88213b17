use std::fmt::Write as _;
use std::io::{self, Read};
use std::str::FromStr;
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::Args;
use time::OffsetDateTime;

use crate::api::types::{AnalyticsReport, UserSummary};
use crate::api::ApiClient;
use crate::app::App;
use crate::config::AppConfig;
use crate::feed::{
    apply_filters, DateRange, DisplayNotification, FeedFilter, KnownStatus, SortOrder,
};

#[derive(Args, Debug, Clone)]
pub struct ListArgs {
    /// Filter by status (pending, read, resolved, dismissed)
    #[arg(long)]
    pub status: Option<String>,
    /// Date range (all, today, yesterday, last7days, last30days, thisweek, thismonth)
    #[arg(long)]
    pub range: Option<String>,
    /// Sort order (default, newest, oldest)
    #[arg(long)]
    pub sort: Option<String>,
    /// Search terms matched against reporter, message and location
    #[arg()]
    pub search: Vec<String>,
    /// Limit the number of results printed
    #[arg(long, default_value_t = 50)]
    pub limit: usize,
    /// Print the feed as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug, Clone)]
pub struct SetStatusArgs {
    /// Notification identifier
    pub id: u64,
    /// New status (pending, read, resolved, dismissed)
    pub status: String,
    /// Optional resolution message. If omitted and stdin is piped, reads it from stdin.
    #[arg(long)]
    pub message: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct DeleteArgs {
    /// Notification identifier
    pub id: u64,
}

#[derive(Args, Debug, Clone)]
pub struct UsersArgs {
    /// Filter users by name or email
    #[arg()]
    pub search: Vec<String>,
}

#[derive(Args, Debug, Clone)]
pub struct AnalyticsArgs {
    /// Print the report as JSON instead of text
    #[arg(long)]
    pub json: bool,
}

pub fn run_tui(app: &mut App) -> Result<()> {
    app.run()
}

pub fn list_notifications(config: &Arc<AppConfig>, api: &ApiClient, args: ListArgs) -> Result<()> {
    let filter = build_filter(config, &args)?;
    let now = OffsetDateTime::now_utc();

    let raw = api.fetch_notifications().context("fetching notifications")?;
    let normalized: Vec<DisplayNotification> = raw
        .iter()
        .map(|r| DisplayNotification::from_raw(r, now))
        .collect();
    let mut shown = apply_filters(&normalized, &filter, now);
    shown.truncate(args.limit);

    if args.json {
        let json = serde_json::to_string_pretty(&shown).context("serialising feed")?;
        println!("{json}");
    } else {
        print!("{}", format_notifications(&shown));
    }
    Ok(())
}

pub fn set_status(api: &ApiClient, args: SetStatusArgs) -> Result<()> {
    let status = KnownStatus::from_name(&args.status).with_context(|| {
        format!(
            "unknown status '{}' (expected pending, read, resolved or dismissed)",
            args.status
        )
    })?;
    let message = match args.message {
        Some(message) => Some(message),
        None if status == KnownStatus::Resolved => read_stdin()?
            .map(|body| body.trim().to_string())
            .filter(|body| !body.is_empty()),
        None => None,
    };

    api.update_status(args.id, &status.to_string(), message)
        .with_context(|| format!("updating notification {}", args.id))?;
    println!("Notification #{} marked {status}", args.id);
    Ok(())
}

pub fn delete_notification(api: &ApiClient, args: DeleteArgs) -> Result<()> {
    api.delete_notification(args.id)
        .with_context(|| format!("deleting notification {}", args.id))?;
    println!("Deleted notification #{}", args.id);
    Ok(())
}

pub fn list_users(api: &ApiClient, args: UsersArgs) -> Result<()> {
    let users = api.fetch_users().context("fetching users")?;
    let mut summaries: Vec<UserSummary> = users.iter().map(UserSummary::from_api).collect();

    let needle = args.search.join(" ").trim().to_lowercase();
    if !needle.is_empty() {
        summaries.retain(|user| {
            user.name.to_lowercase().contains(&needle)
                || user.email.to_lowercase().contains(&needle)
        });
    }

    print!("{}", format_users(&summaries));
    Ok(())
}

pub fn show_analytics(api: &ApiClient, args: AnalyticsArgs) -> Result<()> {
    let report = api.fetch_analytics().context("fetching analytics")?;
    if args.json {
        // the report round-trips through the same shape the backend sent
        let raw = serde_json::json!({
            "totalNotifications": report.total_notifications,
            "statusCounts": report.status_counts,
            "typeCounts": report.type_counts,
            "userCounts": report.user_counts,
            "resolutionStats": {
                "resolved": report.resolution_stats.resolved,
                "unresolved": report.resolution_stats.unresolved,
            },
        });
        println!("{}", serde_json::to_string_pretty(&raw)?);
    } else {
        print!("{}", format_analytics(&report));
    }
    Ok(())
}

fn build_filter(config: &Arc<AppConfig>, args: &ListArgs) -> Result<FeedFilter> {
    let status = match &args.status {
        Some(name) => {
            let lowered = name.to_lowercase();
            if KnownStatus::from_name(&lowered).is_none() {
                bail!("unknown status '{name}' (expected pending, read, resolved or dismissed)");
            }
            Some(lowered)
        }
        None => config.feed.status.clone(),
    };
    let range = match &args.range {
        Some(raw) => DateRange::from_str(&raw.to_lowercase())
            .map_err(|_| anyhow::anyhow!("unknown date range '{raw}'"))?,
        None => config.feed.range,
    };
    let sort = match &args.sort {
        Some(raw) => SortOrder::from_str(&raw.to_lowercase())
            .map_err(|_| anyhow::anyhow!("unknown sort order '{raw}'"))?,
        None => config.feed.sort,
    };
    Ok(FeedFilter {
        status,
        range,
        sort,
        search: args.search.join(" "),
    })
}

fn format_notifications(notifications: &[DisplayNotification]) -> String {
    if notifications.is_empty() {
        return "No notifications match.\n".to_string();
    }
    let mut out = String::new();
    for notification in notifications {
        let _ = writeln!(
            &mut out,
            "#{}  [{}] {} from {}",
            notification.id,
            notification.urgency.label().to_uppercase(),
            notification.kind,
            notification.user
        );
        let _ = writeln!(
            &mut out,
            "    {} • {} • {}",
            notification.status,
            notification.timestamp,
            notification.location.display()
        );
        let _ = writeln!(&mut out, "    {}", notification.message);
        if let Some(resolution) = &notification.resolution_message {
            let _ = writeln!(&mut out, "    resolution: {resolution}");
        }
        out.push('\n');
    }
    out
}

fn format_users(users: &[UserSummary]) -> String {
    if users.is_empty() {
        return "No users match.\n".to_string();
    }
    let mut out = String::new();
    for user in users {
        let _ = writeln!(
            &mut out,
            "#{}  {}  <{}>  [{}]",
            user.id,
            user.name,
            user.email,
            user.status.label()
        );
        let _ = writeln!(
            &mut out,
            "    role {}  •  joined {}  •  blood {}  •  aid {}",
            user.role, user.join_date, user.blood_type, user.medical_aid
        );
        out.push('\n');
    }
    out
}

fn format_analytics(report: &AnalyticsReport) -> String {
    let mut out = String::new();
    let _ = writeln!(
        &mut out,
        "Total notifications: {}",
        report.total_notifications
    );
    let resolved = report.resolution_stats.resolved;
    let total = resolved + report.resolution_stats.unresolved;
    let _ = writeln!(&mut out, "Resolved: {resolved}/{total}");
    for (title, counts) in [
        ("By status", &report.status_counts),
        ("By type", &report.type_counts),
        ("Top reporters", &report.user_counts),
    ] {
        if counts.is_empty() {
            continue;
        }
        let _ = writeln!(&mut out, "\n{title}:");
        for (name, count) in counts {
            let _ = writeln!(&mut out, "  {name:<24} {count}");
        }
    }
    out
}

fn read_stdin() -> Result<Option<String>> {
    if atty::is(atty::Stream::Stdin) {
        return Ok(None);
    }
    let mut buf = String::new();
    io::stdin().read_to_string(&mut buf)?;
    Ok(Some(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::ResolutionStats;
    use crate::feed::{FeedLocation, Urgency};
    use indexmap::IndexMap;

    fn sample_notification(id: u64) -> DisplayNotification {
        DisplayNotification {
            id,
            user: "Thandi Nkosi".into(),
            kind: "Fire".into(),
            message: "Fire reported at residence".into(),
            location: FeedLocation {
                city: "Johannesburg".into(),
                country: "South Africa".into(),
                latitude: -26.2041,
                longitude: 28.0473,
            },
            urgency: Urgency::High,
            status: "pending".into(),
            timestamp: "5m ago".into(),
            resolution_message: None,
            detail: None,
        }
    }

    #[test]
    fn build_filter_accepts_known_values_and_rejects_garbage() {
        let config = Arc::new(AppConfig::default());
        let args = ListArgs {
            status: Some("Pending".into()),
            range: Some("last7days".into()),
            sort: Some("newest".into()),
            search: vec!["fire".into()],
            limit: 50,
            json: false,
        };
        let filter = build_filter(&config, &args).expect("valid filter");
        assert_eq!(filter.status.as_deref(), Some("pending"));
        assert_eq!(filter.range, DateRange::Last7Days);
        assert_eq!(filter.sort, SortOrder::Newest);
        assert_eq!(filter.search, "fire");

        let bad = ListArgs {
            status: Some("escalated".into()),
            range: None,
            sort: None,
            search: Vec::new(),
            limit: 50,
            json: false,
        };
        assert!(build_filter(&config, &bad).is_err());

        let bad_range = ListArgs {
            status: None,
            range: Some("fortnight".into()),
            sort: None,
            search: Vec::new(),
            limit: 50,
            json: false,
        };
        assert!(build_filter(&config, &bad_range).is_err());
    }

    #[test]
    fn build_filter_falls_back_to_config_defaults() {
        let mut config = AppConfig::default();
        config.feed.range = DateRange::Today;
        config.feed.sort = SortOrder::Oldest;
        let config = Arc::new(config);
        let args = ListArgs {
            status: None,
            range: None,
            sort: None,
            search: Vec::new(),
            limit: 50,
            json: false,
        };
        let filter = build_filter(&config, &args).expect("valid filter");
        assert_eq!(filter.range, DateRange::Today);
        assert_eq!(filter.sort, SortOrder::Oldest);
    }

    #[test]
    fn notification_formatting_includes_urgency_and_location() {
        let out = format_notifications(&[sample_notification(41)]);
        assert!(out.contains("#41  [HIGH] Fire from Thandi Nkosi"));
        assert!(out.contains("pending • 5m ago • Johannesburg, South Africa"));
        assert!(out.contains("Fire reported at residence"));
    }

    #[test]
    fn empty_feed_prints_a_friendly_message() {
        assert_eq!(format_notifications(&[]), "No notifications match.\n");
    }

    #[test]
    fn analytics_formatting_lists_histograms_in_order() {
        let mut status_counts = IndexMap::new();
        status_counts.insert("pending".to_string(), 4u64);
        status_counts.insert("resolved".to_string(), 2u64);
        let report = AnalyticsReport {
            total_notifications: 6,
            status_counts,
            type_counts: IndexMap::new(),
            user_counts: IndexMap::new(),
            resolution_stats: ResolutionStats {
                resolved: 2,
                unresolved: 4,
            },
        };
        let out = format_analytics(&report);
        assert!(out.contains("Total notifications: 6"));
        assert!(out.contains("Resolved: 2/6"));
        let pending_at = out.find("pending").expect("pending listed");
        let resolved_at = out.rfind("resolved").expect("resolved listed");
        assert!(pending_at < resolved_at);
    }
}
