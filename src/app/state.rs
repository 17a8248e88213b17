use strum::IntoEnumIterator;
use time::OffsetDateTime;

use crate::api::types::{AnalyticsReport, RawNotification, UserSummary};
use crate::config::themes::Theme;
use crate::config::{AppConfig, ThemeName};
use crate::feed::{apply_filters, DisplayNotification, FeedFilter, KnownStatus, SortOrder};
use crate::poller::PollerStatus;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tab {
    Notifications,
    Users,
    Analytics,
}

impl Tab {
    pub fn label(self) -> &'static str {
        match self {
            Tab::Notifications => "Notifications",
            Tab::Users => "Users",
            Tab::Analytics => "Analytics",
        }
    }

    pub fn index(self) -> usize {
        match self {
            Tab::Notifications => 0,
            Tab::Users => 1,
            Tab::Analytics => 2,
        }
    }

    pub fn next(self) -> Self {
        match self {
            Tab::Notifications => Tab::Users,
            Tab::Users => Tab::Analytics,
            Tab::Analytics => Tab::Notifications,
        }
    }
}

#[derive(Debug, Default)]
pub struct SearchState {
    pub active: bool,
}

/// Status picker with two phases: choosing a status, then (for resolved)
/// an optional free-text resolution message.
#[derive(Debug, Clone)]
pub struct StatusPickerOverlay {
    pub notification_id: u64,
    pub selected: usize,
    pub message: Option<String>,
}

impl StatusPickerOverlay {
    pub fn options(&self) -> Vec<KnownStatus> {
        KnownStatus::iter().collect()
    }

    pub fn chosen(&self) -> KnownStatus {
        let options = self.options();
        options[self.selected.min(options.len() - 1)]
    }

    pub fn is_entering_message(&self) -> bool {
        self.message.is_some()
    }
}

#[derive(Debug, Clone)]
pub struct DeleteNotificationOverlay {
    pub notification_id: u64,
    pub summary: String,
}

#[derive(Debug, Clone)]
pub struct DeleteUserOverlay {
    pub email: String,
    pub name: String,
}

#[derive(Debug, Clone)]
pub enum OverlayState {
    Detail(u64),
    UserDetail(u64),
    StatusPicker(StatusPickerOverlay),
    DeleteNotification(DeleteNotificationOverlay),
    DeleteUser(DeleteUserOverlay),
}

/// Single owner of mutable UI state. The visible list is a materialized
/// projection of the full set through the active filter, rebuilt after
/// every mutation so selection indexes stay meaningful.
pub struct AppState {
    all: Vec<DisplayNotification>,
    visible: Vec<DisplayNotification>,
    pub users: Vec<UserSummary>,
    pub analytics: Option<AnalyticsReport>,
    pub filter: FeedFilter,
    pub tab: Tab,
    pub selected: usize,
    pub selected_user: usize,
    search: SearchState,
    loading: bool,
    poll_status: PollerStatus,
    pub status_message: Option<String>,
    last_error: Option<String>,
    overlay: Option<OverlayState>,
    theme_name: ThemeName,
}

impl AppState {
    pub fn new(config: &AppConfig) -> Self {
        let filter = FeedFilter {
            status: config.feed.status.clone(),
            range: config.feed.range,
            sort: config.feed.sort,
            search: String::new(),
        };
        Self {
            all: Vec::new(),
            visible: Vec::new(),
            users: Vec::new(),
            analytics: None,
            filter,
            tab: Tab::Notifications,
            selected: 0,
            selected_user: 0,
            search: SearchState::default(),
            loading: false,
            poll_status: PollerStatus::Idle { last_success: None },
            status_message: None,
            last_error: None,
            overlay: None,
            theme_name: config.theme,
        }
    }

    pub fn visible(&self) -> &[DisplayNotification] {
        &self.visible
    }

    pub fn total(&self) -> usize {
        self.all.len()
    }

    pub fn is_empty(&self) -> bool {
        self.visible.is_empty()
    }

    pub fn selected_notification(&self) -> Option<&DisplayNotification> {
        self.visible.get(self.selected)
    }

    pub fn selected_user_summary(&self) -> Option<&UserSummary> {
        self.users.get(self.selected_user)
    }

    pub fn notification_by_id(&self, id: u64) -> Option<&DisplayNotification> {
        self.all.iter().find(|n| n.id == id)
    }

    pub fn user_by_id(&self, id: u64) -> Option<&UserSummary> {
        self.users.iter().find(|u| u.id == id)
    }

    /// Wholesale replacement from a poll. Selection follows the previously
    /// selected notification when it is still visible.
    pub fn replace_notifications(&mut self, raw: Vec<RawNotification>, now: OffsetDateTime) {
        let keep_id = self.selected_notification().map(|n| n.id);
        self.all = raw
            .iter()
            .map(|r| DisplayNotification::from_raw(r, now))
            .collect();
        self.reproject(now);
        if let Some(id) = keep_id {
            if let Some(idx) = self.visible.iter().position(|n| n.id == id) {
                self.selected = idx;
            }
        }
    }

    pub fn replace_users(&mut self, users: Vec<UserSummary>) {
        self.users = users;
        if self.selected_user >= self.users.len() {
            self.selected_user = self.users.len().saturating_sub(1);
        }
    }

    pub fn set_analytics(&mut self, report: AnalyticsReport) {
        self.analytics = Some(report);
    }

    fn reproject(&mut self, now: OffsetDateTime) {
        self.visible = apply_filters(&self.all, &self.filter, now);
        if self.selected >= self.visible.len() {
            self.selected = self.visible.len().saturating_sub(1);
        }
    }

    /// Optimistic edit after a successful status update. The next poll
    /// overwrites it with the backend's view.
    pub fn apply_status_update(
        &mut self,
        id: u64,
        status: KnownStatus,
        message: Option<String>,
        now: OffsetDateTime,
    ) {
        if let Some(entry) = self.all.iter_mut().find(|n| n.id == id) {
            entry.status = status.to_string();
            if message.is_some() {
                entry.resolution_message = message;
            }
        }
        self.reproject(now);
    }

    pub fn remove_notification(&mut self, id: u64, now: OffsetDateTime) {
        self.all.retain(|n| n.id != id);
        self.reproject(now);
    }

    pub fn remove_user(&mut self, email: &str) {
        self.users.retain(|u| u.email != email);
        if self.selected_user >= self.users.len() {
            self.selected_user = self.users.len().saturating_sub(1);
        }
    }

    pub fn move_selection(&mut self, delta: isize) {
        match self.tab {
            Tab::Users => {
                Self::step(&mut self.selected_user, self.users.len(), delta);
            }
            _ => {
                Self::step(&mut self.selected, self.visible.len(), delta);
            }
        }
    }

    fn step(cursor: &mut usize, len: usize, delta: isize) {
        if len == 0 {
            *cursor = 0;
            return;
        }
        let current = *cursor as isize;
        let next = (current + delta).clamp(0, len as isize - 1);
        *cursor = next as usize;
    }

    pub fn set_tab(&mut self, tab: Tab) {
        self.tab = tab;
    }

    pub fn next_tab(&mut self) {
        self.tab = self.tab.next();
    }

    /// None -> pending -> read -> resolved -> dismissed -> None.
    pub fn cycle_status_filter(&mut self, now: OffsetDateTime) {
        self.filter.status = match self.filter.status.as_deref() {
            None => Some(KnownStatus::Pending.to_string()),
            Some("pending") => Some(KnownStatus::Read.to_string()),
            Some("read") => Some(KnownStatus::Resolved.to_string()),
            Some("resolved") => Some(KnownStatus::Dismissed.to_string()),
            Some(_) => None,
        };
        self.reproject(now);
    }

    pub fn cycle_date_range(&mut self, now: OffsetDateTime) {
        self.filter.range = self.filter.range.cycled();
        self.reproject(now);
    }

    pub fn cycle_sort(&mut self, now: OffsetDateTime) -> SortOrder {
        self.filter.sort = self.filter.sort.cycled();
        self.reproject(now);
        self.filter.sort
    }

    pub fn begin_search(&mut self) {
        self.search.active = true;
    }

    pub fn finish_search(&mut self) {
        self.search.active = false;
    }

    pub fn cancel_search(&mut self, now: OffsetDateTime) {
        self.search.active = false;
        self.filter.search.clear();
        self.reproject(now);
    }

    pub fn push_search_char(&mut self, ch: char, now: OffsetDateTime) {
        self.filter.search.push(ch);
        self.reproject(now);
    }

    pub fn pop_search_char(&mut self, now: OffsetDateTime) {
        self.filter.search.pop();
        self.reproject(now);
    }

    pub fn is_search_active(&self) -> bool {
        self.search.active
    }

    pub fn search_query(&self) -> &str {
        &self.filter.search
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn set_loading(&mut self, loading: bool) {
        self.loading = loading;
    }

    pub fn poll_status(&self) -> &PollerStatus {
        &self.poll_status
    }

    pub fn set_poll_status(&mut self, status: PollerStatus) {
        self.poll_status = status;
    }

    pub fn set_status_message<S: Into<String>>(&mut self, message: Option<S>) {
        self.status_message = message.map(Into::into);
    }

    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn set_last_error(&mut self, error: Option<String>) {
        self.last_error = error;
    }

    pub fn overlay(&self) -> Option<&OverlayState> {
        self.overlay.as_ref()
    }

    pub fn close_overlay(&mut self) {
        self.overlay = None;
    }

    pub fn open_detail(&mut self) {
        if let Some(notification) = self.selected_notification() {
            self.overlay = Some(OverlayState::Detail(notification.id));
        }
    }

    pub fn open_user_detail(&mut self) {
        if let Some(user) = self.selected_user_summary() {
            self.overlay = Some(OverlayState::UserDetail(user.id));
        }
    }

    pub fn open_status_picker(&mut self) {
        if let Some(notification) = self.selected_notification() {
            let current = KnownStatus::from_name(&notification.status);
            let selected = KnownStatus::iter()
                .position(|s| Some(s) == current)
                .unwrap_or(0);
            self.overlay = Some(OverlayState::StatusPicker(StatusPickerOverlay {
                notification_id: notification.id,
                selected,
                message: None,
            }));
        }
    }

    pub fn open_delete_notification(&mut self) {
        if let Some(notification) = self.selected_notification() {
            self.overlay = Some(OverlayState::DeleteNotification(DeleteNotificationOverlay {
                notification_id: notification.id,
                summary: format!("{} from {}", notification.kind, notification.user),
            }));
        }
    }

    pub fn open_delete_user(&mut self) {
        if let Some(user) = self.selected_user_summary() {
            self.overlay = Some(OverlayState::DeleteUser(DeleteUserOverlay {
                email: user.email.clone(),
                name: user.name.clone(),
            }));
        }
    }

    pub fn status_picker_mut(&mut self) -> Option<&mut StatusPickerOverlay> {
        match self.overlay.as_mut() {
            Some(OverlayState::StatusPicker(picker)) => Some(picker),
            _ => None,
        }
    }

    pub fn theme_name(&self) -> ThemeName {
        self.theme_name
    }

    pub fn theme(&self) -> Theme {
        Theme::for_name(self.theme_name)
    }

    pub fn toggle_theme(&mut self) -> ThemeName {
        self.theme_name = match self.theme_name {
            ThemeName::Dark => ThemeName::Light,
            ThemeName::Light => ThemeName::Dark,
        };
        self.theme_name
    }
}
