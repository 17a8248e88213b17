use std::io::Stdout;
use std::sync::Arc;
use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
    KeyModifiers,
};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use ratatui::backend::CrosstermBackend;
use ratatui::widgets::ListState;
use ratatui::Terminal;
use time::OffsetDateTime;

use crate::api::{ApiClient, UserSummary};
use crate::config::AppConfig;
use crate::feed::KnownStatus;
use crate::poller::{PollEvent, PollerHandle};
use crate::ui;

mod actions;
pub mod state;

pub use actions::ActionDispatcher;
pub use state::{AppState, OverlayState, StatusPickerOverlay, Tab};

enum Action {
    Quit,
    SelectNext,
    SelectPrevious,
    NextTab,
    GotoTab(Tab),
    Refresh,
    CycleStatusFilter,
    CycleDateRange,
    CycleSort,
    StartSearch,
    OpenDetail,
    UpdateStatus,
    Delete,
    ToggleTheme,
}

pub struct App {
    pub config: Arc<AppConfig>,
    api: ApiClient,
    state: AppState,
    list_state: ListState,
    should_quit: bool,
    tick_rate: Duration,
    poller: PollerHandle,
}

impl App {
    pub fn new(config: Arc<AppConfig>) -> Result<Self> {
        let api = ApiClient::new(&config.api).context("building API client")?;
        let poller =
            PollerHandle::spawn(&config.api, &config.poll).context("starting poller")?;
        let state = AppState::new(&config);
        Ok(Self {
            config,
            api,
            state,
            list_state: ListState::default(),
            should_quit: false,
            tick_rate: Duration::from_millis(250),
            poller,
        })
    }

    pub fn run(&mut self) -> Result<()> {
        let mut terminal = setup_terminal()?;
        let result = self.event_loop(&mut terminal);
        restore_terminal(&mut terminal)?;
        result
    }

    fn event_loop(&mut self, terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
        let mut last_tick = Instant::now();
        loop {
            terminal
                .draw(|frame| {
                    if self.state.is_empty() {
                        self.list_state.select(None);
                    } else {
                        self.list_state.select(Some(self.state.selected));
                    }
                    ui::draw_app(frame, &self.state, &mut self.list_state);
                })
                .context("rendering frame")?;

            if self.should_quit {
                break;
            }

            let timeout = self
                .tick_rate
                .checked_sub(last_tick.elapsed())
                .unwrap_or_else(|| Duration::from_millis(0));

            if event::poll(timeout).context("polling for terminal events")? {
                match event::read().context("reading terminal event")? {
                    Event::Key(key) => self.handle_key(key),
                    Event::Resize(_, _) => {
                        // next draw adapts to the new size
                    }
                    _ => {}
                }
            }

            if last_tick.elapsed() >= self.tick_rate {
                self.on_tick();
                last_tick = Instant::now();
            }
        }
        Ok(())
    }

    fn on_tick(&mut self) {
        let now = OffsetDateTime::now_utc();
        while let Some(event) = self.poller.try_recv() {
            match event {
                PollEvent::Started => {
                    self.state.set_loading(true);
                }
                PollEvent::Loaded(raw) => {
                    self.state.set_loading(false);
                    self.state.set_last_error(None);
                    self.state.replace_notifications(raw, now);
                }
                PollEvent::Failed(message) => {
                    self.state.set_loading(false);
                    self.state.set_last_error(Some(message));
                }
            }
        }
        self.state.set_poll_status(self.poller.status());
    }

    fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }

        if self.handle_overlay_key(key) {
            return;
        }

        if self.state.is_search_active() {
            let now = OffsetDateTime::now_utc();
            match key.code {
                KeyCode::Esc => {
                    self.state.cancel_search(now);
                    return;
                }
                KeyCode::Enter => {
                    self.state.finish_search();
                    return;
                }
                KeyCode::Backspace => {
                    self.state.pop_search_char(now);
                    return;
                }
                KeyCode::Char(ch)
                    if !key.modifiers.intersects(
                        KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                    ) =>
                {
                    self.state.push_search_char(ch, now);
                    return;
                }
                _ => {}
            }
        }

        let action = match key.code {
            KeyCode::Char('q') => Some(Action::Quit),
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Quit)
            }
            KeyCode::Char('j') | KeyCode::Down => Some(Action::SelectNext),
            KeyCode::Char('k') | KeyCode::Up => Some(Action::SelectPrevious),
            KeyCode::Tab => Some(Action::NextTab),
            KeyCode::Char('1') => Some(Action::GotoTab(Tab::Notifications)),
            KeyCode::Char('2') => Some(Action::GotoTab(Tab::Users)),
            KeyCode::Char('3') => Some(Action::GotoTab(Tab::Analytics)),
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                Some(Action::Refresh)
            }
            KeyCode::Char('s')
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                Some(Action::CycleStatusFilter)
            }
            KeyCode::Char('d')
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                Some(Action::CycleDateRange)
            }
            KeyCode::Char('o')
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                Some(Action::CycleSort)
            }
            KeyCode::Char('/')
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                Some(Action::StartSearch)
            }
            KeyCode::Enter => Some(Action::OpenDetail),
            KeyCode::Char('u')
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                Some(Action::UpdateStatus)
            }
            KeyCode::Char('x')
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                Some(Action::Delete)
            }
            KeyCode::Char('t')
                if !key.modifiers.intersects(
                    KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                ) =>
            {
                Some(Action::ToggleTheme)
            }
            _ => None,
        };

        if let Some(action) = action {
            self.handle_action(action);
        }
    }

    fn handle_action(&mut self, action: Action) {
        let now = OffsetDateTime::now_utc();
        match action {
            Action::Quit => {
                self.should_quit = true;
            }
            Action::SelectNext => self.state.move_selection(1),
            Action::SelectPrevious => self.state.move_selection(-1),
            Action::NextTab => {
                self.state.next_tab();
                self.on_tab_entered();
            }
            Action::GotoTab(tab) => {
                self.state.set_tab(tab);
                self.on_tab_entered();
            }
            Action::Refresh => self.handle_refresh(),
            Action::CycleStatusFilter => {
                self.state.cycle_status_filter(now);
                let label = self
                    .state
                    .filter
                    .status
                    .clone()
                    .unwrap_or_else(|| "all".to_string());
                self.state
                    .set_status_message(Some(format!("Status filter: {label}")));
            }
            Action::CycleDateRange => {
                self.state.cycle_date_range(now);
                let label = self.state.filter.range.label();
                self.state
                    .set_status_message(Some(format!("Date range: {label}")));
            }
            Action::CycleSort => {
                let sort = self.state.cycle_sort(now);
                self.state
                    .set_status_message(Some(format!("Sort: {}", sort.label())));
            }
            Action::StartSearch => {
                if self.state.tab == Tab::Notifications {
                    self.state.begin_search();
                }
            }
            Action::OpenDetail => match self.state.tab {
                Tab::Notifications => self.state.open_detail(),
                Tab::Users => self.state.open_user_detail(),
                Tab::Analytics => {}
            },
            Action::UpdateStatus => {
                if self.state.tab == Tab::Notifications {
                    self.state.open_status_picker();
                }
            }
            Action::Delete => match self.state.tab {
                Tab::Notifications => self.state.open_delete_notification(),
                Tab::Users => self.state.open_delete_user(),
                Tab::Analytics => {}
            },
            Action::ToggleTheme => {
                let theme = self.state.toggle_theme();
                self.state
                    .set_status_message(Some(format!("Theme: {theme:?}")));
            }
        }
    }

    fn on_tab_entered(&mut self) {
        match self.state.tab {
            Tab::Users if self.state.users.is_empty() => self.refresh_users(),
            Tab::Analytics if self.state.analytics.is_none() => self.refresh_analytics(),
            _ => {}
        }
    }

    fn handle_refresh(&mut self) {
        match self.state.tab {
            Tab::Notifications => {
                self.poller.request_refresh();
                self.state.set_status_message(Some("Refreshing..."));
            }
            Tab::Users => self.refresh_users(),
            Tab::Analytics => self.refresh_analytics(),
        }
    }

    fn refresh_users(&mut self) {
        match self.api.fetch_users() {
            Ok(users) => {
                let summaries: Vec<UserSummary> =
                    users.iter().map(UserSummary::from_api).collect();
                self.state
                    .set_status_message(Some(format!("Loaded {} users", summaries.len())));
                self.state.replace_users(summaries);
            }
            Err(err) => {
                tracing::error!(?err, "failed to fetch users");
                self.state.set_last_error(Some(err.to_string()));
            }
        }
    }

    fn refresh_analytics(&mut self) {
        match self.api.fetch_analytics() {
            Ok(report) => {
                self.state.set_analytics(report);
                self.state.set_status_message(Some("Analytics updated"));
            }
            Err(err) => {
                tracing::error!(?err, "failed to fetch analytics");
                self.state.set_last_error(Some(err.to_string()));
            }
        }
    }

    fn handle_overlay_key(&mut self, key: KeyEvent) -> bool {
        match self.state.overlay() {
            Some(OverlayState::Detail(_)) | Some(OverlayState::UserDetail(_)) => {
                match key.code {
                    KeyCode::Esc | KeyCode::Enter | KeyCode::Char('q') => {
                        self.state.close_overlay();
                    }
                    _ => {}
                }
                true
            }
            Some(OverlayState::StatusPicker(picker)) => {
                let entering_message = picker.is_entering_message();
                if entering_message {
                    match key.code {
                        KeyCode::Esc => {
                            if let Some(picker) = self.state.status_picker_mut() {
                                picker.message = None;
                            }
                        }
                        KeyCode::Enter => self.submit_status_update(),
                        KeyCode::Backspace => {
                            if let Some(picker) = self.state.status_picker_mut() {
                                if let Some(message) = picker.message.as_mut() {
                                    message.pop();
                                }
                            }
                        }
                        KeyCode::Char(ch)
                            if !key.modifiers.intersects(
                                KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER,
                            ) =>
                        {
                            if let Some(picker) = self.state.status_picker_mut() {
                                if let Some(message) = picker.message.as_mut() {
                                    if message.len() < 200 {
                                        message.push(ch);
                                    }
                                }
                            }
                        }
                        _ => {}
                    }
                } else {
                    match key.code {
                        KeyCode::Esc => {
                            self.state.close_overlay();
                            self.state.set_status_message(Some("Status update canceled"));
                        }
                        KeyCode::Char('j') | KeyCode::Down => {
                            if let Some(picker) = self.state.status_picker_mut() {
                                let last = picker.options().len() - 1;
                                picker.selected = (picker.selected + 1).min(last);
                            }
                        }
                        KeyCode::Char('k') | KeyCode::Up => {
                            if let Some(picker) = self.state.status_picker_mut() {
                                picker.selected = picker.selected.saturating_sub(1);
                            }
                        }
                        KeyCode::Enter => {
                            let chosen = self.state.status_picker_mut().map(|p| p.chosen());
                            if chosen == Some(KnownStatus::Resolved) {
                                if let Some(picker) = self.state.status_picker_mut() {
                                    picker.message = Some(String::new());
                                }
                            } else {
                                self.submit_status_update();
                            }
                        }
                        _ => {}
                    }
                }
                true
            }
            Some(OverlayState::DeleteNotification(_)) => {
                match key.code {
                    KeyCode::Enter | KeyCode::Char('y') => self.submit_delete_notification(),
                    KeyCode::Esc | KeyCode::Char('n') => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Delete canceled"));
                    }
                    _ => {}
                }
                true
            }
            Some(OverlayState::DeleteUser(_)) => {
                match key.code {
                    KeyCode::Enter | KeyCode::Char('y') => self.submit_delete_user(),
                    KeyCode::Esc | KeyCode::Char('n') => {
                        self.state.close_overlay();
                        self.state.set_status_message(Some("Delete canceled"));
                    }
                    _ => {}
                }
                true
            }
            None => false,
        }
    }

    fn submit_status_update(&mut self) {
        let Some(picker) = self.state.status_picker_mut() else {
            return;
        };
        let id = picker.notification_id;
        let status = picker.chosen();
        let message = picker
            .message
            .take()
            .map(|m| m.trim().to_string())
            .filter(|m| !m.is_empty());

        let dispatcher = ActionDispatcher::new(&self.api);
        match dispatcher.set_status(id, status, message.clone()) {
            Ok(()) => {
                let now = OffsetDateTime::now_utc();
                self.state.apply_status_update(id, status, message, now);
                self.state.close_overlay();
                self.state
                    .set_status_message(Some(format!("Notification #{id} marked {status}")));
            }
            Err(err) => {
                tracing::error!(?err, "status update failed");
                self.state.close_overlay();
                self.state
                    .set_status_message(Some(format!("Status update failed: {err:#}")));
            }
        }
    }

    fn submit_delete_notification(&mut self) {
        let Some(OverlayState::DeleteNotification(overlay)) = self.state.overlay() else {
            return;
        };
        let id = overlay.notification_id;
        let dispatcher = ActionDispatcher::new(&self.api);
        match dispatcher.delete_notification(id) {
            Ok(()) => {
                let now = OffsetDateTime::now_utc();
                self.state.remove_notification(id, now);
                self.state.close_overlay();
                self.state
                    .set_status_message(Some(format!("Deleted notification #{id}")));
            }
            Err(err) => {
                tracing::error!(?err, "notification delete failed");
                self.state.close_overlay();
                self.state
                    .set_status_message(Some(format!("Delete failed: {err:#}")));
            }
        }
    }

    fn submit_delete_user(&mut self) {
        let Some(OverlayState::DeleteUser(overlay)) = self.state.overlay() else {
            return;
        };
        let email = overlay.email.clone();
        let dispatcher = ActionDispatcher::new(&self.api);
        match dispatcher.delete_user(&email) {
            Ok(()) => {
                self.state.remove_user(&email);
                self.state.close_overlay();
                self.state
                    .set_status_message(Some(format!("Deleted user {email}")));
            }
            Err(err) => {
                tracing::error!(?err, "user delete failed");
                self.state.close_overlay();
                self.state
                    .set_status_message(Some(format!("Delete failed: {err:#}")));
            }
        }
    }
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>> {
    enable_raw_mode().context("enabling raw mode")?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)
        .context("switching to alternate screen")?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend).context("creating terminal backend")?;
    terminal.hide_cursor().context("hiding cursor")?;
    Ok(terminal)
}

fn restore_terminal(terminal: &mut Terminal<CrosstermBackend<Stdout>>) -> Result<()> {
    terminal.show_cursor().ok();
    disable_raw_mode().context("disabling raw mode")?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )
    .context("restoring screen state")?;
    Ok(())
}
