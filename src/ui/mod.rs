use std::collections::HashSet;

use ratatui::layout::{Alignment, Constraint, Direction, Layout, Rect};
use ratatui::style::{Modifier, Style};
use ratatui::text::{Line, Span, Text};
use ratatui::widgets::{
    Block, Borders, Clear, Gauge, List, ListItem, ListState, Paragraph, Row, Table, Tabs, Wrap,
};
use ratatui::Frame;
use regex::{Regex, RegexBuilder};
use unicode_width::UnicodeWidthStr;

use crate::app::state::{AppState, OverlayState, Tab};
use crate::config::themes::Theme;
use crate::feed::DisplayNotification;
use crate::poller::PollerStatus;

pub fn draw_app(frame: &mut Frame, state: &AppState, list_state: &mut ListState) {
    let theme = state.theme();
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(3),
            Constraint::Length(4),
        ])
        .split(frame.size());

    let titles: Vec<Line> = [Tab::Notifications, Tab::Users, Tab::Analytics]
        .iter()
        .map(|tab| Line::from(format!(" {} ", tab.label())))
        .collect();
    let tabs = Tabs::new(titles)
        .block(Block::default().borders(Borders::ALL).title("Siren"))
        .select(state.tab.index())
        .highlight_style(
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_widget(tabs, vertical[0]);

    match state.tab {
        Tab::Notifications => draw_notifications(frame, state, &theme, vertical[1], list_state),
        Tab::Users => draw_users(frame, state, &theme, vertical[1]),
        Tab::Analytics => draw_analytics(frame, state, &theme, vertical[1]),
    }

    let status = build_status_line(state, &theme);
    let status_paragraph = Paragraph::new(status).style(Style::default().fg(theme.text_muted));
    frame.render_widget(status_paragraph, vertical[2]);

    render_overlay(frame, state, &theme);
}

fn draw_notifications(
    frame: &mut Frame,
    state: &AppState,
    theme: &Theme,
    area: Rect,
    list_state: &mut ListState,
) {
    let highlight_regex = build_highlight_regex(state.search_query());
    let highlight_style = Style::default()
        .fg(theme.highlight)
        .add_modifier(Modifier::BOLD);

    let mut items = Vec::with_capacity(state.visible().len());
    for notification in state.visible() {
        items.push(ListItem::new(notification_lines(
            notification,
            theme,
            highlight_regex.as_ref(),
            highlight_style,
            area.width,
        )));
    }
    if items.is_empty() {
        let message = if state.total() == 0 {
            "No notifications yet."
        } else {
            "No notifications match the current filters."
        };
        items.push(ListItem::new(message));
    }

    let title = format!("Notifications ({}/{})", state.visible().len(), state.total());
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(theme.selection_bg)
                .fg(theme.selection_fg)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▸ ");
    frame.render_stateful_widget(list, area, list_state);
}

fn notification_lines(
    notification: &DisplayNotification,
    theme: &Theme,
    regex: Option<&Regex>,
    highlight_style: Style,
    width: u16,
) -> Vec<Line<'static>> {
    let mut title_spans = vec![Span::styled(
        format!("[{}] ", notification.urgency.label().to_uppercase()),
        Style::default()
            .fg(theme.urgency_color(notification.urgency))
            .add_modifier(Modifier::BOLD),
    )];
    title_spans.extend(highlight_line(
        &notification.kind,
        regex,
        highlight_style,
        Style::default().add_modifier(Modifier::BOLD),
    ));
    title_spans.push(Span::raw(" from "));
    title_spans.extend(highlight_line(
        &notification.user,
        regex,
        highlight_style,
        Style::default(),
    ));

    let mut meta_spans = vec![
        Span::styled(
            notification.status.clone(),
            Style::default()
                .fg(theme.status_color(&notification.status))
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(" • "),
        Span::styled(
            notification.timestamp.clone(),
            Style::default().fg(theme.text_muted),
        ),
        Span::raw(" • "),
    ];
    meta_spans.extend(highlight_line(
        &notification.location.display(),
        regex,
        highlight_style,
        Style::default().fg(theme.text_muted),
    ));

    let message = truncate_to_width(&notification.message, width.saturating_sub(4) as usize);
    let message_spans = highlight_line(&message, regex, highlight_style, Style::default());

    let mut lines = vec![
        Line::from(title_spans),
        Line::from(meta_spans),
        Line::from(message_spans),
    ];
    if let Some(resolution) = &notification.resolution_message {
        lines.push(Line::from(Span::styled(
            format!("↳ {resolution}"),
            Style::default().fg(theme.status_resolved),
        )));
    }
    lines
}

fn draw_users(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    if state.users.is_empty() {
        let paragraph = Paragraph::new("No users loaded. Press Ctrl-r to fetch.")
            .block(Block::default().title("Users").borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    }

    let header = Row::new(vec!["Name", "Email", "Status", "Role", "Joined"]).style(
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    );

    let rows: Vec<Row> = state
        .users
        .iter()
        .enumerate()
        .map(|(idx, user)| {
            let status_color = match user.status {
                crate::api::types::AccountStatus::Active => theme.status_resolved,
                crate::api::types::AccountStatus::Pending => theme.status_pending,
            };
            let mut row = Row::new(vec![
                Span::raw(user.name.clone()),
                Span::styled(user.email.clone(), Style::default().fg(theme.text_muted)),
                Span::styled(
                    user.status.label().to_string(),
                    Style::default().fg(status_color),
                ),
                Span::raw(user.role.clone()),
                Span::styled(
                    user.join_date.clone(),
                    Style::default().fg(theme.text_muted),
                ),
            ]);
            if idx == state.selected_user {
                row = row.style(
                    Style::default()
                        .bg(theme.selection_bg)
                        .fg(theme.selection_fg)
                        .add_modifier(Modifier::BOLD),
                );
            }
            row
        })
        .collect();

    let table = Table::new(
        rows,
        [
            Constraint::Percentage(25),
            Constraint::Percentage(30),
            Constraint::Percentage(12),
            Constraint::Percentage(13),
            Constraint::Percentage(20),
        ],
    )
    .header(header)
    .block(
        Block::default()
            .title(format!("Users ({})", state.users.len()))
            .borders(Borders::ALL),
    );
    frame.render_widget(table, area);
}

fn draw_analytics(frame: &mut Frame, state: &AppState, theme: &Theme, area: Rect) {
    let Some(report) = &state.analytics else {
        let paragraph = Paragraph::new("No analytics yet. Press Ctrl-r to fetch.")
            .block(Block::default().title("Analytics").borders(Borders::ALL));
        frame.render_widget(paragraph, area);
        return;
    };

    let layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(3)])
        .split(area);

    let resolved = report.resolution_stats.resolved;
    let total = resolved + report.resolution_stats.unresolved;
    let ratio = if total == 0 {
        0.0
    } else {
        resolved as f64 / total as f64
    };
    let gauge = Gauge::default()
        .block(
            Block::default()
                .title("Resolution rate")
                .borders(Borders::ALL),
        )
        .gauge_style(Style::default().fg(theme.status_resolved))
        .ratio(ratio)
        .label(format!("{resolved}/{total} resolved"));
    frame.render_widget(gauge, layout[0]);

    let mut lines = Vec::new();
    lines.push(Line::from(Span::styled(
        format!("Total notifications: {}", report.total_notifications),
        Style::default().add_modifier(Modifier::BOLD),
    )));
    lines.push(Line::from(""));
    lines.extend(histogram_lines("By status", &report.status_counts, theme));
    lines.extend(histogram_lines("By type", &report.type_counts, theme));
    lines.extend(histogram_lines("Top reporters", &report.user_counts, theme));

    let paragraph = Paragraph::new(lines)
        .block(Block::default().title("Analytics").borders(Borders::ALL))
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, layout[1]);
}

fn histogram_lines(
    title: &str,
    counts: &indexmap::IndexMap<String, u64>,
    theme: &Theme,
) -> Vec<Line<'static>> {
    if counts.is_empty() {
        return Vec::new();
    }
    let max = counts.values().copied().max().unwrap_or(1).max(1);
    let mut lines = vec![Line::from(Span::styled(
        title.to_string(),
        Style::default()
            .fg(theme.accent)
            .add_modifier(Modifier::BOLD),
    ))];
    for (name, count) in counts {
        let bar_len = ((*count as f64 / max as f64) * 20.0).round() as usize;
        lines.push(Line::from(vec![
            Span::raw(format!("  {name:<24} ")),
            Span::styled(
                "█".repeat(bar_len.max(1)),
                Style::default().fg(theme.accent),
            ),
            Span::styled(
                format!(" {count}"),
                Style::default().fg(theme.text_muted),
            ),
        ]));
    }
    lines.push(Line::from(""));
    lines
}

fn build_status_line(state: &AppState, theme: &Theme) -> Text<'static> {
    let mut spans = Vec::new();

    let position = if state.is_empty() {
        "0/0".to_string()
    } else {
        format!("{}/{}", state.selected + 1, state.visible().len())
    };
    spans.push(Span::raw(format!("View: {} ", state.tab.label())));
    spans.push(Span::raw("| Selected: "));
    spans.push(Span::styled(
        position,
        Style::default().add_modifier(Modifier::BOLD),
    ));

    let status_chip = state
        .filter
        .status
        .clone()
        .unwrap_or_else(|| "all".to_string());
    spans.push(Span::raw(" | "));
    spans.push(Span::styled(
        format!("[status:{status_chip}]"),
        Style::default().fg(theme.status_color(&status_chip)),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("[range:{}]", state.filter.range.label()),
        Style::default().fg(theme.accent),
    ));
    spans.push(Span::raw(" "));
    spans.push(Span::styled(
        format!("[sort:{}]", state.filter.sort.label()),
        Style::default().fg(theme.accent),
    ));

    if state.is_search_active() || !state.search_query().is_empty() {
        let label_style = if state.is_search_active() {
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(theme.text_muted)
        };
        spans.push(Span::raw(" | Search "));
        spans.push(Span::styled("/", label_style));
        if state.search_query().is_empty() {
            spans.push(Span::styled(
                "(type to search)",
                Style::default().fg(theme.text_faint),
            ));
        } else {
            spans.push(Span::styled(
                state.search_query().to_string(),
                Style::default().add_modifier(Modifier::BOLD),
            ));
        }
        if state.is_search_active() {
            spans.push(Span::styled(" ▌", Style::default().fg(theme.accent)));
        }
    }

    if state.is_loading() {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(
            "fetching...",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ));
    } else {
        match state.poll_status() {
            PollerStatus::Disabled => {
                spans.push(Span::raw(" | Poll: off"));
            }
            PollerStatus::Idle { last_success } => {
                spans.push(Span::raw(" | Poll: idle"));
                if last_success.is_some() {
                    spans.push(Span::styled(
                        " ✓",
                        Style::default().fg(theme.status_resolved),
                    ));
                }
            }
            PollerStatus::InFlight => {
                spans.push(Span::raw(" | Poll: in flight"));
            }
            PollerStatus::Error { .. } => {
                spans.push(Span::raw(" | Poll: "));
                spans.push(Span::styled(
                    "error",
                    Style::default().fg(theme.banner_error),
                ));
            }
        }
    }

    let mut lines = Vec::with_capacity(3);
    lines.push(Line::from(spans));

    if let Some(error) = state.last_error() {
        lines.push(Line::from(Span::styled(
            format!("! {error}"),
            Style::default()
                .fg(theme.banner_error)
                .add_modifier(Modifier::BOLD),
        )));
    } else if let Some(message) = &state.status_message {
        lines.push(Line::from(Span::styled(
            message.clone(),
            Style::default().fg(theme.accent),
        )));
    } else {
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Keys: j/k move • Tab/1/2/3 tabs • s status • d range • o sort • / search • Enter detail • u update • x delete • t theme • Ctrl-r refresh • q quit",
        Style::default().fg(theme.text_faint),
    )));

    Text::from(lines)
}

fn render_overlay(frame: &mut Frame, state: &AppState, theme: &Theme) {
    match state.overlay() {
        Some(OverlayState::Detail(id)) => {
            let Some(notification) = state.notification_by_id(*id) else {
                return;
            };
            let area = centered_rect(70, 70, frame.size());
            frame.render_widget(Clear, area);

            let mut lines = vec![
                Line::from(vec![
                    Span::styled(
                        format!("[{}] ", notification.urgency.label().to_uppercase()),
                        Style::default()
                            .fg(theme.urgency_color(notification.urgency))
                            .add_modifier(Modifier::BOLD),
                    ),
                    Span::styled(
                        notification.kind.clone(),
                        Style::default().add_modifier(Modifier::BOLD),
                    ),
                ]),
                Line::from(Span::styled(
                    format!(
                        "{} • {} • {}",
                        notification.status,
                        notification.timestamp,
                        notification.location.display()
                    ),
                    Style::default().fg(theme.text_muted),
                )),
                Line::from(""),
                Line::from(notification.message.clone()),
                Line::from(""),
            ];
            lines.push(Line::from(Span::styled(
                format!(
                    "Coordinates: {:.4}, {:.4}",
                    notification.location.latitude, notification.location.longitude
                ),
                Style::default().fg(theme.text_muted),
            )));
            if let Some(resolution) = &notification.resolution_message {
                lines.push(Line::from(Span::styled(
                    format!("Resolution: {resolution}"),
                    Style::default().fg(theme.status_resolved),
                )));
            }
            if let Some(detail) = &notification.detail {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Caller",
                    Style::default()
                        .fg(theme.accent)
                        .add_modifier(Modifier::BOLD),
                )));
                lines.push(Line::from(format!("  Name: {}", detail.full_name)));
                lines.push(Line::from(format!("  Blood type: {}", detail.blood_type)));
                lines.push(Line::from(format!("  Medical aid: {}", detail.medical_aid)));
                if let Some(allergies) = &detail.allergies {
                    lines.push(Line::from(format!("  Allergies: {allergies}")));
                }
                if !detail.contacts.is_empty() {
                    lines.push(Line::from(Span::styled(
                        "  Emergency contacts",
                        Style::default().fg(theme.accent),
                    )));
                    for contact in &detail.contacts {
                        lines.push(Line::from(format!(
                            "    {} ({}) {}",
                            contact.name, contact.relation, contact.phone
                        )));
                    }
                }
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Esc to close",
                Style::default().fg(theme.text_muted),
            )));

            let paragraph = Paragraph::new(lines)
                .block(
                    Block::default()
                        .title(format!("Notification #{id}"))
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(theme.accent)),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        Some(OverlayState::UserDetail(id)) => {
            let Some(user) = state.user_by_id(*id) else {
                return;
            };
            let area = centered_rect(60, 60, frame.size());
            frame.render_widget(Clear, area);

            let mut lines = vec![
                Line::from(Span::styled(
                    user.name.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(Span::styled(
                    format!("{} • {} since {}", user.email, user.status.label(), user.join_date),
                    Style::default().fg(theme.text_muted),
                )),
                Line::from(""),
                Line::from(format!("Phone: {}", user.phone)),
                Line::from(format!("Address: {}", user.address)),
                Line::from(format!("Role: {}", user.role)),
                Line::from(format!("Blood type: {}", user.blood_type)),
                Line::from(format!("Medical aid: {}", user.medical_aid)),
            ];
            if let Some(allergies) = &user.allergies {
                lines.push(Line::from(format!("Allergies: {allergies}")));
            }
            if let Some(conditions) = &user.conditions {
                lines.push(Line::from(format!("Conditions: {conditions}")));
            }
            if !user.contacts.is_empty() {
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Emergency contacts",
                    Style::default().fg(theme.accent),
                )));
                for contact in &user.contacts {
                    lines.push(Line::from(format!(
                        "  {} ({}) {}",
                        contact.name, contact.relation, contact.phone
                    )));
                }
            }
            lines.push(Line::from(""));
            lines.push(Line::from(Span::styled(
                "Esc to close",
                Style::default().fg(theme.text_muted),
            )));

            let paragraph = Paragraph::new(lines)
                .block(
                    Block::default()
                        .title("User")
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(theme.accent)),
                )
                .wrap(Wrap { trim: false });
            frame.render_widget(paragraph, area);
        }
        Some(OverlayState::StatusPicker(picker)) => {
            let area = centered_rect(50, 45, frame.size());
            frame.render_widget(Clear, area);

            let mut lines = vec![
                Line::from(Span::styled(
                    format!("Update notification #{}", picker.notification_id),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(""),
            ];
            for (idx, status) in picker.options().into_iter().enumerate() {
                let marker = if idx == picker.selected { "▸ " } else { "  " };
                let style = if idx == picker.selected {
                    Style::default()
                        .fg(theme.status_color(&status.to_string()))
                        .add_modifier(Modifier::BOLD)
                } else {
                    Style::default()
                };
                lines.push(Line::from(vec![
                    Span::styled(marker, Style::default().fg(theme.accent)),
                    Span::styled(status.to_string(), style),
                ]));
            }
            lines.push(Line::from(""));
            if let Some(message) = &picker.message {
                let mut display = message.clone();
                display.push('▌');
                lines.push(Line::from(Span::styled(
                    "Resolution message (optional):",
                    Style::default().fg(theme.accent),
                )));
                lines.push(Line::from(display));
                lines.push(Line::from(""));
                lines.push(Line::from(Span::styled(
                    "Enter to submit • Esc back",
                    Style::default().fg(theme.text_muted),
                )));
            } else {
                lines.push(Line::from(Span::styled(
                    "j/k choose • Enter apply • Esc cancel",
                    Style::default().fg(theme.text_muted),
                )));
            }

            let paragraph = Paragraph::new(lines).block(
                Block::default()
                    .title("Set Status")
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(theme.accent)),
            );
            frame.render_widget(paragraph, area);
        }
        Some(OverlayState::DeleteNotification(overlay)) => {
            render_confirm(
                frame,
                theme,
                "Delete Notification",
                vec![
                    Line::from(format!("Delete {}?", overlay.summary)),
                    Line::from(Span::styled(
                        "This cannot be undone.",
                        Style::default().fg(theme.banner_error),
                    )),
                ],
            );
        }
        Some(OverlayState::DeleteUser(overlay)) => {
            render_confirm(
                frame,
                theme,
                "Delete User",
                vec![
                    Line::from(format!("Delete {} ({})?", overlay.name, overlay.email)),
                    Line::from(Span::styled(
                        "This cannot be undone.",
                        Style::default().fg(theme.banner_error),
                    )),
                ],
            );
        }
        None => {}
    }
}

fn render_confirm(frame: &mut Frame, theme: &Theme, title: &str, mut body: Vec<Line<'static>>) {
    let area = centered_rect(50, 30, frame.size());
    frame.render_widget(Clear, area);
    body.push(Line::from(""));
    body.push(Line::from(Span::styled(
        "Enter or y confirm • Esc or n cancel",
        Style::default().fg(theme.text_muted),
    )));
    let paragraph = Paragraph::new(body)
        .alignment(Alignment::Left)
        .block(
            Block::default()
                .title(title.to_string())
                .borders(Borders::ALL)
                .border_style(Style::default().fg(theme.banner_error)),
        )
        .wrap(Wrap { trim: false });
    frame.render_widget(paragraph, area);
}

/// Turns the active search query into a match-highlighting regex. Each
/// whitespace-separated term becomes an alternative, deduplicated without
/// regard to case and longest first so overlapping terms highlight fully.
pub fn build_highlight_regex(query: &str) -> Option<Regex> {
    let mut terms: Vec<&str> = Vec::new();
    let mut seen = HashSet::new();
    for term in query.split_whitespace() {
        if seen.insert(term.to_lowercase()) {
            terms.push(term);
        }
    }
    if terms.is_empty() {
        return None;
    }
    terms.sort_by(|a, b| b.len().cmp(&a.len()));
    let pattern = terms
        .into_iter()
        .map(regex::escape)
        .collect::<Vec<_>>()
        .join("|");
    RegexBuilder::new(&pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

fn highlight_line(
    text: &str,
    regex: Option<&Regex>,
    highlight_style: Style,
    base_style: Style,
) -> Vec<Span<'static>> {
    if let Some(re) = regex {
        let mut spans = Vec::new();
        let mut last = 0;
        for mat in re.find_iter(text) {
            if mat.start() > last {
                spans.push(Span::styled(
                    text[last..mat.start()].to_string(),
                    base_style,
                ));
            }
            spans.push(Span::styled(mat.as_str().to_string(), highlight_style));
            last = mat.end();
        }
        if last < text.len() {
            spans.push(Span::styled(text[last..].to_string(), base_style));
        }
        if spans.is_empty() {
            spans.push(Span::styled(text.to_string(), base_style));
        }
        spans
    } else {
        vec![Span::styled(text.to_string(), base_style)]
    }
}

fn truncate_to_width(text: &str, max_width: usize) -> String {
    if max_width == 0 || UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let mut out = String::new();
    let mut used = 0;
    for ch in text.chars() {
        let w = UnicodeWidthStr::width(ch.to_string().as_str());
        if used + w + 1 > max_width {
            break;
        }
        out.push(ch);
        used += w;
    }
    out.push('…');
    out
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Percentage((100 - percent_y) / 2),
                Constraint::Percentage(percent_y),
                Constraint::Percentage((100 - percent_y) / 2),
            ]
            .as_ref(),
        )
        .split(area);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints(
            [
                Constraint::Percentage((100 - percent_x) / 2),
                Constraint::Percentage(percent_x),
                Constraint::Percentage((100 - percent_x) / 2),
            ]
            .as_ref(),
        )
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feed::Urgency;
    use ratatui::style::Style;
    use ratatui::text::Span;

    fn span_texts(spans: &[Span<'static>]) -> Vec<String> {
        spans
            .iter()
            .map(|span| span.content.clone().into_owned())
            .collect()
    }

    #[test]
    fn highlight_regex_prefers_longer_query_terms_first() {
        let regex = build_highlight_regex("fir fire").expect("regex");
        let spans = highlight_line("firetruck", Some(&regex), Style::default(), Style::default());
        assert_eq!(
            span_texts(&spans),
            vec![String::from("fire"), String::from("truck")]
        );
    }

    #[test]
    fn highlight_regex_deduplicates_case_insensitive_terms() {
        let regex = build_highlight_regex("Fire fire FIRE").expect("regex");
        let spans = highlight_line("fire", Some(&regex), Style::default(), Style::default());
        assert_eq!(span_texts(&spans), vec![String::from("fire")]);
    }

    #[test]
    fn highlight_regex_is_none_for_a_blank_query() {
        assert!(build_highlight_regex("").is_none());
        assert!(build_highlight_regex("   ").is_none());
    }

    #[test]
    fn truncation_respects_display_width() {
        assert_eq!(truncate_to_width("short", 20), "short");
        let truncated = truncate_to_width("a very long emergency description", 10);
        assert!(truncated.ends_with('…'));
        assert!(UnicodeWidthStr::width(truncated.as_str()) <= 10);
    }

    #[test]
    fn urgency_labels_render_uppercase_in_badges() {
        assert_eq!(Urgency::High.label().to_uppercase(), "HIGH");
    }
}
