use std::collections::HashSet;

use ratatui::style::Color;

use super::ThemeName;
use crate::feed::Urgency;

#[derive(Debug, Clone)]
pub struct ThemeRegistry {
    names: HashSet<ThemeName>,
}

impl ThemeRegistry {
    pub fn contains(&self, theme: &ThemeName) -> bool {
        self.names.contains(theme)
    }

    pub fn all(&self) -> impl Iterator<Item = &ThemeName> {
        self.names.iter()
    }
}

impl Default for ThemeRegistry {
    fn default() -> Self {
        let names = [ThemeName::Dark, ThemeName::Light].into_iter().collect();
        Self { names }
    }
}

/// Resolved color palette for one theme.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    pub accent: Color,
    pub text_muted: Color,
    pub text_faint: Color,
    pub banner_error: Color,
    pub selection_bg: Color,
    pub selection_fg: Color,
    pub urgency_high: Color,
    pub urgency_medium: Color,
    pub urgency_low: Color,
    pub status_pending: Color,
    pub status_read: Color,
    pub status_resolved: Color,
    pub status_dismissed: Color,
    pub highlight: Color,
}

impl Theme {
    pub fn for_name(name: ThemeName) -> Self {
        match name {
            ThemeName::Dark => Self {
                accent: Color::Cyan,
                text_muted: Color::Gray,
                text_faint: Color::DarkGray,
                banner_error: Color::Red,
                selection_bg: Color::Blue,
                selection_fg: Color::Black,
                urgency_high: Color::Red,
                urgency_medium: Color::Yellow,
                urgency_low: Color::Green,
                status_pending: Color::Yellow,
                status_read: Color::Cyan,
                status_resolved: Color::Green,
                status_dismissed: Color::Gray,
                highlight: Color::Yellow,
            },
            ThemeName::Light => Self {
                accent: Color::Blue,
                text_muted: Color::DarkGray,
                text_faint: Color::Gray,
                banner_error: Color::LightRed,
                selection_bg: Color::LightBlue,
                selection_fg: Color::Black,
                urgency_high: Color::LightRed,
                urgency_medium: Color::LightYellow,
                urgency_low: Color::LightGreen,
                status_pending: Color::LightYellow,
                status_read: Color::LightBlue,
                status_resolved: Color::LightGreen,
                status_dismissed: Color::DarkGray,
                highlight: Color::LightYellow,
            },
        }
    }

    pub fn urgency_color(&self, urgency: Urgency) -> Color {
        match urgency {
            Urgency::High => self.urgency_high,
            Urgency::Medium => self.urgency_medium,
            Urgency::Low => self.urgency_low,
        }
    }

    /// Falls back to the muted text color for statuses outside the known set.
    pub fn status_color(&self, status: &str) -> Color {
        match status {
            "pending" => self.status_pending,
            "read" => self.status_read,
            "resolved" => self.status_resolved,
            "dismissed" => self.status_dismissed,
            _ => self.text_muted,
        }
    }
}
