//! Terminal renderer for toast panels.
//!
//! Renders notifications as bordered panels colored by kind. Used by the
//! `stayfront toast` command and by anything else that wants a text view of
//! the notification center.

use owo_colors::{OwoColorize, Rgb};

use super::Notification;
use crate::ui::Theme;

/// Renders notifications as themed text panels.
#[derive(Debug, Clone)]
pub struct NotificationRenderer {
    theme: Theme,
    /// Panel width (characters)
    width: usize,
    use_color: bool,
}

impl Default for NotificationRenderer {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationRenderer {
    /// Creates a renderer with the default theme, 60 columns wide, colored.
    pub fn new() -> Self {
        Self {
            theme: Theme::default(),
            width: 60,
            use_color: true,
        }
    }

    /// Sets the panel width. Widths below 20 are raised to 20.
    pub fn with_width(mut self, width: usize) -> Self {
        self.width = width.max(20);
        self
    }

    /// Enables or disables ANSI colors.
    pub fn with_color(mut self, use_color: bool) -> Self {
        self.use_color = use_color;
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    fn paint(&self, text: &str, color: Rgb, bold: bool) -> String {
        match (self.use_color, bold) {
            (false, _) => text.to_string(),
            (true, false) => text.color(color).to_string(),
            (true, true) => text.color(color).bold().to_string(),
        }
    }

    /// Safely truncates a string to the given maximum character count.
    fn safe_truncate(s: &str, max_chars: usize) -> String {
        if s.chars().count() <= max_chars {
            s.to_string()
        } else {
            let truncated: String = s.chars().take(max_chars.saturating_sub(3)).collect();
            format!("{}...", truncated)
        }
    }

    /// Renders one notification panel.
    pub fn render(&self, notification: &Notification) -> String {
        let color = self.theme.for_kind(notification.kind);
        let inner_width = self.width - 2;
        let border = "─".repeat(inner_width);
        let mut output = String::new();

        output.push_str(&self.paint(&border, color, false));
        output.push('\n');

        let header = format!(
            "{} {}",
            notification.kind.as_str().to_uppercase(),
            Self::safe_truncate(&notification.title, inner_width.saturating_sub(12))
        );
        output.push_str(&format!(" {}\n", self.paint(&header, color, true)));

        if let Some(message) = &notification.message {
            output.push_str(&format!(
                " {}\n",
                Self::safe_truncate(message, inner_width.saturating_sub(1))
            ));
        }

        let mut footer = Vec::new();
        if let Some(action) = &notification.action {
            footer.push(self.paint(&format!("[{}]", action.label()), self.theme.accent, true));
        }
        if notification.dismissible {
            footer.push(self.paint("[x] dismiss", self.theme.muted, false));
        }
        let lifetime = match notification.duration {
            Some(duration) => format!("auto-dismiss in {}s", duration.as_secs_f32().ceil() as u64),
            None => "persistent".to_string(),
        };
        footer.push(self.paint(&lifetime, self.theme.muted, false));
        output.push_str(&format!(" {}\n", footer.join("  ")));

        output.push_str(&self.paint(&border, color, false));
        output
    }

    /// Renders every notification, oldest first, separated by blank lines.
    pub fn render_all(&self, notifications: &[Notification]) -> String {
        if notifications.is_empty() {
            return self.paint("No notifications.", self.theme.muted, false);
        }
        notifications
            .iter()
            .map(|n| self.render(n))
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}
