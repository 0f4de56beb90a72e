//! 24-bit RGB color theme for terminal output.
//!
//! Defines the color palette used by the toast renderer and the CLI.

use owo_colors::Rgb;

use crate::notification::NotificationKind;

/// 24-bit RGB color theme for stayfront's terminal output.
#[derive(Debug, Clone, Copy)]
pub struct Theme {
    /// Success state color - green (34, 197, 94)
    pub success: Rgb,
    /// Error state color - red (239, 68, 68)
    pub error: Rgb,
    /// Warning state color - yellow (234, 179, 8)
    pub warning: Rgb,
    /// Informational color - blue (59, 130, 246)
    pub info: Rgb,
    /// Muted/secondary text color - gray (107, 114, 128)
    pub muted: Rgb,
    /// Action label highlight color - cyan (34, 211, 238)
    pub accent: Rgb,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            success: Rgb(34, 197, 94),
            error: Rgb(239, 68, 68),
            warning: Rgb(234, 179, 8),
            info: Rgb(59, 130, 246),
            muted: Rgb(107, 114, 128),
            accent: Rgb(34, 211, 238),
        }
    }
}

impl Theme {
    /// Create a new theme with default colors.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the color for a notification kind.
    pub fn for_kind(&self, kind: NotificationKind) -> Rgb {
        match kind {
            NotificationKind::Success => self.success,
            NotificationKind::Error => self.error,
            NotificationKind::Warning => self.warning,
            NotificationKind::Info => self.info,
        }
    }
}
