//! Clock display settings.
//!
//! Pure configuration consumed by formatting and display layers.
//! Decoding is per field: a missing or unknown value falls back to its
//! default without discarding the others.

use crate::format::{FormatOptions, HourFormat};
use serde::{Deserialize, Serialize};

/// Size class of the main clock face.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum FontSize {
    Small,
    Medium,
    #[default]
    Large,
}

impl FontSize {
    /// Point size used by the clock face.
    pub fn points(self) -> u16 {
        match self {
            Self::Small => 48,
            Self::Medium => 64,
            Self::Large => 80,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        [Self::Small, Self::Medium, Self::Large]
            .into_iter()
            .find(|size| size.label() == normalized)
    }
}

/// Named accent colour palette.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", from = "String")]
pub enum ColorTheme {
    #[default]
    Blue,
    Red,
    Green,
    Purple,
    Orange,
    Teal,
}

impl ColorTheme {
    pub const ALL: [ColorTheme; 6] = [
        Self::Blue,
        Self::Red,
        Self::Green,
        Self::Purple,
        Self::Orange,
        Self::Teal,
    ];

    pub fn hex(self) -> &'static str {
        match self {
            Self::Blue => "#1565c0",
            Self::Red => "#d32f2f",
            Self::Green => "#388e3c",
            Self::Purple => "#7b1fa2",
            Self::Orange => "#f57c00",
            Self::Teal => "#00796b",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Blue => "blue",
            Self::Red => "red",
            Self::Green => "green",
            Self::Purple => "purple",
            Self::Orange => "orange",
            Self::Teal => "teal",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|theme| theme.label() == normalized)
    }
}

impl From<String> for FontSize {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_default()
    }
}

impl From<String> for ColorTheme {
    fn from(value: String) -> Self {
        Self::parse(&value).unwrap_or_default()
    }
}

/// Persisted clock screen preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ClockSettings {
    pub is_24_hour: bool,
    pub show_seconds: bool,
    pub show_date: bool,
    pub digital_font: bool,
    pub font_size: FontSize,
    pub color_theme: ColorTheme,
}

impl Default for ClockSettings {
    fn default() -> Self {
        Self {
            is_24_hour: false,
            show_seconds: true,
            show_date: true,
            digital_font: true,
            font_size: FontSize::default(),
            color_theme: ColorTheme::default(),
        }
    }
}

impl ClockSettings {
    /// Formatting options for the main clock face.
    pub fn format_options(&self) -> FormatOptions {
        FormatOptions {
            hour_format: if self.is_24_hour {
                HourFormat::H24
            } else {
                HourFormat::H12
            },
            show_seconds: self.show_seconds,
            show_milliseconds: false,
        }
    }
}
