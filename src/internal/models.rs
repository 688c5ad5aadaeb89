use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use super::error::TimestampError;

/// Display styles accepted by Discord's `<t:SECONDS:STYLE>` markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum TimestampStyle {
    /// `t`: 4:20 PM
    ShortTime,
    /// `T`: 4:20:30 PM
    LongTime,
    /// `d`: 04/20/2021
    ShortDate,
    /// `D`: April 20, 2021
    LongDate,
    /// `f`: April 20, 2021 at 4:20 PM
    #[default]
    ShortDateTime,
    /// `F`: Tuesday, April 20, 2021 at 4:20 PM
    LongDateTime,
    /// `R`: 2 months ago
    Relative,
}

impl TimestampStyle {
    pub const ALL: [TimestampStyle; 7] = [
        Self::ShortTime,
        Self::LongTime,
        Self::ShortDate,
        Self::LongDate,
        Self::ShortDateTime,
        Self::LongDateTime,
        Self::Relative,
    ];

    pub fn code(&self) -> char {
        match self {
            Self::ShortTime => 't',
            Self::LongTime => 'T',
            Self::ShortDate => 'd',
            Self::LongDate => 'D',
            Self::ShortDateTime => 'f',
            Self::LongDateTime => 'F',
            Self::Relative => 'R',
        }
    }

    /// strftime pattern for absolute styles, `None` for [`TimestampStyle::Relative`].
    pub fn pattern(&self) -> Option<&'static str> {
        match self {
            Self::ShortTime => Some("%-I:%M %p"),
            Self::LongTime => Some("%-I:%M:%S %p"),
            Self::ShortDate => Some("%m/%d/%Y"),
            Self::LongDate => Some("%B %-d, %Y"),
            Self::ShortDateTime => Some("%B %-d, %Y at %-I:%M %p"),
            Self::LongDateTime => Some("%A, %B %-d, %Y at %-I:%M %p"),
            Self::Relative => None,
        }
    }
}

impl fmt::Display for TimestampStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl FromStr for TimestampStyle {
    type Err = TimestampError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|style| s.chars().eq(std::iter::once(style.code())))
            .ok_or_else(|| TimestampError::InvalidStyle(s.to_string()))
    }
}

impl TryFrom<String> for TimestampStyle {
    type Error = TimestampError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<TimestampStyle> for String {
    fn from(style: TimestampStyle) -> Self {
        style.to_string()
    }
}

/// A unix timestamp paired with the style it should be shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscordTimestamp {
    pub seconds: i64,
    pub style: TimestampStyle,
}

impl DiscordTimestamp {
    pub fn new(seconds: i64, style: TimestampStyle) -> Self {
        Self { seconds, style }
    }

    /// The markup Discord users type to produce this timestamp.
    pub fn markup(&self) -> String {
        format!("<t:{}:{}>", self.seconds, self.style)
    }
}

/// Output of rendering a single timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Rendered {
    pub text: String,
    /// When the text goes stale; `None` for absolute styles.
    pub next_update: Option<Duration>,
}
