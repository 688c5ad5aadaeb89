use serde::{Deserialize, Serialize};

use super::units::TimeUnit;

/// Turns a signed unit count into a human phrase.
///
/// Positive values are in the future, negative values in the past.
pub trait RelativePhrases {
    fn format(&self, value: i64, unit: TimeUnit) -> String;
}

impl<F> RelativePhrases for F
where
    F: Fn(i64, TimeUnit) -> String,
{
    fn format(&self, value: i64, unit: TimeUnit) -> String {
        self(value, unit)
    }
}

/// Whether idiomatic words ("yesterday", "next week") replace small counts.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Numeric {
    #[default]
    Auto,
    Always,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PhraseStyle {
    /// "3 hours ago", "in 1 minute"
    #[default]
    Long,
    /// "3h ago", "in 1m"
    Narrow,
}

/// English phrasing, modelled on `Intl.RelativeTimeFormat("en")`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EnglishPhrases {
    pub numeric: Numeric,
    pub style: PhraseStyle,
}

impl EnglishPhrases {
    pub fn new(numeric: Numeric, style: PhraseStyle) -> Self {
        Self { numeric, style }
    }

    fn idiom(value: i64, unit: TimeUnit) -> Option<&'static str> {
        let word = match (unit, value) {
            (TimeUnit::Second, 0) => "now",
            (TimeUnit::Minute, 0) => "this minute",
            (TimeUnit::Hour, 0) => "this hour",
            (TimeUnit::Day, -1) => "yesterday",
            (TimeUnit::Day, 0) => "today",
            (TimeUnit::Day, 1) => "tomorrow",
            (TimeUnit::Week, -1) => "last week",
            (TimeUnit::Week, 0) => "this week",
            (TimeUnit::Week, 1) => "next week",
            (TimeUnit::Month, -1) => "last month",
            (TimeUnit::Month, 0) => "this month",
            (TimeUnit::Month, 1) => "next month",
            (TimeUnit::Year, -1) => "last year",
            (TimeUnit::Year, 0) => "this year",
            (TimeUnit::Year, 1) => "next year",
            _ => return None,
        };
        Some(word)
    }

    fn quantity(&self, count: u64, unit: TimeUnit) -> String {
        match self.style {
            PhraseStyle::Long => {
                let plural = if count == 1 { "" } else { "s" };
                format!("{count} {unit}{plural}")
            }
            PhraseStyle::Narrow => {
                let suffix = match unit {
                    TimeUnit::Second => "s",
                    TimeUnit::Minute => "m",
                    TimeUnit::Hour => "h",
                    TimeUnit::Day => "d",
                    TimeUnit::Week => "w",
                    TimeUnit::Month => "mo",
                    TimeUnit::Year => "y",
                };
                format!("{count}{suffix}")
            }
        }
    }
}

impl RelativePhrases for EnglishPhrases {
    fn format(&self, value: i64, unit: TimeUnit) -> String {
        if self.numeric == Numeric::Auto
            && let Some(word) = Self::idiom(value, unit)
        {
            return word.to_string();
        }

        let quantity = self.quantity(value.unsigned_abs(), unit);
        // Zero reads as future, the same way Intl does it ("in 0 seconds").
        if value < 0 {
            format!("{quantity} ago")
        } else {
            format!("in {quantity}")
        }
    }
}
