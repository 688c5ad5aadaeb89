use jiff::Timestamp;
use jiff::tz::TimeZone;

use super::error::{TimestampError, TimestampResult};
use super::models::{DiscordTimestamp, Rendered};
use crate::utils::datetime::{format_relative, now_ms};
use crate::utils::phrases::{EnglishPhrases, RelativePhrases};
use crate::utils::units::UnitTable;

/// Renders [`DiscordTimestamp`]s the way the Discord client shows them.
#[derive(Debug, Clone)]
pub struct TimestampRenderer<P = EnglishPhrases> {
    time_zone: TimeZone,
    table: UnitTable,
    phrases: P,
}

impl Default for TimestampRenderer {
    fn default() -> Self {
        Self::new(TimeZone::system(), UnitTable::discord(), EnglishPhrases::default())
    }
}

impl<P: RelativePhrases> TimestampRenderer<P> {
    pub fn new(time_zone: TimeZone, table: UnitTable, phrases: P) -> Self {
        Self {
            time_zone,
            table,
            phrases,
        }
    }

    /// Render `timestamp` as seen at `now_ms` (epoch milliseconds).
    #[tracing::instrument(level = "debug", skip(self), fields(style = %timestamp.style))]
    pub fn render(&self, timestamp: &DiscordTimestamp, now_ms: i64) -> TimestampResult<Rendered> {
        let instant = Timestamp::from_second(timestamp.seconds).map_err(|source| {
            TimestampError::OutOfRange {
                seconds: timestamp.seconds,
                source,
            }
        })?;

        let Some(pattern) = timestamp.style.pattern() else {
            let relative = format_relative(timestamp.seconds, now_ms, &self.table, &self.phrases);
            return Ok(Rendered {
                next_update: Some(relative.next_update()),
                text: relative.text,
            });
        };

        let zoned = instant.to_zoned(self.time_zone.clone());
        Ok(Rendered {
            text: zoned.strftime(pattern).to_string(),
            next_update: None,
        })
    }

    pub fn render_now(&self, timestamp: &DiscordTimestamp) -> TimestampResult<Rendered> {
        self.render(timestamp, now_ms())
    }
}

/// Resolve an IANA zone name, or the system zone when `name` is `None`.
pub fn resolve_time_zone(name: Option<&str>) -> TimestampResult<TimeZone> {
    match name {
        None => Ok(TimeZone::system()),
        Some("UTC") | Some("utc") => Ok(TimeZone::UTC),
        Some(name) => TimeZone::get(name).map_err(|source| TimestampError::InvalidTimeZone {
            name: name.to_string(),
            source,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::internal::models::TimestampStyle;
    use std::time::Duration;

    // Tuesday, April 20, 2021 21:20:30 UTC
    const SECONDS: i64 = 1_618_953_630;

    fn utc() -> TimestampRenderer {
        TimestampRenderer::new(TimeZone::UTC, UnitTable::discord(), EnglishPhrases::default())
    }

    fn text(renderer: &TimestampRenderer, style: TimestampStyle) -> String {
        renderer
            .render(&DiscordTimestamp::new(SECONDS, style), SECONDS * 1_000)
            .unwrap()
            .text
    }

    #[test]
    fn absolute_styles_in_utc() {
        let r = utc();
        assert_eq!(text(&r, TimestampStyle::ShortTime), "9:20 PM");
        assert_eq!(text(&r, TimestampStyle::LongTime), "9:20:30 PM");
        assert_eq!(text(&r, TimestampStyle::ShortDate), "04/20/2021");
        assert_eq!(text(&r, TimestampStyle::LongDate), "April 20, 2021");
        assert_eq!(
            text(&r, TimestampStyle::ShortDateTime),
            "April 20, 2021 at 9:20 PM"
        );
        assert_eq!(
            text(&r, TimestampStyle::LongDateTime),
            "Tuesday, April 20, 2021 at 9:20 PM"
        );
    }

    #[test]
    fn absolute_styles_follow_time_zone() {
        let offset = jiff::tz::offset(-5);
        let r = TimestampRenderer::new(
            TimeZone::fixed(offset),
            UnitTable::discord(),
            EnglishPhrases::default(),
        );
        assert_eq!(text(&r, TimestampStyle::ShortTime), "4:20 PM");
    }

    #[test]
    fn absolute_styles_never_refresh() {
        let rendered = utc()
            .render(&DiscordTimestamp::new(SECONDS, TimestampStyle::LongDate), 0)
            .unwrap();
        assert_eq!(rendered.next_update, None);
    }

    #[test]
    fn relative_style_carries_next_update() {
        let rendered = utc()
            .render(
                &DiscordTimestamp::new(SECONDS, TimestampStyle::Relative),
                SECONDS * 1_000 + 90_000,
            )
            .unwrap();
        assert_eq!(rendered.text, "1 minute ago");
        assert_eq!(rendered.next_update, Some(Duration::from_secs(30)));
    }

    #[test]
    fn out_of_range_seconds_are_rejected() {
        let err = utc()
            .render(&DiscordTimestamp::new(i64::MAX, TimestampStyle::ShortTime), 0)
            .unwrap_err();
        assert!(matches!(err, TimestampError::OutOfRange { seconds, .. } if seconds == i64::MAX));
    }

    #[test]
    fn resolves_utc_without_tzdb() {
        assert!(resolve_time_zone(Some("UTC")).is_ok());
        assert!(matches!(
            resolve_time_zone(Some("Not/AZone")),
            Err(TimestampError::InvalidTimeZone { .. })
        ));
    }
}
