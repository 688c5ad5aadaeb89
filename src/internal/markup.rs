use once_cell::sync::Lazy;
use regex::Regex;
use std::ops::Range;
use std::time::Duration;

use super::error::TimestampError;
use super::models::{DiscordTimestamp, TimestampStyle};
use super::render::TimestampRenderer;
use crate::utils::phrases::RelativePhrases;

static TIMESTAMP_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"<t:(-?\d+)(?::([A-Za-z]))?>").expect("timestamp markup regex is valid")
});

/// A `<t:…>` token found in message text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkupToken {
    /// Byte range of the whole token in the source text.
    pub span: Range<usize>,
    pub timestamp: DiscordTimestamp,
}

/// Message text with every timestamp token replaced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderedMarkup {
    pub text: String,
    /// Earliest point at which any relative token goes stale.
    pub next_update: Option<Duration>,
}

/// Find every well-formed timestamp token in `text`.
///
/// Tokens with an unknown style letter or seconds that overflow `i64` are not
/// timestamps as far as Discord is concerned and are skipped.
pub fn parse_markup(text: &str) -> Vec<MarkupToken> {
    TIMESTAMP_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let whole = caps.get(0)?;
            let seconds = caps[1].parse::<i64>().ok()?;
            let style = match caps.get(2) {
                Some(code) => code.as_str().parse::<TimestampStyle>().ok()?,
                None => TimestampStyle::default(),
            };
            Some(MarkupToken {
                span: whole.range(),
                timestamp: DiscordTimestamp::new(seconds, style),
            })
        })
        .collect()
}

/// Replace every timestamp token in `text` with its rendering at `now_ms`.
pub fn render_markup<P: RelativePhrases>(
    text: &str,
    renderer: &TimestampRenderer<P>,
    now_ms: i64,
) -> RenderedMarkup {
    let mut out = String::with_capacity(text.len());
    let mut next_update: Option<Duration> = None;
    let mut cursor = 0;

    for token in parse_markup(text) {
        out.push_str(&text[cursor..token.span.start]);
        match renderer.render(&token.timestamp, now_ms) {
            Ok(rendered) => {
                out.push_str(&rendered.text);
                next_update = match (next_update, rendered.next_update) {
                    (Some(a), Some(b)) => Some(a.min(b)),
                    (a, b) => a.or(b),
                };
            }
            Err(e @ TimestampError::OutOfRange { .. }) => {
                tracing::warn!("Leaving timestamp token as-is: {}", e);
                out.push_str(&text[token.span.clone()]);
            }
            Err(e) => {
                tracing::error!("Failed to render timestamp token: {}", e);
                out.push_str(&text[token.span.clone()]);
            }
        }
        cursor = token.span.end;
    }
    out.push_str(&text[cursor..]);

    RenderedMarkup {
        text: out,
        next_update,
    }
}
