use serde::Serialize;
use std::time::Duration;

use super::phrases::RelativePhrases;
use super::units::{TimeUnit, UnitTable};

/// Largest delay a 32-bit signed millisecond timer can hold.
pub const MAX_TIMER_DELAY_MS: u64 = 2_147_483_647;

/// Past diffs below this many milliseconds render as the zero-second phrase.
pub const JUST_NOW_WINDOW_MS: i128 = 1_000;

/// A relative phrase plus how long it stays accurate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RelativeTime {
    pub text: String,
    pub unit: TimeUnit,
    /// Signed count handed to the phrase source (negative = past).
    pub value: i64,
    /// Always within `1..=MAX_TIMER_DELAY_MS`.
    pub next_update_ms: u64,
}

impl RelativeTime {
    pub fn next_update(&self) -> Duration {
        Duration::from_millis(self.next_update_ms)
    }
}

/// Format a unix timestamp (seconds) relative to `now_ms` (epoch milliseconds),
/// e.g. "in 5 minutes" or "2 days ago".
///
/// The returned delay is the time until the phrase would change, so a caller
/// can re-render exactly when needed.
pub fn format_relative(
    timestamp_secs: i64,
    now_ms: i64,
    table: &UnitTable,
    phrases: &impl RelativePhrases,
) -> RelativeTime {
    let diff = i128::from(now_ms) - i128::from(timestamp_secs) * 1_000;

    if (0..JUST_NOW_WINDOW_MS).contains(&diff) {
        return RelativeTime {
            text: phrases.format(0, TimeUnit::Second),
            unit: TimeUnit::Second,
            value: 0,
            next_update_ms: (JUST_NOW_WINDOW_MS - diff) as u64,
        };
    }

    let is_future = diff < 0;
    let abs_diff = diff.unsigned_abs();
    let index = table.select_index(abs_diff);
    let spec = &table.specs()[index];
    let magnitude = u128::from(spec.magnitude_ms);

    // Whole units and the remainder, i.e. the floored count and its decimals in ms.
    let whole = abs_diff / magnitude;
    let rem = abs_diff % magnitude;
    let bump_at = spec
        .rounding_proportion
        .map(|p| (p * magnitude as f64).ceil() as u128);
    let bumped = whole > 0 && bump_at.is_some_and(|b| rem >= b);

    let count = if whole == 0 {
        1
    } else {
        whole + u128::from(bumped)
    };

    let until_count_changes = match (is_future, whole) {
        (false, 0) => bump_at.unwrap_or(magnitude),
        (false, _) => match bump_at {
            Some(b) if rem < b => b - rem,
            _ => magnitude - rem,
        },
        // Sub-unit futures hold "in 1 unit" until the instant itself.
        (true, 0) => abs_diff,
        (true, _) => match bump_at {
            Some(b) if bumped => rem - b,
            _ => rem,
        },
    };

    // Past diffs grow into the next unit; future diffs shrink out of this one.
    let until_unit_changes = if is_future {
        let threshold = u128::from(spec.threshold_ms());
        if abs_diff > threshold {
            abs_diff - threshold
        } else {
            abs_diff
        }
    } else {
        table
            .specs()
            .get(index + 1)
            .map_or(u128::MAX, |next| u128::from(next.threshold_ms()) + 1 - abs_diff)
    };

    let count = i64::try_from(count).unwrap_or(i64::MAX);
    let value = if is_future { count } else { -count };
    let next_update_ms = clamp_delay(until_count_changes.min(until_unit_changes));

    tracing::trace!(
        diff = %diff,
        unit = %spec.unit,
        value,
        next_update_ms,
        "relative time"
    );

    RelativeTime {
        text: phrases.format(value, spec.unit),
        unit: spec.unit,
        value,
        next_update_ms,
    }
}

/// [`format_relative`] against the current wall clock.
pub fn format_relative_now(
    timestamp_secs: i64,
    table: &UnitTable,
    phrases: &impl RelativePhrases,
) -> RelativeTime {
    format_relative(timestamp_secs, now_ms(), table, phrases)
}

/// Current time as epoch milliseconds.
pub fn now_ms() -> i64 {
    jiff::Timestamp::now().as_millisecond()
}

fn clamp_delay(delay_ms: u128) -> u64 {
    u64::try_from(delay_ms)
        .unwrap_or(u64::MAX)
        .clamp(1, MAX_TIMER_DELAY_MS)
}
