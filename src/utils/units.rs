use serde::{Deserialize, Serialize};
use strum_macros::{Display, EnumIter, EnumString};

use crate::internal::error::{TimestampError, TimestampResult};

/// Calendar-ish units a relative phrase can be expressed in.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Display,
    EnumIter,
    EnumString,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TimeUnit {
    Second,
    Minute,
    Hour,
    Day,
    Week,
    Month,
    Year,
}

/// One row of a [`UnitTable`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct UnitSpec {
    pub unit: TimeUnit,
    /// Size of one unit in milliseconds.
    pub magnitude_ms: u64,
    /// Fractional remainder at or above which the displayed count is bumped by one.
    pub rounding_proportion: Option<f64>,
    /// Absolute diff that selects this unit before its own magnitude is exceeded.
    pub min_take_ms: Option<u64>,
}

impl UnitSpec {
    pub const fn new(unit: TimeUnit, magnitude_ms: u64) -> Self {
        Self {
            unit,
            magnitude_ms,
            rounding_proportion: None,
            min_take_ms: None,
        }
    }

    pub const fn with_rounding(mut self, proportion: f64) -> Self {
        self.rounding_proportion = Some(proportion);
        self
    }

    pub const fn with_min_take(mut self, min_take_ms: u64) -> Self {
        self.min_take_ms = Some(min_take_ms);
        self
    }

    /// Diff that must be strictly exceeded for this unit to be selected.
    pub fn threshold_ms(&self) -> u64 {
        self.min_take_ms.unwrap_or(self.magnitude_ms)
    }
}

pub const SECOND_MS: u64 = 1_000;
pub const MINUTE_MS: u64 = 60 * SECOND_MS;
pub const HOUR_MS: u64 = 60 * MINUTE_MS;
pub const DAY_MS: u64 = 24 * HOUR_MS;
pub const WEEK_MS: u64 = 7 * DAY_MS;
// Discord's client counts a month as four weeks and a year as twelve of those.
pub const MONTH_MS: u64 = 4 * WEEK_MS;
pub const YEAR_MS: u64 = 12 * MONTH_MS;

const DISCORD_UNITS: [UnitSpec; 7] = [
    UnitSpec::new(TimeUnit::Second, SECOND_MS),
    UnitSpec::new(TimeUnit::Minute, MINUTE_MS),
    UnitSpec::new(TimeUnit::Hour, HOUR_MS),
    UnitSpec::new(TimeUnit::Day, DAY_MS)
        .with_rounding(0.8)
        .with_min_take(21 * HOUR_MS),
    UnitSpec::new(TimeUnit::Week, WEEK_MS),
    UnitSpec::new(TimeUnit::Month, MONTH_MS),
    UnitSpec::new(TimeUnit::Year, YEAR_MS),
];

/// Ordered unit table, ascending by magnitude.
///
/// Both the magnitudes and the selection thresholds are strictly increasing,
/// which is what keeps [`UnitTable::select`] monotonic in the diff.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitTable {
    specs: Vec<UnitSpec>,
}

impl UnitTable {
    pub fn new(specs: Vec<UnitSpec>) -> TimestampResult<Self> {
        if specs.is_empty() {
            return Err(TimestampError::InvalidUnitTable(
                "table has no units".to_string(),
            ));
        }

        for spec in &specs {
            if spec.magnitude_ms == 0 {
                return Err(TimestampError::InvalidUnitTable(format!(
                    "{} has a zero magnitude",
                    spec.unit
                )));
            }
            if let Some(p) = spec.rounding_proportion
                && !(p > 0.0 && p <= 1.0)
            {
                return Err(TimestampError::InvalidUnitTable(format!(
                    "{} rounding proportion {} is outside (0, 1]",
                    spec.unit, p
                )));
            }
        }

        for pair in specs.windows(2) {
            let (lower, upper) = (&pair[0], &pair[1]);
            if upper.magnitude_ms <= lower.magnitude_ms {
                return Err(TimestampError::InvalidUnitTable(format!(
                    "{} magnitude must exceed {}",
                    upper.unit, lower.unit
                )));
            }
            if upper.threshold_ms() <= lower.threshold_ms() {
                return Err(TimestampError::InvalidUnitTable(format!(
                    "{} threshold must exceed {}",
                    upper.unit, lower.unit
                )));
            }
        }

        Ok(Self { specs })
    }

    /// The table Discord's own client uses for `<t:…:R>` timestamps.
    pub fn discord() -> Self {
        Self {
            specs: DISCORD_UNITS.to_vec(),
        }
    }

    pub fn specs(&self) -> &[UnitSpec] {
        &self.specs
    }

    /// Coarsest unit whose threshold is strictly exceeded by `abs_diff_ms`.
    /// Falls back to the first (smallest) unit.
    pub fn select(&self, abs_diff_ms: u128) -> &UnitSpec {
        &self.specs[self.select_index(abs_diff_ms)]
    }

    /// Position of [`UnitTable::select`]'s unit in [`UnitTable::specs`].
    pub fn select_index(&self, abs_diff_ms: u128) -> usize {
        let mut selected = 0;
        for (index, spec) in self.specs.iter().enumerate() {
            if abs_diff_ms > u128::from(spec.threshold_ms()) {
                selected = index;
                continue;
            }
            break;
        }
        selected
    }
}

impl Default for UnitTable {
    fn default() -> Self {
        Self::discord()
    }
}
