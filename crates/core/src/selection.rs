//! User-driven filter selection, validated before any computation runs.

use crate::error::{HeliosError, HeliosResult};
use crate::types::Dataset;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// Inclusive calendar range. `start <= end` holds for every constructed value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "DateBounds")]
pub struct DateRange {
    start: NaiveDate,
    end: NaiveDate,
}

/// Unchecked wire form; deserialised ranges go through [`DateRange::new`].
#[derive(Deserialize)]
struct DateBounds {
    start: NaiveDate,
    end: NaiveDate,
}

impl TryFrom<DateBounds> for DateRange {
    type Error = HeliosError;

    fn try_from(bounds: DateBounds) -> HeliosResult<Self> {
        Self::new(bounds.start, bounds.end)
    }
}

impl DateRange {
    pub fn new(start: NaiveDate, end: NaiveDate) -> HeliosResult<Self> {
        if start > end {
            return Err(HeliosError::InvalidSelection(format!(
                "start date {start} is after end date {end}"
            )));
        }
        Ok(Self { start, end })
    }

    /// Build from a date-picker value, which must hold exactly two dates.
    pub fn from_picked(dates: &[NaiveDate]) -> HeliosResult<Self> {
        match dates {
            [start, end] => Self::new(*start, *end),
            other => Err(HeliosError::InvalidSelection(format!(
                "expected a start and an end date, got {} date(s)",
                other.len()
            ))),
        }
    }

    pub fn single_day(day: NaiveDate) -> Self {
        Self {
            start: day,
            end: day,
        }
    }

    pub fn start(&self) -> NaiveDate {
        self.start
    }

    pub fn end(&self) -> NaiveDate {
        self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Inclusive number of days; always at least 1.
    pub fn total_days(&self) -> i64 {
        (self.end - self.start).num_days() + 1
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterSelection {
    pub platforms: BTreeSet<String>,
    pub personas: BTreeSet<String>,
    pub date_range: DateRange,
}

impl FilterSelection {
    pub fn new<P, Q>(platforms: P, personas: Q, date_range: DateRange) -> Self
    where
        P: IntoIterator,
        P::Item: Into<String>,
        Q: IntoIterator,
        Q::Item: Into<String>,
    {
        Self {
            platforms: platforms.into_iter().map(Into::into).collect(),
            personas: personas.into_iter().map(Into::into).collect(),
            date_range,
        }
    }

    /// Everything selected: all platforms, all personas, and the full span of
    /// tracking dates.
    pub fn defaults_for(dataset: &Dataset) -> HeliosResult<Self> {
        let (min, max) = dataset.tracking_date_bounds().ok_or_else(|| {
            HeliosError::InvalidSelection("no tracking events to derive a date range from".into())
        })?;
        Ok(Self::new(
            dataset.platforms(),
            dataset.personas(),
            DateRange::new(min, max)?,
        ))
    }

    pub fn with_date_range(mut self, date_range: DateRange) -> Self {
        self.date_range = date_range;
        self
    }

    pub fn matches(&self, platform: &str, persona: &str) -> bool {
        self.platforms.contains(platform) && self.personas.contains(persona)
    }
}
