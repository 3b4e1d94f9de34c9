//! Energy-consumption data types.

use crate::stats::group_means;
use chrono::NaiveDateTime;

/// Record as read from the input table, before its timestamp is parsed.
#[derive(Debug, Clone, PartialEq)]
pub struct RawRecord {
    pub timestamp: String,
    pub kwh: f64,
}

impl RawRecord {
    pub fn new<S: Into<String>>(timestamp: S, kwh: f64) -> Self {
        Self {
            timestamp: timestamp.into(),
            kwh,
        }
    }
}

/// Single timestamped energy-consumption sample.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reading {
    pub timestamp: NaiveDateTime,
    pub kwh: f64,
}

impl Reading {
    pub fn new(timestamp: NaiveDateTime, kwh: f64) -> Self {
        Self { timestamp, kwh }
    }
}

/// Readings with unique timestamps, sorted in ascending order.
///
/// A `Series` is never modified after construction; filtering returns a new one.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    readings: Vec<Reading>,
}

impl Series {
    /// Build a series from unordered readings.
    ///
    /// Readings sharing a timestamp are replaced by a single reading holding their mean.
    pub fn from_readings<I: IntoIterator<Item = Reading>>(readings: I) -> Self {
        let readings = group_means(readings.into_iter().map(|r| (r.timestamp, r.kwh)))
            .into_iter()
            .map(|(timestamp, kwh)| Reading::new(timestamp, kwh))
            .collect();
        Self { readings }
    }

    pub fn readings(&self) -> &[Reading] {
        &self.readings
    }

    pub fn len(&self) -> usize {
        self.readings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.readings.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Reading> {
        self.readings.iter()
    }

    pub fn values(&self) -> Vec<f64> {
        self.readings.iter().map(|r| r.kwh).collect()
    }

    /// Readings with `start <= timestamp < end`.
    pub fn range(&self, start: NaiveDateTime, end: NaiveDateTime) -> &[Reading] {
        let lo = self.readings.partition_point(|r| r.timestamp < start);
        let hi = self.readings.partition_point(|r| r.timestamp < end).max(lo);
        &self.readings[lo..hi]
    }

    /// New series holding the readings whose value satisfies `keep`.
    pub fn retain_values<F: Fn(f64) -> bool>(&self, keep: F) -> Self {
        let readings = self
            .readings
            .iter()
            .copied()
            .filter(|r| keep(r.kwh))
            .collect();
        Self { readings }
    }
}
