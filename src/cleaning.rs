use crate::model::{RawRecord, Reading, Series};
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// Timestamp layout of the input data (`DD-MM-YYYY HH:MM`).
pub const TIMESTAMP_FORMAT: &str = "%d-%m-%Y %H:%M";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
#[error("invalid timestamp {input:?} in record {index} (expected DD-MM-YYYY HH:MM)")]
pub struct ParseError {
    pub index: usize,
    pub input: String,
    #[source]
    pub source: chrono::ParseError,
}

/// Sampling resolution an outlier regime is tuned for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    SubHourly,
    Daily,
}

impl Resolution {
    /// Exclusive `(low, high)` bounds of plausible readings, in kWh.
    pub fn bounds(self) -> (f64, f64) {
        match self {
            Self::SubHourly => (0.001, 1.0),
            Self::Daily => (2.0, 7.0),
        }
    }

    pub fn contains(self, kwh: f64) -> bool {
        let (low, high) = self.bounds();
        kwh > low && kwh < high
    }
}

/// Selects which outlier regimes to apply. Both may be enabled at once.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutlierFilter {
    pub sub_hourly: bool,
    pub daily: bool,
}

impl OutlierFilter {
    pub const NONE: Self = Self {
        sub_hourly: false,
        daily: false,
    };
    #[cfg(test)]
    pub const SUB_HOURLY: Self = Self {
        sub_hourly: true,
        daily: false,
    };
    pub const DAILY: Self = Self {
        sub_hourly: false,
        daily: true,
    };

    fn resolutions(self) -> impl Iterator<Item = Resolution> {
        [
            (self.sub_hourly, Resolution::SubHourly),
            (self.daily, Resolution::Daily),
        ]
        .into_iter()
        .filter_map(|(enabled, res)| enabled.then_some(res))
    }

    pub fn keeps(self, kwh: f64) -> bool {
        self.resolutions().all(|res| res.contains(kwh))
    }
}

impl Default for OutlierFilter {
    fn default() -> Self {
        Self::NONE
    }
}

pub fn parse_timestamp(input: &str) -> Result<NaiveDateTime, chrono::ParseError> {
    NaiveDateTime::parse_from_str(input, TIMESTAMP_FORMAT)
}

pub fn format_timestamp(timestamp: &NaiveDateTime) -> String {
    timestamp.format(TIMESTAMP_FORMAT).to_string()
}

/// Parse every record, stopping at the first malformed timestamp.
pub fn parse_records(records: &[RawRecord]) -> Result<Vec<Reading>, ParseError> {
    records
        .iter()
        .enumerate()
        .map(|(index, rec)| {
            parse_timestamp(&rec.timestamp)
                .map(|timestamp| Reading::new(timestamp, rec.kwh))
                .map_err(|source| ParseError {
                    index,
                    input: rec.timestamp.clone(),
                    source,
                })
        })
        .collect()
}

/// New series without the readings rejected by `filter`.
pub fn remove_outliers(series: &Series, filter: OutlierFilter) -> Series {
    series.retain_values(|kwh| filter.keeps(kwh))
}

/// Parse, deduplicate, sort and filter raw records into a [`Series`].
pub fn clean(records: &[RawRecord], filter: OutlierFilter) -> Result<Series, ParseError> {
    let readings = parse_records(records)?;
    let series = Series::from_readings(readings);
    let cleaned = remove_outliers(&series, filter);
    log::debug!(
        "cleaned {} records into {} readings ({} outliers removed)",
        records.len(),
        cleaned.len(),
        series.len() - cleaned.len()
    );
    Ok(cleaned)
}
