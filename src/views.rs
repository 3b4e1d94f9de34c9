//! Aggregate views derived from a cleaned [`Series`].
//!
//! Every view is a deterministic reduction; an empty series yields an empty view.

use crate::model::{Reading, Series};
use crate::stats::group_means;
use chrono::{Datelike, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta};
use std::collections::{BTreeMap, BTreeSet};

/// Mean consumption per clock time, ordered by time.
pub type TimeOfDayView = BTreeMap<NaiveTime, f64>;

pub fn time_of_day_average(series: &Series) -> TimeOfDayView {
    group_means(series.iter().map(|r| (r.timestamp.time(), r.kwh)))
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum DayType {
    Weekday,
    Weekend,
}

impl DayType {
    /// Monday to Friday are weekdays.
    pub fn of(timestamp: &NaiveDateTime) -> Self {
        if timestamp.weekday().num_days_from_monday() < 5 {
            Self::Weekday
        } else {
            Self::Weekend
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Weekday => "Weekday",
            Self::Weekend => "Weekend",
        }
    }
}

/// Time-of-day averages computed separately for weekdays and weekends.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayTypeSplit {
    pub weekday: TimeOfDayView,
    pub weekend: TimeOfDayView,
}

impl DayTypeSplit {
    pub fn get(&self, day_type: DayType) -> &TimeOfDayView {
        match day_type {
            DayType::Weekday => &self.weekday,
            DayType::Weekend => &self.weekend,
        }
    }

    /// Union of the time slots of both day types.
    pub fn time_axis(&self) -> BTreeSet<NaiveTime> {
        self.weekday
            .keys()
            .chain(self.weekend.keys())
            .copied()
            .collect()
    }
}

pub fn day_type_split(series: &Series) -> DayTypeSplit {
    let means = group_means(
        series
            .iter()
            .map(|r| ((DayType::of(&r.timestamp), r.timestamp.time()), r.kwh)),
    );

    let mut split = DayTypeSplit::default();
    for ((day_type, time), mean) in means {
        match day_type {
            DayType::Weekday => split.weekday.insert(time, mean),
            DayType::Weekend => split.weekend.insert(time, mean),
        };
    }
    split
}

/// Category labels mapped to an aggregate value, in the order they were given.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Composition {
    entries: Vec<(String, f64)>,
}

impl Composition {
    pub fn new<L, I>(entries: I) -> Self
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, f64)>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(label, val)| (label.into(), val))
                .collect(),
        }
    }

    pub fn entries(&self) -> &[(String, f64)] {
        &self.entries
    }
}

const WEEKDAY_NAMES: [&str; 7] = [
    "Monday",
    "Tuesday",
    "Wednesday",
    "Thursday",
    "Friday",
    "Saturday",
    "Sunday",
];

/// Mean consumption per day of the week, Monday first.
pub fn weekday_average(series: &Series) -> Composition {
    let means = group_means(
        series
            .iter()
            .map(|r| (r.timestamp.weekday().num_days_from_monday(), r.kwh)),
    );
    Composition::new(
        means
            .into_iter()
            .filter_map(|(idx, mean)| Some((*WEEKDAY_NAMES.get(idx as usize)?, mean))),
    )
}

/// One reading per calendar day, stamped at midnight, holding the day's total.
pub fn daily_totals(series: &Series) -> Series {
    let days: BTreeSet<NaiveDate> = series.iter().map(|r| r.timestamp.date()).collect();
    Series::from_readings(days.into_iter().map(|day| {
        let start = day.and_time(NaiveTime::default());
        let end = start + TimeDelta::days(1);
        let total = series.range(start, end).iter().map(|r| r.kwh).sum();
        Reading::new(start, total)
    }))
}
