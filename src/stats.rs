//! Statistical summary primitives over one entity's observation series.
//!
//! Every function here is a pure function of its input slice, so entities can
//! be summarized in any order with identical results.

use std::collections::BTreeMap;
use std::ops::Range;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Timelike, Utc};

use tracing::warn;

use crate::analyzers::utility::{mean, stddev};
use crate::grouping::Observation;

/// Hours of the day (UTC) treated as peak; everything else is off-peak.
pub const PEAK_HOURS: Range<usize> = 8..20;

pub const HOURS_PER_DAY: usize = 24;

/// Central tendency and dispersion of a non-empty series.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SeriesStats {
    pub avg: f64,
    pub min: f64,
    pub max: f64,
    /// Upper-middle element of the sorted series (`sorted[n / 2]`); even-length
    /// series are not averaged.
    pub median: f64,
    /// Population standard deviation.
    pub std_dev: f64,
}

impl SeriesStats {
    /// Returns `None` for an empty series.
    pub fn from_values(values: &[f64]) -> Option<Self> {
        if values.is_empty() {
            return None;
        }

        let avg = mean(values);
        let mut sorted = values.to_vec();
        sorted.sort_by(f64::total_cmp);

        Some(Self {
            avg,
            min: sorted[0],
            max: sorted[sorted.len() - 1],
            median: sorted[sorted.len() / 2],
            std_dev: stddev(values, avg),
        })
    }
}

/// What an hour without observations reports in an hourly profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EmptyHour {
    /// Fall back to the series' overall average (price profiles).
    Fill(f64),
    /// Report zero (half-hourly carbon profiles).
    Zero,
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
    "%Y/%m/%d %H:%M:%S",
    "%Y/%m/%d %H:%M",
];

// `%#z` accepts `+00`, `+0000` and `+00:00`.
const OFFSET_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S%#z",
    "%Y-%m-%dT%H:%M:%S%#z",
    "%Y-%m-%d %H:%M:%S%.f%#z",
    "%Y-%m-%dT%H:%M:%S%.f%#z",
];

const NAIVE_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

/// Extracts the UTC hour of day from an ISO-like timestamp.
///
/// Timestamps without an offset are taken to be UTC already. A bare date is
/// midnight. Returns `None` when the text is not a recognisable date-time.
pub fn utc_hour(timestamp: &str) -> Option<usize> {
    let ts = timestamp.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(ts) {
        return Some(dt.with_timezone(&Utc).hour() as usize);
    }
    for format in OFFSET_DATETIME_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(ts, format) {
            return Some(dt.with_timezone(&Utc).hour() as usize);
        }
    }
    for format in NAIVE_DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(ts, format) {
            return Some(dt.hour() as usize);
        }
    }
    for format in NAIVE_DATE_FORMATS {
        if NaiveDate::parse_from_str(ts, format).is_ok() {
            return Some(0);
        }
    }

    None
}

/// Averages observations per UTC hour of day.
///
/// Observations whose timestamp has no readable hour are left out of the
/// profile only.
pub fn hourly_profile(observations: &[Observation], empty: EmptyHour) -> [f64; HOURS_PER_DAY] {
    let mut sums = [0.0; HOURS_PER_DAY];
    let mut counts = [0usize; HOURS_PER_DAY];
    let mut unreadable = Vec::new();

    for obs in observations {
        match utc_hour(&obs.timestamp) {
            Some(hour) => {
                sums[hour] += obs.value;
                counts[hour] += 1;
            }
            None => unreadable.push(obs.timestamp.as_str()),
        }
    }
    if let Some(first) = unreadable.first() {
        warn!(
            unreadable = unreadable.len(),
            total = observations.len(),
            example = %first,
            "Observations without a readable hour left out of the hourly profile"
        );
    }

    let mut profile = [0.0; HOURS_PER_DAY];
    for hour in 0..HOURS_PER_DAY {
        profile[hour] = if counts[hour] > 0 {
            sums[hour] / counts[hour] as f64
        } else {
            match empty {
                EmptyHour::Fill(value) => value,
                EmptyHour::Zero => 0.0,
            }
        };
    }
    profile
}

/// Peak and off-peak averages of an hourly profile.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakSplit {
    pub peak_avg: f64,
    pub off_peak_avg: f64,
}

impl PeakSplit {
    pub fn from_profile(profile: &[f64; HOURS_PER_DAY]) -> Self {
        let peak: Vec<f64> = profile[PEAK_HOURS].to_vec();
        let off_peak: Vec<f64> = profile[..PEAK_HOURS.start]
            .iter()
            .chain(&profile[PEAK_HOURS.end..])
            .copied()
            .collect();

        Self {
            peak_avg: mean(&peak),
            off_peak_avg: mean(&off_peak),
        }
    }

    /// Peak minus off-peak: the value of moving one unit of demand out of the peak.
    pub fn spread(&self) -> f64 {
        self.peak_avg - self.off_peak_avg
    }
}

/// How a source encodes the year in its timestamp column.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum YearKey {
    /// The first four characters (`2024-01-01 00:00`).
    Prefix,
    /// Everything before the first `/` (`2024/01/01`).
    BeforeSlash,
}

impl YearKey {
    pub fn extract<'a>(&self, timestamp: &'a str) -> &'a str {
        match self {
            YearKey::Prefix => match timestamp.char_indices().nth(4) {
                Some((end, _)) => &timestamp[..end],
                None => timestamp,
            },
            YearKey::BeforeSlash => timestamp.split('/').next().unwrap_or(timestamp),
        }
    }
}

/// Averages observations per year, keyed and ordered by the year string.
pub fn yearly_means(observations: &[Observation], key: YearKey) -> BTreeMap<String, f64> {
    let mut buckets: BTreeMap<String, (f64, usize)> = BTreeMap::new();
    for obs in observations {
        let bucket = buckets
            .entry(key.extract(&obs.timestamp).to_string())
            .or_default();
        bucket.0 += obs.value;
        bucket.1 += 1;
    }

    buckets
        .into_iter()
        .map(|(year, (sum, count))| (year, sum / count as f64))
        .collect()
}

/// Mean of the last `window` values (fewer when the series is shorter).
pub fn trailing_mean(values: &[f64], window: usize) -> f64 {
    let start = values.len().saturating_sub(window);
    mean(&values[start..])
}
