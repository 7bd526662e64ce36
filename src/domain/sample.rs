// Speed-test sample and series domain models
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;

const TIMESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%d %H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S%.f"];

/// One speed-test measurement as returned by the backend.
///
/// Measurement fields are `None` when the backend recorded a failed test.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Sample {
    #[serde(default)]
    pub id: Option<i64>,
    pub timestamp: String,
    #[serde(default)]
    pub download: Option<f64>,
    #[serde(default)]
    pub upload: Option<f64>,
    #[serde(default)]
    pub ping: Option<f64>,
}

impl Sample {
    #[cfg(test)]
    pub fn new(timestamp: impl Into<String>, download: f64, upload: f64, ping: f64) -> Self {
        Self {
            id: None,
            timestamp: timestamp.into(),
            download: Some(download),
            upload: Some(upload),
            ping: Some(ping),
        }
    }

    /// The instant this sample was taken, reading the naive timestamp as UTC.
    pub fn instant(&self) -> Option<DateTime<Utc>> {
        parse_utc_timestamp(&self.timestamp)
    }
}

/// Parse a naive backend timestamp ("2024-05-01 10:00:00") as a UTC instant.
pub fn parse_utc_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    TIMESTAMP_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| naive.and_utc())
}

/// Samples in chronological order, oldest first.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Series {
    samples: Vec<Sample>,
}

impl Series {
    /// Build from a backend history response, which is most-recent-first.
    pub fn from_recent_first(mut samples: Vec<Sample>) -> Self {
        samples.reverse();
        Self { samples }
    }

    /// Build from samples that are already oldest-first (day history).
    pub fn from_ascending(samples: Vec<Sample>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }

    pub fn samples(&self) -> &[Sample] {
        &self.samples
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.samples.last()
    }

    #[cfg(test)]
    pub fn get(&self, index: usize) -> Option<&Sample> {
        self.samples.get(index)
    }

    /// Iterate newest first, the order tables are rendered in.
    pub fn newest_first(&self) -> impl Iterator<Item = &Sample> {
        self.samples.iter().rev()
    }
}
