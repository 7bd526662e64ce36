// Summary cards and history table derived from a series
use super::format::{format_magnitude, format_ping, format_time_label, PLACEHOLDER};
use super::sample::{Sample, Series};

#[derive(Debug, Clone, PartialEq)]
pub struct Card {
    pub title: &'static str,
    pub value: String,
    pub unit: &'static str,
}

impl Card {
    fn new(title: &'static str, value: String, unit: &'static str) -> Self {
        Self { title, value, unit }
    }
}

/// Download, upload and ping cards.
#[derive(Debug, Clone, PartialEq)]
pub struct Cards {
    pub download: Card,
    pub upload: Card,
    pub ping: Card,
}

impl Cards {
    pub fn empty() -> Self {
        Self {
            download: Card::new("Download", PLACEHOLDER.to_string(), "Mbps"),
            upload: Card::new("Upload", PLACEHOLDER.to_string(), "Mbps"),
            ping: Card::new("Ping", PLACEHOLDER.to_string(), "ms"),
        }
    }

    pub fn from_latest(latest: &Sample) -> Self {
        Self {
            download: Card::new("Download", format_magnitude(latest.download, 1), "Mbps"),
            upload: Card::new("Upload", format_magnitude(latest.upload, 1), "Mbps"),
            ping: Card::new("Ping", format_ping(latest.ping), "ms"),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Card> {
        [&self.download, &self.upload, &self.ping].into_iter()
    }
}

impl Default for Cards {
    fn default() -> Self {
        Self::empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableRow {
    pub time: String,
    pub download: String,
    pub upload: String,
    pub ping: String,
}

impl TableRow {
    pub fn from_sample(sample: &Sample) -> Self {
        Self {
            time: format_time_label(&sample.timestamp),
            download: format_magnitude(sample.download, 2),
            upload: format_magnitude(sample.upload, 2),
            ping: format_magnitude(sample.ping, 2),
        }
    }
}

/// Table rows, most recent first.
pub fn table_rows(series: &Series) -> Vec<TableRow> {
    series.newest_first().map(TableRow::from_sample).collect()
}
