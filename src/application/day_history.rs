// Per-day history view state
use crate::application::speedtest_api::ApiError;
use crate::domain::dashboard::{table_rows, TableRow};
use crate::domain::sample::{Sample, Series};
use chrono::{NaiveDate, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum DayState {
    Loading,
    NoData,
    Loaded { series: Series, table: Vec<TableRow> },
    Failed(String),
}

#[derive(Debug, Clone)]
pub struct DayHistory {
    date: NaiveDate,
    state: DayState,
}

impl DayHistory {
    pub fn new(date: NaiveDate) -> Self {
        Self {
            date,
            state: DayState::Loading,
        }
    }

    pub fn today() -> Self {
        Self::new(Utc::now().date_naive())
    }

    pub fn date(&self) -> NaiveDate {
        self.date
    }

    pub fn state(&self) -> &DayState {
        &self.state
    }

    /// Switch to `date`; the caller fetches it.
    pub fn select(&mut self, date: NaiveDate) {
        self.date = date;
        self.state = DayState::Loading;
    }

    pub fn previous_day(&self) -> Option<NaiveDate> {
        self.date.pred_opt()
    }

    pub fn next_day(&self) -> Option<NaiveDate> {
        self.date.succ_opt()
    }

    /// Apply a fetch result. Results for a date that is no longer selected
    /// are dropped and `false` is returned.
    pub fn apply(&mut self, date: NaiveDate, result: Result<Vec<Sample>, ApiError>) -> bool {
        if date != self.date {
            tracing::debug!("Dropping stale day history for {}", date);
            return false;
        }

        self.state = match result {
            Ok(samples) if samples.is_empty() => DayState::NoData,
            Ok(samples) => {
                let series = Series::from_ascending(samples);
                let table = table_rows(&series);
                DayState::Loaded { series, table }
            }
            Err(e) => {
                tracing::error!("Error fetching history for {}: {}", date, e);
                DayState::Failed("Could not load history for this day.".to_string())
            }
        };
        true
    }
}
