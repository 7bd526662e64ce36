// Dashboard controller - Polling, manual tests and chart/brush synchronisation
use crate::application::day_history::DayHistory;
use crate::application::speedtest_api::{ApiError, SpeedTestApi, TestAck};
use crate::domain::brush::{Brush, DragMode};
use crate::domain::dashboard::{table_rows, Cards, TableRow};
use crate::domain::logs::{parse_log_lines, LogLine, LogsResponse};
use crate::domain::sample::{Sample, Series};
use crate::domain::status::SchedulerStatus;
use crate::domain::viewport::{
    brush_geometry_to_viewport, compute_default_viewport, BrushGeometry, Viewport,
};
use crate::infrastructure::config::Settings;
use chrono::NaiveDate;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};

/// Results of spawned fetches and timers, applied on the controller's loop.
#[derive(Debug)]
pub enum DashboardEvent {
    HistoryLoaded(Result<Vec<Sample>, ApiError>),
    LogsLoaded(Result<LogsResponse, ApiError>),
    StatusLoaded(Result<SchedulerStatus, ApiError>),
    TestStarted(Result<TestAck, ApiError>),
    PollAttempt { attempt: u32 },
    PollFinished,
    HistoryCleared(Result<(), ApiError>),
    LogsCleared(Result<(), ApiError>),
    DayLoaded {
        date: NaiveDate,
        result: Result<Vec<Sample>, ApiError>,
    },
    MessageExpired { generation: u64 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManualTestState {
    Idle,
    /// Trigger sent, waiting for the backend to acknowledge it.
    Armed,
    Polling { attempt: u32, attempts: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Info,
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PendingConfirmation {
    ClearHistory,
    ClearLogs,
}

impl PendingConfirmation {
    pub fn prompt(&self) -> &'static str {
        match self {
            PendingConfirmation::ClearHistory => "Delete all measurement history?",
            PendingConfirmation::ClearLogs => "Clear the system log?",
        }
    }
}

pub struct DashboardController {
    api: Arc<dyn SpeedTestApi>,
    settings: Settings,
    events: mpsc::UnboundedSender<DashboardEvent>,
    series: Series,
    viewport: Option<Viewport>,
    brush: Brush,
    cards: Cards,
    table: Vec<TableRow>,
    logs: Vec<LogLine>,
    status: Option<SchedulerStatus>,
    manual_test: ManualTestState,
    message: Option<StatusMessage>,
    message_generation: u64,
    pending: Option<PendingConfirmation>,
    day: DayHistory,
}

impl DashboardController {
    pub fn new(
        api: Arc<dyn SpeedTestApi>,
        settings: Settings,
    ) -> (Self, mpsc::UnboundedReceiver<DashboardEvent>) {
        let (events, rx) = mpsc::unbounded_channel();
        let brush = Brush::new(settings.brush.minimum_width_pct);
        let controller = Self {
            api,
            settings,
            events,
            series: Series::default(),
            viewport: None,
            brush,
            cards: Cards::empty(),
            table: Vec::new(),
            logs: Vec::new(),
            status: None,
            manual_test: ManualTestState::Idle,
            message: None,
            message_generation: 0,
            pending: None,
            day: DayHistory::today(),
        };
        (controller, rx)
    }

    pub fn series(&self) -> &Series {
        &self.series
    }

    /// The main chart's visible window; `None` shows everything.
    pub fn viewport(&self) -> Option<Viewport> {
        self.viewport
    }

    pub fn brush_geometry(&self) -> BrushGeometry {
        self.brush.geometry()
    }

    pub fn drag_mode(&self) -> Option<DragMode> {
        self.brush.drag_mode()
    }

    pub fn cards(&self) -> &Cards {
        &self.cards
    }

    pub fn table(&self) -> &[TableRow] {
        &self.table
    }

    pub fn logs(&self) -> &[LogLine] {
        &self.logs
    }

    pub fn status(&self) -> Option<&SchedulerStatus> {
        self.status.as_ref()
    }

    pub fn manual_test(&self) -> ManualTestState {
        self.manual_test
    }

    pub fn message(&self) -> Option<&StatusMessage> {
        self.message.as_ref()
    }

    pub fn pending_confirmation(&self) -> Option<PendingConfirmation> {
        self.pending
    }

    pub fn day(&self) -> &DayHistory {
        &self.day
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Initial load: history, logs, scheduler status and today's history.
    pub fn start(&mut self) {
        self.refresh();
        self.refresh_status();
        self.select_day(self.day.date());
    }

    /// Background refresh of history and logs.
    pub fn refresh(&self) {
        self.spawn_history_fetch();
        self.spawn_logs_fetch();
    }

    pub fn refresh_logs(&self) {
        self.spawn_logs_fetch();
    }

    pub fn refresh_status(&self) {
        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(DashboardEvent::StatusLoaded(api.fetch_status().await));
        });
    }

    fn spawn_history_fetch(&self) {
        let api = self.api.clone();
        let tx = self.events.clone();
        let limit = self.settings.api.history_limit;
        tokio::spawn(async move {
            let _ = tx.send(DashboardEvent::HistoryLoaded(api.fetch_history(limit).await));
        });
    }

    fn spawn_logs_fetch(&self) {
        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(DashboardEvent::LogsLoaded(api.fetch_logs().await));
        });
    }

    /// Trigger a measurement. Ignored unless idle.
    pub fn start_manual_test(&mut self) -> bool {
        if self.manual_test != ManualTestState::Idle {
            tracing::debug!("Manual test already running ({:?})", self.manual_test);
            return false;
        }

        tracing::info!("Starting manual speed test");
        self.manual_test = ManualTestState::Armed;
        self.set_message(
            MessageKind::Info,
            "Measuring... this can take about a minute.",
            None,
        );

        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let _ = tx.send(DashboardEvent::TestStarted(api.start_test().await));
        });
        true
    }

    /// Re-fetch history and logs on a fixed schedule after a trigger, since
    /// the backend never reports completion.
    fn spawn_completion_poll(&self) {
        let api = self.api.clone();
        let tx = self.events.clone();
        let attempts = self.settings.refresh.poll_attempts;
        let period = self.settings.refresh.poll_interval();
        let limit = self.settings.api.history_limit;

        tokio::spawn(async move {
            let mut ticker = interval_at(Instant::now() + period, period.max(Duration::from_millis(1)));
            for attempt in 1..=attempts {
                ticker.tick().await;
                if tx.send(DashboardEvent::PollAttempt { attempt }).is_err() {
                    return;
                }
                let _ = tx.send(DashboardEvent::HistoryLoaded(api.fetch_history(limit).await));
                let _ = tx.send(DashboardEvent::LogsLoaded(api.fetch_logs().await));
            }
            let _ = tx.send(DashboardEvent::PollFinished);
        });
    }

    pub fn request_clear_history(&mut self) {
        self.pending = Some(PendingConfirmation::ClearHistory);
    }

    pub fn request_clear_logs(&mut self) {
        self.pending = Some(PendingConfirmation::ClearLogs);
    }

    pub fn cancel_confirmation(&mut self) {
        self.pending = None;
    }

    /// Run the destructive operation the user just confirmed.
    pub fn confirm(&mut self) {
        let Some(pending) = self.pending.take() else {
            return;
        };
        tracing::info!("Confirmed: {:?}", pending);

        let api = self.api.clone();
        let tx = self.events.clone();
        match pending {
            PendingConfirmation::ClearHistory => {
                tokio::spawn(async move {
                    let _ = tx.send(DashboardEvent::HistoryCleared(api.clear_history().await));
                });
            }
            PendingConfirmation::ClearLogs => {
                tokio::spawn(async move {
                    let _ = tx.send(DashboardEvent::LogsCleared(api.clear_logs().await));
                });
            }
        }
    }

    pub fn select_day(&mut self, date: NaiveDate) {
        self.day.select(date);
        let api = self.api.clone();
        let tx = self.events.clone();
        tokio::spawn(async move {
            let result = api.fetch_history_by_day(date).await;
            let _ = tx.send(DashboardEvent::DayLoaded { date, result });
        });
    }

    pub fn previous_day(&mut self) {
        if let Some(date) = self.day.previous_day() {
            self.select_day(date);
        }
    }

    pub fn next_day(&mut self) {
        if let Some(date) = self.day.next_day() {
            self.select_day(date);
        }
    }

    pub fn handle(&mut self, event: DashboardEvent) {
        match event {
            DashboardEvent::HistoryLoaded(Ok(samples)) => {
                if samples.is_empty() {
                    tracing::debug!("History is empty, keeping current dashboard");
                } else {
                    self.update_dashboard(samples);
                }
            }
            DashboardEvent::HistoryLoaded(Err(e)) => {
                tracing::error!("Error fetching data: {}", e);
            }
            DashboardEvent::LogsLoaded(Ok(response)) => {
                self.logs = parse_log_lines(&response.logs);
            }
            DashboardEvent::LogsLoaded(Err(e)) => {
                tracing::error!("Error fetching logs: {}", e);
            }
            DashboardEvent::StatusLoaded(Ok(status)) => {
                self.status = Some(status);
            }
            DashboardEvent::StatusLoaded(Err(e)) => {
                tracing::error!("Error fetching status: {}", e);
            }
            DashboardEvent::TestStarted(Ok(ack)) => {
                tracing::info!(
                    "Manual test acknowledged: {}",
                    ack.message.as_deref().unwrap_or("-")
                );
                self.manual_test = ManualTestState::Polling {
                    attempt: 0,
                    attempts: self.settings.refresh.poll_attempts,
                };
                self.spawn_completion_poll();
            }
            DashboardEvent::TestStarted(Err(e)) => {
                tracing::error!("Error starting test: {}", e);
                self.manual_test = ManualTestState::Idle;
                self.set_message(MessageKind::Error, "An error occurred.", None);
            }
            DashboardEvent::PollAttempt { attempt } => {
                if let ManualTestState::Polling { attempts, .. } = self.manual_test {
                    tracing::debug!("Manual test poll {}/{}", attempt, attempts);
                    self.manual_test = ManualTestState::Polling { attempt, attempts };
                }
            }
            DashboardEvent::PollFinished => {
                tracing::info!("Manual test polling finished");
                self.manual_test = ManualTestState::Idle;
                let linger = self.settings.refresh.completion_message();
                self.set_message(MessageKind::Success, "Measurement complete.", Some(linger));
            }
            DashboardEvent::HistoryCleared(Ok(())) => {
                tracing::info!("History cleared");
                self.series = Series::default();
                self.viewport = None;
                self.cards = Cards::empty();
                self.table.clear();
                self.brush.sync_from_viewport(None, 0);
                self.spawn_history_fetch();
            }
            DashboardEvent::HistoryCleared(Err(e)) => {
                tracing::error!("Error clearing history: {}", e);
            }
            DashboardEvent::LogsCleared(Ok(())) => {
                tracing::info!("Logs cleared");
                self.logs.clear();
                self.spawn_logs_fetch();
            }
            DashboardEvent::LogsCleared(Err(e)) => {
                tracing::error!("Error clearing logs: {}", e);
            }
            DashboardEvent::DayLoaded { date, result } => {
                self.day.apply(date, result);
            }
            DashboardEvent::MessageExpired { generation } => {
                if generation == self.message_generation {
                    self.message = None;
                }
            }
        }
    }

    /// Replace the series with a fresh most-recent-first history.
    pub fn update_dashboard(&mut self, samples: Vec<Sample>) {
        let first_load = self.series.is_empty();
        self.series = Series::from_recent_first(samples);
        let len = self.series.len();

        self.cards = self
            .series
            .latest()
            .map(Cards::from_latest)
            .unwrap_or_default();
        self.table = table_rows(&self.series);

        // Chart first, then the brush follows it.
        self.viewport = if first_load {
            compute_default_viewport(&self.series, self.settings.brush.lookback())
        } else {
            self.viewport.and_then(|v| v.clamp_to(len))
        };
        self.brush.sync_from_viewport(self.viewport, len);
    }

    pub fn reset_zoom(&mut self) {
        self.viewport = compute_default_viewport(&self.series, self.settings.brush.lookback());
        self.brush.sync_from_viewport(self.viewport, self.series.len());
    }

    pub fn drag_start(&mut self, pointer_x: f64, track_width: f64, mode: DragMode) -> bool {
        self.brush.on_drag_start(pointer_x, track_width, mode)
    }

    /// Move the brush and let the chart follow. The brush is not re-derived
    /// from the chart here.
    pub fn drag_move(&mut self, pointer_x: f64) {
        let Some(geometry) = self.brush.on_drag_move(pointer_x) else {
            return;
        };
        if let Some(viewport) = brush_geometry_to_viewport(geometry, self.series.len()) {
            self.viewport = Some(viewport);
        }
    }

    pub fn drag_end(&mut self) {
        self.brush.on_drag_end();
    }

    /// Show a short-lived message, e.g. after writing a snapshot.
    pub fn flash(&mut self, kind: MessageKind, text: &str) {
        let linger = self.settings.refresh.completion_message();
        self.set_message(kind, text, Some(linger));
    }

    fn set_message(&mut self, kind: MessageKind, text: &str, expires_after: Option<Duration>) {
        self.message_generation += 1;
        self.message = Some(StatusMessage {
            kind,
            text: text.to_string(),
        });

        if let Some(delay) = expires_after {
            let generation = self.message_generation;
            let tx = self.events.clone();
            tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(DashboardEvent::MessageExpired { generation });
            });
        }
    }
}
