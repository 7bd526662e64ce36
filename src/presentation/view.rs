// ratatui rendering of the dashboard and day history views
use crate::application::dashboard_controller::{DashboardController, ManualTestState, MessageKind};
use crate::application::day_history::DayState;
use crate::domain::chart::{
    common_datasets, dataset_points, time_labels, AxisConfig, AxisId, ChartOptions, DatasetConfig,
    MUTED_COLOR,
};
use crate::domain::dashboard::{Card, TableRow};
use crate::domain::logs::LogLevel;
use crate::domain::sample::Series;
use crate::domain::viewport::Viewport;
use crate::presentation::input::{brush_columns, Tab, UiState};
use ratatui::{
    layout::{Alignment, Constraint, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{Axis, Block, Borders, Chart, Clear, Dataset, GraphType, Paragraph, Row, Table, Wrap},
    Frame,
};

const ACCENT: Color = Color::Rgb(56, 189, 248);

fn color(hex: &str) -> Color {
    hex.parse().unwrap_or(Color::Gray)
}

fn muted() -> Style {
    Style::default().fg(color(MUTED_COLOR))
}

pub fn render(frame: &mut Frame, controller: &DashboardController, ui: &mut UiState) {
    let [header, body, footer] = Layout::vertical([
        Constraint::Length(2),
        Constraint::Min(10),
        Constraint::Length(1),
    ])
    .areas(frame.area());

    render_header(frame, header, controller, ui.tab);
    match ui.tab {
        Tab::Dashboard => render_dashboard(frame, body, controller, ui),
        Tab::DayHistory => render_day_history(frame, body, controller),
    }
    render_footer(frame, footer, controller, ui.tab);

    if let Some(pending) = controller.pending_confirmation() {
        render_confirmation(frame, pending.prompt());
    }
}

fn render_header(frame: &mut Frame, area: Rect, controller: &DashboardController, tab: Tab) {
    let mut title = vec![Span::styled(
        " NetChecker ",
        Style::default().fg(ACCENT).add_modifier(Modifier::BOLD),
    )];
    for (name, this) in [("Dashboard", Tab::Dashboard), ("Day history", Tab::DayHistory)] {
        let style = if this == tab {
            Style::default().add_modifier(Modifier::REVERSED)
        } else {
            muted()
        };
        title.push(Span::raw(" "));
        title.push(Span::styled(format!(" {} ", name), style));
    }

    let mut info = Vec::new();
    if let Some(status) = controller.status() {
        if let Some(badge) = status.badge() {
            info.push(Span::styled(format!(" ● {} ", badge), Style::default().fg(Color::Green)));
        }
        if let Some(next_run) = status.next_run_line() {
            info.push(Span::styled(format!(" {} ", next_run), muted()));
        }
    }
    if let Some(message) = controller.message() {
        let fg = match message.kind {
            MessageKind::Info => Color::Yellow,
            MessageKind::Success => Color::Green,
            MessageKind::Error => Color::Red,
        };
        info.push(Span::styled(format!(" {} ", message.text), Style::default().fg(fg)));
    }

    frame.render_widget(Paragraph::new(vec![Line::from(title), Line::from(info)]), area);
}

fn render_footer(frame: &mut Frame, area: Rect, controller: &DashboardController, tab: Tab) {
    let test_hint = match controller.manual_test() {
        ManualTestState::Idle => "t test".to_string(),
        ManualTestState::Armed => "testing...".to_string(),
        ManualTestState::Polling { attempt, attempts } => format!("checking {}/{}", attempt, attempts),
    };
    let hints = match tab {
        Tab::Dashboard => format!(
            " {} · r refresh · z reset zoom · H clear history · L clear logs · e snapshot · Tab day view · q quit",
            test_hint
        ),
        Tab::DayHistory => " ←/→ change day · Tab dashboard · q quit".to_string(),
    };
    frame.render_widget(Paragraph::new(hints).style(muted()), area);
}

fn render_dashboard(frame: &mut Frame, area: Rect, controller: &DashboardController, ui: &mut UiState) {
    let [cards, charts, minimap, bottom] = Layout::vertical([
        Constraint::Length(4),
        Constraint::Min(12),
        Constraint::Length(5),
        Constraint::Length(12),
    ])
    .areas(area);

    render_cards(frame, cards, controller.cards().iter());

    let series = controller.series();
    let visible = controller
        .viewport()
        .or_else(|| Viewport::full(series.len()));
    render_series_charts(frame, charts, series, visible, "Speed history");

    ui.track = render_minimap(frame, minimap, controller);

    let [table, logs] =
        Layout::horizontal([Constraint::Percentage(45), Constraint::Percentage(55)]).areas(bottom);
    render_table(frame, table, controller.table(), "Recent measurements");
    render_logs(frame, logs, controller);
}

fn render_cards<'a>(frame: &mut Frame, area: Rect, cards: impl Iterator<Item = &'a Card>) {
    let areas = Layout::horizontal([Constraint::Ratio(1, 3); 3]).split(area);
    let colors = common_datasets().into_iter().map(|d| color(d.color));

    for ((card, area), fg) in cards.zip(areas.iter()).zip(colors) {
        let block = Block::default()
            .title(Span::styled(format!(" {} ", card.title), muted()))
            .borders(Borders::ALL);
        let value = Line::from(vec![
            Span::styled(card.value.clone(), Style::default().fg(fg).add_modifier(Modifier::BOLD)),
            Span::styled(format!(" {}", card.unit), muted()),
        ]);
        frame.render_widget(
            Paragraph::new(value).alignment(Alignment::Center).block(block),
            *area,
        );
    }
}

/// One chart per axis: speeds on top, ping underneath.
fn render_series_charts(
    frame: &mut Frame,
    area: Rect,
    series: &Series,
    visible: Option<Viewport>,
    title: &str,
) {
    let [speed, ping] =
        Layout::vertical([Constraint::Percentage(65), Constraint::Percentage(35)]).areas(area);
    let options = ChartOptions::main();
    let labels = time_labels(series);

    for (axis_id, area, chart_title) in [(AxisId::Speed, speed, title), (AxisId::Ping, ping, "")] {
        let Some(axis) = options.axis(axis_id) else {
            continue;
        };
        let datasets: Vec<DatasetConfig> = common_datasets()
            .into_iter()
            .filter(|d| d.axis == axis_id)
            .collect();
        render_axis_chart(frame, area, series, visible, &labels, axis, &datasets, &options, chart_title);
    }
}

#[allow(clippy::too_many_arguments)]
fn render_axis_chart(
    frame: &mut Frame,
    area: Rect,
    series: &Series,
    visible: Option<Viewport>,
    labels: &[String],
    axis: &AxisConfig,
    configs: &[DatasetConfig],
    options: &ChartOptions,
    title: &str,
) {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(format!(" {} ", title), muted()));

    let Some(visible) = visible else {
        frame.render_widget(
            Paragraph::new("Waiting for data...").style(muted()).block(block),
            area,
        );
        return;
    };

    let points: Vec<Vec<(f64, f64)>> = configs
        .iter()
        .map(|config| {
            dataset_points(series, config.metric)
                .into_iter()
                .filter(|(x, _)| visible.contains(*x as usize))
                .collect()
        })
        .collect();

    let y_max = points
        .iter()
        .flatten()
        .map(|(_, y)| *y)
        .fold(0.0_f64, f64::max)
        .max(1.0)
        * 1.1;
    let y_min = axis.min.unwrap_or(0.0);

    let datasets: Vec<Dataset> = configs
        .iter()
        .zip(points.iter())
        .map(|(config, data)| {
            let dataset = Dataset::default()
                .marker(if config.dashed { Marker::Dot } else { Marker::Braille })
                .graph_type(GraphType::Line)
                .style(Style::default().fg(color(config.color)))
                .data(data);
            if options.show_legend {
                dataset.name(config.label)
            } else {
                dataset
            }
        })
        .collect();

    let label_at = |index: usize| labels.get(index).cloned().unwrap_or_default();
    let mid = visible.min_index + (visible.max_index - visible.min_index) / 2;
    let x_labels = vec![
        Span::styled(label_at(visible.min_index), muted()),
        Span::styled(label_at(mid), muted()),
        Span::styled(label_at(visible.max_index), muted()),
    ];
    let y_labels = vec![
        Span::styled(format!("{:.0}", y_min), muted()),
        Span::styled(format!("{:.0}", y_max / 2.0), muted()),
        Span::styled(format!("{:.0}", y_max), muted()),
    ];

    // A one-sample window still needs a non-empty x range.
    let x_bounds = [
        visible.min_index as f64,
        (visible.max_index as f64).max(visible.min_index as f64 + 1.0),
    ];

    let chart = Chart::new(datasets)
        .block(block)
        .x_axis(Axis::default().bounds(x_bounds).labels(x_labels).style(muted()))
        .y_axis(
            Axis::default()
                .title(Span::styled(axis.title, Style::default().fg(color(axis.color))))
                .bounds([y_min, y_max])
                .labels(y_labels)
                .style(muted()),
        );
    frame.render_widget(chart, area);
}

/// Minimap over the whole series with the brush drawn on its bottom row.
/// Returns the whole overview body: the brush spans its full height, so a
/// press on the plot above the brush row grabs it too.
fn render_minimap(frame: &mut Frame, area: Rect, controller: &DashboardController) -> Rect {
    let block = Block::default()
        .borders(Borders::ALL)
        .title(Span::styled(" Overview (drag to zoom) ", muted()));
    let inner = block.inner(area);
    frame.render_widget(block, area);
    if inner.width == 0 || inner.height == 0 {
        return Rect::default();
    }

    let [plot, track] =
        Layout::vertical([Constraint::Min(0), Constraint::Length(1)]).areas(inner);
    let series = controller.series();
    let options = ChartOptions::minimap();

    // Each axis is scaled on its own, as the hidden axes of the main chart are.
    let datasets_points: Vec<(DatasetConfig, Vec<(f64, f64)>)> = common_datasets()
        .into_iter()
        .map(|config| {
            let points = dataset_points(series, config.metric);
            (config, points)
        })
        .collect();
    let axis_max = |axis: AxisId| {
        datasets_points
            .iter()
            .filter(|(c, _)| c.axis == axis)
            .flat_map(|(_, p)| p.iter().map(|(_, y)| *y))
            .fold(0.0_f64, f64::max)
            .max(f64::EPSILON)
    };
    let (speed_max, ping_max) = (axis_max(AxisId::Speed), axis_max(AxisId::Ping));
    let normalized: Vec<(DatasetConfig, Vec<(f64, f64)>)> = datasets_points
        .into_iter()
        .map(|(config, points)| {
            let max = if config.axis == AxisId::Speed { speed_max } else { ping_max };
            let points = points.into_iter().map(|(x, y)| (x, y / max)).collect();
            (config, points)
        })
        .collect();

    if !series.is_empty() && plot.height > 0 {
        let datasets: Vec<Dataset> = normalized
            .iter()
            .map(|(config, data)| {
                Dataset::default()
                    .marker(Marker::Braille)
                    .graph_type(GraphType::Line)
                    .style(Style::default().fg(color(config.color)))
                    .data(data)
            })
            .collect();
        let last = series.len().saturating_sub(1).max(1) as f64;
        let axis = |bounds: [f64; 2]| {
            if options.show_axes {
                Axis::default().bounds(bounds).style(muted())
            } else {
                Axis::default().bounds(bounds)
            }
        };
        let chart = Chart::new(datasets)
            .x_axis(axis([0.0, last]))
            .y_axis(axis([0.0, 1.05]));
        frame.render_widget(chart, plot);
    }

    let (first, last) = brush_columns(track, controller.brush_geometry());
    let mut cells = String::with_capacity(usize::from(track.width) * 3);
    for column in track.x..track.x + track.width {
        let symbol = if column == first {
            '▐'
        } else if column == last {
            '▌'
        } else if column > first && column < last {
            '█'
        } else {
            '─'
        };
        cells.push(symbol);
    }
    let brush_style = if controller.drag_mode().is_some() {
        Style::default().fg(Color::White)
    } else {
        Style::default().fg(ACCENT)
    };
    frame.render_widget(Paragraph::new(cells).style(brush_style), track);

    inner
}

fn render_table(frame: &mut Frame, area: Rect, rows: &[TableRow], title: &str) {
    let colors: Vec<Color> = common_datasets().iter().map(|d| color(d.color)).collect();
    let header = Row::new(["Time", "Download", "Upload", "Ping"]).style(muted());
    let body = rows.iter().map(|row| {
        Row::new(vec![
            Span::raw(row.time.clone()),
            Span::styled(row.download.clone(), Style::default().fg(colors[0])),
            Span::styled(row.upload.clone(), Style::default().fg(colors[1])),
            Span::styled(row.ping.clone(), Style::default().fg(colors[2])),
        ])
    });

    let table = Table::new(body, [Constraint::Length(6), Constraint::Length(10), Constraint::Length(10), Constraint::Length(8)])
        .header(header)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(format!(" {} ", title), muted())),
        );
    frame.render_widget(table, area);
}

fn render_logs(frame: &mut Frame, area: Rect, controller: &DashboardController) {
    let lines: Vec<Line> = controller
        .logs()
        .iter()
        .map(|line| {
            let fg = match line.level {
                LogLevel::Error => Color::Red,
                LogLevel::Warning => Color::Yellow,
                LogLevel::Info => Color::Gray,
            };
            Line::styled(line.text.clone(), Style::default().fg(fg))
        })
        .collect();

    // Follow the tail.
    let visible_rows = area.height.saturating_sub(2) as usize;
    let scroll = lines.len().saturating_sub(visible_rows) as u16;
    let logs = Paragraph::new(lines)
        .scroll((scroll, 0))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(Span::styled(" System log ", muted())),
        );
    frame.render_widget(logs, area);
}

fn render_day_history(frame: &mut Frame, area: Rect, controller: &DashboardController) {
    let day = controller.day();
    let [title, body] =
        Layout::vertical([Constraint::Length(1), Constraint::Min(0)]).areas(area);
    frame.render_widget(
        Paragraph::new(format!(" {} ", day.date().format("%Y-%m-%d")))
            .style(Style::default().fg(ACCENT).add_modifier(Modifier::BOLD)),
        title,
    );

    match day.state() {
        DayState::Loading => {
            frame.render_widget(Paragraph::new("Loading data...").style(muted()), body);
        }
        DayState::NoData => {
            frame.render_widget(
                Paragraph::new("No measurements for this day.")
                    .alignment(Alignment::Center)
                    .block(Block::default().borders(Borders::ALL)),
                body,
            );
        }
        DayState::Failed(message) => {
            frame.render_widget(
                Paragraph::new(message.as_str()).style(Style::default().fg(Color::Red)),
                body,
            );
        }
        DayState::Loaded { series, table } => {
            let [chart, rows] =
                Layout::vertical([Constraint::Percentage(60), Constraint::Percentage(40)]).areas(body);
            render_series_charts(frame, chart, series, Viewport::full(series.len()), "Day history");
            render_table(frame, rows, table, "Measurements");
        }
    }
}

fn render_confirmation(frame: &mut Frame, prompt: &str) {
    let area = frame.area();
    let width = 44.min(area.width);
    let height = 5.min(area.height);
    let popup = Rect::new(
        area.x + (area.width - width) / 2,
        area.y + (area.height - height) / 2,
        width,
        height,
    );

    frame.render_widget(Clear, popup);
    frame.render_widget(
        Paragraph::new(vec![Line::from(prompt), Line::from(""), Line::from("y confirm · n cancel")])
            .alignment(Alignment::Center)
            .wrap(Wrap { trim: true })
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .border_style(Style::default().fg(Color::Red))
                    .title(" Confirm "),
            ),
        popup,
    );
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_controller::DashboardEvent;
    use crate::application::speedtest_api::{ApiError, SpeedTestApi, TestAck};
    use crate::domain::brush::DragMode;
    use crate::domain::logs::LogsResponse;
    use crate::domain::sample::Sample;
    use crate::domain::status::SchedulerStatus;
    use crate::infrastructure::config::Settings;
    use crate::presentation::input::hit_test;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;

    struct OfflineApi;

    fn offline() -> ApiError {
        ApiError::Status {
            path: "/".to_string(),
            status: 503,
            body: String::new(),
        }
    }

    #[async_trait]
    impl SpeedTestApi for OfflineApi {
        async fn fetch_history(&self, _limit: usize) -> Result<Vec<Sample>, ApiError> {
            Err(offline())
        }
        async fn fetch_history_by_day(&self, _date: NaiveDate) -> Result<Vec<Sample>, ApiError> {
            Err(offline())
        }
        async fn fetch_logs(&self) -> Result<LogsResponse, ApiError> {
            Err(offline())
        }
        async fn fetch_status(&self) -> Result<SchedulerStatus, ApiError> {
            Err(offline())
        }
        async fn start_test(&self) -> Result<TestAck, ApiError> {
            Err(offline())
        }
        async fn clear_history(&self) -> Result<(), ApiError> {
            Err(offline())
        }
        async fn clear_logs(&self) -> Result<(), ApiError> {
            Err(offline())
        }
    }

    fn buffer_text(terminal: &Terminal<TestBackend>) -> String {
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[tokio::test]
    async fn test_renders_dashboard_and_remembers_track() {
        let (mut controller, _rx) = DashboardController::new(
            Arc::new(OfflineApi),
            Settings::default(),
        );
        controller.update_dashboard(vec![
            Sample::new("2024-05-01 10:02:00", 91.5, 11.0, 9.0),
            Sample::new("2024-05-01 10:01:00", 88.0, 10.0, 12.0),
            Sample::new("2024-05-01 10:00:00", 85.0, 9.0, 15.0),
        ]);
        controller.handle(DashboardEvent::LogsLoaded(Ok(LogsResponse {
            logs: "INFO - Test complete\n".to_string(),
        })));

        let mut terminal = Terminal::new(TestBackend::new(120, 40)).unwrap();
        let mut ui = UiState::default();
        terminal
            .draw(|frame| render(frame, &controller, &mut ui))
            .unwrap();

        let text = buffer_text(&terminal);
        assert!(text.contains("91.5"));
        assert!(text.contains("Test complete"));
        assert!(ui.track.width > 0);
        assert!(ui.track.height > 1);
        assert_eq!(
            hit_test(ui.track, controller.brush_geometry(), ui.track.x + ui.track.width / 2, ui.track.y),
            Some(DragMode::Move)
        );

        controller.request_clear_history();
        terminal
            .draw(|frame| render(frame, &controller, &mut ui))
            .unwrap();
        assert!(buffer_text(&terminal).contains("Delete all measurement history?"));
    }

    #[tokio::test]
    async fn test_renders_empty_day_panel() {
        let (mut controller, _rx) = DashboardController::new(
            Arc::new(OfflineApi),
            Settings::default(),
        );
        let date = controller.day().date();
        controller.handle(DashboardEvent::DayLoaded {
            date,
            result: Ok(Vec::new()),
        });

        let mut terminal = Terminal::new(TestBackend::new(100, 30)).unwrap();
        let mut ui = UiState {
            tab: Tab::DayHistory,
            ..UiState::default()
        };
        terminal
            .draw(|frame| render(frame, &controller, &mut ui))
            .unwrap();
        assert!(buffer_text(&terminal).contains("No measurements for this day."));
    }
}
