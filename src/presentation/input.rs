// Keyboard and mouse mapping onto controller operations
use crate::application::dashboard_controller::DashboardController;
use crate::domain::brush::DragMode;
use crate::domain::viewport::BrushGeometry;
use crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, MouseButton, MouseEvent, MouseEventKind};
use ratatui::layout::Rect;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Tab {
    #[default]
    Dashboard,
    DayHistory,
}

impl Tab {
    fn toggle(self) -> Self {
        match self {
            Tab::Dashboard => Tab::DayHistory,
            Tab::DayHistory => Tab::Dashboard,
        }
    }
}

/// What the presentation remembers between frames.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    pub tab: Tab,
    /// Minimap track as last rendered; empty until the first frame.
    pub track: Rect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputAction {
    None,
    Quit,
    ExportSnapshot,
}

/// Columns `[first, last]` the brush covers on a track of `track.width`.
pub fn brush_columns(track: Rect, geometry: BrushGeometry) -> (u16, u16) {
    let width = f64::from(track.width);
    let to_col = |pct: f64| (pct / 100.0 * width).round().clamp(0.0, width) as u16;
    let first = to_col(geometry.left_pct).min(track.width.saturating_sub(1));
    let last = to_col(geometry.right_pct()).saturating_sub(1).max(first);
    (track.x + first, track.x + last)
}

/// Which gesture a press at `(column, row)` begins.
///
/// The edge columns are resize handles; a brush narrower than three columns
/// uses the columns just outside it instead, so it can always be widened.
pub fn hit_test(track: Rect, geometry: BrushGeometry, column: u16, row: u16) -> Option<DragMode> {
    let inside_track = track.width > 0
        && (track.x..track.x + track.width).contains(&column)
        && (track.y..track.y + track.height).contains(&row);
    if !inside_track {
        return None;
    }

    let (first, last) = brush_columns(track, geometry);
    if last - first >= 2 {
        if column == first {
            return Some(DragMode::ResizeLeft);
        }
        if column == last {
            return Some(DragMode::ResizeRight);
        }
    } else if first > 0 && column == first - 1 {
        return Some(DragMode::ResizeLeft);
    } else if column == last + 1 {
        return Some(DragMode::ResizeRight);
    }

    (first..=last).contains(&column).then_some(DragMode::Move)
}

pub fn handle_event(event: Event, controller: &mut DashboardController, ui: &mut UiState) -> InputAction {
    match event {
        Event::Key(key) if key.kind == KeyEventKind::Press => handle_key(key, controller, ui),
        Event::Mouse(mouse) => {
            handle_mouse(mouse, controller, ui);
            InputAction::None
        }
        _ => InputAction::None,
    }
}

fn handle_key(key: KeyEvent, controller: &mut DashboardController, ui: &mut UiState) -> InputAction {
    if controller.pending_confirmation().is_some() {
        match key.code {
            KeyCode::Char('y') | KeyCode::Char('Y') | KeyCode::Enter => controller.confirm(),
            KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => controller.cancel_confirmation(),
            _ => {}
        }
        return InputAction::None;
    }

    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return InputAction::Quit,
        KeyCode::Char('e') => return InputAction::ExportSnapshot,
        KeyCode::Tab => ui.tab = ui.tab.toggle(),
        KeyCode::Char('t') => {
            controller.start_manual_test();
        }
        KeyCode::Char('r') => {
            controller.refresh();
            controller.refresh_status();
        }
        KeyCode::Char('l') => controller.refresh_logs(),
        KeyCode::Char('z') => controller.reset_zoom(),
        KeyCode::Char('H') => controller.request_clear_history(),
        KeyCode::Char('L') => controller.request_clear_logs(),
        KeyCode::Left if ui.tab == Tab::DayHistory => controller.previous_day(),
        KeyCode::Right if ui.tab == Tab::DayHistory => controller.next_day(),
        _ => {}
    }
    InputAction::None
}

fn handle_mouse(mouse: MouseEvent, controller: &mut DashboardController, ui: &UiState) {
    match mouse.kind {
        MouseEventKind::Down(MouseButton::Left) => {
            if ui.tab != Tab::Dashboard || controller.pending_confirmation().is_some() {
                return;
            }
            if let Some(mode) = hit_test(ui.track, controller.brush_geometry(), mouse.column, mouse.row) {
                controller.drag_start(f64::from(mouse.column), f64::from(ui.track.width), mode);
            }
        }
        // Follows the pointer anywhere on screen while a drag is active.
        MouseEventKind::Drag(MouseButton::Left) => controller.drag_move(f64::from(mouse.column)),
        MouseEventKind::Up(MouseButton::Left) => controller.drag_end(),
        _ => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::dashboard_controller::DashboardEvent;
    use crate::application::speedtest_api::{ApiError, SpeedTestApi, TestAck};
    use crate::domain::logs::LogsResponse;
    use crate::domain::sample::Sample;
    use crate::domain::status::SchedulerStatus;
    use crate::domain::viewport::Viewport;
    use crate::infrastructure::config::Settings;
    use async_trait::async_trait;
    use chrono::NaiveDate;
    use crossterm::event::KeyModifiers;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct CountingApi {
        clear_calls: AtomicUsize,
    }

    #[async_trait]
    impl SpeedTestApi for CountingApi {
        async fn fetch_history(&self, _limit: usize) -> Result<Vec<Sample>, ApiError> {
            Ok(Vec::new())
        }
        async fn fetch_history_by_day(&self, _date: NaiveDate) -> Result<Vec<Sample>, ApiError> {
            Ok(Vec::new())
        }
        async fn fetch_logs(&self) -> Result<LogsResponse, ApiError> {
            Ok(LogsResponse::default())
        }
        async fn fetch_status(&self) -> Result<SchedulerStatus, ApiError> {
            Ok(SchedulerStatus::default())
        }
        async fn start_test(&self) -> Result<TestAck, ApiError> {
            Ok(TestAck::default())
        }
        async fn clear_history(&self) -> Result<(), ApiError> {
            self.clear_calls.fetch_add(1, Ordering::SeqCst);
            Ok(())
        }
        async fn clear_logs(&self) -> Result<(), ApiError> {
            Ok(())
        }
    }

    fn fifty_minutes() -> Vec<Sample> {
        (0..50)
            .rev()
            .map(|m| Sample::new(format!("2024-05-01 10:{m:02}:00"), 50.0, 10.0, 12.0))
            .collect()
    }

    fn mouse(kind: MouseEventKind, column: u16, row: u16) -> Event {
        Event::Mouse(MouseEvent {
            kind,
            column,
            row,
            modifiers: KeyModifiers::NONE,
        })
    }

    fn key(code: KeyCode) -> Event {
        Event::Key(KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn track() -> Rect {
        Rect::new(10, 20, 100, 1)
    }

    #[test]
    fn test_brush_columns() {
        assert_eq!(brush_columns(track(), BrushGeometry::FULL), (10, 109));
        let geometry = BrushGeometry {
            left_pct: 40.0,
            width_pct: 60.0,
        };
        assert_eq!(brush_columns(track(), geometry), (50, 109));
    }

    #[test]
    fn test_hit_test_handles_and_body() {
        let geometry = BrushGeometry {
            left_pct: 40.0,
            width_pct: 20.0,
        };
        assert_eq!(hit_test(track(), geometry, 50, 20), Some(DragMode::ResizeLeft));
        assert_eq!(hit_test(track(), geometry, 69, 20), Some(DragMode::ResizeRight));
        assert_eq!(hit_test(track(), geometry, 60, 20), Some(DragMode::Move));
        assert_eq!(hit_test(track(), geometry, 30, 20), None);
        assert_eq!(hit_test(track(), geometry, 60, 21), None);
        assert_eq!(hit_test(Rect::default(), geometry, 0, 0), None);
    }

    #[test]
    fn test_narrow_brush_uses_outside_handles() {
        let geometry = BrushGeometry {
            left_pct: 50.0,
            width_pct: 1.0,
        };
        assert_eq!(brush_columns(track(), geometry), (60, 60));
        assert_eq!(hit_test(track(), geometry, 59, 20), Some(DragMode::ResizeLeft));
        assert_eq!(hit_test(track(), geometry, 61, 20), Some(DragMode::ResizeRight));
        assert_eq!(hit_test(track(), geometry, 60, 20), Some(DragMode::Move));
    }

    #[tokio::test]
    async fn test_drag_follows_pointer_off_track_until_release() {
        let (mut controller, _rx) =
            DashboardController::new(Arc::new(CountingApi::default()), Settings::default());
        controller.update_dashboard(fifty_minutes());
        assert_eq!(controller.viewport(), Some(Viewport::new(0, 49)));
        let mut ui = UiState {
            track: Rect::new(10, 20, 100, 3),
            ..UiState::default()
        };

        let left = MouseButton::Left;
        handle_event(mouse(MouseEventKind::Down(left), 10, 21), &mut controller, &mut ui);
        assert_eq!(controller.drag_mode(), Some(DragMode::ResizeLeft));

        // Above the track and halfway across it.
        handle_event(mouse(MouseEventKind::Drag(left), 60, 0), &mut controller, &mut ui);
        let halfway = controller.viewport().unwrap();
        assert!((24..=25).contains(&halfway.min_index), "{halfway:?}");
        assert_eq!(halfway.max_index, 49);

        // Far past the right edge of the terminal track.
        handle_event(mouse(MouseEventKind::Drag(left), 300, 39), &mut controller, &mut ui);
        let narrow = controller.viewport().unwrap();
        assert!(narrow.min_index >= 48, "{narrow:?}");

        handle_event(mouse(MouseEventKind::Up(left), 300, 39), &mut controller, &mut ui);
        assert_eq!(controller.drag_mode(), None);
        handle_event(mouse(MouseEventKind::Drag(left), 10, 21), &mut controller, &mut ui);
        assert_eq!(controller.viewport(), Some(narrow));
    }

    #[tokio::test]
    async fn test_press_outside_dashboard_tab_does_not_grab_brush() {
        let (mut controller, _rx) =
            DashboardController::new(Arc::new(CountingApi::default()), Settings::default());
        controller.update_dashboard(fifty_minutes());
        let mut ui = UiState {
            tab: Tab::DayHistory,
            track: Rect::new(10, 20, 100, 3),
        };

        let left = MouseButton::Left;
        handle_event(mouse(MouseEventKind::Down(left), 10, 21), &mut controller, &mut ui);
        handle_event(mouse(MouseEventKind::Drag(left), 60, 21), &mut controller, &mut ui);
        assert_eq!(controller.drag_mode(), None);
        assert_eq!(controller.viewport(), Some(Viewport::new(0, 49)));
    }

    #[tokio::test]
    async fn test_destructive_keys_wait_for_confirmation() {
        let api = Arc::new(CountingApi::default());
        let (mut controller, mut rx) = DashboardController::new(api.clone(), Settings::default());
        let mut ui = UiState::default();

        handle_event(key(KeyCode::Char('H')), &mut controller, &mut ui);
        assert!(controller.pending_confirmation().is_some());
        // Other bindings are swallowed while the prompt is open.
        assert_eq!(handle_event(key(KeyCode::Char('q')), &mut controller, &mut ui), InputAction::None);
        handle_event(key(KeyCode::Char('n')), &mut controller, &mut ui);
        assert_eq!(controller.pending_confirmation(), None);
        tokio::task::yield_now().await;
        assert_eq!(api.clear_calls.load(Ordering::SeqCst), 0);

        handle_event(key(KeyCode::Char('H')), &mut controller, &mut ui);
        handle_event(key(KeyCode::Char('y')), &mut controller, &mut ui);
        let event = rx.recv().await.unwrap();
        assert!(matches!(event, DashboardEvent::HistoryCleared(Ok(()))));
        assert_eq!(api.clear_calls.load(Ordering::SeqCst), 1);

        assert_eq!(handle_event(key(KeyCode::Char('q')), &mut controller, &mut ui), InputAction::Quit);
    }
}
