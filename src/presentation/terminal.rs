// Terminal setup and the dashboard event loop
use crate::application::dashboard_controller::{DashboardController, DashboardEvent, MessageKind};
use crate::infrastructure::html_snapshot::Snapshot;
use crate::presentation::input::{handle_event, InputAction, UiState};
use crate::presentation::view;
use anyhow::Context;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, EventStream},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};

type Term = Terminal<CrosstermBackend<Stdout>>;

fn setup() -> anyhow::Result<Term> {
    enable_raw_mode().context("Failed to enable raw mode")?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    Ok(Terminal::new(CrosstermBackend::new(stdout))?)
}

fn restore(terminal: &mut Term) -> anyhow::Result<()> {
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), DisableMouseCapture, LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

/// Run the dashboard until the user quits. The terminal is restored on
/// every exit path.
pub async fn run(
    controller: DashboardController,
    events: mpsc::UnboundedReceiver<DashboardEvent>,
) -> anyhow::Result<()> {
    let mut terminal = setup()?;
    let result = event_loop(&mut terminal, controller, events).await;
    restore(&mut terminal)?;
    result
}

async fn event_loop(
    terminal: &mut Term,
    mut controller: DashboardController,
    mut events: mpsc::UnboundedReceiver<DashboardEvent>,
) -> anyhow::Result<()> {
    let mut ui = UiState::default();
    let mut input = EventStream::new();

    let period = controller.settings().refresh.interval();
    let mut refresh = interval_at(Instant::now() + period, period);
    refresh.set_missed_tick_behavior(MissedTickBehavior::Delay);

    controller.start();
    tracing::info!("Dashboard started against {}", controller.settings().api.base_url);

    loop {
        terminal.draw(|frame| view::render(frame, &controller, &mut ui))?;

        tokio::select! {
            _ = refresh.tick() => {
                tracing::debug!("Background refresh");
                controller.refresh();
            }
            Some(event) = events.recv() => {
                controller.handle(event);
            }
            maybe_event = input.next() => {
                let Some(event) = maybe_event else {
                    break;
                };
                match handle_event(event?, &mut controller, &mut ui) {
                    InputAction::Quit => break,
                    InputAction::ExportSnapshot => export_snapshot(&mut controller),
                    InputAction::None => {}
                }
            }
        }
    }

    tracing::info!("Dashboard stopped");
    Ok(())
}

fn export_snapshot(controller: &mut DashboardController) {
    let path = controller.settings().ui.snapshot_path.clone();
    let snapshot = Snapshot {
        generated_at: chrono::Local::now().format("%Y/%m/%d %H:%M:%S").to_string(),
        badge: controller.status().and_then(|s| s.badge()),
        cards: controller.cards(),
        table: controller.table(),
        logs: controller.logs(),
    };

    match snapshot.write_to(&path) {
        Ok(()) => {
            tracing::info!("Snapshot written to {}", path.display());
            controller.flash(MessageKind::Success, &format!("Snapshot saved to {}", path.display()));
        }
        Err(e) => {
            tracing::error!("{:#}", e);
            controller.flash(MessageKind::Error, "Could not write snapshot.");
        }
    }
}
