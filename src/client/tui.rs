use std::io;
use std::sync::Arc;

use anyhow::Result;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture, Event, EventStream, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use futures_util::StreamExt;
use ratatui::{backend::CrosstermBackend, Terminal};
use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use super::app::App;
use super::draw;
use super::http::JobBackend;
use crate::core::Config;
use crate::utils::tui_writer::LogEntry;

pub struct JobsTui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl JobsTui {
    pub fn new() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let backend = CrosstermBackend::new(stdout);
        let terminal = Terminal::new(backend)?;
        Ok(JobsTui { terminal })
    }

    pub async fn run(
        &mut self,
        backend: Arc<dyn JobBackend>,
        config: &Config,
        mut log_rx: mpsc::UnboundedReceiver<LogEntry>,
    ) -> Result<()> {
        let (mut app, mut events_rx) = App::new(backend, config);
        let mut event_stream = EventStream::new();

        app.start();
        self.draw(&app)?;

        loop {
            let debounce = app.debounce_deadline();

            tokio::select! {
                biased;

                maybe_event = event_stream.next() => {
                    match maybe_event {
                        Some(Ok(Event::Key(key))) => {
                            if key.kind == KeyEventKind::Press {
                                tracing::trace!("Key pressed: {:?} modifiers: {:?}", key.code, key.modifiers);
                                if app.handle_key(key) {
                                    tracing::info!("User requested quit");
                                    break;
                                }
                            }
                        }
                        Some(Ok(Event::Resize(width, height))) => {
                            tracing::debug!("Terminal resized to {}x{}", width, height);
                        }
                        Some(Ok(_)) => {}
                        Some(Err(e)) => {
                            tracing::warn!("Event stream error: {:?}", e);
                        }
                        None => {
                            tracing::info!("Event stream terminated");
                            break;
                        }
                    }
                }

                Some(event) = events_rx.recv() => {
                    app.handle_backend_event(event);
                }

                _ = wait_for(debounce) => {
                    app.poll_debounce(Instant::now());
                }

                Some(entry) = log_rx.recv() => {
                    app.add_log(entry);
                }
            }

            self.draw(&app)?;
        }

        self.cleanup();
        Ok(())
    }

    fn draw(&mut self, app: &App) -> Result<()> {
        self.terminal.draw(|f| draw::draw_app(f, app))?;
        Ok(())
    }

    fn cleanup(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

impl Drop for JobsTui {
    fn drop(&mut self) {
        self.cleanup();
    }
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}
