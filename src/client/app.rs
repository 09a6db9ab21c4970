//! Navigation shell: owns the listing, the active interview session and the
//! tasks running backend calls on their behalf.

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::Instant;
use uuid::Uuid;

use super::http::JobBackend;
use crate::core::{Config, Effect, InterviewSession, Job, JobPage, ListingState, Phase, SearchRequest};
use crate::utils::tui_writer::LogEntry;

const MAX_LOG_ENTRIES: usize = 50;
/// Rows moved per PageUp / PageDown in the transcript
const TRANSCRIPT_PAGE: u16 = 5;

/// Results of work spawned by the shell, tagged with what requested them.
#[derive(Debug)]
pub enum BackendEvent {
    Search { seq: u64, result: Result<JobPage> },
    Questions { session: Uuid, result: Result<Vec<String>> },
    AnswerFeedback { session: Uuid, result: Result<String> },
    NextQuestionDue { session: Uuid },
    FinalFeedback { session: Uuid, result: Result<String> },
}

pub struct InterviewView {
    pub session: InterviewSession,
    pub input: String,
    scroll_back: u16,
    tasks: Vec<JoinHandle<()>>,
}

impl InterviewView {
    /// Rows scrolled up from the newest transcript line
    pub fn scroll_back(&self) -> u16 {
        self.scroll_back
    }

    fn abort_tasks(&mut self) {
        for task in self.tasks.drain(..) {
            task.abort();
        }
    }
}

pub enum View {
    Jobs,
    Interview(Box<InterviewView>),
}

pub struct App {
    backend: Arc<dyn JobBackend>,
    events_tx: mpsc::UnboundedSender<BackendEvent>,
    listing: ListingState,
    view: View,
    search_focused: bool,
    advance_delay: Duration,
    status_message: String,
    logs: Vec<LogEntry>,
}

impl App {
    pub fn new(
        backend: Arc<dyn JobBackend>,
        config: &Config,
    ) -> (Self, mpsc::UnboundedReceiver<BackendEvent>) {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        let listing = ListingState::new(
            config.search.default_query.clone(),
            config.search.page_size,
            config.search.debounce(),
        );

        let app = Self {
            backend,
            events_tx,
            listing,
            view: View::Jobs,
            search_focused: false,
            advance_delay: config.interview.advance_delay(),
            status_message: "Press / to search, Enter to start an interview".to_string(),
            logs: Vec::new(),
        };
        (app, events_rx)
    }

    pub fn listing(&self) -> &ListingState {
        &self.listing
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn interview(&self) -> Option<&InterviewView> {
        match &self.view {
            View::Interview(view) => Some(view),
            View::Jobs => None,
        }
    }

    pub fn is_search_focused(&self) -> bool {
        self.search_focused
    }

    pub fn status_message(&self) -> &str {
        &self.status_message
    }

    pub fn logs(&self) -> &[LogEntry] {
        &self.logs
    }

    pub fn add_log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        if self.logs.len() > MAX_LOG_ENTRIES {
            self.logs.drain(0..(self.logs.len() - MAX_LOG_ENTRIES));
        }
    }

    /// Issue the default query for the listing's first display.
    pub fn start(&mut self) {
        let request = self.listing.initial_search();
        self.spawn_search(request);
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        match self.view {
            View::Jobs => self.listing.debounce_deadline(),
            View::Interview(_) => None,
        }
    }

    pub fn poll_debounce(&mut self, now: Instant) {
        if let Some(request) = self.listing.poll_debounce(now) {
            self.spawn_search(request);
        }
    }

    pub fn start_interview(&mut self, job: Job) {
        tracing::info!("Starting interview simulation for: {} at {}", job.title, job.company);
        let (session, effect) = InterviewSession::with_advance_delay(job, self.advance_delay);
        self.view = View::Interview(Box::new(InterviewView {
            session,
            input: String::new(),
            scroll_back: 0,
            tasks: Vec::new(),
        }));
        self.search_focused = false;
        self.run_effect(effect);
    }

    /// Leave the interview. Pending calls are aborted and anything they still
    /// deliver is dropped because the session id no longer matches.
    pub fn back_to_jobs(&mut self) {
        if let View::Interview(view) = &mut self.view {
            tracing::debug!("Leaving interview session {}", view.session.id());
            view.abort_tasks();
        }
        self.view = View::Jobs;
        self.status_message = "Press / to search, Enter to start an interview".to_string();
    }

    pub fn submit_answer(&mut self) {
        let effect = match &mut self.view {
            View::Interview(view) => {
                let effect = view.session.submit_answer(&view.input);
                if effect.is_some() {
                    view.input.clear();
                    view.scroll_back = 0;
                }
                effect
            }
            View::Jobs => None,
        };
        if let Some(effect) = effect {
            self.run_effect(effect);
        }
    }

    pub fn advance_interview(&mut self) {
        let effect = match &mut self.view {
            View::Interview(view) => view.session.advance(),
            View::Jobs => None,
        };
        if let Some(effect) = effect {
            self.run_effect(effect);
        }
    }

    pub fn handle_backend_event(&mut self, event: BackendEvent) {
        match event {
            BackendEvent::Search { seq, result } => {
                self.listing.apply_result(seq, result);
            }
            BackendEvent::Questions { session, result } => {
                if let Some(view) = self.session_view(session) {
                    view.session.on_questions(result);
                    view.scroll_back = 0;
                }
            }
            BackendEvent::AnswerFeedback { session, result } => {
                if let Some(view) = self.session_view(session) {
                    view.session.on_answer_feedback(result);
                    view.scroll_back = 0;
                }
            }
            BackendEvent::NextQuestionDue { session } => {
                if let Some(view) = self.session_view(session) {
                    view.session.on_next_question_due();
                    view.scroll_back = 0;
                }
            }
            BackendEvent::FinalFeedback { session, result } => {
                if let Some(view) = self.session_view(session) {
                    view.session.on_final_feedback(result);
                    view.scroll_back = 0;
                }
            }
        }
    }

    /// Returns true when the user asked to quit.
    pub fn handle_key(&mut self, key: KeyEvent) -> bool {
        if key.code == KeyCode::Char('c') && key.modifiers.contains(KeyModifiers::CONTROL) {
            return true;
        }

        match self.view {
            View::Jobs => self.handle_jobs_key(key),
            View::Interview(_) => {
                self.handle_interview_key(key);
                false
            }
        }
    }

    fn handle_jobs_key(&mut self, key: KeyEvent) -> bool {
        let now = Instant::now();

        if self.search_focused {
            match key.code {
                KeyCode::Enter => {
                    self.search_focused = false;
                    if let Some(request) = self.listing.submit() {
                        self.spawn_search(request);
                    }
                }
                KeyCode::Esc => self.search_focused = false,
                KeyCode::Backspace => self.listing.pop_char(now),
                KeyCode::Char(c) => self.listing.push_char(c, now),
                _ => {}
            }
            return false;
        }

        match key.code {
            KeyCode::Char('q') => return true,
            KeyCode::Char('/') => self.search_focused = true,
            KeyCode::Up | KeyCode::Char('k') => self.listing.select_previous(),
            KeyCode::Down | KeyCode::Char('j') => self.listing.select_next(),
            KeyCode::Char(' ') => self.listing.toggle_expanded(),
            KeyCode::Char('t') => self.listing.cycle_job_type_filter(),
            KeyCode::Char('l') => self.listing.cycle_level_filter(now),
            KeyCode::Char('o') => self.open_selected_posting(),
            KeyCode::Enter | KeyCode::Char('i') => {
                if let Some(job) = self.listing.selected_job().cloned() {
                    self.start_interview(job);
                }
            }
            _ => {}
        }
        false
    }

    fn handle_interview_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Esc => {
                self.back_to_jobs();
                return;
            }
            KeyCode::PageUp => {
                if let Some(view) = self.interview_mut() {
                    view.scroll_back = view.scroll_back.saturating_add(TRANSCRIPT_PAGE);
                }
                return;
            }
            KeyCode::PageDown => {
                if let Some(view) = self.interview_mut() {
                    view.scroll_back = view.scroll_back.saturating_sub(TRANSCRIPT_PAGE);
                }
                return;
            }
            _ => {}
        }

        let Some(phase) = self.interview().map(|view| view.session.phase().clone()) else {
            return;
        };

        match phase {
            Phase::AwaitingAnswer => match key.code {
                KeyCode::Enter if key.modifiers.contains(KeyModifiers::ALT) => {
                    self.edit_input(|input| input.push('\n'));
                }
                KeyCode::Enter => self.submit_answer(),
                KeyCode::Backspace => self.edit_input(|input| {
                    input.pop();
                }),
                KeyCode::Char(c) => self.edit_input(|input| input.push(c)),
                _ => {}
            },
            Phase::AwaitingNext => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char('n')) {
                    self.advance_interview();
                }
            }
            Phase::Complete { .. } | Phase::Error { .. } => {
                if key.code == KeyCode::Enter {
                    self.back_to_jobs();
                }
            }
            // Input stays disabled while a request or the pacing delay is pending
            _ => {}
        }
    }

    fn edit_input(&mut self, edit: impl FnOnce(&mut String)) {
        if let Some(view) = self.interview_mut() {
            edit(&mut view.input);
        }
    }

    fn open_selected_posting(&mut self) {
        let Some(link) = self.listing.selected_job().and_then(|job| job.job_link.clone()) else {
            self.status_message = "This posting has no link".to_string();
            return;
        };
        match open::that(&link) {
            Ok(()) => self.status_message = "Posting opened in browser".to_string(),
            Err(e) => self.status_message = format!("Failed to open browser: {}", e),
        }
    }

    fn interview_mut(&mut self) -> Option<&mut InterviewView> {
        match &mut self.view {
            View::Interview(view) => Some(view),
            View::Jobs => None,
        }
    }

    fn session_view(&mut self, session: Uuid) -> Option<&mut InterviewView> {
        match self.interview_mut() {
            Some(view) if view.session.id() == session => Some(view),
            _ => {
                tracing::debug!("Discarding result for inactive session {}", session);
                None
            }
        }
    }

    fn spawn_search(&self, request: SearchRequest) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        tokio::spawn(async move {
            let result = backend.search_jobs(&request.params).await;
            let _ = tx.send(BackendEvent::Search {
                seq: request.seq,
                result,
            });
        });
    }

    fn run_effect(&mut self, effect: Effect) {
        let backend = Arc::clone(&self.backend);
        let tx = self.events_tx.clone();
        let Some(view) = self.interview_mut() else {
            return;
        };
        let session = view.session.id();

        let task = match effect {
            Effect::FetchQuestions(job) => tokio::spawn(async move {
                let result = backend.get_interview_questions(&job).await;
                let _ = tx.send(BackendEvent::Questions { session, result });
            }),
            Effect::FetchFeedback { job, questions } => tokio::spawn(async move {
                let result = backend.get_feedback(&job, &questions).await;
                let _ = tx.send(BackendEvent::AnswerFeedback { session, result });
            }),
            Effect::ShowNextQuestionAfter(delay) => tokio::spawn(async move {
                tokio::time::sleep(delay).await;
                let _ = tx.send(BackendEvent::NextQuestionDue { session });
            }),
            Effect::FetchFinalFeedback { job, questions } => tokio::spawn(async move {
                let result = backend.get_feedback(&job, &questions).await;
                let _ = tx.send(BackendEvent::FinalFeedback { session, result });
            }),
        };

        view.tasks.retain(|t| !t.is_finished());
        view.tasks.push(task);
    }
}
