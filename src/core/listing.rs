use std::time::Duration;

use anyhow::Result;
use tokio::time::Instant;

use super::job::{Job, JobPage, SearchParams};

pub const DEFAULT_QUERY: &str = "software engineer";
pub const DEFAULT_PAGE_SIZE: u32 = 5;
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(500);

/// Experience levels offered by the server-side level filter
pub const LEVEL_OPTIONS: [&str; 6] = [
    "Entry level",
    "Mid level",
    "Senior",
    "Lead",
    "Principal",
    "Director",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum Filter {
    #[default]
    All,
    Only(String),
}

impl Filter {
    pub fn label(&self, all_label: &str) -> String {
        match self {
            Filter::All => all_label.to_string(),
            Filter::Only(value) => value.clone(),
        }
    }

    /// Step to the option after the current one, wrapping back to `All`.
    fn cycle(&self, options: &[String]) -> Filter {
        let next = match self {
            Filter::All => 0,
            Filter::Only(current) => match options.iter().position(|o| o == current) {
                Some(pos) => pos + 1,
                None => options.len(),
            },
        };
        options
            .get(next)
            .map(|option| Filter::Only(option.clone()))
            .unwrap_or(Filter::All)
    }
}

/// Case-insensitive job-type predicate over an already fetched page
pub fn filter_by_job_type<'a>(jobs: &'a [Job], filter: &Filter) -> Vec<&'a Job> {
    match filter {
        Filter::All => jobs.iter().collect(),
        Filter::Only(job_type) => jobs
            .iter()
            .filter(|job| job.job_type.eq_ignore_ascii_case(job_type))
            .collect(),
    }
}

/// Search-as-you-type deadline tracking
#[derive(Debug, Clone)]
pub struct Debouncer {
    window: Duration,
    deadline: Option<Instant>,
}

impl Debouncer {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            deadline: None,
        }
    }

    pub fn schedule(&mut self, now: Instant) {
        self.deadline = Some(now + self.window);
    }

    pub fn cancel(&mut self) {
        self.deadline = None;
    }

    pub fn deadline(&self) -> Option<Instant> {
        self.deadline
    }

    /// Clears and reports the deadline once it has passed.
    pub fn take_due(&mut self, now: Instant) -> bool {
        match self.deadline {
            Some(deadline) if now >= deadline => {
                self.deadline = None;
                true
            }
            _ => false,
        }
    }
}

/// A search the listing wants issued. `seq` tags the response so that
/// results of superseded searches can be dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequest {
    pub seq: u64,
    pub params: SearchParams,
}

#[derive(Debug, Clone)]
pub struct ListingState {
    search_term: String,
    job_type_filter: Filter,
    level_filter: Filter,
    jobs: Vec<Job>,
    total: u64,
    loading: bool,
    error: Option<String>,
    selected: usize,
    expanded: bool,
    default_query: String,
    page_size: u32,
    debounce: Debouncer,
    next_seq: u64,
    in_flight: Option<u64>,
}

impl Default for ListingState {
    fn default() -> Self {
        Self::new(DEFAULT_QUERY.to_string(), DEFAULT_PAGE_SIZE, DEFAULT_DEBOUNCE)
    }
}

impl ListingState {
    pub fn new(default_query: String, page_size: u32, debounce: Duration) -> Self {
        Self {
            search_term: String::new(),
            job_type_filter: Filter::All,
            level_filter: Filter::All,
            jobs: Vec::new(),
            total: 0,
            loading: false,
            error: None,
            selected: 0,
            expanded: false,
            default_query,
            page_size,
            debounce: Debouncer::new(debounce),
            next_seq: 0,
            in_flight: None,
        }
    }

    pub fn search_term(&self) -> &str {
        &self.search_term
    }

    pub fn job_type_filter(&self) -> &Filter {
        &self.job_type_filter
    }

    pub fn level_filter(&self) -> &Filter {
        &self.level_filter
    }

    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn is_expanded(&self) -> bool {
        self.expanded
    }

    pub fn selected_index(&self) -> usize {
        self.selected
    }

    pub fn debounce_deadline(&self) -> Option<Instant> {
        self.debounce.deadline()
    }

    /// The default query issued when the listing is first shown
    pub fn initial_search(&mut self) -> SearchRequest {
        let params = SearchParams {
            query: self.default_query.clone(),
            limit: Some(self.page_size),
            ..Default::default()
        };
        self.begin(params)
    }

    pub fn set_search_term(&mut self, text: impl Into<String>, now: Instant) {
        self.search_term = text.into();
        self.rearm(now);
    }

    pub fn push_char(&mut self, c: char, now: Instant) {
        self.search_term.push(c);
        self.rearm(now);
    }

    pub fn pop_char(&mut self, now: Instant) {
        self.search_term.pop();
        self.rearm(now);
    }

    pub fn set_level_filter(&mut self, filter: Filter, now: Instant) {
        self.level_filter = filter;
        self.rearm(now);
    }

    pub fn cycle_level_filter(&mut self, now: Instant) {
        let options: Vec<String> = LEVEL_OPTIONS.iter().map(|l| l.to_string()).collect();
        let next = self.level_filter.cycle(&options);
        self.set_level_filter(next, now);
    }

    /// Job types are filtered locally; this never produces a request.
    pub fn set_job_type_filter(&mut self, filter: Filter) {
        self.job_type_filter = filter;
        self.clamp_selection();
    }

    pub fn cycle_job_type_filter(&mut self) {
        let next = self.job_type_filter.cycle(&self.job_type_options());
        self.set_job_type_filter(next);
    }

    /// Fire the debounced search once its window has elapsed.
    pub fn poll_debounce(&mut self, now: Instant) -> Option<SearchRequest> {
        if !self.debounce.take_due(now) {
            return None;
        }
        self.current_search()
    }

    /// Explicit submit: bypasses and cancels any pending debounce.
    pub fn submit(&mut self) -> Option<SearchRequest> {
        if self.loading || self.search_term.trim().is_empty() {
            return None;
        }
        self.debounce.cancel();
        self.current_search()
    }

    pub fn apply_result(&mut self, seq: u64, result: Result<JobPage>) {
        if self.in_flight != Some(seq) {
            tracing::debug!("Discarding stale search response #{}", seq);
            return;
        }
        self.in_flight = None;
        self.loading = false;
        self.selected = 0;
        self.expanded = false;

        match result {
            Ok(page) => {
                tracing::debug!("Search #{} returned {} of {} jobs", seq, page.jobs.len(), page.total);
                self.jobs = page.jobs;
                self.total = page.total;
                self.error = None;
            }
            Err(e) => {
                self.jobs.clear();
                self.total = 0;
                self.error = Some(format!("{:#}", e));
            }
        }
    }

    /// The last fetched page with the local job-type filter applied
    pub fn visible_jobs(&self) -> Vec<&Job> {
        filter_by_job_type(&self.jobs, &self.job_type_filter)
    }

    /// Distinct job types in the current page, in first-seen order
    pub fn job_type_options(&self) -> Vec<String> {
        let mut options: Vec<String> = Vec::new();
        for job in &self.jobs {
            if !options.contains(&job.job_type) {
                options.push(job.job_type.clone());
            }
        }
        options
    }

    pub fn summary(&self) -> String {
        let mut summary = format!(
            "Showing {} of {} jobs",
            self.visible_jobs().len(),
            self.total
        );
        if !self.search_term.is_empty() {
            summary.push_str(&format!(" for \"{}\"", self.search_term));
        }
        summary
    }

    pub fn empty_hint(&self) -> &'static str {
        if self.search_term.is_empty() {
            "Enter a search term to find jobs."
        } else {
            "Try searching for different keywords or adjusting your filters."
        }
    }

    pub fn selected_job(&self) -> Option<&Job> {
        self.visible_jobs().get(self.selected).copied()
    }

    pub fn select_next(&mut self) {
        let count = self.visible_jobs().len();
        if count > 0 && self.selected + 1 < count {
            self.selected += 1;
            self.expanded = false;
        }
    }

    pub fn select_previous(&mut self) {
        if self.selected > 0 {
            self.selected -= 1;
            self.expanded = false;
        }
    }

    pub fn toggle_expanded(&mut self) {
        if self.selected_job().is_some() {
            self.expanded = !self.expanded;
        }
    }

    fn rearm(&mut self, now: Instant) {
        if self.search_term.trim().is_empty() {
            self.debounce.cancel();
        } else {
            self.debounce.schedule(now);
        }
    }

    fn current_search(&mut self) -> Option<SearchRequest> {
        let query = self.search_term.trim();
        if query.is_empty() {
            return None;
        }
        let params = SearchParams {
            query: query.to_string(),
            limit: Some(self.page_size),
            tech_skills: None,
            job_level: match &self.level_filter {
                Filter::All => None,
                Filter::Only(level) => Some(level.clone()),
            },
        };
        Some(self.begin(params))
    }

    fn begin(&mut self, params: SearchParams) -> SearchRequest {
        self.next_seq += 1;
        let seq = self.next_seq;
        self.in_flight = Some(seq);
        self.loading = true;
        self.error = None;
        tracing::info!("Searching jobs for '{}' (level: {:?})", params.query, params.job_level);
        SearchRequest { seq, params }
    }

    fn clamp_selection(&mut self) {
        let count = self.visible_jobs().len();
        if self.selected >= count {
            self.selected = count.saturating_sub(1);
        }
        self.expanded = false;
    }
}
