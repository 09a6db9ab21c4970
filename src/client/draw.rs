use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
    Frame,
};

use super::app::{App, InterviewView, View};
use crate::core::description::{
    format_first_seen, parse_description, skill_badges, truncate_description, DescriptionBlock,
    COLLAPSED_DESCRIPTION_LEN, MAX_SKILL_BADGES,
};
use crate::core::{Job, ListingState, MessageKind, Phase};
use crate::utils::tui_writer::{LogEntry, LogLevel};

pub fn draw_app(f: &mut Frame, app: &App) {
    match app.view() {
        View::Jobs => draw_jobs(f, app),
        View::Interview(view) => draw_interview(f, view, app.logs()),
    }
}

fn job_type_color(job_type: &str) -> Color {
    match job_type.to_lowercase().as_str() {
        "remote" => Color::Green,
        "hybrid" => Color::Blue,
        "onsite" => Color::Magenta,
        _ => Color::Gray,
    }
}

fn level_color(level: &str) -> Color {
    match level.to_lowercase().as_str() {
        "senior" => Color::LightRed,
        "mid senior" => Color::Yellow,
        "junior" => Color::Cyan,
        _ => Color::Gray,
    }
}

fn badge(text: &str, color: Color) -> Span<'static> {
    Span::styled(
        format!(" {} ", text),
        Style::default().fg(Color::Black).bg(color),
    )
}

fn draw_jobs(f: &mut Frame, app: &App) {
    let listing = app.listing();
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(3), // Search and filters
            Constraint::Length(1), // Summary / banner
            Constraint::Min(8),    // Jobs
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Tech Jobs",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            "Browse available tech positions and start interview simulations",
            Style::default().fg(Color::Gray),
        )),
    ])
    .alignment(Alignment::Center)
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    draw_search_bar(f, chunks[1], listing, app.is_search_focused());
    draw_summary(f, chunks[2], listing);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(40), Constraint::Percentage(60)])
        .split(chunks[3]);

    let visible = listing.visible_jobs();
    if listing.is_loading() {
        let loading = Paragraph::new("Loading jobs...")
            .style(Style::default().fg(Color::Gray))
            .alignment(Alignment::Center)
            .block(Block::default().borders(Borders::ALL).title("Jobs"));
        f.render_widget(loading, chunks[3]);
    } else if visible.is_empty() {
        let empty = Paragraph::new(vec![
            Line::from(Span::styled(
                "No jobs found",
                Style::default().add_modifier(Modifier::BOLD),
            )),
            Line::from(""),
            Line::from(listing.empty_hint()),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).title("Jobs"));
        f.render_widget(empty, chunks[3]);
    } else {
        draw_job_list(f, body[0], &visible, listing.selected_index());
        if let Some(job) = listing.selected_job() {
            draw_job_card(f, body[1], job, listing.is_expanded());
        }
    }

    let footer_text = match app.logs().last() {
        Some(entry)
            if listing.error().is_some()
                && (entry.level == LogLevel::Error || entry.level == LogLevel::Warn) =>
        {
            format!("{} | {}", app.status_message(), entry.message)
        }
        _ => format!(
            "{} | /: Search  t: Type  l: Level  Space: Expand  o: Open  q: Quit",
            app.status_message()
        ),
    };
    let footer = Paragraph::new(footer_text).style(Style::default().fg(Color::Gray));
    f.render_widget(footer, chunks[4]);
}

fn draw_search_bar(f: &mut Frame, area: Rect, listing: &ListingState, focused: bool) {
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage(50),
            Constraint::Percentage(25),
            Constraint::Percentage(25),
        ])
        .split(area);

    let border = if focused { Color::Yellow } else { Color::Blue };
    let search_text = if listing.search_term().is_empty() && !focused {
        Span::styled(
            "e.g. software engineer, data scientist, product manager...",
            Style::default().fg(Color::DarkGray),
        )
    } else {
        let cursor = if focused { "_" } else { "" };
        Span::raw(format!("{}{}", listing.search_term(), cursor))
    };
    let search = Paragraph::new(Line::from(search_text)).block(
        Block::default()
            .title("Search Jobs")
            .borders(Borders::ALL)
            .border_style(Style::default().fg(border)),
    );
    f.render_widget(search, columns[0]);

    let job_type = Paragraph::new(listing.job_type_filter().label("All Types"))
        .block(Block::default().title("Job Type [t]").borders(Borders::ALL));
    f.render_widget(job_type, columns[1]);

    let level = Paragraph::new(listing.level_filter().label("All Levels")).block(
        Block::default()
            .title("Experience Level [l]")
            .borders(Borders::ALL),
    );
    f.render_widget(level, columns[2]);
}

fn draw_summary(f: &mut Frame, area: Rect, listing: &ListingState) {
    let line = if let Some(error) = listing.error() {
        Line::from(vec![
            Span::styled(
                "Error loading jobs: ",
                Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
            ),
            Span::styled(error.to_string(), Style::default().fg(Color::Red)),
        ])
    } else if listing.is_loading() {
        Line::from(Span::styled("Loading jobs...", Style::default().fg(Color::Gray)))
    } else {
        Line::from(Span::styled(listing.summary(), Style::default().fg(Color::Gray)))
    };
    f.render_widget(Paragraph::new(line), area);
}

fn draw_job_list(f: &mut Frame, area: Rect, jobs: &[&Job], selected: usize) {
    let items: Vec<ListItem> = jobs
        .iter()
        .map(|job| {
            ListItem::new(vec![
                Line::from(Span::styled(
                    job.title.clone(),
                    Style::default().add_modifier(Modifier::BOLD),
                )),
                Line::from(vec![
                    Span::styled(job.company.clone(), Style::default().fg(Color::Blue)),
                    Span::raw(" · "),
                    Span::styled(job.job_type.clone(), Style::default().fg(job_type_color(&job.job_type))),
                ]),
            ])
        })
        .collect();

    let list = List::new(items)
        .block(Block::default().title("Jobs").borders(Borders::ALL))
        .highlight_style(Style::default().bg(Color::DarkGray))
        .highlight_symbol("▶ ");

    let mut state = ListState::default();
    state.select(Some(selected));
    f.render_stateful_widget(list, area, &mut state);
}

fn draw_job_card(f: &mut Frame, area: Rect, job: &Job, expanded: bool) {
    let mut lines = vec![
        Line::from(vec![
            Span::styled(
                job.title.clone(),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(
                format_first_seen(&job.first_seen),
                Style::default().fg(Color::Gray),
            ),
        ]),
        Line::from(Span::styled(
            job.company.clone(),
            Style::default().fg(Color::Blue).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(job.location.clone(), Style::default().fg(Color::Gray))),
        Line::from(""),
        Line::from(vec![
            badge(&job.job_type, job_type_color(&job.job_type)),
            Span::raw(" "),
            badge(&job.job_level, level_color(&job.job_level)),
        ]),
        Line::from(""),
    ];

    if expanded {
        for block in parse_description(&job.description) {
            match block {
                DescriptionBlock::Heading(text) => {
                    lines.push(Line::from(Span::styled(
                        text,
                        Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
                    )));
                }
                DescriptionBlock::Paragraph(text) => {
                    lines.push(Line::from(text));
                    lines.push(Line::from(""));
                }
                DescriptionBlock::List(items) => {
                    for item in items {
                        lines.push(Line::from(format!("  • {}", item)));
                    }
                    lines.push(Line::from(""));
                }
            }
        }
    } else {
        lines.push(Line::from(truncate_description(
            &job.description,
            COLLAPSED_DESCRIPTION_LEN,
        )));
        lines.push(Line::from(""));
    }

    lines.push(Line::from(Span::styled(
        "Required Skills:",
        Style::default().add_modifier(Modifier::BOLD),
    )));
    let mut skills = Vec::new();
    for skill in skill_badges(&job.skills, MAX_SKILL_BADGES) {
        skills.push(badge(&skill, Color::Gray));
        skills.push(Span::raw(" "));
    }
    lines.push(Line::from(skills));
    lines.push(Line::from(""));
    lines.push(Line::from(Span::styled(
        "[Enter] Start Interview Simulation",
        Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
    )));

    let title = if expanded { "Details (Space: collapse)" } else { "Details (Space: expand)" };
    let card = Paragraph::new(lines)
        .block(Block::default().title(title).borders(Borders::ALL))
        .wrap(Wrap { trim: true });
    f.render_widget(card, area);
}

fn draw_interview(f: &mut Frame, view: &InterviewView, logs: &[LogEntry]) {
    let session = &view.session;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header
            Constraint::Length(1), // Progress
            Constraint::Min(5),    // Transcript
            Constraint::Length(5), // Input / completion
            Constraint::Length(1), // Footer
        ])
        .split(f.area());

    let job = session.job();
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            "Interview Simulation",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(
            format!("{} at {}", job.title, job.company),
            Style::default().fg(Color::Gray),
        )),
    ])
    .block(Block::default().borders(Borders::BOTTOM));
    f.render_widget(header, chunks[0]);

    match session.phase() {
        Phase::LoadingQuestions => {
            let loading = Paragraph::new("Loading interview questions...")
                .style(Style::default().fg(Color::Gray))
                .alignment(Alignment::Center);
            f.render_widget(loading, chunks[2]);
        }
        Phase::Error { message } => {
            let error = Paragraph::new(vec![
                Line::from(Span::styled(
                    message.clone(),
                    Style::default().fg(Color::Red),
                )),
                Line::from(""),
                Line::from("Press Enter or Esc to go back"),
            ])
            .alignment(Alignment::Center);
            f.render_widget(error, chunks[2]);
        }
        _ => {
            draw_progress(f, chunks[1], view);
            draw_transcript(f, chunks[2], view);
            draw_input(f, chunks[3], view);
        }
    }

    let footer_text = match logs.last() {
        Some(entry) if matches!(session.phase(), Phase::Error { .. }) && entry.level == LogLevel::Error => {
            format!("Esc: Back to Jobs | {}", entry.message)
        }
        _ => "Esc: Back to Jobs | PgUp/PgDn: Scroll | Ctrl+C: Quit".to_string(),
    };
    let footer = Paragraph::new(footer_text).style(Style::default().fg(Color::Gray));
    f.render_widget(footer, chunks[4]);
}

fn draw_progress(f: &mut Frame, area: Rect, view: &InterviewView) {
    let session = &view.session;
    let dots: String = (0..session.questions().len())
        .map(|i| if i <= session.current_index() { '●' } else { '○' })
        .collect();
    let line = Line::from(vec![
        Span::styled(session.progress_label(), Style::default().fg(Color::Gray)),
        Span::raw("  "),
        Span::styled(dots, Style::default().fg(Color::Blue)),
    ]);
    f.render_widget(Paragraph::new(line), area);
}

fn draw_transcript(f: &mut Frame, area: Rect, view: &InterviewView) {
    let session = &view.session;
    let mut lines: Vec<Line> = Vec::new();

    for message in session.transcript() {
        let (label, style, alignment) = match message.kind {
            MessageKind::Question => (
                "Interviewer",
                Style::default().fg(Color::White),
                Alignment::Left,
            ),
            MessageKind::Answer => ("You", Style::default().fg(Color::LightBlue), Alignment::Right),
            MessageKind::Feedback => (
                "Feedback",
                Style::default().fg(Color::Green),
                Alignment::Left,
            ),
        };
        lines.push(
            Line::from(Span::styled(
                label,
                style.add_modifier(Modifier::BOLD),
            ))
            .alignment(alignment),
        );
        for text in message.content.lines() {
            lines.push(Line::from(Span::styled(text.to_string(), style)).alignment(alignment));
        }
        lines.push(Line::from(""));
    }

    match session.phase() {
        Phase::LoadingFeedback => lines.push(Line::from(Span::styled(
            "Generating feedback...",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ))),
        Phase::LoadingFinalFeedback => lines.push(Line::from(Span::styled(
            "Preparing your overall feedback...",
            Style::default().fg(Color::Gray).add_modifier(Modifier::ITALIC),
        ))),
        Phase::Complete { feedback } => {
            lines.push(
                Line::from(Span::styled(
                    "Interview Complete!",
                    Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
                ))
                .alignment(Alignment::Center),
            );
            lines.push(Line::from(""));
            for text in feedback.lines() {
                lines.push(Line::from(text.to_string()));
            }
        }
        _ => {}
    }

    let block = Block::default()
        .borders(Borders::ALL)
        .title("Transcript (PgUp/PgDn: scroll)");
    let inner = block.inner(area);
    let transcript = Paragraph::new(lines).wrap(Wrap { trim: false });

    // Pin the newest wrapped row to the bottom unless the user scrolled back
    let rows = transcript.line_count(inner.width);
    let max_scroll = rows.saturating_sub(inner.height as usize);
    let scroll = max_scroll.saturating_sub(view.scroll_back() as usize);

    let transcript = transcript
        .block(block)
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    f.render_widget(transcript, area);
}

fn draw_input(f: &mut Frame, area: Rect, view: &InterviewView) {
    let session = &view.session;
    let (title, body, style) = match session.phase() {
        Phase::AwaitingAnswer => (
            "Your answer (Enter: send, Alt+Enter: newline)",
            if view.input.is_empty() {
                "Type your answer here...".to_string()
            } else {
                format!("{}_", view.input)
            },
            Style::default().fg(Color::White),
        ),
        Phase::AwaitingNext if session.has_more_questions() => (
            "Ready",
            "Press Enter for the next question".to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Phase::AwaitingNext => (
            "Ready",
            "Press Enter to finish and get your overall feedback".to_string(),
            Style::default().fg(Color::Yellow),
        ),
        Phase::Complete { .. } => (
            "Done",
            "You've answered all the questions. Great job! Press Enter to go back to jobs".to_string(),
            Style::default().fg(Color::Green),
        ),
        _ => (
            "Please wait",
            String::new(),
            Style::default().fg(Color::DarkGray),
        ),
    };

    let input = Paragraph::new(body)
        .style(style)
        .wrap(Wrap { trim: false })
        .block(Block::default().title(title).borders(Borders::ALL));
    f.render_widget(input, area);
}
