//! Text helpers for rendering a job card.

use chrono::NaiveDate;
use regex::Regex;
use std::sync::OnceLock;

pub const COLLAPSED_DESCRIPTION_LEN: usize = 200;
pub const MAX_SKILL_BADGES: usize = 6;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DescriptionBlock {
    Heading(String),
    Paragraph(String),
    List(Vec<String>),
}

fn markup_chars() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"[#*-]").expect("valid markup regex"))
}

fn newline_runs() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\n+").expect("valid newline regex"))
}

/// Plain-text preview of a markdown-ish description, cut to `max_len` chars.
pub fn truncate_description(description: &str, max_len: usize) -> String {
    let stripped = markup_chars().replace_all(description, "");
    let flattened = newline_runs().replace_all(&stripped, " ");
    let plain = flattened.trim();

    if plain.chars().count() > max_len {
        let cut: String = plain.chars().take(max_len).collect();
        format!("{}...", cut)
    } else {
        plain.to_string()
    }
}

fn bullet_text(line: &str) -> Option<&str> {
    ["* ", "- ", "• "]
        .iter()
        .find_map(|marker| line.strip_prefix(marker))
        .map(str::trim)
}

/// Minimal structural parse for the expanded description view. Blank or
/// whitespace-only lines end the current paragraph or list.
pub fn parse_description(description: &str) -> Vec<DescriptionBlock> {
    let mut blocks = Vec::new();
    let mut paragraph: Vec<&str> = Vec::new();
    let mut items: Vec<String> = Vec::new();

    for raw in description.lines() {
        let line = raw.trim();
        if line.is_empty() {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut items);
        } else if line.starts_with('#') {
            flush_paragraph(&mut blocks, &mut paragraph);
            flush_list(&mut blocks, &mut items);
            let heading = line.trim_start_matches('#').trim();
            if !heading.is_empty() {
                blocks.push(DescriptionBlock::Heading(heading.to_string()));
            }
        } else if let Some(item) = bullet_text(line) {
            flush_paragraph(&mut blocks, &mut paragraph);
            items.push(item.to_string());
        } else {
            flush_list(&mut blocks, &mut items);
            paragraph.push(line);
        }
    }

    flush_paragraph(&mut blocks, &mut paragraph);
    flush_list(&mut blocks, &mut items);
    blocks
}

fn flush_paragraph(blocks: &mut Vec<DescriptionBlock>, lines: &mut Vec<&str>) {
    if !lines.is_empty() {
        blocks.push(DescriptionBlock::Paragraph(lines.join(" ")));
        lines.clear();
    }
}

fn flush_list(blocks: &mut Vec<DescriptionBlock>, items: &mut Vec<String>) {
    if !items.is_empty() {
        blocks.push(DescriptionBlock::List(std::mem::take(items)));
    }
}

/// `2023-12-25` -> `Dec 25, 2023`; anything unparseable is shown as-is.
pub fn format_first_seen(first_seen: &str) -> String {
    match NaiveDate::parse_from_str(first_seen.trim(), "%Y-%m-%d") {
        Ok(date) => date.format("%b %-d, %Y").to_string(),
        Err(_) => first_seen.to_string(),
    }
}

/// Up to `max` skills followed by a `+N more` badge when some were left out
pub fn skill_badges(skills: &[String], max: usize) -> Vec<String> {
    let mut badges: Vec<String> = skills.iter().take(max).cloned().collect();
    if skills.len() > max {
        badges.push(format!("+{} more", skills.len() - max));
    }
    badges
}
