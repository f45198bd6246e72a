//! Terminal rendering of stories and history
//!
//! Pure presentation: nothing here mutates application state except the
//! self-contained [`CopyFeedback`] signal.

use crate::history::HistoryEntry;
use crate::story::StoryResult;
use crate::themes::{self, Theme};
use chrono::{Local, TimeZone};
use colored::Colorize;
use prettytable::{format, Table};
use std::time::Duration;
use tokio::time::Instant;

/// How long the copy confirmation stays visible
pub const COPY_FEEDBACK_DURATION: Duration = Duration::from_secs(2);

/// Plain-text block produced by the copy action
///
/// # Examples
///
/// ```
/// use microfavola::render::clipboard_text;
/// use microfavola::story::StoryResult;
///
/// let story = StoryResult::new("Titolo", "Corpo", "Finale");
/// assert_eq!(clipboard_text(&story), "Titolo\n\nCorpo\n\nFinale");
/// ```
pub fn clipboard_text(story: &StoryResult) -> String {
    format!("{}\n\n{}\n\n{}", story.title, story.content, story.twist)
}

/// Render a story card
pub fn render_story(story: &StoryResult, theme: Option<&Theme>) -> String {
    let tag = theme
        .map(|t| format!("{} {}", t.icon, t.label.to_uppercase()))
        .unwrap_or_default();

    let mut out = String::new();
    if !tag.is_empty() {
        out.push_str(&format!("{}\n", tag.cyan()));
    }
    out.push_str(&format!("{}\n\n", story.title.bold()));
    out.push_str(&format!("{}\n\n", story.content));
    out.push_str(&format!("{}", story.twist.italic().yellow()));
    out
}

/// Render the loading placeholder
pub fn render_loading(theme: &Theme) -> String {
    format!(
        "{} {}",
        theme.icon,
        format!("Sto scrivendo una storia {}...", theme.label.to_lowercase()).dimmed()
    )
}

/// Localized date of a history timestamp
pub fn format_date(timestamp_ms: i64) -> String {
    Local
        .timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%d/%m/%Y").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn truncate(text: &str, max_chars: usize) -> String {
    if text.chars().count() > max_chars {
        let cut: String = text.chars().take(max_chars.saturating_sub(3)).collect();
        format!("{}...", cut)
    } else {
        text.to_string()
    }
}

/// Build the history listing table, newest first
pub fn render_history_table(entries: &[HistoryEntry]) -> Table {
    let mut table = Table::new();
    table.set_format(*format::consts::FORMAT_BORDERS_ONLY);

    table.add_row(prettytable::row![
        "#".bold(),
        "Theme".bold(),
        "Date".bold(),
        "Title".bold(),
        "Input".bold()
    ]);

    for (index, entry) in entries.iter().enumerate() {
        let label = themes::find(&entry.theme)
            .map(|t| t.label.to_string())
            .unwrap_or_else(|| entry.theme.clone());

        table.add_row(prettytable::row![
            (index + 1).to_string().cyan(),
            label.to_uppercase(),
            format_date(entry.timestamp),
            truncate(&entry.story.title, 40),
            format!("\"{}\"", truncate(&entry.input, 30)).italic()
        ]);
    }

    table
}

/// Transient confirmation shown after a successful copy
///
/// Visible for [`COPY_FEEDBACK_DURATION`] after [`CopyFeedback::trigger`],
/// then clears on its own.
#[derive(Debug, Clone, Default)]
pub struct CopyFeedback {
    shown_at: Option<Instant>,
}

impl CopyFeedback {
    /// Start (or restart) the confirmation
    pub fn trigger(&mut self) {
        self.shown_at = Some(Instant::now());
    }

    /// Whether the confirmation is currently visible
    pub fn is_visible(&self) -> bool {
        self.shown_at
            .map(|at| at.elapsed() < COPY_FEEDBACK_DURATION)
            .unwrap_or(false)
    }

    /// Confirmation text, while visible
    pub fn message(&self) -> Option<&'static str> {
        self.is_visible().then_some("Copiato negli appunti! 📋")
    }
}
