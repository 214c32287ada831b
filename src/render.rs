//! Plain-text rendering of transcripts, session rows, and document rows.

use chat_service::{ChatSession, Document, Role, Source, Timestamp};
use time::UtcOffset;

use crate::controller::{Delivery, TranscriptEntry};
use crate::text::{truncate_to_width, wrap_text};

pub const UNTITLED_SESSION: &str = "Untitled Chat";
const ELLIPSIS: &str = "…";
const INDENT: &str = "  ";

/// Rendering options. `offset` is the zone local times are shown in.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderOptions {
    pub width: usize,
    pub offset: UtcOffset,
}

impl RenderOptions {
    /// `width` columns in the process's local offset, or UTC when the local
    /// offset cannot be determined.
    #[must_use]
    pub fn local(width: usize) -> Self {
        Self {
            width,
            offset: UtcOffset::current_local_offset().unwrap_or(UtcOffset::UTC),
        }
    }
}

/// `h:mm AM/PM` in `offset`, or the raw value when it does not parse.
#[must_use]
pub fn format_time(timestamp: &Timestamp, offset: UtcOffset) -> String {
    let Some(parsed) = timestamp.parse() else {
        return timestamp.as_str().to_string();
    };
    let local = parsed.to_offset(offset);
    let (hour, minute) = (local.hour(), local.minute());
    let meridiem = if hour < 12 { "AM" } else { "PM" };
    let hour = match hour % 12 {
        0 => 12,
        hour => hour,
    };
    format!("{hour}:{minute:02} {meridiem}")
}

#[must_use]
pub fn role_label(role: Role) -> &'static str {
    match role {
        Role::User => "You",
        Role::Assistant => "Assistant",
    }
}

/// `filename (p. N)`, or just the file name without a page number.
#[must_use]
pub fn format_source(source: &Source) -> String {
    match source.page_number {
        Some(page) => format!("{} (p. {page})", source.filename),
        None => source.filename.clone(),
    }
}

pub fn render_entry(entry: &TranscriptEntry, options: &RenderOptions) -> Vec<String> {
    let message = &entry.message;
    let mut header = format!(
        "{} · {}",
        role_label(message.role),
        format_time(&message.created_at, options.offset)
    );
    match entry.delivery {
        Delivery::Pending => header.push_str(" · sending…"),
        Delivery::Failed => header.push_str(" · failed to send"),
        Delivery::Confirmed => {}
    }

    let body_width = options.width.saturating_sub(INDENT.len()).max(1);
    let mut lines = vec![header];
    lines.extend(
        wrap_text(&message.content, body_width)
            .into_iter()
            .map(|line| format!("{INDENT}{line}")),
    );

    if message.role == Role::Assistant {
        let sources = message
            .sources()
            .iter()
            .filter(|source| source.is_displayable())
            .collect::<Vec<_>>();
        if !sources.is_empty() {
            lines.push(format!("{INDENT}Sources:"));
            for source in sources {
                let row = format!("{INDENT}{INDENT}- {}", format_source(source));
                lines.push(truncate_to_width(&row, options.width, ELLIPSIS));
            }
        }
    }

    lines
}

/// Every entry, separated by a blank line.
pub fn render_transcript(entries: &[TranscriptEntry], options: &RenderOptions) -> Vec<String> {
    let mut lines = Vec::new();
    for (index, entry) in entries.iter().enumerate() {
        if index > 0 {
            lines.push(String::new());
        }
        lines.extend(render_entry(entry, options));
    }
    lines
}

#[must_use]
pub fn session_title(session: &ChatSession) -> &str {
    let title = session.title.trim();
    if title.is_empty() {
        UNTITLED_SESSION
    } else {
        title
    }
}

/// `* 1. Title` for the active session, `  2. Title` otherwise. Numbers are
/// one-based.
#[must_use]
pub fn render_session_row(
    index: usize,
    session: &ChatSession,
    active: bool,
    width: usize,
) -> String {
    let marker = if active { '*' } else { ' ' };
    let row = format!("{marker} {}. {}", index + 1, session_title(session));
    truncate_to_width(&row, width, ELLIPSIS)
}

#[must_use]
pub fn format_file_size(bytes: u64) -> String {
    const UNITS: [&str; 3] = ["KB", "MB", "GB"];
    if bytes < 1024 {
        return format!("{bytes} B");
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit + 1 < UNITS.len() {
        value /= 1024.0;
        unit += 1;
    }
    format!("{value:.1} {}", UNITS[unit])
}

/// `id  filename  size  status` on one line.
#[must_use]
pub fn render_document_row(document: &Document, width: usize) -> String {
    let status = match (&document.error_message, document.processed) {
        (Some(error), _) if !error.trim().is_empty() => format!("error: {}", error.trim()),
        (_, true) => match document.chunk_count {
            1 => "ready (1 chunk)".to_string(),
            count => format!("ready ({count} chunks)"),
        },
        (_, false) => "processing".to_string(),
    };
    let size = document
        .file_size
        .map(format_file_size)
        .unwrap_or_else(|| "-".to_string());
    let row = format!(
        "{}  {}  {}  {}",
        document.id, document.filename, size, status
    );
    truncate_to_width(&row, width, ELLIPSIS)
}
