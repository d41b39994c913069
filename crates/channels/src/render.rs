//! Event -> channel-native, length-bounded message chunks.
//!
//! Rendering is pure: no I/O, and identical input yields byte-identical
//! output. Limits are measured in bytes, which never undercounts the
//! platforms' character limits.
//!
//! Layout of a single message:
//!
//! ```text
//! <emoji> <title>
//! Project: <label>
//! Session: <id>
//!
//! <body>
//!
//! Recent context:        (optional, the only part ever trimmed)
//! ...
//!
//! <reply prompt>         (only when a reply will be polled for)
//! ```

use std::fmt;

use {
    hookrelay_common::{EventKind, EventRecord, NotificationKind},
    hookrelay_config::ChannelKind,
};

pub const TELEGRAM_MAX_LEN: usize = 4096;
/// Slack's recommended ceiling for `chat.postMessage` text.
pub const SLACK_MAX_LEN: usize = 4000;

const DEFAULT_EMOJI: &str = "🔔";
const ELLIPSIS_MARKER: &str = "…\n";
/// Max distance (in chars) the history cut may move forward to reach a line
/// start.
const REALIGN_WINDOW: usize = 100;

/// Markup flavour of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Dialect {
    /// Telegram `parse_mode=HTML`.
    TelegramHtml,
    /// Slack mrkdwn.
    SlackMrkdwn,
}

impl Dialect {
    pub fn for_channel(kind: ChannelKind) -> Self {
        match kind {
            ChannelKind::Telegram => Self::TelegramHtml,
            ChannelKind::Slack => Self::SlackMrkdwn,
        }
    }

    pub fn max_len(self) -> usize {
        match self {
            Self::TelegramHtml => TELEGRAM_MAX_LEN,
            Self::SlackMrkdwn => SLACK_MAX_LEN,
        }
    }

    /// Reply prompt appended when the caller will wait for an answer.
    pub fn reply_prompt(self) -> &'static str {
        match self {
            Self::TelegramHtml => "\n<i>Reply to this message to send instructions to Claude.</i>",
            Self::SlackMrkdwn => "\n_Reply in thread to send instructions to Claude._",
        }
    }

    fn header(self, style: &EventStyle, project: &str, session: &str) -> String {
        match self {
            Self::TelegramHtml => format!(
                "{} <b>{}</b>\n<b>Project:</b> {}\n<b>Session:</b> <code>{}</code>\n\n{}\n",
                style.emoji,
                self.escape(&style.title),
                self.escape(project),
                self.escape(session),
                self.escape(&style.body),
            ),
            Self::SlackMrkdwn => format!(
                "{} *{}*\n*Project:* {}\n*Session:* `{}`\n\n{}\n",
                style.emoji, style.title, project, session, style.body,
            ),
        }
    }

    fn history_open(self) -> &'static str {
        match self {
            Self::TelegramHtml => "\n<b>Recent context:</b>\n<pre>",
            Self::SlackMrkdwn => "\n*Recent context:*\n```",
        }
    }

    fn history_close(self) -> &'static str {
        match self {
            Self::TelegramHtml => "</pre>\n",
            Self::SlackMrkdwn => "```\n",
        }
    }

    /// History wrapper plus the ellipsis marker.
    fn overhead(self) -> usize {
        self.history_open().len() + self.history_close().len() + ELLIPSIS_MARKER.len()
    }

    fn escape(self, text: &str) -> String {
        match self {
            Self::SlackMrkdwn => text.to_string(),
            Self::TelegramHtml => {
                let mut out = String::with_capacity(text.len());
                for ch in text.chars() {
                    match ch {
                        '&' => out.push_str("&amp;"),
                        '<' => out.push_str("&lt;"),
                        '>' => out.push_str("&gt;"),
                        other => out.push(other),
                    }
                }
                out
            },
        }
    }

    fn escaped_len(self, ch: char) -> usize {
        match (self, ch) {
            (Self::TelegramHtml, '&') => 5,
            (Self::TelegramHtml, '<' | '>') => 4,
            _ => ch.len_utf8(),
        }
    }

    /// Move a hard cut back so it never splits an HTML entity or tag.
    fn safe_cut(self, window: &str) -> usize {
        if self == Self::SlackMrkdwn {
            return window.len();
        }
        let mut cut = window.len();
        if let Some(amp) = window.rfind('&')
            && !window[amp..].contains(';')
        {
            cut = amp;
        }
        if let Some(open) = window[..cut].rfind('<')
            && !window[open..cut].contains('>')
        {
            cut = open;
        }
        cut
    }
}

/// Destination-side inputs to rendering.
#[derive(Debug, Clone, Copy)]
pub struct RenderContext<'a> {
    pub dialect: Dialect,
    pub project_label: &'a str,
}

/// One message as sent in a single platform call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageChunk(String);

impl MessageChunk {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for MessageChunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

struct EventStyle {
    emoji: &'static str,
    title: String,
    body: String,
}

fn event_style(event: &EventRecord) -> EventStyle {
    match event.kind() {
        EventKind::Notification => {
            let emoji = match event.notification_kind() {
                Some(NotificationKind::PermissionPrompt) => "🔐",
                Some(NotificationKind::IdlePrompt) => "💤",
                Some(NotificationKind::ElicitationDialog) => "🔔",
                Some(NotificationKind::AuthSuccess) => "✅",
                Some(NotificationKind::Other(_)) | None => DEFAULT_EMOJI,
            };
            EventStyle {
                emoji,
                title: format!("Notification: {}", event.subtype().unwrap_or("unknown")),
                body: event.free_text().to_string(),
            }
        },
        EventKind::Stop => EventStyle {
            emoji: "🛑",
            title: "Claude has stopped".into(),
            body: "The main agent finished responding.".into(),
        },
        EventKind::SubagentStop => EventStyle {
            emoji: "🔹",
            title: format!(
                "Subagent stopped ({})",
                event.agent_type().unwrap_or("unknown")
            ),
            body: format!("Agent {} finished.", event.agent_id().unwrap_or_default()),
        },
        EventKind::Other(name) => EventStyle {
            emoji: DEFAULT_EMOJI,
            title: name.clone(),
            body: event.free_text().to_string(),
        },
    }
}

/// Render `event` into one or more chunks, each at most
/// [`Dialect::max_len`] bytes.
///
/// Header and reply prompt are emitted verbatim; only `history` is trimmed
/// (from the front) or dropped. Splitting into several chunks happens only
/// when the header and prompt alone exceed one message.
pub fn render(
    event: &EventRecord,
    ctx: &RenderContext<'_>,
    history: Option<&str>,
    will_poll_reply: bool,
) -> Vec<MessageChunk> {
    let dialect = ctx.dialect;
    let max_len = dialect.max_len();
    let style = event_style(event);
    let session = match event.session_id() {
        "" => "unknown",
        id => id,
    };
    let header = dialect.header(&style, ctx.project_label, session);
    let footer = if will_poll_reply {
        dialect.reply_prompt()
    } else {
        ""
    };
    let history = history.filter(|h| !h.trim().is_empty());

    let fixed = header.len() + footer.len();
    if fixed > max_len {
        return split_fallback(dialect, &header, history, footer);
    }

    // History is dropped whole when its wrapper does not fit.
    let mut text = header;
    if let Some(history) = history
        && let Some(budget) = max_len.checked_sub(fixed + dialect.overhead())
        && let Some(block) = history_block(dialect, history, budget)
    {
        text.push_str(&block);
    }
    text.push_str(footer);
    vec![MessageChunk(text)]
}

/// Wrapped history that fits `budget` bytes (excluding wrapper and marker).
fn history_block(dialect: Dialect, history: &str, budget: usize) -> Option<String> {
    let open = dialect.history_open();
    let close = dialect.history_close();

    let escaped = dialect.escape(history);
    if escaped.len() <= budget + ELLIPSIS_MARKER.len() {
        return Some(format!("{open}{escaped}{close}"));
    }

    let kept = tail_within(dialect, history, budget);
    if kept.trim().is_empty() {
        return None;
    }
    Some(format!(
        "{open}{ELLIPSIS_MARKER}{}{close}",
        dialect.escape(kept)
    ))
}

/// Longest suffix of `raw` whose escaped form fits `budget`, realigned to a
/// line start.
fn tail_within(dialect: Dialect, raw: &str, budget: usize) -> &str {
    let mut used = 0;
    let mut start = raw.len();
    for (idx, ch) in raw.char_indices().rev() {
        let cost = dialect.escaped_len(ch);
        if used + cost > budget {
            break;
        }
        used += cost;
        start = idx;
    }
    realign(raw, start)
}

fn realign(raw: &str, start: usize) -> &str {
    let kept = &raw[start..];
    if start == 0 || raw[..start].ends_with('\n') {
        return kept;
    }
    kept.char_indices()
        .take(REALIGN_WINDOW)
        .find(|&(_, ch)| ch == '\n')
        .map_or(kept, |(idx, _)| &kept[idx + 1..])
}

/// Header chunk(s), wrapped history chunk(s), reply prompt chunk.
fn split_fallback(
    dialect: Dialect,
    header: &str,
    history: Option<&str>,
    footer: &str,
) -> Vec<MessageChunk> {
    let max_len = dialect.max_len();
    let mut chunks: Vec<MessageChunk> = split_text(dialect, header.trim_end(), max_len)
        .into_iter()
        .map(MessageChunk)
        .collect();

    if let Some(history) = history {
        let open = dialect.history_open().trim_start();
        let close = dialect.history_close();
        let room = max_len - open.len() - close.len();
        for piece in split_text(dialect, &dialect.escape(history), room) {
            chunks.push(MessageChunk(format!("{open}{piece}{close}")));
        }
    }

    let footer = footer.trim_start();
    if !footer.is_empty() {
        chunks.push(MessageChunk(footer.to_string()));
    }
    chunks
}

/// Greedy split at line breaks, then spaces, then a markup-safe hard cut.
fn split_text(dialect: Dialect, text: &str, limit: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut rest = text;
    while rest.len() > limit {
        let (end, next) = split_point(dialect, rest, limit);
        if end > 0 {
            pieces.push(rest[..end].to_string());
        }
        rest = &rest[next..];
    }
    if !rest.is_empty() {
        pieces.push(rest.to_string());
    }
    pieces
}

fn split_point(dialect: Dialect, text: &str, limit: usize) -> (usize, usize) {
    let window = &text[..text.floor_char_boundary(limit)];
    if let Some(idx) = window.rfind('\n')
        && idx > 0
    {
        return (idx, idx + 1);
    }
    if let Some(idx) = window.rfind(' ')
        && idx > 0
    {
        return (idx, idx + 1);
    }
    match dialect.safe_cut(window) {
        0 if window.is_empty() => {
            let first = text.chars().next().map_or(text.len(), char::len_utf8);
            (first, first)
        },
        0 => (window.len(), window.len()),
        cut => (cut, cut),
    }
}
