//! Recent conversation history from the agent's JSONL transcript.

use std::path::Path;

use {
    serde::Deserialize,
    serde_json::Value,
    tracing::debug,
};

const MAX_MESSAGE_CHARS: usize = 2000;
const TRUNCATED_MARKER: &str = "...[truncated]";

#[derive(Deserialize)]
struct Entry {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(rename = "isMeta", default)]
    is_meta: bool,
    #[serde(default)]
    message: Option<EntryMessage>,
}

#[derive(Deserialize)]
struct EntryMessage {
    #[serde(default)]
    content: Value,
}

/// The last `limit` user/assistant messages as `[Human]: ...` /
/// `[Claude]: ...` blocks separated by blank lines.
///
/// A missing or unreadable transcript yields an empty string.
pub fn recent_history(path: &Path, limit: usize) -> String {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "transcript not readable");
            return String::new();
        },
    };

    let messages: Vec<String> = raw
        .lines()
        .filter(|line| !line.trim().is_empty())
        .filter_map(|line| serde_json::from_str::<Entry>(line).ok())
        .filter_map(format_entry)
        .collect();
    let start = messages.len().saturating_sub(limit);
    messages[start..].join("\n\n")
}

fn format_entry(entry: Entry) -> Option<String> {
    let role = match entry.kind.as_str() {
        "user" => "Human",
        "assistant" => "Claude",
        _ => return None,
    };
    if entry.is_meta {
        return None;
    }

    let text = match entry.message.map(|m| m.content) {
        Some(Value::String(text)) => text,
        // Text blocks only; thinking, tool_use and tool_result are skipped.
        Some(Value::Array(blocks)) => blocks
            .iter()
            .filter(|b| b.get("type").and_then(Value::as_str) == Some("text"))
            .filter_map(|b| b.get("text").and_then(Value::as_str))
            .collect::<Vec<_>>()
            .join("\n"),
        _ => return None,
    };
    let text = text.trim();
    if text.is_empty() {
        return None;
    }

    let text = match text.char_indices().nth(MAX_MESSAGE_CHARS) {
        Some((cut, _)) => format!("{}{TRUNCATED_MARKER}", &text[..cut]),
        None => text.to_string(),
    };
    Some(format!("[{role}]: {text}"))
}
