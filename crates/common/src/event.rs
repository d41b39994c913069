//! Normalized lifecycle events.
//!
//! The agent host delivers a loosely typed JSON payload on stdin
//! ([`HookInput`]); everything past the entry point works with the closed
//! [`EventRecord`] model so new event kinds are a compile-time addition.

use std::{fmt, path::PathBuf};

use serde::{Deserialize, Serialize};

// ── EventKind ───────────────────────────────────────────────────────────────

/// Lifecycle event reported by the agent host.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// The agent needs attention (permission, idle, elicitation, ...).
    Notification,
    /// The main agent finished responding.
    Stop,
    /// A subagent finished.
    SubagentStop,
    /// Any event name this crate has no dedicated handling for.
    Other(String),
}

impl EventKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "Notification" => Self::Notification,
            "Stop" => Self::Stop,
            "SubagentStop" => Self::SubagentStop,
            other => Self::Other(other.to_string()),
        }
    }

    /// Wire name, as used in hook payloads and config keys.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Notification => "Notification",
            Self::Stop => "Stop",
            Self::SubagentStop => "SubagentStop",
            Self::Other(name) => name,
        }
    }

    /// Stop-like events block the agent when answered.
    pub fn is_stop(&self) -> bool {
        matches!(self, Self::Stop | Self::SubagentStop)
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── NotificationKind ────────────────────────────────────────────────────────

/// Category carried by `Notification` events.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NotificationKind {
    PermissionPrompt,
    IdlePrompt,
    ElicitationDialog,
    AuthSuccess,
    Other(String),
}

impl NotificationKind {
    pub fn parse(name: &str) -> Self {
        match name {
            "permission_prompt" => Self::PermissionPrompt,
            "idle_prompt" => Self::IdlePrompt,
            "elicitation_dialog" => Self::ElicitationDialog,
            "auth_success" => Self::AuthSuccess,
            other => Self::Other(other.to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::PermissionPrompt => "permission_prompt",
            Self::IdlePrompt => "idle_prompt",
            Self::ElicitationDialog => "elicitation_dialog",
            Self::AuthSuccess => "auth_success",
            Self::Other(name) => name,
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ── HookInput ───────────────────────────────────────────────────────────────

/// Raw hook payload as delivered by the agent host on stdin.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HookInput {
    pub hook_event_name: String,
    pub notification_type: Option<String>,
    pub message: Option<String>,
    pub session_id: Option<String>,
    pub transcript_path: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    /// Set by the host when a Stop hook is already blocking the agent.
    pub stop_hook_active: bool,
    pub agent_id: Option<String>,
    pub agent_type: Option<String>,
}

impl HookInput {
    pub fn event(&self) -> EventRecord {
        EventRecord::from(self)
    }
}

// ── EventRecord ─────────────────────────────────────────────────────────────

/// One normalized lifecycle event. Immutable once built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventRecord {
    kind: EventKind,
    subtype: Option<String>,
    free_text: String,
    session_id: String,
    agent_id: Option<String>,
    agent_type: Option<String>,
}

impl EventRecord {
    pub fn new(kind: EventKind, session_id: impl Into<String>) -> Self {
        Self {
            kind,
            subtype: None,
            free_text: String::new(),
            session_id: session_id.into(),
            agent_id: None,
            agent_type: None,
        }
    }

    #[must_use]
    pub fn with_subtype(mut self, subtype: impl Into<String>) -> Self {
        self.subtype = non_empty(Some(subtype.into()));
        self
    }

    #[must_use]
    pub fn with_text(mut self, text: impl Into<String>) -> Self {
        self.free_text = text.into();
        self
    }

    #[must_use]
    pub fn with_agent(mut self, agent_id: Option<String>, agent_type: Option<String>) -> Self {
        self.agent_id = non_empty(agent_id);
        self.agent_type = non_empty(agent_type);
        self
    }

    pub fn kind(&self) -> &EventKind {
        &self.kind
    }

    pub fn subtype(&self) -> Option<&str> {
        self.subtype.as_deref()
    }

    /// Notification category, only for `Notification` events with a subtype.
    pub fn notification_kind(&self) -> Option<NotificationKind> {
        match self.kind {
            EventKind::Notification => self.subtype.as_deref().map(NotificationKind::parse),
            _ => None,
        }
    }

    pub fn free_text(&self) -> &str {
        &self.free_text
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn agent_id(&self) -> Option<&str> {
        self.agent_id.as_deref()
    }

    pub fn agent_type(&self) -> Option<&str> {
        self.agent_type.as_deref()
    }
}

impl From<&HookInput> for EventRecord {
    fn from(input: &HookInput) -> Self {
        let mut record = Self::new(
            EventKind::parse(&input.hook_event_name),
            input.session_id.clone().unwrap_or_default(),
        )
        .with_text(input.message.clone().unwrap_or_default())
        .with_agent(input.agent_id.clone(), input.agent_type.clone());
        record.subtype = non_empty(input.notification_type.clone());
        record
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.is_empty())
}
