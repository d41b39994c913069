use std::fmt;

use {
    hookrelay_common::{EventKind, EventRecord, NotificationKind},
    hookrelay_config::Settings,
};

/// Why an event is not dispatched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Skip {
    /// Notifications are off for the project.
    Disabled,
    EventDisabled(EventKind),
    NotificationTypeFiltered(NotificationKind),
}

impl fmt::Display for Skip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Disabled => f.write_str("notifications disabled for project"),
            Self::EventDisabled(kind) => write!(f, "event {kind} not enabled"),
            Self::NotificationTypeFiltered(kind) => {
                write!(f, "notification type {kind} filtered out")
            },
        }
    }
}

/// `None` when `event` should be sent.
pub fn check(settings: &Settings, event: &EventRecord) -> Option<Skip> {
    if !settings.enabled() {
        return Some(Skip::Disabled);
    }
    if !settings.event_enabled(event.kind()) {
        return Some(Skip::EventDisabled(event.kind().clone()));
    }
    match event.notification_kind() {
        Some(kind) if !settings.notification_type_enabled(&kind) => {
            Some(Skip::NotificationTypeFiltered(kind))
        },
        _ => None,
    }
}

/// Events whose reply the agent host can act on: stops (the reply unblocks
/// the agent) and idle prompts (free-form input). Permission and elicitation
/// prompts need the terminal UI.
pub fn is_replyable(event: &EventRecord) -> bool {
    match event.kind() {
        EventKind::Stop | EventKind::SubagentStop => true,
        EventKind::Notification => {
            event.notification_kind() == Some(NotificationKind::IdlePrompt)
        },
        EventKind::Other(_) => false,
    }
}

/// Whether this invocation waits for a reply after sending.
///
/// `stop_hook_active` means the agent is already continuing because of an
/// earlier blocking reply; polling again would loop.
pub fn will_poll(settings: &Settings, event: &EventRecord, stop_hook_active: bool) -> bool {
    settings.config.wait_for_reply && is_replyable(event) && !stop_hook_active
}
