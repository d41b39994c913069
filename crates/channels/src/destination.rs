use std::fmt;

use crate::error::Result;

/// Where a project's notifications go.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// A Telegram group, optionally narrowed to one forum topic. `None`
    /// addresses the group's General topic.
    Telegram {
        chat_id: String,
        topic_id: Option<i64>,
    },
    Slack {
        channel_id: String,
    },
}

impl Destination {
    /// Whether this destination carries a persisted per-project binding
    /// (a topic or a channel) that resolvers must reuse as-is.
    pub fn is_bound(&self) -> bool {
        match self {
            Self::Telegram { chat_id, topic_id } => !chat_id.is_empty() && topic_id.is_some(),
            Self::Slack { channel_id } => !channel_id.is_empty(),
        }
    }
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Telegram {
                chat_id,
                topic_id: Some(topic),
            } => write!(f, "telegram:{chat_id}/{topic}"),
            Self::Telegram {
                chat_id,
                topic_id: None,
            } => write!(f, "telegram:{chat_id}"),
            Self::Slack { channel_id } => write!(f, "slack:{channel_id}"),
        }
    }
}

/// Handle on a sent notification, enough to look up replies to it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SentMessageRef {
    Telegram {
        chat_id: String,
        topic_id: Option<i64>,
        message_id: i64,
    },
    /// Channel and `ts` of the last chunk posted.
    Slack { channel: String, ts: String },
}

/// Write-back for newly created or discovered destinations.
///
/// Resolvers call this once per creation; the implementor owns persistence.
pub trait BindingSink: Send + Sync {
    fn persist(&self, destination: &Destination) -> Result<()>;
}

impl<F> BindingSink for F
where
    F: Fn(&Destination) -> Result<()> + Send + Sync,
{
    fn persist(&self, destination: &Destination) -> Result<()> {
        self(destination)
    }
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use {super::*, rstest::rstest};

    #[rstest]
    #[case(Destination::Telegram { chat_id: "-100".into(), topic_id: Some(5) }, true)]
    #[case(Destination::Telegram { chat_id: "-100".into(), topic_id: None }, false)]
    #[case(Destination::Slack { channel_id: "C1".into() }, true)]
    #[case(Destination::Slack { channel_id: String::new() }, false)]
    fn bound_destinations(#[case] destination: Destination, #[case] bound: bool) {
        assert_eq!(destination.is_bound(), bound);
    }

    #[test]
    fn display_is_compact() {
        let topic = Destination::Telegram {
            chat_id: "-100".into(),
            topic_id: Some(7),
        };
        assert_eq!(topic.to_string(), "telegram:-100/7");
        let channel = Destination::Slack {
            channel_id: "C1".into(),
        };
        assert_eq!(channel.to_string(), "slack:C1");
    }
}
