//! Offset rule for a bot update queue shared between independent pollers.
//!
//! Advancing the `getUpdates` offset acknowledges an update for every
//! consumer of the bot, so a poller only moves it across updates that are
//! provably nobody's business (other chats, non-text) or that it claims
//! itself. An update in the target chat but another topic is withheld: it
//! belongs to a concurrent poller watching that topic.
//!
//! The offset is a single cursor, so once an update is withheld the cursor
//! stays pinned at it for the rest of the batch. Updates behind a withheld
//! one are still inspected (and may be claimed) but never implicitly
//! acknowledged.

use crate::api::Update;

/// The chat and topic a poll session waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Target<'a> {
    pub chat_id: &'a str,
    /// `None` accepts any message in the chat.
    pub topic_id: Option<i64>,
}

/// What a poller may do with one update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    /// Irrelevant to every poller of this chat.
    Acknowledge,
    /// Belongs to another topic's poller; leave it queued.
    Withhold,
    /// The reply this poller is waiting for.
    Claim,
}

pub fn classify(update: &Update, target: &Target<'_>) -> Disposition {
    let Some(msg) = &update.message else {
        return Disposition::Acknowledge;
    };
    if msg.text.is_none() || msg.chat.id.to_string() != target.chat_id {
        return Disposition::Acknowledge;
    }
    match target.topic_id {
        Some(topic) if msg.message_thread_id != Some(topic) => Disposition::Withhold,
        _ => Disposition::Claim,
    }
}

/// Result of scanning one `getUpdates` batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchScan {
    /// Offset to poll from next.
    pub cursor: i64,
    /// Text of the claimed update, if any.
    pub reply: Option<String>,
    /// Offset that acknowledges the claimed update. Only set when nothing
    /// was withheld before the claim.
    pub confirm: Option<i64>,
    pub withheld: usize,
}

impl BatchScan {
    /// Whether the next poll would see anything new from this batch.
    pub fn progressed(&self, previous: i64) -> bool {
        self.reply.is_some() || self.cursor != previous
    }
}

/// Apply the offset rule to `updates`, in order, starting from `cursor`.
pub fn scan_batch(cursor: i64, updates: &[Update], target: &Target<'_>) -> BatchScan {
    let mut scan = BatchScan {
        cursor,
        reply: None,
        confirm: None,
        withheld: 0,
    };

    for update in updates {
        let pinned = scan.withheld > 0;
        match classify(update, target) {
            Disposition::Acknowledge => {
                if !pinned {
                    scan.cursor = scan.cursor.max(update.update_id + 1);
                }
            },
            Disposition::Withhold => scan.withheld += 1,
            Disposition::Claim => {
                if !pinned {
                    scan.cursor = scan.cursor.max(update.update_id + 1);
                    scan.confirm = Some(scan.cursor);
                }
                scan.reply = update.message.as_ref().and_then(|m| m.text.clone());
                break;
            },
        }
    }
    scan
}
