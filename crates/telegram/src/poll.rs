use std::time::Duration;

use {
    hookrelay_channels::CancelCheck,
    tokio::time::{Instant, sleep},
    tracing::{debug, info, warn},
};

use crate::{
    api::BotApi,
    offset::{Target, scan_batch},
};

/// Timing knobs of the reply poller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSettings {
    /// Upper bound of one `getUpdates` long-poll. Cancellation is checked
    /// between polls, so this bounds cancellation latency.
    pub long_poll: Duration,
    /// Pause after a batch that made no progress or a failed call.
    pub backoff: Duration,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            long_poll: Duration::from_secs(5),
            backoff: Duration::from_secs(1),
        }
    }
}

/// Wait for a text message in `target` until `timeout` elapses or `cancel`
/// fires.
///
/// Errors from individual calls are logged and the loop continues. The
/// session cursor is learned from the newest pending update; if that call
/// fails the cursor stays unknown and the call is retried next iteration.
pub async fn poll_reply(
    api: &BotApi,
    target: Target<'_>,
    timeout: Duration,
    cancel: &dyn CancelCheck,
) -> Option<String> {
    let settings = api.config().poll;
    let deadline = Instant::now() + timeout;
    let mut cursor: Option<i64> = None;

    info!(
        chat_id = target.chat_id,
        topic_id = ?target.topic_id,
        timeout_secs = timeout.as_secs(),
        "waiting for telegram reply"
    );

    loop {
        if cancel.is_cancelled() {
            info!("telegram reply poll cancelled");
            return None;
        }
        let remaining = deadline.saturating_duration_since(Instant::now());
        if remaining.is_zero() {
            info!("telegram reply poll timed out");
            return None;
        }

        let Some(offset) = cursor else {
            match api.latest_offset().await {
                Ok(offset) => {
                    debug!(offset, "telegram poll cursor established");
                    cursor = Some(offset);
                },
                Err(e) => {
                    warn!(error = %e, "failed to learn telegram update offset");
                    sleep(settings.backoff.min(remaining)).await;
                },
            }
            continue;
        };

        // getUpdates takes whole seconds; a sub-second tail is slept out.
        let wait_secs = settings.long_poll.min(remaining).as_secs();
        if wait_secs == 0 {
            sleep(remaining).await;
            continue;
        }
        let updates = match api.get_updates(offset, wait_secs).await {
            Ok(updates) => updates,
            Err(e) => {
                warn!(error = %e, offset, "telegram getUpdates failed");
                sleep(settings.backoff.min(remaining)).await;
                continue;
            },
        };

        let scan = scan_batch(offset, &updates, &target);
        debug!(
            offset,
            count = updates.len(),
            next = scan.cursor,
            withheld = scan.withheld,
            "telegram update batch"
        );

        if let Some(reply) = scan.reply {
            if let Some(confirm) = scan.confirm
                && let Err(e) = api.confirm(confirm).await
            {
                warn!(error = %e, offset = confirm, "failed to confirm claimed update");
            }
            info!(chars = reply.chars().count(), "telegram reply received");
            return Some(reply);
        }

        let stalled = !updates.is_empty() && !scan.progressed(offset);
        cursor = Some(scan.cursor);
        if stalled {
            let remaining = deadline.saturating_duration_since(Instant::now());
            sleep(settings.backoff.min(remaining)).await;
        }
    }
}
