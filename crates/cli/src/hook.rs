//! Hook mode: one event from stdin, one notification, maybe one reply.

use std::{path::PathBuf, time::Duration};

use {
    anyhow::Context,
    hookrelay_bridge::{BridgeOutcome, HookResponse, ReplyBridge, check, connect, will_poll},
    hookrelay_channels::{Dialect, RenderContext, render},
    hookrelay_common::HookInput,
    hookrelay_config::load_settings,
    tokio::io::{AsyncRead, AsyncReadExt},
    tracing::{info, warn},
};

use crate::{sound, transcript, watch::TranscriptWatch};

/// How long to wait for the host to close stdin.
const STDIN_TIMEOUT: Duration = Duration::from_secs(5);

pub async fn run(project_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let Some(input) = read_input(tokio::io::stdin(), STDIN_TIMEOUT).await? else {
        info!("empty hook input, nothing to do");
        return Ok(());
    };
    let event = input.event();
    info!(
        event = %event.kind(),
        subtype = event.subtype().unwrap_or_default(),
        session = event.session_id(),
        "hook invoked"
    );

    // Never fall back to the process cwd.
    let Some(project_dir) = project_dir.or_else(|| input.cwd.clone()) else {
        info!("no project directory in environment or hook input");
        return Ok(());
    };
    let settings = load_settings(&project_dir)?;
    if let Some(skip) = check(&settings, &event) {
        info!(project = %settings.project_label, reason = %skip, "event skipped");
        return Ok(());
    }

    let poll = will_poll(&settings, &event, input.stop_hook_active);
    let delay = settings.send_delay();
    if !delay.is_zero() {
        info!(delay_secs = delay.as_secs(), "delaying before send");
        tokio::time::sleep(delay).await;
    }

    let history = match &input.transcript_path {
        Some(path) if settings.config.include_history => {
            transcript::recent_history(path, settings.config.history_lines)
        },
        _ => String::new(),
    };
    let ctx = RenderContext {
        dialect: Dialect::for_channel(settings.channel()),
        project_label: &settings.project_label,
    };
    let chunks = render(&event, &ctx, Some(&history), poll);

    sound::play(settings.config.sound_for(event.kind()));

    let connection = connect(&settings)?;
    let bridge = ReplyBridge::new(
        connection.adapter.as_ref(),
        connection.resolver.as_ref(),
        &connection.sink,
    );
    let delivery = bridge
        .deliver(&settings.project_label, connection.existing.as_ref(), &chunks)
        .await
        .with_context(|| format!("failed to notify via {}", settings.channel()))?;

    if !poll {
        delivery.finish();
        return Ok(());
    }

    let watch = TranscriptWatch::arm(input.transcript_path.as_deref());
    let outcome = delivery.await_reply(settings.reply_timeout(), &watch).await;
    match outcome.reply() {
        Some(reply) => {
            info!(chars = reply.chars().count(), "reply received");
            let response = HookResponse::for_reply(event.kind(), settings.channel(), reply);
            println!("{}", response.to_json()?);
        },
        None if outcome == BridgeOutcome::Cancelled => {
            info!("reply wait cancelled, user answered in terminal")
        },
        None => info!("no reply before timeout"),
    }
    Ok(())
}

/// Read and parse the hook payload.
///
/// `None` for blank input or when the writer never closes the stream within
/// `timeout`; malformed JSON is an error.
async fn read_input<R>(mut reader: R, timeout: Duration) -> anyhow::Result<Option<HookInput>>
where
    R: AsyncRead + Unpin,
{
    let mut raw = String::new();
    match tokio::time::timeout(timeout, reader.read_to_string(&mut raw)).await {
        Ok(read) => {
            read.context("failed to read hook input")?;
        },
        Err(_) => {
            warn!(timeout_secs = timeout.as_secs(), "stdin not closed in time");
            return Ok(None);
        },
    }
    if raw.trim().is_empty() {
        return Ok(None);
    }
    let input = serde_json::from_str(&raw).context("failed to parse hook input JSON")?;
    Ok(Some(input))
}
