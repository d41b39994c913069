//! `--test`: show what the hook would use and send a sample notification.

use std::{
    path::PathBuf,
    time::{SystemTime, UNIX_EPOCH},
};

use {
    anyhow::Context,
    hookrelay_bridge::{ReplyBridge, connect},
    hookrelay_channels::{Dialect, NeverCancel, RenderContext, render},
    hookrelay_common::{EventKind, EventRecord},
    hookrelay_config::{ChannelKind, Settings, load_settings},
    secrecy::{ExposeSecret, Secret},
};

use crate::sound;

const SAMPLE_TEXT: &str = "This is a test notification from hookrelay.";

pub async fn run(project_dir: Option<PathBuf>) -> anyhow::Result<()> {
    let project_dir = match project_dir {
        Some(dir) => dir,
        None => std::env::current_dir().context("failed to determine current directory")?,
    };
    let settings = load_settings(&project_dir)?;

    println!("=== hookrelay test mode ===\n");
    for line in summary(&settings) {
        println!("{line}");
    }
    if !settings.enabled() {
        println!("\nNotifications are DISABLED for this project.");
        println!(
            "Set \"enabled\": true in {} to activate.",
            settings.config_path.display()
        );
        return Ok(());
    }

    let connection = connect(&settings)?;
    let event = sample_event();
    let ctx = RenderContext {
        dialect: Dialect::for_channel(settings.channel()),
        project_label: &settings.project_label,
    };
    let wait = settings.config.wait_for_reply;
    let chunks = render(&event, &ctx, None, wait);

    println!("\nSending test notification to {}...", settings.channel());
    let bridge = ReplyBridge::new(
        connection.adapter.as_ref(),
        connection.resolver.as_ref(),
        &connection.sink,
    );
    let delivery = bridge
        .deliver(&settings.project_label, connection.existing.as_ref(), &chunks)
        .await?;
    println!("Destination: {}", delivery.destination());
    println!("Test notification sent successfully!");

    if wait {
        let timeout = settings.reply_timeout();
        println!("\nWaiting for reply ({}s timeout)...", timeout.as_secs());
        match delivery.await_reply(timeout, &NeverCancel).await.reply() {
            Some(reply) => println!("Reply received: \"{reply}\""),
            None => println!("No reply received (timeout)."),
        }
    }

    let sound_name = settings.config.sound_for(event.kind());
    sound::play(sound_name);
    println!("\nPlayed sound: {sound_name}");
    println!("\n=== test complete ===");
    Ok(())
}

fn sample_event() -> EventRecord {
    let millis = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_millis())
        .unwrap_or_default();
    EventRecord::new(EventKind::Notification, format!("test-session-{millis}"))
        .with_subtype("idle_prompt")
        .with_text(SAMPLE_TEXT)
}

fn presence(secret: Option<&Secret<String>>) -> &'static str {
    match secret {
        Some(s) if !s.expose_secret().is_empty() => "SET",
        _ => "MISSING",
    }
}

/// Human-readable settings report. Credentials only show as SET/MISSING.
fn summary(settings: &Settings) -> Vec<String> {
    let config = &settings.config;
    let mut lines = vec![
        format!("Project dir: {}", settings.project_dir.display()),
        format!("Config path: {}", settings.config_path.display()),
        format!("Enabled: {}", config.enabled),
        format!("Channel: {}", config.channel),
        format!("Project label: {}", settings.project_label),
        format!("Wait for reply: {}", config.wait_for_reply),
        format!("Include history: {}", config.include_history),
        format!("Reply timeout: {}s", config.reply_timeout),
        String::new(),
    ];
    match settings.channel() {
        ChannelKind::Telegram => {
            let tg = &settings.telegram;
            lines.push(format!("Telegram bot token: {}", presence(tg.bot_token.as_ref())));
            lines.push(format!(
                "Telegram group ID: {}",
                tg.group_id.as_deref().unwrap_or("MISSING")
            ));
            lines.push(match tg.topic_id {
                Some(id) => format!("Telegram topic ID: {id}"),
                None if tg.auto_create_topic => "Telegram topic ID: created on first send".into(),
                None => "Telegram topic ID: not set (using General topic)".into(),
            });
        },
        ChannelKind::Slack => {
            let sl = &settings.slack;
            lines.push(format!("Slack bot token: {}", presence(sl.bot_token.as_ref())));
            lines.push(format!(
                "Slack channel: {}",
                sl.channel.as_deref().unwrap_or("not set")
            ));
            lines.push(format!("Slack auto-create: {}", sl.auto_create_channel));
        },
    }
    lines
}
