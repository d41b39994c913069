mod hook;
mod sound;
mod test_mode;
mod transcript;
mod watch;

use std::{
    fs::{File, OpenOptions},
    path::PathBuf,
    sync::Mutex,
};

use {
    clap::Parser,
    directories::BaseDirs,
    tracing::{error, info},
    tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt},
};

const LOG_FILE_NAME: &str = "claude-notify.log";

#[derive(Parser)]
#[command(
    name = "hookrelay",
    version,
    about = "Relay agent hook events to Telegram or Slack and wait for a human reply"
)]
struct Cli {
    /// Print the resolved settings, send a sample notification and exit.
    #[arg(long)]
    test: bool,

    /// Log level (trace, debug, info, warn, error). `RUST_LOG` takes precedence.
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Output logs as JSON instead of human-readable.
    #[arg(long, default_value_t = false)]
    json_logs: bool,

    /// Project directory. Hook mode falls back to the `cwd` of the hook input.
    #[arg(long, env = "CLAUDE_PROJECT_DIR")]
    project_dir: Option<PathBuf>,
}

/// `~/.claude/claude-notify.log`, opened for append.
fn open_log_file() -> Option<File> {
    let dir = BaseDirs::new()?.home_dir().join(".claude");
    std::fs::create_dir_all(&dir).ok()?;
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(dir.join(LOG_FILE_NAME))
        .ok()
}

/// Log to the shared log file, or stderr when it cannot be opened. Stdout
/// carries the hook response and stays clean.
fn init_telemetry(cli: &Cli) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&cli.log_level));
    let registry = tracing_subscriber::registry().with(filter);

    match (open_log_file(), cli.json_logs) {
        (Some(file), true) => registry
            .with(fmt::layer().json().with_writer(Mutex::new(file)))
            .init(),
        (Some(file), false) => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(false)
                    .with_writer(Mutex::new(file)),
            )
            .init(),
        (None, true) => registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init(),
        (None, false) => registry
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_writer(std::io::stderr),
            )
            .init(),
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();
    init_telemetry(&cli);

    info!(version = env!("CARGO_PKG_VERSION"), test = cli.test, "hookrelay starting");

    let result = if cli.test {
        test_mode::run(cli.project_dir).await
    } else {
        hook::run(cli.project_dir).await
    };
    if let Err(e) = &result {
        error!(error = %format!("{e:#}"), "hookrelay failed");
    }
    result
}
