//! Interactive todo list in the terminal.
//!
//! Reads one command per line from stdin and prints the board to stdout after
//! every change. Alerts and logs go to stderr.

use anyhow::Context;
use std::sync::Arc;
use todo_app::cli::{Flow, Session};
use todo_app::{Config, StderrNotifier, TodoEnvironment, TodoStore};
use todo_core::environment::SystemClock;
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = Config::from_env();
    init_tracing(&config)?;
    tracing::debug!(?config, "Loaded configuration");

    let env = TodoEnvironment::new(Arc::new(SystemClock), Arc::new(StderrNotifier));
    let mut session = Session::new(TodoStore::new(env), config, std::io::stdout());
    session.greet().await.context("writing to stdout")?;

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        session.prompt().context("writing to stdout")?;
        let Some(line) = lines.next_line().await.context("reading stdin")? else {
            break;
        };
        if session.handle_line(&line).await.context("writing to stdout")? == Flow::Quit {
            break;
        }
    }

    let remaining = session.store().read(|list| list.len()).await;
    tracing::info!(remaining, "Session ended");
    Ok(())
}

/// Installs a stderr `fmt` subscriber filtered by the configured directives
fn init_tracing(config: &Config) -> anyhow::Result<()> {
    let filter = tracing_subscriber::EnvFilter::try_new(&config.log_filter)
        .with_context(|| format!("invalid log filter '{}'", config.log_filter))?;

    tracing_subscriber::registry()
        .with(filter)
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(false)
                .with_writer(std::io::stderr),
        )
        .try_init()
        .context("installing tracing subscriber")?;

    Ok(())
}
