use anyhow::Context;

use statement_inbox::config::InboxConfig;
use statement_inbox::inbox::InboxPipeline;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = InboxConfig::from_env().context("Invalid INBOX_* configuration")?;

    eprintln!("Statement Inbox v{}", env!("CARGO_PKG_VERSION"));
    eprintln!("   Transport: {}", config.transport);
    eprintln!(
        "   Backend: {}",
        config
            .backend_url
            .as_deref()
            .unwrap_or("none (in-memory fallback)")
    );
    match config.bridge_timeout {
        Some(timeout) => eprintln!("   Bridge timeout: {}ms", timeout.as_millis()),
        None => eprintln!("   Bridge timeout: disabled"),
    }
    eprintln!("   Type 'help' for commands, 'quit' to exit.\n");

    let pipeline = InboxPipeline::from_config(&config).context("Failed to build inbox pipeline")?;
    statement_inbox::cli::run(&pipeline).await;

    Ok(())
}
