use anyhow::Result;
use soundstage_shell::{
    Deployment, LogSurface, Shell, ShellConfig, register_shutdown_signals,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // Packaged installs point SOUNDSTAGE_RESOURCES_DIR at the bundled
    // resources; otherwise we resolve binaries from the source checkout.
    let deployment = match std::env::var_os("SOUNDSTAGE_RESOURCES_DIR") {
        Some(resources) => Deployment::Packaged {
            resources: PathBuf::from(resources),
        },
        None => Deployment::Development {
            root: std::env::current_dir()?,
        },
    };

    let mut builder = ShellConfig::builder();
    builder
        .name(env!("CARGO_PKG_NAME"))
        .version(env!("CARGO_PKG_VERSION"))
        .deployment(deployment);
    if let Ok(url) = std::env::var("SOUNDSTAGE_HEALTH_URL") {
        builder.health_url(url);
    }
    let config = builder.build().map_err(|e| anyhow::anyhow!(e))?;

    let shell = Shell::new(config, Arc::new(LogSurface))?;
    let signals = register_shutdown_signals(&shell);

    shell.ready().await;
    shell.wait_for_exit().await;

    signals.abort();
    Ok(())
}
