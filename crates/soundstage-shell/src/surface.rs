use async_trait::async_trait;
use soundstage_shell_core::ShellSurface;
use tracing::{error, info};

/// Surface for hosts that run without a windowing layer wired in: the two
/// reveal effects are reduced to log lines.
#[derive(Debug, Default)]
pub struct LogSurface;

#[async_trait]
impl ShellSurface for LogSurface {
    async fn reveal_main(&self) {
        info!("backend ready, revealing primary interface");
    }

    async fn reveal_degraded(&self) {
        error!("backend failed to start, revealing degraded interface");
    }
}
