use crate::Shell;
use soundstage_shell_core::ShutdownTrigger;
use tokio::task::JoinHandle;
use tracing::warn;

/// Map interrupt and terminate signals onto the coordinator's single
/// shutdown entry point. The supervisor's own idempotency makes it safe for
/// a signal to race a window-close or quit trigger.
pub fn register_shutdown_signals(shell: &Shell) -> JoinHandle<()> {
    let coordinator = shell.coordinator();

    tokio::spawn(async move {
        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};

            let mut terminate = match signal(SignalKind::terminate()) {
                Ok(stream) => stream,
                Err(e) => {
                    warn!(error = %e, "failed to install SIGTERM handler");
                    return;
                }
            };

            tokio::select! {
                result = tokio::signal::ctrl_c() => {
                    if let Err(e) = result {
                        warn!(error = %e, "interrupt handler failed");
                        return;
                    }
                    coordinator.shutdown(ShutdownTrigger::Interrupt).await;
                }
                _ = terminate.recv() => {
                    coordinator.shutdown(ShutdownTrigger::Terminate).await;
                }
            }
        }

        #[cfg(not(unix))]
        {
            if let Err(e) = tokio::signal::ctrl_c().await {
                warn!(error = %e, "interrupt handler failed");
                return;
            }
            coordinator.shutdown(ShutdownTrigger::Interrupt).await;
        }
    })
}
