use crate::config::ShellConfig;
use crate::error::ShellError;
use crate::probe::ReadinessProbe;
use crate::process::ServiceProcessManager;
use crate::supervisor::BackendSupervisor;
use async_trait::async_trait;
use std::sync::{Arc, Mutex as StdMutex};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Where the shell is in its startup/shutdown sequence
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LifecyclePhase {
    Idle,
    Starting,
    WaitingForReady,
    Running,
    /// Backend never became ready; the failure placeholder is shown
    Degraded,
    ShuttingDown,
}

/// Every shutdown source maps to the same stop effect
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShutdownTrigger {
    WindowsClosed,
    QuitRequested,
    HostExit,
    Interrupt,
    Terminate,
}

/// Boundary to the windowing layer. The coordinator only ever asks for one
/// of two effects; everything else about the UI is out of scope.
#[async_trait]
pub trait ShellSurface: Send + Sync {
    /// Show the primary interface
    async fn reveal_main(&self);

    /// Show the failure placeholder
    async fn reveal_degraded(&self);
}

/// Sequences supervisor start, readiness wait and UI reveal, and funnels
/// every termination trigger into one idempotent shutdown entry point.
///
/// There is no separate re-entry flag: shutdown safety rests entirely on the
/// supervisor's own cleared-handle idempotency.
pub struct LifecycleCoordinator<M: ServiceProcessManager> {
    supervisor: Arc<BackendSupervisor<M>>,
    probe: ReadinessProbe,
    surface: Arc<dyn ShellSurface>,
    health_url: String,
    persistent_session: bool,
    phase: Arc<StdMutex<LifecyclePhase>>,
    exit: CancellationToken,
}

impl<M: ServiceProcessManager> LifecycleCoordinator<M> {
    pub fn new(
        config: &ShellConfig,
        supervisor: Arc<BackendSupervisor<M>>,
        surface: Arc<dyn ShellSurface>,
    ) -> Result<Self, ShellError> {
        Ok(Self {
            probe: ReadinessProbe::new(config.probe.clone())?,
            health_url: config.health_url.clone(),
            persistent_session: config.persistent_session,
            supervisor,
            surface,
            phase: Arc::new(StdMutex::new(LifecyclePhase::Idle)),
            exit: CancellationToken::new(),
        })
    }

    /// Host-ready event: start the backend, gate the UI on readiness.
    ///
    /// A backend that never answers is not an error: the degraded surface is
    /// revealed and the child, if it spawned, is left running unobserved.
    pub async fn on_ready(&self) {
        self.set_phase(LifecyclePhase::Starting);
        self.supervisor.start().await;

        self.set_phase(LifecyclePhase::WaitingForReady);
        if self.probe.wait_until_ready(&self.health_url).await {
            self.set_phase(LifecyclePhase::Running);
            self.surface.reveal_main().await;
        } else {
            warn!("backend did not become ready, showing degraded interface");
            self.set_phase(LifecyclePhase::Degraded);
            self.surface.reveal_degraded().await;
        }
    }

    /// Re-activation with zero visible windows (dock-style reopen): run the
    /// ready sequence again for a fresh window. A still-live child is reused
    /// as-is; no freshness probe of the running process is performed.
    pub async fn on_activate(&self) {
        self.on_ready().await;
    }

    /// The single shutdown entry point, registered against every trigger
    /// source. Safe to call any number of times from any number of tasks.
    pub async fn shutdown(&self, trigger: ShutdownTrigger) {
        info!(?trigger, "shutdown trigger received");
        self.set_phase(LifecyclePhase::ShuttingDown);
        self.supervisor.stop().await;

        // One platform convention keeps the host session alive with all
        // windows closed; only the child is stopped there.
        if trigger == ShutdownTrigger::WindowsClosed && self.persistent_session {
            return;
        }
        self.exit.cancel();
    }

    pub fn phase(&self) -> LifecyclePhase {
        *self.phase.lock().unwrap()
    }

    /// Whether a trigger has requested host exit
    pub fn exit_requested(&self) -> bool {
        self.exit.is_cancelled()
    }

    /// Resolves once host exit has been requested
    pub async fn wait_for_exit(&self) {
        self.exit.cancelled().await;
    }

    fn set_phase(&self, next: LifecyclePhase) {
        *self.phase.lock().unwrap() = next;
    }
}
