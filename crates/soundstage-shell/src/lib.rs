//! Soundstage shell - backend supervision for the desktop app
//!
//! Launches the bundled backend server as a child process, gates the UI on
//! its health endpoint answering, and funnels every shutdown trigger into
//! one idempotent stop.

mod factory;
mod signals;
mod surface;

pub use factory::PlatformServiceManagerFactory;
pub use signals::register_shutdown_signals;
pub use surface::LogSurface;

pub use soundstage_shell_core::{
    BackendSupervisor, LifecycleCoordinator, LifecyclePhase, ServiceManagerFactory, ShellConfig,
    ShellError, ShellSurface, ShutdownTrigger, event_channel, spawn_event_logger,
};
use std::sync::Arc;
use tracing::info;

// Re-export core functionality
pub use soundstage_shell_core::*;

type PlatformManager = <PlatformServiceManagerFactory as ServiceManagerFactory>::Manager;

/// High-level shell facade for the current platform.
///
/// Wires up the event channel and its logger, the platform service manager,
/// the backend supervisor, the readiness probe and the lifecycle
/// coordinator. Must be created inside a tokio runtime.
pub struct Shell {
    coordinator: Arc<LifecycleCoordinator<PlatformManager>>,
}

impl Shell {
    pub fn new(config: ShellConfig, surface: Arc<dyn ShellSurface>) -> Result<Self, ShellError> {
        info!(
            platform = PlatformServiceManagerFactory::platform_name(),
            name = %config.name,
            version = %config.version,
            "creating shell"
        );

        let (events, receiver) = event_channel();
        spawn_event_logger(receiver);

        let manager = PlatformServiceManagerFactory::create_manager();
        let supervisor = Arc::new(BackendSupervisor::new(manager, &config, events));
        let coordinator = Arc::new(LifecycleCoordinator::new(&config, supervisor, surface)?);

        Ok(Self { coordinator })
    }

    /// Host-ready event: start the backend and gate the UI on readiness
    pub async fn ready(&self) {
        self.coordinator.on_ready().await;
    }

    /// Dock-style reopen with zero visible windows
    pub async fn activate(&self) {
        self.coordinator.on_activate().await;
    }

    /// The single idempotent shutdown entry point
    pub async fn shutdown(&self, trigger: ShutdownTrigger) {
        self.coordinator.shutdown(trigger).await;
    }

    pub fn phase(&self) -> LifecyclePhase {
        self.coordinator.phase()
    }

    pub fn exit_requested(&self) -> bool {
        self.coordinator.exit_requested()
    }

    /// Resolves once a trigger has requested host exit
    pub async fn wait_for_exit(&self) {
        self.coordinator.wait_for_exit().await;
    }

    pub(crate) fn coordinator(&self) -> Arc<LifecycleCoordinator<PlatformManager>> {
        self.coordinator.clone()
    }
}
