use crate::events::EventSender;
use anyhow::Result;
use async_trait::async_trait;
use std::path::Path;

/// Unique identifier for a process
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ProcessId(pub u32);

impl From<u32> for ProcessId {
    fn from(raw: u32) -> Self {
        ProcessId(raw)
    }
}

impl std::fmt::Display for ProcessId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Observed status of the child process
#[derive(Debug, Clone, PartialEq)]
pub enum ProcessStatus {
    /// Process is currently running
    Running,
    /// Process exited with the given code (None when killed by a signal)
    Exited(Option<i32>),
}

/// Result of a graceful-termination attempt
#[derive(Debug, Clone, PartialEq)]
pub enum TerminationResult {
    /// Termination signal delivered
    Success,
    /// Process was not found (already exited)
    ProcessNotFound,
    /// Insufficient privileges to signal the process
    AccessDenied,
    /// Operation failed with specific error message
    Failed(String),
}

/// Trait representing a handle to a spawned backend process.
///
/// The handle is owned exclusively by the supervisor; nothing else may
/// signal the child or observe its exit.
#[async_trait]
pub trait ProcessHandle: Send + Sync {
    /// Get the process ID (None if the process has already exited)
    fn pid(&self) -> Option<ProcessId>;

    /// Get the program this handle was spawned from
    fn program(&self) -> &str;

    /// Check if the process is still running (non-blocking)
    async fn is_running(&self) -> bool;

    /// Try to collect the exit status without blocking
    async fn try_wait(&mut self) -> Result<Option<ProcessStatus>>;
}

/// Platform-specific collaborator that spawns and signals the backend.
///
/// Implementations spawn with piped stdio (forwarding output lines into the
/// event channel), keep the child in the parent's process group, and perform
/// best-effort emergency termination of a still-tracked child in Drop.
#[async_trait]
pub trait ServiceProcessManager: Send + Sync + 'static {
    /// The type of process handle this manager produces
    type Handle: ProcessHandle + 'static;

    /// Spawn the backend executable with no arguments and piped stdio
    async fn spawn_server(&self, program: &Path, events: EventSender) -> Result<Self::Handle>;

    /// Send one graceful termination signal; never blocks waiting for exit
    async fn terminate_gracefully(&self, pid: ProcessId) -> TerminationResult;
}

/// Factory trait for creating platform-specific service managers
pub trait ServiceManagerFactory {
    /// The type of service manager this factory creates
    type Manager: ServiceProcessManager;

    /// Create a service manager for the current platform
    fn create_manager() -> Self::Manager;

    /// Get the platform name for logging and debugging
    fn platform_name() -> &'static str;
}
