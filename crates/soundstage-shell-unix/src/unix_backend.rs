#[cfg(unix)]
mod unix_impl {
    use anyhow::Result;
    use async_trait::async_trait;
    use nix::sys::signal::{self, Signal};
    use nix::unistd::Pid as NixPid;
    use soundstage_shell_core::{
        EventSender, OutputStream, ProcessHandle, ProcessId, ProcessStatus,
        ServiceProcessManager, ShellError, TerminationResult, spawn_line_forwarder,
    };
    use std::path::Path;
    use std::process::Stdio;
    use std::sync::Mutex;
    use tokio::process::{Child, Command};
    use tracing::{info, warn};

    /// Unix-specific handle to the spawned backend
    pub struct UnixBackendHandle {
        child: Child,
        program: String,
    }

    impl UnixBackendHandle {
        pub fn new(child: Child, program: String) -> Self {
            Self { child, program }
        }
    }

    #[async_trait]
    impl ProcessHandle for UnixBackendHandle {
        fn pid(&self) -> Option<ProcessId> {
            self.child.id().map(ProcessId::from)
        }

        fn program(&self) -> &str {
            &self.program
        }

        async fn is_running(&self) -> bool {
            if let Some(pid) = self.pid() {
                let nix_pid = NixPid::from_raw(pid.0 as i32);
                // Signal 0 checks existence without touching the process
                signal::kill(nix_pid, None).is_ok()
            } else {
                false
            }
        }

        async fn try_wait(&mut self) -> Result<Option<ProcessStatus>> {
            match self.child.try_wait()? {
                Some(status) => Ok(Some(ProcessStatus::Exited(status.code()))),
                None => Ok(None),
            }
        }
    }

    /// Unix service manager: spawns the backend with piped stdio and
    /// terminates it with SIGTERM.
    pub struct UnixServiceManager {
        /// Pid of the child we spawned, until it is terminated through us
        active: Mutex<Option<ProcessId>>,
    }

    impl UnixServiceManager {
        pub fn new() -> Self {
            Self {
                active: Mutex::new(None),
            }
        }

        fn clear_active(&self, pid: ProcessId) {
            let mut active = self.active.lock().unwrap();
            if *active == Some(pid) {
                *active = None;
            }
        }
    }

    impl Default for UnixServiceManager {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ServiceProcessManager for UnixServiceManager {
        type Handle = UnixBackendHandle;

        async fn spawn_server(&self, program: &Path, events: EventSender) -> Result<Self::Handle> {
            let mut cmd = Command::new(program);
            // Piped, not inherited; the child stays in our process group.
            cmd.stdin(Stdio::piped())
                .stdout(Stdio::piped())
                .stderr(Stdio::piped());

            let mut child = cmd
                .spawn()
                .map_err(|e| ShellError::SpawnFailed(e.to_string()))?;

            if let Some(stdout) = child.stdout.take() {
                spawn_line_forwarder(stdout, events.clone(), OutputStream::Stdout);
            }
            if let Some(stderr) = child.stderr.take() {
                spawn_line_forwarder(stderr, events, OutputStream::Stderr);
            }

            if let Some(pid) = child.id() {
                info!(pid, program = %program.display(), "spawned backend process");
                *self.active.lock().unwrap() = Some(ProcessId(pid));
            }

            Ok(UnixBackendHandle::new(
                child,
                program.display().to_string(),
            ))
        }

        async fn terminate_gracefully(&self, pid: ProcessId) -> TerminationResult {
            self.clear_active(pid);
            let nix_pid = NixPid::from_raw(pid.0 as i32);

            match signal::kill(nix_pid, Signal::SIGTERM) {
                Ok(()) => {
                    info!(pid = pid.0, "sent SIGTERM to backend");
                    TerminationResult::Success
                }
                Err(nix::errno::Errno::ESRCH) => {
                    info!(pid = pid.0, "backend not found (already terminated)");
                    TerminationResult::ProcessNotFound
                }
                Err(nix::errno::Errno::EPERM) => {
                    warn!(pid = pid.0, "permission denied terminating backend");
                    TerminationResult::AccessDenied
                }
                Err(e) => {
                    warn!(pid = pid.0, error = %e, "failed to send SIGTERM");
                    TerminationResult::Failed(format!("SIGTERM failed: {e}"))
                }
            }
        }
    }

    impl Drop for UnixServiceManager {
        fn drop(&mut self) {
            // Emergency termination of a child that was never stopped
            // through us, e.g. on abrupt host exit.
            if let Some(pid) = self.active.lock().unwrap().take() {
                warn!(pid = pid.0, "service manager dropped with live backend");
                let nix_pid = NixPid::from_raw(pid.0 as i32);
                if let Err(e) = signal::kill(nix_pid, Signal::SIGTERM) {
                    warn!(pid = pid.0, error = %e, "emergency SIGTERM failed");
                }
            }
        }
    }

}

// Re-export the Unix implementation when on Unix systems
#[cfg(unix)]
pub use unix_impl::{UnixBackendHandle, UnixServiceManager};

// Stubs so the crate still compiles as a workspace member elsewhere
#[cfg(not(unix))]
pub struct UnixBackendHandle;

#[cfg(not(unix))]
pub struct UnixServiceManager;

#[cfg(not(unix))]
impl UnixServiceManager {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(unix))]
impl Default for UnixServiceManager {
    fn default() -> Self {
        Self::new()
    }
}
