#[cfg(windows)]
mod windows_impl {
    use anyhow::Result;
    use async_trait::async_trait;
    use soundstage_shell_core::{
        EventSender, OutputStream, ProcessHandle, ProcessId, ProcessStatus,
        ServiceProcessManager, ShellError, TerminationResult, spawn_line_forwarder,
    };
    use std::path::Path;
    use std::process::Stdio;
    use std::sync::Mutex;
    use sysinfo::System;
    use tokio::process::{Child, Command};
    use tracing::{info, warn};

    /// Windows-specific handle to the spawned backend
    pub struct WindowsBackendHandle {
        child: Child,
        program: String,
    }

    impl WindowsBackendHandle {
        pub fn new(child: Child, program: String) -> Self {
            Self { child, program }
        }
    }

    #[async_trait]
    impl ProcessHandle for WindowsBackendHandle {
        fn pid(&self) -> Option<ProcessId> {
            self.child.id().map(ProcessId::from)
        }

        fn program(&self) -> &str {
            &self.program
        }

        async fn is_running(&self) -> bool {
            if let Some(pid) = self.pid() {
                let mut system = System::new();
                system.refresh_processes_specifics(
                    sysinfo::ProcessesToUpdate::All,
                    true,
                    sysinfo::ProcessRefreshKind::default(),
                );
                system.processes().keys().any(|p| p.as_u32() == pid.0)
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

    /// Windows service manager: spawns the backend with piped stdio and
    /// terminates it via `taskkill` (without /F, so the backend gets a
    /// chance to shut down cleanly).
    pub struct WindowsServiceManager {
        active: Mutex<Option<ProcessId>>,
    }

    impl WindowsServiceManager {
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

        fn taskkill(pid: ProcessId, force: bool) -> Result<std::process::Output> {
            let mut cmd = std::process::Command::new("taskkill");
            if force {
                cmd.arg("/F");
            }
            cmd.args(["/PID", &pid.0.to_string()]);
            Ok(cmd.output()?)
        }
    }

    impl Default for WindowsServiceManager {
        fn default() -> Self {
            Self::new()
        }
    }

    #[async_trait]
    impl ServiceProcessManager for WindowsServiceManager {
        type Handle = WindowsBackendHandle;

        async fn spawn_server(&self, program: &Path, events: EventSender) -> Result<Self::Handle> {
            let mut cmd = Command::new(program);
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

            Ok(WindowsBackendHandle::new(
                child,
                program.display().to_string(),
            ))
        }

        async fn terminate_gracefully(&self, pid: ProcessId) -> TerminationResult {
            self.clear_active(pid);

            match Self::taskkill(pid, false) {
                Ok(output) if output.status.success() => {
                    info!(pid = pid.0, "requested backend termination");
                    TerminationResult::Success
                }
                Ok(output) => {
                    let stderr = String::from_utf8_lossy(&output.stderr);
                    if stderr.contains("not found") {
                        info!(pid = pid.0, "backend not found (already terminated)");
                        TerminationResult::ProcessNotFound
                    } else {
                        warn!(pid = pid.0, %stderr, "taskkill failed");
                        TerminationResult::Failed(stderr.into_owned())
                    }
                }
                Err(e) => {
                    warn!(pid = pid.0, error = %e, "failed to run taskkill");
                    TerminationResult::Failed(format!("taskkill failed: {e}"))
                }
            }
        }
    }

    impl Drop for WindowsServiceManager {
        fn drop(&mut self) {
            // Emergency termination of a child that was never stopped
            // through us, e.g. on abrupt host exit.
            if let Some(pid) = self.active.lock().unwrap().take() {
                warn!(pid = pid.0, "service manager dropped with live backend");
                if let Err(e) = Self::taskkill(pid, true) {
                    warn!(pid = pid.0, error = %e, "emergency taskkill failed");
                }
            }
        }
    }
}

// Re-export the Windows implementation when on Windows systems
#[cfg(windows)]
pub use windows_impl::{WindowsBackendHandle, WindowsServiceManager};

// Stubs so the crate still compiles as a workspace member elsewhere
#[cfg(not(windows))]
pub struct WindowsBackendHandle;

#[cfg(not(windows))]
pub struct WindowsServiceManager;

#[cfg(not(windows))]
impl WindowsServiceManager {
    pub fn new() -> Self {
        Self
    }
}

#[cfg(not(windows))]
impl Default for WindowsServiceManager {
    fn default() -> Self {
        Self::new()
    }
}
