use crate::config::ShellConfig;
use crate::events::{BackendEvent, EventSender};
use crate::process::{ProcessHandle, ProcessStatus, ServiceProcessManager, TerminationResult};
use std::path::PathBuf;
use std::sync::{Arc, Mutex as StdMutex};
use std::time::Duration;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

/// Lifecycle of the supervised backend process
#[derive(Debug, Clone, PartialEq)]
pub enum SupervisorState {
    Idle,
    Starting,
    Running,
    Stopping,
    Stopped,
    /// Spawn failed or the child exited on its own
    Failed(String),
}

/// How often the exit watcher polls the child for an unobserved exit
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(250);

/// Owns the single backend child process.
///
/// The handle lives in one mutex-guarded slot; every state change goes
/// through "take the handle out of the slot before acting on it", which is
/// what makes `stop` idempotent under concurrent triggers. Output and exit
/// notifications are emitted on the event channel rather than via callbacks.
pub struct BackendSupervisor<M: ServiceProcessManager> {
    manager: Arc<M>,
    /// Resolved once at construction; immutable afterwards
    binary: PathBuf,
    handle: Arc<Mutex<Option<M::Handle>>>,
    state: Arc<StdMutex<SupervisorState>>,
    events: EventSender,
    watcher: StdMutex<CancellationToken>,
}

impl<M: ServiceProcessManager> BackendSupervisor<M> {
    pub fn new(manager: M, config: &ShellConfig, events: EventSender) -> Self {
        Self {
            manager: Arc::new(manager),
            binary: config.backend_binary(),
            handle: Arc::new(Mutex::new(None)),
            state: Arc::new(StdMutex::new(SupervisorState::Idle)),
            events,
            watcher: StdMutex::new(CancellationToken::new()),
        }
    }

    /// Spawn the backend if it is not already running.
    ///
    /// A spawn failure is recorded in the supervisor state and the event
    /// channel but never surfaces as an error; the caller proceeds to the
    /// readiness probe and the degraded path from there.
    pub async fn start(&self) {
        let mut slot = self.handle.lock().await;

        if let Some(handle) = slot.as_ref() {
            if handle.is_running().await {
                debug!("backend already running, leaving it in place");
                return;
            }
            slot.take();
        }

        self.set_state(SupervisorState::Starting);
        info!(binary = %self.binary.display(), "starting backend server");

        match self
            .manager
            .spawn_server(&self.binary, self.events.clone())
            .await
        {
            Ok(handle) => {
                if let Some(pid) = handle.pid() {
                    let _ = self.events.send(BackendEvent::Spawned(pid));
                }
                *slot = Some(handle);
                self.set_state(SupervisorState::Running);
                drop(slot);
                self.spawn_exit_watcher();
            }
            Err(err) => {
                error!(%err, "failed to start backend server");
                let _ = self.events.send(BackendEvent::SpawnFailed(err.to_string()));
                self.set_state(SupervisorState::Failed(err.to_string()));
            }
        }
    }

    /// Send one graceful termination signal to the backend, if any is live.
    ///
    /// Idempotent and safe under concurrent invocation: the handle is taken
    /// out of its slot first, so at most one caller ever signals the child.
    /// Does not wait for the child to actually exit.
    pub async fn stop(&self) {
        let taken = self.handle.lock().await.take();
        let Some(handle) = taken else {
            debug!("stop requested with no live backend, nothing to do");
            return;
        };

        self.set_state(SupervisorState::Stopping);
        self.watcher.lock().unwrap().cancel();

        match handle.pid() {
            Some(pid) => {
                info!(pid = pid.0, "stopping backend server");
                match self.manager.terminate_gracefully(pid).await {
                    TerminationResult::Success => {
                        let _ = self.events.send(BackendEvent::Stopped(pid));
                    }
                    TerminationResult::ProcessNotFound => {
                        debug!(pid = pid.0, "backend already gone");
                    }
                    result => {
                        warn!(pid = pid.0, ?result, "failed to terminate backend");
                    }
                }
            }
            None => debug!("backend handle had no pid, already exited"),
        }

        self.set_state(SupervisorState::Stopped);
    }

    /// Whether a live child is currently held
    pub async fn is_alive(&self) -> bool {
        match self.handle.lock().await.as_ref() {
            Some(handle) => handle.is_running().await,
            None => false,
        }
    }

    pub fn state(&self) -> SupervisorState {
        self.state.lock().unwrap().clone()
    }

    fn set_state(&self, next: SupervisorState) {
        *self.state.lock().unwrap() = next;
    }

    /// Watch for the child exiting on its own: clear the slot, record the
    /// exit code, and notify. An unexpected exit does not trigger shutdown.
    fn spawn_exit_watcher(&self) {
        let token = CancellationToken::new();
        *self.watcher.lock().unwrap() = token.clone();

        let handle = self.handle.clone();
        let state = self.state.clone();
        let events = self.events.clone();

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(EXIT_POLL_INTERVAL);
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    _ = ticker.tick() => {
                        let mut slot = handle.lock().await;
                        let Some(child) = slot.as_mut() else { break };

                        match child.try_wait().await {
                            Ok(Some(ProcessStatus::Exited(code))) => {
                                slot.take();
                                warn!(?code, "backend exited unexpectedly");
                                let _ = events.send(BackendEvent::Exited(code));
                                *state.lock().unwrap() = SupervisorState::Failed(
                                    format!("backend exited with code {code:?}"),
                                );
                                break;
                            }
                            Ok(_) => {}
                            Err(err) => {
                                warn!(%err, "failed to poll backend exit status");
                            }
                        }
                    }
                }
            }
        });
    }
}
