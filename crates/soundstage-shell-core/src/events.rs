use crate::process::ProcessId;
use tokio::io::{AsyncBufReadExt, AsyncRead, BufReader};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{error, info, warn};

/// Notifications emitted by the supervisor and the platform service manager.
///
/// The supervisor's public contract stays start/stop/state; everything that
/// used to be a process callback (output, exit, spawn error) flows through
/// this channel instead, consumed by a logger collaborator.
#[derive(Debug, Clone, PartialEq)]
pub enum BackendEvent {
    /// One line of child stdout
    Stdout(String),
    /// One line of child stderr
    Stderr(String),
    /// Child spawned successfully
    Spawned(ProcessId),
    /// Child could not be spawned
    SpawnFailed(String),
    /// Child terminated on its own with the given exit code
    Exited(Option<i32>),
    /// Termination signal sent to the child
    Stopped(ProcessId),
}

pub type EventSender = mpsc::UnboundedSender<BackendEvent>;
pub type EventReceiver = mpsc::UnboundedReceiver<BackendEvent>;

/// Create the supervisor's event channel
pub fn event_channel() -> (EventSender, EventReceiver) {
    mpsc::unbounded_channel()
}

/// Which child output stream a forwarder reads
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputStream {
    Stdout,
    Stderr,
}

/// Forward lines read from a piped child stream into the event channel.
/// Ends when the stream closes or every receiver is gone.
pub fn spawn_line_forwarder<R>(
    reader: R,
    events: EventSender,
    stream: OutputStream,
) -> JoinHandle<()>
where
    R: AsyncRead + Unpin + Send + 'static,
{
    tokio::spawn(async move {
        let mut lines = BufReader::new(reader).lines();
        while let Ok(Some(line)) = lines.next_line().await {
            let event = match stream {
                OutputStream::Stdout => BackendEvent::Stdout(line),
                OutputStream::Stderr => BackendEvent::Stderr(line),
            };
            if events.send(event).is_err() {
                break;
            }
        }
    })
}

/// Drain the event channel into the process-wide tracing sink.
/// Runs until the last sender is dropped.
pub fn spawn_event_logger(mut events: EventReceiver) -> JoinHandle<()> {
    tokio::spawn(async move {
        while let Some(event) = events.recv().await {
            match event {
                BackendEvent::Stdout(line) => {
                    info!(target: "soundstage::backend", "{line}");
                }
                BackendEvent::Stderr(line) => {
                    warn!(target: "soundstage::backend", "{line}");
                }
                BackendEvent::Spawned(pid) => {
                    info!(target: "soundstage::backend", pid = pid.0, "backend started");
                }
                BackendEvent::SpawnFailed(reason) => {
                    error!(target: "soundstage::backend", %reason, "failed to start backend");
                }
                BackendEvent::Exited(code) => {
                    warn!(target: "soundstage::backend", ?code, "backend exited");
                }
                BackendEvent::Stopped(pid) => {
                    info!(target: "soundstage::backend", pid = pid.0, "backend stopped");
                }
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::io::AsyncWriteExt;

    #[tokio::test]
    async fn test_line_forwarder_emits_lines_in_order() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let (tx, mut rx) = event_channel();

        let forwarder = spawn_line_forwarder(reader, tx, OutputStream::Stdout);

        writer.write_all(b"first\nsecond\n").await.unwrap();
        drop(writer);
        forwarder.await.unwrap();

        assert_eq!(rx.recv().await, Some(BackendEvent::Stdout("first".into())));
        assert_eq!(rx.recv().await, Some(BackendEvent::Stdout("second".into())));
        assert_eq!(rx.recv().await, None);
    }

    #[tokio::test]
    async fn test_line_forwarder_tags_stderr() {
        let (mut writer, reader) = tokio::io::duplex(64);
        let (tx, mut rx) = event_channel();

        spawn_line_forwarder(reader, tx, OutputStream::Stderr);
        writer.write_all(b"oops\n").await.unwrap();

        assert_eq!(rx.recv().await, Some(BackendEvent::Stderr("oops".into())));
    }

    #[tokio::test]
    async fn test_event_logger_exits_when_senders_drop() {
        let (tx, rx) = event_channel();
        let logger = spawn_event_logger(rx);

        tx.send(BackendEvent::Exited(Some(1))).unwrap();
        drop(tx);

        logger.await.unwrap();
    }
}
