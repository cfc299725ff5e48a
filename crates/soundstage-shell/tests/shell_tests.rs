//! End-to-end shell scenarios against real child processes (Unix only)

#![cfg(unix)]

use async_trait::async_trait;
use soundstage_shell::{
    Deployment, LifecyclePhase, ProbeConfig, Shell, ShellConfig, ShellSurface, ShutdownTrigger,
    server_binary_name,
};
use std::net::SocketAddr;
use std::os::unix::fs::PermissionsExt;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpListener;

#[derive(Default)]
struct CountingSurface {
    main: AtomicUsize,
    degraded: AtomicUsize,
}

#[async_trait]
impl ShellSurface for CountingSurface {
    async fn reveal_main(&self) {
        self.main.fetch_add(1, Ordering::SeqCst);
    }

    async fn reveal_degraded(&self) {
        self.degraded.fetch_add(1, Ordering::SeqCst);
    }
}

/// Lay out `<root>/bin/<platform binary name>` as a shell script
fn install_fake_backend(root: &std::path::Path, body: &str) {
    let bin = root.join("bin");
    std::fs::create_dir_all(&bin).unwrap();

    let path = bin.join(server_binary_name(std::env::consts::OS));
    std::fs::write(&path, format!("#!/bin/sh\n{body}\n")).unwrap();
    let mut perms = std::fs::metadata(&path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(&path, perms).unwrap();
}

/// Health endpoint that always answers 200
async fn health_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();

    tokio::spawn(async move {
        while let Ok((mut socket, _)) = listener.accept().await {
            let mut buf = [0u8; 1024];
            let _ = socket.read(&mut buf).await;
            let _ = socket
                .write_all(b"HTTP/1.1 200 OK\r\ncontent-length: 0\r\nconnection: close\r\n\r\n")
                .await;
        }
    });

    addr
}

/// A loopback port that refuses every connection
async fn refused_endpoint() -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);
    addr
}

fn config(root: &std::path::Path, health: SocketAddr) -> ShellConfig {
    ShellConfig::builder()
        .name("soundstage-test")
        .version("0.1.0")
        .deployment(Deployment::Development {
            root: root.to_path_buf(),
        })
        .health_url(format!("http://{health}/"))
        .probe(ProbeConfig {
            timeout_ms: 1_000,
            interval_ms: 100,
        })
        .persistent_session(false)
        .build()
        .unwrap()
}

#[tokio::test]
async fn test_full_cycle_with_real_backend() {
    let dir = tempfile::tempdir().unwrap();
    install_fake_backend(dir.path(), "sleep 30");
    let health = health_endpoint().await;

    let surface = Arc::new(CountingSurface::default());
    let shell = Shell::new(config(dir.path(), health), surface.clone()).unwrap();

    shell.ready().await;
    assert_eq!(shell.phase(), LifecyclePhase::Running);
    assert_eq!(surface.main.load(Ordering::SeqCst), 1);
    assert_eq!(surface.degraded.load(Ordering::SeqCst), 0);

    shell.shutdown(ShutdownTrigger::QuitRequested).await;
    assert_eq!(shell.phase(), LifecyclePhase::ShuttingDown);
    assert!(shell.exit_requested());

    // duplicate triggers after teardown stay no-ops
    shell.shutdown(ShutdownTrigger::Interrupt).await;
    shell.shutdown(ShutdownTrigger::HostExit).await;
}

#[tokio::test]
async fn test_missing_binary_reaches_degraded() {
    let dir = tempfile::tempdir().unwrap();
    let health = refused_endpoint().await;

    let surface = Arc::new(CountingSurface::default());
    let shell = Shell::new(config(dir.path(), health), surface.clone()).unwrap();

    shell.ready().await;
    assert_eq!(shell.phase(), LifecyclePhase::Degraded);
    assert_eq!(surface.main.load(Ordering::SeqCst), 0);
    assert_eq!(surface.degraded.load(Ordering::SeqCst), 1);

    // nothing was spawned; shutdown still completes cleanly
    shell.shutdown(ShutdownTrigger::Interrupt).await;
    assert!(shell.exit_requested());
}

#[tokio::test]
async fn test_concurrent_triggers_after_ready() {
    let dir = tempfile::tempdir().unwrap();
    install_fake_backend(dir.path(), "sleep 30");
    let health = health_endpoint().await;

    let surface = Arc::new(CountingSurface::default());
    let shell = Shell::new(config(dir.path(), health), surface).unwrap();

    shell.ready().await;
    tokio::join!(
        shell.shutdown(ShutdownTrigger::WindowsClosed),
        shell.shutdown(ShutdownTrigger::Terminate),
    );
    assert!(shell.exit_requested());
}
