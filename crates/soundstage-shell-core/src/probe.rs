use crate::config::ProbeConfig;
use crate::error::ShellError;
use anyhow::{Result, anyhow};
use backon::{ConstantBuilder, Retryable};
use tracing::{debug, info, warn};

/// Polls the backend health endpoint until it answers or a deadline passes.
///
/// The probe never returns an error: a backend that does not come up in time
/// is a normal outcome, reported as `false`. Individual attempt failures
/// (connection refused, timeouts) are swallowed inside the loop.
pub struct ReadinessProbe {
    client: reqwest::Client,
    config: ProbeConfig,
}

impl ReadinessProbe {
    /// Create a probe from the given polling parameters. Each attempt is
    /// bounded by one interval via the HTTP client timeout, so a hung
    /// endpoint cannot stall the loop past its deadline by more than that.
    pub fn new(config: ProbeConfig) -> Result<Self, ShellError> {
        config
            .validate()
            .map_err(|e| ShellError::Configuration(e.to_string()))?;

        let client = reqwest::Client::builder()
            .timeout(config.interval())
            .build()
            .map_err(|e| ShellError::Configuration(e.to_string()))?;

        Ok(Self { client, config })
    }

    /// Poll `url` until a 2xx response is observed (true, immediately) or the
    /// configured deadline is exhausted (false). Holds no resource after
    /// returning; every call starts a fresh deadline.
    pub async fn wait_until_ready(&self, url: &str) -> bool {
        info!(
            %url,
            timeout_ms = self.config.timeout_ms,
            interval_ms = self.config.interval_ms,
            "waiting for backend readiness"
        );

        let policy = ConstantBuilder::default()
            .with_delay(self.config.interval())
            .with_max_times(self.config.max_retries());

        let outcome = (|| self.check_once(url))
            .retry(policy)
            .notify(|err, _| debug!(%err, "backend not ready yet"))
            .await;

        match outcome {
            Ok(()) => {
                info!(%url, "backend is ready");
                true
            }
            Err(err) => {
                warn!(%url, %err, "backend did not become ready before the deadline");
                false
            }
        }
    }

    async fn check_once(&self, url: &str) -> Result<()> {
        let response = self.client.get(url).send().await?;
        let status = response.status();
        if status.is_success() {
            Ok(())
        } else {
            Err(anyhow!("health check returned {status}"))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::SocketAddr;
    use std::time::{Duration, Instant};
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    /// Minimal health endpoint: refuses nothing, answers 503 for the first
    /// `failures` requests and 200 afterwards.
    async fn spawn_health_endpoint(failures: usize) -> SocketAddr {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        tokio::spawn(async move {
            let mut seen = 0usize;
            while let Ok((mut socket, _)) = listener.accept().await {
                seen += 1;
                let status = if seen > failures {
                    "200 OK"
                } else {
                    "503 Service Unavailable"
                };

                let mut buf = [0u8; 1024];
                let _ = socket.read(&mut buf).await;
                let response =
                    format!("HTTP/1.1 {status}\r\ncontent-length: 0\r\nconnection: close\r\n\r\n");
                let _ = socket.write_all(response.as_bytes()).await;
            }
        });

        addr
    }

    fn probe(timeout_ms: u64, interval_ms: u64) -> ReadinessProbe {
        ReadinessProbe::new(ProbeConfig {
            timeout_ms,
            interval_ms,
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_ready_immediately() {
        let addr = spawn_health_endpoint(0).await;
        let probe = probe(1_000, 100);

        let started = Instant::now();
        assert!(probe.wait_until_ready(&format!("http://{addr}/")).await);
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[tokio::test]
    async fn test_ready_on_third_attempt() {
        let addr = spawn_health_endpoint(2).await;
        let probe = probe(2_000, 100);

        let started = Instant::now();
        assert!(probe.wait_until_ready(&format!("http://{addr}/")).await);

        // two failed attempts and two sleeps before the third succeeds
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(150), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1_500), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_never_ready_times_out() {
        // Bind and immediately drop so the port refuses connections.
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let probe = probe(600, 200);

        let started = Instant::now();
        assert!(!probe.wait_until_ready(&format!("http://{addr}/")).await);

        // total elapsed stays within one interval of the configured timeout
        let elapsed = started.elapsed();
        assert!(elapsed >= Duration::from_millis(550), "elapsed {elapsed:?}");
        assert!(elapsed < Duration::from_millis(1_500), "elapsed {elapsed:?}");
    }

    #[tokio::test]
    async fn test_non_ok_status_is_not_ready() {
        let addr = spawn_health_endpoint(usize::MAX).await;
        let probe = probe(400, 100);

        assert!(!probe.wait_until_ready(&format!("http://{addr}/")).await);
    }

    #[tokio::test]
    async fn test_probe_is_restartable() {
        let addr = spawn_health_endpoint(0).await;
        let probe = probe(500, 100);
        let url = format!("http://{addr}/");

        assert!(probe.wait_until_ready(&url).await);
        assert!(probe.wait_until_ready(&url).await);
    }

    #[test]
    fn test_rejects_invalid_config() {
        let result = ReadinessProbe::new(ProbeConfig {
            timeout_ms: 100,
            interval_ms: 500,
        });
        assert!(matches!(result, Err(ShellError::Configuration(_))));
    }
}
