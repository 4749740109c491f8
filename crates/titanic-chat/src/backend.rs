//! Starting the API server when nothing is listening on its port.

use std::process::Stdio;
use std::time::{Duration, Instant};

use anyhow::{bail, Context};
use reqwest::Url;
use tokio::net::TcpStream;
use tokio::process::{Child, Command};
use tracing::{debug, info, warn};

use titanic_config::ClientConfig;

pub const POLL_INTERVAL: Duration = Duration::from_millis(500);
const CONNECT_TIMEOUT: Duration = Duration::from_millis(300);

/// `host:port` of an API base URL, using the scheme's default port when
/// none is given.
pub fn socket_addr(api_url: &str) -> anyhow::Result<String> {
    let url = Url::parse(api_url).with_context(|| format!("Invalid API URL: {api_url}"))?;
    let host = url.host_str().context("API URL has no host")?;
    let port = url.port_or_known_default().context("API URL has no port")?;
    Ok(format!("{host}:{port}"))
}

/// True when something accepts TCP connections at `addr`.
pub async fn port_open(addr: &str) -> bool {
    matches!(
        tokio::time::timeout(CONNECT_TIMEOUT, TcpStream::connect(addr)).await,
        Ok(Ok(_))
    )
}

/// Make sure an API server is listening. Returns the child process when
/// one was started here; it is killed when the handle is dropped.
pub async fn ensure_backend(config: &ClientConfig) -> anyhow::Result<Option<Child>> {
    let addr = socket_addr(&config.api_url)?;
    if port_open(&addr).await {
        debug!(addr = %addr, "Backend already listening");
        return Ok(None);
    }
    if !config.autostart_backend {
        bail!("Nothing is listening on {addr} and backend autostart is disabled");
    }

    let mut parts = config.server_command.split_whitespace();
    let program = parts.next().context("client.server_command is empty")?;
    info!(command = %config.server_command, "Starting backend");
    let mut child = Command::new(program)
        .args(parts)
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .kill_on_drop(true)
        .spawn()
        .with_context(|| format!("Failed to start backend with `{}`", config.server_command))?;

    let deadline = Instant::now() + Duration::from_millis(config.startup_wait_ms);
    loop {
        if port_open(&addr).await {
            info!(addr = %addr, "Backend is up");
            return Ok(Some(child));
        }
        if let Some(status) = child.try_wait()? {
            bail!("Backend exited during startup ({status})");
        }
        if Instant::now() >= deadline {
            warn!(addr = %addr, wait_ms = config.startup_wait_ms, "Backend did not come up");
            bail!("Backend did not start listening on {addr} within {} ms", config.startup_wait_ms);
        }
        tokio::time::sleep(POLL_INTERVAL).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::TcpListener;

    #[test]
    fn test_socket_addr() {
        assert_eq!(socket_addr("http://localhost:8000").unwrap(), "localhost:8000");
        assert_eq!(socket_addr("http://example.com/api").unwrap(), "example.com:80");
        assert_eq!(socket_addr("https://example.com").unwrap(), "example.com:443");
        assert!(socket_addr("not a url").is_err());
    }

    #[tokio::test]
    async fn test_existing_listener_is_reused() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let port = listener.local_addr().unwrap().port();
        let config = ClientConfig {
            api_url: format!("http://127.0.0.1:{port}"),
            server_command: "definitely-not-a-real-binary".into(),
            ..Default::default()
        };
        assert!(ensure_backend(&config).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_autostart_disabled() {
        let port = free_port().await;
        let config = ClientConfig {
            api_url: format!("http://127.0.0.1:{port}"),
            autostart_backend: false,
            ..Default::default()
        };
        let err = ensure_backend(&config).await.unwrap_err();
        assert!(err.to_string().contains("autostart is disabled"));
    }

    #[tokio::test]
    async fn test_missing_server_binary() {
        let port = free_port().await;
        let config = ClientConfig {
            api_url: format!("http://127.0.0.1:{port}"),
            server_command: "definitely-not-a-real-binary --port 1".into(),
            startup_wait_ms: 1_000,
            ..Default::default()
        };
        let err = ensure_backend(&config).await.unwrap_err();
        assert!(err.to_string().contains("Failed to start backend"));
    }

    async fn free_port() -> u16 {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        listener.local_addr().unwrap().port()
    }
}
