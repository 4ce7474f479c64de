use serde::Deserialize;

use crate::error::ServerError;

/// HTTP server bind configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Address to bind to.
    #[serde(default = "default_host")]
    pub host: String,
    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,
    /// Maximum time to wait for in-flight requests during shutdown.
    #[serde(default = "default_shutdown_timeout")]
    pub shutdown_timeout_seconds: u64,
}

impl ServerConfig {
    /// Apply command-line and environment overrides.
    ///
    /// The port is taken from `cli_port`, then `env_port` (the `PORT`
    /// environment variable), then the value already loaded from file.
    pub fn apply_overrides(
        &mut self,
        cli_host: Option<String>,
        cli_port: Option<u16>,
        env_port: Option<&str>,
    ) -> Result<(), ServerError> {
        if let Some(host) = cli_host {
            self.host = host;
        }
        if let Some(port) = cli_port {
            self.port = port;
        } else if let Some(raw) = env_port {
            self.port = raw
                .trim()
                .parse()
                .map_err(|e| ServerError::Config(format!("invalid PORT {raw:?}: {e}")))?;
        }
        Ok(())
    }

    /// `host:port` suitable for binding.
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            shutdown_timeout_seconds: default_shutdown_timeout(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_owned()
}

fn default_port() -> u16 {
    3000
}

fn default_shutdown_timeout() -> u64 {
    10
}
