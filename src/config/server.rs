//! HTTP listener and log output settings.

use serde::Deserialize;
use std::net::{IpAddr, SocketAddr};

use super::error::ValidationError;

const DEFAULT_LOG_FILTER: &str = "info,payment_gateway_client=debug,sqlx=warn";

/// Where the payment API listens and how it logs.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Interface to bind; must be an IP literal.
    pub host: String,
    pub port: u16,
    /// `EnvFilter` directive, overridden by `RUST_LOG` when set.
    pub log_level: String,
    /// Emit one JSON object per log line instead of the pretty format.
    pub log_json: bool,
}

impl ServerConfig {
    /// Resolves host and port into the listener address.
    pub fn socket_addr(&self) -> Result<SocketAddr, ValidationError> {
        let ip: IpAddr = self
            .host
            .trim()
            .parse()
            .map_err(|_| ValidationError::InvalidBindAddress(self.host.clone()))?;
        Ok(SocketAddr::new(ip, self.port))
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.port == 0 {
            return Err(ValidationError::InvalidPort);
        }
        self.socket_addr().map(|_| ())
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            log_level: DEFAULT_LOG_FILTER.to_string(),
            log_json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn listening_on(host: &str, port: u16) -> ServerConfig {
        ServerConfig {
            host: host.to_string(),
            port,
            ..ServerConfig::default()
        }
    }

    #[test]
    fn defaults_listen_on_all_interfaces() {
        let server = ServerConfig::default();

        assert_eq!(server.socket_addr().unwrap(), "0.0.0.0:8080".parse().unwrap());
        assert!(server.log_level.contains("payment_gateway_client=debug"));
        assert!(!server.log_json);
    }

    #[test]
    fn ipv6_hosts_are_accepted() {
        let addr = listening_on("::1", 9000).socket_addr().unwrap();
        assert!(addr.is_ipv6());
        assert_eq!(addr.port(), 9000);
    }

    #[test]
    fn port_zero_is_rejected() {
        assert_eq!(
            listening_on("127.0.0.1", 0).validate(),
            Err(ValidationError::InvalidPort)
        );
    }

    #[test]
    fn hostnames_are_not_bind_addresses() {
        assert_eq!(
            listening_on("localhost", 8080).validate(),
            Err(ValidationError::InvalidBindAddress("localhost".to_string()))
        );
    }
}
