use std::{net::IpAddr, time::Duration};

use http::{HeaderValue, Method, header::CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use tower_http::cors::{AllowOrigin, CorsLayer};

/// HTTP server configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ServerConfig {
    /// Host address to bind to.
    #[serde(default = "default_host")]
    pub host: IpAddr,

    /// Port to listen on.
    #[serde(default = "default_port")]
    pub port: u16,

    /// Request body size limit in bytes.
    #[serde(default = "default_body_limit")]
    pub body_limit_bytes: usize,

    /// Request timeout in seconds. Requests running longer get a 408.
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// CORS configuration for the dashboard frontend.
    #[serde(default)]
    pub cors: CorsConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            body_limit_bytes: default_body_limit(),
            timeout_secs: default_timeout(),
            cors: CorsConfig::default(),
        }
    }
}

impl ServerConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

fn default_host() -> IpAddr {
    IpAddr::from([0, 0, 0, 0])
}

fn default_port() -> u16 {
    5000
}

fn default_body_limit() -> usize {
    1024 * 1024 // 1 MB, reports take no request body
}

fn default_timeout() -> u64 {
    30
}

/// Cross-origin access for the dashboard frontend.
///
/// Reports are read-only, so the layer only ever allows `GET` with a
/// `Content-Type` header. Preflight responses are cached for a day.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CorsConfig {
    #[serde(default = "default_cors_enabled")]
    pub enabled: bool,

    /// Dashboard origins. `["*"]` allows any origin; empty allows none.
    #[serde(default)]
    pub allowed_origins: Vec<String>,
}

impl Default for CorsConfig {
    fn default() -> Self {
        Self {
            enabled: default_cors_enabled(),
            allowed_origins: Vec::new(),
        }
    }
}

const CORS_MAX_AGE: Duration = Duration::from_secs(24 * 60 * 60);

impl CorsConfig {
    /// `None` when CORS is disabled. Unparseable origins are logged and dropped.
    pub fn into_layer(self) -> Option<CorsLayer> {
        if !self.enabled {
            return None;
        }

        let origins = if self.allowed_origins.iter().any(|o| o == "*") {
            tracing::warn!("Dashboard CORS allows any origin");
            AllowOrigin::any()
        } else {
            AllowOrigin::list(self.allowed_origins.iter().filter_map(|origin| {
                HeaderValue::from_str(origin)
                    .inspect_err(|_| tracing::warn!(%origin, "Ignoring invalid CORS origin"))
                    .ok()
            }))
        };

        Some(
            CorsLayer::new()
                .allow_origin(origins)
                .allow_methods([Method::GET])
                .allow_headers([CONTENT_TYPE])
                .max_age(CORS_MAX_AGE),
        )
    }
}

fn default_cors_enabled() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.port, 5000);
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert!(config.cors.enabled);
        assert!(config.cors.allowed_origins.is_empty());
    }

    #[test]
    fn test_disabled_cors_has_no_layer() {
        let cors = CorsConfig {
            enabled: false,
            ..Default::default()
        };
        assert!(cors.into_layer().is_none());
    }

    #[test]
    fn test_cors_layer_with_origins() {
        let cors = CorsConfig {
            allowed_origins: vec!["http://localhost:3000".into(), "not a header\n".into()],
            ..Default::default()
        };
        assert!(cors.into_layer().is_some());
    }
}
