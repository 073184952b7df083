//! Configuration types for audio-dl

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::{net::SocketAddr, path::PathBuf, time::Duration};
use utoipa::ToSchema;

/// HTTP server configuration
///
/// Used as a nested sub-config within [`Config`].
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ServerConfig {
    /// Bind address for the API server (default: "0.0.0.0:5000")
    #[serde(default = "default_bind_address")]
    #[schema(value_type = String)]
    pub bind_address: SocketAddr,

    /// Whether CORS headers are emitted (default: true)
    #[serde(default = "default_true")]
    pub cors_enabled: bool,

    /// Allowed CORS origins; "*" allows any origin (default: ["*"])
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,

    /// Whether the interactive Swagger UI is served (default: true)
    #[serde(default = "default_true")]
    pub swagger_ui: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            cors_enabled: true,
            cors_origins: default_cors_origins(),
            swagger_ui: true,
        }
    }
}

/// Outbound proxy configuration
///
/// All extraction traffic is routed through this proxy when set.
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ProxyConfig {
    /// Proxy URL, e.g. "http://host:8080" (None disables proxying)
    #[serde(default = "default_proxy_url")]
    pub url: Option<String>,
}

impl Default for ProxyConfig {
    fn default() -> Self {
        Self {
            url: default_proxy_url(),
        }
    }
}

/// Extraction tool (yt-dlp) configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct ExtractorConfig {
    /// Path to the yt-dlp executable (searched on PATH if None)
    #[serde(default)]
    #[schema(value_type = Option<String>)]
    pub binary: Option<PathBuf>,

    /// Socket timeout passed to the tool, in seconds (default: 60)
    #[serde(default = "default_socket_timeout_secs")]
    pub socket_timeout_secs: u64,

    /// Retry count passed to the tool (default: 5)
    #[serde(default = "default_retries")]
    pub retries: u32,

    /// Format selector preferring standalone audio streams
    #[serde(default = "default_format_preference")]
    pub format_preference: String,

    /// Player clients to impersonate for YouTube extraction
    #[serde(default = "default_player_clients")]
    pub player_clients: Vec<String>,

    /// Whether to attempt geo-restriction bypass (default: true)
    #[serde(default = "default_true")]
    pub geo_bypass: bool,

    /// Whether TLS certificates are verified (default: false, matching the
    /// proxy-heavy deployments this service targets)
    #[serde(default)]
    pub check_certificates: bool,

    /// Well-known media identifier used by the connectivity probe
    #[serde(default = "default_test_media_id")]
    pub test_media_id: String,
}

impl Default for ExtractorConfig {
    fn default() -> Self {
        Self {
            binary: None,
            socket_timeout_secs: default_socket_timeout_secs(),
            retries: default_retries(),
            format_preference: default_format_preference(),
            player_clients: default_player_clients(),
            geo_bypass: true,
            check_certificates: false,
            test_media_id: default_test_media_id(),
        }
    }
}

impl ExtractorConfig {
    /// Socket timeout as a [`Duration`].
    pub fn socket_timeout(&self) -> Duration {
        Duration::from_secs(self.socket_timeout_secs)
    }
}

/// Janitor (temp-file sweeper) configuration
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct JanitorConfig {
    /// Seconds between sweeps (default: 300)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Age in seconds past which a registry entry and its artifact are
    /// removed (default: 600)
    #[serde(default = "default_max_age_secs")]
    pub max_age_secs: u64,
}

impl Default for JanitorConfig {
    fn default() -> Self {
        Self {
            sweep_interval_secs: default_sweep_interval_secs(),
            max_age_secs: default_max_age_secs(),
        }
    }
}

impl JanitorConfig {
    /// Sweep interval as a [`Duration`].
    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    /// Maximum artifact age as a [`Duration`].
    pub fn max_age(&self) -> Duration {
        Duration::from_secs(self.max_age_secs)
    }
}

/// Main configuration for the audio-dl service
///
/// Fields are organized into logical sub-configs:
/// - [`server`](ServerConfig) - bind address, CORS, Swagger UI
/// - [`proxy`](ProxyConfig) - outbound proxy for extraction traffic
/// - [`extractor`](ExtractorConfig) - yt-dlp binary and invocation options
/// - [`janitor`](JanitorConfig) - sweep cadence and artifact TTL
#[derive(Clone, Debug, Serialize, Deserialize, ToSchema)]
pub struct Config {
    /// HTTP server settings
    #[serde(default)]
    pub server: ServerConfig,

    /// Outbound proxy settings
    #[serde(default)]
    pub proxy: ProxyConfig,

    /// Extraction tool settings
    #[serde(default)]
    pub extractor: ExtractorConfig,

    /// Janitor settings
    #[serde(default)]
    pub janitor: JanitorConfig,

    /// Directory for transient audio artifacts (default: the system temp dir)
    #[serde(default = "default_temp_dir")]
    #[schema(value_type = String)]
    pub temp_dir: PathBuf,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            proxy: ProxyConfig::default(),
            extractor: ExtractorConfig::default(),
            janitor: JanitorConfig::default(),
            temp_dir: default_temp_dir(),
        }
    }
}

impl Config {
    /// Build a default configuration, honoring the `PORT` environment
    /// variable for the listening port.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(port) = std::env::var("PORT")
            && let Ok(port) = port.parse::<u16>()
        {
            config.server.bind_address.set_port(port);
        }
        config
    }

    /// Validate settings that cannot be checked by the type system.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] when the proxy URL does not parse.
    pub fn validate(&self) -> Result<()> {
        if let Some(proxy) = &self.proxy.url {
            url::Url::parse(proxy).map_err(|e| Error::Config {
                message: format!("invalid proxy URL {proxy:?}: {e}"),
                key: Some("proxy.url".to_string()),
            })?;
        }
        Ok(())
    }

    /// The proxy URL as displayed by the API surface (empty when disabled).
    pub fn proxy_display(&self) -> &str {
        self.proxy.url.as_deref().unwrap_or("")
    }
}

fn default_bind_address() -> SocketAddr {
    SocketAddr::from(([0, 0, 0, 0], 5000))
}

fn default_true() -> bool {
    true
}

fn default_cors_origins() -> Vec<String> {
    vec!["*".to_string()]
}

fn default_proxy_url() -> Option<String> {
    Some("http://144.125.164.158:8080".to_string())
}

fn default_socket_timeout_secs() -> u64 {
    60
}

fn default_retries() -> u32 {
    5
}

fn default_format_preference() -> String {
    "bestaudio[ext=m4a]/bestaudio[ext=webm]/bestaudio/best".to_string()
}

fn default_player_clients() -> Vec<String> {
    vec!["android".to_string(), "web".to_string()]
}

fn default_test_media_id() -> String {
    "dQw4w9WgXcQ".to_string()
}

fn default_sweep_interval_secs() -> u64 {
    300
}

fn default_max_age_secs() -> u64 {
    600
}

fn default_temp_dir() -> PathBuf {
    std::env::temp_dir()
}

#[allow(clippy::unwrap_used, clippy::expect_used)]
#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_deployed_constants() {
        let config = Config::default();
        assert_eq!(config.server.bind_address.port(), 5000);
        assert_eq!(
            config.proxy.url.as_deref(),
            Some("http://144.125.164.158:8080")
        );
        assert_eq!(config.extractor.socket_timeout(), Duration::from_secs(60));
        assert_eq!(config.extractor.retries, 5);
        assert_eq!(config.extractor.test_media_id, "dQw4w9WgXcQ");
        assert_eq!(config.janitor.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.janitor.max_age(), Duration::from_secs(600));
        assert!(config.server.cors_enabled);
    }

    #[test]
    fn partial_json_fills_in_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"janitor": {"max_age_secs": 60}}"#).unwrap();
        assert_eq!(config.janitor.max_age(), Duration::from_secs(60));
        // Untouched fields keep their defaults
        assert_eq!(config.janitor.sweep_interval(), Duration::from_secs(300));
        assert_eq!(config.server.bind_address.port(), 5000);
    }

    #[test]
    fn validate_rejects_malformed_proxy() {
        let mut config = Config::default();
        config.proxy.url = Some("not a url".to_string());
        let err = config.validate().unwrap_err();
        assert!(matches!(err, Error::Config { key: Some(k), .. } if k == "proxy.url"));
    }

    #[test]
    fn validate_accepts_disabled_proxy() {
        let mut config = Config::default();
        config.proxy.url = None;
        config.validate().unwrap();
        assert_eq!(config.proxy_display(), "");
    }

    #[test]
    fn from_env_honors_port_override() {
        // Temporarily set PORT; restore afterwards to avoid polluting other tests.
        let previous = std::env::var("PORT").ok();
        unsafe { std::env::set_var("PORT", "8123") };
        let config = Config::from_env();
        match previous {
            Some(value) => unsafe { std::env::set_var("PORT", value) },
            None => unsafe { std::env::remove_var("PORT") },
        }
        assert_eq!(config.server.bind_address.port(), 8123);
    }
}
