use serde::Deserialize;
use std::net::SocketAddr;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
    pub security: SecurityConfig,
    pub routing: RoutingConfig,
    #[serde(default)]
    pub fcm: FcmConfig,
    #[serde(default)]
    pub classifier: ClassifierConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_host")]
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,

    #[serde(default = "default_max_connections")]
    pub max_connections: u32,

    #[serde(default = "default_min_connections")]
    pub min_connections: u32,

    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,

    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
}

impl DatabaseConfig {
    /// Converts to the persistence-layer pool configuration.
    pub fn pool_config(&self) -> persistence::db::DatabaseConfig {
        persistence::db::DatabaseConfig {
            url: self.url.clone(),
            max_connections: self.max_connections,
            min_connections: self.min_connections,
            connect_timeout_secs: self.connect_timeout_secs,
            idle_timeout_secs: self.idle_timeout_secs,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    #[serde(default = "default_log_format")]
    pub format: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SecurityConfig {
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

/// Knobs for circle resolution and relay deduplication.
#[derive(Debug, Clone, Deserialize)]
pub struct RoutingConfig {
    /// Activation radius for institutional and community circles, km.
    #[serde(default = "default_activation_radius")]
    pub activation_radius_km: f64,

    /// Community pings older than this are ignored, minutes.
    #[serde(default = "default_freshness_window")]
    pub ping_freshness_min: i64,

    /// Window within which a relayed re-report folds into the original.
    #[serde(default = "default_relay_window")]
    pub relay_dedup_window_min: i64,

    /// Cap on institutional matches echoed in the submission ack.
    #[serde(default = "default_ack_detail_limit")]
    pub ack_detail_limit: usize,
}

impl Default for RoutingConfig {
    fn default() -> Self {
        Self {
            activation_radius_km: default_activation_radius(),
            ping_freshness_min: default_freshness_window(),
            relay_dedup_window_min: default_relay_window(),
            ack_detail_limit: default_ack_detail_limit(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct FcmConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Firebase project id.
    #[serde(default)]
    pub project_id: String,

    /// Service account credentials: inline JSON or a file path.
    #[serde(default)]
    pub credentials: String,

    #[serde(default = "default_fcm_timeout_ms")]
    pub timeout_ms: u64,
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct ClassifierConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_classifier_url")]
    pub url: String,

    #[serde(default)]
    pub api_key: String,

    #[serde(default = "default_classifier_model")]
    pub model: String,

    #[serde(default = "default_classifier_timeout")]
    pub timeout_secs: u64,
}

// Default value functions
fn default_host() -> String {
    "0.0.0.0".to_string()
}
fn default_port() -> u16 {
    8080
}
fn default_request_timeout() -> u64 {
    30
}
fn default_max_connections() -> u32 {
    20
}
fn default_min_connections() -> u32 {
    5
}
fn default_connect_timeout() -> u64 {
    10
}
fn default_idle_timeout() -> u64 {
    600
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_log_format() -> String {
    "json".to_string()
}
fn default_activation_radius() -> f64 {
    1.0
}
fn default_freshness_window() -> i64 {
    30
}
fn default_relay_window() -> i64 {
    5
}
fn default_ack_detail_limit() -> usize {
    5
}
fn default_fcm_timeout_ms() -> u64 {
    15_000
}
fn default_classifier_url() -> String {
    "https://api.anthropic.com/v1/messages".to_string()
}
fn default_classifier_model() -> String {
    "claude-3-5-haiku-latest".to_string()
}
fn default_classifier_timeout() -> u64 {
    30
}

impl Config {
    /// Load configuration from files and environment variables.
    ///
    /// Loading order (later sources override earlier):
    /// 1. config/default.toml - base configuration with defaults
    /// 2. config/local.toml - local overrides (optional, not in git)
    /// 3. Environment variables with SOS__ prefix
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("SOS").separator("__"))
            .build()?;

        let cfg: Self = config.try_deserialize()?;
        cfg.validate()
            .map_err(|e| config::ConfigError::Message(e.to_string()))?;
        Ok(cfg)
    }

    /// Load configuration for testing with custom overrides, without
    /// touching the file system.
    #[cfg(test)]
    pub fn load_for_test(overrides: &[(&str, &str)]) -> Result<Self, config::ConfigError> {
        let defaults = r#"
            [server]
            host = "0.0.0.0"
            port = 8080
            request_timeout_secs = 30

            [database]
            url = ""
            max_connections = 20
            min_connections = 5
            connect_timeout_secs = 10
            idle_timeout_secs = 600

            [logging]
            level = "info"
            format = "json"

            [security]
            cors_origins = []

            [routing]
            activation_radius_km = 1.0
            ping_freshness_min = 30
            relay_dedup_window_min = 5
            ack_detail_limit = 5
        "#;

        let mut builder = config::Config::builder()
            .add_source(config::File::from_str(defaults, config::FileFormat::Toml));
        for (key, value) in overrides {
            builder = builder.set_override(*key, *value)?;
        }
        builder.build()?.try_deserialize()
    }

    fn validate(&self) -> Result<(), String> {
        if self.database.url.is_empty() {
            return Err("database.url must be set".to_string());
        }
        if self.routing.activation_radius_km <= 0.0 {
            return Err("routing.activation_radius_km must be positive".to_string());
        }
        if self.fcm.enabled && self.fcm.project_id.is_empty() {
            return Err("fcm.project_id must be set when fcm is enabled".to_string());
        }
        if self.classifier.enabled && self.classifier.api_key.is_empty() {
            return Err("classifier.api_key must be set when classifier is enabled".to_string());
        }
        Ok(())
    }

    pub fn socket_addr(&self) -> SocketAddr {
        format!("{}:{}", self.server.host, self.server.port)
            .parse()
            .unwrap_or_else(|_| SocketAddr::from(([0, 0, 0, 0], self.server.port)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_load() {
        let cfg = Config::load_for_test(&[("database.url", "postgres://localhost/sos")])
            .expect("config should load");
        assert_eq!(cfg.server.port, 8080);
        assert_eq!(cfg.routing.activation_radius_km, 1.0);
        assert_eq!(cfg.routing.relay_dedup_window_min, 5);
        assert!(!cfg.fcm.enabled);
        assert!(!cfg.classifier.enabled);
    }

    #[test]
    fn test_override_routing_radius() {
        let cfg = Config::load_for_test(&[
            ("database.url", "postgres://localhost/sos"),
            ("routing.activation_radius_km", "2.5"),
        ])
        .expect("config should load");
        assert_eq!(cfg.routing.activation_radius_km, 2.5);
    }

    #[test]
    fn test_missing_database_url_rejected() {
        let cfg = Config::load_for_test(&[]).expect("config should load");
        assert!(cfg.validate().is_err());
    }

    #[test]
    fn test_socket_addr() {
        let cfg = Config::load_for_test(&[
            ("database.url", "postgres://localhost/sos"),
            ("server.host", "127.0.0.1"),
            ("server.port", "9090"),
        ])
        .expect("config should load");
        assert_eq!(cfg.socket_addr().to_string(), "127.0.0.1:9090");
    }
}
