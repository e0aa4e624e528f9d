//! Gateway configuration.
//!
//! All settings come from environment variables. Unset variables fall back to their
//! defaults; a variable that is set but cannot be decoded is an error, never silently
//! replaced by the default.

use std::fmt;
use std::net::SocketAddr;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

/// Configuration could not be loaded.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required variable is unset or empty.
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    /// A variable is set but its value is unusable.
    #[error("invalid value {value:?} for {key}: {reason}")]
    Invalid {
        /// The variable name.
        key: &'static str,
        /// The raw value.
        value: String,
        /// Why it was rejected.
        reason: String,
    },
}

/// Log output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// Human-readable lines.
    #[default]
    Pretty,
    /// One JSON object per event.
    Json,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" | "text" => Ok(Self::Pretty),
            "json" => Ok(Self::Json),
            other => Err(format!("expected pretty or json, got {other}")),
        }
    }
}

/// Configuration for the gateway service.
#[derive(Clone)]
pub struct GatewayConfig {
    /// HTTP listen port.
    pub port: u16,
    /// Address of the user service.
    pub user_service_addr: String,
    /// Address of the intersection service.
    pub intersection_service_addr: String,
    /// Address of the simulation service.
    pub simulation_service_addr: String,
    /// Address of the optimisation service.
    pub optimisation_service_addr: String,
    /// HMAC secret shared with the user service.
    pub jwt_secret: String,
    /// Allowed CORS origins. `*` allows any.
    pub cors_allowed_origins: Vec<String>,
    /// Unary RPC deadline in seconds.
    pub rpc_timeout_seconds: u64,
    /// Optimisation RPC deadline in seconds.
    pub optimisation_timeout_seconds: u64,
    /// Backend dial timeout in seconds.
    pub rpc_connect_timeout_seconds: u64,
    /// Request body read timeout in seconds.
    pub http_read_timeout_seconds: u64,
    /// Handling timeout for standard routes in seconds.
    pub http_write_timeout_seconds: u64,
    /// Keep-alive idle timeout in seconds.
    pub http_idle_timeout_seconds: u64,
    /// Drain period after a shutdown signal in seconds.
    pub shutdown_grace_seconds: u64,
    /// Maximum request body size in bytes.
    pub max_body_bytes: usize,
    /// Log output format.
    pub log_format: LogFormat,
}

impl GatewayConfig {
    const fn default_port() -> u16 {
        9090
    }

    const fn default_rpc_timeout() -> u64 {
        5
    }

    const fn default_optimisation_timeout() -> u64 {
        5 * 60 * 60 // 5 hours
    }

    const fn default_connect_timeout() -> u64 {
        5
    }

    const fn default_read_timeout() -> u64 {
        5
    }

    const fn default_write_timeout() -> u64 {
        10
    }

    const fn default_idle_timeout() -> u64 {
        15
    }

    const fn default_shutdown_grace() -> u64 {
        30
    }

    const fn default_max_body() -> usize {
        1024 * 1024 // 1 MB
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `JWT_SECRET` is unset or any variable fails to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through `lookup`, which maps a variable name to its value.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if `JWT_SECRET` is unset or any variable fails to parse.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = Env(lookup);
        let defaults = Self::default();

        let jwt_secret = env
            .get("JWT_SECRET")
            .ok_or(ConfigError::Missing("JWT_SECRET"))?;

        let cors_allowed_origins = env.get("CORS_ALLOWED_ORIGINS").map_or(
            defaults.cors_allowed_origins,
            |raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|origin| !origin.is_empty())
                    .map(str::to_string)
                    .collect()
            },
        );

        Ok(Self {
            port: env.parse("PORT", defaults.port)?,
            user_service_addr: env
                .get("USER_SERVICE_ADDR")
                .unwrap_or(defaults.user_service_addr),
            intersection_service_addr: env
                .get("INTERSECTION_SERVICE_ADDR")
                .unwrap_or(defaults.intersection_service_addr),
            simulation_service_addr: env
                .get("SIMULATION_SERVICE_ADDR")
                .unwrap_or(defaults.simulation_service_addr),
            optimisation_service_addr: env
                .get("OPTIMISATION_SERVICE_ADDR")
                .unwrap_or(defaults.optimisation_service_addr),
            jwt_secret,
            cors_allowed_origins,
            rpc_timeout_seconds: env.seconds("RPC_TIMEOUT_SECS", defaults.rpc_timeout_seconds)?,
            optimisation_timeout_seconds: env.seconds(
                "OPTIMISATION_TIMEOUT_SECS",
                defaults.optimisation_timeout_seconds,
            )?,
            rpc_connect_timeout_seconds: env.seconds(
                "RPC_CONNECT_TIMEOUT_SECS",
                defaults.rpc_connect_timeout_seconds,
            )?,
            http_read_timeout_seconds: env.seconds(
                "HTTP_READ_TIMEOUT_SECS",
                defaults.http_read_timeout_seconds,
            )?,
            http_write_timeout_seconds: env.seconds(
                "HTTP_WRITE_TIMEOUT_SECS",
                defaults.http_write_timeout_seconds,
            )?,
            http_idle_timeout_seconds: env.seconds(
                "HTTP_IDLE_TIMEOUT_SECS",
                defaults.http_idle_timeout_seconds,
            )?,
            shutdown_grace_seconds: env
                .parse("SHUTDOWN_GRACE_SECS", defaults.shutdown_grace_seconds)?,
            max_body_bytes: env.parse("MAX_BODY_BYTES", defaults.max_body_bytes)?,
            log_format: env.parse("LOG_FORMAT", defaults.log_format)?,
        })
    }

    /// The socket address to bind (`0.0.0.0:PORT`).
    #[must_use]
    pub fn listen_addr(&self) -> SocketAddr {
        SocketAddr::from(([0, 0, 0, 0], self.port))
    }

    /// Get the unary RPC deadline as a `Duration`.
    #[must_use]
    pub const fn rpc_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_timeout_seconds)
    }

    /// Get the optimisation RPC deadline as a `Duration`.
    #[must_use]
    pub const fn optimisation_timeout(&self) -> Duration {
        Duration::from_secs(self.optimisation_timeout_seconds)
    }

    /// Get the backend dial timeout as a `Duration`.
    #[must_use]
    pub const fn connect_timeout(&self) -> Duration {
        Duration::from_secs(self.rpc_connect_timeout_seconds)
    }

    /// Get the request body read timeout as a `Duration`.
    #[must_use]
    pub const fn read_timeout(&self) -> Duration {
        Duration::from_secs(self.http_read_timeout_seconds)
    }

    /// Get the standard-route handling timeout as a `Duration`.
    #[must_use]
    pub const fn write_timeout(&self) -> Duration {
        Duration::from_secs(self.http_write_timeout_seconds)
    }

    /// Get the keep-alive idle timeout as a `Duration`.
    #[must_use]
    pub const fn idle_timeout(&self) -> Duration {
        Duration::from_secs(self.http_idle_timeout_seconds)
    }

    /// Get the shutdown drain period as a `Duration`.
    #[must_use]
    pub const fn shutdown_grace(&self) -> Duration {
        Duration::from_secs(self.shutdown_grace_seconds)
    }
}

impl Default for GatewayConfig {
    /// Defaults for every setting. `jwt_secret` is empty, which `from_env` never yields.
    fn default() -> Self {
        Self {
            port: Self::default_port(),
            user_service_addr: "localhost:50051".to_string(),
            intersection_service_addr: "localhost:50052".to_string(),
            simulation_service_addr: "localhost:50053".to_string(),
            optimisation_service_addr: "localhost:50054".to_string(),
            jwt_secret: String::new(),
            cors_allowed_origins: vec!["*".to_string()],
            rpc_timeout_seconds: Self::default_rpc_timeout(),
            optimisation_timeout_seconds: Self::default_optimisation_timeout(),
            rpc_connect_timeout_seconds: Self::default_connect_timeout(),
            http_read_timeout_seconds: Self::default_read_timeout(),
            http_write_timeout_seconds: Self::default_write_timeout(),
            http_idle_timeout_seconds: Self::default_idle_timeout(),
            shutdown_grace_seconds: Self::default_shutdown_grace(),
            max_body_bytes: Self::default_max_body(),
            log_format: LogFormat::default(),
        }
    }
}

impl fmt::Debug for GatewayConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GatewayConfig")
            .field("port", &self.port)
            .field("user_service_addr", &self.user_service_addr)
            .field("intersection_service_addr", &self.intersection_service_addr)
            .field("simulation_service_addr", &self.simulation_service_addr)
            .field("optimisation_service_addr", &self.optimisation_service_addr)
            .field("jwt_secret", &"<redacted>")
            .field("cors_allowed_origins", &self.cors_allowed_origins)
            .field("rpc_timeout_seconds", &self.rpc_timeout_seconds)
            .field("optimisation_timeout_seconds", &self.optimisation_timeout_seconds)
            .field("rpc_connect_timeout_seconds", &self.rpc_connect_timeout_seconds)
            .field("http_read_timeout_seconds", &self.http_read_timeout_seconds)
            .field("http_write_timeout_seconds", &self.http_write_timeout_seconds)
            .field("http_idle_timeout_seconds", &self.http_idle_timeout_seconds)
            .field("shutdown_grace_seconds", &self.shutdown_grace_seconds)
            .field("max_body_bytes", &self.max_body_bytes)
            .field("log_format", &self.log_format)
            .finish()
    }
}

/// Typed access to a variable lookup. Empty values count as unset.
struct Env<F>(F);

impl<F> Env<F>
where
    F: Fn(&str) -> Option<String>,
{
    fn get(&self, key: &str) -> Option<String> {
        (self.0)(key)
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
    }

    fn parse<T>(&self, key: &'static str, default: T) -> Result<T, ConfigError>
    where
        T: FromStr,
        T::Err: fmt::Display,
    {
        let Some(value) = self.get(key) else {
            return Ok(default);
        };
        value.parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        })
    }

    fn seconds(&self, key: &'static str, default: u64) -> Result<u64, ConfigError> {
        let seconds = self.parse(key, default)?;
        if seconds == 0 {
            return Err(ConfigError::Invalid {
                key,
                value: "0".to_string(),
                reason: "must be greater than zero".to_string(),
            });
        }
        Ok(seconds)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;

    fn load(vars: &[(&str, &str)]) -> Result<GatewayConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        GatewayConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn defaults() {
        let config = load(&[("JWT_SECRET", "s3cret")]).unwrap();
        assert_eq!(config.port, 9090);
        assert_eq!(config.user_service_addr, "localhost:50051");
        assert_eq!(config.intersection_service_addr, "localhost:50052");
        assert_eq!(config.simulation_service_addr, "localhost:50053");
        assert_eq!(config.optimisation_service_addr, "localhost:50054");
        assert_eq!(config.cors_allowed_origins, vec!["*".to_string()]);
        assert_eq!(config.rpc_timeout(), Duration::from_secs(5));
        assert_eq!(config.optimisation_timeout(), Duration::from_secs(18_000));
        assert_eq!(config.read_timeout(), Duration::from_secs(5));
        assert_eq!(config.write_timeout(), Duration::from_secs(10));
        assert_eq!(config.idle_timeout(), Duration::from_secs(15));
        assert_eq!(config.shutdown_grace(), Duration::from_secs(30));
        assert_eq!(config.max_body_bytes, 1024 * 1024);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert_eq!(config.listen_addr().to_string(), "0.0.0.0:9090");
    }

    #[test]
    fn secret_is_required() {
        assert!(matches!(load(&[]), Err(ConfigError::Missing("JWT_SECRET"))));
        assert!(matches!(
            load(&[("JWT_SECRET", "  ")]),
            Err(ConfigError::Missing("JWT_SECRET"))
        ));
    }

    #[test]
    fn overrides() {
        let config = load(&[
            ("JWT_SECRET", "s3cret"),
            ("PORT", "8080"),
            ("USER_SERVICE_ADDR", "users:6000"),
            ("CORS_ALLOWED_ORIGINS", "http://a.test, http://b.test,"),
            ("OPTIMISATION_TIMEOUT_SECS", "60"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.user_service_addr, "users:6000");
        assert_eq!(
            config.cors_allowed_origins,
            vec!["http://a.test".to_string(), "http://b.test".to_string()]
        );
        assert_eq!(config.optimisation_timeout(), Duration::from_secs(60));
        assert_eq!(config.log_format, LogFormat::Json);
    }

    #[test]
    fn unparseable_values_are_errors() {
        let err = load(&[("JWT_SECRET", "s"), ("PORT", "ninety")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "PORT", .. }));

        let err = load(&[("JWT_SECRET", "s"), ("RPC_TIMEOUT_SECS", "0")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid {
                key: "RPC_TIMEOUT_SECS",
                ..
            }
        ));

        let err = load(&[("JWT_SECRET", "s"), ("LOG_FORMAT", "xml")]).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { key: "LOG_FORMAT", .. }));
    }

    #[test]
    fn debug_redacts_secret() {
        let config = load(&[("JWT_SECRET", "hunter2")]).unwrap();
        let rendered = format!("{config:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("<redacted>"));
    }
}
