//! Runtime configuration loaded via OrthoConfig.
//!
//! Three independent groups, each layered from defaults, an optional config
//! file, `PREFIX_*` environment variables, and CLI flags:
//!
//! - [`DatabaseSettings`] (`POSTGRES_*`): store connection and pool sizing.
//! - [`WeatherSettings`] (`WEATHER_*`): provider endpoint, key, and cadence.
//! - [`ServerSettings`] (`SERVER_*`): listener address.
//!
//! Each group carries at least one field with an `ortho_config` default so a
//! bare environment still merges into a struct. The remaining fields are
//! optional at the source level and their accessors apply defaults.

use std::ffi::OsString;
use std::net::{IpAddr, SocketAddr};
use std::time::Duration;

use ortho_config::OrthoConfig;
use serde::Deserialize;
use url::Url;

use crate::domain::{RefreshPolicy, RefreshPolicyError};
use crate::outbound::persistence::{ConnectionParts, PoolConfig, PoolError};

const DEFAULT_DB_HOST: &str = "localhost";
const DEFAULT_DB_PORT: u16 = 5432;
const DEFAULT_DB_USER: &str = "postgres";
const DEFAULT_DB_PASSWORD: &str = "postgres";
const DEFAULT_DB_NAME: &str = "weather";
const DEFAULT_POOL_MAX_SIZE: u32 = 10;
const DEFAULT_POOL_MAX_LIFETIME_SECS: u64 = 30 * 60;

const DEFAULT_WEATHER_URI: &str = "https://api.openweathermap.org";

const DEFAULT_SERVER_HOST: &str = "0.0.0.0";

/// Errors raised when loaded settings cannot drive the service.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    /// A layer could not be parsed or merged.
    #[error("failed to load {group} settings: {message}")]
    Load {
        /// Settings group that failed.
        group: &'static str,
        /// Loader diagnostic.
        message: String,
    },
    /// A numeric field that must be positive was zero.
    #[error("{field} must be greater than zero")]
    Zero {
        /// Offending field, in `PREFIX_FIELD` form.
        field: &'static str,
    },
    /// The listener host is not an IP address.
    #[error("SERVER_HOST is not an IP address: {0}")]
    InvalidHost(#[from] std::net::AddrParseError),
    /// The provider base URI does not parse.
    #[error("WEATHER_URI is not a valid URL: {0}")]
    InvalidUri(#[from] url::ParseError),
    /// The refresh interval cannot be represented.
    #[error("WEATHER_REFRESH_INTERVAL_SECS is invalid: {0}")]
    RefreshInterval(#[from] RefreshPolicyError),
    /// The database connection parameters do not form a URL.
    #[error("database settings are invalid: {0}")]
    Database(#[from] PoolError),
}

fn load_error<E: std::fmt::Display>(group: &'static str) -> impl FnOnce(E) -> SettingsError {
    move |err| SettingsError::Load {
        group,
        message: err.to_string(),
    }
}

fn positive(value: u64, field: &'static str) -> Result<u64, SettingsError> {
    if value == 0 {
        Err(SettingsError::Zero { field })
    } else {
        Ok(value)
    }
}

/// PostgreSQL connection and pool settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "POSTGRES")]
pub struct DatabaseSettings {
    /// Use PostgreSQL; when false the process keeps records in memory.
    #[ortho_config(default = true)]
    pub enabled: bool,
    /// Server host name or address.
    pub host: Option<String>,
    /// Server port.
    pub port: Option<u16>,
    /// Role name.
    pub user: Option<String>,
    /// Role password.
    pub password: Option<String>,
    /// Database name.
    pub db: Option<String>,
    /// Upper bound on pooled connections.
    pub pool_max_size: Option<u32>,
    /// Seconds before a pooled connection is recycled.
    pub pool_max_lifetime_secs: Option<u64>,
}

impl DatabaseSettings {
    /// Configured host, or `localhost`.
    pub fn host(&self) -> &str {
        self.host.as_deref().unwrap_or(DEFAULT_DB_HOST)
    }

    /// Configured port, or 5432.
    pub fn port(&self) -> u16 {
        self.port.unwrap_or(DEFAULT_DB_PORT)
    }

    /// Configured role, or `postgres`.
    pub fn user(&self) -> &str {
        self.user.as_deref().unwrap_or(DEFAULT_DB_USER)
    }

    /// Configured password, or `postgres`.
    pub fn password(&self) -> &str {
        self.password.as_deref().unwrap_or(DEFAULT_DB_PASSWORD)
    }

    /// Configured database name, or `weather`.
    pub fn db(&self) -> &str {
        self.db.as_deref().unwrap_or(DEFAULT_DB_NAME)
    }

    /// Configured pool size, or 10.
    pub fn pool_max_size(&self) -> u32 {
        self.pool_max_size.unwrap_or(DEFAULT_POOL_MAX_SIZE)
    }

    /// Configured connection lifetime, or 30 minutes.
    pub fn pool_max_lifetime(&self) -> Duration {
        Duration::from_secs(
            self.pool_max_lifetime_secs
                .unwrap_or(DEFAULT_POOL_MAX_LIFETIME_SECS),
        )
    }

    /// Build the pool configuration these settings describe.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Zero`] for a zero pool size or lifetime and
    /// [`SettingsError::Database`] when the parts do not form a URL.
    pub fn pool_config(&self) -> Result<PoolConfig, SettingsError> {
        positive(u64::from(self.pool_max_size()), "POSTGRES_POOL_MAX_SIZE")?;
        positive(
            self.pool_max_lifetime().as_secs(),
            "POSTGRES_POOL_MAX_LIFETIME_SECS",
        )?;
        let config = PoolConfig::from_parts(ConnectionParts {
            host: self.host(),
            port: self.port(),
            user: self.user(),
            password: self.password(),
            database: self.db(),
        })?;
        Ok(config
            .with_max_size(self.pool_max_size())
            .with_max_lifetime(Some(self.pool_max_lifetime())))
    }
}

/// OpenWeather provider settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "WEATHER")]
pub struct WeatherSettings {
    /// Provider base URI.
    pub uri: Option<String>,
    /// Provider API key. Requests go out without one when unset.
    pub appid: Option<String>,
    /// Provider request timeout in seconds.
    #[ortho_config(default = 10)]
    pub timeout_secs: u64,
    /// Seconds a stored record stays fresh.
    #[ortho_config(default = 3600)]
    pub refresh_interval_secs: u64,
}

impl WeatherSettings {
    /// Configured base URI, or the public OpenWeather endpoint.
    pub fn uri(&self) -> &str {
        self.uri.as_deref().unwrap_or(DEFAULT_WEATHER_URI)
    }

    /// Configured API key, ignoring blank values.
    pub fn appid(&self) -> Option<&str> {
        self.appid.as_deref().filter(|key| !key.trim().is_empty())
    }

    /// Parsed base URI.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidUri`] when the URI does not parse.
    pub fn base_url(&self) -> Result<Url, SettingsError> {
        Ok(Url::parse(self.uri())?)
    }

    /// Provider timeout; zero is rejected.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Zero`] when the timeout is zero.
    pub fn timeout(&self) -> Result<Duration, SettingsError> {
        let secs = positive(self.timeout_secs, "WEATHER_TIMEOUT_SECS")?;
        Ok(Duration::from_secs(secs))
    }

    /// Refresh policy built from the configured interval.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::Zero`] for a zero interval and
    /// [`SettingsError::RefreshInterval`] when it cannot be represented.
    pub fn refresh_policy(&self) -> Result<RefreshPolicy, SettingsError> {
        let secs = positive(self.refresh_interval_secs, "WEATHER_REFRESH_INTERVAL_SECS")?;
        Ok(RefreshPolicy::new(Duration::from_secs(secs))?)
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "SERVER")]
pub struct ServerSettings {
    /// Address to bind.
    pub host: Option<String>,
    /// Port to bind.
    #[ortho_config(default = 8080)]
    pub port: u16,
}

impl ServerSettings {
    /// Socket address to bind, defaulting to `0.0.0.0:8080`.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError::InvalidHost`] when the host is not an IP
    /// address.
    pub fn bind_addr(&self) -> Result<SocketAddr, SettingsError> {
        let host: IpAddr = self
            .host
            .as_deref()
            .unwrap_or(DEFAULT_SERVER_HOST)
            .trim()
            .parse()?;
        Ok(SocketAddr::new(host, self.port))
    }
}

/// All settings groups, loaded together at startup.
#[derive(Debug, Clone)]
pub struct AppSettings {
    /// Store settings.
    pub database: DatabaseSettings,
    /// Provider settings.
    pub weather: WeatherSettings,
    /// Listener settings.
    pub server: ServerSettings,
}

impl AppSettings {
    /// Load every group from files and the environment.
    ///
    /// Each group is loaded from the program name alone so one group's CLI
    /// parser never trips over another's flags.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when any group fails to load or validate.
    pub fn load() -> Result<Self, SettingsError> {
        Self::load_from_program("weather-backend")
    }

    /// Load with an explicit program name; used by tests.
    ///
    /// # Errors
    ///
    /// Returns [`SettingsError`] when any group fails to load or validate.
    pub fn load_from_program(program: &str) -> Result<Self, SettingsError> {
        let args = [OsString::from(program)];
        let settings = Self {
            database: DatabaseSettings::load_from_iter(args.clone())
                .map_err(load_error("database"))?,
            weather: WeatherSettings::load_from_iter(args.clone())
                .map_err(load_error("weather"))?,
            server: ServerSettings::load_from_iter(args).map_err(load_error("server"))?,
        };
        settings.validate()?;
        Ok(settings)
    }

    /// Check cross-field constraints without building adapters.
    ///
    /// # Errors
    ///
    /// Returns the first [`SettingsError`] found.
    pub fn validate(&self) -> Result<(), SettingsError> {
        self.weather.base_url()?;
        self.weather.timeout()?;
        self.weather.refresh_policy()?;
        self.server.bind_addr()?;
        if self.database.enabled {
            self.database.pool_config()?;
        }
        Ok(())
    }
}
