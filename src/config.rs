use std::time::Duration;

use url::Url;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_PORTAL_BASE_URL: &str = "https://aesa-cesa.br/carteirinha";
pub const DEFAULT_UPSTREAM_TIMEOUT_SECS: u64 = 15;

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Configuration source error: {0}")]
    Source(#[from] config::ConfigError),

    #[error("Invalid portal base URL {url:?}: {reason}")]
    InvalidPortalUrl { url: String, reason: String },

    #[error("Upstream timeout must be greater than zero")]
    ZeroTimeout,
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub portal: PortalConfig,
}

impl Config {
    /// Loads configuration from the process environment (and `.env` when present).
    ///
    /// Recognised variables: `HOST`, `PORT`, `PORTAL_BASE_URL`, `UPSTREAM_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if it exists (for local development)
        let _ = dotenvy::dotenv();

        Self::load(config::Environment::default().separator("__"))
    }

    fn load<S>(source: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let config = config::Config::builder()
            .set_default("host", DEFAULT_HOST)?
            .set_default("port", i64::from(DEFAULT_PORT))?
            .set_default("portal_base_url", DEFAULT_PORTAL_BASE_URL)?
            .set_default("upstream_timeout_secs", DEFAULT_UPSTREAM_TIMEOUT_SECS as i64)?
            .add_source(source)
            .build()?;

        let timeout_secs: u64 = config.get("upstream_timeout_secs")?;

        Ok(Self {
            host: config.get("host")?,
            port: config.get("port")?,
            portal: PortalConfig::new(
                &config.get::<String>("portal_base_url")?,
                Duration::from_secs(timeout_secs),
            )?,
        })
    }
}

/// Everything the outbound side needs to talk to the portal.
#[derive(Debug, Clone)]
pub struct PortalConfig {
    base_url: String,
    origin: String,
    timeout: Duration,
}

impl PortalConfig {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, ConfigError> {
        let base_url = base_url.trim().trim_end_matches('/');

        let parsed = Url::parse(base_url).map_err(|e| ConfigError::InvalidPortalUrl {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;

        if !matches!(parsed.scheme(), "http" | "https") || parsed.cannot_be_a_base() {
            return Err(ConfigError::InvalidPortalUrl {
                url: base_url.to_string(),
                reason: "expected an absolute http(s) URL".to_string(),
            });
        }

        if timeout.is_zero() {
            return Err(ConfigError::ZeroTimeout);
        }

        Ok(Self {
            base_url: base_url.to_string(),
            origin: parsed.origin().ascii_serialization(),
            timeout,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Scheme and host of the portal, sent as the `Origin` header.
    pub fn origin(&self) -> &str {
        &self.origin
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn login_url(&self) -> String {
        format!("{}/public/login", self.base_url)
    }

    pub fn card_url(&self) -> String {
        format!("{}/public/carteira.php", self.base_url)
    }

    /// Referer for the login form post (the portal's landing page).
    pub fn landing_url(&self) -> String {
        format!("{}/", self.base_url)
    }

    /// Prefix that turns a relative photo path into an absolute URL.
    pub fn photo_base(&self) -> String {
        format!("{}/public/", self.base_url)
    }
}
