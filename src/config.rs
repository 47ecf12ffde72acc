//! Client configuration.
//!
//! A [`ClientConfig`] is validated once, when [`ClientConfigBuilder::build`]
//! runs, and is immutable afterwards.

use crate::errors::{MpesaError, Result};
use std::fmt;
use std::time::Duration;

/// Production API root.
pub const PRODUCTION_BASE_URL: &str = "https://api.safaricom.co.ke";

/// Sandbox API root.
pub const SANDBOX_BASE_URL: &str = "https://sandbox.safaricom.co.ke";

/// Certificate used to encrypt production security credentials.
pub const PRODUCTION_CERTIFICATE_URL: &str =
    "https://developer.safaricom.co.ke/api/v1/GenerateSecurityCredential/ProductionCertificate.cer";

/// Certificate used to encrypt sandbox security credentials.
pub const SANDBOX_CERTIFICATE_URL: &str =
    "https://developer.safaricom.co.ke/api/v1/GenerateSecurityCredential/SandboxCertificate.cer";

/// Default bound on an outbound HTTP call (connect, send and receive).
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(60);

/// Default number of idle pooled connections kept per host.
pub const DEFAULT_MAX_IDLE_CONNECTIONS: usize = 10;

/// The two environments the API is served from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    /// Live traffic
    Production,
    /// Daraja sandbox
    Sandbox,
}

impl Environment {
    /// Selects the environment for a base URL: anything mentioning `sandbox`
    /// is the sandbox.
    pub fn from_base_url(base_url: &str) -> Self {
        if base_url.contains("sandbox") {
            Environment::Sandbox
        } else {
            Environment::Production
        }
    }

    /// API root for this environment.
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_BASE_URL,
            Environment::Sandbox => SANDBOX_BASE_URL,
        }
    }

    /// Certificate URL for this environment.
    pub fn certificate_url(&self) -> &'static str {
        match self {
            Environment::Production => PRODUCTION_CERTIFICATE_URL,
            Environment::Sandbox => SANDBOX_CERTIFICATE_URL,
        }
    }
}

/// How bearer tokens are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenPolicy {
    /// Fetch a fresh token before every call.
    #[default]
    FetchEveryCall,
    /// Reuse a token until shortly before its `expires_in` elapses.
    CacheUntilExpiry,
}

/// Immutable client configuration.
#[derive(Clone)]
pub struct ClientConfig {
    base_url: String,
    app_key: String,
    app_secret: String,
    max_idle_connections: usize,
    timeout: Duration,
    token_policy: TokenPolicy,
}

impl ClientConfig {
    /// Starts a configuration for the given app credentials.
    ///
    /// The base URL defaults to the sandbox.
    ///
    /// # Examples
    ///
    /// ```
    /// use mpesa_rs::config::{ClientConfig, Environment, PRODUCTION_BASE_URL};
    ///
    /// let config = ClientConfig::builder("app-key", "app-secret")
    ///     .with_base_url(PRODUCTION_BASE_URL)
    ///     .with_max_idle_connections(20)
    ///     .build()
    ///     .unwrap();
    ///
    /// assert_eq!(config.environment(), Environment::Production);
    /// ```
    pub fn builder(
        app_key: impl Into<String>,
        app_secret: impl Into<String>,
    ) -> ClientConfigBuilder {
        ClientConfigBuilder {
            base_url: SANDBOX_BASE_URL.to_string(),
            app_key: app_key.into(),
            app_secret: app_secret.into(),
            max_idle_connections: DEFAULT_MAX_IDLE_CONNECTIONS,
            timeout: DEFAULT_TIMEOUT,
            token_policy: TokenPolicy::default(),
        }
    }

    /// Reads `MPESA_APP_KEY`, `MPESA_APP_SECRET` and the optional
    /// `MPESA_BASE_URL` and `MPESA_MAX_IDLE_CONNECTIONS`.
    pub fn from_env() -> Result<Self> {
        let app_key = require_env("MPESA_APP_KEY")?;
        let app_secret = require_env("MPESA_APP_SECRET")?;

        let mut builder = Self::builder(app_key, app_secret);
        if let Ok(base_url) = std::env::var("MPESA_BASE_URL") {
            builder = builder.with_base_url(base_url);
        }
        if let Ok(raw) = std::env::var("MPESA_MAX_IDLE_CONNECTIONS") {
            let max_idle = raw.trim().parse().map_err(|_| {
                MpesaError::ConfigError(format!(
                    "MPESA_MAX_IDLE_CONNECTIONS is not a number: {raw}"
                ))
            })?;
            builder = builder.with_max_idle_connections(max_idle);
        }
        builder.build()
    }

    /// The validated API root, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Environment selected by the base URL.
    pub fn environment(&self) -> Environment {
        Environment::from_base_url(&self.base_url)
    }

    /// Consumer key.
    pub fn app_key(&self) -> &str {
        &self.app_key
    }

    /// Consumer secret.
    pub fn app_secret(&self) -> &str {
        &self.app_secret
    }

    /// Idle pooled connections kept per host.
    pub fn max_idle_connections(&self) -> usize {
        self.max_idle_connections
    }

    /// Overall bound on each outbound HTTP call.
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Token acquisition policy.
    pub fn token_policy(&self) -> TokenPolicy {
        self.token_policy
    }
}

impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientConfig")
            .field("base_url", &self.base_url)
            .field("app_key", &self.app_key)
            .field("app_secret", &"<redacted>")
            .field("max_idle_connections", &self.max_idle_connections)
            .field("timeout", &self.timeout)
            .field("token_policy", &self.token_policy)
            .finish()
    }
}

/// Options for a [`ClientConfig`].
#[derive(Clone)]
pub struct ClientConfigBuilder {
    base_url: String,
    app_key: String,
    app_secret: String,
    max_idle_connections: usize,
    timeout: Duration,
    token_policy: TokenPolicy,
}

impl ClientConfigBuilder {
    /// Sets the API root. Must be the production or sandbox URL.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Selects the API root by environment.
    pub fn with_environment(mut self, environment: Environment) -> Self {
        self.base_url = environment.base_url().to_string();
        self
    }

    /// Replaces the consumer key.
    pub fn with_app_key(mut self, app_key: impl Into<String>) -> Self {
        self.app_key = app_key.into();
        self
    }

    /// Replaces the consumer secret.
    pub fn with_app_secret(mut self, app_secret: impl Into<String>) -> Self {
        self.app_secret = app_secret.into();
        self
    }

    /// Sets the number of idle pooled connections kept per host.
    pub fn with_max_idle_connections(mut self, max_idle: usize) -> Self {
        self.max_idle_connections = max_idle;
        self
    }

    /// Sets the overall bound on each outbound HTTP call.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Sets the token acquisition policy.
    pub fn with_token_policy(mut self, policy: TokenPolicy) -> Self {
        self.token_policy = policy;
        self
    }

    /// Validates the options.
    pub fn build(self) -> Result<ClientConfig> {
        let base_url = self.base_url.trim_end_matches('/').to_string();
        if base_url != PRODUCTION_BASE_URL && base_url != SANDBOX_BASE_URL {
            return Err(MpesaError::ConfigError(format!(
                "base URL must be {} or {}, got {}",
                PRODUCTION_BASE_URL, SANDBOX_BASE_URL, self.base_url
            )));
        }
        if self.app_key.trim().is_empty() {
            return Err(MpesaError::ConfigError("app key is required".to_string()));
        }
        if self.app_secret.trim().is_empty() {
            return Err(MpesaError::ConfigError("app secret is required".to_string()));
        }
        if self.timeout.is_zero() {
            return Err(MpesaError::ConfigError("timeout must be positive".to_string()));
        }

        Ok(ClientConfig {
            base_url,
            app_key: self.app_key,
            app_secret: self.app_secret,
            max_idle_connections: self.max_idle_connections,
            timeout: self.timeout,
            token_policy: self.token_policy,
        })
    }
}

fn require_env(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| MpesaError::ConfigError(format!("{name} is not set")))
}
