//! Runtime configuration
//!
//! Gateway settings are passed explicitly into signing and verification
//! instead of being read from the process environment at call sites.
//!
//! Precedence, lowest first: defaults, TOML file, environment, CLI flags
//! (applied by the binary through the `with_*` builders).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::signature::DEFAULT_CURRENCY;
use crate::signer::{PaymentSigner, PrivateKeySource};

/// Environment variable names
pub mod env {
    /// HTTP port
    pub const PORT: &str = "RUNPAY_PORT";
    /// Bind address
    pub const HOST: &str = "RUNPAY_HOST";
    /// Comma separated allowed CORS origins
    pub const CORS_ORIGINS: &str = "RUNPAY_CORS_ORIGINS";
    /// Refuse to create unsigned orders
    pub const REQUIRE_SIGNED_ORDERS: &str = "RUNPAY_REQUIRE_SIGNED_ORDERS";
    /// Gateway merchant code
    pub const MERCHANT_CODE: &str = "JENGA_MERCHANT_CODE";
    /// Inline PEM private key
    pub const PRIVATE_KEY: &str = "JENGA_PRIVATE_KEY";
    /// Base64 wrapped PEM private key
    pub const PRIVATE_KEY_BASE64: &str = "JENGA_PRIVATE_KEY_BASE64";
    /// Path to PEM private key
    pub const PRIVATE_KEY_PATH: &str = "JENGA_PRIVATE_KEY_PATH";
    /// Public site base URL
    pub const SITE_URL: &str = "SITE_URL";
}

/// Path the gateway posts notifications to
pub const DEFAULT_CALLBACK_PATH: &str = "/api/payments/callback";

/// Payment gateway configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GatewayConfig {
    /// Merchant code issued by the gateway
    pub merchant_code: String,
    /// Public base URL of the site, without trailing slash
    pub site_base_url: String,
    /// Callback route appended to `site_base_url`
    pub callback_path: String,
    /// Currency when a request omits it
    pub default_currency: String,
    /// Merchant RSA key
    pub private_key: Option<PrivateKeySource>,
    /// Reject order creation when no key is configured
    pub require_signed_orders: bool,
}

impl GatewayConfig {
    /// With merchant code
    #[inline]
    #[must_use]
    pub fn with_merchant_code(mut self, code: impl Into<String>) -> Self {
        self.merchant_code = code.into();
        self
    }

    /// With site base URL
    #[inline]
    #[must_use]
    pub fn with_site_base_url(mut self, url: impl Into<String>) -> Self {
        self.site_base_url = url.into();
        self
    }

    /// With private key source
    #[inline]
    #[must_use]
    pub fn with_private_key(mut self, source: PrivateKeySource) -> Self {
        self.private_key = Some(source);
        self
    }

    /// Require signed orders
    #[inline]
    #[must_use]
    pub fn with_require_signed_orders(mut self, require: bool) -> Self {
        self.require_signed_orders = require;
        self
    }

    /// Full callback URL included in signature data
    #[must_use]
    pub fn callback_url(&self) -> String {
        let base = self.site_base_url.trim_end_matches('/');
        let path = self.callback_path.trim();
        if path.starts_with('/') {
            format!("{base}{path}")
        } else {
            format!("{base}/{path}")
        }
    }

    /// Load the configured signer, if any
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] when a key is configured but unusable
    pub fn load_signer(&self) -> Result<Option<PaymentSigner>, ConfigError> {
        self.private_key
            .as_ref()
            .map(|source| {
                PaymentSigner::from_source(source).map_err(|e| ConfigError::Invalid {
                    name: "private_key",
                    reason: e.to_string(),
                })
            })
            .transpose()
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            merchant_code: String::new(),
            site_base_url: String::new(),
            callback_path: DEFAULT_CALLBACK_PATH.to_string(),
            default_currency: DEFAULT_CURRENCY.to_string(),
            private_key: None,
            require_signed_orders: false,
        }
    }
}

/// HTTP server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Bind address
    pub host: String,
    /// Port
    pub port: u16,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 3000,
            cors_origins: Vec::new(),
        }
    }
}

/// Complete configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct RunpayConfig {
    /// Gateway settings
    pub gateway: GatewayConfig,
    /// Server settings
    pub server: ServerConfig,
}

/// Outcome of [`RunpayConfig::validate`]
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigReport {
    /// Problems that must stop startup
    pub errors: Vec<String>,
    /// Degraded but runnable
    pub warnings: Vec<String>,
}

impl ConfigReport {
    /// No errors recorded
    #[inline]
    #[must_use]
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    /// Fail on errors
    ///
    /// # Errors
    /// Returns [`ConfigError::Rejected`] listing every error
    pub fn into_result(self) -> Result<Vec<String>, ConfigError> {
        if self.errors.is_empty() {
            Ok(self.warnings)
        } else {
            Err(ConfigError::Rejected(self.errors))
        }
    }
}

impl RunpayConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With gateway section
    #[inline]
    #[must_use]
    pub fn with_gateway(mut self, gateway: GatewayConfig) -> Self {
        self.gateway = gateway;
        self
    }

    /// With port
    #[inline]
    #[must_use]
    pub fn with_port(mut self, port: u16) -> Self {
        self.server.port = port;
        self
    }

    /// With bind host
    #[inline]
    #[must_use]
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.server.host = host.into();
        self
    }

    /// Parse TOML text
    ///
    /// # Errors
    /// Returns [`ConfigError::File`] on malformed TOML
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        toml::from_str(text).map_err(|e| ConfigError::File(e.to_string()))
    }

    /// Read a TOML file
    ///
    /// # Errors
    /// Returns [`ConfigError::File`] when the file is unreadable or malformed
    pub fn from_toml_file(path: &Path) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path)
            .map_err(|e| ConfigError::File(format!("{}: {e}", path.display())))?;
        Self::from_toml_str(&text)
    }

    /// Overlay values from the process environment
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for unparsable values
    pub fn apply_env(self) -> Result<Self, ConfigError> {
        self.apply_env_from(|key| std::env::var(key).ok())
    }

    /// Overlay values from an arbitrary lookup
    ///
    /// Blank values are ignored. When several key variables are set the
    /// inline PEM wins over base64, which wins over a path.
    ///
    /// # Errors
    /// Returns [`ConfigError::Invalid`] for unparsable values
    pub fn apply_env_from<F>(mut self, lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(port) = get(env::PORT) {
            self.server.port = port.trim().parse().map_err(|e| ConfigError::Invalid {
                name: env::PORT,
                reason: format!("{e}"),
            })?;
        }
        if let Some(host) = get(env::HOST) {
            self.server.host = host.trim().to_string();
        }
        if let Some(origins) = get(env::CORS_ORIGINS) {
            self.server.cors_origins = origins
                .split(',')
                .map(str::trim)
                .filter(|o| !o.is_empty())
                .map(ToString::to_string)
                .collect();
        }
        if let Some(flag) = get(env::REQUIRE_SIGNED_ORDERS) {
            self.gateway.require_signed_orders = parse_bool(env::REQUIRE_SIGNED_ORDERS, &flag)?;
        }
        if let Some(code) = get(env::MERCHANT_CODE) {
            self.gateway.merchant_code = code.trim().to_string();
        }
        if let Some(url) = get(env::SITE_URL) {
            self.gateway.site_base_url = url.trim().to_string();
        }

        let key = get(env::PRIVATE_KEY)
            .map(PrivateKeySource::Pem)
            .or_else(|| get(env::PRIVATE_KEY_BASE64).map(PrivateKeySource::Base64))
            .or_else(|| get(env::PRIVATE_KEY_PATH).map(|p| PrivateKeySource::Path(p.trim().into())));
        if key.is_some() {
            self.gateway.private_key = key;
        }

        Ok(self)
    }

    /// Check the configuration before serving traffic
    ///
    /// A missing private key means orders are created with an empty
    /// signature. That is reported as a warning, or as an error when
    /// `require_signed_orders` is set.
    #[must_use]
    pub fn validate(&self) -> ConfigReport {
        let mut report = ConfigReport::default();
        let gateway = &self.gateway;

        if gateway.merchant_code.trim().is_empty() {
            report.errors.push(ConfigError::Missing("gateway.merchant_code").to_string());
        }

        let base = gateway.site_base_url.trim();
        if base.is_empty() {
            report.errors.push(ConfigError::Missing("gateway.site_base_url").to_string());
        } else if !(base.starts_with("https://") || base.starts_with("http://")) {
            report.errors.push(
                ConfigError::Invalid {
                    name: "gateway.site_base_url",
                    reason: "must start with http:// or https://".to_string(),
                }
                .to_string(),
            );
        } else if base.starts_with("http://") {
            report
                .warnings
                .push("gateway.site_base_url is not https; gateway callbacks may be refused".to_string());
        }

        if self.server.host.trim().is_empty() {
            report.errors.push(ConfigError::Missing("server.host").to_string());
        }

        if gateway.default_currency.trim().is_empty() {
            report.errors.push(ConfigError::Missing("gateway.default_currency").to_string());
        }

        match (&gateway.private_key, gateway.require_signed_orders) {
            (None, true) => report.errors.push(
                ConfigError::Missing("gateway.private_key (required by require_signed_orders)").to_string(),
            ),
            (None, false) => report
                .warnings
                .push("no private key configured: orders will carry an empty signature".to_string()),
            (Some(_), _) => {
                if let Err(e) = gateway.load_signer() {
                    report.errors.push(e.to_string());
                }
            }
        }

        report
    }
}

fn parse_bool(name: &'static str, value: &str) -> Result<bool, ConfigError> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(ConfigError::Invalid {
            name,
            reason: format!("expected a boolean, got {other:?}"),
        }),
    }
}
