// src/proxy.rs

//! HTTP proxy settings forwarded to the client as `--proxy` arguments.

use std::fmt;

use serde::Deserialize;

/// Placeholder shown instead of a proxy password.
pub const MASKED_PASSWORD: &str = "********";

/// `[[proxy]]` entry from the config.
///
/// ```toml
/// [[proxy]]
/// protocol = "http"
/// host = "squid.local"
/// port = 8080
/// username = "user"
/// password = "secret"
/// ```
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct ProxySettings {
    #[serde(default = "default_active")]
    pub active: bool,

    #[serde(default = "default_protocol")]
    pub protocol: String,

    pub host: String,

    pub port: u16,

    #[serde(default)]
    pub username: Option<String>,

    #[serde(default)]
    pub password: Option<String>,
}

fn default_active() -> bool {
    true
}

fn default_protocol() -> String {
    "http".to_string()
}

/// An active HTTP or HTTPS proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProxyConfig {
    protocol: String,
    username: Option<String>,
    password: Option<String>,
    host: String,
    port: u16,
}

impl ProxyConfig {
    pub fn new(
        protocol: impl Into<String>,
        username: Option<String>,
        password: Option<String>,
        host: impl Into<String>,
        port: u16,
    ) -> Self {
        Self {
            protocol: protocol.into(),
            username,
            password,
            host: host.into(),
            port,
        }
    }

    pub fn has_authentication(&self) -> bool {
        self.username.as_deref().is_some_and(|u| !u.is_empty())
    }

    pub fn is_secure(&self) -> bool {
        self.protocol.eq_ignore_ascii_case("https")
    }

    /// Client flag carrying this proxy.
    pub fn flag(&self) -> &'static str {
        if self.is_secure() {
            "--https-proxy"
        } else {
            "--proxy"
        }
    }

    /// Proxy URI with clear credentials, for the process argument only.
    ///
    /// The scheme is always `http`: clients tunnel HTTPS through a plain
    /// HTTP proxy connection.
    pub fn to_uri(&self) -> String {
        self.uri_with_password(self.password.as_deref().unwrap_or(""))
    }

    fn uri_with_password(&self, password: &str) -> String {
        match &self.username {
            Some(user) if self.has_authentication() => {
                format!("http://{}:{}@{}:{}", user, password, self.host, self.port)
            }
            _ => format!("http://{}:{}", self.host, self.port),
        }
    }
}

/// Masked form, safe for logs.
impl fmt::Display for ProxyConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.uri_with_password(MASKED_PASSWORD))
    }
}

impl From<&ProxySettings> for ProxyConfig {
    fn from(s: &ProxySettings) -> Self {
        ProxyConfig::new(
            s.protocol.clone(),
            s.username.clone(),
            s.password.clone(),
            s.host.clone(),
            s.port,
        )
    }
}

/// Keep active proxies whose protocol is `http` or `https`.
pub fn active_http_proxies(settings: &[ProxySettings]) -> Vec<ProxyConfig> {
    settings
        .iter()
        .filter(|s| s.active)
        .filter(|s| {
            let protocol = s.protocol.to_lowercase();
            protocol == "http" || protocol == "https"
        })
        .map(ProxyConfig::from)
        .collect()
}
