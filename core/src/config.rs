//! Environment-driven configuration.

/// Base URL of the remote API, e.g. `https://api.example.com`.
pub const API_URL_ENV: &str = "GALAXY_API_URL";
/// Overrides where `FileSessionStore::default_location` keeps the token.
pub const SESSION_PATH_ENV: &str = "GALAXY_SESSION_PATH";

pub const DEFAULT_API_URL: &str = "http://localhost:3000";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub api_url: String,
}

impl Config {
    pub fn new(api_url: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
        }
    }

    /// Reads `GALAXY_API_URL`, falling back to `http://localhost:3000`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let api_url = lookup(API_URL_ENV)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        Self { api_url }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(DEFAULT_API_URL)
    }
}
