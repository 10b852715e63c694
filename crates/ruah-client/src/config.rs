//! Client configuration loaded from environment variables.
//!
//! All settings have defaults so the client starts with zero configuration
//! against a local store instance.

use crate::streak::StreakRule;

/// Connection and behavior settings.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Base URL of the hosted store (scheme + host).
    /// Env: `RUAH_STORE_URL`
    /// Default: `http://localhost:54321`
    pub store_url: String,

    /// API key sent with every store request.
    /// Env: `RUAH_STORE_KEY`
    /// Default: empty (local development only).
    pub store_key: String,

    /// Streak semantics: `total_days` or `consecutive`.
    /// Env: `RUAH_STREAK_RULE`
    /// Default: `total_days` (the group's historical behavior).
    pub streak_rule: StreakRule,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            store_url: "http://localhost:54321".to_string(),
            store_key: String::new(),
            streak_rule: StreakRule::TotalDays,
        }
    }
}

impl ClientConfig {
    /// Load configuration from environment variables, falling back to
    /// defaults.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(url) = std::env::var("RUAH_STORE_URL") {
            if !url.is_empty() {
                config.store_url = url;
            }
        }

        if let Ok(key) = std::env::var("RUAH_STORE_KEY") {
            config.store_key = key;
        }

        if let Ok(rule) = std::env::var("RUAH_STREAK_RULE") {
            config.streak_rule = StreakRule::parse(&rule);
        }

        // RUST_LOG is handled directly by tracing-subscriber's EnvFilter,
        // so we do not store it here.

        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.store_url, "http://localhost:54321");
        assert!(config.store_key.is_empty());
        assert_eq!(config.streak_rule, StreakRule::TotalDays);
    }
}
