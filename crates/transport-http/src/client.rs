// HTTP client configuration and utilities

use std::time::Duration;

/// Settings for the shared HTTP agent
#[derive(Debug, Clone, PartialEq)]
pub struct HttpConfig {
    pub connect_timeout: Duration,
    pub read_timeout: Duration,
    pub write_timeout: Duration,
    pub user_agent: String,
    pub max_redirects: u32,
    /// Sent with POST/PUT bodies when the caller names no content type
    pub default_content_type: String,
}

impl HttpConfig {
    pub fn new() -> Self {
        Self {
            connect_timeout: Duration::from_secs(30),
            read_timeout: Duration::from_secs(60),
            write_timeout: Duration::from_secs(30),
            user_agent: format!("playdeck/{}", env!("CARGO_PKG_VERSION")),
            max_redirects: 10,
            default_content_type: "application/octet-stream".to_string(),
        }
    }

    pub fn with_connect_timeout(mut self, timeout: Duration) -> Self {
        self.connect_timeout = timeout;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Create a configured HTTP agent
pub fn create_http_agent(config: &HttpConfig) -> ureq::Agent {
    ureq::AgentBuilder::new()
        .timeout_connect(config.connect_timeout)
        .timeout_read(config.read_timeout)
        .timeout_write(config.write_timeout)
        .user_agent(&config.user_agent)
        .redirects(config.max_redirects)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = HttpConfig::default();
        assert_eq!(config.connect_timeout, Duration::from_secs(30));
        assert_eq!(config.max_redirects, 10);
        assert!(config.user_agent.starts_with("playdeck/"));
        assert_eq!(config.default_content_type, "application/octet-stream");
    }

    #[test]
    fn test_builder_overrides() {
        let config = HttpConfig::new()
            .with_connect_timeout(Duration::from_secs(2))
            .with_user_agent("game/1.0");
        assert_eq!(config.connect_timeout, Duration::from_secs(2));
        assert_eq!(config.user_agent, "game/1.0");
    }
}
