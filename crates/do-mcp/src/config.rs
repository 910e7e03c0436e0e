//! Environment configuration for the tool server.

use std::env;
use std::sync::Arc;

use digitalocean::providers::digitalocean::API_BASE_URL;
use digitalocean::{DigitalOcean, DropletApi};

use crate::dispatch::ClientFactory;

/// Environment variable holding the API token.
pub const TOKEN_ENV: &str = "DIGITALOCEAN_API_TOKEN";

/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "DIGITALOCEAN_API_URL";

/// Tool server settings.
///
/// The token is not part of the settings: it is read each time the client
/// factory runs, so the server starts without one and picks it up once set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McpConfig {
    pub api_url: String,
}

impl Default for McpConfig {
    fn default() -> Self {
        Self {
            api_url: API_BASE_URL.to_string(),
        }
    }
}

impl McpConfig {
    #[must_use]
    pub fn from_env() -> Self {
        let api_url = env::var(API_URL_ENV)
            .ok()
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| API_BASE_URL.to_string());
        Self { api_url }
    }

    /// Factory building a real client from the current environment.
    #[must_use]
    pub fn client_factory(&self) -> ClientFactory {
        let api_url = self.api_url.clone();
        Box::new(move || {
            let token = env::var(TOKEN_ENV).unwrap_or_default();
            let client = DigitalOcean::with_base_url(token, &api_url)?;
            Ok(Arc::new(client) as Arc<dyn DropletApi>)
        })
    }
}

#[cfg(test)]
mod tests {
    use serial_test::serial;

    use digitalocean::DoError;

    use super::*;

    #[test]
    #[serial]
    fn test_from_env_defaults_and_override() {
        env::remove_var(API_URL_ENV);
        assert_eq!(McpConfig::from_env(), McpConfig::default());

        env::set_var(API_URL_ENV, "http://127.0.0.1:9999/v2");
        assert_eq!(McpConfig::from_env().api_url, "http://127.0.0.1:9999/v2");
        env::remove_var(API_URL_ENV);
    }

    #[test]
    #[serial]
    fn test_factory_reads_token_on_each_attempt() {
        env::remove_var(TOKEN_ENV);
        let factory = McpConfig::default().client_factory();

        match factory() {
            Err(DoError::Config(message)) => assert!(message.contains(TOKEN_ENV)),
            Err(other) => panic!("unexpected error: {other}"),
            Ok(_) => panic!("client built without a token"),
        }

        env::set_var(TOKEN_ENV, "test-token");
        assert!(factory().is_ok());
        env::remove_var(TOKEN_ENV);
    }
}
