use std::env;

use anyhow::{Context, Result};

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Settings for the HTTP host.
///
/// - `MEDIATOR_API_HOST` (default `0.0.0.0`)
/// - `MEDIATOR_API_PORT` (default `5000`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
}

impl ApiConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let host = lookup("MEDIATOR_API_HOST").unwrap_or_else(|| DEFAULT_HOST.to_string());
        let port = match lookup("MEDIATOR_API_PORT") {
            Some(raw) => raw
                .trim()
                .parse()
                .with_context(|| format!("MEDIATOR_API_PORT must be a port number, got {raw:?}"))?,
            None => DEFAULT_PORT,
        };
        Ok(Self { host, port })
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
