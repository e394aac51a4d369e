// Copyright 2024-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use std::env;

const DEFAULT_HOST: &str = "127.0.0.1";
const DEFAULT_PORT: u16 = 8126;
const DEFAULT_MAX_REQUEST_CONTENT_LENGTH: usize = 10 * 1024 * 1024; // 10MB in Bytes

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Bodies larger than this are rejected before decoding.
    pub max_request_content_length: usize,
}

impl Config {
    /// Builds the config from the environment, falling back to the standard
    /// agent defaults for anything unset or unparsable.
    pub fn from_env() -> Config {
        let host = env::var("DD_RECEIVER_HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string());
        let port = env::var("DD_RECEIVER_PORT")
            .ok()
            .and_then(|port| port.parse::<u16>().ok())
            .unwrap_or(DEFAULT_PORT);
        let max_request_content_length = env::var("DD_RECEIVER_MAX_CONTENT_LENGTH")
            .ok()
            .and_then(|max| max.parse::<usize>().ok())
            .unwrap_or(DEFAULT_MAX_REQUEST_CONTENT_LENGTH);
        Config {
            host,
            port,
            max_request_content_length,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            max_request_content_length: DEFAULT_MAX_REQUEST_CONTENT_LENGTH,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_matches_agent_defaults() {
        let config = Config::default();
        assert_eq!(config.host, "127.0.0.1");
        assert_eq!(config.port, 8126);
        assert_eq!(config.max_request_content_length, 10 * 1024 * 1024);
    }
}
