//! Environment configuration for the worker front end.

use std::path::PathBuf;

use thiserror::Error;

use cylinder_receipt::ReceiptFormat;

use crate::session::{Identity, Role};

pub const DEFAULT_API_URL: &str = "http://localhost:8080";
pub const DEFAULT_RECEIPT_DIR: &str = "./receipts";

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("CYLINDER_ROLE: {0}")]
    InvalidRole(String),
    #[error("CYLINDER_RECEIPT_FORMAT: {0}")]
    InvalidReceiptFormat(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    pub api_url: String,
    /// Seeds the application session when a token is configured.
    pub identity: Option<Identity>,
    pub receipt_dir: PathBuf,
    pub receipt_format: ReceiptFormat,
}

impl ClientConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key/value source. Blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let api_url = get("CYLINDER_API_URL")
            .map(|url| url.trim().trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());

        let role = match get("CYLINDER_ROLE") {
            Some(raw) => raw.parse::<Role>().map_err(ConfigError::InvalidRole)?,
            None => Role::Worker,
        };
        let identity = get("CYLINDER_AUTH_TOKEN").map(|token| Identity {
            token,
            username: get("CYLINDER_USERNAME").unwrap_or_default(),
            role,
        });

        let receipt_format = match get("CYLINDER_RECEIPT_FORMAT") {
            Some(raw) => raw
                .parse::<ReceiptFormat>()
                .map_err(ConfigError::InvalidReceiptFormat)?,
            None => ReceiptFormat::default(),
        };

        Ok(Self {
            api_url,
            identity,
            receipt_dir: get("CYLINDER_RECEIPT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_RECEIPT_DIR)),
            receipt_format,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config(pairs: &[(&str, &str)]) -> Result<ClientConfig, ConfigError> {
        let env: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        ClientConfig::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn defaults_without_environment() {
        let config = config(&[]).unwrap();
        assert_eq!(config.api_url, DEFAULT_API_URL);
        assert_eq!(config.identity, None);
        assert_eq!(config.receipt_dir, PathBuf::from("./receipts"));
        assert_eq!(config.receipt_format, ReceiptFormat::Text);
    }

    #[test]
    fn token_seeds_identity() {
        let config = config(&[
            ("CYLINDER_API_URL", "https://gas.example/api/"),
            ("CYLINDER_AUTH_TOKEN", "abc"),
            ("CYLINDER_USERNAME", "sam"),
            ("CYLINDER_ROLE", "owner"),
            ("CYLINDER_RECEIPT_FORMAT", "csv"),
        ])
        .unwrap();

        assert_eq!(config.api_url, "https://gas.example/api");
        assert_eq!(
            config.identity,
            Some(Identity {
                token: "abc".to_string(),
                username: "sam".to_string(),
                role: Role::Owner,
            })
        );
        assert_eq!(config.receipt_format, ReceiptFormat::Csv);
    }

    #[test]
    fn invalid_values_are_rejected() {
        assert!(matches!(config(&[("CYLINDER_ROLE", "guest")]), Err(ConfigError::InvalidRole(_))));
        assert!(matches!(
            config(&[("CYLINDER_RECEIPT_FORMAT", "pdf")]),
            Err(ConfigError::InvalidReceiptFormat(_))
        ));
    }
}
