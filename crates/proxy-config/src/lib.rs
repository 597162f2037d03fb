//! Configuration module for the gasless transfer proxy.
//!
//! This module provides structures and utilities for managing proxy
//! configuration. It supports loading configuration from TOML files and
//! provides validation to ensure all required values are properly set
//! before the engine is constructed.

use proxy_types::{parse_address, Address};
use serde::{Deserialize, Serialize};
use std::path::Path;
use thiserror::Error;

/// Errors that can occur during configuration operations.
#[derive(Debug, Error)]
pub enum ConfigError {
	/// Error that occurs during file I/O operations.
	#[error("IO error: {0}")]
	Io(#[from] std::io::Error),
	/// Error that occurs when parsing TOML configuration.
	#[error("Configuration error: {0}")]
	Parse(String),
	/// Error that occurs when configuration validation fails.
	#[error("Validation error: {0}")]
	Validation(String),
}

impl From<toml::de::Error> for ConfigError {
	fn from(err: toml::de::Error) -> Self {
		// Extract just the message without the huge input dump
		let message = err.message().to_string();
		ConfigError::Parse(message)
	}
}

/// Main configuration structure for the proxy service.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
	/// EIP-712 signing domain of the deployed proxy.
	pub domain: DomainConfig,
	/// Owner and initial registry seeds.
	pub registry: RegistryConfig,
	/// Configuration for the HTTP submission API.
	pub api: Option<ApiConfig>,
}

/// EIP-712 domain configuration.
///
/// These four values are mixed into every signed digest; changing any of
/// them invalidates all previously issued signatures.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DomainConfig {
	/// Signing domain name.
	pub name: String,
	/// Signing domain version.
	#[serde(default = "default_domain_version")]
	pub version: String,
	/// Chain the proxy is deployed on.
	pub chain_id: u64,
	/// Address of the deployed proxy.
	pub address: String,
}

/// Returns the default signing domain version.
fn default_domain_version() -> String {
	"1".to_string()
}

/// Owner and registry seed configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct RegistryConfig {
	/// The single account allowed to mutate the registries.
	pub owner: String,
	/// Relayers authorized at construction.
	#[serde(default)]
	pub relayers: Vec<String>,
	/// Tokens supported at construction.
	#[serde(default)]
	pub tokens: Vec<String>,
}

/// Configuration for the HTTP submission API.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ApiConfig {
	/// Whether the API server should be started.
	#[serde(default)]
	pub enabled: bool,
	/// Host to bind to.
	#[serde(default = "default_api_host")]
	pub host: String,
	/// Port to bind to.
	#[serde(default = "default_api_port")]
	pub port: u16,
}

fn default_api_host() -> String {
	"127.0.0.1".to_string()
}

fn default_api_port() -> u16 {
	8080
}

/// Typed view of [`Config`] with every address parsed and validated.
#[derive(Debug, Clone)]
pub struct ResolvedConfig {
	pub domain_name: String,
	pub domain_version: String,
	pub chain_id: u64,
	pub proxy_address: Address,
	pub owner: Address,
	pub relayers: Vec<Address>,
	pub tokens: Vec<Address>,
	pub api: Option<ApiConfig>,
}

impl Config {
	/// Loads configuration from a TOML file and validates it.
	pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
		let content = std::fs::read_to_string(path)?;
		let config: Config = toml::from_str(&content)?;
		config.validate()?;
		Ok(config)
	}

	/// Validates field-level constraints that serde cannot express.
	pub fn validate(&self) -> Result<(), ConfigError> {
		if self.domain.name.is_empty() {
			return Err(ConfigError::Validation(
				"domain.name must not be empty".to_string(),
			));
		}
		if self.domain.chain_id == 0 {
			return Err(ConfigError::Validation(
				"domain.chain_id must be non-zero".to_string(),
			));
		}
		// Resolving parses every configured address.
		self.resolve().map(|_| ())
	}

	/// Parses every address field into its typed form.
	pub fn resolve(&self) -> Result<ResolvedConfig, ConfigError> {
		let proxy_address = parse_address(&self.domain.address)
			.map_err(|e| ConfigError::Validation(format!("domain.address: {}", e)))?;
		let owner = parse_address(&self.registry.owner)
			.map_err(|e| ConfigError::Validation(format!("registry.owner: {}", e)))?;
		let relayers = self
			.registry
			.relayers
			.iter()
			.map(|s| {
				parse_address(s)
					.map_err(|e| ConfigError::Validation(format!("registry.relayers: {}", e)))
			})
			.collect::<Result<Vec<_>, _>>()?;
		let tokens = self
			.registry
			.tokens
			.iter()
			.map(|s| {
				parse_address(s)
					.map_err(|e| ConfigError::Validation(format!("registry.tokens: {}", e)))
			})
			.collect::<Result<Vec<_>, _>>()?;

		Ok(ResolvedConfig {
			domain_name: self.domain.name.clone(),
			domain_version: self.domain.version.clone(),
			chain_id: self.domain.chain_id,
			proxy_address,
			owner,
			relayers,
			tokens,
			api: self.api.clone(),
		})
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	const VALID: &str = r#"
[domain]
name = "GaslessProxy"
chain_id = 31337
address = "0x4242424242424242424242424242424242424242"

[registry]
owner = "0xa0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0"
relayers = ["0xb0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0b0"]
tokens = ["0xd0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0d0"]

[api]
enabled = true
port = 8080
"#;

	#[test]
	fn test_parse_and_resolve() {
		let config: Config = toml::from_str(VALID).unwrap();
		config.validate().unwrap();

		let resolved = config.resolve().unwrap();
		assert_eq!(resolved.domain_version, "1"); // defaulted
		assert_eq!(resolved.chain_id, 31337);
		assert_eq!(resolved.relayers.len(), 1);
		assert_eq!(resolved.tokens.len(), 1);
		assert_eq!(resolved.api.unwrap().host, "127.0.0.1"); // defaulted
	}

	#[test]
	fn test_rejects_zero_chain_id() {
		let broken = VALID.replace("chain_id = 31337", "chain_id = 0");
		let config: Config = toml::from_str(&broken).unwrap();
		assert!(matches!(
			config.validate(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_rejects_malformed_address() {
		let broken = VALID.replace(
			"0xa0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0a0",
			"0x1234",
		);
		let config: Config = toml::from_str(&broken).unwrap();
		assert!(matches!(
			config.validate(),
			Err(ConfigError::Validation(_))
		));
	}

	#[test]
	fn test_missing_section_is_parse_error() {
		let result = toml::from_str::<Config>("[domain]\nname = \"x\"");
		assert!(result.is_err());
	}
}
