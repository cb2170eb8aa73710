// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights reserved.
// SPDX-License-Identifier: Proprietary

//! Configuration for gatehouse-server.
//!
//! Values come from three layers, lowest precedence first:
//! built-in defaults, a TOML file (`/etc/gatehouse/server.toml` unless a path
//! is given), and `GATEHOUSE_SERVER_*` environment variables.
//!
//! ```ignore
//! let config = gatehouse_server_config::load_config()?;
//! println!("listening on {}", config.socket_addr());
//! ```

pub mod error;
pub mod layer;
pub mod sections;
pub mod sources;

pub use error::ConfigError;
pub use layer::ServerConfigLayer;
pub use sections::*;
pub use sources::{ConfigSource, DefaultsSource, EnvSource, Precedence, TomlSource};

use tracing::debug;

/// Fully resolved server configuration.
#[derive(Debug, Clone, Default)]
pub struct ServerConfig {
	pub http: HttpConfig,
	pub database: DatabaseConfig,
	pub auth: AuthConfig,
	pub webhook: WebhookConfig,
	pub logging: LoggingConfig,
}

impl ServerConfig {
	pub fn socket_addr(&self) -> String {
		format!("{}:{}", self.http.host, self.http.port)
	}

	/// Settings that leave registration review half-working. These are not
	/// errors: the server still starts, but the affected routes refuse.
	pub fn review_warnings(&self) -> Vec<&'static str> {
		let mut warnings = Vec::new();
		if self.auth.admin_email.is_none() {
			warnings.push("no admin email configured; admin review endpoints will refuse everyone");
		}
		if self.webhook.signing_secret.is_none() {
			warnings.push("no webhook signing secret configured; identity webhooks will be refused");
		}
		warnings
	}
}

/// Load configuration from defaults, the system TOML file, and the environment.
pub fn load_config() -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::system()),
		Box::new(EnvSource),
	])
}

/// Load configuration with a custom config file path.
pub fn load_config_with_file(
	config_path: impl Into<std::path::PathBuf>,
) -> Result<ServerConfig, ConfigError> {
	load_from_sources(vec![
		Box::new(DefaultsSource),
		Box::new(TomlSource::new(config_path)),
		Box::new(EnvSource),
	])
}

fn load_from_sources(mut sources: Vec<Box<dyn ConfigSource>>) -> Result<ServerConfig, ConfigError> {
	sources.sort_by_key(|s| s.precedence());

	let mut merged = ServerConfigLayer::default();
	for source in sources {
		debug!(source = source.name(), "loading configuration source");
		merged.merge(source.load()?);
	}

	finalize(merged)
}

/// Resolve a merged layer and apply cross-field validation.
pub fn finalize(layer: ServerConfigLayer) -> Result<ServerConfig, ConfigError> {
	let http = layer.http.unwrap_or_default().finalize();
	let database = layer.database.unwrap_or_default().finalize();
	let auth = layer.auth.unwrap_or_default().finalize();
	let webhook = layer.webhook.unwrap_or_default().finalize();
	let logging = layer.logging.unwrap_or_default().finalize();

	auth.validate()?;

	Ok(ServerConfig {
		http,
		database,
		auth,
		webhook,
		logging,
	})
}
