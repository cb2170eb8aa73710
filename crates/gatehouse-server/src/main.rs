// Copyright (c) 2025 Geoffrey Huntley <ghuntley@ghuntley.com>. All rights
// reserved. SPDX-License-Identifier: Proprietary

//! Gatehouse registration server binary.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use gatehouse_server::{cors_layer, create_app_state, create_router, version};
use tower_http::trace::TraceLayer;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Gatehouse server - registration gatekeeping behind an identity provider.
#[derive(Parser, Debug)]
#[command(
	name = "gatehouse-server",
	about = "Registration gatekeeping server",
	version
)]
struct Args {
	/// TOML config file. Defaults to /etc/gatehouse/server.toml.
	#[arg(long, env = "GATEHOUSE_SERVER_CONFIG")]
	config: Option<PathBuf>,

	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
	/// Show version and build information
	Version,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
	let args = Args::parse();

	if let Some(Command::Version) = args.command {
		println!("{}", version::format_version_info());
		return Ok(());
	}

	dotenvy::dotenv().ok();

	let config = match &args.config {
		Some(path) => gatehouse_server_config::load_config_with_file(path)?,
		None => gatehouse_server_config::load_config()?,
	};

	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| config.logging.level.clone().into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	tracing::info!(
		host = %config.http.host,
		port = config.http.port,
		database = %config.database.url,
		frontend_url = ?config.http.frontend_url,
		key_source = if config.auth.jwks_url.is_some() { "jwks" } else { "pem" },
		"starting gatehouse-server"
	);

	let pool = gatehouse_server::db::create_pool(&config.database.url).await?;
	gatehouse_server::db::run_migrations(&pool).await?;

	let state = create_app_state(pool, &config).await?;
	let app = create_router(state)
		.layer(TraceLayer::new_for_http())
		.layer(cors_layer(config.http.frontend_url.as_deref()));

	let addr = config.socket_addr();
	tracing::info!(addr = %addr, "listening");
	let listener = tokio::net::TcpListener::bind(&addr).await?;

	tokio::select! {
		result = axum::serve(listener, app) => {
			if let Err(e) = result {
				tracing::error!(error = %e, "server error");
			}
		}
		_ = tokio::signal::ctrl_c() => {
			tracing::info!("Received shutdown signal");
		}
	}

	tracing::info!("Server shutdown complete");
	Ok(())
}
