use anyhow::Context;
use clap::Parser;
use plateloc_core::{
	config::{default_data_dir, AppConfig},
	Core,
};
use std::{path::PathBuf, sync::Arc};
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use plateloc_server::{create_router, utils};

/// Plate location ledger HTTP server
#[derive(Parser, Debug)]
#[command(name = "plateloc-server", version)]
struct Args {
	/// Directory holding the config file and the database
	#[arg(long, env = "DATA_DIR")]
	data_dir: Option<PathBuf>,

	/// Port to listen on, overriding the config file
	#[arg(long, env = "PORT")]
	port: Option<u16>,

	/// Address to bind, overriding the config file
	#[arg(long)]
	bind: Option<String>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
	let args = Args::parse();

	let data_dir = match args.data_dir {
		Some(dir) => dir,
		None => default_data_dir()
			.context("Unable to resolve a data directory, try setting $DATA_DIR")?,
	};

	let mut config = AppConfig::load_or_create(&data_dir)?;
	if let Some(port) = args.port {
		config.server.port = port;
	}
	if let Some(bind) = args.bind {
		config.server.bind_address = bind;
	}

	let filter = EnvFilter::try_from_default_env()
		.unwrap_or_else(|_| EnvFilter::new(&config.log_level));
	tracing_subscriber::registry()
		.with(filter)
		.with(fmt::layer().with_target(false))
		.init();

	let addr = format!("{}:{}", config.server.bind_address, config.server.port);
	let core = Arc::new(Core::with_config(config).await?);

	let listener = TcpListener::bind(&addr)
		.await
		.with_context(|| format!("Failed to bind {}", addr))?;
	info!("Listening on http://{}", listener.local_addr()?);

	axum::serve(listener, create_router(core))
		.with_graceful_shutdown(utils::shutdown_signal())
		.await
		.context("HTTP server error")?;

	info!("Server stopped");
	Ok(())
}
