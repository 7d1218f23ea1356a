use anyhow::Context;
use asistencia::{AppState, Config, Server, routes};
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    init_logging();

    let config = Config::parse();
    config.check()?;

    let state = AppState::from_config(&config)?;
    info!(
        data_file = %config.data_file.display(),
        public_dir = %state.assets.root().display(),
        admin_user = %config.admin_user,
        "starting check-in registry"
    );

    Server::bind(config.addr())
        .serve(routes::app(state))
        .await
        .context("server error")
}

fn init_logging() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("{}=info", env!("CARGO_CRATE_NAME"))));
    tracing_subscriber::fmt().with_env_filter(filter).init();
}
