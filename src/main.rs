use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use nurture_strength_lib::commands::{dispatch, Cli};
use nurture_strength_lib::config::Config;
use nurture_strength_lib::db::{self, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
  // Load environment variables from .env file
  dotenvy::dotenv().ok();

  let config = Config::from_env()?;

  tracing_subscriber::registry()
    .with(EnvFilter::try_new(&config.log_filter).unwrap_or_else(|_| EnvFilter::new("info")))
    .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
    .init();

  let cli = Cli::parse();

  let pool = db::initialize_db(&config)
    .await
    .map_err(|e| anyhow::anyhow!("Failed to initialize database: {}", e))?;
  let state = AppState { db: pool };
  let clock = config.clock();

  let result = dispatch(cli, &state, clock.as_ref()).await;
  state.db.close().await;
  result
}
