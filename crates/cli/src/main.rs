//! `servicetrack` CLI entry-point.
//!
//! Available sub-commands:
//! - `serve`   — start the API server.
//! - `init-db` — create the database schema and exit.

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing::info;

use api::AppState;
use auth::JwtManager;
use vin::VinDecoder;

const DEFAULT_DATABASE_URL: &str = "sqlite:servicetrack.db";

#[derive(Parser)]
#[command(
    name = "servicetrack",
    about = "Vehicle maintenance tracking backend",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start the REST API server.
    Serve {
        #[arg(long, default_value = "0.0.0.0:8080")]
        bind: String,
    },
    /// Create the database schema and exit.
    InitDb {
        #[arg(long, env = "DATABASE_URL", default_value = DEFAULT_DATABASE_URL)]
        database_url: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    match cli.command {
        Command::Serve { bind } => {
            let database_url = std::env::var("DATABASE_URL")
                .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string());
            let jwt_secret = std::env::var("JWT_SECRET")
                .unwrap_or_else(|_| "jwt-dev-secret-change-me".to_string());
            let ttl_secs: i64 = std::env::var("TOKEN_TTL_SECS")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(86_400);

            let pool = db::pool::create_pool(&database_url, 10)
                .await
                .context("failed to connect to database")?;
            db::pool::init_schema(&pool).await?;

            let state = AppState {
                pool,
                jwt: JwtManager::new(jwt_secret.as_bytes(), ttl_secs),
                vin: VinDecoder::new(),
            };

            info!("Starting API server on {bind}");
            api::serve(&bind, state).await?;
        }
        Command::InitDb { database_url } => {
            let pool = db::pool::create_pool(&database_url, 2)
                .await
                .context("failed to connect to database")?;
            db::pool::init_schema(&pool).await?;
            info!("Schema applied to {database_url}");
        }
    }

    Ok(())
}
