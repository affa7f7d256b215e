use anyhow::Context;
use clap::{Parser, Subcommand};

use crate::auth::{AuthClaims, TokenKeys};
use crate::config::AppConfig;
use crate::database::DatabaseManager;
use crate::{app, AppState};

#[derive(Parser, Debug)]
#[command(name = "jobly-api")]
#[command(about = "Jobly API - companies and job postings over REST")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    #[command(about = "Run the HTTP server (default)")]
    Serve {
        #[arg(long, help = "Port to listen on (overrides PORT / JOBLY_API_PORT)")]
        port: Option<u16>,

        #[arg(long, help = "Apply database migrations before serving")]
        migrate: bool,
    },

    #[command(about = "Apply database migrations and exit")]
    Migrate,

    #[command(about = "Mint a signed token for a user with the configured secret")]
    Token {
        #[arg(help = "Username to put in the token")]
        username: String,

        #[arg(long, help = "Mark the token as an admin token")]
        admin: bool,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    config.validate()?;

    match cli.command.unwrap_or(Commands::Serve { port: None, migrate: false }) {
        Commands::Serve { port, migrate } => serve(config, port, migrate).await,
        Commands::Migrate => {
            let pool = DatabaseManager::connect(&config.database).await?;
            DatabaseManager::migrate(&pool).await?;
            Ok(())
        }
        Commands::Token { username, admin } => {
            let keys = TokenKeys::from_secret(&config.security.jwt_secret)?;
            let claims = AuthClaims::new(username, admin, config.security.jwt_expiry_hours);
            println!("{}", keys.generate(&claims)?);
            Ok(())
        }
    }
}

async fn serve(config: AppConfig, port: Option<u16>, migrate: bool) -> anyhow::Result<()> {
    let pool = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;

    if migrate || config.database.run_migrations {
        DatabaseManager::migrate(&pool).await?;
    }

    let state = AppState::new(pool, &config)?;
    let router = app(state, &config);

    let bind_addr = format!("0.0.0.0:{}", port.unwrap_or(config.api.port));
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", bind_addr))?;

    tracing::info!("Jobly API listening on http://{} ({:?})", bind_addr, config.environment);

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
    }
    tracing::info!("Shutting down");
}
