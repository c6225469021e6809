mod config;
mod controller;
mod credentials;
mod entities;
mod error;
mod http;
mod models;
mod repository;
mod service;
mod state;
mod validation;

use std::time::Duration;

use crate::config::{ApiConfig, StorageBackend};
use crate::error::RepositoryError;
use crate::models::vote::{Vote, VoteStatus};
use crate::repository::{Repositories, VoteRepository};
use crate::state::AppState;
use anyhow::{Context, Result};
use axum::ServiceExt;
use axum::extract::Request;
use chrono::NaiveDate;
use migration::MigratorTrait;
use sea_orm::ConnectOptions;
use sea_orm::Database;
use tokio::net::TcpListener;
use tower::Layer;
use tower_http::normalize_path::NormalizePathLayer;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();
    let config = ApiConfig::load().context("Failed to load configuration")?;
    let repositories = build_repositories(&config).await?;

    if config.database.seed_demo_data {
        seed_demo_votes(repositories.votes.as_ref()).await?;
    }

    let app_state = AppState::new(&config, repositories);

    let listener = TcpListener::bind(config.server.address())
        .await
        .context("Failed to bind HTTP listener")?;
    let local_addr = listener
        .local_addr()
        .context("Failed to obtain listener address")?;
    info!("E-voting API listening on {local_addr}");

    let router = NormalizePathLayer::trim_trailing_slash().layer(http::router(app_state));
    axum::serve(
        listener,
        ServiceExt::<Request>::into_make_service(router),
    )
    .with_graceful_shutdown(shutdown_signal())
    .await
    .context("HTTP server exited with error")?;

    info!("E-voting API stopped");
    Ok(())
}

fn init_tracing() {
    let filter = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::new(filter))
        .with_target(false)
        .compact()
        .init();
}

async fn build_repositories(config: &ApiConfig) -> Result<Repositories> {
    match config.database.backend {
        StorageBackend::Memory => {
            info!("Using in-memory storage; data is lost on shutdown");
            Ok(Repositories::in_memory())
        }
        StorageBackend::Postgres => {
            let database = connect_database(config).await?;
            run_migrations(&database).await?;
            Ok(Repositories::postgres(database))
        }
    }
}

async fn connect_database(config: &ApiConfig) -> Result<sea_orm::DatabaseConnection> {
    let url = config
        .database
        .url
        .clone()
        .context("database.url is required for the postgres backend")?;
    let mut options = ConnectOptions::new(url);
    options
        .max_connections(config.database.max_connections)
        .sqlx_logging(true)
        .sqlx_logging_level(tracing::log::LevelFilter::Debug)
        .acquire_timeout(Duration::from_secs(10));

    if let Some(min) = config.database.min_connections {
        options.min_connections(min);
    }

    Database::connect(options)
        .await
        .context("Failed to connect to PostgreSQL")
}

async fn run_migrations(database: &sea_orm::DatabaseConnection) -> Result<()> {
    migration::Migrator::up(database, None)
        .await
        .context("Database migrations failed")
}

/// Inserts the two sample votes. Votes that already exist are left alone.
async fn seed_demo_votes(votes: &dyn VoteRepository) -> Result<()> {
    let samples = [
        demo_vote(
            "1",
            "Neue Parkanlage",
            "Soll eine neue Parkanlage im Stadtzentrum gebaut werden?",
            (2024, 1, 31),
            VoteStatus::Active,
        )?,
        demo_vote(
            "2",
            "Schulreform",
            "Soll die neue Schulreform eingeführt werden?",
            (2024, 2, 28),
            VoteStatus::Closed,
        )?,
    ];

    for vote in samples {
        let id = vote.id.clone();
        match votes.save(vote).await {
            Ok(()) => info!(vote_id = %id, "seeded demo vote"),
            Err(RepositoryError::Conflict(_)) => info!(vote_id = %id, "demo vote already present"),
            Err(err) => return Err(err).context("Failed to seed demo votes"),
        }
    }
    Ok(())
}

fn demo_vote(
    id: &str,
    title: &str,
    description: &str,
    (year, month, day): (i32, u32, u32),
    status: VoteStatus,
) -> Result<Vote> {
    let deadline = NaiveDate::from_ymd_opt(year, month, day)
        .with_context(|| format!("invalid demo deadline for vote {id}"))?;
    Ok(Vote {
        id: id.to_string(),
        title: title.to_string(),
        description: description.to_string(),
        deadline,
        minimum_age: 18,
        status,
    })
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for shutdown signal: {err}");
        return;
    }
    info!("Shutdown signal received");
}
