//! Housekeeping Entry Point
//!
//! Connects, applies migrations, purges expired reset tokens and logs an
//! identity census. Uses `anyhow` for startup errors; domain failures stay
//! typed until they are reported here.

use std::env;
use std::sync::Arc;

use anyhow::Context;
use auth::application::ResetPasswordUseCase;
use auth::domain::repository::IdentityRepository;
use auth::models::IdentityRole;
use auth::{AuthConfig, AuthError, PgAuthRepository};
use kernel::clock::{Clock, SystemClock};
use platform::notify::TracingNotifier;
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "housekeeping=info,auth=info,enrollment=info,platform=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = Arc::new(load_config()?);

    let database_url = env::var("DATABASE_URL").context("DATABASE_URL must be set")?;
    let pool = PgPoolOptions::new()
        .max_connections(2)
        .connect(&database_url)
        .await?;

    tracing::info!("Connected to database");

    sqlx::migrate!("../../../database/migrations")
        .run(&pool)
        .await?;

    tracing::info!("Migrations completed");

    let repo = Arc::new(PgAuthRepository::new(pool.clone()));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let reset = ResetPasswordUseCase::new(
        repo.clone(),
        repo.clone(),
        Arc::new(TracingNotifier),
        clock,
        config,
    );
    match reset.purge_expired().await {
        Ok(deleted) => {
            tracing::info!(tokens_deleted = deleted, "Reset token cleanup completed");
        }
        Err(e) => {
            // Keep going; the census is still useful
            tracing::warn!(error = %e, "Reset token cleanup failed");
        }
    }

    for role in IdentityRole::ALL {
        let count = repo.count_by_role(role).await?;
        tracing::info!(role = %role, count, "Identity census");
    }

    pool.close().await;
    Ok(())
}

fn load_config() -> anyhow::Result<AuthConfig> {
    match AuthConfig::from_env() {
        Ok(config) => Ok(config),
        Err(AuthError::Configuration(msg))
            if cfg!(debug_assertions) && env::var(auth::config::ENV_TOKEN_SECRET).is_err() =>
        {
            tracing::warn!(reason = %msg, "Using development auth config");
            Ok(AuthConfig::development())
        }
        Err(e) => Err(e.into()),
    }
}
