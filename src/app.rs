/*
 * Responsibility
 * - Config → dependencies → Router assembly
 * - Layer order (outer → inner): http → security headers → CORS → access gate → routes
 * - axum::serve() startup
 */
use std::{panic, process, sync::Arc};

use anyhow::{Context, Result};
use axum::{Router, routing::get};
use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::api::{self, handlers};
use crate::config::{Config, HttpLimits};
use crate::middleware::{self, cors::CorsPolicy};
use crate::repos::{MIGRATOR, PgCategoryRepo, PgProductRepo, PgUserRepo};
use crate::services::auth::{AuthService, PasswordHasher, TokenCodec, policy::shop_policy};
use crate::state::AppState;

fn init_tracing() {
    // RUST_LOG wins when set, e.g.
    // RUST_LOG=info,shopease_api=debug,tower_http=debug cargo run
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,tower_http=info"));

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

fn init_panic_hook(abort_on_panic: bool) {
    let default_hook = panic::take_hook();

    panic::set_hook(Box::new(move |info| {
        tracing::error!(?info, "panic");

        // development: crash loudly; production: default hook, keep serving
        if abort_on_panic {
            process::abort();
        } else {
            default_hook(info);
        }
    }))
}

pub async fn run() -> Result<()> {
    init_tracing();
    let config = Config::from_env().context("failed to load configuration")?;

    init_panic_hook(!config.app_env.is_production());

    tracing::info!(
        "starting ShopEase API in {:?} mode on {}",
        config.app_env,
        config.addr
    );

    let state = build_state(&config).await?;
    let app = build_router(state, &config.cors, config.http);

    let listener = tokio::net::TcpListener::bind(config.addr)
        .await
        .with_context(|| format!("failed to bind {}", config.addr))?;
    axum::serve(listener, app).await.context("server error")?;

    Ok(())
}

async fn build_state(config: &Config) -> Result<AppState> {
    let db = PgPoolOptions::new()
        .max_connections(10)
        .connect(&config.database_url)
        .await
        .context("failed to connect to Postgres")?;

    MIGRATOR
        .run(&db)
        .await
        .context("failed to apply database migrations")?;

    // Broken rule tables must stop startup.
    let policy = shop_policy().context("invalid access policy")?;
    tracing::info!(rules = policy.rules().len(), "access policy loaded");

    let auth = AuthService::new(
        TokenCodec::new(&config.token),
        PasswordHasher::new(),
        Arc::new(PgUserRepo::new(db.clone())),
    )
    .context("failed to build auth service")?;

    Ok(AppState::new(
        Arc::new(auth),
        Arc::new(policy),
        Arc::new(PgCategoryRepo::new(db.clone())),
        Arc::new(PgProductRepo::new(db)),
    ))
}

/// Assemble the full router with every layer in place.
///
/// Public so integration tests can drive the exact production stack with in-memory stores.
pub fn build_router(state: AppState, cors: &CorsPolicy, limits: HttpLimits) -> Router {
    let routes = Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", api::routes())
        .fallback(handlers::fallback::not_found);

    let gated = middleware::auth::access::apply(routes, state.clone()).with_state(state);

    let router = middleware::cors::apply(gated, cors);
    let router = middleware::security_headers::apply(router);
    middleware::http::apply(router, limits)
}
