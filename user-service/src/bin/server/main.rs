use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use user_service::config::Config;
use user_service::inbound::http::router::build_router;
use user_service::outbound::repositories::InMemoryUserRepository;
use user_service::outbound::repositories::PostgresUserRepository;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "user_service=debug,auth=debug,tower_http=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!(
        service = "user-service",
        version = env!("CARGO_PKG_VERSION"),
        "Service starting"
    );

    let config = Config::load()?;
    let auth_settings = config.security.auth_settings()?;

    tracing::info!(
        http_port = config.server.http_port,
        algorithm = ?auth_settings.algorithm(),
        access_token_expire_minutes = auth_settings.access_token_ttl().num_minutes(),
        persistent = config.database.url.is_some(),
        "Configuration loaded"
    );

    let http_application = match &config.database.url {
        Some(database_url) => {
            let pg_pool = PgPoolOptions::new()
                .max_connections(config.database.max_connections)
                .connect(database_url)
                .await?;
            tracing::info!(
                max_connections = config.database.max_connections,
                database = "postgresql",
                "Database connection pool created"
            );

            sqlx::migrate!("./migrations").run(&pg_pool).await?;
            tracing::info!(database = "postgresql", "Database migrations completed");

            build_router(
                Arc::new(PostgresUserRepository::new(pg_pool)),
                &auth_settings,
            )?
        }
        None => {
            tracing::warn!("No database URL configured, users are kept in memory");
            build_router(Arc::new(InMemoryUserRepository::new()), &auth_settings)?
        }
    };

    let http_address = format!("0.0.0.0:{}", config.server.http_port);
    let http_listener = tokio::net::TcpListener::bind(&http_address).await?;
    tracing::info!(
        address = %http_address,
        port = config.server.http_port,
        protocol = "http",
        "Http server listening"
    );

    axum::serve(http_listener, http_application).await?;

    tracing::info!("Server exited");
    Ok(())
}
