//! services/bot/src/bin/bot.rs

use bot_lib::{
    adapters::db::DbAdapter,
    config::Config,
    error::ApiError,
    web::{
        middleware::{DISPLAY_NAME_HEADER, USERNAME_HEADER},
        rest::ApiDoc,
        router,
        state::AppState,
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderName, Method,
    },
    Router,
};
use shift_log_core::{ConversationEngine, PayrollRules, ShiftCatalog};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

#[tokio::main]
async fn main() -> Result<(), ApiError> {
    // --- 1. Load Configuration & Set Up Logging ---
    let config = Arc::new(Config::from_env()?);
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(config.log_level.to_string()))
        .with(tracing_subscriber::fmt::layer())
        .init();
    info!(
        "Configuration loaded for {} authorized user(s). Starting bot...",
        config.authorized_users.len()
    );

    // --- 2. Connect to Database & Run Migrations ---
    info!(
        "Connecting to database {} at {}:{}...",
        config.database.name, config.database.host, config.database.port
    );
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect_with(config.database.connect_options())
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Conversation Engine ---
    let catalog = Arc::new(ShiftCatalog::standard());
    let rules = PayrollRules::new(config.hourly_rate).with_rollover(config.rollover);
    info!(
        "Loaded {} shift types, paying {} per hour ({:?} month rollover).",
        catalog.len(),
        rules.rate_per_hour,
        rules.rollover
    );
    let engine = Arc::new(ConversationEngine::new(
        db_adapter,
        catalog,
        rules,
        config.authorized_users.iter().cloned(),
    ));

    // --- 4. Build the Shared AppState ---
    let app_state = Arc::new(AppState {
        engine,
        config: config.clone(),
    });

    // --- 5. Create the Web Router ---
    let cors = CorsLayer::new()
        .allow_origin(config.allowed_origin.clone())
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            AUTHORIZATION,
            CONTENT_TYPE,
            ACCEPT,
            HeaderName::from_static(USERNAME_HEADER),
            HeaderName::from_static(DISPLAY_NAME_HEADER),
        ]);

    let app = Router::new()
        .merge(router(app_state))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()))
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    // --- 6. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
