//! services/api/src/bin/api.rs

use api_lib::{
    adapters::db::DbAdapter,
    auth::TokenSigner,
    config::Config,
    error::ApiError,
    web::{
        auth::{login_handler, me_handler, register_handler},
        docs::ApiDoc,
        middleware::require_auth,
        recipes::{
            create_recipe_handler, delete_recipe_handler, get_recipe_handler,
            list_recipes_handler, recommended_recipes_handler, update_recipe_handler,
        },
        reviews::{
            create_review_handler, delete_review_handler, list_reviews_handler,
            update_review_handler,
        },
        state::AppState,
        users::{
            add_favorite_handler, add_saved_handler, get_profile_handler,
            remove_favorite_handler, remove_saved_handler, update_preferences_handler,
            update_profile_handler,
        },
    },
};
use axum::{
    http::{
        header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE},
        HeaderValue, Method,
    },
    middleware as axum_middleware,
    routing::{delete, get, post, put},
    Router,
};
use sqlx::postgres::PgPoolOptions;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
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
    info!("Configuration loaded. Starting server...");

    // --- 2. Connect to Database & Run Migrations ---
    info!("Connecting to database...");
    let db_pool = PgPoolOptions::new()
        .max_connections(5)
        .connect(&config.database_url)
        .await?;
    let db_adapter = Arc::new(DbAdapter::new(db_pool.clone()));
    info!("Running database migrations...");
    db_adapter.run_migrations().await?;
    info!("Database migrations complete.");

    // --- 3. Build the Shared AppState ---
    let signer = TokenSigner::new(&config.jwt_secret, config.token_ttl_days)
        .map_err(|e| ApiError::Internal(format!("failed to build token signer: {}", e)))?;

    let app_state = Arc::new(AppState {
        db: db_adapter,
        signer,
        config: config.clone(),
    });

    let cors_origin = config
        .cors_origin
        .parse::<HeaderValue>()
        .map_err(|e| ApiError::Internal(format!("invalid CORS_ORIGIN: {}", e)))?;
    let cors = CorsLayer::new()
        .allow_origin(cors_origin)
        .allow_credentials(true)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([AUTHORIZATION, CONTENT_TYPE, ACCEPT]);

    // --- 4. Create the Web Router ---
    // Public routes (no auth required)
    let public_routes = Router::new()
        .route("/auth/register", post(register_handler))
        .route("/auth/login", post(login_handler))
        .route("/recipes", get(list_recipes_handler))
        .route("/recipes/{id}", get(get_recipe_handler))
        .route("/recipes/{id}/reviews", get(list_reviews_handler));

    // Protected routes (auth required)
    let protected_routes = Router::new()
        .route("/auth/me", get(me_handler))
        .route("/recipes", post(create_recipe_handler))
        .route("/recipes/recommended", get(recommended_recipes_handler))
        .route(
            "/recipes/{id}",
            put(update_recipe_handler).delete(delete_recipe_handler),
        )
        .route("/recipes/{id}/reviews", post(create_review_handler))
        .route(
            "/reviews/{id}",
            put(update_review_handler).delete(delete_review_handler),
        )
        .route(
            "/users/profile",
            get(get_profile_handler).put(update_profile_handler),
        )
        .route("/users/preferences", put(update_preferences_handler))
        .route(
            "/users/favorites/{recipe_id}",
            post(add_favorite_handler).delete(remove_favorite_handler),
        )
        .route(
            "/users/saved/{recipe_id}",
            post(add_saved_handler).delete(remove_saved_handler),
        )
        .layer(axum_middleware::from_fn_with_state(
            app_state.clone(),
            require_auth,
        ));

    // Combine API routes
    let api_router = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(cors)
        .with_state(app_state);

    // Merge the API router with the Swagger UI router for a complete application.
    let app = Router::new()
        .merge(api_router)
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    // --- 5. Start the Server ---
    info!("Starting server on {}", config.bind_address);
    info!(
        "Swagger UI available at http://{}/swagger-ui",
        config.bind_address
    );
    let listener = tokio::net::TcpListener::bind(&config.bind_address).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
