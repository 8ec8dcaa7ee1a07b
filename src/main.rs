mod database;
mod error;
mod handlers;
mod hooks;
mod middleware;
mod models;
mod utils;

use axum::{
    extract::DefaultBodyLimit,
    routing::{delete, get, post},
    Router,
};
use dotenvy::dotenv;
use std::env;
use tower::ServiceBuilder;
use tower_cookies::CookieManagerLayer;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use database::{create_database_pool, run_migrations, Database};

#[tokio::main]
async fn main() {
    // Load environment variables
    dotenv().ok();

    // Initialize logging
    env_logger::init();

    let database_url = env::var("DATABASE_URL").expect("DATABASE_URL must be set");

    let db = create_database_pool(&database_url)
        .await
        .expect("Failed to connect to database");

    run_migrations(&db).await.expect("Failed to run migrations");

    log::info!("Database connection successful");

    let app = create_router(db);

    let port = env::var("PORT").unwrap_or_else(|_| "3000".to_string());
    let addr = format!("0.0.0.0:{}", port);

    log::info!("Stocktrack server starting on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}

fn create_router(db: Database) -> Router {
    Router::new()
        // Auth
        .route("/auth/register", post(handlers::auth::register))
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/me", get(handlers::auth::me))
        // Dashboard
        .route("/dashboard", get(handlers::dashboard))
        // Profile (settings screen)
        .route(
            "/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        )
        // Role assignments
        .route(
            "/roles",
            get(handlers::roles::list_roles).post(handlers::roles::assign_role),
        )
        .route("/roles/:id", delete(handlers::roles::remove_role))
        // Master data
        .route(
            "/warehouses",
            get(handlers::warehouses::list_warehouses).post(handlers::warehouses::create_warehouse),
        )
        .route(
            "/warehouses/:id",
            axum::routing::put(handlers::warehouses::update_warehouse)
                .delete(handlers::warehouses::delete_warehouse),
        )
        .route(
            "/categories",
            get(handlers::categories::list_categories).post(handlers::categories::create_category),
        )
        .route(
            "/categories/:id",
            axum::routing::put(handlers::categories::update_category)
                .delete(handlers::categories::delete_category),
        )
        .route(
            "/products",
            get(handlers::products::list_products).post(handlers::products::create_product),
        )
        .route(
            "/products/:id",
            axum::routing::put(handlers::products::update_product)
                .delete(handlers::products::delete_product),
        )
        // Receipts
        .route(
            "/receipts",
            get(handlers::receipts::list_receipts).post(handlers::receipts::create_receipt),
        )
        .route(
            "/receipts/:id",
            get(handlers::receipts::get_receipt)
                .put(handlers::receipts::update_receipt)
                .delete(handlers::receipts::delete_receipt),
        )
        .route(
            "/receipts/:id/lines",
            get(handlers::receipts::list_lines).post(handlers::receipts::add_line),
        )
        .route(
            "/receipts/:id/lines/:line_id",
            axum::routing::put(handlers::receipts::update_line)
                .delete(handlers::receipts::delete_line),
        )
        // Deliveries
        .route(
            "/deliveries",
            get(handlers::deliveries::list_deliveries).post(handlers::deliveries::create_delivery),
        )
        .route(
            "/deliveries/:id",
            get(handlers::deliveries::get_delivery)
                .put(handlers::deliveries::update_delivery)
                .delete(handlers::deliveries::delete_delivery),
        )
        .route(
            "/deliveries/:id/lines",
            get(handlers::deliveries::list_lines).post(handlers::deliveries::add_line),
        )
        .route(
            "/deliveries/:id/lines/:line_id",
            axum::routing::put(handlers::deliveries::update_line)
                .delete(handlers::deliveries::delete_line),
        )
        // Stock ledger
        .route("/stock/balances", get(handlers::stock::list_balances))
        .route(
            "/stock/movements",
            get(handlers::stock::list_movements).post(handlers::stock::create_movement),
        )
        // Middleware
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CookieManagerLayer::new())
                .layer(CorsLayer::permissive())
                .layer(DefaultBodyLimit::max(1024 * 1024)), // 1MB
        )
        .with_state(db)
}
