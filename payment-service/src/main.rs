/// Payment Service - HTTP Server
///
/// Handles PIX and card charge creation, the payment confirmation watcher,
/// and campaign attribution / conversion tracking.
use actix_cors::Cors;
use actix_web::{middleware as actix_middleware, web, App, HttpResponse, HttpServer};
use payment_service::context::AppContext;
use payment_service::handlers;
use payment_service::Config;
use sqlx::postgres::PgPoolOptions;
use std::io;
use tokio::sync::watch;

#[actix_web::main]
async fn main() -> io::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    // Load configuration from environment
    dotenvy::dotenv().ok();
    let config = Config::from_env().expect("Failed to load configuration");

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!(address = %bind_address, "Payment Service starting HTTP server");

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    // Shutdown signal for in-flight confirmation watchers
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let shutdown_tx_clone = shutdown_tx.clone();
    tokio::spawn(async move {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to listen for ctrl+c");
        tracing::info!("Shutdown signal received");
        let _ = shutdown_tx_clone.send(true);
    });

    let context = web::Data::new(AppContext::new(db_pool, &config, shutdown_rx));
    let config_data = web::Data::new(config.clone());

    let server = HttpServer::new(move || {
        App::new()
            .app_data(context.clone())
            .app_data(config_data.clone())
            .wrap(Cors::permissive())
            .wrap(actix_middleware::Logger::default())
            .route(
                "/api/v1/health",
                web::get()
                    .to(|| async { HttpResponse::Ok().json(serde_json::json!({"status": "ok"})) }),
            )
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/payments")
                            .route("/pix", web::post().to(handlers::create_pix_charge))
                            .route("/checkout", web::post().to(handlers::create_checkout))
                            .route(
                                "/checkout/return",
                                web::get().to(handlers::checkout_return),
                            )
                            .route("/{id}", web::get().to(handlers::get_payment_status))
                            .route("/{id}/check", web::post().to(handlers::manual_check)),
                    )
                    .service(
                        web::scope("/tracking")
                            .route("/visits", web::post().to(handlers::track_visit))
                            .route("/conversions", web::get().to(handlers::list_conversions)),
                    ),
            )
    })
    .bind(&bind_address)?
    .run();

    let result = server.await;

    // Stop any watchers still polling
    let _ = shutdown_tx.send(true);
    tracing::info!("Payment-service shutting down");

    result
}
