/// Catalog Service - HTTP Server
///
/// Serves the video catalog, browse taxonomy, related-video recommendation,
/// removal requests, lead capture and the admin sync/marketing tools.
use actix_cors::Cors;
use actix_web::{middleware as actix_middleware, web, App, HttpResponse, HttpServer};
use catalog_service::handlers;
use catalog_service::services::Mailer;
use catalog_service::Config;
use sqlx::postgres::PgPoolOptions;
use std::io;

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
    tracing::info!(address = %bind_address, "Catalog Service starting HTTP server");

    // Initialize database connection pool
    let db_pool = PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
        .expect("Failed to connect to database");

    // SMTP is optional; the blast endpoint reports the gap at request time
    let mailer = match &config.mail {
        Some(mail_config) => Some(Mailer::new(mail_config).expect("Failed to build SMTP mailer")),
        None => {
            tracing::warn!("SMTP not configured; marketing blast endpoint disabled");
            None
        }
    };

    let pool_data = web::Data::new(db_pool);
    let config_data = web::Data::new(config);
    let mailer_data = web::Data::new(mailer);

    HttpServer::new(move || {
        App::new()
            .app_data(pool_data.clone())
            .app_data(config_data.clone())
            .app_data(mailer_data.clone())
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
                        web::scope("/videos")
                            .route("", web::get().to(handlers::list_videos))
                            .route("", web::post().to(handlers::create_video))
                            .route("/{id}", web::get().to(handlers::get_video))
                            .route("/{id}", web::put().to(handlers::update_video))
                            .route("/{id}", web::delete().to(handlers::delete_video))
                            .route("/{id}/related", web::get().to(handlers::related_videos)),
                    )
                    .service(
                        web::scope("/categories")
                            .route("", web::get().to(handlers::list_categories))
                            .route("", web::post().to(handlers::create_category))
                            .route("/{slug}", web::get().to(handlers::get_category))
                            .route("/{slug}", web::put().to(handlers::update_category))
                            .route("/{slug}", web::delete().to(handlers::delete_category)),
                    )
                    .service(
                        web::scope("/creators")
                            .route("", web::get().to(handlers::list_creators))
                            .route("", web::post().to(handlers::create_creator))
                            .route("/{slug}", web::get().to(handlers::get_creator))
                            .route("/{slug}", web::put().to(handlers::update_creator))
                            .route("/{slug}", web::delete().to(handlers::delete_creator)),
                    )
                    .service(
                        web::scope("/removal-requests")
                            .route("", web::post().to(handlers::create_removal_request))
                            .route("", web::get().to(handlers::list_removal_requests))
                            .route("/{id}", web::put().to(handlers::update_removal_request)),
                    )
                    .route("/leads", web::post().to(handlers::capture_lead))
                    .service(
                        web::scope("/admin")
                            .route("/leads", web::get().to(handlers::list_leads))
                            .route("/sync/report", web::get().to(handlers::sync_report))
                            .route("/sync/repair", web::post().to(handlers::sync_repair))
                            .route("/marketing/blast", web::post().to(handlers::send_blast)),
                    ),
            )
    })
    .bind(&bind_address)?
    .run()
    .await
}
