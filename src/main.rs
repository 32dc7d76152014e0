use actix_cors::Cors;
use actix_web::{middleware::Logger, web, App, HttpResponse, HttpServer};
use item_service::config::Config;
use item_service::handlers;
use item_service::search::SearchClient;
use item_service::workers::{run_maintenance_worker, MaintenanceQueue};
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use std::io;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

async fn health_summary(pool: web::Data<PgPool>) -> HttpResponse {
    match sqlx::query("SELECT 1").fetch_one(pool.get_ref()).await {
        Ok(_) => HttpResponse::Ok().json(serde_json::json!({
            "status": "ok",
            "service": "item-service",
            "version": env!("CARGO_PKG_VERSION")
        })),
        Err(e) => HttpResponse::ServiceUnavailable().json(serde_json::json!({
            "status": "unhealthy",
            "error": format!("PostgreSQL connection failed: {}", e),
            "service": "item-service"
        })),
    }
}

#[actix_web::main]
async fn main() -> io::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,actix_web=debug,sqlx=warn".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Load configuration
    let config = match Config::from_env() {
        Ok(cfg) => cfg,
        Err(e) => {
            tracing::error!("Configuration loading failed: {}", e);
            eprintln!("ERROR: Failed to load configuration: {}", e);
            std::process::exit(1);
        }
    };

    tracing::info!("Starting item-service v{}", env!("CARGO_PKG_VERSION"));
    tracing::info!("Environment: {}", config.app.env);

    // Initialize database connection pool
    let db_pool = match PgPoolOptions::new()
        .max_connections(config.database.max_connections)
        .connect(&config.database.url)
        .await
    {
        Ok(pool) => pool,
        Err(e) => {
            tracing::error!("Database pool creation failed: {:#}", e);
            eprintln!("ERROR: Failed to create database pool: {}", e);
            std::process::exit(1);
        }
    };

    sqlx::migrate!()
        .run(&db_pool)
        .await
        .map_err(|e| io::Error::new(io::ErrorKind::Other, format!("Migration failed: {e}")))?;

    tracing::info!("Connected to database, migrations applied");

    let search_client = SearchClient::new(config.search.endpoint.clone());
    if !search_client.is_enabled() {
        tracing::info!("Search index endpoint not configured; index sync disabled");
    }

    // Background maintenance worker: counter/score recompute and search
    // index sync run here, never on the request path.
    let (queue, queue_rx) = MaintenanceQueue::new();
    let worker = tokio::spawn(run_maintenance_worker(
        queue_rx,
        db_pool.clone(),
        config.ranking,
        search_client,
    ));

    let bind_address = format!("{}:{}", config.app.host, config.app.port);
    tracing::info!("Starting HTTP server at {}", bind_address);

    let pool_data = web::Data::new(db_pool.clone());
    let queue_data = web::Data::new(queue.clone());
    let ranking_data = web::Data::new(config.ranking);
    let allowed_origins = config.cors.allowed_origins.clone();

    let server = HttpServer::new(move || {
        let mut cors = Cors::default();
        for origin in allowed_origins.split(',') {
            let origin = origin.trim();
            if origin == "*" {
                cors = cors.allow_any_origin();
            } else {
                cors = cors.allowed_origin(origin);
            }
        }
        cors = cors.allow_any_method().allow_any_header().max_age(3600);

        App::new()
            .app_data(pool_data.clone())
            .app_data(queue_data.clone())
            .app_data(ranking_data.clone())
            .wrap(cors)
            .wrap(Logger::default())
            .wrap(tracing_actix_web::TracingLogger::default())
            .route("/api/v1/health", web::get().to(health_summary))
            .service(
                web::scope("/api/v1")
                    .service(
                        web::scope("/items")
                            .service(
                                web::resource("")
                                    .route(web::get().to(handlers::list_items))
                                    .route(web::post().to(handlers::create_item)),
                            )
                            .service(
                                web::scope("/{id}/comments")
                                    .service(
                                        web::resource("")
                                            .route(web::get().to(handlers::list_comments))
                                            .route(web::post().to(handlers::create_comment)),
                                    )
                                    .service(
                                        web::resource("/{comment_id}")
                                            .route(web::get().to(handlers::get_comment))
                                            .route(web::patch().to(handlers::update_comment))
                                            .route(web::delete().to(handlers::delete_comment)),
                                    )
                                    .route(
                                        "/{comment_id}/subcomments",
                                        web::get().to(handlers::get_sub_comments),
                                    )
                                    .service(
                                        web::resource("/{comment_id}/likes")
                                            .route(web::post().to(handlers::like_comment))
                                            .route(web::delete().to(handlers::unlike_comment)),
                                    ),
                            )
                            .service(
                                web::resource("/{id}")
                                    .route(web::get().to(handlers::get_item))
                                    .route(web::patch().to(handlers::update_item))
                                    .route(web::delete().to(handlers::delete_item)),
                            )
                            .service(
                                web::resource("/{id}/likes")
                                    .route(web::post().to(handlers::like_item))
                                    .route(web::delete().to(handlers::unlike_item)),
                            ),
                    )
                    .service(
                        web::scope("/bookmarks").service(
                            web::resource("")
                                .route(web::get().to(handlers::list_bookmarks))
                                .route(web::post().to(handlers::create_bookmark))
                                .route(web::delete().to(handlers::delete_bookmark)),
                        ),
                    ),
            )
    })
    .bind(&bind_address)?
    .run();

    let result = server.await;

    // The server's queue handles are gone once it stops; dropping the
    // last sender lets the worker drain what is left and exit.
    drop(queue);
    let _ = worker.await;

    tracing::info!("item-service shutting down");
    result
}
