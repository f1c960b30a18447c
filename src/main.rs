use std::sync::Arc;
use std::time::Duration;

use actix_web::{web, App, HttpServer};
use tracing::info;
use tracing_subscriber::{
    filter::LevelFilter, layer::SubscriberExt, util::SubscriberInitExt, Layer,
};

mod api;
mod clients;
mod config;
mod db;
mod shutdown;
mod worker;

use crate::api::{
    calendar::{handlers::calendar_config, CalendarSyncEngine},
    email::{handlers::email_config, EmailIngestionPipeline},
    event::{handlers::event_config, EventService},
    health::health_config,
    job::{handlers::job_config, JobService},
    user::handlers::user_config,
    validation,
};
use crate::clients::{ai::OpenAiCompletions, calendar::GoogleCalendar, mail::HttpMailbox};
use crate::shutdown::ShutdownCoordinator;
use crate::worker::InboxSyncWorker;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    // Load configuration from environment; missing external credentials are
    // a startup failure, not a per-request one
    let config = config::Config::from_env().expect("Failed to load configuration");

    // Create logs directory if it doesn't exist
    std::fs::create_dir_all(&config.log_dir).expect("Failed to create logs directory");

    // Initialize file-based logging with daily rotation and level separation
    // Log files will be created as: logs/info.2024-12-22.log, logs/error.2024-12-22.log, etc.
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "info".into());

    // Create daily rotating file appenders for each log level
    let info_file = tracing_appender::rolling::daily(&config.log_dir, "info.log");
    let warn_file = tracing_appender::rolling::daily(&config.log_dir, "warn.log");
    let error_file = tracing_appender::rolling::daily(&config.log_dir, "error.log");

    let info_layer = tracing_subscriber::fmt::layer()
        .with_writer(info_file)
        .with_ansi(false)
        .with_filter(LevelFilter::INFO);

    let warn_layer = tracing_subscriber::fmt::layer()
        .with_writer(warn_file)
        .with_ansi(false)
        .with_filter(LevelFilter::WARN);

    let error_layer = tracing_subscriber::fmt::layer()
        .with_writer(error_file)
        .with_ansi(false)
        .with_filter(LevelFilter::ERROR);

    // Create console/stdout layer for terminal output
    let console_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stdout)
        .with_ansi(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(console_layer)
        .with(info_layer)
        .with(warn_layer)
        .with(error_layer)
        .init();

    info!("Starting job-tracker application");

    // Get database connection pool
    let pool = db::connection::get_connection(&config.database_url, config.max_db_connections)
        .await
        .expect("Failed to connect to database");
    info!("Database connection pool established");

    // Run migrations on startup
    db::migrations::run_migrations(&pool)
        .await
        .expect("Failed to run database migrations");
    info!("Database migrations completed successfully");

    // External collaborators, constructed once and shared
    let mail_transport = Arc::new(HttpMailbox::new(
        config.mail_api_url.clone(),
        config.mail_api_token.clone(),
    ));
    let completion_client = Arc::new(OpenAiCompletions::new(
        config.openai_base_url.clone(),
        config.openai_api_key.clone(),
        config.openai_model.clone(),
    ));
    let calendar_client = Arc::new(GoogleCalendar::new(
        config.calendar_api_url.clone(),
        config.calendar_api_token.clone(),
        config.calendar_id.clone(),
    ));

    // Services are built once and injected; the sync services carry their
    // single-flight gates, so they must be shared across HTTP workers
    let job_service = web::Data::new(JobService::new(pool.clone()));
    let event_service = web::Data::new(EventService::new(pool.clone()));
    let pipeline = Arc::new(EmailIngestionPipeline::new(
        pool.clone(),
        mail_transport,
        completion_client,
    ));
    let pipeline_data = web::Data::from(pipeline.clone());
    let sync_engine = web::Data::new(CalendarSyncEngine::new(
        pool.clone(),
        calendar_client,
        config.calendar_time_zone.clone(),
    ));

    // Create shutdown channel for graceful shutdown
    // watch channel allows multiple receivers to get the same value
    let (shutdown_tx, shutdown_rx) = tokio::sync::watch::channel(false);

    // Optional periodic inbox sync
    let mut worker_handles = Vec::new();
    if config.inbox_sync_interval_secs > 0 {
        let worker = InboxSyncWorker::new(
            pipeline.clone(),
            Duration::from_secs(config.inbox_sync_interval_secs),
        );
        let worker_shutdown_rx = shutdown_rx.clone();
        worker_handles.push(tokio::spawn(async move {
            worker.run(worker_shutdown_rx).await;
        }));
        info!(
            "Spawned inbox sync worker (every {}s)",
            config.inbox_sync_interval_secs
        );
    }

    // Clone pool for HTTP server (original will be used for shutdown)
    let server_pool = pool.clone();
    let max_payload_size = config.max_payload_size;

    let server = HttpServer::new(move || {
        // Configure payload size limits globally
        let payload_config = web::PayloadConfig::default().limit(max_payload_size);

        App::new()
            .app_data(web::Data::new(server_pool.clone())) // Share DB pool across workers
            .app_data(job_service.clone())
            .app_data(event_service.clone())
            .app_data(pipeline_data.clone())
            .app_data(sync_engine.clone())
            .app_data(payload_config)
            .app_data(validation::json_config()) // Global validation config
            .configure(health_config) // Health check endpoints
            .service(
                web::scope("/api")
                    .configure(job_config)
                    .configure(event_config)
                    .configure(email_config)
                    .configure(calendar_config)
                    .configure(user_config),
            )
    });

    info!(
        "Server starting on http://{}:{}",
        config.host, config.port
    );

    // Bind and start the server
    let server = server.bind((config.host.as_str(), config.port))?.run();

    // Get server handle for graceful shutdown
    let server_handle = server.handle();

    // Spawn server in background
    let server_task = tokio::spawn(server);

    // Create shutdown coordinator and wait for shutdown signal
    let coordinator = ShutdownCoordinator::new(
        server_handle,
        server_task,
        worker_handles,
        shutdown_tx,
        pool,
    );

    coordinator.wait_for_shutdown().await
}
