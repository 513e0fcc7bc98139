//! IoT Monitoring Dashboard Binary

use actix_web::{App, HttpServer, middleware, web};
use clap::Parser;
use iot_dashboard::config::DEFAULT_CONFIG_PATH;
use iot_dashboard::{AppState, Settings, controllers};
use std::path::PathBuf;
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Debug, Parser)]
#[command(version, about = "Web dashboard for the IoT simulator, analytics engine and controller")]
struct Args {
    /// Path to the YAML configuration file
    #[arg(long, env = "DASHBOARD_CONFIG", default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    /// Address to listen on
    #[arg(long, env = "DASHBOARD_HOST", default_value = "0.0.0.0")]
    host: String,

    /// Port to listen on
    #[arg(long, env = "DASHBOARD_PORT", default_value_t = 8501)]
    port: u16,
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    let args = Args::parse();

    // Initialize tracing
    initialize_tracing();

    info!("Starting IoT Dashboard v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration
    let settings = Settings::load(&args.config);
    if let Err(e) = settings.validate() {
        warn!("Configuration validation failed, calls may not succeed: {}", e);
    }

    info!(
        "Dashboard configuration - Mock mode: {}, Simulator: {}, Analytics: {}, Controller: {}, Database: {}",
        settings.mock_mode,
        settings.simulator_url,
        settings.analytics_url,
        settings.controller_url,
        settings.mongo_database
    );

    let state = match AppState::from_settings(settings) {
        Ok(state) => web::Data::new(state),
        Err(e) => {
            error!("Failed to initialize dashboard: {}", e);
            std::process::exit(1);
        }
    };

    info!("Server is live at http://{}:{}", args.host, args.port);

    HttpServer::new(move || {
        App::new()
            .app_data(state.clone())
            .wrap(middleware::Logger::default())
            .configure(controllers::configure)
    })
    .bind((args.host.as_str(), args.port))?
    .run()
    .await
}

/// Initialize structured logging
fn initialize_tracing() {
    let log_level = std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string());

    let filter_layer = tracing_subscriber::EnvFilter::try_from_default_env()
        .or_else(|_| tracing_subscriber::EnvFilter::try_new(&log_level))
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter_layer);

    if std::env::var("LOG_FORMAT").is_ok_and(|f| f.eq_ignore_ascii_case("pretty")) {
        registry.with(tracing_subscriber::fmt::layer().with_target(false)).init();
    } else {
        let fmt_layer = tracing_subscriber::fmt::layer()
            .with_target(false)
            .with_thread_ids(false)
            .with_thread_names(false)
            .with_file(false)
            .with_line_number(false)
            .json();
        registry.with(fmt_layer).init();
    }
}
