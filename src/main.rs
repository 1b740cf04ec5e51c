use log::{error, info};
use std::net::TcpListener;
use std::sync::Arc;

use king_airlines::config::Config;
use king_airlines::flight_client::UreqFlightClient;
use king_airlines::routes::build_routes;
use king_airlines::scheduler::SessionScheduler;
use king_airlines::session::SessionStore;
use king_airlines::warp_helpers::AppState;

#[global_allocator]
static GLOBAL: mimalloc::MiMalloc = mimalloc::MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    env_logger::init();

    let config = Config::from_env()?;
    let port = config.port;

    info!("Starting King Airlines server on {}:{}", config.host, port);
    info!("Flight offers endpoint: {}", config.flight_offers_url);
    info!(
        "Max offers per search: {}, request timeout: {}s",
        config.max_offers, config.request_timeout_secs
    );

    // Check if port is available BEFORE initializing services
    if !is_port_available(&config) {
        error!(
            "Port {} is already in use. Please stop any existing instance or set KING_AIRLINES_PORT.",
            port
        );
        anyhow::bail!("Port {} is already in use", port);
    }

    let state = initialize_services(&config);

    let routes = build_routes(state);

    info!(
        "Server started successfully, listening on http://localhost:{}",
        port
    );

    warp::serve(routes).run((config.host, port)).await;

    Ok(())
}

fn is_port_available(config: &Config) -> bool {
    TcpListener::bind((config.host, config.port)).is_ok()
}

fn initialize_services(config: &Config) -> AppState {
    let sessions = SessionStore::new(config.session_ttl(), config.session.max_sessions);
    let _scheduler_handle =
        SessionScheduler::new(sessions.clone(), config.session.sweep_interval_minutes).start();

    let flight_client = UreqFlightClient::new(
        config.flight_offers_url.clone(),
        config.request_timeout(),
    );
    info!("Flight offers client initialized");

    AppState {
        sessions,
        flight_client: Arc::new(flight_client),
        max_offers: config.max_offers,
        secure_cookie: config.session.secure_cookie,
    }
}
