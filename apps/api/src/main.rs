use std::net::SocketAddr;
use std::sync::Arc;

use dotenv::dotenv;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::{self, TraceLayer};
use tracing::{info, warn, Level};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod router;

use shared_config::AppConfig;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Loading Env Vars
    dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info,tower_http=debug".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Synaptix Health API server");

    let config = AppConfig::from_env();
    log_service_status(&config);
    let port = config.port;

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let state = Arc::new(config);

    let app = router::create_router(state)
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(trace::DefaultMakeSpan::new().level(Level::INFO))
                .on_response(trace::DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(cors);

    let addr = SocketAddr::from(([0, 0, 0, 0], port));
    info!("Listening on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Which upstreams have credentials.
fn log_service_status(config: &AppConfig) {
    let status = |ready: bool| if ready { "configured" } else { "missing credentials" };

    info!(
        "Document store at {}: {}",
        config.database_url,
        status(config.is_configured())
    );
    info!(
        "Gemini ({} chat, {} vision): {}",
        config.gemini_chat_model,
        config.gemini_vision_model,
        status(config.is_ai_configured())
    );
    info!(
        "Image classifier: {}",
        status(!config.huggingface_api_key.is_empty())
    );
    info!("Clinic search via {}", config.overpass_url);
    info!("Sessions last {} hours", config.session_ttl_hours);

    if !config.secure_cookies {
        warn!("SECURE_COOKIES is off, session cookies will be sent over plain HTTP");
    }
}
