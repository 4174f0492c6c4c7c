//! gemini-chat - single-session chat service backed by Google Gemini
//!
//! Holds one transcript in memory, forwards each user turn with the full
//! history to the `generateContent` API, and serves the result over HTTP.

mod api;
mod config;
mod llm;
mod session;

use api::{create_router, AppState};
use config::ChatConfig;
use llm::{GeminiService, LlmService, LoggingService};
use session::ChatSession;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{
    cors::{Any, CorsLayer},
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "gemini_chat=info,tower_http=debug".into()),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .json()
                .with_current_span(false)
                .with_span_list(false),
        )
        .init();

    let config = ChatConfig::from_env()?;

    let gemini = GeminiService::new(
        config.api_key.clone(),
        config.model.clone(),
        &config.base_url,
        config.timeout,
    )?;
    let llm: Arc<dyn LlmService> = Arc::new(LoggingService::new(Arc::new(gemini)));
    tracing::info!(
        model = %llm.model_id(),
        base_url = %config.base_url,
        timeout_secs = config.timeout.as_secs(),
        "Completion provider configured"
    );

    let session = Arc::new(ChatSession::new(llm, config.greeting.as_deref()));
    let state = AppState::new(Arc::clone(&session));

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let app = create_router(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http());

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    tracing::info!("gemini-chat listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(
        messages = session.snapshot().len(),
        busy = session.is_busy(),
        "Session ended"
    );
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
        std::future::pending::<()>().await;
    }
}
