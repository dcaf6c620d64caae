//! Tally Web Server
//!
//! Axum-based Telegram webhook endpoint for the Tally expense bot.
//!
//! Inbound updates are handed to the conversation layer and the replies are
//! delivered through a `Messenger`. When a webhook secret is configured every
//! update must carry it in `X-Telegram-Bot-Api-Secret-Token`.

use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Request, State},
    http::StatusCode,
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use tally_core::{Conversation, Messenger};

mod handlers;

/// Maximum accepted update size (1 MB)
pub const MAX_UPDATE_SIZE: usize = 1024 * 1024;

/// Header Telegram uses to echo the secret token given to `setWebhook`
pub const SECRET_TOKEN_HEADER: &str = "x-telegram-bot-api-secret-token";

/// Server configuration
#[derive(Clone, Default)]
pub struct ServerConfig {
    /// Shared secret expected on every webhook call (None = not checked)
    pub webhook_secret: Option<String>,
}

/// Shared application state
pub struct AppState {
    pub conversation: Conversation,
    pub messenger: Arc<dyn Messenger>,
    pub config: ServerConfig,
}

/// Rejects webhook calls that don't carry the configured secret token
async fn secret_token_middleware(
    State(state): State<Arc<AppState>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(expected) = state.config.webhook_secret.as_deref() else {
        return next.run(request).await;
    };

    let provided = request
        .headers()
        .get(SECRET_TOKEN_HEADER)
        .and_then(|v| v.to_str().ok());

    if provided
        .map(|token| validate_secret_token(token, expected))
        .unwrap_or(false)
    {
        return next.run(request).await;
    }

    warn!(path = %request.uri().path(), "Rejected webhook call without a valid secret token");
    (
        StatusCode::UNAUTHORIZED,
        Json(serde_json::json!({
            "error": "Invalid secret token"
        })),
    )
        .into_response()
}

/// Compare secret tokens in constant time
fn validate_secret_token(provided: &str, expected: &str) -> bool {
    use subtle::ConstantTimeEq;

    let provided_bytes = provided.as_bytes();
    let expected_bytes = expected.as_bytes();
    // Only compare if lengths match (constant-time for same-length tokens)
    provided_bytes.len() == expected_bytes.len() && provided_bytes.ct_eq(expected_bytes).into()
}

/// Create the application router
pub fn create_router(
    conversation: Conversation,
    messenger: Arc<dyn Messenger>,
    config: ServerConfig,
) -> Router {
    if config.webhook_secret.is_none() {
        info!("No webhook secret configured; accepting unauthenticated updates");
    }

    let state = Arc::new(AppState {
        conversation,
        messenger,
        config,
    });

    let webhook_routes = Router::new()
        .route("/webhook", post(handlers::receive_update))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            secret_token_middleware,
        ));

    Router::new()
        .nest("/api", webhook_routes)
        .route("/health", get(handlers::health))
        .with_state(state)
        .layer(DefaultBodyLimit::max(MAX_UPDATE_SIZE))
        .layer(TraceLayer::new_for_http())
}

/// Start the server
pub async fn serve(
    conversation: Conversation,
    messenger: Arc<dyn Messenger>,
    host: &str,
    port: u16,
) -> anyhow::Result<()> {
    serve_with_config(conversation, messenger, host, port, ServerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    conversation: Conversation,
    messenger: Arc<dyn Messenger>,
    host: &str,
    port: u16,
    config: ServerConfig,
) -> anyhow::Result<()> {
    info!(
        data_dir = %conversation.store().data_dir().display(),
        prompt_timeout_secs = conversation.pending().timeout().as_secs(),
        "Conversation ready"
    );

    let app = create_router(conversation, messenger, config);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// ============================================================================
// Error Handling
// ============================================================================

/// Handler error with a sanitized client message
pub struct AppError {
    status: StatusCode,
    message: String,
    internal: Option<anyhow::Error>,
}

impl AppError {
    pub fn bad_request(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            message: msg.to_string(),
            internal: None,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log the full internal error if present
        if let Some(err) = &self.internal {
            error!(error = %err, "Internal error");
        }

        let body = Json(serde_json::json!({
            "error": self.message
        }));

        (self.status, body).into_response()
    }
}

impl<E> From<E> for AppError
where
    E: Into<anyhow::Error>,
{
    fn from(err: E) -> Self {
        let err = err.into();
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
