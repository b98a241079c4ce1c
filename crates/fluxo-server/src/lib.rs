//! Fluxo Web Server
//!
//! Axum-based REST API for the Fluxo personal cash-flow ledger.
//!
//! Security features:
//! - Owner resolution from the upstream proxy header (secure by default, use --no-auth for local dev)
//! - Restrictive CORS policy
//! - Input validation (pagination limits, date formats)
//! - Sanitized error responses

use std::sync::Arc;

use axum::{
    extract::{Request, State},
    http::{header, HeaderValue, Method, StatusCode},
    middleware::{self, Next},
    response::{IntoResponse, Response},
    routing::{get, post, put},
    Json, Router,
};
use serde::Serialize;
use tower_http::{cors::CorsLayer, set_header::SetResponseHeaderLayer, trace::TraceLayer};
use tracing::{error, info, warn};

use fluxo_core::ai::{AIClient, TextGenerator};
use fluxo_core::db::Database;
use fluxo_core::email::{EmailClient, EmailSender};
use fluxo_core::LedgerConfig;

mod handlers;
mod scheduler;

pub use scheduler::{run_sweep, start_recurring_scheduler};

/// Maximum pagination limit
pub const MAX_PAGE_LIMIT: i64 = 1000;

/// Header carrying the authenticated owner id, set by the upstream proxy
pub const OWNER_HEADER: &str = "x-fluxo-owner";

/// Owner used when authentication is disabled
pub const LOCAL_OWNER: &str = "local";

/// Server configuration
#[derive(Clone)]
pub struct ServerConfig {
    /// Whether an owner header is required (secure by default)
    pub require_auth: bool,
    /// Allowed CORS origins (empty = same-origin only)
    pub allowed_origins: Vec<String>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            require_auth: true,
            allowed_origins: vec![],
        }
    }
}

/// Shared application state
pub struct AppState {
    pub db: Database,
    pub config: ServerConfig,
    pub ledger: LedgerConfig,
    pub ai: Option<AIClient>,
    pub email: Option<EmailClient>,
}

/// Owner of the current request, resolved by `owner_middleware`
#[derive(Debug, Clone)]
pub struct Owner(pub String);

/// Resolve the request owner and attach it as an extension
///
/// The proxy in front of the server authenticates the user and forwards the
/// owner id in `x-fluxo-owner`. With auth disabled every request belongs to
/// `local` unless the header says otherwise.
async fn owner_middleware(
    State(state): State<Arc<AppState>>,
    mut request: Request,
    next: Next,
) -> Response {
    let header_owner = request
        .headers()
        .get(OWNER_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string);

    let owner = match header_owner {
        Some(owner) => owner,
        None if !state.config.require_auth => LOCAL_OWNER.to_string(),
        None => {
            warn!(path = %request.uri().path(), "Request without owner header");
            return (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Authentication required" })),
            )
                .into_response();
        }
    };

    request.extensions_mut().insert(Owner(owner));
    next.run(request).await
}

/// Parse a comma-separated origin list (e.g. from `FLUXO_CORS_ORIGINS`)
pub fn parse_origins(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim())
        .filter(|s| !s.is_empty() && *s != "*")
        .map(str::to_string)
        .collect()
}

/// Success response
#[derive(Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

/// Create the application router with collaborators configured from the environment
pub fn create_router(db: Database, config: ServerConfig, ledger: LedgerConfig) -> Router {
    let ai = AIClient::from_env();
    match ai {
        Some(ref client) => info!(host = client.host(), model = client.model(), "Text generator configured"),
        None => info!("Text generator not configured (set OLLAMA_HOST to enable tips)"),
    }

    let email = EmailClient::from_env();
    match email {
        Some(ref client) => info!(backend = client.name(), "Email delivery configured"),
        None => info!("Email delivery not configured (set RESEND_API_KEY to enable reminders)"),
    }

    create_router_with_options(db, config, ledger, ai, email)
}

/// Create the application router with explicit collaborators
pub fn create_router_with_options(
    db: Database,
    config: ServerConfig,
    ledger: LedgerConfig,
    ai: Option<AIClient>,
    email: Option<EmailClient>,
) -> Router {
    let state = Arc::new(AppState {
        db,
        config: config.clone(),
        ledger,
        ai,
        email,
    });

    let api_routes = Router::new()
        .route("/", get(handlers::root))
        // Transactions
        .route(
            "/transactions",
            get(handlers::list_transactions)
                .post(handlers::create_transaction)
                .delete(handlers::bulk_delete_transactions),
        )
        .route(
            "/transactions/:id",
            get(handlers::get_transaction)
                .put(handlers::update_transaction)
                .delete(handlers::delete_transaction),
        )
        .route("/categories", get(handlers::list_categories))
        // Statistics
        .route("/stats/comparison", get(handlers::get_comparison))
        .route("/stats/:period", get(handlers::get_period_stats))
        .route("/categories/stats", get(handlers::get_category_stats))
        // Budgets
        .route(
            "/budgets",
            get(handlers::list_budgets).post(handlers::create_budget),
        )
        .route(
            "/budgets/:id",
            put(handlers::update_budget).delete(handlers::delete_budget),
        )
        // Recurring definitions
        .route(
            "/recurring",
            get(handlers::list_recurring).post(handlers::create_recurring),
        )
        .route("/recurring/:id", get(handlers::get_recurring))
        .route("/recurring/:id/cancel", post(handlers::cancel_recurring))
        .route(
            "/recurring/:id/materialize",
            post(handlers::materialize_recurring),
        )
        // Templates
        .route(
            "/templates",
            get(handlers::list_templates).post(handlers::create_template),
        )
        .route(
            "/templates/:id",
            axum::routing::delete(handlers::delete_template),
        )
        // Tips
        .route("/tips", post(handlers::generate_tips))
        // Reminders and alerts
        .route("/reminders", get(handlers::list_reminders))
        .route("/reminders/send", post(handlers::send_reminders))
        .route("/send-reminder", post(handlers::send_reminder_email))
        .route("/alerts/upcoming", get(handlers::list_upcoming))
        // Export
        .route("/export/transactions", get(handlers::export_transactions))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            owner_middleware,
        ));

    // Build CORS layer
    let methods = [
        Method::GET,
        Method::POST,
        Method::PUT,
        Method::DELETE,
        Method::OPTIONS,
    ];
    let allowed_headers = [
        header::CONTENT_TYPE,
        header::AUTHORIZATION,
        header::HeaderName::from_static(OWNER_HEADER),
    ];
    let cors = if config.allowed_origins.is_empty() {
        // Restrictive default: only allow same-origin
        CorsLayer::new()
            .allow_methods(methods)
            .allow_headers(allowed_headers)
    } else {
        let origins: Vec<HeaderValue> = config
            .allowed_origins
            .iter()
            .filter_map(|o| o.parse().ok())
            .collect();
        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods(methods)
            .allow_headers(allowed_headers)
    };

    Router::new()
        .nest("/api", api_routes)
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        // Security headers
        .layer(SetResponseHeaderLayer::overriding(
            header::X_CONTENT_TYPE_OPTIONS,
            HeaderValue::from_static("nosniff"),
        ))
        .layer(SetResponseHeaderLayer::overriding(
            header::X_FRAME_OPTIONS,
            HeaderValue::from_static("DENY"),
        ))
}

/// Start the server
pub async fn serve(db: Database, host: &str, port: u16) -> anyhow::Result<()> {
    serve_with_config(db, host, port, ServerConfig::default(), LedgerConfig::default()).await
}

/// Start the server with custom configuration
pub async fn serve_with_config(
    db: Database,
    host: &str,
    port: u16,
    config: ServerConfig,
    ledger: LedgerConfig,
) -> anyhow::Result<()> {
    if !config.require_auth {
        warn!("Authentication disabled, all requests act as '{}'", LOCAL_OWNER);
    }

    // Catch up on occurrences that fell due while the server was down
    match run_sweep(&db, &ledger, chrono::Utc::now().date_naive()) {
        Ok(summary) if summary.created > 0 => {
            info!(created = summary.created, "Materialized missed recurring occurrences");
        }
        Ok(_) => {}
        Err(e) => warn!(error = %e, "Startup recurring sweep failed"),
    }

    check_ai_connection().await;

    start_recurring_scheduler(db.clone(), ledger.clone());

    let app = create_router(db, config, ledger);
    let addr = format!("{}:{}", host, port);

    info!("Starting server at http://{}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Check and log text generator connection status
async fn check_ai_connection() {
    match AIClient::from_env() {
        Some(client) => {
            if client.health_check().await {
                info!(host = client.host(), model = client.model(), "Text generator connected");
            } else {
                warn!(host = client.host(), "Text generator configured but not responding");
            }
        }
        None => {
            info!("Text generator not configured, tips will use the fallback message");
        }
    }
}

// ============================================================================
// Error Handling
// ============================================================================

/// Application error type with proper HTTP status codes
#[derive(Debug)]
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

    pub fn not_found(msg: &str) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn bad_gateway(msg: &str) -> Self {
        Self {
            status: StatusCode::BAD_GATEWAY,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn internal(msg: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: msg.to_string(),
            internal: None,
        }
    }

    pub fn status(&self) -> StatusCode {
        self.status
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

        // Domain errors carry their own status; everything else is opaque
        match err.downcast_ref::<fluxo_core::Error>() {
            Some(fluxo_core::Error::NotFound(msg)) => return Self::not_found(msg),
            Some(fluxo_core::Error::InvalidInput(msg)) => return Self::bad_request(msg),
            Some(fluxo_core::Error::DependencyFailure(msg)) => {
                warn!(error = %msg, "External dependency failed");
                return Self::bad_gateway(msg);
            }
            _ => {}
        }

        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            // Return generic message to client
            message: "An internal error occurred".to_string(),
            // Keep full error for logging
            internal: Some(err),
        }
    }
}
