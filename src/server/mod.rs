//! HTTP surface: admin orchestrator routes, manual retry and health.

mod handlers;

use crate::auth::AdminGuard;
use crate::error::AppError;
use crate::models::Phase;
use crate::orchestrator::PhaseOrchestrator;
use crate::refresh::Credentials;
use axum::extract::{ConnectInfo, Request, State};
use axum::http::{HeaderMap, HeaderValue, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::get;
use axum::{Json, Router};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{debug, error, info};

pub const ORCHESTRATOR_PATH: &str = "/api/admin/phase-orchestrator";
pub const RETRY_PATH: &str = "/api/admin/phase-orchestrator/retry";
pub const HEALTH_PATH: &str = "/health";

#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<PhaseOrchestrator>,
    pub guard: Arc<AdminGuard>,
}

impl AppState {
    pub fn new(orchestrator: PhaseOrchestrator, guard: AdminGuard) -> Self {
        Self {
            orchestrator: Arc::new(orchestrator),
            guard: Arc::new(guard),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status_code()).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        if status.is_server_error() {
            error!("Request failed: {}", self);
        } else if self.is_not_found() {
            debug!("Request for missing resource: {}", self);
        }

        let mut body = serde_json::json!({
            "success": false,
            "error": self.to_string(),
            "retryable": self.is_retryable(),
        });
        if matches!(self, AppError::InvalidPhase { .. }) {
            body["valid_phases"] = serde_json::json!(Phase::valid_names());
        }

        let mut response = (status, Json(body)).into_response();
        if let AppError::TooManyAttempts {
            retry_after_seconds,
        } = self
            && let Ok(value) = HeaderValue::from_str(&retry_after_seconds.to_string())
        {
            response.headers_mut().insert(header::RETRY_AFTER, value);
        }
        response
    }
}

/// Identity used for failed-attempt accounting: the peer address, else the first
/// forwarded-for hop, else a shared bucket.
fn client_identity(request: &Request) -> String {
    if let Some(ConnectInfo(addr)) = request.extensions().get::<ConnectInfo<SocketAddr>>() {
        return addr.ip().to_string();
    }
    forwarded_for(request.headers()).unwrap_or_else(|| "unknown".to_string())
}

fn forwarded_for(headers: &HeaderMap) -> Option<String> {
    headers
        .get("x-forwarded-for")?
        .to_str()
        .ok()?
        .split(',')
        .next()
        .map(|hop| hop.trim().to_string())
        .filter(|hop| !hop.is_empty())
}

/// Rejects non-admin requests; admin requests carry their [`Credentials`] onward as an extension.
async fn require_admin(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let client = client_identity(&request);
    let credentials: Credentials = state.guard.authorize(&client, request.headers()).await?;
    request.extensions_mut().insert(credentials);
    Ok(next.run(request).await)
}

pub fn router(state: AppState) -> Router {
    let admin = Router::new()
        .route(
            ORCHESTRATOR_PATH,
            get(handlers::inspect_phase).post(handlers::run_orchestration),
        )
        .route(RETRY_PATH, axum::routing::post(handlers::retry_endpoint))
        .route_layer(middleware::from_fn_with_state(state.clone(), require_admin));

    Router::new()
        .route(HEALTH_PATH, get(handlers::health))
        .merge(admin)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Binds and serves until Ctrl-C.
pub async fn serve(bind_address: &str, state: AppState) -> Result<(), AppError> {
    let listener = tokio::net::TcpListener::bind(bind_address).await?;
    info!("Phase orchestrator listening on http://{}", listener.local_addr()?);

    axum::serve(
        listener,
        router(state).into_make_service_with_connect_info::<SocketAddr>(),
    )
    .with_graceful_shutdown(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Shutdown signal received");
        }
    })
    .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    #[test]
    fn test_forwarded_for_takes_first_hop() {
        let mut headers = HeaderMap::new();
        headers.insert(
            "x-forwarded-for",
            HeaderValue::from_static("203.0.113.7, 10.0.0.1"),
        );
        assert_eq!(forwarded_for(&headers).as_deref(), Some("203.0.113.7"));
        assert_eq!(forwarded_for(&HeaderMap::new()), None);
    }

    #[test]
    fn test_client_identity_prefers_peer_address() {
        let mut request = Request::builder()
            .header("x-forwarded-for", "203.0.113.7")
            .body(Body::empty())
            .unwrap();
        assert_eq!(client_identity(&request), "203.0.113.7");

        request
            .extensions_mut()
            .insert(ConnectInfo(SocketAddr::from(([192, 0, 2, 1], 5000))));
        assert_eq!(client_identity(&request), "192.0.2.1");
    }

    #[tokio::test]
    async fn test_error_response_shape() {
        let response = AppError::invalid_phase("halftime").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], false);
        assert_eq!(json["valid_phases"].as_array().unwrap().len(), 4);

        let response = AppError::TooManyAttempts {
            retry_after_seconds: 30,
        }
        .into_response();
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()[header::RETRY_AFTER], "30");
    }
}
