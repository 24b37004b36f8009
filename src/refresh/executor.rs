use super::{Credentials, RefreshExecutor, build_refresh_url};
use crate::constants::headers;
use crate::error::AppError;
use crate::models::{EndpointDescriptor, League, RefreshResult};
use async_trait::async_trait;
use reqwest::header::{ACCEPT, COOKIE};
use reqwest::{Client, Response};
use serde_json::Value;
use std::time::Instant;
use tracing::{debug, info, instrument, warn};

/// Calls the per-entity refreshers over HTTP (`POST {base_url}/{name}?...&league_id=...`).
#[derive(Debug, Clone)]
pub struct HttpRefreshExecutor {
    client: Client,
    base_url: String,
}

impl HttpRefreshExecutor {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into(),
        }
    }
}

/// Picks the most descriptive message out of a refresher's JSON body.
fn body_message(body: &Value) -> Option<String> {
    ["error", "message", "details"]
        .iter()
        .find_map(|key| match body.get(key) {
            Some(Value::String(s)) if !s.is_empty() => Some(s.clone()),
            _ => None,
        })
}

/// Decides success from the HTTP status and the decoded body.
///
/// A non-2xx status always fails. A 2xx fails only when the body is not JSON or
/// carries `"success": false`; a body without a `success` flag counts as success.
async fn classify_response(response: Response) -> Result<Option<Value>, (String, Option<Value>)> {
    let status = response.status();
    let url = response.url().to_string();
    let text = response
        .text()
        .await
        .map_err(|e| (format!("Failed to read response body: {e}"), None))?;
    let body = serde_json::from_str::<Value>(&text).ok();

    if !status.is_success() {
        let message = body
            .as_ref()
            .and_then(body_message)
            .unwrap_or_else(|| status.canonical_reason().unwrap_or("Unknown error").to_string());
        return Err((format!("HTTP {}: {}", status.as_u16(), message), body));
    }

    let Some(body) = body else {
        let error = if text.trim().is_empty() {
            AppError::api_malformed_json("Response body is empty", url)
        } else {
            AppError::api_malformed_json("Response is not valid JSON", url)
        };
        return Err((error.to_string(), None));
    };

    if matches!(body.get("success"), Some(Value::Bool(false))) {
        let message = body_message(&body).unwrap_or_else(|| "Refresh reported failure".to_string());
        return Err((message, Some(body)));
    }

    Ok(Some(body))
}

fn describe_transport_error(e: reqwest::Error, url: &str) -> String {
    if e.is_timeout() {
        AppError::network_timeout(url).to_string()
    } else if e.is_connect() {
        AppError::network_connection(url, e.to_string()).to_string()
    } else {
        AppError::ApiFetch(e).to_string()
    }
}

#[async_trait]
impl RefreshExecutor for HttpRefreshExecutor {
    #[instrument(skip(self, league, credentials), fields(endpoint = %endpoint, league = %league.id))]
    async fn execute(
        &self,
        endpoint: &EndpointDescriptor,
        league: &League,
        credentials: &Credentials,
    ) -> RefreshResult {
        let started = Instant::now();
        let elapsed = || started.elapsed().as_millis() as u64;

        let url = match build_refresh_url(&self.base_url, endpoint, league) {
            Ok(url) => url,
            Err(e) => return RefreshResult::failed(endpoint, elapsed(), e.to_string(), None),
        };

        debug!("Dispatching refresh call: {url}");
        let mut request = self
            .client
            .post(url.clone())
            .header(ACCEPT, "application/json");
        request = match credentials {
            Credentials::ApiKey(key) => request.header(headers::ADMIN_API_KEY, key),
            Credentials::SessionCookie(cookie) => request.header(COOKIE, cookie),
            Credentials::None => request,
        };

        let outcome = match request.send().await {
            Ok(response) => classify_response(response).await,
            Err(e) => Err((describe_transport_error(e, url.as_str()), None)),
        };

        match outcome {
            Ok(data) => {
                let duration = elapsed();
                info!("Refreshed {} for {} in {}ms", endpoint, league.name, duration);
                RefreshResult::succeeded(endpoint, duration, data)
            }
            Err((error, data)) => {
                let duration = elapsed();
                warn!(
                    "Refresh {} for {} failed after {}ms: {}",
                    endpoint, league.name, duration, error
                );
                RefreshResult::failed(endpoint, duration, error, data)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::http_client::{create_http_client, create_test_http_client};
    use crate::testing_utils::TestDataBuilder;
    use std::time::Duration;
    use wiremock::{
        Mock, MockServer, ResponseTemplate,
        matchers::{header, method, path, query_param},
    };

    fn executor_for(server: &MockServer) -> HttpRefreshExecutor {
        HttpRefreshExecutor::new(
            create_test_http_client(),
            format!("{}/api/admin/refresh", server.uri()),
        )
    }

    async fn run(server: &MockServer, endpoint: &str, credentials: Credentials) -> RefreshResult {
        executor_for(server)
            .execute(
                &TestDataBuilder::endpoint(endpoint),
                &TestDataBuilder::league(),
                &credentials,
            )
            .await
    }

    #[tokio::test]
    async fn test_success_injects_league_and_phase_query() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/refresh/fixtures"))
            .and(query_param("mode", "live"))
            .and(query_param("league_id", TestDataBuilder::LEAGUE_ID))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"success": true, "updated": 4})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = run(&mock_server, "fixtures?mode=live", Credentials::None).await;

        assert!(result.success, "{result:?}");
        assert_eq!(result.endpoint, "fixtures?mode=live");
        assert!(result.error.is_none());
        assert_eq!(result.data.unwrap()["updated"], 4);
    }

    #[tokio::test]
    async fn test_forwards_api_key() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/refresh/standings"))
            .and(header("x-admin-api-key", "s3cret"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = run(&mock_server, "standings", Credentials::ApiKey("s3cret".to_string())).await;
        assert!(result.success, "{result:?}");
    }

    #[tokio::test]
    async fn test_forwards_session_cookie() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/api/admin/refresh/injuries"))
            .and(header("cookie", "admin_session=abc.def"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"success": true})))
            .expect(1)
            .mount(&mock_server)
            .await;

        let result = run(
            &mock_server,
            "injuries",
            Credentials::SessionCookie("admin_session=abc.def".to_string()),
        )
        .await;
        assert!(result.success, "{result:?}");
    }

    #[tokio::test]
    async fn test_missing_success_flag_counts_as_success() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({"updated": 12})))
            .mount(&mock_server)
            .await;

        let result = run(&mock_server, "top-scorers", Credentials::None).await;
        assert!(result.success);
    }

    #[tokio::test]
    async fn test_body_success_false_fails_despite_200() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(
                serde_json::json!({"success": false, "error": "No fixtures returned by API"}),
            ))
            .mount(&mock_server)
            .await;

        let result = run(&mock_server, "fixture-events", Credentials::None).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("No fixtures returned by API"));
        assert!(result.data.is_some());
    }

    #[tokio::test]
    async fn test_http_error_status_fails_even_with_success_true() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(500).set_body_json(serde_json::json!({"success": true})))
            .mount(&mock_server)
            .await;

        let result = run(&mock_server, "odds", Credentials::None).await;
        assert!(!result.success);
        assert_eq!(result.error.as_deref(), Some("HTTP 500: Internal Server Error"));
    }

    #[tokio::test]
    async fn test_http_error_uses_body_message() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(403).set_body_json(serde_json::json!({"error": "Forbidden: admin only"})))
            .mount(&mock_server)
            .await;

        let result = run(&mock_server, "lineups", Credentials::None).await;
        assert_eq!(result.error.as_deref(), Some("HTTP 403: Forbidden: admin only"));
    }

    #[tokio::test]
    async fn test_non_json_body_fails() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>ok</html>"))
            .mount(&mock_server)
            .await;

        let result = run(&mock_server, "predictions", Credentials::None).await;
        assert!(!result.success);
        assert!(result.error.unwrap().contains("not valid JSON"));
    }

    #[tokio::test]
    async fn test_timeout_becomes_failed_result() {
        let mock_server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(serde_json::json!({"success": true}))
                    .set_delay(Duration::from_secs(2)),
            )
            .mount(&mock_server)
            .await;

        let executor = HttpRefreshExecutor::new(
            create_http_client(Duration::from_millis(200)).unwrap(),
            format!("{}/api/admin/refresh", mock_server.uri()),
        );
        let result = executor
            .execute(
                &TestDataBuilder::endpoint("standings"),
                &TestDataBuilder::league(),
                &Credentials::None,
            )
            .await;

        assert!(!result.success);
        assert!(result.error.unwrap().contains("timeout"));
        assert!(result.duration >= 200);
    }

    #[tokio::test]
    async fn test_connection_refused_becomes_failed_result() {
        let executor = HttpRefreshExecutor::new(
            create_test_http_client(),
            "http://127.0.0.1:1/api/admin/refresh",
        );
        let result = executor
            .execute(
                &TestDataBuilder::endpoint("standings"),
                &TestDataBuilder::league(),
                &Credentials::None,
            )
            .await;

        assert!(!result.success);
        assert!(result.error.is_some());
    }
}
