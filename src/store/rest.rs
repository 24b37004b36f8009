//! PostgREST-style store client (`/rest/v1/<table>` with `apikey` auth).

use super::FixtureStore;
use crate::error::AppError;
use crate::models::{Fixture, League};
use async_trait::async_trait;
use chrono::{DateTime, SecondsFormat, Utc};
use reqwest::Client;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error, instrument, warn};

pub struct RestStore {
    client: Client,
    base_url: String,
    api_key: String,
}

impl RestStore {
    pub fn new(client: Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            api_key: api_key.into(),
        }
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{table}", self.base_url)
    }

    /// Fetches rows from one table, mapping HTTP and body failures to [`AppError`].
    #[instrument(skip(self, query))]
    async fn fetch_rows(&self, table: &str, query: &[(&str, String)]) -> Result<Vec<Value>, AppError> {
        let url = self.table_url(table);
        debug!("Querying store table {table}: {query:?}");

        let response = self
            .client
            .get(&url)
            .query(query)
            .header("apikey", &self.api_key)
            .bearer_auth(&self.api_key)
            .send()
            .await
            .map_err(|e| {
                error!("Store request failed for URL {}: {}", url, e);
                if e.is_timeout() {
                    AppError::network_timeout(&url)
                } else if e.is_connect() {
                    AppError::network_connection(&url, e.to_string())
                } else {
                    AppError::ApiFetch(e)
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let status_code = status.as_u16();
            let reason = status.canonical_reason().unwrap_or("Unknown error");
            error!("HTTP {} - {} (URL: {})", status_code, reason, url);

            return Err(match status_code {
                404 => AppError::api_not_found(url),
                429 => AppError::api_rate_limit(reason, url),
                400..=499 => AppError::api_client_error(status_code, reason, url),
                _ => AppError::api_server_error(status_code, reason, url),
            });
        }

        let response_text = response.text().await?;
        match serde_json::from_str::<Vec<Value>>(&response_text) {
            Ok(rows) => Ok(rows),
            Err(e) => {
                if response_text.trim_start().starts_with('[')
                    || response_text.trim_start().starts_with('{')
                {
                    Err(AppError::api_unexpected_structure(e.to_string(), url))
                } else {
                    Err(AppError::api_malformed_json(
                        "Response is not valid JSON",
                        url,
                    ))
                }
            }
        }
    }
}

/// Decodes rows one by one, dropping rows that do not match `T`.
fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Vec<T> {
    rows.into_iter()
        .filter_map(|row| match serde_json::from_value::<T>(row) {
            Ok(parsed) => Some(parsed),
            Err(e) => {
                warn!("Skipping malformed {table} row: {e}");
                None
            }
        })
        .collect()
}

#[async_trait]
impl FixtureStore for RestStore {
    async fn league(&self, league_id: &str) -> Result<Option<League>, AppError> {
        let rows = self
            .fetch_rows(
                "leagues",
                &[
                    ("select", "id,api_id,name,season".to_string()),
                    ("id", format!("eq.{league_id}")),
                    ("limit", "1".to_string()),
                ],
            )
            .await?;
        Ok(decode_rows::<League>("leagues", rows).into_iter().next())
    }

    async fn fixtures_between(
        &self,
        league_id: &str,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> Result<Vec<Fixture>, AppError> {
        let rows = self
            .fetch_rows(
                "fixtures",
                &[
                    ("select", "api_id,league_id,date,status_short".to_string()),
                    ("league_id", format!("eq.{league_id}")),
                    (
                        "date",
                        format!("gte.{}", from.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    ),
                    (
                        "date",
                        format!("lte.{}", to.to_rfc3339_opts(SecondsFormat::Secs, true)),
                    ),
                    ("order", "date.asc".to_string()),
                ],
            )
            .await?;
        Ok(decode_rows("fixtures", rows))
    }
}
