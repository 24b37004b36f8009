//! URL building for refresh endpoints

use crate::error::AppError;
use crate::models::{EndpointDescriptor, League};
use reqwest::Url;

/// Builds the URL of one refresh call.
///
/// The phase-supplied query parameters are kept in order and the league's internal
/// id is appended as `league_id`, replacing any `league_id` the descriptor carried.
///
/// # Example
/// ```
/// use matchday_sync::models::{EndpointDescriptor, League};
/// use matchday_sync::refresh::build_refresh_url;
///
/// let league = League { id: "abc".into(), api_id: 39, name: "Premier League".into(), season: 2024 };
/// let endpoint: EndpointDescriptor = "fixtures?mode=live".parse().unwrap();
/// let url = build_refresh_url("http://localhost:3000/api/admin/refresh", &endpoint, &league).unwrap();
/// assert_eq!(url.as_str(), "http://localhost:3000/api/admin/refresh/fixtures?mode=live&league_id=abc");
/// ```
pub fn build_refresh_url(
    base_url: &str,
    endpoint: &EndpointDescriptor,
    league: &League,
) -> Result<Url, AppError> {
    let raw = format!("{}/{}", base_url.trim_end_matches('/'), endpoint.name());
    let mut url = Url::parse(&raw)
        .map_err(|e| AppError::config_error(format!("Invalid refresh URL '{raw}': {e}")))?;

    {
        let mut pairs = url.query_pairs_mut();
        for (key, value) in endpoint.query_pairs() {
            if key != "league_id" {
                pairs.append_pair(&key, &value);
            }
        }
        pairs.append_pair("league_id", &league.id);
    }

    Ok(url)
}
