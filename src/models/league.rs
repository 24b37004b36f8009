use serde::{Deserialize, Serialize};

/// League context passed to every refresh operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct League {
    /// Internal store identifier, injected as `league_id` into refresh calls.
    pub id: String,
    /// Identifier of the league at the sports API.
    pub api_id: i64,
    pub name: String,
    pub season: i32,
}
