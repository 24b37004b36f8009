use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Short status code of a fixture as reported by the sports API.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FixtureStatus {
    /// `TBD`, `NS`
    NotStarted(String),
    /// `1H`, `HT`, `2H`, `ET`, `BT`, `P`, `SUSP`, `INT`, `LIVE`
    InPlay(String),
    /// `FT`, `AET`, `PEN`
    Finished(String),
    /// `PST`, `CANC`, `ABD`, `AWD`, `WO`
    Postponed(String),
    Other(String),
}

/// Codes that make a league count as live.
pub const LIVE_STATUS_CODES: [&str; 6] = ["1H", "2H", "HT", "ET", "BT", "P"];

impl FixtureStatus {
    pub fn code(&self) -> &str {
        match self {
            FixtureStatus::NotStarted(code)
            | FixtureStatus::InPlay(code)
            | FixtureStatus::Finished(code)
            | FixtureStatus::Postponed(code)
            | FixtureStatus::Other(code) => code,
        }
    }

    pub fn is_not_started(&self) -> bool {
        matches!(self, FixtureStatus::NotStarted(_))
    }

    /// In-play codes that drive the live phase. Suspended and interrupted
    /// matches are in play but do not count.
    pub fn is_live(&self) -> bool {
        LIVE_STATUS_CODES.contains(&self.code())
    }

    pub fn is_finished(&self) -> bool {
        matches!(self, FixtureStatus::Finished(_))
    }
}

impl From<&str> for FixtureStatus {
    fn from(raw: &str) -> Self {
        let code = raw.trim().to_ascii_uppercase();
        match code.as_str() {
            "TBD" | "NS" => FixtureStatus::NotStarted(code),
            "1H" | "HT" | "2H" | "ET" | "BT" | "P" | "SUSP" | "INT" | "LIVE" => {
                FixtureStatus::InPlay(code)
            }
            "FT" | "AET" | "PEN" => FixtureStatus::Finished(code),
            "PST" | "CANC" | "ABD" | "AWD" | "WO" => FixtureStatus::Postponed(code),
            _ => FixtureStatus::Other(code),
        }
    }
}

impl From<String> for FixtureStatus {
    fn from(raw: String) -> Self {
        FixtureStatus::from(raw.as_str())
    }
}

impl From<FixtureStatus> for String {
    fn from(status: FixtureStatus) -> Self {
        status.code().to_string()
    }
}

/// A fixture row as stored by the fixtures refresher.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Fixture {
    pub api_id: i64,
    pub league_id: String,
    pub date: DateTime<Utc>,
    #[serde(alias = "status_short")]
    pub status: FixtureStatus,
}
