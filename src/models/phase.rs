use crate::error::AppError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Where a league currently sits in its fixture cycle.
///
/// Every orchestration run resolves exactly one of these, either from an explicit
/// override or from [`crate::phase::detect_phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    PreMatch,
    Imminent,
    Live,
    PostMatch,
}

impl Phase {
    pub const ALL: [Phase; 4] = [
        Phase::PreMatch,
        Phase::Imminent,
        Phase::Live,
        Phase::PostMatch,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::PreMatch => "pre-match",
            Phase::Imminent => "imminent",
            Phase::Live => "live",
            Phase::PostMatch => "post-match",
        }
    }

    pub fn valid_names() -> Vec<&'static str> {
        Self::ALL.iter().map(Phase::as_str).collect()
    }
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Phase {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pre-match" => Ok(Phase::PreMatch),
            "imminent" => Ok(Phase::Imminent),
            "live" => Ok(Phase::Live),
            "post-match" => Ok(Phase::PostMatch),
            _ => Err(AppError::invalid_phase(s)),
        }
    }
}

/// Finer-grained state produced by the detector before it is folded into a [`Phase`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SubState {
    MatchdayMorning,
    DayBefore,
    Imminent,
    Live,
    PostMatch,
    DayAfter,
}

impl SubState {
    pub const ALL: [SubState; 6] = [
        SubState::MatchdayMorning,
        SubState::DayBefore,
        SubState::Imminent,
        SubState::Live,
        SubState::PostMatch,
        SubState::DayAfter,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SubState::MatchdayMorning => "matchday-morning",
            SubState::DayBefore => "day-before",
            SubState::Imminent => "imminent",
            SubState::Live => "live",
            SubState::PostMatch => "post-match",
            SubState::DayAfter => "day-after",
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            SubState::MatchdayMorning | SubState::DayBefore => Phase::PreMatch,
            SubState::Imminent => Phase::Imminent,
            SubState::Live => Phase::Live,
            SubState::PostMatch | SubState::DayAfter => Phase::PostMatch,
        }
    }

    pub fn parse(s: &str) -> Option<SubState> {
        Self::ALL.into_iter().find(|state| state.as_str() == s)
    }
}

impl fmt::Display for SubState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Folds a raw sub-state name into an orchestratable phase.
/// Unrecognized names fold to [`Phase::PreMatch`].
pub fn fold_sub_state(raw: &str) -> Phase {
    SubState::parse(raw)
        .map(|state| state.phase())
        .unwrap_or(Phase::PreMatch)
}
