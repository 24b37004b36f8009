use crate::error::AppError;
use crate::models::{EndpointDescriptor, Phase, PhaseEndpointsView};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Required and optional refresh operations for one phase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PhaseEndpoints {
    pub required: Vec<EndpointDescriptor>,
    #[serde(default)]
    pub optional: Vec<EndpointDescriptor>,
}

impl PhaseEndpoints {
    /// Endpoints a run would execute, required first.
    pub fn selection(&self, include_optional: bool) -> Vec<EndpointDescriptor> {
        let mut endpoints = self.required.clone();
        if include_optional {
            endpoints.extend(self.optional.iter().cloned());
        }
        endpoints
    }
}

/// Phase → endpoint table read by the orchestrator.
///
/// One entry per [`Phase`], each with a non-empty required list. The default table
/// is the deployed configuration; alternate tables can be loaded from the config file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhaseTable {
    entries: BTreeMap<Phase, PhaseEndpoints>,
}

fn parse_all(raw: &[&str]) -> Vec<EndpointDescriptor> {
    raw.iter()
        .map(|r| {
            r.parse()
                .unwrap_or_else(|_| EndpointDescriptor::new(r.to_string()))
        })
        .collect()
}

impl Default for PhaseTable {
    fn default() -> Self {
        let entries = BTreeMap::from([
            (
                Phase::PreMatch,
                PhaseEndpoints {
                    required: parse_all(&["fixtures?mode=next&count=10", "standings", "injuries"]),
                    optional: parse_all(&["predictions", "odds", "head-to-head"]),
                },
            ),
            (
                Phase::Imminent,
                PhaseEndpoints {
                    required: parse_all(&["fixtures?mode=today", "lineups", "injuries"]),
                    optional: parse_all(&["predictions", "odds"]),
                },
            ),
            (
                Phase::Live,
                PhaseEndpoints {
                    required: parse_all(&["fixtures?mode=live"]),
                    optional: parse_all(&["fixture-statistics", "fixture-events"]),
                },
            ),
            (
                Phase::PostMatch,
                PhaseEndpoints {
                    required: parse_all(&[
                        "fixtures?mode=recent",
                        "fixture-statistics",
                        "fixture-events",
                        "standings",
                    ]),
                    optional: parse_all(&["player-statistics", "team-statistics", "top-scorers"]),
                },
            ),
        ]);
        Self { entries }
    }
}

impl PhaseTable {
    /// Builds a table, rejecting missing phases and empty required lists.
    pub fn new(entries: BTreeMap<Phase, PhaseEndpoints>) -> Result<Self, AppError> {
        for phase in Phase::ALL {
            match entries.get(&phase) {
                None => {
                    return Err(AppError::config_error(format!(
                        "Phase table has no entry for '{phase}'"
                    )));
                }
                Some(endpoints) if endpoints.required.is_empty() => {
                    return Err(AppError::config_error(format!(
                        "Phase '{phase}' must have at least one required endpoint"
                    )));
                }
                Some(_) => {}
            }
        }
        Ok(Self { entries })
    }

    /// Builds a table from the config file's `[phases]` section, keyed by phase name.
    pub fn from_named(entries: BTreeMap<String, PhaseEndpoints>) -> Result<Self, AppError> {
        let mut parsed = BTreeMap::new();
        for (name, endpoints) in entries {
            let phase: Phase = name.parse()?;
            parsed.insert(phase, endpoints);
        }
        Self::new(parsed)
    }

    pub fn get(&self, phase: Phase) -> &PhaseEndpoints {
        // `new` and `default` guarantee every phase is present
        &self.entries[&phase]
    }

    pub fn required(&self, phase: Phase) -> &[EndpointDescriptor] {
        &self.get(phase).required
    }

    pub fn optional(&self, phase: Phase) -> &[EndpointDescriptor] {
        &self.get(phase).optional
    }

    /// Serializable view keyed by phase name, used by the inspection endpoint.
    pub fn view(&self) -> BTreeMap<String, PhaseEndpointsView> {
        self.entries
            .iter()
            .map(|(phase, endpoints)| {
                (
                    phase.to_string(),
                    PhaseEndpointsView {
                        required: endpoints.required.clone(),
                        optional: endpoints.optional.clone(),
                    },
                )
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn names(endpoints: &[EndpointDescriptor]) -> Vec<String> {
        endpoints.iter().map(ToString::to_string).collect()
    }

    #[test]
    fn test_every_phase_has_required_endpoints() {
        let table = PhaseTable::default();
        for phase in Phase::ALL {
            assert!(
                !table.required(phase).is_empty(),
                "{phase} has no required endpoints"
            );
        }
    }

    #[test]
    fn test_default_table_passes_validation() {
        let table = PhaseTable::default();
        let rebuilt = PhaseTable::new(table.entries.clone()).unwrap();
        assert_eq!(rebuilt, table);
    }

    #[test]
    fn test_live_entry() {
        let table = PhaseTable::default();
        assert_eq!(names(table.required(Phase::Live)), vec!["fixtures?mode=live"]);
        assert_eq!(
            names(table.optional(Phase::Live)),
            vec!["fixture-statistics", "fixture-events"]
        );
    }

    #[test]
    fn test_fixture_modes_are_phase_specific() {
        let table = PhaseTable::default();
        let live = EndpointDescriptor::with_query("fixtures", "mode=live");
        let next = EndpointDescriptor::with_query("fixtures", "mode=next&count=10");

        for phase in Phase::ALL {
            let all = table.get(phase).selection(true);
            assert_eq!(all.contains(&live), phase == Phase::Live);
            assert_eq!(all.contains(&next), phase == Phase::PreMatch);
        }
    }

    #[test]
    fn test_selection_orders_required_first() {
        let table = PhaseTable::default();
        let endpoints = table.get(Phase::Live);
        assert_eq!(endpoints.selection(false), endpoints.required);
        assert_eq!(
            names(&endpoints.selection(true)),
            vec!["fixtures?mode=live", "fixture-statistics", "fixture-events"]
        );
    }

    #[test]
    fn test_new_rejects_empty_required() {
        let mut entries = PhaseTable::default().entries;
        entries.insert(
            Phase::Imminent,
            PhaseEndpoints {
                required: vec![],
                optional: vec![EndpointDescriptor::new("odds")],
            },
        );
        let err = PhaseTable::new(entries).unwrap_err();
        assert!(err.to_string().contains("imminent"));
    }

    #[test]
    fn test_new_rejects_missing_phase() {
        let mut entries = PhaseTable::default().entries;
        entries.remove(&Phase::PostMatch);
        assert!(PhaseTable::new(entries).is_err());
    }

    #[test]
    fn test_from_named_parses_config_section() {
        let raw = r#"
[pre-match]
required = ["fixtures?mode=next&count=5"]

[imminent]
required = ["lineups"]

[live]
required = ["fixtures?mode=live"]
optional = ["fixture-events"]

[post-match]
required = ["standings"]
"#;
        let named: BTreeMap<String, PhaseEndpoints> = toml::from_str(raw).unwrap();
        let table = PhaseTable::from_named(named).unwrap();
        assert_eq!(
            names(table.required(Phase::PreMatch)),
            vec!["fixtures?mode=next&count=5"]
        );
        assert!(table.optional(Phase::PostMatch).is_empty());
    }

    #[test]
    fn test_from_named_rejects_unknown_phase() {
        let mut named = BTreeMap::new();
        named.insert(
            "halftime".to_string(),
            PhaseEndpoints {
                required: vec![EndpointDescriptor::new("standings")],
                optional: vec![],
            },
        );
        assert!(matches!(
            PhaseTable::from_named(named),
            Err(AppError::InvalidPhase { .. })
        ));
    }

    #[test]
    fn test_view_is_keyed_by_phase_name() {
        let view = PhaseTable::default().view();
        let keys: Vec<&str> = view.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["imminent", "live", "post-match", "pre-match"]);
    }
}
