//! Report routing: application, bridge, problem and priority to backend
//! identifiers.
//!
//! The tables come from configuration ([`RoutingConfig`]) and are validated
//! once by [`RoutingTable::new`]. After that, [`RoutingTable::route`] is a
//! pure lookup: no I/O, no interior mutability, safe to share across tasks.
//!
//! Application and bridge names are matched after trimming and ASCII
//! lowercasing. A bridge may be listed under several names (e.g. `imessage`
//! and `imessagego`); all of them resolve to the same label.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::{
    LabelId, ProblemCategory, Report, RoutingResult, TeamId, TriageError, UserPriority,
};

/// Routing tables as written in the `[routing]` configuration section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RoutingConfig {
    /// Label attached to every routed report.
    pub rageshake_label: LabelId,

    /// Team used when the application has no entry in `teams`.
    #[serde(default)]
    pub default_team: Option<TeamId>,

    /// Application name → owning team.
    #[serde(default)]
    pub teams: BTreeMap<String, TeamId>,

    /// Problem category form text → label.
    #[serde(default)]
    pub problems: BTreeMap<String, LabelId>,

    /// Priority name (`low`, `medium`, `high`) → label.
    #[serde(default)]
    pub priorities: BTreeMap<String, LabelId>,

    /// Bridge labels, each with every name the bridge is known by.
    #[serde(default)]
    pub bridges: Vec<BridgeRoute>,
}

/// One bridge label and its accepted names.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct BridgeRoute {
    pub label: LabelId,
    pub names: Vec<String>,
}

/// Validated, immutable routing tables.
#[derive(Debug, Clone)]
pub struct RoutingTable {
    rageshake_label: LabelId,
    default_team: Option<TeamId>,
    teams: HashMap<String, TeamId>,
    problems: HashMap<ProblemCategory, LabelId>,
    priorities: HashMap<UserPriority, LabelId>,
    bridges: HashMap<String, LabelId>,
}

impl RoutingTable {
    /// Validates `config` and builds the lookup tables.
    ///
    /// Fails on empty identifiers, unknown problem categories or priorities,
    /// and bridge names claimed by two different labels.
    pub fn new(config: RoutingConfig) -> Result<Self, TriageError> {
        require_id("rageshake_label", config.rageshake_label.as_str())?;
        if let Some(team) = &config.default_team {
            require_id("default_team", team.as_str())?;
        }

        let mut teams = HashMap::with_capacity(config.teams.len());
        for (application, team) in config.teams {
            require_id(&format!("teams.{application}"), team.as_str())?;
            teams.insert(normalize_name(&application), team);
        }

        let mut problems = HashMap::with_capacity(config.problems.len());
        for (text, label) in config.problems {
            let category = text
                .parse::<ProblemCategory>()
                .map_err(|e| TriageError::config(format!("routing.problems: {e}")))?;
            require_id(&format!("problems.{text}"), label.as_str())?;
            problems.insert(category, label);
        }

        let mut priorities = HashMap::with_capacity(config.priorities.len());
        for (name, label) in config.priorities {
            let priority = name
                .parse::<UserPriority>()
                .map_err(|e| TriageError::config(format!("routing.priorities: {e}")))?;
            require_id(&format!("priorities.{name}"), label.as_str())?;
            priorities.insert(priority, label);
        }

        let mut bridges: HashMap<String, LabelId> = HashMap::new();
        for route in config.bridges {
            require_id("bridges.label", route.label.as_str())?;
            if route.names.is_empty() {
                return Err(TriageError::config(format!(
                    "routing.bridges: label {} has no names",
                    route.label
                )));
            }
            for name in &route.names {
                let key = normalize_name(name);
                if key.is_empty() {
                    return Err(TriageError::config(format!(
                        "routing.bridges: label {} has a blank name",
                        route.label
                    )));
                }
                match bridges.get(&key) {
                    Some(existing) if *existing != route.label => {
                        return Err(TriageError::config(format!(
                            "routing.bridges: '{key}' is mapped to both {existing} and {}",
                            route.label
                        )));
                    }
                    _ => {
                        bridges.insert(key, route.label.clone());
                    }
                }
            }
        }

        Ok(Self {
            rageshake_label: config.rageshake_label,
            default_team: config.default_team,
            teams,
            problems,
            priorities,
            bridges,
        })
    }

    /// Maps report attributes to a team and a label set.
    ///
    /// Unknown inputs contribute nothing; the rageshake label is always present.
    pub fn route(
        &self,
        application: &str,
        bridge: Option<&str>,
        problem: Option<ProblemCategory>,
        priority: Option<UserPriority>,
    ) -> RoutingResult {
        let mut labels = BTreeSet::new();
        labels.insert(self.rageshake_label.clone());
        if let Some(label) = problem.and_then(|p| self.problems.get(&p)) {
            labels.insert(label.clone());
        }
        if let Some(label) = bridge.and_then(|b| self.bridge_label(b)) {
            labels.insert(label.clone());
        }
        if let Some(label) = priority.and_then(|p| self.priorities.get(&p)) {
            labels.insert(label.clone());
        }

        RoutingResult {
            team: self.team_for(application).cloned(),
            labels,
        }
    }

    /// Routes a whole report.
    pub fn route_report(&self, report: &Report) -> RoutingResult {
        self.route(
            &report.application,
            report.bridge(),
            report.problem,
            report.priority,
        )
    }

    /// Returns the team for `application`, falling back to the default team.
    pub fn team_for(&self, application: &str) -> Option<&TeamId> {
        self.teams
            .get(&normalize_name(application))
            .or(self.default_team.as_ref())
    }

    /// Returns the label for a bridge name or any of its aliases.
    pub fn bridge_label(&self, bridge: &str) -> Option<&LabelId> {
        self.bridges.get(&normalize_name(bridge))
    }

    /// The label attached to every report.
    pub fn rageshake_label(&self) -> &LabelId {
        &self.rageshake_label
    }
}

fn normalize_name(name: &str) -> String {
    name.trim().to_ascii_lowercase()
}

fn require_id(field: &str, value: &str) -> Result<(), TriageError> {
    if value.trim().is_empty() {
        Err(TriageError::config(format!("routing.{field} must not be empty")))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const ANDROID_TEAM: &str = "39dc6884-3753-4b41-ad19-a166a0f2f51d";
    const RAGESHAKE: &str = "3fc786e7-b4f1-472e-8e27-4aa97c2eb27c";
    const SEND: &str = "02805b84-e966-49ee-8c8b-ac5b3350a9e4";
    const HIGH: &str = "658296b7-5d59-4963-8dbd-0bd0e48d65c1";
    const WHATSAPP: &str = "efd1d28a-5188-4ab3-9a27-51a63f9c7a16";
    const IMESSAGE: &str = "57992d44-cef4-46f8-a23d-3bfff810fc42";

    fn label(id: &str) -> LabelId {
        LabelId::new(id).unwrap()
    }

    fn config() -> RoutingConfig {
        toml::from_str(&format!(
            r#"
            rageshake_label = "{RAGESHAKE}"

            [teams]
            beeper-android = "{ANDROID_TEAM}"
            beeper-ios = "6d2402bc-d4bc-4d3d-8f5e-96df51cafe22"

            [problems]
            "I can't send a message" = "{SEND}"

            [priorities]
            high = "{HIGH}"

            [[bridges]]
            label = "{WHATSAPP}"
            names = ["whatsapp"]

            [[bridges]]
            label = "{IMESSAGE}"
            names = ["imessage", "imessagego"]
            "#
        ))
        .unwrap()
    }

    fn table() -> RoutingTable {
        RoutingTable::new(config()).unwrap()
    }

    #[test]
    fn android_whatsapp_send_problem_is_fully_labelled() {
        let result = table().route(
            "beeper-android",
            Some("whatsapp"),
            Some(ProblemCategory::Send),
            Some(UserPriority::High),
        );

        assert_eq!(result.team, TeamId::new(ANDROID_TEAM));
        for expected in [SEND, WHATSAPP, HIGH, RAGESHAKE] {
            assert!(result.labels.contains(&label(expected)), "missing {expected}");
        }
    }

    #[test]
    fn rageshake_label_is_always_present() {
        let result = table().route("", None, None, None);
        assert_eq!(result.team, None);
        assert_eq!(result.labels, BTreeSet::from([label(RAGESHAKE)]));
    }

    #[test]
    fn unknown_inputs_add_no_labels() {
        let result = table().route(
            "beeper-ios",
            Some("carrier-pigeon"),
            Some(ProblemCategory::Other),
            Some(UserPriority::Low),
        );
        assert!(result.team.is_some());
        assert_eq!(result.labels.len(), 1);
    }

    #[test]
    fn bridge_aliases_share_a_label() {
        let table = table();
        assert_eq!(table.bridge_label("imessage"), Some(&label(IMESSAGE)));
        assert_eq!(table.bridge_label("iMessageGo "), Some(&label(IMESSAGE)));
    }

    #[test]
    fn routing_is_deterministic() {
        let table = table();
        let a = table.route("beeper-android", Some("imessagego"), None, Some(UserPriority::High));
        let b = table.route("beeper-android", Some("imessagego"), None, Some(UserPriority::High));
        assert_eq!(a, b);
    }

    #[test]
    fn default_team_covers_unknown_applications() {
        let mut config = config();
        config.default_team = TeamId::new("bcc6420f-b63d-4e44-b7de-004ee8338d80");
        let table = RoutingTable::new(config).unwrap();
        assert_eq!(
            table.team_for("beeper-web").map(TeamId::as_str),
            Some("bcc6420f-b63d-4e44-b7de-004ee8338d80")
        );
        assert_eq!(table.team_for("beeper-android").map(TeamId::as_str), Some(ANDROID_TEAM));
    }

    #[test]
    fn conflicting_bridge_aliases_are_rejected() {
        let mut config = config();
        config.bridges.push(BridgeRoute {
            label: label(WHATSAPP),
            names: vec!["IMESSAGE".into()],
        });
        let err = RoutingTable::new(config).unwrap_err();
        assert!(matches!(err, TriageError::Configuration { .. }));
    }

    #[test]
    fn unknown_problem_keys_are_rejected() {
        let mut config = config();
        config.problems.insert("Kaboom".into(), label(SEND));
        assert!(RoutingTable::new(config).is_err());
    }

    #[test]
    fn empty_identifiers_are_rejected() {
        let mut config = config();
        config.teams.insert("bleeper".into(), serde_json::from_str("\"\"").unwrap());
        assert!(RoutingTable::new(config).is_err());
    }
}
