//! Grafana log-exploration links for a reporter.
//!
//! Each report gets two links into Grafana Explore, both centred on the time
//! the report is filed (±15 minutes): one over the bridge logs and one over
//! the megahungry namespace, each filtered by the reporter's Matrix user id.

use chrono::Duration;
use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Server suffixes that are kept as-is when normalising a user id.
const KNOWN_SERVERS: [&str; 3] = [":beeper.com", ":beeper-dev.com", ":beeper-staging.com"];

/// Server appended to bare user ids.
const DEFAULT_SERVER: &str = "beeper.com";

/// Half-width of the time window around the report.
const WINDOW_MINUTES: i64 = 15;

/// Where the links point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GrafanaConfig {
    /// Grafana base URL, without a trailing `/explore`.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Loki datasource UID.
    #[serde(default = "default_datasource")]
    pub datasource: String,
}

impl Default for GrafanaConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            datasource: default_datasource(),
        }
    }
}

fn default_base_url() -> String {
    "https://grafana.beeper-tools.com".to_string()
}

fn default_datasource() -> String {
    "f21b0c24-8614-42eb-827b-fcbd230dd8d3".to_string()
}

/// The pair of links attached to an issue.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogLinks {
    pub bridges: String,
    pub megahungry: String,
}

#[derive(Serialize)]
struct ExploreState<'a> {
    datasource: &'a str,
    queries: [ExploreQuery<'a>; 1],
    range: ExploreRange,
}

#[derive(Serialize)]
struct ExploreQuery<'a> {
    expr: &'a str,
    #[serde(rename = "queryType")]
    query_type: &'a str,
}

#[derive(Serialize)]
struct ExploreRange {
    from: String,
    to: String,
}

impl GrafanaConfig {
    /// Builds an Explore URL running `expr` over `now` ± 15 minutes.
    pub fn log_url(&self, expr: &str, now: Timestamp) -> Result<String, serde_json::Error> {
        let window = Duration::minutes(WINDOW_MINUTES);
        let now = now.as_datetime();
        let state = ExploreState {
            datasource: &self.datasource,
            queries: [ExploreQuery {
                expr,
                query_type: "range",
            }],
            range: ExploreRange {
                from: (now - window).timestamp_millis().to_string(),
                to: (now + window).timestamp_millis().to_string(),
            },
        };
        let json = serde_json::to_string(&state)?;
        Ok(format!(
            "{}/explore?orgId=1&left={}",
            self.base_url.trim_end_matches('/'),
            query_escape(&json)
        ))
    }

    /// Builds the bridge and megahungry links for `user`.
    pub fn log_links(&self, user: &str, now: Timestamp) -> Result<LogLinks, serde_json::Error> {
        let user_id = normalize_user_id(user);
        Ok(LogLinks {
            bridges: self.log_url(
                &format!(r#"{{user_id="@{user_id}",app="bridges"}} | unpack"#),
                now,
            )?,
            megahungry: self.log_url(
                &format!(r#"{{user_id="@{user_id}",namespace="megahungry"}} | unpack"#),
                now,
            )?,
        })
    }
}

/// Turns a username into `localpart:server`, defaulting to the production
/// server. A leading `@` is dropped.
///
/// Deliberately does not append the production server unconditionally: an id
/// already ending in `:beeper.com` would otherwise become
/// `alice:beeper.com:beeper.com`, and `@alice` would be queried as `@@alice`.
pub fn normalize_user_id(user: &str) -> String {
    let user = user.trim().trim_start_matches('@');
    if KNOWN_SERVERS.iter().any(|server| user.ends_with(server)) {
        user.to_string()
    } else {
        format!("{user}:{DEFAULT_SERVER}")
    }
}

/// Escapes `input` for use as a query-string value.
///
/// Unreserved characters pass through, space becomes `+`, everything else
/// is percent-encoded with uppercase hex.
pub fn query_escape(input: &str) -> String {
    // `%` itself is encoded as `%25`, so every `%20` is an encoded space.
    urlencoding::encode(input).replace("%20", "+")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, Utc};

    fn at(rfc3339: &str) -> Timestamp {
        Timestamp::from_utc(DateTime::parse_from_rfc3339(rfc3339).unwrap().with_timezone(&Utc))
    }

    fn query_unescape(input: &str) -> String {
        urlencoding::decode(&input.replace('+', " ")).unwrap().into_owned()
    }

    #[test]
    fn user_ids_get_the_production_server() {
        assert_eq!(normalize_user_id("alice"), "alice:beeper.com");
        assert_eq!(normalize_user_id("@alice"), "alice:beeper.com");
        assert_eq!(normalize_user_id("alice:beeper.com"), "alice:beeper.com");
        assert_eq!(normalize_user_id("alice:beeper-dev.com"), "alice:beeper-dev.com");
        assert_eq!(normalize_user_id("alice:beeper-staging.com"), "alice:beeper-staging.com");
    }

    #[test]
    fn query_escape_matches_form_encoding() {
        assert_eq!(query_escape("a b"), "a+b");
        assert_eq!(query_escape("{\"x\":1}"), "%7B%22x%22%3A1%7D");
        assert_eq!(query_escape("safe-_.~"), "safe-_.~");
        assert_eq!(query_escape("é"), "%C3%A9");
        assert_eq!(query_escape("a+b%20"), "a%2Bb%2520");
    }

    #[test]
    fn log_url_embeds_query_and_window() {
        let config = GrafanaConfig::default();
        let url = config
            .log_url(r#"{app="bridges"} | unpack"#, at("2024-01-01T00:00:00Z"))
            .unwrap();

        let prefix = "https://grafana.beeper-tools.com/explore?orgId=1&left=";
        assert!(url.starts_with(prefix), "{url}");
        let state: serde_json::Value =
            serde_json::from_str(&query_unescape(&url[prefix.len()..])).unwrap();

        assert_eq!(state["datasource"], "f21b0c24-8614-42eb-827b-fcbd230dd8d3");
        assert_eq!(state["queries"][0]["expr"], r#"{app="bridges"} | unpack"#);
        assert_eq!(state["queries"][0]["queryType"], "range");
        assert_eq!(state["range"]["from"], "1704066300000");
        assert_eq!(state["range"]["to"], "1704068100000");
    }

    #[test]
    fn log_links_filter_by_user() {
        let config = GrafanaConfig {
            base_url: "https://grafana.example/".into(),
            datasource: "ds".into(),
        };
        let links = config.log_links("bob:beeper-dev.com", Timestamp::now()).unwrap();

        let bridges = query_unescape(&links.bridges);
        let megahungry = query_unescape(&links.megahungry);
        assert!(links.bridges.starts_with("https://grafana.example/explore?"));
        assert!(bridges.contains(r#"user_id=\"@bob:beeper-dev.com\",app=\"bridges\""#));
        assert!(megahungry.contains(r#"namespace=\"megahungry\""#));
    }
}
