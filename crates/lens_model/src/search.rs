//! Jaeger search parameters.

use crate::error::{Error, Result};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;

/// Service name used when no service could be inferred from a query.
pub const UNKNOWN_SERVICE: &str = "unknown-service";

/// Default lookback window.
pub const DEFAULT_LOOKBACK: &str = "1h";

/// Default maximum number of traces.
pub const DEFAULT_LIMIT: u32 = 20;

const DURATION_UNITS: &[&str] = &["ms", "s", "m"];
const LOOKBACK_UNITS: &[&str] = &["h", "d"];

/// Parameters for a Jaeger trace search.
///
/// Deserialization applies the documented defaults for absent or null
/// `tags`, `lookback` and `limit`, so partially filled model output can be
/// decoded and then checked with [`SearchParameters::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchParameters {
    /// Service to search (required by Jaeger).
    #[serde(default)]
    pub service: String,
    /// Operation name filter.
    #[serde(default)]
    pub operation: Option<String>,
    /// Tag filters.
    #[serde(default, deserialize_with = "deserialize_tags")]
    pub tags: BTreeMap<String, String>,
    /// Minimum span duration, e.g. `500ms`.
    #[serde(default)]
    pub min_duration: Option<String>,
    /// Maximum span duration, e.g. `5s`.
    #[serde(default)]
    pub max_duration: Option<String>,
    /// How far back to search, e.g. `24h`.
    #[serde(
        default = "default_lookback",
        deserialize_with = "deserialize_lookback"
    )]
    pub lookback: String,
    /// Maximum number of traces to return.
    #[serde(
        default = "default_limit",
        deserialize_with = "deserialize_limit"
    )]
    pub limit: u32,
}

impl SearchParameters {
    /// Creates parameters for a service with every other field defaulted.
    #[must_use]
    pub fn for_service(service: impl Into<String>) -> Self {
        Self {
            service: service.into(),
            operation: None,
            tags: BTreeMap::new(),
            min_duration: None,
            max_duration: None,
            lookback: default_lookback(),
            limit: DEFAULT_LIMIT,
        }
    }

    /// Returns true if the service is the "could not infer" sentinel.
    #[must_use]
    pub fn has_unknown_service(&self) -> bool {
        self.service == UNKNOWN_SERVICE
    }

    /// Checks required fields and value formats.
    ///
    /// # Errors
    ///
    /// Returns an error if `service` is empty, a duration is not
    /// `<n>(ms|s|m)`, `lookback` is not `<n>(h|d)`, or `limit` is zero.
    pub fn validate(&self) -> Result<()> {
        if self.service.trim().is_empty() {
            return Err(Error::MissingField("service"));
        }

        for (field, value) in [
            ("minDuration", &self.min_duration),
            ("maxDuration", &self.max_duration),
        ] {
            if let Some(value) = value {
                if !has_unit(value, DURATION_UNITS) {
                    return Err(Error::invalid(
                        field,
                        format!("'{value}' is not a duration like 500ms, 2s or 5m"),
                    ));
                }
            }
        }

        if !has_unit(&self.lookback, LOOKBACK_UNITS) {
            return Err(Error::invalid(
                "lookback",
                format!("'{}' is not a window like 1h or 7d", self.lookback),
            ));
        }

        if self.limit == 0 {
            return Err(Error::invalid("limit", "must be a positive integer"));
        }

        Ok(())
    }
}

/// Returns true if `value` is a run of digits followed by one of `units`.
fn has_unit(value: &str, units: &[&str]) -> bool {
    let unit = value.trim_start_matches(|c: char| c.is_ascii_digit());
    unit.len() < value.len() && units.contains(&unit)
}

fn default_lookback() -> String {
    DEFAULT_LOOKBACK.to_string()
}

const fn default_limit() -> u32 {
    DEFAULT_LIMIT
}

fn deserialize_lookback<'de, D>(deserializer: D) -> std::result::Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_lookback))
}

fn deserialize_limit<'de, D>(deserializer: D) -> std::result::Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(DEFAULT_LIMIT))
}

// Models sometimes emit `{"error": true}` or `{"http.status_code": 500}`;
// scalar values are stringified rather than rejected.
fn deserialize_tags<'de, D>(
    deserializer: D,
) -> std::result::Result<BTreeMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<BTreeMap<String, Value>>::deserialize(deserializer)?
        .unwrap_or_default();
    raw.into_iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key, s)),
            Value::Bool(_) | Value::Number(_) => Ok((key, value.to_string())),
            other => Err(serde::de::Error::custom(format!(
                "tag '{key}' must be a scalar, got {other}"
            ))),
        })
        .collect()
}
