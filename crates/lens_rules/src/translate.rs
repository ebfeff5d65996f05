//! Natural language to Jaeger search parameter translation.
//!
//! Every rule is an independent check against the lower-cased query, so a
//! query can set several tags at once and later rules overwrite earlier ones
//! on the same key.

use lens_model::search::{DEFAULT_LIMIT, DEFAULT_LOOKBACK, UNKNOWN_SERVICE};
use lens_model::SearchParameters;
use regex::{Captures, Regex};
use std::collections::BTreeMap;
use std::sync::OnceLock;
use tracing::debug;

const HTTP_VERBS: &[&str] = &["get", "post", "put", "delete", "patch"];
const DATABASE_HINTS: &[&str] = &["select", "database", "db"];

/// Phrases checked in order before the numeric lookback pattern.
const LOOKBACK_PHRASES: &[(&str, &str)] = &[
    ("last hour", "1h"),
    ("past hour", "1h"),
    ("last 24 hours", "24h"),
    ("last day", "24h"),
    ("last week", "7d"),
    ("past week", "7d"),
];

const SLOW_MIN_DURATION: &str = "500ms";

struct Patterns {
    preposition_service: Regex,
    keyword_service: Regex,
    transport: Regex,
    duration: Regex,
    lookback: Regex,
}

impl Patterns {
    fn compile() -> Self {
        let re = |source: &str| Regex::new(source).expect("built-in pattern is valid");
        Self {
            preposition_service: re(r"(?:in|from|for)\s+(\w+(?:-\w+)?)(\s+service\b)?"),
            keyword_service: re(
                r"(payment|user|frontend|backend|api|database|auth)(?:-(\w+)|(\s+service\b))?",
            ),
            transport: re(r"\b(?:http|request)\b"),
            duration: re(r"([0-9]+)\s*(ms|millisecond|second|s|minute|m)"),
            lookback: re(r"([0-9]+)\s*(hour|h|day|d|week)"),
        }
    }
}

fn patterns() -> &'static Patterns {
    static PATTERNS: OnceLock<Patterns> = OnceLock::new();
    PATTERNS.get_or_init(Patterns::compile)
}

/// Translates a natural-language query into search parameters.
///
/// Never fails: anything that cannot be inferred falls back to
/// `unknown-service`, no operation, no tags and a one hour lookback.
pub fn extract(query: &str) -> SearchParameters {
    let query = query.to_lowercase();

    let params = SearchParameters {
        service: extract_service(&query),
        operation: extract_operation(&query),
        tags: extract_tags(&query),
        min_duration: extract_min_duration(&query),
        max_duration: None,
        lookback: extract_lookback(&query).unwrap_or_else(|| DEFAULT_LOOKBACK.to_string()),
        limit: DEFAULT_LIMIT,
    };

    debug!(
        service = %params.service,
        operation = ?params.operation,
        tags = params.tags.len(),
        lookback = %params.lookback,
        "Extracted search parameters"
    );
    params
}

fn extract_service(query: &str) -> String {
    let patterns = patterns();
    patterns
        .preposition_service
        .captures(query)
        .map(|caps| service_name(&caps[1], caps.get(2).is_some()))
        .or_else(|| {
            patterns.keyword_service.captures(query).map(|caps| {
                let base = &caps[1];
                caps.get(2).map_or_else(
                    || service_name(base, caps.get(3).is_some()),
                    |segment| format!("{base}-{}", segment.as_str()),
                )
            })
        })
        .unwrap_or_else(|| UNKNOWN_SERVICE.to_string())
}

/// `payment` followed by the word "service" becomes `payment-service`.
fn service_name(word: &str, followed_by_service: bool) -> String {
    if followed_by_service && !word.ends_with("-service") && word != "service" {
        format!("{word}-service")
    } else {
        word.to_string()
    }
}

fn extract_operation(query: &str) -> Option<String> {
    if let Some(verb) = HTTP_VERBS.iter().find(|verb| query.contains(*verb)) {
        return Some(format!("HTTP {}", verb.to_uppercase()));
    }
    contains_any(query, DATABASE_HINTS).then(|| "Database Query".to_string())
}

fn extract_tags(query: &str) -> BTreeMap<String, String> {
    let mut tags = BTreeMap::new();
    let mut set = |key: &str, value: &str| {
        tags.insert(key.to_string(), value.to_string());
    };

    if contains_any(query, &["error", "fail", "5xx"]) {
        set("error", "true");
    }
    if contains_any(query, &["database", "db"]) {
        set("db.type", "postgres");
    }
    if patterns().transport.is_match(query) {
        set("span.kind", "client");
    }
    if contains_any(query, &["500", "5xx"]) {
        set("http.status_code", "500");
    }
    if query.contains("404") {
        set("http.status_code", "404");
    }

    tags
}

fn extract_min_duration(query: &str) -> Option<String> {
    if contains_any(query, &["slow", "long"]) {
        return Some(SLOW_MIN_DURATION.to_string());
    }

    let caps = patterns().duration.captures(query)?;
    let value = &caps[1];
    let unit = &caps[2];

    // "millisecond" starts with "m" and is read as minutes.
    let normalized = if unit.starts_with('m') && unit != "ms" {
        "m"
    } else if unit.starts_with('s') {
        "s"
    } else {
        "ms"
    };
    Some(format!("{value}{normalized}"))
}

fn extract_lookback(query: &str) -> Option<String> {
    if let Some((_, window)) = LOOKBACK_PHRASES
        .iter()
        .find(|(phrase, _)| query.contains(phrase))
    {
        return Some((*window).to_string());
    }

    let caps = patterns().lookback.captures(query)?;
    numeric_lookback(&caps)
}

fn numeric_lookback(caps: &Captures<'_>) -> Option<String> {
    let value = &caps[1];
    match &caps[2] {
        "week" => {
            let weeks: u64 = value.parse().ok()?;
            Some(format!("{}d", weeks.checked_mul(7)?))
        }
        "day" | "d" => Some(format!("{value}d")),
        _ => Some(format!("{value}h")),
    }
}

fn contains_any(query: &str, needles: &[&str]) -> bool {
    needles.iter().any(|needle| query.contains(needle))
}
