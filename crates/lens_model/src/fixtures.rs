//! Sample spans for tests and demos.
//!
//! The spans mirror what a Jaeger query API returns for common traffic:
//! HTTP calls with various outcomes, database queries, cache lookups and
//! gRPC calls. All of it is synthetic.

use crate::span::{LogEvent, RefType, SpanRecord, Tag};

/// Names accepted by [`by_name`], in display order.
pub const NAMES: &[&str] = &[
    "successful-get",
    "post-request",
    "slow-request",
    "server-error",
    "not-found",
    "retried-request",
    "fast-select",
    "slow-query",
    "failed-query",
    "cache-hit",
    "grpc-call",
];

/// Looks up a sample span by name.
#[must_use]
pub fn by_name(name: &str) -> Option<SpanRecord> {
    let span = match name {
        "successful-get" => successful_get(),
        "post-request" => post_request(),
        "slow-request" => slow_request(),
        "server-error" => server_error(),
        "not-found" => not_found(),
        "retried-request" => retried_request(),
        "fast-select" => fast_select(),
        "slow-query" => slow_query(),
        "failed-query" => failed_query(),
        "cache-hit" => cache_hit(),
        "grpc-call" => grpc_call(),
        _ => return None,
    };
    Some(span)
}

/// Every sample span with its name.
#[must_use]
pub fn all() -> Vec<(&'static str, SpanRecord)> {
    NAMES
        .iter()
        .filter_map(|name| by_name(name).map(|span| (*name, span)))
        .collect()
}

/// Fast GET request from a browser client (45ms).
#[must_use]
pub fn successful_get() -> SpanRecord {
    SpanRecord::new(
        "abc123def456",
        "trace-001-http-success",
        "HTTP GET /api/users",
        "frontend-service",
    )
    .with_start_time(1_675_234_567_000_000)
    .with_duration(45_000)
    .with_tag("http.method", "GET")
    .with_tag("http.url", "https://api.example.com/api/users")
    .with_tag("http.status_code", 200i64)
    .with_tag("span.kind", "client")
    .with_tag("component", "fetch")
    .with_tag("http.host", "api.example.com")
}

/// POST handled by a server (125ms).
#[must_use]
pub fn post_request() -> SpanRecord {
    SpanRecord::new(
        "post789abc123",
        "trace-002-http-post",
        "HTTP POST /api/orders",
        "order-service",
    )
    .with_start_time(1_675_234_568_000_000)
    .with_duration(125_000)
    .with_tag("http.method", "POST")
    .with_tag("http.url", "https://api.example.com/api/orders")
    .with_tag("http.status_code", 201i64)
    .with_tag("span.kind", "server")
    .with_tag("component", "express")
    .with_tag("http.route", "/api/orders")
    .with_log(LogEvent::new(
        1_675_234_568_050_000,
        vec![
            Tag::new("event", "request.received"),
            Tag::new("payload.size", 1024i64),
        ],
    ))
    .with_log(LogEvent::new(
        1_675_234_568_120_000,
        vec![
            Tag::new("event", "response.sent"),
            Tag::new("order.id", "ORD-12345"),
        ],
    ))
}

/// Report download that took 3.5s.
#[must_use]
pub fn slow_request() -> SpanRecord {
    SpanRecord::new(
        "slow999xyz888",
        "trace-003-http-slow",
        "HTTP GET /api/reports",
        "reporting-service",
    )
    .with_start_time(1_675_234_569_000_000)
    .with_duration(3_500_000)
    .with_tag("http.method", "GET")
    .with_tag("http.url", "https://api.example.com/api/reports")
    .with_tag("http.status_code", 200i64)
    .with_tag("span.kind", "client")
    .with_tag("component", "axios")
    .with_tag("http.query", "start=2024-01-01&end=2024-12-31")
    .with_log(LogEvent::new(
        1_675_234_572_500_000,
        vec![
            Tag::new("event", "response.complete"),
            Tag::new("warning", "Large dataset processed"),
        ],
    ))
}

/// Payment endpoint failing with HTTP 500.
#[must_use]
pub fn server_error() -> SpanRecord {
    SpanRecord::new(
        "err500internal",
        "trace-004-http-error",
        "HTTP POST /api/payment",
        "payment-service",
    )
    .with_start_time(1_675_234_570_000_000)
    .with_duration(85_000)
    .with_tag("http.method", "POST")
    .with_tag("http.url", "https://api.example.com/api/payment")
    .with_tag("http.status_code", 500i64)
    .with_tag("span.kind", "server")
    .with_tag("error", true)
    .with_tag("component", "express")
    .with_log(LogEvent::new(
        1_675_234_570_080_000,
        vec![
            Tag::new("event", "error"),
            Tag::new("error.kind", "InternalServerError"),
            Tag::new("message", "Database connection timeout"),
        ],
    ))
}

/// Lookup of a user that does not exist.
#[must_use]
pub fn not_found() -> SpanRecord {
    SpanRecord::new(
        "err404notfound",
        "trace-005-http-404",
        "HTTP GET /api/users/99999",
        "user-service",
    )
    .with_start_time(1_675_234_571_000_000)
    .with_duration(12_000)
    .with_tag("http.method", "GET")
    .with_tag("http.status_code", 404i64)
    .with_tag("span.kind", "server")
    .with_tag("component", "express")
    .with_tag("http.route", "/api/users/:id")
}

/// External call that succeeded on the third attempt (5.2s).
#[must_use]
pub fn retried_request() -> SpanRecord {
    let attempt = |timestamp, n: i64, result: &str| {
        LogEvent::new(
            timestamp,
            vec![
                Tag::new("event", format!("attempt.{n}")),
                Tag::new("result", result),
            ],
        )
    };

    SpanRecord::new(
        "retry3times",
        "trace-006-http-retry",
        "HTTP GET /api/external",
        "integration-service",
    )
    .with_start_time(1_675_234_572_000_000)
    .with_duration(5_200_000)
    .with_tag("http.method", "GET")
    .with_tag("http.url", "https://external-api.com/data")
    .with_tag("http.status_code", 200i64)
    .with_tag("span.kind", "client")
    .with_tag("component", "fetch")
    .with_tag("retry.count", 3i64)
    .with_log(attempt(1_675_234_572_000_000, 1, "Connection timeout"))
    .with_log(attempt(1_675_234_573_000_000, 2, "Connection timeout"))
    .with_log(attempt(1_675_234_575_000_000, 3, "Success"))
}

/// Indexed primary-key lookup (3.5ms).
#[must_use]
pub fn fast_select() -> SpanRecord {
    SpanRecord::new(
        "db-select-fast",
        "trace-101-db-select",
        "SELECT users WHERE id = ?",
        "user-service",
    )
    .with_start_time(1_675_234_567_100_000)
    .with_duration(3_500)
    .with_tag("db.type", "postgres")
    .with_tag("db.instance", "prod-db-01")
    .with_tag("db.statement", "SELECT * FROM users WHERE id = $1")
    .with_tag("db.user", "app_user")
    .with_tag("span.kind", "client")
    .with_tag("component", "pg")
    .with_tag("peer.address", "postgres://db.example.com:5432")
    .with_reference(RefType::ChildOf, "trace-101-db-select", "http-root-101")
}

/// Sequential scan on an unindexed column (850ms).
#[must_use]
pub fn slow_query() -> SpanRecord {
    SpanRecord::new(
        "db-slow-noindex",
        "trace-102-db-slow",
        "SELECT orders WHERE customer_email = ?",
        "order-service",
    )
    .with_start_time(1_675_234_568_000_000)
    .with_duration(850_000)
    .with_tag("db.type", "postgres")
    .with_tag("db.instance", "prod-db-02")
    .with_tag(
        "db.statement",
        "SELECT * FROM orders WHERE customer_email = $1",
    )
    .with_tag("db.user", "app_user")
    .with_tag("span.kind", "client")
    .with_tag("component", "sequelize")
    .with_tag("db.rows_affected", 1247i64)
    .with_log(LogEvent::new(
        1_675_234_568_850_000,
        vec![
            Tag::new("event", "query.complete"),
            Tag::new("warning", "Seq Scan on orders (cost=0.00..5432.00)"),
        ],
    ))
}

/// Insert rejected by a unique constraint.
#[must_use]
pub fn failed_query() -> SpanRecord {
    SpanRecord::new(
        "db-insert-dup",
        "trace-103-db-error",
        "INSERT INTO users",
        "user-service",
    )
    .with_start_time(1_675_234_569_000_000)
    .with_duration(15_000)
    .with_tag("db.type", "postgres")
    .with_tag(
        "db.statement",
        "INSERT INTO users (email, name) VALUES ($1, $2)",
    )
    .with_tag("span.kind", "client")
    .with_tag("error", true)
    .with_log(LogEvent::new(
        1_675_234_569_014_000,
        vec![
            Tag::new("event", "error"),
            Tag::new(
                "error",
                "duplicate key value violates unique constraint \"users_email_key\"",
            ),
        ],
    ))
}

/// Redis GET that hit the cache (0.8ms).
#[must_use]
pub fn cache_hit() -> SpanRecord {
    SpanRecord::new(
        "redis-get-hit",
        "trace-104-cache",
        "GET session:*",
        "session-service",
    )
    .with_start_time(1_675_234_570_000_000)
    .with_duration(800)
    .with_tag("db.type", "redis")
    .with_tag("db.statement", "GET session:8f14e45f")
    .with_tag("span.kind", "client")
    .with_tag("component", "ioredis")
    .with_tag("cache.hit", true)
}

/// Unary gRPC call to the inventory service (420ms).
#[must_use]
pub fn grpc_call() -> SpanRecord {
    SpanRecord::new(
        "grpc-inventory",
        "trace-201-grpc",
        "/inventory.InventoryService/Reserve",
        "checkout-service",
    )
    .with_start_time(1_675_234_571_000_000)
    .with_duration(420_000)
    .with_tag("rpc.system", "grpc")
    .with_tag("rpc.service", "inventory.InventoryService")
    .with_tag("rpc.method", "Reserve")
    .with_tag("span.kind", "client")
    .with_tag("component", "grpc-js")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn every_name_resolves() {
        for name in NAMES {
            assert!(by_name(name).is_some(), "{name}");
        }
        assert!(by_name("no-such-span").is_none());
        assert_eq!(all().len(), NAMES.len());
    }

    #[test]
    fn samples_pass_validation() {
        for (name, span) in all() {
            assert!(span.validate().is_ok(), "{name}");
            let value = serde_json::to_value(&span).unwrap();
            assert_eq!(SpanRecord::from_value(value).unwrap(), span, "{name}");
        }
    }
}
