//! Samples command implementation.

use anyhow::Result;
use lens_model::fixtures;

/// Runs the samples command.
pub fn run() -> Result<()> {
    print!("{}", render());
    Ok(())
}

fn render() -> String {
    fixtures::all()
        .into_iter()
        .map(|(name, span)| {
            let started = span.start_time().map_or_else(
                || "-".to_string(),
                |start| start.format("%Y-%m-%dT%H:%M:%SZ").to_string(),
            );
            let parent = span
                .parent_span_id()
                .map_or_else(String::new, |id| format!(" (child of {id})"));
            format!(
                "{name:<18} {:<20} {started:<20} {:>10}  {}{parent}\n",
                span.service_name,
                span.format_duration(),
                span.operation_name
            )
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line(output: &str, name: &str) -> String {
        output
            .lines()
            .find(|line| line.starts_with(name))
            .unwrap()
            .to_string()
    }

    #[test]
    fn lists_every_sample() {
        let output = render();
        assert_eq!(output.lines().count(), fixtures::NAMES.len());
        insta::assert_snapshot!(
            line(&output, "successful-get"),
            @"successful-get     frontend-service     2023-02-01T06:56:07Z    45.00ms  HTTP GET /api/users"
        );
    }

    #[test]
    fn child_spans_name_their_parent() {
        let output = render();
        insta::assert_snapshot!(
            line(&output, "fast-select"),
            @"fast-select        user-service         2023-02-01T06:56:07Z     3.50ms  SELECT users WHERE id = ? (child of http-root-101)"
        );
        assert!(!line(&output, "slow-query").contains("child of"));
    }
}
