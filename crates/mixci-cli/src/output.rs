//! Formatted output helpers for CLI commands.

use std::time::Duration;

/// Formats an elapsed time as `1m 05s` or `4.2s`.
#[must_use]
pub fn format_elapsed(elapsed: Duration) -> String {
    let secs = elapsed.as_secs();
    if secs >= 60 {
        format!("{}m {:02}s", secs / 60, secs % 60)
    } else {
        format!("{:.1}s", elapsed.as_secs_f64())
    }
}

/// Renders a list as `a, b, c`, or `-` when empty.
#[must_use]
pub fn join_or_dash<I, S>(items: I) -> String
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let joined = items
        .into_iter()
        .map(|s| s.as_ref().to_string())
        .collect::<Vec<_>>()
        .join(", ");
    if joined.is_empty() {
        "-".to_string()
    } else {
        joined
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_elapsed_under_a_minute() {
        assert_eq!(format_elapsed(Duration::from_millis(4_200)), "4.2s");
    }

    #[test]
    fn format_elapsed_over_a_minute() {
        assert_eq!(format_elapsed(Duration::from_secs(65)), "1m 05s");
    }

    #[test]
    fn join_or_dash_handles_empty() {
        assert_eq!(join_or_dash(Vec::<String>::new()), "-");
        assert_eq!(join_or_dash(["deps", "build"]), "deps, build");
    }
}
