//! Formatted output helpers for CLI commands.
//!
//! Listings print one item per line, or a JSON array with `--json`.

/// Renders a list of names either one per line or as a JSON array.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
pub fn render_list(items: &[String], json: bool) -> anyhow::Result<String> {
    if json {
        return Ok(serde_json::to_string_pretty(items)?);
    }
    Ok(items.join("\n"))
}

/// Prints a list to stdout. Nothing is printed for an empty plain listing.
///
/// # Errors
///
/// Returns an error if JSON serialization fails.
#[allow(clippy::print_stdout)]
pub fn print_list(items: &[String], json: bool) -> anyhow::Result<()> {
    let rendered = render_list(items, json)?;
    if !rendered.is_empty() {
        println!("{rendered}");
    }
    Ok(())
}

/// Prints a single value to stdout.
#[allow(clippy::print_stdout)]
pub fn print_value(value: &str) {
    println!("{value}");
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_list_is_one_per_line() {
        let items = vec!["INPUT".to_string(), "FORWARD".to_string()];
        assert_eq!(render_list(&items, false).unwrap(), "INPUT\nFORWARD");
    }

    #[test]
    fn json_list_is_an_array() {
        let items = vec!["ws-1".to_string()];
        let rendered = render_list(&items, true).unwrap();
        let parsed: Vec<String> = serde_json::from_str(&rendered).unwrap();
        assert_eq!(parsed, items);
    }

    #[test]
    fn empty_plain_list_renders_nothing() {
        assert_eq!(render_list(&[], false).unwrap(), "");
    }
}
