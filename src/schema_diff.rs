//! Schema diff rendering.
//!
//! The deploy command dumps the schema before and after a run and shows the
//! operator what changed. Rendering is a plain unified diff; anything
//! fancier belongs to external tooling.

use similar::TextDiff;

/// Render a unified diff between two schema dumps.
///
/// Returns `None` when the dumps are identical.
pub fn render_schema_diff(before: &str, after: &str) -> Option<String> {
    if before == after {
        return None;
    }

    let diff = TextDiff::from_lines(before, after);
    Some(
        diff.unified_diff()
            .context_radius(3)
            .header("schema before", "schema after")
            .to_string(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_dumps_yield_none() {
        let dump = "-- Table: public.users\nCREATE TABLE public.users (id integer);\n";
        assert!(render_schema_diff(dump, dump).is_none());
    }

    #[test]
    fn test_diff_shows_added_table() {
        let before = "-- Table: public.users\nCREATE TABLE public.users (id integer);\n";
        let after = "-- Table: public.orders\nCREATE TABLE public.orders (id integer);\n\
                     -- Table: public.users\nCREATE TABLE public.users (id integer);\n";

        let diff = render_schema_diff(before, after).unwrap();
        assert!(diff.contains("+-- Table: public.orders"));
        assert!(diff.contains("schema before"));
    }
}
