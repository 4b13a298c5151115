//! Grouping of rendered SQL statements into per-database batches.
//!
//! Vault runs every entry of `creation_statements` as one unit, so statements that
//! follow a `USE [db]` must travel together with it.

const BATCH_BOUNDARY: &str = "USE [";

/// Split a rendered statement text into trimmed statements without their `;`.
///
/// ```
/// let lines = vault_grant::statement::split_statements("USE [db1];\nGRANT SELECT TO [x];\n");
/// assert_eq!(lines, vec!["USE [db1]", "GRANT SELECT TO [x]"]);
/// ```
pub fn split_statements(text: &str) -> Vec<String> {
    text.lines()
        .map(|line| line.trim().trim_end_matches(';').trim_end())
        .filter(|line| !line.is_empty())
        .map(|line| line.to_string())
        .collect()
}

/// Group statements into batches, a new batch starts at each `USE [` statement.
///
/// Each batch is joined with `"; "` and terminated by `;`.
pub fn group<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let mut batches = vec![];
    let mut buffer: Vec<&str> = vec![];

    for line in lines.iter().map(|l| l.as_ref()) {
        if starts_with_boundary(line) && !buffer.is_empty() {
            batches.push(flush(&buffer));
            buffer.clear();
        }
        buffer.push(line);
    }

    if !buffer.is_empty() {
        batches.push(flush(&buffer));
    }

    batches
}

/// Split then group a rendered statement text
pub fn group_text(text: &str) -> Vec<String> {
    group(&split_statements(text))
}

fn flush(buffer: &[&str]) -> String {
    format!("{};", buffer.join("; "))
}

fn starts_with_boundary(line: &str) -> bool {
    line.get(..BATCH_BOUNDARY.len())
        .map(|prefix| prefix.eq_ignore_ascii_case(BATCH_BOUNDARY))
        .unwrap_or(false)
}
