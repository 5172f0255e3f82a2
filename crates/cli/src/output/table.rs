//! Column-aligned table output
//!
//! Column widths depend on the longest bucket name and key in the whole
//! result set, so this renderer takes a fully collected slice rather than a
//! stream. Values longer than their column are padded past it, never cut.

use std::io::Write;

use console::Term;
use ss_core::{ObjectRecord, Result, format_size};

/// Width assumed when the terminal size cannot be determined
pub const DEFAULT_TERMINAL_WIDTH: usize = 120;
pub const MIN_TERMINAL_WIDTH: usize = 30;

const MIN_BUCKET_WIDTH: usize = 20;
const MAX_BUCKET_WIDTH: usize = 50;
const MIN_KEY_WIDTH: usize = 30;

const SIZE_WIDTH: usize = 10;
const MODIFIED_WIDTH: usize = 25;
const CLASS_WIDTH: usize = 15;
/// Size, modified and class columns plus separators
const RESERVED_WIDTH: usize = 35;

/// Current stdout width, at least [`MIN_TERMINAL_WIDTH`]
pub fn terminal_width() -> usize {
    Term::stdout()
        .size_checked()
        .map(|(_rows, cols)| cols as usize)
        .unwrap_or(DEFAULT_TERMINAL_WIDTH)
        .max(MIN_TERMINAL_WIDTH)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnWidths {
    pub bucket: usize,
    pub key: usize,
}

impl ColumnWidths {
    pub fn compute(records: &[ObjectRecord], terminal_width: usize) -> Self {
        let terminal_width = terminal_width.max(MIN_TERMINAL_WIDTH);

        let longest_bucket = records
            .iter()
            .map(|r| r.bucket().chars().count())
            .max()
            .unwrap_or(0);
        let bucket = longest_bucket.clamp(MIN_BUCKET_WIDTH, MAX_BUCKET_WIDTH);

        let longest_key = records
            .iter()
            .map(|r| r.key().chars().count())
            .max()
            .unwrap_or(0);
        let available = terminal_width.saturating_sub(bucket + RESERVED_WIDTH);
        let key = available.min(longest_key.min(available).max(MIN_KEY_WIDTH));

        Self { bucket, key }
    }
}

/// Write the table, or a single notice when there is nothing to show
pub fn render_table<W: Write>(
    records: &[ObjectRecord],
    terminal_width: usize,
    out: &mut W,
) -> Result<()> {
    if records.is_empty() {
        writeln!(out, "No results found.")?;
        return Ok(());
    }

    let terminal_width = terminal_width.max(MIN_TERMINAL_WIDTH);
    let ColumnWidths { bucket, key } = ColumnWidths::compute(records, terminal_width);

    writeln!(
        out,
        "{:<bucket$} {:<key$} {:<SIZE_WIDTH$} {:<MODIFIED_WIDTH$} {:<CLASS_WIDTH$}",
        "Bucket", "Key", "Size", "Modified", "Class"
    )?;
    writeln!(out, "{}", "-".repeat(terminal_width))?;

    for r in records {
        let modified: String = r.last_modified().chars().take(MODIFIED_WIDTH).collect();
        writeln!(
            out,
            "{:<bucket$} {:<key$} {:<SIZE_WIDTH$} {:<MODIFIED_WIDTH$} {:<CLASS_WIDTH$}",
            r.bucket(),
            r.key(),
            format_size(r.size()),
            modified,
            r.storage_class()
        )?;
    }

    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use jiff::Timestamp;
    use ss_core::ObjectEntry;

    fn record(bucket: &str, key: &str) -> ObjectRecord {
        let ts = Timestamp::from_second(1_704_110_400).unwrap();
        ObjectRecord::from_entry(bucket, ObjectEntry::new(key, 2048).modified(ts))
    }

    fn render(records: &[ObjectRecord], width: usize) -> String {
        let mut out = Vec::new();
        render_table(records, width, &mut out).unwrap();
        String::from_utf8(out).unwrap()
    }

    #[test]
    fn test_bucket_width_clamped() {
        let short = [record("a", "k")];
        assert_eq!(ColumnWidths::compute(&short, 120).bucket, 20);

        let exact = [record(&"b".repeat(33), "k")];
        assert_eq!(ColumnWidths::compute(&exact, 120).bucket, 33);

        let long = [record(&"c".repeat(80), "k")];
        assert_eq!(ColumnWidths::compute(&long, 120).bucket, 50);
    }

    #[test]
    fn test_bucket_width_ignores_keys() {
        let a = [record("media-assets", "x")];
        let b = [record("media-assets", &"k".repeat(200))];
        assert_eq!(
            ColumnWidths::compute(&a, 200).bucket,
            ColumnWidths::compute(&b, 200).bucket
        );
    }

    #[test]
    fn test_key_width() {
        // 120 - 20 - 35 leaves 65 columns for keys
        let short = [record("logs", "a.log")];
        assert_eq!(ColumnWidths::compute(&short, 120).key, 30);

        let medium = [record("logs", &"k".repeat(40))];
        assert_eq!(ColumnWidths::compute(&medium, 120).key, 40);

        let long = [record("logs", &"k".repeat(100))];
        assert_eq!(ColumnWidths::compute(&long, 120).key, 65);
    }

    #[test]
    fn test_key_width_on_narrow_terminal() {
        let records = [record("logs", "a.log")];
        // Clamped to 30 columns, nothing is left for the key
        assert_eq!(ColumnWidths::compute(&records, 10).key, 0);
        assert_eq!(ColumnWidths::compute(&records, 80).key, 25);
    }

    #[test]
    fn test_render_layout() {
        let output = render(&[record("app-logs", "2024/app.log")], 120);
        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 3);

        let header = format!(
            "Bucket{} Key{} Size{} Modified{} Class{}",
            " ".repeat(14),
            " ".repeat(27),
            " ".repeat(6),
            " ".repeat(17),
            " ".repeat(10)
        );
        assert_eq!(lines[0], header);
        assert_eq!(lines[1], "-".repeat(120));

        let row = format!(
            "app-logs{} 2024/app.log{} 2.0KB{} 2024-01-01T12:00:00+00:00 STANDARD{}",
            " ".repeat(12),
            " ".repeat(18),
            " ".repeat(5),
            " ".repeat(7)
        );
        assert_eq!(lines[2], row);
    }

    #[test]
    fn test_long_values_are_not_truncated() {
        let key = format!("deep/{}/object.bin", "nested".repeat(30));
        let output = render(&[record("logs", &key)], 120);
        assert!(output.contains(&key));
    }

    #[test]
    fn test_modified_truncated_to_column() {
        let ts = Timestamp::new(1_704_110_400, 500_000_000).unwrap();
        let record = ObjectRecord::from_entry("logs", ObjectEntry::new("a", 1).modified(ts));
        assert!(record.last_modified().chars().count() > 25);

        let output = render(&[record.clone()], 120);
        let expected: String = record.last_modified().chars().take(25).collect();
        assert!(output.contains(&format!(" {expected} ")));
        assert!(!output.contains(record.last_modified()));
    }

    #[test]
    fn test_empty_prints_notice_only() {
        assert_eq!(render(&[], 120), "No results found.\n");
    }
}
