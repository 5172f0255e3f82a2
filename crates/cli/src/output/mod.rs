//! Output rendering
//!
//! `stream` holds the renderers that write each record as soon as it is
//! found; `table` needs the full result set to size its columns.

mod formatter;
pub mod stream;
pub mod table;

pub use formatter::Formatter;
pub use stream::{CsvRenderer, RawRenderer, RecordSink, StackedRenderer, VersionRenderer};
pub use table::{render_table, terminal_width};

/// Output configuration shared by every command path
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    /// Disable colored diagnostics
    pub no_color: bool,
    /// Suppress warnings and progress
    pub quiet: bool,
}
