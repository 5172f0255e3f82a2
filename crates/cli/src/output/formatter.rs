//! Diagnostic output
//!
//! Search results are written straight to the chosen sink by the renderers.
//! The formatter only handles the messages around them: errors, warnings
//! and warnings, all on stderr so piped results stay clean.

use console::Style;

use super::OutputConfig;

/// Color theme for diagnostics
#[derive(Debug, Clone)]
pub struct Theme {
    /// Error messages - red
    pub error: Style,
    /// Warning messages - yellow
    pub warning: Style,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            error: Style::new().red(),
            warning: Style::new().yellow(),
        }
    }
}

impl Theme {
    /// Returns a theme with no styling (for no-color mode)
    pub fn plain() -> Self {
        Self {
            error: Style::new(),
            warning: Style::new(),
        }
    }
}

/// Formatter for CLI diagnostics
#[derive(Debug, Clone)]
pub struct Formatter {
    config: OutputConfig,
    theme: Theme,
}

impl Formatter {
    /// Create a new formatter with the given configuration
    pub fn new(config: OutputConfig) -> Self {
        let theme = if config.no_color {
            Theme::plain()
        } else {
            Theme::default()
        };
        Self { config, theme }
    }

    /// Check if quiet mode is enabled
    pub fn is_quiet(&self) -> bool {
        self.config.quiet
    }

    /// Check if colors are enabled
    #[allow(dead_code)]
    pub fn colors_enabled(&self) -> bool {
        !self.config.no_color
    }

    /// Output an error message
    ///
    /// Errors are always printed, even in quiet mode.
    pub fn error(&self, message: &str) {
        let cross = self.theme.error.apply_to("✗");
        eprintln!("{cross} {message}");
    }

    /// Output a warning message
    pub fn warning(&self, message: &str) {
        if self.config.quiet {
            return;
        }

        let warn_icon = self.theme.warning.apply_to("⚠");
        eprintln!("{warn_icon} {message}");
    }
}

impl Default for Formatter {
    fn default() -> Self {
        Self::new(OutputConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_formatter_default() {
        let formatter = Formatter::default();
        assert!(!formatter.is_quiet());
        assert!(formatter.colors_enabled());
    }

    #[test]
    fn test_formatter_no_color() {
        let config = OutputConfig {
            no_color: true,
            ..Default::default()
        };
        let formatter = Formatter::new(config);
        assert!(!formatter.colors_enabled());
    }

    #[test]
    fn test_formatter_quiet() {
        let config = OutputConfig {
            quiet: true,
            ..Default::default()
        };
        let formatter = Formatter::new(config);
        assert!(formatter.is_quiet());
    }
}
