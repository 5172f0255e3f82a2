//! search command - Find objects whose key contains a term
//!
//! Sweeps every accessible bucket (or those matching a name filter) and
//! prints the matches as a table, raw rows, stacked blocks or CSV.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use clap::Args;
use indicatif::{ProgressBar, ProgressStyle};
use ss_core::{
    Config, ConfigManager, Error, OutputFormat, RetryBuilder, RetryConfig, S3Settings,
    SearchMode, SearchRequest,
};
use ss_s3::S3Client;

use crate::exit_code::ExitCode;
use crate::output::{Formatter, OutputConfig};
use crate::pipeline::Pipeline;

const MISSING_TERM: &str = "Search term is required. Use positional argument or --term/-t flag.";

/// Search object keys across buckets
#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Substring to match in object keys (case-sensitive)
    #[arg(value_name = "TERM")]
    pub term: Option<String>,

    /// Only search buckets whose name contains this text
    #[arg(value_name = "BUCKET")]
    pub bucket: Option<String>,

    /// Substring to match (overrides the positional TERM)
    #[arg(short = 't', long = "term", value_name = "TERM")]
    pub term_flag: Option<String>,

    /// Bucket name filter (overrides the positional BUCKET)
    #[arg(short = 'b', long = "bucket", value_name = "FILTER")]
    pub bucket_flag: Option<String>,

    /// Tab-separated output with full bucket names and keys, streamed
    #[arg(long)]
    pub raw: bool,

    /// One block per object, streamed
    #[arg(long)]
    pub stacked: bool,

    /// CSV output, streamed
    #[arg(long)]
    pub csv: bool,

    /// Write CSV to this file instead of stdout (use with --csv)
    #[arg(long, value_name = "PATH")]
    pub csv_file: Option<PathBuf>,

    /// Treat the term as a key prefix instead of a substring
    #[arg(long, conflicts_with = "versions")]
    pub prefix: bool,

    /// List all versions and delete markers under the term as a key prefix
    #[arg(long)]
    pub versions: bool,

    /// Named profile from the shared AWS config files
    #[arg(long, env = "AWS_PROFILE")]
    pub profile: Option<String>,

    #[arg(long, env = "AWS_REGION")]
    pub region: Option<String>,

    /// Endpoint for S3-compatible services
    #[arg(long, env = "AWS_ENDPOINT_URL", value_name = "URL")]
    pub endpoint_url: Option<String>,

    /// Use path-style bucket addressing
    #[arg(long)]
    pub path_style: bool,

    /// Maximum attempts per request, including the first
    #[arg(long, value_name = "N")]
    pub max_attempts: Option<u32>,
}

impl SearchArgs {
    fn format(&self) -> OutputFormat {
        OutputFormat::from_flags(self.raw, self.stacked, self.csv)
    }

    fn mode(&self) -> SearchMode {
        if self.versions {
            SearchMode::Versions
        } else if self.prefix {
            SearchMode::Prefix
        } else {
            SearchMode::Contains
        }
    }
}

/// Execute the search command
pub async fn execute(args: SearchArgs, output_config: OutputConfig) -> ExitCode {
    let formatter = Formatter::new(output_config.clone());

    let request = match build_request(&args, &formatter) {
        Ok(r) => r,
        Err(e) => {
            formatter.error(&e);
            return ExitCode::UsageError;
        }
    };

    let config = match ConfigManager::new().and_then(|m| m.load()) {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to load config: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let formatter = if config.output.no_color && !output_config.no_color {
        Formatter::new(OutputConfig {
            no_color: true,
            ..output_config
        })
    } else {
        formatter
    };

    let (settings, retry) = resolve_settings(&config, &args);
    let client = match S3Client::new(&settings, &retry).await {
        Ok(c) => c,
        Err(e) => {
            formatter.error(&format!("Failed to create S3 client: {e}"));
            return ExitCode::from_error(&e);
        }
    };

    let progress = progress_bar(&request, &formatter);
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let result = Pipeline::new(&client, &request)
        .progress(progress.clone())
        .run(&mut out)
        .await;
    progress.finish_and_clear();

    match result {
        Ok(_) => ExitCode::Success,
        // Downstream reader went away (e.g. piped into `head`)
        Err(Error::Io(e)) if e.kind() == io::ErrorKind::BrokenPipe => ExitCode::Success,
        Err(e) => {
            formatter.error(&format!("Search failed: {e}"));
            ExitCode::from_error(&e)
        }
    }
}

/// Validate arguments into a request; the message is shown on failure
fn build_request(args: &SearchArgs, formatter: &Formatter) -> Result<SearchRequest, String> {
    let term = args
        .term_flag
        .clone()
        .or_else(|| args.term.clone())
        .filter(|t| !t.is_empty())
        .ok_or_else(|| MISSING_TERM.to_string())?;

    let bucket_filter = args.bucket_flag.clone().or_else(|| args.bucket.clone());
    let format = args.format();
    let mode = args.mode();

    if args.csv_file.is_some() && format != OutputFormat::Csv {
        formatter.warning("--csv-file is ignored without --csv");
    }
    if mode == SearchMode::Versions && format != OutputFormat::Table {
        formatter.warning("--versions always prints tab-separated rows; format flags are ignored");
    }

    let csv_destination = match format {
        OutputFormat::Csv => args.csv_file.clone(),
        _ => None,
    };

    SearchRequest::new(term)
        .map(|r| {
            r.with_bucket_filter(bucket_filter)
                .with_format(format)
                .with_csv_destination(csv_destination)
                .with_mode(mode)
        })
        .map_err(|e| e.to_string())
}

/// Merge command line flags over the config file
fn resolve_settings(config: &Config, args: &SearchArgs) -> (S3Settings, RetryConfig) {
    let mut settings = config.s3.clone();
    if let Some(profile) = &args.profile {
        settings.profile = Some(profile.clone());
    }
    if let Some(region) = &args.region {
        settings.region = Some(region.clone());
    }
    if let Some(endpoint) = &args.endpoint_url {
        settings.endpoint = Some(endpoint.clone());
    }
    settings.force_path_style |= args.path_style;

    let mut retry = RetryBuilder::from(config.retry.clone());
    if let Some(n) = args.max_attempts {
        retry = retry.max_attempts(n);
    }

    (settings, retry.build())
}

/// Spinner for the collection phase of table output
fn progress_bar(request: &SearchRequest, formatter: &Formatter) -> ProgressBar {
    let collects = request.format() == OutputFormat::Table && request.mode() != SearchMode::Versions;
    if !collects || formatter.is_quiet() {
        return ProgressBar::hidden();
    }

    let pb = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner:.green} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Listing buckets...");
    pb.enable_steady_tick(Duration::from_millis(120));
    pb
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser, Debug)]
    struct TestCli {
        #[command(flatten)]
        args: SearchArgs,
    }

    fn parse(argv: &[&str]) -> SearchArgs {
        let mut full = vec!["s3search"];
        full.extend_from_slice(argv);
        TestCli::try_parse_from(full).unwrap().args
    }

    fn quiet() -> Formatter {
        Formatter::new(OutputConfig {
            quiet: true,
            ..Default::default()
        })
    }

    #[test]
    fn test_positional_term_and_bucket() {
        let request = build_request(&parse(&["log", "prod"]), &quiet()).unwrap();
        assert_eq!(request.term(), "log");
        assert_eq!(request.bucket_filter(), Some("prod"));
        assert_eq!(request.format(), OutputFormat::Table);
    }

    #[test]
    fn test_flags_override_positionals() {
        let args = parse(&["log", "prod", "-t", "trace", "--bucket", "staging"]);
        let request = build_request(&args, &quiet()).unwrap();
        assert_eq!(request.term(), "trace");
        assert_eq!(request.bucket_filter(), Some("staging"));
    }

    #[test]
    fn test_missing_term_is_usage_error() {
        let err = build_request(&parse(&[]), &quiet()).unwrap_err();
        assert_eq!(err, MISSING_TERM);

        let err = build_request(&parse(&["--term", ""]), &quiet()).unwrap_err();
        assert_eq!(err, MISSING_TERM);
    }

    #[test]
    fn test_format_precedence() {
        let request = build_request(&parse(&["x", "--csv", "--stacked"]), &quiet()).unwrap();
        assert_eq!(request.format(), OutputFormat::Stacked);

        let request = build_request(&parse(&["x", "--csv", "--raw"]), &quiet()).unwrap();
        assert_eq!(request.format(), OutputFormat::Raw);
    }

    #[test]
    fn test_csv_file_only_with_csv() {
        let request = build_request(&parse(&["x", "--csv-file", "out.csv"]), &quiet()).unwrap();
        assert_eq!(request.format(), OutputFormat::Table);
        assert!(request.csv_destination().is_none());

        let args = parse(&["x", "--csv", "--csv-file", "out.csv"]);
        let request = build_request(&args, &quiet()).unwrap();
        assert_eq!(
            request.csv_destination(),
            Some(std::path::Path::new("out.csv"))
        );
    }

    #[test]
    fn test_modes() {
        let request = build_request(&parse(&["logs/", "--prefix"]), &quiet()).unwrap();
        assert_eq!(request.mode(), SearchMode::Prefix);

        let request = build_request(&parse(&["logs/", "--versions"]), &quiet()).unwrap();
        assert_eq!(request.mode(), SearchMode::Versions);

        let result = TestCli::try_parse_from(["s3search", "x", "--prefix", "--versions"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_resolve_settings_flags_win() {
        let mut config = Config::default();
        config.s3.region = Some("eu-west-1".to_string());
        config.s3.endpoint = Some("http://minio:9000".to_string());
        config.retry.max_attempts = 4;

        let mut args = parse(&["x"]);
        args.region = Some("us-east-2".to_string());
        args.endpoint_url = None;
        args.max_attempts = Some(7);
        args.path_style = true;

        let (settings, retry) = resolve_settings(&config, &args);
        assert_eq!(settings.region.as_deref(), Some("us-east-2"));
        assert_eq!(settings.endpoint.as_deref(), Some("http://minio:9000"));
        assert!(settings.force_path_style);
        assert_eq!(retry.max_attempts, 7);
    }

    #[test]
    fn test_resolve_settings_defaults() {
        let mut args = parse(&["x"]);
        args.profile = None;
        args.region = None;
        args.endpoint_url = None;

        let (settings, retry) = resolve_settings(&Config::default(), &args);
        assert_eq!(settings, S3Settings::default());
        assert_eq!(retry, RetryConfig::default());
    }

    #[test]
    fn test_progress_hidden_for_streaming() {
        let request = build_request(&parse(&["x", "--raw"]), &quiet()).unwrap();
        assert!(progress_bar(&request, &Formatter::default()).is_hidden());
    }
}
