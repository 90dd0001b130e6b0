//! UX Audit CLI - Command-line interface for single page UX checks
//!
//! Application Layer - CLI coordinates user interactions with the auditor
//! - Translates user commands to library operations
//! - Handles external concerns like prompting, process exit codes, and terminal output
//! - Fatal failures print one line and exit with code 2

use clap::{Parser, Subcommand, ValueEnum};
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process;
use ux_audit::{
    AuditConfig, AuditError, AuditResult, OutputFormat, ReportFormatter, ReportOptions, RuleRegistry,
    UxAuditor,
};

/// UX Audit - heuristic UX checks for a single web page
#[derive(Parser)]
#[command(name = "ux-audit")]
#[command(version)]
#[command(about = "Fetch a web page and run a fixed battery of UX heuristics against it")]
#[command(long_about = "UX Audit fetches one page, evaluates fourteen heuristics (headings, alt text, \
broken links, HTTPS, SEO tags and more) and prints a pass/fail report, optionally with a bar chart.")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Disable colored output
    #[arg(long, global = true)]
    no_color: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze a web page
    Analyze {
        /// URL to analyze; prompted for when omitted
        url: Option<String>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "human")]
        format: OutputFormatArg,

        /// Only list rules that need improvement
        #[arg(long)]
        failures_only: bool,

        /// Write a bar chart of the results
        #[arg(long)]
        chart: bool,

        /// Directory for the chart (overrides the configuration)
        #[arg(long)]
        chart_dir: Option<PathBuf>,
    },

    /// List the rules in report order
    Rules,

    /// Explain what a specific rule checks
    Explain {
        /// Rule ordinal (e.g. 6) or identifier
        rule: String,
    },

    /// Validate configuration file
    ValidateConfig {
        /// Configuration file to validate
        config_file: Option<PathBuf>,
    },
}

#[derive(Copy, Clone, ValueEnum, PartialEq)]
enum OutputFormatArg {
    Human,
    Json,
    Junit,
}

impl From<OutputFormatArg> for OutputFormat {
    fn from(arg: OutputFormatArg) -> Self {
        match arg {
            OutputFormatArg::Human => OutputFormat::Human,
            OutputFormatArg::Json => OutputFormat::Json,
            OutputFormatArg::Junit => OutputFormat::Junit,
        }
    }
}

fn main() {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose);

    // Run the command and handle the result
    match run_command(cli) {
        Ok(exit_code) => {
            process::exit(exit_code);
        }
        Err(e) => {
            eprintln!("Error: {}", e);
            process::exit(2);
        }
    }
}

fn run_command(cli: Cli) -> AuditResult<i32> {
    match cli.command {
        Commands::Analyze { url, format, failures_only, chart, chart_dir } => {
            let url = match url {
                Some(url) => url,
                None => prompt_for_url()?,
            };
            let chart = match (chart, chart_dir) {
                (false, _) => None,
                (true, Some(dir)) => Some(ChartTarget::Dir(dir)),
                (true, None) => Some(ChartTarget::Configured),
            };
            run_analyze(cli.config, &url, format, failures_only, chart, !cli.no_color)
        }
        Commands::Rules => run_list_rules(),
        Commands::Explain { rule } => run_explain(&rule),
        Commands::ValidateConfig { config_file } => run_validate_config(config_file.or(cli.config)),
    }
}

/// Where a requested chart goes
enum ChartTarget {
    Configured,
    Dir(PathBuf),
}

fn run_analyze(
    config_path: Option<PathBuf>,
    url: &str,
    format: OutputFormatArg,
    failures_only: bool,
    chart: Option<ChartTarget>,
    use_colors: bool,
) -> AuditResult<i32> {
    let config = AuditConfig::discover(config_path.as_deref())?;

    let auditor = UxAuditor::new_with_config(config)?.with_report_formatter(ReportFormatter::new(
        ReportOptions { use_colors, failures_only, ..Default::default() },
    ));

    let report = auditor.analyze(url)?;

    let formatted = auditor.format_report(&report, format.into())?;
    print!("{}", formatted);

    if let Some(target) = chart {
        let path = match target {
            ChartTarget::Configured => auditor.render_chart(&report)?,
            ChartTarget::Dir(dir) => auditor.render_chart_to(&report, dir)?,
        };
        if format == OutputFormatArg::Human {
            println!("Chart saved to {}", path.display());
        }
    }

    // Return appropriate exit code
    if report.all_passed() {
        Ok(0)
    } else {
        Ok(1)
    }
}

fn prompt_for_url() -> AuditResult<String> {
    print!("Enter the webpage URL to analyze: ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;

    let url = line.trim().to_string();
    if url.is_empty() {
        return Err(AuditError::invalid_url(url, "no URL entered"));
    }
    Ok(url)
}

fn run_list_rules() -> AuditResult<i32> {
    let registry = RuleRegistry::standard();

    println!("Available Rules\n");
    for rule in registry.rules() {
        println!("  {:<48} [{}]", rule.id(), rule.input().as_str());
    }

    Ok(0)
}

fn run_explain(query: &str) -> AuditResult<i32> {
    let registry = RuleRegistry::standard();

    if let Some(rule) = registry.find(query) {
        println!("Rule: {}", rule.id());
        println!("Inputs: {}", rule.input().as_str());
        println!();
        println!("Passes when:");
        println!("   {}", rule.description());
        return Ok(0);
    }

    eprintln!("Rule '{}' not found", query);
    println!();
    println!("Available rules:");
    for rule in registry.rules() {
        println!("    - {}", rule.id());
    }

    Ok(1)
}

fn run_validate_config(config_path: Option<PathBuf>) -> AuditResult<i32> {
    let config_path = config_path.unwrap_or_else(|| PathBuf::from("ux_audit.yaml"));

    println!("Validating configuration: {}", config_path.display());

    match AuditConfig::load_from_file(&config_path) {
        Ok(config) => {
            println!("Configuration is valid");
            println!("Configuration summary:");
            println!("  Timeout: {}s", config.http.timeout_secs);
            println!("  Load time threshold: {}ms", config.thresholds.max_load_time_ms);
            println!("  Image size threshold: {} bytes", config.thresholds.max_image_bytes);
            println!(
                "  Phrases: {} call-to-action, {} cookie consent",
                config.vocabulary.cta_phrases.len(),
                config.vocabulary.cookie_phrases.len()
            );
            println!("  Chart directory: {}", config.output.chart_dir);
            println!("  Fingerprint: {}", config.fingerprint());

            Ok(0)
        }
        Err(e) => {
            eprintln!("Configuration validation failed: {}", e);
            Ok(1)
        }
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { tracing::Level::DEBUG } else { tracing::Level::WARN };

    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_target(false)
        .with_writer(io::stderr)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_analyze_unreachable_host_is_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("ux_audit.yaml");
        fs::write(&config_file, "http:\n  timeout_secs: 2\n").unwrap();

        let result = run_analyze(
            Some(config_file),
            "http://127.0.0.1:1/",
            OutputFormatArg::Json,
            false,
            None,
            false,
        );

        assert!(matches!(result, Err(AuditError::Fetch { .. })));
    }

    #[test]
    fn test_validate_config() {
        let temp_dir = TempDir::new().unwrap();
        let config_file = temp_dir.path().join("test_config.yaml");

        let yaml = AuditConfig::default().to_yaml().unwrap();
        fs::write(&config_file, yaml).unwrap();
        assert_eq!(run_validate_config(Some(config_file)).unwrap(), 0);

        let bad_file = temp_dir.path().join("bad.yaml");
        fs::write(&bad_file, "version: \"9\"\n").unwrap();
        assert_eq!(run_validate_config(Some(bad_file)).unwrap(), 1);
    }

    #[test]
    fn test_explain_rule() {
        assert_eq!(run_explain("6").unwrap(), 0);
        assert_eq!(run_explain("9. HTTPS Enabled").unwrap(), 0);
        assert_eq!(run_explain("nonexistent_rule").unwrap(), 1);
    }

    #[test]
    fn test_list_rules() {
        assert_eq!(run_list_rules().unwrap(), 0);
    }

    #[test]
    fn test_cli_parses_analyze() {
        let cli = Cli::try_parse_from(["ux-audit", "analyze", "https://example.com", "--format", "json", "--chart"])
            .unwrap();
        match cli.command {
            Commands::Analyze { url, format, chart, chart_dir, .. } => {
                assert_eq!(url.as_deref(), Some("https://example.com"));
                assert!(format == OutputFormatArg::Json);
                assert!(chart);
                assert!(chart_dir.is_none());
            }
            _ => panic!("expected analyze"),
        }
    }
}
