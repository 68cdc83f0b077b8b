use clap::{CommandFactory, Parser};
use clap_complete::{generate, Shell};
use colored::Colorize;
use miette::{IntoDiagnostic, Result};
use std::path::PathBuf;
use tracing::{info, warn};

use adservices_lint::analysis::{Analyzer, Confidence, Finding, LintIssue, Severity};
use adservices_lint::baseline::Baseline;
use adservices_lint::config::Config;
use adservices_lint::discovery::FileFinder;
use adservices_lint::graph::{GraphBuilder, ParallelGraphBuilder};
use adservices_lint::report::{self, Reporter};

/// adservices-lint - Room migration and compatibility checks for AdServices (Kotlin/Java)
#[derive(Parser, Debug)]
#[command(name = "adservices-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the project directory to analyze
    #[arg(default_value = ".")]
    path: PathBuf,

    /// Path to configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Target directories to analyze (can be specified multiple times)
    #[arg(short, long)]
    target: Vec<PathBuf>,

    /// Patterns to exclude (can be specified multiple times)
    #[arg(short, long)]
    exclude: Vec<String>,

    /// Output format
    #[arg(short, long, value_enum, default_value = "terminal")]
    format: OutputFormat,

    /// Output file (for json/sarif formats)
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Only run these rules, by code or name (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "RULES")]
    rules: Vec<String>,

    /// Skip these rules, by code or name (comma-separated)
    #[arg(long, value_delimiter = ',', value_name = "RULES")]
    disable: Vec<String>,

    /// Minimum confidence level to report (low, medium, high)
    #[arg(long, default_value = "low")]
    min_confidence: String,

    /// Baseline file for ignoring existing issues
    /// New issues not in baseline will be reported
    #[arg(long, value_name = "FILE")]
    baseline: Option<PathBuf>,

    /// Generate a baseline file from current results
    #[arg(long, value_name = "FILE")]
    generate_baseline: Option<PathBuf>,

    /// Parse files in parallel
    #[arg(long)]
    parallel: bool,

    /// Verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Quiet mode - only output results
    #[arg(short, long)]
    quiet: bool,

    /// Generate shell completions
    #[arg(long, value_name = "SHELL")]
    completions: Option<Shell>,

    /// List every rule and exit
    #[arg(long)]
    list_rules: bool,

    /// Summary output - show statistics and top rules only
    #[arg(long)]
    summary: bool,

    /// Group results by: rule, category
    #[arg(long, value_name = "MODE")]
    group_by: Option<String>,

    /// Expand all collapsed groups (show every issue)
    #[arg(long)]
    expand: bool,

    /// Number of top rules to show in summary mode
    #[arg(long, default_value = "10")]
    top: usize,
}

#[derive(clap::ValueEnum, Clone, Debug, Default)]
enum OutputFormat {
    #[default]
    Terminal,
    Compact,
    Json,
    Sarif,
}

/// Determine the report format from CLI options
fn determine_report_format(cli: &Cli) -> Result<report::ReportFormat> {
    if cli.summary {
        return Ok(report::ReportFormat::Summary);
    }

    if let Some(group_by) = &cli.group_by {
        let mode = group_by
            .parse::<report::GroupBy>()
            .map_err(|e| miette::miette!("{}", e))?;
        return Ok(report::ReportFormat::Grouped(mode));
    }

    Ok(match cli.format {
        OutputFormat::Terminal => report::ReportFormat::Terminal,
        OutputFormat::Compact => report::ReportFormat::Compact,
        OutputFormat::Json => report::ReportFormat::Json,
        OutputFormat::Sarif => report::ReportFormat::Sarif,
    })
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(shell) = cli.completions {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(shell, &mut cmd, name, &mut std::io::stdout());
        return Ok(());
    }

    if cli.list_rules {
        list_rules();
        return Ok(());
    }

    init_logging(cli.verbose, cli.quiet);

    info!("adservices-lint v{}", env!("CARGO_PKG_VERSION"));

    let config = load_config(&cli)?;

    if run_analysis(&config, &cli)? {
        std::process::exit(1);
    }

    Ok(())
}

fn list_rules() {
    println!(
        "{:<6}  {:<32}  {:<24}  {}",
        "Code".bold(),
        "Name".bold(),
        "Category".bold(),
        "Severity".bold()
    );
    for issue in LintIssue::all() {
        println!(
            "{:<6}  {:<32}  {:<24}  {}",
            issue.code().magenta(),
            issue.name(),
            issue.category(),
            issue.default_severity()
        );
    }
}

fn init_logging(verbose: bool, quiet: bool) {
    use tracing_subscriber::{fmt, EnvFilter};

    let filter = if quiet {
        EnvFilter::new("error")
    } else if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("info")
    };

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = if let Some(config_path) = &cli.config {
        Config::from_file(config_path)?
    } else {
        Config::from_default_locations(&cli.path)?
    };

    // Override with CLI arguments
    if !cli.target.is_empty() {
        config.targets = cli.target.clone();
    }
    if !cli.exclude.is_empty() {
        config.exclude.extend(cli.exclude.clone());
    }
    if !cli.rules.is_empty() {
        config.rules.enabled = cli.rules.clone();
    }
    if !cli.disable.is_empty() {
        config.rules.disabled.extend(cli.disable.clone());
    }

    config.validate()?;
    Ok(config)
}

fn parse_confidence(s: &str) -> Result<Confidence> {
    s.parse::<Confidence>()
        .map_err(|e| miette::miette!(help = "use low, medium or high", "{}", e))
}

/// Returns whether any error-severity finding was reported
fn run_analysis(config: &Config, cli: &Cli) -> Result<bool> {
    use indicatif::{ProgressBar, ProgressStyle};
    use std::time::Instant;

    let start_time = Instant::now();
    let min_confidence = parse_confidence(&cli.min_confidence)?;

    // Step 1: Discover files
    info!("Discovering files...");
    let finder = FileFinder::new(config);
    let files = finder.find_files(&cli.path)?;

    info!("Found {} files to analyze", files.len());

    if files.is_empty() {
        if !cli.quiet {
            println!("{}", "No Kotlin, Java or manifest files found.".yellow());
        }
        return Ok(false);
    }

    // Step 2: Parse files and build graph
    let graph = if cli.parallel {
        if !cli.quiet {
            eprintln!(
                "{}",
                format!("⚡ Parallel mode: parsing {} files...", files.len()).cyan()
            );
        }
        ParallelGraphBuilder::new().build_from_files(&files)
    } else {
        let pb = if cli.quiet {
            ProgressBar::hidden()
        } else {
            ProgressBar::new(files.len() as u64)
        };
        pb.set_style(
            ProgressStyle::default_bar()
                .template(
                    "{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} ({eta})",
                )
                .into_diagnostic()?
                .progress_chars("#>-"),
        );

        info!("Parsing files...");
        let mut graph_builder = GraphBuilder::new();

        for file in &files {
            if let Err(e) = graph_builder.process_file(file) {
                warn!("Skipping {}: {}", file.path.display(), e);
            }
            pb.inc(1);
        }
        pb.finish_and_clear();

        graph_builder.build()
    };

    info!(
        "Parsed {} files in {:.2}s",
        graph.file_count(),
        start_time.elapsed().as_secs_f64()
    );

    // Step 3: Run detectors
    let analyzer = Analyzer::new(config);
    let findings: Vec<Finding> = analyzer
        .analyze(&graph)
        .into_iter()
        .filter(|f| f.confidence >= min_confidence)
        .collect();

    // Step 4: Generate baseline if requested
    if let Some(ref baseline_path) = cli.generate_baseline {
        info!("Generating baseline file...");
        let baseline = Baseline::from_findings(&findings, &cli.path);
        match baseline.save(baseline_path) {
            Ok(()) => eprintln!(
                "{}",
                format!(
                    "📋 Baseline generated: {} ({} issues)",
                    baseline_path.display(),
                    findings.len()
                )
                .green()
            ),
            Err(e) => eprintln!("{}: Failed to generate baseline: {:#}", "Error".red(), e),
        }
    }

    // Step 5: Filter by baseline if provided
    let findings = if let Some(ref baseline_path) = cli.baseline {
        match Baseline::load(baseline_path) {
            Ok(baseline) => {
                let stats = baseline.stats(&findings, &cli.path);
                if !cli.quiet {
                    eprintln!("{}", format!("📋 Baseline: {}", stats).cyan());
                }
                baseline
                    .filter_new(&findings, &cli.path)
                    .into_iter()
                    .cloned()
                    .collect()
            }
            Err(e) => {
                eprintln!("{}: Failed to load baseline: {:#}", "Warning".yellow(), e);
                findings
            }
        }
    } else {
        findings
    };

    // Step 6: Report results
    let report_format = determine_report_format(cli)?;
    let mut report_options = report::ReportOptions::new();
    report_options.output_path = cli.output.clone();
    report_options.base_path = Some(cli.path.clone());
    report_options.expand_all = cli.expand;
    report_options.top_n = cli.top;
    report_options.files_count = Some(files.len());
    report_options.declarations_count = Some(graph.declaration_count());

    let reporter = Reporter::with_options(report_format, report_options);
    reporter.report(&findings)?;

    let elapsed = start_time.elapsed();
    info!("Analysis completed in {:.2}s", elapsed.as_secs_f64());

    Ok(findings.iter().any(|f| f.severity == Severity::Error))
}
