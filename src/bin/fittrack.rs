//! FitTrack CLI - Command-line interface for FitTrack Insights
//!
//! Commands:
//! - recommend: Compute recommendations for the trailing week
//! - report: Build weekly report data for the renderer
//! - validate: Report degraded records in a history document
//! - doctor: Diagnose configuration and data source health

use chrono::{Local, NaiveDate, Utc};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use fittrack_insights::config::WINDOW_DAYS;
use fittrack_insights::encoder::ResponseEncoder;
use fittrack_insights::normalizer::parse_timestamp;
use fittrack_insights::{
    load_history, validate_history, AggregatorConfig, DirectorySource, InsightConfig,
    InsightEngine, InsightError, RawHistory, ReportRequest, TotalsScope, INSIGHTS_VERSION,
    PRODUCER_NAME,
};

/// FitTrack - Weekly insights for logged workouts, meals and sleep
#[derive(Parser)]
#[command(name = "fittrack")]
#[command(author = "FitTrack Developers")]
#[command(version = INSIGHTS_VERSION)]
#[command(about = "Turn logged health events into recommendations and weekly reports", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute recommendations for the trailing week
    Recommend {
        #[command(flatten)]
        history: HistoryArgs,

        /// Last day of the week (YYYY-MM-DD, defaults to today)
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Build weekly report data for the renderer
    Report {
        #[command(flatten)]
        history: HistoryArgs,

        /// End of the report window (ISO timestamp, defaults to now in UTC)
        #[arg(long)]
        end: Option<String>,

        /// Recipient e-mail; a placeholder address is used when omitted
        #[arg(long)]
        email: Option<String>,

        /// Pretty-print the output
        #[arg(long)]
        pretty: bool,
    },

    /// Report degraded records in a history document
    Validate {
        /// Input file path (use - for stdin)
        #[arg(short, long)]
        input: PathBuf,

        /// Output validation report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Diagnose configuration and data source health
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct HistoryArgs {
    /// History document `{workouts, meals, sleeps}` (use - for stdin)
    #[arg(short, long, conflicts_with = "data_dir")]
    input: Option<PathBuf>,

    /// Directory source root (`<dir>/<workout|meal|sleep>/<user>.json`)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// User whose history is loaded from the directory source
    #[arg(long, default_value = "1")]
    user_id: String,

    /// Which records count toward totals
    #[arg(long, value_enum)]
    totals_scope: Option<ScopeArg>,
}

#[derive(Clone, Copy, Debug, PartialEq, ValueEnum)]
enum ScopeArg {
    /// Dated records inside the window
    Window,
    /// Dated records inside the window plus undated records
    #[value(name = "window_and_undated")]
    WindowAndUndated,
    /// Every record regardless of date
    #[value(name = "all_history", alias = "unfiltered")]
    AllHistory,
}

impl From<ScopeArg> for TotalsScope {
    fn from(arg: ScopeArg) -> Self {
        match arg {
            ScopeArg::Window => TotalsScope::Window,
            ScopeArg::WindowAndUndated => TotalsScope::WindowAndUndated,
            ScopeArg::AllHistory => TotalsScope::AllHistory,
        }
    }
}

fn main() -> ExitCode {
    init_logging();
    let cli = Cli::parse();

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", serde_json::to_string(&CliError::from(e)).unwrap_or_else(|_| "Unknown error".to_string()));
            ExitCode::FAILURE
        }
    }
}

/// Log filter from `FITTRACK_LOG`, then `RUST_LOG`, defaulting to `info`
fn init_logging() {
    let log_env = std::env::var("FITTRACK_LOG")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let env_filter = tracing_subscriber::EnvFilter::try_new(&log_env)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .compact()
        .with_writer(io::stderr)
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
}

fn run(cli: Cli) -> Result<(), CliFailure> {
    let config = InsightConfig::from_env()?;

    match cli.command {
        Commands::Recommend {
            history,
            today,
            pretty,
        } => cmd_recommend(&config, &history, today, pretty),

        Commands::Report {
            history,
            end,
            email,
            pretty,
        } => cmd_report(&config, &history, end.as_deref(), email, pretty),

        Commands::Validate { input, json } => cmd_validate(&input, json),

        Commands::Doctor { json } => cmd_doctor(&config, json),
    }
}

fn cmd_recommend(
    config: &InsightConfig,
    args: &HistoryArgs,
    today: Option<NaiveDate>,
    pretty: bool,
) -> Result<(), CliFailure> {
    let engine = InsightEngine::new(aggregator_config(config, args));
    let raw = read_history(config, args)?;
    let today = today.unwrap_or_else(|| Local::now().date_naive());

    let recommendation = engine.recommend(&raw, today)?;
    let envelope = ResponseEncoder::encode_recommendation(&recommendation);
    let output = if pretty {
        serde_json::to_string_pretty(&envelope)?
    } else {
        serde_json::to_string(&envelope)?
    };
    println!("{output}");
    Ok(())
}

fn cmd_report(
    config: &InsightConfig,
    args: &HistoryArgs,
    end: Option<&str>,
    email: Option<String>,
    pretty: bool,
) -> Result<(), CliFailure> {
    let engine = InsightEngine::new(aggregator_config(config, args));
    let raw = read_history(config, args)?;

    let end = match end {
        Some(value) => parse_timestamp(value)
            .ok_or_else(|| CliFailure::Argument(format!("invalid --end timestamp '{value}'")))?,
        None => Utc::now().naive_utc(),
    };

    let mut request = ReportRequest::weekly(args.user_id.clone(), end)?;
    request.recipient = email;
    let report = engine.weekly_report(&raw, &request);

    println!("{}", ResponseEncoder::report_to_json(&report, pretty)?);
    Ok(())
}

fn cmd_validate(input: &Path, json: bool) -> Result<(), CliFailure> {
    let raw = RawHistory::from_json(&read_input(input)?)?;
    let report = validate_history(&raw);

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("Validation Report");
        println!("=================");
        for collection in &report.collections {
            println!(
                "{:<8} total: {:>5}  non-object: {:>4}  undated: {:>4}",
                collection.collection.collection_key(),
                collection.total_records,
                collection.non_object_records,
                collection.undated_records
            );
        }
    }

    // Degraded records are still usable; report them without failing
    if !report.is_clean() {
        tracing::warn!(degraded = report.degraded_records(), "history contains degraded records");
    }
    Ok(())
}

fn cmd_doctor(config: &InsightConfig, json: bool) -> Result<(), CliFailure> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("{PRODUCER_NAME} {INSIGHTS_VERSION}"),
    });

    let agg = &config.aggregator;
    checks.push(DoctorCheck {
        name: "aggregator".to_string(),
        status: CheckStatus::Ok,
        message: format!(
            "sleep fallback {}h, calorie fallback {} kcal, {} day window, scope {}",
            agg.sleep_fallback_hours,
            agg.calorie_fallback,
            WINDOW_DAYS,
            agg.totals_scope.as_str()
        ),
    });

    checks.push(match &config.data_dir {
        Some(dir) if dir.is_dir() => DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Ok,
            message: format!("Data directory {}", dir.display()),
        },
        Some(dir) => DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Error,
            message: format!("Data directory {} does not exist", dir.display()),
        },
        None => DoctorCheck {
            name: "data_dir".to_string(),
            status: CheckStatus::Warning,
            message: "FITTRACK_DATA_DIR not set; pass --input or --data-dir".to_string(),
        },
    });

    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (use --input <file>)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (--input - ready)".to_string(),
        }
    };
    checks.push(stdin_check);

    let report = DoctorReport {
        producer: PRODUCER_NAME.to_string(),
        version: INSIGHTS_VERSION.to_string(),
        checks,
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!("FitTrack Doctor Report");
        println!("======================");
        println!("Producer: {}", report.producer);
        println!("Version:  {}", report.version);
        println!("\nChecks:");

        for check in &report.checks {
            let status_icon = match check.status {
                CheckStatus::Ok => "[OK]",
                CheckStatus::Warning => "[WARN]",
                CheckStatus::Error => "[ERR]",
            };
            println!("  {} {}: {}", status_icon, check.name, check.message);
        }
    }

    let has_errors = report.checks.iter().any(|c| matches!(c.status, CheckStatus::Error));
    if has_errors {
        Err(CliFailure::DoctorFailed)
    } else {
        Ok(())
    }
}

// Helper functions

fn aggregator_config(config: &InsightConfig, args: &HistoryArgs) -> AggregatorConfig {
    let mut aggregator = config.aggregator.clone();
    if let Some(scope) = args.totals_scope {
        aggregator.totals_scope = scope.into();
    }
    aggregator
}

fn read_history(config: &InsightConfig, args: &HistoryArgs) -> Result<RawHistory, CliFailure> {
    if let Some(input) = &args.input {
        return Ok(RawHistory::from_json(&read_input(input)?)?);
    }

    let dir = args
        .data_dir
        .clone()
        .or_else(|| config.data_dir.clone())
        .ok_or(CliFailure::NoHistorySource)?;
    let source = DirectorySource::new(dir);
    Ok(load_history(&source, &args.user_id))
}

fn read_input(input: &Path) -> Result<String, CliFailure> {
    if input.to_string_lossy() == "-" {
        if atty::is(atty::Stream::Stdin) {
            return Err(CliFailure::NoPipedInput);
        }
        let mut buffer = String::new();
        io::stdin().read_to_string(&mut buffer)?;
        Ok(buffer)
    } else {
        Ok(fs::read_to_string(input)?)
    }
}

// Error handling

#[derive(Debug)]
enum CliFailure {
    Io(io::Error),
    Insight(InsightError),
    Json(serde_json::Error),
    Argument(String),
    NoHistorySource,
    NoPipedInput,
    DoctorFailed,
}

impl From<io::Error> for CliFailure {
    fn from(e: io::Error) -> Self {
        CliFailure::Io(e)
    }
}

impl From<InsightError> for CliFailure {
    fn from(e: InsightError) -> Self {
        CliFailure::Insight(e)
    }
}

impl From<serde_json::Error> for CliFailure {
    fn from(e: serde_json::Error) -> Self {
        CliFailure::Json(e)
    }
}

#[derive(serde::Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<CliFailure> for CliError {
    fn from(e: CliFailure) -> Self {
        match e {
            CliFailure::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            CliFailure::Insight(InsightError::Config(msg)) => CliError {
                code: "CONFIG_ERROR".to_string(),
                message: msg,
                hint: Some("Check FITTRACK_* environment variables and flags".to_string()),
            },
            CliFailure::Insight(e) => CliError {
                code: "INSIGHT_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Ensure input is a {workouts, meals, sleeps} JSON object".to_string()),
            },
            CliFailure::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            CliFailure::Argument(msg) => CliError {
                code: "ARGUMENT_ERROR".to_string(),
                message: msg,
                hint: Some("Timestamps look like 2024-01-15T06:00:00".to_string()),
            },
            CliFailure::NoHistorySource => CliError {
                code: "NO_HISTORY_SOURCE".to_string(),
                message: "No history input given".to_string(),
                hint: Some("Pass --input, --data-dir or set FITTRACK_DATA_DIR".to_string()),
            },
            CliFailure::NoPipedInput => CliError {
                code: "NO_PIPED_INPUT".to_string(),
                message: "stdin is a terminal".to_string(),
                hint: Some("Pipe a history document or pass --input <file>".to_string()),
            },
            CliFailure::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the doctor report for details".to_string()),
            },
        }
    }
}

// Report types

#[derive(serde::Serialize)]
struct DoctorReport {
    producer: String,
    version: String,
    checks: Vec<DoctorCheck>,
}

#[derive(serde::Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(serde::Serialize)]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}
