//! habit CLI - Command-line interface for habit-strength
//!
//! Commands:
//! - score: Compute one day's score from the previous score
//! - history: Compute a day-by-day score history from a checkmark sequence
//! - truncate: Truncate a timestamp to a calendar unit
//! - weekday: Internal weekday number of a timestamp
//! - days-between: Whole days between two timestamps
//! - weekdays-label: Summarize a weekday set
//! - day-names: Print weekday names in locale order
//! - doctor: Diagnose configuration and clock

use clap::{Parser, Subcommand, ValueEnum};
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde::Serialize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use habit_strength::calendar;
use habit_strength::clock::{Clock, SystemClock, Zone, ZoneSpec};
use habit_strength::locale::LocaleTag;
use habit_strength::types::parse_outcomes;
use habit_strength::{
    CalendarConfig, CheckmarkOutcome, NameFormat, ScoreEngine, ScoreHistory, StrengthError,
    TimeNormalizer, MAX_SCORE, MILLISECONDS_IN_ONE_DAY, VERSION,
};

type Normalizer = TimeNormalizer<SystemClock, ZoneSpec, LocaleTag>;

/// habit - Habit strength scores and timezone-independent calendar math
#[derive(Parser)]
#[command(name = "habit")]
#[command(version = VERSION)]
#[command(about = "Compute habit strength and calendar boundaries", long_about = None)]
struct Cli {
    /// Calendar configuration file (JSON)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Log debug output to stderr
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compute one day's score from the previous score
    Score {
        /// Repetitions per day, e.g. 0.375 for 3 times in 8 days
        #[arg(long)]
        frequency: f64,

        /// Previous score
        #[arg(long, default_value = "0")]
        previous: u32,

        /// Today's checkmark
        #[arg(long, value_enum, default_value = "unchecked")]
        outcome: OutcomeArg,
    },

    /// Compute a day-by-day score history from a checkmark sequence
    History {
        /// Repetitions per day
        #[arg(long)]
        frequency: f64,

        /// Checkmarks, oldest first, e.g. "2 0 1 2" (reads stdin if omitted)
        #[arg(long)]
        outcomes: Option<String>,

        /// Date of the first checkmark (defaults so the last one is today)
        #[arg(long)]
        start: Option<String>,

        /// Output format
        #[arg(long, default_value = "table")]
        output_format: OutputFormat,
    },

    /// Truncate a timestamp to the start of a calendar unit
    Truncate {
        /// month, week, quarter or year
        unit: String,

        /// Epoch millis (already normalized), YYYY-MM-DD, or RFC 3339
        timestamp: String,
    },

    /// Internal weekday number (0 = Saturday … 6 = Friday) of a timestamp
    Weekday {
        /// Epoch millis (already normalized), YYYY-MM-DD, or RFC 3339
        timestamp: String,
    },

    /// Whole days between two timestamps
    DaysBetween {
        from: String,
        to: String,
    },

    /// Summarize a weekday set, e.g. "1100000" or "sat,sun"
    WeekdaysLabel {
        /// Seven 0/1 flags starting at Saturday, or comma-separated day names
        days: String,
    },

    /// Print weekday names starting at the locale's first day of week
    DayNames {
        #[arg(long, value_enum, default_value = "long")]
        format: NameFormatArg,
    },

    /// Diagnose configuration and clock
    Doctor {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Clone, Copy, ValueEnum)]
enum OutcomeArg {
    Unchecked,
    Implicit,
    Explicit,
}

impl From<OutcomeArg> for CheckmarkOutcome {
    fn from(arg: OutcomeArg) -> Self {
        match arg {
            OutcomeArg::Unchecked => CheckmarkOutcome::Unchecked,
            OutcomeArg::Implicit => CheckmarkOutcome::CheckedImplicitly,
            OutcomeArg::Explicit => CheckmarkOutcome::CheckedExplicitly,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
enum NameFormatArg {
    Long,
    Short,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// One line per day
    Table,
    /// JSON array of scores, newest first
    Json,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!(
                "{}",
                serde_json::to_string(&CliError::from(e))
                    .unwrap_or_else(|_| "Unknown error".to_string())
            );
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let level = if verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::WARN
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_ansi(false),
        )
        .with(EnvFilter::from_default_env().add_directive(level.into()))
        .init();
}

fn run(cli: Cli) -> Result<(), HabitCliError> {
    // Doctor reports a broken config instead of failing on it
    let config = || load_config(cli.config.as_deref());

    match cli.command {
        Commands::Score {
            frequency,
            previous,
            outcome,
        } => cmd_score(frequency, previous, outcome.into()),

        Commands::History {
            frequency,
            outcomes,
            start,
            output_format,
        } => cmd_history(&config()?, frequency, outcomes, start.as_deref(), output_format),

        Commands::Truncate { unit, timestamp } => cmd_truncate(&config()?, &unit, &timestamp),

        Commands::Weekday { timestamp } => {
            let normalizer = config()?.build(SystemClock)?;
            let t = parse_timestamp(&normalizer, &timestamp)?;
            let weekday = calendar::get_weekday(t);
            println!("{} ({})", weekday, normalizer.get_long_day_names()[weekday as usize]);
            Ok(())
        }

        Commands::DaysBetween { from, to } => {
            let normalizer = config()?.build(SystemClock)?;
            let t1 = parse_timestamp(&normalizer, &from)?;
            let t2 = parse_timestamp(&normalizer, &to)?;
            println!("{}", calendar::get_days_between(t1, t2));
            Ok(())
        }

        Commands::WeekdaysLabel { days } => {
            let normalizer = config()?.build(SystemClock)?;
            let set = parse_weekday_set(&normalizer, &days)?;
            println!("{}", normalizer.format_weekday_list(&set));
            Ok(())
        }

        Commands::DayNames { format } => {
            let normalizer = config()?.build(SystemClock)?;
            let format = match format {
                NameFormatArg::Long => NameFormat::Long,
                NameFormatArg::Short => NameFormat::Short,
            };
            println!("{}", normalizer.get_locale_day_names(format).join(" "));
            Ok(())
        }

        Commands::Doctor { json } => cmd_doctor(cli.config.as_deref(), json),
    }
}

fn load_config(path: Option<&Path>) -> Result<CalendarConfig, HabitCliError> {
    match path {
        Some(path) => Ok(CalendarConfig::from_json(&fs::read_to_string(path)?)?),
        None => Ok(CalendarConfig::default()),
    }
}

fn cmd_score(frequency: f64, previous: u32, outcome: CheckmarkOutcome) -> Result<(), HabitCliError> {
    let score = ScoreEngine::try_compute(frequency, previous, outcome)?;
    println!("{}", score);
    Ok(())
}

fn cmd_history(
    config: &CalendarConfig,
    frequency: f64,
    outcomes: Option<String>,
    start: Option<&str>,
    output_format: OutputFormat,
) -> Result<(), HabitCliError> {
    let normalizer = config.build(SystemClock)?;

    let raw = match outcomes {
        Some(raw) => raw,
        None => {
            let mut buffer = String::new();
            io::stdin().read_to_string(&mut buffer)?;
            buffer
        }
    };
    let outcomes = parse_outcomes(&raw)?;
    if outcomes.is_empty() {
        return Err(HabitCliError::NoOutcomes);
    }

    let first_day = match start {
        Some(start) => calendar::get_start_of_day(parse_timestamp(&normalizer, start)?)?,
        None => {
            let today = normalizer.get_start_of_today()?;
            i64::try_from(outcomes.len() - 1)
                .ok()
                .and_then(|days| days.checked_mul(MILLISECONDS_IN_ONE_DAY))
                .and_then(|span| today.checked_sub(span))
                .ok_or(StrengthError::InvalidTimestamp(today))?
        }
    };

    let history = ScoreHistory::compute(frequency, first_day, &outcomes)?;

    match output_format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&history)?),
        OutputFormat::Table => {
            for score in history.iter() {
                let date = Utc
                    .timestamp_millis_opt(score.timestamp())
                    .single()
                    .map(|d| d.format("%Y-%m-%d").to_string())
                    .unwrap_or_else(|| score.timestamp().to_string());
                println!(
                    "{}  {:>10}  {:5.1}%",
                    date,
                    score.value(),
                    score.fraction() * 100.0
                );
            }
        }
    }

    Ok(())
}

fn cmd_truncate(config: &CalendarConfig, unit: &str, timestamp: &str) -> Result<(), HabitCliError> {
    let normalizer = config.build(SystemClock)?;
    let t = parse_timestamp(&normalizer, timestamp)?;
    let truncated = normalizer.truncate_named(unit, t)?;
    let display = Utc
        .timestamp_millis_opt(truncated)
        .single()
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default();
    println!("{} ({})", truncated, display);
    Ok(())
}

fn cmd_doctor(config_path: Option<&Path>, json: bool) -> Result<(), HabitCliError> {
    let mut checks: Vec<DoctorCheck> = Vec::new();

    checks.push(DoctorCheck {
        name: "version".to_string(),
        status: CheckStatus::Ok,
        message: format!("habit-strength version {}", VERSION),
    });

    let config = match config_path {
        Some(path) => match fs::read_to_string(path) {
            Ok(content) => match CalendarConfig::from_json(&content) {
                Ok(config) => {
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Ok,
                        message: format!("Config file valid ({})", path.display()),
                    });
                    Some(config)
                }
                Err(e) => {
                    checks.push(DoctorCheck {
                        name: "config".to_string(),
                        status: CheckStatus::Error,
                        message: format!("Invalid config: {}", e),
                    });
                    None
                }
            },
            Err(e) => {
                checks.push(DoctorCheck {
                    name: "config".to_string(),
                    status: CheckStatus::Error,
                    message: format!("Cannot read config file: {}", e),
                });
                None
            }
        },
        None => {
            checks.push(DoctorCheck {
                name: "config".to_string(),
                status: CheckStatus::Warning,
                message: "No config file, using defaults (UTC, en, Sunday first)".to_string(),
            });
            Some(CalendarConfig::default())
        }
    };

    if let Some(config) = config {
        let now = SystemClock.now_millis();
        let offset_minutes = config.timezone.offset_millis_at(now) / 60_000;
        checks.push(DoctorCheck {
            name: "timezone".to_string(),
            status: CheckStatus::Ok,
            message: format!(
                "Timezone {} (offset {:+} minutes)",
                config.timezone, offset_minutes
            ),
        });

        match config.build(SystemClock) {
            Ok(normalizer) => {
                let clock = normalizer.get_start_of_today_date().and_then(|today| {
                    Ok((today, normalizer.milliseconds_until_tomorrow()?))
                });
                checks.push(match clock {
                    Ok((today, remaining)) => DoctorCheck {
                        name: "clock".to_string(),
                        status: CheckStatus::Ok,
                        message: format!("Today is {} ({} ms until tomorrow)", today, remaining),
                    },
                    Err(e) => DoctorCheck {
                        name: "clock".to_string(),
                        status: CheckStatus::Error,
                        message: e.to_string(),
                    },
                });
            }
            Err(e) => checks.push(DoctorCheck {
                name: "clock".to_string(),
                status: CheckStatus::Error,
                message: e.to_string(),
            }),
        }
    }

    // History reads checkmarks from stdin when --outcomes is omitted
    let stdin_check = if atty::is(atty::Stream::Stdin) {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a TTY (pass --outcomes to history)".to_string(),
        }
    } else {
        DoctorCheck {
            name: "stdin".to_string(),
            status: CheckStatus::Ok,
            message: "stdin is a pipe (history can read checkmarks)".to_string(),
        }
    };
    checks.push(stdin_check);

    let has_errors = checks.iter().any(|c| matches!(c.status, CheckStatus::Error));

    if json {
        let report = DoctorReport {
            healthy: !has_errors,
            max_score: MAX_SCORE,
            checks,
        };
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        for check in &checks {
            let icon = match check.status {
                CheckStatus::Ok => "✓",
                CheckStatus::Warning => "!",
                CheckStatus::Error => "✗",
            };
            println!("{} {}: {}", icon, check.name, check.message);
        }
    }

    if has_errors {
        Err(HabitCliError::DoctorFailed)
    } else {
        Ok(())
    }
}

/// Accepts epoch millis (taken as already normalized), `YYYY-MM-DD`
/// (midnight on the normalized timeline), or RFC 3339 (a real instant,
/// shifted into the configured zone).
fn parse_timestamp(normalizer: &Normalizer, input: &str) -> Result<i64, HabitCliError> {
    let input = input.trim();

    if let Ok(millis) = input.parse::<i64>() {
        return Ok(millis);
    }

    if let Ok(date) = NaiveDate::parse_from_str(input, "%Y-%m-%d") {
        let midnight = date
            .and_hms_opt(0, 0, 0)
            .ok_or_else(|| HabitCliError::ParseError(format!("invalid date '{}'", input)))?;
        return Ok(Utc.from_utc_datetime(&midnight).timestamp_millis());
    }

    let instant = DateTime::parse_from_rfc3339(input)
        .map_err(|e| HabitCliError::ParseError(format!("invalid timestamp '{}': {}", input, e)))?;
    Ok(normalizer.remove_timezone(instant.timestamp_millis())?)
}

fn parse_weekday_set(normalizer: &Normalizer, input: &str) -> Result<[bool; 7], HabitCliError> {
    let input = input.trim();
    let mut set = [false; 7];

    if input.len() == 7 && input.chars().all(|c| c == '0' || c == '1') {
        for (slot, c) in set.iter_mut().zip(input.chars()) {
            *slot = c == '1';
        }
        return Ok(set);
    }

    let short_names = normalizer.get_short_day_names();
    let long_names = normalizer.get_long_day_names();
    for token in input.split(',').map(str::trim).filter(|t| !t.is_empty()) {
        let index = (0..7)
            .find(|&i| {
                short_names[i].eq_ignore_ascii_case(token) || long_names[i].eq_ignore_ascii_case(token)
            })
            .ok_or_else(|| HabitCliError::ParseError(format!("unknown weekday '{}'", token)))?;
        set[index] = true;
    }

    Ok(set)
}

#[derive(Serialize)]
struct DoctorReport {
    healthy: bool,
    max_score: u32,
    checks: Vec<DoctorCheck>,
}

#[derive(Serialize)]
struct DoctorCheck {
    name: String,
    status: CheckStatus,
    message: String,
}

#[derive(Serialize)]
#[serde(rename_all = "lowercase")]
enum CheckStatus {
    Ok,
    Warning,
    Error,
}

#[derive(Debug)]
enum HabitCliError {
    Io(io::Error),
    Compute(StrengthError),
    Json(serde_json::Error),
    NoOutcomes,
    DoctorFailed,
    ParseError(String),
}

impl From<io::Error> for HabitCliError {
    fn from(e: io::Error) -> Self {
        HabitCliError::Io(e)
    }
}

impl From<StrengthError> for HabitCliError {
    fn from(e: StrengthError) -> Self {
        HabitCliError::Compute(e)
    }
}

impl From<serde_json::Error> for HabitCliError {
    fn from(e: serde_json::Error) -> Self {
        HabitCliError::Json(e)
    }
}

#[derive(Serialize)]
struct CliError {
    code: String,
    message: String,
    hint: Option<String>,
}

impl From<HabitCliError> for CliError {
    fn from(e: HabitCliError) -> Self {
        match e {
            HabitCliError::Io(e) => CliError {
                code: "IO_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check file paths and permissions".to_string()),
            },
            HabitCliError::Compute(e) => {
                let hint = match &e {
                    StrengthError::InvalidFrequency(_) => {
                        Some("Frequency is repetitions / days and must be in (0, 14)".to_string())
                    }
                    StrengthError::InvalidTimezone(_) => {
                        Some("Use UTC, local, or an offset such as +09:00".to_string())
                    }
                    StrengthError::InvalidArgument(_) => {
                        Some("Run with --help to see accepted values".to_string())
                    }
                    _ => None,
                };
                CliError {
                    code: "COMPUTE_ERROR".to_string(),
                    message: e.to_string(),
                    hint,
                }
            }
            HabitCliError::Json(e) => CliError {
                code: "JSON_ERROR".to_string(),
                message: e.to_string(),
                hint: Some("Check JSON syntax".to_string()),
            },
            HabitCliError::NoOutcomes => CliError {
                code: "NO_OUTCOMES".to_string(),
                message: "No checkmarks in input".to_string(),
                hint: Some("Pass --outcomes \"2 0 1\" or pipe checkmarks on stdin".to_string()),
            },
            HabitCliError::DoctorFailed => CliError {
                code: "DOCTOR_FAILED".to_string(),
                message: "One or more health checks failed".to_string(),
                hint: Some("Review the check results above".to_string()),
            },
            HabitCliError::ParseError(msg) => CliError {
                code: "PARSE_ERROR".to_string(),
                message: msg,
                hint: None,
            },
        }
    }
}
