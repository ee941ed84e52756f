//! `slots`: list, book and cancel slots in a YAML calendar from the shell.
//!
//! Results go to stdout as JSON; logs go to stderr.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{ArgAction, Parser, Subcommand};
use slot_engine::{CalendarStore, ErrorKind, Scheduler, SlotError, DEFAULT_CALENDAR_PATH};
use tracing_subscriber::EnvFilter;

/// Single-resource appointment calendar
#[derive(Parser, Debug)]
#[command(name = "slots")]
#[command(version, about, long_about = None)]
struct Args {
    /// Path to the calendar YAML document
    #[arg(short, long, global = true, default_value = DEFAULT_CALENDAR_PATH)]
    calendar: PathBuf,

    /// Increase log verbosity (-v info, -vv debug); RUST_LOG overrides
    #[arg(short, long, global = true, action = ArgAction::Count)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// List free and booked slots for a day
    List {
        /// ISO date (YYYY-MM-DD); defaults to tomorrow (UTC)
        date: Option<String>,
        /// Omit attendee names from the output
        #[arg(long)]
        redact: bool,
    },
    /// Book a free hour
    Book {
        /// ISO date (YYYY-MM-DD)
        date: String,
        /// Hour as listed, e.g. 09:00
        hour: String,
        /// Name of the attendee
        attendee: String,
    },
    /// Cancel the single booking matching the given criteria
    Cancel {
        /// ISO date (YYYY-MM-DD)
        date: String,
        /// Hour of the booking
        #[arg(long)]
        hour: Option<String>,
        /// Attendee name (case-insensitive)
        #[arg(long)]
        attendee: Option<String>,
    },
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_tracing(args.verbose);

    match run(&args) {
        Ok(output) => {
            println!("{output}");
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("error: {err:#}");
            match err.downcast_ref::<SlotError>() {
                Some(slot_err) => {
                    println!(
                        "{}",
                        serde_json::json!({
                            "error": slot_err.kind(),
                            "message": slot_err.to_string(),
                        })
                    );
                    exit_code(slot_err.kind())
                }
                None => ExitCode::FAILURE,
            }
        }
    }
}

fn run(args: &Args) -> anyhow::Result<String> {
    tracing::debug!(calendar = %args.calendar.display(), "running command");
    let scheduler = Scheduler::new(CalendarStore::new(&args.calendar));

    let output = match &args.command {
        Command::List { date, redact } => {
            let listing = scheduler
                .list_slots(date.as_deref())
                .with_context(|| format!("failed to list {}", args.calendar.display()))?;
            if *redact {
                serde_json::to_string_pretty(&listing.redacted())?
            } else {
                serde_json::to_string_pretty(&listing)?
            }
        }
        Command::Book {
            date,
            hour,
            attendee,
        } => {
            let message = scheduler.book_slot(date, hour, attendee)?;
            serde_json::json!({ "message": message }).to_string()
        }
        Command::Cancel {
            date,
            hour,
            attendee,
        } => {
            let message = scheduler.cancel_slot(date, hour.as_deref(), attendee.as_deref())?;
            serde_json::json!({ "message": message }).to_string()
        }
    };

    Ok(output)
}

fn init_tracing(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn exit_code(kind: ErrorKind) -> ExitCode {
    match kind {
        ErrorKind::SlotUnavailable => ExitCode::from(2),
        ErrorKind::AmbiguousCancellation => ExitCode::from(3),
        _ => ExitCode::FAILURE,
    }
}
