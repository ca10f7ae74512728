//! `agenda` CLI — run the clinic's booking checks over JSON day snapshots.
//!
//! ## Usage
//!
//! ```sh
//! # Can this booking go ahead? (exit code 2 on conflict)
//! agenda check --day day.json --request request.json
//!
//! # Free start times for professional 1, 60-minute session
//! agenda slots --day day.json --professional 1 --duration 60 --date 2026-03-02
//!
//! # Free camilles in the Dins zone at a given time
//! agenda rooms --day day.json --zone Dins --at 2026-03-02T09:30:00Z --duration 30
//!
//! # Machine view grid blocks
//! agenda grid --day day.json --view machines
//!
//! # Print the effective roster
//! agenda --roster clinic.json roster
//! ```

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::io::{self, Read};
use std::process;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use agenda_engine::day::{appointments_on, local_date};
use agenda_engine::{Appointment, AppointmentId, BookingRequest, ProfessionalId, Roster, Zone};

/// Exit code for a booking that conflicts.
const EXIT_CONFLICT: i32 = 2;

#[derive(Parser)]
#[command(
    name = "agenda",
    version,
    about = "Clinic agenda conflict and availability checks"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Roster JSON file (defaults to the clinic's built-in roster)
    #[arg(long, global = true, env = "AGENDA_ROSTER")]
    roster: Option<String>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// Check a booking request against the day's appointments
    Check {
        /// Day snapshot: JSON array of appointments (reads from stdin if omitted)
        #[arg(short, long)]
        day: Option<String>,
        /// Booking request JSON file
        #[arg(short, long)]
        request: String,
        /// Appointment id being edited; its own slot is ignored
        #[arg(long)]
        exclude: Option<String>,
        /// List every conflicting resource, not just the first
        #[arg(long)]
        all: bool,
    },
    /// Show which candidate start times are free for a professional
    Slots {
        #[arg(short, long)]
        day: Option<String>,
        /// Professional id
        #[arg(short, long)]
        professional: String,
        /// Session length in minutes
        #[arg(long, required_unless_present = "session")]
        duration: Option<u32>,
        /// Session type id or name; its duration is used
        #[arg(long, conflicts_with = "duration")]
        session: Option<String>,
        /// Local calendar date (YYYY-MM-DD)
        #[arg(long)]
        date: NaiveDate,
        /// Minutes between candidate start times
        #[arg(long, default_value_t = 30)]
        step: u32,
    },
    /// Show which camilles of a zone are free at a start time
    Rooms {
        #[arg(short, long)]
        day: Option<String>,
        /// Zone: Dins or Fora
        #[arg(long)]
        zone: Zone,
        /// Start instant (RFC 3339)
        #[arg(long)]
        at: DateTime<Utc>,
        /// Session length in minutes
        #[arg(long)]
        duration: u32,
    },
    /// Lay out the day's appointments on the agenda or machine grid
    Grid {
        #[arg(short, long)]
        day: Option<String>,
        #[arg(long, value_enum, default_value_t = View::Professionals)]
        view: View,
        /// Minutes per grid row
        #[arg(long, default_value_t = 10)]
        slot: u32,
        /// Only lay out appointments on this local date
        #[arg(long)]
        date: Option<NaiveDate>,
    },
    /// Print the effective roster as JSON
    Roster,
}

#[derive(Clone, Copy, ValueEnum)]
enum View {
    Professionals,
    Machines,
}

#[derive(Serialize)]
struct SlotRow {
    start: DateTime<Utc>,
    local: String,
    available: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let roster = load_roster(cli.roster.as_deref())?;

    match cli.command {
        Commands::Check {
            day,
            request,
            exclude,
            all,
        } => {
            let request: BookingRequest = serde_json::from_str(&read_input(Some(&request))?)
                .context("Failed to parse booking request")?;
            roster
                .check_known(&request)
                .context("Booking request references an unknown resource")?;

            let date = local_date(request.interval.start(), roster.timezone);
            let existing = appointments_on(date, roster.timezone, &read_day(day.as_deref())?);
            let exclude = exclude.map(AppointmentId::new);
            debug!(%date, appointments = existing.len(), "checking request");

            let result =
                agenda_engine::check_conflict_excluding(&request, &existing, exclude.as_ref());
            let mut output = serde_json::to_value(result.report())?;
            if all {
                let conflicts =
                    agenda_engine::find_all_conflicts(&request, &existing, exclude.as_ref());
                output["conflicts"] = serde_json::to_value(conflicts)?;
            }
            println!("{}", serde_json::to_string_pretty(&output)?);

            if !result.can_proceed() {
                warn!(reason = result.reason().unwrap_or_default(), "booking conflicts");
                process::exit(EXIT_CONFLICT);
            }
        }
        Commands::Slots {
            day,
            professional,
            duration,
            session,
            date,
            step,
        } => {
            let duration = match (duration, session) {
                (Some(minutes), _) => minutes,
                (None, Some(name)) => roster
                    .session_type(&name)
                    .or_else(|| roster.session_type_by_name(&name))
                    .map(|s| s.duration_minutes)
                    .with_context(|| format!("Unknown session type: '{}'", name))?,
                (None, None) => anyhow::bail!("either --duration or --session is required"),
            };
            let professional = ProfessionalId::new(professional);
            if roster.professional(&professional).is_none() {
                warn!(%professional, "professional not in roster; every slot will look free");
            }

            let existing = appointments_on(date, roster.timezone, &read_day(day.as_deref())?);
            let candidates = roster
                .candidate_slots(date, step)
                .context("Failed to build candidate slots")?;
            let table =
                agenda_engine::available_slots(&professional, duration, &candidates, &existing)
                    .context("Failed to compute slot availability")?;

            let rows: Vec<SlotRow> = table
                .into_iter()
                .map(|slot| SlotRow {
                    local: slot
                        .start
                        .with_timezone(&roster.timezone)
                        .format("%H:%M")
                        .to_string(),
                    start: slot.start,
                    available: slot.available,
                })
                .collect();
            info!(
                free = rows.iter().filter(|r| r.available).count(),
                total = rows.len(),
                "slot availability"
            );
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        Commands::Rooms {
            day,
            zone,
            at,
            duration,
        } => {
            let date = local_date(at, roster.timezone);
            let existing = appointments_on(date, roster.timezone, &read_day(day.as_deref())?);
            let table =
                agenda_engine::available_rooms(zone, roster.rooms_per_zone, at, duration, &existing)
                    .context("Failed to compute room availability")?;
            println!("{}", serde_json::to_string_pretty(&table)?);
        }
        Commands::Grid {
            day,
            view,
            slot,
            date,
        } => {
            let mut appointments = read_day(day.as_deref())?;
            if let Some(date) = date {
                appointments = appointments_on(date, roster.timezone, &appointments);
            }
            let axis = match view {
                View::Professionals => roster.professional_axis(),
                View::Machines => roster.machine_axis(),
            };
            let layout = roster
                .grid_layout(slot)
                .context("Failed to build grid layout")?;
            let rows = roster.grid_rows(slot);

            let blocks = agenda_engine::grid_blocks(&appointments, &axis, &layout);
            let occupied = agenda_engine::occupied_cells(&axis, &layout, rows, &appointments);

            let output = serde_json::json!({
                "slotMinutes": slot,
                "rows": rows,
                "columns": axis,
                "blocks": blocks,
                "occupied": occupied,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        Commands::Roster => {
            println!("{}", serde_json::to_string_pretty(&roster)?);
        }
    }

    Ok(())
}

/// Log to stderr. `RUST_LOG` wins over `-v` when set.
fn init_logging(verbose: u8) {
    let default_level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
}

fn load_roster(path: Option<&str>) -> Result<Roster> {
    match path {
        Some(path) => {
            Roster::load(path).with_context(|| format!("Failed to load roster: {}", path))
        }
        None => Ok(Roster::default()),
    }
}

fn read_day(path: Option<&str>) -> Result<Vec<Appointment>> {
    let json = read_input(path)?;
    serde_json::from_str(&json).context("Failed to parse day appointments")
}

fn read_input(path: Option<&str>) -> Result<String> {
    match path {
        Some(path) => {
            std::fs::read_to_string(path).with_context(|| format!("Failed to read file: {}", path))
        }
        None => {
            let mut buf = String::new();
            io::stdin()
                .read_to_string(&mut buf)
                .context("Failed to read from stdin")?;
            Ok(buf)
        }
    }
}
