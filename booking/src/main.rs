//! Event booking command-line front end.
//!
//! Opens the ledger stored under `BOOKING_DATA_DIR`, runs one command and
//! prints the result.

use anyhow::Context;
use clap::{Parser, Subcommand};
use event_booking::{
    metrics::register_business_metrics, BookingError, BookingLedger, Config, FileKeyValueStore,
    LedgerView, Placement, RegistrantId,
};
use event_booking_core::environment::SystemClock;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "event-booking")]
#[command(about = "Slot-limited event registration with a waiting list")]
#[command(version)]
struct Cli {
    /// Directory holding the ledger (overrides BOOKING_DATA_DIR)
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Register an entrant; confirmed if a slot is free, waitlisted otherwise
    Register {
        /// Entrant name
        #[arg(long)]
        name: String,

        /// Entrant email, unique across bookings and the waiting list
        #[arg(long)]
        email: String,
    },

    /// Cancel a confirmed booking by id
    Cancel {
        /// Booking id as shown by `list`
        id: RegistrantId,
    },

    /// Clear all bookings and the waiting list
    Reset,

    /// Show available slots, bookings and the waiting list
    List {
        /// Print the ledger view as JSON
        #[arg(long)]
        json: bool,
    },
}

fn main() -> anyhow::Result<ExitCode> {
    dotenvy::dotenv().ok();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info,event_booking=debug".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    event_booking_runtime::metrics::register_metrics();
    register_business_metrics();

    let cli = Cli::parse();
    let mut config = Config::from_env();
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }

    info!(
        event_slots = config.total_slots(),
        data_dir = %config.data_dir.display(),
        "Configuration loaded"
    );

    let storage = FileKeyValueStore::open(&config.data_dir)
        .with_context(|| format!("failed to open data directory {}", config.data_dir.display()))?;
    let mut ledger = BookingLedger::open(config.event_slots, Arc::new(storage), Arc::new(SystemClock));

    let outcome = match cli.command.unwrap_or(Commands::List { json: false }) {
        Commands::Register { name, email } => ledger.register(&name, &email).map(|registration| {
            let registrant = &registration.registrant;
            match registration.placement {
                Placement::Confirmed => {
                    println!("Booked {} <{}> (id {})", registrant.name, registrant.email, registrant.id);
                },
                Placement::Waitlisted => {
                    let position = ledger
                        .position_in_waiting_list(&registrant.email)
                        .unwrap_or_default();
                    println!(
                        "No slots left: {} <{}> is #{position} on the waiting list (id {})",
                        registrant.name, registrant.email, registrant.id
                    );
                },
            }
        }),
        Commands::Cancel { id } => ledger.cancel(id).map(|cancellation| {
            println!("Canceled booking for {}", cancellation.removed.name);
            if let Some(promoted) = cancellation.promoted {
                println!("{} <{}> moved from the waiting list", promoted.name, promoted.email);
            }
        }),
        Commands::Reset => ledger.reset().map(|()| println!("All bookings cleared")),
        Commands::List { json } => {
            let view = ledger.view();
            if json {
                println!("{}", serde_json::to_string_pretty(&view)?);
            } else {
                print_view(&view);
            }
            Ok(())
        },
    };

    match outcome {
        Ok(()) => Ok(ExitCode::SUCCESS),
        Err(error) if error.is_rejection() => {
            eprintln!("{}", notice(&error));
            Ok(ExitCode::FAILURE)
        },
        Err(error) => Err(error).context("ledger operation failed"),
    }
}

/// User-facing message for a rejected command
fn notice(error: &BookingError) -> String {
    match error {
        BookingError::InvalidInput { .. } => "Please enter both name and email.".to_string(),
        BookingError::DuplicateEmail { .. } => {
            "This email is already used for booking or waiting list.".to_string()
        },
        other => other.to_string(),
    }
}

fn print_view(view: &LedgerView) {
    println!("Available slots: {}", view.available_slots);

    println!(
        "\nConfirmed bookings ({}/{})",
        view.bookings.len(),
        view.total_slots
    );
    if view.bookings.is_empty() {
        println!("  (none)");
    }
    for booking in &view.bookings {
        println!("  [{}] {} <{}>", booking.id, booking.name, booking.email);
    }

    println!("\nWaiting list ({})", view.waiting_list.len());
    if view.waiting_list.is_empty() {
        println!("  (none)");
    }
    for (index, entry) in view.waiting_list.iter().enumerate() {
        println!("  {}. [{}] {} <{}>", index + 1, entry.id, entry.name, entry.email);
    }
}
