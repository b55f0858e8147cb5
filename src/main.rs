/// Main entry point for the habit streaks MCP server
///
/// This file sets up logging, parses command line arguments, and starts the MCP server.
/// The server listens for JSON-RPC requests over stdin/stdout following the MCP protocol.

use clap::Parser;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use habit_streaks::config::{default_database_path, ServerConfig};
use habit_streaks::{HabitTrackerServer, LongestStreakPolicy};

/// Command line arguments for the habit streaks MCP server
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Path to the SQLite database file
    /// If not provided, uses a default location in the user's home directory
    #[arg(long, env = "HABIT_TRACKER_DATABASE")]
    database: Option<PathBuf>,

    /// Offset from UTC, in minutes, that decides which day "today" is
    #[arg(long, env = "HABIT_TRACKER_UTC_OFFSET_MINUTES", default_value_t = 0, allow_hyphen_values = true)]
    utc_offset_minutes: i32,

    /// Compute weekly/monthly longest streaks with a full scan instead of the
    /// quick estimate
    #[arg(long)]
    exact_longest_streak: bool,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,

    /// Enable verbose output (implies debug)
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    // Set up logging based on command line flags; RUST_LOG wins when set
    let log_level = if args.verbose {
        "debug"
    } else if args.debug {
        "info"
    } else {
        "warn"
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("habit_streaks={}", log_level)));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr) // stdout carries the protocol
        .init();

    info!("Starting habit streaks MCP server");

    let db_path = match args.database {
        Some(path) => path,
        None => default_database_path()?,
    };

    let policy = if args.exact_longest_streak {
        LongestStreakPolicy::Exact
    } else {
        LongestStreakPolicy::Approximate
    };

    let config = ServerConfig::new(db_path)
        .with_utc_offset_minutes(args.utc_offset_minutes)?
        .with_longest_streak_policy(policy);

    info!(
        "Using database at: {} (UTC offset {}, longest streak policy {:?})",
        config.database_path.display(),
        config.utc_offset,
        config.longest_streak_policy
    );

    let server = HabitTrackerServer::new(config)?;

    // Run the MCP server - this will handle JSON-RPC communication over stdin/stdout
    server.run().await?;

    info!("Habit streaks MCP server shutdown complete");
    Ok(())
}
