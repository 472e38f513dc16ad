//! CLI argument parsing for the runsheet binary.

use anyhow::{Context, Result};
use chrono::{Local, NaiveDateTime, NaiveTime};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "runsheet", about = "Delivery route schedule generator")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate a schedule from a stop list
    Generate {
        /// Route name used in the output rows
        #[arg(long)]
        route: String,
        /// Departure time: "HH:MM" (today) or "YYYY-MM-DD HH:MM"
        #[arg(long)]
        departure: String,
        /// Depot: a known depot name (see `depots`) or a full address
        #[arg(long)]
        depot: String,
        /// Stop list file ("identifier, address" per line), or "-" for stdin
        #[arg(long)]
        stops: String,
        /// Reorder stops with the provider's waypoint optimization
        #[arg(long)]
        optimize: bool,
        /// Abort on malformed stop lines instead of skipping them
        #[arg(long)]
        strict: bool,
        /// Output CSV path (default: <route>_schedule.csv)
        #[arg(long)]
        output: Option<String>,
    },
    /// List the known depot names
    Depots,
}

/// Parse a departure argument: a full date+time, or a bare clock time
/// combined with today's date.
pub fn parse_departure(input: &str) -> Result<NaiveDateTime> {
    let input = input.trim();

    if let Ok(datetime) = NaiveDateTime::parse_from_str(input, "%Y-%m-%d %H:%M") {
        return Ok(datetime);
    }

    let time = NaiveTime::parse_from_str(input, "%H:%M")
        .with_context(|| format!("Invalid departure {input:?} (expected \"HH:MM\" or \"YYYY-MM-DD HH:MM\")"))?;
    Ok(Local::now().date_naive().and_time(time))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Timelike;
    use clap::Parser;

    #[test]
    fn test_cli_generate_command_parses() {
        let cli = Cli::parse_from([
            "runsheet", "generate", "--route", "TNT9999", "--departure", "08:00", "--depot",
            "duncan", "--stops", "stops.txt",
        ]);

        match cli.command {
            Command::Generate {
                route,
                optimize,
                strict,
                output,
                ..
            } => {
                assert_eq!(route, "TNT9999");
                assert!(!optimize);
                assert!(!strict);
                assert!(output.is_none());
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_cli_generate_flags_parse() {
        let cli = Cli::parse_from([
            "runsheet", "generate", "--route", "TNT9999", "--departure", "08:00", "--depot",
            "duncan", "--stops", "-", "--optimize", "--strict", "--output", "out.csv",
        ]);

        match cli.command {
            Command::Generate {
                optimize,
                strict,
                output,
                stops,
                ..
            } => {
                assert!(optimize);
                assert!(strict);
                assert_eq!(output.as_deref(), Some("out.csv"));
                assert_eq!(stops, "-");
            }
            _ => panic!("expected generate command"),
        }
    }

    #[test]
    fn test_cli_depots_command_parses() {
        let cli = Cli::parse_from(["runsheet", "depots"]);
        assert!(matches!(cli.command, Command::Depots));
    }

    #[test]
    fn test_parse_departure_full_datetime() {
        let departure = parse_departure("2026-08-10 07:30").unwrap();
        assert_eq!(departure.format("%Y-%m-%d %H:%M").to_string(), "2026-08-10 07:30");
    }

    #[test]
    fn test_parse_departure_time_only_uses_today() {
        let departure = parse_departure("08:15").unwrap();
        assert_eq!(departure.time().hour(), 8);
        assert_eq!(departure.time().minute(), 15);
        assert_eq!(departure.date(), Local::now().date_naive());
    }

    #[test]
    fn test_parse_departure_rejects_garbage() {
        assert!(parse_departure("eight o'clock").is_err());
        assert!(parse_departure("25:99").is_err());
    }
}
