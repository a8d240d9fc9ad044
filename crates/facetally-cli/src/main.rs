use anyhow::{Context, Result};
use chrono::{Datelike, Utc};
use clap::{Parser, Subcommand};
use facetally_store::{events, reports, StoreConfig};
use rusqlite::Connection;
use std::path::{Path, PathBuf};

const MONTH_NAMES: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

/// Widest bar drawn for the busiest bucket; other bars scale down from it.
const CHART_WIDTH: u64 = 40;

#[derive(Parser)]
#[command(name = "facetally", about = "Facetally detection reports and store settings")]
struct Cli {
    /// Store settings file (defaults to the daemon's settings path)
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    /// Data directory holding the detection database
    #[arg(long, global = true)]
    data_dir: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Time-bucketed unique-face reports
    Report {
        #[command(subcommand)]
        report: ReportCommand,
    },
    /// Show or edit store connection settings
    Settings {
        #[command(subcommand)]
        settings: SettingsCommand,
    },
}

#[derive(Subcommand)]
enum ReportCommand {
    /// Unique faces per hour over the last 24 hours
    Hours,
    /// Unique faces per day for one month
    Month {
        /// Year to report (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
        /// Month to report, 1-12 (defaults to the current month)
        #[arg(long)]
        month: Option<u32>,
    },
    /// Unique faces per month for one year
    Year {
        /// Year to report (defaults to the current year)
        #[arg(long)]
        year: Option<i32>,
    },
}

#[derive(Subcommand)]
enum SettingsCommand {
    /// Print the current connection settings
    Show,
    /// Replace the connection settings (all fields required, none empty)
    Set {
        #[arg(long)]
        host: String,
        #[arg(long)]
        user: String,
        #[arg(long)]
        password: String,
        #[arg(long)]
        database: String,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let settings_path = cli
        .settings
        .clone()
        .unwrap_or_else(facetally_store::default_settings_path);
    let data_dir = cli
        .data_dir
        .clone()
        .unwrap_or_else(facetally_store::default_data_dir);

    match cli.command {
        Commands::Report { report } => {
            let conn = open_store(&settings_path, &data_dir)?;
            let now = Utc::now();
            match report {
                ReportCommand::Hours => {
                    let buckets = reports::counts_by_hour(&conn, now)?;
                    let labels: Vec<String> = (0..24).map(|h| format!("{h:02}h")).collect();
                    render_chart("Unique faces, last 24 hours", &labels, &buckets);
                }
                ReportCommand::Month { year, month } => {
                    let year = year.unwrap_or_else(|| now.year());
                    let month = month.unwrap_or_else(|| now.month());
                    let buckets = reports::counts_by_day(&conn, year, month)?;
                    let labels: Vec<String> =
                        (1..=buckets.len()).map(|d| format!("{d:02}")).collect();
                    render_chart(&format!("Unique faces, {month:02}/{year}"), &labels, &buckets);
                }
                ReportCommand::Year { year } => {
                    let year = year.unwrap_or_else(|| now.year());
                    let buckets = reports::counts_by_month(&conn, year)?;
                    let labels: Vec<String> =
                        MONTH_NAMES.iter().map(|m| m.to_string()).collect();
                    render_chart(&format!("Unique faces, {year}"), &labels, &buckets);
                }
            }
        }
        Commands::Settings { settings } => match settings {
            SettingsCommand::Show => {
                let config = StoreConfig::load(&settings_path).with_context(|| {
                    format!("loading store settings from {}", settings_path.display())
                })?;
                println!("host:     {}", config.host);
                println!("user:     {}", config.user);
                println!("password: {}", config.password);
                println!("database: {}", config.database);
            }
            SettingsCommand::Set { host, user, password, database } => {
                let config = StoreConfig { host, user, password, database };
                config
                    .save(&settings_path)
                    .with_context(|| {
                        format!("saving store settings to {}", settings_path.display())
                    })?;
                println!("settings saved to {}", settings_path.display());
                println!("the capture daemon picks them up on its next write");
            }
        },
    }

    Ok(())
}

/// Open the event store read-side described by the settings file.
///
/// The schema is ensured so reports against a store the daemon has not
/// written to yet come back all-zero instead of failing.
fn open_store(settings_path: &Path, data_dir: &Path) -> Result<Connection> {
    let config = StoreConfig::load(settings_path).with_context(|| {
        format!("loading store settings from {}", settings_path.display())
    })?;
    let db_path = config.db_path(data_dir);
    let conn = Connection::open(&db_path)
        .with_context(|| format!("opening detection database {}", db_path.display()))?;
    events::ensure_schema(&conn)?;
    Ok(conn)
}

/// Print one bucket per line with a proportional bar and the exact count.
fn render_chart(title: &str, labels: &[String], counts: &[u64]) {
    println!("{title}");
    let max = counts.iter().copied().max().unwrap_or(0);
    for (label, &count) in labels.iter().zip(counts.iter()) {
        let bar = "#".repeat(bar_len(count, max));
        println!("{label:>4} | {bar:<width$} {count}", width = CHART_WIDTH as usize);
    }
    println!("total: {}", counts.iter().sum::<u64>());
}

fn bar_len(count: u64, max: u64) -> usize {
    if max == 0 {
        return 0;
    }
    ((count * CHART_WIDTH) / max) as usize
}
