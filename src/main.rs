use anyhow::{Context, Result};
use clap::Parser;
use gtfs_jp_structures::{DistanceUnits, FeedReader, FeedWriter};
use log::{info, warn};
use std::path::PathBuf;
use std::time::Duration;

/// Loads a GTFS-JP feed, prints what was read and what was rejected, and optionally writes it back
#[derive(Debug, Parser)]
#[command(name = "gtfs-jp-kit", version)]
struct Cli {
    /// Directory, zip archive or http(s) url of the feed
    location: String,
    /// Unit of the shape_dist_traveled columns: ft, mi, m or km
    #[arg(long, value_name = "unit")]
    units: DistanceUnits,
    /// Writes the validated feed to this directory, or archive if it ends with .zip
    #[arg(long, value_name = "path")]
    write: Option<PathBuf>,
    /// Rounds the float columns of the written feed to this number of decimals
    #[arg(long, value_name = "n", requires = "write")]
    ndigits: Option<usize>,
    /// Skips stop_times.txt
    #[arg(long)]
    skip_stop_times: bool,
    /// Gives up downloading a remote feed after this many seconds
    #[arg(long, value_name = "seconds")]
    timeout: Option<u64>,
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let loaded = FeedReader::default()
        .distance_units(cli.units)
        .read_stop_times(!cli.skip_stop_times)
        .fetch_timeout(cli.timeout.map(Duration::from_secs))
        .read(&cli.location)
        .with_context(|| format!("impossible to read feed {}", cli.location))?;
    loaded.print_stats();
    if !loaded.diagnostics.is_empty() {
        warn!(
            "{} rows or tables of {} were rejected",
            loaded.diagnostics.len(),
            cli.location
        );
    }

    if let Some(dest) = cli.write {
        FeedWriter::default()
            .ndigits(cli.ndigits)
            .write(&loaded.feed, &dest)
            .with_context(|| format!("impossible to write feed to {}", dest.display()))?;
        info!("{} written to {}", loaded.feed, dest.display());
    }
    Ok(())
}
