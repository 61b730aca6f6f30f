//! auc-runner: batch runner for the auction lifecycle tracker.
//!
//! Usage:
//!   auc-runner --config tracker.config.json
//!   auc-runner --snapshots data/download --db run.db --realm eu:fordragon

use anyhow::Result;
use auctrack_core::{run_batch, DirectorySource, RunStatistics, TrackStore, TrackerConfig};
use std::env;
use std::path::{Path, PathBuf};

fn main() -> Result<()> {
    env_logger::init();

    let args: Vec<String> = env::args().collect();
    let config_path = find_arg(&args, "--config");

    let mut config = match config_path {
        Some(path) => TrackerConfig::load(Path::new(&path))?,
        None => TrackerConfig::default(),
    };

    // Command-line flags win over the config file.
    if let Some(dir) = find_arg(&args, "--snapshots") {
        config.snapshot_dir = PathBuf::from(dir);
    }
    if let Some(db) = find_arg(&args, "--db") {
        config.database = PathBuf::from(db);
    }
    if let Some(realm) = find_arg(&args, "--realm") {
        config.realms = vec![realm];
    }

    println!("auc-runner");
    println!("  snapshots: {}", config.snapshot_dir.display());
    println!("  db:        {}", config.database.display());
    println!("  realms:    {:?}", config.realms);
    println!();

    let db = config.database.to_string_lossy();
    let mut store = TrackStore::open(&db)?;
    store.migrate()?;

    let source = DirectorySource::new(&config.snapshot_dir);
    let mut runs = Vec::new();
    for realm in &config.realms {
        let stats = run_batch(&mut store, &source, realm)?;
        runs.push(stats);
    }

    for stats in &runs {
        print_summary(stats);
    }
    Ok(())
}

fn print_summary(stats: &RunStatistics) {
    println!("=== {} ===", stats.realm);
    println!("  run_id:    {}", stats.run_id);
    println!("  processed: {}", stats.snapshots_processed);
    println!("  skipped:   {}", stats.snapshots_skipped);
    println!("  failed:    {}", stats.failed.len());
    for name in &stats.failed {
        println!("             {name}");
    }
    println!("  created:   {}", stats.totals.created);
    println!(
        "  changed:   {} (bids {}, adjusted {}, moves {})",
        stats.totals.modified,
        stats.totals.bid_raised,
        stats.totals.bucket_adjusted,
        stats.totals.owner_moved,
    );
    println!(
        "  closed:    {} (bought {}, auctioned {}, expired {})",
        stats.totals.closed,
        stats.totals.bought,
        stats.totals.auctioned,
        stats.totals.expired,
    );
    println!();
}

fn find_arg(args: &[String], flag: &str) -> Option<String> {
    args.windows(2)
        .find(|w| w[0] == flag)
        .map(|w| w[1].clone())
}
