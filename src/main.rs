mod config;
mod emit;
mod records;
mod schedule;
mod timeline;
mod utils;

use anyhow::Result;
use clap::Parser;

/// Collects the live corridor snapshot and derives per-train schedule tables
/// plus the animation manifest consumed by the frontend.
#[derive(Parser)]
struct Args {
    /// Run identifier interpolated into the manifest's plot image paths
    img_id: String,
    #[clap(long, default_value = "config/collector.toml")]
    config_path: String,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let config = config::Config::load(&args.config_path)?;

    println!("Fetching corridor snapshot...");
    let fetched = records::fetch_trains(&config.api_url)?;
    println!("Upstream trains: {:?}", fetched.len());

    let groups = records::group_by_route(fetched);
    println!(
        "Acela: {}, Northeast Regional: {}",
        groups.acela.len(),
        groups.regional.len()
    );

    let entries = emit::process_trains(&groups, &config, &args.img_id)?;
    println!("Manifest entries: {:?}", entries.len());

    utils::write_json_file(&config.manifest_path, &entries)?;
    Ok(())
}
