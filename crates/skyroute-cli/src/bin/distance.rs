use anyhow::Result;
use clap::Parser;
use serde::Serialize;
use skyroute_cli::table::format_heading;
use skyroute_cli::{bootstrap, declination_service, resolve, CommonArgs, ENDPOINT_TABLES};
use skyroute_core::report::MIN_BEARING_LEG_NM;
use skyroute_core::{distance, magnetic_bearing, EndpointPolicy};

/// Direct distance and magnetic bearing between two airports or navaids.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source airport or navaid code
    source: String,

    /// Destination airport or navaid code
    destination: String,

    /// Preferred ISO country when a code is ambiguous (e.g. US)
    region: Option<String>,

    #[command(flatten)]
    common: CommonArgs,
}

#[derive(Serialize)]
struct DirectLeg<'a> {
    source: &'a str,
    source_name: &'a str,
    destination: &'a str,
    destination_name: &'a str,
    distance_nm: f64,
    magnetic_bearing_deg: Option<f64>,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let (config, dataset) = bootstrap(&args.common)?;
    let (source, destination) = resolve(
        &dataset,
        &ENDPOINT_TABLES,
        &args.source,
        &args.destination,
        &EndpointPolicy::Region(args.region.clone()),
    )?;

    let declination = declination_service(&config)?;
    let distance_nm = distance(&source, &destination);
    let leg = DirectLeg {
        source: &source.ident,
        source_name: &source.name,
        destination: &destination.ident,
        destination_name: &destination.name,
        distance_nm,
        magnetic_bearing_deg: (distance_nm > MIN_BEARING_LEG_NM)
            .then(|| magnetic_bearing(&source, &destination, &declination)),
    };

    if args.common.json {
        println!("{}", serde_json::to_string_pretty(&leg)?);
        return Ok(());
    }

    println!(
        "{} ({}) --> {} ({})",
        leg.source, leg.source_name, leg.destination, leg.destination_name
    );
    match leg.magnetic_bearing_deg {
        Some(bearing) => println!("{:.1} nm @ {}", leg.distance_nm, format_heading(bearing)),
        None => println!("{:.1} nm", leg.distance_nm),
    }
    Ok(())
}
