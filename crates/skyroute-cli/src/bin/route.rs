use anyhow::Result;
use clap::Parser;
use skyroute_cli::menu::NavaidRouteType;
use skyroute_cli::{run_radio, CommonArgs, PlannerArgs, RadioRequest};
use skyroute_core::{EndpointPolicy, PlannerConfig, SignalRanges};

/// Plan a route through radio navaids between two airports or navaids.
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
    planner: PlannerArgs,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    run_radio::<NavaidRouteType>(
        &args.common,
        &args.planner,
        RadioRequest {
            source: &args.source,
            destination: &args.destination,
            policy: EndpointPolicy::Region(args.region.clone()),
            planner: PlannerConfig::radio(SignalRanges::route_defaults()),
        },
    )
}
