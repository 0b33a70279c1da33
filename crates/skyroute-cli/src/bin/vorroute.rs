use anyhow::Result;
use clap::Parser;
use skyroute_cli::menu::VorRouteType;
use skyroute_cli::{run_radio, CommonArgs, PlannerArgs, RadioRequest};
use skyroute_core::{EndpointPolicy, PlannerConfig, SignalRanges};

/// Plan a VOR-to-VOR route; the destination is the match nearest the source.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source airport or navaid code
    source: String,

    /// Destination airport or navaid code
    destination: String,

    /// Preferred ISO country for the source when its code is ambiguous
    region: Option<String>,

    #[command(flatten)]
    planner: PlannerArgs,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    run_radio::<VorRouteType>(
        &args.common,
        &args.planner,
        RadioRequest {
            source: &args.source,
            destination: &args.destination,
            policy: EndpointPolicy::NearestToSource(args.region.clone()),
            planner: PlannerConfig::radio(SignalRanges::vorroute_defaults()),
        },
    )
}
