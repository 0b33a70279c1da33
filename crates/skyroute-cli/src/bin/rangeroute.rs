use anyhow::Result;
use clap::Parser;
use skyroute_cli::menu::{self, AirportRouteType, RouteTypeMenu};
use skyroute_cli::{
    bootstrap, declination_service, emit, plan_between, resolve, CommonArgs, PlannerArgs,
};
use skyroute_core::{build_report, parse_max_range, EndpointPolicy, PlannerConfig, WaypointTable};

/// Plan an airport-to-airport route where no leg exceeds the aircraft's range.
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Source airport code
    source: String,

    /// Destination airport code
    destination: String,

    /// Maximum leg distance in nautical miles
    #[arg(allow_negative_numbers = true)]
    max_range: String,

    #[command(flatten)]
    planner: PlannerArgs,

    #[command(flatten)]
    common: CommonArgs,
}

fn main() -> Result<()> {
    let args = Args::parse();
    let max_leg_nm = parse_max_range(&args.max_range)?;
    let (config, dataset) = bootstrap(&args.common)?;

    let (source, destination) = resolve(
        &dataset,
        &[WaypointTable::Airports],
        &args.source,
        &args.destination,
        &EndpointPolicy::NearestToSource(None),
    )?;

    let airport_type: AirportRouteType = menu::choose(args.planner.route_type)?;
    tracing::info!("Airport filter: {}", airport_type.label());
    let planner = PlannerConfig::aircraft(max_leg_nm)
        .with_corridor_factor(config.aircraft_corridor)
        .with_categories(airport_type.category_filter())
        .with_selection(args.planner.selection());

    let planned = plan_between(&dataset, WaypointTable::Airports, &source, &destination, &planner)?;
    let declination = declination_service(&config)?;
    let report = build_report(&planned.route, &declination);
    let title = format!(
        "Route from {} ({}) to {} ({}), max leg distance of {} nm",
        source.ident, source.name, destination.ident, destination.name, max_leg_nm
    );
    emit(&title, &report, args.common.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyroute_core::PlanError;

    #[test]
    fn negative_range_reaches_range_validation() {
        let args = Args::try_parse_from(["rangeroute", "KAAA", "KCCC", "-5"]).unwrap();
        assert_eq!(args.max_range, "-5");
        assert!(matches!(
            parse_max_range(&args.max_range),
            Err(PlanError::InvalidParameter { .. })
        ));
    }
}
