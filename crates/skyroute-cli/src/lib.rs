//! Skyroute CLI - command line route planners.
//!
//! This crate provides the binaries:
//! - route: navaid route over every radio family, region-aware endpoints
//! - vorroute: navaid route, modern civilian stations by default
//! - rangeroute: airport route limited by the aircraft's leg range
//! - distance: direct distance and magnetic bearing between two fixes

pub mod config;
pub mod logging;
pub mod menu;
pub mod table;

pub use config::Config;
pub use logging::init_tracing;

use std::path::PathBuf;

use anyhow::{Context, Result};
use skyroute_core::{
    build_report, find_idents, plan_route, resolve_endpoints, CsvDataset, EndpointPolicy,
    FieldModel, IgrfDeclination, PlannedRoute, PlannerConfig, RouteReport, Selection, Waypoint,
    WaypointSource, WaypointTable,
};

use crate::menu::RouteTypeMenu;

/// Tables searched when resolving typed identifiers.
pub const ENDPOINT_TABLES: [WaypointTable; 2] = [WaypointTable::Airports, WaypointTable::Navaids];

/// Flags shared by every binary.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct CommonArgs {
    /// Directory holding airports.csv and navaids.csv (overrides SKYROUTE_DATA_DIR)
    #[arg(long)]
    pub data_dir: Option<PathBuf>,

    /// Print the result as JSON instead of a table
    #[arg(long)]
    pub json: bool,

    /// Debug logging on stderr
    #[arg(short, long)]
    pub verbose: bool,
}

/// Flags shared by the planners.
#[derive(clap::Args, Debug, Clone, Default)]
pub struct PlannerArgs {
    /// Menu choice to use instead of prompting
    #[arg(long)]
    pub route_type: Option<usize>,

    /// Use the binary-heap frontier instead of a linear scan
    #[arg(long)]
    pub heap: bool,
}

impl PlannerArgs {
    pub fn selection(&self) -> Selection {
        if self.heap {
            Selection::Heap
        } else {
            Selection::LinearScan
        }
    }
}

/// Logging, configuration and dataset for one invocation.
pub fn bootstrap(common: &CommonArgs) -> Result<(Config, CsvDataset)> {
    init_tracing(common.verbose)?;
    let config = Config::from_env().with_data_dir(common.data_dir.clone());
    tracing::debug!("Using data directory {}", config.data_dir.display());
    let dataset = CsvDataset::new(&config.data_dir);
    Ok((config, dataset))
}

/// The configured declination model, evaluated today.
pub fn declination_service(config: &Config) -> Result<IgrfDeclination> {
    match &config.igrf_file {
        Some(path) => {
            let model = FieldModel::from_shc_file(path)
                .with_context(|| format!("loading field model {}", path.display()))?;
            Ok(IgrfDeclination::now(&model))
        }
        None => Ok(IgrfDeclination::builtin_now()),
    }
}

/// Look up both identifiers and pick the endpoints.
pub fn resolve(
    dataset: &dyn WaypointSource,
    tables: &[WaypointTable],
    source: &str,
    destination: &str,
    policy: &EndpointPolicy,
) -> Result<(Waypoint, Waypoint)> {
    let matches = find_idents(dataset, tables, &[source, destination])?;
    Ok(resolve_endpoints(source, destination, &matches, policy)?)
}

/// Plan between resolved endpoints over one table of the dataset.
pub fn plan_between(
    dataset: &dyn WaypointSource,
    universe: WaypointTable,
    source: &Waypoint,
    destination: &Waypoint,
    planner: &PlannerConfig,
) -> Result<PlannedRoute> {
    let waypoints = dataset.load(universe)?;
    tracing::debug!("Loaded {} waypoints from {}", waypoints.len(), universe.file_name());
    Ok(plan_route(source, destination, waypoints, planner)?)
}

/// Print a report as a table or JSON.
pub fn emit(title: &str, report: &RouteReport, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
    } else {
        println!("{}", table::render_report(title, report));
    }
    Ok(())
}

/// Endpoints and options for a radio planner run.
pub struct RadioRequest<'a> {
    pub source: &'a str,
    pub destination: &'a str,
    pub policy: EndpointPolicy,
    pub planner: PlannerConfig,
}

/// Shared flow of `route` and `vorroute`.
pub fn run_radio<M: RouteTypeMenu>(
    common: &CommonArgs,
    options: &PlannerArgs,
    request: RadioRequest<'_>,
) -> Result<()> {
    let (config, dataset) = bootstrap(common)?;
    let (source, destination) = resolve(
        &dataset,
        &ENDPOINT_TABLES,
        request.source,
        request.destination,
        &request.policy,
    )?;

    let route_type: M = menu::choose(options.route_type)?;
    tracing::info!("Route type: {}", route_type.label());
    let planner = request
        .planner
        .with_corridor_factor(config.radio_corridor)
        .with_categories(route_type.category_filter())
        .with_selection(options.selection());

    let planned = plan_between(&dataset, WaypointTable::Navaids, &source, &destination, &planner)?;
    let declination = declination_service(&config)?;
    let report = build_report(&planned.route, &declination);
    let title = format!(
        "VOR-to-VOR Route from {} ({}) to {} ({})",
        source.ident, source.name, destination.ident, destination.name
    );
    emit(&title, &report, common.json)
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyroute_core::{
        AirportKind, FixedDeclination, InMemoryDataset, NavaidKind, PlanError, PowerClass,
        SignalRanges,
    };

    fn dataset() -> InMemoryDataset {
        let mut data = InMemoryDataset::default();
        data.push(
            Waypoint::airport("KAAA", "Alpha", 0.0, 0.0, AirportKind::Large).with_country("US"),
        );
        data.push(
            Waypoint::airport("KCCC", "Charlie", 0.0, 2.0, AirportKind::Large).with_country("US"),
        );
        data.push(
            Waypoint::navaid("AAA", "Alpha", 0.3, 0.1, NavaidKind::Vor).with_power(PowerClass::Low),
        );
        data.push(
            Waypoint::navaid("CCC", "Charlie", 0.0, 1.9, NavaidKind::Vortac)
                .with_power(PowerClass::High),
        );
        data
    }

    #[test]
    fn resolves_and_plans_over_navaids() {
        let data = dataset();
        let (src, dst) = resolve(
            &data,
            &ENDPOINT_TABLES,
            "kaaa",
            "kccc",
            &EndpointPolicy::Region(None),
        )
        .unwrap();
        let planner = PlannerConfig::radio(SignalRanges::route_defaults());
        let planned = plan_between(&data, WaypointTable::Navaids, &src, &dst, &planner).unwrap();
        let report = build_report(&planned.route, &FixedDeclination(0.0));
        // The LOW VOR off the track is a detour; CCC receives the long leg
        assert_eq!(report.route_string(), "KAAA CCC KCCC");

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["rows"][1]["ident"], "CCC");
        assert!(json["rows"][0]["leg_nm"].is_null());
    }

    #[test]
    fn resolution_errors_keep_their_type() {
        let data = dataset();
        let err = resolve(
            &data,
            &ENDPOINT_TABLES,
            "KAAA",
            "KZZZ",
            &EndpointPolicy::Region(None),
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<PlanError>(),
            Some(PlanError::WaypointNotFound { .. })
        ));
    }

    #[test]
    fn heap_flag_selects_heap_frontier() {
        let options = PlannerArgs {
            route_type: None,
            heap: true,
        };
        assert_eq!(options.selection(), Selection::Heap);
        assert_eq!(PlannerArgs::default().selection(), Selection::LinearScan);
    }
}
