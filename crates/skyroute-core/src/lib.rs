pub mod dataset;
pub mod declination;
pub mod endpoints;
pub mod error;
pub mod filter;
pub mod models;
pub mod report;
pub mod route_engine;
pub mod rules;
pub mod spatial;

pub use dataset::{CsvDataset, DatasetError, InMemoryDataset, WaypointSource, WaypointTable};
pub use declination::{
    DeclinationService, FieldModel, FieldModelError, FixedDeclination, IgrfDeclination,
    MemoizedDeclination,
};
pub use endpoints::{find_idents, normalize_ident, resolve_endpoints, EndpointPolicy};
pub use error::PlanError;
pub use filter::{CandidateFilter, CategoryFilter, GeoCorridor};
pub use models::{AirportKind, NavaidKind, PowerClass, Route, Waypoint, WaypointCategory};
pub use report::{build_report, ReportRow, RouteReport};
pub use route_engine::{
    plan_route, reconstruct_path, solve, CandidateSet, PlannedRoute, PlannerConfig, Selection,
    SolveStats,
};
pub use rules::{parse_max_range, RangeModel, RangeTable, SignalRanges};
pub use spatial::{bearing, distance, haversine_nm, magnetic_bearing};
