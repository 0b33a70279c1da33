//! Per-leg distance and magnetic bearing for a planned route.

use crate::declination::{DeclinationService, MemoizedDeclination};
use crate::models::Route;
use crate::spatial::{distance, magnetic_bearing};
use serde::Serialize;

/// A final leg of this length or less carries no bearing.
pub const MIN_BEARING_LEG_NM: f64 = 0.5;

/// One waypoint of the report, with the leg flown to reach it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReportRow {
    /// 1-based position in the route.
    pub number: usize,
    pub ident: String,
    pub name: String,
    pub category: String,
    pub frequency: Option<String>,
    /// Distance from the previous waypoint; `None` on the first row.
    pub leg_nm: Option<f64>,
    /// Magnetic bearing from the previous waypoint.
    pub magnetic_bearing_deg: Option<f64>,
    pub cumulative_nm: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RouteReport {
    pub source: String,
    pub source_name: String,
    pub destination: String,
    pub destination_name: String,
    pub rows: Vec<ReportRow>,
    pub total_nm: f64,
}

impl RouteReport {
    /// Number of legs in the route.
    pub fn leg_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }

    /// Identifiers joined by spaces, ready for a flight-plan route field.
    pub fn route_string(&self) -> String {
        self.rows
            .iter()
            .map(|row| row.ident.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

/// Build the report for `route`.
///
/// Declination lookups are memoised for the duration of this call only.
pub fn build_report(route: &Route, declination: &dyn DeclinationService) -> RouteReport {
    let declination = MemoizedDeclination::new(declination);
    let waypoints = route.waypoints();
    let mut rows = Vec::with_capacity(waypoints.len());
    let mut total_nm = 0.0;

    let last = waypoints.len().saturating_sub(1);

    for (i, waypoint) in waypoints.iter().enumerate() {
        let (leg_nm, magnetic_bearing_deg) = match i.checked_sub(1).map(|p| waypoints[p]) {
            Some(previous) => {
                let leg = distance(previous, waypoint);
                total_nm += leg;
                // Only the arrival leg onto the destination can be dropped
                let heading = (i < last || leg > MIN_BEARING_LEG_NM)
                    .then(|| magnetic_bearing(previous, waypoint, &declination));
                (Some(leg), heading)
            }
            None => (None, None),
        };

        rows.push(ReportRow {
            number: i + 1,
            ident: waypoint.ident.clone(),
            name: waypoint.name.clone(),
            category: waypoint.category.label().to_string(),
            frequency: waypoint.frequency_label(),
            leg_nm,
            magnetic_bearing_deg,
            cumulative_nm: total_nm,
        });
    }

    tracing::debug!(
        "Report built with {} legs, {} declination cells evaluated",
        rows.len().saturating_sub(1),
        declination.cached_cells()
    );

    RouteReport {
        source: route.source.ident.clone(),
        source_name: route.source.name.clone(),
        destination: route.destination.ident.clone(),
        destination_name: route.destination.name.clone(),
        rows,
        total_nm,
    }
}
