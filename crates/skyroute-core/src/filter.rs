//! Pruning of the waypoint universe before solving.
//!
//! Two independent checks, both must pass: the waypoint lies inside a
//! circular corridor around the source/destination midpoint, and its
//! category is not one the caller opted out of.

use crate::models::{Waypoint, WaypointCategory};
use crate::spatial::{haversine_nm, midpoint};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Circle centred on the midpoint of a request.
///
/// A generous stand-in for an elliptical corridor: anything that could
/// sit on a sensible route falls inside it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoCorridor {
    pub center_lat: f64,
    pub center_lon: f64,
    pub radius_nm: f64,
}

impl GeoCorridor {
    /// Corridor whose radius is `factor` times the direct distance.
    pub fn between(source: &Waypoint, destination: &Waypoint, factor: f64) -> Self {
        let (center_lat, center_lon) =
            midpoint(source.lat, source.lon, destination.lat, destination.lon);
        let direct_nm = haversine_nm(source.lat, source.lon, destination.lat, destination.lon);
        Self {
            center_lat,
            center_lon,
            radius_nm: factor * direct_nm,
        }
    }

    /// Inclusive: a waypoint exactly on the boundary is inside.
    pub fn contains(&self, waypoint: &Waypoint) -> bool {
        haversine_nm(self.center_lat, self.center_lon, waypoint.lat, waypoint.lon)
            <= self.radius_nm
    }
}

/// Categories excluded from the candidate set.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryFilter {
    disallowed: HashSet<WaypointCategory>,
}

impl CategoryFilter {
    /// Filter that excludes nothing.
    pub fn allow_all() -> Self {
        Self::default()
    }

    pub fn excluding(categories: impl IntoIterator<Item = WaypointCategory>) -> Self {
        Self {
            disallowed: categories.into_iter().collect(),
        }
    }

    pub fn allows(&self, waypoint: &Waypoint) -> bool {
        !self.disallowed.contains(&waypoint.category)
    }
}

/// Both pruning policies for one request.
#[derive(Debug, Clone)]
pub struct CandidateFilter {
    pub corridor: GeoCorridor,
    pub categories: CategoryFilter,
}

impl CandidateFilter {
    pub fn admits(&self, waypoint: &Waypoint) -> bool {
        self.corridor.contains(waypoint) && self.categories.allows(waypoint)
    }

    /// Keep only admitted waypoints, preserving order.
    pub fn prune(&self, universe: impl IntoIterator<Item = Waypoint>) -> Vec<Waypoint> {
        universe.into_iter().filter(|wp| self.admits(wp)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AirportKind, NavaidKind};
    use crate::spatial::offset_by_bearing;

    fn vor(ident: &str, lat: f64, lon: f64) -> Waypoint {
        Waypoint::navaid(ident, ident, lat, lon, NavaidKind::Vor)
    }

    #[test]
    fn corridor_boundary_is_inclusive() {
        let center = vor("C", 10.0, 20.0);
        let (lat, lon) = offset_by_bearing(10.0, 20.0, 75.0, 33.0);
        let on_edge = vor("E", lat, lon);
        let radius_nm = haversine_nm(center.lat, center.lon, on_edge.lat, on_edge.lon);

        let corridor = GeoCorridor {
            center_lat: center.lat,
            center_lon: center.lon,
            radius_nm,
        };
        assert!(corridor.contains(&on_edge));

        let (lat, lon) = offset_by_bearing(10.0, 20.0, radius_nm + 1.0, 33.0);
        assert!(!corridor.contains(&vor("X", lat, lon)));
    }

    #[test]
    fn corridor_radius_scales_with_factor() {
        let src = vor("S", 0.0, 0.0);
        let dst = vor("D", 0.0, 2.0);
        let single = GeoCorridor::between(&src, &dst, 1.0);
        let double = GeoCorridor::between(&src, &dst, 2.0);
        assert_eq!(single.center_lon, 1.0);
        assert!((double.radius_nm - 2.0 * single.radius_nm).abs() < 1e-9);

        // 3 degrees north of the midpoint: ~180 nm, inside 2x only
        let north = vor("N", 3.0, 1.0);
        assert!(!single.contains(&north));
        assert!(double.contains(&north));
    }

    #[test]
    fn category_filter_excludes_selected_families() {
        let filter = CategoryFilter::excluding([
            WaypointCategory::Navaid(NavaidKind::Tacan),
            WaypointCategory::Airport(AirportKind::Heliport),
        ]);
        assert!(filter.allows(&vor("V", 0.0, 0.0)));
        assert!(!filter.allows(&Waypoint::navaid("T", "T", 0.0, 0.0, NavaidKind::Tacan)));
        assert!(!filter.allows(&Waypoint::airport("H", "H", 0.0, 0.0, AirportKind::Heliport)));
        assert!(CategoryFilter::allow_all().allows(&Waypoint::navaid(
            "T",
            "T",
            0.0,
            0.0,
            NavaidKind::Tacan
        )));
    }

    #[test]
    fn prune_applies_both_policies() {
        let src = vor("S", 0.0, 0.0);
        let dst = vor("D", 0.0, 2.0);
        let filter = CandidateFilter {
            corridor: GeoCorridor::between(&src, &dst, 1.0),
            categories: CategoryFilter::excluding([WaypointCategory::Navaid(NavaidKind::Ndb)]),
        };
        let kept = filter.prune(vec![
            vor("IN", 0.2, 1.0),
            vor("FAR", 10.0, 1.0),
            Waypoint::navaid("NDB", "NDB", 0.1, 1.0, NavaidKind::Ndb),
        ]);
        let idents: Vec<_> = kept.iter().map(|wp| wp.ident.as_str()).collect();
        assert_eq!(idents, vec!["IN"]);
    }
}
