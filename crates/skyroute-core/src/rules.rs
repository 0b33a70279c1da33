//! Reachability rules for a single leg.

use crate::error::PlanError;
use crate::models::{PowerClass, Waypoint};
use serde::{Deserialize, Serialize};

/// Reliable reception range per power class, in nautical miles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RangeTable {
    pub low_nm: f64,
    pub medium_nm: f64,
    pub high_nm: f64,
    pub unknown_nm: f64,
}

impl RangeTable {
    /// Range for a power class; an unrecorded class uses the LOW tier.
    pub fn range_for(&self, power: Option<PowerClass>) -> f64 {
        match power {
            None | Some(PowerClass::Low) => self.low_nm,
            Some(PowerClass::Medium) => self.medium_nm,
            Some(PowerClass::High) => self.high_nm,
            Some(PowerClass::Unknown) => self.unknown_nm,
        }
    }
}

/// Reception tables for the two equipment families.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalRanges {
    /// Used for the VOR family and every non-NDB fix.
    pub vor: RangeTable,
    /// Used for NDB and NDB-DME.
    pub ndb: RangeTable,
}

impl SignalRanges {
    /// Tables used by the all-navaid `route` planner.
    pub fn route_defaults() -> Self {
        Self {
            vor: Self::vor_table(),
            ndb: RangeTable {
                low_nm: 17.5,
                medium_nm: 49.0,
                high_nm: 475.0,
                unknown_nm: 17.5,
            },
        }
    }

    /// Tables used by the `vorroute` planner.
    pub fn vorroute_defaults() -> Self {
        Self {
            vor: Self::vor_table(),
            ndb: RangeTable {
                low_nm: 25.0,
                medium_nm: 250.0,
                high_nm: 500.0,
                unknown_nm: 15.0,
            },
        }
    }

    fn vor_table() -> RangeTable {
        RangeTable {
            low_nm: 25.0,
            medium_nm: 40.0,
            high_nm: 130.0,
            unknown_nm: 25.0,
        }
    }

    /// How far from `station` its signal can be relied on.
    pub fn reception_range_nm(&self, station: &Waypoint) -> f64 {
        let table = if station.category.is_ndb_family() {
            &self.ndb
        } else {
            &self.vor
        };
        table.range_for(station.power)
    }
}

impl Default for SignalRanges {
    fn default() -> Self {
        Self::route_defaults()
    }
}

/// Which legs a planner may fly.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "model", rename_all = "snake_case")]
pub enum RangeModel {
    /// Every leg is limited by the aircraft's range.
    AircraftLeg { max_leg_nm: f64 },
    /// A leg toward a station is limited by that station's reception range.
    SignalReception(SignalRanges),
}

impl RangeModel {
    /// Whether a leg of `leg_nm` toward `to` is admissible.
    ///
    /// Only the receiving end of the hop matters: changing one station's
    /// power class changes only the legs flown into it.
    pub fn admits_hop(&self, to: &Waypoint, leg_nm: f64) -> bool {
        match self {
            Self::AircraftLeg { max_leg_nm } => leg_nm <= *max_leg_nm,
            Self::SignalReception(ranges) => leg_nm <= ranges.reception_range_nm(to),
        }
    }

    /// Advice attached to a `NoRoute` error.
    pub fn guidance(&self) -> &'static str {
        match self {
            Self::AircraftLeg { .. } => {
                "try considering more airports or use a larger maximum range"
            }
            Self::SignalReception(_) => {
                "try a more permissive route type (e.g. \"All civilian\" or \"All available\")"
            }
        }
    }
}

/// Parse a maximum leg range given on the command line.
pub fn parse_max_range(raw: &str) -> Result<f64, PlanError> {
    let invalid = |reason: &str| PlanError::InvalidParameter {
        name: "maximum range".to_string(),
        value: raw.to_string(),
        reason: reason.to_string(),
    };
    let value: f64 = raw.trim().parse().map_err(|_| invalid("not a number"))?;
    if !value.is_finite() || value <= 0.0 {
        return Err(invalid("must be a positive number of nautical miles"));
    }
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{AirportKind, NavaidKind};

    #[test]
    fn missing_power_uses_low_tier() {
        let ranges = SignalRanges::vorroute_defaults();
        let vor = Waypoint::navaid("V", "V", 0.0, 0.0, NavaidKind::Vor);
        let ndb = Waypoint::navaid("N", "N", 0.0, 0.0, NavaidKind::Ndb);
        assert_eq!(ranges.reception_range_nm(&vor), 25.0);
        assert_eq!(ranges.reception_range_nm(&ndb), 25.0);
        assert_eq!(ranges.reception_range_nm(&ndb.with_power(PowerClass::Unknown)), 15.0);
    }

    #[test]
    fn families_use_their_own_tables() {
        let ranges = SignalRanges::route_defaults();
        let high_vortac =
            Waypoint::navaid("V", "V", 0.0, 0.0, NavaidKind::Vortac).with_power(PowerClass::High);
        let high_ndb_dme =
            Waypoint::navaid("N", "N", 0.0, 0.0, NavaidKind::NdbDme).with_power(PowerClass::High);
        let medium_ndb =
            Waypoint::navaid("M", "M", 0.0, 0.0, NavaidKind::Ndb).with_power(PowerClass::Medium);
        let tacan =
            Waypoint::navaid("T", "T", 0.0, 0.0, NavaidKind::Tacan).with_power(PowerClass::Medium);
        let airport = Waypoint::airport("KAAA", "A", 0.0, 0.0, AirportKind::Large);
        assert_eq!(ranges.reception_range_nm(&high_vortac), 130.0);
        assert_eq!(ranges.reception_range_nm(&high_ndb_dme), 475.0);
        assert_eq!(ranges.reception_range_nm(&medium_ndb), 49.0);
        assert_eq!(ranges.reception_range_nm(&tacan), 40.0);
        assert_eq!(ranges.reception_range_nm(&airport), 25.0);
    }

    #[test]
    fn signal_admissibility_follows_receiving_station() {
        let model = RangeModel::SignalReception(SignalRanges::route_defaults());
        let high =
            Waypoint::navaid("A", "A", 0.0, 0.0, NavaidKind::Vor).with_power(PowerClass::High);
        let low = Waypoint::navaid("B", "B", 0.0, 0.0, NavaidKind::Vor).with_power(PowerClass::Low);
        assert!(!model.admits_hop(&low, 100.0));
        assert!(model.admits_hop(&high, 100.0));
        assert!(model.admits_hop(&low, 25.0));
    }

    #[test]
    fn aircraft_limit_is_inclusive() {
        let model = RangeModel::AircraftLeg { max_leg_nm: 50.0 };
        let any = Waypoint::airport("KAAA", "A", 0.0, 0.0, AirportKind::Small);
        assert!(model.admits_hop(&any, 50.0));
        assert!(!model.admits_hop(&any, 50.000_001));
    }

    #[test]
    fn max_range_must_be_positive_number() {
        assert_eq!(parse_max_range(" 250 ").unwrap(), 250.0);
        assert!(matches!(
            parse_max_range("far"),
            Err(PlanError::InvalidParameter { .. })
        ));
        assert!(parse_max_range("-5").is_err());
        assert!(parse_max_range("NaN").is_err());
        assert!(parse_max_range("inf").is_err());
    }
}
