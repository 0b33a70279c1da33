//! Core data models for the route planners.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Airport facility type as published in the airport dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AirportKind {
    Large,
    Medium,
    Small,
    Heliport,
    SeaplaneBase,
    Balloonport,
    Closed,
    Other,
}

impl AirportKind {
    /// Map a dataset `type` column (e.g. `large_airport`) to a kind.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "large_airport" => Self::Large,
            "medium_airport" => Self::Medium,
            "small_airport" => Self::Small,
            "heliport" => Self::Heliport,
            "seaplane_base" => Self::SeaplaneBase,
            "balloonport" => Self::Balloonport,
            "closed" => Self::Closed,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Large => "large_airport",
            Self::Medium => "medium_airport",
            Self::Small => "small_airport",
            Self::Heliport => "heliport",
            Self::SeaplaneBase => "seaplane_base",
            Self::Balloonport => "balloonport",
            Self::Closed => "closed",
            Self::Other => "airport",
        }
    }
}

/// Radio navaid equipment family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum NavaidKind {
    Vor,
    VorDme,
    Vortac,
    Tacan,
    Ndb,
    NdbDme,
    Dme,
    Other,
}

impl NavaidKind {
    /// Map a dataset `type` column (e.g. `VOR-DME`) to a kind.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "VOR" => Self::Vor,
            "VOR-DME" => Self::VorDme,
            "VORTAC" => Self::Vortac,
            "TACAN" => Self::Tacan,
            "NDB" => Self::Ndb,
            "NDB-DME" => Self::NdbDme,
            "DME" => Self::Dme,
            _ => Self::Other,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Vor => "VOR",
            Self::VorDme => "VOR-DME",
            Self::Vortac => "VORTAC",
            Self::Tacan => "TACAN",
            Self::Ndb => "NDB",
            Self::NdbDme => "NDB-DME",
            Self::Dme => "DME",
            Self::Other => "NAVAID",
        }
    }

    pub fn is_vor_family(&self) -> bool {
        matches!(self, Self::Vor | Self::VorDme | Self::Vortac)
    }

    pub fn is_ndb_family(&self) -> bool {
        matches!(self, Self::Ndb | Self::NdbDme)
    }
}

/// What kind of fix a waypoint is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "type", rename_all = "lowercase")]
pub enum WaypointCategory {
    Airport(AirportKind),
    Navaid(NavaidKind),
}

impl WaypointCategory {
    pub fn label(&self) -> &'static str {
        match self {
            Self::Airport(kind) => kind.label(),
            Self::Navaid(kind) => kind.label(),
        }
    }

    pub fn is_airport(&self) -> bool {
        matches!(self, Self::Airport(_))
    }

    /// NDB and NDB-DME stations use the shorter NDB reception table.
    pub fn is_ndb_family(&self) -> bool {
        matches!(self, Self::Navaid(kind) if kind.is_ndb_family())
    }
}

impl fmt::Display for WaypointCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Coarse transmitter power tier of a navaid.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum PowerClass {
    Low,
    Medium,
    High,
    Unknown,
}

impl PowerClass {
    /// Parse the dataset `power` column. An empty column means no power
    /// class was recorded; anything unrecognised is `Unknown`.
    pub fn parse(raw: &str) -> Option<Self> {
        let value = raw.trim();
        if value.is_empty() {
            return None;
        }
        Some(match value.to_ascii_uppercase().as_str() {
            "LOW" => Self::Low,
            "MEDIUM" => Self::Medium,
            "HIGH" => Self::High,
            _ => Self::Unknown,
        })
    }
}

/// A navigational fix: an airport or a radio navaid.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub ident: String,
    pub name: String,
    pub lat: f64,
    pub lon: f64,
    pub category: WaypointCategory,
    #[serde(default)]
    pub power: Option<PowerClass>,
    #[serde(default)]
    pub frequency_khz: Option<f64>,
    #[serde(default)]
    pub iso_country: Option<String>,
    /// Derived distance written by a dataset post-processing callback.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub annotation_nm: Option<f64>,
}

impl Waypoint {
    pub fn airport(
        ident: impl Into<String>,
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        kind: AirportKind,
    ) -> Self {
        Self::new(ident, name, lat, lon, WaypointCategory::Airport(kind))
    }

    pub fn navaid(
        ident: impl Into<String>,
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        kind: NavaidKind,
    ) -> Self {
        Self::new(ident, name, lat, lon, WaypointCategory::Navaid(kind))
    }

    pub fn new(
        ident: impl Into<String>,
        name: impl Into<String>,
        lat: f64,
        lon: f64,
        category: WaypointCategory,
    ) -> Self {
        Self {
            ident: ident.into(),
            name: name.into(),
            lat,
            lon,
            category,
            power: None,
            frequency_khz: None,
            iso_country: None,
            annotation_nm: None,
        }
    }

    pub fn with_power(mut self, power: PowerClass) -> Self {
        self.power = Some(power);
        self
    }

    pub fn with_frequency_khz(mut self, frequency_khz: f64) -> Self {
        self.frequency_khz = Some(frequency_khz);
        self
    }

    pub fn with_country(mut self, iso_country: impl Into<String>) -> Self {
        self.iso_country = Some(iso_country.into());
        self
    }

    /// True when both records describe the same physical fix.
    ///
    /// Identifiers alone are not unique across the airport and navaid
    /// tables, so category and position take part in the comparison.
    pub fn same_fix(&self, other: &Waypoint) -> bool {
        self.ident == other.ident
            && self.category == other.category
            && self.lat.to_bits() == other.lat.to_bits()
            && self.lon.to_bits() == other.lon.to_bits()
    }

    /// Frequency as printed on charts: kHz for NDBs, MHz for everything else.
    pub fn frequency_label(&self) -> Option<String> {
        let khz = self.frequency_khz?;
        if self.category.is_ndb_family() {
            Some(format!("{}", khz))
        } else {
            Some(format!("{:.2}", khz / 1000.0))
        }
    }
}

/// An ordered route from source to destination.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    pub source: Waypoint,
    /// Intermediate waypoints, in flying order.
    pub via: Vec<Waypoint>,
    pub destination: Waypoint,
}

impl Route {
    /// Every waypoint in flying order. A route whose endpoints are the same
    /// fix lists it once.
    pub fn waypoints(&self) -> Vec<&Waypoint> {
        let mut out = Vec::with_capacity(self.via.len() + 2);
        out.push(&self.source);
        out.extend(self.via.iter());
        if !(self.via.is_empty() && self.source.same_fix(&self.destination)) {
            out.push(&self.destination);
        }
        out
    }

    pub fn leg_count(&self) -> usize {
        self.waypoints().len() - 1
    }

    pub fn total_distance_nm(&self) -> f64 {
        self.waypoints()
            .windows(2)
            .map(|pair| crate::spatial::distance(pair[0], pair[1]))
            .sum()
    }

    /// Space-separated identifiers, e.g. `KSFO SAU OAL KLAS`.
    pub fn route_string(&self) -> String {
        self.waypoints()
            .iter()
            .map(|wp| wp.ident.as_str())
            .collect::<Vec<_>>()
            .join(" ")
    }
}
