//! Resolving user-supplied identifiers to source and destination fixes.
//!
//! Identifiers are not unique: the same code can name an airport and a
//! navaid, or fixes in different countries.

use crate::dataset::{DatasetError, WaypointSource, WaypointTable};
use crate::error::PlanError;
use crate::models::Waypoint;
use crate::spatial::distance;
use std::collections::HashSet;

/// How to choose among records sharing an identifier.
///
/// The source is always the first match in the preferred region, or the
/// first match when none is in that region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EndpointPolicy {
    /// Destination is the first match in the source's country.
    Region(Option<String>),
    /// Destination is the match nearest to the source.
    NearestToSource(Option<String>),
}

impl EndpointPolicy {
    fn region(&self) -> Option<&str> {
        match self {
            Self::Region(region) | Self::NearestToSource(region) => region.as_deref(),
        }
    }
}

/// Canonical form of a typed identifier.
pub fn normalize_ident(raw: &str) -> String {
    raw.trim().to_ascii_uppercase()
}

/// Every record in `tables` whose identifier is one of `idents`.
pub fn find_idents(
    dataset: &dyn WaypointSource,
    tables: &[WaypointTable],
    idents: &[&str],
) -> Result<Vec<Waypoint>, DatasetError> {
    let wanted: HashSet<String> = idents.iter().map(|ident| normalize_ident(ident)).collect();
    let mut found = Vec::new();
    for &table in tables {
        found.extend(dataset.query(table, &|wp| wanted.contains(&wp.ident))?);
    }
    Ok(found)
}

/// Pick the source and destination among `matches`.
pub fn resolve_endpoints(
    source_ident: &str,
    destination_ident: &str,
    matches: &[Waypoint],
    policy: &EndpointPolicy,
) -> Result<(Waypoint, Waypoint), PlanError> {
    let source_ident = normalize_ident(source_ident);
    let destination_ident = normalize_ident(destination_ident);
    if source_ident == destination_ident {
        return Err(PlanError::DegenerateRequest {
            ident: source_ident,
        });
    }

    let sources: Vec<&Waypoint> = matches.iter().filter(|wp| wp.ident == source_ident).collect();
    let destinations: Vec<&Waypoint> = matches
        .iter()
        .filter(|wp| wp.ident == destination_ident)
        .collect();

    let mut missing = Vec::new();
    if sources.is_empty() {
        missing.push(source_ident.clone());
    }
    if destinations.is_empty() {
        missing.push(destination_ident.clone());
    }
    if !missing.is_empty() {
        return Err(PlanError::WaypointNotFound { idents: missing });
    }

    let region = policy.region().map(normalize_ident);
    let source = region
        .as_deref()
        .and_then(|region| {
            sources
                .iter()
                .find(|wp| wp.iso_country.as_deref() == Some(region))
        })
        .unwrap_or(&sources[0]);

    let destination = match policy {
        EndpointPolicy::Region(_) => destinations
            .iter()
            .find(|wp| wp.iso_country.is_some() && wp.iso_country == source.iso_country)
            .unwrap_or(&destinations[0]),
        EndpointPolicy::NearestToSource(_) => destinations
            .iter()
            .min_by(|a, b| distance(source, a).total_cmp(&distance(source, b)))
            .unwrap_or(&destinations[0]),
    };

    if sources.len() > 1 || destinations.len() > 1 {
        tracing::debug!(
            "Resolved {} of {} candidates for {} and {} of {} for {}",
            source.category,
            sources.len(),
            source_ident,
            destination.category,
            destinations.len(),
            destination_ident
        );
    }

    Ok(((*source).clone(), (*destination).clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::InMemoryDataset;
    use crate::models::{AirportKind, NavaidKind};

    fn dataset() -> InMemoryDataset {
        let mut data = InMemoryDataset::default();
        let fixes = [
            Waypoint::airport("KSFO", "San Francisco", 37.62, -122.37, AirportKind::Large)
                .with_country("US"),
            Waypoint::navaid("LIM", "Lima", -12.0, -77.1, NavaidKind::Vor).with_country("PE"),
            Waypoint::navaid("LIM", "Limoges", 45.8, 1.2, NavaidKind::Vor).with_country("FR"),
            Waypoint::navaid("BOD", "Bordeaux", 44.8, -0.7, NavaidKind::VorDme)
                .with_country("FR"),
            Waypoint::navaid("BOD", "Bodie", 38.2, -119.0, NavaidKind::Vor).with_country("US"),
        ];
        for fix in fixes {
            data.push(fix);
        }
        data
    }

    fn lookup(src: &str, dst: &str) -> Vec<Waypoint> {
        find_idents(
            &dataset(),
            &[WaypointTable::Airports, WaypointTable::Navaids],
            &[src, dst],
        )
        .unwrap()
    }

    #[test]
    fn missing_idents_are_all_reported() {
        let matches = lookup("XXXX", "YYYY");
        let err = resolve_endpoints("xxxx", "yyyy", &matches, &EndpointPolicy::Region(None))
            .unwrap_err();
        assert_eq!(
            err,
            PlanError::WaypointNotFound {
                idents: vec!["XXXX".into(), "YYYY".into()]
            }
        );
        assert_eq!(err.to_string(), "can't find XXXX, YYYY");
    }

    #[test]
    fn equal_idents_are_degenerate() {
        let matches = lookup("KSFO", "KSFO");
        let err = resolve_endpoints("KSFO", " ksfo", &matches, &EndpointPolicy::Region(None))
            .unwrap_err();
        assert!(matches!(err, PlanError::DegenerateRequest { .. }));
    }

    #[test]
    fn region_prefers_source_country_for_destination() {
        let matches = lookup("LIM", "BOD");
        let (src, dst) = resolve_endpoints(
            "lim",
            "bod",
            &matches,
            &EndpointPolicy::Region(Some("fr".into())),
        )
        .unwrap();
        assert_eq!(src.name, "Limoges");
        assert_eq!(dst.name, "Bordeaux");

        let (src, dst) =
            resolve_endpoints("LIM", "BOD", &matches, &EndpointPolicy::Region(None)).unwrap();
        assert_eq!(src.name, "Lima");
        // No BOD in PE: first match wins
        assert_eq!(dst.name, "Bordeaux");
    }

    #[test]
    fn nearest_destination_to_source() {
        let matches = lookup("KSFO", "BOD");
        let (src, dst) =
            resolve_endpoints("KSFO", "BOD", &matches, &EndpointPolicy::NearestToSource(None))
                .unwrap();
        assert_eq!(src.ident, "KSFO");
        assert_eq!(dst.name, "Bodie");
    }
}
