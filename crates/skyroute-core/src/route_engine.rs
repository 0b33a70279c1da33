//! Range-constrained shortest-path planner.
//!
//! Every request builds its own candidate arena, so solver state never
//! outlives a call. Predecessor links are arena indices.

use crate::error::PlanError;
use crate::filter::{CandidateFilter, CategoryFilter, GeoCorridor};
use crate::models::{Route, Waypoint};
use crate::rules::{RangeModel, SignalRanges};
use crate::spatial::haversine_nm;
use serde::{Deserialize, Serialize};
use std::cmp::{Ordering, Reverse};
use std::collections::{BinaryHeap, HashSet};

/// Corridor radius as a multiple of the direct distance, aircraft planner.
pub const AIRCRAFT_CORRIDOR_FACTOR: f64 = 1.0;

/// Corridor radius as a multiple of the direct distance, radio planners.
/// Radio routes detour further to stay within reception of a station.
pub const RADIO_CORRIDOR_FACTOR: f64 = 2.0;

/// How the next node to finalise is picked.
///
/// Both strategies choose the smallest tentative distance and break ties
/// toward the lowest arena index, so they produce identical routes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Selection {
    /// Scan the live set every iteration.
    #[default]
    LinearScan,
    /// Binary heap with lazy deletion.
    Heap,
}

#[derive(Debug, Clone)]
pub struct PlannerConfig {
    pub corridor_factor: f64,
    pub range_model: RangeModel,
    pub categories: CategoryFilter,
    pub selection: Selection,
}

impl PlannerConfig {
    /// Airport-to-airport planning limited by the aircraft's leg range.
    pub fn aircraft(max_leg_nm: f64) -> Self {
        Self {
            corridor_factor: AIRCRAFT_CORRIDOR_FACTOR,
            range_model: RangeModel::AircraftLeg { max_leg_nm },
            categories: CategoryFilter::allow_all(),
            selection: Selection::default(),
        }
    }

    /// Station-to-station planning limited by reception range.
    pub fn radio(ranges: SignalRanges) -> Self {
        Self {
            corridor_factor: RADIO_CORRIDOR_FACTOR,
            range_model: RangeModel::SignalReception(ranges),
            categories: CategoryFilter::allow_all(),
            selection: Selection::default(),
        }
    }

    pub fn with_categories(mut self, categories: CategoryFilter) -> Self {
        self.categories = categories;
        self
    }

    pub fn with_corridor_factor(mut self, factor: f64) -> Self {
        self.corridor_factor = factor;
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }
}

/// A waypoint plus the solver fields for one run.
#[derive(Debug, Clone)]
struct Candidate {
    waypoint: Waypoint,
    tentative_nm: f64,
    predecessor: Option<usize>,
}

/// The working graph for one request.
///
/// Source and destination are always members, whatever the filters said.
#[derive(Debug, Clone)]
pub struct CandidateSet {
    nodes: Vec<Candidate>,
    finalized: Vec<bool>,
    source: usize,
    destination: usize,
}

type FixKey = (String, crate::models::WaypointCategory, u64, u64);

fn fix_key(waypoint: &Waypoint) -> FixKey {
    (
        waypoint.ident.clone(),
        waypoint.category,
        waypoint.lat.to_bits(),
        waypoint.lon.to_bits(),
    )
}

impl CandidateSet {
    /// Arena of `admitted` waypoints (order kept, duplicates dropped) with
    /// the source and destination appended when missing.
    pub fn build(source: &Waypoint, destination: &Waypoint, admitted: Vec<Waypoint>) -> Self {
        let mut seen: HashSet<FixKey> = HashSet::new();
        let mut nodes = Vec::with_capacity(admitted.len() + 2);
        for waypoint in admitted {
            if seen.insert(fix_key(&waypoint)) {
                nodes.push(Candidate {
                    waypoint,
                    tentative_nm: f64::INFINITY,
                    predecessor: None,
                });
            }
        }

        let mut locate = |endpoint: &Waypoint, nodes: &mut Vec<Candidate>| -> usize {
            if seen.insert(fix_key(endpoint)) {
                nodes.push(Candidate {
                    waypoint: endpoint.clone(),
                    tentative_nm: f64::INFINITY,
                    predecessor: None,
                });
                nodes.len() - 1
            } else {
                nodes
                    .iter()
                    .position(|node| node.waypoint.same_fix(endpoint))
                    .unwrap_or(0)
            }
        };
        let source = locate(source, &mut nodes);
        let destination = locate(destination, &mut nodes);
        let finalized = vec![false; nodes.len()];

        Self {
            nodes,
            finalized,
            source,
            destination,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn source_index(&self) -> usize {
        self.source
    }

    pub fn destination_index(&self) -> usize {
        self.destination
    }

    pub fn waypoint(&self, index: usize) -> &Waypoint {
        &self.nodes[index].waypoint
    }

    pub fn tentative_nm(&self, index: usize) -> f64 {
        self.nodes[index].tentative_nm
    }

    /// True once the node has been removed from the live set.
    pub fn is_finalized(&self, index: usize) -> bool {
        self.finalized[index]
    }

    fn reset(&mut self) {
        for node in &mut self.nodes {
            node.tentative_nm = f64::INFINITY;
            node.predecessor = None;
        }
        self.finalized = vec![false; self.nodes.len()];
        if let Some(source) = self.nodes.get_mut(self.source) {
            source.tentative_nm = 0.0;
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SolveStats {
    /// Nodes removed from the live set.
    pub iterations: usize,
    /// Successful distance improvements.
    pub relaxations: usize,
    pub reached: bool,
}

#[derive(Debug, Clone, Copy)]
struct FloatOrd(f64);

impl PartialEq for FloatOrd {
    fn eq(&self, other: &Self) -> bool {
        self.0.to_bits() == other.0.to_bits()
    }
}

impl Eq for FloatOrd {}

impl PartialOrd for FloatOrd {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for FloatOrd {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0.total_cmp(&other.0)
    }
}

enum Frontier {
    LinearScan,
    Heap(BinaryHeap<Reverse<(FloatOrd, usize)>>),
}

impl Frontier {
    fn new(selection: Selection, source: usize) -> Self {
        match selection {
            Selection::LinearScan => Self::LinearScan,
            Selection::Heap => {
                let mut heap = BinaryHeap::new();
                heap.push(Reverse((FloatOrd(0.0), source)));
                Self::Heap(heap)
            }
        }
    }

    fn push(&mut self, index: usize, tentative_nm: f64) {
        if let Self::Heap(heap) = self {
            heap.push(Reverse((FloatOrd(tentative_nm), index)));
        }
    }

    /// Live node with the smallest finite distance, lowest index on ties.
    fn pop(&mut self, set: &CandidateSet) -> Option<usize> {
        match self {
            Self::LinearScan => {
                let mut best: Option<usize> = None;
                for index in 0..set.nodes.len() {
                    if set.finalized[index] || !set.nodes[index].tentative_nm.is_finite() {
                        continue;
                    }
                    let tentative = set.nodes[index].tentative_nm;
                    if best.map_or(true, |current| tentative < set.nodes[current].tentative_nm) {
                        best = Some(index);
                    }
                }
                best
            }
            Self::Heap(heap) => {
                while let Some(Reverse((FloatOrd(dist), index))) = heap.pop() {
                    let stale = dist.to_bits() != set.nodes[index].tentative_nm.to_bits();
                    if set.finalized[index] || stale {
                        continue;
                    }
                    return Some(index);
                }
                None
            }
        }
    }
}

/// Single-source label-setting search from the set's source.
///
/// Stops when the destination is finalised or when no live node is
/// reachable. Hop u -> v is relaxed only if `range` admits a leg of
/// `distance(u, v)` into v.
pub fn solve(set: &mut CandidateSet, range: &RangeModel, selection: Selection) -> SolveStats {
    set.reset();
    let mut stats = SolveStats::default();
    if set.is_empty() {
        return stats;
    }

    let mut frontier = Frontier::new(selection, set.source);
    while let Some(u) = frontier.pop(set) {
        set.finalized[u] = true;
        stats.iterations += 1;

        if u == set.destination {
            stats.reached = true;
            break;
        }

        let (u_lat, u_lon, u_dist) = {
            let node = &set.nodes[u];
            (node.waypoint.lat, node.waypoint.lon, node.tentative_nm)
        };
        for v in 0..set.nodes.len() {
            if set.finalized[v] {
                continue;
            }
            let node = &mut set.nodes[v];
            let edge_nm = haversine_nm(u_lat, u_lon, node.waypoint.lat, node.waypoint.lon);
            if !range.admits_hop(&node.waypoint, edge_nm) {
                continue;
            }
            let candidate = u_dist + edge_nm;
            if candidate < node.tentative_nm {
                node.tentative_nm = candidate;
                node.predecessor = Some(u);
                stats.relaxations += 1;
                frontier.push(v, candidate);
            }
        }
    }

    tracing::debug!(
        "Solver finalised {} of {} nodes ({} relaxations), destination reached: {}",
        stats.iterations,
        set.len(),
        stats.relaxations,
        stats.reached
    );
    stats
}

/// Arena indices from source to destination, both included.
///
/// `None` when the predecessor walk from the destination does not end at
/// the source.
pub fn reconstruct_path(set: &CandidateSet) -> Option<Vec<usize>> {
    let mut chain = Vec::new();
    let mut current = Some(set.destination);
    while let Some(index) = current {
        chain.push(index);
        if chain.len() > set.len() {
            return None;
        }
        current = set.nodes[index].predecessor;
    }
    chain.reverse();
    if chain.first() != Some(&set.source) {
        return None;
    }
    Some(chain)
}

/// The chain without its endpoints; empty for chains of one or two nodes.
pub fn interior(chain: &[usize]) -> &[usize] {
    if chain.len() <= 2 {
        &[]
    } else {
        &chain[1..chain.len() - 1]
    }
}

/// A solved request.
#[derive(Debug, Clone)]
pub struct PlannedRoute {
    pub route: Route,
    /// Size of the candidate set after pruning.
    pub candidates: usize,
    pub stats: SolveStats,
}

/// Plan a route from `source` to `destination` through `universe`.
///
/// `universe` is pruned with the corridor and category filters first; the
/// endpoints are added back regardless.
pub fn plan_route(
    source: &Waypoint,
    destination: &Waypoint,
    universe: impl IntoIterator<Item = Waypoint>,
    config: &PlannerConfig,
) -> Result<PlannedRoute, PlanError> {
    let filter = CandidateFilter {
        corridor: GeoCorridor::between(source, destination, config.corridor_factor),
        categories: config.categories.clone(),
    };
    let admitted = filter.prune(universe);
    let mut set = CandidateSet::build(source, destination, admitted);
    tracing::info!(
        "Considering {} candidate waypoints within {:.0} nm of the midpoint",
        set.len(),
        filter.corridor.radius_nm
    );

    let no_route = || PlanError::NoRoute {
        origin: source.ident.clone(),
        destination: destination.ident.clone(),
        guidance: config.range_model.guidance().to_string(),
    };

    let stats = solve(&mut set, &config.range_model, config.selection);
    if !stats.reached {
        return Err(no_route());
    }
    let chain = reconstruct_path(&set).ok_or_else(no_route)?;
    let via = interior(&chain)
        .iter()
        .map(|&index| set.waypoint(index).clone())
        .collect();

    Ok(PlannedRoute {
        route: Route {
            source: source.clone(),
            via,
            destination: destination.clone(),
        },
        candidates: set.len(),
        stats,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NavaidKind, PowerClass};

    fn vor(ident: &str, lat: f64, lon: f64, power: PowerClass) -> Waypoint {
        Waypoint::navaid(ident, ident, lat, lon, NavaidKind::Vor).with_power(power)
    }

    #[test]
    fn endpoints_are_added_once() {
        let s = vor("S", 0.0, 0.0, PowerClass::Low);
        let d = vor("D", 0.0, 1.0, PowerClass::Low);
        let m = vor("M", 0.0, 0.5, PowerClass::Low);
        let set = CandidateSet::build(&s, &d, vec![m.clone(), d.clone(), m]);
        assert_eq!(set.len(), 3);
        assert_eq!(set.waypoint(set.destination_index()).ident, "D");
        assert_eq!(set.waypoint(set.source_index()).ident, "S");
        assert_eq!(set.source_index(), 2);
    }

    #[test]
    fn same_endpoint_yields_single_node_chain() {
        let s = vor("S", 0.0, 0.0, PowerClass::Low);
        let mut set = CandidateSet::build(&s, &s, Vec::new());
        let model = RangeModel::AircraftLeg { max_leg_nm: 1.0 };
        let stats = solve(&mut set, &model, Selection::LinearScan);
        assert!(stats.reached);
        assert_eq!(reconstruct_path(&set), Some(vec![0]));
    }

    #[test]
    fn hop_admissibility_uses_receiving_station() {
        // A (HIGH) and B (LOW) are 100 nm apart
        let a = vor("A", 0.0, 0.0, PowerClass::High);
        let b = Waypoint::navaid(
            "B",
            "B",
            0.0,
            100.0 / 60.06,
            NavaidKind::Vor,
        )
        .with_power(PowerClass::Low);
        let model = RangeModel::SignalReception(SignalRanges::route_defaults());

        // A -> B needs B's LOW range (25 nm): unreachable
        let mut forward = CandidateSet::build(&a, &b, Vec::new());
        assert!(!solve(&mut forward, &model, Selection::LinearScan).reached);

        // B -> A needs A's HIGH range (130 nm): reachable
        let mut backward = CandidateSet::build(&b, &a, Vec::new());
        assert!(solve(&mut backward, &model, Selection::LinearScan).reached);

        // Raising B's power opens only the hops into B
        let strong_b = b.clone().with_power(PowerClass::High);
        let mut forward = CandidateSet::build(&a, &strong_b, Vec::new());
        assert!(solve(&mut forward, &model, Selection::LinearScan).reached);
        let weak_a = a.clone().with_power(PowerClass::Low);
        let mut backward = CandidateSet::build(&strong_b, &weak_a, Vec::new());
        assert!(!solve(&mut backward, &model, Selection::LinearScan).reached);
    }

    #[test]
    fn interior_is_bounds_checked() {
        assert!(interior(&[]).is_empty());
        assert!(interior(&[4]).is_empty());
        assert!(interior(&[4, 2]).is_empty());
        assert_eq!(interior(&[4, 2, 7, 1]), &[2, 7]);
    }

    #[test]
    fn unreachable_destination_has_no_path() {
        let s = vor("S", 0.0, 0.0, PowerClass::Low);
        let d = vor("D", 0.0, 5.0, PowerClass::Low);
        let mut set = CandidateSet::build(&s, &d, Vec::new());
        let stats = solve(&mut set, &RangeModel::AircraftLeg { max_leg_nm: 10.0 }, Selection::Heap);
        assert!(!stats.reached);
        assert!(reconstruct_path(&set).is_none());
        assert!(set.tentative_nm(set.destination_index()).is_infinite());
    }
}
