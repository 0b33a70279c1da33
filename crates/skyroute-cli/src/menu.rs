//! Numbered route-type menus for the planners.
//!
//! Each choice maps to the set of waypoint categories it removes from the
//! candidate set. The first option is always the default.

use std::io::{self, BufRead, Write};

use skyroute_core::{AirportKind, CategoryFilter, NavaidKind, WaypointCategory};

pub trait RouteTypeMenu: Sized + Copy + 'static {
    /// What the user is picking, e.g. "VOR route type".
    const TITLE: &'static str;

    /// Options in menu order.
    fn options() -> &'static [Self];

    fn label(&self) -> &'static str;

    /// Categories this choice excludes.
    fn excluded(&self) -> Vec<WaypointCategory>;

    fn category_filter(&self) -> CategoryFilter {
        CategoryFilter::excluding(self.excluded())
    }

    /// Option for a typed 1-based choice; anything else is the default.
    fn from_choice(raw: &str) -> Self {
        let options = Self::options();
        raw.trim()
            .parse::<usize>()
            .ok()
            .and_then(|n| n.checked_sub(1))
            .and_then(|i| options.get(i).copied())
            .unwrap_or(options[0])
    }
}

/// Print the menu to `output` and read one line from `input`.
pub fn prompt<M: RouteTypeMenu>(
    input: &mut impl BufRead,
    output: &mut impl Write,
) -> io::Result<M> {
    writeln!(output)?;
    writeln!(output, "Enter number of {} (or press Return for 1):", M::TITLE)?;
    writeln!(output)?;
    for (i, option) in M::options().iter().enumerate() {
        writeln!(output, "  [{}] - {}", i + 1, option.label())?;
    }
    writeln!(output)?;
    write!(output, "> ")?;
    output.flush()?;

    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(M::from_choice(&line))
}

/// Use `preset` when given, otherwise ask on the terminal.
pub fn choose<M: RouteTypeMenu>(preset: Option<usize>) -> io::Result<M> {
    match preset {
        Some(n) => Ok(M::from_choice(&n.to_string())),
        None => prompt(&mut io::stdin().lock(), &mut io::stderr()),
    }
}

fn navaids(kinds: &[NavaidKind]) -> Vec<WaypointCategory> {
    kinds.iter().map(|&kind| WaypointCategory::Navaid(kind)).collect()
}

fn airports(kinds: &[AirportKind]) -> Vec<WaypointCategory> {
    kinds.iter().map(|&kind| WaypointCategory::Airport(kind)).collect()
}

const MILITARY: &[NavaidKind] = &[NavaidKind::Tacan];
const MODERN_NON_MILITARY: &[NavaidKind] = &[NavaidKind::VorDme, NavaidKind::Vor];
const MODERN: &[NavaidKind] = &[NavaidKind::VorDme, NavaidKind::Vortac, NavaidKind::Vor];
const LEGACY: &[NavaidKind] = &[NavaidKind::Ndb, NavaidKind::NdbDme];

fn excluding(groups: &[&[NavaidKind]]) -> Vec<WaypointCategory> {
    navaids(&groups.concat())
}

/// Menu of the `route` planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavaidRouteType {
    AllAvailable,
    Civilian,
    ModernCivilian,
    LegacyCivilian,
    Military,
}

impl RouteTypeMenu for NavaidRouteType {
    const TITLE: &'static str = "VOR route type";

    fn options() -> &'static [Self] {
        &[
            Self::AllAvailable,
            Self::Civilian,
            Self::ModernCivilian,
            Self::LegacyCivilian,
            Self::Military,
        ]
    }

    fn label(&self) -> &'static str {
        match self {
            Self::AllAvailable => "All available",
            Self::Civilian => "Civilian (VOR/DME & NDB)",
            Self::ModernCivilian => "Modern civilian (VOR/DME)",
            Self::LegacyCivilian => "Legacy civilian (NDB)",
            Self::Military => "Military (TACAN & VORTAC)",
        }
    }

    fn excluded(&self) -> Vec<WaypointCategory> {
        match self {
            Self::AllAvailable => Vec::new(),
            Self::Civilian => excluding(&[MILITARY]),
            Self::ModernCivilian => excluding(&[MILITARY, LEGACY]),
            Self::LegacyCivilian => excluding(&[MODERN, MILITARY]),
            Self::Military => excluding(&[LEGACY, MODERN_NON_MILITARY]),
        }
    }
}

/// Menu of the `vorroute` planner.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VorRouteType {
    ModernCivilian,
    LegacyCivilian,
    AllCivilian,
    Military,
    AllAvailable,
}

impl RouteTypeMenu for VorRouteType {
    const TITLE: &'static str = "VOR route type";

    fn options() -> &'static [Self] {
        &[
            Self::ModernCivilian,
            Self::LegacyCivilian,
            Self::AllCivilian,
            Self::Military,
            Self::AllAvailable,
        ]
    }

    fn label(&self) -> &'static str {
        match self {
            Self::ModernCivilian => "Modern civilian (VOR/DME only)",
            Self::LegacyCivilian => "Legacy civilian (NDB only)",
            Self::AllCivilian => "All civilian (VOR/DME & NDB)",
            Self::Military => "Military (TACAN/VORTAC only)",
            Self::AllAvailable => "All available",
        }
    }

    fn excluded(&self) -> Vec<WaypointCategory> {
        match self {
            Self::ModernCivilian => excluding(&[MILITARY, LEGACY]),
            Self::LegacyCivilian => excluding(&[MODERN, MILITARY]),
            Self::AllCivilian => excluding(&[MILITARY]),
            Self::Military => excluding(&[LEGACY, MODERN_NON_MILITARY]),
            Self::AllAvailable => Vec::new(),
        }
    }
}

/// Menu of the `rangeroute` planner. Closed fields, seaplane bases and
/// heliports are never candidates.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AirportRouteType {
    LargeOnly,
    MediumOnly,
    SmallOnly,
    LargeAndMedium,
    SmallAndMedium,
    All,
}

impl RouteTypeMenu for AirportRouteType {
    const TITLE: &'static str = "airport filter";

    fn options() -> &'static [Self] {
        &[
            Self::LargeOnly,
            Self::MediumOnly,
            Self::SmallOnly,
            Self::LargeAndMedium,
            Self::SmallAndMedium,
            Self::All,
        ]
    }

    fn label(&self) -> &'static str {
        match self {
            Self::LargeOnly => "Large airports only",
            Self::MediumOnly => "Medium airports only",
            Self::SmallOnly => "Small airports only",
            Self::LargeAndMedium => "Large and medium airports",
            Self::SmallAndMedium => "Small and medium airports",
            Self::All => "All airports (very slow)",
        }
    }

    fn excluded(&self) -> Vec<WaypointCategory> {
        use AirportKind::{Closed, Heliport, Large, Medium, SeaplaneBase, Small};
        let sizes: &[AirportKind] = match self {
            Self::LargeOnly => &[Small, Medium],
            Self::MediumOnly => &[Small, Large],
            Self::SmallOnly => &[Medium, Large],
            Self::LargeAndMedium => &[Small],
            Self::SmallAndMedium => &[Large],
            Self::All => &[],
        };
        let mut kinds = vec![Closed, SeaplaneBase, Heliport];
        kinds.extend_from_slice(sizes);
        airports(&kinds)
    }
}
