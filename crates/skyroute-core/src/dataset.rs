//! Waypoint datasets: OurAirports-format CSV files or in-memory tables.

use crate::models::{AirportKind, NavaidKind, PowerClass, Waypoint};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

#[derive(Debug, thiserror::Error)]
pub enum DatasetError {
    #[error("failed to open {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to read {path}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// The two tables a dataset provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum WaypointTable {
    Airports,
    Navaids,
}

impl WaypointTable {
    pub fn file_name(&self) -> &'static str {
        match self {
            Self::Airports => "airports.csv",
            Self::Navaids => "navaids.csv",
        }
    }
}

/// Read access to waypoint tables.
pub trait WaypointSource {
    /// Call `visit` with every record of `table`, in file order.
    fn scan(
        &self,
        table: WaypointTable,
        visit: &mut dyn FnMut(Waypoint),
    ) -> Result<(), DatasetError>;

    /// Every record of `table` accepted by `predicate`.
    fn query(
        &self,
        table: WaypointTable,
        predicate: &dyn Fn(&Waypoint) -> bool,
    ) -> Result<Vec<Waypoint>, DatasetError> {
        self.query_annotated(table, predicate, &|_| {})
    }

    /// Like [`WaypointSource::query`], running `annotate` on each accepted
    /// record before it is collected.
    fn query_annotated(
        &self,
        table: WaypointTable,
        predicate: &dyn Fn(&Waypoint) -> bool,
        annotate: &dyn Fn(&mut Waypoint),
    ) -> Result<Vec<Waypoint>, DatasetError> {
        let mut out = Vec::new();
        self.scan(table, &mut |mut waypoint| {
            if predicate(&waypoint) {
                annotate(&mut waypoint);
                out.push(waypoint);
            }
        })?;
        Ok(out)
    }

    /// The whole table.
    fn load(&self, table: WaypointTable) -> Result<Vec<Waypoint>, DatasetError> {
        self.query(table, &|_| true)
    }
}

#[derive(Debug, Deserialize)]
struct AirportRecord {
    ident: String,
    #[serde(rename = "type")]
    kind: String,
    name: String,
    latitude_deg: String,
    longitude_deg: String,
    #[serde(default)]
    iso_country: String,
}

#[derive(Debug, Deserialize)]
struct NavaidRecord {
    ident: String,
    name: String,
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    frequency_khz: String,
    latitude_deg: String,
    longitude_deg: String,
    #[serde(default)]
    iso_country: String,
    #[serde(default)]
    power: String,
}

fn parse_position(lat: &str, lon: &str) -> Option<(f64, f64)> {
    let lat: f64 = lat.trim().parse().ok()?;
    let lon: f64 = lon.trim().parse().ok()?;
    if !lat.is_finite() || !lon.is_finite() || lat.abs() > 90.0 || lon.abs() > 180.0 {
        return None;
    }
    Some((lat, lon))
}

fn non_empty(raw: String) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl AirportRecord {
    fn into_waypoint(self) -> Option<Waypoint> {
        let (lat, lon) = parse_position(&self.latitude_deg, &self.longitude_deg)?;
        let mut waypoint = Waypoint::airport(
            self.ident.trim(),
            self.name,
            lat,
            lon,
            AirportKind::parse(&self.kind),
        );
        waypoint.iso_country = non_empty(self.iso_country);
        Some(waypoint)
    }
}

impl NavaidRecord {
    fn into_waypoint(self) -> Option<Waypoint> {
        let (lat, lon) = parse_position(&self.latitude_deg, &self.longitude_deg)?;
        let mut waypoint = Waypoint::navaid(
            self.ident.trim(),
            self.name,
            lat,
            lon,
            NavaidKind::parse(&self.kind),
        );
        waypoint.power = PowerClass::parse(&self.power);
        waypoint.frequency_khz = self.frequency_khz.trim().parse().ok();
        waypoint.iso_country = non_empty(self.iso_country);
        Some(waypoint)
    }
}

fn read_records<R, T>(
    path: &Path,
    reader: R,
    convert: fn(T) -> Option<Waypoint>,
    visit: &mut dyn FnMut(Waypoint),
) -> Result<(), DatasetError>
where
    R: Read,
    T: DeserializeOwned,
{
    let mut rdr = csv::Reader::from_reader(reader);
    rdr.headers().map_err(|source| DatasetError::Csv {
        path: path.to_path_buf(),
        source,
    })?;

    let mut skipped = 0usize;
    for (row, result) in rdr.deserialize::<T>().enumerate() {
        match result.map(convert) {
            Ok(Some(waypoint)) => visit(waypoint),
            Ok(None) => {
                skipped += 1;
                tracing::warn!("Skipping {} row {}: bad coordinates", path.display(), row + 2);
            }
            Err(err) if err.is_io_error() => {
                return Err(DatasetError::Csv {
                    path: path.to_path_buf(),
                    source: err,
                });
            }
            Err(err) => {
                skipped += 1;
                tracing::warn!("Skipping {} row {}: {}", path.display(), row + 2, err);
            }
        }
    }
    if skipped > 0 {
        tracing::info!("Skipped {} unreadable rows in {}", skipped, path.display());
    }
    Ok(())
}

/// Reads `airports.csv` and `navaids.csv` from a data directory.
///
/// Files are re-read on every scan; nothing is cached between calls.
#[derive(Debug, Clone)]
pub struct CsvDataset {
    dir: PathBuf,
}

impl CsvDataset {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn path_of(&self, table: WaypointTable) -> PathBuf {
        self.dir.join(table.file_name())
    }

    /// Scan CSV text for `table` from any reader.
    pub fn scan_reader<R: Read>(
        table: WaypointTable,
        label: &Path,
        reader: R,
        visit: &mut dyn FnMut(Waypoint),
    ) -> Result<(), DatasetError> {
        match table {
            WaypointTable::Airports => {
                read_records(label, reader, AirportRecord::into_waypoint, visit)
            }
            WaypointTable::Navaids => {
                read_records(label, reader, NavaidRecord::into_waypoint, visit)
            }
        }
    }
}

impl WaypointSource for CsvDataset {
    fn scan(
        &self,
        table: WaypointTable,
        visit: &mut dyn FnMut(Waypoint),
    ) -> Result<(), DatasetError> {
        let path = self.path_of(table);
        tracing::debug!("Reading {}", path.display());
        let file = File::open(&path).map_err(|source| DatasetError::Io {
            path: path.clone(),
            source,
        })?;
        Self::scan_reader(table, &path, file, visit)
    }
}

/// Tables held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDataset {
    pub airports: Vec<Waypoint>,
    pub navaids: Vec<Waypoint>,
}

impl InMemoryDataset {
    pub fn new(airports: Vec<Waypoint>, navaids: Vec<Waypoint>) -> Self {
        Self { airports, navaids }
    }

    /// Add a waypoint to the table matching its category.
    pub fn push(&mut self, waypoint: Waypoint) {
        if waypoint.category.is_airport() {
            self.airports.push(waypoint);
        } else {
            self.navaids.push(waypoint);
        }
    }
}

impl WaypointSource for InMemoryDataset {
    fn scan(
        &self,
        table: WaypointTable,
        visit: &mut dyn FnMut(Waypoint),
    ) -> Result<(), DatasetError> {
        let rows = match table {
            WaypointTable::Airports => &self.airports,
            WaypointTable::Navaids => &self.navaids,
        };
        rows.iter().cloned().for_each(visit);
        Ok(())
    }
}
