//! Magnetic declination lookup.
//!
//! The planners only need declination as a function of position; the
//! spherical-harmonic field model lives in [`igrf`].

mod igrf;

pub use igrf::{decimal_year, FieldModel, FieldModelError, IgrfDeclination};

use std::cell::RefCell;
use std::collections::HashMap;

/// Source of magnetic declination.
///
/// Returns degrees, positive east. Magnetic bearing is true bearing minus
/// this value.
pub trait DeclinationService {
    fn declination(&self, lat: f64, lon: f64, altitude_ft: f64) -> f64;
}

impl<T: DeclinationService + ?Sized> DeclinationService for &T {
    fn declination(&self, lat: f64, lon: f64, altitude_ft: f64) -> f64 {
        (**self).declination(lat, lon, altitude_ft)
    }
}

/// Constant declination everywhere.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct FixedDeclination(pub f64);

impl DeclinationService for FixedDeclination {
    fn declination(&self, _lat: f64, _lon: f64, _altitude_ft: f64) -> f64 {
        self.0
    }
}

/// Grid used for memoisation keys, in degrees.
const MEMO_GRID_DEG: f64 = 0.1;

/// Caches declination by coordinates rounded to a 0.1 degree grid.
///
/// Meant to live for one report only; nearby leg midpoints reuse a single
/// field synthesis.
pub struct MemoizedDeclination<D> {
    inner: D,
    cache: RefCell<HashMap<(i32, i32, i32), f64>>,
}

impl<D: DeclinationService> MemoizedDeclination<D> {
    pub fn new(inner: D) -> Self {
        Self {
            inner,
            cache: RefCell::new(HashMap::new()),
        }
    }

    /// Number of distinct grid cells evaluated so far.
    pub fn cached_cells(&self) -> usize {
        self.cache.borrow().len()
    }
}

impl<D: DeclinationService> DeclinationService for MemoizedDeclination<D> {
    fn declination(&self, lat: f64, lon: f64, altitude_ft: f64) -> f64 {
        let key = (
            (lat / MEMO_GRID_DEG).round() as i32,
            (lon / MEMO_GRID_DEG).round() as i32,
            altitude_ft.round() as i32,
        );
        if let Some(value) = self.cache.borrow().get(&key) {
            return *value;
        }
        let value = self.inner.declination(
            key.0 as f64 * MEMO_GRID_DEG,
            key.1 as f64 * MEMO_GRID_DEG,
            key.2 as f64,
        );
        self.cache.borrow_mut().insert(key, value);
        value
    }
}
