//! Spherical-harmonic main-field model (IGRF) and declination synthesis.
//!
//! Coefficients are Schmidt semi-normalised Gauss coefficients in nT,
//! ordered g(1,0), g(1,1), h(1,1), g(2,0), g(2,1), h(2,1), g(2,2), h(2,2), ...

use super::DeclinationService;
use chrono::{DateTime, Datelike, NaiveDate, Utc};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// Magnetic reference sphere radius in km.
const REFERENCE_RADIUS_KM: f64 = 6371.2;

/// WGS-84 ellipsoid.
const WGS84_EQUATORIAL_KM: f64 = 6378.137;
const WGS84_FLATTENING: f64 = 1.0 / 298.257_223_563;

const FEET_TO_KM: f64 = 0.000_304_8;

/// Colatitudes closer to a pole than this are nudged off it so the
/// azimuthal component stays finite.
const MIN_SIN_COLAT: f64 = 1e-10;

/// IGRF-13 main field for 2020.0, truncated at degree 3.
const IGRF13_2020: [f64; 15] = [
    -29404.8, -1450.9, 4652.5, -2499.6, 2982.0, -2991.6, 1677.0, -734.6, 1363.2, -2381.2, -82.1,
    1236.2, 241.9, 525.7, -543.4,
];

/// IGRF-13 secular variation for 2020-2025, nT/year.
const IGRF13_SV: [f64; 15] = [
    5.7, 7.4, -25.9, -11.0, -7.0, -30.2, -2.1, -22.4, 2.2, -5.9, 6.0, 3.1, -1.1, -12.0, 0.5,
];

#[derive(Debug, thiserror::Error)]
pub enum FieldModelError {
    #[error("failed to read coefficient file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("coefficient file line {line}: {reason}")]
    Parse { line: usize, reason: String },

    #[error("coefficient file has no model snapshots")]
    Empty,
}

/// A time series of main-field coefficient snapshots.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldModel {
    nmax: usize,
    epochs: Vec<f64>,
    snapshots: Vec<Vec<f64>>,
}

impl FieldModel {
    /// Build a model from snapshots. Every snapshot must hold
    /// `nmax * (nmax + 2)` coefficients and epochs must be increasing.
    pub fn new(
        nmax: usize,
        epochs: Vec<f64>,
        snapshots: Vec<Vec<f64>>,
    ) -> Result<Self, FieldModelError> {
        if epochs.is_empty() || epochs.len() != snapshots.len() {
            return Err(FieldModelError::Empty);
        }
        let expected = coefficient_count(nmax);
        if let Some(bad) = snapshots.iter().position(|s| s.len() != expected) {
            return Err(FieldModelError::Parse {
                line: 0,
                reason: format!(
                    "snapshot {} has {} coefficients, expected {}",
                    bad,
                    snapshots[bad].len(),
                    expected
                ),
            });
        }
        if epochs.windows(2).any(|w| w[1] <= w[0]) {
            return Err(FieldModelError::Parse {
                line: 0,
                reason: "epochs must be strictly increasing".to_string(),
            });
        }
        Ok(Self {
            nmax,
            epochs,
            snapshots,
        })
    }

    /// IGRF-13 to degree 3 for the 2020 and 2025 epochs.
    pub fn builtin() -> &'static FieldModel {
        static BUILTIN: OnceLock<FieldModel> = OnceLock::new();
        BUILTIN.get_or_init(|| {
            let predicted: Vec<f64> = IGRF13_2020
                .iter()
                .zip(IGRF13_SV.iter())
                .map(|(g, sv)| g + 5.0 * sv)
                .collect();
            FieldModel {
                nmax: 3,
                epochs: vec![2020.0, 2025.0],
                snapshots: vec![IGRF13_2020.to_vec(), predicted],
            }
        })
    }

    /// Load a model from an `.shc` coefficient file.
    pub fn from_shc_file(path: impl AsRef<Path>) -> Result<Self, FieldModelError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| FieldModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let model = Self::parse_shc(&text)?;
        tracing::info!(
            "Loaded field model from {} (degree {}, {} snapshots)",
            path.display(),
            model.nmax,
            model.epochs.len()
        );
        Ok(model)
    }

    /// Parse `.shc` text: `#` comments, a header line
    /// `nmin nmax N order step [start end]`, a line of N epochs, then rows
    /// `n m value_1 .. value_N` where negative `m` denotes an h coefficient.
    pub fn parse_shc(text: &str) -> Result<Self, FieldModelError> {
        let mut lines = text
            .lines()
            .enumerate()
            .map(|(idx, line)| (idx + 1, line.trim()))
            .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'));

        let (header_line, header) = lines.next().ok_or(FieldModelError::Empty)?;
        let header = parse_numbers(header_line, header)?;
        if header.len() < 3 {
            return Err(FieldModelError::Parse {
                line: header_line,
                reason: "header needs at least nmin, nmax and snapshot count".to_string(),
            });
        }
        let nmax = header[1] as usize;
        let count = header[2] as usize;
        if nmax == 0 || count == 0 {
            return Err(FieldModelError::Empty);
        }

        let (epoch_line, epochs) = lines.next().ok_or(FieldModelError::Empty)?;
        let epochs = parse_numbers(epoch_line, epochs)?;
        if epochs.len() != count {
            return Err(FieldModelError::Parse {
                line: epoch_line,
                reason: format!("expected {} epochs, found {}", count, epochs.len()),
            });
        }

        let mut snapshots = vec![vec![0.0; coefficient_count(nmax)]; count];
        for (line_no, line) in lines {
            let values = parse_numbers(line_no, line)?;
            if values.len() != count + 2 {
                return Err(FieldModelError::Parse {
                    line: line_no,
                    reason: format!("expected {} columns, found {}", count + 2, values.len()),
                });
            }
            let n = values[0] as usize;
            let m = values[1] as i64;
            if n == 0 || n > nmax || m.unsigned_abs() as usize > n {
                return Err(FieldModelError::Parse {
                    line: line_no,
                    reason: format!("degree/order ({}, {}) out of range", n, m),
                });
            }
            let index = if m < 0 {
                h_index(n, m.unsigned_abs() as usize)
            } else {
                g_index(n, m as usize)
            };
            for (snapshot, value) in snapshots.iter_mut().zip(&values[2..]) {
                snapshot[index] = *value;
            }
        }

        Self::new(nmax, epochs, snapshots)
    }

    pub fn nmax(&self) -> usize {
        self.nmax
    }

    /// Coefficients at a decimal year, linear between snapshots and
    /// extrapolated from the nearest segment outside them.
    pub fn coefficients_at(&self, year: f64) -> Vec<f64> {
        if self.epochs.len() == 1 {
            return self.snapshots[0].clone();
        }
        let last_segment = self.epochs.len() - 2;
        let segment = self
            .epochs
            .windows(2)
            .position(|w| year < w[1])
            .unwrap_or(last_segment)
            .min(last_segment);
        let (t0, t1) = (self.epochs[segment], self.epochs[segment + 1]);
        let ratio = (year - t0) / (t1 - t0);
        self.snapshots[segment]
            .iter()
            .zip(&self.snapshots[segment + 1])
            .map(|(a, b)| a + ratio * (b - a))
            .collect()
    }
}

/// Declination from a field model evaluated at a fixed date.
#[derive(Debug, Clone)]
pub struct IgrfDeclination {
    nmax: usize,
    coeffs: Vec<f64>,
    year: f64,
}

impl IgrfDeclination {
    pub fn new(model: &FieldModel, year: f64) -> Self {
        Self {
            nmax: model.nmax,
            coeffs: model.coefficients_at(year),
            year,
        }
    }

    /// `model` evaluated today.
    pub fn now(model: &FieldModel) -> Self {
        Self::new(model, decimal_year(Utc::now()))
    }

    /// Built-in model evaluated today.
    pub fn builtin_now() -> Self {
        Self::now(FieldModel::builtin())
    }

    pub fn year(&self) -> f64 {
        self.year
    }

    /// North, east and down field components (nT) in the geodetic frame.
    pub fn field_xyz(&self, lat: f64, lon: f64, altitude_ft: f64) -> (f64, f64, f64) {
        let lat = lat.clamp(-90.0, 90.0);
        let (radius_km, colat_deg, sd, cd) =
            geodetic_to_geocentric(altitude_ft * FEET_TO_KM, 90.0 - lat);
        let (br, bt, bp) = synth_values(&self.coeffs, self.nmax, radius_km, colat_deg, lon);

        let x = -bt;
        let y = bp;
        let z = -br;
        (x * cd + z * sd, y, z * cd - x * sd)
    }
}

impl DeclinationService for IgrfDeclination {
    fn declination(&self, lat: f64, lon: f64, altitude_ft: f64) -> f64 {
        let (x, y, _) = self.field_xyz(lat, lon, altitude_ft);
        y.atan2(x).to_degrees()
    }
}

/// Fractional year, e.g. 2024.5 around the start of July.
pub fn decimal_year(now: DateTime<Utc>) -> f64 {
    let year = now.year();
    let days_in_year = NaiveDate::from_ymd_opt(year, 12, 31)
        .map(|d| d.ordinal())
        .unwrap_or(365);
    year as f64 + now.ordinal0() as f64 / days_in_year as f64
}

fn coefficient_count(nmax: usize) -> usize {
    nmax * (nmax + 2)
}

fn g_index(n: usize, m: usize) -> usize {
    let base = n * n - 1;
    if m == 0 {
        base
    } else {
        base + 2 * m - 1
    }
}

fn h_index(n: usize, m: usize) -> usize {
    n * n - 1 + 2 * m
}

fn parse_numbers(line_no: usize, line: &str) -> Result<Vec<f64>, FieldModelError> {
    line.split_whitespace()
        .map(|token| {
            token.parse::<f64>().map_err(|_| FieldModelError::Parse {
                line: line_no,
                reason: format!("not a number: {token}"),
            })
        })
        .collect()
}

/// Geodetic colatitude and height (km) to geocentric radius (km) and
/// colatitude (degrees), plus the sine/cosine of the frame rotation.
fn geodetic_to_geocentric(height_km: f64, geodetic_colat_deg: f64) -> (f64, f64, f64, f64) {
    let polar_km = WGS84_EQUATORIAL_KM * (1.0 - WGS84_FLATTENING);
    let ctgd = geodetic_colat_deg.to_radians().cos();
    let stgd = geodetic_colat_deg.to_radians().sin();

    let a2 = WGS84_EQUATORIAL_KM * WGS84_EQUATORIAL_KM;
    let a4 = a2 * a2;
    let b2 = polar_km * polar_km;
    let b4 = b2 * b2;
    let c2 = ctgd * ctgd;
    let s2 = 1.0 - c2;

    let rho = (a2 * s2 + b2 * c2).sqrt();
    let radius = (height_km * (height_km + 2.0 * rho) + (a4 * s2 + b4 * c2) / (rho * rho)).sqrt();
    let cd = (height_km + rho) / radius;
    let sd = (a2 - b2) * ctgd * stgd / (rho * radius);

    let cos_colat = (ctgd * cd - stgd * sd).clamp(-1.0, 1.0);
    (radius, cos_colat.acos().to_degrees(), sd, cd)
}

/// Radial, colatitude and azimuthal components of the internal field.
fn synth_values(
    coeffs: &[f64],
    nmax: usize,
    radius_km: f64,
    colat_deg: f64,
    lon_deg: f64,
) -> (f64, f64, f64) {
    let theta = colat_deg.to_radians();
    let x = theta.cos();
    let s = theta.sin();
    let (p, dp) = schmidt_legendre(nmax, x, s);
    let phi = lon_deg.to_radians();

    let mut br = 0.0;
    let mut bt = 0.0;
    let mut bp = 0.0;
    for n in 1..=nmax {
        let ratio = (REFERENCE_RADIUS_KM / radius_km).powi(n as i32 + 2);
        for m in 0..=n {
            let g = coeffs[g_index(n, m)];
            let h = if m > 0 { coeffs[h_index(n, m)] } else { 0.0 };
            let (sin_m, cos_m) = (m as f64 * phi).sin_cos();
            let term = g * cos_m + h * sin_m;

            br += (n as f64 + 1.0) * ratio * term * p[n][m];
            bt -= ratio * term * dp[n][m];
            bp += ratio * m as f64 * (g * sin_m - h * cos_m) * p[n][m];
        }
    }
    let s = if s.abs() < MIN_SIN_COLAT { MIN_SIN_COLAT } else { s };
    (br, bt, bp / s)
}

/// Schmidt semi-normalised associated Legendre functions of cos(theta)
/// and their theta derivatives.
fn schmidt_legendre(nmax: usize, x: f64, s: f64) -> (Vec<Vec<f64>>, Vec<Vec<f64>>) {
    let mut p = vec![vec![0.0; nmax + 1]; nmax + 1];
    let mut dp = vec![vec![0.0; nmax + 1]; nmax + 1];
    p[0][0] = 1.0;

    for n in 1..=nmax {
        for m in 0..=n {
            if m == n {
                if n == 1 {
                    p[1][1] = s;
                    dp[1][1] = x;
                } else {
                    let k = ((2 * n - 1) as f64 / (2 * n) as f64).sqrt();
                    p[n][n] = k * s * p[n - 1][n - 1];
                    dp[n][n] = k * (x * p[n - 1][n - 1] + s * dp[n - 1][n - 1]);
                }
            } else {
                let nf = n as f64;
                let mf = m as f64;
                let a = (nf * nf - mf * mf).sqrt();
                let b = ((nf - 1.0) * (nf - 1.0) - mf * mf).max(0.0).sqrt();
                let (p2, dp2) = if n >= m + 2 {
                    (p[n - 2][m], dp[n - 2][m])
                } else {
                    (0.0, 0.0)
                };
                let two_n_minus_1 = (2 * n - 1) as f64;
                p[n][m] = (two_n_minus_1 * x * p[n - 1][m] - b * p2) / a;
                dp[n][m] = (two_n_minus_1 * (x * dp[n - 1][m] - s * p[n - 1][m]) - b * dp2) / a;
            }
        }
    }
    (p, dp)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn builtin_at(year: f64) -> IgrfDeclination {
        IgrfDeclination::new(FieldModel::builtin(), year)
    }

    #[test]
    fn builtin_model_matches_known_regions() {
        let model = builtin_at(2024.0);
        // San Francisco: roughly 13 degrees east
        let sfo = model.declination(37.6, -122.4, 0.0);
        assert!(sfo > 8.0 && sfo < 20.0, "got {sfo}");
        // New York: roughly 13 degrees west
        let nyc = model.declination(40.7, -74.0, 0.0);
        assert!(nyc < -5.0 && nyc > -18.0, "got {nyc}");
        // Sydney: roughly 12 degrees east
        let syd = model.declination(-33.9, 151.2, 0.0);
        assert!(syd > 6.0 && syd < 18.0, "got {syd}");
    }

    #[test]
    fn axial_dipole_has_no_declination() {
        let model = FieldModel::new(1, vec![2000.0], vec![vec![-30000.0, 0.0, 0.0]]).unwrap();
        let dec = IgrfDeclination::new(&model, 2000.0);
        for (lat, lon) in [(0.0, 0.0), (45.0, 90.0), (-60.0, -135.0)] {
            assert!(dec.declination(lat, lon, 0.0).abs() < 1e-9);
        }
        let (x, _, z) = dec.field_xyz(45.0, 0.0, 0.0);
        assert!(x > 0.0, "field points north");
        assert!(z > 0.0, "field dips down in the northern hemisphere");
    }

    #[test]
    fn pole_is_finite() {
        let model = builtin_at(2022.0);
        assert!(model.declination(90.0, 0.0, 0.0).is_finite());
        assert!(model.declination(-90.0, 45.0, 0.0).is_finite());
    }

    #[test]
    fn coefficients_interpolate_and_extrapolate() {
        let model = FieldModel::new(
            1,
            vec![2000.0, 2010.0],
            vec![vec![0.0, 10.0, 20.0], vec![10.0, 20.0, 0.0]],
        )
        .unwrap();
        assert_eq!(model.coefficients_at(2005.0), vec![5.0, 15.0, 10.0]);
        assert_eq!(model.coefficients_at(2015.0), vec![15.0, 25.0, -10.0]);
        assert_eq!(model.coefficients_at(1990.0), vec![-10.0, 0.0, 40.0]);
    }

    #[test]
    fn parses_shc_text() {
        let text = "\
# test model
1 2 2 1 1 2000 2005
2000.0 2005.0
1  0 -30000.0 -29900.0
1  1  -1500.0  -1450.0
1 -1   4700.0   4650.0
2  0  -2500.0  -2450.0
2  1   3000.0   2950.0
2 -1  -3000.0  -2950.0
2  2   1700.0   1650.0
2 -2   -700.0   -650.0
";
        let model = FieldModel::parse_shc(text).unwrap();
        assert_eq!(model.nmax(), 2);
        let coeffs = model.coefficients_at(2000.0);
        assert_eq!(coeffs[0], -30000.0);
        assert_eq!(coeffs[2], 4700.0);
        assert_eq!(coeffs[5], -3000.0);
        assert_eq!(coeffs[7], -700.0);
    }

    #[test]
    fn rejects_malformed_shc() {
        let err = FieldModel::parse_shc("1 1 1\n2000.0\n1 0 abc\n").unwrap_err();
        assert!(matches!(err, FieldModelError::Parse { line: 3, .. }));

        let err = FieldModel::parse_shc("1 1 2\n2000.0\n").unwrap_err();
        assert!(matches!(err, FieldModelError::Parse { line: 2, .. }));

        assert!(matches!(FieldModel::parse_shc("# nothing\n"), Err(FieldModelError::Empty)));
    }

    #[test]
    fn decimal_year_is_fractional() {
        let mid = DateTime::parse_from_rfc3339("2023-07-02T12:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let year = decimal_year(mid);
        assert!(year > 2023.49 && year < 2023.51, "got {year}");
    }
}
