//! Plain-text rendering of route reports.

use std::fmt::Write;

use skyroute_core::RouteReport;

#[derive(Clone, Copy, PartialEq, Eq)]
enum Align {
    Left,
    Right,
}

const COLUMNS: [(&str, Align); 7] = [
    ("#", Align::Right),
    ("ID", Align::Left),
    ("Name", Align::Left),
    ("Distance", Align::Right),
    ("Heading", Align::Right),
    ("Type", Align::Left),
    ("Freq", Align::Right),
];

/// Whole degrees in `[0, 360)`.
pub fn format_heading(deg: f64) -> String {
    format!("{}°", (deg.round() as i64).rem_euclid(360))
}

fn cells(report: &RouteReport) -> Vec<[String; 7]> {
    report
        .rows
        .iter()
        .map(|row| {
            [
                row.number.to_string(),
                row.ident.clone(),
                row.name.clone(),
                row.leg_nm.map(|nm| format!("{nm:.1} nm")).unwrap_or_default(),
                row.magnetic_bearing_deg.map(format_heading).unwrap_or_default(),
                row.category.clone(),
                row.frequency.clone().unwrap_or_default(),
            ]
        })
        .collect()
}

/// The leg table alone.
pub fn render_table(report: &RouteReport) -> String {
    let body = cells(report);
    let mut widths = COLUMNS.map(|(header, _)| header.chars().count());
    for row in &body {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut out = String::new();
    let mut push_line = |cells: &[String]| {
        let mut line = String::new();
        for (i, cell) in cells.iter().enumerate() {
            let width = widths[i];
            let _ = match COLUMNS[i].1 {
                Align::Left => write!(line, "  {cell:<width$}"),
                Align::Right => write!(line, "  {cell:>width$}"),
            };
        }
        out.push_str(line.trim_end());
        out.push('\n');
    };

    let headers = COLUMNS.map(|(header, _)| header.to_string());
    push_line(&headers);
    let rule = widths.map(|w| "-".repeat(w));
    push_line(&rule);
    for row in &body {
        push_line(row);
    }
    out
}

/// Title, leg table, total and flight-plan route string.
pub fn render_report(title: &str, report: &RouteReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out);
    let _ = writeln!(out, "{title}");
    let _ = writeln!(out);
    out.push_str(&render_table(report));
    let _ = writeln!(out);
    let _ = writeln!(out, "Total distance: {} nm", report.total_nm.round() as i64);
    let _ = writeln!(out);
    let _ = writeln!(out, "Route string for flight plan:");
    let _ = writeln!(out, "{}", report.route_string());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use skyroute_core::{
        build_report, AirportKind, FixedDeclination, NavaidKind, Route, Waypoint,
    };

    fn sample() -> RouteReport {
        let route = Route {
            source: Waypoint::airport("KAAA", "Alpha Intl", 0.0, 0.0, AirportKind::Large),
            via: vec![Waypoint::navaid("BB", "Bravo Beacon", 0.0, 1.0, NavaidKind::Ndb)
                .with_frequency_khz(338.0)],
            destination: Waypoint::airport("KCCC", "Charlie", 0.0, 2.0, AirportKind::Medium),
        };
        build_report(&route, &FixedDeclination(-2.0))
    }

    #[test]
    fn headings_are_whole_degrees() {
        assert_eq!(format_heading(92.4), "92°");
        assert_eq!(format_heading(359.7), "0°");
        assert_eq!(format_heading(0.2), "0°");
    }

    #[test]
    fn table_lines_up_columns() {
        let table = render_table(&sample());
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines.len(), 5);
        assert!(lines[0].contains("Distance"));
        assert!(lines[2].contains("KAAA"));
        assert!(!lines[2].contains("nm"));
        assert!(lines[3].contains("60.1 nm"));
        assert!(lines[3].contains("92°"));
        assert!(lines[3].contains("338"));
        let id_col = lines[0].find("ID").unwrap();
        assert_eq!(lines[3].find("BB"), Some(id_col));
    }

    #[test]
    fn report_ends_with_route_string() {
        let text = render_report("Route from KAAA to KCCC", &sample());
        assert!(text.contains("Total distance: 120 nm"));
        assert!(text.trim_end().ends_with("KAAA BB KCCC"));
    }
}
