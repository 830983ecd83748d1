//! Defines command-line interface options using `clap` for the cmaqgrid application.

use clap::Parser;
use std::path::PathBuf;

/// A CLI tool for CMAQ grid geometry and coordinate lookups
#[derive(Parser, Debug)]
#[command(
    version,
    name = "cmaqgrid",
    about = "Locate longitude/latitude points on CMAQ model grids"
)]
pub struct Args {
    /// Path to the CMAQ NetCDF file
    #[arg(short, long)]
    pub file: PathBuf,

    /// Resolve grid indices for a point, formatted as <lon>:<lat>. Repeatable.
    #[arg(long, value_parser = parse_pair_arg, allow_hyphen_values = true)]
    pub ll2ij: Vec<(f64, f64)>,

    /// Project a point to grid x/y (m), formatted as <lon>:<lat>. Repeatable.
    #[arg(long, value_parser = parse_pair_arg, allow_hyphen_values = true)]
    pub ll2xy: Vec<(f64, f64)>,

    /// Unproject grid x/y (m) to longitude/latitude, formatted as <x>:<y>. Repeatable.
    #[arg(long, value_parser = parse_pair_arg, allow_hyphen_values = true)]
    pub xy2ll: Vec<(f64, f64)>,

    /// CSV file of stations (name,lon,lat) to resolve to grid indices
    #[arg(long)]
    pub stations: Option<PathBuf>,

    /// Print the X and Y grid cell centers
    #[arg(long)]
    pub centers: bool,

    /// Print shape and min/mean/max of a variable
    #[arg(long)]
    pub var: Option<String>,

    /// Earth radius (m) of the spherical projection
    #[arg(long, default_value_t = cmaq_grid::DEFAULT_EARTH_RADIUS)]
    pub earth_radius: f64,

    /// Number of threads for parallel lookups. Leaves rayon's default pool unchanged when omitted.
    #[arg(short = 't', long)]
    pub threads: Option<usize>,

    /// Print results as JSON
    #[arg(long)]
    pub json: bool,

    /// Enable verbose output.
    #[arg(short, long, default_value_t = false)]
    pub verbose: bool,

    /// Log level, overridden by RUST_LOG
    #[arg(long, default_value = "warn")]
    pub log_level: String,
}

impl Args {
    /// Whether any query flag was given
    pub fn has_queries(&self) -> bool {
        !self.ll2ij.is_empty()
            || !self.ll2xy.is_empty()
            || !self.xy2ll.is_empty()
            || self.stations.is_some()
            || self.centers
            || self.var.is_some()
    }
}

/// A named station location
#[derive(Debug, Clone, PartialEq)]
pub struct Station {
    pub name: String,
    pub lon: f64,
    pub lat: f64,
}

fn parse_pair_arg(s: &str) -> Result<(f64, f64), String> {
    let parts: Vec<&str> = s.split(':').collect();
    match parts.as_slice() {
        [a, b] => {
            let a = a
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid number '{}'", a))?;
            let b = b
                .trim()
                .parse::<f64>()
                .map_err(|_| format!("Invalid number '{}'", b))?;
            Ok((a, b))
        }
        _ => Err("Invalid format: Expected '<first>:<second>'.".to_string()),
    }
}

/// Parse station CSV text: one `name,lon,lat` per line. Blank lines and `#`
/// comments are skipped, as is a literal `name,lon,lat` header on the first
/// non-comment line. Any other unparsable line is an error.
pub fn parse_stations(text: &str) -> Result<Vec<Station>, String> {
    let mut stations = Vec::new();
    let mut first_record = true;

    for (line_no, line) in text.lines().enumerate() {
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split(',').map(str::trim).collect();
        let is_first = std::mem::replace(&mut first_record, false);
        if is_first && is_header(&fields) {
            continue;
        }

        let [name, lon, lat] = fields.as_slice() else {
            return Err(format!(
                "line {}: expected 'name,lon,lat', got '{}'",
                line_no + 1,
                line
            ));
        };

        match (lon.parse::<f64>(), lat.parse::<f64>()) {
            (Ok(lon), Ok(lat)) => stations.push(Station {
                name: (*name).to_string(),
                lon,
                lat,
            }),
            _ => {
                return Err(format!(
                    "line {}: invalid coordinates '{}', '{}'",
                    line_no + 1,
                    lon,
                    lat
                ))
            }
        }
    }

    Ok(stations)
}

fn is_header(fields: &[&str]) -> bool {
    fields.len() == 3
        && fields
            .iter()
            .zip(["name", "lon", "lat"])
            .all(|(field, expected)| field.eq_ignore_ascii_case(expected))
}
