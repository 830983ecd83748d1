//! Resolves the Atlanta-area monitoring stations to grid indices of a CMAQ
//! file and prints the O3 value in each station's cell.
//!
//! Usage: `cargo run --example station_lookup -- <path-to-cmaq-file> [variable]`

use cmaq_grid::prelude::*;
use std::env;

/// (name, lon, lat)
const STATIONS: [(&str, f64, f64); 7] = [
    ("STER", -84.46837, 33.83169),
    ("MGE", -84.50322, 33.91965),
    ("SSG", -84.58422, 33.72607),
    ("FTY", -84.52058, 33.77784),
    ("COV", -83.83925, 33.60807),
    ("CVC", -83.83684, 33.62966),
    ("SDK", -84.29018, 33.68808),
];

fn main() -> Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: {} <path-to-cmaq-file> [variable]", args[0]);
        std::process::exit(1);
    }
    let var_name = args.get(2).map_or("O3", String::as_str);

    let file = CmaqFile::open(&args[1])?;
    let transformer = GridTransformer::new(file.grid_definition()?)?;

    let lons: Vec<f64> = STATIONS.iter().map(|s| s.1).collect();
    let lats: Vec<f64> = STATIONS.iter().map(|s| s.2).collect();
    let (is, js) = transformer.lon_lat_to_indices(&lons, &lats)?;

    // Time mean of a (TSTEP, ROW, COL) field once the single layer is squeezed out
    let field = file.variable(var_name)?;
    let mean = if field.ndim() == 3 {
        field.mean_axis(ndarray::Axis(0))
    } else {
        None
    };

    println!("{:<6} {:>10} {:>10} {:>5} {:>5} {:>10}", "name", "lon", "lat", "i", "j", var_name);
    for ((name, lon, lat), (i, j)) in STATIONS.iter().zip(is.iter().zip(&js)) {
        let value = match (i, j, &mean) {
            (Some(i), Some(j), Some(m)) => format!("{:.3}", m[[*j, *i]]),
            _ => "-".to_string(),
        };
        let show = |v: &Option<usize>| v.map_or_else(|| "NaN".to_string(), |v| v.to_string());
        println!(
            "{:<6} {:>10.5} {:>10.5} {:>5} {:>5} {:>10}",
            name,
            lon,
            lat,
            show(i),
            show(j),
            value
        );
    }

    Ok(())
}
