//! Entry point for the cmaqgrid application.
//! Handles CLI parsing, file loading, and dispatches grid lookups or prints the grid summary.

use clap::Parser;
use cmaq_grid::prelude::*;
use cmaq_grid::{get_parallel_info, print_grid_summary, GridSummary};
use serde_json::{json, Value as JsonValue};
use tracing::{debug, info};
use tracing_subscriber::{fmt, EnvFilter};

mod cli;

use cli::{parse_stations, Args, Station};

fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { args.log_level.as_str() };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    ParallelConfig::new(args.threads).setup_global_pool()?;
    let parallel = get_parallel_info();
    debug!(
        threads = parallel.current_threads,
        cores = parallel.available_cores,
        "parallel environment"
    );

    let file = CmaqFile::open(&args.file)?;
    let grid = file.grid_definition()?;
    info!(
        projection = grid.projection_type.name(),
        columns = grid.column_count,
        rows = grid.row_count,
        "loaded grid definition"
    );

    if !args.has_queries() {
        let summary = GridSummary::with_earth_radius(&grid, args.earth_radius)?;
        if args.json {
            println!("{}", serde_json::to_string_pretty(&summary.to_json())?);
        } else {
            println!("Successfully opened CMAQ file: {}", file.path().display());
            print_grid_summary(&summary);
        }
        return Ok(());
    }

    let mut report = serde_json::Map::new();

    if let Some(var_name) = &args.var {
        let data = file.variable(var_name)?;
        let shape = data.shape().to_vec();
        let finite: Vec<f32> = data.iter().copied().filter(|v| v.is_finite()).collect();
        let min = finite.iter().copied().fold(f32::INFINITY, f32::min);
        let max = finite.iter().copied().fold(f32::NEG_INFINITY, f32::max);
        let mean = finite.iter().map(|&v| f64::from(v)).sum::<f64>() / finite.len().max(1) as f64;

        if args.json {
            report.insert(
                "variable".to_string(),
                json!({ "name": var_name, "shape": shape, "min": min, "mean": mean, "max": max }),
            );
        } else {
            println!("\n Variable: {} {:?}", var_name, shape);
            println!("   Min: {}", min);
            println!("   Mean: {:.4}", mean);
            println!("   Max: {}", max);
        }
    }

    let needs_transformer = args.centers
        || args.stations.is_some()
        || !args.ll2ij.is_empty()
        || !args.ll2xy.is_empty()
        || !args.xy2ll.is_empty();
    if !needs_transformer {
        return finish(args.json, report);
    }

    let transformer = GridTransformer::with_earth_radius(grid, args.earth_radius)?;

    if args.centers {
        let centers = transformer.cell_centers();
        if args.json {
            report.insert(
                "centers".to_string(),
                json!({ "x": centers.x.to_vec(), "y": centers.y.to_vec() }),
            );
        } else {
            println!("\n X centers ({}): {}", centers.x.len(), centers.x);
            println!("\n Y centers ({}): {}", centers.y.len(), centers.y);
        }
    }

    let mut stations: Vec<Station> = args
        .ll2ij
        .iter()
        .enumerate()
        .map(|(n, &(lon, lat))| Station {
            name: format!("point{}", n + 1),
            lon,
            lat,
        })
        .collect();
    if let Some(path) = &args.stations {
        let text = std::fs::read_to_string(path)?;
        stations.extend(parse_stations(&text)?);
        debug!(path = %path.display(), count = stations.len(), "read stations");
    }

    if !stations.is_empty() {
        let lons: Vec<f64> = stations.iter().map(|s| s.lon).collect();
        let lats: Vec<f64> = stations.iter().map(|s| s.lat).collect();
        let (is, js) = transformer.par_lon_lat_to_indices(&lons, &lats)?;

        if args.json {
            let rows: Vec<JsonValue> = stations
                .iter()
                .zip(is.iter().zip(&js))
                .map(|(s, (i, j))| {
                    json!({ "name": s.name, "lon": s.lon, "lat": s.lat, "i": i, "j": j })
                })
                .collect();
            report.insert("indices".to_string(), JsonValue::Array(rows));
        } else {
            println!("\n{:<12} {:>12} {:>12} {:>6} {:>6}", "name", "lon", "lat", "i", "j");
            for (s, (i, j)) in stations.iter().zip(is.iter().zip(&js)) {
                println!(
                    "{:<12} {:>12.5} {:>12.5} {:>6} {:>6}",
                    s.name,
                    s.lon,
                    s.lat,
                    format_index(*i),
                    format_index(*j)
                );
            }
        }
    }

    if !args.ll2xy.is_empty() {
        let (lons, lats): (Vec<f64>, Vec<f64>) = args.ll2xy.iter().copied().unzip();
        let (xs, ys) = transformer.lon_lat_to_xy(&lons, &lats)?;
        if args.json {
            report.insert("xy".to_string(), json!({ "lon": lons, "lat": lats, "x": xs, "y": ys }));
        } else {
            println!("\n{:>12} {:>12} {:>16} {:>16}", "lon", "lat", "x", "y");
            for (((lon, lat), x), y) in lons.iter().zip(&lats).zip(&xs).zip(&ys) {
                println!("{:>12.5} {:>12.5} {:>16.3} {:>16.3}", lon, lat, x, y);
            }
        }
    }

    if !args.xy2ll.is_empty() {
        let (xs, ys): (Vec<f64>, Vec<f64>) = args.xy2ll.iter().copied().unzip();
        let (lons, lats) = transformer.xy_to_lon_lat(&xs, &ys)?;
        if args.json {
            report.insert("lonlat".to_string(), json!({ "x": xs, "y": ys, "lon": lons, "lat": lats }));
        } else {
            println!("\n{:>16} {:>16} {:>12} {:>12}", "x", "y", "lon", "lat");
            for (((x, y), lon), lat) in xs.iter().zip(&ys).zip(&lons).zip(&lats) {
                println!("{:>16.3} {:>16.3} {:>12.5} {:>12.5}", x, y, lon, lat);
            }
        }
    }

    finish(args.json, report)
}

fn finish(
    json_output: bool,
    report: serde_json::Map<String, JsonValue>,
) -> std::result::Result<(), Box<dyn std::error::Error>> {
    if json_output {
        println!("{}", serde_json::to_string_pretty(&JsonValue::Object(report))?);
    }
    Ok(())
}

fn format_index(index: Option<usize>) -> String {
    index.map_or_else(|| "NaN".to_string(), |v| v.to_string())
}
