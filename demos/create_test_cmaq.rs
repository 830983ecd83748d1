//! Creates a sample CMAQ-style NetCDF file for testing cmaqgrid functionality.
//!
//! The file carries the I/O API global attributes of the 12 km CONUS Lambert
//! Conformal grid and an `O3` variable shaped `(TSTEP, LAY, ROW, COL)` with a
//! single layer.

use ndarray::Array4;
use netcdf::create;
use std::path::Path;

const NCOLS: usize = 459;
const NROWS: usize = 299;
const NSTEPS: usize = 4;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let output_path = Path::new("test_cmaq.nc");

    println!("🔨 Creating test CMAQ file: {}", output_path.display());

    if output_path.exists() {
        std::fs::remove_file(output_path)?
    }

    let mut file = create(output_path)?;

    // I/O API grid description
    file.add_attribute("GDTYP", 2i32)?;
    file.add_attribute("P_ALP", 33.0f64)?;
    file.add_attribute("P_BET", 45.0f64)?;
    file.add_attribute("P_GAM", -97.0f64)?;
    file.add_attribute("XCENT", -97.0f64)?;
    file.add_attribute("YCENT", 40.0f64)?;
    file.add_attribute("XORIG", -2_736_000.0f64)?;
    file.add_attribute("YORIG", -2_088_000.0f64)?;
    file.add_attribute("XCELL", 12_000.0f64)?;
    file.add_attribute("YCELL", 12_000.0f64)?;
    file.add_attribute("NCOLS", NCOLS as i32)?;
    file.add_attribute("NROWS", NROWS as i32)?;
    file.add_attribute("NLAYS", 1i32)?;
    file.add_attribute("GDNAM", "12US1")?;

    file.add_dimension("TSTEP", NSTEPS)?;
    file.add_dimension("LAY", 1)?;
    file.add_dimension("ROW", NROWS)?;
    file.add_dimension("COL", NCOLS)?;

    {
        let mut o3 = file.add_variable::<f32>("O3", &["TSTEP", "LAY", "ROW", "COL"])?;
        o3.put_attribute("units", "ppbV")?;
        o3.put_attribute("long_name", "O3")?;

        // A smooth west-east/south-north gradient that changes each hour
        let data = Array4::from_shape_fn((NSTEPS, 1, NROWS, NCOLS), |(t, _, row, col)| {
            30.0 + 20.0 * (col as f32 / NCOLS as f32) + 10.0 * (row as f32 / NROWS as f32) + t as f32
        });
        o3.put(data.view(), ..)?;
    }

    println!("✅ Created {} ({} × {} grid, {} time steps)", output_path.display(), NCOLS, NROWS, NSTEPS);

    Ok(())
}
