//! Grid metadata inspection
//!
//! Summaries of a grid definition for printing or JSON output.

use crate::errors::Result;
use crate::grid::{DomainBounds, GridDefinition};
use crate::projection::{MapProjection, DEFAULT_EARTH_RADIUS};
use crate::transform::GridTransformer;
use serde_json::{json, Value as JsonValue};

/// Structured description of a grid
#[derive(Debug, Clone)]
pub struct GridSummary {
    pub gdtyp: i32,
    pub projection: String,
    pub columns: usize,
    pub rows: usize,
    pub cell_size: (f64, f64),
    pub origin: (f64, f64),
    pub center: (f64, f64),
    pub standard_parallels: (f64, f64),
    /// Corner bounding box, projected grids only
    pub bounds: Option<DomainBounds>,
    /// Lon/lat of the lower-left and upper-right corners, projected grids only
    pub corner_lon_lat: Option<[(f64, f64); 2]>,
}

impl GridSummary {
    /// Summarise a grid. Corner lon/lat are computed on a sphere of
    /// [`DEFAULT_EARTH_RADIUS`] when the projection is supported.
    ///
    /// # Errors
    ///
    /// Returns an error only if a supported projection fails to invert a
    /// grid corner.
    pub fn from_grid(grid: &GridDefinition) -> Result<Self> {
        Self::with_earth_radius(grid, DEFAULT_EARTH_RADIUS)
    }

    /// Summarise a grid using the given earth radius for corner lon/lat.
    ///
    /// # Errors
    ///
    /// See [`from_grid`](Self::from_grid).
    pub fn with_earth_radius(grid: &GridDefinition, earth_radius: f64) -> Result<Self> {
        let bounds = grid.domain_bounds().ok();
        let transformer = GridTransformer::with_earth_radius(grid.clone(), earth_radius);
        let corner_lon_lat = match (bounds, transformer) {
            (Some(b), Ok(transformer)) => {
                let projection = transformer.projection();
                Some([
                    projection.inverse(b.x_min, b.y_min)?,
                    projection.inverse(b.x_max, b.y_max)?,
                ])
            }
            _ => None,
        };

        Ok(Self {
            gdtyp: grid.projection_type.gdtyp(),
            projection: grid.projection_type.name().to_string(),
            columns: grid.column_count,
            rows: grid.row_count,
            cell_size: (grid.cell_size_x, grid.cell_size_y),
            origin: (grid.origin_x, grid.origin_y),
            center: (grid.center_longitude, grid.center_latitude),
            standard_parallels: (grid.standard_parallel_1, grid.standard_parallel_2),
            bounds,
            corner_lon_lat,
        })
    }

    /// JSON representation
    #[must_use]
    pub fn to_json(&self) -> JsonValue {
        json!({
            "gdtyp": self.gdtyp,
            "projection": self.projection,
            "columns": self.columns,
            "rows": self.rows,
            "cell_size": [self.cell_size.0, self.cell_size.1],
            "origin": [self.origin.0, self.origin.1],
            "center": [self.center.0, self.center.1],
            "standard_parallels": [self.standard_parallels.0, self.standard_parallels.1],
            "bounds": self.bounds.map(|b| json!({
                "x_min": b.x_min,
                "x_max": b.x_max,
                "y_min": b.y_min,
                "y_max": b.y_max,
            })),
            "corners_lon_lat": self.corner_lon_lat.map(|[ll, ur]| json!({
                "lower_left": [ll.0, ll.1],
                "upper_right": [ur.0, ur.1],
            })),
        })
    }
}

/// Prints a summary of the grid definition.
pub fn print_grid_summary(summary: &GridSummary) {
    println!("\n===== Grid Definition =====");
    println!("- Projection: {} (GDTYP={})", summary.projection, summary.gdtyp);
    println!("- Dimensions: {} columns × {} rows", summary.columns, summary.rows);
    println!(
        "- Cell size: {} × {}",
        summary.cell_size.0, summary.cell_size.1
    );
    println!("- Origin (lower-left edge): ({}, {})", summary.origin.0, summary.origin.1);
    println!(
        "- Projection center: lon {}, lat {}",
        summary.center.0, summary.center.1
    );
    println!(
        "- Standard parallels: {}, {}",
        summary.standard_parallels.0, summary.standard_parallels.1
    );

    if let Some(b) = summary.bounds {
        println!(
            "- Domain: x [{}, {}], y [{}, {}]",
            b.x_min, b.x_max, b.y_min, b.y_max
        );
    }
    if let Some([ll, ur]) = summary.corner_lon_lat {
        println!("- Lower-left corner:  lon {:.5}, lat {:.5}", ll.0, ll.1);
        println!("- Upper-right corner: lon {:.5}, lat {:.5}", ur.0, ur.1);
    }
}
