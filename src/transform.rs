//! Coordinate transforms and grid-index lookup
//!
//! [`GridTransformer`] owns a grid definition and the projection built from
//! it, so repeated queries against the same grid reuse one projection.

use crate::errors::{CmaqGridError, Result};
use crate::grid::{CellCenterGrid, DomainBounds, GridDefinition};
use crate::projection::{build_projection, GridProjection, MapProjection, DEFAULT_EARTH_RADIUS};
use rayon::prelude::*;
use tracing::{debug, warn};

/// Column/row index of a grid cell, 0-based from the lower-left corner
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellIndex {
    /// West-east (column) index
    pub i: usize,
    /// South-north (row) index
    pub j: usize,
}

/// Grid-aware forward/inverse transforms and index lookup
#[derive(Debug)]
pub struct GridTransformer {
    grid: GridDefinition,
    projection: GridProjection,
    earth_radius: f64,
    centers: CellCenterGrid,
    bounds: DomainBounds,
}

impl GridTransformer {
    /// Build a transformer using [`DEFAULT_EARTH_RADIUS`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrid` for an invalid definition and
    /// `UnsupportedProjection` for lat-lon or unimplemented projection types.
    pub fn new(grid: GridDefinition) -> Result<Self> {
        Self::with_earth_radius(grid, DEFAULT_EARTH_RADIUS)
    }

    /// Build a transformer on a sphere of the given radius (m).
    ///
    /// # Errors
    ///
    /// Same as [`new`](Self::new), plus `InvalidGrid` for a non-positive radius.
    pub fn with_earth_radius(grid: GridDefinition, earth_radius: f64) -> Result<Self> {
        grid.validate()?;
        grid.ensure_projected("grid transforms")?;

        let projection = build_projection(&grid, earth_radius)?;
        let centers = grid.cell_centers()?;
        let bounds = grid.domain_bounds()?;

        debug!(
            projection = grid.projection_type.name(),
            columns = grid.column_count,
            rows = grid.row_count,
            earth_radius,
            "grid transformer ready"
        );

        Ok(Self {
            grid,
            projection,
            earth_radius,
            centers,
            bounds,
        })
    }

    #[must_use]
    pub fn projection(&self) -> &GridProjection {
        &self.projection
    }

    /// Cell centers of the grid
    #[must_use]
    pub fn cell_centers(&self) -> &CellCenterGrid {
        &self.centers
    }

    /// Bounding box of the outer cell corners
    #[must_use]
    pub fn domain_bounds(&self) -> DomainBounds {
        self.bounds
    }

    /// Transform one longitude/latitude point to projected x/y.
    ///
    /// # Errors
    ///
    /// Returns `Projection` if the point cannot be projected.
    pub fn lon_lat_to_xy_point(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        self.projection.forward(lon, lat)
    }

    /// Transform one projected x/y point to longitude/latitude.
    ///
    /// # Errors
    ///
    /// Returns `Projection` if the point cannot be unprojected.
    pub fn xy_to_lon_lat_point(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        self.projection.inverse(x, y)
    }

    /// Get the X and Y coordinates of (longitude, latitude) points.
    ///
    /// A point the projection cannot transform (e.g. the pole opposite the
    /// cone apex) comes back as `NaN` without stopping the rest of the batch.
    ///
    /// # Errors
    ///
    /// Returns `InputShapeMismatch` when `lons` and `lats` differ in length.
    pub fn lon_lat_to_xy(&self, lons: &[f64], lats: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        check_lengths(lons, lats)?;
        Ok(lons
            .iter()
            .zip(lats)
            .map(|(&lon, &lat)| or_nan(self.projection.forward(lon, lat), lon, lat))
            .unzip())
    }

    /// Get the longitude and latitude of projected X, Y points.
    ///
    /// Points that cannot be unprojected come back as `NaN`.
    ///
    /// # Errors
    ///
    /// Returns `InputShapeMismatch` when `xs` and `ys` differ in length.
    pub fn xy_to_lon_lat(&self, xs: &[f64], ys: &[f64]) -> Result<(Vec<f64>, Vec<f64>)> {
        check_lengths(xs, ys)?;
        Ok(xs
            .iter()
            .zip(ys)
            .map(|(&x, &y)| or_nan(self.projection.inverse(x, y), x, y))
            .unzip())
    }

    /// Get the grid indices of (longitude, latitude) points.
    ///
    /// Returns parallel `i` (column) and `j` (row) vectors in input order.
    /// Points outside the grid, or that cannot be projected, are `None` in
    /// both vectors and do not stop the rest of the batch.
    ///
    /// # Errors
    ///
    /// Returns `InputShapeMismatch` when `lons` and `lats` differ in length.
    pub fn lon_lat_to_indices(
        &self,
        lons: &[f64],
        lats: &[f64],
    ) -> Result<(Vec<Option<usize>>, Vec<Option<usize>>)> {
        check_lengths(lons, lats)?;
        let cells: Vec<Option<CellIndex>> = lons
            .iter()
            .zip(lats)
            .map(|(&lon, &lat)| {
                locate(&self.projection, &self.grid, &self.centers, &self.bounds, lon, lat)
            })
            .collect();
        Ok(split_cells(&cells))
    }

    /// Grid cell containing a single (longitude, latitude) point, or `None`
    /// if it falls outside the domain.
    ///
    /// # Errors
    ///
    /// Returns `Projection` if the point cannot be projected.
    pub fn lon_lat_to_cell(&self, lon: f64, lat: f64) -> Result<Option<CellIndex>> {
        let (x, y) = self.projection.forward(lon, lat)?;
        Ok(self.xy_to_cell(x, y))
    }

    /// Grid cell containing a projected point, or `None` outside the domain.
    #[must_use]
    pub fn xy_to_cell(&self, x: f64, y: f64) -> Option<CellIndex> {
        cell_for_xy(&self.grid, &self.centers, &self.bounds, x, y)
    }

    /// Same result as [`lon_lat_to_indices`](Self::lon_lat_to_indices),
    /// evaluated on the rayon thread pool.
    ///
    /// Each worker builds its own projection from the grid definition.
    ///
    /// # Errors
    ///
    /// Returns `InputShapeMismatch` when `lons` and `lats` differ in length.
    pub fn par_lon_lat_to_indices(
        &self,
        lons: &[f64],
        lats: &[f64],
    ) -> Result<(Vec<Option<usize>>, Vec<Option<usize>>)> {
        check_lengths(lons, lats)?;

        let grid = &self.grid;
        let centers = &self.centers;
        let bounds = &self.bounds;
        let earth_radius = self.earth_radius;

        debug!(
            points = lons.len(),
            threads = rayon::current_num_threads(),
            "parallel index lookup"
        );

        let cells: Vec<Option<CellIndex>> = lons
            .par_iter()
            .zip(lats.par_iter())
            .map_init(
                || build_projection(grid, earth_radius),
                |projection, (&lon, &lat)| match projection {
                    Ok(projection) => locate(&*projection, grid, centers, bounds, lon, lat),
                    Err(e) => {
                        warn!(error = %e, "worker failed to build projection");
                        None
                    }
                },
            )
            .collect();

        Ok(split_cells(&cells))
    }
}

fn check_lengths(first: &[f64], second: &[f64]) -> Result<()> {
    if first.len() == second.len() {
        Ok(())
    } else {
        Err(CmaqGridError::InputShapeMismatch {
            first: first.len(),
            second: second.len(),
        })
    }
}

fn or_nan(point: Result<(f64, f64)>, first: f64, second: f64) -> (f64, f64) {
    point.unwrap_or_else(|e| {
        debug!(first, second, error = %e, "point could not be transformed");
        (f64::NAN, f64::NAN)
    })
}

fn split_cells(cells: &[Option<CellIndex>]) -> (Vec<Option<usize>>, Vec<Option<usize>>) {
    cells
        .iter()
        .map(|cell| (cell.map(|c| c.i), cell.map(|c| c.j)))
        .unzip()
}

fn locate<P: MapProjection>(
    projection: &P,
    grid: &GridDefinition,
    centers: &CellCenterGrid,
    bounds: &DomainBounds,
    lon: f64,
    lat: f64,
) -> Option<CellIndex> {
    match projection.forward(lon, lat) {
        Ok((x, y)) => cell_for_xy(grid, centers, bounds, x, y),
        Err(e) => {
            debug!(lon, lat, error = %e, "point could not be projected, treating as outside domain");
            None
        }
    }
}

// The inside test uses the corner bounding box, so a point past the last
// center but within its half cell still resolves to the edge cell.
fn cell_for_xy(
    grid: &GridDefinition,
    centers: &CellCenterGrid,
    bounds: &DomainBounds,
    x: f64,
    y: f64,
) -> Option<CellIndex> {
    if !bounds.contains(x, y) {
        return None;
    }
    Some(CellIndex {
        i: nearest_center(centers.x[0], grid.cell_size_x, grid.column_count, x),
        j: nearest_center(centers.y[0], grid.cell_size_y, grid.row_count, y),
    })
}

/// Index of the nearest cell center on a uniform axis.
///
/// `ceil(offset - 0.5)` sends a point exactly between two centers to the
/// lower index, matching a first-minimum scan over `|center - value|`.
fn nearest_center(first_center: f64, step: f64, count: usize, value: f64) -> usize {
    let offset = (value - first_center) / step;
    let index = (offset - 0.5).ceil();
    if index <= 0.0 {
        0
    } else {
        (index as usize).min(count - 1)
    }
}
