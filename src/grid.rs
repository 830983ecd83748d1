//! Grid definition and cell geometry
//!
//! A CMAQ grid is a regular rectangle of `NCOLS` × `NROWS` cells in projected
//! coordinates. `XORIG`/`YORIG` locate the lower-left *edge* of the grid, so
//! cell centers sit half a cell in from the origin and the corner mesh is one
//! larger than the center grid along each axis.

use crate::errors::{CmaqGridError, Result};
use ndarray::{Array1, Array2};

/// Coordinate system of a grid, mapped from the I/O API `GDTYP` code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectionType {
    /// Geographic longitude/latitude (`LATGRD3`)
    LatLon,
    /// Lambert Conformal Conic (`LAMGRD3`)
    LambertConformal,
    /// General Mercator (`MERGRD3`)
    Mercator,
    /// General tangent stereographic (`STEGRD3`)
    Stereographic,
    /// Universal Transverse Mercator (`UTMGRD3`)
    Utm,
    /// Polar secant stereographic (`POLGRD3`)
    PolarStereographic,
    /// Equatorial Mercator (`EQMGRD3`)
    EquatorialMercator,
    /// Transverse Mercator (`TRMGRD3`)
    TransverseMercator,
    /// Albers equal-area conic (`ALBGRD3`)
    AlbersEqualArea,
    /// Lambert azimuthal equal-area (`LEQGRD3`)
    LambertAzimuthal,
    /// Any code not defined by the I/O API
    Other(i32),
}

impl ProjectionType {
    /// Map an I/O API `GDTYP` code to a projection type
    #[must_use]
    pub const fn from_gdtyp(code: i32) -> Self {
        match code {
            1 => Self::LatLon,
            2 => Self::LambertConformal,
            3 => Self::Mercator,
            4 => Self::Stereographic,
            5 => Self::Utm,
            6 => Self::PolarStereographic,
            7 => Self::EquatorialMercator,
            8 => Self::TransverseMercator,
            9 => Self::AlbersEqualArea,
            10 => Self::LambertAzimuthal,
            other => Self::Other(other),
        }
    }

    /// The I/O API `GDTYP` code for this projection type
    #[must_use]
    pub const fn gdtyp(self) -> i32 {
        match self {
            Self::LatLon => 1,
            Self::LambertConformal => 2,
            Self::Mercator => 3,
            Self::Stereographic => 4,
            Self::Utm => 5,
            Self::PolarStereographic => 6,
            Self::EquatorialMercator => 7,
            Self::TransverseMercator => 8,
            Self::AlbersEqualArea => 9,
            Self::LambertAzimuthal => 10,
            Self::Other(code) => code,
        }
    }

    /// Human-readable name
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::LatLon => "lat-lon",
            Self::LambertConformal => "Lambert Conformal Conic",
            Self::Mercator => "Mercator",
            Self::Stereographic => "stereographic",
            Self::Utm => "UTM",
            Self::PolarStereographic => "polar stereographic",
            Self::EquatorialMercator => "equatorial Mercator",
            Self::TransverseMercator => "transverse Mercator",
            Self::AlbersEqualArea => "Albers equal-area",
            Self::LambertAzimuthal => "Lambert azimuthal equal-area",
            Self::Other(_) => "unknown",
        }
    }

    /// Whether X/Y are planar projection coordinates rather than lon/lat
    #[must_use]
    pub const fn is_projected(self) -> bool {
        !matches!(self, Self::LatLon)
    }
}

/// Grid definition read from a file's global attributes
#[derive(Debug, Clone, PartialEq)]
pub struct GridDefinition {
    pub projection_type: ProjectionType,
    pub cell_size_x: f64,
    pub cell_size_y: f64,
    /// X of the lower-left cell edge
    pub origin_x: f64,
    /// Y of the lower-left cell edge
    pub origin_y: f64,
    pub column_count: usize,
    pub row_count: usize,
    pub center_longitude: f64,
    pub center_latitude: f64,
    pub standard_parallel_1: f64,
    pub standard_parallel_2: f64,
}

/// Cell-center coordinates along each axis
#[derive(Debug, Clone, PartialEq)]
pub struct CellCenterGrid {
    /// Length `column_count`
    pub x: Array1<f64>,
    /// Length `row_count`
    pub y: Array1<f64>,
}

/// Cell-corner mesh, shape `(row_count + 1, column_count + 1)`
#[derive(Debug, Clone, PartialEq)]
pub struct CellCornerGrid {
    pub x: Array2<f64>,
    pub y: Array2<f64>,
}

impl CellCornerGrid {
    /// Shape of the mesh as `(rows, columns)`
    #[must_use]
    pub fn shape(&self) -> (usize, usize) {
        self.x.dim()
    }
}

/// Bounding box of the whole grid (outer cell corners)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DomainBounds {
    pub x_min: f64,
    pub x_max: f64,
    pub y_min: f64,
    pub y_max: f64,
}

impl DomainBounds {
    /// Inclusive containment test. Non-finite coordinates are never inside.
    #[must_use]
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x.is_finite()
            && y.is_finite()
            && x >= self.x_min
            && x <= self.x_max
            && y >= self.y_min
            && y <= self.y_max
    }
}

impl GridDefinition {
    /// Check that the definition describes a usable grid.
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrid` for non-positive or non-finite cell sizes, empty
    /// dimensions, or non-finite origin/projection parameters.
    pub fn validate(&self) -> Result<()> {
        for (name, size) in [("XCELL", self.cell_size_x), ("YCELL", self.cell_size_y)] {
            if !size.is_finite() || size <= 0.0 {
                return Err(CmaqGridError::InvalidGrid {
                    message: format!("{} must be a positive cell size, got {}", name, size),
                });
            }
        }
        if self.column_count == 0 || self.row_count == 0 {
            return Err(CmaqGridError::InvalidGrid {
                message: format!(
                    "grid must have at least one cell, got {} columns × {} rows",
                    self.column_count, self.row_count
                ),
            });
        }
        let scalars = [
            ("XORIG", self.origin_x),
            ("YORIG", self.origin_y),
            ("XCENT", self.center_longitude),
            ("YCENT", self.center_latitude),
            ("P_ALP", self.standard_parallel_1),
            ("P_BET", self.standard_parallel_2),
        ];
        if let Some((name, value)) = scalars.iter().find(|(_, v)| !v.is_finite()) {
            return Err(CmaqGridError::InvalidGrid {
                message: format!("{} must be finite, got {}", name, value),
            });
        }
        Ok(())
    }

    /// Fail unless the grid uses planar projection coordinates.
    pub(crate) fn ensure_projected(&self, operation: &str) -> Result<()> {
        if self.projection_type.is_projected() {
            Ok(())
        } else {
            Err(CmaqGridError::UnsupportedProjection {
                projection: self.projection_type.name().to_string(),
                operation: operation.to_string(),
            })
        }
    }

    /// X and Y grid cell centers in projection units (m).
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedProjection` for lat-lon grids.
    pub fn cell_centers(&self) -> Result<CellCenterGrid> {
        self.ensure_projected("cell centers")?;

        let x = axis_positions(self.origin_x, self.cell_size_x, self.column_count, 0.5);
        let y = axis_positions(self.origin_y, self.cell_size_y, self.row_count, 0.5);

        Ok(CellCenterGrid { x, y })
    }

    /// X and Y grid cell corners in projection units (m), as 2D meshes.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedProjection` for lat-lon grids.
    pub fn cell_corners(&self) -> Result<CellCornerGrid> {
        self.ensure_projected("cell corners")?;

        let x_edges = axis_positions(self.origin_x, self.cell_size_x, self.column_count + 1, 0.0);
        let y_edges = axis_positions(self.origin_y, self.cell_size_y, self.row_count + 1, 0.0);

        let shape = (y_edges.len(), x_edges.len());
        let x = Array2::from_shape_fn(shape, |(_, col)| x_edges[col]);
        let y = Array2::from_shape_fn(shape, |(row, _)| y_edges[row]);

        Ok(CellCornerGrid { x, y })
    }

    /// Bounding box of the outer cell corners.
    ///
    /// Same values as the min/max of [`cell_corners`](Self::cell_corners)
    /// without building the mesh.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedProjection` for lat-lon grids.
    pub fn domain_bounds(&self) -> Result<DomainBounds> {
        self.ensure_projected("domain bounds")?;

        let x_far = edge(self.origin_x, self.cell_size_x, self.column_count, 0.0);
        let y_far = edge(self.origin_y, self.cell_size_y, self.row_count, 0.0);

        Ok(DomainBounds {
            x_min: self.origin_x.min(x_far),
            x_max: self.origin_x.max(x_far),
            y_min: self.origin_y.min(y_far),
            y_max: self.origin_y.max(y_far),
        })
    }
}

#[inline]
fn edge(origin: f64, step: f64, index: usize, offset: f64) -> f64 {
    origin + step * (index as f64 + offset)
}

// Index multiplication keeps the length exact and avoids step accumulation drift.
fn axis_positions(origin: f64, step: f64, count: usize, offset: f64) -> Array1<f64> {
    Array1::from_shape_fn(count, |k| edge(origin, step, k, offset))
}
