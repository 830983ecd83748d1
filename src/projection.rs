//! Map projections for CMAQ grids
//!
//! The projection mathematics is delegated to `proj4rs`. This module only
//! turns a [`GridDefinition`] into a proj string on a spherical earth and
//! wraps the forward/inverse calls with degree/radian handling.
//!
//! Lambert Conformal Conic is the only projection family implemented. New
//! families are added as variants of [`GridProjection`].

use crate::errors::{CmaqGridError, Result};
use crate::grid::{GridDefinition, ProjectionType};
use proj4rs::proj::Proj;
use proj4rs::transform::transform;
use std::fmt;
use tracing::debug;

/// Earth radius (m) assumed by CMAQ and WRF
pub const DEFAULT_EARTH_RADIUS: f64 = 6_370_000.0;

/// Forward and inverse transform between lon/lat degrees and planar metres.
pub trait MapProjection {
    /// Longitude/latitude (degrees) to projected x/y (m)
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)>;

    /// Projected x/y (m) to longitude/latitude (degrees)
    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)>;
}

/// Lambert Conformal Conic on a sphere
pub struct LambertConformal {
    geographic: Proj,
    projected: Proj,
    central_longitude: f64,
    central_latitude: f64,
    standard_parallels: (f64, f64),
    earth_radius: f64,
}

impl fmt::Debug for LambertConformal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LambertConformal")
            .field("central_longitude", &self.central_longitude)
            .field("central_latitude", &self.central_latitude)
            .field("standard_parallels", &self.standard_parallels)
            .field("earth_radius", &self.earth_radius)
            .finish_non_exhaustive()
    }
}

impl LambertConformal {
    /// Build the projection.
    ///
    /// # Arguments
    ///
    /// * `central_longitude` - Central meridian (degrees, `XCENT`)
    /// * `central_latitude` - Latitude of origin (degrees, `YCENT`)
    /// * `standard_parallels` - First and second standard parallels (degrees, `P_ALP`, `P_BET`)
    /// * `earth_radius` - Sphere radius (m); both semi-axes are set to it
    ///
    /// # Errors
    ///
    /// Returns `InvalidGrid` for a non-positive radius and `Projection` if
    /// `proj4rs` rejects the definition.
    pub fn new(
        central_longitude: f64,
        central_latitude: f64,
        standard_parallels: (f64, f64),
        earth_radius: f64,
    ) -> Result<Self> {
        if !earth_radius.is_finite() || earth_radius <= 0.0 {
            return Err(CmaqGridError::InvalidGrid {
                message: format!("earth radius must be positive, got {}", earth_radius),
            });
        }

        let geographic_def = format!(
            "+proj=longlat +a={r} +b={r} +no_defs",
            r = earth_radius
        );
        let projected_def = format!(
            "+proj=lcc +lat_1={} +lat_2={} +lat_0={} +lon_0={} +x_0=0 +y_0=0 +a={r} +b={r} +units=m +no_defs",
            standard_parallels.0,
            standard_parallels.1,
            central_latitude,
            central_longitude,
            r = earth_radius
        );
        debug!(proj = %projected_def, "building Lambert Conformal projection");

        let geographic = Proj::from_proj_string(&geographic_def).map_err(|e| {
            CmaqGridError::Projection(format!("invalid geographic definition: {:?}", e))
        })?;
        let projected = Proj::from_proj_string(&projected_def).map_err(|e| {
            CmaqGridError::Projection(format!("invalid Lambert Conformal definition: {:?}", e))
        })?;

        Ok(Self {
            geographic,
            projected,
            central_longitude,
            central_latitude,
            standard_parallels,
            earth_radius,
        })
    }
}

impl MapProjection for LambertConformal {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        let mut point = (lon.to_radians(), lat.to_radians(), 0.0);
        transform(&self.geographic, &self.projected, &mut point).map_err(|e| {
            CmaqGridError::Projection(format!(
                "forward transform failed for ({}, {}): {:?}",
                lon, lat, e
            ))
        })?;
        Ok((point.0, point.1))
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        let mut point = (x, y, 0.0);
        transform(&self.projected, &self.geographic, &mut point).map_err(|e| {
            CmaqGridError::Projection(format!(
                "inverse transform failed for ({}, {}): {:?}",
                x, y, e
            ))
        })?;
        Ok((point.0.to_degrees(), point.1.to_degrees()))
    }
}

/// Projection built for a specific grid
#[derive(Debug)]
pub enum GridProjection {
    LambertConformal(LambertConformal),
}

impl MapProjection for GridProjection {
    fn forward(&self, lon: f64, lat: f64) -> Result<(f64, f64)> {
        match self {
            Self::LambertConformal(p) => p.forward(lon, lat),
        }
    }

    fn inverse(&self, x: f64, y: f64) -> Result<(f64, f64)> {
        match self {
            Self::LambertConformal(p) => p.inverse(x, y),
        }
    }
}

/// Build the map projection described by a grid definition.
///
/// # Errors
///
/// Returns `UnsupportedProjection` for any projection type other than
/// Lambert Conformal Conic, including lat-lon grids.
pub fn build_projection(grid: &GridDefinition, earth_radius: f64) -> Result<GridProjection> {
    match grid.projection_type {
        ProjectionType::LambertConformal => {
            let lcc = LambertConformal::new(
                grid.center_longitude,
                grid.center_latitude,
                (grid.standard_parallel_1, grid.standard_parallel_2),
                earth_radius,
            )?;
            Ok(GridProjection::LambertConformal(lcc))
        }
        other => Err(CmaqGridError::UnsupportedProjection {
            projection: other.name().to_string(),
            operation: "projection construction".to_string(),
        }),
    }
}
