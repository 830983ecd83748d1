//! cmaq_grid: grid geometry and coordinate transforms for CMAQ model output
//!
//! CMAQ (and other Models-3 I/O API) NetCDF files store fields on a regular
//! grid in projected coordinates. This library answers three questions about
//! such a grid:
//!
//! - where each cell sits (cell centers and the corner mesh, in metres),
//! - which projected coordinates and which cell a longitude/latitude falls in,
//! - which longitude/latitude a projected coordinate corresponds to.
//!
//! Lambert Conformal Conic grids on a spherical earth are supported. The
//! projection mathematics is provided by `proj4rs`.
//!
//! ## Module Organization
//!
//! - [`grid`]: grid definition, cell centers and corners
//! - [`projection`]: projection construction and forward/inverse transforms
//! - [`transform`]: [`GridTransformer`] and grid-index lookup
//! - [`data_source`]: the [`MetadataSource`] abstraction
//! - [`netcdf_io`]: reading grid attributes and variables from NetCDF files
//! - [`metadata`]: grid summaries
//! - [`parallel`]: parallel processing configuration
//! - [`errors`]: centralized error handling
//!
//! ## Usage
//!
//! ```rust,no_run
//! use cmaq_grid::prelude::*;
//!
//! let file = CmaqFile::open("METCRO2D.nc").unwrap();
//! let transformer = GridTransformer::new(file.grid_definition().unwrap()).unwrap();
//!
//! let (i, j) = transformer
//!     .lon_lat_to_indices(&[-84.46837, -84.50322], &[33.83169, 33.91965])
//!     .unwrap();
//! println!("{:?} {:?}", i, j);
//! ```

pub mod data_source;
pub mod errors;
pub mod grid;
pub mod metadata;
pub mod netcdf_io;
pub mod parallel;
pub mod projection;
pub mod transform;

pub use data_source::*;
pub use errors::*;
pub use grid::*;
pub use metadata::*;
pub use netcdf_io::*;
pub use parallel::*;
pub use projection::*;
pub use transform::*;

pub mod prelude {
    //! Commonly used imports for convenience
    pub use crate::data_source::{InMemorySource, MetadataSource};
    pub use crate::errors::{CmaqGridError, Result};
    pub use crate::grid::{CellCenterGrid, CellCornerGrid, DomainBounds, GridDefinition, ProjectionType};
    pub use crate::netcdf_io::CmaqFile;
    pub use crate::parallel::ParallelConfig;
    pub use crate::projection::{build_projection, GridProjection, MapProjection, DEFAULT_EARTH_RADIUS};
    pub use crate::transform::{CellIndex, GridTransformer};
}
