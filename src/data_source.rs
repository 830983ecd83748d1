//! Metadata source abstraction
//!
//! A [`MetadataSource`] supplies the grid definition scalars and the raw
//! variable arrays of one model output file. The NetCDF implementation lives
//! in [`crate::netcdf_io`]; [`InMemorySource`] serves synthetic grids.

use crate::errors::{CmaqGridError, Result};
use crate::grid::GridDefinition;
use ndarray::{ArrayD, IxDyn};
use std::collections::HashMap;

/// Supplier of grid metadata and variable data
pub trait MetadataSource {
    /// Grid definition built from the source's global attributes
    fn grid_definition(&self) -> Result<GridDefinition>;

    /// Names of all variables in the source
    fn variable_names(&self) -> Vec<String>;

    /// Read a variable with every size-1 axis removed
    fn variable(&self, name: &str) -> Result<ArrayD<f32>>;
}

/// Drop every axis of length 1. An array of a single value becomes 0-d.
///
/// # Errors
///
/// Returns `ArrayError` if the reshaped array cannot be built.
pub fn squeeze(array: ArrayD<f32>) -> Result<ArrayD<f32>> {
    let shape: Vec<usize> = array.shape().iter().copied().filter(|&len| len != 1).collect();
    if shape.len() == array.ndim() {
        return Ok(array);
    }
    let data: Vec<f32> = array.iter().copied().collect();
    Ok(ArrayD::from_shape_vec(IxDyn(&shape), data)?)
}

/// Metadata source held entirely in memory
#[derive(Debug, Clone)]
pub struct InMemorySource {
    grid: GridDefinition,
    variables: HashMap<String, ArrayD<f32>>,
}

impl InMemorySource {
    /// Create a source with a grid definition and no variables
    #[must_use]
    pub fn new(grid: GridDefinition) -> Self {
        Self {
            grid,
            variables: HashMap::new(),
        }
    }

    /// Add a variable, replacing any existing one with the same name
    #[must_use]
    pub fn with_variable(mut self, name: &str, data: ArrayD<f32>) -> Self {
        self.variables.insert(name.to_string(), data);
        self
    }
}

impl MetadataSource for InMemorySource {
    fn grid_definition(&self) -> Result<GridDefinition> {
        self.grid.validate()?;
        Ok(self.grid.clone())
    }

    fn variable_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.variables.keys().cloned().collect();
        names.sort();
        names
    }

    fn variable(&self, name: &str) -> Result<ArrayD<f32>> {
        let data = self
            .variables
            .get(name)
            .ok_or_else(|| CmaqGridError::VariableNotFound {
                var: name.to_string(),
            })?;
        squeeze(data.clone())
    }
}
