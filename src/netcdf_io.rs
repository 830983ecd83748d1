//! NetCDF access for CMAQ / I/O API files
//!
//! CMAQ files describe their grid with global attributes (`GDTYP`, `XCELL`,
//! `XORIG`, `NCOLS`, `XCENT`, `P_ALP`, ...). This module reads those into a
//! [`GridDefinition`] and exposes variable reads.

use crate::data_source::{squeeze, MetadataSource};
use crate::errors::{CmaqGridError, Result};
use crate::grid::{GridDefinition, ProjectionType};
use ndarray::{ArrayD, IxDyn};
use netcdf::{AttributeValue, File};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// An open CMAQ model output file
pub struct CmaqFile {
    file: File,
    path: PathBuf,
}

impl CmaqFile {
    /// Open a CMAQ NetCDF file.
    ///
    /// # Errors
    ///
    /// Returns `NetCDFError` if the file cannot be opened.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let file = netcdf::open(&path)?;
        info!(path = %path.display(), "opened CMAQ file");
        Ok(Self { file, path })
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl MetadataSource for CmaqFile {
    fn grid_definition(&self) -> Result<GridDefinition> {
        read_grid_definition(&self.file)
    }

    fn variable_names(&self) -> Vec<String> {
        self.file.variables().map(|v| v.name()).collect()
    }

    fn variable(&self, name: &str) -> Result<ArrayD<f32>> {
        get_variable(&self.file, name)
    }
}

/// Build a grid definition from the I/O API global attributes of a file.
///
/// # Errors
///
/// Returns `AttributeNotFound` or `InvalidAttribute` when a required
/// attribute is missing or unusable, and `InvalidGrid` if the values do not
/// describe a usable grid.
pub fn read_grid_definition(file: &File) -> Result<GridDefinition> {
    let gdtyp = global_int(file, "GDTYP")?;

    let grid = GridDefinition {
        projection_type: ProjectionType::from_gdtyp(gdtyp),
        cell_size_x: global_f64(file, "XCELL")?,
        cell_size_y: global_f64(file, "YCELL")?,
        origin_x: global_f64(file, "XORIG")?,
        origin_y: global_f64(file, "YORIG")?,
        column_count: global_count(file, "NCOLS")?,
        row_count: global_count(file, "NROWS")?,
        center_longitude: global_f64(file, "XCENT")?,
        center_latitude: global_f64(file, "YCENT")?,
        standard_parallel_1: global_f64(file, "P_ALP")?,
        standard_parallel_2: global_f64(file, "P_BET")?,
    };
    grid.validate()?;

    debug!(
        gdtyp,
        columns = grid.column_count,
        rows = grid.row_count,
        "read grid definition"
    );
    Ok(grid)
}

/// Get the values of a variable with size-1 dimensions collapsed.
///
/// # Errors
///
/// Returns `VariableNotFound` if the variable does not exist.
pub fn get_variable(file: &File, var_name: &str) -> Result<ArrayD<f32>> {
    let var = file
        .variable(var_name)
        .ok_or_else(|| CmaqGridError::VariableNotFound {
            var: var_name.to_string(),
        })?;

    let shape: Vec<usize> = var.dimensions().iter().map(|d| d.len()).collect();
    let data: Vec<f32> = var.get_values::<f32, _>(..)?;
    let array = ArrayD::from_shape_vec(IxDyn(&shape), data)?;

    squeeze(array)
}

fn global_attribute(file: &File, name: &str) -> Result<AttributeValue> {
    let attr = file
        .attribute(name)
        .ok_or_else(|| CmaqGridError::AttributeNotFound {
            name: name.to_string(),
        })?;
    Ok(attr.value()?)
}

fn global_f64(file: &File, name: &str) -> Result<f64> {
    let value = global_attribute(file, name)?;
    numeric_value(&value).ok_or_else(|| CmaqGridError::InvalidAttribute {
        name: name.to_string(),
        message: format!("expected a numeric scalar, got {:?}", value),
    })
}

fn global_int(file: &File, name: &str) -> Result<i32> {
    let value = global_f64(file, name)?;
    if value.fract() != 0.0 || value < f64::from(i32::MIN) || value > f64::from(i32::MAX) {
        return Err(CmaqGridError::InvalidAttribute {
            name: name.to_string(),
            message: format!("expected an integer, got {}", value),
        });
    }
    Ok(value as i32)
}

fn global_count(file: &File, name: &str) -> Result<usize> {
    let value = global_int(file, name)?;
    usize::try_from(value).map_err(|_| CmaqGridError::InvalidAttribute {
        name: name.to_string(),
        message: format!("expected a non-negative count, got {}", value),
    })
}

// I/O API writers store scalars either as plain values or one-element arrays.
fn numeric_value(value: &AttributeValue) -> Option<f64> {
    match value {
        AttributeValue::Double(v) => Some(*v),
        AttributeValue::Float(v) => Some(f64::from(*v)),
        AttributeValue::Int(v) => Some(f64::from(*v)),
        AttributeValue::Short(v) => Some(f64::from(*v)),
        AttributeValue::Uint(v) => Some(f64::from(*v)),
        AttributeValue::Ushort(v) => Some(f64::from(*v)),
        AttributeValue::Doubles(vs) if vs.len() == 1 => Some(vs[0]),
        AttributeValue::Floats(vs) if vs.len() == 1 => Some(f64::from(vs[0])),
        AttributeValue::Ints(vs) if vs.len() == 1 => Some(f64::from(vs[0])),
        AttributeValue::Shorts(vs) if vs.len() == 1 => Some(f64::from(vs[0])),
        _ => None,
    }
}
