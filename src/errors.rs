//! Centralized error handling for cmaq_grid
//!
//! Caller-input problems (unsupported projection, mismatched coordinate
//! sequences) fail the whole call. Points outside the grid are not errors;
//! index lookups report them as `None`.

use std::fmt;

/// Main error type for cmaq_grid operations
#[derive(Debug)]
pub enum CmaqGridError {
    /// NetCDF file operation errors
    NetCDFError(netcdf::Error),

    /// Array shape or dimension error
    ArrayError(ndarray::ShapeError),

    /// Variable not found in the metadata source
    VariableNotFound { var: String },

    /// Required global attribute missing from the file
    AttributeNotFound { name: String },

    /// Global attribute present but not usable (wrong type, out of range)
    InvalidAttribute { name: String, message: String },

    /// Grid definition or projection parameter is not physically meaningful
    InvalidGrid { message: String },

    /// Operation needs a projected grid, or no projection builder exists for this grid type
    UnsupportedProjection { projection: String, operation: String },

    /// Paired coordinate sequences of different length
    InputShapeMismatch { first: usize, second: usize },

    /// The projection library rejected a transform or definition
    Projection(String),

    /// Thread pool configuration error
    ThreadPoolError(String),

    /// Generic error for anything else
    Generic(String),
}

impl fmt::Display for CmaqGridError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CmaqGridError::NetCDFError(e) => write!(f, "NetCDF error: {}", e),
            CmaqGridError::ArrayError(e) => write!(f, "Array error: {}", e),
            CmaqGridError::VariableNotFound { var } => {
                write!(f, "Variable '{}' not found in file", var)
            }
            CmaqGridError::AttributeNotFound { name } => {
                write!(f, "Global attribute '{}' not found in file", name)
            }
            CmaqGridError::InvalidAttribute { name, message } => {
                write!(f, "Invalid global attribute '{}': {}", name, message)
            }
            CmaqGridError::InvalidGrid { message } => write!(f, "Invalid grid definition: {}", message),
            CmaqGridError::UnsupportedProjection {
                projection,
                operation,
            } => write!(
                f,
                "Cannot use {} with {} projection",
                operation, projection
            ),
            CmaqGridError::InputShapeMismatch { first, second } => write!(
                f,
                "Number of points must be equal: got {} and {}",
                first, second
            ),
            CmaqGridError::Projection(msg) => write!(f, "Projection error: {}", msg),
            CmaqGridError::ThreadPoolError(msg) => write!(f, "Thread pool error: {}", msg),
            CmaqGridError::Generic(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for CmaqGridError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CmaqGridError::NetCDFError(e) => Some(e),
            CmaqGridError::ArrayError(e) => Some(e),
            _ => None,
        }
    }
}

impl From<netcdf::Error> for CmaqGridError {
    fn from(error: netcdf::Error) -> Self {
        CmaqGridError::NetCDFError(error)
    }
}

impl From<ndarray::ShapeError> for CmaqGridError {
    fn from(error: ndarray::ShapeError) -> Self {
        CmaqGridError::ArrayError(error)
    }
}

impl From<String> for CmaqGridError {
    fn from(error: String) -> Self {
        CmaqGridError::Generic(error)
    }
}

impl From<&str> for CmaqGridError {
    fn from(error: &str) -> Self {
        CmaqGridError::Generic(error.to_string())
    }
}

/// Result type alias for cmaq_grid operations
pub type Result<T> = std::result::Result<T, CmaqGridError>;
