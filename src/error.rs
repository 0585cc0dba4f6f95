use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("invalid axis '{0}'")]
    InvalidAxis(String),

    #[error("invalid axes '{0}'")]
    InvalidAxes(String),

    #[error("plane touches the slice boundary at {0} distinct points, expected 2")]
    AmbiguousIntersection(usize),

    #[error("cannot derive a direction from a zero-length vector")]
    DegenerateVector,
}

/// Reasons for a volume failing the homogeneity test.
///
/// Slice indices refer to the Z-sorted order.
#[derive(Debug, Error, PartialEq)]
pub enum HomogeneityError {
    #[error("first slices share the same Z location ({0})")]
    ZeroGap(f64),

    #[error("slice {index} is not continuous on the Z axis (deviation {deviation})")]
    Discontinuous { index: usize, deviation: f64 },

    #[error("slice {index} has a different thickness")]
    VariableThickness { index: usize },

    #[error("slice {index} has a different rows/columns configuration")]
    VariableDimensions { index: usize },

    #[error("slice {index} has a different orientation")]
    VariableOrientation { index: usize },

    #[error("slice {index} has a different pixel spacing")]
    VariableSpacing { index: usize },

    #[error("volume must be homogeneous to use this function")]
    NotVerified,
}

#[derive(Debug, Error)]
pub enum Error {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    #[error("Z location {z} is outside the volume")]
    OutOfBounds { z: f64 },

    #[error("Homogeneity test failed: {0}")]
    Homogeneity(#[from] HomogeneityError),

    #[error("Invalid argument: {0}")]
    Argument(String),

    #[error("Raster shape error: {0}")]
    Shape(#[from] ndarray::ShapeError),
}

pub type Result<T> = std::result::Result<T, Error>;
