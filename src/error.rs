use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CubeError {
    #[error("Unsupported dimensionality: {0} axes (expected 1 to 4)")]
    UnsupportedDimensions(usize),

    #[error("Axis {axis} has zero length")]
    EmptyAxis { axis: usize },

    #[error("Shape {shape:?} has more cells than fit in memory")]
    TooLarge { shape: Vec<usize> },

    #[error("Buffer size mismatch: shape {shape:?} needs {expected} values, got {actual}")]
    LengthMismatch {
        shape: Vec<usize>,
        expected: usize,
        actual: usize,
    },
}

pub type Result<T> = std::result::Result<T, CubeError>;
