//! Data cube access
//!
//! The viewer never parses files itself. It reads from anything that can
//! answer the handful of questions in [`DataCube`]: how many axes, how long
//! each axis is, and what value sits at a given position. Blank cells are
//! reported as NaN.

use crate::error::{CubeError, Result};

/// Highest number of axes an [`ArrayCube`] accepts
pub const MAX_AXES: usize = 4;

/// Random-access reader over a 1 to 4 dimensional numeric array.
///
/// Axes are numbered from 1 (x = 1, y = 2, channel = 3), matching the FITS
/// convention used by astronomical cubes.
pub trait DataCube {
    /// Number of axes; 0 means no data is loaded
    fn dimension_count(&self) -> usize;

    /// Length of a 1-based axis.
    ///
    /// Axes past `dimension_count()` have length 1 so a 2-D image behaves
    /// like a single-channel cube. An empty source reports 0 everywhere.
    fn dimension_size(&self, axis: usize) -> usize;

    /// Value at `[x, y, channel]`; NaN for blank cells
    fn value_at(&self, position: [usize; 3]) -> f64;

    /// Minimum declared by the source's metadata, NaN if unknown
    fn declared_min(&self) -> f64 {
        f64::NAN
    }

    /// Maximum declared by the source's metadata, NaN if unknown
    fn declared_max(&self) -> f64 {
        f64::NAN
    }

    /// Physical unit of the values, empty if unknown
    fn unit(&self) -> &str {
        ""
    }

    /// Width (axis 1)
    fn width(&self) -> usize {
        self.dimension_size(1)
    }

    /// Height (axis 2)
    fn height(&self) -> usize {
        self.dimension_size(2)
    }

    /// Number of channels (axis 3)
    fn depth(&self) -> usize {
        self.dimension_size(3)
    }

    /// Whether this source holds any data
    fn is_empty(&self) -> bool {
        self.dimension_count() == 0
    }
}

/// An in-memory cube stored x-fastest, the way FITS lays out its data.
#[derive(Clone, Debug, Default)]
pub struct ArrayCube {
    data: Vec<f64>,
    shape: Vec<usize>,
    declared_min: Option<f64>,
    declared_max: Option<f64>,
    unit: String,
}

impl ArrayCube {
    /// Wrap `data` with the given axis lengths (x first).
    pub fn new(data: Vec<f64>, shape: &[usize]) -> Result<Self> {
        if shape.is_empty() || shape.len() > MAX_AXES {
            return Err(CubeError::UnsupportedDimensions(shape.len()));
        }
        if let Some(axis) = shape.iter().position(|&n| n == 0) {
            return Err(CubeError::EmptyAxis { axis: axis + 1 });
        }

        let expected = element_count(shape)?;
        if data.len() != expected {
            return Err(CubeError::LengthMismatch {
                shape: shape.to_vec(),
                expected,
                actual: data.len(),
            });
        }

        Ok(Self {
            data,
            shape: shape.to_vec(),
            ..Self::default()
        })
    }

    /// A source with no axes at all
    pub fn empty() -> Self {
        Self::default()
    }

    /// Build a cube by evaluating `f(x, y, z)` over a 3-D grid
    pub fn from_fn(
        width: usize,
        height: usize,
        depth: usize,
        mut f: impl FnMut(usize, usize, usize) -> f64,
    ) -> Result<Self> {
        let mut data = Vec::with_capacity(element_count(&[width, height, depth])?);
        for z in 0..depth {
            for y in 0..height {
                for x in 0..width {
                    data.push(f(x, y, z));
                }
            }
        }
        Self::new(data, &[width, height, depth])
    }

    /// Attach the DATAMIN/DATAMAX style range from the source's metadata
    pub fn with_declared_range(mut self, min: f64, max: f64) -> Self {
        self.declared_min = Some(min);
        self.declared_max = Some(max);
        self
    }

    /// Attach a physical unit (BUNIT)
    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = unit.into();
        self
    }

    fn offset(&self, position: [usize; 3]) -> Option<usize> {
        let mut offset = 0;
        let mut stride = 1;
        for (axis, &len) in self.shape.iter().enumerate() {
            let coord = position.get(axis).copied().unwrap_or(0);
            if coord >= len {
                return None;
            }
            offset += coord * stride;
            stride *= len;
        }
        Some(offset)
    }
}

/// Number of cells in a cube of `shape`, or an error if it does not fit in `usize`
fn element_count(shape: &[usize]) -> Result<usize> {
    shape
        .iter()
        .try_fold(1usize, |acc, &n| acc.checked_mul(n))
        .ok_or_else(|| CubeError::TooLarge { shape: shape.to_vec() })
}

impl DataCube for ArrayCube {
    fn dimension_count(&self) -> usize {
        self.shape.len()
    }

    fn dimension_size(&self, axis: usize) -> usize {
        if self.shape.is_empty() || axis == 0 {
            return 0;
        }
        self.shape.get(axis - 1).copied().unwrap_or(1)
    }

    fn value_at(&self, position: [usize; 3]) -> f64 {
        // Positions on axes the cube lacks must be 0
        let in_range = position
            .iter()
            .enumerate()
            .all(|(axis, &coord)| axis < self.shape.len() || coord == 0);
        if !in_range {
            return f64::NAN;
        }
        self.offset(position)
            .and_then(|i| self.data.get(i).copied())
            .unwrap_or(f64::NAN)
    }

    fn declared_min(&self) -> f64 {
        self.declared_min.unwrap_or(f64::NAN)
    }

    fn declared_max(&self) -> f64 {
        self.declared_max.unwrap_or(f64::NAN)
    }

    fn unit(&self) -> &str {
        &self.unit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_bad_shapes() {
        assert_eq!(
            ArrayCube::new(vec![], &[]).unwrap_err(),
            CubeError::UnsupportedDimensions(0)
        );
        assert_eq!(
            ArrayCube::new(vec![0.0; 2], &[1, 1, 1, 1, 2]).unwrap_err(),
            CubeError::UnsupportedDimensions(5)
        );
        assert_eq!(
            ArrayCube::new(vec![], &[3, 0]).unwrap_err(),
            CubeError::EmptyAxis { axis: 2 }
        );
        assert!(matches!(
            ArrayCube::new(vec![1.0; 5], &[2, 3]),
            Err(CubeError::LengthMismatch { expected: 6, actual: 5, .. })
        ));
    }

    #[test]
    fn test_rejects_overflowing_shapes() {
        assert_eq!(
            ArrayCube::new(vec![], &[usize::MAX, 2]).unwrap_err(),
            CubeError::TooLarge { shape: vec![usize::MAX, 2] }
        );
        assert!(matches!(
            ArrayCube::from_fn(usize::MAX, 2, 1, |_, _, _| 0.0),
            Err(CubeError::TooLarge { .. })
        ));
    }

    #[cfg(target_pointer_width = "64")]
    #[test]
    fn test_rejects_shape_wrapping_to_zero() {
        // 2^32 * 2^32 wraps to 0, which would match an empty buffer
        assert!(matches!(
            ArrayCube::new(vec![], &[1 << 32, 1 << 32]),
            Err(CubeError::TooLarge { .. })
        ));
    }

    #[test]
    fn test_x_fastest_layout() {
        let cube = ArrayCube::new((0..12).map(f64::from).collect(), &[3, 2, 2]).unwrap();
        assert_eq!(cube.value_at([0, 0, 0]), 0.0);
        assert_eq!(cube.value_at([2, 0, 0]), 2.0);
        assert_eq!(cube.value_at([0, 1, 0]), 3.0);
        assert_eq!(cube.value_at([1, 1, 1]), 10.0);
    }

    #[test]
    fn test_missing_axes_have_length_one() {
        let image = ArrayCube::new(vec![1.0, 2.0], &[2]).unwrap();
        assert_eq!(image.dimension_count(), 1);
        assert_eq!(image.width(), 2);
        assert_eq!(image.height(), 1);
        assert_eq!(image.depth(), 1);
        assert_eq!(image.value_at([1, 0, 0]), 2.0);
        assert!(image.value_at([1, 1, 0]).is_nan());
    }

    #[test]
    fn test_empty_cube() {
        let cube = ArrayCube::empty();
        assert!(cube.is_empty());
        assert_eq!(cube.width(), 0);
        assert_eq!(cube.depth(), 0);
        assert!(cube.value_at([0, 0, 0]).is_nan());
    }

    #[test]
    fn test_four_dimensional_cube_slices_first_stokes() {
        let cube = ArrayCube::new((0..8).map(f64::from).collect(), &[2, 2, 1, 2]).unwrap();
        assert_eq!(cube.dimension_count(), 4);
        assert_eq!(cube.depth(), 1);
        assert_eq!(cube.value_at([1, 1, 0]), 3.0);
    }

    #[test]
    fn test_metadata_defaults_to_unknown() {
        let cube = ArrayCube::new(vec![1.0], &[1, 1]).unwrap();
        assert!(cube.declared_min().is_nan());
        assert!(cube.declared_max().is_nan());
        assert_eq!(cube.unit(), "");

        let cube = cube.with_declared_range(-1.0, 2.0).with_unit("Jy/beam");
        assert_eq!(cube.declared_min(), -1.0);
        assert_eq!(cube.declared_max(), 2.0);
        assert_eq!(cube.unit(), "Jy/beam");
    }
}
