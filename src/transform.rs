//! Coordinate transformation between the viewport and the data cube
//!
//! This module contains pure coordinate transformation logic that can be
//! easily unit tested without egui dependencies. The same mapping drives both
//! the rasterizer and the hover read-out, so what is shown under the pointer
//! is always the value that was coloured there.

use serde::{Deserialize, Serialize};

/// Default scale before any cube is attached (two screen pixels per data pixel)
pub const DEFAULT_SCALE: f64 = 2.0;

/// Smallest scale accepted; keeps the inverse mapping finite
pub const MIN_SCALE: f64 = 1e-6;

/// Affine map from viewport pixels to data pixels.
///
/// A viewport pixel `(a, b)`, with `b` counted from the top, shows data pixel
/// `x = floor(a / scale - offset)`, `y = floor((height - b - 1) / scale - offset)`.
/// Y is flipped for the FITS convention: data row 0 is at the bottom.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    /// Screen pixels per data pixel
    pub scale: f64,
    /// Shift applied in data pixels after scaling
    pub offset: f64,
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self {
            scale: DEFAULT_SCALE,
            offset: 0.0,
        }
    }
}

impl ViewTransform {
    /// Create a transform at the default scale with no offset
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a transform with an explicit scale and offset
    pub fn with_scale(scale: f64, offset: f64) -> Self {
        let mut t = Self { scale: DEFAULT_SCALE, offset };
        t.set_scale(scale);
        t
    }

    /// Set the scale; non-positive or non-finite values are ignored
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() && scale > 0.0 {
            self.scale = scale.max(MIN_SCALE);
        }
    }

    /// Choose the scale at which the image fills the viewport in both
    /// directions, cropping whichever axis overflows.
    pub fn fit_to_viewport(
        &mut self,
        viewport_size: (usize, usize),
        image_size: (usize, usize),
    ) {
        if image_size.0 == 0 || image_size.1 == 0 {
            return;
        }
        let sx = viewport_size.0 as f64 / image_size.0 as f64;
        let sy = viewport_size.1 as f64 / image_size.1 as f64;
        self.set_scale(sx.max(sy));
        self.offset = 0.0;
    }

    /// Map a viewport position to (possibly out-of-range) data coordinates.
    /// `viewport_height` is needed for the Y flip.
    pub fn viewport_to_data(&self, a: f64, b: f64, viewport_height: usize) -> (i64, i64) {
        let x = (a / self.scale - self.offset).floor();
        let y = ((viewport_height as f64 - b - 1.0) / self.scale - self.offset).floor();
        (x as i64, y as i64)
    }

    /// Map a viewport position to a data pixel inside `image_size`, or `None`
    /// if it falls outside the image. Never clamps to the edge.
    pub fn viewport_to_pixel(
        &self,
        a: f64,
        b: f64,
        viewport_height: usize,
        image_size: (usize, usize),
    ) -> Option<(usize, usize)> {
        let (x, y) = self.viewport_to_data(a, b, viewport_height);
        if x >= 0 && (x as usize) < image_size.0 && y >= 0 && (y as usize) < image_size.1 {
            Some((x as usize, y as usize))
        } else {
            None
        }
    }
}
