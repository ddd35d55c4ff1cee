//! Viewport rasterization
//!
//! Renders one channel of a cube into a fixed-size, palette-indexed bitmap.
//! Colours are only resolved when the bitmap is converted for display, so a
//! palette change does not need to touch the data.

use egui::ColorImage;

use crate::cube::DataCube;
use crate::lut::Lut;
use crate::state::DisplayState;
use crate::transfer::grey;

/// Palette-indexed bitmap, row 0 at the top
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ChannelMap {
    width: usize,
    height: usize,
    indices: Vec<u8>,
}

impl ChannelMap {
    /// A blank (all index 0) bitmap
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            indices: vec![0; width * height],
        }
    }

    /// Bitmap dimensions
    pub fn dimensions(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    /// Palette index at viewport position `(a, b)`
    pub fn index(&self, a: usize, b: usize) -> Option<u8> {
        if a < self.width && b < self.height {
            self.indices.get(b * self.width + a).copied()
        } else {
            None
        }
    }

    /// Row-major palette indices
    pub fn indices(&self) -> &[u8] {
        &self.indices
    }

    /// Reset every pixel to index 0
    pub fn clear(&mut self) {
        self.indices.fill(0);
    }

    /// Resolve the bitmap through `lut` into opaque RGBA bytes
    pub fn to_rgba(&self, lut: &Lut) -> Vec<u8> {
        let mut rgba = Vec::with_capacity(self.indices.len() * 4);
        for &index in &self.indices {
            let [r, g, b] = lut.rgb(index);
            rgba.extend_from_slice(&[r, g, b, 255]);
        }
        rgba
    }

    /// Resolve the bitmap through `lut` into an egui image
    pub fn to_color_image(&self, lut: &Lut) -> ColorImage {
        ColorImage::from_rgba_unmultiplied([self.width, self.height], &self.to_rgba(lut))
    }
}

/// Render `channel` of `cube` into `out` using the window, transfer function,
/// transform and revert flag from `state`.
///
/// Viewport pixels that map outside the image get index 0; nothing is clamped
/// to the edge. The channel is clamped to the cube's depth. An empty cube
/// leaves `out` untouched.
pub fn render_channel(cube: &dyn DataCube, channel: usize, state: &DisplayState, out: &mut ChannelMap) {
    if cube.is_empty() {
        return;
    }

    let image_size = (cube.width(), cube.height());
    let z = channel.min(cube.depth().saturating_sub(1));
    let mask = state.revert_mask();
    let (out_width, out_height) = out.dimensions();

    for b in 0..out_height {
        let row = &mut out.indices[b * out_width..(b + 1) * out_width];
        for (a, pixel) in row.iter_mut().enumerate() {
            *pixel = match state
                .transform
                .viewport_to_pixel(a as f64, b as f64, out_height, image_size)
            {
                Some((x, y)) => {
                    let value = cube.value_at([x, y, z]);
                    grey(value, state.plot_min, state.plot_max, state.transfer) ^ mask
                }
                None => 0,
            };
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cube::ArrayCube;
    use crate::lut::Palette;
    use crate::transform::ViewTransform;

    fn one_to_one(plot_min: f64, plot_max: f64) -> DisplayState {
        DisplayState {
            plot_min,
            plot_max,
            transform: ViewTransform::with_scale(1.0, 0.0),
            ..DisplayState::default()
        }
    }

    fn two_by_two() -> ArrayCube {
        // Row y = 0 is [1, 2], row y = 1 is [3, 4]
        ArrayCube::new(vec![1.0, 2.0, 3.0, 4.0], &[2, 2]).unwrap()
    }

    #[test]
    fn test_render_flips_rows() {
        let mut out = ChannelMap::new(2, 2);
        render_channel(&two_by_two(), 0, &one_to_one(1.0, 4.0), &mut out);
        // Top viewport row shows data row y = 1
        assert_eq!(out.indices(), &[170, 255, 0, 85]);
    }

    #[test]
    fn test_revert_flips_indices() {
        let mut state = one_to_one(1.0, 4.0);
        state.revert = true;
        let mut out = ChannelMap::new(2, 2);
        render_channel(&two_by_two(), 0, &state, &mut out);
        assert_eq!(out.indices(), &[85, 0, 255, 170]);
    }

    #[test]
    fn test_outside_image_is_background() {
        let mut state = one_to_one(1.0, 4.0);
        state.revert = true;
        let mut out = ChannelMap::new(3, 3);
        render_channel(&two_by_two(), 0, &state, &mut out);
        // Top row and right column fall outside the 2x2 image; revert does
        // not apply to the background
        assert_eq!(out.index(0, 0), Some(0));
        assert_eq!(out.index(2, 2), Some(0));
        assert_eq!(out.index(0, 2), Some(255));
        assert_eq!(out.index(1, 1), Some(0));
    }

    #[test]
    fn test_blank_values_render_as_zero() {
        let cube = ArrayCube::new(vec![f64::NAN, 4.0], &[2, 1]).unwrap();
        let mut out = ChannelMap::new(2, 1);
        render_channel(&cube, 0, &one_to_one(0.0, 4.0), &mut out);
        assert_eq!(out.indices(), &[0, 255]);
    }

    #[test]
    fn test_scale_replicates_pixels() {
        let mut state = one_to_one(1.0, 4.0);
        state.transform = ViewTransform::with_scale(2.0, 0.0);
        let mut out = ChannelMap::new(4, 4);
        render_channel(&two_by_two(), 0, &state, &mut out);
        assert_eq!(
            out.indices(),
            &[
                170, 170, 255, 255, //
                170, 170, 255, 255, //
                0, 0, 85, 85, //
                0, 0, 85, 85,
            ]
        );
    }

    #[test]
    fn test_channel_is_clamped() {
        let cube = ArrayCube::from_fn(1, 1, 3, |_, _, z| z as f64).unwrap();
        let mut out = ChannelMap::new(1, 1);
        let state = one_to_one(0.0, 2.0);

        render_channel(&cube, 1, &state, &mut out);
        assert_eq!(out.indices(), &[127]);

        render_channel(&cube, 99, &state, &mut out);
        assert_eq!(out.indices(), &[255]);
    }

    #[test]
    fn test_empty_cube_is_noop() {
        let mut out = ChannelMap::new(2, 2);
        out.indices[0] = 42;
        render_channel(&ArrayCube::empty(), 0, &one_to_one(0.0, 1.0), &mut out);
        assert_eq!(out.indices(), &[42, 0, 0, 0]);

        out.clear();
        assert_eq!(out.indices(), &[0, 0, 0, 0]);
    }

    #[test]
    fn test_to_color_image_uses_lut() {
        let mut out = ChannelMap::new(2, 2);
        render_channel(&two_by_two(), 0, &one_to_one(1.0, 4.0), &mut out);

        let lut = Lut::build(Palette::Greyscale, false);
        let rgba = out.to_rgba(&lut);
        assert_eq!(&rgba[..4], &[170, 170, 170, 255]);

        let image = out.to_color_image(&Lut::build(Palette::Rainbow, false));
        assert_eq!(image.size, [2, 2]);
        assert_eq!(image.pixels[2], egui::Color32::from_rgb(0, 0, 255));
    }

    #[test]
    fn test_index_out_of_bounds() {
        let out = ChannelMap::new(2, 3);
        assert_eq!(out.dimensions(), (2, 3));
        assert_eq!(out.index(1, 2), Some(0));
        assert_eq!(out.index(2, 0), None);
        assert_eq!(out.index(0, 3), None);
    }
}
