//! Display state shared by the controller and the rasterizer

use crate::lut::{flag_mask, Palette};
use crate::transfer::TransferFunction;
use crate::transform::ViewTransform;

/// Everything that decides how the current channel is coloured.
///
/// Invariants: `data_min < data_max` and `plot_min < plot_max`. The setters
/// below refuse any change that would break them.
#[derive(Clone, Debug, PartialEq)]
pub struct DisplayState {
    /// Full data range, from the source metadata or a scan
    pub data_min: f64,
    pub data_max: f64,
    /// Display window mapped onto the full colour range
    pub plot_min: f64,
    pub plot_max: f64,
    /// Viewport to data mapping
    pub transform: ViewTransform,
    pub current_channel: usize,
    pub palette: Palette,
    pub transfer: TransferFunction,
    /// Flip the final colour index
    pub revert: bool,
    /// Invert the colours of the lookup table
    pub invert: bool,
}

impl Default for DisplayState {
    fn default() -> Self {
        Self {
            data_min: 0.0,
            data_max: 1.0,
            plot_min: 0.0,
            plot_max: 1.0,
            transform: ViewTransform::default(),
            current_channel: 0,
            palette: Palette::default(),
            transfer: TransferFunction::default(),
            revert: false,
            invert: false,
        }
    }
}

impl DisplayState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the full data range, falling back to `[0, 1]` when it is degenerate.
    /// Returns `false` if the fallback was used.
    pub fn set_data_range(&mut self, min: f64, max: f64) -> bool {
        let valid = is_valid_range(min, max);
        if valid {
            self.data_min = min;
            self.data_max = max;
        } else {
            self.data_min = 0.0;
            self.data_max = 1.0;
        }
        valid
    }

    /// Lower display level; rejected unless below `plot_max`
    pub fn set_plot_min(&mut self, value: f64) -> bool {
        if value.is_finite() && value < self.plot_max {
            self.plot_min = value;
            true
        } else {
            false
        }
    }

    /// Upper display level; rejected unless above `plot_min`
    pub fn set_plot_max(&mut self, value: f64) -> bool {
        if value.is_finite() && value > self.plot_min {
            self.plot_max = value;
            true
        } else {
            false
        }
    }

    /// Show the full data range again
    pub fn reset_window(&mut self) {
        self.plot_min = self.data_min;
        self.plot_max = self.data_max;
    }

    /// Restore the default colour settings and the full data range.
    /// Channel and transform are left alone.
    pub fn reset_display(&mut self) {
        self.reset_window();
        self.revert = false;
        self.invert = false;
        self.palette = Palette::Rainbow;
        self.transfer = TransferFunction::Linear;
    }

    /// XOR mask applied to every rendered index
    pub fn revert_mask(&self) -> u8 {
        flag_mask(self.revert)
    }

    /// Check if colour settings are at their defaults
    pub fn is_display_default(&self) -> bool {
        self.plot_min == self.data_min
            && self.plot_max == self.data_max
            && !self.revert
            && !self.invert
            && self.palette == Palette::Rainbow
            && self.transfer == TransferFunction::Linear
    }
}

/// A usable range: both ends finite and strictly ordered
pub fn is_valid_range(min: f64, max: f64) -> bool {
    min.is_finite() && max.is_finite() && min < max
}
