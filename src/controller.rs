//! Display-state controller
//!
//! `ChannelViewer` owns the display state, the lookup table and the rendered
//! bitmap. Hosts feed it discrete UI events (channel navigation, level edits,
//! palette and transfer function choices, flag toggles, pointer moves); every
//! accepted event re-renders synchronously. Nothing here returns an error:
//! bad input is reverted in place and a missing cube turns every rendering
//! event into a no-op.

use egui::ColorImage;

use crate::config::ViewerConfig;
use crate::cube::DataCube;
use crate::lut::{Lut, Palette};
use crate::raster::{render_channel, ChannelMap};
use crate::state::{is_valid_range, DisplayState};
use crate::transfer::TransferFunction;

/// Status line shown when the pointer is off the image
pub const STATUS_UNDEFINED: &str = "Position: undefined   Value: undefined";

/// Single-channel step direction
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Step {
    Previous,
    Next,
}

/// Channel range edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Edge {
    First,
    Last,
}

/// Interactive channel-map viewer over one data cube.
pub struct ChannelViewer {
    config: ViewerConfig,
    cube: Option<Box<dyn DataCube>>,
    state: DisplayState,
    lut: Lut,
    bitmap: ChannelMap,
    /// Text shown in the level fields; restored after a rejected edit
    level_min_text: String,
    level_max_text: String,
    status: String,
    /// Set on every render, cleared by the host when it uploads the bitmap
    texture_dirty: bool,
}

impl Default for ChannelViewer {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl ChannelViewer {
    /// Create an empty viewer; the bitmap starts out blank
    pub fn new(config: ViewerConfig) -> Self {
        let mut state = DisplayState::default();
        state.transform.set_scale(config.initial_scale);
        let lut = Lut::build(state.palette, state.invert);
        let bitmap = ChannelMap::new(config.viewport_width, config.viewport_height);

        Self {
            level_min_text: format_number(state.plot_min),
            level_max_text: format_number(state.plot_max),
            config,
            cube: None,
            state,
            lut,
            bitmap,
            status: String::new(),
            texture_dirty: true,
        }
    }

    // =========================================================================
    // Events
    // =========================================================================

    /// Attach a new cube, replacing any previous one.
    ///
    /// The data range comes from the cube's declared min/max when usable,
    /// otherwise from a full scan. The display window is reset to the data
    /// range and the channel to 0. Colour settings are kept.
    pub fn attach(&mut self, cube: Box<dyn DataCube>) {
        if cube.is_empty() {
            log::warn!("Attached cube has no axes; nothing to display");
            self.cube = None;
            self.bitmap.clear();
            self.status.clear();
            self.texture_dirty = true;
            return;
        }

        let (data_min, data_max) = match data_range(&*cube) {
            Some(range) => range,
            None => {
                log::warn!("DATAMIN not greater than DATAMAX; using default values");
                (0.0, 1.0)
            }
        };
        self.state.set_data_range(data_min, data_max);
        self.state.reset_window();
        self.state.current_channel = 0;

        if self.config.fit_on_attach {
            self.state
                .transform
                .fit_to_viewport(self.config.viewport_size(), (cube.width(), cube.height()));
        }

        log::debug!(
            "Attached {}x{}x{} cube, range [{}, {}], scale {}",
            cube.width(),
            cube.height(),
            cube.depth(),
            self.state.data_min,
            self.state.data_max,
            self.state.transform.scale
        );

        self.cube = Some(cube);
        self.sync_level_texts();
        self.status.clear();
        self.render();
    }

    /// Drop the current cube
    pub fn detach(&mut self) {
        self.cube = None;
        self.bitmap.clear();
        self.status.clear();
        self.texture_dirty = true;
    }

    /// Move one channel back or forward, stopping at either end
    pub fn step_channel(&mut self, step: Step) {
        if !self.navigation_enabled() {
            return;
        }
        let channel = match step {
            Step::Previous => self.state.current_channel.saturating_sub(1),
            Step::Next => self.state.current_channel + 1,
        };
        self.set_channel(channel);
    }

    /// Jump to the first or last channel
    pub fn jump_channel(&mut self, edge: Edge) {
        match edge {
            Edge::First => self.set_channel(0),
            Edge::Last => self.set_channel(usize::MAX),
        }
    }

    /// Show channel `n`, clamped to the cube's depth
    pub fn set_channel(&mut self, n: usize) {
        if !self.navigation_enabled() {
            return;
        }
        self.state.current_channel = n.min(self.channel_count() - 1);
        self.render();
    }

    /// Commit the text of the lower level field.
    ///
    /// Accepted only if it parses as a finite number below the upper level;
    /// otherwise the field text reverts to the current level. Returns whether
    /// the level changed.
    pub fn set_level_min(&mut self, text: &str) -> bool {
        let accepted = parse_level(text).is_some_and(|v| self.state.set_plot_min(v));
        if !accepted {
            log::debug!("Rejected lower level {text:?}");
        }
        self.level_min_text = format_number(self.state.plot_min);
        if accepted {
            self.render();
        }
        accepted
    }

    /// Commit the text of the upper level field; see [`Self::set_level_min`]
    pub fn set_level_max(&mut self, text: &str) -> bool {
        let accepted = parse_level(text).is_some_and(|v| self.state.set_plot_max(v));
        if !accepted {
            log::debug!("Rejected upper level {text:?}");
        }
        self.level_max_text = format_number(self.state.plot_max);
        if accepted {
            self.render();
        }
        accepted
    }

    pub fn set_palette(&mut self, palette: Palette) {
        self.state.palette = palette;
        self.rebuild_lut();
        self.render();
    }

    pub fn set_transfer_function(&mut self, transfer: TransferFunction) {
        self.state.transfer = transfer;
        self.render();
    }

    /// Flip the colour index of every image pixel
    pub fn set_revert(&mut self, revert: bool) {
        self.state.revert = revert;
        self.render();
    }

    /// Invert the colours of the lookup table
    pub fn set_invert(&mut self, invert: bool) {
        self.state.invert = invert;
        self.rebuild_lut();
        self.render();
    }

    /// Restore the full data range and default colour settings
    pub fn reset(&mut self) {
        self.state.reset_display();
        self.sync_level_texts();
        self.rebuild_lut();
        self.render();
    }

    /// Update the status line for a pointer at viewport position `(a, b)`
    pub fn pointer_moved(&mut self, a: f64, b: f64) -> &str {
        self.status = self.status_at(a, b);
        &self.status
    }

    /// Status text for a viewport position without storing it
    pub fn status_at(&self, a: f64, b: f64) -> String {
        let Some(cube) = self.cube.as_deref() else {
            return STATUS_UNDEFINED.to_string();
        };

        let image_size = (cube.width(), cube.height());
        let Some((x, y)) =
            self.state
                .transform
                .viewport_to_pixel(a, b, self.config.viewport_height, image_size)
        else {
            return STATUS_UNDEFINED.to_string();
        };

        let z = self.state.current_channel.min(cube.depth().saturating_sub(1));
        let value = cube.value_at([x, y, z]);
        if value.is_nan() {
            format!("Position: {x}, {y}   Value: blank")
        } else if cube.unit().is_empty() {
            format!("Position: {x}, {y}   Value: {}", format_number(value))
        } else {
            format!(
                "Position: {x}, {y}   Value: {} {}",
                format_number(value),
                cube.unit()
            )
        }
    }

    /// The current bitmap resolved through the current lookup table
    pub fn copy_image(&self) -> ColorImage {
        self.bitmap.to_color_image(&self.lut)
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> &DisplayState {
        &self.state
    }

    pub fn lut(&self) -> &Lut {
        &self.lut
    }

    /// Palette-indexed bitmap of the current channel
    pub fn bitmap(&self) -> &ChannelMap {
        &self.bitmap
    }

    pub fn cube(&self) -> Option<&dyn DataCube> {
        self.cube.as_deref()
    }

    /// Check if a non-empty cube is attached
    pub fn has_data(&self) -> bool {
        self.cube.is_some()
    }

    /// Number of channels; 1 for plain images, 0 without data
    pub fn channel_count(&self) -> usize {
        self.cube.as_ref().map_or(0, |cube| cube.depth())
    }

    /// Whether channel navigation makes sense for the attached cube
    pub fn navigation_enabled(&self) -> bool {
        self.channel_count() > 1
    }

    pub fn current_channel(&self) -> usize {
        self.state.current_channel
    }

    pub fn channel_text(&self) -> String {
        self.state.current_channel.to_string()
    }

    pub fn level_min_text(&self) -> &str {
        &self.level_min_text
    }

    pub fn level_max_text(&self) -> &str {
        &self.level_max_text
    }

    pub fn status_text(&self) -> &str {
        &self.status
    }

    /// Check and clear the dirty flag
    pub fn take_texture_dirty(&mut self) -> bool {
        std::mem::take(&mut self.texture_dirty)
    }

    // =========================================================================
    // Internal helpers
    // =========================================================================

    fn rebuild_lut(&mut self) {
        self.lut = Lut::build(self.state.palette, self.state.invert);
        // Even a blank bitmap shows entry 0 of the table
        self.texture_dirty = true;
    }

    fn sync_level_texts(&mut self) {
        self.level_min_text = format_number(self.state.plot_min);
        self.level_max_text = format_number(self.state.plot_max);
    }

    /// Re-render the current channel; a no-op without data
    fn render(&mut self) {
        if let Some(cube) = self.cube.as_deref() {
            render_channel(cube, self.state.current_channel, &self.state, &mut self.bitmap);
            self.texture_dirty = true;
        }
    }
}

/// Data range of `cube`: the declared range if usable, else a scan over every
/// channel skipping blank and non-finite cells. `None` if neither gives a
/// range with `min < max`.
pub fn data_range(cube: &dyn DataCube) -> Option<(f64, f64)> {
    let (declared_min, declared_max) = (cube.declared_min(), cube.declared_max());
    if is_valid_range(declared_min, declared_max) {
        return Some((declared_min, declared_max));
    }

    log::warn!("DATAMIN or DATAMAX undefined; calculating values");

    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for z in 0..cube.depth() {
        for y in 0..cube.height() {
            for x in 0..cube.width() {
                let value = cube.value_at([x, y, z]);
                if value.is_finite() {
                    min = min.min(value);
                    max = max.max(value);
                }
            }
        }
    }

    is_valid_range(min, max).then_some((min, max))
}

fn parse_level(text: &str) -> Option<f64> {
    text.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

/// Shortest decimal form that round-trips (`2` for 2.0)
fn format_number(value: f64) -> String {
    format!("{value}")
}
