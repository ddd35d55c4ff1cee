//! ChannelViewerWidget - an egui panel around a [`ChannelViewer`]
//!
//! Lays out the level/colour settings row, the fixed-size viewport, the
//! channel navigation row and the status line. All decisions live in the
//! controller; this widget only turns egui input into controller events and
//! uploads the rendered bitmap as a texture when it changes.

use std::cell::RefCell;

use egui::{Color32, Key, Response, Sense, TextureHandle, TextureOptions, Ui};

use crate::config::ViewerConfig;
use crate::controller::{ChannelViewer, Edge, Step};
use crate::cube::DataCube;
use crate::lut::Palette;
use crate::state::DisplayState;
use crate::transfer::TransferFunction;

/// Width of the level text fields in points
const LEVEL_FIELD_WIDTH: f32 = 80.0;

/// Actions collected while drawing, applied once the frame's UI is laid out
#[derive(Clone, Debug, PartialEq)]
enum PanelAction {
    LevelMin(String),
    LevelMax(String),
    SetRevert(bool),
    SetInvert(bool),
    SetTransfer(TransferFunction),
    SetPalette(Palette),
    ResetDisplay,
    Copy,
    Step(Step),
    Jump(Edge),
    SetChannel(usize),
}

/// A self-contained channel-map panel.
///
/// Multiple instances can coexist without sharing state.
pub struct ChannelViewerWidget {
    viewer: ChannelViewer,
    /// Level field buffers while the user types
    level_min_edit: String,
    level_max_edit: String,
    /// Channel map texture
    texture: Option<TextureHandle>,
}

impl Default for ChannelViewerWidget {
    fn default() -> Self {
        Self::new(ViewerConfig::default())
    }
}

impl ChannelViewerWidget {
    pub fn new(config: ViewerConfig) -> Self {
        let viewer = ChannelViewer::new(config);
        Self {
            level_min_edit: viewer.level_min_text().to_string(),
            level_max_edit: viewer.level_max_text().to_string(),
            viewer,
            texture: None,
        }
    }

    /// Attach a cube to the underlying viewer
    pub fn attach(&mut self, cube: Box<dyn DataCube>) {
        self.viewer.attach(cube);
        self.sync_level_fields();
    }

    pub fn viewer(&self) -> &ChannelViewer {
        &self.viewer
    }

    /// Mutable access for hosts driving the viewer directly; level fields
    /// are resynchronized on the next frame that changes anything
    pub fn viewer_mut(&mut self) -> &mut ChannelViewer {
        &mut self.viewer
    }

    /// Show the panel in `ui`
    pub fn show(&mut self, ui: &mut Ui) -> Response {
        let ctx = ui.ctx().clone();
        let mut actions = Vec::new();

        self.handle_keyboard_input(&ctx, &mut actions);

        let response = ui
            .vertical(|ui| {
                self.render_settings_row(ui, &mut actions);
                self.render_viewport(ui, &mut actions);
                self.render_navigation_row(ui, &mut actions);
                ui.label(self.viewer.status_text());
            })
            .response;

        if !actions.is_empty() {
            for action in actions {
                self.apply(action, &ctx);
            }
            self.sync_level_fields();
        }

        // Upload after applying so this frame's changes are not a frame late
        if self.viewer.take_texture_dirty() {
            self.rebuild_texture(&ctx);
            ctx.request_repaint();
        }

        response
    }

    fn apply(&mut self, action: PanelAction, ctx: &egui::Context) {
        match action {
            PanelAction::LevelMin(text) => {
                self.viewer.set_level_min(&text);
            }
            PanelAction::LevelMax(text) => {
                self.viewer.set_level_max(&text);
            }
            PanelAction::SetRevert(on) => self.viewer.set_revert(on),
            PanelAction::SetInvert(on) => self.viewer.set_invert(on),
            PanelAction::SetTransfer(kind) => self.viewer.set_transfer_function(kind),
            PanelAction::SetPalette(palette) => self.viewer.set_palette(palette),
            PanelAction::ResetDisplay => self.viewer.reset(),
            PanelAction::Copy => ctx.copy_image(self.viewer.copy_image()),
            PanelAction::Step(step) => self.viewer.step_channel(step),
            PanelAction::Jump(edge) => self.viewer.jump_channel(edge),
            PanelAction::SetChannel(n) => self.viewer.set_channel(n),
        }
    }

    /// Copy the controller's level texts into the edit buffers
    pub fn sync_level_fields(&mut self) {
        self.level_min_edit = self.viewer.level_min_text().to_string();
        self.level_max_edit = self.viewer.level_max_text().to_string();
    }

    fn rebuild_texture(&mut self, ctx: &egui::Context) {
        self.texture = Some(ctx.load_texture(
            "channel_map",
            self.viewer.copy_image(),
            TextureOptions::NEAREST,
        ));
    }

    /// Page Up/Down step through channels, Home/End jump to the ends.
    /// Ignored while a text field has focus.
    fn handle_keyboard_input(&self, ctx: &egui::Context, actions: &mut Vec<PanelAction>) {
        if ctx.wants_keyboard_input() {
            return;
        }
        ctx.input(|i| {
            if i.key_pressed(Key::PageUp) {
                actions.push(PanelAction::Step(Step::Next));
            }
            if i.key_pressed(Key::PageDown) {
                actions.push(PanelAction::Step(Step::Previous));
            }
            if i.key_pressed(Key::Home) {
                actions.push(PanelAction::Jump(Edge::First));
            }
            if i.key_pressed(Key::End) {
                actions.push(PanelAction::Jump(Edge::Last));
            }
        });
    }

    /// Min/Max levels, rev/inv flags, transfer function and reset
    fn render_settings_row(&mut self, ui: &mut Ui, actions: &mut Vec<PanelAction>) {
        let state = self.viewer.state().clone();

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 5.0;

            ui.label("Min:");
            let min_field = ui.add(
                egui::TextEdit::singleline(&mut self.level_min_edit).desired_width(LEVEL_FIELD_WIDTH),
            );
            if min_field.lost_focus() {
                actions.push(PanelAction::LevelMin(self.level_min_edit.clone()));
            }

            ui.label("Max:");
            let max_field = ui.add(
                egui::TextEdit::singleline(&mut self.level_max_edit).desired_width(LEVEL_FIELD_WIDTH),
            );
            if max_field.lost_focus() {
                actions.push(PanelAction::LevelMax(self.level_max_edit.clone()));
            }

            let mut revert = state.revert;
            if ui.checkbox(&mut revert, "rev").changed() {
                actions.push(PanelAction::SetRevert(revert));
            }
            let mut invert = state.invert;
            if ui.checkbox(&mut invert, "inv").changed() {
                actions.push(PanelAction::SetInvert(invert));
            }

            let mut transfer = state.transfer;
            egui::ComboBox::from_id_salt("transfer_function")
                .selected_text(transfer.name())
                .show_ui(ui, |ui| {
                    for &kind in TransferFunction::all() {
                        ui.selectable_value(&mut transfer, kind, kind.name());
                    }
                });
            if transfer != state.transfer {
                actions.push(PanelAction::SetTransfer(transfer));
            }

            let reset_enabled = !state.is_display_default();
            if ui
                .add_enabled(reset_enabled, egui::Button::new("Reset"))
                .on_hover_text("Reset display settings")
                .clicked()
            {
                actions.push(PanelAction::ResetDisplay);
            }
        });
    }

    /// The channel map itself, with hover read-out and context menu
    fn render_viewport(&mut self, ui: &mut Ui, actions: &mut Vec<PanelAction>) {
        let (width, height) = self.viewer.config().viewport_size();
        let (rect, response) =
            ui.allocate_exact_size(egui::vec2(width as f32, height as f32), Sense::click());
        let painter = ui.painter_at(rect);

        if let Some(texture) = &self.texture {
            painter.image(
                texture.id(),
                rect,
                egui::Rect::from_min_max(egui::pos2(0.0, 0.0), egui::pos2(1.0, 1.0)),
                Color32::WHITE,
            );
        }

        if !self.viewer.has_data() {
            painter.text(
                rect.center(),
                egui::Align2::CENTER_CENTER,
                "No data loaded",
                egui::FontId::default(),
                ui.style().visuals.text_color(),
            );
        }

        if let Some(hover_pos) = response.hover_pos() {
            let local = hover_pos - rect.min;
            self.viewer.pointer_moved(local.x as f64, local.y as f64);
        }

        let current = self.viewer.state().palette;
        response.context_menu(|ui| {
            if ui.button("Copy").clicked() {
                actions.push(PanelAction::Copy);
                ui.close();
            }
            ui.separator();
            ui.menu_button("Colour Scale", |ui| {
                for &palette in Palette::all() {
                    if ui.selectable_label(current == palette, palette.name()).clicked() {
                        actions.push(PanelAction::SetPalette(palette));
                        ui.close();
                    }
                }
            });
        });
    }

    /// First/previous/next/last buttons, channel number and slider
    fn render_navigation_row(&self, ui: &mut Ui, actions: &mut Vec<PanelAction>) {
        let enabled = self.viewer.navigation_enabled();

        ui.horizontal(|ui| {
            ui.spacing_mut().item_spacing.x = 5.0;

            let buttons = [
                ("|<", "First channel", PanelAction::Jump(Edge::First)),
                ("<", "Previous channel", PanelAction::Step(Step::Previous)),
            ];
            for (label, tip, action) in buttons {
                if ui.add_enabled(enabled, egui::Button::new(label)).on_hover_text(tip).clicked() {
                    actions.push(action);
                }
            }

            ui.label(self.viewer.channel_text());

            let buttons = [
                (">", "Next channel", PanelAction::Step(Step::Next)),
                (">|", "Last channel", PanelAction::Jump(Edge::Last)),
            ];
            for (label, tip, action) in buttons {
                if ui.add_enabled(enabled, egui::Button::new(label)).on_hover_text(tip).clicked() {
                    actions.push(action);
                }
            }

            let mut channel = self.viewer.current_channel();
            let last = self.viewer.channel_count().saturating_sub(1);
            let slider = egui::Slider::new(&mut channel, 0..=last).show_value(false);
            if ui.add_enabled(enabled, slider).changed() {
                actions.push(PanelAction::SetChannel(channel));
            }
        });
    }
}

/// Remembers the display state last reported to a host so each change is
/// reported once.
#[derive(Default)]
pub struct StateReporter {
    last_reported: Option<(DisplayState, bool)>,
}

impl StateReporter {
    /// If the widget's state moved since the last report, take a snapshot and
    /// pass it to `deliver`. The widget is no longer borrowed when `deliver`
    /// runs, so it may drive the widget again. Returns whether it reported.
    pub fn report<S>(
        &mut self,
        widget: &RefCell<ChannelViewerWidget>,
        snapshot: impl FnOnce(&ChannelViewer) -> S,
        deliver: impl FnOnce(S),
    ) -> bool {
        let (current, snap) = {
            let widget = widget.borrow();
            let viewer = widget.viewer();
            let current = (viewer.state().clone(), viewer.has_data());
            if self.last_reported.as_ref() == Some(&current) {
                return false;
            }
            (current, snapshot(viewer))
        };
        self.last_reported = Some(current);
        deliver(snap);
        true
    }
}
