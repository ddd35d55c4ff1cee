//! chanmap - Channel-map viewer for data cubes
//!
//! Renders one 2-D channel of a 1 to 4 dimensional data cube into a
//! fixed-size viewport, with adjustable display levels, transfer functions
//! (linear/sqrt/log) and colour lookup tables (greyscale/rainbow/random with
//! invert and revert flags). Pointer positions are mapped back to the cube to
//! report the value under the cursor.
//!
//! ## Architecture
//!
//! - [`transfer`], [`lut`], [`transform`], [`raster`]: the pure colouring
//!   pipeline, usable without any UI
//! - [`ChannelViewer`]: display-state controller driven by UI events
//! - [`ChannelViewerWidget`]: egui panel wrapping the controller
//! - `ViewerApp`: Thin eframe App shell that hosts the widget (wasm32)
//! - `ChannelViewerHandle`: WASM interface for JavaScript to control the viewer

#[cfg(target_arch = "wasm32")]
use std::cell::RefCell;
#[cfg(target_arch = "wasm32")]
use std::rc::Rc;
#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;
#[cfg(target_arch = "wasm32")]
use web_sys::HtmlCanvasElement;

#[cfg(target_arch = "wasm32")]
mod app;
pub mod config;
pub mod controller;
pub mod cube;
pub mod error;
pub mod lut;
pub mod raster;
pub mod state;
pub mod transfer;
pub mod transform;
pub mod widget;

#[cfg(target_arch = "wasm32")]
use app::ViewerApp;

pub use config::ViewerConfig;
pub use controller::{ChannelViewer, Edge, Step};
pub use cube::{ArrayCube, DataCube};
pub use error::CubeError;
pub use lut::{Lut, Palette};
pub use raster::{render_channel, ChannelMap};
pub use state::DisplayState;
pub use transfer::{grey, TransferFunction};
pub use transform::ViewTransform;
pub use widget::ChannelViewerWidget;

/// Callbacks that can be registered from JavaScript
#[cfg(target_arch = "wasm32")]
#[derive(Default)]
pub struct ViewerCallbacks {
    /// Called when the display state changes (levels, channel, palette, flags)
    pub on_state_change: Option<js_sys::Function>,
}

/// A handle to a viewer instance. Each handle manages its own canvas and state.
///
/// This struct is exposed to JavaScript and provides the viewer's event
/// interface. It shares the widget with the running `ViewerApp`.
#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub struct ChannelViewerHandle {
    widget: Rc<RefCell<ChannelViewerWidget>>,
    callbacks: Rc<RefCell<ViewerCallbacks>>,
    /// The eframe runner (kept alive to maintain the render loop)
    runner: eframe::WebRunner,
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
impl ChannelViewerHandle {
    /// Create a new viewer attached to the given canvas element, with a
    /// viewport of `viewport_width` x `viewport_height` screen pixels.
    #[wasm_bindgen]
    pub async fn create(
        canvas: HtmlCanvasElement,
        viewport_width: Option<u32>,
        viewport_height: Option<u32>,
    ) -> Result<ChannelViewerHandle, JsValue> {
        #[cfg(debug_assertions)]
        {
            eframe::WebLogger::init(log::LevelFilter::Debug).ok();
        }
        #[cfg(not(debug_assertions))]
        {
            eframe::WebLogger::init(log::LevelFilter::Warn).ok();
        }

        let defaults = ViewerConfig::default();
        let config = ViewerConfig {
            viewport_width: viewport_width.map_or(defaults.viewport_width, |w| w as usize),
            viewport_height: viewport_height.map_or(defaults.viewport_height, |h| h as usize),
            ..defaults
        };

        let widget = Rc::new(RefCell::new(ChannelViewerWidget::new(config)));
        let widget_for_app = widget.clone();
        let callbacks = Rc::new(RefCell::new(ViewerCallbacks::default()));
        let callbacks_for_app = callbacks.clone();

        let runner = eframe::WebRunner::new();
        runner
            .start(
                canvas,
                eframe::WebOptions::default(),
                Box::new(move |cc| {
                    Ok(Box::new(ViewerApp::new(
                        cc,
                        widget_for_app.clone(),
                        callbacks_for_app.clone(),
                    )))
                }),
            )
            .await?;

        Ok(ChannelViewerHandle {
            widget,
            callbacks,
            runner,
        })
    }

    /// Attach cube data.
    ///
    /// # Arguments
    /// * `buffer` - ArrayBuffer with the raw values, x varying fastest
    /// * `shape` - Axis lengths, x first (1 to 4 axes)
    /// * `array_type` - "i8", "u8", "i16", "u16", "i32", "u32", "i64",
    ///   "u64", "f32" or "f64"
    /// * `declared_min`, `declared_max` - DATAMIN/DATAMAX if known
    /// * `unit` - BUNIT if known
    #[wasm_bindgen(js_name = setCubeData)]
    pub fn set_cube_data(
        &self,
        buffer: &js_sys::ArrayBuffer,
        shape: Vec<u32>,
        array_type: &str,
        declared_min: Option<f64>,
        declared_max: Option<f64>,
        unit: Option<String>,
    ) -> Result<(), JsValue> {
        let values = convert_buffer_to_f64(buffer, array_type)?;
        let shape: Vec<usize> = shape.into_iter().map(|n| n as usize).collect();

        let mut cube = ArrayCube::new(values, &shape).map_err(|e| JsValue::from_str(&e.to_string()))?;
        if let (Some(min), Some(max)) = (declared_min, declared_max) {
            cube = cube.with_declared_range(min, max);
        }
        if let Some(unit) = unit {
            cube = cube.with_unit(unit);
        }

        self.widget.borrow_mut().attach(Box::new(cube));
        Ok(())
    }

    /// Drop the current cube and blank the viewport
    #[wasm_bindgen(js_name = clearData)]
    pub fn clear_data(&self) {
        self.widget.borrow_mut().viewer_mut().detach();
    }

    /// End event loop and release resources
    #[wasm_bindgen(js_name = destroy)]
    pub fn destroy(&self) {
        self.runner.destroy();
    }

    // =========================================================================
    // Channel navigation
    // =========================================================================

    /// Step one channel forward (`true`) or back (`false`)
    #[wasm_bindgen(js_name = stepChannel)]
    pub fn step_channel(&self, forward: bool) {
        let step = if forward { Step::Next } else { Step::Previous };
        self.widget.borrow_mut().viewer_mut().step_channel(step);
    }

    /// Jump to the last (`true`) or first (`false`) channel
    #[wasm_bindgen(js_name = jumpChannel)]
    pub fn jump_channel(&self, last: bool) {
        let edge = if last { Edge::Last } else { Edge::First };
        self.widget.borrow_mut().viewer_mut().jump_channel(edge);
    }

    #[wasm_bindgen(js_name = setChannel)]
    pub fn set_channel(&self, channel: u32) {
        self.widget.borrow_mut().viewer_mut().set_channel(channel as usize);
    }

    #[wasm_bindgen(js_name = getChannel)]
    pub fn get_channel(&self) -> u32 {
        self.widget.borrow().viewer().current_channel() as u32
    }

    #[wasm_bindgen(js_name = getChannelCount)]
    pub fn get_channel_count(&self) -> u32 {
        self.widget.borrow().viewer().channel_count() as u32
    }

    // =========================================================================
    // Levels, colour scale and transfer function
    // =========================================================================

    /// Set the lower display level from text; returns false if rejected
    #[wasm_bindgen(js_name = setLevelMin)]
    pub fn set_level_min(&self, text: &str) -> bool {
        let mut widget = self.widget.borrow_mut();
        let accepted = widget.viewer_mut().set_level_min(text);
        widget.sync_level_fields();
        accepted
    }

    /// Set the upper display level from text; returns false if rejected
    #[wasm_bindgen(js_name = setLevelMax)]
    pub fn set_level_max(&self, text: &str) -> bool {
        let mut widget = self.widget.borrow_mut();
        let accepted = widget.viewer_mut().set_level_max(text);
        widget.sync_level_fields();
        accepted
    }

    /// Display window as [plotMin, plotMax]
    #[wasm_bindgen(js_name = getLevels)]
    pub fn get_levels(&self) -> js_sys::Float64Array {
        let widget = self.widget.borrow();
        let state = widget.viewer().state();
        js_sys::Float64Array::from(&[state.plot_min, state.plot_max][..])
    }

    /// Full data range as [dataMin, dataMax]
    #[wasm_bindgen(js_name = getDataRange)]
    pub fn get_data_range(&self) -> js_sys::Float64Array {
        let widget = self.widget.borrow();
        let state = widget.viewer().state();
        js_sys::Float64Array::from(&[state.data_min, state.data_max][..])
    }

    /// Set palette by name: "Greyscale", "Rainbow" or "Random"
    #[wasm_bindgen(js_name = setPalette)]
    pub fn set_palette(&self, name: &str) -> bool {
        match Palette::from_name(name) {
            Some(palette) => {
                self.widget.borrow_mut().viewer_mut().set_palette(palette);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = getPalette)]
    pub fn get_palette(&self) -> String {
        self.widget.borrow().viewer().state().palette.name().to_string()
    }

    /// Set transfer function by name: "linear", "sqrt" or "log"
    #[wasm_bindgen(js_name = setTransferFunction)]
    pub fn set_transfer_function(&self, name: &str) -> bool {
        match TransferFunction::from_name(name) {
            Some(kind) => {
                self.widget.borrow_mut().viewer_mut().set_transfer_function(kind);
                true
            }
            None => false,
        }
    }

    #[wasm_bindgen(js_name = getTransferFunction)]
    pub fn get_transfer_function(&self) -> String {
        self.widget.borrow().viewer().state().transfer.name().to_string()
    }

    #[wasm_bindgen(js_name = setRevert)]
    pub fn set_revert(&self, revert: bool) {
        self.widget.borrow_mut().viewer_mut().set_revert(revert);
    }

    #[wasm_bindgen(js_name = setInvert)]
    pub fn set_invert(&self, invert: bool) {
        self.widget.borrow_mut().viewer_mut().set_invert(invert);
    }

    /// Restore the full data range and default colour settings
    #[wasm_bindgen(js_name = reset)]
    pub fn reset(&self) {
        let mut widget = self.widget.borrow_mut();
        widget.viewer_mut().reset();
        widget.sync_level_fields();
    }

    /// Status text for a viewport position, as shown on hover
    #[wasm_bindgen(js_name = pointerStatus)]
    pub fn pointer_status(&self, x: f64, y: f64) -> String {
        self.widget.borrow().viewer().status_at(x, y)
    }

    // =========================================================================
    // Callback registration
    // =========================================================================

    /// Register a callback to be called when the display state changes.
    /// The callback receives an object with the current state:
    /// { channel, channelCount, plotMin, plotMax, dataMin, dataMax, palette,
    ///   transferFunction, revert, invert, hasData }
    #[wasm_bindgen(js_name = onStateChange)]
    pub fn on_state_change(&self, callback: js_sys::Function) {
        self.callbacks.borrow_mut().on_state_change = Some(callback);
    }

    /// Clear all registered callbacks.
    #[wasm_bindgen(js_name = clearCallbacks)]
    pub fn clear_callbacks(&self) {
        self.callbacks.borrow_mut().on_state_change = None;
    }
}

/// Build the JavaScript state object passed to `onStateChange`
#[cfg(target_arch = "wasm32")]
pub(crate) fn state_to_js(viewer: &ChannelViewer) -> JsValue {
    let state = viewer.state();
    let object = js_sys::Object::new();
    let fields: [(&str, JsValue); 11] = [
        ("channel", JsValue::from(viewer.current_channel() as u32)),
        ("channelCount", JsValue::from(viewer.channel_count() as u32)),
        ("plotMin", JsValue::from(state.plot_min)),
        ("plotMax", JsValue::from(state.plot_max)),
        ("dataMin", JsValue::from(state.data_min)),
        ("dataMax", JsValue::from(state.data_max)),
        ("palette", JsValue::from_str(state.palette.name())),
        ("transferFunction", JsValue::from_str(state.transfer.name())),
        ("revert", JsValue::from(state.revert)),
        ("invert", JsValue::from(state.invert)),
        ("hasData", JsValue::from(viewer.has_data())),
    ];
    for (key, value) in fields {
        // Setting a property on a fresh plain object cannot fail
        let _ = js_sys::Reflect::set(&object, &JsValue::from_str(key), &value);
    }
    object.into()
}

/// Convert a JavaScript ArrayBuffer to Vec<f64> based on a Rust-style type name.
#[cfg(target_arch = "wasm32")]
fn convert_buffer_to_f64(buffer: &js_sys::ArrayBuffer, array_type: &str) -> Result<Vec<f64>, JsValue> {
    let values = match array_type {
        "i8" => js_sys::Int8Array::new(buffer).to_vec().into_iter().map(f64::from).collect(),
        "u8" => js_sys::Uint8Array::new(buffer).to_vec().into_iter().map(f64::from).collect(),
        "i16" => js_sys::Int16Array::new(buffer).to_vec().into_iter().map(f64::from).collect(),
        "u16" => js_sys::Uint16Array::new(buffer).to_vec().into_iter().map(f64::from).collect(),
        "i32" => js_sys::Int32Array::new(buffer).to_vec().into_iter().map(f64::from).collect(),
        "u32" => js_sys::Uint32Array::new(buffer).to_vec().into_iter().map(f64::from).collect(),
        "f32" => js_sys::Float32Array::new(buffer).to_vec().into_iter().map(f64::from).collect(),
        "f64" => js_sys::Float64Array::new(buffer).to_vec(),
        // 64-bit integers may lose precision above 2^53
        "i64" => {
            let view = js_sys::BigInt64Array::new(buffer);
            (0..view.length()).map(|i| view.get_index(i) as f64).collect()
        }
        "u64" => {
            let view = js_sys::BigUint64Array::new(buffer);
            (0..view.length()).map(|i| view.get_index(i) as f64).collect()
        }
        other => return Err(JsValue::from_str(&format!("Unsupported array type: {other}"))),
    };
    Ok(values)
}
