//! eframe application shell hosting a single channel-map panel

use std::cell::RefCell;
use std::rc::Rc;

use crate::widget::{ChannelViewerWidget, StateReporter};
use crate::ViewerCallbacks;

/// The egui application for the viewer
pub struct ViewerApp {
    widget: Rc<RefCell<ChannelViewerWidget>>,
    callbacks: Rc<RefCell<ViewerCallbacks>>,
    /// Tracks what was last reported to JavaScript
    reporter: StateReporter,
}

impl ViewerApp {
    pub fn new(
        _cc: &eframe::CreationContext<'_>,
        widget: Rc<RefCell<ChannelViewerWidget>>,
        callbacks: Rc<RefCell<ViewerCallbacks>>,
    ) -> Self {
        Self {
            widget,
            callbacks,
            reporter: StateReporter::default(),
        }
    }

    /// Fire `onStateChange` if the display state moved since the last report
    fn notify_state_change(&mut self) {
        let callback = self.callbacks.borrow().on_state_change.clone();
        self.reporter.report(&self.widget, crate::state_to_js, |snapshot| {
            if let Some(callback) = callback {
                if let Err(err) = callback.call1(&wasm_bindgen::JsValue::NULL, &snapshot) {
                    log::warn!("onStateChange callback failed: {err:?}");
                }
            }
        });
    }
}

impl eframe::App for ViewerApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        egui::CentralPanel::default().show(ctx, |ui| {
            self.widget.borrow_mut().show(ui);
        });

        self.notify_state_change();

        // Handle calls from JavaScript may have changed the state between frames
        ctx.request_repaint();
    }
}
