//! Viewer configuration

use serde::{Deserialize, Serialize};

use crate::transform::DEFAULT_SCALE;

/// Default viewport width in screen pixels
pub const DEFAULT_VIEWPORT_WIDTH: usize = 512;
/// Default viewport height in screen pixels
pub const DEFAULT_VIEWPORT_HEIGHT: usize = 512;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ViewerConfig {
    /// Size of the rendered bitmap; fixed for the lifetime of a viewer
    pub viewport_width: usize,
    pub viewport_height: usize,
    /// Scale used before a cube is attached, and after if fitting is off
    pub initial_scale: f64,
    /// Rescale so the attached image fills the viewport
    pub fit_on_attach: bool,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            viewport_width: DEFAULT_VIEWPORT_WIDTH,
            viewport_height: DEFAULT_VIEWPORT_HEIGHT,
            initial_scale: DEFAULT_SCALE,
            fit_on_attach: true,
        }
    }
}

impl ViewerConfig {
    /// Config with a specific viewport size and default everything else
    pub fn with_viewport(width: usize, height: usize) -> Self {
        Self {
            viewport_width: width,
            viewport_height: height,
            ..Self::default()
        }
    }

    /// Viewport size as (width, height)
    pub fn viewport_size(&self) -> (usize, usize) {
        (self.viewport_width, self.viewport_height)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ViewerConfig::default();
        assert_eq!(config.viewport_size(), (512, 512));
        assert_eq!(config.initial_scale, 2.0);
        assert!(config.fit_on_attach);
    }

    #[test]
    fn test_partial_document_fills_defaults() {
        let config: ViewerConfig =
            serde_json::from_str(r#"{ "viewport_width": 300, "fit_on_attach": false }"#).unwrap();
        assert_eq!(config.viewport_size(), (300, 512));
        assert_eq!(config.initial_scale, 2.0);
        assert!(!config.fit_on_attach);
    }

    #[test]
    fn test_serde_round_trip() {
        let config = ViewerConfig {
            initial_scale: 1.5,
            ..ViewerConfig::with_viewport(640, 480)
        };
        let json = serde_json::to_string(&config).unwrap();
        let back: ViewerConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(back, config);
    }
}
