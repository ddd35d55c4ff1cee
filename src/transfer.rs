//! Transfer functions: raw data value to 8-bit grey level

use serde::{Deserialize, Serialize};

/// Scaling applied between the display window and the colour index
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TransferFunction {
    #[default]
    Linear,
    Sqrt,
    Log,
}

impl TransferFunction {
    /// Get display name for UI
    pub fn name(&self) -> &'static str {
        match self {
            TransferFunction::Linear => "linear",
            TransferFunction::Sqrt => "sqrt",
            TransferFunction::Log => "log",
        }
    }

    /// Parse a display name back, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|kind| kind.name().eq_ignore_ascii_case(name.trim()))
    }

    /// All transfer functions in menu order
    pub fn all() -> &'static [TransferFunction] {
        &[
            TransferFunction::Linear,
            TransferFunction::Sqrt,
            TransferFunction::Log,
        ]
    }
}

/// Map `value` inside the display window `[plot_min, plot_max]` to a grey level.
///
/// Blank (NaN) values and values below the window give 0, values above it give
/// 255. The result is truncated, not rounded. `plot_min < plot_max` is assumed.
pub fn grey(value: f64, plot_min: f64, plot_max: f64, kind: TransferFunction) -> u8 {
    if value.is_nan() || value < plot_min {
        return 0;
    }
    if value > plot_max {
        return 255;
    }

    let range = plot_max - plot_min;
    let level = match kind {
        // Multiply first so exact fractions of the window land on integers
        TransferFunction::Linear => 255.0 * (value - plot_min) / range,
        TransferFunction::Sqrt => 255.0 * ((value - plot_min) / range).sqrt(),
        TransferFunction::Log => 255.0 * (9.0 * (value - plot_min) / range + 1.0).log10(),
    };

    // `as` saturates, which also absorbs a NaN from a zero-width window
    level as u8
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_window_boundaries_are_exact() {
        for &kind in TransferFunction::all() {
            assert_eq!(grey(-3.0, -3.0, 7.5, kind), 0, "{kind:?} at plot_min");
            assert_eq!(grey(7.5, -3.0, 7.5, kind), 255, "{kind:?} at plot_max");
        }
    }

    #[test]
    fn test_outside_window_saturates() {
        for &kind in TransferFunction::all() {
            assert_eq!(grey(-10.0, 0.0, 1.0, kind), 0);
            assert_eq!(grey(10.0, 0.0, 1.0, kind), 255);
            assert_eq!(grey(f64::INFINITY, 0.0, 1.0, kind), 255);
            assert_eq!(grey(f64::NEG_INFINITY, 0.0, 1.0, kind), 0);
        }
    }

    #[test]
    fn test_blank_is_black() {
        for &kind in TransferFunction::all() {
            assert_eq!(grey(f64::NAN, 0.0, 1.0, kind), 0);
            assert_eq!(grey(f64::NAN, -5.0, -4.0, kind), 0);
        }
    }

    #[test]
    fn test_linear_truncates() {
        assert_eq!(grey(2.0, 1.0, 4.0, TransferFunction::Linear), 85);
        assert_eq!(grey(3.0, 1.0, 4.0, TransferFunction::Linear), 170);
        // 127.5 truncates to 127
        assert_eq!(grey(0.5, 0.0, 1.0, TransferFunction::Linear), 127);
    }

    #[test]
    fn test_sqrt_and_log_curves() {
        // 255 * sqrt(0.25) = 127.5
        assert_eq!(grey(0.25, 0.0, 1.0, TransferFunction::Sqrt), 127);
        // 255 * log10(9 * 0.5 + 1) = 188.8...
        assert_eq!(grey(0.5, 0.0, 1.0, TransferFunction::Log), 188);
        // Both curves lift the faint end above linear
        let linear = grey(0.1, 0.0, 1.0, TransferFunction::Linear);
        assert!(grey(0.1, 0.0, 1.0, TransferFunction::Sqrt) > linear);
        assert!(grey(0.1, 0.0, 1.0, TransferFunction::Log) > linear);
    }

    #[test]
    fn test_monotonic_inside_window() {
        let (lo, hi) = (-2.0, 6.0);
        for &kind in TransferFunction::all() {
            let mut previous = 0u8;
            for step in 0..=4000 {
                let value = lo + (hi - lo) * step as f64 / 4000.0;
                let level = grey(value, lo, hi, kind);
                assert!(level >= previous, "{kind:?} decreased at {value}");
                previous = level;
            }
            assert_eq!(previous, 255);
        }
    }

    #[test]
    fn test_log_never_negative_near_plot_min() {
        for exponent in 3..300 {
            let value = 10f64.powi(-exponent);
            assert!((9.0 * value + 1.0).log10() >= 0.0);
            assert_eq!(grey(value, 0.0, 1.0, TransferFunction::Log), 0);
        }
        assert_eq!(grey(0.01, 0.0, 1.0, TransferFunction::Log), 9);
    }

    #[test]
    fn test_names_round_trip() {
        for &kind in TransferFunction::all() {
            assert_eq!(TransferFunction::from_name(kind.name()), Some(kind));
        }
        assert_eq!(TransferFunction::from_name(" SQRT "), Some(TransferFunction::Sqrt));
        assert_eq!(TransferFunction::from_name("gamma"), None);
    }
}
