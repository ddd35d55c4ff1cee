//! Colour lookup tables
//!
//! A [`Lut`] maps an 8-bit palette index to an RGB colour. Tables are rebuilt
//! whenever the palette or the invert flag changes.

use rand::Rng;
use rand_chacha::rand_core::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

/// Number of entries in every lookup table
pub const LUT_SIZE: usize = 256;

/// Seed for the random palette, reused on every rebuild
pub const RANDOM_SEED: u64 = 10;

/// Available palettes
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Palette {
    Greyscale,
    #[default]
    Rainbow,
    /// Reproducible pseudo-random colours, useful for mask and label cubes
    Random,
}

impl Palette {
    /// Get display name for UI
    pub fn name(&self) -> &'static str {
        match self {
            Palette::Greyscale => "Greyscale",
            Palette::Rainbow => "Rainbow",
            Palette::Random => "Random",
        }
    }

    /// Parse a display name back, case-insensitively
    pub fn from_name(name: &str) -> Option<Self> {
        Self::all()
            .iter()
            .copied()
            .find(|palette| palette.name().eq_ignore_ascii_case(name.trim()))
    }

    /// All palettes in menu order
    pub fn all() -> &'static [Palette] {
        &[Palette::Greyscale, Palette::Rainbow, Palette::Random]
    }
}

/// XOR mask for the invert and revert flags
pub fn flag_mask(enabled: bool) -> u8 {
    if enabled {
        0xFF
    } else {
        0x00
    }
}

/// A 256-entry RGB table
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Lut {
    entries: [[u8; 3]; LUT_SIZE],
}

impl Default for Lut {
    fn default() -> Self {
        Self::build(Palette::default(), false)
    }
}

impl Lut {
    /// Generate the table for `palette`, optionally with every channel inverted
    pub fn build(palette: Palette, invert: bool) -> Self {
        let mask = flag_mask(invert);
        let mut entries = [[0u8; 3]; LUT_SIZE];

        match palette {
            Palette::Greyscale => {
                for (i, entry) in entries.iter_mut().enumerate() {
                    let v = i as u8;
                    *entry = [v, v, v];
                }
            }
            Palette::Rainbow => {
                for (i, entry) in entries.iter_mut().enumerate() {
                    *entry = rainbow(i);
                }
            }
            Palette::Random => {
                let mut rng = ChaCha8Rng::seed_from_u64(RANDOM_SEED);
                for entry in entries.iter_mut() {
                    *entry = [rng.gen(), rng.gen(), rng.gen()];
                }
            }
        }

        for entry in entries.iter_mut() {
            for channel in entry.iter_mut() {
                *channel ^= mask;
            }
        }

        Self { entries }
    }

    /// All entries in index order
    pub fn entries(&self) -> &[[u8; 3]; LUT_SIZE] {
        &self.entries
    }

    /// RGB triple for a palette index
    pub fn rgb(&self, index: u8) -> [u8; 3] {
        self.entries[index as usize]
    }

    /// Always [`LUT_SIZE`]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Never true; a table always has [`LUT_SIZE`] entries
    pub fn is_empty(&self) -> bool {
        false
    }
}

/// Four-band ramp: blue, cyan, green, yellow, red
fn rainbow(i: usize) -> [u8; 3] {
    let i = i as f64;
    if i < 50.0 {
        [0, (255.0 * i / 50.0) as u8, 255]
    } else if i < 125.0 {
        [0, 255, (255.0 * (125.0 - i) / 75.0) as u8]
    } else if i < 180.0 {
        [(255.0 * (i - 125.0) / 55.0) as u8, 255, 0]
    } else {
        [255, (255.0 * (255.0 - i) / 75.0) as u8, 0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_table_has_256_entries() {
        for &palette in Palette::all() {
            for invert in [false, true] {
                assert_eq!(Lut::build(palette, invert).len(), LUT_SIZE);
            }
        }
    }

    #[test]
    fn test_greyscale_is_identity() {
        let lut = Lut::build(Palette::Greyscale, false);
        for i in 0..=255u8 {
            assert_eq!(lut.rgb(i), [i, i, i]);
        }
    }

    #[test]
    fn test_invert_flips_every_channel() {
        for &palette in Palette::all() {
            let plain = Lut::build(palette, false);
            let inverted = Lut::build(palette, true);
            for (a, b) in plain.entries().iter().zip(inverted.entries()) {
                for c in 0..3 {
                    assert_eq!(b[c], 255 - a[c], "{palette:?}");
                }
            }
        }
    }

    #[test]
    fn test_rainbow_band_edges() {
        let lut = Lut::build(Palette::Rainbow, false);
        assert_eq!(lut.rgb(0), [0, 0, 255]);
        assert_eq!(lut.rgb(25), [0, 127, 255]);
        assert_eq!(lut.rgb(49), [0, 249, 255]);
        assert_eq!(lut.rgb(50), [0, 255, 255]);
        assert_eq!(lut.rgb(124), [0, 255, 3]);
        assert_eq!(lut.rgb(125), [0, 255, 0]);
        assert_eq!(lut.rgb(179), [250, 255, 0]);
        assert_eq!(lut.rgb(180), [255, 255, 0]);
        assert_eq!(lut.rgb(255), [255, 0, 0]);
    }

    #[test]
    fn test_random_is_reproducible() {
        let first = Lut::build(Palette::Random, false);
        let second = Lut::build(Palette::Random, false);
        assert_eq!(first, second);
        // Not a degenerate table
        assert_ne!(first.rgb(0), first.rgb(1));
        assert_ne!(first, Lut::build(Palette::Greyscale, false));
    }

    #[test]
    fn test_default_is_rainbow() {
        assert_eq!(Lut::default(), Lut::build(Palette::Rainbow, false));
    }

    #[test]
    fn test_palette_names() {
        for &palette in Palette::all() {
            assert_eq!(Palette::from_name(palette.name()), Some(palette));
        }
        assert_eq!(Palette::from_name("rainbow"), Some(Palette::Rainbow));
        assert_eq!(Palette::from_name("viridis"), None);
    }
}
