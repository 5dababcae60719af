//! Color tint applied to sprites during rendering.
//!
//! The [`Tint`] is stored normalized (each channel in `[0, 1]`) and is handed
//! to the renderer together with the quad vertices. Scripts and callers work
//! with 0–255 channel values through [`Tint::from_rgb255`] and
//! [`Tint::to_rgb255`].

use serde::{Deserialize, Serialize};

/// Normalized RGBA color used to modulate a sprite's texture.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Tint {
    pub r: f32,
    pub g: f32,
    pub b: f32,
    pub a: f32,
}

impl Tint {
    pub const WHITE: Tint = Tint {
        r: 1.0,
        g: 1.0,
        b: 1.0,
        a: 1.0,
    };

    /// Create a new Tint from normalized RGBA values.
    pub fn new(r: f32, g: f32, b: f32, a: f32) -> Self {
        Self { r, g, b, a }
    }

    /// Create an opaque Tint from 0–255 channel values.
    pub fn from_rgb255(r: f32, g: f32, b: f32) -> Self {
        let mut tint = Self::WHITE;
        tint.set_rgb255(r, g, b);
        tint
    }

    /// Overwrite the color channels from 0–255 values. Alpha is untouched.
    pub fn set_rgb255(&mut self, r: f32, g: f32, b: f32) {
        self.r = r / 255.0;
        self.g = g / 255.0;
        self.b = b / 255.0;
    }

    /// Color channels scaled back to 0–255.
    pub fn to_rgb255(&self) -> (f32, f32, f32) {
        (self.r * 255.0, self.g * 255.0, self.b * 255.0)
    }
}

impl Default for Tint {
    fn default() -> Self {
        Self::WHITE
    }
}
