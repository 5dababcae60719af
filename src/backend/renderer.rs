//! Quad draw submission contract.

use serde::Serialize;

use crate::components::tint::Tint;
use crate::resources::texture::Texture;

/// One corner of a quad: screen position plus texture coordinate.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct QuadVertex {
    pub x: f32,
    pub y: f32,
    pub u: f32,
    pub v: f32,
}

impl QuadVertex {
    pub fn new(x: f32, y: f32, u: f32, v: f32) -> Self {
        Self { x, y, u, v }
    }
}

/// Draws already-computed quads. Fire-and-forget.
pub trait QuadRenderer {
    fn draw_quad(&mut self, texture: &Texture, vertices: &[QuadVertex; 4], tint: Tint);
}
