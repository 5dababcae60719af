//! Textured quad with an affine transform.
//!
//! A [`Sprite`] references its texture weakly. Each frame the caller mutates
//! the transform through the setters and calls [`Sprite::render`], which
//! computes the four corners and submits them as one quad.
//!
//! Quad construction, in local space with the unscaled top-left at `(0, 0)`:
//!
//! ```text
//!  P1 (0, 0) ─────────────── P4 (w·sx, 0)
//!   │                          │
//!   │                          │
//!  P2 (0, h·sy) ──────────── P3 (w·sx, h·sy)
//! ```
//!
//! 1. subtract the scaled origin `(ox·sx, oy·sy)` from every corner
//! 2. rotate about `(0, 0)` (the origin point) when the angle is non-zero
//! 3. translate by the sprite position
//! 4. pair with UVs: P1→(u1,v2), P2→(u1,v1), P3→(u2,v1), P4→(u2,v2)
//!
//! The texture V axis runs opposite to screen Y, hence the V flip in step 4.

use std::sync::{Arc, Weak};

use bevy_ecs::prelude::Component;
use glam::Vec2;
use log::error;
use thiserror::Error;

use crate::backend::renderer::{QuadRenderer, QuadVertex};
use crate::components::tint::Tint;
use crate::resources::assetstore::{AssetId, AssetResolver, ResolvedAsset};
use crate::resources::sizes::TextureScale;
use crate::resources::texture::{Texture, TextureRegion, UvRect};

#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SpriteError {
    #[error("Attempt to render invalid sprite")]
    InvalidTexture,
}

/// Sprite identified by a weak texture reference, a transform and a tint.
///
/// Position, size and origin are in virtual-resolution units. The angle is in
/// degrees, counter-clockwise positive in the rotation formula.
#[derive(Component, Clone, Debug)]
pub struct Sprite {
    texture: Weak<Texture>,
    position: Vec2,
    origin: Vec2,
    size: Vec2,
    scale: Vec2,
    angle: f32,
    uv: UvRect,
    color: Tint,
}

impl Default for Sprite {
    fn default() -> Self {
        Self {
            texture: Weak::new(),
            position: Vec2::ZERO,
            origin: Vec2::ZERO,
            size: Vec2::ZERO,
            scale: Vec2::ONE,
            angle: 0.0,
            uv: UvRect::FULL,
            color: Tint::WHITE,
        }
    }
}

impl Sprite {
    /// Build a sprite from an asset id.
    ///
    /// Textures sample the full UV range; regions use their own UV window.
    /// The size is the pixel size times the texture scale, floored. Ids that
    /// are neither produce an inert sprite and an error in the log.
    pub fn from_asset(id: AssetId, assets: &impl AssetResolver, sizes: &impl TextureScale) -> Self {
        match assets.resolve(id) {
            ResolvedAsset::Texture(texture) => match texture.upgrade() {
                Some(texture) => Self::from_texture(&texture, sizes),
                None => Self::default(),
            },
            ResolvedAsset::Region(region) => match region.upgrade() {
                Some(region) => Self::from_region(&region, sizes),
                None => Self::default(),
            },
            ResolvedAsset::NotFound => {
                error!("Asset with id \"{}\" is not texture or texture region", id);
                Self::default()
            }
        }
    }

    /// Sprite showing the whole of `texture`.
    pub fn from_texture(texture: &Arc<Texture>, sizes: &impl TextureScale) -> Self {
        let scale = sizes.texture_scale();
        Self {
            texture: Arc::downgrade(texture),
            size: Vec2::new(
                (texture.width() as f32 * scale).floor(),
                (texture.height() as f32 * scale).floor(),
            ),
            uv: UvRect::FULL,
            ..Self::default()
        }
    }

    /// Sprite showing `region` of its texture.
    pub fn from_region(region: &TextureRegion, sizes: &impl TextureScale) -> Self {
        let scale = sizes.texture_scale();
        Self {
            texture: region.texture(),
            size: Vec2::new(
                (region.width() * scale).floor(),
                (region.height() * scale).floor(),
            ),
            uv: region.uv(),
            ..Self::default()
        }
    }

    /// The referenced texture, if it is still alive.
    pub fn texture(&self) -> Option<Arc<Texture>> {
        self.texture.upgrade()
    }

    /// Whether the texture reference is still alive.
    pub fn is_valid(&self) -> bool {
        self.texture.strong_count() > 0
    }

    pub fn uv(&self) -> UvRect {
        self.uv
    }

    pub fn set_uv(&mut self, uv: UvRect) {
        self.uv = uv;
    }

    pub fn x(&self) -> f32 {
        self.position.x
    }

    pub fn y(&self) -> f32 {
        self.position.y
    }

    pub fn set_x(&mut self, x: f32) {
        self.position.x = x;
    }

    pub fn set_y(&mut self, y: f32) {
        self.position.y = y;
    }

    pub fn pos(&self) -> Vec2 {
        self.position
    }

    pub fn set_pos(&mut self, x: f32, y: f32) {
        self.set_x(x);
        self.set_y(y);
    }

    pub fn width(&self) -> f32 {
        self.size.x
    }

    pub fn height(&self) -> f32 {
        self.size.y
    }

    pub fn set_width(&mut self, width: f32) {
        self.size.x = width;
    }

    pub fn set_height(&mut self, height: f32) {
        self.size.y = height;
    }

    pub fn size(&self) -> Vec2 {
        self.size
    }

    pub fn set_size(&mut self, width: f32, height: f32) {
        self.set_width(width);
        self.set_height(height);
    }

    pub fn origin_x(&self) -> f32 {
        self.origin.x
    }

    pub fn origin_y(&self) -> f32 {
        self.origin.y
    }

    pub fn set_origin_x(&mut self, origin_x: f32) {
        self.origin.x = origin_x;
    }

    pub fn set_origin_y(&mut self, origin_y: f32) {
        self.origin.y = origin_y;
    }

    pub fn origin(&self) -> Vec2 {
        self.origin
    }

    pub fn set_origin(&mut self, origin_x: f32, origin_y: f32) {
        self.set_origin_x(origin_x);
        self.set_origin_y(origin_y);
    }

    /// Put the origin at the center of the current size.
    pub fn set_origin_to_center(&mut self) {
        self.set_origin(self.size.x / 2.0, self.size.y / 2.0);
    }

    pub fn scale_x(&self) -> f32 {
        self.scale.x
    }

    pub fn scale_y(&self) -> f32 {
        self.scale.y
    }

    pub fn set_scale_x(&mut self, scale_x: f32) {
        self.scale.x = scale_x;
    }

    pub fn set_scale_y(&mut self, scale_y: f32) {
        self.scale.y = scale_y;
    }

    /// Uniform scale on both axes.
    pub fn set_scale(&mut self, scale: f32) {
        self.set_scale_x(scale);
        self.set_scale_y(scale);
    }

    /// Rotation angle in degrees.
    pub fn angle(&self) -> f32 {
        self.angle
    }

    /// Set rotation angle in degrees.
    pub fn set_angle(&mut self, angle: f32) {
        self.angle = angle;
    }

    /// Set the color from 0–255 channel values. Alpha is untouched.
    pub fn set_color(&mut self, r: f32, g: f32, b: f32) {
        self.color.set_rgb255(r, g, b);
    }

    /// Color channels as 0–255 values.
    pub fn color(&self) -> (f32, f32, f32) {
        self.color.to_rgb255()
    }

    pub fn set_alpha(&mut self, alpha: f32) {
        self.color.a = alpha;
    }

    pub fn alpha(&self) -> f32 {
        self.color.a
    }

    /// Normalized tint handed to the renderer.
    pub fn tint(&self) -> Tint {
        self.color
    }

    /// Corners P1..P4 of the transformed quad with their UVs.
    pub fn quad(&self) -> [QuadVertex; 4] {
        let w = self.size.x * self.scale.x;
        let h = self.size.y * self.scale.y;
        let offset = self.origin * self.scale;

        let mut corners = [
            Vec2::new(0.0, 0.0) - offset,
            Vec2::new(0.0, h) - offset,
            Vec2::new(w, h) - offset,
            Vec2::new(w, 0.0) - offset,
        ];

        if self.angle != 0.0 {
            let (sin, cos) = self.angle.to_radians().sin_cos();
            for corner in &mut corners {
                *corner = Vec2::new(
                    corner.x * cos - corner.y * sin,
                    corner.x * sin + corner.y * cos,
                );
            }
        }

        let UvRect { u1, v1, u2, v2 } = self.uv;
        let [p1, p2, p3, p4] = corners.map(|corner| corner + self.position);
        [
            QuadVertex::new(p1.x, p1.y, u1, v2),
            QuadVertex::new(p2.x, p2.y, u1, v1),
            QuadVertex::new(p3.x, p3.y, u2, v1),
            QuadVertex::new(p4.x, p4.y, u2, v2),
        ]
    }

    /// Submit the quad to `renderer`.
    ///
    /// An expired texture reference makes this a logged no-op.
    pub fn render(&self, renderer: &mut dyn QuadRenderer) -> Result<(), SpriteError> {
        let Some(texture) = self.texture.upgrade() else {
            error!("Attempt to render invalid sprite");
            return Err(SpriteError::InvalidTexture);
        };
        renderer.draw_quad(&texture, &self.quad(), self.color);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f32 = 1e-4;

    fn approx_eq(a: f32, b: f32) -> bool {
        (a - b).abs() < EPSILON
    }

    fn assert_corner(v: &QuadVertex, x: f32, y: f32) {
        assert!(
            approx_eq(v.x, x) && approx_eq(v.y, y),
            "expected ({x}, {y}), got ({}, {})",
            v.x,
            v.y
        );
    }

    fn sized(w: f32, h: f32) -> Sprite {
        let mut s = Sprite::default();
        s.set_size(w, h);
        s
    }

    #[test]
    fn defaults() {
        let s = Sprite::default();
        assert_eq!(s.scale_x(), 1.0);
        assert_eq!(s.scale_y(), 1.0);
        assert_eq!(s.angle(), 0.0);
        assert_eq!(s.uv(), UvRect::FULL);
        assert_eq!(s.alpha(), 1.0);
        assert!(!s.is_valid());
    }

    #[test]
    fn unrotated_quad_is_translated_rectangle() {
        let mut s = sized(10.0, 20.0);
        s.set_pos(100.0, 50.0);
        let q = s.quad();
        assert_corner(&q[0], 100.0, 50.0);
        assert_corner(&q[1], 100.0, 70.0);
        assert_corner(&q[2], 110.0, 70.0);
        assert_corner(&q[3], 110.0, 50.0);
    }

    #[test]
    fn origin_is_scaled_with_sprite() {
        let mut s = sized(10.0, 10.0);
        s.set_origin(5.0, 5.0);
        s.set_scale(2.0);
        let q = s.quad();
        assert_corner(&q[0], -10.0, -10.0);
        assert_corner(&q[2], 10.0, 10.0);
    }

    #[test]
    fn rotation_pivots_on_origin() {
        let mut s = sized(10.0, 10.0);
        s.set_origin_to_center();
        s.set_angle(90.0);
        s.set_pos(50.0, 50.0);
        let q = s.quad();
        // P1 (-5,-5) rotated by 90° becomes (5,-5).
        assert_corner(&q[0], 55.0, 45.0);
        // P3 (5,5) becomes (-5,5).
        assert_corner(&q[2], 45.0, 55.0);
    }

    #[test]
    fn rotation_without_origin_pivots_on_top_left() {
        let mut s = sized(10.0, 0.0);
        s.set_angle(90.0);
        let q = s.quad();
        assert_corner(&q[0], 0.0, 0.0);
        assert_corner(&q[3], 0.0, 10.0);
    }

    #[test]
    fn uv_mapping_flips_v() {
        let mut s = sized(3.0, 4.0);
        s.set_uv(UvRect::new(0.1, 0.2, 0.3, 0.4));
        let q = s.quad();
        assert_eq!((q[0].u, q[0].v), (0.1, 0.4));
        assert_eq!((q[1].u, q[1].v), (0.1, 0.2));
        assert_eq!((q[2].u, q[2].v), (0.3, 0.2));
        assert_eq!((q[3].u, q[3].v), (0.3, 0.4));
    }

    #[test]
    fn origin_to_center_uses_current_size() {
        let mut s = sized(32.0, 32.0);
        s.set_size(200.0, 100.0);
        s.set_origin_to_center();
        assert_eq!(s.origin(), Vec2::new(100.0, 50.0));
    }

    #[test]
    fn set_scale_sets_both_axes() {
        let mut s = Sprite::default();
        s.set_scale(3.0);
        assert_eq!((s.scale_x(), s.scale_y()), (3.0, 3.0));
        s.set_scale_y(0.5);
        assert_eq!((s.scale_x(), s.scale_y()), (3.0, 0.5));
    }

    #[test]
    fn color_round_trips_through_normalized_tint() {
        let mut s = Sprite::default();
        s.set_alpha(0.5);
        s.set_color(255.0, 128.0, 0.0);
        let (r, g, b) = s.color();
        assert!((r - 255.0).abs() < 1e-3);
        assert!((g - 128.0).abs() < 1e-3);
        assert!(b.abs() < 1e-3);
        assert_eq!(s.alpha(), 0.5);
        assert!((s.tint().g - 128.0 / 255.0).abs() < 1e-6);
    }

    #[test]
    fn render_without_texture_is_an_error() {
        struct Panicking;
        impl QuadRenderer for Panicking {
            fn draw_quad(&mut self, _: &Texture, _: &[QuadVertex; 4], _: Tint) {
                panic!("must not draw");
            }
        }
        let s = sized(1.0, 1.0);
        assert_eq!(s.render(&mut Panicking), Err(SpriteError::InvalidTexture));
    }
}
