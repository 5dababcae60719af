//! Virtual resolution and the texture-to-virtual-unit scale.
//!
//! Game code positions sprites in a device-independent coordinate space.
//! Texture pixel sizes are converted into that space with a single global
//! factor, [`Sizes::texture_scale`].

use bevy_ecs::prelude::Resource;

use crate::resources::engineconfig::EngineConfig;

/// Provides the factor applied to raw texture pixel sizes.
pub trait TextureScale {
    fn texture_scale(&self) -> f32;
}

impl TextureScale for f32 {
    fn texture_scale(&self) -> f32 {
        *self
    }
}

#[derive(Resource, Debug, Clone, Copy, PartialEq)]
pub struct Sizes {
    pub virtual_width: f32,
    pub virtual_height: f32,
    pub texture_scale: f32,
}

impl Default for Sizes {
    fn default() -> Self {
        Self {
            virtual_width: 640.0,
            virtual_height: 360.0,
            texture_scale: 1.0,
        }
    }
}

impl Sizes {
    pub fn new(virtual_width: f32, virtual_height: f32, texture_scale: f32) -> Self {
        Self {
            virtual_width,
            virtual_height,
            texture_scale,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(
            config.virtual_width as f32,
            config.virtual_height as f32,
            config.texture_scale,
        )
    }
}

impl TextureScale for Sizes {
    fn texture_scale(&self) -> f32 {
        self.texture_scale
    }
}
