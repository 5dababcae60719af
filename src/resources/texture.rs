//! GPU textures that survive context loss, and sub-regions of them.
//!
//! A [`Texture`] owns exactly one GPU texture object. Sprites and regions only
//! hold a [`Weak`] reference; when the owning [`Arc`] is dropped the GPU object
//! is released and every weak reference expires.
//!
//! The GPU handle is not the durable part of a texture: mobile and embedded
//! contexts can be torn down by the OS. What persists is the reload path, and
//! [`Texture::reload`] rebuilds the GPU object from it in place. The `Arc`
//! identity never changes, so holders observe the new handle without being
//! told.
//!
//! ```text
//!  Arc<Texture> (AssetStore)          Weak<Texture> (Sprite, TextureRegion)
//!        │                                       │
//!        └──────────────► Texture ◄──────────────┘
//!                          ├─ reload_path: "ui/button.png"
//!                          └─ state: RwLock { handle, width, height, format }
//!                                        ▲
//!                         replaced wholesale on reload
//! ```

use std::fmt;
use std::sync::{Arc, Weak};

use log::{error, info};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::backend::gpu::{GpuBackend, PixelFormat, TextureDesc, TextureFilter, TextureHandle};
use crate::resources::imageloader::{Image, ImageError, ImageLoader};

/// Failure to rebuild a texture from its reload path.
#[derive(Debug, Error)]
pub enum TextureError {
    #[error("cannot load file \"{path}\"")]
    Reload {
        path: String,
        #[source]
        source: ImageError,
    },
}

/// Normalized texture coordinates of a rectangle to sample.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct UvRect {
    pub u1: f32,
    pub v1: f32,
    pub u2: f32,
    pub v2: f32,
}

impl UvRect {
    /// The whole texture.
    pub const FULL: UvRect = UvRect {
        u1: 0.0,
        v1: 0.0,
        u2: 1.0,
        v2: 1.0,
    };

    pub fn new(u1: f32, v1: f32, u2: f32, v2: f32) -> Self {
        Self { u1, v1, u2, v2 }
    }
}

impl Default for UvRect {
    fn default() -> Self {
        Self::FULL
    }
}

#[derive(Debug, Clone, Copy)]
struct TextureState {
    handle: Option<TextureHandle>,
    width: u32,
    height: u32,
    format: PixelFormat,
}

/// A GPU texture object plus what is needed to recreate it.
pub struct Texture {
    gpu: Arc<dyn GpuBackend>,
    state: RwLock<TextureState>,
    reload_path: Option<String>,
}

fn upload(gpu: &dyn GpuBackend, image: &Image) -> TextureHandle {
    let desc = TextureDesc {
        width: image.width(),
        height: image.height(),
        format: image.format(),
        min_filter: TextureFilter::Linear,
        mag_filter: TextureFilter::Linear,
        mipmaps: false,
    };
    gpu.create_texture(&desc, image.data())
}

impl Texture {
    /// Upload `image` as a new texture.
    ///
    /// The texture has no reload path: [`reload`](Texture::reload) is a no-op
    /// until one is attached with [`with_reload_path`](Texture::with_reload_path).
    pub fn new(gpu: Arc<dyn GpuBackend>, image: &Image) -> Self {
        let handle = upload(gpu.as_ref(), image);
        Self {
            gpu,
            state: RwLock::new(TextureState {
                handle: Some(handle),
                width: image.width(),
                height: image.height(),
                format: image.format(),
            }),
            reload_path: None,
        }
    }

    /// Load the image at `path` and upload it, recording `path` for reloads.
    pub fn load(gpu: Arc<dyn GpuBackend>, loader: &ImageLoader, path: &str) -> Result<Self, ImageError> {
        let image = loader.load(path)?;
        Ok(Self::new(gpu, &image).with_reload_path(path))
    }

    pub fn with_reload_path(mut self, path: impl Into<String>) -> Self {
        self.reload_path = Some(path.into());
        self
    }

    pub fn reload_path(&self) -> Option<&str> {
        self.reload_path.as_deref()
    }

    pub fn width(&self) -> u32 {
        self.state.read().width
    }

    pub fn height(&self) -> u32 {
        self.state.read().height
    }

    pub fn format(&self) -> PixelFormat {
        self.state.read().format
    }

    pub fn handle(&self) -> Option<TextureHandle> {
        self.state.read().handle
    }

    /// Ask the GPU whether the handle still names a live texture object.
    ///
    /// Not cached: a context loss invalidates handles behind our back.
    pub fn is_valid(&self) -> bool {
        self.handle().is_some_and(|handle| self.gpu.is_texture(handle))
    }

    /// Make this texture current for subsequent draws.
    pub fn bind(&self) {
        self.gpu.bind_texture(self.handle());
    }

    pub fn unbind(&self) {
        self.gpu.bind_texture(None);
    }

    /// Drop the handle without asking the GPU to delete it.
    ///
    /// Used after a context loss: the old name is already gone, and deleting
    /// it once new objects exist could hit a recycled name.
    pub(crate) fn forget_handle(&self) {
        self.state.write().handle = None;
    }

    /// Rebuild the GPU object from the reload path.
    ///
    /// Without a reload path this does nothing. On a failed load the error is
    /// logged and the previous state is kept untouched.
    pub fn reload(&self, loader: &ImageLoader) -> Result<(), TextureError> {
        let Some(path) = self.reload_path.as_deref() else {
            return Ok(());
        };

        let image = match loader.load(path) {
            Ok(image) => image,
            Err(source) => {
                error!("Cannot load file \"{}\": {}", path, source);
                return Err(TextureError::Reload {
                    path: path.to_string(),
                    source,
                });
            }
        };

        let mut state = self.state.write();
        if let Some(old) = state.handle.take() {
            self.gpu.delete_texture(old);
        }
        let handle = upload(self.gpu.as_ref(), &image);
        *state = TextureState {
            handle: Some(handle),
            width: image.width(),
            height: image.height(),
            format: image.format(),
        };
        info!(
            "reloaded texture '{}' {}x{} as {:?}",
            path, state.width, state.height, handle
        );
        Ok(())
    }
}

impl Drop for Texture {
    fn drop(&mut self) {
        if let Some(handle) = self.state.get_mut().handle.take() {
            self.gpu.delete_texture(handle);
        }
    }
}

impl fmt::Debug for Texture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.read();
        f.debug_struct("Texture")
            .field("handle", &state.handle)
            .field("width", &state.width)
            .field("height", &state.height)
            .field("format", &state.format)
            .field("reload_path", &self.reload_path)
            .finish_non_exhaustive()
    }
}

/// A UV window into a texture. Does not keep the texture alive.
#[derive(Debug, Clone)]
pub struct TextureRegion {
    texture: Weak<Texture>,
    uv: UvRect,
}

impl TextureRegion {
    pub fn new(texture: &Arc<Texture>, uv: UvRect) -> Self {
        Self {
            texture: Arc::downgrade(texture),
            uv,
        }
    }

    /// Region covering the pixel rectangle `(x, y, width, height)`.
    pub fn from_pixels(texture: &Arc<Texture>, x: f32, y: f32, width: f32, height: f32) -> Self {
        let tw = texture.width().max(1) as f32;
        let th = texture.height().max(1) as f32;
        Self::new(
            texture,
            UvRect::new(x / tw, y / th, (x + width) / tw, (y + height) / th),
        )
    }

    pub fn texture(&self) -> Weak<Texture> {
        self.texture.clone()
    }

    pub fn uv(&self) -> UvRect {
        self.uv
    }

    pub fn is_valid(&self) -> bool {
        self.texture.strong_count() > 0
    }

    /// Width in texture pixels, or 0 once the texture is gone.
    pub fn width(&self) -> f32 {
        self.texture
            .upgrade()
            .map_or(0.0, |t| (self.uv.u2 - self.uv.u1).abs() * t.width() as f32)
    }

    /// Height in texture pixels, or 0 once the texture is gone.
    pub fn height(&self) -> f32 {
        self.texture
            .upgrade()
            .map_or(0.0, |t| (self.uv.v2 - self.uv.v1).abs() * t.height() as f32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessGpu;

    fn gpu() -> (Arc<HeadlessGpu>, Arc<dyn GpuBackend>) {
        let gpu = Arc::new(HeadlessGpu::new());
        let dynamic: Arc<dyn GpuBackend> = gpu.clone();
        (gpu, dynamic)
    }

    #[test]
    fn new_texture_is_linear_without_mipmaps() {
        let (raw, gpu) = gpu();
        let tex = Texture::new(gpu, &Image::filled(4, 2, [0, 0, 0, 255]));
        let desc = raw.desc(tex.handle().unwrap()).unwrap();
        assert_eq!(desc.min_filter, TextureFilter::Linear);
        assert_eq!(desc.mag_filter, TextureFilter::Linear);
        assert!(!desc.mipmaps);
        assert_eq!((desc.width, desc.height), (4, 2));
        assert_eq!(tex.format(), PixelFormat::Rgba);
    }

    #[test]
    fn validity_is_queried_from_the_gpu() {
        let (raw, gpu) = gpu();
        let tex = Texture::new(gpu, &Image::filled(1, 1, [255; 4]));
        assert!(tex.is_valid());
        raw.lose_context();
        assert!(!tex.is_valid());
        assert!(tex.handle().is_some());
    }

    #[test]
    fn bind_and_unbind_switch_current_texture() {
        let (raw, gpu) = gpu();
        let tex = Texture::new(gpu, &Image::filled(1, 1, [255; 4]));
        tex.bind();
        assert_eq!(raw.bound(), tex.handle());
        tex.unbind();
        assert_eq!(raw.bound(), None);
    }

    #[test]
    fn drop_releases_gpu_object() {
        let (raw, gpu) = gpu();
        let tex = Arc::new(Texture::new(gpu, &Image::filled(1, 1, [255; 4])));
        let weak = Arc::downgrade(&tex);
        drop(tex);
        assert_eq!(raw.live_textures(), 0);
        assert_eq!(raw.deleted_count(), 1);
        assert!(weak.upgrade().is_none());
    }

    #[test]
    fn forget_handle_skips_gpu_delete() {
        let (raw, gpu) = gpu();
        let tex = Texture::new(gpu, &Image::filled(1, 1, [255; 4]));
        tex.forget_handle();
        drop(tex);
        assert_eq!(raw.deleted_count(), 0);
    }

    #[test]
    fn region_from_pixels_computes_uv_and_size() {
        let (_raw, gpu) = gpu();
        let tex = Arc::new(Texture::new(gpu, &Image::filled(200, 100, [255; 4])));
        let region = TextureRegion::from_pixels(&tex, 50.0, 25.0, 100.0, 50.0);
        assert_eq!(region.uv(), UvRect::new(0.25, 0.25, 0.75, 0.75));
        assert_eq!(region.width(), 100.0);
        assert_eq!(region.height(), 50.0);
    }

    #[test]
    fn region_expires_with_texture() {
        let (_raw, gpu) = gpu();
        let tex = Arc::new(Texture::new(gpu, &Image::filled(8, 8, [255; 4])));
        let region = TextureRegion::new(&tex, UvRect::FULL);
        assert!(region.is_valid());
        drop(tex);
        assert!(!region.is_valid());
        assert_eq!(region.width(), 0.0);
    }
}
