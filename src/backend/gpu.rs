//! GPU texture layer contract.

use serde::{Deserialize, Serialize};

/// Opaque name of a texture object living on the GPU.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TextureHandle(pub u32);

/// Layout of decoded pixel data.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PixelFormat {
    Rgb,
    Rgba,
}

impl PixelFormat {
    pub fn bytes_per_pixel(self) -> usize {
        match self {
            PixelFormat::Rgb => 3,
            PixelFormat::Rgba => 4,
        }
    }
}

/// Sampling filter configured on a texture object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TextureFilter {
    Nearest,
    Linear,
}

/// Parameters for a single texture allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextureDesc {
    pub width: u32,
    pub height: u32,
    pub format: PixelFormat,
    pub min_filter: TextureFilter,
    pub mag_filter: TextureFilter,
    pub mipmaps: bool,
}

/// Texture-object operations of the graphics API.
///
/// Methods take `&self` because the underlying API is a global state machine;
/// implementations synchronize internally.
pub trait GpuBackend: Send + Sync {
    /// Allocate a texture object, configure it per `desc`, upload `pixels`.
    fn create_texture(&self, desc: &TextureDesc, pixels: &[u8]) -> TextureHandle;

    /// Release a texture object. Unknown or stale handles are ignored.
    fn delete_texture(&self, handle: TextureHandle);

    /// Make `handle` the current texture, or unbind with `None`.
    fn bind_texture(&self, handle: Option<TextureHandle>);

    /// Whether `handle` still names a live texture object.
    ///
    /// Returns `false` for handles invalidated out-of-band by a context loss.
    fn is_texture(&self, handle: TextureHandle) -> bool;
}
