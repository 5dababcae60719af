//! Decoded images and the loader resource that produces them.
//!
//! An [`ImageLoader`] pairs a [`FileSource`] (where bytes come from) with an
//! [`ImageDecoder`] (how bytes become pixels). Textures created through the
//! loader remember their path so they can be rebuilt after a context loss.

use std::io;

use bevy_ecs::prelude::Resource;
use image::ColorType;
use log::debug;
use thiserror::Error;

use crate::backend::files::FileSource;
use crate::backend::gpu::PixelFormat;

/// Failure to produce pixels for a path or byte buffer.
#[derive(Debug, Error)]
pub enum ImageError {
    #[error("cannot read \"{path}\": {source}")]
    Io {
        path: String,
        #[source]
        source: io::Error,
    },
    #[error("cannot decode image: {0}")]
    Decode(String),
    #[error("pixel buffer is {actual} bytes, expected {expected}")]
    SizeMismatch { expected: usize, actual: usize },
}

/// Tightly packed 8-bit pixel data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Image {
    width: u32,
    height: u32,
    format: PixelFormat,
    data: Vec<u8>,
}

impl Image {
    /// Wrap raw pixels. `data` must hold exactly `width * height` pixels.
    pub fn new(width: u32, height: u32, format: PixelFormat, data: Vec<u8>) -> Result<Self, ImageError> {
        let expected = width as usize * height as usize * format.bytes_per_pixel();
        if data.len() != expected {
            return Err(ImageError::SizeMismatch {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            format,
            data,
        })
    }

    /// Image filled with a single RGBA color.
    pub fn filled(width: u32, height: u32, rgba: [u8; 4]) -> Self {
        let data = rgba.repeat(width as usize * height as usize);
        Self {
            width,
            height,
            format: PixelFormat::Rgba,
            data,
        }
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn format(&self) -> PixelFormat {
        self.format
    }

    pub fn data(&self) -> &[u8] {
        &self.data
    }
}

/// Turns encoded bytes into an [`Image`].
pub trait ImageDecoder: Send + Sync {
    fn decode(&self, bytes: &[u8]) -> Result<Image, ImageError>;
}

/// PNG decoder backed by the `image` crate.
///
/// RGB images decode to RGB; every other layout (grayscale included) is
/// converted to RGBA.
#[derive(Debug, Default, Clone, Copy)]
pub struct PngDecoder;

impl ImageDecoder for PngDecoder {
    fn decode(&self, bytes: &[u8]) -> Result<Image, ImageError> {
        let decoded = image::load_from_memory_with_format(bytes, image::ImageFormat::Png)
            .map_err(|e| ImageError::Decode(e.to_string()))?;
        let (width, height) = (decoded.width(), decoded.height());
        match decoded.color() {
            ColorType::Rgb8 | ColorType::Rgb16 | ColorType::Rgb32F => {
                Image::new(width, height, PixelFormat::Rgb, decoded.to_rgb8().into_raw())
            }
            _ => Image::new(width, height, PixelFormat::Rgba, decoded.to_rgba8().into_raw()),
        }
    }
}

/// File source + decoder used to (re)load textures by path.
#[derive(Resource)]
pub struct ImageLoader {
    files: Box<dyn FileSource>,
    decoder: Box<dyn ImageDecoder>,
}

impl ImageLoader {
    pub fn new(files: impl FileSource + 'static, decoder: impl ImageDecoder + 'static) -> Self {
        Self {
            files: Box::new(files),
            decoder: Box::new(decoder),
        }
    }

    /// Loader decoding PNG files from `files`.
    pub fn png(files: impl FileSource + 'static) -> Self {
        Self::new(files, PngDecoder)
    }

    /// Read and decode the image at `path`.
    pub fn load(&self, path: &str) -> Result<Image, ImageError> {
        let bytes = self.files.read(path).map_err(|source| ImageError::Io {
            path: path.to_string(),
            source,
        })?;
        let image = self.decoder.decode(&bytes)?;
        debug!(
            "decoded '{}' {}x{} {:?}",
            path,
            image.width(),
            image.height(),
            image.format()
        );
        Ok(image)
    }
}
