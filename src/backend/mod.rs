//! Contracts for the platform collaborators the engine core drives.
//!
//! The core never talks to OpenGL, a window, a mixer or the filesystem
//! directly. It goes through the traits declared here, and the platform layer
//! supplies implementations.
//!
//! Submodules overview:
//! - [`gpu`] – texture object creation, deletion, binding and validity queries
//! - [`renderer`] – quad draw submission
//! - [`audio`] – playback voices handed out by the audio device
//! - [`files`] – raw byte access for asset paths
//! - [`headless`] – in-process implementations used by tests and the demo binary

pub mod audio;
pub mod files;
pub mod gpu;
pub mod headless;
pub mod renderer;
