//! Engine systems.
//!
//! Submodules overview
//! - [`audio`] – return finished players to the shared audio pool
//! - [`render`] – submit every sprite in the world to a quad renderer

pub mod audio;
pub mod render;
