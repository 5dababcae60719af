//! Event types and observers used by the engine.
//!
//! Submodules:
//! - [`contextlost`] – graphics context recreated; textures must be rebuilt
pub mod contextlost;
