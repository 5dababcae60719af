//! ECS components for entities.
//!
//! Submodules overview:
//! - [`sprite`] – textured quad with position, origin, scale, rotation and tint
//! - [`tint`] – normalized RGBA color modulation

pub mod sprite;
pub mod tint;
