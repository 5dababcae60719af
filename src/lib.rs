//! Aberred core library.
//!
//! Sprite quads, context-loss-proof textures and a bounded audio player pool,
//! exposed as ECS components, resources, systems and events. Platform
//! services (GPU, renderer, audio device, files) are reached through the
//! traits in [`backend`].

pub mod backend;
pub mod components;
pub mod events;
pub mod resources;
pub mod systems;
