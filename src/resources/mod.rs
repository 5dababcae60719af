//! ECS resources made available to systems.
//!
//! This module groups the long-lived services injected into the ECS world:
//! asset ownership, texture lifetime, sizing, audio playback and
//! configuration. Each submodule documents the semantics and intended usage
//! of its resource(s).
//!
//! Overview
//! - `assetstore` – id → texture / texture region registry, owns the assets
//! - `audio` – fixed pool of sound players plus the music player
//! - `engineconfig` – settings loaded from `config.ini`
//! - `imageloader` – file source + decoder producing pixel data
//! - `lua_runtime` – Lua interpreter and sprite userdata (feature `lua`)
//! - `sizes` – virtual resolution and texture-to-virtual scale
//! - `texture` – GPU textures rebuilt after context loss, texture regions
pub mod assetstore;
pub mod audio;
pub mod engineconfig;
pub mod imageloader;
#[cfg(feature = "lua")]
pub mod lua_runtime;
pub mod sizes;
pub mod texture;
