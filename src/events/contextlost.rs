//! Graphics context loss event and observer.
//!
//! The platform layer triggers [`ContextLostEvent`] once a new graphics
//! context is current after the old one was destroyed (app suspend/resume on
//! mobile, driver reset). [`context_lost_observer`] rebuilds every texture in
//! the [`AssetStore`] from its reload path before rendering resumes.

use bevy_ecs::observer::On;
use bevy_ecs::prelude::*;
use log::{info, warn};

use crate::resources::assetstore::AssetStore;
use crate::resources::imageloader::ImageLoader;

/// Event triggered after the graphics context was recreated.
#[derive(Event, Debug, Clone, Copy)]
pub struct ContextLostEvent {}

/// Observer that reloads all registered textures when [`ContextLostEvent`] fires.
pub fn context_lost_observer(
    _trigger: On<ContextLostEvent>,
    assets: Res<AssetStore>,
    loader: Res<ImageLoader>,
) {
    info!("ContextLostEvent triggered, reloading textures");
    let failures = assets.reload_textures(&loader);
    if failures > 0 {
        warn!("{} textures could not be reloaded", failures);
    }
}
