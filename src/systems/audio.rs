//! Audio pool upkeep.

use bevy_ecs::prelude::ResMut;

use crate::resources::audio::AudioPlayerPool;

/// Mark players whose voice went silent as free again.
///
/// Run once per frame so finished one-shot sounds return their player to the
/// shared pool.
pub fn release_finished_players(mut pool: ResMut<AudioPlayerPool>) {
    pool.release_finished();
}
