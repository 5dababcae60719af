//! Low-level audio device contract.

use std::sync::Arc;

use crate::resources::audio::AudioSource;

/// A single unit of mixing capacity. Plays one source at a time.
pub trait AudioVoice: Send + Sync {
    /// Attach `source` as the data the next [`play`](AudioVoice::play) uses.
    fn load(&mut self, source: &Arc<AudioSource>);
    fn play(&mut self);
    fn stop(&mut self);
    /// Linear volume in `[0, 1]`.
    fn set_volume(&mut self, volume: f32);
    /// Whether the voice is still producing sound.
    fn is_playing(&self) -> bool;
}

/// Hands out playback voices. Called once per channel at startup.
pub trait AudioDevice {
    fn create_voice(&self) -> Box<dyn AudioVoice>;
}
