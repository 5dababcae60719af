//! Fixed pool of audio players plus one dedicated music player.
//!
//! Create the pool once at startup with [`AudioPlayerPool::new`] and insert it
//! as a resource. Sound requests take the first free player in the shared pool
//! (linear first-fit, no priorities, no stealing); when every player is busy
//! the request is dropped and reported. Music always goes to the dedicated
//! music player and preempts whatever was playing there.
//!
//! Players are freed by [`release_finished_players`] once their voice reports
//! the end of playback.
//!
//! Access goes through `&mut self` (`ResMut` in systems), so the search for a
//! free player and its assignment are a single exclusive step.
//!
//! [`release_finished_players`]: crate::systems::audio::release_finished_players

use std::fmt;
use std::sync::{Arc, Weak};

use bevy_ecs::prelude::Resource;
use log::{debug, error, info, warn};
use thiserror::Error;

use crate::backend::audio::{AudioDevice, AudioVoice};

/// Failures reported by the audio pool. None of them is fatal.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum AudioError {
    #[error("Attempt to play invalid audio source")]
    InvalidSource,
    #[error("Cannot play audio source. All audio players are used")]
    NoFreePlayer,
    #[error("Volume should be in range [0.0, 1.0], got {0}")]
    VolumeOutOfRange(f32),
}

/// Decoded PCM audio ready to be handed to a voice.
#[derive(Debug, Clone, PartialEq)]
pub struct AudioSource {
    name: String,
    samples: Vec<i16>,
    sample_rate: u32,
    channels: u16,
}

impl AudioSource {
    pub fn new(name: impl Into<String>, samples: Vec<i16>, sample_rate: u32, channels: u16) -> Self {
        Self {
            name: name.into(),
            samples,
            sample_rate,
            channels,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn samples(&self) -> &[i16] {
        &self.samples
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }
}

/// One playback channel: a voice plus the source currently assigned to it.
pub struct AudioPlayer {
    buffer_id: usize,
    voice: Box<dyn AudioVoice>,
    source: Option<Arc<AudioSource>>,
    using: bool,
}

impl AudioPlayer {
    fn new(buffer_id: usize, voice: Box<dyn AudioVoice>) -> Self {
        Self {
            buffer_id,
            voice,
            source: None,
            using: false,
        }
    }

    pub fn buffer_id(&self) -> usize {
        self.buffer_id
    }

    /// Busy flag. A player is free exactly when nothing is assigned to it.
    pub fn is_using(&self) -> bool {
        self.using
    }

    pub fn source(&self) -> Option<&Arc<AudioSource>> {
        self.source.as_ref()
    }

    fn set_source(&mut self, source: Arc<AudioSource>) {
        self.voice.load(&source);
        self.source = Some(source);
    }

    fn play(&mut self) {
        self.using = true;
        self.voice.play();
    }

    fn stop(&mut self) {
        self.voice.stop();
        self.using = false;
        self.source = None;
    }

    fn set_volume(&mut self, volume: f32) {
        self.voice.set_volume(volume);
    }

    /// Free the player if its voice went silent. Returns true if it was freed.
    fn release_if_finished(&mut self) -> bool {
        if self.using && !self.voice.is_playing() {
            self.using = false;
            self.source = None;
            return true;
        }
        false
    }
}

impl fmt::Debug for AudioPlayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AudioPlayer")
            .field("buffer_id", &self.buffer_id)
            .field("using", &self.using)
            .field("source", &self.source.as_ref().map(|s| s.name().to_string()))
            .finish_non_exhaustive()
    }
}

const DEFAULT_VOLUME: f32 = 1.0;

fn check_volume(volume: f32) -> Result<(), AudioError> {
    // NaN fails `contains` as well.
    if !(0.0..=1.0).contains(&volume) {
        error!("Volume should be in range [0.0f, 1.0f], got {}", volume);
        return Err(AudioError::VolumeOutOfRange(volume));
    }
    Ok(())
}

/// Shared sound players plus the dedicated music player.
#[derive(Resource, Debug)]
pub struct AudioPlayerPool {
    players: Vec<AudioPlayer>,
    music_player: AudioPlayer,
    music_volume: f32,
    sound_volume: f32,
}

impl AudioPlayerPool {
    /// Create `player_count` sound players and one music player on `device`.
    ///
    /// Sound players are created first, so their buffer ids are
    /// `0..player_count`; the music player gets `player_count`.
    /// Every voice starts at the default master volume of 1.0.
    pub fn new(device: &dyn AudioDevice, player_count: usize) -> Self {
        let mut players: Vec<AudioPlayer> = (0..player_count)
            .map(|id| AudioPlayer::new(id, device.create_voice()))
            .collect();
        let mut music_player = AudioPlayer::new(player_count, device.create_voice());
        for player in &mut players {
            player.set_volume(DEFAULT_VOLUME);
        }
        music_player.set_volume(DEFAULT_VOLUME);
        info!("audio pool ready: {} sound players + 1 music player", player_count);
        Self {
            players,
            music_player,
            music_volume: DEFAULT_VOLUME,
            sound_volume: DEFAULT_VOLUME,
        }
    }

    /// Apply initial master volumes.
    ///
    /// An out-of-range value is logged by the setter and the default is kept.
    pub fn with_volumes(mut self, music: f32, sound: f32) -> Self {
        if self.set_music_volume(music).is_err() {
            warn!("keeping music volume {}", self.music_volume);
        }
        if self.set_sound_volume(sound).is_err() {
            warn!("keeping sound volume {}", self.sound_volume);
        }
        self
    }

    pub fn players(&self) -> &[AudioPlayer] {
        &self.players
    }

    pub fn music_player(&self) -> &AudioPlayer {
        &self.music_player
    }

    /// Index of the first player whose busy flag is clear.
    pub fn find_free_player(&self) -> Option<usize> {
        self.players.iter().position(|player| !player.is_using())
    }

    pub fn busy_players(&self) -> usize {
        self.players.iter().filter(|player| player.is_using()).count()
    }

    /// Play background music, replacing whatever the music player had.
    pub fn play_music(&mut self, source: &Weak<AudioSource>) -> Result<(), AudioError> {
        let Some(source) = source.upgrade() else {
            error!("Attempt to play invalid audio source");
            return Err(AudioError::InvalidSource);
        };

        debug!("music: playing '{}'", source.name());
        self.music_player.stop();
        self.music_player.set_source(source);
        self.music_player.play();
        Ok(())
    }

    /// Stop background music.
    pub fn stop_music(&mut self) {
        self.music_player.stop();
    }

    /// Play a one-shot sound on the first free player.
    ///
    /// Returns the index of the player that took the request.
    pub fn play_sound(&mut self, source: &Weak<AudioSource>) -> Result<usize, AudioError> {
        let Some(source) = source.upgrade() else {
            error!("Attempt to play invalid audio source");
            return Err(AudioError::InvalidSource);
        };

        let Some(index) = self.find_free_player() else {
            error!("Cannot play audio source. All audio players are used");
            return Err(AudioError::NoFreePlayer);
        };

        debug!("sound: playing '{}' on player {}", source.name(), index);
        let player = &mut self.players[index];
        player.set_source(source);
        player.play();
        Ok(index)
    }

    /// Stop every sound player, busy or not. Music is left alone.
    pub fn stop_all_sounds(&mut self) {
        for player in &mut self.players {
            player.stop();
        }
    }

    /// Master volume for music.
    pub fn music_volume(&self) -> f32 {
        self.music_volume
    }

    /// Set master volume for music. `volume` should be in range `[0, 1]`.
    pub fn set_music_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        check_volume(volume)?;
        self.music_volume = volume;
        self.music_player.set_volume(volume);
        Ok(())
    }

    /// Master volume for sounds.
    pub fn sound_volume(&self) -> f32 {
        self.sound_volume
    }

    /// Set master volume for sounds. `volume` should be in range `[0, 1]`.
    pub fn set_sound_volume(&mut self, volume: f32) -> Result<(), AudioError> {
        check_volume(volume)?;
        self.sound_volume = volume;
        for player in &mut self.players {
            player.set_volume(volume);
        }
        Ok(())
    }

    /// Free every player whose voice has finished. Returns how many were freed.
    pub fn release_finished(&mut self) -> usize {
        let mut released = 0;
        for player in &mut self.players {
            if player.release_if_finished() {
                debug!("sound: player {} finished", player.buffer_id());
                released += 1;
            }
        }
        if self.music_player.release_if_finished() {
            debug!("music: finished");
        }
        released
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::headless::HeadlessAudio;

    fn source(name: &str) -> Arc<AudioSource> {
        Arc::new(AudioSource::new(name, vec![0; 441], 44_100, 1))
    }

    #[test]
    fn first_free_player_wins() {
        let audio = HeadlessAudio::new();
        let mut pool = AudioPlayerPool::new(&audio, 3);
        let blip = source("blip");

        assert_eq!(pool.play_sound(&Arc::downgrade(&blip)), Ok(0));
        assert_eq!(pool.play_sound(&Arc::downgrade(&blip)), Ok(1));

        audio.finish(0);
        pool.release_finished();
        assert_eq!(pool.find_free_player(), Some(0));
        assert_eq!(pool.play_sound(&Arc::downgrade(&blip)), Ok(0));
    }

    #[test]
    fn expired_source_is_rejected() {
        let audio = HeadlessAudio::new();
        let mut pool = AudioPlayerPool::new(&audio, 1);
        let weak = Arc::downgrade(&source("gone"));

        assert_eq!(pool.play_sound(&weak), Err(AudioError::InvalidSource));
        assert_eq!(pool.play_music(&weak), Err(AudioError::InvalidSource));
        assert_eq!(pool.busy_players(), 0);
        assert!(!pool.music_player().is_using());
    }

    #[test]
    fn volume_outside_unit_range_is_rejected() {
        let audio = HeadlessAudio::new();
        let mut pool = AudioPlayerPool::new(&audio, 2);

        assert_eq!(pool.set_sound_volume(0.5), Ok(()));
        assert_eq!(pool.set_sound_volume(1.5), Err(AudioError::VolumeOutOfRange(1.5)));
        assert_eq!(pool.set_sound_volume(-0.1), Err(AudioError::VolumeOutOfRange(-0.1)));
        assert!(pool.set_music_volume(f32::NAN).is_err());
        assert_eq!(pool.sound_volume(), 0.5);
        assert_eq!(pool.music_volume(), 1.0);
    }

    #[test]
    fn bounds_are_accepted() {
        let audio = HeadlessAudio::new();
        let mut pool = AudioPlayerPool::new(&audio, 1);
        assert!(pool.set_music_volume(0.0).is_ok());
        assert!(pool.set_music_volume(1.0).is_ok());
    }
}
