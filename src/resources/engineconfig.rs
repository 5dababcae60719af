//! Engine configuration resource.
//!
//! Manages engine settings loaded from an INI configuration file. Provides
//! defaults for safe startup and methods to load/save configuration.
//!
//! # Configuration File Format
//!
//! ```ini
//! [sizes]
//! virtual_width = 640
//! virtual_height = 360
//! texture_scale = 1.0
//!
//! [audio]
//! players = 8
//! music_volume = 1.0
//! sound_volume = 1.0
//!
//! [assets]
//! path = ./assets
//! ```

use bevy_ecs::prelude::*;
use configparser::ini::Ini;
use log::{info, warn};
use std::path::PathBuf;

/// Default safe values for startup
const DEFAULT_VIRTUAL_WIDTH: u32 = 640;
const DEFAULT_VIRTUAL_HEIGHT: u32 = 360;
const DEFAULT_TEXTURE_SCALE: f32 = 1.0;
const DEFAULT_AUDIO_PLAYERS: usize = 8;
const DEFAULT_VOLUME: f32 = 1.0;
const DEFAULT_ASSETS_PATH: &str = "./assets";
const DEFAULT_CONFIG_PATH: &str = "./config.ini";

/// Engine configuration resource.
#[derive(Resource, Debug, Clone)]
pub struct EngineConfig {
    /// Width of the virtual coordinate space.
    pub virtual_width: u32,
    /// Height of the virtual coordinate space.
    pub virtual_height: u32,
    /// Virtual units per texture pixel.
    pub texture_scale: f32,
    /// Number of channels in the shared sound pool.
    pub audio_players: usize,
    /// Initial master music volume.
    pub music_volume: f32,
    /// Initial master sound volume.
    pub sound_volume: f32,
    /// Root directory assets are read from.
    pub assets_path: PathBuf,
    /// Path to the configuration file.
    pub config_path: PathBuf,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Volumes outside `[0, 1]` in the file are ignored.
fn read_volume(config: &Ini, key: &str) -> Option<f32> {
    let value = config.getfloat("audio", key).ok().flatten()? as f32;
    if (0.0..=1.0).contains(&value) {
        Some(value)
    } else {
        warn!("Ignoring [audio] {} = {}: volume should be in range [0.0, 1.0]", key, value);
        None
    }
}

impl EngineConfig {
    /// Create a new configuration with safe default values.
    pub fn new() -> Self {
        Self {
            virtual_width: DEFAULT_VIRTUAL_WIDTH,
            virtual_height: DEFAULT_VIRTUAL_HEIGHT,
            texture_scale: DEFAULT_TEXTURE_SCALE,
            audio_players: DEFAULT_AUDIO_PLAYERS,
            music_volume: DEFAULT_VOLUME,
            sound_volume: DEFAULT_VOLUME,
            assets_path: PathBuf::from(DEFAULT_ASSETS_PATH),
            config_path: PathBuf::from(DEFAULT_CONFIG_PATH),
        }
    }

    /// Create a new configuration with a custom config file path.
    pub fn with_path(path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: path.into(),
            ..Self::new()
        }
    }

    /// Load configuration from the INI file.
    ///
    /// Missing values retain their current (default) values.
    /// Returns an error if the file cannot be read or parsed.
    pub fn load_from_file(&mut self) -> Result<(), String> {
        let mut config = Ini::new();
        config
            .load(&self.config_path)
            .map_err(|e| format!("Failed to load config file: {}", e))?;

        // [sizes] section
        if let Some(width) = config.getuint("sizes", "virtual_width").ok().flatten() {
            self.virtual_width = width as u32;
        }
        if let Some(height) = config.getuint("sizes", "virtual_height").ok().flatten() {
            self.virtual_height = height as u32;
        }
        if let Some(scale) = config.getfloat("sizes", "texture_scale").ok().flatten() {
            self.texture_scale = scale as f32;
        }

        // [audio] section
        if let Some(players) = config.getuint("audio", "players").ok().flatten() {
            self.audio_players = players as usize;
        }
        if let Some(volume) = read_volume(&config, "music_volume") {
            self.music_volume = volume;
        }
        if let Some(volume) = read_volume(&config, "sound_volume") {
            self.sound_volume = volume;
        }

        // [assets] section
        if let Some(path) = config.get("assets", "path") {
            self.assets_path = PathBuf::from(path);
        }

        info!(
            "Loaded config: {}x{} virtual, texture scale {}, {} audio players, music={}, sound={}, assets={:?}",
            self.virtual_width,
            self.virtual_height,
            self.texture_scale,
            self.audio_players,
            self.music_volume,
            self.sound_volume,
            self.assets_path
        );

        Ok(())
    }

    /// Save configuration to the INI file.
    ///
    /// Creates the file if it doesn't exist.
    pub fn save_to_file(&self) -> Result<(), String> {
        let mut config = Ini::new();

        // [sizes] section
        config.set("sizes", "virtual_width", Some(self.virtual_width.to_string()));
        config.set("sizes", "virtual_height", Some(self.virtual_height.to_string()));
        config.set("sizes", "texture_scale", Some(self.texture_scale.to_string()));

        // [audio] section
        config.set("audio", "players", Some(self.audio_players.to_string()));
        config.set("audio", "music_volume", Some(self.music_volume.to_string()));
        config.set("audio", "sound_volume", Some(self.sound_volume.to_string()));

        // [assets] section
        config.set(
            "assets",
            "path",
            Some(self.assets_path.to_string_lossy().into_owned()),
        );

        config
            .write(&self.config_path)
            .map_err(|e| format!("Failed to save config file: {}", e))?;

        info!("Saved config to {:?}", self.config_path);

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("aberredcore_{}_{}.ini", name, std::process::id()))
    }

    #[test]
    fn defaults_are_safe() {
        let config = EngineConfig::new();
        assert_eq!(config.virtual_width, 640);
        assert_eq!(config.virtual_height, 360);
        assert_eq!(config.audio_players, 8);
        assert_eq!(config.music_volume, 1.0);
    }

    #[test]
    fn missing_file_is_an_error_and_keeps_defaults() {
        let mut config = EngineConfig::with_path(temp_path("missing_never_written"));
        assert!(config.load_from_file().is_err());
        assert_eq!(config.texture_scale, 1.0);
    }

    #[test]
    fn partial_file_overrides_only_present_keys() {
        let path = temp_path("partial");
        std::fs::write(&path, "[sizes]\ntexture_scale = 0.5\n\n[audio]\nplayers = 3\n").unwrap();

        let mut config = EngineConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.texture_scale, 0.5);
        assert_eq!(config.audio_players, 3);
        assert_eq!(config.virtual_width, 640);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn out_of_range_volume_is_ignored() {
        let path = temp_path("volume");
        std::fs::write(&path, "[audio]\nmusic_volume = 4.0\nsound_volume = 0.25\n").unwrap();

        let mut config = EngineConfig::with_path(&path);
        config.load_from_file().unwrap();
        assert_eq!(config.music_volume, 1.0);
        assert_eq!(config.sound_volume, 0.25);

        std::fs::remove_file(&path).ok();
    }

    #[test]
    fn save_then_load_preserves_values() {
        let path = temp_path("save");
        let mut config = EngineConfig::with_path(&path);
        config.virtual_width = 1024;
        config.virtual_height = 768;
        config.audio_players = 4;
        config.sound_volume = 0.5;
        config.assets_path = PathBuf::from("data");
        config.save_to_file().unwrap();

        let mut loaded = EngineConfig::with_path(&path);
        loaded.load_from_file().unwrap();
        assert_eq!(loaded.virtual_width, 1024);
        assert_eq!(loaded.virtual_height, 768);
        assert_eq!(loaded.audio_players, 4);
        assert_eq!(loaded.sound_volume, 0.5);
        assert_eq!(loaded.assets_path, PathBuf::from("data"));

        std::fs::remove_file(&path).ok();
    }
}
