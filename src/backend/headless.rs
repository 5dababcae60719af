//! Headless collaborator implementations.
//!
//! These back the demo binary and the test-suite. They keep enough state to
//! observe what the core asked for:
//! - [`HeadlessGpu`] tracks live texture objects and can simulate a context loss.
//! - [`RecordingRenderer`] stores every submitted quad.
//! - [`HeadlessAudio`] reports voice commands over a `crossbeam_channel` so the
//!   caller can drain them with `try_iter()`, the same way the audio thread
//!   bridge is polled.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use crossbeam_channel::{Receiver, Sender, unbounded};
use log::debug;
use parking_lot::Mutex;
use rustc_hash::FxHashMap;
use serde::Serialize;

use super::audio::{AudioDevice, AudioVoice};
use super::gpu::{GpuBackend, TextureDesc, TextureHandle};
use super::renderer::{QuadRenderer, QuadVertex};
use crate::components::tint::Tint;
use crate::resources::audio::AudioSource;
use crate::resources::texture::Texture;

// ── GPU ─────────────────────────────────────────────────────────────────

#[derive(Default)]
struct GpuState {
    next_name: u32,
    live: FxHashMap<TextureHandle, TextureDesc>,
    bound: Option<TextureHandle>,
    created: usize,
    deleted: usize,
}

/// Texture-object bookkeeping without a graphics API.
///
/// Names are never reused, so a recreated texture always gets a new handle.
#[derive(Default)]
pub struct HeadlessGpu {
    state: Mutex<GpuState>,
}

impl HeadlessGpu {
    pub fn new() -> Self {
        Self::default()
    }

    /// Invalidate every texture object, as a lost context would.
    pub fn lose_context(&self) {
        let mut state = self.state.lock();
        debug!("headless gpu: context lost, {} textures dropped", state.live.len());
        state.live.clear();
        state.bound = None;
    }

    pub fn live_textures(&self) -> usize {
        self.state.lock().live.len()
    }

    pub fn bound(&self) -> Option<TextureHandle> {
        self.state.lock().bound
    }

    pub fn desc(&self, handle: TextureHandle) -> Option<TextureDesc> {
        self.state.lock().live.get(&handle).copied()
    }

    pub fn created_count(&self) -> usize {
        self.state.lock().created
    }

    pub fn deleted_count(&self) -> usize {
        self.state.lock().deleted
    }
}

impl GpuBackend for HeadlessGpu {
    fn create_texture(&self, desc: &TextureDesc, _pixels: &[u8]) -> TextureHandle {
        let mut state = self.state.lock();
        state.next_name += 1;
        let handle = TextureHandle(state.next_name);
        state.live.insert(handle, *desc);
        state.created += 1;
        handle
    }

    fn delete_texture(&self, handle: TextureHandle) {
        let mut state = self.state.lock();
        if state.live.remove(&handle).is_some() {
            state.deleted += 1;
        }
        if state.bound == Some(handle) {
            state.bound = None;
        }
    }

    fn bind_texture(&self, handle: Option<TextureHandle>) {
        self.state.lock().bound = handle;
    }

    fn is_texture(&self, handle: TextureHandle) -> bool {
        self.state.lock().live.contains_key(&handle)
    }
}

// ── Renderer ────────────────────────────────────────────────────────────

/// One recorded quad submission.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DrawCall {
    pub texture: Option<TextureHandle>,
    pub vertices: [QuadVertex; 4],
    pub tint: Tint,
}

/// Renderer that keeps every quad it is given.
#[derive(Debug, Default)]
pub struct RecordingRenderer {
    pub draws: Vec<DrawCall>,
}

impl RecordingRenderer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Hand over the recorded draws and start a new frame.
    pub fn take(&mut self) -> Vec<DrawCall> {
        std::mem::take(&mut self.draws)
    }
}

impl QuadRenderer for RecordingRenderer {
    fn draw_quad(&mut self, texture: &Texture, vertices: &[QuadVertex; 4], tint: Tint) {
        texture.bind();
        self.draws.push(DrawCall {
            texture: texture.handle(),
            vertices: *vertices,
            tint,
        });
        texture.unbind();
    }
}

// ── Audio ───────────────────────────────────────────────────────────────

/// Voice commands observed by [`HeadlessAudio`].
#[derive(Debug, Clone, PartialEq)]
pub enum VoiceEvent {
    Loaded { voice: usize, source: String },
    Played { voice: usize },
    Stopped { voice: usize },
    Volume { voice: usize, volume: f32 },
}

/// Audio device whose voices only report what they are told to do.
///
/// Voices are numbered in creation order starting at 0.
pub struct HeadlessAudio {
    tx: Sender<VoiceEvent>,
    rx: Receiver<VoiceEvent>,
    voices: Mutex<Vec<Arc<AtomicBool>>>,
}

impl Default for HeadlessAudio {
    fn default() -> Self {
        Self::new()
    }
}

impl HeadlessAudio {
    pub fn new() -> Self {
        let (tx, rx) = unbounded();
        Self {
            tx,
            rx,
            voices: Mutex::new(Vec::new()),
        }
    }

    /// Drain every voice command issued since the last call.
    pub fn drain(&self) -> Vec<VoiceEvent> {
        self.rx.try_iter().collect()
    }

    /// Pretend voice `voice` reached the end of its source.
    pub fn finish(&self, voice: usize) {
        if let Some(flag) = self.voices.lock().get(voice) {
            flag.store(false, Ordering::Relaxed);
        }
    }

    pub fn is_playing(&self, voice: usize) -> bool {
        self.voices
            .lock()
            .get(voice)
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
    }

    pub fn voice_count(&self) -> usize {
        self.voices.lock().len()
    }
}

impl AudioDevice for HeadlessAudio {
    fn create_voice(&self) -> Box<dyn AudioVoice> {
        let mut voices = self.voices.lock();
        let playing = Arc::new(AtomicBool::new(false));
        voices.push(playing.clone());
        Box::new(HeadlessVoice {
            id: voices.len() - 1,
            tx: self.tx.clone(),
            playing,
            loaded: false,
        })
    }
}

struct HeadlessVoice {
    id: usize,
    tx: Sender<VoiceEvent>,
    playing: Arc<AtomicBool>,
    loaded: bool,
}

impl HeadlessVoice {
    fn emit(&self, event: VoiceEvent) {
        // The receiver lives as long as the device; ignore send errors on teardown.
        let _ = self.tx.send(event);
    }
}

impl AudioVoice for HeadlessVoice {
    fn load(&mut self, source: &Arc<AudioSource>) {
        self.loaded = true;
        self.emit(VoiceEvent::Loaded {
            voice: self.id,
            source: source.name().to_string(),
        });
    }

    fn play(&mut self) {
        if self.loaded {
            self.playing.store(true, Ordering::Relaxed);
        }
        self.emit(VoiceEvent::Played { voice: self.id });
    }

    fn stop(&mut self) {
        self.playing.store(false, Ordering::Relaxed);
        self.emit(VoiceEvent::Stopped { voice: self.id });
    }

    fn set_volume(&mut self, volume: f32) {
        self.emit(VoiceEvent::Volume {
            voice: self.id,
            volume,
        });
    }

    fn is_playing(&self) -> bool {
        self.playing.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::gpu::{PixelFormat, TextureFilter};

    fn desc() -> TextureDesc {
        TextureDesc {
            width: 2,
            height: 2,
            format: PixelFormat::Rgba,
            min_filter: TextureFilter::Linear,
            mag_filter: TextureFilter::Linear,
            mipmaps: false,
        }
    }

    #[test]
    fn gpu_names_are_never_reused() {
        let gpu = HeadlessGpu::new();
        let a = gpu.create_texture(&desc(), &[0; 16]);
        gpu.delete_texture(a);
        let b = gpu.create_texture(&desc(), &[0; 16]);
        assert_ne!(a, b);
        assert!(!gpu.is_texture(a));
        assert!(gpu.is_texture(b));
    }

    #[test]
    fn gpu_context_loss_invalidates_everything() {
        let gpu = HeadlessGpu::new();
        let a = gpu.create_texture(&desc(), &[0; 16]);
        gpu.bind_texture(Some(a));
        gpu.lose_context();
        assert!(!gpu.is_texture(a));
        assert_eq!(gpu.bound(), None);
        assert_eq!(gpu.live_textures(), 0);
    }

    #[test]
    fn gpu_deleting_stale_handle_is_ignored() {
        let gpu = HeadlessGpu::new();
        let a = gpu.create_texture(&desc(), &[0; 16]);
        gpu.lose_context();
        gpu.delete_texture(a);
        assert_eq!(gpu.deleted_count(), 0);
    }

    #[test]
    fn audio_voices_report_commands() {
        let audio = HeadlessAudio::new();
        let mut voice = audio.create_voice();
        let source = Arc::new(AudioSource::new("blip", Vec::new(), 44_100, 1));

        voice.load(&source);
        voice.play();
        assert!(voice.is_playing());
        assert!(audio.is_playing(0));

        audio.finish(0);
        assert!(!voice.is_playing());

        let events = audio.drain();
        assert_eq!(
            events,
            vec![
                VoiceEvent::Loaded {
                    voice: 0,
                    source: "blip".to_string()
                },
                VoiceEvent::Played { voice: 0 },
            ]
        );
    }

    #[test]
    fn audio_play_without_source_stays_silent() {
        let audio = HeadlessAudio::new();
        let mut voice = audio.create_voice();
        voice.play();
        assert!(!voice.is_playing());
    }
}
