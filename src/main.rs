//! Aberred core headless demo.
//!
//! Runs the core against the headless backends:
//! 1. Load `config.ini` (defaults when missing)
//! 2. Register a texture and a region in the asset store, spawn sprites
//! 3. Rotate and render the sprites for a few frames, printing each quad
//! 4. Simulate a graphics context loss and reload textures
//! 5. Play music and more sounds than the pool has players
//!
//! # Running
//!
//! ```sh
//! cargo run -- --frames 8 --json
//! cargo run -- --texture sprites/hero.png
//! cargo run -- --script scripts/hero.lua
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use aberredcore::backend::files::DiskFiles;
use aberredcore::backend::gpu::GpuBackend;
use aberredcore::backend::headless::{DrawCall, HeadlessAudio, HeadlessGpu, RecordingRenderer};
use aberredcore::components::sprite::Sprite;
use aberredcore::events::contextlost::{ContextLostEvent, context_lost_observer};
use aberredcore::resources::assetstore::AssetStore;
use aberredcore::resources::audio::{AudioPlayerPool, AudioSource};
use aberredcore::resources::engineconfig::EngineConfig;
use aberredcore::resources::imageloader::{Image, ImageLoader};
use aberredcore::resources::sizes::Sizes;
use aberredcore::resources::texture::{Texture, TextureRegion};
use aberredcore::systems::audio::release_finished_players;
use aberredcore::systems::render::render_pass;
use bevy_ecs::prelude::*;
use clap::Parser;
use log::{error, info, warn};

/// Aberred core headless demo
#[derive(Parser)]
#[command(version, about = "Renders sprites, reloads textures and plays sounds against headless backends.")]
struct Cli {
    /// Configuration file.
    #[arg(long, value_name = "PATH", default_value = "./config.ini")]
    config: PathBuf,

    /// Number of frames to render.
    #[arg(long, default_value_t = 4)]
    frames: u32,

    /// PNG to load, relative to the configured assets path.
    /// A generated texture without reload path is used otherwise.
    #[arg(long, value_name = "PATH")]
    texture: Option<String>,

    /// Print quads as JSON lines.
    #[arg(long)]
    json: bool,

    /// Lua script run against the hero sprite (exposed as global `hero`).
    #[cfg(feature = "lua")]
    #[arg(long, value_name = "PATH")]
    script: Option<String>,
}

#[cfg(feature = "lua")]
fn script_sprite(path: &str, sprite: Sprite) -> Sprite {
    use aberredcore::resources::lua_runtime::LuaRuntime;

    let runtime = match LuaRuntime::new() {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("Failed to create Lua runtime: {e}");
            return sprite;
        }
    };
    let result = runtime
        .set_sprite("hero", sprite.clone())
        .and_then(|_| runtime.run_script(path))
        .and_then(|_| runtime.get_sprite("hero"));
    match result {
        Ok(scripted) => scripted,
        Err(e) => {
            error!("Lua script '{path}' failed: {e}");
            sprite
        }
    }
}

fn print_draw(frame: u32, draw: &DrawCall, json: bool) {
    if json {
        match serde_json::to_string(draw) {
            Ok(line) => println!("{line}"),
            Err(e) => error!("Cannot serialize draw call: {e}"),
        }
    } else {
        let corners: Vec<String> = draw
            .vertices
            .iter()
            .map(|v| format!("({:.1}, {:.1} | {:.2}, {:.2})", v.x, v.y, v.u, v.v))
            .collect();
        println!("frame {frame} {:?}: {}", draw.texture, corners.join(" "));
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let mut config = EngineConfig::with_path(&cli.config);
    if let Err(e) = config.load_from_file() {
        warn!("{e}; using defaults");
    }

    // --------------- Textures & assets ---------------
    let gpu = Arc::new(HeadlessGpu::new());
    let backend: Arc<dyn GpuBackend> = gpu.clone();
    let loader = ImageLoader::png(DiskFiles::new(&config.assets_path));

    let texture = match &cli.texture {
        Some(path) => match Texture::load(backend.clone(), &loader, path) {
            Ok(texture) => texture,
            Err(e) => {
                eprintln!("Error: {e}");
                std::process::exit(1);
            }
        },
        None => Texture::new(backend.clone(), &Image::filled(64, 32, [255, 255, 255, 255])),
    };
    let texture = Arc::new(texture);
    let (tex_w, tex_h) = (texture.width() as f32, texture.height() as f32);

    let mut assets = AssetStore::new();
    let hero_id = assets.add_texture(Some("hero"), texture.clone());
    let half_id = assets.add_region(
        Some("hero_left"),
        TextureRegion::from_pixels(&texture, 0.0, 0.0, tex_w / 2.0, tex_h),
    );
    let sizes = Sizes::from_config(&config);

    // --------------- ECS world + resources ---------------
    let mut world = World::new();

    let mut hero = Sprite::from_asset(hero_id, &assets, &sizes);
    hero.set_origin_to_center();
    hero.set_pos(sizes.virtual_width / 2.0, sizes.virtual_height / 2.0);
    #[cfg(feature = "lua")]
    if let Some(path) = &cli.script {
        hero = script_sprite(path, hero);
    }

    let mut half = Sprite::from_asset(half_id, &assets, &sizes);
    half.set_pos(16.0, 16.0);
    half.set_color(255.0, 128.0, 0.0);
    half.set_alpha(0.75);

    // Unknown id: inert sprite, logged and skipped by the render pass.
    let ghost = Sprite::from_asset(9999, &assets, &sizes);

    world.spawn(hero);
    world.spawn(half);
    world.spawn(ghost);

    let audio = HeadlessAudio::new();
    world.insert_resource(
        AudioPlayerPool::new(&audio, config.audio_players)
            .with_volumes(config.music_volume, config.sound_volume),
    );
    world.insert_resource(assets);
    world.insert_resource(sizes);
    world.insert_resource(loader);
    world.add_observer(context_lost_observer);

    let mut schedule = Schedule::default();
    schedule.add_systems(release_finished_players);

    // --------------- Frames ---------------
    let mut renderer = RecordingRenderer::new();
    for frame in 0..cli.frames {
        let mut sprites = world.query::<&mut Sprite>();
        for mut sprite in sprites.iter_mut(&mut world) {
            let angle = sprite.angle();
            sprite.set_angle(angle + 15.0);
        }

        schedule.run(&mut world);
        let drawn = render_pass(&mut world, &mut renderer);
        info!("frame {frame}: {drawn} quads");
        for draw in renderer.take() {
            print_draw(frame, &draw, cli.json);
        }
    }

    // --------------- Context loss ---------------
    let before = texture.handle();
    gpu.lose_context();
    info!("texture valid after context loss: {}", texture.is_valid());
    world.trigger(ContextLostEvent {});
    if texture.reload_path().is_none() {
        info!("generated texture has no reload path and stays invalid");
    }
    info!(
        "texture handle {:?} -> {:?}, valid: {}",
        before,
        texture.handle(),
        texture.is_valid()
    );

    // --------------- Audio ---------------
    let theme = Arc::new(AudioSource::new("theme", vec![0; 44_100], 44_100, 1));
    let blip = Arc::new(AudioSource::new("blip", vec![0; 4_410], 44_100, 1));
    {
        let mut pool = world.resource_mut::<AudioPlayerPool>();
        let _ = pool.play_music(&Arc::downgrade(&theme));
        // One request more than there are players: the last one is dropped.
        for _ in 0..=config.audio_players {
            let _ = pool.play_sound(&Arc::downgrade(&blip));
        }
        info!(
            "{} of {} sound players busy",
            pool.busy_players(),
            pool.players().len()
        );
        pool.stop_all_sounds();
        pool.stop_music();
    }
    info!("{} voice commands issued", audio.drain().len());
}
