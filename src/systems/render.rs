use bevy_ecs::prelude::*;

use crate::backend::renderer::QuadRenderer;
use crate::components::sprite::Sprite;

/// Draw every [`Sprite`] in the world, one quad each.
///
/// No sorting or batching: sprites are submitted in query order. Sprites whose
/// texture expired are skipped (and reported by [`Sprite::render`]). Returns
/// the number of quads submitted.
pub fn render_pass(world: &mut World, renderer: &mut dyn QuadRenderer) -> usize {
    let mut query = world.query::<&Sprite>();
    let mut drawn = 0;
    for sprite in query.iter(world) {
        if sprite.render(renderer).is_ok() {
            drawn += 1;
        }
    }
    drawn
}
