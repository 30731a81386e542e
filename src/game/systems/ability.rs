//! Archetype special abilities
//!
//! A full meter buys one activation; the meter drops back to zero.

use rand::Rng;

use crate::game::constants::ability::*;
use crate::game::grid::WorldGeometry;
use crate::game::state::{Archetype, Character, Decoy, GameEvent, WorldServices};
use crate::util::vec2::Vec2;

/// Spend a full meter on the character's ability. Returns false (and does
/// nothing) if the meter is not full or the character is down.
pub fn activate<G: WorldGeometry, R: Rng>(
    ch: &mut Character,
    geometry: &G,
    world: &mut WorldServices,
    rng: &mut R,
) -> bool {
    if !ch.alive || ch.meter < 1.0 {
        return false;
    }
    ch.meter = 0.0;

    match ch.archetype {
        Archetype::Tank => {
            ch.shield_timer = SHIELD_DURATION;
        }
        Archetype::Sniper => {
            world.start_bullet_time();
        }
        Archetype::Speedster => dash(ch, geometry, world),
        Archetype::Grenadier => {
            for offset in BARRAGE_OFFSETS {
                let volley = ch.spawn_volley(ch.angle + offset, 1.0, rng);
                world.projectiles.extend(volley);
            }
        }
    }

    world.emit(GameEvent::AbilityUsed {
        by: ch.id,
        archetype: ch.archetype,
    });
    true
}

/// Drop a decoy, then jump along the facing and settle against walls
fn dash<G: WorldGeometry>(ch: &mut Character, geometry: &G, world: &mut WorldServices) {
    let radius = ch.radius();
    world.decoys.push(Decoy {
        position: ch.position,
        radius,
        remaining: DECOY_LIFETIME,
    });

    let bounds = geometry.bounds();
    let target = ch.position + Vec2::from_angle(ch.angle) * DASH_DISTANCE;
    let clamped = target.clamp(
        Vec2::new(radius, radius),
        Vec2::new(bounds.x - radius, bounds.y - radius),
    );
    ch.position = geometry.resolve_circle(clamped, radius);
}
