//! Projectile flight and impact
//!
//! Rounds fly straight, stop at their range, at the first wall sample, or on
//! the first live non-owner they touch. Explosive rounds splash in all three
//! cases. Splash falls off linearly with distance and is not blocked by walls.

use crate::game::grid::WorldGeometry;
use crate::game::state::{AgentId, Character, GameEvent, Projectile, WorldServices};

/// Advance every projectile by `dt` and apply hits
pub fn update<G: WorldGeometry>(
    world: &mut WorldServices,
    characters: &mut [Character],
    geometry: &G,
    dt: f32,
) {
    let mut projectiles = std::mem::take(&mut world.projectiles);

    for p in projectiles.iter_mut().filter(|p| p.alive) {
        let step = p.velocity * dt;
        p.position += step;
        p.traveled += step.length();

        if p.traveled >= p.range || geometry.is_wall(p.position) {
            if let Some(radius) = p.aoe_radius {
                detonate(p, radius, characters, world);
            }
            p.alive = false;
            continue;
        }

        let struck = characters.iter().position(|ch| {
            ch.alive && ch.id != p.owner && ch.position.distance_to(p.position) < ch.radius() + p.radius
        });
        if let Some(target) = struck {
            match p.aoe_radius {
                Some(radius) => detonate(p, radius, characters, world),
                None => apply_hit(characters, p.owner, target, p.damage, world),
            }
            p.alive = false;
        }
    }

    projectiles.retain(|p| p.alive);
    world.projectiles = projectiles;
}

/// Splash every live non-owner within `radius + body radius`
fn detonate(p: &Projectile, radius: f32, characters: &mut [Character], world: &mut WorldServices) {
    world.emit(GameEvent::Explosion {
        position: p.position,
        radius,
    });
    for target in 0..characters.len() {
        let ch = &characters[target];
        if !ch.alive || ch.id == p.owner {
            continue;
        }
        let reach = radius + ch.radius();
        let dist = ch.position.distance_to(p.position);
        if dist < reach {
            let damage = p.damage * (1.0 - dist / reach);
            apply_hit(characters, p.owner, target, damage, world);
        }
    }
}

/// Damage `target`, credit `owner`, and record an elimination if it dies
fn apply_hit(
    characters: &mut [Character],
    owner: AgentId,
    target: usize,
    damage: f32,
    world: &mut WorldServices,
) {
    let victim = &mut characters[target];
    let was_alive = victim.alive;
    victim.take_damage(damage);
    let killed = was_alive && !victim.alive;
    let victim_id = victim.id;
    if killed {
        victim.eliminated_at = Some(world.clock);
    }

    world.emit(GameEvent::Hit {
        target: victim_id,
        by: owner,
        damage,
    });

    if let Some(shooter) = characters.iter_mut().find(|c| c.id == owner) {
        shooter.record_damage_dealt(damage);
        if killed {
            shooter.kills += 1;
        }
    }
    if killed {
        world.emit(GameEvent::Eliminated {
            victim: victim_id,
            by: owner,
        });
    }
}
