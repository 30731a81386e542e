//! Pickups: one per pickup site, collected by the first live agent to touch it

use rand::Rng;

use crate::game::constants::pickup::RADIUS;
use crate::game::maze::Maze;
use crate::game::state::{Character, GameEvent, Pickup, PickupKind};

/// Place a random pickup on every pickup site of the maze
pub fn spawn<R: Rng>(maze: &Maze, rng: &mut R) -> Vec<Pickup> {
    maze.pickup_sites
        .iter()
        .map(|site| Pickup {
            position: site.center(),
            kind: PickupKind::ALL[rng.gen_range(0..PickupKind::ALL.len())],
            alive: true,
        })
        .collect()
}

/// Hand each pickup to the first live character (in roster order) that
/// overlaps it, then drop collected pickups
pub fn update(pickups: &mut Vec<Pickup>, characters: &mut [Character], events: &mut Vec<GameEvent>) {
    for pickup in pickups.iter_mut().filter(|p| p.alive) {
        let collector = characters
            .iter_mut()
            .find(|ch| ch.alive && ch.position.distance_to(pickup.position) < ch.radius() + RADIUS);
        if let Some(ch) = collector {
            ch.apply_pickup(pickup.kind);
            pickup.alive = false;
            events.push(GameEvent::PickupCollected {
                by: ch.id,
                kind: pickup.kind,
            });
        }
    }
    pickups.retain(|p| p.alive);
}
