//! Bot controller
//!
//! Each bot owns a `BotController` that, once per tick, checks sight of the
//! primary agent, keeps a throttled A* path toward it (or toward a decoy that
//! fooled it), moves, aims, fires and spends its ability. Competence comes
//! from a `DifficultyProfile`.

use std::collections::VecDeque;
use std::f32::consts::{FRAC_PI_2, TAU};

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::game::constants::bot::*;
use crate::game::grid::{CellCoord, WorldGeometry};
use crate::game::state::{Character, GameEvent, WorldServices};
use crate::game::systems::ability;
use crate::util::vec2::Vec2;

/// Named difficulty presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
}

impl Difficulty {
    pub fn name(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Medium => "medium",
            Difficulty::Hard => "hard",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        [Difficulty::Easy, Difficulty::Medium, Difficulty::Hard]
            .into_iter()
            .find(|d| d.name().eq_ignore_ascii_case(name.trim()))
    }

    pub fn profile(self) -> DifficultyProfile {
        match self {
            Difficulty::Easy => DifficultyProfile {
                path_recalc: 2.5,
                aim_spread: 0.52,
                reaction_delay: 1.2,
                speed_mult: 0.60,
                damage_mult: 0.35,
                fire_rate_mult: 0.5,
            },
            Difficulty::Medium => DifficultyProfile {
                path_recalc: 1.2,
                aim_spread: 0.26,
                reaction_delay: 0.5,
                speed_mult: 0.80,
                damage_mult: 0.65,
                fire_rate_mult: 0.75,
            },
            Difficulty::Hard => DifficultyProfile {
                path_recalc: 0.4,
                aim_spread: 0.06,
                reaction_delay: 0.12,
                speed_mult: 1.00,
                damage_mult: 1.00,
                fire_rate_mult: 1.00,
            },
        }
    }
}

/// Bot competence knobs
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DifficultyProfile {
    /// Seconds between path recomputes
    pub path_recalc: f32,
    /// Total random aim error, radians
    pub aim_spread: f32,
    /// Seconds between first sighting and first shot
    pub reaction_delay: f32,
    pub speed_mult: f32,
    /// Applied to each shot, never stored on the character
    pub damage_mult: f32,
    /// Chance that a ready weapon actually fires on a given tick
    pub fire_rate_mult: f32,
}

/// Sighting state of a bot toward its target
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SightState {
    /// No line of sight
    Unaware,
    /// Target just spotted; holding fire until the countdown ends
    Reacting { remaining: f32 },
    /// Target in sight and reaction time served
    Engaged,
}

/// What the controller sees of its target this tick
#[derive(Debug, Clone, Copy)]
pub struct Target {
    pub position: Vec2,
    pub alive: bool,
}

impl From<&Character> for Target {
    fn from(ch: &Character) -> Self {
        Self {
            position: ch.position,
            alive: ch.alive,
        }
    }
}

/// Summary of one controller tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct BotTick {
    pub has_los: bool,
    pub pellets_fired: usize,
    pub ability_used: bool,
}

/// Per-bot navigation and combat state
#[derive(Debug, Clone)]
pub struct BotController {
    profile: DifficultyProfile,
    path: VecDeque<CellCoord>,
    path_timer: f32,
    sight: SightState,
    wander_heading: f32,
}

impl BotController {
    pub fn new<R: Rng>(profile: DifficultyProfile, rng: &mut R) -> Self {
        Self {
            profile,
            path: VecDeque::new(),
            path_timer: 0.0,
            sight: SightState::Unaware,
            wander_heading: rng.gen_range(0.0..TAU),
        }
    }

    pub fn profile(&self) -> &DifficultyProfile {
        &self.profile
    }

    pub fn sight(&self) -> SightState {
        self.sight
    }

    /// Remaining waypoints, next first
    pub fn path(&self) -> &VecDeque<CellCoord> {
        &self.path
    }

    /// Run one tick for `me`. A downed bot, or one whose target is down,
    /// does nothing. While lured, the bot aims at the decoy; sight and range
    /// are still judged against the target.
    pub fn update<G: WorldGeometry, R: Rng>(
        &mut self,
        me: &mut Character,
        target: Target,
        geometry: &G,
        world: &mut WorldServices,
        rng: &mut R,
        dt: f32,
    ) -> BotTick {
        let mut tick = BotTick::default();
        if !me.alive || !target.alive {
            return tick;
        }

        let speed_scale = if world.bullet_time_active() {
            self.profile.speed_mult * BULLET_TIME_FACTOR
        } else {
            self.profile.speed_mult
        };

        let distance = me.position.distance_to(target.position);
        let has_los = distance < LOS_RANGE && geometry.has_los(me.position, target.position);
        tick.has_los = has_los;

        let focus = match world.nearest_decoy(me.position) {
            Some((decoy, d)) if d < distance * DECOY_LURE_RATIO => decoy,
            _ => target.position,
        };

        self.path_timer -= dt;
        if self.path_timer <= 0.0 {
            self.path_timer = self.profile.path_recalc;
            self.path = geometry.find_path(me.position, focus).into();
            trace!(bot = me.id, steps = self.path.len(), "Path recomputed");
        }

        let in_range = has_los && distance < SHOOT_RANGE;
        if in_range {
            if self.profile.aim_spread < STRAFE_SPREAD_LIMIT {
                let lateral = Vec2::from_angle(me.position.angle_to_point(target.position) + FRAC_PI_2);
                let speed = (world.clock / STRAFE_PERIOD).sin() * me.move_speed() * speed_scale;
                self.move_by(me, lateral * (speed * dt), geometry);
            }
        } else {
            self.follow_path(me, speed_scale, geometry, rng, dt);
        }

        if has_los {
            if self.sight == SightState::Unaware {
                self.sight = SightState::Reacting {
                    remaining: self.profile.reaction_delay,
                };
            }
            let error = (rng.gen::<f32>() - 0.5) * self.profile.aim_spread;
            me.angle = me.position.angle_to_point(focus) + error;

            match self.sight {
                SightState::Reacting { remaining } if remaining > 0.0 => {
                    let remaining = remaining - dt;
                    self.sight = if remaining > 0.0 {
                        SightState::Reacting { remaining }
                    } else {
                        SightState::Engaged
                    };
                }
                _ => {
                    self.sight = SightState::Engaged;
                    if distance < SHOOT_RANGE && me.can_fire() {
                        tick.pellets_fired = self.try_fire(me, world, rng);
                    }
                }
            }
        } else {
            self.sight = SightState::Unaware;
            if let Some(next) = self.path.front() {
                me.angle = me.position.angle_to_point(next.center());
            }
        }

        if me.meter >= 1.0 && (me.hp_fraction() < ABILITY_HP_THRESHOLD || in_range) {
            tick.ability_used = ability::activate(me, geometry, world, rng);
        }

        tick
    }

    /// Bernoulli trial against the fire-rate multiplier. A failed trial still
    /// burns the cooldown.
    fn try_fire<R: Rng>(&self, me: &mut Character, world: &mut WorldServices, rng: &mut R) -> usize {
        if rng.gen::<f32>() < self.profile.fire_rate_mult {
            let volley = me.fire(me.angle, self.profile.damage_mult, rng);
            let pellets = volley.len();
            world.emit(GameEvent::Fired { by: me.id, pellets });
            world.projectiles.extend(volley);
            pellets
        } else {
            me.fire_cooldown = 1.0 / me.stats().fire_rate;
            0
        }
    }

    fn follow_path<G: WorldGeometry, R: Rng>(
        &mut self,
        me: &mut Character,
        speed_scale: f32,
        geometry: &G,
        rng: &mut R,
        dt: f32,
    ) {
        let Some(next) = self.path.front().copied() else {
            self.wander_heading += (rng.gen::<f32>() - 0.5) * WANDER_JITTER;
            let speed = me.move_speed() * speed_scale * WANDER_SPEED_FACTOR;
            self.move_by(me, Vec2::from_angle(self.wander_heading) * (speed * dt), geometry);
            return;
        };

        let (dir, dist) = (next.center() - me.position).normalize_with_length();
        if dist < WAYPOINT_TOLERANCE {
            self.path.pop_front();
            return;
        }
        let step = (me.move_speed() * speed_scale * dt).min(dist);
        self.move_by(me, dir * step, geometry);
    }

    fn move_by<G: WorldGeometry>(&self, me: &mut Character, delta: Vec2, geometry: &G) {
        me.position = geometry.resolve_circle(me.position + delta, me.radius());
    }
}
