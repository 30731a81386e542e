//! Match entities
//!
//! Characters, their weapons, projectiles in flight, decoys and pickups,
//! plus the per-tick services (`WorldServices`) handed to every controller.

use rand::Rng;
use serde::{Deserialize, Serialize};
use smallvec::SmallVec;

use crate::game::constants::{ability, character, pickup};
use crate::util::vec2::Vec2;

/// Index of an agent in the match roster. The primary agent is always 0.
pub type AgentId = usize;

/// Ranged weapon kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Weapon {
    Shotgun,
    Rifle,
    Smg,
    Launcher,
}

/// Static weapon data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WeaponStats {
    pub pellets: u8,
    /// Total spread in radians. Multi-pellet weapons fan evenly across it,
    /// single-pellet weapons pick a random offset inside it.
    pub spread: f32,
    pub projectile_speed: f32,
    pub damage: f32,
    pub range: f32,
    pub projectile_radius: f32,
    /// Splash radius for explosive rounds
    pub aoe_radius: Option<f32>,
}

impl Weapon {
    pub const fn stats(self) -> WeaponStats {
        match self {
            Weapon::Shotgun => WeaponStats {
                pellets: 5,
                spread: 0.44,
                projectile_speed: 420.0,
                damage: 22.0,
                range: 260.0,
                projectile_radius: 4.0,
                aoe_radius: None,
            },
            Weapon::Rifle => WeaponStats {
                pellets: 1,
                spread: 0.0,
                projectile_speed: 700.0,
                damage: 115.0,
                range: 700.0,
                projectile_radius: 4.0,
                aoe_radius: None,
            },
            Weapon::Smg => WeaponStats {
                pellets: 1,
                spread: 0.07,
                projectile_speed: 500.0,
                damage: 14.0,
                range: 320.0,
                projectile_radius: 3.0,
                aoe_radius: None,
            },
            Weapon::Launcher => WeaponStats {
                pellets: 1,
                spread: 0.0,
                projectile_speed: 300.0,
                damage: 80.0,
                range: 380.0,
                projectile_radius: 7.0,
                aoe_radius: Some(64.0),
            },
        }
    }
}

/// Playable archetypes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Archetype {
    Tank,
    Sniper,
    Speedster,
    Grenadier,
}

/// Static archetype data
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArchetypeStats {
    pub max_hp: f32,
    pub speed: f32,
    pub radius: f32,
    pub weapon: Weapon,
    /// Shots per second
    pub fire_rate: f32,
}

impl Archetype {
    pub const ALL: [Archetype; 4] = [
        Archetype::Tank,
        Archetype::Sniper,
        Archetype::Speedster,
        Archetype::Grenadier,
    ];

    pub const fn stats(self) -> ArchetypeStats {
        match self {
            Archetype::Tank => ArchetypeStats {
                max_hp: 400.0,
                speed: 85.0,
                radius: 17.0,
                weapon: Weapon::Shotgun,
                fire_rate: 0.9,
            },
            Archetype::Sniper => ArchetypeStats {
                max_hp: 160.0,
                speed: 165.0,
                radius: 13.0,
                weapon: Weapon::Rifle,
                fire_rate: 0.9,
            },
            Archetype::Speedster => ArchetypeStats {
                max_hp: 200.0,
                speed: 230.0,
                radius: 12.0,
                weapon: Weapon::Smg,
                fire_rate: 7.0,
            },
            Archetype::Grenadier => ArchetypeStats {
                max_hp: 240.0,
                speed: 115.0,
                radius: 15.0,
                weapon: Weapon::Launcher,
                fire_rate: 0.65,
            },
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Archetype::Tank => "tank",
            Archetype::Sniper => "sniper",
            Archetype::Speedster => "speedster",
            Archetype::Grenadier => "grenadier",
        }
    }

    /// Case-insensitive lookup by name
    pub fn from_name(name: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(name.trim()))
    }
}

/// Projectiles produced by one trigger pull (a shotgun blast is 5)
pub type Volley = SmallVec<[Projectile; 5]>;

/// A combatant: the primary agent or a bot
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Character {
    pub position: Vec2,
    /// Facing angle in radians
    pub angle: f32,
    pub hp: f32,
    pub alive: bool,
    pub fire_cooldown: f32,
    /// Ability charge, 0..=1
    pub meter: f32,
    pub speed_mult: f32,
    pub damage_mult: f32,
    pub speed_buff_timer: f32,
    pub damage_buff_timer: f32,
    pub shield_timer: f32,

    pub kills: u32,
    pub damage_dealt: f32,
    pub eliminated_at: Option<f32>,

    pub id: AgentId,
    pub archetype: Archetype,
    pub is_primary: bool,
}

impl Character {
    pub fn new(id: AgentId, archetype: Archetype, position: Vec2, is_primary: bool) -> Self {
        Self {
            position,
            angle: 0.0,
            hp: archetype.stats().max_hp,
            alive: true,
            fire_cooldown: 0.0,
            meter: 0.0,
            speed_mult: 1.0,
            damage_mult: 1.0,
            speed_buff_timer: 0.0,
            damage_buff_timer: 0.0,
            shield_timer: 0.0,
            kills: 0,
            damage_dealt: 0.0,
            eliminated_at: None,
            id,
            archetype,
            is_primary,
        }
    }

    #[inline]
    pub fn stats(&self) -> ArchetypeStats {
        self.archetype.stats()
    }

    #[inline]
    pub fn radius(&self) -> f32 {
        self.stats().radius
    }

    #[inline]
    pub fn max_hp(&self) -> f32 {
        self.stats().max_hp
    }

    #[inline]
    pub fn hp_fraction(&self) -> f32 {
        self.hp / self.max_hp()
    }

    /// Movement speed including the pickup buff
    #[inline]
    pub fn move_speed(&self) -> f32 {
        self.stats().speed * self.speed_mult
    }

    #[inline]
    pub fn shielded(&self) -> bool {
        self.shield_timer > 0.0
    }

    /// Regen, meter fill, cooldowns and buff expiry
    pub fn update(&mut self, dt: f32) {
        if !self.alive {
            return;
        }

        let max_hp = self.max_hp();
        if self.hp < max_hp {
            self.hp = (self.hp + character::HP_REGEN_RATE * dt).min(max_hp);
        }
        if self.meter < 1.0 {
            self.meter = (self.meter + character::METER_PASSIVE_RATE * dt).min(1.0);
        }
        if self.fire_cooldown > 0.0 {
            self.fire_cooldown -= dt;
        }

        if self.speed_buff_timer > 0.0 {
            self.speed_buff_timer -= dt;
            if self.speed_buff_timer <= 0.0 {
                self.speed_buff_timer = 0.0;
                self.speed_mult = 1.0;
            }
        }
        if self.damage_buff_timer > 0.0 {
            self.damage_buff_timer -= dt;
            if self.damage_buff_timer <= 0.0 {
                self.damage_buff_timer = 0.0;
                self.damage_mult = 1.0;
            }
        }
        if self.shield_timer > 0.0 {
            self.shield_timer = (self.shield_timer - dt).max(0.0);
        }
    }

    #[inline]
    pub fn can_fire(&self) -> bool {
        self.alive && self.fire_cooldown <= 0.0
    }

    /// Pull the trigger. Starts the cooldown and returns the volley, or an
    /// empty volley if the weapon is not ready.
    ///
    /// `damage_scale` applies to this volley only; `damage_mult` is untouched.
    pub fn fire<R: Rng>(&mut self, angle: f32, damage_scale: f32, rng: &mut R) -> Volley {
        if !self.can_fire() {
            return Volley::new();
        }
        self.fire_cooldown = 1.0 / self.stats().fire_rate;
        self.spawn_volley(angle, damage_scale, rng)
    }

    /// Build a volley without touching the cooldown
    pub fn spawn_volley<R: Rng>(&self, angle: f32, damage_scale: f32, rng: &mut R) -> Volley {
        let weapon = self.stats().weapon.stats();
        let damage = weapon.damage * self.damage_mult * damage_scale;
        let muzzle = self.radius() + weapon.projectile_radius + character::MUZZLE_GAP;

        (0..weapon.pellets)
            .map(|i| {
                let heading = if weapon.pellets > 1 {
                    let step = weapon.spread / f32::from(weapon.pellets - 1);
                    angle - weapon.spread / 2.0 + step * f32::from(i)
                } else if weapon.spread > 0.0 {
                    angle + (rng.gen::<f32>() - 0.5) * weapon.spread
                } else {
                    angle
                };
                let dir = Vec2::from_angle(heading);
                Projectile {
                    owner: self.id,
                    position: self.position + dir * muzzle,
                    velocity: dir * weapon.projectile_speed,
                    damage,
                    range: weapon.range,
                    traveled: 0.0,
                    radius: weapon.projectile_radius,
                    aoe_radius: weapon.aoe_radius,
                    alive: true,
                }
            })
            .collect()
    }

    /// Apply incoming damage. Returns the amount actually taken.
    pub fn take_damage(&mut self, amount: f32) -> f32 {
        if !self.alive {
            return 0.0;
        }
        let taken = if self.shielded() {
            amount * character::SHIELD_DAMAGE_FACTOR
        } else {
            amount
        };
        self.hp -= taken;
        if self.hp <= 0.0 {
            self.hp = 0.0;
            self.alive = false;
        }
        taken
    }

    /// Credit outgoing damage; also charges the meter
    pub fn record_damage_dealt(&mut self, amount: f32) {
        self.damage_dealt += amount;
        self.meter = (self.meter + amount * character::METER_DAMAGE_BONUS).min(1.0);
    }

    pub fn apply_pickup(&mut self, kind: PickupKind) {
        match kind {
            PickupKind::Health => {
                self.hp = (self.hp + pickup::HP_RESTORE).min(self.max_hp());
            }
            PickupKind::Speed => {
                self.speed_mult = pickup::SPEED_MULT;
                self.speed_buff_timer = pickup::BUFF_DURATION;
            }
            PickupKind::Damage => {
                self.damage_mult = pickup::DAMAGE_MULT;
                self.damage_buff_timer = pickup::BUFF_DURATION;
            }
            PickupKind::Meter => {
                self.meter = 1.0;
            }
        }
    }
}

/// A round in flight
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub owner: AgentId,
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: f32,
    pub range: f32,
    pub traveled: f32,
    pub radius: f32,
    pub aoe_radius: Option<f32>,
    pub alive: bool,
}

/// Stationary lure left behind by a dash
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decoy {
    pub position: Vec2,
    pub radius: f32,
    pub remaining: f32,
}

/// Pickup effect kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PickupKind {
    Health,
    Speed,
    Damage,
    Meter,
}

impl PickupKind {
    pub const ALL: [PickupKind; 4] = [
        PickupKind::Health,
        PickupKind::Speed,
        PickupKind::Damage,
        PickupKind::Meter,
    ];
}

/// A consumable sitting on a pickup site
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Pickup {
    pub position: Vec2,
    pub kind: PickupKind,
    pub alive: bool,
}

/// Things that happened during a tick, for whoever drives sound or stats
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    Fired { by: AgentId, pellets: usize },
    Hit { target: AgentId, by: AgentId, damage: f32 },
    Eliminated { victim: AgentId, by: AgentId },
    Explosion { position: Vec2, radius: f32 },
    AbilityUsed { by: AgentId, archetype: Archetype },
    PickupCollected { by: AgentId, kind: PickupKind },
}

/// Shared mutable world context handed to controllers and abilities each
/// call, in place of any global state.
#[derive(Debug, Default)]
pub struct WorldServices {
    pub projectiles: Vec<Projectile>,
    pub decoys: Vec<Decoy>,
    pub events: Vec<GameEvent>,
    /// Remaining bullet time in seconds; 0 when inactive
    pub bullet_time: f32,
    /// Simulated seconds since match start
    pub clock: f32,
}

impl WorldServices {
    pub fn new() -> Self {
        Self::default()
    }

    #[inline]
    pub fn bullet_time_active(&self) -> bool {
        self.bullet_time > 0.0
    }

    pub fn start_bullet_time(&mut self) {
        self.bullet_time = ability::BULLET_TIME_DURATION;
    }

    pub fn advance_bullet_time(&mut self, dt: f32) {
        if self.bullet_time > 0.0 {
            self.bullet_time = (self.bullet_time - dt).max(0.0);
        }
    }

    /// Closest decoy to `from` and its distance
    pub fn nearest_decoy(&self, from: Vec2) -> Option<(Vec2, f32)> {
        self.decoys
            .iter()
            .map(|d| (d.position, d.position.distance_to(from)))
            .min_by(|a, b| a.1.total_cmp(&b.1))
    }

    /// Count down decoys and drop expired ones
    pub fn update_decoys(&mut self, dt: f32) {
        for decoy in &mut self.decoys {
            decoy.remaining -= dt;
        }
        self.decoys.retain(|d| d.remaining > 0.0);
    }

    pub fn emit(&mut self, event: GameEvent) {
        self.events.push(event);
    }
}
