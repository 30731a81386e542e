/// Maze and world geometry constants
pub mod map {
    /// Side length of one grid cell in world pixels
    pub const TILE_SIZE: f32 = 64.0;
    /// Default number of maze columns
    pub const DEFAULT_COLS: usize = 35;
    /// Default number of maze rows
    pub const DEFAULT_ROWS: usize = 25;
    /// Smallest grid (in either axis) the generator accepts
    pub const MIN_DIMENSION: usize = 3;
    /// Wall band thickness. Shared by collision, visibility and any renderer
    /// so the drawn walls and the solid walls are the same shape.
    pub const WALL_THICKNESS: f32 = 8.0;
    /// Spacing (in cells, both axes) between forced-open 2x2 rooms
    pub const ROOM_STRIDE: usize = 7;
    /// Inset of the four corner spawns from the map edge, in cells
    pub const SPAWN_MARGIN: usize = 2;
    /// Default cap on pickup sites per map
    pub const DEFAULT_PICKUP_CAP: usize = 18;
    /// Chance that an open cell (3+ passages) receives a decoration
    pub const DECORATION_CHANCE: f64 = 0.12;
    /// Max decoration offset from the cell centre, in pixels
    pub const DECORATION_JITTER: f32 = 10.0;
}

/// Collision resolver tuning
pub mod collision {
    /// Overlap tolerated before a body is pushed. Keeps a body that already
    /// rests on a wall face from being nudged again by float rounding.
    pub const CONTACT_EPSILON: f32 = 1e-3;
    /// Upper bound on sweeps over the neighbourhood per resolve call
    pub const MAX_PASSES: usize = 16;
}

/// Line-of-sight sampling
pub mod visibility {
    use super::map::WALL_THICKNESS;

    /// Distance between samples along a sight line. Never larger than a wall
    /// band, so a band the segment crosses always holds a sample.
    pub const LOS_STEP: f32 = WALL_THICKNESS;
}

/// Bot controller constants
pub mod bot {
    /// Beyond this distance a bot does not even test line of sight
    pub const LOS_RANGE: f32 = 420.0;
    /// Bots only stand and shoot inside this distance
    pub const SHOOT_RANGE: f32 = 320.0;
    /// Health fraction under which a bot spends a full meter immediately
    pub const ABILITY_HP_THRESHOLD: f32 = 0.5;
    /// A decoy closer than this fraction of the target distance lures the bot
    pub const DECOY_LURE_RATIO: f32 = 0.6;
    /// Distance at which a waypoint counts as reached
    pub const WAYPOINT_TOLERANCE: f32 = 8.0;
    /// Max wander heading change per tick (radians, centred on zero)
    pub const WANDER_JITTER: f32 = 0.3;
    /// Wander speed relative to normal movement speed
    pub const WANDER_SPEED_FACTOR: f32 = 0.5;
    /// Profiles with aim spread below this strafe while shooting
    pub const STRAFE_SPREAD_LIMIT: f32 = 0.25;
    /// Time scale of the strafe oscillation, in seconds per radian
    pub const STRAFE_PERIOD: f32 = 0.6;
    /// Bot speed factor while bullet time is active
    pub const BULLET_TIME_FACTOR: f32 = 0.3;
}

/// Character upkeep
pub mod character {
    /// Passive regeneration, HP per second
    pub const HP_REGEN_RATE: f32 = 1.0;
    /// Passive meter fill per second (full in 25 s)
    pub const METER_PASSIVE_RATE: f32 = 0.04;
    /// Meter gained per point of damage dealt
    pub const METER_DAMAGE_BONUS: f32 = 0.004;
    /// Fraction of incoming damage that gets through a shield
    pub const SHIELD_DAMAGE_FACTOR: f32 = 0.2;
    /// Gap between the body edge and a freshly spawned projectile
    pub const MUZZLE_GAP: f32 = 2.0;
}

/// Pickup effects
pub mod pickup {
    /// Pickup collection radius
    pub const RADIUS: f32 = 12.0;
    /// HP restored by a health pickup
    pub const HP_RESTORE: f32 = 50.0;
    /// Speed multiplier granted by a speed pickup
    pub const SPEED_MULT: f32 = 1.5;
    /// Damage multiplier granted by a damage pickup
    pub const DAMAGE_MULT: f32 = 1.5;
    /// Duration of speed and damage buffs, seconds
    pub const BUFF_DURATION: f32 = 5.0;
}

/// Archetype special abilities
pub mod ability {
    /// Tank shield duration, seconds
    pub const SHIELD_DURATION: f32 = 3.0;
    /// Sniper bullet time duration, seconds
    pub const BULLET_TIME_DURATION: f32 = 3.0;
    /// Speedster dash length, pixels
    pub const DASH_DISTANCE: f32 = 200.0;
    /// Lifetime of the decoy left behind by a dash, seconds
    pub const DECOY_LIFETIME: f32 = 2.0;
    /// Grenadier barrage volley offsets from the facing angle, radians
    pub const BARRAGE_OFFSETS: [f32; 5] = [-0.28, -0.14, 0.0, 0.14, 0.28];
}

/// Simulation stepping
pub mod sim {
    /// Nominal tick rate in Hz
    pub const TICK_RATE: u32 = 60;
    /// Default delta time per tick in seconds
    pub const DEFAULT_DT: f32 = 1.0 / TICK_RATE as f32;
    /// Largest step a single tick may advance. Longer frames are clamped.
    pub const MAX_DT: f32 = 0.05;
    /// Default match time limit in seconds
    pub const DEFAULT_MAX_SECONDS: f32 = 180.0;
    /// Default bot count
    pub const DEFAULT_BOT_COUNT: usize = 3;
    /// Largest bot count a match accepts
    pub const MAX_BOTS: usize = 16;
}
