//! Match loop
//!
//! A `Match` owns one maze, the roster (primary agent at index 0, bots after
//! it), the shared world services and the match RNG. `tick` advances it by one
//! fixed step in a fixed order so a seed replays exactly.

use std::collections::VecDeque;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use tracing::{info, warn};

use crate::config::SimConfig;
use crate::game::constants::bot::{SHOOT_RANGE, WAYPOINT_TOLERANCE};
use crate::game::constants::sim::{MAX_DT, TICK_RATE};
use crate::game::grid::{CellCoord, WorldGeometry};
use crate::game::match_result::{check_match_end, determine_result, MatchEndReason, MatchSummary};
use crate::game::maze::{Maze, MazeError};
use crate::game::performance::{PerformanceMonitor, PerformanceReport};
use crate::game::state::{AgentId, Archetype, Character, GameEvent, Pickup, WorldServices};
use crate::game::systems::ai::{BotController, Target};
use crate::game::systems::{ability, pickup, projectile};
use crate::util::vec2::Vec2;

/// Primary agent id
pub const PRIMARY: AgentId = 0;

/// What the primary agent wants to do this tick
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PrimaryInput {
    /// Desired direction; normalised before use, zero to stand still
    pub movement: Vec2,
    /// New facing, or keep the current one
    pub aim: Option<f32>,
    pub fire: bool,
    pub ability: bool,
}

/// One running match
pub struct Match {
    seed: u64,
    maze: Maze,
    characters: Vec<Character>,
    /// `controllers[i]` drives `characters[i + 1]`
    controllers: Vec<BotController>,
    world: WorldServices,
    pickups: Vec<Pickup>,
    rng: StdRng,
    max_seconds: f32,
    ticks: u64,
    end_reason: Option<MatchEndReason>,
}

impl Match {
    /// Generate the maze and roster for `seed`
    pub fn new(config: &SimConfig, seed: u64) -> Result<Self, MazeError> {
        let mut rng = StdRng::seed_from_u64(seed);
        let maze = Maze::generate(config.cols, config.rows, config.pickup_cap, &mut rng)?;

        let mut pool: Vec<Archetype> = Archetype::ALL
            .into_iter()
            .filter(|a| *a != config.player_archetype)
            .collect();
        pool.shuffle(&mut rng);

        let mut characters = Vec::with_capacity(config.bot_count + 1);
        characters.push(Character::new(
            PRIMARY,
            config.player_archetype,
            maze.spawn_for(PRIMARY).center(),
            true,
        ));

        let mut controllers = Vec::with_capacity(config.bot_count);
        for i in 0..config.bot_count {
            let id = i + 1;
            let archetype = pool[i % pool.len()];
            characters.push(Character::new(id, archetype, maze.spawn_for(id).center(), false));
            controllers.push(BotController::new(config.difficulty.profile(), &mut rng));
        }

        let pickups = pickup::spawn(&maze, &mut rng);

        info!(
            seed,
            bots = config.bot_count,
            difficulty = config.difficulty.name(),
            player = config.player_archetype.name(),
            pickups = pickups.len(),
            "Match started"
        );

        Ok(Self {
            seed,
            maze,
            characters,
            controllers,
            world: WorldServices::new(),
            pickups,
            rng,
            max_seconds: config.max_seconds,
            ticks: 0,
            end_reason: None,
        })
    }

    /// Advance one step. `dt` is clamped to 0.05 s. Returns the end reason
    /// once the match is over; further ticks do nothing.
    pub fn tick(&mut self, dt: f32, input: PrimaryInput) -> Option<MatchEndReason> {
        if self.end_reason.is_some() {
            return self.end_reason;
        }
        let dt = dt.clamp(0.0, MAX_DT);
        self.world.events.clear();

        self.world.advance_bullet_time(dt);
        self.update_primary(input, dt);
        self.update_bots(dt);
        projectile::update(&mut self.world, &mut self.characters, &self.maze.grid, dt);
        pickup::update(&mut self.pickups, &mut self.characters, &mut self.world.events);
        self.world.update_decoys(dt);
        self.world.clock += dt;
        self.ticks += 1;

        self.end_reason = check_match_end(&self.characters, self.world.clock, self.max_seconds);
        if let Some(reason) = self.end_reason {
            info!(
                seed = self.seed,
                ?reason,
                seconds = self.world.clock,
                ticks = self.ticks,
                "Match ended"
            );
        }
        self.end_reason
    }

    fn update_primary(&mut self, input: PrimaryInput, dt: f32) {
        let grid = &self.maze.grid;
        let me = &mut self.characters[PRIMARY];
        me.update(dt);
        if !me.alive {
            return;
        }

        let dir = input.movement.normalize();
        if dir != Vec2::ZERO {
            me.position = grid.resolve_circle(me.position + dir * (me.move_speed() * dt), me.radius());
        }
        if let Some(angle) = input.aim {
            me.angle = angle;
        }
        if input.fire {
            let volley = me.fire(me.angle, 1.0, &mut self.rng);
            if !volley.is_empty() {
                self.world.emit(GameEvent::Fired {
                    by: me.id,
                    pellets: volley.len(),
                });
                self.world.projectiles.extend(volley);
            }
        }
        if input.ability {
            ability::activate(me, grid, &mut self.world, &mut self.rng);
        }
    }

    fn update_bots(&mut self, dt: f32) {
        let (primary, bots) = self.characters.split_at_mut(1);
        let target = Target::from(&primary[PRIMARY]);

        for (bot, controller) in bots.iter_mut().zip(&mut self.controllers) {
            bot.update(dt);
            controller.update(bot, target, &self.maze.grid, &mut self.world, &mut self.rng, dt);
        }
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    pub fn maze(&self) -> &Maze {
        &self.maze
    }

    pub fn characters(&self) -> &[Character] {
        &self.characters
    }

    pub fn primary(&self) -> &Character {
        &self.characters[PRIMARY]
    }

    pub fn controllers(&self) -> &[BotController] {
        &self.controllers
    }

    pub fn world(&self) -> &WorldServices {
        &self.world
    }

    /// Events raised during the last tick
    pub fn events(&self) -> &[GameEvent] {
        &self.world.events
    }

    pub fn pickups(&self) -> &[Pickup] {
        &self.pickups
    }

    pub fn clock(&self) -> f32 {
        self.world.clock
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn end_reason(&self) -> Option<MatchEndReason> {
        self.end_reason
    }

    /// Final rankings, once the match has ended
    pub fn summary(&self) -> Option<MatchSummary> {
        self.end_reason.map(|reason| {
            determine_result(&self.characters, self.seed, reason, self.world.clock, self.ticks)
        })
    }
}

/// Scripted driver for the primary agent in headless runs: walks toward the
/// nearest live bot and shoots when it has a clear shot.
#[derive(Debug, Default)]
pub struct Autopilot {
    path: VecDeque<CellCoord>,
    repath_timer: f32,
}

impl Autopilot {
    const REPATH_INTERVAL: f32 = 0.5;

    pub fn new() -> Self {
        Self::default()
    }

    pub fn steer(&mut self, game: &Match, dt: f32) -> PrimaryInput {
        let me = game.primary();
        let grid = &game.maze().grid;
        let quarry = game.characters()[1..]
            .iter()
            .filter(|c| c.alive)
            .min_by(|a, b| {
                a.position
                    .distance_sq_to(me.position)
                    .total_cmp(&b.position.distance_sq_to(me.position))
            });
        let Some(quarry) = quarry else {
            return PrimaryInput::default();
        };

        let distance = me.position.distance_to(quarry.position);
        let clear_shot = distance < SHOOT_RANGE && grid.has_los(me.position, quarry.position);

        self.repath_timer -= dt;
        if self.repath_timer <= 0.0 {
            self.repath_timer = Self::REPATH_INTERVAL;
            self.path = grid.find_path(me.position, quarry.position).into();
        }

        let mut movement = Vec2::ZERO;
        if !clear_shot {
            while let Some(next) = self.path.front() {
                if next.center().distance_to(me.position) < WAYPOINT_TOLERANCE {
                    self.path.pop_front();
                } else {
                    movement = next.center() - me.position;
                    break;
                }
            }
        }

        PrimaryInput {
            movement,
            aim: clear_shot.then(|| me.position.angle_to_point(quarry.position)),
            fire: clear_shot,
            ability: me.meter >= 1.0 && clear_shot,
        }
    }
}

/// Play one headless match to completion with the autopilot
pub fn run_match(config: &SimConfig, seed: u64) -> Result<(MatchSummary, PerformanceReport), MazeError> {
    let mut game = Match::new(config, seed)?;
    let mut autopilot = Autopilot::new();
    let mut monitor = PerformanceMonitor::new(TICK_RATE);

    let summary = loop {
        monitor.tick_start();
        let input = autopilot.steer(&game, config.dt);
        game.tick(config.dt, input);
        monitor.tick_end();

        if let Some(summary) = game.summary() {
            break summary;
        }
    };

    let report = monitor.report();
    if report.mostly_over_budget() {
        warn!(
            seed,
            over_budget = report.over_budget_ticks,
            ticks = report.ticks,
            "Match spent most ticks over budget: {}",
            monitor.status_message()
        );
    }
    Ok((summary, report))
}
