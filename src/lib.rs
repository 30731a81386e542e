//! Maze Arena Simulation Library
//!
//! Headless top-down maze shooter: procedural maze generation, circle-vs-wall
//! collision, sampled line of sight, A* navigation and difficulty-tuned bots.
//!
//! The navigation engine lives in [`game::maze`], [`game::collision`],
//! [`game::visibility`] and [`game::pathfinding`]; bots reach it through the
//! [`game::grid::WorldGeometry`] trait. [`game::game_loop::Match`] runs a full
//! match on top of it.

pub mod config;
pub mod game;
pub mod util;
