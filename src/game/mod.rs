pub mod collision;
pub mod constants;
pub mod game_loop;
pub mod grid;
pub mod match_result;
pub mod maze;
pub mod pathfinding;
pub mod performance;
pub mod state;
pub mod systems;
pub mod visibility;
