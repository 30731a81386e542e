pub mod ability;
pub mod ai;
pub mod pickup;
pub mod projectile;
