pub mod collision;
pub mod formation;
pub mod projectile;
