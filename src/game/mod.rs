pub mod constants;
pub mod handlers;
pub mod session;
pub mod state;
pub mod systems;
pub mod waves;
