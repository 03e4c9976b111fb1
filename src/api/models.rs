pub use auth::*;
pub use battle::*;
pub use id::*;
pub use player::*;
pub use team::*;
pub use unit::*;

pub mod auth;
pub mod battle;
pub mod id;
pub mod player;
pub mod team;
pub mod unit;
