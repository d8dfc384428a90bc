//! Value types shared by state, handlers and configuration.

pub mod amount;
pub mod flags;
pub mod ids;
pub mod reserve_config;

pub use amount::*;
pub use flags::*;
pub use ids::*;
pub use reserve_config::*;
