pub mod bootstrap;
pub mod commands;
pub mod config;
pub mod logging;

pub use bootstrap::Runtime;
pub use config::Config;
