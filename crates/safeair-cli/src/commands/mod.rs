//! Command implementations for the CLI.

mod config;
mod devices;
mod live;
mod map;
mod register;
mod stats;
mod trends;

pub use config::cmd_config;
pub use devices::cmd_devices;
pub use live::{LiveArgs, cmd_live};
pub use map::{MapArgs, cmd_map};
pub use register::cmd_register;
pub use stats::cmd_stats;
pub use trends::{TrendsArgs, cmd_trends};
