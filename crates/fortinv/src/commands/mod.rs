//! Command handlers: bridge CLI args -> core pipeline -> output formatting.

pub mod config_cmd;
pub mod export;
pub mod schema;
pub mod util;
