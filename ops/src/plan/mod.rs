mod cmd;
mod config;

pub use cmd::*;
pub use config::*;
