pub mod data;
pub mod io;

pub use data::{Config, SettingsOverrides};
pub use io::ConfigError;
