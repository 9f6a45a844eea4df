//! Application configuration.
//!
//! Configuration is an INI file with a `[memory]` section for the
//! admission coordinator and a `[logger]` section for the log pipeline.
//! Startup flow: boot with built-in defaults, load the file once storage
//! is available, then hand `MemorySettings` to the coordinator and
//! `LoggerSettings` to the logger's reconfiguration.

mod defaults;
mod file;
mod parser;
mod settings;
mod writer;

pub use defaults::*;
pub use file::{config_directory, config_file_path, ConfigFileError};
pub use settings::{ConfigFile, LoggerSettings, MemorySettings};
