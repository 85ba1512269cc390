pub mod file_format;
pub mod log_setup;
pub mod test_utils;

pub use file_format::{ConfigError, SerdeFormat, load_config, save_config};
pub use log_setup::{file_appender, setup_console_logging, setup_logging};
