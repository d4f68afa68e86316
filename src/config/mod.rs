// Configuration module
// Connection parameters and the config file loader

mod loader;
mod settings;

pub use loader::{apply_env_overrides, default_config_path, load_config};
pub use settings::{ConnectionParameters, DEFAULT_HOST, DEFAULT_PORT, DEFAULT_TIMEOUT_SECS};
