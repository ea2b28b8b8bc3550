pub mod config_path;
pub mod input;
