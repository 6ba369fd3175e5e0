//! Project configuration (fedshare.toml)
//!
//! Names the files fedshare works on and the override profile used by
//! `override enable` / `override disable`.

pub mod schema;
pub mod store;

pub use schema::{FedshareConfig, OverrideProfile};
pub use store::ConfigStore;

/// File name of the project configuration
pub const CONFIG_FILE_NAME: &str = "fedshare.toml";
