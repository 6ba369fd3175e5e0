//! Version requirements and install-source version discovery.

pub mod constraints;
pub mod source;

pub use constraints::RequiredVersion;
pub use source::{installed_version, version_from_spec};
