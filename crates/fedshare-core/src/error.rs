//! Typed errors raised by the shared dependency resolver.

use semver::Version;
use thiserror::Error;

use crate::version::RequiredVersion;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ShareError {
    /// A strict singleton was bound to a version the consumer does not accept.
    #[error(
        "Version conflict for '{name}': {consumer} requires {required} but {provider} provides {bound} (strictVersion)"
    )]
    VersionConflict {
        name: String,
        consumer: String,
        required: RequiredVersion,
        bound: Version,
        provider: String,
    },

    #[error("Invalid declaration from '{contributor}': {reason}")]
    InvalidDeclaration { contributor: String, reason: String },
}

impl ShareError {
    pub fn is_version_conflict(&self) -> bool {
        matches!(self, ShareError::VersionConflict { .. })
    }
}
