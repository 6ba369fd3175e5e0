//! Sharing declarations and federation configuration
//!
//! Each app (host or remote) describes the packages it shares in a
//! federation.toml. Built remotes publish the same information in their
//! remoteEntry.json.

pub mod parser;
pub mod schema;
pub mod share_all;

pub use parser::{parse_federation_toml, parse_federation_toml_str};
pub use schema::{
    DependencyDeclaration, ExposedModule, FederationConfig, RemoteEntry, ShareOptions, SharedEntry,
};
pub use share_all::collect_declarations;
