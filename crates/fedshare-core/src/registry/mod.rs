//! Shared dependency registry and resolver.

pub mod resolver;

pub use resolver::{BindingSource, Registration, ResolutionRegistry, ResolvedBinding};
