//! High-level operations.
//!
//! This module contains the implementation of freight-builder commands.

pub mod freight_build;
pub mod freight_introspect;
pub mod preflight;

pub use freight_build::{build, build_with, BuildOptions, BuildResult};
pub use freight_introspect::{introspect, introspect_with, IntrospectOptions};
pub use preflight::preflight;
