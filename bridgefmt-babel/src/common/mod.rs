//! Direction-agnostic helpers: escaping, block cleanup and flattening.

pub mod cleanup;
pub mod escape;
pub mod flatten;
