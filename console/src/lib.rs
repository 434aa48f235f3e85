//! Alias and transfer consistency engine for the property administration
//! console.
//!
//! The crate is laid out hexagonally:
//! - [`domain`] owns the entities, the stores, the allocation reconciler and
//!   the operation guard, and declares the driven ports it needs.
//! - [`outbound`] holds adapters implementing those ports (the reqwest
//!   backend client).
//! - [`settings`] loads runtime configuration through OrthoConfig.

pub mod domain;
pub mod outbound;
pub mod settings;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
