//! HTTP adapter for the administration backend.
//!
//! This module provides a thin reqwest implementation of the
//! `ExtrasBackend` port.

mod dto;
mod http_backend;

pub use http_backend::HttpExtrasBackend;
