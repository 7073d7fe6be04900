//! Versioned API surface.

pub mod v1;

pub use v1::ApiV1Service;
