//! Rendering seam
//!
//! The core never rasterizes. It describes each entity as outline shapes and
//! hands them to a [`Surface`] owned by the platform layer.

pub mod shapes;

pub use shapes::{Shape, Surface};
