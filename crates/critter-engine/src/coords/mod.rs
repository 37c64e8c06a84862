//! Surface-space geometry.
//!
//! Viewports are in physical pixels with a top-left origin, matching what
//! `wgpu` expects for `set_viewport`.

mod viewport;

pub use viewport::Viewport;
