//! Critter engine crate.
//!
//! Window, GPU context, shader program and static-mesh plumbing shared by the
//! tutorial demos.

pub mod core;
pub mod device;
pub mod error;
pub mod input;
pub mod time;
pub mod window;

pub mod coords;
pub mod logging;
pub mod paint;
pub mod render;

pub use error::{SetupError, SetupErrorKind};
