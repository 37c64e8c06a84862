//! GPU device + surface management.
//!
//! - creates the wgpu Instance/Adapter/Device/Queue for a window
//! - configures the surface and keeps it in sync with resizes
//! - acquires frames and presents them

mod context;
mod error;
mod frame;
mod init;
mod surface;

pub use context::Gpu;
pub use error::SurfaceErrorAction;
pub use frame::GpuFrame;
pub use init::GpuInit;
