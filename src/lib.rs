//! A minimal OpenGL rendering bootstrap using [glow].
//!
//! The crate brings up the smallest useful pipeline: one shader program,
//! one static vertex buffer holding a triangle, and a frame loop that clears,
//! draws, and presents until the window is closed. Viewport updates follow
//! window resizes, and every GPU object created at startup is released
//! exactly once at shutdown.
//!
//! # Layers
//!
//! - [`backend::Backend`] is the slice of the GL API the renderer uses.
//!   [`backend::GlowBackend`] forwards it to a [`glow::Context`].
//! - [`gpu::Gpu`] wraps a backend, mirrors which objects are bound, and
//!   applies the driver error check policy ([`config::ErrorChecks`]).
//! - [`shaders`] and [`geometry`] build the program and vertex array;
//!   [`TriangleRenderer`] owns both.
//! - [`frame::FrameLoop`] drives a renderer against any [`frame::Window`];
//!   [`app::run`] wraps startup, the loop, and teardown.
//! - With the `window` feature (on by default), `window::DesktopWindow`
//!   opens a native window with a core-profile context via winit and glutin.
//!
//! Logging goes through [`tracing`]; [`logging::init`] installs the console
//! and per-run file sinks.
//!
//! # Safety
//!
//! GL calls need a current context on the calling thread. Creating a
//! [`backend::GlowBackend`] is `unsafe` for that reason; everything built on
//! top of it is safe to call from that thread.
//!
//! [glow]: https://docs.rs/glow

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gpu;
pub mod logging;
pub mod render;
pub mod shaders;
pub mod types;
#[cfg(feature = "window")]
pub mod window;

#[cfg(test)]
mod fake;

pub use error::RenderError;
pub use render::TriangleRenderer;
