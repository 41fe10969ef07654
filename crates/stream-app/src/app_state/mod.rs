//! Top-level application state.
//!
//! Implements `winit::application::ApplicationHandler` to drive the main
//! event loop. Owns the host window and the widget session.

mod core;
mod event_handler;
mod init;
mod polling;
mod shutdown;

pub use core::{HostPaths, StreamHost};
