//! Status display abstractions for Vigil
//!
//! This crate provides:
//! - `StatusSurface` - an `embedded-graphics` draw target that also knows
//!   which physical panel it stands for and how to push a frame to it
//! - `EpdPanel` - the physical transfer side of an e-paper module
//! - `Canvas` - an in-memory 1-bpp frame shared between the drawing code
//!   and whichever task owns the physical transfer
//!
//! # Architecture
//!
//! Two refresh arrangements are supported without touching panel logic:
//!
//! - **Blocking**: the surface wraps canvas + panel; `flush()` transfers the
//!   frame and waits for the panel to finish.
//!
//! - **Deferred**: the drawing side only fills a `Canvas`. A background
//!   task copies the finished frame out and drives the slow e-paper
//!   update while the main loop keeps running.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod canvas;

// Re-export key types
pub use backend::{DisplayError, EpdPanel, PanelModel, RefreshKind, Rotation, StatusSurface};
pub use canvas::{BlockingEpd, Canvas};
