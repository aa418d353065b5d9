//! Scene management
//!
//! The camera background is a single scene entity. This module creates it,
//! keeps its material and draw order current, and releases it together with
//! the rest of the stream's GPU resources.

mod cleanup;
mod renderable;

pub use cleanup::*;
pub use renderable::*;
