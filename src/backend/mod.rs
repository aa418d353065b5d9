//! Rendering engine abstraction
//!
//! Provides the traits the camera stream drives, the types exchanged with the
//! engine, and an in-memory [`DummyEngine`] for tests and headless use.

pub mod dummy;
pub mod traits;
pub mod types;

pub use dummy::DummyEngine;
pub use traits::*;
pub use types::*;
