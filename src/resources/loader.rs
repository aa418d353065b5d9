//! Asynchronous material loading
//!
//! Material instances are built by the host (compiled material packages,
//! shader caches, ...) and may finish on any thread. A loader reports back
//! through a [`MaterialCompletion`], which only posts an event on a channel;
//! the owning thread applies it when it calls
//! [`CameraStream::poll_materials`](crate::CameraStream::poll_materials).

use std::sync::mpsc;

use thiserror::Error;

use super::material::{CameraMaterialKind, Material};

/// Why a material could not be produced.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MaterialLoadError {
    #[error("material source not found: {0}")]
    SourceNotFound(String),
    #[error("failed to build material {name}: {reason}")]
    BuildFailed { name: String, reason: String },
}

/// Outcome of one load request, delivered to the owning thread.
#[derive(Debug)]
pub struct MaterialEvent {
    pub kind: CameraMaterialKind,
    pub result: Result<Material, MaterialLoadError>,
}

/// One-shot handle a loader uses to report the result of a request.
#[derive(Debug)]
pub struct MaterialCompletion {
    kind: CameraMaterialKind,
    sender: mpsc::Sender<MaterialEvent>,
}

impl MaterialCompletion {
    pub(crate) fn new(kind: CameraMaterialKind, sender: mpsc::Sender<MaterialEvent>) -> Self {
        Self { kind, sender }
    }

    /// The material this completion is for.
    pub fn kind(&self) -> CameraMaterialKind {
        self.kind
    }

    /// Report the result. Safe to call from any thread.
    pub fn complete(self, result: Result<Material, MaterialLoadError>) {
        let event = MaterialEvent {
            kind: self.kind,
            result,
        };
        if self.sender.send(event).is_err() {
            // The stream was dropped before the load finished.
            log::debug!("{:?} material finished after its camera stream was dropped", self.kind);
        }
    }
}

/// Produces the camera materials on demand.
pub trait MaterialLoader {
    /// Start loading `kind`. The loader must eventually call
    /// [`MaterialCompletion::complete`], possibly from another thread and
    /// possibly before this method returns.
    fn load(&self, kind: CameraMaterialKind, completion: MaterialCompletion);
}
