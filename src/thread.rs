//! Thread affinity for GPU-mutating operations.
//!
//! Buffer uploads, texture creation, material binding and entity updates must
//! all happen on the rendering thread. The camera stream records the thread
//! that created it and checks every mutating entry point against it.

use std::thread::{self, ThreadId};

/// The thread a camera stream is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThreadAffinity {
    owner: ThreadId,
}

impl ThreadAffinity {
    /// Bind to the calling thread.
    pub fn current() -> Self {
        Self {
            owner: thread::current().id(),
        }
    }

    pub fn owner(&self) -> ThreadId {
        self.owner
    }

    /// Whether the calling thread is the owner.
    pub fn is_current(&self) -> bool {
        thread::current().id() == self.owner
    }

    /// Panics when called off the owning thread.
    #[track_caller]
    pub fn assert_current(&self, operation: &str) {
        assert!(
            self.is_current(),
            "{operation} called on {:?}, camera stream is bound to {:?}",
            thread::current().id(),
            self.owner
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn owner_thread_passes() {
        let affinity = ThreadAffinity::current();
        assert!(affinity.is_current());
        affinity.assert_current("test");
    }

    #[test]
    fn foreign_thread_is_detected() {
        let affinity = ThreadAffinity::current();
        let handle = std::thread::spawn(move || affinity.is_current());
        assert!(!handle.join().unwrap());
    }

    #[test]
    fn foreign_thread_assert_panics() {
        let affinity = ThreadAffinity::current();
        let handle = std::thread::spawn(move || affinity.assert_current("upload"));
        assert!(handle.join().is_err());
    }
}
