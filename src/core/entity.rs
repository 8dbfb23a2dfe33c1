//! Permanent identification.
//!
//! Every object on the battlefield (a card that resolved, the commander, or a
//! token) gets a unique `PermanentId` from the trial's `EntityAllocator`.
//!
//! IDs are never reused within a trial, so a stale ID held by a trigger or a
//! mana source simply stops resolving once its permanent has left play.
//!
//! ```
//! use rust_goldfish::core::{EntityAllocator, PermanentId};
//!
//! let mut alloc = EntityAllocator::new();
//! let a = alloc.next_id();
//! let b = alloc.next_id();
//!
//! assert_eq!(a, PermanentId(0));
//! assert_ne!(a, b);
//! assert_eq!(alloc.allocated(), 2);
//! ```

use serde::{Deserialize, Serialize};

/// Unique identifier for a permanent within one trial.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PermanentId(pub u32);

impl PermanentId {
    /// Get the raw ID value.
    #[must_use]
    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl From<u32> for PermanentId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl std::fmt::Display for PermanentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Permanent({})", self.0)
    }
}

/// Monotonic allocator for permanent IDs.
#[derive(Clone, Debug, Default)]
pub struct EntityAllocator {
    next: u32,
}

impl EntityAllocator {
    /// Create an allocator starting at zero.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Allocate the next ID.
    pub fn next_id(&mut self) -> PermanentId {
        let id = PermanentId(self.next);
        self.next += 1;
        id
    }

    /// Number of IDs handed out so far.
    #[must_use]
    pub fn allocated(&self) -> u32 {
        self.next
    }
}
