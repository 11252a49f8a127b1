//! Entity identifiers and their allocator

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

/// Unique identifier for entities in the ECS.
///
/// Identifiers are handed out in strictly increasing order by an
/// [`IdAllocator`] and are never reused, even after the entity is removed.
#[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntityId(pub u64);

impl EntityId {
    /// Create an entity ID from a raw value (mainly for lookups and tests).
    pub const fn from_raw(raw: u64) -> Self {
        Self(raw)
    }

    /// The raw numeric value.
    pub const fn raw(self) -> u64 {
        self.0
    }
}

impl fmt::Debug for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EntityId({})", self.0)
    }
}

impl fmt::Display for EntityId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

static GLOBAL: IdAllocator = IdAllocator::new();

/// Lock-free source of monotonically increasing entity identifiers.
///
/// Safe to share between threads; entities may be created concurrently and
/// handed to a single-threaded store afterwards. Exhausting the 64-bit range
/// is not handled: the counter wraps, which is a known limit.
#[derive(Debug)]
pub struct IdAllocator {
    next: AtomicU64,
}

impl IdAllocator {
    /// An allocator whose first identifier is `0`.
    pub const fn new() -> Self {
        Self::starting_at(0)
    }

    /// An allocator whose first identifier is `seed`.
    pub const fn starting_at(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }

    /// The process-wide allocator, for callers that do not manage their own.
    pub fn global() -> &'static IdAllocator {
        &GLOBAL
    }

    /// Allocate the next identifier.
    pub fn next(&self) -> EntityId {
        let mut current = self.next.load(Ordering::Relaxed);
        loop {
            match self.next.compare_exchange_weak(
                current,
                current.wrapping_add(1),
                Ordering::AcqRel,
                Ordering::Relaxed,
            ) {
                Ok(taken) => return EntityId(taken),
                Err(observed) => current = observed,
            }
        }
    }

    /// The identifier the next call to [`next`](Self::next) would return.
    pub fn peek(&self) -> EntityId {
        EntityId(self.next.load(Ordering::Acquire))
    }
}

impl Default for IdAllocator {
    fn default() -> Self {
        Self::new()
    }
}
