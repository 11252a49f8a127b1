//! Lattice Core - Foundational types for the Lattice ECS
//!
//! This crate provides the types shared by every other crate in the workspace:
//! - Component kind bitmasks
//! - Entity identifiers and the lock-free identifier allocator

pub mod id;
pub mod kind;

pub use id::{EntityId, IdAllocator};
pub use kind::Kind;
