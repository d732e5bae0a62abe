//! # Shared Types Crate
//!
//! Domain entities, error taxonomy and collaborator ports used by every
//! registrar component.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: the queue data model is defined once, here.
//! - **Closed status variants**: queue status is a tagged enum; string
//!   rendering belongs to the presentation layer.
//! - **Named collaborators**: the chain client and profile resolver are
//!   traits, so every component can be driven by fakes in tests.
//! - **One queue lock**: all queue mutation serializes through [`QueueLock`].

pub mod chain;
pub mod cursor;
pub mod entities;
pub mod errors;
pub mod lock;
pub mod time;

#[cfg(any(test, feature = "test-utils"))]
pub mod testing;

pub use chain::*;
pub use cursor::{ChainCursor, STALE_BLOCK_TOLERANCE};
pub use entities::*;
pub use errors::*;
pub use lock::{QueueGuard, QueueLock};
pub use time::{SystemTimeSource, TimeSource};
