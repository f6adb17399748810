//! # notarium-core
//!
//! Core types, traits, and abstractions for the notarium note client.
//!
//! This crate provides the data model for notes and neural files, the pure
//! sort engine, the repository traits implemented by concrete backends, and
//! the event bus used to notify sibling views of hierarchy changes.

pub mod blocks;
pub mod defaults;
pub mod error;
pub mod events;
pub mod logging;
pub mod models;
pub mod sort;
pub mod traits;

// Re-export commonly used types at crate root
pub use blocks::{Block, BlockList};
pub use error::{Error, Result};
pub use events::{EventBus, ScopeEvent};
pub use models::*;
pub use sort::sort_notes;
pub use traits::*;
