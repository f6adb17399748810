//! # notarium-client
//!
//! Concrete backend and stateful view components for notarium.
//!
//! This crate provides:
//! - The reqwest HTTP backend implementing the note service REST surface
//! - `ScopeView`: the single mutation point for one scope's note list,
//!   with optimistic updates, uniform rollback, and pin-aware display order
//! - The drag/drop gesture interpreter
//! - The undo/notification coordinator with its five second window
//! - `FilePageState`: per-file preferences, pillar cache, block editing
//! - A deterministic in-memory mock backend for tests
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use notarium_client::{HttpBackend, ScopeView};
//! use notarium_core::{EventBus, Scope};
//!
//! #[tokio::main]
//! async fn main() {
//!     let backend = Arc::new(HttpBackend::from_env());
//!     let bus = Arc::new(EventBus::default());
//!     let mut view = ScopeView::new(backend, bus, Scope::Recent);
//!     view.reload().await.unwrap();
//!     for note in view.display() {
//!         println!("{}", note.title);
//!     }
//! }
//! ```

pub mod config;
pub mod file;
pub mod gesture;
pub mod http;
pub mod mock;
pub mod undo;
pub mod view;

// Re-export core types
pub use notarium_core::*;

pub use config::BackendConfig;
pub use file::FilePageState;
pub use gesture::{DragGesture, DragState, DropIntent, DropZone};
pub use http::HttpBackend;
pub use mock::MockBackend;
pub use undo::{Notification, UndoCoordinator};
pub use view::ScopeView;
