//! Compiled defaults shared across the notarium crates.

/// Default base URL of the note service REST API.
pub const BASE_URL: &str = "http://localhost:8001/api";

/// Timeout for ordinary backend requests (seconds).
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// Timeout for pillar generation requests (seconds). These hit the AI
/// subsystem and are much slower than plain CRUD calls.
pub const PILLAR_TIMEOUT_SECS: u64 = 30;

/// Delay before the post-mutation consistency reload (milliseconds).
/// The reload supersedes any optimistic edit made in between.
pub const RELOAD_DEBOUNCE_MS: u64 = 100;

/// How long a pending mutation stays undoable (milliseconds).
pub const UNDO_DISPLAY_MS: u64 = 5000;

/// Buffer capacity for the scope event bus.
/// Recommended: 256 for production, 32 for tests.
pub const EVENT_BUS_CAPACITY: usize = 256;

/// Note type sent on creation.
pub const NOTE_TYPE_TEXT: &str = "text";

/// Upper bound on the ancestor walk used for cycle detection. Hierarchies
/// deeper than this are treated as corrupt.
pub const MAX_ANCESTOR_DEPTH: usize = 64;
