//! Structured logging schema and field name constants for notarium.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log tooling can query by standardized names across every subsystem.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Operation failed and was surfaced to the caller |
//! | WARN  | Recoverable issue, degraded result applied (e.g. empty list) |
//! | INFO  | Lifecycle events, completed mutations |
//! | DEBUG | Decision points, request/response summaries |
//! | TRACE | Per-item iteration over note lists |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "core", "client"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "http", "view", "undo", "gesture"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "reload", "reparent", "pin", "delete_many"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note id being operated on.
pub const NOTE_ID: &str = "note_id";

/// File id being operated on.
pub const FILE_ID: &str = "file_id";

/// Scope a list operation ran against ("recent", "file", "children").
pub const SCOPE: &str = "scope";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of notes returned by a list call.
pub const RESULT_COUNT: &str = "result_count";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Boolean success/failure indicator.
pub const SUCCESS: &str = "success";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";
