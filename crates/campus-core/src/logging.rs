//! Structured logging field name constants for campusdesk.
//!
//! All crates use these constants for consistent structured logging fields.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Unrecoverable failure in the CLI |
//! | WARN  | Recoverable issue, fallback applied (delete resync, failed session check) |
//! | INFO  | Operation completions (load, create, update, delete) |
//! | DEBUG | Decision points (payload kind, page reset, envelope shape) |
//! | TRACE | Per-record iteration |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Subsystem originating the log event.
/// Values: "client", "admin", "core"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "http_gateway", "memory_gateway", "screen", "editor"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "get_all", "create", "update", "delete", "verify_session"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Entity kind path segment ("courses", "universities", ...).
pub const ENTITY: &str = "entity";

/// Record identifier being operated on.
pub const RECORD_ID: &str = "record_id";

/// Search query text.
pub const QUERY: &str = "query";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of records returned or held.
pub const RECORD_COUNT: &str = "record_count";

/// Current page number.
pub const PAGE: &str = "page";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// HTTP status code of a response.
pub const STATUS: &str = "status";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    const ALL: &[&str] = &[
        SUBSYSTEM,
        COMPONENT,
        OPERATION,
        ENTITY,
        RECORD_ID,
        QUERY,
        DURATION_MS,
        RECORD_COUNT,
        PAGE,
        STATUS,
        ERROR_MSG,
    ];

    #[test]
    fn test_field_names_are_unique() {
        let unique: HashSet<_> = ALL.iter().collect();
        assert_eq!(unique.len(), ALL.len());
    }

    #[test]
    fn test_field_names_are_snake_case() {
        for name in ALL {
            assert!(
                name.chars().all(|c| c.is_ascii_lowercase() || c == '_'),
                "{name} is not snake_case"
            );
        }
    }
}
