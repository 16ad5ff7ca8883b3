//! Centralized default constants for campusdesk.
//!
//! **This module is the single source of truth** for shared default values.
//! Crates and the CLI reference these constants instead of defining their own
//! magic numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Rows per page on admin management screens.
pub const PAGE_SIZE: usize = 10;

/// Number of page buttons shown in the pager control.
pub const PAGER_WIDTH: usize = 5;

/// First page (pages are 1-based).
pub const FIRST_PAGE: usize = 1;

// =============================================================================
// HTTP CLIENT
// =============================================================================

/// Default API base URL when none is configured.
pub const API_BASE_URL: &str = "http://localhost:5000/api";

/// Default HTTP request timeout in seconds.
pub const API_TIMEOUT_SECS: u64 = 30;

/// Default login route used for the hard redirect on a failed session check.
pub const LOGIN_ROUTE: &str = "/admin/login";

/// Path of the session verification endpoint (relative to the base URL).
pub const AUTH_VERIFY_PATH: &str = "auth/verify";

/// Name of the session cookie sent with `withCredentials`-style requests.
pub const SESSION_COOKIE_NAME: &str = "token";

/// User agent reported by the HTTP gateway.
pub const USER_AGENT: &str = concat!("campusdesk/", env!("CARGO_PKG_VERSION"));

// =============================================================================
// ENVIRONMENT VARIABLES
// =============================================================================

/// API base URL.
pub const ENV_API_BASE_URL: &str = "CAMPUS_API_BASE_URL";

/// HTTP timeout override in seconds.
pub const ENV_API_TIMEOUT_SECS: &str = "CAMPUS_API_TIMEOUT_SECS";

/// Session cookie value for CLI use.
pub const ENV_SESSION_COOKIE: &str = "CAMPUS_SESSION_COOKIE";

/// Login route for redirects.
pub const ENV_LOGIN_ROUTE: &str = "CAMPUS_LOGIN_ROUTE";

/// Third-party contact number (WhatsApp link on the public site).
pub const ENV_CONTACT_NUMBER: &str = "CAMPUS_CONTACT_NUMBER";

// =============================================================================
// UPLOADS
// =============================================================================

/// Maximum size of a single picked file in bytes (10 MB).
pub const MAX_UPLOAD_BYTES: u64 = 10 * 1024 * 1024;

/// Identifier key used for create-mode pending actions.
pub const NEW_RECORD_KEY: &str = "new";
