//! # campus-admin
//!
//! Management screens for the campusdesk admin area.
//!
//! - [`screen::AdminScreen`]: per-page controller (load, search, paginate,
//!   optimistic create/update/delete, custom row actions, error banner)
//! - [`editor::FormEditor`]: create/edit form with file picking and preview
//!   lifetimes
//! - [`pending::PendingActions`]: disables a row while an action on it runs
//! - [`ticket`]: writes in flight, so actions on different rows can overlap
//! - [`cli`]: helpers behind the `campus-admin` binary

pub mod cli;
pub mod editor;
pub mod pending;
pub mod screen;
pub mod ticket;

pub use editor::{Draft, EditorMode, FormEditor, Submission};
pub use pending::{PendingActions, PendingGuard};
pub use screen::AdminScreen;
pub use ticket::{ActionTicket, DeleteTicket, SubmitTicket};
