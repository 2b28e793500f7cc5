//! # wastewatch-types
//!
//! Shared domain types used across the WasteWatch workspace: the caller
//! identity, the registered user record, waste-incident reports and the
//! payload/view shapes exchanged with callers.

pub mod identity;
pub mod report;

pub use identity::{Identity, User, UserId};
pub use report::{
    DeleteOutcome, ParseStatusError, Report, ReportId, ReportLocationView, ReportPayload,
    ReportStatus,
};

/// Nanoseconds since the Unix epoch.
pub type Timestamp = u64;

/// Maximum length in bytes of a stored record key.
pub const MAX_KEY_BYTES: usize = 44;

/// Default bound on the serialized size of a stored record.
pub const DEFAULT_MAX_RECORD_BYTES: usize = 512;
