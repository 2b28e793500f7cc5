//! # wastewatch-reports
//!
//! Report lifecycle layer: the single-identity registry, payload
//! validation, the status workflow and the service that ties them to the
//! repositories in `wastewatch-db`.
//!
//! All operations are synchronous and assume the caller serializes access;
//! the daemon holds one [`ReportService`] behind a mutex.

pub mod effects;
pub mod error;
pub mod registry;
pub mod service;
pub mod validation;

pub use effects::{Clock, IdGenerator, SystemClock, UuidGenerator};
pub use error::{Result, ServiceError};
pub use registry::IdentityRegistry;
pub use service::{ReportService, ServicePolicy};
pub use validation::PayloadField;
