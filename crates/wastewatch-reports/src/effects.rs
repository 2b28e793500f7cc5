//! Time and identifier sources.

use std::time::{SystemTime, UNIX_EPOCH};

use wastewatch_types::Timestamp;

pub trait Clock: Send {
    /// Nanoseconds since the Unix epoch.
    fn now(&self) -> Timestamp;
}

pub trait IdGenerator: Send {
    fn new_id(&self) -> String;
}

/// Wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| u64::try_from(d.as_nanos()).unwrap_or(u64::MAX))
            .unwrap_or_default()
    }
}

/// Random v4 UUIDs in hyphenated form.
#[derive(Debug, Default, Clone, Copy)]
pub struct UuidGenerator;

impl IdGenerator for UuidGenerator {
    fn new_id(&self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}
