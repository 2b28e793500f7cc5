//! Payload schema checks.
//!
//! A field is present when a string is non-empty and a coordinate is
//! non-zero and not NaN. Presence is checked for every field before the
//! status value is looked at, so a payload with both a missing field and
//! an unknown status reports the missing field.

use std::fmt;

use wastewatch_types::{ReportPayload, ReportStatus};

use crate::error::{Result, ServiceError};

/// Field names used in `InvalidPayload` errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PayloadField {
    Id,
    Location,
    Latitude,
    Longitude,
    TypeOfWaste,
    Status,
    Description,
    ReporterId,
}

impl PayloadField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Location => "location",
            Self::Latitude => "latitude",
            Self::Longitude => "longitude",
            Self::TypeOfWaste => "type_of_waste",
            Self::Status => "status",
            Self::Description => "description",
            Self::ReporterId => "reporter_id",
        }
    }
}

impl fmt::Display for PayloadField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Every field of `payload` that is absent, in declaration order.
pub fn missing_fields(payload: &ReportPayload) -> Vec<PayloadField> {
    let checks = [
        (PayloadField::Location, !payload.location.is_empty()),
        (PayloadField::Latitude, coordinate_present(payload.latitude)),
        (PayloadField::Longitude, coordinate_present(payload.longitude)),
        (PayloadField::TypeOfWaste, !payload.type_of_waste.is_empty()),
        (PayloadField::Status, !payload.status.is_empty()),
        (PayloadField::Description, !payload.description.is_empty()),
        (PayloadField::ReporterId, !payload.reporter_id.is_empty()),
    ];

    checks
        .into_iter()
        .filter(|(_, present)| !present)
        .map(|(field, _)| field)
        .collect()
}

/// Check presence, then status legality. Returns the parsed status.
pub fn validate_payload(payload: &ReportPayload) -> Result<ReportStatus> {
    let missing = missing_fields(payload);
    if !missing.is_empty() {
        return Err(ServiceError::InvalidPayload(missing));
    }

    payload
        .status
        .parse()
        .map_err(|_| ServiceError::InvalidStatus(payload.status.clone()))
}

/// Reject an empty identifier argument. Whitespace counts as a value, the
/// same as in [`missing_fields`].
pub fn require_id(id: &str, field: PayloadField) -> Result<()> {
    if id.is_empty() {
        return Err(ServiceError::InvalidPayload(vec![field]));
    }
    Ok(())
}

fn coordinate_present(value: f64) -> bool {
    value != 0.0 && !value.is_nan()
}

/// Lowercase and trim for case-insensitive filter matching.
pub fn normalize(value: &str) -> String {
    value.trim().to_lowercase()
}
