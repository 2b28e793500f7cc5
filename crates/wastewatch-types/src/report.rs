//! Waste-incident report structures.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Timestamp;

/// Identifier assigned to a report at creation.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReportId(String);

impl ReportId {
    pub fn new(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ReportId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Workflow status of a report.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    Pending,
    InProgress,
    Resolved,
}

impl ReportStatus {
    pub const ALL: [ReportStatus; 3] = [Self::Pending, Self::InProgress, Self::Resolved];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::InProgress => "in_progress",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ReportStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Returned when a string is not one of the three wire names.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown report status: {0:?}")]
pub struct ParseStatusError(pub String);

impl FromStr for ReportStatus {
    type Err = ParseStatusError;

    /// Exact, case-sensitive match on the wire name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| ParseStatusError(s.to_string()))
    }
}

/// A stored waste-incident report.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub id: ReportId,
    /// Free-form site description.
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub type_of_waste: String,
    pub description: String,
    pub status: ReportStatus,
    /// Submitting party. Caller-supplied, not checked against the registry.
    pub reporter_id: String,
    pub created_at: Timestamp,
    /// Unset until the first update or resolution.
    pub updated_at: Option<Timestamp>,
}

/// Caller-supplied fields for creating or replacing a report.
///
/// `status` is kept as the raw string so that an illegal value can be
/// reported as such rather than failing deserialization.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportPayload {
    pub location: String,
    pub latitude: f64,
    pub longitude: f64,
    pub type_of_waste: String,
    pub status: String,
    pub description: String,
    pub reporter_id: String,
}

/// Lookup result for a single report.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReportLocationView {
    pub message: String,
    /// `"<longitude>,<latitude>"`.
    pub pin_location: String,
}

impl ReportLocationView {
    pub fn for_report(report: &Report) -> Self {
        Self {
            message: format!("report by id = {} has been found", report.id),
            pin_location: format!("{},{}", report.longitude, report.latitude),
        }
    }
}

/// Result of a delete. Both variants are successful calls.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "outcome", content = "id", rename_all = "snake_case")]
pub enum DeleteOutcome {
    Removed(ReportId),
    NotFound(ReportId),
}

impl DeleteOutcome {
    pub fn message(&self) -> String {
        match self {
            Self::Removed(id) => format!("report {id} removed successfully"),
            Self::NotFound(id) => format!("report {id} not found, nothing removed"),
        }
    }

    pub fn removed(&self) -> bool {
        matches!(self, Self::Removed(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Report {
        Report {
            id: ReportId::new("r-1"),
            location: "Kibera market".into(),
            latitude: -1.3133,
            longitude: 36.7879,
            type_of_waste: "plastic".into(),
            description: "bins overflowing".into(),
            status: ReportStatus::Pending,
            reporter_id: "rep-7".into(),
            created_at: 1_700_000_000_000_000_000,
            updated_at: None,
        }
    }

    #[test]
    fn test_status_parse_is_exact() {
        assert_eq!("pending".parse::<ReportStatus>(), Ok(ReportStatus::Pending));
        assert_eq!("in_progress".parse::<ReportStatus>(), Ok(ReportStatus::InProgress));
        assert_eq!("resolved".parse::<ReportStatus>(), Ok(ReportStatus::Resolved));
        assert!("Resolved".parse::<ReportStatus>().is_err());
        assert!("in progress".parse::<ReportStatus>().is_err());
        assert!("closed".parse::<ReportStatus>().is_err());
    }

    #[test]
    fn test_status_serializes_as_wire_name() {
        let json = serde_json::to_string(&ReportStatus::InProgress).expect("serialize");
        assert_eq!(json, "\"in_progress\"");
    }

    #[test]
    fn test_location_view_formats_longitude_first() {
        let view = ReportLocationView::for_report(&sample());
        assert_eq!(view.pin_location, "36.7879,-1.3133");
        assert!(view.message.contains("r-1"));
    }

    #[test]
    fn test_location_view_integral_coordinates() {
        let mut report = sample();
        report.latitude = 2.0;
        report.longitude = -3.0;
        assert_eq!(ReportLocationView::for_report(&report).pin_location, "-3,2");
    }

    #[test]
    fn test_payload_missing_fields_default() {
        let payload: ReportPayload =
            serde_json::from_value(serde_json::json!({"location": "dump"})).expect("parse");
        assert_eq!(payload.location, "dump");
        assert!(payload.status.is_empty());
        assert_eq!(payload.latitude, 0.0);
    }

    #[test]
    fn test_delete_outcome_messages_differ() {
        let removed = DeleteOutcome::Removed(ReportId::new("a"));
        let missing = DeleteOutcome::NotFound(ReportId::new("a"));
        assert!(removed.removed());
        assert!(!missing.removed());
        assert_ne!(removed.message(), missing.message());
    }
}
