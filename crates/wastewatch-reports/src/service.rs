//! Report service: the entry point for every report operation.
//!
//! Status policy. `update_report` may set any of the three statuses, in any
//! order. `resolve_report` only moves `in_progress` to `resolved`.

use rusqlite::Connection;
use tracing::{debug, info, warn};
use wastewatch_db::Repository;
use wastewatch_types::{
    DeleteOutcome, Identity, Report, ReportId, ReportLocationView, ReportPayload, ReportStatus,
    User, UserId, DEFAULT_MAX_RECORD_BYTES,
};

use crate::effects::{Clock, IdGenerator, SystemClock, UuidGenerator};
use crate::error::{Result, ServiceError};
use crate::registry::IdentityRegistry;
use crate::validation::{normalize, require_id, validate_payload, PayloadField};

/// Tunable authorization rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ServicePolicy {
    /// When false, any caller may resolve a report.
    pub resolve_requires_authorization: bool,
}

impl Default for ServicePolicy {
    fn default() -> Self {
        Self {
            resolve_requires_authorization: true,
        }
    }
}

pub struct ReportService<C = SystemClock, G = UuidGenerator> {
    conn: Connection,
    registry: IdentityRegistry,
    reports: Repository<Report>,
    clock: C,
    ids: G,
    policy: ServicePolicy,
}

impl ReportService {
    /// Service over `conn` with the wall clock, UUID ids and default policy.
    pub fn new(conn: Connection, registry: IdentityRegistry) -> Self {
        Self {
            conn,
            registry,
            reports: Repository::reports(DEFAULT_MAX_RECORD_BYTES),
            clock: SystemClock,
            ids: UuidGenerator,
            policy: ServicePolicy::default(),
        }
    }
}

impl<C: Clock, G: IdGenerator> ReportService<C, G> {
    pub fn with_clock<C2: Clock>(self, clock: C2) -> ReportService<C2, G> {
        ReportService {
            conn: self.conn,
            registry: self.registry,
            reports: self.reports,
            clock,
            ids: self.ids,
            policy: self.policy,
        }
    }

    pub fn with_id_generator<G2: IdGenerator>(self, ids: G2) -> ReportService<C, G2> {
        ReportService {
            conn: self.conn,
            registry: self.registry,
            reports: self.reports,
            clock: self.clock,
            ids,
            policy: self.policy,
        }
    }

    pub fn with_policy(mut self, policy: ServicePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_max_record_bytes(mut self, max_record_bytes: usize) -> Self {
        self.reports = Repository::reports(max_record_bytes);
        self
    }

    pub fn policy(&self) -> ServicePolicy {
        self.policy
    }

    // ==================== Identity ====================

    pub fn register(&self, username: &str, email: &str, caller: &Identity) -> Result<UserId> {
        self.registry
            .register(&self.conn, &self.clock, &self.ids, username, email, caller)
    }

    pub fn is_authorized(&self, caller: &Identity) -> Result<bool> {
        self.registry.is_authorized(&self.conn, caller)
    }

    pub fn registered_user(&self) -> Result<Option<User>> {
        self.registry.registered_user(&self.conn)
    }

    fn authorize(&self, caller: &Identity, operation: &str) -> Result<()> {
        if self.is_authorized(caller)? {
            return Ok(());
        }
        warn!(caller = %caller, operation, "unauthorized caller");
        Err(ServiceError::Unauthorized)
    }

    // ==================== Mutations ====================

    pub fn create_report(&self, payload: &ReportPayload, caller: &Identity) -> Result<ReportId> {
        self.authorize(caller, "create_report")?;
        let status = validate_payload(payload)?;

        let report = Report {
            id: ReportId::new(self.ids.new_id()),
            location: payload.location.clone(),
            latitude: payload.latitude,
            longitude: payload.longitude,
            type_of_waste: payload.type_of_waste.clone(),
            description: payload.description.clone(),
            status,
            reporter_id: payload.reporter_id.clone(),
            created_at: self.clock.now(),
            updated_at: None,
        };
        self.reports.insert(&self.conn, report.id.as_str(), &report)?;

        info!(report_id = %report.id, %status, "created report");
        Ok(report.id)
    }

    /// Replace every payload field of an existing report.
    pub fn update_report(
        &self,
        id: &ReportId,
        payload: &ReportPayload,
        caller: &Identity,
    ) -> Result<ReportId> {
        self.authorize(caller, "update_report")?;
        let status = validate_payload(payload)?;

        let existing = self.find(id)?;
        let report = Report {
            id: existing.id,
            location: payload.location.clone(),
            latitude: payload.latitude,
            longitude: payload.longitude,
            type_of_waste: payload.type_of_waste.clone(),
            description: payload.description.clone(),
            status,
            reporter_id: payload.reporter_id.clone(),
            created_at: existing.created_at,
            updated_at: Some(self.clock.now()),
        };
        self.reports.insert(&self.conn, report.id.as_str(), &report)?;

        info!(report_id = %report.id, %status, "updated report");
        Ok(report.id)
    }

    /// Remove a report. Deleting an absent id succeeds with
    /// [`DeleteOutcome::NotFound`] and changes nothing.
    pub fn delete_report(&self, id: &ReportId, caller: &Identity) -> Result<DeleteOutcome> {
        self.authorize(caller, "delete_report")?;
        require_id(id.as_str(), PayloadField::Id)?;

        if self.reports.remove(&self.conn, id.as_str())? {
            info!(report_id = %id, "deleted report");
            Ok(DeleteOutcome::Removed(id.clone()))
        } else {
            debug!(report_id = %id, "delete of absent report");
            Ok(DeleteOutcome::NotFound(id.clone()))
        }
    }

    /// Move an `in_progress` report to `resolved`.
    pub fn resolve_report(&self, id: &ReportId, caller: &Identity) -> Result<Report> {
        if self.policy.resolve_requires_authorization {
            self.authorize(caller, "resolve_report")?;
        }
        require_id(id.as_str(), PayloadField::Id)?;

        let mut report = self.find(id)?;
        if report.status != ReportStatus::InProgress {
            return Err(ServiceError::InvalidTransition {
                id: report.id,
                current: report.status,
            });
        }

        report.status = ReportStatus::Resolved;
        report.updated_at = Some(self.clock.now());
        self.reports.insert(&self.conn, report.id.as_str(), &report)?;

        info!(report_id = %report.id, "resolved report");
        Ok(report)
    }

    // ==================== Queries ====================

    pub fn get_by_id(&self, id: &ReportId) -> Result<ReportLocationView> {
        require_id(id.as_str(), PayloadField::Id)?;
        let report = self.find(id)?;
        Ok(ReportLocationView::for_report(&report))
    }

    pub fn list_all(&self) -> Result<Vec<Report>> {
        let reports = self.reports.list_all(&self.conn)?;
        debug!(count = reports.len(), "listed reports");
        Ok(reports)
    }

    /// Case-insensitive exact match on status.
    pub fn list_by_status(&self, status: &str) -> Result<Vec<Report>> {
        let wanted = normalize(status);
        self.filtered(|report| report.status.as_str() == wanted)
    }

    /// Trimmed, case-insensitive exact match on reporter id.
    pub fn list_by_reporter(&self, reporter_id: &str) -> Result<Vec<Report>> {
        require_id(reporter_id, PayloadField::ReporterId)?;
        let wanted = normalize(reporter_id);
        self.filtered(|report| normalize(&report.reporter_id) == wanted)
    }

    fn filtered(&self, keep: impl Fn(&Report) -> bool) -> Result<Vec<Report>> {
        Ok(self
            .reports
            .list_all(&self.conn)?
            .into_iter()
            .filter(|report| keep(report))
            .collect())
    }

    fn find(&self, id: &ReportId) -> Result<Report> {
        self.reports
            .get(&self.conn, id.as_str())?
            .ok_or_else(|| ServiceError::NotFound(id.clone()))
    }
}
