//! Report command handlers.

use serde_json::Value;
use wastewatch_reports::ReportService;
use wastewatch_types::{Identity, ReportId, ReportPayload};

use super::{str_param, Result};
use crate::rpc::RpcError;

fn payload_param(params: &Value) -> std::result::Result<ReportPayload, RpcError> {
    let raw = params
        .get("payload")
        .cloned()
        .ok_or_else(|| RpcError::invalid_params("payload required"))?;
    serde_json::from_value(raw)
        .map_err(|e| RpcError::invalid_params(&format!("malformed payload: {e}")))
}

fn id_param(params: &Value) -> std::result::Result<ReportId, RpcError> {
    str_param(params, "id").map(ReportId::new)
}

/// Create a report.
pub fn create_report(service: &ReportService, caller: &Identity, params: &Value) -> Result {
    let payload = payload_param(params)?;
    let id = service.create_report(&payload, caller)?;
    Ok(serde_json::json!({"id": id}))
}

/// Replace all fields of an existing report.
pub fn update_report(service: &ReportService, caller: &Identity, params: &Value) -> Result {
    let id = id_param(params)?;
    let payload = payload_param(params)?;
    let id = service.update_report(&id, &payload, caller)?;
    Ok(serde_json::json!({"id": id}))
}

/// Delete a report. An absent id is reported, not an error.
pub fn delete_report(service: &ReportService, caller: &Identity, params: &Value) -> Result {
    let id = id_param(params)?;
    let outcome = service.delete_report(&id, caller)?;
    Ok(serde_json::json!({
        "removed": outcome.removed(),
        "message": outcome.message(),
    }))
}

/// Resolve an in-progress report.
pub fn resolve_report(service: &ReportService, caller: &Identity, params: &Value) -> Result {
    let id = id_param(params)?;
    let report = service.resolve_report(&id, caller)?;
    Ok(serde_json::json!(report))
}

pub fn get_report_location(service: &ReportService, params: &Value) -> Result {
    let id = id_param(params)?;
    let view = service.get_by_id(&id)?;
    Ok(serde_json::json!(view))
}

pub fn list_reports(service: &ReportService) -> Result {
    Ok(serde_json::json!(service.list_all()?))
}

pub fn list_reports_by_status(service: &ReportService, params: &Value) -> Result {
    let status = str_param(params, "status")?;
    Ok(serde_json::json!(service.list_by_status(status)?))
}

pub fn list_reports_by_reporter(service: &ReportService, params: &Value) -> Result {
    let reporter_id = str_param(params, "reporter_id")?;
    Ok(serde_json::json!(service.list_by_reporter(reporter_id)?))
}
