use axum::{
    extract::{Query, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::Utc;
use defectline_core::{DefectReport, NewDefectReport};
use serde::Deserialize;
use serde_json::{json, Value};

use crate::state::SimState;

pub fn routes() -> Router<SimState> {
    Router::new().route("/api/reports", get(list_reports).post(create_report))
}

#[derive(Debug, Deserialize)]
struct ReportQuery {
    department: Option<String>,
    product: Option<String>,
}

async fn list_reports(
    State(state): State<SimState>,
    Query(q): Query<ReportQuery>,
) -> Json<Vec<DefectReport>> {
    let reports = state.reports.lock().unwrap();
    let filtered = reports
        .iter()
        .filter(|r| match &q.department {
            // Case-sensitive exact match, per the contract.
            Some(dept) => &r.department == dept,
            None => true,
        })
        .filter(|r| match &q.product {
            // Substring match; product match semantics are store-defined.
            Some(name) => r.product_name.contains(name.as_str()),
            None => true,
        })
        .cloned()
        .collect();
    Json(filtered)
}

async fn create_report(
    State(state): State<SimState>,
    Json(input): Json<NewDefectReport>,
) -> Result<(StatusCode, Json<Value>), (StatusCode, Json<Value>)> {
    if let Err(e) = input.validate() {
        return Err((
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": e.to_string() })),
        ));
    }

    let id = state.next_report_id();
    let timestamp_ns = Utc::now().timestamp_nanos_opt().unwrap_or_default();
    let report = DefectReport {
        id,
        product_name: input.product_name,
        department: input.department,
        employee_id: input.employee_id,
        description: input.description,
        timestamp_ns,
        photo: input.photo,
    };
    tracing::info!(id, department = %report.department, "defect report created");
    state.reports.lock().unwrap().push(report);

    Ok((StatusCode::CREATED, Json(json!({ "id": id }))))
}
