use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::blob::BlobRef;

/// A stored defect report. `id` and `timestamp` are assigned by the
/// remote store on creation and never change; reports are read-only
/// once created (no update or delete path exists).
///
/// Wire field names are camelCase, matching the remote store contract.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DefectReport {
    pub id: u64,
    pub product_name: String,
    /// Raw wire value. Expected to be one of the fixed departments, but
    /// the store does not enforce this; unknown values are preserved.
    pub department: String,
    pub employee_id: String,
    pub description: String,
    /// Creation time, nanoseconds since the Unix epoch.
    #[serde(rename = "timestamp")]
    pub timestamp_ns: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<BlobRef>,
}

impl DefectReport {
    pub fn timestamp_utc(&self) -> DateTime<Utc> {
        Utc.timestamp_nanos(self.timestamp_ns)
    }

    /// Store timestamp formatted for table display.
    pub fn format_timestamp(&self) -> String {
        self.timestamp_utc().format("%d. %b %Y %H:%M").to_string()
    }
}

/// Submission payload: a report minus the store-assigned fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewDefectReport {
    pub product_name: String,
    pub department: String,
    pub employee_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo: Option<BlobRef>,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("missing required fields: {}", missing.join(", "))]
pub struct ValidationError {
    pub missing: Vec<&'static str>,
}

impl NewDefectReport {
    /// Required-field check. The photo is optional; everything else must
    /// be non-empty (whitespace-only counts as empty).
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut missing = Vec::new();
        if self.product_name.trim().is_empty() {
            missing.push("productName");
        }
        if self.department.trim().is_empty() {
            missing.push("department");
        }
        if self.employee_id.trim().is_empty() {
            missing.push("employeeId");
        }
        if self.description.trim().is_empty() {
            missing.push("description");
        }
        if missing.is_empty() {
            Ok(())
        } else {
            Err(ValidationError { missing })
        }
    }

    /// Guard for enabling the submit control.
    pub fn is_complete(&self) -> bool {
        self.validate().is_ok()
    }
}
