//! Request/response audit records

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Outbound half of an audited call.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditRequest {
    pub method: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// Inbound half of an audited call.
///
/// A transport failure that never produced a response is recorded with
/// `status == 0` and the failure description in `status_text`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditResponse {
    pub status: u16,
    pub status_text: String,
    pub ok: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub body: Option<Value>,
}

/// A completed call, before the audit log assigns it an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditRecord {
    pub endpoint: String,
    pub request: AuditRequest,
    pub response: AuditResponse,
    pub duration_ms: u64,
}

impl AuditRecord {
    pub fn is_ok(&self) -> bool {
        self.response.ok
    }
}

/// An entry of the append-only audit log. Ids increase in completion order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuditLogEntry {
    pub id: u64,
    #[serde(flatten)]
    pub record: AuditRecord,
}

impl AuditLogEntry {
    pub fn endpoint(&self) -> &str {
        &self.record.endpoint
    }

    pub fn method(&self) -> &str {
        &self.record.request.method
    }

    pub fn status(&self) -> u16 {
        self.record.response.status
    }

    pub fn is_ok(&self) -> bool {
        self.record.response.ok
    }
}
