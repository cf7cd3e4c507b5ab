use bytes::Bytes;

use super::client::ApiClient;
use super::models::{AuditLog, AuditQuery, AuditReportRequest};
use crate::error::Result;

impl ApiClient {
    pub async fn audit_logs(&self, query: &AuditQuery) -> Result<Vec<AuditLog>> {
        self.get_json_with_query(&["network", "audit"], &query.to_params())
            .await
    }

    /// Asks the backend to render `logs` as a PDF report; the raw document bytes are returned.
    pub async fn audit_report(&self, logs: &[AuditLog], filters: &AuditQuery) -> Result<Bytes> {
        self.post_for_bytes(
            &["network", "audit", "report"],
            &AuditReportRequest { logs, filters },
        )
        .await
    }
}
