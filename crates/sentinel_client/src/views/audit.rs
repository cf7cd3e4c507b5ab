//! Audit trail: filtered device event history with CSV and PDF export.

use std::io;
use std::sync::Arc;

use bytes::Bytes;
use chrono::NaiveDate;
use log::warn;
use serde::Serialize;
use thiserror::Error;
use tokio::sync::RwLock;

use crate::api::models::{AuditLog, AuditQuery};
use crate::api::ApiClient;
use crate::notify::Notifier;

pub const REPORT_FILE_NAME: &str = "audit_logs.pdf";

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

#[derive(Debug, Serialize)]
struct CsvRow<'a> {
    #[serde(rename = "Timestamp")]
    timestamp: String,
    #[serde(rename = "Event Type")]
    event_type: &'a str,
    #[serde(rename = "Device MAC")]
    device_mac: &'a str,
    #[serde(rename = "Device Name")]
    device_name: &'a str,
    #[serde(rename = "IP Address")]
    ip_address: &'a str,
    #[serde(rename = "Details")]
    details: &'a str,
}

/// Writes one row per log entry under a fixed header. A missing IP is written as `N/A`.
pub fn write_csv<W: io::Write>(logs: &[AuditLog], writer: W) -> Result<(), ExportError> {
    let mut csv_writer = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);
    for log in logs {
        csv_writer.serialize(CsvRow {
            timestamp: log.timestamp.format("%Y-%m-%d %H:%M:%S").to_string(),
            event_type: &log.event_type,
            device_mac: &log.device_mac,
            device_name: log.device_name.as_deref().unwrap_or(""),
            ip_address: log.ip_address.as_deref().unwrap_or("N/A"),
            details: log.details.as_deref().unwrap_or(""),
        })?;
    }
    csv_writer.flush()?;
    Ok(())
}

pub fn csv_file_name(date: NaiveDate) -> String {
    format!("network-audit-{}.csv", date.format("%Y-%m-%d"))
}

#[derive(Debug, Clone, Default)]
struct AuditCache {
    query: AuditQuery,
    logs: Vec<AuditLog>,
}

pub struct AuditTrail {
    api: ApiClient,
    notifier: Arc<dyn Notifier>,
    cache: RwLock<AuditCache>,
}

impl AuditTrail {
    pub fn new(api: ApiClient, notifier: Arc<dyn Notifier>) -> Self {
        Self {
            api,
            notifier,
            cache: RwLock::new(AuditCache::default()),
        }
    }

    pub async fn fetch(&self, query: AuditQuery) -> Option<Vec<AuditLog>> {
        match self.api.audit_logs(&query).await {
            Ok(logs) => {
                let mut cache = self.cache.write().await;
                cache.query = query;
                cache.logs = logs.clone();
                Some(logs)
            }
            Err(err) => {
                warn!("Fetching audit logs failed: {err}");
                self.notifier.error("Failed to fetch audit logs");
                None
            }
        }
    }

    pub async fn logs(&self) -> Vec<AuditLog> {
        self.cache.read().await.logs.clone()
    }

    /// Exports the last fetched logs.
    pub async fn export_csv<W: io::Write>(&self, writer: W) -> bool {
        let cache = self.cache.read().await;
        if cache.logs.is_empty() {
            self.notifier.warning("No data to export");
            return false;
        }
        match write_csv(&cache.logs, writer) {
            Ok(()) => {
                self.notifier.success("CSV report downloaded");
                true
            }
            Err(err) => {
                warn!("CSV export failed: {err}");
                self.notifier.error("Failed to export CSV");
                false
            }
        }
    }

    /// Renders the last fetched logs and their filters as a PDF on the backend.
    pub async fn download_report(&self) -> Option<Bytes> {
        let cache = self.cache.read().await.clone();
        match self.api.audit_report(&cache.logs, &cache.query).await {
            Ok(pdf) => {
                self.notifier.success("PDF downloaded");
                Some(pdf)
            }
            Err(err) => {
                warn!("Audit report generation failed: {err}");
                self.notifier.error("Failed to download PDF");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn log(mac: &str, ip: Option<&str>) -> AuditLog {
        AuditLog {
            id: None,
            timestamp: Utc.with_ymd_and_hms(2025, 4, 7, 9, 15, 22).unwrap(),
            device_mac: mac.to_string(),
            event_type: "connect".to_string(),
            ip_address: ip.map(str::to_string),
            details: Some("Device joined, \"guest\" VLAN".to_string()),
            device_name: None,
        }
    }

    #[test]
    fn csv_has_header_and_placeholders() {
        let mut out = Vec::new();
        write_csv(&[log("aa:bb:cc:dd:ee:ff", None)], &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let mut lines = text.lines();

        assert_eq!(
            lines.next(),
            Some(r#""Timestamp","Event Type","Device MAC","Device Name","IP Address","Details""#)
        );
        assert_eq!(
            lines.next(),
            Some(r#""2025-04-07 09:15:22","connect","aa:bb:cc:dd:ee:ff","","N/A","Device joined, ""guest"" VLAN""#)
        );
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn csv_file_name_uses_date() {
        let date = NaiveDate::from_ymd_opt(2025, 4, 7).unwrap();
        assert_eq!(csv_file_name(date), "network-audit-2025-04-07.csv");
    }
}
