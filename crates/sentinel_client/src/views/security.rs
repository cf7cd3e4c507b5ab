use std::sync::Arc;

use log::warn;

use crate::api::models::{EmailAnalysis, SecurityReport, UrlAnalysis};
use crate::auth::SessionManager;
use crate::notify::Notifier;

/// ML-backed URL and phishing analysis plus the admin-only report history.
pub struct SecurityTools {
    sessions: Arc<SessionManager>,
    notifier: Arc<dyn Notifier>,
}

impl SecurityTools {
    pub fn new(sessions: Arc<SessionManager>, notifier: Arc<dyn Notifier>) -> Self {
        Self { sessions, notifier }
    }

    pub async fn analyze_url(&self, url: &str) -> Option<UrlAnalysis> {
        let url = url.trim();
        if url.is_empty() {
            self.notifier.error("Please enter a URL to analyze");
            return None;
        }

        match self.sessions.api().analyze_url(url).await {
            Ok(analysis) => {
                if analysis.is_malicious {
                    self.notifier.error("Potentially malicious URL detected!");
                } else {
                    self.notifier.success("URL appears to be safe");
                }
                Some(analysis)
            }
            Err(err) => {
                warn!("URL analysis failed: {err}");
                self.notifier.error(&err.user_message("Error analyzing URL"));
                None
            }
        }
    }

    pub async fn analyze_email(&self, email_text: &str) -> Option<EmailAnalysis> {
        if email_text.trim().is_empty() {
            self.notifier.error("Please enter email content to analyze");
            return None;
        }

        match self.sessions.api().analyze_email(email_text).await {
            Ok(analysis) => {
                if analysis.is_phishing {
                    self.notifier.error("Potential phishing detected!");
                } else {
                    self.notifier.success("Email appears to be legitimate");
                }
                Some(analysis)
            }
            Err(err) => {
                warn!("Email analysis failed: {err}");
                self.notifier.error(&err.user_message("Error analyzing email"));
                None
            }
        }
    }

    pub async fn reports(&self) -> Option<Vec<SecurityReport>> {
        if let Err(err) = self.sessions.require_admin().await {
            self.notifier.error(&err.user_message("Admin access required"));
            return None;
        }

        match self.sessions.api().security_reports().await {
            Ok(reports) => Some(reports),
            Err(err) => {
                warn!("Fetching security reports failed: {err}");
                self.notifier.error("Failed to fetch security reports");
                None
            }
        }
    }
}
