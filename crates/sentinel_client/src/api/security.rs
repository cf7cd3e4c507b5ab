use reqwest::Method;

use super::client::ApiClient;
use super::models::{EmailAnalysis, EmailRequest, SecurityReport, UrlAnalysis, UrlRequest};
use crate::error::Result;

impl ApiClient {
    pub async fn analyze_url(&self, url: &str) -> Result<UrlAnalysis> {
        self.send_json(Method::POST, &["security", "analyze-url"], &UrlRequest { url })
            .await
    }

    pub async fn analyze_email(&self, email_text: &str) -> Result<EmailAnalysis> {
        self.send_json(
            Method::POST,
            &["security", "analyze-email"],
            &EmailRequest { email_text },
        )
        .await
    }

    pub async fn security_reports(&self) -> Result<Vec<SecurityReport>> {
        self.get_json(&["security", "reports"]).await
    }
}
