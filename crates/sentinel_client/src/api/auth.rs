use reqwest::Method;

use super::client::ApiClient;
use super::models::{Identity, RegisterRequest, Role, TokenResponse, UserSummary};
use crate::error::Result;

impl ApiClient {
    /// `POST /auth/login` with form-encoded credentials. Returns the bearer token.
    pub async fn login(&self, username: &str, password: &str) -> Result<String> {
        let response: TokenResponse = self
            .post_form(
                &["auth", "login"],
                &[("username", username), ("password", password)],
            )
            .await?;
        Ok(response.access_token)
    }

    pub async fn me(&self) -> Result<Identity> {
        self.get_json(&["auth", "me"]).await
    }

    pub async fn register(&self, username: &str, password: &str, role: Role) -> Result<()> {
        let body = RegisterRequest {
            username,
            password,
            role,
        };
        self.send_unit(Method::POST, &["auth", "register"], Some(&body))
            .await
    }

    pub async fn list_users(&self) -> Result<Vec<UserSummary>> {
        self.get_json(&["auth", "users"]).await
    }

    pub async fn delete_user(&self, username: &str) -> Result<()> {
        self.send_unit::<()>(Method::DELETE, &["auth", "users", username], None)
            .await
    }
}
