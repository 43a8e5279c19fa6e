//! Password sessions through the auth service.

use async_trait::async_trait;
use motodir_core::{AuthUser, Session};
use serde_json::{json, Value};
use tokio::sync::watch;

use super::SupabaseGateway;
use crate::error::GatewayError;
use crate::gateway::{decode, Auth, SignUpOutcome, SignUpRequest};

impl SupabaseGateway {
    /// Auth endpoints always authenticate as the project, never as the user.
    fn anon_request(&self, url: reqwest::Url) -> reqwest::RequestBuilder {
        self.client
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(&self.anon_key)
    }
}

#[async_trait]
impl Auth for SupabaseGateway {
    async fn sign_in(&self, email: &str, password: &str) -> Result<Session, GatewayError> {
        let mut url = self.endpoint(["auth", "v1", "token"]);
        url.query_pairs_mut().append_pair("grant_type", "password");
        let request = self
            .anon_request(url)
            .json(&json!({ "email": email, "password": password }));

        let body = self.send_json(request, "auth/token").await?;
        let session: Session = decode("auth/token", body)?;
        tracing::info!(user_id = %session.user.id, "signed in");
        self.set_session(Some(session.clone()));
        Ok(session)
    }

    async fn sign_up(&self, request: &SignUpRequest) -> Result<SignUpOutcome, GatewayError> {
        let url = self.endpoint(["auth", "v1", "signup"]);
        let payload = json!({
            "email": request.email,
            "password": request.password,
            "data": {
                "full_name": request.full_name,
                "phone": request.phone,
            },
        });
        let body = self
            .send_json(self.anon_request(url).json(&payload), "auth/signup")
            .await?;

        if body.get("access_token").is_some_and(Value::is_string) {
            let session: Session = decode("auth/signup", body)?;
            tracing::info!(user_id = %session.user.id, "signed up with immediate session");
            self.set_session(Some(session.clone()));
            return Ok(SignUpOutcome::SignedIn(session));
        }

        // Without a session the service returns the user, either bare or
        // wrapped in a `user` field.
        let user_value = match body {
            Value::Object(mut map) if map.contains_key("user") => {
                map.remove("user").unwrap_or(Value::Null)
            }
            other => other,
        };
        let user: AuthUser = decode("auth/signup", user_value)?;
        tracing::info!(user_id = %user.id, "signed up, confirmation required");
        Ok(SignUpOutcome::ConfirmationRequired(user))
    }

    async fn sign_out(&self) -> Result<(), GatewayError> {
        let token = self
            .session
            .borrow()
            .as_ref()
            .map(|s| s.access_token.clone());
        let Some(token) = token else {
            return Ok(());
        };

        let url = self.endpoint(["auth", "v1", "logout"]);
        let request = self
            .client
            .post(url)
            .header("apikey", &self.anon_key)
            .bearer_auth(token);
        let result = self.send_json(request, "auth/logout").await.map(|_| ());

        self.set_session(None);
        tracing::info!("signed out");
        result
    }

    fn current_session(&self) -> Option<Session> {
        self.session.borrow().clone()
    }

    fn subscribe(&self) -> watch::Receiver<Option<Session>> {
        self.session.subscribe()
    }
}
