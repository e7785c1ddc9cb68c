// crates/adapt/src/mailchimp.rs

use async_trait::async_trait;
use domain::setting::MailchimpSettings;
use reqwest::header::AUTHORIZATION;
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serve::backend::{BackendError, MailingList};
use thiserror::Error;
use url::Url;

#[derive(Debug, Error)]
pub enum MailchimpError {
    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("invalid url: {0}")]
    Url(#[from] url::ParseError),
}

impl From<MailchimpError> for BackendError {
    fn from(err: MailchimpError) -> Self {
        match err {
            MailchimpError::Http(e) => BackendError::Transport(e.to_string()),
            MailchimpError::Status { status, body } => BackendError::Status {
                status,
                message: body,
            },
            MailchimpError::Url(e) => BackendError::Transport(e.to_string()),
        }
    }
}

#[derive(Debug, Serialize)]
struct Member<'a> {
    email_address: &'a str,
    status: &'static str,
}

pub fn members_url(server_prefix: &str, audience_id: &str) -> Result<Url, MailchimpError> {
    Ok(Url::parse(&format!(
        "https://{server_prefix}.api.mailchimp.com/3.0/lists/{audience_id}/members"
    ))?)
}

/// Audience subscriber. Delivery of any email is the provider's business.
pub struct MailchimpClient {
    http: reqwest::Client,
    members: Url,
    api_key: SecretString,
}

impl MailchimpClient {
    pub fn new(settings: &MailchimpSettings) -> Result<Self, MailchimpError> {
        Ok(Self {
            http: reqwest::Client::builder().build()?,
            members: members_url(&settings.server_prefix, &settings.audience_id)?,
            api_key: settings.api_key.clone(),
        })
    }

    async fn add_member(&self, email: &str) -> Result<(), MailchimpError> {
        let response = self
            .http
            .post(self.members.clone())
            .header(AUTHORIZATION, format!("apikey {}", self.api_key.expose_secret()))
            .json(&Member {
                email_address: email,
                status: "subscribed",
            })
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }
        Err(MailchimpError::Status {
            status: status.as_u16(),
            body: response.text().await.unwrap_or_default(),
        })
    }
}

#[async_trait]
impl MailingList for MailchimpClient {
    #[tracing::instrument(skip_all)]
    async fn subscribe(&self, email: &str) -> Result<(), BackendError> {
        Ok(self.add_member(email).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn members_url_uses_data_center_prefix() {
        let url = members_url("us21", "abc123").unwrap();
        assert_eq!(
            url.as_str(),
            "https://us21.api.mailchimp.com/3.0/lists/abc123/members"
        );
    }

    #[test]
    fn member_body_is_subscribed() {
        let body = serde_json::to_value(Member {
            email_address: "a@b.co",
            status: "subscribed",
        })
        .unwrap();
        assert_eq!(
            body,
            serde_json::json!({"email_address": "a@b.co", "status": "subscribed"})
        );
    }
}
