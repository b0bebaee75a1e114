//! Outbound user notifications.

use crate::config::WhatsAppConfig;
use crate::model::UserId;
use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, instrument, warn};

#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("HTTP request failed: {0}")]
    RequestFailed(#[from] reqwest::Error),

    #[error("Message rejected ({status}): {body}")]
    Rejected { status: StatusCode, body: String },

    /// Used by test doubles and in-process transports.
    #[error("Delivery failed: {0}")]
    Failed(String),
}

/// Best-effort delivery of a text message to a user.
///
/// Callers log failures and move on; nothing is retried.
#[async_trait]
pub trait NotificationService: Send + Sync {
    async fn send(&self, user: &UserId, text: &str) -> Result<(), NotifyError>;
}

#[derive(Debug, Serialize)]
struct TextBody<'a> {
    body: &'a str,
}

#[derive(Debug, Serialize)]
struct MessagePayload<'a> {
    messaging_product: &'static str,
    to: &'a str,
    #[serde(rename = "type")]
    kind: &'static str,
    text: TextBody<'a>,
}

impl<'a> MessagePayload<'a> {
    fn text(to: &'a str, body: &'a str) -> Self {
        Self {
            messaging_product: "whatsapp",
            to,
            kind: "text",
            text: TextBody { body },
        }
    }
}

/// WhatsApp Cloud API sender.
pub struct WhatsAppClient {
    messages_url: String,
    access_token: String,
    client: Client,
}

impl WhatsAppClient {
    pub fn new(config: &WhatsAppConfig) -> Result<Self, NotifyError> {
        let client = Client::builder().timeout(config.request_timeout).build()?;
        Ok(Self {
            messages_url: format!(
                "{}/{}/{}/messages",
                config.base_url, config.api_version, config.phone_number_id
            ),
            access_token: config.access_token.clone(),
            client,
        })
    }
}

#[async_trait]
impl NotificationService for WhatsAppClient {
    #[instrument(skip(self, text), fields(user = %user))]
    async fn send(&self, user: &UserId, text: &str) -> Result<(), NotifyError> {
        debug!("Sending message");
        let response = self
            .client
            .post(&self.messages_url)
            .bearer_auth(&self.access_token)
            .json(&MessagePayload::text(user.as_str(), text))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            warn!(%status, %body, "Message rejected");
            return Err(NotifyError::Rejected { status, body });
        }

        debug!("Message sent");
        Ok(())
    }
}

/// Writes notifications to the log instead of delivering them.
#[derive(Debug, Default, Clone)]
pub struct LogNotifier;

#[async_trait]
impl NotificationService for LogNotifier {
    async fn send(&self, user: &UserId, text: &str) -> Result<(), NotifyError> {
        info!(%user, %text, "Notification");
        Ok(())
    }
}
