use async_trait::async_trait;
use serde_json::{Value, json};

use crate::{config::MailConfig, error::SendError, types::DeliveryReceipt};

pub const SENDGRID_URL: &str = "https://api.sendgrid.com/v3/mail/send";

#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, subject: &str, html: &str) -> Result<DeliveryReceipt, SendError>;
}

pub struct SendGridMailer {
    client: reqwest::Client,
    config: MailConfig,
}

impl SendGridMailer {
    pub fn new(client: reqwest::Client, config: MailConfig) -> Self {
        Self { client, config }
    }
}

#[async_trait]
impl Mailer for SendGridMailer {
    async fn send(&self, subject: &str, html: &str) -> Result<DeliveryReceipt, SendError> {
        let res = self
            .client
            .post(&self.config.endpoint)
            .bearer_auth(&self.config.api_key)
            .header("Content-Type", "application/json")
            .body(payload(&self.config, subject, html).to_string())
            .send()
            .await?;

        let status = res.status();
        let message_id = res
            .headers()
            .get("X-Message-Id")
            .and_then(|id| id.to_str().ok())
            .map(str::to_owned);

        if !status.is_success() {
            let body = res.text().await.unwrap_or("Missing body".into());
            return Err(SendError::Rejected {
                status: status.as_u16(),
                body,
            });
        }

        Ok(DeliveryReceipt {
            status: status.as_u16(),
            message_id,
        })
    }
}

/// SendGrid v3 body for a single html message to one recipient.
pub fn payload(config: &MailConfig, subject: &str, html: &str) -> Value {
    json!({
        "personalizations": [{
            "to": [{ "email": config.recipient }]
        }],
        "from": { "email": config.sender },
        "subject": subject,
        "content": [{
            "type": "text/html",
            "value": html
        }]
    })
}
