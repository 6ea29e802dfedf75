use reqwest::multipart::{Form, Part};
use tracing::{debug, warn};

use crate::config::{Config, DeliveryMode, WebhookUrl};
use crate::error::RelayError;
use crate::models::{Attachment, MultipartPayload, WebhookPayload, WEBHOOK_CONTENT};

#[derive(Debug, Clone)]
pub struct Client {
    http: reqwest::Client,
    webhook_url: WebhookUrl,
    mode: DeliveryMode,
}

impl Client {
    pub fn new(config: &Config) -> Result<Client, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.webhook_timeout {
            builder = builder.timeout(timeout);
        }

        Ok(Client {
            http: builder.build()?,
            webhook_url: config.webhook_url.clone(),
            mode: config.webhook_delivery_mode,
        })
    }

    /// Posts all attachments to the webhook in a single request. Whatever
    /// status comes back counts as delivered; only transport errors fail.
    pub async fn send(&self, attachments: Vec<Attachment>) -> Result<(), RelayError> {
        let request = self.http.post(self.webhook_url.as_url().clone());

        let request = match self.mode {
            DeliveryMode::Json => {
                let payload = WebhookPayload {
                    content: WEBHOOK_CONTENT,
                    files: &attachments,
                };
                request.json(&payload)
            }
            DeliveryMode::Multipart => request.multipart(multipart_form(attachments)?),
        };

        debug!(host = self.webhook_url.host(), mode = ?self.mode, "posting to webhook");
        let response = request.send().await?;

        let status = response.status();
        if !status.is_success() {
            warn!(status = status.as_u16(), "webhook answered with a non-success status");
        } else {
            debug!(status = status.as_u16(), "webhook accepted the upload");
        }

        Ok(())
    }
}

fn multipart_form(attachments: Vec<Attachment>) -> Result<Form, RelayError> {
    let payload_json = serde_json::to_string(&MultipartPayload::new(WEBHOOK_CONTENT, &attachments))?;
    let mut form = Form::new().part(
        "payload_json",
        Part::text(payload_json).mime_str("application/json")?,
    );

    for (index, attachment) in attachments.into_iter().enumerate() {
        let part = Part::bytes(attachment.data)
            .file_name(attachment.name)
            .mime_str(&attachment.content_type)?;
        form = form.part(format!("files[{}]", index), part);
    }

    Ok(form)
}
