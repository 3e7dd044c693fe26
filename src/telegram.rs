use reqwest::{
    blocking::{multipart, Client, Response},
    StatusCode,
};
use serde::{Deserialize, Serialize};

use crate::{
    config::{ChatId, TelegramConfig},
    error::ServiceError,
    locate::LocatedImage,
    retry::RetryPolicy,
    statics::{content_type, MAX_PHOTO_CAPTION},
    utils::{clamp, http_client, join_url},
};

const SERVICE: &str = "telegram";

#[derive(Debug, Serialize)]
pub struct SendMessage {
    pub chat_id: ChatId,
    pub text: String,
}

impl SendMessage {
    pub fn new(chat_id: &ChatId, text: impl AsRef<str>) -> Self {
        Self {
            chat_id: chat_id.clone(),
            text: text.as_ref().to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct Reply {
    ok: bool,
    description: Option<String>,
}

fn check_reply(status: StatusCode, body: &str) -> Result<(), ServiceError> {
    let reply: Option<Reply> = serde_json::from_str(body).ok();

    match reply {
        Some(Reply { ok: true, .. }) if status.is_success() => Ok(()),
        _ if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS => {
            Err(ServiceError::UnexpectedStatus {
                service: SERVICE,
                status,
                body: body.to_string(),
            })
        }
        Some(Reply {
            description: Some(description),
            ..
        }) => Err(ServiceError::Rejected {
            service: SERVICE,
            description,
        }),
        _ => Err(ServiceError::UnexpectedStatus {
            service: SERVICE,
            status,
            body: body.to_string(),
        }),
    }
}

pub struct TelegramClient {
    client: Client,
    api_base: String,
    token: String,
    chat_id: ChatId,
    retry: RetryPolicy,
}

impl TelegramClient {
    pub fn new(config: &TelegramConfig, timeout_secs: u64, retry: RetryPolicy) -> anyhow::Result<Self> {
        Ok(Self {
            client: http_client(timeout_secs)?,
            api_base: config.api_base.clone(),
            token: config.token.clone(),
            chat_id: config.chat_id.clone(),
            retry,
        })
    }

    fn method_url(&self, method: &str) -> String {
        join_url(&self.api_base, &format!("bot{}/{method}", self.token))
    }

    fn finish(response: Result<Response, reqwest::Error>) -> Result<(), ServiceError> {
        let response = response.map_err(|e| ServiceError::http(SERVICE, e))?;
        let status = response.status();
        let body = response
            .text()
            .map_err(|e| ServiceError::http(SERVICE, e))?;
        check_reply(status, &body)
    }

    pub fn send(&self, message: &SendMessage) -> anyhow::Result<()> {
        let url = self.method_url("sendMessage");
        self.retry.run("sendMessage", || {
            Self::finish(self.client.post(&url).json(message).send())
        })?;
        tracing::info!("Sent message to chat {}", self.chat_id);
        Ok(())
    }

    pub fn send_message(&self, text: &str) -> anyhow::Result<()> {
        self.send(&SendMessage::new(&self.chat_id, text))
    }

    pub fn send_photo(&self, image: &LocatedImage, caption: Option<&str>) -> anyhow::Result<()> {
        let url = self.method_url("sendPhoto");
        let mime = content_type(&image.extension());

        self.retry.run("sendPhoto", || {
            // a multipart form is consumed by sending, so build it for every attempt
            let photo = multipart::Part::bytes(image.bytes.clone())
                .file_name(image.file_name())
                .mime_str(mime)
                .map_err(|e| ServiceError::http(SERVICE, e))?;
            let form = multipart::Form::new()
                .text("chat_id", self.chat_id.to_string())
                .part("photo", photo);
            let form = if let Some(caption) = caption {
                form.text("caption", clamp(caption, MAX_PHOTO_CAPTION).to_string())
            } else {
                form
            };

            Self::finish(self.client.post(&url).multipart(form).send())
        })?;
        tracing::info!("Sent photo {:?} to chat {}", image.path, self.chat_id);
        Ok(())
    }
}
