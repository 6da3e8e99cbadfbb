//! Superchat WhatsApp sender. The API key comes from SUPERCHAT_API_KEY.

use reqwest::Client;
use serde_json::json;

use crate::notify::{SendError, normalize_phone};

pub const SUPERCHAT_BASE: &str = "https://api.superchat.de";

#[derive(Debug, Clone)]
pub struct SuperchatSender {
    api_key: String,
    base_url: String,
    http: Client,
}

impl SuperchatSender {
    pub fn from_env() -> Result<Self, SendError> {
        match std::env::var("SUPERCHAT_API_KEY").ok().filter(|v| !v.is_empty()) {
            Some(key) => Ok(Self::new(key, SUPERCHAT_BASE)),
            None => Err(SendError::NotConfigured("Superchat")),
        }
    }

    pub fn new(api_key: impl Into<String>, base_url: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
        let to = normalize_phone(to);
        let url = format!("{}/v1/messages", self.base_url);
        log::debug!("Superchat send to {} ({} chars)", to, body.len());

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&json!({
                "channel": "whatsapp",
                "to": to,
                "body": { "text": body },
            }))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let detail = response.text().await.unwrap_or_default();
            log::warn!("Superchat rejected message: HTTP {} - {}", status, detail);
            return Err(SendError::Rejected {
                service: "Superchat",
                status: status.as_u16(),
                detail,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn delivers_a_whatsapp_text() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/v1/messages")
            .match_header("authorization", "Bearer key-1")
            .match_body(mockito::Matcher::Json(json!({
                "channel": "whatsapp",
                "to": "+491701234567",
                "body": { "text": "salam" },
            })))
            .with_status(200)
            .with_body(r#"{"id":"msg_1"}"#)
            .create_async()
            .await;

        let sender = SuperchatSender::new("key-1", server.url());
        sender.send("0049 170 1234567", "salam").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_errors_become_rejections() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/v1/messages")
            .with_status(422)
            .with_body("channel not connected")
            .create_async()
            .await;

        let sender = SuperchatSender::new("key-1", server.url());
        let err = sender.send("+491701234567", "salam").await.unwrap_err();
        match err {
            SendError::Rejected { service, status, detail } => {
                assert_eq!(service, "Superchat");
                assert_eq!(status, 422);
                assert_eq!(detail, "channel not connected");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
