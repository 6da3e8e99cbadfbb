//! Twilio SMS sender. Credentials come from TWILIO_ACCOUNT_SID,
//! TWILIO_AUTH_TOKEN and TWILIO_PHONE_NUMBER.

use reqwest::Client;

use crate::notify::{SendError, normalize_phone};

pub const TWILIO_BASE: &str = "https://api.twilio.com";

#[derive(Debug, Clone)]
pub struct TwilioSender {
    account_sid: String,
    auth_token: String,
    from: String,
    base_url: String,
    http: Client,
}

fn env_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.is_empty())
}

impl TwilioSender {
    pub fn from_env() -> Result<Self, SendError> {
        let account_sid = env_var("TWILIO_ACCOUNT_SID");
        let auth_token = env_var("TWILIO_AUTH_TOKEN");
        let from = env_var("TWILIO_PHONE_NUMBER");
        match (account_sid, auth_token, from) {
            (Some(sid), Some(token), Some(from)) => Ok(Self::new(sid, token, from, TWILIO_BASE)),
            _ => Err(SendError::NotConfigured("Twilio")),
        }
    }

    pub fn new(
        account_sid: impl Into<String>,
        auth_token: impl Into<String>,
        from: impl Into<String>,
        base_url: impl Into<String>,
    ) -> Self {
        Self {
            account_sid: account_sid.into(),
            auth_token: auth_token.into(),
            from: from.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            http: Client::new(),
        }
    }

    pub async fn send(&self, to: &str, body: &str) -> Result<(), SendError> {
        let to = normalize_phone(to);
        let url = format!(
            "{}/2010-04-01/Accounts/{}/Messages.json",
            self.base_url, self.account_sid
        );
        log::debug!("Twilio send to {} ({} chars)", to, body.len());

        let response = self
            .http
            .post(&url)
            .basic_auth(&self.account_sid, Some(&self.auth_token))
            .form(&[
                ("From", self.from.as_str()),
                ("To", to.as_str()),
                ("Body", body),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let text = response.text().await.unwrap_or_default();
            let detail = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("message").and_then(|m| m.as_str()).map(String::from))
                .unwrap_or(text);
            log::warn!("Twilio rejected message: HTTP {} - {}", status, detail);
            return Err(SendError::Rejected {
                service: "Twilio",
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
    async fn delivers_a_form_encoded_message() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .match_header("authorization", mockito::Matcher::Regex("^Basic ".into()))
            .match_body(mockito::Matcher::AllOf(vec![
                mockito::Matcher::UrlEncoded("To".into(), "+491701234567".into()),
                mockito::Matcher::UrlEncoded("From".into(), "+15005550006".into()),
                mockito::Matcher::UrlEncoded("Body".into(), "ping".into()),
            ]))
            .with_status(201)
            .with_body(r#"{"sid":"SM1","status":"queued"}"#)
            .create_async()
            .await;

        let sender = TwilioSender::new("AC123", "token", "+15005550006", server.url());
        sender.send("+49 170 123 4567", "ping").await.unwrap();
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn provider_rejection_carries_status_and_detail() {
        let mut server = mockito::Server::new_async().await;
        let _mock = server
            .mock("POST", "/2010-04-01/Accounts/AC123/Messages.json")
            .with_status(400)
            .with_body(r#"{"code":21211,"message":"Invalid 'To' number"}"#)
            .create_async()
            .await;

        let sender = TwilioSender::new("AC123", "token", "+15005550006", server.url());
        let err = sender.send("+0", "ping").await.unwrap_err();
        match err {
            SendError::Rejected { service, status, detail } => {
                assert_eq!(service, "Twilio");
                assert_eq!(status, 400);
                assert_eq!(detail, "Invalid 'To' number");
            }
            other => panic!("expected rejection, got {:?}", other),
        }
    }
}
