pub mod superchat;
pub mod twilio;

pub use superchat::SuperchatSender;
pub use twilio::TwilioSender;

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::models::Reminder;

/// The three failure kinds a send can hit: missing credentials, transport
/// trouble, or the provider saying no.
#[derive(Debug, thiserror::Error)]
pub enum SendError {
    #[error("{0} is not configured; set its environment variables")]
    NotConfigured(&'static str),
    #[error("sending failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("{service} rejected the message (HTTP {status}): {detail}")]
    Rejected {
        service: &'static str,
        status: u16,
        detail: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Channel {
    Sms,
    WhatsApp,
}

impl Channel {
    pub fn as_str(&self) -> &'static str {
        match self {
            Channel::Sms => "sms",
            Channel::WhatsApp => "whatsapp",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for Channel {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "sms" => Ok(Channel::Sms),
            "whatsapp" => Ok(Channel::WhatsApp),
            _ => Err(anyhow::anyhow!("Unknown channel: {} (sms|whatsapp)", s)),
        }
    }
}

/// The configured outbound channel with its sender behind it.
#[derive(Debug, Clone)]
pub enum Outbox {
    Sms(TwilioSender),
    WhatsApp(SuperchatSender),
}

impl Outbox {
    pub fn from_env(channel: Channel) -> Result<Self, SendError> {
        match channel {
            Channel::Sms => Ok(Outbox::Sms(TwilioSender::from_env()?)),
            Channel::WhatsApp => Ok(Outbox::WhatsApp(SuperchatSender::from_env()?)),
        }
    }

    /// Render and send one message. No retry; a failure is the caller's to
    /// report.
    pub async fn deliver(&self, to: &str, reminder: &Reminder) -> Result<(), SendError> {
        let body = reminder.render();
        log::info!("Sending {} message to {}", reminder.kind(), to);
        match self {
            Outbox::Sms(sender) => sender.send(to, &body).await,
            Outbox::WhatsApp(sender) => sender.send(to, &body).await,
        }
    }
}

/// Normalize to an E.164-like shape: separators stripped, the international
/// "00" prefix folded into "+", a bare number prefixed with "+".
pub fn normalize_phone(raw: &str) -> String {
    let cleaned: String = raw
        .chars()
        .filter(|c| !matches!(c, ' ' | '-' | '(' | ')'))
        .collect();
    if let Some(rest) = cleaned.strip_prefix("00") {
        format!("+{}", rest)
    } else if cleaned.starts_with('+') {
        cleaned
    } else {
        format!("+{}", cleaned)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization_strips_separators_and_prefixes_plus() {
        assert_eq!(normalize_phone("+49 170 123-4567"), "+491701234567");
        assert_eq!(normalize_phone("0049 (170) 1234567"), "+491701234567");
        assert_eq!(normalize_phone("491701234567"), "+491701234567");
        assert_eq!(normalize_phone("+491701234567"), "+491701234567");
    }

    #[test]
    fn channel_parses_and_round_trips() {
        assert_eq!("sms".parse::<Channel>().unwrap(), Channel::Sms);
        assert_eq!("WhatsApp".parse::<Channel>().unwrap(), Channel::WhatsApp);
        assert!("pigeon".parse::<Channel>().is_err());

        let json = serde_json::to_string(&Channel::WhatsApp).unwrap();
        assert_eq!(json, "\"whatsapp\"");
    }
}
