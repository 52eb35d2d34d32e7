//! Alert delivery.
//!
//! [`TelegramNotifier`] posts to the Bot API `sendMessage` method, turning each
//! [`LinkAnnotation`] into a `text_link` entity.

use crate::message::AlertMessage;
use serde::{Deserialize, Serialize};
use std::{fmt, future::Future, time::Duration};
use thiserror::Error;
use tracing::debug;

/// Public Telegram Bot API endpoint.
pub const TELEGRAM_API_URL: &str = "https://api.telegram.org";

#[derive(Error, Debug)]
pub enum NotifyError {
    /// The request could not be sent or its response read
    #[error("Notifier request failed: {0}")]
    Transport(#[from] reqwest::Error),

    /// The destination refused the message
    #[error("Notifier rejected message: {0}")]
    Rejected(String),
}

/// Sends rendered alerts to a fixed destination.
pub trait Notifier: Send + Sync {
    fn send(&self, message: &AlertMessage)
        -> impl Future<Output = Result<(), NotifyError>> + Send;
}

/// Telegram bot sending to one chat.
#[derive(Clone)]
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_url: String,
    bot_token: String,
    chat_id: i64,
}

impl TelegramNotifier {
    /// Creates a notifier whose requests time out after `timeout`.
    pub fn new(
        bot_token: impl Into<String>,
        chat_id: i64,
        timeout: Duration,
    ) -> Result<Self, NotifyError> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, TELEGRAM_API_URL, bot_token, chat_id))
    }

    /// Creates a notifier with a custom HTTP client and API base URL.
    pub fn with_client(
        client: reqwest::Client,
        api_url: impl Into<String>,
        bot_token: impl Into<String>,
        chat_id: i64,
    ) -> Self {
        Self {
            client,
            api_url: api_url.into(),
            bot_token: bot_token.into(),
            chat_id,
        }
    }

    pub const fn chat_id(&self) -> i64 {
        self.chat_id
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_url.trim_end_matches('/'),
            self.bot_token
        )
    }

    fn request_body<'a>(&self, message: &'a AlertMessage) -> SendMessageRequest<'a> {
        SendMessageRequest {
            chat_id: self.chat_id,
            text: &message.text,
            entities: message
                .links
                .iter()
                .map(|link| MessageEntity {
                    kind: "text_link",
                    offset: link.offset,
                    length: link.length,
                    url: &link.url,
                })
                .collect(),
            disable_web_page_preview: true,
        }
    }
}

// Never print the bot token.
impl fmt::Debug for TelegramNotifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TelegramNotifier")
            .field("api_url", &self.api_url)
            .field("bot_token", &"<redacted>")
            .field("chat_id", &self.chat_id)
            .finish()
    }
}

impl Notifier for TelegramNotifier {
    async fn send(&self, message: &AlertMessage) -> Result<(), NotifyError> {
        debug!(
            chat_id = self.chat_id,
            links = message.links.len(),
            "Sending Telegram message"
        );

        let response = self
            .client
            .post(self.endpoint())
            .json(&self.request_body(message))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        let parsed: Option<TelegramResponse> = serde_json::from_str(&body).ok();

        match parsed {
            Some(TelegramResponse { ok: true, .. }) if status.is_success() => Ok(()),
            Some(TelegramResponse {
                description: Some(description),
                ..
            }) => Err(NotifyError::Rejected(format!("{status}: {description}"))),
            _ => Err(NotifyError::Rejected(format!("{status}: {body}"))),
        }
    }
}

#[derive(Debug, Serialize)]
struct SendMessageRequest<'a> {
    chat_id: i64,
    text: &'a str,
    entities: Vec<MessageEntity<'a>>,
    disable_web_page_preview: bool,
}

#[derive(Debug, Serialize)]
struct MessageEntity<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    offset: usize,
    length: usize,
    url: &'a str,
}

#[derive(Debug, Deserialize)]
struct TelegramResponse {
    ok: bool,
    description: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::LinkAnnotation;
    use serde_json::json;

    fn notifier() -> TelegramNotifier {
        TelegramNotifier::new("123:secret", -1001234, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_request_body() {
        let message = AlertMessage {
            text: "hello\n".to_string(),
            links: vec![LinkAnnotation {
                offset: 0,
                length: 5,
                url: "https://bscscan.com/address/0x1".to_string(),
            }],
        };

        let body = serde_json::to_value(notifier().request_body(&message)).unwrap();
        assert_eq!(
            body,
            json!({
                "chat_id": -1001234,
                "text": "hello\n",
                "entities": [{
                    "type": "text_link",
                    "offset": 0,
                    "length": 5,
                    "url": "https://bscscan.com/address/0x1",
                }],
                "disable_web_page_preview": true,
            })
        );
    }

    #[test]
    fn test_endpoint() {
        let notifier = TelegramNotifier::with_client(
            reqwest::Client::new(),
            "http://localhost:8081/",
            "123:secret",
            1,
        );
        assert_eq!(notifier.endpoint(), "http://localhost:8081/bot123:secret/sendMessage");
    }

    #[test]
    fn test_debug_redacts_token() {
        let printed = format!("{:?}", notifier());
        assert!(!printed.contains("secret"));
        assert!(printed.contains("-1001234"));
    }

    #[tokio::test]
    async fn test_unreachable_api_is_transport_error() {
        let notifier = TelegramNotifier::with_client(
            reqwest::Client::new(),
            "http://127.0.0.1:1",
            "123:secret",
            1,
        );
        let message = AlertMessage {
            text: "x".to_string(),
            links: vec![],
        };

        assert!(matches!(
            notifier.send(&message).await,
            Err(NotifyError::Transport(_))
        ));
    }
}
