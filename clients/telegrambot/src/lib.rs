use anyhow::Result;
use reqwest::Client;
use serde::Serialize;

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// A link button rendered under a message, one per row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LinkButton {
    pub text: String,
    pub url: String,
}

impl LinkButton {
    pub fn new(text: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            url: url.into(),
        }
    }
}

/// Client for sending messages via Telegram Bot API.
pub struct TelegramBot {
    client: Client,
    api_base: String,
    api_key: String,
    chat_id: String,
}

#[derive(Serialize)]
struct SendMessageRequest<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    reply_markup: Option<InlineKeyboardMarkup<'a>>,
}

#[derive(Serialize)]
struct InlineKeyboardMarkup<'a> {
    inline_keyboard: Vec<[&'a LinkButton; 1]>,
}

impl TelegramBot {
    /// Creates a new `TelegramBot` with the given HTTP client, API key and chat ID.
    pub fn new(client: Client, api_key: String, chat_id: String) -> Self {
        Self {
            client,
            api_base: TELEGRAM_API_BASE.to_string(),
            api_key,
            chat_id,
        }
    }

    /// Points the bot at a different Bot API server.
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Sends a Markdown message with one link button per row.
    pub async fn push_message_with_buttons(
        &self,
        text: &str,
        buttons: &[LinkButton],
    ) -> Result<()> {
        let url = format!("{}/bot{}/sendMessage", self.api_base, self.api_key);
        let body = send_message_request(&self.chat_id, text, buttons);
        self.client
            .post(&url)
            .json(&body)
            .send()
            .await?
            .error_for_status()?;
        Ok(())
    }
}

fn send_message_request<'a>(
    chat_id: &'a str,
    text: &'a str,
    buttons: &'a [LinkButton],
) -> SendMessageRequest<'a> {
    let reply_markup = (!buttons.is_empty()).then(|| InlineKeyboardMarkup {
        inline_keyboard: buttons.iter().map(|button| [button]).collect(),
    });
    SendMessageRequest {
        chat_id,
        text,
        parse_mode: "Markdown",
        reply_markup,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    use axum::http::{StatusCode, Uri};
    use axum::{Json, Router};
    use serde_json::{json, Value};

    type Seen = Arc<Mutex<Vec<(String, Value)>>>;

    /// Serves every request with `status` and records its path and JSON body.
    async fn stub_server(status: StatusCode) -> (String, Seen) {
        let seen: Seen = Arc::default();
        let recorder = seen.clone();
        let app = Router::new().fallback(move |uri: Uri, Json(body): Json<Value>| {
            let recorder = recorder.clone();
            async move {
                recorder.lock().unwrap().push((uri.path().to_string(), body));
                status
            }
        });
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move { axum::serve(listener, app).await.unwrap() });
        (format!("http://{addr}"), seen)
    }

    #[test]
    fn plain_message_has_no_keyboard() {
        let body = serde_json::to_value(send_message_request("@channel", "*hi*", &[])).unwrap();
        assert_eq!(
            body,
            json!({"chat_id": "@channel", "text": "*hi*", "parse_mode": "Markdown"})
        );
    }

    #[test]
    fn buttons_are_one_per_row() {
        let buttons = vec![
            LinkButton::new("Buy", "https://example.com/buy"),
            LinkButton::new("View TX", "https://example.com/tx/1"),
        ];
        let body = serde_json::to_value(send_message_request("-100", "report", &buttons)).unwrap();
        assert_eq!(
            body["reply_markup"],
            json!({"inline_keyboard": [
                [{"text": "Buy", "url": "https://example.com/buy"}],
                [{"text": "View TX", "url": "https://example.com/tx/1"}]
            ]})
        );
    }

    #[tokio::test]
    async fn posts_to_the_bot_send_message_endpoint() {
        let (base, seen) = stub_server(StatusCode::OK).await;
        let bot = TelegramBot::new(Client::new(), "123:abc".into(), "@qsi".into())
            .with_api_base(base);

        let buttons = [LinkButton::new("View TX", "https://tronscan.org/#/transaction/1")];
        bot.push_message_with_buttons("*report*", &buttons).await.unwrap();

        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].0, "/bot123:abc/sendMessage");
        assert_eq!(seen[0].1["chat_id"], "@qsi");
        assert_eq!(seen[0].1["parse_mode"], "Markdown");
        assert_eq!(seen[0].1["reply_markup"]["inline_keyboard"][0][0]["text"], "View TX");
    }

    #[tokio::test]
    async fn error_status_is_reported() {
        let (base, _seen) = stub_server(StatusCode::BAD_REQUEST).await;
        let bot = TelegramBot::new(Client::new(), "123:abc".into(), "@qsi".into())
            .with_api_base(base);

        assert!(bot.push_message_with_buttons("hi", &[]).await.is_err());
    }
}
