use anyhow::Result;
use reqwest::Client;
use serde::Serialize;
use url::Url;

/// Client that POSTs JSON payloads to a single webhook URL.
pub struct WebhookClient {
    client: Client,
    url: Url,
}

impl WebhookClient {
    /// Creates a new `WebhookClient` posting to `url`.
    pub fn new(client: Client, url: Url) -> Self {
        Self { client, url }
    }

    /// The configured destination.
    pub fn url(&self) -> &Url {
        &self.url
    }

    /// Sends `payload` as a JSON body and returns the response status code.
    pub async fn send<T: Serialize + ?Sized>(&self, payload: &T) -> Result<u16> {
        let response = self
            .client
            .post(self.url.clone())
            .json(payload)
            .send()
            .await?
            .error_for_status()?;
        Ok(response.status().as_u16())
    }
}
