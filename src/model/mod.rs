pub mod relay;

pub use relay::ChatRelay;

use anyhow::Result;
use log::{debug, info};
use reqwest::{Client, StatusCode};
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

use crate::web::models::Message;

pub const MODEL: &str = "llama-3.3-70b-versatile";
pub const TEMPERATURE: f32 = 0.7;

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("request to chat completion API failed: {0}")]
    Request(#[source] reqwest::Error),

    #[error("chat completion API returned {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("chat completion API returned an unreadable body: {0}")]
    Decode(#[source] reqwest::Error),
}

#[derive(Debug, Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [Message],
    temperature: f32,
}

// Client for the Groq OpenAI-compatible chat completion endpoint
pub struct GroqClient {
    endpoint: String,
    api_key: String,
    client: Client,
}

impl GroqClient {
    pub fn new(base_url: &str, api_key: String, timeout: Option<Duration>) -> Result<Self> {
        let endpoint = format!("{}/chat/completions", base_url.trim_end_matches('/'));
        info!("Using chat completion endpoint: {}", endpoint);

        // No timeout unless one is configured
        let mut builder = Client::builder();
        if let Some(timeout) = timeout {
            info!("Upstream timeout set to {}s", timeout.as_secs());
            builder = builder.timeout(timeout);
        }

        Ok(Self {
            endpoint,
            api_key,
            client: builder.build()?,
        })
    }

    /// Sends the message list and returns the first choice's text, or `None`
    /// when the API answered without any usable content.
    pub async fn complete(&self, messages: &[Message]) -> Result<Option<String>, UpstreamError> {
        let payload = CompletionRequest {
            model: MODEL,
            messages,
            temperature: TEMPERATURE,
        };

        info!("Sending {} messages to {}", messages.len(), MODEL);
        debug!("Payload: {:?}", payload);

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&payload)
            .send()
            .await
            .map_err(UpstreamError::Request)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(UpstreamError::Status { status, body });
        }

        let response_json: Value = response.json().await.map_err(UpstreamError::Decode)?;
        debug!("Response JSON: {}", response_json);

        let content = response_json
            .get("choices")
            .and_then(|choices| choices.get(0))
            .and_then(|choice| choice.get("message"))
            .and_then(|message| message.get("content"))
            .and_then(|content| content.as_str())
            .filter(|content| !content.is_empty())
            .map(str::to_string);

        match &content {
            Some(text) => info!("Response length: {} bytes", text.len()),
            None => info!("Response carried no content"),
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::web::models::Role;
    use serde_json::json;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn client_for(server: &MockServer) -> GroqClient {
        GroqClient::new(&format!("{}/openai/v1", server.uri()), "gsk_test".to_string(), None)
            .unwrap()
    }

    fn completion(content: Value) -> Value {
        json!({ "choices": [{ "index": 0, "message": { "role": "assistant", "content": content } }] })
    }

    #[tokio::test]
    async fn posts_model_messages_and_bearer_token() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/openai/v1/chat/completions"))
            .and(header("authorization", "Bearer gsk_test"))
            .and(body_partial_json(json!({
                "model": MODEL,
                "temperature": 0.7,
                "messages": [
                    { "role": "system", "content": "be brief" },
                    { "role": "user", "content": "hi" }
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion(json!("hello"))))
            .expect(1)
            .mount(&server)
            .await;

        let messages = vec![
            Message::new(Role::System, "be brief"),
            Message::new(Role::User, "hi"),
        ];
        let reply = client_for(&server).complete(&messages).await.unwrap();
        assert_eq!(reply.as_deref(), Some("hello"));
    }

    #[tokio::test]
    async fn missing_or_empty_content_is_none() {
        for body in [json!({}), json!({ "choices": [] }), completion(json!(null)), completion(json!(""))] {
            let server = MockServer::start().await;
            Mock::given(method("POST"))
                .respond_with(ResponseTemplate::new(200).set_body_json(body))
                .mount(&server)
                .await;

            let reply = client_for(&server)
                .complete(&[Message::new(Role::User, "hi")])
                .await
                .unwrap();
            assert!(reply.is_none());
        }
    }

    #[tokio::test]
    async fn non_json_body_is_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>gateway</html>"))
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&[Message::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Decode(_)));
    }

    #[tokio::test]
    async fn error_status_is_reported_with_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(
                ResponseTemplate::new(401).set_body_json(json!({ "error": { "message": "bad key" } })),
            )
            .mount(&server)
            .await;

        let err = client_for(&server)
            .complete(&[Message::new(Role::User, "hi")])
            .await
            .unwrap_err();
        match err {
            UpstreamError::Status { status, body } => {
                assert_eq!(status, StatusCode::UNAUTHORIZED);
                assert!(body.contains("bad key"));
            }
            other => panic!("unexpected error: {}", other),
        }
    }

    #[tokio::test]
    async fn unreachable_server_is_request_error() {
        // Grab a free port, then release it so nothing is listening there
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);
        let client = GroqClient::new(&format!("http://{}", addr), "gsk_test".to_string(), None)
            .unwrap();

        let err = client
            .complete(&[Message::new(Role::User, "hi")])
            .await
            .unwrap_err();
        assert!(matches!(err, UpstreamError::Request(_)));
    }
}
