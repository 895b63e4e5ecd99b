//! services/api/src/adapters/http_completion.rs
//!
//! A `CompletionService` for hosted completion endpoints that take
//! `{ "prompt": ..., "response_type": "text" }` and answer with the generated text.

use async_trait::async_trait;
use doc_summarizer_core::ports::{CompletionRequest, CompletionService, PortError, PortResult};
use tracing::warn;

#[derive(Clone)]
pub struct HttpCompletionAdapter {
    client: reqwest::Client,
    endpoint_url: String,
    api_key: Option<String>,
}

impl HttpCompletionAdapter {
    pub fn new(client: reqwest::Client, endpoint_url: String, api_key: Option<String>) -> Self {
        Self {
            client,
            endpoint_url,
            api_key,
        }
    }
}

/// A body that is a JSON string literal is decoded; any other body is the text itself.
pub fn decode_completion_body(body: String) -> String {
    match serde_json::from_str::<String>(&body) {
        Ok(decoded) => decoded,
        Err(_) => body,
    }
}

#[async_trait]
impl CompletionService for HttpCompletionAdapter {
    async fn complete(&self, request: &CompletionRequest) -> PortResult<String> {
        let mut builder = self.client.post(&self.endpoint_url).json(request);
        if let Some(key) = &self.api_key {
            builder = builder.bearer_auth(key);
        }

        let response = builder
            .send()
            .await
            .map_err(|e| PortError::Unexpected(format!("Completion endpoint unreachable: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            warn!(%status, "Completion endpoint returned an error status");
            return Err(PortError::Unexpected(format!(
                "Completion endpoint returned {}",
                status
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| PortError::Unexpected(format!("Could not read completion body: {}", e)))?;

        Ok(decode_completion_body(body))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_text_body_is_returned_as_is() {
        let body = "The report covers Q3 revenue.\n".to_string();
        assert_eq!(decode_completion_body(body.clone()), body);
    }

    #[test]
    fn json_string_body_is_decoded() {
        assert_eq!(
            decode_completion_body("\"Line one\\nLine two\"".to_string()),
            "Line one\nLine two"
        );
    }

    #[test]
    fn json_objects_are_not_reinterpreted() {
        let body = r#"{"summary":"x"}"#.to_string();
        assert_eq!(decode_completion_body(body.clone()), body);
    }

    #[test]
    fn request_serializes_to_wire_shape() {
        let request = CompletionRequest::text("Summarize this");
        assert_eq!(
            serde_json::to_value(&request).unwrap(),
            serde_json::json!({ "prompt": "Summarize this", "response_type": "text" })
        );
    }
}
