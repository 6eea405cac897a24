// Copyright 2025 Pitwall Contributors
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! Local model client speaking the Ollama chat API.

use crate::client::{error_from_response, Completion, LLMError, ModelClient, TokenUsage};
use async_trait::async_trait;

pub struct OllamaClient {
    model: String,
    base_url: String,
    temperature: f32,
    max_tokens: u32,
    client: reqwest::Client,
}

impl OllamaClient {
    pub fn new(model: String) -> Self {
        Self {
            model,
            base_url: "http://localhost:11434".to_string(),
            temperature: 0.1,
            max_tokens: 200,
            client: reqwest::Client::new(),
        }
    }

    pub fn with_base_url(mut self, base_url: String) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    pub fn with_sampling(mut self, temperature: f32, max_tokens: u32) -> Self {
        self.temperature = temperature;
        self.max_tokens = max_tokens;
        self
    }
}

#[async_trait]
impl ModelClient for OllamaClient {
    async fn complete(&self, system: &str, prompt: &str) -> Result<Completion, LLMError> {
        let request = serde_json::json!({
            "model": self.model,
            "messages": [
                { "role": "system", "content": system },
                { "role": "user", "content": prompt }
            ],
            "stream": false,
            "options": {
                "temperature": self.temperature,
                "num_predict": self.max_tokens
            }
        });

        let response = self
            .client
            .post(format!("{}/api/chat", self.base_url))
            .json(&request)
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(error_from_response(response).await);
        }

        let response_data: serde_json::Value = response.json().await?;

        let content = response_data["message"]["content"]
            .as_str()
            .ok_or_else(|| LLMError::InvalidResponse("Missing message content".to_string()))?
            .to_string();

        let prompt_tokens = response_data["prompt_eval_count"].as_u64().unwrap_or(0) as u32;
        let completion_tokens = response_data["eval_count"].as_u64().unwrap_or(0) as u32;

        Ok(Completion {
            content,
            usage: TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens + completion_tokens,
            },
            model: self.model.clone(),
        })
    }

    fn model_name(&self) -> &str {
        &self.model
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Matcher;

    #[tokio::test]
    async fn test_complete_reads_message_content() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/api/chat")
            .match_body(Matcher::PartialJson(serde_json::json!({
                "model": "llama3.1",
                "stream": false
            })))
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(
                r#"{"message": {"role": "assistant", "content": "MATCH (n:Entity) RETURN n.name AS answer"},
                    "prompt_eval_count": 90, "eval_count": 10}"#,
            )
            .create_async()
            .await;

        let client = OllamaClient::new("llama3.1".to_string()).with_base_url(server.url());
        let completion = client.complete("system", "question").await.unwrap();

        assert!(completion.content.starts_with("MATCH"));
        assert_eq!(completion.usage.total_tokens, 100);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_complete_server_error() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/api/chat")
            .with_status(500)
            .with_body("model not loaded")
            .create_async()
            .await;

        let client = OllamaClient::new("llama3.1".to_string()).with_base_url(server.url());
        match client.complete("system", "question").await {
            Err(LLMError::ApiError(msg)) => assert!(msg.contains("model not loaded")),
            other => panic!("unexpected result: {:?}", other.map(|c| c.content)),
        }
    }
}
