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

//! Query generation for questions that no rule recognizes.
//!
//! The generator never inspects what the model wrote beyond stripping a code
//! fence; the result is tagged [`QueryOrigin::Generated`] so later stages can
//! treat it as untrusted.
//!
//! [`QueryOrigin::Generated`]: pitwall_core::QueryOrigin::Generated

use crate::cache::{CacheStats, FallbackCache};
use crate::client::{LLMError, ModelClient};
use crate::prompt::{build_prompt, strip_code_fence, SYSTEM_PROMPT};
use crate::settings::LlmSettings;
use pitwall_core::{GraphQuery, SchemaHints};
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, info};

#[derive(Debug, Error)]
pub enum FallbackError {
    #[error("Model unavailable: {0}")]
    Unavailable(#[from] LLMError),

    #[error("Model returned no query text")]
    EmptyOutput,
}

pub struct FallbackGenerator {
    client: Arc<dyn ModelClient>,
    hints: SchemaHints,
    timeout: Duration,
    cache: Option<FallbackCache>,
}

impl FallbackGenerator {
    pub fn new(client: Arc<dyn ModelClient>) -> Self {
        Self {
            client,
            hints: SchemaHints::default(),
            timeout: Duration::from_secs(15),
            cache: None,
        }
    }

    /// Generator configured from settings; a zero TTL leaves caching off.
    pub fn from_settings(client: Arc<dyn ModelClient>, settings: &LlmSettings) -> Self {
        let generator = Self::new(client).with_timeout(Duration::from_secs(settings.timeout_secs));
        if settings.cache_ttl_secs > 0 {
            generator.with_cache(FallbackCache::new(
                settings.cache_capacity,
                settings.cache_ttl_secs,
            ))
        } else {
            generator
        }
    }

    pub fn with_hints(mut self, hints: SchemaHints) -> Self {
        self.hints = hints;
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn with_cache(mut self, cache: FallbackCache) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn model_name(&self) -> &str {
        self.client.model_name()
    }

    pub fn cache_stats(&self) -> Option<CacheStats> {
        self.cache.as_ref().map(FallbackCache::stats)
    }

    /// Ask the model for query text answering `question`.
    pub async fn generate(&self, question: &str) -> Result<GraphQuery, FallbackError> {
        if let Some(cache) = &self.cache {
            if let Some(text) = cache.get(question).await {
                debug!("Fallback cache hit");
                return Ok(GraphQuery::generated(text));
            }
        }

        let prompt = build_prompt(question, &self.hints);
        let completion = tokio::time::timeout(
            self.timeout,
            self.client.complete(SYSTEM_PROMPT, &prompt),
        )
        .await
        .map_err(|_| LLMError::Timeout(self.timeout))??;

        let text = strip_code_fence(&completion.content);
        if text.is_empty() {
            return Err(FallbackError::EmptyOutput);
        }

        info!(
            model = %completion.model,
            prompt_tokens = completion.usage.prompt_tokens,
            completion_tokens = completion.usage.completion_tokens,
            "Generated fallback query"
        );

        if let Some(cache) = &self.cache {
            cache.set(question, text.clone()).await;
        }

        Ok(GraphQuery::generated(text))
    }
}
