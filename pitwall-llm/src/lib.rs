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

//! Pitwall LLM
//!
//! Generative-model fallback for questions no rule recognizes. The model is
//! asked for query text; what comes back is untrusted and is checked further
//! down the pipeline.

pub mod cache;
pub mod client;
pub mod fallback;
pub mod ollama;
pub mod openai;
pub mod prompt;
pub mod scripted;
pub mod settings;

pub use cache::{CacheStats, FallbackCache};
pub use client::{Completion, LLMError, ModelClient, TokenUsage};
pub use fallback::{FallbackError, FallbackGenerator};
pub use ollama::OllamaClient;
pub use openai::OpenAIClient;
pub use prompt::{build_prompt, strip_code_fence, SYSTEM_PROMPT};
pub use scripted::ScriptedModel;
pub use settings::{build_client, LlmProvider, LlmSettings};
