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

//! Model provider settings and client construction.

use crate::client::{LLMError, ModelClient};
use crate::ollama::OllamaClient;
use crate::openai::OpenAIClient;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProvider {
    #[default]
    OpenAI,
    Ollama,
    /// Fallback disabled
    None,
}

impl FromStr for LlmProvider {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "openai" => Ok(LlmProvider::OpenAI),
            "ollama" => Ok(LlmProvider::Ollama),
            "none" | "disabled" | "off" => Ok(LlmProvider::None),
            other => Err(format!("unknown model provider '{}'", other)),
        }
    }
}

impl fmt::Display for LlmProvider {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LlmProvider::OpenAI => "openai",
            LlmProvider::Ollama => "ollama",
            LlmProvider::None => "none",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmSettings {
    #[serde(default)]
    pub provider: LlmProvider,

    #[serde(default = "default_model")]
    pub model: String,

    /// Required for the OpenAI provider
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default = "default_temperature")]
    pub temperature: f32,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: u64,

    /// Zero disables the fallback cache
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,
}

fn default_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_temperature() -> f32 {
    0.1
}

fn default_max_tokens() -> u32 {
    200
}

fn default_timeout_secs() -> u64 {
    15
}

fn default_cache_capacity() -> u64 {
    1_000
}

fn default_cache_ttl_secs() -> u64 {
    3_600
}

impl Default for LlmSettings {
    fn default() -> Self {
        Self {
            provider: LlmProvider::default(),
            model: default_model(),
            api_key: None,
            base_url: None,
            temperature: default_temperature(),
            max_tokens: default_max_tokens(),
            timeout_secs: default_timeout_secs(),
            cache_capacity: default_cache_capacity(),
            cache_ttl_secs: default_cache_ttl_secs(),
        }
    }
}

/// Build the configured model client. `Ok(None)` means the provider is
/// `none`; a provider that is selected but unusable is an error.
pub fn build_client(settings: &LlmSettings) -> Result<Option<Arc<dyn ModelClient>>, LLMError> {
    match settings.provider {
        LlmProvider::None => Ok(None),
        LlmProvider::OpenAI => {
            let api_key = settings
                .api_key
                .clone()
                .filter(|key| !key.trim().is_empty())
                .ok_or_else(|| LLMError::NotConfigured("OPENAI_API_KEY is not set".to_string()))?;

            let mut client = OpenAIClient::new(api_key, settings.model.clone())
                .with_sampling(settings.temperature, settings.max_tokens);
            if let Some(base_url) = &settings.base_url {
                client = client.with_base_url(base_url.clone());
            }
            Ok(Some(Arc::new(client)))
        }
        LlmProvider::Ollama => {
            let mut client = OllamaClient::new(settings.model.clone())
                .with_sampling(settings.temperature, settings.max_tokens);
            if let Some(base_url) = &settings.base_url {
                client = client.with_base_url(base_url.clone());
            }
            Ok(Some(Arc::new(client)))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_provider_from_str() {
        assert_eq!("OpenAI".parse::<LlmProvider>(), Ok(LlmProvider::OpenAI));
        assert_eq!("ollama".parse::<LlmProvider>(), Ok(LlmProvider::Ollama));
        assert_eq!("off".parse::<LlmProvider>(), Ok(LlmProvider::None));
        assert!("claude-local".parse::<LlmProvider>().is_err());
    }

    #[test]
    fn test_openai_requires_key() {
        let settings = LlmSettings::default();
        assert!(matches!(
            build_client(&settings),
            Err(LLMError::NotConfigured(_))
        ));

        let settings = LlmSettings {
            api_key: Some("sk-test".to_string()),
            ..LlmSettings::default()
        };
        let client = build_client(&settings).unwrap().unwrap();
        assert_eq!(client.model_name(), "gpt-4o-mini");
    }

    #[test]
    fn test_disabled_provider_builds_nothing() {
        let settings = LlmSettings {
            provider: LlmProvider::None,
            ..LlmSettings::default()
        };
        assert!(build_client(&settings).unwrap().is_none());
    }
}
