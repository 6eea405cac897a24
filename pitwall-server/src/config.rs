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

use anyhow::Result;
use pitwall_graph::Neo4jSettings;
use pitwall_llm::{LlmProvider, LlmSettings};
use pitwall_query::EngineConfig;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Pitwall Configuration
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct PitwallConfig {
    #[serde(default)]
    pub server: HttpServerConfig,
    #[serde(default)]
    pub graph: GraphConfig,
    #[serde(default)]
    pub llm: LlmSettings,
    #[serde(default)]
    pub engine: EngineConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct HttpServerConfig {
    /// HTTP API listen address (e.g., "127.0.0.1:8000")
    #[serde(default = "default_http_addr")]
    pub listen_addr: String,

    /// Whole-request deadline for answering one question, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// Enable CORS
    #[serde(default = "default_enable_cors")]
    pub enable_cors: bool,

    /// Allowed CORS origins (empty = allow all)
    #[serde(default)]
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct GraphConfig {
    #[serde(default = "default_graph_uri")]
    pub uri: String,

    #[serde(default = "default_graph_user")]
    pub user: String,

    #[serde(default = "default_graph_password")]
    pub password: String,

    #[serde(default = "default_graph_max_connections")]
    pub max_connections: usize,

    /// Per-query deadline in seconds
    #[serde(default = "default_query_timeout")]
    pub query_timeout_secs: u64,

    /// Refresh the model's schema hints from the graph at startup
    #[serde(default = "default_sample_schema")]
    pub sample_schema: bool,
}

// Default values
fn default_http_addr() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_request_timeout() -> u64 {
    30
}

fn default_enable_cors() -> bool {
    true
}

fn default_graph_uri() -> String {
    Neo4jSettings::default().uri
}

fn default_graph_user() -> String {
    Neo4jSettings::default().user
}

fn default_graph_password() -> String {
    Neo4jSettings::default().password
}

fn default_graph_max_connections() -> usize {
    Neo4jSettings::default().max_connections
}

fn default_query_timeout() -> u64 {
    10
}

fn default_sample_schema() -> bool {
    true
}

impl Default for HttpServerConfig {
    fn default() -> Self {
        Self {
            listen_addr: default_http_addr(),
            request_timeout_secs: default_request_timeout(),
            enable_cors: default_enable_cors(),
            cors_origins: vec![],
        }
    }
}

impl Default for GraphConfig {
    fn default() -> Self {
        Self {
            uri: default_graph_uri(),
            user: default_graph_user(),
            password: default_graph_password(),
            max_connections: default_graph_max_connections(),
            query_timeout_secs: default_query_timeout(),
            sample_schema: default_sample_schema(),
        }
    }
}

impl GraphConfig {
    pub fn settings(&self) -> Neo4jSettings {
        Neo4jSettings {
            uri: self.uri.clone(),
            user: self.user.clone(),
            password: self.password.clone(),
            max_connections: self.max_connections,
        }
    }

    pub fn query_timeout(&self) -> Duration {
        Duration::from_secs(self.query_timeout_secs)
    }
}

impl PitwallConfig {
    /// Load configuration from TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Self = toml::from_str(&content)?;
        Ok(config)
    }

    /// Override fields from variables that are set. Unparsable numeric and
    /// boolean values are ignored; an unknown provider name is an error.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(addr) = lookup("PITWALL_HTTP_ADDR") {
            self.server.listen_addr = addr;
        }
        if let Some(val) = lookup("PITWALL_REQUEST_TIMEOUT").and_then(|v| v.parse().ok()) {
            self.server.request_timeout_secs = val;
        }

        if let Some(uri) = lookup("NEO4J_URI") {
            self.graph.uri = uri;
        }
        if let Some(user) = lookup("NEO4J_USER") {
            self.graph.user = user;
        }
        if let Some(password) = lookup("NEO4J_PASSWORD") {
            self.graph.password = password;
        }

        if let Some(provider) = lookup("PITWALL_LLM_PROVIDER") {
            self.llm.provider = provider
                .parse::<LlmProvider>()
                .map_err(|e| anyhow::anyhow!("PITWALL_LLM_PROVIDER: {}", e))?;
        }
        if let Some(model) = lookup("PITWALL_LLM_MODEL") {
            self.llm.model = model;
        }
        if let Some(key) = lookup("OPENAI_API_KEY") {
            self.llm.api_key = Some(key);
        }
        match self.llm.provider {
            LlmProvider::OpenAI => {
                if let Some(base_url) = lookup("OPENAI_BASE_URL") {
                    self.llm.base_url = Some(base_url);
                }
            }
            LlmProvider::Ollama => {
                if let Some(base_url) = lookup("OLLAMA_BASE_URL") {
                    self.llm.base_url = Some(base_url);
                }
            }
            LlmProvider::None => {}
        }

        if let Some(val) = lookup("PITWALL_USE_LLM").and_then(|v| parse_bool(&v)) {
            self.engine.use_fallback = val;
        }
        if let Some(val) = lookup("PITWALL_VALIDATE_FALLBACK").and_then(|v| parse_bool(&v)) {
            self.engine.validate_generated = val;
        }

        Ok(())
    }

    /// Load configuration with priority: env > file > defaults
    pub fn load(config_file: Option<PathBuf>) -> Result<Self> {
        let mut config = if let Some(path) = config_file {
            if path.exists() {
                tracing::info!("Loading configuration from file: {:?}", path);
                Self::from_file(&path)?
            } else {
                tracing::warn!("Config file not found: {:?}, using defaults", path);
                Self::default()
            }
        } else {
            Self::default()
        };

        config.apply_env(|name| std::env::var(name).ok())?;
        Ok(config)
    }

    /// Parse listen address as SocketAddr
    pub fn socket_addr(&self) -> Result<SocketAddr> {
        Ok(self.server.listen_addr.parse()?)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.server.request_timeout_secs)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        self.socket_addr()?;

        if self.server.request_timeout_secs == 0 {
            anyhow::bail!("server.request_timeout_secs must be greater than zero");
        }
        if self.graph.query_timeout_secs == 0 {
            anyhow::bail!("graph.query_timeout_secs must be greater than zero");
        }
        if self.llm.timeout_secs == 0 {
            anyhow::bail!("llm.timeout_secs must be greater than zero");
        }
        if self.graph.max_connections == 0 {
            anyhow::bail!("graph.max_connections must be greater than zero");
        }

        Ok(())
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
