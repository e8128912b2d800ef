use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::memory::mem0::Mem0Client;
use crate::memory::progressive::{ThresholdSequence, DEFAULT_THRESHOLDS};
use crate::memory::search::SearchPolicy;
use crate::memory::types::ScopeFilter;
use crate::research::ResearchSettings;

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct DeepMemConfig {
    pub server: ServerConfig,
    pub memory: MemoryConfig,
    pub search: SearchConfig,
    pub research: ResearchConfig,
    pub llm: LlmConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub transport: String,
    pub host: String,
    pub port: u16,
    pub log_level: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MemoryConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub user_id: String,
    pub timeout_secs: u64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct SearchConfig {
    pub thresholds: Vec<f64>,
    /// Maximum records requested per threshold attempt.
    pub top_k: usize,
    pub fallback_limit: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ResearchConfig {
    pub max_iterations: usize,
    pub default_query: String,
    pub max_context_bytes: usize,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LlmConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            transport: "stdio".into(),
            host: "127.0.0.1".into(),
            port: 7373,
            log_level: "info".into(),
        }
    }
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.mem0.ai".into(),
            api_key: None,
            user_id: "default".into(),
            timeout_secs: 30,
        }
    }
}

impl Default for SearchConfig {
    fn default() -> Self {
        Self {
            thresholds: DEFAULT_THRESHOLDS.to_vec(),
            top_k: 10,
            fallback_limit: 100,
        }
    }
}

impl Default for ResearchConfig {
    fn default() -> Self {
        Self {
            max_iterations: 10,
            default_query: String::new(),
            max_context_bytes: 8000,
        }
    }
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".into(),
            api_key: None,
            model: "gpt-4o-mini".into(),
            temperature: Some(0.2),
            max_tokens: 1024,
            timeout_secs: 60,
        }
    }
}

/// Returns `~/.deepmem/`
pub fn default_deepmem_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("home directory not found")?;
    Ok(home.join(".deepmem"))
}

/// Returns the default config file path: `~/.deepmem/config.toml`
pub fn default_config_path() -> Result<PathBuf> {
    Ok(default_deepmem_dir()?.join("config.toml"))
}

impl DeepMemConfig {
    /// Load config from TOML file (if it exists) then apply env var overrides.
    pub fn load() -> Result<Self> {
        Self::load_from(default_config_path()?)
    }

    /// Load from a specific path, then apply env var overrides.
    ///
    /// Does not validate; call [`DeepMemConfig::validate`] before use.
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let mut config = if path.exists() {
            let contents =
                std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str(&contents).context("failed to parse config TOML")?
        } else {
            info!("no config file at {}, using defaults", path.display());
            DeepMemConfig::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    /// Apply environment variable overrides.
    ///
    /// `MEM0_API_KEY` and `OPENAI_API_KEY` keep their conventional names so
    /// existing shells work unchanged.
    fn apply_env_overrides(&mut self) {
        if let Ok(val) = std::env::var("MEM0_API_KEY") {
            self.memory.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("DEEPMEM_USER_ID") {
            self.memory.user_id = val;
        }
        if let Ok(val) = std::env::var("OPENAI_API_KEY") {
            self.llm.api_key = Some(val);
        }
        if let Ok(val) = std::env::var("DEEPMEM_LLM_MODEL") {
            self.llm.model = val;
        }
        if let Ok(val) = std::env::var("DEEPMEM_LOG_LEVEL") {
            self.server.log_level = val;
        }
    }

    /// Check invariants that serde cannot express.
    pub fn validate(&self) -> Result<()> {
        self.threshold_sequence()?;
        anyhow::ensure!(self.search.top_k > 0, "search.top_k must be at least 1");
        anyhow::ensure!(
            self.search.fallback_limit > 0,
            "search.fallback_limit must be at least 1"
        );
        anyhow::ensure!(
            self.research.max_iterations > 0,
            "research.max_iterations must be at least 1"
        );
        anyhow::ensure!(
            matches!(self.server.transport.as_str(), "stdio" | "sse"),
            "server.transport must be 'stdio' or 'sse', got '{}'",
            self.server.transport
        );
        Ok(())
    }

    pub fn threshold_sequence(&self) -> Result<ThresholdSequence> {
        ThresholdSequence::new(self.search.thresholds.clone())
            .context("invalid search.thresholds")
    }

    pub fn search_policy(&self) -> Result<SearchPolicy> {
        Ok(SearchPolicy {
            thresholds: self.threshold_sequence()?,
            fallback_limit: self.search.fallback_limit,
        })
    }

    pub fn research_settings(&self) -> Result<ResearchSettings> {
        let default_query = Some(self.research.default_query.trim())
            .filter(|q| !q.is_empty())
            .map(str::to_string);
        Ok(ResearchSettings {
            max_iterations: self.research.max_iterations,
            default_query,
            max_context_bytes: self.research.max_context_bytes,
            search: self.search_policy()?,
        })
    }

    /// Memory store client using the `[memory]` connection settings and the
    /// `[search]` result size.
    pub fn memory_client(&self) -> Result<Mem0Client> {
        let client = Mem0Client::new(&self.memory).context("failed to create mem0 client")?;
        Ok(client.with_top_k(self.search.top_k))
    }

    /// Scope for a request, using the configured user when none is given.
    pub fn scope_for(&self, user_id: Option<&str>) -> ScopeFilter {
        ScopeFilter::for_user(user_id.unwrap_or(&self.memory.user_id))
    }
}
