//! Configuration for contentforge.
//!
//! Defaults are defined with serde field defaults, optionally loaded from
//! a TOML file, then overridden from environment variables. Provider API
//! keys only ever come from the environment or the config file; nothing
//! is hardcoded.

use std::path::Path;

use serde::{Deserialize, Serialize};

/// Crawl-phase tuning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CrawlConfig {
    /// Items crawled fully in parallel before the next group starts.
    #[serde(default = "default_crawl_group_size")]
    pub group_size: usize,
    /// Fixed delay between groups, in seconds.
    #[serde(default = "default_crawl_group_delay")]
    pub group_delay_secs: u64,
    /// Per-page fetch/render timeout, in seconds.
    #[serde(default = "default_page_timeout")]
    pub page_timeout_secs: u64,
    /// Post-load settle delay for rendered pages, in milliseconds.
    #[serde(default = "default_settle_delay")]
    pub settle_delay_ms: u64,
    /// Minimum body length for a strategy result to be accepted.
    #[serde(default = "default_min_body_chars")]
    pub min_body_chars: usize,
    /// Skip the headless-browser strategy even when compiled in.
    #[serde(default)]
    pub disable_browser: bool,
}

fn default_crawl_group_size() -> usize {
    3
}

fn default_crawl_group_delay() -> u64 {
    2
}

fn default_page_timeout() -> u64 {
    30
}

fn default_settle_delay() -> u64 {
    2000
}

fn default_min_body_chars() -> usize {
    50
}

impl Default for CrawlConfig {
    fn default() -> Self {
        Self {
            group_size: default_crawl_group_size(),
            group_delay_secs: default_crawl_group_delay(),
            page_timeout_secs: default_page_timeout(),
            settle_delay_ms: default_settle_delay(),
            min_body_chars: default_min_body_chars(),
            disable_browser: false,
        }
    }
}

/// Generation-phase tuning. Generation runs in smaller groups than
/// crawling because provider rate limits are tighter than site limits.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GenerationConfig {
    #[serde(default = "default_gen_group_size")]
    pub group_size: usize,
    #[serde(default = "default_gen_group_delay")]
    pub group_delay_secs: u64,
    /// Complexity score at which auto-selection escalates providers.
    #[serde(default = "default_complexity_threshold")]
    pub complexity_threshold: u8,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_gen_group_size() -> usize {
    2
}

fn default_gen_group_delay() -> u64 {
    3
}

fn default_complexity_threshold() -> u8 {
    60
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_temperature() -> f32 {
    0.7
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            group_size: default_gen_group_size(),
            group_delay_secs: default_gen_group_delay(),
            complexity_threshold: default_complexity_threshold(),
            max_tokens: default_max_tokens(),
            temperature: default_temperature(),
        }
    }
}

/// Credentials and endpoints for one hosted provider.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ApiProviderConfig {
    pub api_key: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

/// Endpoint and model for a local Ollama daemon.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OllamaConfig {
    #[serde(default = "default_ollama_endpoint")]
    pub endpoint: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub model: Option<String>,
}

fn default_ollama_endpoint() -> String {
    "http://localhost:11434".to_string()
}

/// Which AI backends are available. Unset providers are simply not
/// registered; the engine works with any non-empty subset.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ProvidersConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub openai: Option<ApiProviderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anthropic: Option<ApiProviderConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ollama: Option<OllamaConfig>,
}

/// Top-level application configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub crawl: CrawlConfig,
    #[serde(default)]
    pub generation: GenerationConfig,
    #[serde(default)]
    pub providers: ProvidersConfig,
}

impl AppConfig {
    /// Load from a TOML file, then apply environment overrides.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&raw)?;
        Ok(config.with_env_overrides())
    }

    /// Defaults plus environment overrides; used when no config file is
    /// given.
    pub fn from_env() -> Self {
        Self::default().with_env_overrides()
    }

    /// Apply environment variable overrides.
    ///
    /// Supported env vars:
    /// - `OPENAI_API_KEY`, `OPENAI_MODEL`, `OPENAI_ENDPOINT`
    /// - `ANTHROPIC_API_KEY`, `ANTHROPIC_MODEL`
    /// - `OLLAMA_ENDPOINT`, `OLLAMA_MODEL`
    /// - `CONTENTFORGE_CRAWL_GROUP_SIZE`, `CONTENTFORGE_CRAWL_DELAY_SECS`
    /// - `CONTENTFORGE_GEN_GROUP_SIZE`, `CONTENTFORGE_GEN_DELAY_SECS`
    /// - `CONTENTFORGE_DISABLE_BROWSER`: "true" or "1"
    pub fn with_env_overrides(mut self) -> Self {
        if let Ok(key) = std::env::var("OPENAI_API_KEY") {
            let entry = self.providers.openai.get_or_insert(ApiProviderConfig {
                api_key: String::new(),
                endpoint: None,
                model: None,
            });
            entry.api_key = key;
        }
        if let Ok(val) = std::env::var("OPENAI_MODEL") {
            if let Some(ref mut openai) = self.providers.openai {
                openai.model = Some(val);
            }
        }
        if let Ok(val) = std::env::var("OPENAI_ENDPOINT") {
            if let Some(ref mut openai) = self.providers.openai {
                openai.endpoint = Some(val);
            }
        }

        if let Ok(key) = std::env::var("ANTHROPIC_API_KEY") {
            let entry = self.providers.anthropic.get_or_insert(ApiProviderConfig {
                api_key: String::new(),
                endpoint: None,
                model: None,
            });
            entry.api_key = key;
        }
        if let Ok(val) = std::env::var("ANTHROPIC_MODEL") {
            if let Some(ref mut anthropic) = self.providers.anthropic {
                anthropic.model = Some(val);
            }
        }

        if let Ok(endpoint) = std::env::var("OLLAMA_ENDPOINT") {
            let entry = self.providers.ollama.get_or_insert(OllamaConfig {
                endpoint: default_ollama_endpoint(),
                model: None,
            });
            entry.endpoint = endpoint;
        }
        if let Ok(val) = std::env::var("OLLAMA_MODEL") {
            let entry = self.providers.ollama.get_or_insert(OllamaConfig {
                endpoint: default_ollama_endpoint(),
                model: None,
            });
            entry.model = Some(val);
        }

        if let Ok(val) = std::env::var("CONTENTFORGE_CRAWL_GROUP_SIZE") {
            if let Ok(n) = val.parse() {
                self.crawl.group_size = n;
            }
        }
        if let Ok(val) = std::env::var("CONTENTFORGE_CRAWL_DELAY_SECS") {
            if let Ok(n) = val.parse() {
                self.crawl.group_delay_secs = n;
            }
        }
        if let Ok(val) = std::env::var("CONTENTFORGE_GEN_GROUP_SIZE") {
            if let Ok(n) = val.parse() {
                self.generation.group_size = n;
            }
        }
        if let Ok(val) = std::env::var("CONTENTFORGE_GEN_DELAY_SECS") {
            if let Ok(n) = val.parse() {
                self.generation.group_delay_secs = n;
            }
        }
        if let Ok(val) = std::env::var("CONTENTFORGE_DISABLE_BROWSER") {
            self.crawl.disable_browser = val.eq_ignore_ascii_case("true") || val == "1";
        }

        self
    }
}
