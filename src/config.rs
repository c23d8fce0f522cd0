use std::path::Path;

use anyhow::Context;
use serde::Deserialize;

#[derive(Debug, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
    pub port: u16,
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".into(),
            port: 8080,
            max_body_bytes: 10_485_760,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct LlmConfig {
    pub model: String,
    pub vision_model: String,
    pub embedding_model: String,
    /// Override for the Gemini API endpoint, mainly for testing.
    pub base_url: Option<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            model: "gemini-2.5-flash".into(),
            vision_model: "gemini-2.5-flash".into(),
            embedding_model: "text-embedding-004".into(),
            base_url: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// "memory" or "qdrant".
    pub backend: String,
    pub qdrant_url: String,
    pub vector_size: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            backend: "memory".into(),
            qdrant_url: "http://localhost:6334".into(),
            vector_size: 768,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct RetrievalConfig {
    pub top_k: usize,
    pub max_items: usize,
    pub image_limit: usize,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            top_k: 12,
            max_items: 8,
            image_limit: 4,
        }
    }
}

impl Config {
    /// Load configuration from a TOML file with env var overrides.
    ///
    /// Falls back to defaults when the file does not exist. The Gemini API
    /// key is never read from the file; `main` takes it from the
    /// environment.
    ///
    /// # Errors
    ///
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let mut config = if path.exists() {
            let content = std::fs::read_to_string(path).context("failed to read config file")?;
            toml::from_str::<Self>(&content).context("failed to parse config file")?
        } else {
            Self::default()
        };

        config.apply_env_overrides();
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(v) = std::env::var("FOLIO_PORT")
            && let Ok(port) = v.parse()
        {
            self.server.port = port;
        }
        if let Ok(v) = std::env::var("FOLIO_STORE_BACKEND") {
            self.store.backend = v;
        }
        if let Ok(v) = std::env::var("FOLIO_QDRANT_URL") {
            self.store.qdrant_url = v;
        }
    }
}

#[cfg(test)]
mod tests {
    use std::io::Write;

    use super::*;

    #[test]
    fn defaults_when_file_missing() {
        let config = Config::default();
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.llm.model, "gemini-2.5-flash");
        assert_eq!(config.store.backend, "memory");
        assert_eq!(config.retrieval.top_k, 12);
        assert_eq!(config.retrieval.max_items, 8);
    }

    #[test]
    fn parse_valid_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        let mut file = std::fs::File::create(&path).unwrap();
        writeln!(
            file,
            "[server]\nport = 9000\n\n[store]\nbackend = \"qdrant\"\n\n[retrieval]\ntop_k = 6"
        )
        .unwrap();

        let config = Config::load(&path).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.store.backend, "qdrant");
        assert_eq!(config.retrieval.top_k, 6);
        // untouched sections keep their defaults
        assert_eq!(config.server.bind, "127.0.0.1");
        assert_eq!(config.retrieval.image_limit, 4);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("folio.toml");
        std::fs::write(&path, "not = [valid").unwrap();
        assert!(Config::load(&path).is_err());
    }
}
