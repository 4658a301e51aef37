use anyhow::Context;
use genescope_egress::{HttpClientConfig, SourcesConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GenescopeConfig {
    #[serde(default)]
    pub http: HttpClientConfig,

    #[serde(default)]
    pub sources: SourcesConfig,

    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl GenescopeConfig {
    pub fn from_file(path: impl AsRef<Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;

        let config = if path.extension().and_then(|s| s.to_str()) == Some("toml") {
            toml::from_str(&contents)
                .with_context(|| format!("Invalid TOML in {}", path.display()))?
        } else {
            // Default to YAML
            serde_yaml::from_str(&contents)
                .with_context(|| format!("Invalid YAML in {}", path.display()))?
        };

        Ok(config)
    }

    /// Merge environment variables into config (env vars take precedence)
    pub fn merge_env(&mut self) {
        if let Ok(val) = std::env::var("GENESCOPE_LOG_LEVEL") {
            self.logging.level = val;
        }

        if let Ok(val) = std::env::var("GENESCOPE_HTTP_TIMEOUT_SECS") {
            match val.parse::<u64>() {
                Ok(secs) if secs > 0 => self.http.timeout_secs = secs,
                _ => eprintln!(
                    "Warning: Invalid GENESCOPE_HTTP_TIMEOUT_SECS '{}', using {}",
                    val, self.http.timeout_secs
                ),
            }
        }

        // Upstream base URLs
        if let Ok(val) = std::env::var("GENESCOPE_TISSUE_ATLAS_URL") {
            self.sources.tissue_atlas_url = val;
        }

        if let Ok(val) = std::env::var("GENESCOPE_IMMUNE_CELL_URL") {
            self.sources.immune_cell_url = val;
        }

        if let Ok(val) = std::env::var("GENESCOPE_GENE_ANNOTATION_URL") {
            self.sources.gene_annotation_url = val;
        }

        if let Ok(val) = std::env::var("GENESCOPE_DATASET_EXPRESSION_URL") {
            self.sources.dataset_expression_url = val;
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}
