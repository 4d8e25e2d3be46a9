use std::path::{Path, PathBuf};

use anyhow::Result;
use tracing::{debug, info};

use crate::config::ConfigStore;
use crate::error::DocsaiError;
use super::{
    DocumentationPipeline, FenceMode, GeminiClient, MalformedPolicy, DEFAULT_MODEL,
};

/// Main orchestration engine for docsai.
///
/// Holds the resolved config-file path and wires the config store, the
/// model client and the pipeline together per command. The client handle
/// is constructed here and passed down explicitly; nothing is configured
/// process-wide.
pub struct Engine {
    config_path: PathBuf,
}

impl Engine {
    pub fn new(config_path: Option<&Path>) -> Result<Self> {
        let config_path = match config_path {
            Some(path) => path.to_path_buf(),
            None => ConfigStore::default_path()?,
        };

        debug!("Using config file {}", config_path.display());

        Ok(Self { config_path })
    }

    /// Run the `document` command: load the credential, then push every
    /// file through the pipeline in order.
    pub async fn document(
        &self,
        files: Vec<PathBuf>,
        replace: bool,
        language: &str,
        fence_mode: FenceMode,
        malformed_policy: MalformedPolicy,
    ) -> Result<()> {
        ConfigStore::ensure_exists(&self.config_path)?;

        let api_key =
            ConfigStore::load(&self.config_path)?.ok_or(DocsaiError::NotConfigured)?;

        let client = GeminiClient::new(api_key, DEFAULT_MODEL);
        info!(
            "Documenting {} file(s) with {}",
            files.len(),
            client.model_name()
        );

        let pipeline =
            DocumentationPipeline::new(Box::new(client), language, fence_mode, malformed_policy);
        pipeline.run(&files, replace).await?;

        Ok(())
    }

    /// Run the `config` command: store the API key in the config file,
    /// which must already exist.
    pub fn configure(&self, api_key: &str, config_path: Option<PathBuf>) -> Result<()> {
        let path = config_path.unwrap_or_else(|| self.config_path.clone());

        ConfigStore::save(&path, api_key)?;
        info!("API key stored in {}", path.display());

        Ok(())
    }
}
