use std::path::{Path, PathBuf};

use toml::Table;

use crate::error::{DocsaiError, Result};

/// Name of the config file placed in the user's home directory.
const CONFIG_FILE_NAME: &str = "docsai.toml";

/// Persisted configuration, stored as a TOML document with two tables:
/// `API` holding `API_KEY` and `PATH` holding the last-used config path.
///
/// Keys other than the two recognized ones are preserved across saves.
pub struct ConfigStore;

impl ConfigStore {
    /// Default config file location: `~/docsai.toml`.
    pub fn default_path() -> Result<PathBuf> {
        let home = dirs::home_dir()
            .ok_or_else(|| DocsaiError::Config("could not determine home directory".to_string()))?;
        Ok(home.join(CONFIG_FILE_NAME))
    }

    /// Load the API key from the config file.
    ///
    /// Returns `Ok(None)` when the file is missing, empty, or lacks
    /// `API.API_KEY` — the "not configured" condition is recoverable and
    /// never an error. A TOML syntax error is a real `Config` error.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Option<String>> {
        let content = match std::fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        let table: Table = content
            .parse()
            .map_err(|e: toml::de::Error| DocsaiError::Config(e.to_string()))?;

        let api_key = table
            .get("API")
            .and_then(|api| api.get("API_KEY"))
            .and_then(|key| key.as_str())
            .map(|key| key.to_string());

        Ok(api_key)
    }

    /// Create an empty config file if none exists yet.
    pub fn ensure_exists<P: AsRef<Path>>(path: P) -> Result<()> {
        if !path.as_ref().exists() {
            std::fs::write(path, "")?;
        }
        Ok(())
    }

    /// Store the API key (and the config path itself) in the config file.
    ///
    /// The file must already exist; the `config` command refuses to create
    /// it. Existing content is parsed first so unrelated keys survive, the
    /// `API` and `PATH` tables are created if absent, and the document is
    /// rewritten through a temp file plus rename so a crash mid-write
    /// cannot leave a half-written config behind.
    pub fn save<P: AsRef<Path>>(path: P, api_key: &str) -> Result<()> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .map_err(|_| DocsaiError::ConfigFileMissing(path.to_path_buf()))?;

        let mut table: Table = content
            .parse()
            .map_err(|e: toml::de::Error| DocsaiError::Config(e.to_string()))?;

        let api = table
            .entry("API")
            .or_insert_with(|| toml::Value::Table(Table::new()))
            .as_table_mut()
            .ok_or_else(|| DocsaiError::Config("'API' is not a table".to_string()))?;
        api.insert(
            "API_KEY".to_string(),
            toml::Value::String(api_key.to_string()),
        );

        let path_table = table
            .entry("PATH")
            .or_insert_with(|| toml::Value::Table(Table::new()))
            .as_table_mut()
            .ok_or_else(|| DocsaiError::Config("'PATH' is not a table".to_string()))?;
        path_table.insert(
            "PATH".to_string(),
            toml::Value::String(path.display().to_string()),
        );

        let serialized = toml::to_string_pretty(&table)
            .map_err(|e| DocsaiError::Config(e.to_string()))?;

        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, serialized)?;
        std::fs::rename(&tmp, path)?;

        Ok(())
    }
}
