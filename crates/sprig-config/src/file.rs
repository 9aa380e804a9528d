use std::path::{Path, PathBuf};

use bstr::{BStr, ByteSlice};

use crate::parse::parse_config;
use crate::{ConfigEntry, ConfigError, ConfigKey, ConfigScope};

/// The entries of one config file, in file order.
#[derive(Debug, Clone)]
pub struct ConfigFile {
    path: Option<PathBuf>,
    scope: ConfigScope,
    entries: Vec<ConfigEntry>,
}

impl ConfigFile {
    pub fn parse(data: &[u8], path: Option<&Path>, scope: ConfigScope) -> Result<Self, ConfigError> {
        let name = path.map_or_else(|| "<memory>".to_string(), |p| p.display().to_string());
        let entries = parse_config(data, &name)?
            .into_iter()
            .map(|e| ConfigEntry {
                key: e.key,
                value: e.value,
                scope,
            })
            .collect();
        Ok(Self {
            path: path.map(Path::to_path_buf),
            scope,
            entries,
        })
    }

    /// Read and parse a file. `Ok(None)` when it does not exist.
    pub fn load(path: &Path, scope: ConfigScope) -> Result<Option<Self>, ConfigError> {
        match std::fs::read(path) {
            Ok(data) => Self::parse(&data, Some(path), scope).map(Some),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn scope(&self) -> ConfigScope {
        self.scope
    }

    pub fn entries(&self) -> &[ConfigEntry] {
        &self.entries
    }

    /// Last value assigned to `key` in this file.
    pub fn get(&self, key: &ConfigKey) -> Option<Option<&BStr>> {
        self.entries
            .iter()
            .rev()
            .find(|e| &e.key == key)
            .map(|e| e.value.as_ref().map(|v| v.as_bstr()))
    }
}
