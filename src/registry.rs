//! Local model registry
//!
//! A directory holding `registry.json`, which records numbered versions of each
//! named model (pointing at an artifact directory) and aliases such as
//! `production` that point at one version.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::config::MODEL_FILE;
use crate::error::{HousingError, Result};
use crate::utils::{load_json, save_json};

pub const DEFAULT_REGISTRY_DIR: &str = "model_registry";
pub const DEFAULT_MODEL_NAME: &str = "CaliforniaHousingRegressor";
pub const DEFAULT_ALIAS: &str = "production";

const INDEX_FILE: &str = "registry.json";

/// Read-only lookups a serving process needs
pub trait ModelRegistry {
    /// Version currently pointed at by `alias`
    fn get_model_version_by_alias(&self, name: &str, alias: &str) -> Result<ModelVersionInfo>;

    /// Storage location of a specific version
    fn download_uri(&self, name: &str, version: u32) -> Result<String>;

    /// Resolve `name@alias` or `name/version` to a storage location
    fn resolve(&self, reference: &str) -> Result<String> {
        match ModelReference::parse(reference)? {
            ModelReference::Alias { name, alias } => {
                let version = self.get_model_version_by_alias(&name, &alias)?;
                self.download_uri(&name, version.version)
            }
            ModelReference::Version { name, version } => self.download_uri(&name, version),
        }
    }
}

/// One registered version
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelVersionInfo {
    pub name: String,
    pub version: u32,
    pub source: String,
    pub registered_at: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegisteredModel {
    versions: Vec<ModelVersionInfo>,
    aliases: BTreeMap<String, u32>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct RegistryIndex {
    models: BTreeMap<String, RegisteredModel>,
}

/// Parsed `name@alias` / `name/version`
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelReference {
    Alias { name: String, alias: String },
    Version { name: String, version: u32 },
}

impl ModelReference {
    pub fn parse(reference: &str) -> Result<Self> {
        let reference = reference.strip_prefix("models:/").unwrap_or(reference);

        if let Some((name, alias)) = reference.split_once('@') {
            if !name.is_empty() && !alias.is_empty() {
                return Ok(Self::Alias {
                    name: name.to_string(),
                    alias: alias.to_string(),
                });
            }
        } else if let Some((name, version)) = reference.rsplit_once('/') {
            match version.parse::<u32>() {
                Ok(version) if !name.is_empty() => {
                    return Ok(Self::Version {
                        name: name.to_string(),
                        version,
                    });
                }
                _ => {}
            }
        }

        Err(HousingError::ConfigError(format!(
            "invalid model reference {:?}, expected name@alias or name/version",
            reference
        )))
    }
}

/// Registry backed by a JSON index on the local filesystem
#[derive(Debug)]
pub struct LocalModelRegistry {
    root: PathBuf,
    index: RegistryIndex,
}

impl LocalModelRegistry {
    /// Open the registry at `root`, starting empty if it has no index yet
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let index_path = root.join(INDEX_FILE);
        let index = if index_path.exists() {
            load_json(&index_path)?
        } else {
            RegistryIndex::default()
        };
        Ok(Self { root, index })
    }

    /// Record an artifact directory as the next version of `name`
    pub fn register_version(&mut self, name: &str, source: &Path) -> Result<ModelVersionInfo> {
        if !source.join(MODEL_FILE).exists() {
            return Err(HousingError::ArtifactMissing(source.join(MODEL_FILE)));
        }
        let source = fs::canonicalize(source)?;

        let model = self.index.models.entry(name.to_string()).or_default();
        let version = model.versions.iter().map(|v| v.version).max().unwrap_or(0) + 1;
        let info = ModelVersionInfo {
            name: name.to_string(),
            version,
            source: source.display().to_string(),
            registered_at: Utc::now().to_rfc3339(),
        };
        model.versions.push(info.clone());

        self.save_index()?;
        info!(name, version, source = %info.source, "Registered model version");
        Ok(info)
    }

    /// Point `alias` at an existing version, replacing any previous target
    pub fn set_alias(&mut self, name: &str, alias: &str, version: u32) -> Result<()> {
        let model = self.model_mut(name)?;
        if !model.versions.iter().any(|v| v.version == version) {
            return Err(HousingError::DataError(format!(
                "Version not found: {} v{}",
                name, version
            )));
        }
        model.aliases.insert(alias.to_string(), version);

        self.save_index()?;
        info!(name, alias, version, "Set model alias");
        Ok(())
    }

    /// All versions of `name`, oldest first
    pub fn list_versions(&self, name: &str) -> Vec<ModelVersionInfo> {
        self.index
            .models
            .get(name)
            .map(|m| m.versions.clone())
            .unwrap_or_default()
    }

    pub fn list_models(&self) -> Vec<String> {
        self.index.models.keys().cloned().collect()
    }

    fn model(&self, name: &str) -> Result<&RegisteredModel> {
        self.index
            .models
            .get(name)
            .ok_or_else(|| HousingError::DataError(format!("Model not found: {}", name)))
    }

    fn model_mut(&mut self, name: &str) -> Result<&mut RegisteredModel> {
        self.index
            .models
            .get_mut(name)
            .ok_or_else(|| HousingError::DataError(format!("Model not found: {}", name)))
    }

    fn save_index(&self) -> Result<()> {
        save_json(&self.index, &self.root.join(INDEX_FILE))
    }
}

impl ModelRegistry for LocalModelRegistry {
    fn get_model_version_by_alias(&self, name: &str, alias: &str) -> Result<ModelVersionInfo> {
        let model = self.model(name)?;
        let version = model.aliases.get(alias).ok_or_else(|| {
            HousingError::DataError(format!("Alias not found: {}@{}", name, alias))
        })?;
        model
            .versions
            .iter()
            .find(|v| v.version == *version)
            .cloned()
            .ok_or_else(|| HousingError::DataError(format!("Version not found: {} v{}", name, version)))
    }

    fn download_uri(&self, name: &str, version: u32) -> Result<String> {
        self.model(name)?
            .versions
            .iter()
            .find(|v| v.version == version)
            .map(|v| v.source.clone())
            .ok_or_else(|| HousingError::DataError(format!("Version not found: {} v{}", name, version)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn artifact_dir(root: &Path, name: &str) -> PathBuf {
        let dir = root.join(name);
        fs::create_dir_all(&dir).unwrap();
        fs::write(dir.join(MODEL_FILE), b"model").unwrap();
        dir
    }

    #[test]
    fn test_parse_reference() {
        assert_eq!(
            ModelReference::parse("CaliforniaHousingRegressor@production").unwrap(),
            ModelReference::Alias {
                name: "CaliforniaHousingRegressor".to_string(),
                alias: "production".to_string()
            }
        );
        assert_eq!(
            ModelReference::parse("models:/Housing/3").unwrap(),
            ModelReference::Version {
                name: "Housing".to_string(),
                version: 3
            }
        );
        assert!(ModelReference::parse("Housing").is_err());
        assert!(ModelReference::parse("@production").is_err());
        assert!(ModelReference::parse("Housing/latest").is_err());
    }

    #[test]
    fn test_register_and_resolve_alias() {
        let tmp = tempfile::tempdir().unwrap();
        let v1 = artifact_dir(tmp.path(), "run1");
        let v2 = artifact_dir(tmp.path(), "run2");

        let mut registry = LocalModelRegistry::open(tmp.path().join("registry")).unwrap();
        assert_eq!(registry.register_version(DEFAULT_MODEL_NAME, &v1).unwrap().version, 1);
        assert_eq!(registry.register_version(DEFAULT_MODEL_NAME, &v2).unwrap().version, 2);
        registry.set_alias(DEFAULT_MODEL_NAME, DEFAULT_ALIAS, 1).unwrap();

        let uri = registry.resolve("CaliforniaHousingRegressor@production").unwrap();
        assert_eq!(PathBuf::from(uri), fs::canonicalize(&v1).unwrap());

        // Moving the alias changes the resolution
        registry.set_alias(DEFAULT_MODEL_NAME, DEFAULT_ALIAS, 2).unwrap();
        let info = registry
            .get_model_version_by_alias(DEFAULT_MODEL_NAME, DEFAULT_ALIAS)
            .unwrap();
        assert_eq!(info.version, 2);
    }

    #[test]
    fn test_index_persists() {
        let tmp = tempfile::tempdir().unwrap();
        let v1 = artifact_dir(tmp.path(), "run1");
        let root = tmp.path().join("registry");

        {
            let mut registry = LocalModelRegistry::open(&root).unwrap();
            registry.register_version("m", &v1).unwrap();
            registry.set_alias("m", "staging", 1).unwrap();
        }

        let reopened = LocalModelRegistry::open(&root).unwrap();
        assert_eq!(reopened.list_models(), vec!["m".to_string()]);
        assert_eq!(reopened.list_versions("m").len(), 1);
        assert!(reopened.resolve("m@staging").is_ok());
    }

    #[test]
    fn test_lookup_errors() {
        let tmp = tempfile::tempdir().unwrap();
        let v1 = artifact_dir(tmp.path(), "run1");
        let mut registry = LocalModelRegistry::open(tmp.path().join("registry")).unwrap();

        assert!(registry.resolve("m@production").is_err());
        registry.register_version("m", &v1).unwrap();
        assert!(registry.resolve("m@production").is_err());
        assert!(registry.set_alias("m", "production", 9).is_err());
        assert!(registry.download_uri("m", 2).is_err());
    }

    #[test]
    fn test_register_requires_model_file() {
        let tmp = tempfile::tempdir().unwrap();
        let mut registry = LocalModelRegistry::open(tmp.path().join("registry")).unwrap();
        let err = registry.register_version("m", tmp.path()).unwrap_err();
        assert!(matches!(err, HousingError::ArtifactMissing(_)));
    }
}
