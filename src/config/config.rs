use crate::error::Result;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

const QUALIFIER: (&str, &str, &str) = ("org", "haplorank", "haplorank-tools");

/// User defaults, read from `config.toml` in the platform config directory.
///
/// Every field is optional in the file; command-line flags win over these values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Directory holding `phylotree<VERSION>.json` and `weights<VERSION>.txt`.
    pub tree_dir: Option<PathBuf>,
    pub phylotree: String,
    pub metric: String,
    pub hits: usize,
    pub weighted: bool,
    pub heteroplasmy_threshold: f64,
    pub threads: Option<usize>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            tree_dir: None,
            phylotree: "17".to_string(),
            metric: "kulczynski".to_string(),
            hits: 1,
            weighted: true,
            heteroplasmy_threshold: 0.96,
            threads: None,
        }
    }
}

fn project_dirs() -> Option<ProjectDirs> {
    ProjectDirs::from(QUALIFIER.0, QUALIFIER.1, QUALIFIER.2)
}

impl Config {
    /// Load the user config, falling back to defaults when it is missing or unreadable.
    pub fn load() -> Self {
        let path = match project_dirs() {
            Some(dirs) => dirs.config_dir().join("config.toml"),
            None => return Config::default(),
        };
        if !path.exists() {
            return Config::default();
        }
        match Self::load_from(&path) {
            Ok(config) => config,
            Err(e) => {
                log::warn!("Ignoring config {}: {}", path.display(), e);
                Config::default()
            }
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Tree directory: the configured one, else `<data dir>/trees`, else `./trees`.
    pub fn tree_dir(&self) -> PathBuf {
        if let Some(dir) = &self.tree_dir {
            return dir.clone();
        }
        project_dirs()
            .map(|dirs| dirs.data_dir().join("trees"))
            .unwrap_or_else(|| PathBuf::from("trees"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "phylotree = \"16\"\nhits = 5\n").unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.phylotree, "16");
        assert_eq!(config.hits, 5);
        assert_eq!(config.metric, "kulczynski");
        assert!(config.weighted);
        assert_eq!(config.heteroplasmy_threshold, 0.96);
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        fs::write(&path, "hits = \"many\"\n").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_explicit_tree_dir() {
        let config = Config {
            tree_dir: Some(PathBuf::from("/data/trees")),
            ..Config::default()
        };
        assert_eq!(config.tree_dir(), PathBuf::from("/data/trees"));
    }
}
