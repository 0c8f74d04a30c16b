use crate::error::{HaploError, Result};
use crate::haplogroup::tree::Phylotree;
use std::collections::HashMap;
use std::io;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

/// Loads phylotree versions from a directory, once each, and hands out shared handles.
///
/// A version `V` resolves to `phylotreeV.json` and `weightsV.txt`. Entries are never evicted.
pub struct TreeCache {
    tree_dir: PathBuf,
    trees: Mutex<HashMap<String, Arc<Phylotree>>>,
}

impl TreeCache {
    pub fn new(tree_dir: impl Into<PathBuf>) -> Self {
        TreeCache {
            tree_dir: tree_dir.into(),
            trees: Mutex::new(HashMap::new()),
        }
    }

    pub fn tree_path(&self, version: &str) -> PathBuf {
        self.tree_dir.join(format!("phylotree{}.json", version))
    }

    pub fn weights_path(&self, version: &str) -> PathBuf {
        self.tree_dir.join(format!("weights{}.txt", version))
    }

    /// Return the tree for `version`, loading it on first use.
    pub fn get_tree(&self, version: &str) -> Result<Arc<Phylotree>> {
        let mut trees = self.trees.lock().unwrap_or_else(|poisoned| poisoned.into_inner());
        if let Some(tree) = trees.get(version) {
            return Ok(Arc::clone(tree));
        }

        let tree = Arc::new(self.load(version)?);
        trees.insert(version.to_string(), Arc::clone(&tree));
        Ok(tree)
    }

    pub fn is_loaded(&self, version: &str) -> bool {
        self.trees
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .contains_key(version)
    }

    fn load(&self, version: &str) -> Result<Phylotree> {
        let tree_path = self.tree_path(version);
        if !tree_path.exists() {
            return Err(HaploError::Io(io::Error::new(
                io::ErrorKind::NotFound,
                format!("phylotree version '{}' not found at {}", version, tree_path.display()),
            )));
        }

        let weights_path = self.weights_path(version);
        let weights = if weights_path.exists() {
            Some(weights_path.as_path())
        } else {
            log::warn!(
                "No weights file at {}, using neutral weights",
                weights_path.display()
            );
            None
        };

        log::info!("Loading phylotree {} from {}", version, tree_path.display());
        Phylotree::from_paths(&tree_path, weights)
    }
}
