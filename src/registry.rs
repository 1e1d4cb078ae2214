//! Cluster registry.
//!
//! Stored as a JSON array on disk; extra fields are carried through to
//! `clusters.json` untouched:
//! ```json
//! [
//!   { "name": "EU1", "display_name": "20A.EU1", "build_name": "20A.EU1", "col": "#BA55D3" },
//!   { "name": "EU2", "display_name": "20A.EU2", "build_name": "20A.EU2", "col": "#D2691E" }
//! ]
//! ```

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

/// One registered cluster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClusterDef {
    pub name: String,
    pub display_name: String,
    /// Stem of the cluster table file, `<build_name>_data.json`.
    pub build_name: String,
    #[serde(flatten)]
    pub extra: BTreeMap<String, Value>,
}

/// The set of clusters to convert, in registry order.
#[derive(Debug, Clone, Default)]
pub struct ClusterRegistry {
    clusters_by_name: BTreeMap<String, ClusterDef>,
    cluster_list: Vec<ClusterDef>,
}

impl ClusterRegistry {
    /// Loads the registry from a JSON file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading cluster registry {}", path.display()))?;
        let list: Vec<ClusterDef> = serde_json::from_str(&content)
            .with_context(|| format!("parsing cluster registry {}", path.display()))?;
        Self::from_list(list)
    }

    /// Builds a registry, rejecting duplicate cluster names.
    pub fn from_list(cluster_list: Vec<ClusterDef>) -> Result<Self> {
        let mut clusters_by_name = BTreeMap::new();
        for def in &cluster_list {
            if clusters_by_name
                .insert(def.name.clone(), def.clone())
                .is_some()
            {
                bail!("duplicate cluster name in registry: {}", def.name);
            }
        }
        Ok(Self {
            clusters_by_name,
            cluster_list,
        })
    }

    /// Returns a new registry without the named clusters. Unknown names are ignored.
    pub fn without(&self, excluded: &[String]) -> Self {
        let cluster_list: Vec<ClusterDef> = self
            .cluster_list
            .iter()
            .filter(|def| !excluded.contains(&def.name))
            .cloned()
            .collect();
        let clusters_by_name = cluster_list
            .iter()
            .map(|def| (def.name.clone(), def.clone()))
            .collect();
        Self {
            clusters_by_name,
            cluster_list,
        }
    }

    pub fn get(&self, name: &str) -> Option<&ClusterDef> {
        self.clusters_by_name.get(name)
    }

    pub fn clusters(&self) -> &[ClusterDef] {
        &self.cluster_list
    }

    pub fn len(&self) -> usize {
        self.cluster_list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cluster_list.is_empty()
    }
}
