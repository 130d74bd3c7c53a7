//! Layout files: the receiver, substitution views and key paths an equation
//! batch is compiled against.
//!
//! ```toml
//! receiver = "root"
//! views = ["header", "body"]      # or a table: [views] header = "headerView"
//!
//! [key_paths]
//! "header.title" = "titleLabel"
//! ```
//!
//! Views are plain names; the CLI uses them as view handles.

use std::collections::BTreeMap;
use std::path::Path;

use autolay_core::{KeyPathTable, Substitutions};
use serde::Deserialize;

fn default_receiver() -> String {
    "self".to_string()
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub(crate) enum ViewSet {
    Indexed(Vec<String>),
    Named(BTreeMap<String, String>),
}

impl Default for ViewSet {
    fn default() -> Self {
        ViewSet::Indexed(Vec::new())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(deny_unknown_fields)]
pub(crate) struct Layout {
    #[serde(default = "default_receiver")]
    pub receiver: String,
    #[serde(default)]
    pub views: ViewSet,
    /// `"<view>.<property>" = "<view>"`
    #[serde(default)]
    pub key_paths: BTreeMap<String, String>,
}

impl Default for Layout {
    fn default() -> Self {
        Layout {
            receiver: default_receiver(),
            views: ViewSet::default(),
            key_paths: BTreeMap::new(),
        }
    }
}

impl Layout {
    /// Load a layout file. `.json` files are read as JSON, anything else as
    /// TOML.
    pub fn load(path: &Path) -> Result<Layout, String> {
        let src = std::fs::read_to_string(path)
            .map_err(|e| format!("error reading file '{}': {}", path.display(), e))?;
        let is_json = path.extension().is_some_and(|ext| ext == "json");
        if is_json {
            serde_json::from_str(&src)
                .map_err(|e| format!("error parsing JSON in '{}': {}", path.display(), e))
        } else {
            toml::from_str(&src)
                .map_err(|e| format!("error parsing TOML in '{}': {}", path.display(), e))
        }
    }

    pub fn substitutions(&self) -> Substitutions<String> {
        match &self.views {
            ViewSet::Indexed(views) => Substitutions::Indexed(views.clone()),
            ViewSet::Named(views) => Substitutions::Named(views.clone()),
        }
    }

    pub fn key_path_table(&self) -> Result<KeyPathTable<String>, String> {
        let mut table = KeyPathTable::new();
        for (key, target) in &self.key_paths {
            let (owner, property) = key
                .split_once('.')
                .filter(|(owner, property)| !owner.is_empty() && !property.is_empty())
                .ok_or_else(|| {
                    format!("invalid key path '{}': expected '<view>.<property>'", key)
                })?;
            table.insert(owner.to_string(), property, target.clone());
        }
        Ok(table)
    }
}
