//! Block catalog.
//!
//! A block source contains a `blocks/` directory; each subdirectory is one
//! block described by a `block.toml` manifest alongside its template files.
//! The catalog reads manifests for listing and search — it consumes no
//! rendering types and rendering does not depend on it.

use crate::engine::RenderConfig;
use crate::error::RenderError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Default template subdirectory of a block when the manifest declares no
/// file patterns.
const TEMPLATE_DIR: &str = "template";

/// Per-block manifest, deserialized from `block.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BlockConfig {
    pub name: String,
    pub version: String,
    #[serde(default)]
    pub author: Option<String>,
    pub description: String,
    /// Tags for keyword search.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Optional screenshot path, relative to the block directory.
    #[serde(default)]
    pub snapshot: Option<String>,
    /// JSON-schema-style description of the data model the templates expect.
    /// Informational only; the engine does not validate models against it.
    #[serde(default)]
    pub model: Option<Value>,
    /// Glob patterns selecting template files, relative to the block
    /// directory. Empty means everything under `template/`.
    #[serde(default)]
    pub files: Vec<String>,
    /// Directory the manifest was loaded from; filled in by the catalog.
    #[serde(skip)]
    pub base_path: PathBuf,
}

impl BlockConfig {
    /// Render request for this block against `model`.
    ///
    /// With declared file patterns the block directory itself is the
    /// template base; otherwise the base is the conventional `template/`
    /// subdirectory and the full tree under it is rendered.
    pub fn render_config(&self, model: Value) -> RenderConfig {
        if self.files.is_empty() {
            RenderConfig {
                base_path: self.base_path.join(TEMPLATE_DIR),
                patterns: Vec::new(),
                model,
            }
        } else {
            RenderConfig {
                base_path: self.base_path.clone(),
                patterns: self.files.clone(),
                model,
            }
        }
    }
}

/// All blocks of one source.
#[derive(Debug)]
pub struct Catalog {
    blocks: Vec<BlockConfig>,
}

impl Catalog {
    /// Read every block manifest under `<source_dir>/blocks`.
    ///
    /// A source without a `blocks/` directory is not a block source;
    /// subdirectories without a manifest are skipped, an unparsable
    /// manifest is an error.
    pub fn load(source_dir: &Path) -> Result<Self, RenderError> {
        let blocks_dir = source_dir.join("blocks");
        if !blocks_dir.is_dir() {
            return Err(RenderError::Catalog(format!(
                "{} has no blocks directory",
                source_dir.display()
            )));
        }

        let mut entries: Vec<PathBuf> = fs::read_dir(&blocks_dir)
            .map_err(|e| RenderError::Catalog(format!("cannot read {}: {e}", blocks_dir.display())))?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| path.is_dir())
            .collect();
        entries.sort();

        let mut blocks = Vec::new();
        for block_dir in entries {
            let manifest = block_dir.join("block.toml");
            if !manifest.is_file() {
                debug!(dir = %block_dir.display(), "skipping block directory without manifest");
                continue;
            }
            let raw = fs::read_to_string(&manifest)
                .map_err(|e| RenderError::Catalog(format!("cannot read {}: {e}", manifest.display())))?;
            let mut config: BlockConfig = toml::from_str(&raw).map_err(|e| {
                RenderError::Catalog(format!("invalid manifest {}: {e}", manifest.display()))
            })?;
            config.base_path = block_dir;
            blocks.push(config);
        }
        Ok(Catalog { blocks })
    }

    pub fn blocks(&self) -> &[BlockConfig] {
        &self.blocks
    }

    pub fn find(&self, name: &str) -> Option<&BlockConfig> {
        self.blocks.iter().find(|b| b.name == name)
    }

    /// Filter by keyword substring on the block name and, when `tags` is
    /// non-empty, by tag intersection.
    pub fn search(&self, keyword: &str, tags: &[String]) -> Vec<&BlockConfig> {
        self.blocks
            .iter()
            .filter(|block| block.name.contains(keyword))
            .filter(|block| tags.is_empty() || tags.iter().any(|t| block.tags.contains(t)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_block(source: &Path, dir_name: &str, manifest: &str) {
        let block_dir = source.join("blocks").join(dir_name);
        fs::create_dir_all(&block_dir).unwrap();
        fs::write(block_dir.join("block.toml"), manifest).unwrap();
    }

    #[test]
    fn loads_manifests_and_fills_base_path() {
        let source = TempDir::new().unwrap();
        write_block(
            source.path(),
            "service",
            r#"
name = "service"
version = "1.0.0"
description = "HTTP service skeleton"
tags = ["http", "service"]
files = ["template/**/*"]
"#,
        );

        let catalog = Catalog::load(source.path()).unwrap();
        assert_eq!(catalog.blocks().len(), 1);
        let block = catalog.find("service").unwrap();
        assert_eq!(block.version, "1.0.0");
        assert_eq!(block.base_path, source.path().join("blocks/service"));
        assert_eq!(block.files, vec!["template/**/*"]);
    }

    #[test]
    fn missing_blocks_directory_is_a_catalog_error() {
        let source = TempDir::new().unwrap();
        assert!(matches!(
            Catalog::load(source.path()).unwrap_err(),
            RenderError::Catalog(_)
        ));
    }

    #[test]
    fn invalid_manifest_is_a_catalog_error() {
        let source = TempDir::new().unwrap();
        write_block(source.path(), "broken", "name = ");
        assert!(Catalog::load(source.path()).is_err());
    }

    #[test]
    fn directories_without_manifest_are_skipped() {
        let source = TempDir::new().unwrap();
        fs::create_dir_all(source.path().join("blocks/stray")).unwrap();
        write_block(
            source.path(),
            "real",
            "name = \"real\"\nversion = \"0.1.0\"\ndescription = \"d\"\n",
        );

        let catalog = Catalog::load(source.path()).unwrap();
        assert_eq!(catalog.blocks().len(), 1);
    }

    #[test]
    fn search_filters_by_keyword_and_tags() {
        let source = TempDir::new().unwrap();
        write_block(
            source.path(),
            "api-service",
            "name = \"api-service\"\nversion = \"1.0.0\"\ndescription = \"d\"\ntags = [\"http\"]\n",
        );
        write_block(
            source.path(),
            "cli-tool",
            "name = \"cli-tool\"\nversion = \"1.0.0\"\ndescription = \"d\"\ntags = [\"cli\"]\n",
        );

        let catalog = Catalog::load(source.path()).unwrap();
        assert_eq!(catalog.search("service", &[]).len(), 1);
        assert_eq!(catalog.search("", &["cli".to_string()]).len(), 1);
        assert_eq!(catalog.search("", &[]).len(), 2);
        assert!(catalog.search("service", &["cli".to_string()]).is_empty());
    }

    #[test]
    fn render_config_defaults_to_template_subdirectory() {
        let source = TempDir::new().unwrap();
        write_block(
            source.path(),
            "plain",
            "name = \"plain\"\nversion = \"0.1.0\"\ndescription = \"d\"\n",
        );

        let catalog = Catalog::load(source.path()).unwrap();
        let config = catalog
            .find("plain")
            .unwrap()
            .render_config(serde_json::json!({}));
        assert_eq!(
            config.base_path,
            source.path().join("blocks/plain/template")
        );
        assert!(config.patterns.is_empty());
    }
}
