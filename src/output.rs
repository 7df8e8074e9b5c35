//! Output materialization.
//!
//! Writes a rendered Node collection under a target root. Nodes are grouped
//! by output-path depth and written level by level, shallowest first, so a
//! directory always exists before anything nested under it; nodes at the
//! same depth are independent and write concurrently. Directory creation is
//! idempotent and files overwrite (last write wins). Nothing is rolled back
//! on failure — partial output is a documented limitation.

use crate::error::RenderError;
use crate::tree::{Node, NodeKind};
use futures::future::try_join_all;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::debug;

/// Materialize `nodes` under `target_root`.
pub async fn materialize(nodes: &[Node], target_root: &Path) -> Result<(), RenderError> {
    tokio::fs::create_dir_all(target_root)
        .await
        .map_err(|e| RenderError::materialization(target_root, e))?;

    let mut levels: BTreeMap<usize, Vec<&Node>> = BTreeMap::new();
    for node in nodes {
        levels.entry(node.output_depth()).or_default().push(node);
    }

    for (depth, level) in levels {
        debug!(depth, nodes = level.len(), "writing output level");
        try_join_all(level.into_iter().map(|node| write_node(node, target_root))).await?;
    }
    Ok(())
}

async fn write_node(node: &Node, target_root: &Path) -> Result<(), RenderError> {
    let destination = target_root.join(node.output_path());
    match node.kind() {
        NodeKind::Directory => tokio::fs::create_dir_all(&destination)
            .await
            .map_err(|e| RenderError::materialization(&destination, e)),
        NodeKind::File(_) => {
            // A file's parent may not itself be a matched node (pattern
            // matched the file but not its directory); create it on demand.
            if let Some(parent) = destination.parent() {
                tokio::fs::create_dir_all(parent)
                    .await
                    .map_err(|e| RenderError::materialization(parent, e))?;
            }
            let content = node.rendered_content().unwrap_or_default();
            tokio::fs::write(&destination, content)
                .await
                .map_err(|e| RenderError::materialization(&destination, e))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{pattern, tree};
    use serde_json::json;
    use std::fs;
    use std::path::PathBuf;
    use tempfile::TempDir;

    async fn rendered_nodes(base: &Path, model: &serde_json::Value) -> Vec<Node> {
        let paths = pattern::resolve(base, &[]).unwrap();
        tree::walk(base, &paths, model).await.unwrap()
    }

    fn write(base: &Path, relative: &str, content: &str) {
        let full = base.join(relative);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[tokio::test]
    async fn writes_directories_before_nested_files() {
        let source = TempDir::new().unwrap();
        write(source.path(), "[name]/deep/nested/file.txt", "x <%= name %>");

        let nodes = rendered_nodes(source.path(), &json!({"name": "out"})).await;
        let target = TempDir::new().unwrap();
        materialize(&nodes, target.path()).await.unwrap();

        let written = target.path().join("out/deep/nested/file.txt");
        assert_eq!(fs::read_to_string(written).unwrap(), "x out");
        assert!(target.path().join("out/deep/nested").is_dir());
    }

    #[tokio::test]
    async fn materialization_is_idempotent() {
        let source = TempDir::new().unwrap();
        write(source.path(), "dir/file.txt", "stable");

        let nodes = rendered_nodes(source.path(), &json!({})).await;
        let target = TempDir::new().unwrap();
        materialize(&nodes, target.path()).await.unwrap();
        materialize(&nodes, target.path()).await.unwrap();

        assert_eq!(
            fs::read_to_string(target.path().join("dir/file.txt")).unwrap(),
            "stable"
        );
    }

    #[tokio::test]
    async fn existing_target_files_are_overwritten() {
        let source = TempDir::new().unwrap();
        write(source.path(), "file.txt", "new");

        let target = TempDir::new().unwrap();
        fs::write(target.path().join("file.txt"), "old").unwrap();

        let nodes = rendered_nodes(source.path(), &json!({})).await;
        materialize(&nodes, target.path()).await.unwrap();
        assert_eq!(
            fs::read_to_string(target.path().join("file.txt")).unwrap(),
            "new"
        );
    }

    #[tokio::test]
    async fn file_parent_is_created_even_without_directory_node() {
        let source = TempDir::new().unwrap();
        write(source.path(), "sub/file.txt", "content");

        // Resolve only the file, not its directory.
        let paths = vec![PathBuf::from("sub/file.txt")];
        let nodes = tree::walk(source.path(), &paths, &json!({})).await.unwrap();

        let target = TempDir::new().unwrap();
        materialize(&nodes, target.path()).await.unwrap();
        assert_eq!(
            fs::read_to_string(target.path().join("sub/file.txt")).unwrap(),
            "content"
        );
    }

    #[tokio::test]
    async fn write_failure_surfaces_materialization_error() {
        let source = TempDir::new().unwrap();
        write(source.path(), "dir/file.txt", "content");

        let nodes = rendered_nodes(source.path(), &json!({})).await;
        let target = TempDir::new().unwrap();
        // Occupy the directory's output path with a file so create_dir_all fails.
        fs::write(target.path().join("dir"), "in the way").unwrap();

        let err = materialize(&nodes, target.path()).await.unwrap_err();
        assert!(matches!(err, RenderError::Materialization { .. }));
    }
}
