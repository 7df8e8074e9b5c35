//! Template tree construction.
//!
//! Builds the in-memory Node collection for a discovery pass: one task per
//! resolved path, each stating the path, compiling every segment's name
//! template and, for files, reading the content exactly once and compiling
//! its content template. Paths are mutually independent, so the whole walk
//! fans out concurrently; the first failure aborts the pass (a scaffold is
//! all-or-nothing — no partial trees).

use crate::error::RenderError;
use crate::template::{ContentTemplate, NameTemplate};
use futures::future::try_join_all;
use serde_json::Value;
use std::path::{Path, PathBuf};

/// File-only payload of a node.
#[derive(Debug, Clone)]
pub struct FilePayload {
    /// Original file text, read from disk once per discovery pass.
    raw_content: String,
    content_template: ContentTemplate,
    /// Last-rendered content; replaced on each render call.
    rendered_content: String,
}

/// Node kind and payload.
#[derive(Debug, Clone)]
pub enum NodeKind {
    Directory,
    File(FilePayload),
}

/// One file or directory from the template source.
///
/// Structure (`origin_path`, `raw_name`, compiled templates) is fixed once a
/// discovery pass completes; only `output_path` and the file payload's
/// `rendered_content` change across repeated renders.
#[derive(Debug, Clone)]
pub struct Node {
    /// Path relative to the template base; immutable once set.
    origin_path: PathBuf,
    /// Final path segment as it appears in the template source.
    raw_name: String,
    /// One compiled name template per segment of `origin_path`. The last
    /// entry is the node's own name; ancestors are needed because a
    /// parameterized directory name changes every descendant's output path.
    segment_templates: Vec<NameTemplate>,
    /// Last-rendered output path, relative to the caller's target root.
    /// Not guaranteed unique across nodes; collisions resolve by write order.
    output_path: PathBuf,
    kind: NodeKind,
}

impl Node {
    pub fn origin_path(&self) -> &Path {
        &self.origin_path
    }

    pub fn raw_name(&self) -> &str {
        &self.raw_name
    }

    /// Compiled template for the node's own name segment.
    pub fn name_template(&self) -> &NameTemplate {
        self.segment_templates
            .last()
            .expect("origin path has at least one segment")
    }

    pub fn output_path(&self) -> &Path {
        &self.output_path
    }

    pub fn is_directory(&self) -> bool {
        matches!(self.kind, NodeKind::Directory)
    }

    pub fn kind(&self) -> &NodeKind {
        &self.kind
    }

    /// Original file text; `None` for directories.
    pub fn raw_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File(payload) => Some(&payload.raw_content),
            NodeKind::Directory => None,
        }
    }

    /// Last-rendered file content; `None` for directories.
    pub fn rendered_content(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::File(payload) => Some(&payload.rendered_content),
            NodeKind::Directory => None,
        }
    }

    /// Depth of the output path in segments; materialization orders by this.
    pub fn output_depth(&self) -> usize {
        self.output_path.components().count()
    }

    fn render_output_path(&self, model: &Value) -> Result<PathBuf, RenderError> {
        let mut rendered = PathBuf::new();
        for template in &self.segment_templates {
            rendered.push(template.render(model)?);
        }
        Ok(rendered)
    }

    /// Re-evaluate the node's compiled templates against a new model,
    /// replacing `output_path` and (for files) `rendered_content` in place.
    /// Touches no filesystem state.
    pub(crate) fn rerender(&mut self, model: &Value) -> Result<(), RenderError> {
        self.output_path = self.render_output_path(model)?;
        if let NodeKind::File(payload) = &mut self.kind {
            payload.rendered_content = payload.content_template.render(model)?;
        }
        Ok(())
    }
}

/// Build the Node collection for `relative_paths` under `base`, evaluating
/// every compiled template against `model` for the initial render.
pub async fn walk(
    base: &Path,
    relative_paths: &[PathBuf],
    model: &Value,
) -> Result<Vec<Node>, RenderError> {
    try_join_all(
        relative_paths
            .iter()
            .map(|relative| build_node(base, relative, model)),
    )
    .await
}

async fn build_node(base: &Path, relative: &Path, model: &Value) -> Result<Node, RenderError> {
    let full_path = base.join(relative);
    let metadata = tokio::fs::metadata(&full_path)
        .await
        .map_err(|e| RenderError::filesystem(&full_path, e))?;

    let segment_templates = relative
        .components()
        .map(|c| NameTemplate::compile(&c.as_os_str().to_string_lossy()))
        .collect::<Result<Vec<_>, _>>()?;
    let raw_name = segment_templates
        .last()
        .map(|t| t.raw().to_string())
        .unwrap_or_default();

    let kind = if metadata.is_dir() {
        NodeKind::Directory
    } else {
        let raw_content = tokio::fs::read_to_string(&full_path)
            .await
            .map_err(|e| RenderError::filesystem(&full_path, e))?;
        let content_template = ContentTemplate::compile(&raw_content)?;
        let rendered_content = content_template.render(model)?;
        NodeKind::File(FilePayload {
            raw_content,
            content_template,
            rendered_content,
        })
    };

    let mut node = Node {
        origin_path: relative.to_path_buf(),
        raw_name,
        segment_templates,
        output_path: PathBuf::new(),
        kind,
    };
    node.output_path = node.render_output_path(model)?;
    Ok(node)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;
    use tempfile::TempDir;

    fn write(base: &Path, relative: &str, content: &str) {
        let full = base.join(relative);
        fs::create_dir_all(full.parent().unwrap()).unwrap();
        fs::write(full, content).unwrap();
    }

    #[tokio::test]
    async fn builds_directory_and_file_nodes() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "[name]/index.txt", "Hello <%= name %>");

        let paths = vec![PathBuf::from("[name]"), PathBuf::from("[name]/index.txt")];
        let model = json!({"name": "acme"});
        let nodes = walk(dir.path(), &paths, &model).await.unwrap();

        assert_eq!(nodes.len(), 2);
        let dir_node = &nodes[0];
        assert!(dir_node.is_directory());
        assert_eq!(dir_node.raw_name(), "[name]");
        assert_eq!(dir_node.output_path(), Path::new("acme"));
        assert!(dir_node.rendered_content().is_none());

        let file_node = &nodes[1];
        assert!(!file_node.is_directory());
        assert_eq!(file_node.output_path(), Path::new("acme/index.txt"));
        assert_eq!(file_node.rendered_content(), Some("Hello acme"));
        assert_eq!(file_node.raw_content(), Some("Hello <%= name %>"));
    }

    #[tokio::test]
    async fn ancestor_placeholder_renders_into_descendant_output() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "[mod]/src/lib.rs", "pub mod <%= mod %>;");

        let paths = vec![PathBuf::from("[mod]/src/lib.rs")];
        let nodes = walk(dir.path(), &paths, &json!({"mod": "parser"}))
            .await
            .unwrap();
        assert_eq!(nodes[0].output_path(), Path::new("parser/src/lib.rs"));
    }

    #[tokio::test]
    async fn missing_path_aborts_walk() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "present.txt", "ok");

        let paths = vec![PathBuf::from("present.txt"), PathBuf::from("absent.txt")];
        let err = walk(dir.path(), &paths, &json!({})).await.unwrap_err();
        assert!(matches!(err, RenderError::Filesystem { .. }));
    }

    #[tokio::test]
    async fn template_syntax_failure_aborts_walk() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "broken.txt", "oops <%= name");

        let err = walk(dir.path(), &[PathBuf::from("broken.txt")], &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateSyntax { .. }));
    }

    #[tokio::test]
    async fn unresolved_name_placeholder_aborts_walk() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "[name].txt", "body");

        let err = walk(dir.path(), &[PathBuf::from("[name].txt")], &json!({}))
            .await
            .unwrap_err();
        assert!(matches!(err, RenderError::TemplateEvaluation { .. }));
    }

    #[tokio::test]
    async fn rerender_updates_output_without_filesystem() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "[name].txt", "Hi <%= name %>");

        let mut nodes = walk(dir.path(), &[PathBuf::from("[name].txt")], &json!({"name": "a"}))
            .await
            .unwrap();

        // Remove the source; rerender must not notice.
        fs::remove_file(dir.path().join("[name].txt")).unwrap();

        nodes[0].rerender(&json!({"name": "b"})).unwrap();
        assert_eq!(nodes[0].output_path(), Path::new("b.txt"));
        assert_eq!(nodes[0].rendered_content(), Some("Hi b"));
    }
}
