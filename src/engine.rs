//! Rendering engine and render cache.
//!
//! The engine owns the Node collection produced by one discovery pass and
//! exposes the rebuild/refresh split explicitly: [`TemplateEngine::discover`]
//! pays the full pattern-resolution + read + compile cost, while
//! [`TemplateEngine::rerender`] re-evaluates the already-compiled templates
//! against a new model with zero I/O — the common preview/adjust/preview
//! loop. The cache is only replaced by a fully completed discovery pass;
//! a failed pass leaves the previous collection untouched.
//!
//! Engine methods take `&mut self`: single-writer use is enforced by the
//! borrow checker rather than internal locks.

use crate::error::RenderError;
use crate::tree::Node;
use crate::{output, pattern, tree};
use serde_json::Value;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// One-shot render request: template base, optional glob patterns and the
/// data model. An empty pattern list means the full tree under the base.
#[derive(Debug, Clone)]
pub struct RenderConfig {
    pub base_path: PathBuf,
    pub patterns: Vec<String>,
    pub model: Value,
}

/// Template rendering engine for one template base directory.
#[derive(Debug)]
pub struct TemplateEngine {
    base_path: PathBuf,
    patterns: Vec<String>,
    nodes: Option<Vec<Node>>,
}

impl TemplateEngine {
    pub fn new(base_path: impl Into<PathBuf>, patterns: Vec<String>) -> Self {
        TemplateEngine {
            base_path: base_path.into(),
            patterns,
            nodes: None,
        }
    }

    /// Full discovery pass: resolve patterns, walk the filesystem, compile
    /// and evaluate every template. Replaces the cached collection only on
    /// complete success.
    pub async fn discover(&mut self, model: &Value) -> Result<&[Node], RenderError> {
        let resolved = pattern::resolve(&self.base_path, &self.patterns)?;
        debug!(paths = resolved.len(), base = %self.base_path.display(), "discovery pass");
        let nodes = tree::walk(&self.base_path, &resolved, model).await?;
        info!(nodes = nodes.len(), "discovery pass complete");
        self.nodes = Some(nodes);
        Ok(self.nodes.as_deref().unwrap_or_default())
    }

    /// Re-evaluate the cached collection against a new model, in place.
    /// Touches no filesystem state; fails with `NotRendered` when no
    /// discovery pass has completed yet.
    pub fn rerender(&mut self, model: &Value) -> Result<&[Node], RenderError> {
        let nodes = self.nodes.as_mut().ok_or(RenderError::NotRendered)?;
        for node in nodes.iter_mut() {
            node.rerender(model)?;
        }
        Ok(nodes)
    }

    /// Combined entry point: discover when forced or when nothing is
    /// cached, otherwise rerender.
    pub async fn render(&mut self, model: &Value, force: bool) -> Result<&[Node], RenderError> {
        if force || self.nodes.is_none() {
            self.discover(model).await
        } else {
            self.rerender(model)
        }
    }

    /// Read-only view of the last rendered collection.
    pub fn rendered(&self) -> Result<&[Node], RenderError> {
        self.nodes.as_deref().ok_or(RenderError::NotRendered)
    }

    /// Materialize the last rendered collection under `target_root`.
    pub async fn output(&self, target_root: &Path) -> Result<(), RenderError> {
        let nodes = self.rendered()?;
        output::materialize(nodes, target_root).await
    }
}

/// Convenience for the one-shot case: build an engine, run a discovery pass
/// against the config's model, and return the engine holding the result.
pub async fn render(config: &RenderConfig) -> Result<TemplateEngine, RenderError> {
    let mut engine = TemplateEngine::new(config.base_path.clone(), config.patterns.clone());
    engine.discover(&config.model).await?;
    Ok(engine)
}
