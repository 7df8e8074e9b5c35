//! Error taxonomy for the rendering engine and its collaborators.
//!
//! Every failure aborts the in-flight pass (discovery or materialization) and
//! carries enough context (offending path and/or raw template text) to
//! diagnose without re-running under verbose logging. The engine never
//! retries and never swallows an error.

use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the rendering engine and the source/catalog collaborators.
#[derive(Debug, Error)]
pub enum RenderError {
    /// A glob pattern failed to parse, or the template base directory is
    /// missing or not a directory.
    #[error("pattern resolution failed for {pattern:?}: {detail}")]
    PatternResolution { pattern: String, detail: String },

    /// A name or content template failed to parse.
    #[error("template failed to parse: {detail} (in {raw:?})")]
    TemplateSyntax { raw: String, detail: String },

    /// A template referenced a model path that resolved to null or nothing.
    #[error("model path {path:?} resolved to no value")]
    TemplateEvaluation { path: String },

    /// Stat/read failure during a discovery pass, wrapped with the offending path.
    #[error("filesystem operation failed at {path}: {source}")]
    Filesystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `rendered`/`output` called before any successful render.
    #[error("render has not been called yet")]
    NotRendered,

    /// Write-phase failure. Partial output on disk is possible and is not
    /// rolled back.
    #[error("materialization failed at {path}: {source}")]
    Materialization {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Source sync failure (clone/pull or an unusable checkout).
    #[error("source sync failed: {0}")]
    Source(String),

    /// Block catalog failure (missing blocks directory, unreadable block config).
    #[error("block catalog error: {0}")]
    Catalog(String),
}

impl RenderError {
    /// Wrap an I/O error from the discovery phase with the path it hit.
    pub fn filesystem(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Filesystem {
            path: path.into(),
            source,
        }
    }

    /// Wrap an I/O error from the write phase with the path it hit.
    pub fn materialization(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        RenderError::Materialization {
            path: path.into(),
            source,
        }
    }
}
