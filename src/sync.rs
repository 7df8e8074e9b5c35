//! Template source synchronisation.
//!
//! A block source is a git repository holding a `blocks/` directory. The
//! sync service is an explicitly constructed, caller-owned instance — there
//! is no process-wide singleton — and each sync attempt reports its outcome
//! as a one-shot [`SyncReport`] result value rather than through an event
//! bus. Version control itself stays external: clone/pull shell out to the
//! `git` binary.

use crate::error::RenderError;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use parking_lot::RwLock;
use std::path::{Path, PathBuf};
use tokio::process::Command;
use tracing::{info, warn};

/// Sync lifecycle of a source.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncStatus {
    /// No sync attempted yet.
    Initial,
    Syncing,
    Synced,
    Error,
}

/// What a successful sync did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SyncAction {
    Cloned,
    Pulled,
}

/// One-shot report for a completed sync attempt.
#[derive(Debug, Clone)]
pub struct SyncReport {
    pub source: String,
    pub action: SyncAction,
    pub finished_at: DateTime<Utc>,
}

/// Supplies the filesystem path to a ready template base directory.
///
/// The rendering engine consumes this seam only; source failures propagate
/// to the engine's caller unchanged.
#[async_trait]
pub trait SourceProvider: Send + Sync {
    async fn ensure_base(&self) -> Result<PathBuf, RenderError>;
}

struct SyncState {
    status: SyncStatus,
    last_report: Option<SyncReport>,
    last_error: Option<String>,
}

/// Git-backed block source.
///
/// Holds a workspace directory (default `~/.blocksmith`) and one source URL;
/// the checkout lives at `<workspace>/<repo-basename>`. Status reads are
/// safe from `&self` while a sync runs.
pub struct GitSource {
    source: String,
    workspace: PathBuf,
    checkout: PathBuf,
    state: RwLock<SyncState>,
}

/// Repository basename with a trailing `.git` stripped.
fn repo_basename(source: &str) -> Option<String> {
    let trimmed = source.trim_end_matches('/');
    let base = trimmed.rsplit(['/', ':']).next()?;
    let base = base.strip_suffix(".git").unwrap_or(base);
    if base.is_empty() {
        None
    } else {
        Some(base.to_string())
    }
}

fn default_workspace() -> Result<PathBuf, RenderError> {
    let dirs = directories::BaseDirs::new()
        .ok_or_else(|| RenderError::Source("could not determine home directory".to_string()))?;
    Ok(dirs.home_dir().join(".blocksmith"))
}

impl GitSource {
    /// Create a source for `source`, checked out under `workspace` (or the
    /// default workspace when `None`).
    pub fn new(source: impl Into<String>, workspace: Option<PathBuf>) -> Result<Self, RenderError> {
        let source = source.into();
        let workspace = match workspace {
            Some(dir) => dir,
            None => default_workspace()?,
        };
        let basename = repo_basename(&source).ok_or_else(|| {
            RenderError::Source(format!("cannot derive repository name from {source:?}"))
        })?;
        let checkout = workspace.join(basename);
        Ok(GitSource {
            source,
            workspace,
            checkout,
            state: RwLock::new(SyncState {
                status: SyncStatus::Initial,
                last_report: None,
                last_error: None,
            }),
        })
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn checkout_dir(&self) -> &Path {
        &self.checkout
    }

    pub fn status(&self) -> SyncStatus {
        self.state.read().status
    }

    pub fn last_report(&self) -> Option<SyncReport> {
        self.state.read().last_report.clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.state.read().last_error.clone()
    }

    /// Clone the source if no checkout exists yet, pull otherwise.
    pub async fn sync(&self) -> Result<SyncReport, RenderError> {
        tokio::fs::create_dir_all(&self.workspace)
            .await
            .map_err(|e| RenderError::Source(format!("workspace unavailable: {e}")))?;
        self.state.write().status = SyncStatus::Syncing;

        let result = if self.checkout.is_dir() {
            self.run_git(&["-C", &self.checkout.to_string_lossy(), "pull", "--ff-only"])
                .await
                .map(|_| SyncAction::Pulled)
        } else {
            self.run_git(&[
                "clone",
                &self.source,
                &self.checkout.to_string_lossy(),
            ])
            .await
            .map(|_| SyncAction::Cloned)
        };

        let mut state = self.state.write();
        match result {
            Ok(action) => {
                let report = SyncReport {
                    source: self.source.clone(),
                    action,
                    finished_at: Utc::now(),
                };
                info!(source = %self.source, ?action, "source synced");
                state.status = SyncStatus::Synced;
                state.last_error = None;
                state.last_report = Some(report.clone());
                Ok(report)
            }
            Err(err) => {
                warn!(source = %self.source, error = %err, "source sync failed");
                state.status = SyncStatus::Error;
                state.last_error = Some(err.to_string());
                Err(err)
            }
        }
    }

    async fn run_git(&self, args: &[&str]) -> Result<(), RenderError> {
        let output = Command::new("git")
            .args(args)
            .output()
            .await
            .map_err(|e| RenderError::Source(format!("failed to launch git: {e}")))?;
        if output.status.success() {
            Ok(())
        } else {
            let stderr = String::from_utf8_lossy(&output.stderr);
            Err(RenderError::Source(format!(
                "git {} failed: {}",
                args.first().copied().unwrap_or("?"),
                stderr.trim()
            )))
        }
    }
}

#[async_trait]
impl SourceProvider for GitSource {
    async fn ensure_base(&self) -> Result<PathBuf, RenderError> {
        if self.status() != SyncStatus::Synced && !self.checkout.is_dir() {
            self.sync().await?;
        }
        Ok(self.checkout.clone())
    }
}

/// A plain local directory used as a block source; no sync step.
pub struct LocalSource {
    base: PathBuf,
}

impl LocalSource {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        LocalSource { base: base.into() }
    }
}

#[async_trait]
impl SourceProvider for LocalSource {
    async fn ensure_base(&self) -> Result<PathBuf, RenderError> {
        if self.base.is_dir() {
            Ok(self.base.clone())
        } else {
            Err(RenderError::Source(format!(
                "source directory {} does not exist",
                self.base.display()
            )))
        }
    }
}
