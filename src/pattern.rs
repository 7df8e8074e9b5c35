//! Glob pattern resolution against a template base directory.
//!
//! Expands an ordered list of glob patterns into a deduplicated set of paths
//! relative to the base. Any match that lexically escapes the base directory
//! is dropped (sandboxing). The escape check is a lexical component
//! normalization only — symbolic links are not resolved, and absolute
//! patterns fail to match under the base; this known gap is deliberate and
//! recorded in DESIGN.md.

use crate::error::RenderError;
use std::collections::HashSet;
use std::path::{Component, Path, PathBuf};
use walkdir::WalkDir;

fn pattern_error(pattern: &Path, detail: impl Into<String>) -> RenderError {
    RenderError::PatternResolution {
        pattern: pattern.display().to_string(),
        detail: detail.into(),
    }
}

/// Lexically normalize a base-relative path, resolving `.` and `..`
/// components. Returns `None` when the path would climb out of the base.
pub(crate) fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(name) => normalized.push(name),
            Component::CurDir => {}
            Component::ParentDir => {
                if !normalized.pop() {
                    return None;
                }
            }
            // Absolute components can never be base-relative.
            Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    Some(normalized)
}

/// Expand `patterns` against `base`, returning existing paths relative to
/// the base directory.
///
/// An empty pattern list means "everything under the base". Each pattern is
/// expanded independently; results are flattened and deduplicated preserving
/// first-seen order. Fails when the base directory does not exist or a
/// pattern is syntactically invalid.
pub fn resolve(base: &Path, patterns: &[String]) -> Result<Vec<PathBuf>, RenderError> {
    let base = dunce::canonicalize(base)
        .map_err(|e| pattern_error(base, format!("base directory unavailable: {e}")))?;
    if !base.is_dir() {
        return Err(pattern_error(&base, "base path is not a directory"));
    }

    if patterns.is_empty() {
        return walk_everything(&base);
    }

    let mut seen = HashSet::new();
    let mut resolved = Vec::new();
    for pattern in patterns {
        for relative in expand_one(&base, pattern)? {
            if seen.insert(relative.clone()) {
                resolved.push(relative);
            }
        }
    }
    Ok(resolved)
}

/// Full-tree expansion used for the default (empty) pattern list.
fn walk_everything(base: &Path) -> Result<Vec<PathBuf>, RenderError> {
    let mut resolved = Vec::new();
    for entry in WalkDir::new(base).min_depth(1) {
        let entry = entry.map_err(|e| pattern_error(base, e.to_string()))?;
        let relative = entry
            .path()
            .strip_prefix(base)
            .map_err(|e| pattern_error(entry.path(), e.to_string()))?;
        resolved.push(relative.to_path_buf());
    }
    Ok(resolved)
}

fn expand_one(base: &Path, pattern: &str) -> Result<Vec<PathBuf>, RenderError> {
    let full_pattern = base.join(pattern);
    let full_pattern = full_pattern.to_str().ok_or_else(|| {
        pattern_error(&full_pattern, "pattern is not valid UTF-8")
    })?;

    let matches = glob::glob(full_pattern).map_err(|e| RenderError::PatternResolution {
        pattern: pattern.to_string(),
        detail: e.to_string(),
    })?;

    let mut expanded = Vec::new();
    for matched in matches {
        let matched = matched.map_err(|e| RenderError::PatternResolution {
            pattern: pattern.to_string(),
            detail: e.to_string(),
        })?;
        // Sandboxing: drop anything that does not stay under the base once
        // `.`/`..` components are resolved.
        let Ok(relative) = matched.strip_prefix(base) else {
            tracing::debug!(path = %matched.display(), "dropping match outside base");
            continue;
        };
        match normalize_relative(relative) {
            Some(normalized) if !normalized.as_os_str().is_empty() => expanded.push(normalized),
            _ => {
                tracing::debug!(path = %matched.display(), "dropping escaping match");
            }
        }
    }
    Ok(expanded)
}
