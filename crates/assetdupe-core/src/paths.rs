//! Root normalization and containment checks.

use std::path::{Component, Path, PathBuf};

use crate::error::ScanError;

/// Normalize requested roots.
///
/// Each root is trimmed and made absolute against the current directory
/// with `.` and `..` resolved lexically (symlinks are not followed).
/// Blank roots are dropped, as are duplicates and roots nested inside
/// another requested root, so no file can be collected twice.
pub fn normalize_roots(roots: &[PathBuf]) -> Result<Vec<PathBuf>, ScanError> {
    let mut kept: Vec<PathBuf> = Vec::new();

    for root in roots {
        let trimmed = match root.to_str() {
            Some(s) => PathBuf::from(s.trim()),
            None => root.clone(),
        };
        if trimmed.as_os_str().is_empty() {
            continue;
        }

        let absolute = lexical_absolute(&trimmed)?;
        if kept.iter().any(|k| absolute.starts_with(k)) {
            continue;
        }
        kept.retain(|k| !k.starts_with(&absolute));
        kept.push(absolute);
    }

    if kept.is_empty() {
        return Err(ScanError::NoRoots);
    }
    Ok(kept)
}

/// Check that `path` lies strictly below one of `roots`.
///
/// Both sides are compared lexically; a path equal to a root, or one that
/// climbs out through `..`, does not count.
pub fn is_subpath_of_any_root(path: &Path, roots: &[PathBuf]) -> bool {
    roots.iter().any(|root| {
        path.strip_prefix(root).is_ok_and(|rel| {
            !rel.as_os_str().is_empty() && rel.components().all(|c| matches!(c, Component::Normal(_)))
        })
    })
}

fn lexical_absolute(path: &Path) -> Result<PathBuf, ScanError> {
    let absolute = std::path::absolute(path).map_err(|e| ScanError::io(path, e))?;

    let mut out = PathBuf::new();
    for component in absolute.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    Ok(out)
}
