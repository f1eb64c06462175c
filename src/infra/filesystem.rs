//! Filesystem operations
//!
//! Handles file and directory operations for the build and package trees.

use std::path::{Component, Path, PathBuf};

use walkdir::WalkDir;

use crate::error::FilesystemError;

/// Create a directory and all parent directories
pub fn create_dir_all(path: &Path) -> Result<(), FilesystemError> {
    std::fs::create_dir_all(path).map_err(|e| FilesystemError::CreateDir {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Remove a directory and all its contents
pub fn remove_dir_all(path: &Path) -> Result<(), FilesystemError> {
    if path.exists() {
        std::fs::remove_dir_all(path).map_err(|e| FilesystemError::RemoveDir {
            path: path.to_path_buf(),
            error: e.to_string(),
        })?;
    }
    Ok(())
}

/// Write content to a file
pub fn write_file(path: &Path, content: &str) -> Result<(), FilesystemError> {
    if let Some(parent) = path.parent() {
        create_dir_all(parent)?;
    }
    std::fs::write(path, content).map_err(|e| FilesystemError::WriteFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Read content from a file
pub fn read_file(path: &Path) -> Result<String, FilesystemError> {
    std::fs::read_to_string(path).map_err(|e| FilesystemError::ReadFile {
        path: path.to_path_buf(),
        error: e.to_string(),
    })
}

/// Move a file or directory
pub fn rename(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    std::fs::rename(from, to).map_err(|e| FilesystemError::Rename {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        error: e.to_string(),
    })
}

/// Whether `path` is a directory with at least one entry
pub fn has_entries(path: &Path) -> bool {
    std::fs::read_dir(path).is_ok_and(|mut entries| entries.next().is_some())
}

/// Absolute form of `path` with symlinks and `..` resolved
///
/// The longest existing ancestor is canonicalized and the remaining
/// components are applied lexically, so paths that do not exist yet
/// normalize too.
pub fn normalize_path(path: &Path) -> PathBuf {
    let components: Vec<Component<'_>> = path.components().collect();
    let mut split = components.len();
    let mut resolved = loop {
        if split == 0 {
            break std::env::current_dir().unwrap_or_default();
        }
        let prefix: PathBuf = components[..split].iter().collect();
        if let Ok(canonical) = std::fs::canonicalize(&prefix) {
            break canonical;
        }
        split -= 1;
    };

    for component in &components[split..] {
        match component {
            Component::ParentDir => {
                resolved.pop();
            }
            Component::Normal(name) => resolved.push(name),
            Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
        }
    }
    resolved
}

/// Copy a single file, creating the destination's parent directories
pub fn copy_file(from: &Path, to: &Path) -> Result<(), FilesystemError> {
    if let Some(parent) = to.parent() {
        create_dir_all(parent)?;
    }
    std::fs::copy(from, to)
        .map(|_| ())
        .map_err(|e| FilesystemError::CopyFile {
            from: from.to_path_buf(),
            to: to.to_path_buf(),
            error: e.to_string(),
        })
}

/// Copy a directory tree, skipping excluded subtrees
///
/// `exclude` holds paths under `from` (absolute, or relative to `from`)
/// whose whole subtree is left behind. Returns the number of files copied.
pub fn copy_tree(from: &Path, to: &Path, exclude: &[PathBuf]) -> Result<usize, FilesystemError> {
    let excluded: Vec<PathBuf> = exclude
        .iter()
        .map(|path| {
            if path.is_absolute() {
                path.clone()
            } else {
                from.join(path)
            }
        })
        .collect();

    create_dir_all(to)?;
    let mut copied = 0;
    let walker = WalkDir::new(from)
        .min_depth(1)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| !excluded.iter().any(|skip| entry.path() == skip));

    for entry in walker {
        let entry = entry.map_err(|e| FilesystemError::ReadFile {
            path: from.to_path_buf(),
            error: e.to_string(),
        })?;
        let relative = entry.path().strip_prefix(from).unwrap_or(entry.path());
        let target = to.join(relative);
        if entry.file_type().is_dir() {
            create_dir_all(&target)?;
        } else {
            copy_file(entry.path(), &target)?;
            copied += 1;
        }
    }
    Ok(copied)
}
