//! Filesystem operations shared by install, backup, and restore
//!
//! Paths are always built with structured joins against the deployment
//! layout; no user-controlled strings are interpolated into paths.

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use chrono::Local;
use nix::unistd::{chown, Gid, Uid};
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{Result, StackError};

/// Timestamp suffix used for rename-aside archives and snapshot names.
pub fn timestamp() -> String {
    Local::now().format("%Y%m%d-%H%M%S").to_string()
}

/// Recursively copy `src` into `dst` (created if absent).
///
/// Symlinks are followed; the stack's trees contain only plain files and
/// directories.
pub fn copy_tree(src: &Path, dst: &Path) -> Result<()> {
    fs::create_dir_all(dst).map_err(|e| StackError::io(dst, e))?;
    for entry in fs::read_dir(src).map_err(|e| StackError::io(src, e))? {
        let entry = entry.map_err(|e| StackError::io(src, e))?;
        let target = dst.join(entry.file_name());
        let ty = entry.file_type().map_err(|e| StackError::io(entry.path(), e))?;
        if ty.is_dir() {
            copy_tree(&entry.path(), &target)?;
        } else {
            fs::copy(entry.path(), &target).map_err(|e| StackError::io(entry.path(), e))?;
        }
    }
    Ok(())
}

/// Remove `path` if it exists, then copy `src` in its place.
///
/// Used by restore: live subtrees are replaced, never merged.
pub fn replace_tree(src: &Path, dst: &Path) -> Result<()> {
    if dst.exists() {
        fs::remove_dir_all(dst).map_err(|e| StackError::io(dst, e))?;
    }
    copy_tree(src, dst)
}

/// Rename `path` aside with a timestamp suffix, returning the archive path.
pub fn rename_aside(path: &Path) -> Result<PathBuf> {
    let archived = PathBuf::from(format!("{}.bak-{}", path.display(), timestamp()));
    fs::rename(path, &archived).map_err(|e| StackError::io(path, e))?;
    debug!(from = %path.display(), to = %archived.display(), "archived existing tree");
    Ok(archived)
}

/// Set directory mode 755 / file mode 644 on everything under `root`.
pub fn normalize_modes(root: &Path) -> Result<()> {
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            StackError::io(path, e.into())
        })?;
        let mode = if entry.file_type().is_dir() { 0o755 } else { 0o644 };
        fs::set_permissions(entry.path(), fs::Permissions::from_mode(mode))
            .map_err(|e| StackError::io(entry.path(), e))?;
    }
    Ok(())
}

/// Recursively chown everything under `root` to `uid:gid`.
pub fn chown_tree(root: &Path, uid: u32, gid: u32) -> Result<()> {
    for entry in WalkDir::new(root) {
        let entry = entry.map_err(|e| {
            let path = e.path().unwrap_or(root).to_path_buf();
            StackError::io(path, e.into())
        })?;
        chown(
            entry.path(),
            Some(Uid::from_raw(uid)),
            Some(Gid::from_raw(gid)),
        )
        .map_err(|e| StackError::io(entry.path(), std::io::Error::from(e)))?;
    }
    Ok(())
}

/// Set a single directory's mode.
pub fn set_mode(path: &Path, mode: u32) -> Result<()> {
    fs::set_permissions(path, fs::Permissions::from_mode(mode))
        .map_err(|e| StackError::io(path, e))
}

/// Total size in bytes of all files under `root`.
pub fn dir_size(root: &Path) -> u64 {
    WalkDir::new(root)
        .into_iter()
        .filter_map(|e| e.ok())
        .filter(|e| e.file_type().is_file())
        .filter_map(|e| e.metadata().ok())
        .map(|m| m.len())
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_copy_tree_recursive() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        fs::create_dir_all(src.join("nested")).unwrap();
        fs::write(src.join("a.txt"), "alpha").unwrap();
        fs::write(src.join("nested/b.txt"), "beta").unwrap();

        let dst = dir.path().join("dst");
        copy_tree(&src, &dst).unwrap();

        assert_eq!(fs::read_to_string(dst.join("a.txt")).unwrap(), "alpha");
        assert_eq!(
            fs::read_to_string(dst.join("nested/b.txt")).unwrap(),
            "beta"
        );
    }

    #[test]
    fn test_replace_tree_is_full_replacement() {
        let dir = tempdir().unwrap();
        let src = dir.path().join("src");
        let dst = dir.path().join("dst");
        fs::create_dir_all(&src).unwrap();
        fs::create_dir_all(&dst).unwrap();
        fs::write(src.join("keep.txt"), "new").unwrap();
        fs::write(dst.join("stale.txt"), "old").unwrap();

        replace_tree(&src, &dst).unwrap();

        assert!(dst.join("keep.txt").is_file());
        assert!(!dst.join("stale.txt").exists(), "replace must not merge");
    }

    #[test]
    fn test_rename_aside_preserves_contents() {
        let dir = tempdir().unwrap();
        let target = dir.path().join("deploy");
        fs::create_dir_all(&target).unwrap();
        fs::write(target.join("data.txt"), "precious").unwrap();

        let archived = rename_aside(&target).unwrap();

        assert!(!target.exists());
        assert!(archived
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("deploy.bak-"));
        assert_eq!(
            fs::read_to_string(archived.join("data.txt")).unwrap(),
            "precious"
        );
    }

    #[test]
    fn test_normalize_modes() {
        let dir = tempdir().unwrap();
        let sub = dir.path().join("sub");
        fs::create_dir_all(&sub).unwrap();
        let file = sub.join("f.txt");
        fs::write(&file, "x").unwrap();
        fs::set_permissions(&file, fs::Permissions::from_mode(0o600)).unwrap();

        normalize_modes(dir.path()).unwrap();

        let dir_mode = fs::metadata(&sub).unwrap().permissions().mode() & 0o777;
        let file_mode = fs::metadata(&file).unwrap().permissions().mode() & 0o777;
        assert_eq!(dir_mode, 0o755);
        assert_eq!(file_mode, 0o644);
    }

    #[test]
    fn test_dir_size_sums_files() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a"), vec![0u8; 100]).unwrap();
        fs::create_dir(dir.path().join("d")).unwrap();
        fs::write(dir.path().join("d/b"), vec![0u8; 50]).unwrap();
        assert_eq!(dir_size(dir.path()), 150);
    }
}
