//! Copies asset directories into the packed asset tree.
//!
//! Assets are relocated a whole directory at a time: textures and meshes
//! that live next to each other usually belong together, and sibling files
//! (companion metadata and the like) may be loaded without being named in
//! any map.

use std::{
    collections::HashMap,
    fs,
    path::{Path, PathBuf},
};

use uuid::Uuid;
use walkdir::WalkDir;

use crate::error::PackError;

pub struct AssetRelocator {
    system_root: PathBuf,
    assets_dir: PathBuf,
    /// Source directory, as written in the map, to its asset directory
    /// relative to the system root.
    asset_dirs: HashMap<PathBuf, PathBuf>,
}

impl AssetRelocator {
    pub fn new(system_root: impl Into<PathBuf>, assets_dir: impl Into<PathBuf>) -> Self {
        Self {
            system_root: system_root.into(),
            assets_dir: assets_dir.into(),
            asset_dirs: HashMap::new(),
        }
    }

    /// Where copied directories end up on disk.
    pub fn assets_root(&self) -> PathBuf {
        self.system_root.join(&self.assets_dir)
    }

    pub fn copied_dir_count(&self) -> usize {
        self.asset_dirs.len()
    }

    #[cfg(test)]
    pub(crate) fn asset_dir_for(&self, source_dir: &Path) -> Option<&Path> {
        self.asset_dirs.get(source_dir).map(PathBuf::as_path)
    }

    /// Returns the asset directory for `source_dir`, copying it the first
    /// time it is seen.
    pub fn resolve_source_directory(&mut self, source_dir: &Path) -> Result<PathBuf, PackError> {
        if let Some(asset_dir) = self.asset_dirs.get(source_dir) {
            return Ok(asset_dir.clone());
        }

        let id = Uuid::new_v4().to_string();
        let asset_dir = self.assets_dir.join(&id);
        let destination = self.system_root.join(&asset_dir);

        log::info!("dir:  {} => {}", source_dir.display(), asset_dir.display());
        copy_tree(source_dir, &destination)?;

        // Only remember directories that actually made it to disk.
        self.asset_dirs
            .insert(source_dir.to_path_buf(), asset_dir.clone());
        Ok(asset_dir)
    }

    /// Maps an asset path from a map file to its relocated path.
    pub fn resolve_asset_path(&mut self, source_file: &str) -> Result<PathBuf, PackError> {
        let path = Path::new(source_file);
        let source_dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .ok_or_else(|| PackError::NoSourceDirectory(source_file.to_string()))?;
        let file_name = path
            .file_name()
            .ok_or_else(|| PackError::NoSourceDirectory(source_file.to_string()))?;

        let relocated = self.resolve_source_directory(source_dir)?.join(file_name);
        log::info!(
            "file: {} => {}",
            file_name.to_string_lossy(),
            relocated.display()
        );
        Ok(relocated)
    }
}

/// Recursively copies the contents of `from` into `to`, following links so
/// every file is copied by content.
///
/// When `to` lies inside `from` its subtree is left out of the walk.
pub fn copy_tree(from: &Path, to: &Path) -> Result<(), PackError> {
    let copy_err = |source: std::io::Error| PackError::CopyTree {
        from: from.to_path_buf(),
        to: to.to_path_buf(),
        source,
    };

    if !from.is_dir() {
        return Err(copy_err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            "source is not a directory",
        )));
    }

    fs::create_dir_all(to).map_err(copy_err)?;
    let from = from.canonicalize().map_err(copy_err)?;
    let to = to.canonicalize().map_err(copy_err)?;

    let walker = WalkDir::new(&from)
        .follow_links(true)
        .into_iter()
        .filter_entry(|entry| entry.path() != to.as_path());

    for entry in walker {
        let entry = entry.map_err(|e| copy_err(e.into()))?;
        let relative = entry
            .path()
            .strip_prefix(&from)
            .map_err(|e| copy_err(std::io::Error::other(e)))?;
        let target = to.join(relative);

        if entry.file_type().is_dir() {
            fs::create_dir_all(&target).map_err(copy_err)?;
        } else {
            fs::copy(entry.path(), &target).map_err(copy_err)?;
        }
    }

    Ok(())
}
