//! Packs a list of map files into a system root.

use std::{
    collections::HashMap,
    ffi::OsString,
    fs,
    path::{Path, PathBuf},
};

use serde_json::Value;

use crate::{
    error::PackError,
    map::{ArrayWalk, rewrite_source_files},
    relocator::AssetRelocator,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapOutcome {
    Written(PathBuf),
    /// The same argument was already packed earlier in this run.
    Duplicate,
    /// The map was rewritten but saving it failed. The run carries on.
    WriteFailed(PathBuf),
}

#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PackReport {
    pub written: Vec<PathBuf>,
    pub duplicates: usize,
    pub write_failures: Vec<PathBuf>,
    pub asset_dirs: usize,
}

pub struct MapPacker {
    system_root: PathBuf,
    arrays: ArrayWalk,
    relocator: AssetRelocator,
    /// Map arguments, exactly as given, to their output paths.
    processed: HashMap<OsString, PathBuf>,
}

impl MapPacker {
    pub fn new(
        system_root: impl Into<PathBuf>,
        assets_dir: impl Into<PathBuf>,
        arrays: ArrayWalk,
    ) -> Self {
        let system_root = system_root.into();
        Self {
            relocator: AssetRelocator::new(system_root.clone(), assets_dir),
            system_root,
            arrays,
            processed: HashMap::new(),
        }
    }

    /// Creates the system root and the asset directory inside it.
    pub fn prepare(&self) -> Result<(), PackError> {
        for dir in [self.system_root.clone(), self.relocator.assets_root()] {
            fs::create_dir_all(&dir).map_err(|source| PackError::CreateDir { path: dir, source })?;
        }
        Ok(())
    }

    /// Packs every map in order. Stops at the first fatal error.
    pub fn run<P: AsRef<Path>>(&mut self, maps: &[P]) -> Result<PackReport, PackError> {
        self.prepare()?;

        let mut report = PackReport::default();
        for map_file in maps {
            match self.pack_map(map_file.as_ref())? {
                MapOutcome::Written(path) => report.written.push(path),
                MapOutcome::Duplicate => report.duplicates += 1,
                MapOutcome::WriteFailed(path) => report.write_failures.push(path),
            }
        }
        report.asset_dirs = self.relocator.copied_dir_count();

        log::debug!(
            "packed {} maps ({} duplicates, {} failed writes) with {} asset dirs",
            report.written.len(),
            report.duplicates,
            report.write_failures.len(),
            report.asset_dirs
        );
        Ok(report)
    }

    pub fn pack_map(&mut self, map_file: &Path) -> Result<MapOutcome, PackError> {
        if self.processed.contains_key(map_file.as_os_str()) {
            return Ok(MapOutcome::Duplicate);
        }

        let file_name = map_file
            .file_name()
            .ok_or_else(|| PackError::NoFileName(map_file.to_path_buf()))?;
        let output = self.system_root.join(file_name);
        self.processed
            .insert(map_file.as_os_str().to_owned(), output.clone());

        let mut map = load_map(map_file)?;
        log::info!(
            "have map file: {} => {}",
            map_file.display(),
            output.display()
        );

        let relocator = &mut self.relocator;
        let mut relocate = |source_file: &str| relocator.resolve_asset_path(source_file);
        rewrite_source_files(&mut map, self.arrays, &mut relocate)?;

        match save_map(&output, &map) {
            Ok(()) => Ok(MapOutcome::Written(output)),
            Err(e) => {
                log::error!("{e}");
                Ok(MapOutcome::WriteFailed(output))
            }
        }
    }
}

pub fn load_map(path: &Path) -> Result<Value, PackError> {
    let contents = fs::read_to_string(path).map_err(|source| PackError::ReadMap {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&contents).map_err(|source| PackError::ParseMap {
        path: path.to_path_buf(),
        source,
    })
}

pub fn save_map(path: &Path, map: &Value) -> Result<(), PackError> {
    let write_err = |source: std::io::Error| PackError::WriteMap {
        path: path.to_path_buf(),
        source,
    };
    let contents = serde_json::to_string(map).map_err(|e| write_err(e.into()))?;
    fs::write(path, contents).map_err(write_err)
}

#[cfg(test)]
mod test {
    use super::*;
    use tempfile::TempDir;

    fn init_logger() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn write(path: &Path, contents: &str) {
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn map_referencing(file: &Path) -> String {
        serde_json::json!({ "obj": { "sourceFile": file } }).to_string()
    }

    fn packed_source(output: &Path) -> PathBuf {
        let map = load_map(output).unwrap();
        PathBuf::from(map["obj"]["sourceFile"].as_str().unwrap())
    }

    #[test]
    fn test_shared_directory_across_maps() -> anyhow::Result<()> {
        init_logger();
        let td = TempDir::new()?;
        let dir1 = td.path().join("dir1");
        write(&dir1.join("x.png"), "x");
        write(&dir1.join("y.png"), "y");
        let a = td.path().join("maps/a.json");
        let b = td.path().join("maps/b.json");
        write(&a, &map_referencing(&dir1.join("x.png")));
        write(&b, &map_referencing(&dir1.join("y.png")));

        let root = td.path().join("out");
        let mut packer = MapPacker::new(&root, "map-assets", ArrayWalk::Skip);
        let report = packer.run(&[&a, &b])?;

        assert_eq!(report.written, vec![root.join("a.json"), root.join("b.json")]);
        assert_eq!(report.asset_dirs, 1);

        let x = packed_source(&root.join("a.json"));
        let y = packed_source(&root.join("b.json"));
        assert!(x.starts_with("map-assets"));
        assert_eq!(x.parent(), y.parent());
        assert_eq!(x.file_name().unwrap(), "x.png");
        assert_eq!(y.file_name().unwrap(), "y.png");
        assert_eq!(fs::read_to_string(root.join(&x))?, "x");
        assert_eq!(fs::read_to_string(root.join(&y))?, "y");
        assert_eq!(fs::read_dir(root.join("map-assets"))?.count(), 1);
        Ok(())
    }

    #[test]
    fn test_duplicate_argument_packed_once() -> anyhow::Result<()> {
        let td = TempDir::new()?;
        write(&td.path().join("tex/x.png"), "x");
        let a = td.path().join("a.json");
        write(&a, &map_referencing(&td.path().join("tex/x.png")));

        let root = td.path().join("out");
        let mut packer = MapPacker::new(&root, "map-assets", ArrayWalk::Skip);
        let report = packer.run(&[&a, &a])?;

        assert_eq!(report.written.len(), 1);
        assert_eq!(report.duplicates, 1);
        assert_eq!(report.asset_dirs, 1);
        Ok(())
    }

    #[test]
    fn test_missing_source_aborts_run() -> anyhow::Result<()> {
        let td = TempDir::new()?;
        let a = td.path().join("a.json");
        let b = td.path().join("b.json");
        write(&a, &map_referencing(&td.path().join("missing/x.png")));
        write(&b, r#"{"plain": true}"#);

        let root = td.path().join("out");
        let mut packer = MapPacker::new(&root, "map-assets", ArrayWalk::Skip);
        let err = packer.run(&[&a, &b]).unwrap_err();

        assert!(matches!(err, PackError::CopyTree { .. }));
        assert!(!root.join("a.json").exists());
        assert!(!root.join("b.json").exists());
        Ok(())
    }

    #[test]
    fn test_invalid_json_aborts_run() -> anyhow::Result<()> {
        let td = TempDir::new()?;
        let a = td.path().join("a.json");
        write(&a, "{ not json");

        let mut packer = MapPacker::new(td.path().join("out"), "map-assets", ArrayWalk::Skip);
        let err = packer.run(&[&a]).unwrap_err();
        assert!(matches!(err, PackError::ParseMap { .. }));
        Ok(())
    }

    #[test]
    fn test_write_failure_continues() -> anyhow::Result<()> {
        init_logger();
        let td = TempDir::new()?;
        let root = td.path().join("out");
        // A directory where the output file should go makes the write fail.
        fs::create_dir_all(root.join("a.json"))?;

        let a = td.path().join("maps/a.json");
        let b = td.path().join("maps/b.json");
        write(&a, r#"{"plain": true}"#);
        write(&b, r#"{"plain": false}"#);

        let mut packer = MapPacker::new(&root, "map-assets", ArrayWalk::Skip);
        let report = packer.run(&[&a, &b])?;

        assert_eq!(report.write_failures, vec![root.join("a.json")]);
        assert_eq!(report.written, vec![root.join("b.json")]);
        assert_eq!(fs::read_to_string(root.join("b.json"))?, r#"{"plain":false}"#);
        Ok(())
    }

    #[test]
    fn test_write_failure_names_cause() -> anyhow::Result<()> {
        let td = TempDir::new()?;
        let output = td.path().join("a.json");
        fs::create_dir_all(&output)?;
        let cause = fs::write(&output, "").unwrap_err().to_string();

        let err = save_map(&output, &serde_json::json!({})).unwrap_err();
        assert!(matches!(err, PackError::WriteMap { .. }));
        let message = err.to_string();
        assert!(message.ends_with(&cause), "{message}");
        assert_eq!(message.matches("a.json").count(), 1, "{message}");
        Ok(())
    }

    #[test]
    fn test_second_run_gets_fresh_asset_dirs() -> anyhow::Result<()> {
        let td = TempDir::new()?;
        write(&td.path().join("tex/x.png"), "x");
        let a = td.path().join("maps/a.json");
        write(&a, &map_referencing(&td.path().join("tex/x.png")));
        let root = td.path().join("out");

        MapPacker::new(&root, "map-assets", ArrayWalk::Skip).run(&[&a])?;
        let first = packed_source(&root.join("a.json"));
        MapPacker::new(&root, "map-assets", ArrayWalk::Skip).run(&[&a])?;
        let second = packed_source(&root.join("a.json"));

        assert_ne!(first.parent(), second.parent());
        assert_eq!(first.file_name(), second.file_name());
        assert_eq!(fs::read_dir(root.join("map-assets"))?.count(), 2);
        assert_eq!(fs::read_to_string(root.join(&first))?, "x");
        assert_eq!(fs::read_to_string(root.join(&second))?, "x");
        Ok(())
    }

    #[test]
    fn test_custom_assets_dir() -> anyhow::Result<()> {
        let td = TempDir::new()?;
        write(&td.path().join("tex/x.png"), "x");
        let a = td.path().join("maps/a.json");
        write(&a, &map_referencing(&td.path().join("tex/x.png")));
        let root = td.path().join("out");

        MapPacker::new(&root, "packed", ArrayWalk::Skip).run(&[&a])?;

        let x = packed_source(&root.join("a.json"));
        assert!(x.starts_with("packed"), "{x:?}");
        assert_eq!(fs::read_to_string(root.join(&x))?, "x");
        assert!(!root.join("map-assets").exists());
        Ok(())
    }

    #[test]
    fn test_prepare_tolerates_existing_dirs() -> anyhow::Result<()> {
        let td = TempDir::new()?;
        let root = td.path().join("out");
        let packer = MapPacker::new(&root, "map-assets", ArrayWalk::Skip);
        packer.prepare()?;
        packer.prepare()?;
        assert!(root.join("map-assets").is_dir());
        Ok(())
    }
}
