use std::path::PathBuf;

use clap::{CommandFactory, Parser};

pub const DEFAULT_ASSETS_DIR: &str = "map-assets";

/// Copies the assets referenced by map files into a flat asset tree
/// and rewrites the maps to point at the copies.
#[derive(Parser, Debug, Clone)]
#[command(name = "packmap", version, about, long_about = None)]
pub struct Cli {
    /// Output directory for rewritten maps and the asset tree.
    pub system_root: Option<PathBuf>,

    /// Map files to pack. Repeated paths are only packed once.
    pub maps: Vec<PathBuf>,

    /// Name of the asset directory created inside the system root.
    #[arg(long, env = "PACKMAP_ASSETS_DIR", default_value = DEFAULT_ASSETS_DIR)]
    pub assets_dir: PathBuf,

    /// Also look for `sourceFile` references inside arrays.
    ///
    /// Off by default, so only objects nested directly in objects are visited.
    #[arg(long, env = "PACKMAP_WALK_ARRAYS")]
    pub walk_arrays: bool,
}

impl Cli {
    /// The system root and at least one map are required, otherwise
    /// there is nothing to do and the caller should print usage.
    pub fn system_root_and_maps(&self) -> Option<(&PathBuf, &[PathBuf])> {
        match &self.system_root {
            Some(root) if !self.maps.is_empty() => Some((root, &self.maps)),
            _ => None,
        }
    }

    pub fn usage() -> String {
        Self::command().render_usage().to_string()
    }
}
