use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum PackError {
    #[error("couldn't create directory {path:?}")]
    CreateDir {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't copy {from:?} to {to:?}")]
    CopyTree {
        from: PathBuf,
        to: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("couldn't read map file {path:?}")]
    ReadMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("map file {path:?} is not valid JSON")]
    ParseMap {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("couldn't save output map {path:?}: {source}")]
    WriteMap {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("sourceFile must be a string path, found {found}")]
    InvalidSourceFile { found: String },

    #[error("sourceFile {0:?} has no directory to copy")]
    NoSourceDirectory(String),

    #[error("map path {0:?} has no file name")]
    NoFileName(PathBuf),
}
