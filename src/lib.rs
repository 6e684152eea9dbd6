//! Packs map files and the assets they reference into a single
//! self-contained directory.
//!
//! Every distinct directory referenced through a `sourceFile` field is
//! copied once into `<system-root>/map-assets/<uuid>/`, and the maps are
//! written to the system root with their references rewritten.

pub mod args;
pub mod error;
pub mod logging;
pub mod map;
pub mod packer;
pub mod relocator;

pub use error::PackError;
pub use packer::{MapOutcome, MapPacker, PackReport};
pub use relocator::AssetRelocator;
