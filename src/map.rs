//! Rewriting `sourceFile` references inside map documents.

use std::path::PathBuf;

use serde_json::{Map, Value};

use crate::error::PackError;

pub const SOURCE_FILE_KEY: &str = "sourceFile";

/// Whether array elements are searched for reference nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ArrayWalk {
    /// Arrays are treated as leaves.
    #[default]
    Skip,
    Descend,
}

impl From<bool> for ArrayWalk {
    fn from(walk_arrays: bool) -> Self {
        if walk_arrays {
            ArrayWalk::Descend
        } else {
            ArrayWalk::Skip
        }
    }
}

/// Walks `node` depth first and replaces every `sourceFile` value with
/// whatever `relocate` returns for it.
///
/// Nested objects are rewritten before their parent's own `sourceFile`.
pub fn rewrite_source_files<F>(
    node: &mut Value,
    arrays: ArrayWalk,
    relocate: &mut F,
) -> Result<(), PackError>
where
    F: FnMut(&str) -> Result<PathBuf, PackError>,
{
    match node {
        Value::Object(object) => rewrite_object(object, arrays, relocate),
        Value::Array(items) if arrays == ArrayWalk::Descend => {
            for item in items {
                rewrite_source_files(item, arrays, relocate)?;
            }
            Ok(())
        }
        _ => Ok(()),
    }
}

fn rewrite_object<F>(
    object: &mut Map<String, Value>,
    arrays: ArrayWalk,
    relocate: &mut F,
) -> Result<(), PackError>
where
    F: FnMut(&str) -> Result<PathBuf, PackError>,
{
    for child in object.values_mut() {
        match child {
            Value::Object(_) => rewrite_source_files(child, arrays, relocate)?,
            Value::Array(_) if arrays == ArrayWalk::Descend => {
                rewrite_source_files(child, arrays, relocate)?
            }
            _ => {}
        }
    }

    if let Some(source_file) = object.get_mut(SOURCE_FILE_KEY) {
        let Value::String(path) = source_file else {
            return Err(PackError::InvalidSourceFile {
                found: source_file.to_string(),
            });
        };
        let relocated = relocate(path.as_str())?;
        *source_file = Value::String(relocated.to_string_lossy().into_owned());
    }

    Ok(())
}
