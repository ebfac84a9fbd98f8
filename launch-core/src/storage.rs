use std::{fs, path::Path};

use crate::constants::{RECORD_NODE, ROOT_LIST_NODE};
use crate::error::StorageError;
use crate::node::{parse_document, Node};
use crate::record::LaunchRecord;

/// Reads every record from a history file.
///
/// The records live under a `DB` node as `item` children. A document without
/// a `DB` node holds no records.
pub fn read_history_file(path: &Path) -> Result<Vec<LaunchRecord>, StorageError> {
    let text = fs::read_to_string(path).map_err(|source| StorageError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let root = parse_document(&text).map_err(|source| StorageError::Parse {
        path: path.to_path_buf(),
        source,
    })?;

    Ok(root
        .node(ROOT_LIST_NODE)
        .map(|db| db.nodes_named(RECORD_NODE).map(LaunchRecord::from_node).collect())
        .unwrap_or_default())
}

/// Overwrites `path` with `records`, creating the parent directory first.
pub fn write_history_file(path: &Path, records: &[LaunchRecord]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| StorageError::CreateDir {
            path: parent.to_path_buf(),
            source,
        })?;
    }

    let mut db = Node::new(ROOT_LIST_NODE);
    for record in records {
        db.add_node(record.to_node());
    }
    let mut root = Node::default();
    root.add_node(db);

    fs::write(path, root.to_document()).map_err(|source| StorageError::Write {
        path: path.to_path_buf(),
        source,
    })
}
