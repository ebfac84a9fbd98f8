use std::{fmt, io, path::PathBuf};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum NodeErrorKind {
    UnexpectedOpenBrace,
    UnexpectedCloseBrace,
    UnclosedNode { name_line: usize },
    MissingOpenBrace { name_line: usize },
    StrayLine,
}

impl fmt::Display for NodeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnexpectedOpenBrace => write!(f, "'{{' without a node name"),
            Self::UnexpectedCloseBrace => write!(f, "'}}' without a matching '{{'"),
            Self::UnclosedNode { name_line } => {
                write!(f, "node opened at line {name_line} is never closed")
            }
            Self::MissingOpenBrace { name_line } => {
                write!(f, "node name at line {name_line} is not followed by '{{'")
            }
            Self::StrayLine => write!(f, "line is neither a value nor a node header"),
        }
    }
}

/// Structural damage in a config-node document. `line` is 1-based.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NodeError {
    pub line: usize,
    pub kind: NodeErrorKind,
}

impl fmt::Display for NodeError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "line {}: {}", self.line, self.kind)
    }
}

impl std::error::Error for NodeError {}

#[derive(Debug)]
pub enum StorageError {
    Read { path: PathBuf, source: io::Error },
    Parse { path: PathBuf, source: NodeError },
    CreateDir { path: PathBuf, source: io::Error },
    Write { path: PathBuf, source: io::Error },
}

impl StorageError {
    pub fn path(&self) -> &PathBuf {
        match self {
            Self::Read { path, .. }
            | Self::Parse { path, .. }
            | Self::CreateDir { path, .. }
            | Self::Write { path, .. } => path,
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::Read { source, .. } if source.kind() == io::ErrorKind::NotFound)
    }
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Read { path, source } => {
                write!(f, "failed reading launch history {}: {source}", path.display())
            }
            Self::Parse { path, source } => {
                write!(f, "malformed launch history {}: {source}", path.display())
            }
            Self::CreateDir { path, source } => {
                write!(f, "failed creating directory {}: {source}", path.display())
            }
            Self::Write { path, source } => {
                write!(f, "failed writing launch history {}: {source}", path.display())
            }
        }
    }
}

impl std::error::Error for StorageError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Read { source, .. } | Self::CreateDir { source, .. } | Self::Write { source, .. } => {
                Some(source)
            }
            Self::Parse { source, .. } => Some(source),
        }
    }
}
