use std::{
    io,
    path::{Path, PathBuf},
};

use thiserror::Error;

/// Failures of the config layer. File errors carry the path they hit.
#[derive(Debug, Error)]
pub enum Error {
    #[error("could not determine home directory")]
    NoHomeDir,

    #[error("failed to {action} {}: {error}", path.display())]
    Io {
        action: &'static str,
        path: PathBuf,
        error: io::Error,
    },

    #[error("failed to parse {}: {error}", path.display())]
    Parse {
        path: PathBuf,
        error: serde_json::Error,
    },

    #[error("config root is not an object")]
    NotAnObject,

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl Error {
    /// `map_err` adapter tagging an I/O failure with what was being done to
    /// `path`.
    pub(crate) fn io<'a>(action: &'static str, path: &'a Path) -> impl FnOnce(io::Error) -> Self + 'a {
        move |error| Self::Io {
            action,
            path: path.to_path_buf(),
            error,
        }
    }

    pub(crate) fn parse(path: &Path) -> impl FnOnce(serde_json::Error) -> Self + '_ {
        move |error| Self::Parse {
            path: path.to_path_buf(),
            error,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
