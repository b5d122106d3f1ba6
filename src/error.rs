use std::{io, path::PathBuf};

use thiserror::Error;

/// Errors surfaced by the file-facing parts of the crate (maps, input logs, config).
/// Gameplay itself never fails with an error; see [`crate::session::SessionStatus`].
#[derive(Debug, Error)]
pub enum Error {
    #[error("i/o error: {0}")]
    Io(#[from] io::Error),
    #[error("map error on line {line}: {reason}")]
    Map { line: usize, reason: String },
    #[error("no hit objects found{}", path_suffix(.path))]
    EmptyMap { path: Option<PathBuf> },
    #[error("input log error: {0}")]
    InputLog(#[from] csv::Error),
    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),
}

fn path_suffix(path: &Option<PathBuf>) -> String {
    path.as_ref()
        .map(|p| format!(" in '{}'", p.display()))
        .unwrap_or_default()
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_mentions_line() {
        let err = Error::Map {
            line: 12,
            reason: "bad".into(),
        };
        assert_eq!(err.to_string(), "map error on line 12: bad");
    }

    #[test]
    fn empty_map_names_path_when_known() {
        let err = Error::EmptyMap {
            path: Some(PathBuf::from("breeze.wsm")),
        };
        assert_eq!(err.to_string(), "no hit objects found in 'breeze.wsm'");
        assert_eq!(
            Error::EmptyMap { path: None }.to_string(),
            "no hit objects found"
        );
    }

    #[test]
    fn io_errors_keep_source() {
        let err: Error = io::Error::new(io::ErrorKind::NotFound, "gone").into();
        assert!(std::error::Error::source(&err).is_some());
        assert!(err.to_string().contains("gone"));
    }
}
