//! JSON record reading and writing with path-aware errors.

use crate::error::{FusionError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

/// Read and deserialize one JSON record.
///
/// A file that does not exist is reported as [`FusionError::MissingInput`].
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = File::open(path).map_err(|source| {
        if source.kind() == std::io::ErrorKind::NotFound {
            FusionError::MissingInput(format!("file {}", path.display()))
        } else {
            FusionError::Io {
                path: path.to_path_buf(),
                source,
            }
        }
    })?;

    serde_json::from_reader(BufReader::new(file)).map_err(|source| FusionError::Json {
        path: path.to_path_buf(),
        source,
    })
}

/// Serialize a record to `path`, replacing any existing file.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let io_err = |source| FusionError::Io {
        path: path.to_path_buf(),
        source,
    };

    let file = File::create(path).map_err(io_err)?;
    let mut writer = BufWriter::new(file);
    serde_json::to_writer(&mut writer, value).map_err(|source| FusionError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    writer.flush().map_err(io_err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_missing_input() {
        let dir = tempfile::tempdir().unwrap();
        let err = read_json::<Vec<f64>>(&dir.path().join("absent.json")).unwrap_err();
        assert!(matches!(err, FusionError::MissingInput(_)));
    }

    #[test]
    fn test_write_then_read() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scores.json");
        write_json(&path, &vec![0.25, 0.5]).unwrap();
        let back: Vec<f64> = read_json(&path).unwrap();
        assert_eq!(back, vec![0.25, 0.5]);
    }

    #[test]
    fn test_malformed_json() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.json");
        std::fs::write(&path, "{\"boxes\": [").unwrap();
        let err = read_json::<serde_json::Value>(&path).unwrap_err();
        assert!(matches!(err, FusionError::Json { .. }));
    }
}
