// --- Atomic JSON persistence helpers ---

use std::{fs, io::Write, path::Path};

use anyhow::{Context, Result};
use serde::{Serialize, de::DeserializeOwned};
use tempfile::NamedTempFile; // For atomic writes

/// Atomically write *any* serializable value to disk, replacing previous file
/// contents only when the entire payload is safely persisted.
pub fn atomic_write<T>(path: impl AsRef<Path>, value: &T) -> Result<()>
where
    T: Serialize,
{
    let path = path.as_ref();

    // Write into a temp file in the *same* directory.
    let mut tmp = NamedTempFile::new_in(path.parent().unwrap_or_else(|| Path::new(".")))
        .context("create temp file")?;

    serde_json::to_writer_pretty(&mut tmp, value).context("serializing JSON")?;

    // push os buffers
    tmp.flush()?;

    // fsync the tempfile before it takes the final path
    tmp.as_file().sync_all()?;

    // atomic rename onto the final path on POSIX, safe fallback on Windows
    tmp.persist(path)
        .with_context(|| format!("persist {}", path.display()))?;

    Ok(())
}

/// Read and deserialize an entire JSON file. `Ok(None)` when the file does
/// not exist; any read or parse problem is an error for the caller to report.
pub fn read_json<T>(path: impl AsRef<Path>) -> Result<Option<T>>
where
    T: DeserializeOwned,
{
    let path = path.as_ref();
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e).with_context(|| format!("reading {}", path.display())),
    };
    let value = serde_json::from_str(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    Ok(Some(value))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn round_trips_json_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        atomic_write(&path, &vec!["a".to_string(), "b".to_string()]).unwrap();
        let loaded: Option<Vec<String>> = read_json(&path).unwrap();
        assert_eq!(loaded, Some(vec!["a".to_string(), "b".to_string()]));
    }

    #[test]
    fn missing_file_reads_as_none() {
        let dir = tempfile::tempdir().unwrap();
        let loaded: Option<Vec<String>> = read_json(dir.path().join("absent.json")).unwrap();
        assert_eq!(loaded, None);
    }

    #[test]
    fn invalid_json_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");
        fs::write(&path, "{ not json").unwrap();
        let loaded: Result<Option<Vec<String>>> = read_json(&path);
        assert!(loaded.is_err());
    }

    #[test]
    fn write_replaces_previous_contents_whole() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data.json");

        atomic_write(&path, &vec![1, 2, 3]).unwrap();
        atomic_write(&path, &vec![9]).unwrap();
        let loaded: Option<Vec<i32>> = read_json(&path).unwrap();
        assert_eq!(loaded, Some(vec![9]));
    }
}
