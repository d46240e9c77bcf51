//! Whole-file JSON codec and prefix-scoped directory enumeration.
//!
//! The durable representation is deliberately plain: a file is read as text
//! and decoded in one step, encoded and written in one step. No streaming,
//! no framing. Batch reads are returned in filename-lexicographic order,
//! which is the documented total order reconciliation folds staged files in
//! (filesystem listing order is otherwise unspecified).

use std::fs;
use std::io;
use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::StoreResult;

/// Reads and decodes one JSON file.
///
/// # Errors
///
/// Returns [`StoreError`](crate::error::StoreError) when the file cannot be
/// read or does not decode as `T`.
pub fn read_json<T: DeserializeOwned>(path: &Path) -> StoreResult<T> {
    let text = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&text)?)
}

/// Encodes `value` and writes it as one whole file.
///
/// # Errors
///
/// Returns [`StoreError`](crate::error::StoreError) when encoding or the
/// write fails.
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> StoreResult<()> {
    let text = serde_json::to_string(value)?;
    fs::write(path, text)?;
    Ok(())
}

/// Lists file names in `dir` starting with `prefix`, lexicographically
/// sorted. A directory that does not exist holds no files and lists as
/// empty rather than as an error.
///
/// # Errors
///
/// Returns [`StoreError`](crate::error::StoreError) when the directory
/// exists but cannot be enumerated.
pub fn list_prefixed(dir: &Path, prefix: &str) -> StoreResult<Vec<String>> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
        Err(err) => return Err(err.into()),
    };
    let mut names = Vec::new();
    for entry in entries {
        let entry = entry?;
        if let Some(name) = entry.file_name().to_str() {
            if name.starts_with(prefix) {
                names.push(name.to_string());
            }
        }
    }
    names.sort();
    Ok(names)
}

/// Reads every prefixed file in `dir` as `T`, returning `(file name, value)`
/// pairs in filename-lexicographic order.
///
/// # Errors
///
/// Returns [`StoreError`](crate::error::StoreError) when enumeration or any
/// single decode fails.
pub fn read_json_batch<T: DeserializeOwned>(
    dir: &Path,
    prefix: &str,
) -> StoreResult<Vec<(String, T)>> {
    let mut out = Vec::new();
    for name in list_prefixed(dir, prefix)? {
        let value = read_json(&dir.join(&name))?;
        out.push((name, value));
    }
    Ok(out)
}

/// Counts files in `dir` starting with `prefix`; 0 when the directory
/// cannot be read.
pub fn count_prefixed(dir: &Path, prefix: &str) -> usize {
    list_prefixed(dir, prefix).map_or(0, |names| names.len())
}

/// Deletes exactly the named files from `dir`.
///
/// # Errors
///
/// Returns [`StoreError`](crate::error::StoreError) on the first failed
/// deletion; earlier deletions are not rolled back.
pub fn remove_files(dir: &Path, names: &[String]) -> StoreResult<()> {
    for name in names {
        fs::remove_file(dir.join(name))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn test_json_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("store.json");

        let value = json!({"hosts": [{"host": "h", "user": "alice"}]});
        write_json(&path, &value).unwrap();

        let read: serde_json::Value = read_json(&path).unwrap();
        assert_eq!(read, value);
    }

    #[test]
    fn test_read_missing_file_is_error() {
        let dir = tempdir().unwrap();
        let result: StoreResult<serde_json::Value> = read_json(&dir.path().join("absent.json"));
        assert!(result.is_err());
    }

    #[test]
    fn test_batch_is_sorted_by_file_name() {
        let dir = tempdir().unwrap();
        // Written out of order on purpose.
        write_json(&dir.path().join("s.temp2.json"), &json!(["b"])).unwrap();
        write_json(&dir.path().join("s.temp1.json"), &json!(["a"])).unwrap();
        write_json(&dir.path().join("other.json"), &json!(["x"])).unwrap();

        let batch: Vec<(String, serde_json::Value)> =
            read_json_batch(dir.path(), "s.temp").unwrap();
        let names: Vec<&str> = batch.iter().map(|(n, _)| n.as_str()).collect();
        assert_eq!(names, vec!["s.temp1.json", "s.temp2.json"]);
        assert_eq!(batch[0].1, json!(["a"]));
    }

    #[test]
    fn test_list_prefixed_missing_dir_is_empty() {
        let dir = tempdir().unwrap();
        let names = list_prefixed(&dir.path().join("absent"), "s.temp").unwrap();
        assert!(names.is_empty());
    }

    #[test]
    fn test_count_prefixed_missing_dir_is_zero() {
        let dir = tempdir().unwrap();
        assert_eq!(count_prefixed(&dir.path().join("nope"), "s.temp"), 0);
        assert_eq!(count_prefixed(dir.path(), "s.temp"), 0);
    }

    #[test]
    fn test_remove_files_deletes_only_named() {
        let dir = tempdir().unwrap();
        write_json(&dir.path().join("s.temp1.json"), &json!([])).unwrap();
        write_json(&dir.path().join("s.temp2.json"), &json!([])).unwrap();

        remove_files(dir.path(), &["s.temp1.json".to_string()]).unwrap();

        assert!(!dir.path().join("s.temp1.json").exists());
        assert!(dir.path().join("s.temp2.json").exists());
    }
}
