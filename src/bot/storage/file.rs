use std::{
    ffi::OsString,
    fs::{self, File},
    io::{self, Write},
    path::{Path, PathBuf},
};

use uuid::Uuid;

use super::document::Document;

/* File backing for the Document.
 * Reads are fail-open: a missing or broken file yields an empty Document,
 * but a broken file is moved aside first so the next save cannot overwrite it.
 * Writes go to a temporary sibling file that is renamed over the target.
 */

const TEMP_FILE_SUFFIX: &str = "tmp";
const CORRUPT_FILE_SUFFIX: &str = "corrupt";

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("Failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("Failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: serde_json::Error,
    },
    #[error("Failed to serialize document: {0}")]
    Serialize(serde_json::Error),
    #[error("Failed to write {path}: {source}")]
    Write { path: PathBuf, source: io::Error },
}

// Builds "<path>.<suffix>" without going through a lossy string conversion.
fn sibling_path(path: &Path, suffix: &str) -> PathBuf {
    let mut name: OsString = path.as_os_str().to_owned();
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/* Reads the Document from disk.
 * Returns Ok(None) when the file does not exist, an error when it exists but
 * cannot be read or parsed.
 */
pub fn read_document(path: &Path) -> Result<Option<Document>, StorageError> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(StorageError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };

    serde_json::from_slice(&bytes)
        .map(Some)
        .map_err(|source| StorageError::Parse {
            path: path.to_path_buf(),
            source,
        })
}

/* Loads the Document, never failing.
 * Missing file: empty Document. Broken file: logged, moved aside, empty Document.
 */
pub fn load_document(path: &Path) -> Document {
    match read_document(path) {
        Ok(Some(document)) => {
            log::info!(
                "Storage - Loaded {} slogans and {} user scores from {}",
                document.slogans.len(),
                document.users.len(),
                path.display()
            );
            document
        }
        Ok(None) => {
            log::info!(
                "Storage - No data file at {}, starting with empty tables",
                path.display()
            );
            Document::default()
        }
        Err(err) => {
            log::error!("Storage - {}. Starting with empty tables", err);
            quarantine(path);
            Document::default()
        }
    }
}

// Moves a broken data file out of the way, keeping it for inspection.
fn quarantine(path: &Path) {
    let target = sibling_path(
        path,
        &format!("{CORRUPT_FILE_SUFFIX}-{}", Uuid::new_v4().simple()),
    );
    match fs::rename(path, &target) {
        Ok(()) => log::warn!(
            "Storage - Moved unreadable data file {} to {}",
            path.display(),
            target.display()
        ),
        Err(err) => log::error!(
            "Storage - Could not move unreadable data file {} aside: {}",
            path.display(),
            err
        ),
    }
}

/* Writes the whole Document, replacing the file atomically.
 * The temporary name is unique so concurrent writers never share a temp file.
 */
pub fn save_document(path: &Path, document: &Document) -> Result<(), StorageError> {
    let bytes = serde_json::to_vec_pretty(document).map_err(StorageError::Serialize)?;

    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent).map_err(|source| StorageError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }
    }

    let temp = sibling_path(
        path,
        &format!("{}.{TEMP_FILE_SUFFIX}", Uuid::new_v4().simple()),
    );
    let written = write_synced(&temp, &bytes).and_then(|_| fs::rename(&temp, path));

    if let Err(source) = written {
        let _ = fs::remove_file(&temp);
        return Err(StorageError::Write {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

fn write_synced(path: &Path, bytes: &[u8]) -> io::Result<()> {
    let mut file = File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::bot::storage::{SloganTable, UserScores};

    // Unique path in the system temp dir, cleaned up by the caller.
    pub(crate) fn temp_data_path() -> PathBuf {
        std::env::temp_dir()
            .join(format!("slogan_score_test_{}", Uuid::new_v4().simple()))
            .join("data.json")
    }

    pub(crate) fn cleanup(path: &Path) {
        if let Some(parent) = path.parent() {
            let _ = fs::remove_dir_all(parent);
        }
    }

    fn sample_document() -> Document {
        Document {
            slogans: SloganTable::from_iter([("GoTeam", 10), ("زنده باد", 3), ("zero", 0)]),
            users: UserScores::from_iter([("123456789", 42), ("987", -4)]),
        }
    }

    #[test]
    fn test_missing_file_is_empty() {
        let path = temp_data_path();
        assert!(read_document(&path).unwrap().is_none());
        assert_eq!(load_document(&path), Document::default());
        cleanup(&path);
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = temp_data_path();
        let document = sample_document();

        save_document(&path, &document).unwrap();
        let loaded = load_document(&path);
        assert_eq!(loaded, document);

        save_document(&path, &loaded).unwrap();
        assert_eq!(load_document(&path), document);
        cleanup(&path);
    }

    #[test]
    fn test_save_keeps_non_ascii_readable() {
        let path = temp_data_path();
        save_document(&path, &sample_document()).unwrap();
        let raw = fs::read_to_string(&path).unwrap();
        assert!(raw.contains("زنده باد"));
        cleanup(&path);
    }

    #[test]
    fn test_save_leaves_no_temp_files() {
        let path = temp_data_path();
        save_document(&path, &sample_document()).unwrap();
        save_document(&path, &Document::default()).unwrap();

        let entries: Vec<_> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(entries, vec![OsString::from("data.json")]);
        cleanup(&path);
    }

    #[test]
    fn test_corrupt_file_is_moved_aside() {
        let path = temp_data_path();
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, "{ not json").unwrap();

        assert!(matches!(
            read_document(&path),
            Err(StorageError::Parse { .. })
        ));
        assert_eq!(load_document(&path), Document::default());
        assert!(!path.exists());

        let kept: Vec<String> = fs::read_dir(path.parent().unwrap())
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
            .collect();
        assert_eq!(kept.len(), 1);
        assert!(kept[0].starts_with("data.json.corrupt-"));
        cleanup(&path);
    }
}
