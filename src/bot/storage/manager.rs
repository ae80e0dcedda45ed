use std::path::{Path, PathBuf};

use tokio::sync::Mutex;

use super::{
    document::Document,
    file::{load_document, save_document, StorageError},
};

#[derive(thiserror::Error, Debug)]
pub enum CrudError {
    #[error("Storage error: {0}")]
    StorageError(StorageError),
}

// Implement the From trait to convert from StorageError to CrudError
impl From<StorageError> for CrudError {
    fn from(storage_error: StorageError) -> CrudError {
        CrudError::StorageError(storage_error)
    }
}

/* Store Manager
 * The Store owns the one in-memory Document and its backing file.
 * No other code touches the Document directly, only through the Store.
 * Every access holds the lock, so a read-modify-write-persist cycle is never
 * interleaved with another one.
 */
pub struct Store {
    path: PathBuf,
    document: Mutex<Document>,
}

impl Store {
    // Opens the store, loading whatever is on disk (fail-open).
    pub fn open(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref().to_path_buf();
        let document = load_document(&path);
        Store {
            path,
            document: Mutex::new(document),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /* Runs a read-only closure against the Document.
     */
    pub async fn read<T>(&self, f: impl FnOnce(&Document) -> T) -> T {
        let document = self.document.lock().await;
        f(&document)
    }

    /* Runs a mutation against the Document.
     * The closure works on a copy and returns (changed, output).
     * If it changed anything, the copy is saved and only then committed,
     * so a failed write leaves the in-memory Document as it was.
     */
    pub async fn update<T>(
        &self,
        f: impl FnOnce(&mut Document) -> (bool, T),
    ) -> Result<T, CrudError> {
        let mut document = self.document.lock().await;

        let mut draft = document.clone();
        let (changed, output) = f(&mut draft);

        if changed {
            save_document(&self.path, &draft)?;
            *document = draft;
        }

        Ok(output)
    }

    /* Mutation in two phases, for the common case where nothing changes.
     * `check` looks at the Document in place; only when it returns Some is a copy
     * made, handed to `apply`, saved, and committed as in `update`.
     */
    pub async fn update_when<P, T>(
        &self,
        check: impl FnOnce(&Document) -> Option<P>,
        apply: impl FnOnce(&mut Document, P) -> T,
    ) -> Result<Option<T>, CrudError> {
        let mut document = self.document.lock().await;

        let plan = match check(&document) {
            Some(plan) => plan,
            None => return Ok(None),
        };

        let mut draft = document.clone();
        let output = apply(&mut draft, plan);
        save_document(&self.path, &draft)?;
        *document = draft;

        Ok(Some(output))
    }
}

#[cfg(test)]
mod tests {
    use std::{fs, sync::Arc};

    use super::*;
    use crate::bot::storage::file::{
        read_document,
        tests::{cleanup, temp_data_path},
    };

    #[tokio::test]
    async fn test_update_persists_changes() {
        let path = temp_data_path();
        let store = Store::open(&path);

        let total = store
            .update(|document| (true, document.users.credit("7", 4)))
            .await
            .unwrap();
        assert_eq!(total, 4);

        let on_disk = read_document(&path).unwrap().unwrap();
        assert_eq!(on_disk.users.total("7"), 4);

        // A fresh store sees the same data
        let reopened = Store::open(&path);
        assert_eq!(reopened.read(|document| document.users.total("7")).await, 4);
        cleanup(&path);
    }

    #[tokio::test]
    async fn test_unchanged_update_does_not_write() {
        let path = temp_data_path();
        let store = Store::open(&path);

        store.update(|_| (false, ())).await.unwrap();
        assert!(!path.exists());
        cleanup(&path);
    }

    #[tokio::test]
    async fn test_failed_write_keeps_document() {
        // A regular file where the data directory should be makes every write fail
        let blocker = temp_data_path();
        fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        fs::write(&blocker, "").unwrap();
        let path = blocker.join("data.json");
        let store = Store::open(&path);

        let result = store
            .update(|document| (true, document.slogans.insert("go", 1)))
            .await;
        assert!(matches!(result, Err(CrudError::StorageError(_))));
        assert!(store.read(|document| document.slogans.is_empty()).await);
        cleanup(&blocker);
    }

    #[tokio::test]
    async fn test_update_when_skips_unmatched() {
        let path = temp_data_path();
        let store = Store::open(&path);

        let output = store
            .update_when(
                |_| None::<i64>,
                |document, points| document.users.credit("7", points),
            )
            .await
            .unwrap();
        assert_eq!(output, None);
        assert!(!path.exists());

        let output = store
            .update_when(
                |_| Some(3),
                |document, points| document.users.credit("7", points),
            )
            .await
            .unwrap();
        assert_eq!(output, Some(3));
        assert_eq!(read_document(&path).unwrap().unwrap().users.total("7"), 3);
        cleanup(&path);
    }

    #[tokio::test]
    async fn test_failed_update_when_keeps_document() {
        let blocker = temp_data_path();
        fs::create_dir_all(blocker.parent().unwrap()).unwrap();
        fs::write(&blocker, "").unwrap();
        let store = Store::open(blocker.join("data.json"));

        let result = store
            .update_when(
                |_| Some(5),
                |document, points| document.users.credit("7", points),
            )
            .await;
        assert!(matches!(result, Err(CrudError::StorageError(_))));
        assert_eq!(store.read(|document| document.users.total("7")).await, 0);
        cleanup(&blocker);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_updates_are_not_lost() {
        let path = temp_data_path();
        let store = Arc::new(Store::open(&path));

        let mut tasks = Vec::new();
        for _ in 0..50 {
            let store = store.clone();
            tasks.push(tokio::spawn(async move {
                store
                    .update(|document| (true, document.users.credit("1", 1)))
                    .await
                    .unwrap();
            }));
        }
        for task in tasks {
            task.await.unwrap();
        }

        assert_eq!(store.read(|document| document.users.total("1")).await, 50);
        assert_eq!(read_document(&path).unwrap().unwrap().users.total("1"), 50);
        cleanup(&path);
    }
}
