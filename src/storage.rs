use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::{
    collections::BTreeMap,
    ffi::OsString,
    fmt,
    path::{Path, PathBuf},
};
use thiserror::Error;
use tokio::{fs, sync::Mutex};
use tracing::{debug, warn};

/// A flat mapping of field names to primitive values. Field order is kept.
pub type Record = Map<String, Value>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Collection {
    Subjects,
    Sessions,
}

impl Collection {
    pub fn name(self) -> &'static str {
        match self {
            Collection::Subjects => "subjects",
            Collection::Sessions => "sessions",
        }
    }
}

impl fmt::Display for Collection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// On-disk layout: one JSON document holding both collections.
///
/// Collections are written as arrays. Files keyed by document id
/// (`{"subjects": {"1": {...}}}`) are also read, in id order.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct StoreData {
    #[serde(default, deserialize_with = "deserialize_collection")]
    pub subjects: Vec<Record>,
    #[serde(default, deserialize_with = "deserialize_collection")]
    pub sessions: Vec<Record>,
}

impl StoreData {
    fn records(&self, collection: Collection) -> &Vec<Record> {
        match collection {
            Collection::Subjects => &self.subjects,
            Collection::Sessions => &self.sessions,
        }
    }

    fn records_mut(&mut self, collection: Collection) -> &mut Vec<Record> {
        match collection {
            Collection::Subjects => &mut self.subjects,
            Collection::Sessions => &mut self.sessions,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CollectionLayout {
    List(Vec<Record>),
    Table(BTreeMap<String, Record>),
}

fn deserialize_collection<'de, D>(deserializer: D) -> Result<Vec<Record>, D::Error>
where
    D: Deserializer<'de>,
{
    match CollectionLayout::deserialize(deserializer)? {
        CollectionLayout::List(records) => Ok(records),
        CollectionLayout::Table(table) => {
            let mut documents = table
                .into_iter()
                .map(|(doc_id, record)| {
                    doc_id
                        .parse::<u64>()
                        .map(|doc_id| (doc_id, record))
                        .map_err(|_| {
                            <D::Error as serde::de::Error>::custom(format!(
                                "invalid document id '{doc_id}'"
                            ))
                        })
                })
                .collect::<Result<Vec<_>, _>>()?;
            documents.sort_by_key(|(doc_id, _)| *doc_id);
            Ok(documents.into_iter().map(|(_, record)| record).collect())
        }
    }
}

/// Errors that can occur in the document store
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store i/o failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("store encoding failed: {0}")]
    Serialize(#[from] serde_json::Error),

    /// The store file exists but is not a readable document. It is left
    /// untouched.
    #[error("store file {} is not a valid document: {source}", .path.display())]
    Corrupt {
        path: PathBuf,
        source: serde_json::Error,
    },
}

/// File-backed JSON document store with append-only collections.
///
/// The whole document is held in memory and rewritten on every insert.
/// Single-process, single-writer: the mutex only orders writers inside
/// this process.
#[derive(Debug)]
pub struct DocumentStore {
    path: PathBuf,
    data: Mutex<StoreData>,
}

impl DocumentStore {
    /// Opens the store at `path`. A missing file is an empty store; any
    /// other read or parse failure is returned and the file is not touched.
    pub async fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }

        let data = load_data(&path).await?;
        Ok(Self {
            path,
            data: Mutex::new(data),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends `record` and writes the document to disk. Returns the
    /// 1-based document id. On a failed write the record is not kept.
    pub async fn insert(&self, collection: Collection, record: Record) -> Result<usize, StoreError> {
        let mut data = self.data.lock().await;
        data.records_mut(collection).push(record);

        if let Err(err) = persist_data(&self.path, &data).await {
            data.records_mut(collection).pop();
            return Err(err);
        }

        let doc_id = data.records(collection).len();
        debug!(%collection, doc_id, "record inserted");
        Ok(doc_id)
    }

    pub async fn all(&self, collection: Collection) -> Vec<Record> {
        self.data.lock().await.records(collection).clone()
    }

    pub async fn len(&self, collection: Collection) -> usize {
        self.data.lock().await.records(collection).len()
    }

    pub async fn is_empty(&self, collection: Collection) -> bool {
        self.len(collection).await == 0
    }
}

async fn load_data(path: &Path) -> Result<StoreData, StoreError> {
    let bytes = match fs::read(path).await {
        Ok(bytes) => bytes,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(StoreData::default()),
        Err(err) => return Err(err.into()),
    };

    serde_json::from_slice(&bytes).map_err(|source| StoreError::Corrupt {
        path: path.to_path_buf(),
        source,
    })
}

/// Writes next to the store file and renames over it, so the store file is
/// always either the previous or the new document.
async fn persist_data(path: &Path, data: &StoreData) -> Result<(), StoreError> {
    let payload = serde_json::to_vec_pretty(data)?;
    let staging = staging_path(path);

    if let Err(err) = write_and_rename(&staging, path, &payload).await {
        if let Err(cleanup) = fs::remove_file(&staging).await {
            if cleanup.kind() != std::io::ErrorKind::NotFound {
                warn!("failed to remove {}: {cleanup}", staging.display());
            }
        }
        return Err(err.into());
    }
    Ok(())
}

async fn write_and_rename(staging: &Path, path: &Path, payload: &[u8]) -> std::io::Result<()> {
    fs::write(staging, payload).await?;
    fs::rename(staging, path).await
}

fn staging_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("store"));
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    fn record(value: Value) -> Record {
        match value {
            Value::Object(map) => map,
            other => panic!("expected object, got {other}"),
        }
    }

    #[tokio::test]
    async fn insert_appends_in_order() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("db.json")).await.unwrap();

        let first = store
            .insert(Collection::Subjects, record(json!({ "id": "R1", "name": "Rat One" })))
            .await
            .unwrap();
        let second = store
            .insert(Collection::Subjects, record(json!({ "id": "R2", "name": "Rat Two" })))
            .await
            .unwrap();

        assert_eq!((first, second), (1, 2));
        let all = store.all(Collection::Subjects).await;
        let ids: Vec<_> = all.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["R1", "R2"]);
    }

    #[tokio::test]
    async fn collections_are_independent() {
        let dir = tempdir().unwrap();
        let store = DocumentStore::open(dir.path().join("db.json")).await.unwrap();

        store
            .insert(Collection::Sessions, record(json!({ "subject_id": "R9" })))
            .await
            .unwrap();

        assert!(store.is_empty(Collection::Subjects).await);
        assert_eq!(store.len(Collection::Sessions).await, 1);
    }

    #[tokio::test]
    async fn records_survive_reopen() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("db.json");
        {
            let store = DocumentStore::open(&path).await.unwrap();
            store
                .insert(Collection::Subjects, record(json!({ "id": "R1", "name": "Rat One" })))
                .await
                .unwrap();
        }

        let reopened = DocumentStore::open(&path).await.unwrap();
        let subjects = reopened.all(Collection::Subjects).await;
        assert_eq!(subjects.len(), 1);
        assert_eq!(subjects[0]["name"], "Rat One");
        assert!(reopened.is_empty(Collection::Sessions).await);
        assert!(!staging_path(&path).exists());
    }

    #[tokio::test]
    async fn field_order_is_preserved_on_disk() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let store = DocumentStore::open(&path).await.unwrap();

        let mut rec = Record::new();
        rec.insert("sex".into(), "Female".into());
        rec.insert("id".into(), "R3".into());
        store.insert(Collection::Subjects, rec).await.unwrap();

        let reopened = DocumentStore::open(&path).await.unwrap();
        let keys: Vec<_> = reopened.all(Collection::Subjects).await[0]
            .keys()
            .cloned()
            .collect();
        assert_eq!(keys, ["sex", "id"]);

        let raw: Value = serde_json::from_slice(&std::fs::read(&path).unwrap()).unwrap();
        assert!(raw["subjects"].is_array());
        assert!(raw["sessions"].is_array());
    }

    #[tokio::test]
    async fn truncated_file_fails_open_and_is_left_alone() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        let full = serde_json::to_vec(&json!({
            "subjects": [
                { "id": "R1", "name": "Rat One" },
                { "id": "R2", "name": "Rat Two" }
            ],
            "sessions": []
        }))
        .unwrap();
        let truncated = &full[..full.len() - 5];
        std::fs::write(&path, truncated).unwrap();

        let result = DocumentStore::open(&path).await;

        assert!(matches!(result, Err(StoreError::Corrupt { .. })));
        assert_eq!(std::fs::read(&path).unwrap(), truncated);
    }

    #[tokio::test]
    async fn unreadable_path_fails_open() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::create_dir(&path).unwrap();

        let result = DocumentStore::open(&path).await;
        assert!(matches!(result, Err(StoreError::Io(_))));
    }

    #[tokio::test]
    async fn id_keyed_tables_are_read_in_id_order() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("db.json");
        std::fs::write(
            &path,
            r#"{"_default": {}, "subjects": {"10": {"id": "R10", "name": "Rat Ten"}, "2": {"id": "R2", "name": "Rat Two"}}, "sessions": {}}"#,
        )
        .unwrap();

        let store = DocumentStore::open(&path).await.unwrap();
        let doc_id = store
            .insert(Collection::Subjects, record(json!({ "id": "R11", "name": "Rat Eleven" })))
            .await
            .unwrap();
        assert_eq!(doc_id, 3);

        let reopened = DocumentStore::open(&path).await.unwrap();
        let subjects = reopened.all(Collection::Subjects).await;
        let ids: Vec<_> = subjects.iter().map(|r| r["id"].as_str().unwrap()).collect();
        assert_eq!(ids, ["R2", "R10", "R11"]);
    }

    #[tokio::test]
    async fn failed_write_keeps_nothing() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("gone");
        let path = folder.join("db.json");

        let store = DocumentStore::open(&path).await.unwrap();
        std::fs::remove_dir_all(&folder).unwrap();

        let result = store
            .insert(Collection::Subjects, record(json!({ "id": "R1" })))
            .await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert!(store.is_empty(Collection::Subjects).await);
    }
}
