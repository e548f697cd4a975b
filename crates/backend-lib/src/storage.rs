// ============================
// authgate-backend-lib/src/storage.rs
// ============================
//! Flat-file object store.
//!
//! Each entity class lives in its own [`ObjectStore`]: an in-memory map of
//! id to entity that is rewritten in full to `.db_<Class>.json` on every
//! mutation. Writes inside one process are serialized by the store's lock;
//! nothing coordinates separate processes sharing the same file, so the
//! last writer wins.
use std::{
    collections::BTreeMap,
    fs,
    path::{Path, PathBuf},
};

use chrono::{DateTime, NaiveDateTime, Utc};
use metrics::counter;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use serde_json::Value;
use tokio::{fs as tokio_fs, sync::RwLock};
use tracing::debug;
use uuid::Uuid;

use crate::error::AppError;
use crate::metrics::STORE_WRITE;

/// On-disk timestamp layout, always UTC
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Parse a timestamp written in [`TIMESTAMP_FORMAT`]
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    NaiveDateTime::parse_from_str(raw, TIMESTAMP_FORMAT).map(|naive| naive.and_utc())
}

/// Render a timestamp in [`TIMESTAMP_FORMAT`]
pub fn format_timestamp(ts: &DateTime<Utc>) -> String {
    ts.format(TIMESTAMP_FORMAT).to_string()
}

mod timestamp {
    use super::{format_timestamp, parse_timestamp};
    use chrono::{DateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&format_timestamp(ts))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        parse_timestamp(&raw).map_err(serde::de::Error::custom)
    }
}

/// Identity and timestamps shared by every stored entity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EntityMeta {
    pub id: String,
    #[serde(with = "timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(with = "timestamp")]
    pub updated_at: DateTime<Utc>,
}

impl EntityMeta {
    /// Fresh identity: random id, both timestamps now
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4().to_string(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Build from optional stored fields, filling the gaps like [`EntityMeta::new`].
    /// Malformed timestamps are an error.
    pub fn from_fields(
        id: Option<String>,
        created_at: Option<&str>,
        updated_at: Option<&str>,
    ) -> Result<Self, AppError> {
        let now = Utc::now();
        let created_at = created_at.map(parse_timestamp).transpose()?.unwrap_or(now);
        let updated_at = updated_at.map(parse_timestamp).transpose()?.unwrap_or(now);
        Ok(Self {
            id: id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            created_at,
            updated_at,
        })
    }
}

impl Default for EntityMeta {
    fn default() -> Self {
        Self::new()
    }
}

/// A persisted object with identity, timestamps and class-scoped storage
pub trait Entity: Serialize + DeserializeOwned + Clone + Send + Sync + 'static {
    /// Class name, which also names the backing file
    const CLASS_NAME: &'static str;

    fn meta(&self) -> &EntityMeta;

    fn meta_mut(&mut self) -> &mut EntityMeta;

    fn id(&self) -> &str {
        &self.meta().id
    }
}

/// File backing the given class inside `dir`
pub fn file_path_for<E: Entity>(dir: &Path) -> PathBuf {
    dir.join(format!(".db_{}.json", E::CLASS_NAME))
}

/// In-memory map of one entity class, flushed to its JSON file
#[derive(Debug)]
pub struct ObjectStore<E: Entity> {
    path: PathBuf,
    objects: RwLock<BTreeMap<String, E>>,
}

impl<E: Entity> ObjectStore<E> {
    /// Open the store for `E` inside `dir`, creating the directory if needed
    /// and loading whatever the class file already holds.
    pub async fn open<P: AsRef<Path>>(dir: P) -> Result<Self, AppError> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir)?;

        let store = Self {
            path: file_path_for::<E>(dir),
            objects: RwLock::new(BTreeMap::new()),
        };
        store.load_from_file().await?;
        Ok(store)
    }

    /// Path of the backing file
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the in-memory map with the file contents.
    /// A missing file yields an empty store; a bad record aborts the load.
    pub async fn load_from_file(&self) -> Result<(), AppError> {
        let mut objects = self.objects.write().await;
        objects.clear();

        if !tokio_fs::try_exists(&self.path).await? {
            debug!(class = E::CLASS_NAME, "no store file, starting empty");
            return Ok(());
        }

        let content = tokio_fs::read_to_string(&self.path).await?;
        let records: BTreeMap<String, Value> = serde_json::from_str(&content)?;

        let mut loaded = BTreeMap::new();
        for (id, record) in records {
            let entity: E = serde_json::from_value(record).map_err(|source| AppError::CorruptRecord {
                class: E::CLASS_NAME,
                id: id.clone(),
                source,
            })?;
            loaded.insert(id, entity);
        }

        debug!(class = E::CLASS_NAME, count = loaded.len(), "loaded store file");
        *objects = loaded;
        Ok(())
    }

    /// Refresh `updated_at`, upsert by id and rewrite the file
    pub async fn save(&self, entity: &mut E) -> Result<(), AppError> {
        entity.meta_mut().updated_at = Utc::now();

        let mut objects = self.objects.write().await;
        objects.insert(entity.id().to_string(), entity.clone());
        self.write_file(&objects).await
    }

    /// Drop the entity if present and rewrite the file; absent ids are a no-op
    pub async fn remove(&self, entity: &E) -> Result<(), AppError> {
        let mut objects = self.objects.write().await;
        if objects.remove(entity.id()).is_some() {
            self.write_file(&objects).await?;
        }
        Ok(())
    }

    pub async fn get(&self, id: &str) -> Option<E> {
        self.objects.read().await.get(id).cloned()
    }

    /// Every entity whose serialized form equals each given attribute.
    /// No attributes matches everything.
    pub async fn search(&self, attributes: &[(&str, Value)]) -> Vec<E> {
        let objects = self.objects.read().await;
        if attributes.is_empty() {
            return objects.values().cloned().collect();
        }

        objects
            .values()
            .filter(|entity| matches_attributes(*entity, attributes))
            .cloned()
            .collect()
    }

    pub async fn all(&self) -> Vec<E> {
        self.search(&[]).await
    }

    pub async fn count(&self) -> usize {
        self.objects.read().await.len()
    }

    async fn write_file(&self, objects: &BTreeMap<String, E>) -> Result<(), AppError> {
        let json = serde_json::to_vec(objects)?;
        tokio_fs::write(&self.path, json).await?;

        counter!(STORE_WRITE, "class" => E::CLASS_NAME).increment(1);
        debug!(class = E::CLASS_NAME, count = objects.len(), "rewrote store file");
        Ok(())
    }
}

fn matches_attributes<E: Entity>(entity: &E, attributes: &[(&str, Value)]) -> bool {
    let Ok(Value::Object(fields)) = serde_json::to_value(entity) else {
        return false;
    };
    attributes
        .iter()
        .all(|(key, expected)| fields.get(*key) == Some(expected))
}
