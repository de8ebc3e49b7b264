//! Document store and query execution.

use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard, RwLock, RwLockReadGuard, RwLockWriteGuard};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::types::sort_documents;
use crate::{DbError, Document, Filter, FindOptions};

/// One named collection. Documents keep their insertion order.
#[derive(Debug, Default)]
struct Collection {
    next_slot: u64,
    docs: BTreeMap<u64, Value>,
    slots: HashMap<String, u64>,
}

impl Collection {
    fn insert(&mut self, id: &str, doc: Value) -> bool {
        if self.slots.contains_key(id) {
            return false;
        }
        let slot = self.next_slot;
        self.next_slot += 1;
        self.slots.insert(id.to_string(), slot);
        self.docs.insert(slot, doc);
        true
    }

    fn get(&self, id: &str) -> Option<&Value> {
        self.slots.get(id).and_then(|slot| self.docs.get(slot))
    }

    fn get_mut(&mut self, id: &str) -> Option<&mut Value> {
        match self.slots.get(id) {
            Some(slot) => self.docs.get_mut(slot),
            None => None,
        }
    }

    fn remove(&mut self, id: &str) -> Option<Value> {
        let slot = self.slots.remove(id)?;
        self.docs.remove(&slot)
    }

    fn iter(&self) -> impl Iterator<Item = &Value> {
        self.docs.values()
    }
}

#[derive(Debug, Default)]
struct State {
    collections: HashMap<String, Collection>,
    sequences: BTreeMap<String, i64>,
}

/// On-disk snapshot layout.
#[derive(Debug, Default, Serialize, Deserialize)]
struct Snapshot {
    #[serde(default)]
    collections: BTreeMap<String, Vec<Value>>,
    #[serde(default)]
    sequences: BTreeMap<String, i64>,
}

/// Embedded JSON document database.
///
/// Every operation is a single independent read or write; there is no
/// multi-document transaction and concurrent writers resolve as last write
/// wins. Sequences that must not interleave run under [`Db::exclusive`].
#[derive(Debug)]
pub struct Db {
    state: RwLock<State>,
    /// Held across multi-step read-modify-write sequences.
    exclusive: Mutex<()>,
    path: Option<PathBuf>,
}

impl Db {
    /// Create an empty database that is never persisted.
    pub fn in_memory() -> Self {
        Self {
            state: RwLock::new(State::default()),
            exclusive: Mutex::new(()),
            path: None,
        }
    }

    /// Open a database backed by a JSON snapshot file.
    ///
    /// A missing file yields an empty database that will be written on
    /// [`Db::persist`].
    ///
    /// # Example
    ///
    /// ```rust,ignore
    /// let db = Db::open("inkwell-data.json")?;
    /// ```
    pub fn open(path: impl AsRef<Path>) -> Result<Self, DbError> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let content = std::fs::read_to_string(&path)
                .map_err(|e| DbError::OpenError(format!("{}: {}", path.display(), e)))?;
            let snapshot: Snapshot = serde_json::from_str(&content)
                .map_err(|e| DbError::OpenError(format!("{}: {}", path.display(), e)))?;
            restore(snapshot)?
        } else {
            State::default()
        };

        tracing::debug!(path = %path.display(), "opened document database");
        Ok(Self {
            state: RwLock::new(state),
            exclusive: Mutex::new(()),
            path: Some(path),
        })
    }

    /// Path of the backing snapshot file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Write the current state to the snapshot file.
    ///
    /// No-op for in-memory databases.
    pub fn persist(&self) -> Result<(), DbError> {
        let Some(path) = &self.path else {
            return Ok(());
        };

        let snapshot = {
            let state = self.read()?;
            Snapshot {
                collections: state
                    .collections
                    .iter()
                    .map(|(name, c)| (name.clone(), c.iter().cloned().collect()))
                    .collect(),
                sequences: state.sequences.clone(),
            }
        };

        let content = serde_json::to_string_pretty(&snapshot)?;
        let tmp = path.with_extension("json.tmp");
        std::fs::write(&tmp, content)
            .map_err(|e| DbError::PersistError(format!("{}: {}", tmp.display(), e)))?;
        std::fs::rename(&tmp, path)
            .map_err(|e| DbError::PersistError(format!("{}: {}", path.display(), e)))?;

        tracing::info!(path = %path.display(), "persisted document database");
        Ok(())
    }

    /// Insert a new document. Fails if the id is taken.
    pub fn insert<D: Document>(&self, doc: &D) -> Result<(), DbError> {
        let value = serde_json::to_value(doc)?;
        let mut state = self.write()?;
        let collection = state
            .collections
            .entry(D::COLLECTION.to_string())
            .or_default();
        if !collection.insert(doc.id(), value) {
            return Err(DbError::AlreadyExists {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
            });
        }
        Ok(())
    }

    /// Replace an existing document, keeping its position.
    pub fn replace<D: Document>(&self, doc: &D) -> Result<(), DbError> {
        let value = serde_json::to_value(doc)?;
        let mut state = self.write()?;
        match state
            .collections
            .get_mut(D::COLLECTION)
            .and_then(|c| c.get_mut(doc.id()))
        {
            Some(slot) => {
                *slot = value;
                Ok(())
            }
            None => Err(DbError::NotFound {
                collection: D::COLLECTION.to_string(),
                id: doc.id().to_string(),
            }),
        }
    }

    /// Fetch a document by id.
    pub fn get<D: Document>(&self, id: &str) -> Result<Option<D>, DbError> {
        let state = self.read()?;
        match state.collections.get(D::COLLECTION).and_then(|c| c.get(id)) {
            Some(value) => Ok(Some(D::deserialize(value)?)),
            None => Ok(None),
        }
    }

    /// Delete a document by id. Returns whether it existed.
    pub fn delete<D: Document>(&self, id: &str) -> Result<bool, DbError> {
        let mut state = self.write()?;
        Ok(state
            .collections
            .get_mut(D::COLLECTION)
            .and_then(|c| c.remove(id))
            .is_some())
    }

    /// Find documents matching a filter.
    pub fn find<D: Document>(
        &self,
        filter: &Filter,
        options: &FindOptions,
    ) -> Result<Vec<D>, DbError> {
        let mut matched: Vec<Value> = {
            let state = self.read()?;
            match state.collections.get(D::COLLECTION) {
                Some(c) => c.iter().filter(|d| filter.matches(d)).cloned().collect(),
                None => Vec::new(),
            }
        };

        if let Some(sort) = &options.sort {
            sort_documents(&mut matched, sort);
        }

        let limit = options.limit.unwrap_or(usize::MAX);
        matched
            .into_iter()
            .skip(options.skip)
            .take(limit)
            .map(|v| D::deserialize(v).map_err(DbError::from))
            .collect()
    }

    /// Find the first document matching a filter.
    pub fn find_one<D: Document>(&self, filter: &Filter) -> Result<Option<D>, DbError> {
        let options = FindOptions {
            limit: Some(1),
            ..FindOptions::default()
        };
        Ok(self.find(filter, &options)?.into_iter().next())
    }

    /// All documents of a collection in insertion order.
    pub fn all<D: Document>(&self) -> Result<Vec<D>, DbError> {
        self.find(&Filter::All, &FindOptions::default())
    }

    /// Count documents matching a filter.
    pub fn count<D: Document>(&self, filter: &Filter) -> Result<usize, DbError> {
        self.count_in(D::COLLECTION, filter)
    }

    /// Count documents of a collection by name.
    ///
    /// Used where the caller only knows the collection from configuration.
    pub fn count_in(&self, collection: &str, filter: &Filter) -> Result<usize, DbError> {
        let state = self.read()?;
        Ok(state
            .collections
            .get(collection)
            .map(|c| c.iter().filter(|d| filter.matches(d)).count())
            .unwrap_or(0))
    }

    /// Check whether a document id exists in a collection by name.
    pub fn contains_in(&self, collection: &str, id: &str) -> Result<bool, DbError> {
        let state = self.read()?;
        Ok(state
            .collections
            .get(collection)
            .is_some_and(|c| c.get(id).is_some()))
    }

    /// Apply `update` to every matching document and write back those it
    /// reports as changed. Returns the number of changed documents.
    pub fn update_where<D, F>(&self, filter: &Filter, mut update: F) -> Result<usize, DbError>
    where
        D: Document,
        F: FnMut(&mut D) -> bool,
    {
        let mut state = self.write()?;
        let Some(collection) = state.collections.get_mut(D::COLLECTION) else {
            return Ok(0);
        };

        let mut changed = 0;
        for slot in collection.docs.values_mut() {
            if !filter.matches(slot) {
                continue;
            }
            let mut doc = D::deserialize(&*slot)?;
            if update(&mut doc) {
                *slot = serde_json::to_value(&doc)?;
                changed += 1;
            }
        }
        Ok(changed)
    }

    /// Allocate the next value of a named sequence, starting at 1.
    pub fn next_sequence(&self, name: &str) -> Result<i64, DbError> {
        let mut state = self.write()?;
        let counter = state.sequences.entry(name.to_string()).or_insert(0);
        *counter += 1;
        Ok(*counter)
    }

    /// Enter the exclusive section.
    ///
    /// Every single operation is atomic on its own. A sequence of them
    /// (read stock, check, write) is only safe against other sequences that
    /// hold this guard too. Not reentrant.
    pub fn exclusive(&self) -> Result<MutexGuard<'_, ()>, DbError> {
        self.exclusive.lock().map_err(|_| DbError::Poisoned)
    }

    fn read(&self) -> Result<RwLockReadGuard<'_, State>, DbError> {
        self.state.read().map_err(|_| DbError::Poisoned)
    }

    fn write(&self) -> Result<RwLockWriteGuard<'_, State>, DbError> {
        self.state.write().map_err(|_| DbError::Poisoned)
    }
}

impl Default for Db {
    fn default() -> Self {
        Self::in_memory()
    }
}

fn restore(snapshot: Snapshot) -> Result<State, DbError> {
    let mut state = State {
        collections: HashMap::new(),
        sequences: snapshot.sequences,
    };

    for (name, docs) in snapshot.collections {
        let mut collection = Collection::default();
        for doc in docs {
            let id = doc
                .get("id")
                .and_then(Value::as_str)
                .ok_or_else(|| DbError::OpenError(format!("document without id in {}", name)))?
                .to_string();
            if !collection.insert(&id, doc) {
                return Err(DbError::OpenError(format!("duplicate id {} in {}", id, name)));
            }
        }
        state.collections.insert(name, collection);
    }

    Ok(state)
}
