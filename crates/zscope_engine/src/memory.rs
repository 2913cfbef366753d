//! In-memory reference engine for testing and ephemeral storage.

use crate::connection::Connection;
use crate::database::Database;
use crate::engine::Engine;
use crate::error::{EngineError, EngineResult};
use crate::options::Options;
use crate::root::Root;
use crate::txn::TransactionManager;
use parking_lot::{Mutex, RwLock};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// Storage namespace key. One shared store exists per distinct location.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum StoreKey {
    /// File-backed storage, keyed by the exact path string.
    File(String),
    /// Client storage, keyed by server address.
    Server(String, u16),
}

impl fmt::Display for StoreKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::File(path) => write!(f, "file:{path}"),
            Self::Server(host, port) => write!(f, "zeo:{host}:{port}"),
        }
    }
}

/// Committed state shared by every handle opened at one location.
#[derive(Debug, Default)]
struct Store {
    committed: RwLock<BTreeMap<String, Vec<u8>>>,
}

/// Per-connection transactional state: a private write buffer over the
/// shared committed state. `None` marks a pending removal.
#[derive(Debug)]
struct SessionState {
    store: Arc<Store>,
    pending: RwLock<BTreeMap<String, Option<Vec<u8>>>>,
    open: RwLock<bool>,
}

impl SessionState {
    fn new(store: Arc<Store>) -> Self {
        Self {
            store,
            pending: RwLock::new(BTreeMap::new()),
            open: RwLock::new(true),
        }
    }

    fn is_open(&self) -> bool {
        *self.open.read()
    }

    fn ensure_open(&self) -> EngineResult<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(EngineError::ConnectionClosed)
        }
    }

    /// Applies the pending buffer to the shared committed state.
    fn publish(&self) {
        let mut pending = self.pending.write();
        if pending.is_empty() {
            return;
        }
        let mut committed = self.store.committed.write();
        for (key, value) in pending.iter() {
            match value {
                Some(bytes) => {
                    committed.insert(key.clone(), bytes.clone());
                }
                None => {
                    committed.remove(key);
                }
            }
        }
        pending.clear();
    }

    /// Drops the pending buffer without applying it.
    fn discard(&self) {
        self.pending.write().clear();
    }
}

/// An in-process engine.
///
/// `MemoryEngine` implements the full [`Engine`] surface against process
/// memory. Persistence is emulated: the engine keeps one shared store per
/// storage location, so re-opening the same `file://` path or the same
/// server address on the same engine value observes previously committed
/// state. Nothing survives the engine itself.
///
/// Suitable for:
/// - unit and integration tests of session lifecycle code
/// - ephemeral databases that don't need durability
///
/// # Example
///
/// ```rust
/// use zscope_engine::{Engine, Database, Connection, Root, TransactionManager};
/// use zscope_engine::{MemoryEngine, Options};
///
/// let engine = MemoryEngine::new();
/// let storage = engine.open_file_storage("app.fs").unwrap();
/// let db = engine.open_database(storage, Options::default()).unwrap();
///
/// let cx = db.open().unwrap();
/// cx.root().unwrap().put("k", vec![1]).unwrap();
/// cx.transaction_manager().commit().unwrap();
/// cx.close().unwrap();
///
/// // A second connection sees the committed value.
/// let cx = db.open().unwrap();
/// assert_eq!(cx.root().unwrap().get("k").unwrap(), Some(vec![1]));
/// ```
#[derive(Debug, Default)]
pub struct MemoryEngine {
    stores: Mutex<HashMap<StoreKey, Arc<Store>>>,
}

impl MemoryEngine {
    /// Creates a new engine with no stores.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn store(&self, key: &StoreKey) -> Arc<Store> {
        let mut stores = self.stores.lock();
        Arc::clone(stores.entry(key.clone()).or_default())
    }
}

impl Engine for MemoryEngine {
    type Storage = MemoryStorage;
    type Database = MemoryDatabase;

    fn open_file_storage(&self, path: &str) -> EngineResult<Self::Storage> {
        if path.is_empty() {
            return Err(EngineError::unavailable("empty file storage path"));
        }
        let key = StoreKey::File(path.to_string());
        debug!(location = %key, "opening file storage");
        Ok(MemoryStorage {
            store: self.store(&key),
            key,
        })
    }

    fn open_client_storage(&self, host: &str, port: u16) -> EngineResult<Self::Storage> {
        if host.is_empty() {
            return Err(EngineError::unavailable("empty server host"));
        }
        let key = StoreKey::Server(host.to_string(), port);
        debug!(location = %key, "opening client storage");
        Ok(MemoryStorage {
            store: self.store(&key),
            key,
        })
    }

    fn open_database(
        &self,
        storage: Self::Storage,
        options: Options,
    ) -> EngineResult<Self::Database> {
        Ok(MemoryDatabase {
            key: storage.key,
            store: storage.store,
            options,
            open: RwLock::new(true),
        })
    }
}

/// An open in-memory storage handle.
///
/// Opaque to the session layer; it is consumed by
/// [`MemoryEngine::open_database`].
///
/// [`MemoryEngine::open_database`]: crate::Engine::open_database
#[derive(Debug)]
pub struct MemoryStorage {
    key: StoreKey,
    store: Arc<Store>,
}

impl MemoryStorage {
    /// Returns the location this storage was opened at, for diagnostics.
    #[must_use]
    pub fn location(&self) -> String {
        self.key.to_string()
    }
}

/// An in-memory database over one storage location.
#[derive(Debug)]
pub struct MemoryDatabase {
    key: StoreKey,
    store: Arc<Store>,
    options: Options,
    open: RwLock<bool>,
}

impl MemoryDatabase {
    /// Checks whether the database is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        *self.open.read()
    }

    /// Returns the options this database was opened with.
    #[must_use]
    pub fn options(&self) -> &Options {
        &self.options
    }

    /// Returns the location of the underlying storage, for diagnostics.
    #[must_use]
    pub fn location(&self) -> String {
        self.key.to_string()
    }
}

impl Database for MemoryDatabase {
    type Connection = MemoryConnection;
    type TransactionManager = MemoryTransactionManager;

    fn open(&self) -> EngineResult<Self::Connection> {
        self.open_with(&MemoryTransactionManager::new())
    }

    fn open_with(&self, manager: &Self::TransactionManager) -> EngineResult<Self::Connection> {
        if !self.is_open() {
            return Err(EngineError::DatabaseClosed);
        }
        let session = Arc::new(SessionState::new(Arc::clone(&self.store)));
        manager.join(Arc::clone(&session));
        debug!(location = %self.key, "connection opened");
        Ok(MemoryConnection {
            session,
            manager: manager.clone(),
        })
    }

    fn close(&self) -> EngineResult<()> {
        let mut open = self.open.write();
        if *open {
            debug!(location = %self.key, "database closed");
            *open = false;
        }
        Ok(())
    }
}

/// Commit/abort coordinator for in-memory connections.
///
/// A manager starts empty; every connection opened with it joins it. A
/// standalone manager can be created with [`new`] and passed to several
/// [`Database::open_with`] calls so one commit covers them all, in join
/// order. Sessions that were already closed are skipped.
///
/// [`new`]: MemoryTransactionManager::new
/// [`Database::open_with`]: crate::Database::open_with
#[derive(Debug, Clone, Default)]
pub struct MemoryTransactionManager {
    sessions: Arc<Mutex<Vec<Arc<SessionState>>>>,
}

impl MemoryTransactionManager {
    /// Creates a manager with no joined connections.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn join(&self, session: Arc<SessionState>) {
        self.sessions.lock().push(session);
    }
}

impl TransactionManager for MemoryTransactionManager {
    fn commit(&self) -> EngineResult<()> {
        for session in self.sessions.lock().iter() {
            if session.is_open() {
                session.publish();
            }
        }
        debug!("transaction committed");
        Ok(())
    }

    fn abort(&self) -> EngineResult<()> {
        for session in self.sessions.lock().iter() {
            if session.is_open() {
                session.discard();
            }
        }
        debug!("transaction aborted");
        Ok(())
    }
}

/// An open in-memory connection.
#[derive(Debug)]
pub struct MemoryConnection {
    session: Arc<SessionState>,
    manager: MemoryTransactionManager,
}

impl MemoryConnection {
    /// Checks whether the connection is open.
    #[must_use]
    pub fn is_open(&self) -> bool {
        self.session.is_open()
    }
}

impl Connection for MemoryConnection {
    type Root = MemoryRoot;
    type TransactionManager = MemoryTransactionManager;

    fn root(&self) -> EngineResult<Self::Root> {
        self.session.ensure_open()?;
        Ok(MemoryRoot {
            session: Arc::clone(&self.session),
        })
    }

    fn transaction_manager(&self) -> Self::TransactionManager {
        self.manager.clone()
    }

    fn close(&self) -> EngineResult<()> {
        let mut open = self.session.open.write();
        if *open {
            // Abort-on-close: pending work never reaches committed state.
            self.session.pending.write().clear();
            *open = false;
            debug!("connection closed");
        }
        Ok(())
    }
}

/// Root container view over a connection's session.
///
/// Reads see the connection's pending writes layered over committed state.
#[derive(Debug)]
pub struct MemoryRoot {
    session: Arc<SessionState>,
}

impl Root for MemoryRoot {
    fn get(&self, key: &str) -> EngineResult<Option<Vec<u8>>> {
        self.session.ensure_open()?;
        if let Some(value) = self.session.pending.read().get(key) {
            return Ok(value.clone());
        }
        Ok(self.session.store.committed.read().get(key).cloned())
    }

    fn put(&self, key: &str, value: Vec<u8>) -> EngineResult<()> {
        self.session.ensure_open()?;
        self.session
            .pending
            .write()
            .insert(key.to_string(), Some(value));
        Ok(())
    }

    fn remove(&self, key: &str) -> EngineResult<Option<Vec<u8>>> {
        let previous = self.get(key)?;
        if previous.is_some() {
            self.session.pending.write().insert(key.to_string(), None);
        }
        Ok(previous)
    }

    fn contains(&self, key: &str) -> EngineResult<bool> {
        Ok(self.get(key)?.is_some())
    }

    fn keys(&self) -> EngineResult<Vec<String>> {
        self.session.ensure_open()?;
        let pending = self.session.pending.read();
        let committed = self.session.store.committed.read();
        let mut keys: Vec<String> = committed
            .keys()
            .filter(|key| !matches!(pending.get(*key), Some(None)))
            .cloned()
            .collect();
        for (key, value) in pending.iter() {
            if value.is_some() && !committed.contains_key(key) {
                keys.push(key.clone());
            }
        }
        keys.sort();
        Ok(keys)
    }

    fn len(&self) -> EngineResult<usize> {
        Ok(self.keys()?.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open_db(engine: &MemoryEngine, uri_path: &str) -> MemoryDatabase {
        let storage = engine.open_file_storage(uri_path).unwrap();
        engine.open_database(storage, Options::default()).unwrap()
    }

    #[test]
    fn commit_publishes_writes() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let cx = db.open().unwrap();
        cx.root().unwrap().put("x", vec![1]).unwrap();
        cx.transaction_manager().commit().unwrap();
        cx.close().unwrap();

        let cx = db.open().unwrap();
        assert_eq!(cx.root().unwrap().get("x").unwrap(), Some(vec![1]));
    }

    #[test]
    fn uncommitted_writes_are_private() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let writer = db.open().unwrap();
        writer.root().unwrap().put("x", vec![1]).unwrap();

        let reader = db.open().unwrap();
        assert_eq!(reader.root().unwrap().get("x").unwrap(), None);

        // Visible to the writer itself.
        assert_eq!(writer.root().unwrap().get("x").unwrap(), Some(vec![1]));
    }

    #[test]
    fn abort_discards_writes() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let cx = db.open().unwrap();
        let root = cx.root().unwrap();
        root.put("x", vec![1]).unwrap();
        cx.transaction_manager().abort().unwrap();
        assert_eq!(root.get("x").unwrap(), None);
    }

    #[test]
    fn close_discards_pending_writes() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let cx = db.open().unwrap();
        cx.root().unwrap().put("x", vec![1]).unwrap();
        cx.close().unwrap();

        let cx = db.open().unwrap();
        assert_eq!(cx.root().unwrap().get("x").unwrap(), None);
    }

    #[test]
    fn reopening_same_path_shares_state() {
        let engine = MemoryEngine::new();

        let db = open_db(&engine, "shared.fs");
        let cx = db.open().unwrap();
        cx.root().unwrap().put("x", vec![7]).unwrap();
        cx.transaction_manager().commit().unwrap();
        cx.close().unwrap();
        db.close().unwrap();

        let db = open_db(&engine, "shared.fs");
        let cx = db.open().unwrap();
        assert_eq!(cx.root().unwrap().get("x").unwrap(), Some(vec![7]));
    }

    #[test]
    fn distinct_paths_are_isolated() {
        let engine = MemoryEngine::new();

        let db_a = open_db(&engine, "a.fs");
        let cx = db_a.open().unwrap();
        cx.root().unwrap().put("x", vec![1]).unwrap();
        cx.transaction_manager().commit().unwrap();

        let db_b = open_db(&engine, "b.fs");
        let cx = db_b.open().unwrap();
        assert_eq!(cx.root().unwrap().get("x").unwrap(), None);
    }

    #[test]
    fn file_and_server_namespaces_are_distinct() {
        let engine = MemoryEngine::new();

        let storage = engine.open_file_storage("localhost").unwrap();
        let db_file = engine.open_database(storage, Options::default()).unwrap();
        let cx = db_file.open().unwrap();
        cx.root().unwrap().put("x", vec![1]).unwrap();
        cx.transaction_manager().commit().unwrap();

        let storage = engine.open_client_storage("localhost", 8100).unwrap();
        let db_server = engine.open_database(storage, Options::default()).unwrap();
        let cx = db_server.open().unwrap();
        assert_eq!(cx.root().unwrap().get("x").unwrap(), None);
    }

    #[test]
    fn open_on_closed_database_fails() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");
        db.close().unwrap();

        assert!(matches!(db.open(), Err(EngineError::DatabaseClosed)));
        // Close is idempotent.
        assert!(db.close().is_ok());
    }

    #[test]
    fn root_on_closed_connection_fails() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let cx = db.open().unwrap();
        let root = cx.root().unwrap();
        cx.close().unwrap();

        assert!(matches!(cx.root(), Err(EngineError::ConnectionClosed)));
        assert!(matches!(root.get("x"), Err(EngineError::ConnectionClosed)));
    }

    #[test]
    fn empty_locations_are_rejected() {
        let engine = MemoryEngine::new();
        assert!(matches!(
            engine.open_file_storage(""),
            Err(EngineError::Unavailable { .. })
        ));
        assert!(matches!(
            engine.open_client_storage("", 8100),
            Err(EngineError::Unavailable { .. })
        ));
    }

    #[test]
    fn shared_manager_commits_all_joined_connections() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let manager = MemoryTransactionManager::new();
        let cx1 = db.open_with(&manager).unwrap();
        let cx2 = db.open_with(&manager).unwrap();

        cx1.root().unwrap().put("one", vec![1]).unwrap();
        cx2.root().unwrap().put("two", vec![2]).unwrap();
        manager.commit().unwrap();

        let reader = db.open().unwrap();
        let root = reader.root().unwrap();
        assert_eq!(root.get("one").unwrap(), Some(vec![1]));
        assert_eq!(root.get("two").unwrap(), Some(vec![2]));
    }

    #[test]
    fn shared_manager_skips_closed_connections() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let manager = MemoryTransactionManager::new();
        let cx1 = db.open_with(&manager).unwrap();
        let cx2 = db.open_with(&manager).unwrap();

        cx1.root().unwrap().put("kept", vec![1]).unwrap();
        cx2.root().unwrap().put("dropped", vec![2]).unwrap();
        cx2.close().unwrap();
        manager.commit().unwrap();

        let reader = db.open().unwrap();
        let root = reader.root().unwrap();
        assert_eq!(root.get("kept").unwrap(), Some(vec![1]));
        assert_eq!(root.get("dropped").unwrap(), None);
    }

    #[test]
    fn remove_and_contains() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let cx = db.open().unwrap();
        let root = cx.root().unwrap();
        root.put("x", vec![1]).unwrap();
        assert!(root.contains("x").unwrap());

        let previous = root.remove("x").unwrap();
        assert_eq!(previous, Some(vec![1]));
        assert!(!root.contains("x").unwrap());
        assert_eq!(root.remove("x").unwrap(), None);
    }

    #[test]
    fn pending_removal_hides_committed_value() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let cx = db.open().unwrap();
        cx.root().unwrap().put("x", vec![1]).unwrap();
        cx.transaction_manager().commit().unwrap();
        cx.close().unwrap();

        let cx = db.open().unwrap();
        let root = cx.root().unwrap();
        root.remove("x").unwrap();
        assert_eq!(root.get("x").unwrap(), None);
        assert!(!root.keys().unwrap().contains(&"x".to_string()));

        // Not committed: a fresh connection still sees it.
        let other = db.open().unwrap();
        assert_eq!(other.root().unwrap().get("x").unwrap(), Some(vec![1]));
    }

    #[test]
    fn keys_merge_pending_and_committed() {
        let engine = MemoryEngine::new();
        let db = open_db(&engine, "a.fs");

        let cx = db.open().unwrap();
        cx.root().unwrap().put("b", vec![1]).unwrap();
        cx.transaction_manager().commit().unwrap();
        cx.close().unwrap();

        let cx = db.open().unwrap();
        let root = cx.root().unwrap();
        root.put("a", vec![2]).unwrap();
        assert_eq!(root.keys().unwrap(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(root.len().unwrap(), 2);
        assert!(!root.is_empty().unwrap());
    }

    #[test]
    fn locations_are_reported_for_diagnostics() {
        let engine = MemoryEngine::new();

        let storage = engine.open_file_storage("/var/db/app.fs").unwrap();
        assert_eq!(storage.location(), "file:/var/db/app.fs");

        let storage = engine.open_client_storage("db.internal", 9002).unwrap();
        let db = engine.open_database(storage, Options::default()).unwrap();
        assert_eq!(db.location(), "zeo:db.internal:9002");
    }

    #[test]
    fn options_are_kept_verbatim() {
        let engine = MemoryEngine::new();
        let storage = engine.open_file_storage("a.fs").unwrap();
        let options = Options::new().pool_size(2).cache_size(16);
        let db = engine.open_database(storage, options.clone()).unwrap();
        assert_eq!(db.options(), &options);
    }
}
