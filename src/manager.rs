//! The entity manager and the factory that opens it.
//!
//! An [`EntityManager`] exclusively owns one SQLite connection. It resolves
//! entity metadata, consults its identity cache, and on a miss runs the
//! generated find-by-id query and maps the single resulting row. Once
//! materialized, an instance is kept for the lifetime of the manager and the
//! same `Arc` is handed out for every later lookup of that key.
//!
//! The manager may be shared between threads. Queries are serialized on the
//! connection, and the cache is checked again once the connection is held,
//! so concurrent misses on one key issue a single query and yield a single
//! instance.

use std::any::TypeId;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

// used for persistence
use rusqlite::{params, Connection};
use tracing::{debug, info, warn};

use crate::cache::{IdentityCache, KeyHasher};
use crate::entity::Entity;
use crate::error::{OrmError, Result};
use crate::key::EntityKey;
use crate::mapper::map_row;
use crate::metadata::{resolve, ResolvedMetadata};
use crate::query::find_by_id_query;
use crate::settings::Settings;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PersistenceMode {
    InMemory,
    File(String),
}

// ------------- EntityManagerFactory -------------
#[derive(Debug, Clone)]
pub struct EntityManagerFactory {
    mode: PersistenceMode,
    busy_timeout: Option<Duration>,
    init_script: Option<String>,
}

impl EntityManagerFactory {
    pub fn new(mode: PersistenceMode) -> Self {
        Self {
            mode,
            busy_timeout: None,
            init_script: None,
        }
    }
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let mut factory = Self::new(settings.persistence_mode()?);
        factory.busy_timeout = settings.busy_timeout();
        factory.init_script = settings.database.init_script.clone();
        Ok(factory)
    }
    pub fn with_busy_timeout(mut self, timeout: Duration) -> Self {
        self.busy_timeout = Some(timeout);
        self
    }
    /// SQL run on every connection right after it is opened, such as pragmas.
    pub fn with_init_script(mut self, script: impl Into<String>) -> Self {
        self.init_script = Some(script.into());
        self
    }
    pub fn mode(&self) -> &PersistenceMode {
        &self.mode
    }
    pub fn create_entity_manager(&self) -> Result<EntityManager> {
        let connection = match &self.mode {
            PersistenceMode::InMemory => Connection::open_in_memory(),
            PersistenceMode::File(path) => Connection::open(path),
        }
        .map_err(OrmError::ConnectionFailure)?;
        if let Some(timeout) = self.busy_timeout {
            connection
                .busy_timeout(timeout)
                .map_err(OrmError::ConnectionFailure)?;
        }
        if let Some(script) = &self.init_script {
            connection
                .execute_batch(script)
                .map_err(OrmError::ConnectionFailure)?;
        }
        info!(mode = ?self.mode, "opened entity manager connection");
        Ok(EntityManager::new(connection))
    }
}

// ------------- EntityManager -------------
pub struct EntityManager {
    // None once the manager is closed
    connection: Mutex<Option<Connection>>,
    cache: Mutex<IdentityCache>,
    registry: Mutex<HashMap<TypeId, Arc<ResolvedMetadata>, KeyHasher>>,
    queries: AtomicU64,
}

impl EntityManager {
    pub fn new(connection: Connection) -> Self {
        Self {
            connection: Mutex::new(Some(connection)),
            cache: Mutex::new(IdentityCache::new()),
            registry: Mutex::new(HashMap::default()),
            queries: AtomicU64::new(0),
        }
    }
    pub fn open(mode: PersistenceMode) -> Result<Self> {
        EntityManagerFactory::new(mode).create_entity_manager()
    }

    /// Looks up the entity of type `T` whose identifier equals `id`.
    ///
    /// Returns `Ok(None)` when no row has that identifier. Absent results are
    /// not cached, so a repeated miss queries again.
    ///
    /// Instances are cached under the key exactly as given. SQLite may match
    /// the same row for `1` and `"1"`, but those are different keys and yield
    /// two separate instances.
    pub fn find_by_id<T: Entity>(&self, id: impl Into<EntityKey>) -> Result<Option<Arc<T>>> {
        let id = id.into();
        self.ensure_open()?;
        let metadata = self.metadata::<T>()?;
        if let Some(kept) = self.cache.lock()?.get::<T>(&id) {
            debug!(entity = metadata.entity(), %id, "identity cache hit");
            return Ok(Some(kept));
        }

        let guard = self.connection.lock()?;
        let connection = guard.as_ref().ok_or(OrmError::ManagerClosed)?;
        // the key may have been loaded while waiting for the connection
        if let Some(kept) = self.cache.lock()?.get::<T>(&id) {
            return Ok(Some(kept));
        }
        match self.load::<T>(connection, &metadata, &id)? {
            Some(instance) => {
                let instance = Arc::new(instance);
                self.cache.lock()?.put(id, Arc::clone(&instance));
                Ok(Some(instance))
            }
            None => {
                debug!(entity = metadata.entity(), %id, "no row found");
                Ok(None)
            }
        }
    }

    fn load<T: Entity>(
        &self,
        connection: &Connection,
        metadata: &ResolvedMetadata,
        id: &EntityKey,
    ) -> Result<Option<T>> {
        let failure = |source: rusqlite::Error| OrmError::QueryExecutionFailure {
            entity: metadata.entity(),
            id: id.clone(),
            source,
        };
        let sql = find_by_id_query(metadata);
        debug!(entity = metadata.entity(), %id, %sql, "running query");
        let mut statement = connection.prepare_cached(&sql).map_err(failure)?;
        self.queries.fetch_add(1, Ordering::Relaxed);
        let mut rows = statement.query(params![id]).map_err(failure)?;
        match rows.next().map_err(failure)? {
            Some(row) => Ok(Some(map_row::<T>(row, metadata)?)),
            None => Ok(None),
        }
    }

    /// Resolved metadata for `T`, resolved on first use and kept afterwards.
    /// Types that fail to resolve are not kept and fail again on every call.
    pub fn metadata<T: Entity>(&self) -> Result<Arc<ResolvedMetadata>> {
        let type_id = TypeId::of::<T>();
        if let Some(kept) = self.registry.lock()?.get(&type_id) {
            return Ok(Arc::clone(kept));
        }
        let resolved = Arc::new(resolve(&T::DESCRIPTOR)?);
        self.registry
            .lock()?
            .insert(type_id, Arc::clone(&resolved));
        Ok(resolved)
    }
    /// Validates the metadata of `T` up front rather than on its first lookup.
    pub fn register<T: Entity>(&self) -> Result<()> {
        self.ensure_open()?;
        self.metadata::<T>().map(|_| ())
    }

    /// Releases the connection and discards the identity cache.
    ///
    /// A lock poisoned by a panic in an earlier lookup does not keep the
    /// connection from being released.
    pub fn close(&self) -> Result<()> {
        let connection = self
            .connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take()
            .ok_or(OrmError::ManagerClosed)?;
        self.cache
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        self.registry
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
        match connection.close() {
            Ok(()) => {
                info!(queries = self.queries_executed(), "closed entity manager");
                Ok(())
            }
            Err((_connection, e)) => {
                warn!(error = %e, "could not close entity manager connection");
                Err(OrmError::ConnectionCloseFailure(e))
            }
        }
    }
    pub fn is_open(&self) -> bool {
        self.connection
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }
    fn ensure_open(&self) -> Result<()> {
        match self.connection.lock()?.as_ref() {
            Some(_) => Ok(()),
            None => Err(OrmError::ManagerClosed),
        }
    }

    pub fn queries_executed(&self) -> u64 {
        self.queries.load(Ordering::Relaxed)
    }
    pub fn cached_instances(&self) -> Result<usize> {
        Ok(self.cache.lock()?.len())
    }
}

impl Drop for EntityManager {
    fn drop(&mut self) {
        let connection = self
            .connection
            .get_mut()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        if let Some(connection) = connection {
            if let Err((_, e)) = connection.close() {
                warn!(error = %e, "could not close entity manager connection on drop");
            }
        }
    }
}
