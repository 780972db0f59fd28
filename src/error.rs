use thiserror::Error;

use crate::key::EntityKey;

#[derive(Error, Debug)]
pub enum OrmError {
    #[error("Type '{entity}' is not marked as an entity")]
    NotAnEntity { entity: &'static str },
    #[error("Entity '{entity}' has no table binding, or the binding is empty")]
    MissingTableMetadata { entity: &'static str },
    #[error("Entity '{entity}' does not define an identifier field")]
    MissingIdentifier { entity: &'static str },
    #[error("Entity '{entity}' marks more than one field as identifier: {fields:?}")]
    DuplicateIdentifier { entity: &'static str, fields: Vec<&'static str> },
    #[error("Field '{field}' of entity '{entity}' is persisted but has no column binding")]
    MissingColumnBinding { entity: &'static str, field: &'static str },
    #[error("Could not read entity data from database for entity [{entity}] with id [{id}]: {source}")]
    QueryExecutionFailure {
        entity: &'static str,
        id: EntityKey,
        #[source]
        source: rusqlite::Error,
    },
    #[error("Could not map row onto entity '{entity}': {message}")]
    MappingFailure { entity: &'static str, message: String },
    #[error("Entity manager is closed")]
    ManagerClosed,
    // SQLite refuses to close while statements are unfinalized. The manager
    // owns its connection and its cached statements are finalized on close,
    // so this is only reached when SQLite itself fails to release.
    #[error("Could not close entity manager connection: {0}")]
    ConnectionCloseFailure(#[source] rusqlite::Error),
    #[error("Could not open connection for entity manager: {0}")]
    ConnectionFailure(#[source] rusqlite::Error),
    #[error("Config error: {0}")]
    Config(String),
    #[error("Lock poisoned: {0}")]
    Lock(String),
}

pub type Result<T> = std::result::Result<T, OrmError>;

// Helper conversions
impl From<config::ConfigError> for OrmError {
    fn from(e: config::ConfigError) -> Self { Self::Config(e.to_string()) }
}
impl<T> From<std::sync::PoisonError<T>> for OrmError {
    fn from(e: std::sync::PoisonError<T>) -> Self { Self::Lock(e.to_string()) }
}
