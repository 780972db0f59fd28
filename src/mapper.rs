// used for reading and coercing column values
use rusqlite::Row;
use rusqlite::types::FromSql;

use crate::entity::Entity;
use crate::error::{OrmError, Result};
use crate::metadata::ResolvedMetadata;

// ------------- EntityRow -------------
/// One result row seen through the resolved metadata of an entity.
///
/// Values are read by the position a field has in the resolved field list,
/// which is also the position of its column in the generated select list.
pub struct EntityRow<'r, 'stmt> {
    row: &'r Row<'stmt>,
    metadata: &'r ResolvedMetadata,
}

impl<'r, 'stmt> EntityRow<'r, 'stmt> {
    pub fn new(row: &'r Row<'stmt>, metadata: &'r ResolvedMetadata) -> Result<Self> {
        let available = row.as_ref().column_count();
        if available < metadata.len() {
            return Err(OrmError::MappingFailure {
                entity: metadata.entity(),
                message: format!(
                    "row has {} columns but {} fields are persisted",
                    available,
                    metadata.len()
                ),
            });
        }
        Ok(Self { row, metadata })
    }
    pub fn metadata(&self) -> &ResolvedMetadata {
        self.metadata
    }
    /// Reads the value of a persisted field, coerced into `V`.
    pub fn get<V: FromSql>(&self, field: &str) -> Result<V> {
        match self.metadata.position(field) {
            Some(index) => self.get_at(index),
            None => Err(OrmError::MappingFailure {
                entity: self.metadata.entity(),
                message: format!("'{}' is not a persisted field", field),
            }),
        }
    }
    pub fn get_at<V: FromSql>(&self, index: usize) -> Result<V> {
        let failure = |message: String| OrmError::MappingFailure {
            entity: self.metadata.entity(),
            message,
        };
        let field = self
            .metadata
            .fields()
            .get(index)
            .ok_or_else(|| failure(format!("no persisted field at position {}", index)))?;
        let value = self
            .row
            .get_ref(index)
            .map_err(|e| failure(format!("column '{}': {}", field.column(), e)))?;
        V::column_result(value).map_err(|e| {
            failure(format!(
                "field '{}' (column '{}') cannot take a {} value: {}",
                field.name(),
                field.column(),
                value.data_type(),
                e
            ))
        })
    }
}

/// Allocates and populates one instance of `T` from a result row.
pub fn map_row<T: Entity>(row: &Row<'_>, metadata: &ResolvedMetadata) -> Result<T> {
    let row = EntityRow::new(row, metadata)?;
    T::from_row(&row)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{resolve, EntityDescriptor, FieldDescriptor};
    use rusqlite::Connection;

    const FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::identifier("id"),
        FieldDescriptor::column("age", "age"),
        FieldDescriptor::column("nickname", "nickname"),
    ];

    fn with_row<F: FnOnce(&Row<'_>, &ResolvedMetadata)>(sql: &str, f: F) {
        let metadata = resolve(&EntityDescriptor::new("Person", "people", FIELDS)).unwrap();
        let conn = Connection::open_in_memory().unwrap();
        let mut statement = conn.prepare(sql).unwrap();
        let mut rows = statement.query([]).unwrap();
        let row = rows.next().unwrap().unwrap();
        f(row, &metadata);
    }

    #[test]
    fn reads_fields_by_resolved_position() {
        with_row("select 7, 42, null", |row, metadata| {
            let row = EntityRow::new(row, metadata).unwrap();
            assert_eq!(row.get::<i64>("id").unwrap(), 7);
            assert_eq!(row.get::<u8>("age").unwrap(), 42);
            assert_eq!(row.get::<Option<String>>("nickname").unwrap(), None);
        });
    }

    #[test]
    fn coercion_failure_is_a_mapping_failure() {
        with_row("select 7, 'old', null", |row, metadata| {
            let row = EntityRow::new(row, metadata).unwrap();
            match row.get::<i64>("age") {
                Err(OrmError::MappingFailure { entity, message }) => {
                    assert_eq!(entity, "Person");
                    assert!(message.contains("age"), "{}", message);
                }
                other => panic!("expected mapping failure, got {:?}", other),
            }
            assert!(row.get::<String>("nickname").is_err());
            assert!(row.get::<String>("unknown").is_err());
        });
    }

    #[test]
    fn short_row_is_rejected() {
        with_row("select 7, 42", |row, metadata| {
            assert!(matches!(
                EntityRow::new(row, metadata),
                Err(OrmError::MappingFailure { .. })
            ));
        });
    }
}
