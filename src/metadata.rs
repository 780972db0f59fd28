//! Declared entity metadata and its resolution into table and column bindings.
//!
//! A type declares its metadata once, statically, as an [`EntityDescriptor`].
//! The [`resolve`] function validates such a descriptor and derives the
//! [`ResolvedMetadata`] that both the query builder and the row mapper work
//! from. The ordered field list of the resolved metadata is the single source
//! of column order: the `SELECT` list is generated from it and result columns
//! are read back by the same positions.

use crate::error::{OrmError, Result};

// ------------- Declared metadata -------------
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct FieldDescriptor {
    pub name: &'static str,
    pub column: Option<&'static str>,
    pub persisted: bool,
    // an identifier is always persisted, whatever `persisted` says
    pub identifier: bool,
}

impl FieldDescriptor {
    /// An identifier field bound to a column with the same name as the field.
    pub const fn identifier(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            persisted: true,
            identifier: true,
        }
    }
    pub const fn column(name: &'static str, column: &'static str) -> Self {
        Self {
            name,
            column: Some(column),
            persisted: true,
            identifier: false,
        }
    }
    /// A field that lives on the type but is never read from the table.
    pub const fn transient(name: &'static str) -> Self {
        Self {
            name,
            column: None,
            persisted: false,
            identifier: false,
        }
    }
    pub const fn with_column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }
}

#[derive(Clone, Copy, Debug)]
pub struct EntityDescriptor {
    pub name: &'static str,
    pub entity: bool,
    pub table: Option<&'static str>,
    pub fields: &'static [FieldDescriptor],
}

impl EntityDescriptor {
    pub const fn new(
        name: &'static str,
        table: &'static str,
        fields: &'static [FieldDescriptor],
    ) -> Self {
        Self {
            name,
            entity: true,
            table: Some(table),
            fields,
        }
    }
}

// ------------- Resolved metadata -------------
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedField {
    name: &'static str,
    column: &'static str,
}

impl ResolvedField {
    pub fn name(&self) -> &'static str {
        self.name
    }
    pub fn column(&self) -> &'static str {
        self.column
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ResolvedMetadata {
    entity: &'static str,
    table: &'static str,
    fields: Vec<ResolvedField>,
    identifier: usize,
}

impl ResolvedMetadata {
    pub fn entity(&self) -> &'static str {
        self.entity
    }
    pub fn table(&self) -> &'static str {
        self.table
    }
    /// Persisted fields in declaration order, the identifier included.
    pub fn fields(&self) -> &[ResolvedField] {
        &self.fields
    }
    pub fn columns(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.fields.iter().map(ResolvedField::column)
    }
    pub fn identifier(&self) -> &ResolvedField {
        &self.fields[self.identifier]
    }
    pub fn identifier_column(&self) -> &'static str {
        self.identifier().column
    }
    /// Position of a persisted field in the select list.
    pub fn position(&self, field: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == field)
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

/// Validates a declared descriptor and derives its bindings.
///
/// Checks run in a fixed order, so a type that is not an entity always fails
/// with [`OrmError::NotAnEntity`] whatever else is wrong with it.
pub fn resolve(descriptor: &EntityDescriptor) -> Result<ResolvedMetadata> {
    let entity = descriptor.name;
    if !descriptor.entity {
        return Err(OrmError::NotAnEntity { entity });
    }
    let table = match descriptor.table {
        Some(table) if !table.trim().is_empty() => table,
        _ => return Err(OrmError::MissingTableMetadata { entity }),
    };

    let persisted: Vec<&FieldDescriptor> = descriptor
        .fields
        .iter()
        .filter(|f| f.persisted || f.identifier)
        .collect();
    let identifiers: Vec<usize> = persisted
        .iter()
        .enumerate()
        .filter(|(_, f)| f.identifier)
        .map(|(i, _)| i)
        .collect();
    let identifier = match identifiers.as_slice() {
        [] => return Err(OrmError::MissingIdentifier { entity }),
        [single] => *single,
        many => {
            return Err(OrmError::DuplicateIdentifier {
                entity,
                fields: many.iter().map(|&i| persisted[i].name).collect(),
            });
        }
    };

    let mut fields = Vec::with_capacity(persisted.len());
    for field in persisted {
        let column = match (field.column, field.identifier) {
            (Some(column), _) => column,
            (None, true) => field.name,
            (None, false) => {
                return Err(OrmError::MissingColumnBinding {
                    entity,
                    field: field.name,
                });
            }
        };
        fields.push(ResolvedField {
            name: field.name,
            column,
        });
    }

    Ok(ResolvedMetadata {
        entity,
        table,
        fields,
        identifier,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const NOTE_FIELDS: &[FieldDescriptor] = &[
        FieldDescriptor::identifier("id").with_column("note_id"),
        FieldDescriptor::column("title", "title"),
        FieldDescriptor::transient("dirty"),
        FieldDescriptor::column("body", "body"),
    ];

    #[test]
    fn resolves_columns_in_declaration_order() {
        let resolved = resolve(&EntityDescriptor::new("Note", "notes", NOTE_FIELDS)).unwrap();
        assert_eq!(resolved.table(), "notes");
        assert_eq!(
            resolved.columns().collect::<Vec<_>>(),
            vec!["note_id", "title", "body"]
        );
        assert_eq!(resolved.identifier().name(), "id");
        assert_eq!(resolved.identifier_column(), "note_id");
        assert_eq!(resolved.position("body"), Some(2));
        assert_eq!(resolved.position("dirty"), None);
    }

    #[test]
    fn identifier_column_falls_back_to_field_name() {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::identifier("id"),
            FieldDescriptor::column("name", "full_name"),
        ];
        let resolved = resolve(&EntityDescriptor::new("Person", "people", FIELDS)).unwrap();
        assert_eq!(resolved.identifier_column(), "id");
    }

    #[test]
    fn not_an_entity_wins_over_other_problems() {
        let descriptor = EntityDescriptor {
            name: "Plain",
            entity: false,
            table: None,
            fields: &[],
        };
        assert!(matches!(
            resolve(&descriptor),
            Err(OrmError::NotAnEntity { entity: "Plain" })
        ));
    }

    #[test]
    fn empty_table_is_missing() {
        let descriptor = EntityDescriptor::new("Note", "  ", NOTE_FIELDS);
        assert!(matches!(
            resolve(&descriptor),
            Err(OrmError::MissingTableMetadata { .. })
        ));
        let descriptor = EntityDescriptor {
            table: None,
            ..descriptor
        };
        assert!(matches!(
            resolve(&descriptor),
            Err(OrmError::MissingTableMetadata { .. })
        ));
    }

    #[test]
    fn identifier_cardinality() {
        const NONE: &[FieldDescriptor] = &[FieldDescriptor::column("title", "title")];
        assert!(matches!(
            resolve(&EntityDescriptor::new("Note", "notes", NONE)),
            Err(OrmError::MissingIdentifier { .. })
        ));
        const TWO: &[FieldDescriptor] = &[
            FieldDescriptor::identifier("a"),
            FieldDescriptor::identifier("b"),
        ];
        match resolve(&EntityDescriptor::new("Note", "notes", TWO)) {
            Err(OrmError::DuplicateIdentifier { fields, .. }) => assert_eq!(fields, vec!["a", "b"]),
            other => panic!("expected duplicate identifier, got {:?}", other),
        }
    }

    #[test]
    fn identifier_marked_unpersisted_still_counts() {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::identifier("id"),
            FieldDescriptor {
                persisted: false,
                ..FieldDescriptor::identifier("ghost")
            },
        ];
        match resolve(&EntityDescriptor::new("Note", "notes", FIELDS)) {
            Err(OrmError::DuplicateIdentifier { fields, .. }) => {
                assert_eq!(fields, vec!["id", "ghost"])
            }
            other => panic!("expected duplicate identifier, got {:?}", other),
        }

        const ONLY: &[FieldDescriptor] = &[
            FieldDescriptor {
                persisted: false,
                ..FieldDescriptor::identifier("id")
            },
            FieldDescriptor::column("title", "title"),
        ];
        let resolved = resolve(&EntityDescriptor::new("Note", "notes", ONLY)).unwrap();
        assert_eq!(resolved.columns().collect::<Vec<_>>(), vec!["id", "title"]);
    }

    #[test]
    fn persisted_field_needs_a_column() {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::identifier("id"),
            FieldDescriptor {
                name: "title",
                column: None,
                persisted: true,
                identifier: false,
            },
        ];
        assert!(matches!(
            resolve(&EntityDescriptor::new("Note", "notes", FIELDS)),
            Err(OrmError::MissingColumnBinding { field: "title", .. })
        ));
    }
}
