use crate::metadata::ResolvedMetadata;

/// Builds the single-row lookup for an entity.
///
/// The select list follows the resolved field order exactly, since the row
/// mapper reads result columns back by those positions. Table and column
/// names come from static metadata and are not escaped; only the identifier
/// value is a parameter.
pub fn find_by_id_query(metadata: &ResolvedMetadata) -> String {
    format!(
        "SELECT {} FROM {} WHERE {} = ?",
        metadata.columns().collect::<Vec<_>>().join(", "),
        metadata.table(),
        metadata.identifier_column()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::{resolve, EntityDescriptor, FieldDescriptor};

    #[test]
    fn selects_every_column_filtered_by_identifier() {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::identifier("id").with_column("note_id"),
            FieldDescriptor::column("title", "title"),
            FieldDescriptor::column("body", "body"),
        ];
        let metadata = resolve(&EntityDescriptor::new("Note", "notes", FIELDS)).unwrap();
        assert_eq!(
            find_by_id_query(&metadata),
            "SELECT note_id, title, body FROM notes WHERE note_id = ?"
        );
    }

    #[test]
    fn identifier_need_not_come_first() {
        const FIELDS: &[FieldDescriptor] = &[
            FieldDescriptor::column("name", "full_name"),
            FieldDescriptor::identifier("id"),
        ];
        let metadata = resolve(&EntityDescriptor::new("Person", "people", FIELDS)).unwrap();
        assert_eq!(
            find_by_id_query(&metadata),
            "SELECT full_name, id FROM people WHERE id = ?"
        );
    }
}
