use crate::error::Result;
use crate::mapper::EntityRow;
use crate::metadata::EntityDescriptor;

/// A type whose instances correspond one-to-one with rows of a table.
///
/// Implementors declare their bindings statically and provide the decoder
/// that populates a new instance from one row. The decoder reads fields by
/// name through [`EntityRow::get`], which takes care of column positions and
/// type coercion.
pub trait Entity: Sized + Send + Sync + 'static {
    const DESCRIPTOR: EntityDescriptor;
    fn from_row(row: &EntityRow<'_, '_>) -> Result<Self>;
}

/// Declares a struct together with its [`Entity`] implementation.
///
/// Every field is persisted. A field is either the identifier, written as
/// `id` or `id("column")`, or an ordinary column written as
/// `column("column")`.
///
/// ```
/// use rowkeeper::entity;
///
/// entity! {
///     #[derive(Debug)]
///     pub struct Note in "notes" {
///         pub id: String => id("note_id"),
///         pub title: String => column("title"),
///         pub body: Option<String> => column("body"),
///     }
/// }
///
/// let metadata = rowkeeper::metadata::resolve(
///     &<Note as rowkeeper::Entity>::DESCRIPTOR
/// ).unwrap();
/// assert_eq!(metadata.identifier_column(), "note_id");
/// ```
#[macro_export]
macro_rules! entity {
    (@field $field:ident id) => {
        $crate::metadata::FieldDescriptor::identifier(stringify!($field))
    };
    (@field $field:ident id $column:literal) => {
        $crate::metadata::FieldDescriptor::identifier(stringify!($field)).with_column($column)
    };
    (@field $field:ident column $column:literal) => {
        $crate::metadata::FieldDescriptor::column(stringify!($field), $column)
    };
    (
        $(#[$meta:meta])*
        $vis:vis struct $name:ident in $table:literal {
            $(
                $(#[$field_meta:meta])*
                $field_vis:vis $field:ident : $ty:ty => $kind:ident $(($column:literal))?
            ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        $vis struct $name {
            $(
                $(#[$field_meta])*
                $field_vis $field: $ty,
            )*
        }

        impl $crate::entity::Entity for $name {
            const DESCRIPTOR: $crate::metadata::EntityDescriptor =
                $crate::metadata::EntityDescriptor::new(
                    stringify!($name),
                    $table,
                    &[$($crate::entity!(@field $field $kind $($column)?)),*],
                );
            fn from_row(row: &$crate::mapper::EntityRow<'_, '_>) -> $crate::error::Result<Self> {
                Ok(Self {
                    $($field: row.get(stringify!($field))?,)*
                })
            }
        }
    };
}
