// used to bind the identifier as the sole query parameter
use rusqlite::types::{ToSql, ToSqlOutput, ValueRef};

// used to print out readable forms of a key
use std::fmt;

// ------------- EntityKey -------------
/// The value of an identifier field.
///
/// Keys compare by exact value, so `Integer(1)` and `Text("1")` are different
/// keys. Floating point identifiers are not supported since they cannot be
/// hashed reliably.
#[derive(Clone, PartialEq, Eq, Hash, Debug)]
pub enum EntityKey {
    Integer(i64),
    Text(String),
    Blob(Vec<u8>),
}

impl ToSql for EntityKey {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            EntityKey::Integer(i) => ToSqlOutput::Borrowed(ValueRef::Integer(*i)),
            EntityKey::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
            EntityKey::Blob(b) => ToSqlOutput::Borrowed(ValueRef::Blob(b)),
        })
    }
}

impl fmt::Display for EntityKey {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            EntityKey::Integer(i) => write!(f, "{}", i),
            EntityKey::Text(s) => write!(f, "{}", s),
            EntityKey::Blob(b) => write!(f, "<{} bytes>", b.len()),
        }
    }
}

macro_rules! integer_key {
    ($($ty:ty),+) => {
        $(
            impl From<$ty> for EntityKey {
                fn from(value: $ty) -> Self {
                    EntityKey::Integer(i64::from(value))
                }
            }
        )+
    };
}
integer_key!(i8, i16, i32, i64, u8, u16, u32);

impl From<&str> for EntityKey {
    fn from(value: &str) -> Self {
        EntityKey::Text(value.to_owned())
    }
}
impl From<String> for EntityKey {
    fn from(value: String) -> Self {
        EntityKey::Text(value)
    }
}
impl From<&String> for EntityKey {
    fn from(value: &String) -> Self {
        EntityKey::Text(value.clone())
    }
}
impl From<Vec<u8>> for EntityKey {
    fn from(value: Vec<u8>) -> Self {
        EntityKey::Blob(value)
    }
}
impl From<&[u8]> for EntityKey {
    fn from(value: &[u8]) -> Self {
        EntityKey::Blob(value.to_vec())
    }
}
