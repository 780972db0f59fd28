//! Rowkeeper – a minimal entity manager over SQLite.
//!
//! Rowkeeper maps plain Rust types onto single rows of a table:
//! * An [`entity::Entity`] declares its table and column bindings statically,
//!   as a [`metadata::EntityDescriptor`], together with a decoder that builds
//!   an instance from one row.
//! * The [`metadata`] module validates descriptors and resolves them into
//!   ordered column bindings.
//! * The [`query`] module turns resolved metadata into a parameterized
//!   find-by-id `SELECT`.
//! * The [`mapper`] module reads result columns back, by the same positions,
//!   coercing them into field types.
//! * The [`cache`] module keeps one canonical instance per (type, id) pair.
//! * The [`manager::EntityManager`] ties these together and owns the
//!   connection.
//!
//! Lookups are by identifier only. There are no writes, joins or multi-row
//! queries, and cached instances live until the manager is closed.
//!
//! ## Quick Start
//! ```
//! use std::sync::Arc;
//! use rowkeeper::{entity, EntityManagerFactory, PersistenceMode};
//!
//! entity! {
//!     #[derive(Debug)]
//!     pub struct Note in "notes" {
//!         pub id: String => id("note_id"),
//!         pub title: String => column("title"),
//!         pub body: String => column("body"),
//!     }
//! }
//!
//! let em = EntityManagerFactory::new(PersistenceMode::InMemory)
//!     .with_init_script(
//!         "create table notes (note_id text primary key, title text, body text);
//!          insert into notes values ('SUPER_ID_1', 'A', 'B');",
//!     )
//!     .create_entity_manager()
//!     .unwrap();
//! let note = em.find_by_id::<Note>("SUPER_ID_1").unwrap().unwrap();
//! assert_eq!(note.title, "A");
//! let again = em.find_by_id::<Note>("SUPER_ID_1").unwrap().unwrap();
//! assert!(Arc::ptr_eq(&note, &again));
//! assert!(em.find_by_id::<Note>("UNKNOWN").unwrap().is_none());
//! em.close().unwrap();
//! ```
//!
//! ## Settings
//! The [`settings::Settings`] type loads connection settings from a file and
//! the environment; see that module for the recognized keys.

pub mod cache;
pub mod entity;
pub mod error;
pub mod key;
pub mod manager;
pub mod mapper;
pub mod metadata;
pub mod query;
pub mod settings;

pub use entity::Entity;
pub use error::{OrmError, Result};
pub use key::EntityKey;
pub use manager::{EntityManager, EntityManagerFactory, PersistenceMode};
