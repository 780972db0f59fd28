use std::sync::Arc;
use std::thread;

use rowkeeper::{entity, EntityManagerFactory, PersistenceMode};

entity! {
    #[derive(Debug)]
    struct Note in "notes" {
        id: String => id("note_id"),
        title: String => column("title"),
    }
}

entity! {
    #[derive(Debug)]
    struct Tag in "tags" {
        id: String => id,
        label: String => column("label"),
    }
}

fn setup() -> Arc<rowkeeper::EntityManager> {
    let em = EntityManagerFactory::new(PersistenceMode::InMemory)
        .with_init_script(
            "create table notes (note_id text primary key, title text);
             insert into notes values ('n1', 'first');
             create table tags (id text primary key, label text);
             insert into tags values ('n1', 'shared key');",
        )
        .create_entity_manager()
        .expect("manager");
    Arc::new(em)
}

#[test]
fn concurrent_misses_share_one_query_and_one_instance() {
    let em = setup();
    let handles: Vec<_> = (0..8)
        .map(|_| {
            let em = Arc::clone(&em);
            thread::spawn(move || em.find_by_id::<Note>("n1").unwrap().unwrap())
        })
        .collect();
    let notes: Vec<Arc<Note>> = handles.into_iter().map(|h| h.join().unwrap()).collect();
    assert!(notes.windows(2).all(|w| Arc::ptr_eq(&w[0], &w[1])));
    assert_eq!(em.queries_executed(), 1);
}

#[test]
fn same_key_in_different_types_does_not_collide() {
    let em = setup();
    let note = em.find_by_id::<Note>("n1").unwrap().unwrap();
    let tag = em.find_by_id::<Tag>("n1").unwrap().unwrap();
    assert_eq!(note.title, "first");
    assert_eq!(tag.label, "shared key");
    assert_eq!(em.cached_instances().unwrap(), 2);
    assert_eq!(em.queries_executed(), 2);
}
