use chrono::NaiveDate;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use rowkeeper::settings::{Settings, DEFAULT_SETTINGS_FILE};
use rowkeeper::{entity, EntityManagerFactory, PersistenceMode, Result};

entity! {
    #[derive(Debug)]
    pub struct Person in "person" {
        pub id: i64 => id,
        pub name: String => column("name"),
        pub born: Option<NaiveDate> => column("born"),
    }
}

entity! {
    #[derive(Debug)]
    pub struct Note in "notes" {
        pub id: String => id("note_id"),
        pub title: String => column("title"),
        pub body: String => column("body"),
    }
}

// Seeds the demo tables when nothing else has been configured to run.
const DEMO_SCRIPT: &str = "
    create table if not exists person (id integer primary key, name text not null, born text);
    create table if not exists notes (note_id text primary key, title text, body text);
    insert or ignore into person values (1, 'Alice', '1984-03-02');
    insert or ignore into notes values ('SUPER_ID_1', 'A', 'B');
";

fn run(settings: &Settings) -> Result<()> {
    let mut factory = EntityManagerFactory::from_settings(settings)?;
    if settings.database.init_script.is_none() && *factory.mode() == PersistenceMode::InMemory {
        factory = factory.with_init_script(DEMO_SCRIPT);
    }
    let em = factory.create_entity_manager()?;

    let person = em.find_by_id::<Person>(1)?;
    info!(?person, "found person");
    let person_again = em.find_by_id::<Person>(1)?;
    info!(?person_again, "found person again");

    let note = em.find_by_id::<Note>("SUPER_ID_1")?;
    info!(?note, "found note");
    let missing = em.find_by_id::<Note>("SUPER_ID_2")?;
    info!(?missing, "looked up missing note");
    let note_cached = em.find_by_id::<Note>("SUPER_ID_1")?;
    info!(?note_cached, "found note again");

    info!(queries = em.queries_executed(), cached = em.cached_instances()?, "lookups done");
    em.close()
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let file = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_SETTINGS_FILE.to_string());
    let outcome = Settings::load(Some(file.as_str())).and_then(|settings| run(&settings));
    if let Err(e) = outcome {
        error!(error = %e, "rowkeeper demo failed");
        std::process::exit(1);
    }
}
